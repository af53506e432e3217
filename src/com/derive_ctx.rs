use super::neighbor::*;
use super::partition::*;
use super::tracer::*;
use super::util::*;
use super::*;

/*****************************************************************************
 * partitioning
 *****************************************************************************/
/// Context increments of the split syntax of one coding tree node.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct SplitCtx {
    /* split_cu_flag, 0..=8 */
    pub spl: u32,
    /* split_qt_flag, 0..=5 */
    pub qt: u32,
    /* mtt_split_cu_vertical_flag, 0..=4 */
    pub hv: u32,
    /* mtt_split_cu_binary_flag for horizontal and vertical splits, 0..=3 */
    pub hor_bt: u32,
    pub ver_bt: u32,
}

pub fn ctx_split<L: CuLookup>(
    cs: &L,
    partitioner: &Partitioner,
    cur_slice_idx: u32,
    cur_tile_idx: u32,
    can_split: Option<&[bool; 6]>,
) -> SplitCtx {
    let ch_type = partitioner.ch_type;
    let area = partitioner.curr_block();
    let pos = area.pos();

    let cu_left =
        cs.get_cu_restricted(pos.offset(-1, 0), pos, cur_slice_idx, cur_tile_idx, ch_type);
    let cu_above =
        cs.get_cu_restricted(pos.offset(0, -1), pos, cur_slice_idx, cur_tile_idx, ch_type);

    let can_split = match can_split {
        Some(c) => *c,
        None => partitioner.can_split(),
    };

    let mut ctx = SplitCtx::default();

    /* split flag */
    if let Some(left) = cu_left {
        ctx.spl += (left.blocks[ch_type as usize].height < area.height) as u32;
    }
    if let Some(above) = cu_above {
        ctx.spl += (above.blocks[ch_type as usize].width < area.width) as u32;
    }
    let mut num_split = 0;
    if can_split[SPLIT_QT] {
        num_split += 2;
    }
    num_split += can_split[SPLIT_BT_H..=SPLIT_TT_V]
        .iter()
        .filter(|&&c| c)
        .count() as u32;
    if num_split > 0 {
        num_split -= 1;
    }
    ctx.spl += 3 * (num_split >> 1);

    /* quad split */
    let qt_depth = partitioner.curr_qt_depth();
    ctx.qt = cu_left.map_or(false, |cu| cu.qt_depth > qt_depth) as u32
        + cu_above.map_or(false, |cu| cu.qt_depth > qt_depth) as u32
        + if qt_depth < 2 { 0 } else { 3 };

    /* split direction */
    let num_hor = can_split[SPLIT_BT_H] as u32 + can_split[SPLIT_TT_H] as u32;
    let num_ver = can_split[SPLIT_BT_V] as u32 + can_split[SPLIT_TT_V] as u32;
    ctx.hv = if num_ver == num_hor {
        match (cu_left, cu_above) {
            (Some(left), Some(above)) => {
                let dep_above = area.width / above.blocks[ch_type as usize].width;
                let dep_left = area.height / left.blocks[ch_type as usize].height;
                if dep_above == dep_left {
                    0
                } else if dep_above < dep_left {
                    1
                } else {
                    2
                }
            }
            _ => 0,
        }
    } else if num_ver < num_hor {
        3
    } else {
        4
    };

    /* binary vs ternary */
    let mt_depth = partitioner.curr_mt_depth();
    ctx.hor_bt = if mt_depth <= 1 { 1 } else { 0 };
    ctx.ver_bt = if mt_depth <= 1 { 3 } else { 2 };

    TRACE_CU_CTX("split", pos, ctx.spl);
    ctx
}

/*****************************************************************************
 * transform tree
 *****************************************************************************/
/// Context increment of a coded block flag. `prev_cbf` is the Cb flag when
/// coding Cr, and the previous luma flag of an intra sub-partition.
pub fn ctx_qt_cbf(comp_id: ComponentId, tr_depth: u32, prev_cbf: bool, isp: bool) -> u32 {
    match comp_id {
        ComponentId::Y if isp => 2 + prev_cbf as u32,
        ComponentId::Y => (tr_depth == 0) as u32,
        ComponentId::CR => prev_cbf as u32,
        ComponentId::CB => tr_depth,
    }
}

/*****************************************************************************
 * coding unit flags
 *****************************************************************************/
/// Context increment of the first inter_pred_idc bin. The second bin always
/// uses increment 5.
pub fn ctx_inter_dir(luma_size: Size) -> u32 {
    7 - ((CONV_LOG2(luma_size.width) + CONV_LOG2(luma_size.height) + 1) >> 1)
}

fn neighbour_sum<L, F>(cs: &L, cu: &CodingUnitInfo, ch_type: ChannelType, f: F) -> u32
where
    L: CuLookup,
    F: Fn(&CodingUnitInfo) -> bool,
{
    let pos = cu.blocks[ch_type as usize].pos();
    let left = cs.get_cu_restricted_for(pos.offset(-1, 0), cu, ch_type);
    let above = cs.get_cu_restricted_for(pos.offset(0, -1), cu, ch_type);
    left.map_or(false, &f) as u32 + above.map_or(false, &f) as u32
}

pub fn ctx_affine_flag<L: CuLookup>(cs: &L, cu: &CodingUnitInfo) -> u32 {
    neighbour_sum(cs, cu, ChannelType::LUMA, |n| n.affine)
}

pub fn ctx_skip_flag<L: CuLookup>(cs: &L, cu: &CodingUnitInfo) -> u32 {
    let ctx = neighbour_sum(cs, cu, ChannelType::LUMA, |n| n.skip);
    TRACE_CU_CTX("skip", cu.luma_pos(), ctx);
    ctx
}

pub fn ctx_imv_flag<L: CuLookup>(cs: &L, cu: &CodingUnitInfo) -> u32 {
    neighbour_sum(cs, cu, ChannelType::LUMA, |n| n.imv != 0)
}

pub fn ctx_triangle_flag<L: CuLookup>(cs: &L, cu: &CodingUnitInfo) -> u32 {
    neighbour_sum(cs, cu, ChannelType::LUMA, |n| n.triangle)
}

pub fn ctx_pred_mode_flag<L: CuLookup>(cs: &L, cu: &CodingUnitInfo) -> u32 {
    (neighbour_sum(cs, cu, ChannelType::LUMA, |n| n.is_intra()) > 0) as u32
}

/// IBC flag context; a chroma tree unit looks up its neighbours in the
/// chroma grid.
pub fn ctx_ibc_flag<L: CuLookup>(cs: &L, cu: &CodingUnitInfo) -> u32 {
    neighbour_sum(cs, cu, cu.ch_type, |n| n.is_ibc())
}

pub fn ctx_mip_flag<L: CuLookup>(cs: &L, cu: &CodingUnitInfo) -> u32 {
    let size = cu.luma_size();
    if size.width > 2 * size.height || size.height > 2 * size.width {
        return 3;
    }
    neighbour_sum(cs, cu, ChannelType::LUMA, |n| n.mip_flag)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pic() -> PictureConfig {
        PictureConfig {
            width: 256,
            height: 256,
            ..Default::default()
        }
    }

    fn cu(x: i32, y: i32, w: u32, h: u32) -> CodingUnitInfo {
        CodingUnitInfo::new(Area::new(x, y, w, h), ChromaFormat::CF_420, TreeType::TREE_D)
    }

    /* current unit at (16,16) 16x16 with optional left/above neighbours */
    fn flag_ctx<F, G>(left: Option<bool>, above: Option<bool>, set: F, derive: G) -> u32
    where
        F: Fn(&mut CodingUnitInfo, bool),
        G: Fn(&CuMap, &CodingUnitInfo) -> u32,
    {
        let mut map = CuMap::new(&pic());
        if let Some(flag) = left {
            let mut n = cu(0, 16, 16, 16);
            set(&mut n, flag);
            map.add_cu(n).unwrap();
        }
        if let Some(flag) = above {
            let mut n = cu(16, 0, 16, 16);
            set(&mut n, flag);
            map.add_cu(n).unwrap();
        }
        derive(&map, &cu(16, 16, 16, 16))
    }

    fn check_symmetric<F, G>(set: F, derive: G)
    where
        F: Fn(&mut CodingUnitInfo, bool) + Copy,
        G: Fn(&CuMap, &CodingUnitInfo) -> u32 + Copy,
    {
        assert_eq!(flag_ctx(None, None, set, derive), 0);
        assert_eq!(flag_ctx(Some(false), Some(false), set, derive), 0);
        assert_eq!(flag_ctx(Some(true), None, set, derive), 1);
        assert_eq!(flag_ctx(None, Some(true), set, derive), 1);
        assert_eq!(flag_ctx(Some(true), Some(false), set, derive), 1);
        assert_eq!(flag_ctx(Some(false), Some(true), set, derive), 1);
        assert_eq!(flag_ctx(Some(true), Some(true), set, derive), 2);
    }

    #[test]
    fn boolean_flag_contexts_are_symmetric() {
        check_symmetric(|n, f| n.affine = f, |m, c| ctx_affine_flag(m, c));
        check_symmetric(|n, f| n.skip = f, |m, c| ctx_skip_flag(m, c));
        check_symmetric(|n, f| n.imv = f as u8, |m, c| ctx_imv_flag(m, c));
        check_symmetric(|n, f| n.triangle = f, |m, c| ctx_triangle_flag(m, c));
        check_symmetric(|n, f| n.mip_flag = f, |m, c| ctx_mip_flag(m, c));
        check_symmetric(
            |n, f| {
                n.pred_mode = if f {
                    PredMode::MODE_IBC
                } else {
                    PredMode::MODE_INTER
                }
            },
            |m, c| ctx_ibc_flag(m, c),
        );
    }

    #[test]
    fn pred_mode_ctx_is_any_intra() {
        let intra = |n: &mut CodingUnitInfo, f: bool| {
            n.pred_mode = if f {
                PredMode::MODE_INTRA
            } else {
                PredMode::MODE_INTER
            }
        };
        let derive = |m: &CuMap, c: &CodingUnitInfo| ctx_pred_mode_flag(m, c);
        assert_eq!(flag_ctx(None, None, intra, derive), 0);
        assert_eq!(flag_ctx(Some(true), None, intra, derive), 1);
        assert_eq!(flag_ctx(Some(true), Some(true), intra, derive), 1);
        assert_eq!(flag_ctx(Some(false), Some(false), intra, derive), 0);
    }

    #[test]
    fn neighbours_in_other_slice_are_absent() {
        let mut map = CuMap::new(&pic());
        let mut left = cu(0, 16, 16, 16);
        left.skip = true;
        left.slice_idx = 1;
        map.add_cu(left).unwrap();
        let mut above = cu(16, 0, 16, 16);
        above.skip = true;
        above.tile_idx = 2;
        map.add_cu(above).unwrap();
        assert_eq!(ctx_skip_flag(&map, &cu(16, 16, 16, 16)), 0);
    }

    #[test]
    fn ibc_ctx_of_chroma_tree_uses_chroma_grid() {
        let mut map = CuMap::new(&pic());
        let mut left = CodingUnitInfo::new(
            Area::new(0, 16, 16, 16),
            ChromaFormat::CF_420,
            TreeType::TREE_C,
        );
        left.pred_mode = PredMode::MODE_IBC;
        map.add_cu(left).unwrap();
        let cur = CodingUnitInfo::new(
            Area::new(16, 16, 16, 16),
            ChromaFormat::CF_420,
            TreeType::TREE_C,
        );
        assert_eq!(ctx_ibc_flag(&map, &cur), 1);
        // the luma grid has no unit there
        assert_eq!(ctx_ibc_flag(&map, &cu(16, 16, 16, 16)), 0);
    }

    #[test]
    fn mip_ctx_for_narrow_blocks() {
        let map = CuMap::new(&pic());
        assert_eq!(ctx_mip_flag(&map, &cu(0, 0, 32, 8)), 3);
        assert_eq!(ctx_mip_flag(&map, &cu(0, 0, 4, 16)), 3);
        assert_eq!(ctx_mip_flag(&map, &cu(0, 0, 16, 8)), 0);
    }

    #[test]
    fn inter_dir_ctx_is_unclamped() {
        assert_eq!(ctx_inter_dir(Size { width: 8, height: 8 }), 4);
        assert_eq!(ctx_inter_dir(Size { width: 8, height: 4 }), 4);
        assert_eq!(ctx_inter_dir(Size { width: 16, height: 16 }), 3);
        assert_eq!(ctx_inter_dir(Size { width: 32, height: 8 }), 3);
        assert_eq!(ctx_inter_dir(Size { width: 64, height: 64 }), 1);
        assert_eq!(ctx_inter_dir(Size { width: 128, height: 128 }), 0);
    }

    #[test]
    fn qt_cbf_ctx() {
        assert_eq!(ctx_qt_cbf(ComponentId::Y, 0, false, false), 1);
        assert_eq!(ctx_qt_cbf(ComponentId::Y, 1, false, false), 0);
        assert_eq!(ctx_qt_cbf(ComponentId::Y, 0, true, true), 3);
        assert_eq!(ctx_qt_cbf(ComponentId::Y, 1, false, true), 2);
        assert_eq!(ctx_qt_cbf(ComponentId::CB, 2, true, false), 2);
        assert_eq!(ctx_qt_cbf(ComponentId::CR, 2, true, false), 1);
        assert_eq!(ctx_qt_cbf(ComponentId::CR, 0, false, false), 0);
    }

    fn partitioner() -> Partitioner {
        let mut cfg = Config::default();
        cfg.picture = pic();
        let mut p = Partitioner::new(&cfg, TreeType::TREE_D);
        p.init_ctu(Area::new(0, 0, 128, 128));
        p
    }

    #[test]
    fn split_ctx_without_neighbours() {
        let map = CuMap::new(&pic());
        let p = partitioner();
        let all = [true; 6];
        assert_eq!(
            ctx_split(&map, &p, 0, 0, Some(&all)),
            SplitCtx {
                spl: 6,
                qt: 0,
                hv: 0,
                hor_bt: 1,
                ver_bt: 3,
            }
        );
        // CTU root: QT and BT only, (2 + 1 + 1 - 1) >> 1 = 1
        assert_eq!(ctx_split(&map, &p, 0, 0, None).spl, 3);
        assert_eq!(ctx_split(&map, &p, 0, 0, Some(&[false; 6])).spl, 0);
    }

    #[test]
    fn split_ctx_direction_tie_break() {
        let mut map = CuMap::new(&pic());
        let mut left = cu(0, 64, 64, 32);
        left.qt_depth = 2;
        map.add_cu(left).unwrap();
        map.add_cu(cu(64, 0, 64, 64)).unwrap();

        let mut p = partitioner();
        p.split_curr_area(PartSplit::CU_QUAD_SPLIT);
        for _ in 0..3 {
            assert!(p.next_part());
        }
        assert_eq!(p.curr_area(), Area::new(64, 64, 64, 64));

        let bt_only = [true, true, true, true, false, false];
        let ctx = ctx_split(&map, &p, 0, 0, Some(&bt_only));
        // left is shorter, above is as wide
        assert_eq!(ctx.spl, 1 + 3);
        assert_eq!(ctx.qt, 1);
        // above depth 1 < left depth 2
        assert_eq!(ctx.hv, 1);

        let hor_only = [true, true, true, false, true, false];
        assert_eq!(ctx_split(&map, &p, 0, 0, Some(&hor_only)).hv, 3);
        let ver_only = [true, false, false, true, false, false];
        assert_eq!(ctx_split(&map, &p, 0, 0, Some(&ver_only)).hv, 4);

        // neighbours from another slice drop out of every term
        let ctx = ctx_split(&map, &p, 1, 0, Some(&bt_only));
        assert_eq!((ctx.spl, ctx.qt, ctx.hv), (3, 0, 0));
    }

    #[test]
    fn split_ctx_left_deeper_than_above() {
        let mut map = CuMap::new(&pic());
        map.add_cu(cu(0, 64, 64, 64)).unwrap();
        map.add_cu(cu(64, 32, 16, 32)).unwrap();

        let mut p = partitioner();
        p.split_curr_area(PartSplit::CU_QUAD_SPLIT);
        for _ in 0..3 {
            p.next_part();
        }
        let ctx = ctx_split(&map, &p, 0, 0, Some(&[true, true, true, true, false, false]));
        // above depth 4 > left depth 1
        assert_eq!(ctx.hv, 2);
        assert_eq!(ctx.spl, 1 + 3);
    }
}
