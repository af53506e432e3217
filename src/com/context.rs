use super::*;

/// A contiguous run of context models; `ctx(inc)` maps a derived increment to
/// the absolute context id consumed by the arithmetic coder.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct CtxSet {
    pub offset: u16,
    pub size: u16,
}

impl CtxSet {
    #[inline]
    pub fn ctx(self, inc: u32) -> u32 {
        debug_assert!(
            inc < self.size as u32,
            "context increment {} out of set of {}",
            inc,
            self.size
        );
        self.offset as u32 + inc
    }
}

struct CtxStore {
    next: u16,
}

impl CtxStore {
    fn add(&mut self, size: u16) -> CtxSet {
        let set = CtxSet {
            offset: self.next,
            size,
        };
        self.next += size;
        set
    }

    fn add_n<A: Default + AsMut<[CtxSet]>>(&mut self, sizes: &[u16]) -> A {
        let mut sets = A::default();
        for (set, &size) in sets.as_mut().iter_mut().zip(sizes.iter()) {
            *set = self.add(size);
        }
        sets
    }
}

/// Layout of every context set used by the derived context indices.
#[derive(Debug, Default, Clone)]
pub struct Ctx {
    /* partitioning */
    pub split_flag: CtxSet,
    pub split_qt_flag: CtxSet,
    pub split_hv_flag: CtxSet,
    pub split12_flag: CtxSet,

    /* coding unit */
    pub skip_flag: CtxSet,
    pub pred_mode: CtxSet,
    pub ibc_flag: CtxSet,
    pub mip_flag: CtxSet,

    /* merge */
    pub merge_flag: CtxSet,
    pub regular_merge_flag: CtxSet,
    pub merge_idx: CtxSet,
    pub mmvd_flag: CtxSet,
    pub mmvd_merge_idx: CtxSet,
    pub mmvd_step_mvp_idx: CtxSet,

    /* inter */
    pub inter_dir: CtxSet,
    pub affine_flag: CtxSet,
    pub affine_type: CtxSet,
    pub imv_flag: CtxSet,
    pub triangle_flag: CtxSet,
    pub gbi_idx: CtxSet,
    pub mvd: CtxSet,

    /* coded block flags */
    pub qt_root_cbf: CtxSet,
    pub qt_cbf: [CtxSet; 3],

    /* residual, indexed by channel type */
    pub sig_coeff_group: [CtxSet; MAX_NUM_CHANNEL_TYPE],
    /* (state set) * 2 + channel type */
    pub sig_flag: [CtxSet; 3 * MAX_NUM_CHANNEL_TYPE],
    pub par_flag: [CtxSet; MAX_NUM_CHANNEL_TYPE],
    /* (gt2 ? 0 : 2) + channel type */
    pub gtx_flag: [CtxSet; 2 * MAX_NUM_CHANNEL_TYPE],
    pub last_x: [CtxSet; MAX_NUM_CHANNEL_TYPE],
    pub last_y: [CtxSet; MAX_NUM_CHANNEL_TYPE],

    /* transform skip residual */
    pub ts_sig_coeff_group: CtxSet,
    pub ts_sig_flag: CtxSet,
    pub ts_par_flag: CtxSet,
    pub ts_gtx_flag: CtxSet,

    pub num_ctx: u32,
}

impl Ctx {
    fn new() -> Self {
        let mut s = CtxStore { next: 0 };
        let mut ctx = Ctx {
            split_flag: s.add(9),
            split_qt_flag: s.add(6),
            split_hv_flag: s.add(5),
            split12_flag: s.add(4),

            skip_flag: s.add(3),
            pred_mode: s.add(2),
            ibc_flag: s.add(3),
            mip_flag: s.add(4),

            merge_flag: s.add(1),
            regular_merge_flag: s.add(2),
            merge_idx: s.add(1),
            mmvd_flag: s.add(1),
            mmvd_merge_idx: s.add(1),
            mmvd_step_mvp_idx: s.add(1),

            inter_dir: s.add(6),
            affine_flag: s.add(3),
            affine_type: s.add(1),
            imv_flag: s.add(3),
            triangle_flag: s.add(3),
            gbi_idx: s.add(1),
            mvd: s.add(2),

            qt_root_cbf: s.add(1),
            qt_cbf: s.add_n(&[4, 5, 2]),

            sig_coeff_group: s.add_n(&[2, 2]),
            sig_flag: s.add_n(&[12, 8, 12, 8, 12, 8]),
            par_flag: s.add_n(&[21, 11]),
            gtx_flag: s.add_n(&[21, 11, 21, 11]),
            last_x: s.add_n(&[20, 3]),
            last_y: s.add_n(&[20, 3]),

            ts_sig_coeff_group: s.add(3),
            ts_sig_flag: s.add(3),
            ts_par_flag: s.add(1),
            ts_gtx_flag: s.add(4),

            num_ctx: 0,
        };
        ctx.num_ctx = s.next as u32;
        ctx
    }
}

lazy_static! {
    pub static ref CTX: Ctx = Ctx::new();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sets_are_disjoint_and_dense() {
        let ctx = &*CTX;
        let mut sets = vec![
            ctx.split_flag,
            ctx.split_qt_flag,
            ctx.split_hv_flag,
            ctx.split12_flag,
            ctx.skip_flag,
            ctx.pred_mode,
            ctx.ibc_flag,
            ctx.mip_flag,
            ctx.merge_flag,
            ctx.regular_merge_flag,
            ctx.merge_idx,
            ctx.mmvd_flag,
            ctx.mmvd_merge_idx,
            ctx.mmvd_step_mvp_idx,
            ctx.inter_dir,
            ctx.affine_flag,
            ctx.affine_type,
            ctx.imv_flag,
            ctx.triangle_flag,
            ctx.gbi_idx,
            ctx.mvd,
            ctx.qt_root_cbf,
            ctx.ts_sig_coeff_group,
            ctx.ts_sig_flag,
            ctx.ts_par_flag,
            ctx.ts_gtx_flag,
        ];
        sets.extend_from_slice(&ctx.qt_cbf);
        sets.extend_from_slice(&ctx.sig_coeff_group);
        sets.extend_from_slice(&ctx.sig_flag);
        sets.extend_from_slice(&ctx.par_flag);
        sets.extend_from_slice(&ctx.gtx_flag);
        sets.extend_from_slice(&ctx.last_x);
        sets.extend_from_slice(&ctx.last_y);

        sets.sort_by_key(|s| s.offset);
        let mut next = 0;
        for s in sets {
            assert_eq!(s.offset, next);
            assert!(s.size > 0);
            next += s.size;
        }
        assert_eq!(next as u32, ctx.num_ctx);
    }

    #[test]
    fn ctx_adds_offset() {
        let set = CtxSet { offset: 10, size: 3 };
        assert_eq!(set.ctx(0), 10);
        assert_eq!(set.ctx(2), 12);
    }
}
