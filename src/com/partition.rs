use log::*;

use super::*;

#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PartSplit {
    CTU_LEVEL = 0,
    CU_QUAD_SPLIT = 1,
    CU_HORZ_SPLIT = 2,
    CU_VERT_SPLIT = 3,
    CU_TRIH_SPLIT = 4,
    CU_TRIV_SPLIT = 5,
    CU_DONT_SPLIT = 6,
}

/* indices into the split legality vector returned by can_split */
pub const SPLIT_NO: usize = 0;
pub const SPLIT_QT: usize = 1;
pub const SPLIT_BT_H: usize = 2;
pub const SPLIT_BT_V: usize = 3;
pub const SPLIT_TT_H: usize = 4;
pub const SPLIT_TT_V: usize = 5;

#[derive(Debug, Clone)]
struct PartLevel {
    split: PartSplit,
    parts: Vec<Area>,
    idx: usize,
    /* depths of the parts of this level */
    qt_depth: u32,
    mt_depth: u32,
    implicit_bt_depth: u32,
}

fn split_area(area: Area, split: PartSplit) -> Vec<Area> {
    let (x, y, w, h) = (area.x, area.y, area.width, area.height);
    match split {
        PartSplit::CU_QUAD_SPLIT => {
            let (hw, hh) = (w >> 1, h >> 1);
            vec![
                Area::new(x, y, hw, hh),
                Area::new(x + hw as i32, y, hw, hh),
                Area::new(x, y + hh as i32, hw, hh),
                Area::new(x + hw as i32, y + hh as i32, hw, hh),
            ]
        }
        PartSplit::CU_HORZ_SPLIT => vec![
            Area::new(x, y, w, h >> 1),
            Area::new(x, y + (h >> 1) as i32, w, h >> 1),
        ],
        PartSplit::CU_VERT_SPLIT => vec![
            Area::new(x, y, w >> 1, h),
            Area::new(x + (w >> 1) as i32, y, w >> 1, h),
        ],
        PartSplit::CU_TRIH_SPLIT => {
            let q = h >> 2;
            vec![
                Area::new(x, y, w, q),
                Area::new(x, y + q as i32, w, 2 * q),
                Area::new(x, y + 3 * q as i32, w, q),
            ]
        }
        PartSplit::CU_TRIV_SPLIT => {
            let q = w >> 2;
            vec![
                Area::new(x, y, q, h),
                Area::new(x + q as i32, y, 2 * q, h),
                Area::new(x + 3 * q as i32, y, q, h),
            ]
        }
        PartSplit::CTU_LEVEL | PartSplit::CU_DONT_SPLIT => vec![area],
    }
}

/// QTBT/TT coding tree walker. Areas are kept in luma samples; the block of
/// the tree's channel type is derived on demand.
#[derive(Debug, Clone)]
pub struct Partitioner {
    cfg: PartitionConfig,
    pic_width: u32,
    pic_height: u32,
    chroma_format: ChromaFormat,
    pub ch_type: ChannelType,
    pub tree_type: TreeType,
    stack: Vec<PartLevel>,
}

impl Partitioner {
    pub fn new(cfg: &Config, tree_type: TreeType) -> Self {
        Partitioner {
            cfg: cfg.partition,
            pic_width: cfg.picture.width,
            pic_height: cfg.picture.height,
            chroma_format: cfg.picture.chroma_format,
            ch_type: if tree_type == TreeType::TREE_C {
                ChannelType::CHROMA
            } else {
                ChannelType::LUMA
            },
            tree_type,
            stack: Vec::new(),
        }
    }

    pub fn init_ctu(&mut self, ctu_area: Area) {
        self.stack.clear();
        self.stack.push(PartLevel {
            split: PartSplit::CTU_LEVEL,
            parts: vec![ctu_area],
            idx: 0,
            qt_depth: 0,
            mt_depth: 0,
            implicit_bt_depth: 0,
        });
    }

    fn level(&self) -> &PartLevel {
        self.stack
            .last()
            .expect("partitioner used before init_ctu")
    }

    /// Current area in luma samples.
    pub fn curr_area(&self) -> Area {
        let level = self.level();
        level.parts[level.idx]
    }

    /// Current area in the sample grid of the tree's channel type.
    pub fn curr_block(&self) -> Area {
        self.curr_area().to_channel(self.ch_type, self.chroma_format)
    }

    pub fn curr_part_idx(&self) -> usize {
        self.level().idx
    }

    pub fn curr_depth(&self) -> u32 {
        self.stack.len() as u32 - 1
    }

    pub fn curr_qt_depth(&self) -> u32 {
        self.level().qt_depth
    }

    pub fn curr_mt_depth(&self) -> u32 {
        self.level().mt_depth
    }

    pub fn curr_implicit_bt_depth(&self) -> u32 {
        self.level().implicit_bt_depth
    }

    pub fn split_curr_area(&mut self, split: PartSplit) {
        assert!(
            split != PartSplit::CTU_LEVEL && split != PartSplit::CU_DONT_SPLIT,
            "{:?} is not a split",
            split
        );
        let area = self.curr_area();
        let implicit = self.implicit_split();
        let level = self.level();
        let (mut qt_depth, mut mt_depth, mut implicit_bt_depth) =
            (level.qt_depth, level.mt_depth, level.implicit_bt_depth);

        match split {
            PartSplit::CU_QUAD_SPLIT => qt_depth += 1,
            _ => {
                mt_depth += 1;
                if split == implicit {
                    implicit_bt_depth += 1;
                }
            }
        }

        debug!("split {} {}x{} {:?}", area.pos(), area.width, area.height, split);
        self.stack.push(PartLevel {
            split,
            parts: split_area(area, split),
            idx: 0,
            qt_depth,
            mt_depth,
            implicit_bt_depth,
        });
    }

    /// Advances to the next part of the current split; false once all parts were visited.
    pub fn next_part(&mut self) -> bool {
        let level = self
            .stack
            .last_mut()
            .expect("partitioner used before init_ctu");
        if level.idx + 1 < level.parts.len() {
            level.idx += 1;
            true
        } else {
            false
        }
    }

    pub fn exit_curr_split(&mut self) {
        assert!(self.stack.len() > 1, "no split to exit");
        self.stack.pop();
    }

    fn in_picture(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.pic_width && (y as u32) < self.pic_height
    }

    /// Forced split for areas crossing the bottom or right picture boundary.
    pub fn implicit_split(&self) -> PartSplit {
        let area = self.curr_area();
        let is_bl_in_pic = self.in_picture(area.x, area.bottom());
        let is_tr_in_pic = self.in_picture(area.right(), area.y);
        if is_bl_in_pic && is_tr_in_pic {
            return PartSplit::CU_DONT_SPLIT;
        }

        let min_qt_size = self.cfg.min_qt_size[self.ch_type as usize];
        let max_btd = self.cfg.max_mtt_depth + self.curr_implicit_bt_depth();
        let is_bt_allowed = area.width <= self.cfg.max_bt_size
            && area.height <= self.cfg.max_bt_size
            && self.curr_mt_depth() < max_btd;
        let is_qt_allowed =
            area.width > min_qt_size && area.height > min_qt_size && self.curr_mt_depth() == 0;

        let mut split = if !is_bl_in_pic && !is_tr_in_pic && is_qt_allowed {
            PartSplit::CU_QUAD_SPLIT
        } else if !is_bl_in_pic && is_bt_allowed && area.width <= MAX_TB_SIZEY {
            PartSplit::CU_HORZ_SPLIT
        } else if !is_tr_in_pic && is_bt_allowed && area.height <= MAX_TB_SIZEY {
            PartSplit::CU_VERT_SPLIT
        } else {
            PartSplit::CU_QUAD_SPLIT
        };

        if self.tree_type != TreeType::TREE_D
            && (area.width > MAX_TB_SIZEY || area.height > MAX_TB_SIZEY)
        {
            split = PartSplit::CU_QUAD_SPLIT;
        }
        split
    }

    /// Legality of `[no split, QT, BT hor, BT ver, TT hor, TT ver]` at the current node.
    pub fn can_split(&self) -> [bool; 6] {
        let mut can = [true; 6];
        let implicit = self.implicit_split();

        let cfg = &self.cfg;
        let max_btd = cfg.max_mtt_depth + self.curr_implicit_bt_depth();
        let min_qt_size = cfg.min_qt_size[self.ch_type as usize];
        let mut can_btt = self.curr_mt_depth() < max_btd;

        let area = self.curr_area();
        let area_c = if self.ch_type == ChannelType::CHROMA {
            Some(self.curr_block())
        } else {
            None
        };

        let level = self.level();
        let last_split = level.split;
        let parl_split = if last_split == PartSplit::CU_TRIH_SPLIT {
            PartSplit::CU_HORZ_SPLIT
        } else {
            PartSplit::CU_VERT_SPLIT
        };

        // no QT below a multi-type split
        if last_split != PartSplit::CTU_LEVEL && last_split != PartSplit::CU_QUAD_SPLIT {
            can[SPLIT_QT] = false;
        }
        if area.width <= min_qt_size {
            can[SPLIT_QT] = false;
        }
        if let Some(c) = area_c {
            if c.width <= MIN_DUALTREE_CHROMA_WIDTH {
                can[SPLIT_QT] = false;
            }
        }

        if implicit != PartSplit::CU_DONT_SPLIT {
            can[SPLIT_NO] = false;
            can[SPLIT_TT_H] = false;
            can[SPLIT_TT_V] = false;
            can[SPLIT_BT_H] = implicit == PartSplit::CU_HORZ_SPLIT;
            can[SPLIT_BT_V] = implicit == PartSplit::CU_VERT_SPLIT;
            if let Some(c) = area_c {
                if c.width == 4 {
                    can[SPLIT_BT_V] = false;
                }
            }
            if !can[SPLIT_BT_H] && !can[SPLIT_BT_V] && !can[SPLIT_QT] {
                can[SPLIT_QT] = true;
            }
            return can;
        }

        // the middle part of a TT may not be split in the same direction by a BT
        if (last_split == PartSplit::CU_TRIH_SPLIT || last_split == PartSplit::CU_TRIV_SPLIT)
            && level.idx == 1
        {
            can[SPLIT_BT_H] = parl_split != PartSplit::CU_HORZ_SPLIT;
            can[SPLIT_BT_V] = parl_split != PartSplit::CU_VERT_SPLIT;
        }

        if can_btt
            && (area.width <= cfg.min_bt_size && area.height <= cfg.min_bt_size)
            && (area.width <= cfg.min_tt_size && area.height <= cfg.min_tt_size)
        {
            can_btt = false;
        }
        if can_btt
            && (area.width > cfg.max_bt_size || area.height > cfg.max_bt_size)
            && (area.width > cfg.max_tt_size || area.height > cfg.max_tt_size)
        {
            can_btt = false;
        }

        if !can_btt {
            can[SPLIT_BT_H] = false;
            can[SPLIT_BT_V] = false;
            can[SPLIT_TT_H] = false;
            can[SPLIT_TT_V] = false;
            return can;
        }

        if area.width > cfg.max_bt_size || area.height > cfg.max_bt_size {
            can[SPLIT_BT_H] = false;
            can[SPLIT_BT_V] = false;
        }

        if area.height <= cfg.min_bt_size
            || (area.width > MAX_TB_SIZEY && area.height <= MAX_TB_SIZEY)
        {
            can[SPLIT_BT_H] = false;
        }
        if area.width <= cfg.min_bt_size
            || (area.width <= MAX_TB_SIZEY && area.height > MAX_TB_SIZEY)
        {
            can[SPLIT_BT_V] = false;
        }
        if area.height <= 2 * cfg.min_tt_size
            || area.height > cfg.max_tt_size
            || area.width > cfg.max_tt_size
            || area.width > MAX_TB_SIZEY
            || area.height > MAX_TB_SIZEY
        {
            can[SPLIT_TT_H] = false;
        }
        if area.width <= 2 * cfg.min_tt_size
            || area.width > cfg.max_tt_size
            || area.height > cfg.max_tt_size
            || area.width > MAX_TB_SIZEY
            || area.height > MAX_TB_SIZEY
        {
            can[SPLIT_TT_V] = false;
        }

        if let Some(c) = area_c {
            let size = c.width * c.height;
            if size <= MIN_DUALTREE_CHROMA_SIZE {
                can[SPLIT_BT_H] = false;
                can[SPLIT_BT_V] = false;
            }
            if c.width == 4 {
                can[SPLIT_BT_V] = false;
            }
            if size <= MIN_DUALTREE_CHROMA_SIZE * 2 {
                can[SPLIT_TT_H] = false;
                can[SPLIT_TT_V] = false;
            }
            if c.width == 8 {
                can[SPLIT_TT_V] = false;
            }
        }

        can
    }
}
