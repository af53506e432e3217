use log::*;

use super::*;

#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TreeType {
    /* luma and chroma share the coding tree */
    TREE_D = 0,
    /* separate luma tree */
    TREE_L = 1,
    /* separate chroma tree */
    TREE_C = 2,
}

impl Default for TreeType {
    fn default() -> Self {
        TreeType::TREE_D
    }
}

/// Decoded attributes of a finalized coding unit, as seen by its causal neighbours.
#[derive(Debug, Default, Clone)]
pub struct CodingUnitInfo {
    /* luma and chroma areas, each in its own sample grid */
    pub blocks: [Area; MAX_NUM_CHANNEL_TYPE],
    pub ch_type: ChannelType,
    pub tree_type: TreeType,
    pub qt_depth: u32,
    pub mt_depth: u32,
    pub pred_mode: PredMode,
    pub skip: bool,
    pub affine: bool,
    pub mip_flag: bool,
    pub triangle: bool,
    pub imv: u8,
    pub slice_idx: u32,
    pub tile_idx: u32,
}

impl CodingUnitInfo {
    pub fn new(luma_area: Area, chroma_format: ChromaFormat, tree_type: TreeType) -> Self {
        CodingUnitInfo {
            blocks: [
                luma_area,
                luma_area.to_channel(ChannelType::CHROMA, chroma_format),
            ],
            ch_type: if tree_type == TreeType::TREE_C {
                ChannelType::CHROMA
            } else {
                ChannelType::LUMA
            },
            tree_type,
            ..Default::default()
        }
    }

    pub fn luma_pos(&self) -> Position {
        self.blocks[ChannelType::LUMA as usize].pos()
    }

    pub fn chroma_pos(&self) -> Position {
        self.blocks[ChannelType::CHROMA as usize].pos()
    }

    pub fn luma_size(&self) -> Size {
        self.blocks[ChannelType::LUMA as usize].size()
    }

    pub fn is_ibc(&self) -> bool {
        self.pred_mode == PredMode::MODE_IBC
    }

    pub fn is_intra(&self) -> bool {
        self.pred_mode == PredMode::MODE_INTRA
    }

    pub fn covers(&self, ch_type: ChannelType) -> bool {
        match self.tree_type {
            TreeType::TREE_D => true,
            TreeType::TREE_L => ch_type == ChannelType::LUMA,
            TreeType::TREE_C => ch_type == ChannelType::CHROMA,
        }
    }
}

/// Read-only causal neighbour query over already finalized coding units.
pub trait CuLookup {
    /// Coding unit covering `pos` (in the sample grid of `ch_type`), if any
    /// has been finalized there.
    fn get_cu(&self, pos: Position, ch_type: ChannelType) -> Option<&CodingUnitInfo>;

    fn chroma_format(&self) -> ChromaFormat;

    fn ctu_size_log2(&self) -> u32;

    fn wavefronts_enabled(&self) -> bool {
        false
    }

    /// Like `get_cu`, but treats neighbours from another slice or tile as
    /// absent. With wavefronts, a neighbour in the CTU row above that lies in
    /// a later CTU column is absent as well.
    fn get_cu_restricted(
        &self,
        pos: Position,
        cur_pos: Position,
        cur_slice_idx: u32,
        cur_tile_idx: u32,
        ch_type: ChannelType,
    ) -> Option<&CodingUnitInfo> {
        let cu = self.get_cu(pos, ch_type)?;

        if self.wavefronts_enabled() {
            let x_shift = self.ctu_size_log2() - ch_type.scale_x(self.chroma_format());
            let y_shift = self.ctu_size_log2() - ch_type.scale_y(self.chroma_format());
            if (pos.y >> y_shift) < (cur_pos.y >> y_shift)
                && (pos.x >> x_shift) > (cur_pos.x >> x_shift)
            {
                return None;
            }
        }

        if cu.slice_idx == cur_slice_idx && cu.tile_idx == cur_tile_idx {
            Some(cu)
        } else {
            None
        }
    }

    fn get_cu_restricted_for(
        &self,
        pos: Position,
        cur: &CodingUnitInfo,
        ch_type: ChannelType,
    ) -> Option<&CodingUnitInfo> {
        self.get_cu_restricted(
            pos,
            cur.blocks[ch_type as usize].pos(),
            cur.slice_idx,
            cur.tile_idx,
            ch_type,
        )
    }
}

const UNIT_LOG2: u32 = MIN_CU_LOG2;

/// Arena of finalized coding units addressed through per channel 4x4 luma
/// unit grids. Units are only ever added; the grid is cleared per picture.
#[derive(Debug, Clone)]
pub struct CuMap {
    chroma_format: ChromaFormat,
    width: u32,
    height: u32,
    ctu_size_log2: u32,
    wavefronts: bool,
    map_width: usize,
    cus: Vec<CodingUnitInfo>,
    /* 0 = empty, otherwise index + 1 into cus */
    idx_map: [Vec<u32>; MAX_NUM_CHANNEL_TYPE],
}

impl CuMap {
    pub fn new(pic: &PictureConfig) -> Self {
        let map_width = ((pic.width + MIN_CU_SIZE - 1) >> UNIT_LOG2) as usize;
        let map_height = ((pic.height + MIN_CU_SIZE - 1) >> UNIT_LOG2) as usize;
        CuMap {
            chroma_format: pic.chroma_format,
            width: pic.width,
            height: pic.height,
            ctu_size_log2: pic.ctu_size_log2,
            wavefronts: pic.wavefronts,
            map_width,
            cus: Vec::new(),
            idx_map: [
                vec![0; map_width * map_height],
                vec![0; map_width * map_height],
            ],
        }
    }

    pub fn clear(&mut self) {
        self.cus.clear();
        for map in self.idx_map.iter_mut() {
            for v in map.iter_mut() {
                *v = 0;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cus.is_empty()
    }

    fn unit_range(&self, area: &Area) -> (usize, usize, usize, usize) {
        let x0 = (area.x as u32 >> UNIT_LOG2) as usize;
        let y0 = (area.y as u32 >> UNIT_LOG2) as usize;
        let x1 = ((area.x as u32 + area.width) >> UNIT_LOG2) as usize;
        let y1 = ((area.y as u32 + area.height) >> UNIT_LOG2) as usize;
        (x0, y0, x1, y1)
    }

    /// Registers a finalized coding unit and returns its arena index.
    pub fn add_cu(&mut self, cu: CodingUnitInfo) -> Result<usize, CtxError> {
        let area = cu.blocks[ChannelType::LUMA as usize];
        let aligned = |v: u32| v & (MIN_CU_SIZE - 1) == 0;

        if area.x < 0
            || area.y < 0
            || area.x as u32 + area.width > self.width
            || area.y as u32 + area.height > self.height
        {
            error!("coding unit {:?} outside {}x{}", area, self.width, self.height);
            return Err(CtxError::OutOfPicture {
                x: area.x,
                y: area.y,
            });
        }
        if area.width == 0
            || area.height == 0
            || !aligned(area.x as u32)
            || !aligned(area.y as u32)
            || !aligned(area.width)
            || !aligned(area.height)
        {
            error!("coding unit {:?} is not aligned to the 4x4 grid", area);
            return Err(CtxError::InvalidArgument(format!(
                "coding unit {:?} is not aligned to the 4x4 grid",
                area
            )));
        }
        if cu.tree_type == TreeType::TREE_C {
            ctx_assert_rv(
                self.chroma_format.has_chroma(),
                CtxError::InvalidArgument("chroma coding unit in a 4:0:0 picture".to_string()),
            )?;
        }

        let (x0, y0, x1, y1) = self.unit_range(&area);
        let channels = [ChannelType::LUMA, ChannelType::CHROMA];
        for &ch in channels.iter().filter(|&&ch| cu.covers(ch)) {
            let map = &self.idx_map[ch as usize];
            for y in y0..y1 {
                if map[y * self.map_width + x0..y * self.map_width + x1]
                    .iter()
                    .any(|&v| v != 0)
                {
                    error!("coding unit {:?} overlaps a finalized unit", area);
                    return Err(CtxError::Overlap {
                        x: area.x,
                        y: area.y,
                    });
                }
            }
        }

        let idx = self.cus.len();
        for &ch in channels.iter().filter(|&&ch| cu.covers(ch)) {
            let map = &mut self.idx_map[ch as usize];
            for y in y0..y1 {
                for v in map[y * self.map_width + x0..y * self.map_width + x1].iter_mut() {
                    *v = idx as u32 + 1;
                }
            }
        }
        debug!(
            "cu {} at {} {}x{} tree {:?}",
            idx,
            area.pos(),
            area.width,
            area.height,
            cu.tree_type
        );
        self.cus.push(cu);
        Ok(idx)
    }

    pub fn cu(&self, idx: usize) -> &CodingUnitInfo {
        &self.cus[idx]
    }
}

impl CuLookup for CuMap {
    fn get_cu(&self, pos: Position, ch_type: ChannelType) -> Option<&CodingUnitInfo> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        if ch_type == ChannelType::CHROMA && !self.chroma_format.has_chroma() {
            return None;
        }
        let lx = (pos.x as u32) << ch_type.scale_x(self.chroma_format);
        let ly = (pos.y as u32) << ch_type.scale_y(self.chroma_format);
        if lx >= self.width || ly >= self.height {
            return None;
        }
        let unit = (ly >> UNIT_LOG2) as usize * self.map_width + (lx >> UNIT_LOG2) as usize;
        match self.idx_map[ch_type as usize][unit] {
            0 => None,
            idx => Some(&self.cus[idx as usize - 1]),
        }
    }

    fn chroma_format(&self) -> ChromaFormat {
        self.chroma_format
    }

    fn ctu_size_log2(&self) -> u32 {
        self.ctu_size_log2
    }

    fn wavefronts_enabled(&self) -> bool {
        self.wavefronts
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pic(wavefronts: bool) -> PictureConfig {
        PictureConfig {
            width: 256,
            height: 256,
            chroma_format: ChromaFormat::CF_420,
            ctu_size_log2: 6,
            wavefronts,
        }
    }

    fn cu(x: i32, y: i32, w: u32, h: u32) -> CodingUnitInfo {
        CodingUnitInfo::new(Area::new(x, y, w, h), ChromaFormat::CF_420, TreeType::TREE_D)
    }

    #[test]
    fn lookup_in_both_channels() {
        let mut map = CuMap::new(&pic(false));
        let idx = map.add_cu(cu(16, 8, 16, 8)).unwrap();
        assert_eq!(idx, 0);
        assert!(map.get_cu(Position::new(31, 15), ChannelType::LUMA).is_some());
        assert!(map.get_cu(Position::new(32, 15), ChannelType::LUMA).is_none());
        // same unit in the 4:2:0 chroma grid
        assert!(map.get_cu(Position::new(8, 4), ChannelType::CHROMA).is_some());
        assert!(map.get_cu(Position::new(-1, 4), ChannelType::CHROMA).is_none());
    }

    #[test]
    fn dual_tree_units_stay_in_their_channel() {
        let mut map = CuMap::new(&pic(false));
        map.add_cu(CodingUnitInfo::new(
            Area::new(0, 0, 16, 16),
            ChromaFormat::CF_420,
            TreeType::TREE_L,
        ))
        .unwrap();
        assert!(map.get_cu(Position::new(0, 0), ChannelType::CHROMA).is_none());
        let c = CodingUnitInfo::new(
            Area::new(0, 0, 16, 16),
            ChromaFormat::CF_420,
            TreeType::TREE_C,
        );
        assert_eq!(c.ch_type, ChannelType::CHROMA);
        map.add_cu(c).unwrap();
        assert!(map.get_cu(Position::new(0, 0), ChannelType::CHROMA).is_some());
    }

    #[test]
    fn rejects_overlap_and_out_of_picture() {
        let mut map = CuMap::new(&pic(false));
        map.add_cu(cu(0, 0, 16, 16)).unwrap();
        assert_eq!(map.add_cu(cu(8, 8, 8, 8)), Err(CtxError::Overlap { x: 8, y: 8 }));
        assert_eq!(
            map.add_cu(cu(248, 0, 16, 16)),
            Err(CtxError::OutOfPicture { x: 248, y: 0 })
        );
        assert!(matches!(
            map.add_cu(cu(2, 32, 8, 8)),
            Err(CtxError::InvalidArgument(_))
        ));
        assert_eq!(map.len(), 1);
        map.clear();
        assert!(map.is_empty());
        assert!(map.add_cu(cu(8, 8, 8, 8)).is_ok());
    }

    #[test]
    fn slice_and_tile_boundaries() {
        let mut map = CuMap::new(&pic(false));
        let mut left = cu(0, 0, 8, 8);
        left.slice_idx = 1;
        map.add_cu(left).unwrap();
        let mut above = cu(8, 0, 8, 8);
        above.tile_idx = 2;
        map.add_cu(above).unwrap();

        let cur = Position::new(8, 8);
        let restricted = |p: Position, s, t| {
            map.get_cu_restricted(p, cur, s, t, ChannelType::LUMA)
                .is_some()
        };
        assert!(!restricted(Position::new(7, 8), 0, 0));
        assert!(restricted(Position::new(7, 0), 1, 0));
        assert!(!restricted(Position::new(8, 7), 1, 0));
        assert!(restricted(Position::new(8, 7), 0, 2));
    }

    #[test]
    fn wavefront_hides_above_right_ctu() {
        for &wpp in [false, true].iter() {
            let mut map = CuMap::new(&pic(wpp));
            map.add_cu(cu(64, 0, 64, 64)).unwrap();
            map.add_cu(cu(0, 0, 64, 64)).unwrap();
            let cur = Position::new(60, 64);
            let above_right =
                map.get_cu_restricted(Position::new(64, 63), cur, 0, 0, ChannelType::LUMA);
            assert_eq!(above_right.is_some(), !wpp);
            let above = map.get_cu_restricted(Position::new(60, 63), cur, 0, 0, ChannelType::LUMA);
            assert!(above.is_some());
        }
    }
}
