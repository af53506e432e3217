pub mod coeff_ctx;
pub mod context;
pub mod derive_ctx;
pub mod merge_ctx;
pub mod motion;
pub mod neighbor;
pub mod partition;
pub mod scan;
pub mod tbl;
pub(crate) mod tracer;
pub(crate) mod util;

pub use coeff_ctx::*;
pub use context::*;
pub use derive_ctx::*;
pub use merge_ctx::*;
pub use motion::*;
pub use neighbor::*;
pub use partition::*;
pub use scan::*;

use crate::api::*;

use std::fmt;

#[inline]
pub(crate) fn ctx_assert_rv(x: bool, r: CtxError) -> Result<(), CtxError> {
    if !x {
        debug_assert!(x, "{}", r);
        return Err(r);
    }
    Ok(())
}

/*****************************************************************************
 * block geometry limits
 *****************************************************************************/
/* largest CU / CTU in luma samples */
pub const MAX_CU_DEPTH: usize = 7;
pub const MAX_CU_SIZE: u32 = 1 << MAX_CU_DEPTH;
/* smallest CU in luma samples */
pub const MIN_CU_LOG2: u32 = 2;
pub const MIN_CU_SIZE: u32 = 1 << MIN_CU_LOG2;

/* largest transform block */
pub const MAX_TB_LOG2: u32 = 6;
pub const MAX_TB_SIZEY: u32 = 1 << MAX_TB_LOG2;
/* coefficients beyond this size are zeroed out */
pub const ZERO_OUT_TH: u32 = 32;
pub const MAX_TU_COEFF: usize = (MAX_TB_SIZEY * MAX_TB_SIZEY) as usize;

/* dual tree chroma limits, in chroma samples */
pub const MIN_DUALTREE_CHROMA_WIDTH: u32 = 4;
pub const MIN_DUALTREE_CHROMA_SIZE: u32 = 16;

/* first/last significant coefficient distance enabling sign hiding */
pub const SBH_THRESHOLD: i32 = 4;

/*****************************************************************************
 * inter prediction
 *****************************************************************************/
pub const NOT_VALID: i32 = -1;

pub const REF_PIC_LIST_0: usize = 0;
pub const REF_PIC_LIST_1: usize = 1;
pub const NUM_REF_PIC_LIST_01: usize = 2;
pub const MAX_NUM_REF: usize = 16;

pub const MRG_MAX_NUM_CANDS: usize = 6;

/* MMVD (START) */
pub const MMVD_REFINE_STEP: usize = 8;
pub const MMVD_MAX_REFINE_NUM: usize = MMVD_REFINE_STEP * 4;
pub const MMVD_BASE_MV_NUM: usize = 2;
pub const MMVD_ADD_NUM: usize = MMVD_MAX_REFINE_NUM * MMVD_BASE_MV_NUM;
/* MMVD (END) */

pub const MV_FRACTIONAL_BITS_INTERNAL: i32 = 4;
pub const MV_FRACTIONAL_BITS_SIGNAL: i32 = 2;
pub const MV_FRACTIONAL_BITS_DIFF: i32 = MV_FRACTIONAL_BITS_INTERNAL - MV_FRACTIONAL_BITS_SIGNAL;

/* motion vector storage bit depth */
pub const MV_BITS: i32 = 18;
pub const MV_MAX: i32 = (1 << (MV_BITS - 1)) - 1;
pub const MV_MIN: i32 = -(1 << (MV_BITS - 1));

pub const GBI_NUM: u8 = 5;
pub const GBI_DEFAULT: u8 = GBI_NUM >> 1;

/* inter direction: bitmask of the used lists */
pub const INTER_DIR_NONE: u8 = 0;
pub const INTER_DIR_L0: u8 = 1;
pub const INTER_DIR_L1: u8 = 2;
pub const INTER_DIR_BI: u8 = 3;

/*****************************************************************************
 * enums
 *****************************************************************************/
#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy)]
pub enum ChannelType {
    LUMA = 0,
    CHROMA = 1,
}

pub const MAX_NUM_CHANNEL_TYPE: usize = 2;

impl Default for ChannelType {
    fn default() -> Self {
        ChannelType::LUMA
    }
}

impl ChannelType {
    pub fn scale_x(self, chroma_format: ChromaFormat) -> u32 {
        match self {
            ChannelType::LUMA => 0,
            ChannelType::CHROMA => chroma_format.scale_x(),
        }
    }

    pub fn scale_y(self, chroma_format: ChromaFormat) -> u32 {
        match self {
            ChannelType::LUMA => 0,
            ChannelType::CHROMA => chroma_format.scale_y(),
        }
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy)]
pub enum ComponentId {
    Y = 0,
    CB = 1,
    CR = 2,
}

impl Default for ComponentId {
    fn default() -> Self {
        ComponentId::Y
    }
}

impl ComponentId {
    pub fn to_channel_type(self) -> ChannelType {
        match self {
            ComponentId::Y => ChannelType::LUMA,
            _ => ChannelType::CHROMA,
        }
    }

    pub fn is_luma(self) -> bool {
        self == ComponentId::Y
    }

    pub fn is_chroma(self) -> bool {
        self != ComponentId::Y
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy)]
pub enum CoeffScanType {
    SCAN_DIAG = 0,
    SCAN_HOR = 1,
    SCAN_VER = 2,
}

pub const SCAN_NUMBER_OF_TYPES: usize = 3;

impl Default for CoeffScanType {
    fn default() -> Self {
        CoeffScanType::SCAN_DIAG
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PredMode {
    MODE_INTER = 0,
    MODE_INTRA = 1,
    MODE_IBC = 2,
}

impl Default for PredMode {
    fn default() -> Self {
        PredMode::MODE_INTRA
    }
}

#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MergeType {
    MRG_TYPE_DEFAULT_N = 0,
    MRG_TYPE_SUBPU_ATMVP = 1,
    MRG_TYPE_IBC = 2,
}

impl Default for MergeType {
    fn default() -> Self {
        MergeType::MRG_TYPE_DEFAULT_N
    }
}

/*****************************************************************************
 * geometry
 *****************************************************************************/
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Position {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Area {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Area {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Area {
            x,
            y,
            width,
            height,
        }
    }

    pub fn pos(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32 - 1
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32 - 1
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.bottom()
    }

    /// Rescales a luma area to the sample grid of `ch_type`.
    pub fn to_channel(&self, ch_type: ChannelType, chroma_format: ChromaFormat) -> Area {
        let sx = ch_type.scale_x(chroma_format);
        let sy = ch_type.scale_y(chroma_format);
        Area::new(self.x >> sx, self.y >> sy, self.width >> sx, self.height >> sy)
    }
}

/// Transform block dimensions, validated once at the boundary of the core.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct BlockGeometry {
    pub width: u32,
    pub height: u32,
    pub log2_width: u32,
    pub log2_height: u32,
}

impl BlockGeometry {
    pub fn new(width: u32, height: u32) -> Result<Self, CtxError> {
        let ok = |v: u32| v.is_power_of_two() && v <= MAX_TB_SIZEY;
        if !ok(width) || !ok(height) {
            log::error!("unsupported transform block {}x{}", width, height);
            return Err(CtxError::UnsupportedBlockSize { width, height });
        }
        Ok(BlockGeometry {
            width,
            height,
            log2_width: util::CONV_LOG2(width),
            log2_height: util::CONV_LOG2(height),
        })
    }

    pub fn num_coeff(&self) -> usize {
        (self.width * self.height) as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn block_geometry_rejects_odd_sizes() {
        assert!(BlockGeometry::new(4, 4).is_ok());
        assert_eq!(
            BlockGeometry::new(12, 4),
            Err(CtxError::UnsupportedBlockSize {
                width: 12,
                height: 4
            })
        );
        assert!(BlockGeometry::new(128, 4).is_err());
        assert!(BlockGeometry::new(0, 4).is_err());
    }

    #[test]
    fn block_geometry_log2() {
        let g = BlockGeometry::new(32, 8).unwrap();
        assert_eq!((g.log2_width, g.log2_height), (5, 3));
        assert_eq!(g.num_coeff(), 256);
    }

    #[test]
    fn area_to_chroma() {
        let a = Area::new(64, 32, 16, 8);
        assert_eq!(
            a.to_channel(ChannelType::CHROMA, ChromaFormat::CF_420),
            Area::new(32, 16, 8, 4)
        );
        assert_eq!(
            a.to_channel(ChannelType::CHROMA, ChromaFormat::CF_422),
            Area::new(32, 32, 8, 8)
        );
        assert_eq!(a.to_channel(ChannelType::LUMA, ChromaFormat::CF_420), a);
    }
}
