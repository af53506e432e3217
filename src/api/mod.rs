use std::fmt;

use thiserror::Error;

pub mod config;

pub use config::*;

/*****************************************************************************
 * return values and error code
 *****************************************************************************/
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CtxError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported block size {width}x{height}")]
    UnsupportedBlockSize { width: u32, height: u32 },
    #[error("block at ({x},{y}) lies outside the picture")]
    OutOfPicture { x: i32, y: i32 },
    #[error("block at ({x},{y}) overlaps an already finalized coding unit")]
    Overlap { x: i32, y: i32 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type CtxResult<T> = Result<T, CtxError>;

#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy)]
pub enum ChromaFormat {
    CF_400 = 0,
    CF_420 = 1,
    CF_422 = 2,
    CF_444 = 3,
}

impl Default for ChromaFormat {
    fn default() -> Self {
        ChromaFormat::CF_420
    }
}

impl ChromaFormat {
    /// Horizontal subsampling shift of the chroma planes.
    pub fn scale_x(self) -> u32 {
        match self {
            ChromaFormat::CF_420 | ChromaFormat::CF_422 => 1,
            _ => 0,
        }
    }

    /// Vertical subsampling shift of the chroma planes.
    pub fn scale_y(self) -> u32 {
        match self {
            ChromaFormat::CF_420 => 1,
            _ => 0,
        }
    }

    pub fn has_chroma(self) -> bool {
        self != ChromaFormat::CF_400
    }
}

impl fmt::Display for ChromaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::ChromaFormat::*;
        match self {
            CF_400 => write!(f, "4:0:0"),
            CF_420 => write!(f, "4:2:0"),
            CF_422 => write!(f, "4:2:2"),
            CF_444 => write!(f, "4:4:4"),
        }
    }
}
