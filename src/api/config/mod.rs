use log::*;

use crate::api::*;
use crate::com::CoeffScanType;

pub const MAX_CTU_SIZE_LOG2: u32 = 7;
pub const MIN_CTU_SIZE_LOG2: u32 = 4;

// Picture level settings shared by every block of the picture.
#[derive(Clone, Copy, Debug)]
pub struct PictureConfig {
    // Width of the luma plane in samples.
    pub width: u32,
    // Height of the luma plane in samples.
    pub height: u32,
    pub chroma_format: ChromaFormat,
    // log2 of the CTU size in luma samples.
    pub ctu_size_log2: u32,
    // Entropy coding sync (WPP). Neighbours in the CTU row above that lie in a
    // later CTU column are unavailable.
    pub wavefronts: bool,
}

impl Default for PictureConfig {
    fn default() -> Self {
        PictureConfig {
            width: 1920,
            height: 1080,
            chroma_format: ChromaFormat::CF_420,
            ctu_size_log2: 7,
            wavefronts: false,
        }
    }
}

// Partitioning limits, all sizes in luma samples.
#[derive(Clone, Copy, Debug)]
pub struct PartitionConfig {
    // minimum QT leaf size per channel type (luma, chroma)
    pub min_qt_size: [u32; 2],
    pub max_bt_size: u32,
    pub max_tt_size: u32,
    pub min_bt_size: u32,
    pub min_tt_size: u32,
    pub max_mtt_depth: u32,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        PartitionConfig {
            min_qt_size: [8, 8],
            max_bt_size: 128,
            max_tt_size: 64,
            min_bt_size: 4,
            min_tt_size: 4,
            max_mtt_depth: 3,
        }
    }
}

// Residual coding tools.
#[derive(Clone, Copy, Debug)]
pub struct ResidualConfig {
    pub sign_hiding: bool,
    pub transform_skip_context: bool,
    pub extended_precision: bool,
    // per channel type (luma, chroma)
    pub max_log2_tr_dynamic_range: [u32; 2],
    pub scan_type: CoeffScanType,
}

impl Default for ResidualConfig {
    fn default() -> Self {
        ResidualConfig {
            sign_hiding: true,
            transform_skip_context: false,
            extended_precision: false,
            max_log2_tr_dynamic_range: [15, 15],
            scan_type: CoeffScanType::SCAN_DIAG,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    pub picture: PictureConfig,
    pub partition: PartitionConfig,
    pub residual: ResidualConfig,
}

fn invalid(msg: String) -> CtxError {
    error!("{}", msg);
    CtxError::InvalidConfig(msg)
}

impl Config {
    pub fn ctu_size(&self) -> u32 {
        1 << self.picture.ctu_size_log2
    }

    pub fn validate(&self) -> Result<(), CtxError> {
        let pic = &self.picture;
        let part = &self.partition;

        if pic.width == 0 || pic.height == 0 {
            return Err(invalid(format!(
                "picture size {}x{} is empty",
                pic.width, pic.height
            )));
        }
        if pic.ctu_size_log2 < MIN_CTU_SIZE_LOG2 || pic.ctu_size_log2 > MAX_CTU_SIZE_LOG2 {
            return Err(invalid(format!(
                "ctu size 1<<{} outside [{}, {}]",
                pic.ctu_size_log2,
                1 << MIN_CTU_SIZE_LOG2,
                1 << MAX_CTU_SIZE_LOG2
            )));
        }

        let ctu = self.ctu_size();
        let sizes = [
            ("min_qt_size[luma]", part.min_qt_size[0]),
            ("min_qt_size[chroma]", part.min_qt_size[1]),
            ("max_bt_size", part.max_bt_size),
            ("max_tt_size", part.max_tt_size),
            ("min_bt_size", part.min_bt_size),
            ("min_tt_size", part.min_tt_size),
        ];
        for &(name, size) in sizes.iter() {
            if !size.is_power_of_two() || size < 4 || size > ctu {
                return Err(invalid(format!(
                    "{} = {} must be a power of two in [4, {}]",
                    name, size, ctu
                )));
            }
        }
        if part.min_bt_size > part.max_bt_size {
            return Err(invalid(format!(
                "min_bt_size {} exceeds max_bt_size {}",
                part.min_bt_size, part.max_bt_size
            )));
        }
        if part.min_tt_size > part.max_tt_size {
            return Err(invalid(format!(
                "min_tt_size {} exceeds max_tt_size {}",
                part.min_tt_size, part.max_tt_size
            )));
        }

        for &range in self.residual.max_log2_tr_dynamic_range.iter() {
            if range < 15 || range > 22 {
                return Err(invalid(format!(
                    "max_log2_tr_dynamic_range {} outside [15, 22]",
                    range
                )));
            }
        }

        debug!(
            "config: {}x{} {} ctu {} wpp {}",
            pic.width, pic.height, pic.chroma_format, ctu, pic.wavefronts
        );
        Ok(())
    }
}
