use super::tbl::*;
use super::*;

/// One entry of a scan table: raster index plus its coordinates.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct ScanElement {
    pub idx: u32,
    pub x: u16,
    pub y: u16,
}

#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ScanGrouping {
    /* plain scan over a w x h grid */
    SCAN_UNGROUPED = 0,
    /* coefficient groups in scan order, coefficients in scan order inside each group */
    SCAN_GROUPED_4x4 = 1,
}

const NUM_SCAN_SIZES: usize = MAX_TB_LOG2 as usize + 1;

/// Walks a `block_width x block_height` grid in the given scan order, emitting
/// raster indices with the given stride.
struct ScanGenerator {
    line: u32,
    column: u32,
    block_width: u32,
    block_height: u32,
    stride: u32,
    scan_type: CoeffScanType,
}

impl ScanGenerator {
    fn new(block_width: u32, block_height: u32, stride: u32, scan_type: CoeffScanType) -> Self {
        ScanGenerator {
            line: 0,
            column: 0,
            block_width,
            block_height,
            stride,
            scan_type,
        }
    }

    fn current_x(&self) -> u32 {
        self.column
    }

    fn current_y(&self) -> u32 {
        self.line
    }

    fn next_index(&mut self, offset_x: u32, offset_y: u32) -> u32 {
        let rtn = (self.line + offset_y) * self.stride + self.column + offset_x;

        match self.scan_type {
            CoeffScanType::SCAN_DIAG => {
                if self.column == self.block_width - 1 || self.line == 0 {
                    // end of an anti-diagonal, start the next one on the left edge
                    self.line += self.column + 1;
                    self.column = 0;
                    if self.line >= self.block_height {
                        self.column += self.line - (self.block_height - 1);
                        self.line = self.block_height - 1;
                    }
                } else {
                    self.column += 1;
                    self.line -= 1;
                }
            }
            CoeffScanType::SCAN_HOR => {
                if self.column < self.block_width - 1 {
                    self.column += 1;
                } else {
                    self.line += 1;
                    self.column = 0;
                }
            }
            CoeffScanType::SCAN_VER => {
                if self.line < self.block_height - 1 {
                    self.line += 1;
                } else {
                    self.column += 1;
                    self.line = 0;
                }
            }
        }

        rtn
    }
}

fn element(raster: u32, width: u32) -> ScanElement {
    let y = raster / width;
    ScanElement {
        idx: raster,
        x: (raster - y * width) as u16,
        y: y as u16,
    }
}

fn build_ungrouped(scan_type: CoeffScanType, width: u32, height: u32) -> Box<[ScanElement]> {
    let total = width * height;
    let mut scan = ScanGenerator::new(width, height, width, scan_type);
    (0..total)
        .map(|_| element(scan.next_index(0, 0), width))
        .collect::<Vec<_>>()
        .into_boxed_slice()
}

fn build_grouped(scan_type: CoeffScanType, width: u32, height: u32) -> Box<[ScanElement]> {
    let log2w = util::CONV_LOG2(width) as usize;
    let log2h = util::CONV_LOG2(height) as usize;
    let [log2_cg_width, log2_cg_height] = LOG2_SBB_SIZE[log2w][log2h];
    let group_width = 1 << log2_cg_width;
    let group_height = 1 << log2_cg_height;
    let width_in_groups = width.min(ZERO_OUT_TH) >> log2_cg_width;
    let height_in_groups = height.min(ZERO_OUT_TH) >> log2_cg_height;
    let group_size = group_width * group_height;
    let total_groups = width_in_groups * height_in_groups;

    let total = (width * height) as usize;
    let mut table = Vec::with_capacity(total);
    let mut visited = vec![false; total];

    let mut full_block_scan = ScanGenerator::new(width_in_groups, height_in_groups, 0, scan_type);
    for _ in 0..total_groups {
        let group_offset_x = full_block_scan.current_x() * group_width;
        let group_offset_y = full_block_scan.current_y() * group_height;

        let mut group_scan = ScanGenerator::new(group_width, group_height, width, scan_type);
        for _ in 0..group_size {
            let raster = group_scan.next_index(group_offset_x, group_offset_y);
            visited[raster as usize] = true;
            table.push(element(raster, width));
        }

        full_block_scan.next_index(0, 0);
    }

    // zeroed-out region, never reached by the residual syntax
    for raster in 0..total {
        if !visited[raster] {
            table.push(element(raster as u32, width));
        }
    }

    table.into_boxed_slice()
}

lazy_static! {
    static ref SCAN_ORDER: Vec<Box<[ScanElement]>> = {
        let types = [
            CoeffScanType::SCAN_DIAG,
            CoeffScanType::SCAN_HOR,
            CoeffScanType::SCAN_VER,
        ];
        let mut tables =
            Vec::with_capacity(2 * SCAN_NUMBER_OF_TYPES * NUM_SCAN_SIZES * NUM_SCAN_SIZES);
        for &grouping in [ScanGrouping::SCAN_UNGROUPED, ScanGrouping::SCAN_GROUPED_4x4].iter() {
            for &scan_type in types.iter() {
                for log2w in 0..NUM_SCAN_SIZES {
                    for log2h in 0..NUM_SCAN_SIZES {
                        let (w, h) = (1 << log2w, 1 << log2h);
                        tables.push(match grouping {
                            ScanGrouping::SCAN_UNGROUPED => build_ungrouped(scan_type, w, h),
                            ScanGrouping::SCAN_GROUPED_4x4 => build_grouped(scan_type, w, h),
                        });
                    }
                }
            }
        }
        tables
    };
}

/// Returns the scan table for a `(1 << log2_width) x (1 << log2_height)` grid.
pub fn scan_order(
    grouping: ScanGrouping,
    scan_type: CoeffScanType,
    log2_width: u32,
    log2_height: u32,
) -> &'static [ScanElement] {
    assert!(
        (log2_width as usize) < NUM_SCAN_SIZES && (log2_height as usize) < NUM_SCAN_SIZES,
        "no scan table for log2 size {}x{}",
        log2_width,
        log2_height
    );
    let idx = (((grouping as usize) * SCAN_NUMBER_OF_TYPES + scan_type as usize) * NUM_SCAN_SIZES
        + log2_width as usize)
        * NUM_SCAN_SIZES
        + log2_height as usize;
    &SCAN_ORDER[idx]
}
