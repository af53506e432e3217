use super::context::*;
use super::scan::*;
use super::tbl::*;
use super::tracer::*;
use super::util::*;
use super::*;

pub type TCoeff = i32;

/// Coding tool flags of one transform block.
#[derive(Debug, Clone, Copy)]
pub struct CoeffCodingParams {
    pub comp_id: ComponentId,
    pub sign_hiding: bool,
    /* transform skip context enabled and the block is bypassed or transform skipped */
    pub trafo_bypass: bool,
    pub bdpcm: bool,
    pub extended_precision: bool,
    pub max_log2_tr_dynamic_range: u32,
    pub scan_type: CoeffScanType,
}

impl CoeffCodingParams {
    pub fn new(comp_id: ComponentId, cfg: &ResidualConfig, transform_skip: bool) -> Self {
        CoeffCodingParams {
            comp_id,
            sign_hiding: cfg.sign_hiding,
            trafo_bypass: cfg.transform_skip_context && transform_skip,
            bdpcm: false,
            extended_precision: cfg.extended_precision,
            max_log2_tr_dynamic_range: cfg.max_log2_tr_dynamic_range
                [comp_id.to_channel_type() as usize],
            scan_type: cfg.scan_type,
        }
    }
}

/// Residual context state of one transform block. Geometry is fixed at
/// construction; only the sub-block state advances.
#[derive(Debug, Clone)]
pub struct CoeffCodingContext {
    comp_id: ComponentId,
    ch_type: ChannelType,
    width: u32,
    height: u32,
    log2_cg_width: u32,
    log2_cg_height: u32,
    log2_cg_size: u32,
    width_in_groups: u32,
    height_in_groups: u32,
    log2_block_width: u32,
    log2_block_height: u32,
    max_num_coeff: u32,
    sign_hiding: bool,
    extended_precision: bool,
    max_log2_tr_dynamic_range: u32,
    scan_type: CoeffScanType,
    scan: &'static [ScanElement],
    scan_cg: &'static [ScanElement],
    ctx_set_last_x: CtxSet,
    ctx_set_last_y: CtxSet,
    max_last_pos_x: u32,
    max_last_pos_y: u32,
    last_offset_x: i32,
    last_offset_y: i32,
    last_shift_x: i32,
    last_shift_y: i32,
    trafo_bypass: bool,
    bdpcm: bool,

    scan_pos_last: i32,
    sub_set_id: i32,
    sub_set_pos: i32,
    sub_set_pos_x: i32,
    sub_set_pos_y: i32,
    min_sub_pos: i32,
    max_sub_pos: i32,
    sig_group_ctx_id: u32,
    tmpl_cp_sum1: i32,
    tmpl_cp_diag: i32,
    sig_flag_ctx_set: [CtxSet; 3],
    par_flag_ctx_set: CtxSet,
    gtx_flag_ctx_set: [CtxSet; 2],
    sig_group_ctx_id_ts: u32,
    ts_sig_flag_ctx_set: CtxSet,
    ts_par_flag_ctx_set: CtxSet,
    ts_gtx_flag_ctx_set: CtxSet,
    /* one bit per coefficient group, raster order in the group grid */
    sig_coeff_group_flag: u64,
}

impl CoeffCodingContext {
    pub fn new(geom: &BlockGeometry, params: &CoeffCodingParams) -> Self {
        let ch_type = params.comp_id.to_channel_type();
        let ch = ch_type as usize;
        let (width, height) = (geom.width, geom.height);
        let (log2_block_width, log2_block_height) = (geom.log2_width, geom.log2_height);
        let [log2_cg_width, log2_cg_height] =
            LOG2_SBB_SIZE[log2_block_width as usize][log2_block_height as usize];
        let width_in_groups = width.min(ZERO_OUT_TH) >> log2_cg_width;
        let height_in_groups = height.min(ZERO_OUT_TH) >> log2_cg_height;
        let scan_type = params.scan_type;

        let scan = scan_order(
            ScanGrouping::SCAN_GROUPED_4x4,
            scan_type,
            log2_block_width,
            log2_block_height,
        );
        let scan_cg = scan_order(
            ScanGrouping::SCAN_UNGROUPED,
            scan_type,
            CONV_LOG2(width_in_groups),
            CONV_LOG2(height_in_groups),
        );

        let mut max_last_pos_x = GROUP_IDX[(width.min(ZERO_OUT_TH) - 1) as usize];
        let mut max_last_pos_y = GROUP_IDX[(height.min(ZERO_OUT_TH) - 1) as usize];
        let (mut log2_size_x, mut log2_size_y) = (log2_block_width, log2_block_height);
        let (mut size_x, mut size_y) = (width, height);
        if scan_type == CoeffScanType::SCAN_VER {
            std::mem::swap(&mut log2_size_x, &mut log2_size_y);
            std::mem::swap(&mut size_x, &mut size_y);
            std::mem::swap(&mut max_last_pos_x, &mut max_last_pos_y);
        }

        let (last_offset_x, last_offset_y, last_shift_x, last_shift_y) = match ch_type {
            ChannelType::CHROMA => (
                0,
                0,
                CLIP3(0, 2, (size_x >> 3) as i32),
                CLIP3(0, 2, (size_y >> 3) as i32),
            ),
            ChannelType::LUMA => (
                LAST_PREFIX_CTX[log2_size_x as usize],
                LAST_PREFIX_CTX[log2_size_y as usize],
                ((log2_size_x + 1) >> 2) as i32,
                ((log2_size_y + 1) >> 2) as i32,
            ),
        };

        let ctx = &*CTX;
        CoeffCodingContext {
            comp_id: params.comp_id,
            ch_type,
            width,
            height,
            log2_cg_width,
            log2_cg_height,
            log2_cg_size: log2_cg_width + log2_cg_height,
            width_in_groups,
            height_in_groups,
            log2_block_width,
            log2_block_height,
            max_num_coeff: width * height,
            sign_hiding: params.sign_hiding,
            extended_precision: params.extended_precision,
            max_log2_tr_dynamic_range: params.max_log2_tr_dynamic_range,
            scan_type,
            scan,
            scan_cg,
            ctx_set_last_x: ctx.last_x[ch],
            ctx_set_last_y: ctx.last_y[ch],
            max_last_pos_x,
            max_last_pos_y,
            last_offset_x,
            last_offset_y,
            last_shift_x,
            last_shift_y,
            trafo_bypass: params.trafo_bypass,
            bdpcm: params.bdpcm,

            scan_pos_last: -1,
            sub_set_id: -1,
            sub_set_pos: -1,
            sub_set_pos_x: -1,
            sub_set_pos_y: -1,
            min_sub_pos: -1,
            max_sub_pos: -1,
            sig_group_ctx_id: 0,
            tmpl_cp_sum1: -1,
            tmpl_cp_diag: -1,
            sig_flag_ctx_set: [
                ctx.sig_flag[ch],
                ctx.sig_flag[ch + 2],
                ctx.sig_flag[ch + 4],
            ],
            par_flag_ctx_set: ctx.par_flag[ch],
            gtx_flag_ctx_set: [ctx.gtx_flag[ch], ctx.gtx_flag[ch + 2]],
            sig_group_ctx_id_ts: 0,
            ts_sig_flag_ctx_set: ctx.ts_sig_flag,
            ts_par_flag_ctx_set: ctx.ts_par_flag,
            ts_gtx_flag_ctx_set: ctx.ts_gtx_flag,
            sig_coeff_group_flag: 0,
        }
    }

    /// Advances to sub-block `sub_set_id` (an index into the group scan) and
    /// derives its significance group contexts.
    pub fn init_subblock(&mut self, sub_set_id: usize, sig_group_flag: bool) {
        assert!(
            sub_set_id < self.num_groups(),
            "sub-block {} out of {} groups",
            sub_set_id,
            self.num_groups()
        );
        let wig = self.width_in_groups as i32;
        let hig = self.height_in_groups as i32;

        self.sub_set_id = sub_set_id as i32;
        self.sub_set_pos = self.scan_cg[sub_set_id].idx as i32;
        self.sub_set_pos_y = self.sub_set_pos / wig;
        self.sub_set_pos_x = self.sub_set_pos - self.sub_set_pos_y * wig;
        self.min_sub_pos = self.sub_set_id << self.log2_cg_size;
        self.max_sub_pos = self.min_sub_pos + (1 << self.log2_cg_size) - 1;
        if sig_group_flag {
            self.sig_coeff_group_flag |= 1u64 << self.sub_set_pos;
        }

        let (x, y, pos) = (self.sub_set_pos_x, self.sub_set_pos_y, self.sub_set_pos);
        let flags = self.sig_coeff_group_flag;
        let sig = |p: i32| (flags >> p) & 1 != 0;
        let sig_right = x + 1 < wig && sig(pos + 1);
        let sig_lower = y + 1 < hig && sig(pos + wig);
        self.sig_group_ctx_id = CTX.sig_coeff_group[self.ch_type as usize]
            .ctx((sig_right || sig_lower) as u32);

        let sig_left = x > 0 && sig(pos - 1);
        let sig_above = y > 0 && sig(pos - wig);
        self.sig_group_ctx_id_ts = CTX
            .ts_sig_coeff_group
            .ctx(sig_left as u32 + sig_above as u32);

        TRACE_COEF_CTX("sig_group", sub_set_id, self.sig_group_ctx_id);
    }

    /* geometry */
    pub fn comp_id(&self) -> ComponentId {
        self.comp_id
    }
    pub fn ch_type(&self) -> ChannelType {
        self.ch_type
    }
    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn log2_cg_width(&self) -> u32 {
        self.log2_cg_width
    }
    pub fn log2_cg_height(&self) -> u32 {
        self.log2_cg_height
    }
    pub fn log2_cg_size(&self) -> u32 {
        self.log2_cg_size
    }
    pub fn width_in_groups(&self) -> u32 {
        self.width_in_groups
    }
    pub fn height_in_groups(&self) -> u32 {
        self.height_in_groups
    }
    pub fn num_groups(&self) -> usize {
        (self.width_in_groups * self.height_in_groups) as usize
    }
    pub fn log2_block_width(&self) -> u32 {
        self.log2_block_width
    }
    pub fn log2_block_height(&self) -> u32 {
        self.log2_block_height
    }
    pub fn max_num_coeff(&self) -> u32 {
        self.max_num_coeff
    }
    pub fn scan_type(&self) -> CoeffScanType {
        self.scan_type
    }
    pub fn extended_precision(&self) -> bool {
        self.extended_precision
    }
    pub fn max_log2_tr_dynamic_range(&self) -> u32 {
        self.max_log2_tr_dynamic_range
    }
    pub fn trafo_bypass(&self) -> bool {
        self.trafo_bypass
    }
    pub fn bdpcm(&self) -> bool {
        self.bdpcm
    }

    /* scan */
    pub fn block_pos(&self, scan_pos: usize) -> usize {
        self.scan[scan_pos].idx as usize
    }
    pub fn pos_x(&self, scan_pos: usize) -> u32 {
        self.scan[scan_pos].x as u32
    }
    pub fn pos_y(&self, scan_pos: usize) -> u32 {
        self.scan[scan_pos].y as u32
    }
    pub fn scan(&self) -> &'static [ScanElement] {
        self.scan
    }
    pub fn scan_cg(&self) -> &'static [ScanElement] {
        self.scan_cg
    }

    /* last position */
    pub fn max_last_pos_x(&self) -> u32 {
        self.max_last_pos_x
    }
    pub fn max_last_pos_y(&self) -> u32 {
        self.max_last_pos_y
    }
    pub fn last_offset_x(&self) -> i32 {
        self.last_offset_x
    }
    pub fn last_offset_y(&self) -> i32 {
        self.last_offset_y
    }
    pub fn last_shift_x(&self) -> i32 {
        self.last_shift_x
    }
    pub fn last_shift_y(&self) -> i32 {
        self.last_shift_y
    }
    pub fn last_x_ctx_id(&self, pos_last_x: u32) -> u32 {
        self.ctx_set_last_x
            .ctx((self.last_offset_x + (pos_last_x as i32 >> self.last_shift_x)) as u32)
    }
    pub fn last_y_ctx_id(&self, pos_last_y: u32) -> u32 {
        self.ctx_set_last_y
            .ctx((self.last_offset_y + (pos_last_y as i32 >> self.last_shift_y)) as u32)
    }
    /// Number of fixed-length suffix bits following last position prefix `group`.
    pub fn last_suffix_len(group: u32) -> u32 {
        if group > 3 {
            (group - 2) >> 1
        } else {
            0
        }
    }
    /// Last significant coordinate from its prefix group and suffix value.
    pub fn last_pos_from_group(group: u32, suffix: u32) -> u32 {
        debug_assert!(suffix < (1 << Self::last_suffix_len(group)));
        MIN_IN_GROUP[group as usize] + suffix
    }
    pub fn scan_pos_last(&self) -> i32 {
        self.scan_pos_last
    }
    pub fn set_scan_pos_last(&mut self, pos_last: i32) {
        self.scan_pos_last = pos_last;
    }

    /* sub-block state */
    pub fn sub_set_id(&self) -> i32 {
        self.sub_set_id
    }
    pub fn sub_set_pos(&self) -> i32 {
        self.sub_set_pos
    }
    pub fn cg_pos_x(&self) -> i32 {
        self.sub_set_pos_x
    }
    pub fn cg_pos_y(&self) -> i32 {
        self.sub_set_pos_y
    }
    pub fn min_sub_pos(&self) -> i32 {
        self.min_sub_pos
    }
    pub fn max_sub_pos(&self) -> i32 {
        self.max_sub_pos
    }
    pub fn is_last(&self) -> bool {
        (self.scan_pos_last >> self.log2_cg_size) == self.sub_set_id
    }
    pub fn is_not_first(&self) -> bool {
        self.sub_set_id != 0
    }
    pub fn is_sig_group(&self, scan_pos_cg: usize) -> bool {
        (self.sig_coeff_group_flag >> self.scan_cg[scan_pos_cg].idx) & 1 != 0
    }
    pub fn is_sig_group_curr(&self) -> bool {
        (self.sig_coeff_group_flag >> self.sub_set_pos) & 1 != 0
    }
    pub fn set_sig_group(&mut self) {
        self.sig_coeff_group_flag |= 1u64 << self.sub_set_pos;
    }
    pub fn sig_group_ctx_id(&self) -> u32 {
        self.sig_group_ctx_id
    }
    pub fn sig_group_ctx_id_ts(&self) -> u32 {
        self.sig_group_ctx_id_ts
    }

    pub fn hide_sign(&self, pos_first: i32, pos_last: i32) -> bool {
        self.sign_hiding && pos_last - pos_first >= SBH_THRESHOLD
    }

    /// Raster offsets of the template neighbours of `(pos_x, pos_y)`:
    /// right, right+2, below-right, below, below+2.
    fn template<F: FnMut(TCoeff)>(&self, pos_x: u32, pos_y: u32, coeff: &[TCoeff], mut f: F) {
        let w = self.width as usize;
        let base = pos_x as usize + pos_y as usize * w;
        if pos_x + 1 < self.width {
            f(coeff[base + 1]);
            if pos_x + 2 < self.width {
                f(coeff[base + 2]);
            }
            if pos_y + 1 < self.height {
                f(coeff[base + w + 1]);
            }
        }
        if pos_y + 1 < self.height {
            f(coeff[base + w]);
            if pos_y + 2 < self.height {
                f(coeff[base + (w << 1)]);
            }
        }
    }

    /// Significance context of the coefficient at `scan_pos`, from up to five
    /// already coded neighbours. `state` is the dependent quantization state.
    pub fn sig_ctx_id_abs(&mut self, scan_pos: usize, coeff: &[TCoeff], state: i32) -> u32 {
        let pos_x = self.pos_x(scan_pos);
        let pos_y = self.pos_y(scan_pos);
        let diag = (pos_x + pos_y) as i32;
        let mut num_pos = 0;
        let mut sum_abs = 0;
        self.template(pos_x, pos_y, coeff, |c| {
            let a = c.abs();
            sum_abs += (4 + (a & 1)).min(a);
            num_pos += (a != 0) as i32;
        });

        let ctx_ofs = match self.ch_type {
            ChannelType::LUMA => {
                ((sum_abs + 1) >> 1).min(3)
                    + if diag < 2 {
                        8
                    } else if diag < 5 {
                        4
                    } else {
                        0
                    }
            }
            ChannelType::CHROMA => ((sum_abs + 1) >> 1).min(3) + if diag < 2 { 4 } else { 0 },
        };
        self.tmpl_cp_diag = diag;
        self.tmpl_cp_sum1 = sum_abs - num_pos;

        let ctx_id = self.sig_flag_ctx_set[(state - 1).max(0) as usize].ctx(ctx_ofs as u32);
        TRACE_COEF_CTX("sig", scan_pos, ctx_id);
        ctx_id
    }

    /// Offset of the parity and greater-than contexts, from the template
    /// recorded by the last `sig_ctx_id_abs`.
    pub fn ctx_offset_abs(&self) -> u8 {
        if self.tmpl_cp_diag == -1 {
            return 0;
        }
        let diag = self.tmpl_cp_diag;
        let mut offset = self.tmpl_cp_sum1.min(4) + 1;
        offset += match self.ch_type {
            ChannelType::LUMA if diag == 0 => 15,
            ChannelType::CHROMA if diag == 0 => 5,
            ChannelType::LUMA if diag < 3 => 10,
            ChannelType::LUMA if diag < 10 => 5,
            _ => 0,
        };
        offset as u8
    }

    pub fn par_ctx_id_abs(&self, offset: u8) -> u32 {
        self.par_flag_ctx_set.ctx(offset as u32)
    }

    pub fn greater1_ctx_id_abs(&self, offset: u8) -> u32 {
        self.gtx_flag_ctx_set[1].ctx(offset as u32)
    }

    pub fn greater2_ctx_id_abs(&self, offset: u8) -> u32 {
        self.gtx_flag_ctx_set[0].ctx(offset as u32)
    }

    /// Neighbourhood sum for Rice parameter derivation, clipped to [0, 31].
    pub fn template_abs_sum(&self, scan_pos: usize, coeff: &[TCoeff], base_level: i32) -> u32 {
        let mut sum = 0;
        self.template(self.pos_x(scan_pos), self.pos_y(scan_pos), coeff, |c| {
            sum += c.abs()
        });
        CLIP3(0, 31, sum - 5 * base_level) as u32
    }

    pub fn go_rice_par_abs(&self, sum_abs: u32) -> u32 {
        GO_RICE_PARS_COEFF[sum_abs.min(31) as usize]
    }

    /// Position above which remainders switch to zero-coded escape, per
    /// dependent quantization state.
    pub fn go_rice_pos_coeff0(&self, state: i32, rice_par: u32) -> u32 {
        (if state < 2 { 1 } else { 2 }) << rice_par
    }

    /* transform skip residual: left and above neighbours */
    pub fn sig_ctx_id_abs_ts(&self, scan_pos: usize, coeff: &[TCoeff]) -> u32 {
        let pos_x = self.pos_x(scan_pos) as usize;
        let pos_y = self.pos_y(scan_pos) as usize;
        let w = self.width as usize;
        let base = pos_x + pos_y * w;
        let mut num_pos = 0;
        if pos_x > 0 {
            num_pos += (coeff[base - 1] != 0) as u32;
        }
        if pos_y > 0 {
            num_pos += (coeff[base - w] != 0) as u32;
        }
        self.ts_sig_flag_ctx_set.ctx(num_pos)
    }

    pub fn par_ctx_id_abs_ts(&self) -> u32 {
        self.ts_par_flag_ctx_set.ctx(0)
    }

    pub fn greater_x_ctx_id_abs_ts(&self, offset: u8) -> u32 {
        self.ts_gtx_flag_ctx_set.ctx(offset as u32)
    }
}
