use log::*;
use std::fmt;

use super::motion::*;
use super::tbl::*;
use super::tracer::*;
use super::*;

/*****************************************************************************
 * slice
 *****************************************************************************/
/// Reference picture state of the current slice as seen by merge resolution.
#[derive(Debug, Clone)]
pub struct SliceContext {
    pub poc: i32,
    pub ref_poc: [[i32; MAX_NUM_REF]; NUM_REF_PIC_LIST_01],
    pub long_term: [[bool; MAX_NUM_REF]; NUM_REF_PIC_LIST_01],
    /* fractional MMVD distances disabled */
    pub dis_frac_mmvd: bool,
}

impl SliceContext {
    pub fn new(poc: i32) -> Self {
        SliceContext {
            poc,
            ref_poc: [[0; MAX_NUM_REF]; NUM_REF_PIC_LIST_01],
            long_term: [[false; MAX_NUM_REF]; NUM_REF_PIC_LIST_01],
            dis_frac_mmvd: false,
        }
    }

    pub fn set_ref(
        &mut self,
        list: usize,
        ref_idx: usize,
        poc: i32,
        long_term: bool,
    ) -> Result<(), CtxError> {
        if list >= NUM_REF_PIC_LIST_01 || ref_idx >= MAX_NUM_REF {
            return Err(CtxError::InvalidArgument(format!(
                "reference L{}[{}] out of range",
                list, ref_idx
            )));
        }
        self.ref_poc[list][ref_idx] = poc;
        self.long_term[list][ref_idx] = long_term;
        Ok(())
    }

    pub fn ref_poc(&self, list: usize, ref_idx: i16) -> i32 {
        self.ref_poc[list][ref_idx as usize]
    }

    pub fn is_long_term(&self, list: usize, ref_idx: i16) -> bool {
        self.long_term[list][ref_idx as usize]
    }
}

/*****************************************************************************
 * prediction unit
 *****************************************************************************/
/// Motion of one prediction unit, filled once by merge or MMVD resolution.
/// `luma_size`, `is_ibc`, `mh_intra_flag` and `triangle` describe the coding
/// unit and are set by the caller beforehand.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionUnit {
    pub luma_size: Size,
    pub is_ibc: bool,
    pub mh_intra_flag: bool,
    pub triangle: bool,

    pub inter_dir: u8,
    pub mv: [Mv; NUM_REF_PIC_LIST_01],
    pub mvd: [Mv; NUM_REF_PIC_LIST_01],
    pub ref_idx: [i16; NUM_REF_PIC_LIST_01],
    pub mvp_idx: [i32; NUM_REF_PIC_LIST_01],
    pub mvp_num: [i32; NUM_REF_PIC_LIST_01],
    pub merge_flag: bool,
    pub mmvd_merge_flag: bool,
    pub regular_merge_flag: bool,
    pub merge_idx: usize,
    pub mmvd_merge_idx: usize,
    pub merge_type: MergeType,
    pub bv: Mv,
    pub gbi_idx: u8,
}

impl PredictionUnit {
    pub fn new(luma_size: Size) -> Self {
        PredictionUnit {
            luma_size,
            is_ibc: false,
            mh_intra_flag: false,
            triangle: false,
            inter_dir: INTER_DIR_NONE,
            mv: [Mv::default(); NUM_REF_PIC_LIST_01],
            mvd: [Mv::default(); NUM_REF_PIC_LIST_01],
            ref_idx: [NOT_VALID as i16; NUM_REF_PIC_LIST_01],
            mvp_idx: [NOT_VALID; NUM_REF_PIC_LIST_01],
            mvp_num: [NOT_VALID; NUM_REF_PIC_LIST_01],
            merge_flag: false,
            mmvd_merge_flag: false,
            regular_merge_flag: false,
            merge_idx: 0,
            mmvd_merge_idx: 0,
            merge_type: MergeType::MRG_TYPE_DEFAULT_N,
            bv: Mv::default(),
            gbi_idx: GBI_DEFAULT,
        }
    }

    /// Motion as stored for later neighbours.
    pub fn motion_info(&self, slice_idx: u32) -> MotionInfo {
        MotionInfo {
            is_inter: !self.is_ibc && self.inter_dir != INTER_DIR_NONE,
            is_ibc: self.is_ibc,
            inter_dir: self.inter_dir,
            slice_idx,
            mv: self.mv,
            ref_idx: self.ref_idx,
            gbi_idx: self.gbi_idx,
            bv: self.bv,
        }
    }
}

impl fmt::Display for PredictionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dir {} L0 {}/{} L1 {}/{} gbi {}",
            self.inter_dir, self.mv[0], self.ref_idx[0], self.mv[1], self.ref_idx[1], self.gbi_idx
        )?;
        if self.is_ibc {
            write!(f, " bv {}", self.bv)?;
        }
        Ok(())
    }
}

/// Rule that may demote a resolved bi-predicted unit to list 0.
pub trait BiPredRestriction {
    fn is_restricted(&self, pu: &PredictionUnit) -> bool;

    fn restrict(&self, pu: &mut PredictionUnit) {
        if self.is_restricted(pu) && pu.inter_dir == INTER_DIR_BI {
            pu.inter_dir = INTER_DIR_L0;
            pu.ref_idx[REF_PIC_LIST_1] = NOT_VALID as i16;
            pu.mv[REF_PIC_LIST_1] = Mv::default();
            pu.gbi_idx = GBI_DEFAULT;
        }
    }
}

/// No bi-prediction for 4x4, 4x8 and 8x4 luma blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmallBlockBiPredRestriction;

impl BiPredRestriction for SmallBlockBiPredRestriction {
    fn is_restricted(&self, pu: &PredictionUnit) -> bool {
        let Size { width, height } = pu.luma_size;
        (width == 4 && height == 4) || width + height == 12
    }
}

/*****************************************************************************
 * mmvd index
 *****************************************************************************/
/// Position of an MMVD candidate: base candidate, distance step and direction.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct MmvdIdx {
    pub group: usize,
    pub base_idx: usize,
    pub step: usize,
    pub position: usize,
}

impl MmvdIdx {
    pub fn decompose(idx: usize) -> Self {
        let group = idx / (MMVD_BASE_MV_NUM * MMVD_MAX_REFINE_NUM);
        let rem = idx - group * (MMVD_BASE_MV_NUM * MMVD_MAX_REFINE_NUM);
        let base_idx = rem / MMVD_MAX_REFINE_NUM;
        let rem = rem - base_idx * MMVD_MAX_REFINE_NUM;
        let step = rem / 4;
        MmvdIdx {
            group,
            base_idx,
            step,
            position: rem - step * 4,
        }
    }

    pub fn compose(&self) -> usize {
        (self.group * MMVD_BASE_MV_NUM + self.base_idx) * MMVD_MAX_REFINE_NUM
            + self.step * 4
            + self.position
    }

    /// Signed offset in internal units.
    pub fn offset(&self, dis_frac_mmvd: bool) -> Mv {
        let mut dist = MMVD_REF_CANDS[self.step];
        if dis_frac_mmvd {
            dist <<= 2;
        }
        match self.position {
            0 => Mv::new(dist, 0),
            1 => Mv::new(-dist, 0),
            2 => Mv::new(0, dist),
            _ => Mv::new(0, -dist),
        }
    }
}

/*****************************************************************************
 * merge candidates
 *****************************************************************************/
/// Merge candidate list of one prediction unit plus the MMVD base vectors
/// taken from it.
#[derive(Debug, Clone)]
pub struct MergeCtx {
    pub mv_field_neighbours: [MvField; MRG_MAX_NUM_CANDS << 1],
    pub inter_dir_neighbours: [u8; MRG_MAX_NUM_CANDS],
    pub gbi_idx: [u8; MRG_MAX_NUM_CANDS],
    pub mrg_type_neighbours: [MergeType; MRG_MAX_NUM_CANDS],
    pub num_valid_merge_cand: usize,
    pub mmvd_base_mv: [[MvField; NUM_REF_PIC_LIST_01]; MMVD_BASE_MV_NUM],
}

impl Default for MergeCtx {
    fn default() -> Self {
        MergeCtx {
            mv_field_neighbours: [MvField::default(); MRG_MAX_NUM_CANDS << 1],
            inter_dir_neighbours: [INTER_DIR_NONE; MRG_MAX_NUM_CANDS],
            gbi_idx: [GBI_DEFAULT; MRG_MAX_NUM_CANDS],
            mrg_type_neighbours: [MergeType::MRG_TYPE_DEFAULT_N; MRG_MAX_NUM_CANDS],
            num_valid_merge_cand: 0,
            mmvd_base_mv: [[MvField::default(); NUM_REF_PIC_LIST_01]; MMVD_BASE_MV_NUM],
        }
    }
}

impl MergeCtx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a candidate; the list holds at most `MRG_MAX_NUM_CANDS`.
    pub fn push_candidate(
        &mut self,
        inter_dir: u8,
        fields: [MvField; NUM_REF_PIC_LIST_01],
        merge_type: MergeType,
        gbi_idx: u8,
    ) -> Result<usize, CtxError> {
        let idx = self.num_valid_merge_cand;
        if idx >= MRG_MAX_NUM_CANDS {
            return Err(CtxError::InvalidArgument(format!(
                "merge list already holds {} candidates",
                MRG_MAX_NUM_CANDS
            )));
        }
        if inter_dir > INTER_DIR_BI || gbi_idx >= GBI_NUM {
            return Err(CtxError::InvalidArgument(format!(
                "bad merge candidate: inter dir {} gbi {}",
                inter_dir, gbi_idx
            )));
        }
        if let Some(f) = fields
            .iter()
            .find(|f| f.ref_idx < NOT_VALID as i16 || f.ref_idx >= MAX_NUM_REF as i16)
        {
            return Err(CtxError::InvalidArgument(format!(
                "bad merge candidate: ref idx {} out of range",
                f.ref_idx
            )));
        }
        self.mv_field_neighbours[idx << 1] = fields[REF_PIC_LIST_0];
        self.mv_field_neighbours[(idx << 1) + 1] = fields[REF_PIC_LIST_1];
        self.inter_dir_neighbours[idx] = inter_dir;
        self.mrg_type_neighbours[idx] = merge_type;
        self.gbi_idx[idx] = gbi_idx;
        self.num_valid_merge_cand += 1;
        Ok(idx)
    }

    /// Takes the first `MMVD_BASE_MV_NUM` regular candidates as MMVD bases.
    /// A candidate without valid motion still occupies a base slot, stored
    /// as an invalid pair.
    pub fn derive_mmvd_base_mv(&mut self) {
        let mut curr_base_num = 0;
        for k in 0..self.num_valid_merge_cand {
            if self.mrg_type_neighbours[k] != MergeType::MRG_TYPE_DEFAULT_N {
                continue;
            }
            let l0 = self.mv_field_neighbours[k << 1];
            let l1 = self.mv_field_neighbours[(k << 1) + 1];
            self.mmvd_base_mv[curr_base_num] = [
                if l0.is_valid() { l0 } else { MvField::default() },
                if l1.is_valid() { l1 } else { MvField::default() },
            ];
            curr_base_num += 1;
            if curr_base_num == MMVD_BASE_MV_NUM {
                break;
            }
        }
    }

    fn candidate_gbi(&self, cand_idx: usize) -> u8 {
        if self.inter_dir_neighbours[cand_idx] == INTER_DIR_BI {
            self.gbi_idx[cand_idx]
        } else {
            GBI_DEFAULT
        }
    }

    /// Resolves regular merge candidate `cand_idx` into `pu`.
    pub fn set_merge_info<R: BiPredRestriction>(
        &self,
        pu: &mut PredictionUnit,
        cand_idx: usize,
        restriction: &R,
    ) {
        assert!(
            cand_idx < self.num_valid_merge_cand,
            "merge candidate {} does not exist ({} valid)",
            cand_idx,
            self.num_valid_merge_cand
        );
        pu.regular_merge_flag = !(pu.mh_intra_flag || pu.triangle);
        pu.merge_flag = true;
        pu.mmvd_merge_flag = false;
        pu.inter_dir = self.inter_dir_neighbours[cand_idx];
        pu.merge_idx = cand_idx;
        pu.merge_type = self.mrg_type_neighbours[cand_idx];
        for list in 0..NUM_REF_PIC_LIST_01 {
            let field = self.mv_field_neighbours[(cand_idx << 1) + list];
            pu.mv[list] = field.mv;
            pu.ref_idx[list] = field.ref_idx;
            pu.mvd[list] = Mv::default();
            pu.mvp_idx[list] = NOT_VALID;
            pu.mvp_num[list] = NOT_VALID;
        }
        if pu.is_ibc {
            pu.bv = pu.mv[REF_PIC_LIST_0];
            pu.bv
                .change_precision(MV_PRECISION_INTERNAL, MvPrecision::MV_PRECISION_INT);
        }
        pu.gbi_idx = self.candidate_gbi(cand_idx);

        restriction.restrict(pu);
        TRACE_MERGE("merge", cand_idx, &*pu);
    }

    /// Resolves MMVD candidate `cand_idx`: a base vector plus a signalled
    /// offset, mirrored or scaled onto the second list.
    pub fn set_mmvd_merge_cand_info<R: BiPredRestriction>(
        &self,
        pu: &mut PredictionUnit,
        cand_idx: usize,
        slice: &SliceContext,
        restriction: &R,
    ) {
        assert!(
            cand_idx < MMVD_ADD_NUM,
            "mmvd candidate {} out of range",
            cand_idx
        );
        let pos = MmvdIdx::decompose(cand_idx);
        let offset = pos.offset(slice.dis_frac_mmvd);
        let base = self.mmvd_base_mv[pos.base_idx];
        let ref_l0 = base[REF_PIC_LIST_0].ref_idx;
        let ref_l1 = base[REF_PIC_LIST_1].ref_idx;

        let mut temp_mv = [Mv::default(); NUM_REF_PIC_LIST_01];
        if ref_l0 >= 0 && ref_l1 >= 0 {
            let curr_poc = slice.poc;
            let poc0 = slice.ref_poc(REF_PIC_LIST_0, ref_l0);
            let poc1 = slice.ref_poc(REF_PIC_LIST_1, ref_l1);
            let long_term = slice.is_long_term(REF_PIC_LIST_0, ref_l0)
                || slice.is_long_term(REF_PIC_LIST_1, ref_l1);
            let same_side = (poc1 - curr_poc) * (poc0 - curr_poc) > 0;

            /* the list farther from the current picture takes the raw offset */
            let (far, near, scale) = if poc0 - curr_poc == poc1 - curr_poc {
                (REF_PIC_LIST_0, REF_PIC_LIST_1, None)
            } else if (poc1 - curr_poc).abs() > (poc0 - curr_poc).abs() {
                (
                    REF_PIC_LIST_1,
                    REF_PIC_LIST_0,
                    Some(get_dist_scale_factor(curr_poc, poc0, curr_poc, poc1)),
                )
            } else {
                (
                    REF_PIC_LIST_0,
                    REF_PIC_LIST_1,
                    Some(get_dist_scale_factor(curr_poc, poc1, curr_poc, poc0)),
                )
            };
            temp_mv[far] = offset;
            temp_mv[near] = match scale {
                None => offset,
                Some(_) if long_term => {
                    if same_side {
                        offset
                    } else {
                        -offset
                    }
                }
                Some(scale) => offset.scale_mv(scale),
            };

            pu.inter_dir = INTER_DIR_BI;
            for list in 0..NUM_REF_PIC_LIST_01 {
                pu.mv[list] = base[list].mv + temp_mv[list];
                pu.ref_idx[list] = base[list].ref_idx;
            }
        } else if ref_l0 >= 0 || ref_l1 >= 0 {
            let (list, other, dir) = if ref_l0 >= 0 {
                (REF_PIC_LIST_0, REF_PIC_LIST_1, INTER_DIR_L0)
            } else {
                (REF_PIC_LIST_1, REF_PIC_LIST_0, INTER_DIR_L1)
            };
            pu.inter_dir = dir;
            pu.mv[list] = base[list].mv + offset;
            pu.ref_idx[list] = base[list].ref_idx;
            pu.mv[other] = Mv::default();
            pu.ref_idx[other] = NOT_VALID as i16;
        } else {
            // motion of pu is left as it was
            debug!("mmvd base {} has no motion", pos.base_idx);
        }

        pu.mmvd_merge_flag = true;
        pu.mmvd_merge_idx = cand_idx;
        pu.merge_flag = true;
        pu.regular_merge_flag = false;
        pu.merge_idx = cand_idx;
        pu.merge_type = MergeType::MRG_TYPE_DEFAULT_N;
        for list in 0..NUM_REF_PIC_LIST_01 {
            pu.mvd[list] = Mv::default();
            pu.mvp_idx[list] = NOT_VALID;
            pu.mvp_num[list] = NOT_VALID;
        }
        pu.gbi_idx = self.candidate_gbi(pos.base_idx);

        for list in 0..NUM_REF_PIC_LIST_01 {
            if pu.ref_idx[list] >= 0 {
                pu.mv[list].clip_to_storage_bit_depth();
            }
        }

        restriction.restrict(pu);
        TRACE_MERGE("mmvd", cand_idx, &*pu);
    }
}
