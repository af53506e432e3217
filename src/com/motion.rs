use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

use super::util::*;
use super::*;

#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MvPrecision {
    MV_PRECISION_4PEL = 0,
    MV_PRECISION_INT = 2,
    MV_PRECISION_HALF = 3,
    MV_PRECISION_QUARTER = 4,
    MV_PRECISION_SIXTEENTH = 6,
}

/* motion vectors are stored in 1/16 sample units */
pub const MV_PRECISION_INTERNAL: MvPrecision = MvPrecision::MV_PRECISION_SIXTEENTH;

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Mv {
    pub hor: i32,
    pub ver: i32,
}

impl Mv {
    pub const fn new(hor: i32, ver: i32) -> Self {
        Mv { hor, ver }
    }

    pub fn is_zero(self) -> bool {
        self.hor == 0 && self.ver == 0
    }

    /// Rescales by a distance factor in 1/256 units, rounding to nearest with
    /// ties toward zero. The result is clipped to the storage range.
    pub fn scale_mv(self, scale: i32) -> Mv {
        let scale_comp = |v: i32| {
            let p = scale * v;
            CLIP3(MV_MIN, MV_MAX, (p + 127 + (p < 0) as i32) >> 8)
        };
        Mv::new(scale_comp(self.hor), scale_comp(self.ver))
    }

    /// Converts between sub-sample precisions. Lowering the precision rounds to
    /// the nearest value, ties toward zero.
    pub fn change_precision(&mut self, src: MvPrecision, dst: MvPrecision) {
        let shift = dst as i32 - src as i32;
        if shift >= 0 {
            self.hor <<= shift;
            self.ver <<= shift;
        } else {
            let right_shift = -shift;
            let offset = 1 << (right_shift - 1);
            let round = |v: i32| {
                if v >= 0 {
                    (v + offset - 1) >> right_shift
                } else {
                    (v + offset) >> right_shift
                }
            };
            self.hor = round(self.hor);
            self.ver = round(self.ver);
        }
    }

    pub fn clip_to_storage_bit_depth(&mut self) {
        self.hor = CLIP3(MV_MIN, MV_MAX, self.hor);
        self.ver = CLIP3(MV_MIN, MV_MAX, self.ver);
    }
}

impl Add for Mv {
    type Output = Mv;
    fn add(self, rhs: Mv) -> Mv {
        Mv::new(self.hor + rhs.hor, self.ver + rhs.ver)
    }
}

impl AddAssign for Mv {
    fn add_assign(&mut self, rhs: Mv) {
        self.hor += rhs.hor;
        self.ver += rhs.ver;
    }
}

impl Sub for Mv {
    type Output = Mv;
    fn sub(self, rhs: Mv) -> Mv {
        Mv::new(self.hor - rhs.hor, self.ver - rhs.ver)
    }
}

impl Neg for Mv {
    type Output = Mv;
    fn neg(self) -> Mv {
        Mv::new(-self.hor, -self.ver)
    }
}

impl fmt::Display for Mv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.hor, self.ver)
    }
}

/// Temporal distance scale factor in 1/256 units between the current
/// (`curr_poc` -> `curr_ref_poc`) and collocated (`col_poc` -> `col_ref_poc`) distances.
pub fn get_dist_scale_factor(
    curr_poc: i32,
    curr_ref_poc: i32,
    col_poc: i32,
    col_ref_poc: i32,
) -> i32 {
    let diff_poc_d = col_poc - col_ref_poc;
    let diff_poc_b = curr_poc - curr_ref_poc;
    if diff_poc_d == diff_poc_b {
        4096
    } else {
        let tdb = CLIP3(-128, 127, diff_poc_b);
        let tdd = CLIP3(-128, 127, diff_poc_d);
        let x = (0x4000 + (tdd / 2).abs()) / tdd;
        CLIP3(-4096, 4095, (tdb * x + 32) >> 6)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MvField {
    pub mv: Mv,
    pub ref_idx: i16,
}

impl Default for MvField {
    fn default() -> Self {
        MvField {
            mv: Mv::default(),
            ref_idx: NOT_VALID as i16,
        }
    }
}

impl MvField {
    pub fn new(mv: Mv, ref_idx: i16) -> Self {
        MvField { mv, ref_idx }
    }

    pub fn set_mv_field(&mut self, mv: Mv, ref_idx: i16) {
        self.mv = mv;
        self.ref_idx = ref_idx;
    }

    pub fn is_valid(&self) -> bool {
        self.ref_idx >= 0
    }
}

/// Stored motion of a finalized block.
#[derive(Debug, Default, Clone, Copy)]
pub struct MotionInfo {
    pub is_inter: bool,
    pub is_ibc: bool,
    pub inter_dir: u8,
    pub slice_idx: u32,
    pub mv: [Mv; NUM_REF_PIC_LIST_01],
    pub ref_idx: [i16; NUM_REF_PIC_LIST_01],
    /// Bi-prediction weight index, inherited by history-based candidates.
    pub gbi_idx: u8,
    pub bv: Mv,
}

impl PartialEq for MotionInfo {
    /// Only the lists selected by `inter_dir` take part in the comparison.
    /// The weight index does not.
    fn eq(&self, other: &Self) -> bool {
        if self.is_inter != other.is_inter || self.is_ibc != other.is_ibc {
            return false;
        }
        if self.is_inter {
            if self.slice_idx != other.slice_idx || self.inter_dir != other.inter_dir {
                return false;
            }
            if self.inter_dir != INTER_DIR_L1
                && (self.mv[0] != other.mv[0] || self.ref_idx[0] != other.ref_idx[0])
            {
                return false;
            }
            if self.inter_dir != INTER_DIR_L0
                && (self.mv[1] != other.mv[1] || self.ref_idx[1] != other.ref_idx[1])
            {
                return false;
            }
        }
        true
    }
}

pub const GBI_PARAM_REF_NUM: usize = 33;

const GBI_SENTINEL_MV: Mv = Mv::new(i16::MAX as i32, i16::MAX as i32);

/// Per (list, ref_idx) cache of uni-prediction results for generalized
/// bi-prediction search. Affine entries are further split by model, indexed
/// with `four_param` (1 for the 4-parameter model, 0 for 6-parameter).
///
/// Translational and affine entries carry independent read-only flags.
/// A distortion below zero marks an entry that has not been set.
#[derive(Debug, Clone)]
pub struct GbiMotionParam {
    read_only: [[bool; GBI_PARAM_REF_NUM]; 2],
    mv: [[Mv; GBI_PARAM_REF_NUM]; 2],
    dist: [[i32; GBI_PARAM_REF_NUM]; 2],

    read_only_affine: [[[bool; GBI_PARAM_REF_NUM]; 2]; 2],
    mv_affine: [[[[Mv; 3]; GBI_PARAM_REF_NUM]; 2]; 2],
    dist_affine: [[[i32; GBI_PARAM_REF_NUM]; 2]; 2],
    mvp_idx_affine: [[[i32; GBI_PARAM_REF_NUM]; 2]; 2],
}

impl Default for GbiMotionParam {
    fn default() -> Self {
        let mut param = GbiMotionParam {
            read_only: [[false; GBI_PARAM_REF_NUM]; 2],
            mv: [[Mv::default(); GBI_PARAM_REF_NUM]; 2],
            dist: [[0; GBI_PARAM_REF_NUM]; 2],
            read_only_affine: [[[false; GBI_PARAM_REF_NUM]; 2]; 2],
            mv_affine: [[[[Mv::default(); 3]; GBI_PARAM_REF_NUM]; 2]; 2],
            dist_affine: [[[0; GBI_PARAM_REF_NUM]; 2]; 2],
            mvp_idx_affine: [[[0; GBI_PARAM_REF_NUM]; 2]; 2],
        };
        param.reset();
        param
    }
}

impl GbiMotionParam {
    /// Translational motion resets to the sentinel, affine motion to zero.
    pub fn reset(&mut self) {
        for list in 0..2 {
            for r in 0..GBI_PARAM_REF_NUM {
                self.read_only[list][r] = false;
                self.mv[list][r] = GBI_SENTINEL_MV;
                self.dist[list][r] = -1;
                for p4 in 0..2 {
                    self.read_only_affine[p4][list][r] = false;
                    self.mv_affine[p4][list][r] = [Mv::default(); 3];
                    self.dist_affine[p4][list][r] = -1;
                    self.mvp_idx_affine[p4][list][r] = 0;
                }
            }
        }
    }

    pub fn set_read_mode(&mut self, read_only: bool, list: usize, ref_idx: usize) {
        self.read_only[list][ref_idx] = read_only;
    }

    pub fn is_read_mode(&self, list: usize, ref_idx: usize) -> bool {
        self.read_only[list][ref_idx]
    }

    pub fn set_read_mode_affine(
        &mut self,
        read_only: bool,
        list: usize,
        ref_idx: usize,
        four_param: bool,
    ) {
        self.read_only_affine[four_param as usize][list][ref_idx] = read_only;
    }

    pub fn is_read_mode_affine(&self, list: usize, ref_idx: usize, four_param: bool) -> bool {
        self.read_only_affine[four_param as usize][list][ref_idx]
    }

    /// Stored motion, the sentinel while unset.
    pub fn mv(&self, list: usize, ref_idx: usize) -> Mv {
        self.mv[list][ref_idx]
    }

    pub fn set_mv(&mut self, list: usize, ref_idx: usize, mv: Mv, dist: i32) {
        if !self.read_only[list][ref_idx] {
            self.mv[list][ref_idx] = mv;
            self.dist[list][ref_idx] = dist;
        }
    }

    /// Returns the cached motion and its distortion, or `None` while unset.
    pub fn get_mv(&self, list: usize, ref_idx: usize) -> Option<(Mv, i32)> {
        if self.dist[list][ref_idx] < 0 {
            None
        } else {
            Some((self.mv[list][ref_idx], self.dist[list][ref_idx]))
        }
    }

    /// One control point of the stored affine motion.
    pub fn affine_mv(&self, list: usize, ref_idx: usize, cp: usize, four_param: bool) -> Mv {
        self.mv_affine[four_param as usize][list][ref_idx][cp]
    }

    pub fn set_affine_mv(
        &mut self,
        list: usize,
        ref_idx: usize,
        four_param: bool,
        mv: [Mv; 3],
        dist: i32,
        mvp_idx: i32,
    ) {
        let p4 = four_param as usize;
        if !self.read_only_affine[p4][list][ref_idx] {
            self.mv_affine[p4][list][ref_idx] = mv;
            self.dist_affine[p4][list][ref_idx] = dist;
            self.mvp_idx_affine[p4][list][ref_idx] = mvp_idx;
        }
    }

    pub fn get_affine_mv(
        &self,
        list: usize,
        ref_idx: usize,
        four_param: bool,
    ) -> Option<([Mv; 3], i32, i32)> {
        let p4 = four_param as usize;
        if self.dist_affine[p4][list][ref_idx] < 0 {
            None
        } else {
            Some((
                self.mv_affine[p4][list][ref_idx],
                self.dist_affine[p4][list][ref_idx],
                self.mvp_idx_affine[p4][list][ref_idx],
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn change_precision_rounds_ties_toward_zero() {
        let mut mv = Mv::new(12, 4);
        mv.change_precision(MV_PRECISION_INTERNAL, MvPrecision::MV_PRECISION_INT);
        assert_eq!(mv, Mv::new(1, 0));

        let mut mv = Mv::new(8, -8);
        mv.change_precision(MV_PRECISION_INTERNAL, MvPrecision::MV_PRECISION_INT);
        assert_eq!(mv, Mv::new(0, 0));

        let mut mv = Mv::new(48, -32);
        mv.change_precision(MV_PRECISION_INTERNAL, MvPrecision::MV_PRECISION_INT);
        assert_eq!(mv, Mv::new(3, -2));

        mv.change_precision(MvPrecision::MV_PRECISION_INT, MvPrecision::MV_PRECISION_QUARTER);
        assert_eq!(mv, Mv::new(12, -8));
    }

    #[test]
    fn scale_mv_rounds_ties_toward_zero() {
        assert_eq!(Mv::new(4, -4).scale_mv(128), Mv::new(2, -2));
        assert_eq!(Mv::new(3, -3).scale_mv(128), Mv::new(1, -1));
        assert_eq!(Mv::new(7, -7).scale_mv(128), Mv::new(3, -3));
        assert_eq!(Mv::new(4, 0).scale_mv(-256), Mv::new(-4, 0));
        assert_eq!(Mv::new(MV_MAX, 0).scale_mv(4095).hor, MV_MAX);
    }

    #[test]
    fn dist_scale_factor() {
        assert_eq!(get_dist_scale_factor(8, 4, 8, 4), 4096);
        // half the distance
        assert_eq!(get_dist_scale_factor(8, 6, 8, 4), 128);
        // opposite direction, same magnitude
        assert_eq!(get_dist_scale_factor(8, 12, 8, 4), -256);
    }

    #[test]
    fn motion_info_ignores_unused_list() {
        let mut a = MotionInfo {
            is_inter: true,
            inter_dir: INTER_DIR_L0,
            mv: [Mv::new(1, 1), Mv::new(5, 5)],
            ref_idx: [0, 3],
            ..Default::default()
        };
        let b = MotionInfo {
            mv: [Mv::new(1, 1), Mv::new(9, 9)],
            ref_idx: [0, -1],
            ..a
        };
        assert_eq!(a, b);
        a.inter_dir = INTER_DIR_BI;
        assert_ne!(a, MotionInfo { inter_dir: INTER_DIR_BI, ..b });
    }

    #[test]
    fn motion_info_compares_slice() {
        let a = MotionInfo {
            is_inter: true,
            inter_dir: INTER_DIR_L0,
            mv: [Mv::new(4, -4), Mv::default()],
            ref_idx: [0, -1],
            ..Default::default()
        };
        assert_ne!(a, MotionInfo { slice_idx: 1, ..a });
        assert_eq!(a, MotionInfo { gbi_idx: 3, ..a });

        // intra motion carries no slice
        let intra = MotionInfo::default();
        assert_eq!(intra, MotionInfo { slice_idx: 1, ..intra });
    }

    #[test]
    fn gbi_param_sentinels() {
        let mut p = GbiMotionParam::default();
        assert_eq!(p.get_mv(0, 3), None);
        assert_eq!(p.mv(0, 3), Mv::new(i16::MAX as i32, i16::MAX as i32));
        p.set_mv(0, 3, Mv::new(4, 4), 100);
        assert_eq!(p.get_mv(0, 3), Some((Mv::new(4, 4), 100)));
        p.set_read_mode(true, 0, 3);
        p.set_mv(0, 3, Mv::new(8, 8), 50);
        assert_eq!(p.get_mv(0, 3), Some((Mv::new(4, 4), 100)));
        p.reset();
        assert_eq!(p.get_mv(0, 3), None);
        assert!(!p.is_read_mode(0, 3));
        assert_eq!(p.get_affine_mv(1, 32, true), None);
    }

    #[test]
    fn gbi_param_affine_models() {
        let mut p = GbiMotionParam::default();
        for &p4 in &[false, true] {
            for cp in 0..3 {
                assert_eq!(p.affine_mv(1, 5, cp, p4), Mv::default());
            }
            assert!(!p.is_read_mode_affine(1, 5, p4));
        }

        let cps = [Mv::new(1, 2), Mv::new(3, 4), Mv::new(5, 6)];
        p.set_affine_mv(1, 5, true, cps, 70, 1);
        assert_eq!(p.get_affine_mv(1, 5, true), Some((cps, 70, 1)));
        assert_eq!(p.get_affine_mv(1, 5, false), None);

        // translational read-only leaves affine writable
        p.set_read_mode(true, 1, 5);
        p.set_affine_mv(1, 5, false, cps, 90, 0);
        assert_eq!(p.get_affine_mv(1, 5, false), Some((cps, 90, 0)));

        p.set_read_mode_affine(true, 1, 5, true);
        p.set_affine_mv(1, 5, true, [Mv::default(); 3], 10, 0);
        assert_eq!(p.get_affine_mv(1, 5, true), Some((cps, 70, 1)));
        p.set_mv(1, 5, Mv::new(2, 2), 10);
        assert_eq!(p.get_mv(1, 5), None);

        p.reset();
        assert!(!p.is_read_mode_affine(1, 5, true));
        assert_eq!(p.get_affine_mv(1, 5, true), None);
        assert_eq!(p.affine_mv(1, 5, 2, true), Mv::default());
    }
}
