use super::*;

/* coefficient group shape [log2 width][log2 height] -> (log2 cg width, log2 cg height) */
#[rustfmt::skip]
pub static LOG2_SBB_SIZE: [[[u32; 2]; MAX_CU_DEPTH + 1]; MAX_CU_DEPTH + 1] =
[
    [ [0,0], [0,1], [0,2], [0,3], [0,4], [0,4], [0,4], [0,4] ],
    [ [1,0], [1,1], [1,1], [1,3], [1,3], [1,3], [1,3], [1,3] ],
    [ [2,0], [1,1], [2,2], [2,2], [2,2], [2,2], [2,2], [2,2] ],
    [ [3,0], [3,1], [2,2], [2,2], [2,2], [2,2], [2,2], [2,2] ],
    [ [4,0], [3,1], [2,2], [2,2], [2,2], [2,2], [2,2], [2,2] ],
    [ [4,0], [3,1], [2,2], [2,2], [2,2], [2,2], [2,2], [2,2] ],
    [ [4,0], [3,1], [2,2], [2,2], [2,2], [2,2], [2,2], [2,2] ],
    [ [4,0], [3,1], [2,2], [2,2], [2,2], [2,2], [2,2], [2,2] ],
];

/* last significant position -> prefix group index */
#[rustfmt::skip]
pub static GROUP_IDX: [u32; MAX_TB_SIZEY as usize] =
[
    0, 1, 2, 3, 4, 4, 5, 5, 6, 6, 6, 6, 7, 7, 7, 7,
    8, 8, 8, 8, 8, 8, 8, 8, 9, 9, 9, 9, 9, 9, 9, 9,
    10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10,
    11, 11, 11, 11, 11, 11, 11, 11, 11, 11, 11, 11, 11, 11, 11, 11,
];

/* prefix group index -> smallest position of the group */
#[rustfmt::skip]
pub static MIN_IN_GROUP: [u32; 12] = [0, 1, 2, 3, 4, 6, 8, 12, 16, 24, 32, 48];

/* template sum -> rice parameter */
#[rustfmt::skip]
pub static GO_RICE_PARS_COEFF: [u32; 32] =
[
    0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 2, 2,
    2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3,
];

/* luma last position context offset per log2 size */
#[rustfmt::skip]
pub static LAST_PREFIX_CTX: [i32; 8] = [0, 0, 0, 3, 6, 10, 15, 21];

/* MMVD distances in internal (1/16) units */
#[rustfmt::skip]
pub static MMVD_REF_CANDS: [i32; MMVD_REFINE_STEP] =
[
    1 << MV_FRACTIONAL_BITS_DIFF,
    2 << MV_FRACTIONAL_BITS_DIFF,
    4 << MV_FRACTIONAL_BITS_DIFF,
    8 << MV_FRACTIONAL_BITS_DIFF,
    16 << MV_FRACTIONAL_BITS_DIFF,
    32 << MV_FRACTIONAL_BITS_DIFF,
    64 << MV_FRACTIONAL_BITS_DIFF,
    128 << MV_FRACTIONAL_BITS_DIFF,
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mmvd_distances_double() {
        assert_eq!(MMVD_REF_CANDS[0], 4);
        for i in 0..MMVD_REFINE_STEP - 1 {
            assert_eq!(MMVD_REF_CANDS[i + 1], 2 * MMVD_REF_CANDS[i]);
        }
    }

    #[test]
    fn group_idx_matches_min_in_group() {
        for pos in 0..MAX_TB_SIZEY {
            let g = GROUP_IDX[pos as usize] as usize;
            assert!(MIN_IN_GROUP[g] <= pos);
            if g + 1 < MIN_IN_GROUP.len() {
                assert!(pos < MIN_IN_GROUP[g + 1]);
            }
        }
    }

    #[test]
    fn cg_never_exceeds_block() {
        for log2w in 0..=MAX_CU_DEPTH {
            for log2h in 0..=MAX_CU_DEPTH {
                let [cw, ch] = LOG2_SBB_SIZE[log2w][log2h];
                assert!(cw as usize <= log2w && ch as usize <= log2h);
                assert!(cw + ch <= 4);
            }
        }
    }
}
