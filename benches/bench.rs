use criterion::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use rvcm::com::*;

criterion_group!(coeff, bench_sig_ctx_32x32, bench_init_subblock_64x64);
criterion_group!(merge, bench_mmvd_resolve);
criterion_main!(coeff, merge);

fn new_coeffs(ra: &mut ChaChaRng, n: usize) -> Vec<TCoeff> {
    (0..n)
        .map(|_| {
            if ra.gen_range(0, 4) == 0 {
                ra.gen_range(-8, 9)
            } else {
                0
            }
        })
        .collect()
}

fn new_cctx(w: u32, h: u32) -> CoeffCodingContext {
    let params = CoeffCodingParams {
        comp_id: ComponentId::Y,
        sign_hiding: true,
        trafo_bypass: false,
        bdpcm: false,
        extended_precision: false,
        max_log2_tr_dynamic_range: 15,
        scan_type: CoeffScanType::SCAN_DIAG,
    };
    CoeffCodingContext::new(&BlockGeometry::new(w, h).unwrap(), &params)
}

fn bench_sig_ctx_32x32(c: &mut Criterion) {
    let mut ra = ChaChaRng::from_seed([0; 32]);
    let coeff = new_coeffs(&mut ra, 32 * 32);
    let mut cctx = new_cctx(32, 32);

    c.bench_function("sig_ctx_32x32", |b| {
        b.iter(|| {
            let mut state = 0;
            for pos in (0..32 * 32).rev() {
                let ctx = cctx.sig_ctx_id_abs(pos, &coeff, state);
                let offset = cctx.ctx_offset_abs();
                state = ((ctx + offset as u32) & 3) as i32;
                black_box(cctx.greater1_ctx_id_abs(offset));
            }
        })
    });
}

fn bench_init_subblock_64x64(c: &mut Criterion) {
    let mut ra = ChaChaRng::from_seed([0; 32]);
    let flags: Vec<bool> = (0..64).map(|_| ra.gen()).collect();

    c.bench_function("init_subblock_64x64", |b| {
        b.iter(|| {
            let mut cctx = new_cctx(64, 64);
            for i in (0..cctx.num_groups()).rev() {
                cctx.init_subblock(i, flags[i]);
                black_box(cctx.sig_group_ctx_id());
            }
        })
    });
}

fn bench_mmvd_resolve(c: &mut Criterion) {
    let mut ctx = MergeCtx::new();
    ctx.push_candidate(
        INTER_DIR_BI,
        [
            MvField::new(Mv::new(12, -4), 0),
            MvField::new(Mv::new(-8, 20), 0),
        ],
        MergeType::MRG_TYPE_DEFAULT_N,
        GBI_DEFAULT,
    )
    .unwrap();
    ctx.push_candidate(
        INTER_DIR_L0,
        [MvField::new(Mv::new(3, 3), 1), MvField::default()],
        MergeType::MRG_TYPE_DEFAULT_N,
        GBI_DEFAULT,
    )
    .unwrap();
    ctx.derive_mmvd_base_mv();

    let mut slice = SliceContext::new(8);
    slice.set_ref(REF_PIC_LIST_0, 0, 4, false).unwrap();
    slice.set_ref(REF_PIC_LIST_0, 1, 0, false).unwrap();
    slice.set_ref(REF_PIC_LIST_1, 0, 16, false).unwrap();

    c.bench_function("mmvd_resolve", |b| {
        b.iter(|| {
            let mut pu = PredictionUnit::new(Size {
                width: 16,
                height: 16,
            });
            for idx in 0..MMVD_ADD_NUM {
                ctx.set_mmvd_merge_cand_info(&mut pu, idx, &slice, &SmallBlockBiPredRestriction);
                black_box(&pu);
            }
        })
    });
}
