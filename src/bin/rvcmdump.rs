use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use rvcm::api::*;
use rvcm::com::*;

use std::process;

fn parse_cli<'a>() -> ArgMatches<'a> {
    App::new("rvcmdump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dumps context modelling tables")
        .setting(AppSettings::DeriveDisplayOrder)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("coeff")
                .about("coefficient group layout, scan and last position contexts of a block")
                .arg(
                    Arg::with_name("WIDTH")
                        .help("transform block width")
                        .long("width")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("HEIGHT")
                        .help("transform block height")
                        .long("height")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("SCAN")
                        .help("coefficient scan")
                        .short("s")
                        .long("scan")
                        .takes_value(true)
                        .possible_values(&["diag", "hor", "ver"])
                        .default_value("diag"),
                )
                .arg(
                    Arg::with_name("CHROMA")
                        .help("chroma component")
                        .short("c")
                        .long("chroma"),
                ),
        )
        .subcommand(
            SubCommand::with_name("mmvd")
                .about("decomposes an MMVD candidate index")
                .arg(
                    Arg::with_name("INDEX")
                        .help("mmvd candidate index")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("NOFRAC")
                        .help("fractional MMVD distances disabled")
                        .long("no-frac"),
                ),
        )
        .subcommand(SubCommand::with_name("ctx").about("context set layout"))
        .get_matches()
}

fn parse_value<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> Result<T, CtxError> {
    let v = matches.value_of(name).unwrap_or_default();
    v.parse()
        .map_err(|_| CtxError::InvalidArgument(format!("{} must be an integer, got '{}'", name, v)))
}

fn dump_coeff(matches: &ArgMatches) -> Result<(), CtxError> {
    let geom = BlockGeometry::new(parse_value(matches, "WIDTH")?, parse_value(matches, "HEIGHT")?)?;
    let scan_type = match matches.value_of("SCAN") {
        Some("hor") => CoeffScanType::SCAN_HOR,
        Some("ver") => CoeffScanType::SCAN_VER,
        _ => CoeffScanType::SCAN_DIAG,
    };
    let comp_id = if matches.is_present("CHROMA") {
        ComponentId::CB
    } else {
        ComponentId::Y
    };
    let cfg = ResidualConfig {
        scan_type,
        ..Default::default()
    };
    let cctx = CoeffCodingContext::new(&geom, &CoeffCodingParams::new(comp_id, &cfg, false));

    println!(
        "block {}x{} {:?} {:?}",
        cctx.width(),
        cctx.height(),
        comp_id,
        scan_type
    );
    println!(
        "cg {}x{}, grid {}x{}",
        1 << cctx.log2_cg_width(),
        1 << cctx.log2_cg_height(),
        cctx.width_in_groups(),
        cctx.height_in_groups()
    );
    println!(
        "last x: offset {} shift {} max {}",
        cctx.last_offset_x(),
        cctx.last_shift_x(),
        cctx.max_last_pos_x()
    );
    println!(
        "last y: offset {} shift {} max {}",
        cctx.last_offset_y(),
        cctx.last_shift_y(),
        cctx.max_last_pos_y()
    );

    let cg_size = 1usize << cctx.log2_cg_size();
    for (i, cg) in cctx.scan_cg().iter().enumerate() {
        let positions: Vec<String> = (i * cg_size..(i + 1) * cg_size)
            .map(|p| cctx.block_pos(p).to_string())
            .collect();
        println!("cg {} ({},{}): {}", i, cg.x, cg.y, positions.join(" "));
    }
    Ok(())
}

fn dump_mmvd(matches: &ArgMatches) -> Result<(), CtxError> {
    let idx: usize = parse_value(matches, "INDEX")?;
    if idx >= MMVD_ADD_NUM {
        return Err(CtxError::InvalidArgument(format!(
            "mmvd index {} out of range 0..{}",
            idx, MMVD_ADD_NUM
        )));
    }
    let pos = MmvdIdx::decompose(idx);
    println!(
        "base {} step {} position {} offset {}",
        pos.base_idx,
        pos.step,
        pos.position,
        pos.offset(matches.is_present("NOFRAC"))
    );
    Ok(())
}

fn dump_ctx() {
    let ctx = &*CTX;
    let sets: &[(&str, &[CtxSet])] = &[
        ("split_flag", &[ctx.split_flag]),
        ("split_qt_flag", &[ctx.split_qt_flag]),
        ("split_hv_flag", &[ctx.split_hv_flag]),
        ("split12_flag", &[ctx.split12_flag]),
        ("skip_flag", &[ctx.skip_flag]),
        ("pred_mode", &[ctx.pred_mode]),
        ("ibc_flag", &[ctx.ibc_flag]),
        ("mip_flag", &[ctx.mip_flag]),
        ("merge_flag", &[ctx.merge_flag]),
        ("regular_merge_flag", &[ctx.regular_merge_flag]),
        ("merge_idx", &[ctx.merge_idx]),
        ("mmvd_flag", &[ctx.mmvd_flag]),
        ("mmvd_merge_idx", &[ctx.mmvd_merge_idx]),
        ("mmvd_step_mvp_idx", &[ctx.mmvd_step_mvp_idx]),
        ("inter_dir", &[ctx.inter_dir]),
        ("affine_flag", &[ctx.affine_flag]),
        ("affine_type", &[ctx.affine_type]),
        ("imv_flag", &[ctx.imv_flag]),
        ("triangle_flag", &[ctx.triangle_flag]),
        ("gbi_idx", &[ctx.gbi_idx]),
        ("mvd", &[ctx.mvd]),
        ("qt_root_cbf", &[ctx.qt_root_cbf]),
        ("qt_cbf", &ctx.qt_cbf),
        ("sig_coeff_group", &ctx.sig_coeff_group),
        ("sig_flag", &ctx.sig_flag),
        ("par_flag", &ctx.par_flag),
        ("gtx_flag", &ctx.gtx_flag),
        ("last_x", &ctx.last_x),
        ("last_y", &ctx.last_y),
        ("ts_sig_coeff_group", &[ctx.ts_sig_coeff_group]),
        ("ts_sig_flag", &[ctx.ts_sig_flag]),
        ("ts_par_flag", &[ctx.ts_par_flag]),
        ("ts_gtx_flag", &[ctx.ts_gtx_flag]),
    ];
    for (name, set) in sets {
        let layout: Vec<String> = set
            .iter()
            .map(|s| format!("{}+{}", s.offset, s.size))
            .collect();
        println!("{:<20} {}", name, layout.join(" "));
    }
    println!("total {}", ctx.num_ctx);
}

fn main() {
    let matches = parse_cli();
    let ret = match matches.subcommand() {
        ("coeff", Some(m)) => dump_coeff(m),
        ("mmvd", Some(m)) => dump_mmvd(m),
        ("ctx", _) => {
            dump_ctx();
            Ok(())
        }
        _ => Ok(()),
    };

    if let Err(err) = ret {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
