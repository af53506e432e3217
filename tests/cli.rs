use assert_cmd::Command;

fn stdout_of(args: &[&str]) -> String {
    let out = Command::cargo_bin("rvcmdump")
        .unwrap()
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(out).unwrap()
}

#[test]
fn mmvd_index_is_decomposed() {
    assert_eq!(
        stdout_of(&["mmvd", "39"]),
        "base 1 step 1 position 3 offset (0,-8)\n"
    );
    assert_eq!(
        stdout_of(&["mmvd", "1", "--no-frac"]),
        "base 0 step 0 position 1 offset (-16,0)\n"
    );
}

#[test]
fn mmvd_index_out_of_range_fails() {
    Command::cargo_bin("rvcmdump")
        .unwrap()
        .args(&["mmvd", "64"])
        .assert()
        .failure();
}

#[test]
fn coeff_layout_of_luma_block() {
    let out = stdout_of(&["coeff", "--width", "8", "--height", "4"]);
    let mut lines = out.lines();
    assert_eq!(lines.next(), Some("block 8x4 Y SCAN_DIAG"));
    assert_eq!(lines.next(), Some("cg 4x4, grid 2x1"));
    assert_eq!(lines.next(), Some("last x: offset 3 shift 1 max 5"));
    assert_eq!(lines.next(), Some("last y: offset 0 shift 0 max 3"));
    assert_eq!(
        lines.next(),
        Some("cg 0 (0,0): 0 8 1 16 9 2 24 17 10 3 25 18 11 26 19 27")
    );
    assert_eq!(
        lines.next(),
        Some("cg 1 (1,0): 4 12 5 20 13 6 28 21 14 7 29 22 15 30 23 31")
    );
    assert_eq!(lines.next(), None);
}

#[test]
fn unsupported_block_size_fails() {
    Command::cargo_bin("rvcmdump")
        .unwrap()
        .args(&["coeff", "--width", "12", "--height", "4"])
        .assert()
        .failure();
}

#[test]
fn ctx_layout_ends_with_total() {
    let out = stdout_of(&["ctx"]);
    assert!(out.starts_with("split_flag"));
    assert!(out.lines().last().unwrap().starts_with("total "));
}
