use std::fs;

use mcx_cli::commands::validate_maturity;
use mcx_cli::{load_explorer_config, parse_address, sha256_file};
use mcx_core::config::ExplorerConfig;
use mcx_core::model::{Maturity, Program};
use tempfile::tempdir;

#[test]
fn sha256_file_matches_known_hash() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("abc.txt");
    fs::write(&path, b"abc").expect("write");
    assert_eq!(
        sha256_file(&path).expect("hash"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn sha256_file_reports_missing_file() {
    let tmp = tempdir().expect("tempdir");
    let err = sha256_file(&tmp.path().join("missing")).unwrap_err();
    assert!(err.to_string().contains("Failed to open fixture for hashing"));
}

#[test]
fn addresses_resolve_symbols_before_hex() {
    let mut program = Program::default();
    program.symbols.insert("main".into(), 0x401000);
    program.symbols.insert("cafe".into(), 0x10);

    assert_eq!(parse_address(&program, "main").unwrap(), 0x401000);
    assert_eq!(parse_address(&program, " 0x402000 ").unwrap(), 0x402000);
    assert_eq!(parse_address(&program, "40100A").unwrap(), 0x40100A);
    assert_eq!(parse_address(&program, "cafe").unwrap(), 0x10);

    let err = parse_address(&program, "nope").unwrap_err();
    assert!(err.to_string().contains("Invalid address 'nope'"));
}

#[test]
fn validates_known_maturities() {
    for &level in Maturity::selectable() {
        assert_eq!(validate_maturity(level.as_str()).expect("should parse"), level);
    }
    assert_eq!(validate_maturity("glbopt1").unwrap(), Maturity::GlobalOpt1);
}

#[test]
fn rejects_unknown_and_zero_maturity() {
    let err = validate_maturity("bogus").unwrap_err();
    assert!(err.to_string().contains("Invalid maturity 'bogus'"));
    assert!(err.to_string().contains("MMAT_GENERATED"));
    assert!(validate_maturity("MMAT_ZERO").is_err());
}

#[test]
fn config_defaults_when_absent() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("explorer.json");
    assert_eq!(load_explorer_config(Some(&missing)).unwrap(), ExplorerConfig::default());
    assert_eq!(load_explorer_config(None).unwrap(), ExplorerConfig::default());
}

#[test]
fn config_errors_carry_the_path() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("explorer.ini");
    fs::write(&path, "keep_ir=false").expect("write");
    let err = load_explorer_config(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Failed to load config"));
    assert!(format!("{err:#}").contains("Unsupported config format"));
}
