use std::fs;
use std::io;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use mcx_core::config::{load_config_or_default, ExplorerConfig};
use mcx_core::host::parse_hex_address;
use mcx_core::model::{Address, Program};
use sha2::{Digest, Sha256};

pub mod commands;

/// Load a program fixture (JSON, or YAML by extension).
pub fn load_program(path: &Path) -> Result<Program> {
    Program::load(path).with_context(|| format!("Failed to load fixture {}", path.display()))
}

/// Load the explorer config if a path is given and exists, defaults otherwise.
pub fn load_explorer_config(path: Option<&Path>) -> Result<ExplorerConfig> {
    load_config_or_default(path).with_context(|| match path {
        Some(p) => format!("Failed to load config {}", p.display()),
        None => "Failed to load default config".to_string(),
    })
}

/// Resolve a user-supplied address: a fixture symbol name, or hex with or
/// without `0x`.
pub fn parse_address(program: &Program, token: &str) -> Result<Address> {
    let token = token.trim();
    program
        .symbols
        .get(token)
        .copied()
        .or_else(|| parse_hex_address(token))
        .ok_or_else(|| anyhow!("Invalid address '{token}': expected hex (0x401000) or a symbol name"))
}

/// SHA-256 of a file as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("Failed to open fixture for hashing: {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to read fixture for hashing: {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}
