use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use log::debug;
use mcx_core::config::ExplorerConfig;
use mcx_core::host::{HeadlessHost, ViewId};
use mcx_core::model::{Address, Maturity};
use mcx_core::services::Explorer;
use serde::Serialize;

use crate::{load_program, parse_address};

pub fn validate_maturity(name: &str) -> Result<Maturity> {
    match name.parse::<Maturity>() {
        Ok(maturity) if !maturity.is_zero() => Ok(maturity),
        _ => {
            let allowed: Vec<&str> = Maturity::selectable().iter().map(|m| m.as_str()).collect();
            Err(anyhow!("Invalid maturity '{}'. Allowed: {}", name, allowed.join(", ")))
        }
    }
}

/// Print `data` as pretty JSON, or hand it to `display` for text output.
pub fn print_output<T: Serialize>(data: &T, json: bool, display: impl FnOnce(&T)) -> Result<()> {
    if json {
        let serialized = serde_json::to_string_pretty(data).context("Failed to serialize output")?;
        println!("{serialized}");
    } else {
        display(data);
    }
    Ok(())
}

/// A microcode text view opened on a headless host, ready to be driven.
pub struct OpenView {
    pub explorer: Explorer,
    pub host: HeadlessHost,
    pub view: ViewId,
    pub ea: Address,
    pub maturity: Maturity,
}

/// Load the fixture at `input` and open the microcode of the function at `ea`.
///
/// Without `maturity` the config's default level is used.
pub fn open_view(
    input: &Path,
    ea: &str,
    maturity: Option<&str>,
    config: ExplorerConfig,
) -> Result<OpenView> {
    let program = load_program(input)?;
    let ea = parse_address(&program, ea)?;
    let maturity = match maturity {
        Some(name) => validate_maturity(name)?,
        None => config.default_maturity,
    };

    let mut host = HeadlessHost::for_program(&program);
    let explorer = Explorer::new(config);
    let handle = explorer
        .generate_and_show(&mut host, &program, ea, maturity)
        .with_context(|| format!("Failed to open microcode at {ea:X}"))?;
    let Some(handle) = handle else {
        bail!("No maturity level selected");
    };
    let view = handle.release();
    debug!("opened {view} for {ea:X} at {maturity}");

    Ok(OpenView { explorer, host, view, ea, maturity })
}
