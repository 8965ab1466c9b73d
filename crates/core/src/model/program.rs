use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Address, Maturity, MicroFunction};

/// Error loading a program fixture from disk.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse JSON fixture: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse YAML fixture: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Microcode generation failure, as reported by the upstream generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("{0:X}: Please position the cursor within a function")]
    NoFunction(Address),
    #[error("{ea:X}: no microcode available at maturity {maturity}")]
    Unavailable { ea: Address, maturity: Maturity },
}

impl GenerateError {
    /// Address the failure refers to.
    pub fn ea(&self) -> Address {
        match self {
            GenerateError::NoFunction(ea) => *ea,
            GenerateError::Unavailable { ea, .. } => *ea,
        }
    }
}

/// Named address range that counts as mapped program memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub start: Address,
    pub end: Address,
}

impl Segment {
    pub fn contains(&self, ea: Address) -> bool {
        ea >= self.start && ea < self.end
    }
}

/// One function of a fixture with its microcode at each available maturity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionFixture {
    pub name: String,
    pub start: Address,
    pub end: Address,
    #[serde(default)]
    pub levels: Vec<MicroFunction>,
}

impl FunctionFixture {
    pub fn contains(&self, ea: Address) -> bool {
        ea >= self.start && ea < self.end
    }

    pub fn maturities(&self) -> Vec<Maturity> {
        let mut levels: Vec<Maturity> = self.levels.iter().map(|l| l.maturity).collect();
        levels.sort();
        levels.dedup();
        levels
    }
}

/// A program snapshot standing in for the host database: functions with
/// pre-generated microcode, mapped segments, and symbol names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub functions: Vec<FunctionFixture>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub symbols: BTreeMap<String, Address>,
}

impl Program {
    /// Load a fixture, choosing JSON or YAML by file extension (JSON otherwise).
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let body = fs::read_to_string(path)
            .map_err(|source| FixtureError::Io { path: path.to_path_buf(), source })?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        if matches!(ext, "yaml" | "yml") {
            Self::from_yaml(&body)
        } else {
            Self::from_json(&body)
        }
    }

    pub fn from_json(body: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn from_yaml(body: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(body)?)
    }

    pub fn function_at(&self, ea: Address) -> Option<&FunctionFixture> {
        self.functions.iter().find(|f| f.contains(ea))
    }

    pub fn is_mapped(&self, ea: Address) -> bool {
        self.segments.iter().any(|s| s.contains(ea))
    }

    /// Produce the microcode of the function containing `ea` at `maturity`.
    ///
    /// Always returns a fresh copy; callers own the result.
    pub fn generate(&self, ea: Address, maturity: Maturity) -> Result<MicroFunction, GenerateError> {
        let func = self.function_at(ea).ok_or(GenerateError::NoFunction(ea))?;
        let mut mf = func
            .levels
            .iter()
            .find(|l| l.maturity == maturity)
            .cloned()
            .ok_or(GenerateError::Unavailable { ea: func.start, maturity })?;
        if mf.entry_ea == 0 {
            mf.entry_ea = func.start;
        }
        Ok(mf)
    }
}
