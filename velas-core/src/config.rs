use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::RankTable;

/// Which string the observed digits are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigitSource {
    Multiplier,
    Time,
}

/// How the multiplier enters the score formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiplierTerm {
    /// `floor(multiplier)`
    Truncated,
    /// The multiplier as given, decimals included.
    Whole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelasConfig {
    pub digit_source: DigitSource,
    pub multiplier_term: MultiplierTerm,
    /// Also schedule V×10 alerts at ten times each missing digit.
    pub emit_tenfold: bool,
    /// RA alerts around the decimal digit sum, for multipliers below 10.00.
    pub fractional_branch: bool,
    /// Drop confluence alerts that do not share a minute with another alert.
    pub confluence_requires_match: bool,
    pub group_window_secs: i64,
    pub rank_table: RankTable,
}

impl Default for VelasConfig {
    fn default() -> Self {
        Self {
            digit_source: DigitSource::Multiplier,
            multiplier_term: MultiplierTerm::Truncated,
            emit_tenfold: true,
            fractional_branch: true,
            confluence_requires_match: false,
            group_window_secs: 61,
            rank_table: RankTable::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<VelasConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Não foi possível ler {:?}", path))?;
    let config: VelasConfig = serde_json::from_str(&json)
        .with_context(|| format!("JSON inválido em {:?}", path))?;
    log::debug!("Configuração carregada de {:?}", path);
    Ok(config)
}

pub fn save_config(config: &VelasConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)
        .with_context(|| format!("Não foi possível gravar {:?}", path))?;
    Ok(())
}
