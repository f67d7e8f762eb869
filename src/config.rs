//! Token configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::*;
use crate::utils::validation;

/// Whole tokens issued when no explicit supply is configured
pub const DEFAULT_WHOLE_SUPPLY: u128 = 10_000;

const MAX_NAME_LEN: usize = 64;
const MAX_SYMBOL_LEN: usize = 11;

/// Parameters fixed at token creation.
///
/// ```toml
/// name = "Volcano Coin"
/// symbol = "VLC"
/// decimals = 18
/// initial_supply = "10000000000000000000000"
/// initial_holder = "0x00000000000000000000000000000000000000aa"
/// ```
///
/// Everything except `initial_holder` is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    /// Supply in smallest units; defaults to `DEFAULT_WHOLE_SUPPLY` whole tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_supply: Option<Amount>,
    pub initial_holder: Address,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_symbol() -> String {
    DEFAULT_SYMBOL.to_string()
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

impl TokenConfig {
    /// Default token parameters issued to `initial_holder`
    pub fn new(initial_holder: Address) -> Self {
        Self {
            name: default_name(),
            symbol: default_symbol(),
            decimals: default_decimals(),
            initial_supply: None,
            initial_holder,
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> LedgerResult<Self> {
        toml::from_str(raw).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Read configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Validate the configuration
    pub fn validate(&self) -> LedgerResult<()> {
        validation::validate_label("name", &self.name, MAX_NAME_LEN)?;
        validation::validate_label("symbol", &self.symbol, MAX_SYMBOL_LEN)?;

        if self.initial_holder.is_zero() {
            return Err(LedgerError::Config(
                "initial_holder cannot be the zero address".to_string(),
            ));
        }

        self.resolved_supply()?;
        Ok(())
    }

    /// Supply to issue, in smallest units
    pub fn resolved_supply(&self) -> LedgerResult<Amount> {
        match self.initial_supply {
            Some(supply) => Ok(supply),
            None => Amount::from_whole(DEFAULT_WHOLE_SUPPLY, self.decimals).ok_or_else(|| {
                LedgerError::Config(format!(
                    "default supply of {DEFAULT_WHOLE_SUPPLY} tokens does not fit {} decimals",
                    self.decimals
                ))
            }),
        }
    }

    pub fn metadata(&self) -> TokenMetadata {
        TokenMetadata {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
        }
    }
}
