//! # Terminal Configuration
//!
//! Per-terminal settings loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`POLPA_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use rust_decimal::Decimal;

use polpa_core::money::{format_amount, round_money};
use polpa_core::DEFAULT_STORE_ID;

/// Terminal configuration.
///
/// ## Fields
/// All fields have sensible defaults for a Brazilian açaí shop.
/// Multi-store deployments set the store id per terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalConfig {
    /// Store (channel tag) this terminal belongs to.
    /// Default: "loja1" (single-store mode)
    pub store_id: String,

    /// Store name (displayed on receipts)
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,
}

impl Default for TerminalConfig {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Store: "loja1" / "Polpa Açaí"
    /// - Currency: BRL (R$)
    fn default() -> Self {
        TerminalConfig {
            store_id: DEFAULT_STORE_ID.to_string(),
            store_name: "Polpa Açaí".to_string(),
            currency_code: "BRL".to_string(),
            currency_symbol: "R$".to_string(),
        }
    }
}

impl TerminalConfig {
    /// Creates a new TerminalConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `POLPA_STORE_ID`: Override store id
    /// - `POLPA_STORE_NAME`: Override store name
    pub fn from_env() -> Self {
        let mut config = TerminalConfig::default();

        if let Ok(store_id) = std::env::var("POLPA_STORE_ID") {
            config.store_id = store_id;
        }

        if let Ok(store_name) = std::env::var("POLPA_STORE_NAME") {
            config.store_name = store_name;
        }

        config
    }

    /// Formats a decimal amount as a currency string, pt-BR style.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = TerminalConfig::default();
    /// assert_eq!(config.format_currency(dec!(1234.56)), "R$ 1.234,56");
    /// ```
    pub fn format_currency(&self, amount: Decimal) -> String {
        let rounded = round_money(amount);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!(
            "{}{} {}",
            sign,
            self.currency_symbol,
            format_amount(rounded.abs())
        )
    }
}

/// Determines the database file path for a terminal installation.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.polpa.pos/polpa.db`
/// - **Windows**: `%APPDATA%\polpa\pos\polpa.db`
/// - **Linux**: `~/.local/share/polpa-pos/polpa.db`
///
/// ## Development Override
/// Set `POLPA_DB_PATH` environment variable to use a custom path.
pub fn default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Check for override
    if let Ok(path) = std::env::var("POLPA_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    // Use platform-specific app data directory
    let proj_dirs = directories::ProjectDirs::from("com", "polpa", "pos")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();

    // Create directory if it doesn't exist
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("polpa.db"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency_positive() {
        let config = TerminalConfig::default();
        assert_eq!(config.format_currency(dec!(12.34)), "R$ 12,34");
        assert_eq!(config.format_currency(dec!(1.00)), "R$ 1,00");
        assert_eq!(config.format_currency(dec!(0.01)), "R$ 0,01");
        assert_eq!(config.format_currency(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        let config = TerminalConfig::default();
        assert_eq!(config.format_currency(dec!(1234.56)), "R$ 1.234,56");
        assert_eq!(config.format_currency(dec!(1000000)), "R$ 1.000.000,00");
        assert_eq!(config.format_currency(dec!(999.99)), "R$ 999,99");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = TerminalConfig::default();
        assert_eq!(config.format_currency(dec!(-12.34)), "-R$ 12,34");
    }

    #[test]
    fn test_format_currency_rounds_to_cents() {
        let config = TerminalConfig::default();
        // Banker's rounding at the display boundary
        assert_eq!(config.format_currency(dec!(13.497)), "R$ 13,50");
        assert_eq!(config.format_currency(dec!(2.125)), "R$ 2,12");
    }

    #[test]
    fn test_default_config() {
        let config = TerminalConfig::default();
        assert_eq!(config.store_id, DEFAULT_STORE_ID);
        assert_eq!(config.currency_code, "BRL");
    }
}
