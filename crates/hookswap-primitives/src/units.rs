use alloy::primitives::{utils::format_units, U256};

use crate::error::{PrimitivesError, Result};

/// Decimals of the pool tokens
pub const TOKEN_DECIMALS: u8 = 18;

/// Render a base unit amount with `decimals` places, dropping trailing zeros but
/// keeping at least one fractional digit (`1000000000000000000` -> `"1.0"`).
pub fn format_token_amount(amount: U256, decimals: u8) -> Result<String> {
    let formatted =
        format_units(amount, decimals).map_err(|e| PrimitivesError::UnitsError(e.to_string()))?;

    let Some((whole, fraction)) = formatted.split_once('.') else {
        return Ok(format!("{formatted}.0"));
    };
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        Ok(format!("{whole}.0"))
    } else {
        Ok(format!("{whole}.{fraction}"))
    }
}

/// Display form of an 18 decimal amount. Falls back to the raw integer if the
/// amount cannot be formatted.
pub fn format_ether(amount: U256) -> String {
    format_token_amount(amount, TOKEN_DECIMALS).unwrap_or_else(|_| amount.to_string())
}
