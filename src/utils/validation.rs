//! Validation utilities for values crossing the public boundary

use bigdecimal::num_bigint::Sign;
use bigdecimal::{BigDecimal, ToPrimitive};

use crate::types::*;

/// Largest power of ten an integer amount can carry: 10^39 > `u128::MAX`
const MAX_UPSCALE: i64 = 38;

/// Most fractional digits accepted, e.g. `25.000` has three
const MAX_FRACTION_DIGITS: i64 = 77;

/// Convert a caller-supplied quantity into an [`Amount`].
///
/// Negative, fractional and out-of-range values are rejected before they can
/// reach any ledger state. Magnitude is bounded from the raw digits and
/// exponent before any rescaling, so the work done here does not grow with
/// the exponent of the input.
pub fn parse_amount(amount: &BigDecimal) -> LedgerResult<Amount> {
    let (digits, scale) = amount.as_bigint_and_exponent();

    match digits.sign() {
        Sign::Minus => {
            return Err(LedgerError::InvalidAmount(
                "amount cannot be negative".to_string(),
            ))
        }
        Sign::NoSign => return Ok(Amount::ZERO),
        Sign::Plus => {}
    }

    if scale < -MAX_UPSCALE {
        return Err(LedgerError::InvalidAmount(format!(
            "amount exceeds the representable range: exponent {}",
            -scale
        )));
    }

    if scale > MAX_FRACTION_DIGITS {
        return Err(LedgerError::InvalidAmount(format!(
            "amount carries more than {MAX_FRACTION_DIGITS} fractional digits"
        )));
    }

    // value = digits / 10^scale, and 10^scale needs about 3.322 * scale bits
    let fraction_bits = (scale.max(0) as u64 * 3_322).div_ceil(1_000);
    if digits.bits() > 128 + fraction_bits {
        return Err(LedgerError::InvalidAmount(format!(
            "amount exceeds the representable range: {} significant bits",
            digits.bits()
        )));
    }

    let whole = amount.with_scale(0);
    if whole != *amount {
        return Err(LedgerError::InvalidAmount(format!(
            "amount must be a whole number of smallest units: {amount}"
        )));
    }

    let (units, _) = whole.as_bigint_and_exponent();
    units.to_u128().map(Amount::new).ok_or_else(|| {
        LedgerError::InvalidAmount(format!("amount exceeds the representable range: {amount}"))
    })
}

/// Reject the null identity as a destination
pub fn validate_recipient(recipient: &Address) -> LedgerResult<()> {
    if recipient.is_zero() {
        Err(LedgerError::InvalidRecipient)
    } else {
        Ok(())
    }
}

/// Parse an account identity from its hex form
pub fn parse_address(raw: &str) -> LedgerResult<Address> {
    raw.parse()
}

/// Validate a token name or symbol
pub fn validate_label(field: &str, value: &str, max_len: usize) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::Config(format!("{field} cannot be empty")));
    }

    if value.len() > max_len {
        return Err(LedgerError::Config(format!(
            "{field} cannot exceed {max_len} characters"
        )));
    }

    Ok(())
}
