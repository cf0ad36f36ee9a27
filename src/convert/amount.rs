//! Minor-unit ↔ decimal amount conversion.
//!
//! The platform reports amounts as integers in the currency's minor unit
//! (cents for EUR, yen for JPY). Decimal amounts carry the currency scale.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::{ConvertError, Currency, ErrorKind};

/// Extra fractional digits kept when a division does not come out even.
const DIVISION_EXTRA_DIGITS: u32 = 4;

/// Convert an integer minor-unit amount to a decimal at the currency scale.
/// Exact: `1050` EUR becomes `10.50`, `1050` JPY stays `1050`.
pub fn to_decimal(minor_units: i64, currency: &Currency) -> Decimal {
    Decimal::new(minor_units, currency.scale())
}

/// Convert a fractional minor-unit amount (e.g. a `unit_amount_decimal`
/// of `"1234.5"`) to a decimal. Extra digits are kept, never dropped, and
/// the result has at least the currency scale.
pub fn minor_decimal_to_amount(minor_units: Decimal, currency: &Currency) -> Decimal {
    let scale = currency.scale();
    let mut amount = minor_units;
    if amount.set_scale(minor_units.scale() + scale).is_err() {
        // Out of precision; dividing keeps as many digits as fit.
        amount = minor_units / Decimal::from(10i64.pow(scale));
    }
    if amount.scale() < scale {
        amount.rescale(scale);
    }
    amount
}

/// Convert a decimal amount back to integer minor units, rounding half away
/// from zero at the currency scale: `123.4567` EUR becomes `12346`.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Result<i64, ConvertError> {
    let scale = currency.scale();
    let mut rounded = amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    i64::try_from(rounded.mantissa()).map_err(|_| {
        ConvertError::new(
            ErrorKind::Arithmetic,
            format!("{amount} {currency} does not fit in minor units"),
        )
        .field("amount")
    })
}

/// Divide without reducing the scale below the dividend's.
///
/// Quotients that do not terminate are rounded half away from zero to four
/// digits beyond the dividend's scale. Returns `None` for a zero divisor.
pub fn div_keep_scale(dividend: Decimal, divisor: Decimal) -> Option<Decimal> {
    let quotient = dividend.checked_div(divisor)?;
    let min_scale = dividend.scale();
    let mut quotient = quotient
        .round_dp_with_strategy(
            min_scale + DIVISION_EXTRA_DIGITS,
            RoundingStrategy::MidpointAwayFromZero,
        )
        .normalize();
    if quotient.scale() < min_scale {
        quotient.rescale(min_scale);
    }
    Some(quotient)
}
