//! Tax classification.
//!
//! Maps platform tax records onto destination categories and rates. When a
//! record cannot be classified with certainty the combo is dropped or left
//! with its raw percentage, never guessed.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::{RateDef, RateKey, RateValueDef, Regime, RegimeCatalog, TaxCategory, TaxCombo};
use crate::source::TaxAmount;

/// Percentages are compared and emitted with this many decimals.
const PERCENT_DP: u32 = 3;

/// Map a platform tax type, falling back to the rate's display name.
///
/// Unknown names are passed through as an opaque category code; `None`
/// means there was nothing to classify at all.
pub fn classify(tax_type: Option<&str>, display_name: &str) -> Option<TaxCategory> {
    match tax_type.map(str::trim).unwrap_or_default() {
        "vat" => return Some(TaxCategory::Vat),
        "sales_tax" => return Some(TaxCategory::SalesTax),
        "gst" | "hst" => return Some(TaxCategory::Gst),
        _ => {}
    }

    let name = display_name.trim();
    if name.is_empty() {
        return None;
    }
    Some(match name.to_lowercase().as_str() {
        "vat" | "iva" => TaxCategory::Vat,
        "sales tax" => TaxCategory::SalesTax,
        "gst" => TaxCategory::Gst,
        _ => TaxCategory::Other(name.to_string()),
    })
}

/// Classify a tax record through its expanded rate, if any.
pub fn classify_tax(tax: &TaxAmount) -> Option<TaxCategory> {
    let rate = tax.tax_rate()?;
    classify(rate.tax_type.as_deref(), &rate.display_name)
}

/// Build the line tax combo for one platform tax record.
///
/// Reverse charge is tagged with the regime's country and carries no
/// percentage. Otherwise the percentage is derived from the amounts and
/// swapped for a rate key when the regime catalog has exactly one match.
pub fn resolve_combo<C: RegimeCatalog + ?Sized>(
    tax: &TaxAmount,
    regime: &Regime,
    catalog: &C,
    date: NaiveDate,
) -> Option<TaxCombo> {
    let category = classify_tax(tax);
    let reason = tax.taxability_reason.as_deref();

    if reason == Some("reverse_charge") {
        return Some(
            TaxCombo::new(category.unwrap_or(TaxCategory::Vat))
                .country(regime.country.clone())
                .rate_key(RateKey::ReverseCharge),
        );
    }

    let Some(category) = category else {
        debug!("dropping tax of {} with no classifiable category", tax.amount);
        return None;
    };
    let combo = TaxCombo::new(category.clone()).country(regime.country.clone());

    match reason {
        Some("zero_rated") => return Some(combo.rate_key(RateKey::Zero)),
        Some("product_exempt" | "customer_exempt") => {
            return Some(combo.rate_key(RateKey::Exempt));
        }
        _ => {}
    }

    let Some(percent) = tax_percent(tax) else {
        return Some(combo);
    };

    match match_catalog_rate(percent, &regime.country, &category, date, catalog) {
        Some((rate, _)) => Some(combo.rate_key(rate.key)),
        None => Some(combo.percent(percent)),
    }
}

/// `tax / taxable * 100`, or the rate's declared percentage when nothing
/// was taxable.
fn tax_percent(tax: &TaxAmount) -> Option<Decimal> {
    let percent = match tax.taxable_amount {
        Some(taxable) if taxable != 0 => {
            Decimal::from(tax.amount) / Decimal::from(taxable) * Decimal::ONE_HUNDRED
        }
        _ => tax.tax_rate().and_then(|r| r.percentage)?,
    };
    Some(round_percent(percent))
}

fn round_percent(percent: Decimal) -> Decimal {
    percent
        .round_dp_with_strategy(PERCENT_DP, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Find the catalog rate whose value equals `percent` on `date`.
///
/// Rates that carry a surcharge are skipped. Two or more matching values
/// make the lookup ambiguous and nothing is returned.
pub fn match_catalog_rate<'c, C: RegimeCatalog + ?Sized>(
    percent: Decimal,
    country: &str,
    category: &TaxCategory,
    date: NaiveDate,
    catalog: &'c C,
) -> Option<(&'c RateDef, &'c RateValueDef)> {
    let def = catalog.category(country, category)?;
    let target = round_percent(percent);

    let mut matches = def
        .rates
        .iter()
        .filter(|rate| rate.values.iter().all(|v| v.surcharge.is_none()))
        .flat_map(|rate| rate.values.iter().map(move |value| (rate, value)))
        .filter(|(_, value)| round_percent(value.percent) == target && value.covers(date));

    let first = matches.next()?;
    if matches.next().is_some() {
        debug!("{target}% matches several {category} rates in {country}, keeping percentage");
        return None;
    }
    Some(first)
}

/// Invoice-level tax inclusivity from the document's total taxes.
///
/// A single entry decides on its own; with several, only an inclusive VAT
/// entry marks prices as VAT-inclusive.
pub fn prices_include(total_taxes: &[TaxAmount]) -> Option<TaxCategory> {
    match total_taxes {
        [] => None,
        [single] => {
            if single.is_inclusive() {
                classify_tax(single)
            } else {
                None
            }
        }
        many => many
            .iter()
            .any(|t| t.is_inclusive() && classify_tax(t) == Some(TaxCategory::Vat))
            .then_some(TaxCategory::Vat),
    }
}
