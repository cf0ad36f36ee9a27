//! Structural checks on canonical documents.
//!
//! These are not the tax rules of a regime, which the calculation engine
//! enforces; they only catch shapes that would never be accepted, so the
//! converter can omit an optional block instead of emitting half of it.

use super::countries::is_known_country_code;
use super::currencies::is_known_currency_code;
use super::error::FieldError;
use super::types::*;

/// Check a party that must be addressable, such as a delivery receiver.
/// Returns all problems found (not just the first).
pub fn validate_party(party: &Party, prefix: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if party.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
        errors.push(FieldError::with_code(
            format!("{prefix}.name"),
            "name must not be empty",
            "party-name",
        ));
    }

    if party.addresses.is_empty() {
        errors.push(FieldError::with_code(
            format!("{prefix}.addresses"),
            "at least one address is required",
            "party-address",
        ));
    }

    for (i, address) in party.addresses.iter().enumerate() {
        validate_address(address, &format!("{prefix}.addresses[{i}]"), &mut errors);
    }

    errors
}

fn validate_address(address: &Address, prefix: &str, errors: &mut Vec<FieldError>) {
    if address.city.as_deref().is_none_or(|c| c.trim().is_empty()) {
        errors.push(FieldError::with_code(
            format!("{prefix}.city"),
            "city must not be empty",
            "address-city",
        ));
    }

    match address.country_code.as_deref() {
        None | Some("") => errors.push(FieldError::with_code(
            format!("{prefix}.country_code"),
            "country code must not be empty",
            "address-country",
        )),
        Some(code) if !is_known_country_code(code) => errors.push(FieldError::with_code(
            format!("{prefix}.country_code"),
            format!("country code '{code}' is not a known ISO 3166-1 alpha-2 code"),
            "address-country",
        )),
        Some(_) => {}
    }
}

/// Check the invariants a converted document is expected to hold.
pub fn validate_document(doc: &Document) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if doc.code.trim().is_empty() {
        errors.push(FieldError::with_code("code", "code must not be empty", "doc-code"));
    }

    if !doc.currency.is_known() {
        errors.push(FieldError::with_code(
            "currency",
            format!("currency '{}' is not a known ISO 4217 code", doc.currency),
            "doc-currency",
        ));
    }

    if let Some(rates) = &doc.exchange_rates {
        if rates.len() != 1 {
            errors.push(FieldError::with_code(
                "exchange_rates",
                "at most one exchange rate is expected",
                "doc-exchange",
            ));
        }
        for (i, rate) in rates.iter().enumerate() {
            if rate.from != doc.currency {
                errors.push(FieldError::with_code(
                    format!("exchange_rates[{i}].from"),
                    format!("rate must convert from {}", doc.currency),
                    "doc-exchange",
                ));
            }
            if !is_known_currency_code(rate.to.code()) {
                errors.push(FieldError::with_code(
                    format!("exchange_rates[{i}].to"),
                    format!("currency '{}' is not a known ISO 4217 code", rate.to),
                    "doc-exchange",
                ));
            }
        }
    }

    for (i, line) in doc.lines.iter().enumerate() {
        let prefix = format!("lines[{i}]");
        if line.index != i + 1 {
            errors.push(FieldError::with_code(
                format!("{prefix}.index"),
                format!("expected index {}, found {}", i + 1, line.index),
                "line-index",
            ));
        }
        if line.quantity.is_sign_negative() || line.quantity.is_zero() {
            errors.push(FieldError::with_code(
                format!("{prefix}.quantity"),
                "quantity must be greater than zero",
                "line-quantity",
            ));
        }
        if line.item.name.trim().is_empty() {
            errors.push(FieldError::with_code(
                format!("{prefix}.item.name"),
                "item name must not be empty",
                "line-name",
            ));
        }
        if let Some(period) = &line.period {
            if period.end < period.start {
                errors.push(FieldError::with_code(
                    format!("{prefix}.period"),
                    "period ends before it starts",
                    "line-period",
                ));
            }
        }
    }

    if let Some(delivery) = &doc.delivery {
        errors.extend(validate_party(&delivery.receiver, "delivery.receiver"));
    }

    errors
}
