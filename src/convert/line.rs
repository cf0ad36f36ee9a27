//! Line resolution.
//!
//! Invoice and credit-note lines are read through [`LineInput`], a borrowed
//! view carrying only what the resolver needs, so both sources share one
//! price/quantity state machine.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use log::trace;
use rust_decimal::Decimal;

use crate::core::{
    ConvertError, Currency, Discount, DiscountValue, ErrorKind, Line, LineBuilder, Period, Regime,
    RegimeCatalog,
};
use crate::source::{self, CreditNoteLine, DiscountAmount, InvoiceLine, Product, TaxAmount};

use super::amount::{div_keep_scale, minor_decimal_to_amount, to_decimal};
use super::tax::resolve_combo;

/// Borrowed view over a source line.
#[derive(Debug, Clone, Copy)]
pub struct LineInput<'a> {
    pub id: &'a str,
    /// Line total in minor units.
    pub amount: i64,
    /// Zero means only the total is meaningful.
    pub quantity: i64,
    pub unit_amount_decimal: Option<Decimal>,
    pub description: Option<&'a str>,
    pub product: Option<&'a Product>,
    pub period: Option<source::Period>,
    pub discounts: &'a [DiscountAmount],
    pub taxes: Option<&'a [TaxAmount]>,
    pub metadata: &'a BTreeMap<String, String>,
}

impl<'a> From<&'a InvoiceLine> for LineInput<'a> {
    fn from(line: &'a InvoiceLine) -> Self {
        Self {
            id: &line.id,
            amount: line.amount,
            quantity: line.scheme_quantity(),
            unit_amount_decimal: line.unit_amount_decimal(),
            description: line.description.as_deref(),
            product: line.product(),
            period: line.period,
            discounts: &line.discount_amounts,
            taxes: line.taxes.as_deref(),
            metadata: &line.metadata,
        }
    }
}

impl<'a> From<&'a CreditNoteLine> for LineInput<'a> {
    fn from(line: &'a CreditNoteLine) -> Self {
        Self {
            id: &line.id,
            amount: line.amount,
            quantity: line.scheme_quantity(),
            unit_amount_decimal: line.unit_amount_decimal,
            description: line.description.as_deref(),
            product: None,
            period: None,
            discounts: &line.discount_amounts,
            taxes: line.taxes.as_deref(),
            metadata: &line.metadata,
        }
    }
}

/// Everything a line needs from the surrounding document.
pub struct LineContext<'a> {
    pub currency: &'a Currency,
    pub regime: &'a Regime,
    pub catalog: &'a dyn RegimeCatalog,
    /// Issue date, selects the catalog rate window.
    pub date: NaiveDate,
    pub ext_prefix: &'a str,
}

/// Resolve one source line into a document line at 1-based `index`.
pub fn resolve_line(
    input: &LineInput<'_>,
    ctx: &LineContext<'_>,
    index: usize,
) -> Result<Line, ConvertError> {
    let (quantity, price) = resolve_price(input, ctx.currency)?;

    let mut builder = LineBuilder::new(item_name(input), price)
        .quantity(quantity)
        .reference(input.product.map(|p| p.id.as_str()))
        .period(line_period(input)?);

    for discount in input.discounts.iter().filter_map(|d| resolve_discount(d, ctx.currency)) {
        builder = builder.add_discount(discount);
    }

    for (key, value) in extensions(input, ctx.ext_prefix) {
        builder = builder.ext(key, value);
    }

    if let Some(taxes) = input.taxes {
        builder = builder.taxes(
            taxes
                .iter()
                .filter_map(|t| resolve_combo(t, ctx.regime, ctx.catalog, ctx.date))
                .collect(),
        );
    }

    trace!("line {} resolved to {quantity} x {price} {}", input.id, ctx.currency);
    Ok(builder.build(index))
}

/// Quantity and unit price of a line.
///
/// The zero sentinel, and any non-positive quantity, prices the whole line
/// as a single unit. A zero or missing unit amount is derived from the
/// total, which can drift from the pre-tax unit price when taxes are
/// inclusive.
pub fn resolve_price(
    input: &LineInput<'_>,
    currency: &Currency,
) -> Result<(Decimal, Decimal), ConvertError> {
    let total = to_decimal(input.amount, currency);
    if input.quantity <= 0 {
        return Ok((Decimal::ONE, total));
    }

    let quantity = Decimal::from(input.quantity);
    if let Some(unit) = input.unit_amount_decimal.filter(|u| !u.is_zero()) {
        return Ok((quantity, minor_decimal_to_amount(unit, currency)));
    }

    let price = div_keep_scale(total, quantity).ok_or_else(|| {
        ConvertError::new(ErrorKind::Arithmetic, "cannot divide line total by quantity")
            .field("quantity")
    })?;
    Ok((quantity, price))
}

/// The computed amount wins; a coupon percentage is used only when no
/// amount was reported. Records with neither are skipped.
fn resolve_discount(record: &DiscountAmount, currency: &Currency) -> Option<Discount> {
    let coupon = record
        .discount
        .as_ref()
        .and_then(|d| d.object())
        .and_then(|d| d.coupon());
    let reason = coupon.and_then(|c| c.name.clone()).filter(|n| !n.trim().is_empty());

    let value = if record.amount != 0 {
        DiscountValue::Amount(to_decimal(record.amount, currency))
    } else {
        DiscountValue::Percent(coupon.and_then(|c| c.percent_off)?)
    };
    Some(Discount { value, reason })
}

fn item_name(input: &LineInput<'_>) -> String {
    input
        .description
        .filter(|d| !d.trim().is_empty())
        .or_else(|| input.product.and_then(|p| p.name.as_deref()))
        .unwrap_or(input.id)
        .to_string()
}

fn line_period(input: &LineInput<'_>) -> Result<Option<Period>, ConvertError> {
    let Some(period) = input.period else {
        return Ok(None);
    };
    Ok(Some(Period {
        start: utc_date(period.start).ok_or_else(|| bad_period("period.start"))?,
        end: utc_date(period.end).ok_or_else(|| bad_period("period.end"))?,
    }))
}

fn bad_period(field: &str) -> ConvertError {
    ConvertError::malformed("timestamp out of range").field(field)
}

/// Calendar day of a unix timestamp in UTC.
pub(crate) fn utc_date(timestamp: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

/// Prefixed metadata with the prefix stripped, product entries first so
/// line entries override them.
fn extensions<'a>(input: &LineInput<'a>, prefix: &str) -> BTreeMap<&'a str, &'a str> {
    let mut ext = BTreeMap::new();
    let sources = input.product.map(|p| &p.metadata).into_iter().chain([input.metadata]);
    for metadata in sources {
        for (key, value) in metadata {
            if let Some(key) = key.strip_prefix(prefix).filter(|k| !k.is_empty()) {
                ext.insert(key, value.as_str());
            }
        }
    }
    ext
}
