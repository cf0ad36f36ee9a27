//! Payment terms, instructions and advances of an invoice.

use rust_decimal::Decimal;

use crate::core::{
    Advance, ConvertError, Currency, DueDate, Payment, PaymentInstructions, PaymentMeans,
    PaymentTerms, TermsKey,
};
use crate::source::Invoice;

use super::amount::to_decimal;
use super::line::utc_date;

/// Platform payment method type → payment means. Sorted by type.
static PAYMENT_METHOD_MEANS: &[(&str, PaymentMeans)] = &[
    ("acss_debit", PaymentMeans::DirectDebit),
    ("affirm", PaymentMeans::Online),
    ("alipay", PaymentMeans::Online),
    ("au_becs_debit", PaymentMeans::DirectDebit),
    ("bacs_debit", PaymentMeans::DirectDebit),
    ("bancontact", PaymentMeans::Online),
    ("card", PaymentMeans::Card),
    ("customer_balance", PaymentMeans::CreditTransfer),
    ("ideal", PaymentMeans::Online),
    ("klarna", PaymentMeans::Online),
    ("link", PaymentMeans::Online),
    ("paypal", PaymentMeans::Online),
    ("sepa_credit_transfer", PaymentMeans::CreditTransfer),
    ("sepa_debit", PaymentMeans::DirectDebit),
    ("sofort", PaymentMeans::Online),
    ("us_bank_account", PaymentMeans::DirectDebit),
];

/// Means for a platform payment method type, `Any` when unknown.
pub fn payment_means(method_type: &str) -> PaymentMeans {
    PAYMENT_METHOD_MEANS
        .binary_search_by_key(&method_type, |&(t, _)| t)
        .map(|idx| PAYMENT_METHOD_MEANS[idx].1)
        .unwrap_or(PaymentMeans::Any)
}

/// Payment block of an invoice, `None` when there is nothing to say.
pub fn resolve_payment(
    invoice: &Invoice,
    currency: &Currency,
) -> Result<Option<Payment>, ConvertError> {
    let payment = Payment {
        terms: terms(invoice)?,
        instructions: instructions(invoice),
        advances: advances(invoice, currency)?,
    };
    if payment.terms.is_none() && payment.instructions.is_none() && payment.advances.is_empty() {
        return Ok(None);
    }
    Ok(Some(payment))
}

fn terms(invoice: &Invoice) -> Result<Option<PaymentTerms>, ConvertError> {
    if invoice.collection_method.as_deref() == Some("charge_automatically") {
        return Ok(Some(PaymentTerms {
            key: TermsKey::Instant,
            due_dates: Vec::new(),
        }));
    }
    let Some(due) = invoice.due_date else {
        return Ok(None);
    };
    let date = utc_date(due).ok_or_else(|| bad_timestamp(invoice, "due_date"))?;
    Ok(Some(PaymentTerms {
        key: TermsKey::DueDate,
        due_dates: vec![DueDate {
            date,
            percent: Decimal::ONE_HUNDRED,
        }],
    }))
}

/// Only the first configured method is described.
fn instructions(invoice: &Invoice) -> Option<PaymentInstructions> {
    let method = invoice
        .payment_settings
        .as_ref()?
        .payment_method_types
        .as_deref()?
        .first()?;
    let means = payment_means(method);
    Some(PaymentInstructions {
        means,
        detail: (means == PaymentMeans::Any).then(|| method.clone()),
    })
}

fn advances(invoice: &Invoice, currency: &Currency) -> Result<Vec<Advance>, ConvertError> {
    if invoice.amount_paid <= 0 {
        return Ok(Vec::new());
    }
    let paid_at = invoice
        .status_transitions
        .as_ref()
        .and_then(|s| s.paid_at);
    let date = match paid_at {
        Some(ts) => {
            Some(utc_date(ts).ok_or_else(|| bad_timestamp(invoice, "status_transitions.paid_at"))?)
        }
        None => None,
    };
    Ok(vec![Advance {
        date,
        description: "Paid".to_string(),
        amount: to_decimal(invoice.amount_paid, currency),
    }])
}

fn bad_timestamp(invoice: &Invoice, field: &str) -> ConvertError {
    ConvertError::malformed("timestamp out of range")
        .object(&invoice.id)
        .field(field)
}
