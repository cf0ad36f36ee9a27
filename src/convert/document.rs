//! Document assembly.
//!
//! Runs every resolver over a source invoice or credit note and collects
//! the results into a [`Document`]. Any hard error is tagged with the
//! source object id before it leaves this module.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::{
    ConvertError, Currency, Document, DocumentBuilder, DocumentRef, DocumentType, Line, NoteKey,
    Ordering, Period,
};
use crate::source::{CreditNote, Expandable, Invoice};

use super::Converter;
use super::line::{LineContext, LineInput, resolve_line, utc_date};
use super::party::{resolve_customer, resolve_customer_object, resolve_receiver, resolve_supplier};
use super::payment::resolve_payment;
use super::tax::prices_include;

/// Name-based (v3) identifier over `"{account}:{id}"`, or `None` without a
/// namespace.
pub fn document_uuid(namespace: Option<Uuid>, account: &str, id: &str) -> Option<Uuid> {
    let namespace = namespace?;
    Some(Uuid::new_v3(&namespace, format!("{account}:{id}").as_bytes()))
}

/// The period every line shares, if they all carry the same one.
pub fn common_period(lines: &[Line]) -> Option<Period> {
    let (first, rest) = lines.split_first()?;
    let period = first.period?;
    rest.iter()
        .all(|line| line.period == Some(period))
        .then_some(period)
}

fn issue_date(
    id: &str,
    created: i64,
    effective_at: Option<i64>,
) -> Result<NaiveDate, ConvertError> {
    let (field, timestamp) = match effective_at {
        Some(ts) => ("effective_at", ts),
        None => ("created", created),
    };
    utc_date(timestamp)
        .ok_or_else(|| ConvertError::malformed("timestamp out of range").object(id).field(field))
}

/// Number when finalized, the platform id otherwise.
fn natural_code<'a>(number: Option<&'a str>, id: &'a str) -> &'a str {
    number.filter(|n| !n.trim().is_empty()).unwrap_or(id)
}

/// Line errors name the document and the line's position in it.
fn resolve_lines<'a, T: 'a>(
    converter: &Converter,
    id: &str,
    lines: impl IntoIterator<Item = &'a T>,
    currency: &Currency,
    date: NaiveDate,
) -> Result<Vec<Line>, ConvertError>
where
    LineInput<'a>: From<&'a T>,
{
    let ctx = LineContext {
        currency,
        regime: converter.regime(),
        catalog: converter.rate_catalog(),
        date,
        ext_prefix: converter.options().ext_prefix.as_str(),
    };
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            resolve_line(&LineInput::from(line), &ctx, i + 1)
                .map_err(|e| e.nested(&format!("lines[{i}]")).object(id))
        })
        .collect()
}

pub(crate) fn assemble_invoice(
    converter: &Converter,
    invoice: &Invoice,
) -> Result<Document, ConvertError> {
    let id = invoice.id.as_str();
    let date = issue_date(id, invoice.created, invoice.effective_at)?;
    let currency = Currency::new(&invoice.currency);
    let lines = resolve_lines(converter, id, &invoice.lines.data, &currency, date)?;
    let account = invoice.account_name.as_deref().unwrap_or_default();

    DocumentBuilder::new(
        DocumentType::Standard,
        natural_code(invoice.number.as_deref(), id),
        date,
        currency.clone(),
    )
    .uuid(document_uuid(converter.options().namespace, account, id))
    .exchange_rate(converter.rate_table().exchange_rate(&currency, &converter.regime().currency))
    .prices_include(prices_include(invoice.total_taxes.as_deref().unwrap_or_default()))
    .supplier(resolve_supplier(invoice))
    .customer(resolve_customer(invoice))
    .ordering(common_period(&lines).map(|period| Ordering { period }))
    .lines(lines)
    .delivery(resolve_receiver(invoice))
    .payment(resolve_payment(invoice, &currency)?)
    .note(NoteKey::General, invoice.description.as_deref().unwrap_or_default())
    .note(NoteKey::Legal, invoice.footer.as_deref().unwrap_or_default())
    .build()
    .map_err(|e| e.or_object(id))
}

pub(crate) fn assemble_credit_note(
    converter: &Converter,
    credit_note: &CreditNote,
) -> Result<Document, ConvertError> {
    let id = credit_note.id.as_str();
    let date = issue_date(id, credit_note.created, credit_note.effective_at)?;
    let currency = Currency::new(&credit_note.currency);
    let lines = resolve_lines(converter, id, &credit_note.lines.data, &currency, date)?;

    let original = credit_note.invoice_object();
    let account = original
        .and_then(|inv| inv.account_name.as_deref())
        .unwrap_or_default();
    let customer = match original {
        Some(inv) => resolve_customer(inv),
        None => credit_note.customer_object().and_then(resolve_customer_object),
    };

    let mut builder = DocumentBuilder::new(
        DocumentType::CreditNote,
        natural_code(credit_note.number.as_deref(), id),
        date,
        currency.clone(),
    )
    .uuid(document_uuid(converter.options().namespace, account, id))
    .exchange_rate(converter.rate_table().exchange_rate(&currency, &converter.regime().currency))
    .prices_include(prices_include(credit_note.total_taxes.as_deref().unwrap_or_default()))
    .supplier(original.and_then(resolve_supplier))
    .customer(customer)
    .ordering(common_period(&lines).map(|period| Ordering { period }))
    .lines(lines)
    .note(NoteKey::General, credit_note.memo.as_deref().unwrap_or_default());

    if let Some(reference) = credit_note.invoice.as_ref().map(preceding).transpose()? {
        builder = builder.preceding(reference);
    }
    if let Some(reason) = credit_note.reason.as_deref() {
        builder = builder.note(NoteKey::Reason, reason_text(reason));
    }

    builder.build().map_err(|e| e.or_object(id))
}

/// Reference to the credited invoice. A bare id carries no issue date.
fn preceding(invoice: &Expandable<Invoice>) -> Result<DocumentRef, ConvertError> {
    match invoice {
        Expandable::Id(id) => Ok(DocumentRef {
            code: id.clone(),
            issue_date: None,
        }),
        Expandable::Object(inv) => Ok(DocumentRef {
            code: natural_code(inv.number.as_deref(), &inv.id).to_string(),
            issue_date: Some(issue_date(&inv.id, inv.created, inv.effective_at)?),
        }),
    }
}

fn reason_text(reason: &str) -> String {
    match reason {
        "duplicate" => "Duplicate charge".to_string(),
        "fraudulent" => "Fraudulent charge".to_string(),
        "order_change" => "Order change".to_string(),
        "product_unsatisfactory" => "Product unsatisfactory".to_string(),
        other => other.replace('_', " "),
    }
}
