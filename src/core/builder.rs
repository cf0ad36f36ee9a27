use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::currencies::Currency;
use super::error::ConvertError;
use super::validation::validate_document;
use super::types::*;

/// Builder for constructing canonical documents.
///
/// ```
/// use billing_convert::core::*;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let doc = DocumentBuilder::new(
///     DocumentType::Standard,
///     "INV-0001",
///     NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
///     Currency::new("eur"),
/// )
/// .supplier(PartyBuilder::new().name(Some("ACME GmbH")).build())
/// .add_line(LineBuilder::new("Consulting", dec!(150.00)).quantity(dec!(2)).build(1))
/// .build()
/// .unwrap();
///
/// assert_eq!(doc.lines[0].quantity, dec!(2));
/// assert!(doc.exchange_rates.is_none());
/// ```
pub struct DocumentBuilder {
    doc_type: DocumentType,
    code: String,
    issue_date: NaiveDate,
    currency: Currency,
    uuid: Option<Uuid>,
    exchange_rate: Option<ExchangeRate>,
    preceding: Vec<DocumentRef>,
    prices_include: Option<TaxCategory>,
    supplier: Option<Party>,
    customer: Option<Party>,
    lines: Vec<Line>,
    ordering: Option<Ordering>,
    delivery: Option<Delivery>,
    payment: Option<Payment>,
    notes: Vec<Note>,
}

impl DocumentBuilder {
    pub fn new(
        doc_type: DocumentType,
        code: impl Into<String>,
        issue_date: NaiveDate,
        currency: Currency,
    ) -> Self {
        Self {
            doc_type,
            code: code.into(),
            issue_date,
            currency,
            uuid: None,
            exchange_rate: None,
            preceding: Vec::new(),
            prices_include: None,
            supplier: None,
            customer: None,
            lines: Vec::new(),
            ordering: None,
            delivery: None,
            payment: None,
            notes: Vec::new(),
        }
    }

    pub fn uuid(mut self, uuid: Option<Uuid>) -> Self {
        self.uuid = uuid;
        self
    }

    pub fn exchange_rate(mut self, rate: Option<ExchangeRate>) -> Self {
        self.exchange_rate = rate;
        self
    }

    pub fn preceding(mut self, reference: DocumentRef) -> Self {
        self.preceding.push(reference);
        self
    }

    pub fn prices_include(mut self, category: Option<TaxCategory>) -> Self {
        self.prices_include = category;
        self
    }

    pub fn supplier(mut self, party: Option<Party>) -> Self {
        self.supplier = party;
        self
    }

    pub fn customer(mut self, party: Option<Party>) -> Self {
        self.customer = party;
        self
    }

    pub fn add_line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    pub fn lines(mut self, lines: Vec<Line>) -> Self {
        self.lines = lines;
        self
    }

    pub fn ordering(mut self, ordering: Option<Ordering>) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn delivery(mut self, delivery: Option<Delivery>) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn payment(mut self, payment: Option<Payment>) -> Self {
        self.payment = payment;
        self
    }

    pub fn note(mut self, key: NoteKey, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.notes.push(Note { key, text });
        }
        self
    }

    /// Build the document. Totals are left for the calculation engine.
    ///
    /// Fails with `ErrorKind::Invalid` and every structural problem
    /// attached when the document could never be accepted.
    pub fn build(self) -> Result<Document, ConvertError> {
        let doc = Document {
            uuid: self.uuid,
            doc_type: self.doc_type,
            code: self.code,
            issue_date: self.issue_date,
            currency: self.currency,
            exchange_rates: self.exchange_rate.map(|rate| vec![rate]),
            preceding: self.preceding,
            prices_include: self.prices_include,
            supplier: self.supplier,
            customer: self.customer,
            lines: self.lines,
            ordering: self.ordering,
            delivery: self.delivery,
            payment: self.payment,
            notes: self.notes,
            totals: None,
        };

        let errors = validate_document(&doc);
        if errors.is_empty() {
            Ok(doc)
        } else {
            Err(ConvertError::invalid(errors))
        }
    }
}

/// Accumulates party fields as they are discovered.
///
/// Nothing is allocated until the first non-blank field arrives; `build`
/// returns `None` when no field was ever set.
#[derive(Debug, Default)]
pub struct PartyBuilder {
    party: Option<Party>,
}

impl PartyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn party(&mut self) -> &mut Party {
        self.party.get_or_insert_with(Party::default)
    }

    pub fn name(mut self, name: Option<&str>) -> Self {
        if let Some(name) = non_blank(name) {
            self.party().name = Some(name);
        }
        self
    }

    pub fn email(mut self, email: Option<&str>) -> Self {
        if let Some(email) = non_blank(email) {
            self.party().emails.push(email);
        }
        self
    }

    pub fn telephone(mut self, phone: Option<&str>) -> Self {
        if let Some(phone) = non_blank(phone) {
            self.party().telephones.push(phone);
        }
        self
    }

    pub fn address(mut self, address: Option<Address>) -> Self {
        if let Some(address) = address {
            self.party().addresses.push(address);
        }
        self
    }

    /// Whether a tax or organization identity is already attached.
    pub fn has_identity(&self) -> bool {
        self.party
            .as_ref()
            .is_some_and(|p| p.tax_id.is_some() || p.identity.is_some())
    }

    /// Attach a tax identity unless the party already has an identity.
    pub fn tax_id(mut self, tax_id: Option<TaxIdentity>) -> Self {
        if let Some(tax_id) = tax_id {
            if !self.has_identity() {
                self.party().tax_id = Some(tax_id);
            }
        }
        self
    }

    /// Attach an organization identity unless the party already has an identity.
    pub fn identity(mut self, identity: Option<Identity>) -> Self {
        if let Some(identity) = identity {
            if !self.has_identity() {
                self.party().identity = Some(identity);
            }
        }
        self
    }

    pub fn build(self) -> Option<Party> {
        self.party
    }
}

/// Lazily built postal address, see [`PartyBuilder`].
#[derive(Debug, Default)]
pub struct AddressBuilder {
    address: Option<Address>,
}

impl AddressBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn address(&mut self) -> &mut Address {
        self.address.get_or_insert_with(Address::default)
    }

    pub fn street(mut self, street: Option<&str>) -> Self {
        if let Some(street) = non_blank(street) {
            self.address().street = Some(street);
        }
        self
    }

    pub fn additional(mut self, additional: Option<&str>) -> Self {
        if let Some(additional) = non_blank(additional) {
            self.address().additional = Some(additional);
        }
        self
    }

    pub fn city(mut self, city: Option<&str>) -> Self {
        if let Some(city) = non_blank(city) {
            self.address().city = Some(city);
        }
        self
    }

    pub fn postal_code(mut self, code: Option<&str>) -> Self {
        if let Some(code) = non_blank(code) {
            self.address().postal_code = Some(code);
        }
        self
    }

    pub fn subdivision(mut self, subdivision: Option<&str>) -> Self {
        if let Some(subdivision) = non_blank(subdivision) {
            self.address().subdivision = Some(subdivision);
        }
        self
    }

    pub fn country_code(mut self, country: Option<&str>) -> Self {
        if let Some(country) = non_blank(country) {
            self.address().country_code = Some(country.to_ascii_uppercase());
        }
        self
    }

    pub fn build(self) -> Option<Address> {
        self.address
    }
}

/// Builder for Line.
pub struct LineBuilder {
    name: String,
    price: Decimal,
    quantity: Decimal,
    reference: Option<String>,
    ext: BTreeMap<String, String>,
    discounts: Vec<Discount>,
    taxes: Option<Vec<TaxCombo>>,
    period: Option<Period>,
}

impl LineBuilder {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            quantity: Decimal::ONE,
            reference: None,
            ext: Default::default(),
            discounts: Vec::new(),
            taxes: None,
            period: None,
        }
    }

    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn reference(mut self, reference: Option<&str>) -> Self {
        self.reference = non_blank(reference);
        self
    }

    pub fn ext(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ext.insert(key.into(), value.into());
        self
    }

    pub fn add_discount(mut self, discount: Discount) -> Self {
        self.discounts.push(discount);
        self
    }

    /// Set the line taxes; an empty list is kept as `None`.
    pub fn taxes(mut self, taxes: Vec<TaxCombo>) -> Self {
        self.taxes = if taxes.is_empty() { None } else { Some(taxes) };
        self
    }

    pub fn period(mut self, period: Option<Period>) -> Self {
        self.period = period;
        self
    }

    pub fn build(self, index: usize) -> Line {
        Line {
            index,
            quantity: self.quantity,
            item: Item {
                name: self.name,
                price: self.price,
                reference: self.reference,
                ext: self.ext,
            },
            discounts: self.discounts,
            taxes: self.taxes,
            period: self.period,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
