//! Supplier, customer and delivery-receiver resolution.

use log::debug;

use crate::core::countries::normalize_country_code;
use crate::core::{
    Address, AddressBuilder, Delivery, Identity, Party, PartyBuilder, TaxIdentity, validate_party,
};
use crate::source::{self, Customer, Expandable, Invoice, Shipping, TaxId};

/// Identifier types that are organization identities rather than tax
/// identities, with the identity key they map to. Sorted by type.
static ORG_IDENTITY_TYPES: &[(&str, &str)] = &[("de_stn", "de-tax-number")];

/// Organization identity for identifier types in the fixed set.
pub fn org_identity(tax_id: &TaxId) -> Option<Identity> {
    let idx = ORG_IDENTITY_TYPES
        .binary_search_by_key(&tax_id.id_type.as_str(), |&(t, _)| t)
        .ok()?;
    let value = tax_id.value.trim();
    if value.is_empty() {
        return None;
    }
    Some(Identity {
        key: ORG_IDENTITY_TYPES[idx].1.to_string(),
        code: value.to_string(),
    })
}

/// Derive a tax identity from a platform identifier.
///
/// Tried in order: the explicit country, the two-letter prefix of an EU VAT
/// number, the identifier type's country prefix (`gb_vat` → `GB`).
/// Identifiers that yield no known country are dropped.
pub fn tax_identity(tax_id: &TaxId) -> Option<TaxIdentity> {
    let value = tax_id.value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(country) = tax_id.country.as_deref().and_then(normalize_country_code) {
        return Some(TaxIdentity {
            country,
            code: value.to_string(),
        });
    }

    if tax_id.id_type == "eu_vat" {
        let (prefix, code) = value.split_at_checked(2)?;
        return match normalize_country_code(prefix) {
            Some(country) => Some(TaxIdentity {
                country,
                code: code.to_string(),
            }),
            None => {
                debug!("dropping EU VAT number with unknown country prefix {prefix:?}");
                None
            }
        };
    }

    let prefix = tax_id.id_type.split('_').next().unwrap_or_default();
    match normalize_country_code(prefix) {
        Some(country) => Some(TaxIdentity {
            country,
            code: value.to_string(),
        }),
        None => {
            debug!("dropping tax id of unsupported type {:?}", tax_id.id_type);
            None
        }
    }
}

/// Attach the first identifier that resolves to either identity kind.
fn with_first_identity<'a>(
    mut builder: PartyBuilder,
    tax_ids: impl IntoIterator<Item = &'a TaxId>,
) -> PartyBuilder {
    for tax_id in tax_ids {
        if builder.has_identity() {
            break;
        }
        builder = match org_identity(tax_id) {
            Some(identity) => builder.identity(Some(identity)),
            None => builder.tax_id(tax_identity(tax_id)),
        };
    }
    builder
}

pub fn address(source: Option<&source::Address>) -> Option<Address> {
    let source = source?;
    AddressBuilder::new()
        .street(source.line1.as_deref())
        .additional(source.line2.as_deref())
        .city(source.city.as_deref())
        .postal_code(source.postal_code.as_deref())
        .subdivision(source.state.as_deref())
        .country_code(source.country.as_deref())
        .build()
}

/// The account issuing the invoice.
///
/// Only the first account tax id is considered. Without a usable one the
/// supplier still carries a country-only tax identity when the account
/// country is known.
pub fn resolve_supplier(invoice: &Invoice) -> Option<Party> {
    let first = invoice
        .account_tax_ids
        .as_deref()
        .and_then(<[_]>::first)
        .and_then(Expandable::object);

    let builder = with_first_identity(
        PartyBuilder::new().name(invoice.account_name.as_deref()),
        first,
    );

    if builder.has_identity() {
        return builder.build();
    }
    let fallback = invoice
        .account_country
        .as_deref()
        .and_then(normalize_country_code)
        .map(|country| TaxIdentity {
            country,
            code: String::new(),
        });
    builder.tax_id(fallback).build()
}

/// Customer fields frozen on the invoice at finalization.
#[derive(Debug, Default, Clone, Copy)]
struct Snapshot<'a> {
    name: Option<&'a str>,
    email: Option<&'a str>,
    phone: Option<&'a str>,
    address: Option<&'a source::Address>,
    tax_ids: &'a [TaxId],
}

impl<'a> From<&'a Invoice> for Snapshot<'a> {
    fn from(invoice: &'a Invoice) -> Self {
        Self {
            name: invoice.customer_name.as_deref(),
            email: invoice.customer_email.as_deref(),
            phone: invoice.customer_phone.as_deref(),
            address: invoice.customer_address.as_ref(),
            tax_ids: invoice.customer_tax_ids.as_deref().unwrap_or_default(),
        }
    }
}

/// The invoice customer. Snapshot fields win over the live customer object
/// field by field.
pub fn resolve_customer(invoice: &Invoice) -> Option<Party> {
    build_customer(Snapshot::from(invoice), invoice.customer_object())
}

/// A customer known only through its live object.
pub fn resolve_customer_object(customer: &Customer) -> Option<Party> {
    build_customer(Snapshot::default(), Some(customer))
}

fn pick<'a>(snapshot: Option<&'a str>, live: Option<&'a str>) -> Option<&'a str> {
    snapshot.filter(|s| !s.trim().is_empty()).or(live)
}

fn build_customer(snapshot: Snapshot<'_>, live: Option<&Customer>) -> Option<Party> {
    let name = pick(snapshot.name, live.and_then(|c| c.name.as_deref()));
    let email = pick(snapshot.email, live.and_then(|c| c.email.as_deref()));
    let phone = pick(snapshot.phone, live.and_then(|c| c.phone.as_deref()));
    let addr = snapshot.address.or(live.and_then(|c| c.address.as_ref()));

    let tax_ids: &[TaxId] = if snapshot.tax_ids.is_empty() {
        live.and_then(|c| c.tax_ids.as_ref())
            .map(|list| list.data.as_slice())
            .unwrap_or_default()
    } else {
        snapshot.tax_ids
    };

    let builder = PartyBuilder::new()
        .name(name)
        .email(email)
        .telephone(phone)
        .address(address(addr));
    with_first_identity(builder, tax_ids).build()
}

/// Delivery receiver from the most specific shipping block available.
///
/// Receivers without a name or a complete address are omitted entirely.
pub fn resolve_receiver(invoice: &Invoice) -> Option<Delivery> {
    let shipping = invoice
        .shipping_details
        .as_ref()
        .or(invoice.customer_shipping.as_ref())
        .or(invoice.customer_object().and_then(|c| c.shipping.as_ref()))?;
    receiver(shipping).map(|receiver| Delivery { receiver })
}

fn receiver(shipping: &Shipping) -> Option<Party> {
    let party = PartyBuilder::new()
        .name(shipping.name.as_deref())
        .telephone(shipping.phone.as_deref())
        .address(address(shipping.address.as_ref()))
        .build()?;

    let errors = validate_party(&party, "delivery.receiver");
    if let Some(first) = errors.first() {
        debug!("omitting delivery receiver: {first} ({} problems)", errors.len());
        return None;
    }
    Some(party)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tax_id(value: serde_json::Value) -> TaxId {
        serde_json::from_value(value).unwrap()
    }

    fn invoice(value: serde_json::Value) -> Invoice {
        let mut base = json!({"id": "in_1", "currency": "eur", "created": 1718409600});
        if let (Some(base), Some(extra)) = (base.as_object_mut(), value.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn eu_vat_splits_prefix() {
        let id = tax_identity(&tax_id(json!({"type": "eu_vat", "value": "DE123456789"}))).unwrap();
        assert_eq!(id.country, "DE");
        assert_eq!(id.code, "123456789");
    }

    #[test]
    fn greek_vat_maps_to_gr() {
        let id = tax_identity(&tax_id(json!({"type": "eu_vat", "value": "EL094259216"}))).unwrap();
        assert_eq!(id.country, "GR");
        assert_eq!(id.code, "094259216");
    }

    #[test]
    fn explicit_country_keeps_raw_value() {
        let id = tax_identity(&tax_id(json!({
            "type": "unknown", "value": "ESB12345678", "country": "es"
        })))
        .unwrap();
        assert_eq!(id.country, "ES");
        assert_eq!(id.code, "ESB12345678");
    }

    #[test]
    fn type_prefix_is_tried_as_country() {
        let id = tax_identity(&tax_id(json!({"type": "gb_vat", "value": "GB123456789"}))).unwrap();
        assert_eq!(id.country, "GB");
        assert!(tax_identity(&tax_id(json!({"type": "eu_oss_vat", "value": "EU372"}))).is_none());
        assert!(tax_identity(&tax_id(json!({"type": "eu_vat", "value": "X"}))).is_none());
    }

    #[test]
    fn german_tax_number_is_an_org_identity() {
        let t = tax_id(json!({"type": "de_stn", "value": "143/260/50063"}));
        let identity = org_identity(&t).unwrap();
        assert_eq!(identity.key, "de-tax-number");
        assert_eq!(identity.code, "143/260/50063");
        assert!(org_identity(&tax_id(json!({"type": "eu_vat", "value": "DE1"}))).is_none());
    }

    #[test]
    fn supplier_uses_first_account_tax_id() {
        let inv = invoice(json!({
            "account_name": "ACME GmbH",
            "account_country": "DE",
            "account_tax_ids": [
                {"id": "txi_1", "type": "de_stn", "value": "143/260/50063"},
                {"id": "txi_2", "type": "eu_vat", "value": "DE123456789"}
            ]
        }));
        let supplier = resolve_supplier(&inv).unwrap();
        assert_eq!(supplier.name.as_deref(), Some("ACME GmbH"));
        assert!(supplier.tax_id.is_none());
        assert_eq!(supplier.identity.unwrap().key, "de-tax-number");
    }

    #[test]
    fn supplier_falls_back_to_account_country() {
        let inv = invoice(json!({
            "account_name": "ACME GmbH",
            "account_country": "DE",
            "account_tax_ids": ["txi_1"]
        }));
        let tax_id = resolve_supplier(&inv).unwrap().tax_id.unwrap();
        assert_eq!(tax_id.country, "DE");
        assert!(tax_id.code.is_empty());

        assert!(resolve_supplier(&invoice(json!({}))).is_none());
    }

    #[test]
    fn customer_snapshot_wins_over_live_object() {
        let inv = invoice(json!({
            "customer_name": "Snapshot Ltd",
            "customer_email": null,
            "customer_tax_ids": [{"type": "eu_vat", "value": "FR12345678901"}],
            "customer": {
                "id": "cus_1",
                "name": "Renamed Ltd",
                "email": "billing@example.com",
                "tax_ids": {"data": [{"id": "txi_9", "type": "eu_vat", "value": "NL999"}]}
            }
        }));
        let customer = resolve_customer(&inv).unwrap();
        assert_eq!(customer.name.as_deref(), Some("Snapshot Ltd"));
        assert_eq!(customer.emails, vec!["billing@example.com".to_string()]);
        assert_eq!(customer.tax_id.unwrap().country, "FR");
    }

    #[test]
    fn customer_attaches_at_most_one_identifier() {
        let inv = invoice(json!({
            "customer_tax_ids": [
                {"type": "xx_unknown", "value": "1"},
                {"type": "eu_vat", "value": "IT12345678901"},
                {"type": "de_stn", "value": "143/260/50063"}
            ]
        }));
        let customer = resolve_customer(&inv).unwrap();
        assert_eq!(customer.tax_id.unwrap().country, "IT");
        assert!(customer.identity.is_none());
    }

    #[test]
    fn no_customer_fields_means_no_party() {
        assert!(resolve_customer(&invoice(json!({"customer": "cus_1"}))).is_none());
    }

    #[test]
    fn receiver_prefers_shipping_details() {
        let inv = invoice(json!({
            "shipping_details": {
                "name": "Warehouse",
                "address": {"line1": "Dock 4", "city": "Hamburg", "postal_code": "20457", "country": "de"}
            },
            "customer_shipping": {
                "name": "Home",
                "address": {"city": "Berlin", "country": "DE"}
            }
        }));
        let delivery = resolve_receiver(&inv).unwrap();
        assert_eq!(delivery.receiver.name.as_deref(), Some("Warehouse"));
        assert_eq!(delivery.receiver.addresses[0].country_code.as_deref(), Some("DE"));
    }

    #[test]
    fn invalid_receiver_is_omitted() {
        let inv = invoice(json!({
            "shipping_details": {"name": "Warehouse", "address": {"line1": "Dock 4"}}
        }));
        assert!(resolve_receiver(&inv).is_none());
        assert!(resolve_receiver(&invoice(json!({}))).is_none());
    }

    #[test]
    fn receiver_falls_back_to_customer_shipping() {
        let inv = invoice(json!({
            "customer": {
                "id": "cus_1",
                "shipping": {"name": "Office", "address": {"city": "Madrid", "country": "ES"}}
            }
        }));
        let delivery = resolve_receiver(&inv).unwrap();
        assert_eq!(delivery.receiver.addresses[0].city.as_deref(), Some("Madrid"));
    }
}
