//! Static exchange-rate fallback table.
//!
//! Rates are approximate and relative to USD. They only exist so a foreign
//! currency document carries a plausible conversion; the receiving system
//! is expected to replace them with the official rate of the issue date.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::core::{Currency, ExchangeRate};

use super::amount::div_keep_scale;

/// Currency → rate relative to a reference currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    reference: Currency,
    rates: BTreeMap<Currency, Decimal>,
}

static FALLBACK: LazyLock<Arc<RateTable>> = LazyLock::new(|| {
    Arc::new(RateTable::new(
        Currency::new("USD"),
        [
            ("USD", dec!(1.000000)),
            ("EUR", dec!(0.920000)),
            ("GBP", dec!(0.790000)),
            ("CHF", dec!(0.880000)),
            ("JPY", dec!(151.500000)),
            ("CAD", dec!(1.360000)),
            ("AUD", dec!(1.520000)),
            ("NZD", dec!(1.660000)),
            ("SEK", dec!(10.650000)),
            ("NOK", dec!(10.780000)),
            ("DKK", dec!(6.870000)),
            ("PLN", dec!(3.980000)),
            ("CZK", dec!(23.350000)),
            ("HUF", dec!(362.000000)),
            ("RON", dec!(4.580000)),
            ("MXN", dec!(16.700000)),
            ("BRL", dec!(5.050000)),
            ("COP", dec!(3900.000000)),
            ("CLP", dec!(950.000000)),
            ("INR", dec!(83.400000)),
            ("CNY", dec!(7.230000)),
            ("SGD", dec!(1.350000)),
            ("HKD", dec!(7.820000)),
            ("KRW", dec!(1350.000000)),
            ("ZAR", dec!(18.800000)),
            ("AED", dec!(3.672500)),
        ],
    ))
});

impl RateTable {
    pub fn new<'a>(
        reference: Currency,
        rates: impl IntoIterator<Item = (&'a str, Decimal)>,
    ) -> Self {
        Self {
            reference,
            rates: rates
                .into_iter()
                .map(|(code, rate)| (Currency::new(code), rate))
                .collect(),
        }
    }

    /// The built-in table, shared by every converter.
    pub fn fallback() -> Arc<RateTable> {
        Arc::clone(&FALLBACK)
    }

    pub fn reference(&self) -> &Currency {
        &self.reference
    }

    pub fn rate(&self, currency: &Currency) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    /// Units of `to` per unit of `from`, or zero when either is unknown.
    pub fn cross_rate(&self, from: &Currency, to: &Currency) -> Decimal {
        let (Some(from_rate), Some(to_rate)) = (self.rate(from), self.rate(to)) else {
            return Decimal::ZERO;
        };
        let scale = to_rate.scale();
        let mut divisor = from_rate;
        divisor.rescale(scale);
        div_keep_scale(to_rate, divisor)
            .map(|rate| rate.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero))
            .unwrap_or(Decimal::ZERO)
    }

    /// The rate annotation a document needs, or `None` when the document is
    /// already in the regime's currency.
    pub fn exchange_rate(&self, from: &Currency, to: &Currency) -> Option<ExchangeRate> {
        if !needs_exchange_rate(from, to) {
            return None;
        }
        Some(ExchangeRate {
            from: from.clone(),
            to: to.clone(),
            amount: self.cross_rate(from, to),
        })
    }
}

/// True when the document currency differs from the regime currency.
pub fn needs_exchange_rate(document: &Currency, regime: &Currency) -> bool {
    document != regime
}
