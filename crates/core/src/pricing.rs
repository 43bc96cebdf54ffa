//! Price and commission simulation for `product` fields.
//!
//! Everything here is a pure function of its inputs. A value that carries no
//! usable price produces `None` ("no price info") and the caller renders
//! nothing; only an out-of-range commission is an error.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Upper bound for a commission percentage (inclusive).
pub const MAX_COMMISSION_PERCENT: f64 = 1000.0;

// ---------------------------------------------------------------------------
// PriceValue
// ---------------------------------------------------------------------------

/// Stored shape of a `product` field value. Amounts share one currency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceValue {
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotional_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_promotional_price: Option<f64>,
}

impl PriceValue {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            ..Self::default()
        }
    }

    pub fn with_promotional(mut self, promotional_price: f64) -> Self {
        self.promotional_price = Some(promotional_price);
        self
    }

    pub fn with_old_price(mut self, old_price: f64) -> Self {
        self.old_price = Some(old_price);
        self
    }

    /// Price actually charged: the promotional price when present.
    pub fn effective_price(&self) -> f64 {
        self.promotional_price.unwrap_or(self.price)
    }

    /// Read a price payload out of a loosely shaped stored value.
    ///
    /// Accepts an object with a numeric (or numeric string) `price`, a bare
    /// number, a numeric string, or a string holding a JSON object. Returns
    /// `None` when no non-negative finite `price` can be found.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(map) => {
                let price = map.get("price").and_then(parse_amount)?;
                let optional = |key: &str| map.get(key).and_then(parse_amount);
                Some(Self {
                    price,
                    promotional_price: optional("promotional_price"),
                    old_price: optional("old_price"),
                    old_promotional_price: optional("old_promotional_price"),
                })
            }
            serde_json::Value::Number(_) => parse_amount(value).map(Self::new),
            serde_json::Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.starts_with('{') {
                    serde_json::from_str::<serde_json::Value>(trimmed)
                        .ok()
                        .and_then(|parsed| Self::from_json(&parsed))
                } else {
                    parse_amount(value).map(Self::new)
                }
            }
            _ => None,
        }
    }
}

/// Parse a monetary amount from a JSON number or string.
///
/// Strings may carry a `R$` prefix and Brazilian separators (`1.234,56`).
/// Negative and non-finite amounts are rejected.
pub fn parse_amount(value: &serde_json::Value) -> Option<f64> {
    let amount = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => {
            let cleaned = s.trim().trim_start_matches("R$").trim();
            if cleaned.is_empty() {
                return None;
            }
            let normalized = if cleaned.contains(',') {
                cleaned.replace('.', "").replace(',', ".")
            } else {
                cleaned.to_string()
            };
            normalized.parse::<f64>().ok()?
        }
        _ => return None,
    };
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

/// Effective price of a stored product value, used as its sort key.
pub fn extract_price(value: &serde_json::Value) -> Option<f64> {
    PriceValue::from_json(value).map(|p| p.effective_price())
}

// ---------------------------------------------------------------------------
// Commission & mode
// ---------------------------------------------------------------------------

/// A validated commission percentage in `0..=1000`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Commission(f64);

impl Commission {
    pub const ZERO: Commission = Commission(0.0);

    pub fn new(percent: f64) -> Result<Self, CoreError> {
        if !percent.is_finite() || !(0.0..=MAX_COMMISSION_PERCENT).contains(&percent) {
            return Err(CoreError::Validation(format!(
                "Commission must be between 0 and {MAX_COMMISSION_PERCENT}, got {percent}"
            )));
        }
        Ok(Self(percent))
    }

    pub fn percent(self) -> f64 {
        self.0
    }

    /// Margin this commission adds on top of `amount`.
    pub fn margin_on(self, amount: f64) -> f64 {
        amount * self.0 / 100.0
    }
}

impl<'de> Deserialize<'de> for Commission {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let percent = f64::deserialize(deserializer)?;
        Commission::new(percent).map_err(serde::de::Error::custom)
    }
}

/// Where the price is being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    /// Public listing: commission is already part of the stored prices.
    Marketplace,
    /// Review form: commission is layered on top of the stored prices.
    #[default]
    Form,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Result of a price simulation, ready to be formatted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSimulation {
    pub mode: PriceMode,
    pub original_price: f64,
    pub promotional_price: Option<f64>,
    /// `promotional_price ?? original_price`.
    pub final_price: f64,
    pub margin_value: f64,
    pub price_with_commission: f64,
    /// Struck-through price shown next to the displayed one.
    pub comparison_price: Option<f64>,
    pub discount_percentage: Option<i64>,
}

impl PriceSimulation {
    /// The price a viewer actually sees in this mode.
    pub fn displayed_price(&self) -> f64 {
        match self.mode {
            PriceMode::Form => self.price_with_commission,
            PriceMode::Marketplace => self.final_price,
        }
    }
}

/// Simulate a typed price payload.
pub fn simulate(price: &PriceValue, commission: Commission, mode: PriceMode) -> PriceSimulation {
    let original_price = price.price;
    let promotional_price = price.promotional_price;
    let final_price = price.effective_price();

    let (margin_value, comparison_price) = match mode {
        PriceMode::Form => {
            let comparison =
                promotional_price.map(|_| original_price + commission.margin_on(original_price));
            (commission.margin_on(final_price), comparison)
        }
        PriceMode::Marketplace => {
            let comparison = match promotional_price {
                None => price.old_price,
                Some(_) => Some(original_price),
            };
            (0.0, comparison)
        }
    };
    let price_with_commission = final_price + margin_value;

    let displayed = match mode {
        PriceMode::Form => price_with_commission,
        PriceMode::Marketplace => final_price,
    };
    let discount_percentage = comparison_price
        .filter(|&comparison| comparison > 0.0 && comparison > displayed)
        .map(|comparison| ((comparison - displayed) / comparison * 100.0).round() as i64);

    PriceSimulation {
        mode,
        original_price,
        promotional_price,
        final_price,
        margin_value,
        price_with_commission,
        comparison_price,
        discount_percentage,
    }
}

/// Simulate a stored value of any shape. `None` means "no price info".
pub fn simulate_value(
    value: &serde_json::Value,
    commission: Commission,
    mode: PriceMode,
) -> Option<PriceSimulation> {
    PriceValue::from_json(value).map(|price| simulate(&price, commission, mode))
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format an amount as Brazilian reais, e.g. `R$ 1.234,56`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{fraction:02}")
}
