//! Market data models

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One entry of the `coins/markets` response.
///
/// Only `name` and `current_price` feed the chart; every other field is
/// ignored. Both are decoded leniently so one odd record can't sink the
/// whole response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoinMarketRecord {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub current_price: Option<f64>,
}

impl CoinMarketRecord {
    pub fn new(name: impl Into<String>, current_price: Option<f64>) -> Self {
        Self {
            name: name.into(),
            current_price,
        }
    }

    /// Price used for ranking. A missing price ranks as zero.
    pub fn price(&self) -> f64 {
        self.current_price.unwrap_or(0.0)
    }
}

/// Anything but a string becomes an empty label
fn lenient_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Anything but a finite number becomes a missing price
fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(deserializer)?
        .as_f64()
        .filter(|p| p.is_finite()))
}
