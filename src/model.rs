// src/model.rs

//! Record types flowing through the export job.
//!
//! Input records are deliberately loose: every leaf is a [`Scalar`] so that a
//! single odd value (a price stored as a string, a null name) degrades that
//! field instead of failing the whole load. Coercion into typed values happens
//! in the flattening stage.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize, Serializer};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// A leaf value as it appears in the serialized collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Other(IgnoredAny),
}

impl Scalar {
    /// Lenient float coercion; `None` when the value has no numeric reading.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Str(s) => s.trim().parse::<f64>().ok(),
            Scalar::Other(_) => None,
        }
    }

    /// Lenient integer coercion. Floats truncate toward zero, strings must be
    /// integral. Values outside the `i64` range have no integer reading.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Bool(b) => Some(*b as i64),
            Scalar::Int(i) => Some(*i),
            Scalar::Float(f) => float_to_i64(*f),
            Scalar::Str(s) => s.trim().parse::<i64>().ok(),
            Scalar::Other(_) => None,
        }
    }

    /// Textual rendering used for names and order ids.
    pub fn render(&self) -> Option<String> {
        match self {
            Scalar::Bool(true) => Some("True".to_string()),
            Scalar::Bool(false) => Some("False".to_string()),
            Scalar::Int(i) => Some(i.to_string()),
            Scalar::Float(f) => Some(format!("{:?}", f)),
            Scalar::Str(s) => Some(s.clone()),
            Scalar::Other(_) => None,
        }
    }

    /// Parses a date or datetime string. Offsets are normalized to UTC.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Scalar::Str(s) => parse_datetime(s),
            _ => None,
        }
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    let t = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// One item line inside an order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub item_id: Option<Scalar>,
    #[serde(default)]
    pub product_name: Option<Scalar>,
    #[serde(default)]
    pub category: Option<Scalar>,
    #[serde(default)]
    pub price: Option<Scalar>,
    #[serde(default)]
    pub quantity: Option<Scalar>,
}

impl Item {
    pub fn unit_price(&self) -> f64 {
        self.price.as_ref().and_then(Scalar::as_f64).unwrap_or(0.0)
    }

    pub fn quantity(&self) -> i64 {
        self.quantity.as_ref().and_then(Scalar::as_i64).unwrap_or(0)
    }

    pub fn line_total(&self) -> f64 {
        self.unit_price() * self.quantity() as f64
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub order_id: Option<Scalar>,
    #[serde(default)]
    pub order_date: Option<Scalar>,
    #[serde(default)]
    pub items: Option<Vec<Item>>,
}

impl Order {
    pub fn items(&self) -> &[Item] {
        self.items.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default)]
    pub name: Option<Scalar>,
    #[serde(default)]
    pub registration_date: Option<Scalar>,
    #[serde(default)]
    pub orders: Option<Vec<Order>>,
}

impl Customer {
    pub fn orders(&self) -> &[Order] {
        self.orders.as_deref().unwrap_or(&[])
    }
}

/// Customer identifier. Numeric ids sort before textual ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CustomerId {
    Numeric(i64),
    Text(String),
}

impl CustomerId {
    /// Normalizes a raw identifier; `None` for blank or non-scalar values.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<i64>() {
            Ok(n) => CustomerId::Numeric(n),
            Err(_) => CustomerId::Text(raw.to_string()),
        })
    }

    pub fn from_scalar(value: &Scalar) -> Option<Self> {
        match value {
            Scalar::Str(s) => Self::parse(s),
            Scalar::Other(_) => None,
            other => other.as_i64().map(CustomerId::Numeric),
        }
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerId::Numeric(n) => write!(f, "{}", n),
            CustomerId::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for CustomerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CustomerId::Numeric(n) => serializer.serialize_i64(*n),
            CustomerId::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Set of customer ids granted VIP status.
#[derive(Debug, Clone, Default)]
pub struct VipSet(HashSet<CustomerId>);

impl VipSet {
    pub fn contains(&self, id: &CustomerId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<CustomerId> for VipSet {
    fn from_iter<I: IntoIterator<Item = CustomerId>>(iter: I) -> Self {
        VipSet(iter.into_iter().collect())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, Display, Serialize)]
pub enum Category {
    Electronics,
    Apparel,
    Books,
    #[strum(serialize = "Home Goods")]
    #[serde(rename = "Home Goods")]
    HomeGoods,
    Misc,
}

impl Category {
    pub fn code(self) -> Option<i64> {
        match self {
            Category::Electronics => Some(1),
            Category::Apparel => Some(2),
            Category::Books => Some(3),
            Category::HomeGoods => Some(4),
            Category::Misc => None,
        }
    }

    /// Maps a raw category code. Only integral numbers match; everything else
    /// is `Misc`.
    pub fn from_scalar(value: Option<&Scalar>) -> Self {
        let code = match value {
            Some(Scalar::Int(i)) => Some(*i),
            Some(Scalar::Bool(b)) => Some(*b as i64),
            Some(Scalar::Float(f)) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        };
        code.and_then(|c| Category::iter().find(|cat| cat.code() == Some(c)))
            .unwrap_or(Category::Misc)
    }
}

fn serialize_datetime<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&dt.format("%Y-%m-%d %H:%M:%S"))
}

/// One line of the exported table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub customer_id: CustomerId,
    pub customer_name: String,
    #[serde(serialize_with = "serialize_datetime")]
    pub registration_date: NaiveDateTime,
    pub is_vip: bool,
    pub order_id: String,
    #[serde(serialize_with = "serialize_datetime")]
    pub order_date: NaiveDateTime,
    pub product_id: i64,
    pub product_name: String,
    pub category: Category,
    pub unit_price: f64,
    pub item_quantity: i64,
    pub total_item_price: f64,
    pub total_order_value_percentage: f64,
}

impl OutputRow {
    pub const HEADERS: [&'static str; 13] = [
        "customer_id",
        "customer_name",
        "registration_date",
        "is_vip",
        "order_id",
        "order_date",
        "product_id",
        "product_name",
        "category",
        "unit_price",
        "item_quantity",
        "total_item_price",
        "total_order_value_percentage",
    ];
}
