// src/flatten.rs

//! Filter/join stage: turns nested customer records into sorted output rows
//! and applies the VIP policy.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::{debug, info};

use crate::model::{Category, Customer, CustomerId, OutputRow, Scalar, VipSet};

/// How VIP membership shapes the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum VipPolicy {
    /// Keep every row, marking `is_vip`.
    #[default]
    Flag,
    /// Keep only rows of VIP customers.
    VipOnly,
}

/// Counts of records dropped while flattening.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub customers_without_id: usize,
    pub customers_with_bad_date: usize,
    pub orders_without_id: usize,
    pub orders_without_number: usize,
    pub orders_with_bad_date: usize,
    pub items_without_id: usize,
    pub rows_not_vip: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.customers_without_id
            + self.customers_with_bad_date
            + self.orders_without_id
            + self.orders_without_number
            + self.orders_with_bad_date
            + self.items_without_id
            + self.rows_not_vip
    }
}

#[derive(Debug, Clone, Default)]
pub struct Flattened {
    pub rows: Vec<OutputRow>,
    pub skipped: SkipCounts,
}

impl Flattened {
    pub fn vip_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_vip).count()
    }
}

/// Numeric part of an order id, compared as an unbounded integer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OrderNumber(String);

impl OrderNumber {
    /// First run of ASCII digits in `id`.
    fn extract(id: &str) -> Option<Self> {
        let start = id.find(|c: char| c.is_ascii_digit())?;
        let digits: String = id[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let trimmed = digits.trim_start_matches('0');
        Some(OrderNumber(if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() }))
    }
}

impl Ord for OrderNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for OrderNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn item_product_id(raw: &Scalar) -> Option<i64> {
    match raw {
        Scalar::Int(i) => Some(*i),
        Scalar::Str(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn render_or_empty(value: Option<&Scalar>) -> String {
    value.and_then(Scalar::render).unwrap_or_default()
}

pub fn flatten(customers: &[Customer], vip_ids: &VipSet, policy: VipPolicy) -> Flattened {
    let mut skipped = SkipCounts::default();
    let mut keyed: Vec<(OrderNumber, OutputRow)> = Vec::new();

    for customer in customers {
        let Some(customer_id) = customer.id.as_ref().and_then(CustomerId::from_scalar) else {
            skipped.customers_without_id += 1;
            debug!("Skipping customer without id");
            continue;
        };
        let registration_date = customer.registration_date.as_ref().and_then(Scalar::as_datetime);
        let Some(registration_date) = registration_date else {
            skipped.customers_with_bad_date += 1;
            debug!(%customer_id, "Skipping customer with invalid registration date");
            continue;
        };
        let customer_name = render_or_empty(customer.name.as_ref());
        let is_vip = vip_ids.contains(&customer_id);

        for order in customer.orders() {
            let Some(order_id) = order.order_id.as_ref().and_then(Scalar::render) else {
                skipped.orders_without_id += 1;
                debug!(%customer_id, "Skipping order without id");
                continue;
            };
            let Some(number) = OrderNumber::extract(&order_id) else {
                skipped.orders_without_number += 1;
                debug!(%customer_id, %order_id, "Skipping order id without numeric part");
                continue;
            };
            let Some(order_date) = order.order_date.as_ref().and_then(Scalar::as_datetime) else {
                skipped.orders_with_bad_date += 1;
                debug!(%customer_id, %order_id, "Skipping order with invalid date");
                continue;
            };

            let order_total: f64 = order.items().iter().map(|i| i.line_total()).sum();

            for item in order.items() {
                let Some(product_id) = item.item_id.as_ref().and_then(item_product_id) else {
                    skipped.items_without_id += 1;
                    debug!(%customer_id, %order_id, "Skipping item without usable id");
                    continue;
                };
                if policy == VipPolicy::VipOnly && !is_vip {
                    skipped.rows_not_vip += 1;
                    continue;
                }

                let unit_price = item.unit_price();
                let item_quantity = item.quantity();
                let total_item_price = item.line_total();
                let total_order_value_percentage = if order_total != 0.0 {
                    total_item_price / order_total * 100.0
                } else {
                    0.0
                };

                keyed.push((
                    number.clone(),
                    OutputRow {
                        customer_id: customer_id.clone(),
                        customer_name: customer_name.clone(),
                        registration_date,
                        is_vip,
                        order_id: order_id.clone(),
                        order_date,
                        product_id,
                        product_name: render_or_empty(item.product_name.as_ref()),
                        category: Category::from_scalar(item.category.as_ref()),
                        unit_price,
                        item_quantity,
                        total_item_price,
                        total_order_value_percentage,
                    },
                ));
            }
        }
    }

    // Stable: ties keep input order.
    keyed.sort_by(|(na, a), (nb, b)| {
        a.customer_id
            .cmp(&b.customer_id)
            .then_with(|| na.cmp(nb))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });

    let rows: Vec<OutputRow> = keyed.into_iter().map(|(_, row)| row).collect();
    info!(
        customers = customers.len(),
        rows = rows.len(),
        skipped = skipped.total(),
        %policy,
        "Flattened order records"
    );

    Flattened { rows, skipped }
}
