// src/validate.rs

//! Data-quality report over the flattened rows. Informational only; nothing
//! here stops the job.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::model::{Category, CustomerId, OutputRow};

const PERCENT_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub total_rows: usize,
    pub empty_customer_names: usize,
    pub empty_product_names: usize,
    pub negative_unit_price: usize,
    pub negative_total_item_price: usize,
    pub negative_quantity: usize,
    pub non_positive_quantity: usize,
    pub orders_before_registration: usize,
    pub duplicate_rows: usize,
    pub orders: usize,
    pub zero_total_orders: usize,
    pub inconsistent_percentage_orders: usize,
}

impl ValidationReport {
    /// Number of findings that point at bad data.
    pub fn issue_count(&self) -> usize {
        self.negative_unit_price
            + self.negative_total_item_price
            + self.negative_quantity
            + self.orders_before_registration
            + self.duplicate_rows
            + self.inconsistent_percentage_orders
    }

    pub fn log(&self) {
        info!(
            rows = self.total_rows,
            orders = self.orders,
            empty_customer_names = self.empty_customer_names,
            empty_product_names = self.empty_product_names,
            "Validation summary"
        );
        info!(
            negative_unit_price = self.negative_unit_price,
            negative_total_item_price = self.negative_total_item_price,
            negative_quantity = self.negative_quantity,
            non_positive_quantity = self.non_positive_quantity,
            "Price and quantity checks"
        );
        info!(
            orders_before_registration = self.orders_before_registration,
            duplicate_rows = self.duplicate_rows,
            zero_total_orders = self.zero_total_orders,
            inconsistent_percentage_orders = self.inconsistent_percentage_orders,
            "Consistency checks"
        );
        if self.issue_count() > 0 {
            warn!(issues = self.issue_count(), "Validation found data issues");
        }
    }
}

#[derive(PartialEq, Eq, Hash)]
struct RowFingerprint<'a> {
    customer_id: &'a CustomerId,
    customer_name: &'a str,
    registration_date: NaiveDateTime,
    is_vip: bool,
    order_id: &'a str,
    order_date: NaiveDateTime,
    product_id: i64,
    product_name: &'a str,
    category: Category,
    floats: [u64; 3],
    item_quantity: i64,
}

impl<'a> From<&'a OutputRow> for RowFingerprint<'a> {
    fn from(row: &'a OutputRow) -> Self {
        RowFingerprint {
            customer_id: &row.customer_id,
            customer_name: &row.customer_name,
            registration_date: row.registration_date,
            is_vip: row.is_vip,
            order_id: &row.order_id,
            order_date: row.order_date,
            product_id: row.product_id,
            product_name: &row.product_name,
            category: row.category,
            floats: [
                row.unit_price.to_bits(),
                row.total_item_price.to_bits(),
                row.total_order_value_percentage.to_bits(),
            ],
            item_quantity: row.item_quantity,
        }
    }
}

pub fn validate(rows: &[OutputRow]) -> ValidationReport {
    let mut report = ValidationReport {
        total_rows: rows.len(),
        ..Default::default()
    };

    let mut seen = HashSet::new();
    // (total price, percentage sum) per order
    let mut per_order: BTreeMap<(&CustomerId, &str), (f64, f64)> = BTreeMap::new();

    for row in rows {
        if row.customer_name.trim().is_empty() {
            report.empty_customer_names += 1;
        }
        if row.product_name.trim().is_empty() {
            report.empty_product_names += 1;
        }
        if row.unit_price < 0.0 {
            report.negative_unit_price += 1;
        }
        if row.total_item_price < 0.0 {
            report.negative_total_item_price += 1;
        }
        if row.item_quantity < 0 {
            report.negative_quantity += 1;
        }
        if row.item_quantity <= 0 {
            report.non_positive_quantity += 1;
        }
        if row.order_date < row.registration_date {
            report.orders_before_registration += 1;
        }
        if !seen.insert(RowFingerprint::from(row)) {
            report.duplicate_rows += 1;
        }

        let entry = per_order
            .entry((&row.customer_id, row.order_id.as_str()))
            .or_insert((0.0, 0.0));
        entry.0 += row.total_item_price;
        entry.1 += row.total_order_value_percentage;
    }

    report.orders = per_order.len();
    for (total, percent) in per_order.values() {
        if *total == 0.0 {
            report.zero_total_orders += 1;
        } else if (percent - 100.0).abs() > PERCENT_TOLERANCE {
            report.inconsistent_percentage_orders += 1;
        }
    }

    report
}
