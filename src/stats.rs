// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Cross-entity aggregates.
//!
//! Every function here is a pure fold over collection snapshots, so the
//! results are identical regardless of which store backend produced the
//! slices. All product and customer references are soft: an aggregate must
//! tolerate records naming entities that no longer exist.

use crate::customer::Customer;
use crate::product::Product;
use crate::record::{MovementKind, StockRecord};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// Default entry cap for ranked aggregates.
pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Sales total for one product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub name: String,
    pub total_sold: i64,
}

/// Sales total joined to the product it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSalesDetail {
    pub name: String,
    pub total_sold: i64,
    pub product: Product,
}

/// Sums outgoing quantities per product name in first-appearance order.
fn outgoing_totals(records: &[StockRecord]) -> Vec<ProductSales> {
    let mut totals: Vec<ProductSales> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records.iter().filter(|r| r.kind == MovementKind::Outgoing) {
        match index.get(record.name.as_str()) {
            Some(&i) => totals[i].total_sold += record.quantity,
            None => {
                index.insert(record.name.as_str(), totals.len());
                totals.push(ProductSales {
                    name: record.name.clone(),
                    total_sold: record.quantity,
                });
            }
        }
    }

    totals
}

/// Top products by outgoing quantity.
///
/// Groups outgoing records by name, sorts descending by total sold (ties
/// keep first appearance order in the record log), and truncates to
/// `limit`. Names that no longer match a product are still listed.
pub fn best_selling(records: &[StockRecord], limit: usize) -> Vec<ProductSales> {
    let mut totals = outgoing_totals(records);
    totals.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));
    totals.truncate(limit);
    totals
}

/// Like [`best_selling`], inner-joined to the product catalogue.
///
/// Entries whose name no longer resolves to a product are dropped, so the
/// result may hold fewer than `limit` entries.
pub fn best_selling_with_details(
    records: &[StockRecord],
    products: &[Product],
    limit: usize,
) -> Vec<ProductSalesDetail> {
    best_selling(records, limit)
        .into_iter()
        .filter_map(|sales| {
            products
                .iter()
                .find(|p| p.name == sales.name)
                .map(|product| ProductSalesDetail {
                    name: sales.name,
                    total_sold: sales.total_sold,
                    product: product.clone(),
                })
        })
        .collect()
}

/// How customer spend is totalled.
///
/// The source system disagreed with itself here: earlier iterations summed
/// the raw `cost` field, later ones `cost * quantity`. Both survive as
/// explicit strategies; [`SpendFormula::CostTimesQuantity`] is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpendFormula {
    /// Sum the record `cost` field alone.
    RawCost,
    /// Sum `cost * quantity` per record.
    #[default]
    CostTimesQuantity,
}

impl SpendFormula {
    fn spend(&self, record: &StockRecord) -> Decimal {
        match self {
            SpendFormula::RawCost => record.cost,
            SpendFormula::CostTimesQuantity => record.cost * Decimal::from(record.quantity),
        }
    }
}

/// Spend total for one counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSpend {
    /// The record `supplier` field the group was keyed on.
    pub supplier: String,
    pub total_spent: Decimal,
    /// Customer matched by name, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
}

/// Top counterparties by spend on outgoing records.
///
/// Groups outgoing records by their `supplier` field (records without one
/// are skipped), totals spend per `formula`, sorts descending, truncates
/// to `limit`, and left-joins each group to a customer by exact name.
pub fn top_customers(
    records: &[StockRecord],
    customers: &[Customer],
    formula: SpendFormula,
    limit: usize,
) -> Vec<CustomerSpend> {
    let mut totals: Vec<CustomerSpend> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records.iter().filter(|r| r.kind == MovementKind::Outgoing) {
        let Some(supplier) = record.supplier.as_deref() else {
            continue;
        };
        let spend = formula.spend(record);
        match index.get(supplier) {
            Some(&i) => totals[i].total_spent += spend,
            None => {
                index.insert(supplier, totals.len());
                totals.push(CustomerSpend {
                    supplier: supplier.to_string(),
                    total_spent: spend,
                    customer: None,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
    totals.truncate(limit);

    for entry in &mut totals {
        entry.customer = customers.iter().find(|c| c.name == entry.supplier).cloned();
    }

    totals
}

/// One purchase line in a per-customer report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    pub name: String,
    pub quantity: i64,
    pub cost: Decimal,
    /// `cost * quantity`, the canonical line value.
    pub total_cost: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    /// Soft reference resolution; serializes as `{}` when the product is
    /// gone.
    #[serde(serialize_with = "serialize_product_details")]
    pub product_details: Option<Product>,
}

fn serialize_product_details<S>(
    value: &Option<Product>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(product) => product.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

/// Purchase report for one customer.
///
/// `total_spent` sums the raw `cost` field, *not* `cost * quantity` — the
/// source systems kept this asymmetry against the cross-customer ranking,
/// and it is preserved here (per-line `total_cost` carries the product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReport {
    pub customer: Customer,
    pub total_spent: Decimal,
    pub total_records: usize,
    pub purchases: Vec<PurchaseLine>,
}

/// Builds a purchase report for every customer.
///
/// A customer's records are the outgoing ones whose `customerId` matches;
/// each line resolves its product by name, tolerating absence.
pub fn per_customer_stats(
    customers: &[Customer],
    records: &[StockRecord],
    products: &[Product],
) -> Vec<CustomerReport> {
    customers
        .iter()
        .map(|customer| {
            let mut total_spent = Decimal::ZERO;
            let mut purchases = Vec::new();

            for record in records.iter().filter(|r| {
                r.kind == MovementKind::Outgoing && r.customer_id == Some(customer.id)
            }) {
                total_spent += record.cost;
                purchases.push(PurchaseLine {
                    name: record.name.clone(),
                    quantity: record.quantity,
                    cost: record.cost,
                    total_cost: record.cost * Decimal::from(record.quantity),
                    supplier: record.supplier.clone(),
                    product_details: products.iter().find(|p| p.name == record.name).cloned(),
                });
            }

            CustomerReport {
                customer: customer.clone(),
                total_spent,
                total_records: purchases.len(),
                purchases,
            }
        })
        .collect()
}

/// Record counts per movement type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStats {
    pub incoming: usize,
    pub outgoing: usize,
}

/// Groups all records by movement type.
pub fn type_stats(records: &[StockRecord]) -> TypeStats {
    let incoming = records
        .iter()
        .filter(|r| r.kind == MovementKind::Incoming)
        .count();
    TypeStats {
        incoming,
        outgoing: records.len() - incoming,
    }
}

/// Independent totals for the dashboard; no joins involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub products: usize,
    pub records: usize,
    pub customers: usize,
}
