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

//! Stock-movement records.
//!
//! A record is one movement event: incoming (restock) or outgoing (sale).
//! Records reference products by name and customers by id as soft
//! references; neither is enforced, and a record outlives the entities it
//! points at.

use crate::base::{CustomerId, RecordId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Incoming,
    Outgoing,
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementKind::Incoming => write!(f, "incoming"),
            MovementKind::Outgoing => write!(f, "outgoing"),
        }
    }
}

/// A single stock-movement record.
///
/// `cost` is the total monetary value of the movement. `supplier` doubles
/// as the counterparty name on outgoing movements, which is what the
/// cross-customer ranking groups by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    /// Soft reference to a product by name.
    pub name: String,
    pub quantity: i64,
    pub date: NaiveDate,
    pub cost: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
}

/// Payload for creating a record.
///
/// The movement kind is *not* part of the payload: the creating endpoint's
/// path segment fixes it, overriding anything the client sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub name: String,
    pub quantity: i64,
    pub date: NaiveDate,
    pub cost: Decimal,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
}

impl NewRecord {
    /// Builds the stored record with a fresh id and the kind fixed by the
    /// caller.
    pub fn into_record(self, kind: MovementKind) -> StockRecord {
        StockRecord {
            id: RecordId::generate(),
            kind,
            name: self.name,
            quantity: self.quantity,
            date: self.date,
            cost: self.cost,
            supplier: self.supplier,
            customer_id: self.customer_id,
        }
    }
}

/// Partial-field update for a record. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(default, rename = "type")]
    pub kind: Option<MovementKind>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
}

impl RecordPatch {
    /// Merges the patch into an existing record, field by field.
    pub fn apply(&self, record: &mut StockRecord) {
        if let Some(kind) = self.kind {
            record.kind = kind;
        }
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(quantity) = self.quantity {
            record.quantity = quantity;
        }
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(cost) = self.cost {
            record.cost = cost;
        }
        if let Some(supplier) = &self.supplier {
            record.supplier = Some(supplier.clone());
        }
        if let Some(customer_id) = self.customer_id {
            record.customer_id = Some(customer_id);
        }
    }
}
