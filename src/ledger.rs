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

//! Ledger derivations.
//!
//! The ledger is a derived view: a product's stock level over time,
//! recomputed from its movement records as a prefix sum over a
//! date-ordered event stream. The stored `Product::quantity` is maintained
//! independently through deltas and may legitimately disagree with the
//! recomputed curve once records are edited after the fact; the divergence
//! is accepted, not reconciled.

use crate::record::{MovementKind, StockRecord};
use chrono::NaiveDate;
use serde::Serialize;

/// One step of a product's cumulative stock curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockEvent {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub quantity: i64,
    pub running_total: i64,
}

/// Computes the cumulative stock curve for one product's records.
///
/// The input is the full set of records naming the product, in insertion
/// order. They are merged into a single sequence ordered by date ascending
/// (stable, so date ties keep insertion order) and walked accumulating a
/// running total: incoming adds `quantity`, outgoing subtracts it.
///
/// An empty record set yields an empty curve.
pub fn stock_history(records: &[StockRecord]) -> Vec<StockEvent> {
    let mut ordered: Vec<&StockRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.date);

    let mut running_total = 0i64;
    ordered
        .into_iter()
        .map(|record| {
            match record.kind {
                MovementKind::Incoming => running_total += record.quantity,
                MovementKind::Outgoing => running_total -= record.quantity,
            }
            StockEvent {
                date: record.date,
                kind: record.kind,
                quantity: record.quantity,
                running_total,
            }
        })
        .collect()
}

/// One restock step: how much a delivery added over the previous baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockStep {
    pub date: NaiveDate,
    pub added: i64,
    pub cumulative: i64,
}

/// Restock cadence for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockReport {
    pub steps: Vec<RestockStep>,
    /// Number of restock events observed.
    pub frequency: usize,
}

/// Derives restock steps from a product's incoming records.
///
/// `incoming` must be ordered by date ascending. For step *i* the added
/// amount is `quantity_i - baseline`, where the baseline is the previous
/// incoming record's quantity, seeded with the product's current stored
/// quantity for the first step. `cumulative` is the prefix sum of `added`.
///
/// No incoming records means no steps and a frequency of zero.
pub fn restock_frequency(incoming: &[StockRecord], current_quantity: i64) -> RestockReport {
    let mut baseline = current_quantity;
    let mut cumulative = 0i64;
    let steps: Vec<RestockStep> = incoming
        .iter()
        .map(|record| {
            let added = record.quantity - baseline;
            baseline = record.quantity;
            cumulative += added;
            RestockStep {
                date: record.date,
                added,
                cumulative,
            }
        })
        .collect();

    RestockReport {
        frequency: steps.len(),
        steps,
    }
}
