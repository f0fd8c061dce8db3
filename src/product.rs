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

//! Product entity.
//!
//! Products are keyed by their unique `name`. The stored `quantity` is only
//! ever mutated through relative deltas (see
//! [`Inventory::apply_quantity_change`](crate::Inventory::apply_quantity_change))
//! or replaced wholesale by bulk import.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stocked product.
///
/// `quantity` is expected to stay non-negative but is not enforced: an
/// over-draining delta is accepted and the resulting negative level is
/// visible to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_contact: Option<String>,
}

/// Payload for creating a product.
///
/// Only `name` is required; a missing quantity defaults to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub cost_price: Option<Decimal>,
    #[serde(default)]
    pub sales_price: Option<Decimal>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub supplier_contact: Option<String>,
}

impl NewProduct {
    /// Builds the stored product, applying the zero-quantity default.
    pub fn into_product(self) -> Product {
        Product {
            name: self.name,
            quantity: self.quantity.unwrap_or(0),
            cost_price: self.cost_price,
            sales_price: self.sales_price,
            supplier: self.supplier,
            supplier_contact: self.supplier_contact,
        }
    }
}
