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

//! # Stock Ledger
//!
//! This library provides an inventory engine for a small trading business:
//! product stock levels, incoming/outgoing movement records, customer
//! records, and the derived aggregates built from them (cumulative stock
//! curves, restock cadence, best sellers, top customers, dashboard
//! counts).
//!
//! ## Core Components
//!
//! - [`Inventory`]: engine facade over an injected persistence adapter
//! - [`Store`]: the adapter contract, with [`JsonFileStore`] (flat
//!   document files) and [`MemoryStore`] (in-process document store) as
//!   interchangeable backends
//! - [`ledger`]: prefix-sum stock history and restock frequency
//! - [`stats`]: cross-entity aggregates over records, products, customers
//! - [`InventoryError`]: failure kinds, mapped to HTTP statuses by the
//!   REST surface
//!
//! ## Example
//!
//! ```
//! use stock_ledger_rs::{Inventory, NewProduct};
//!
//! let inventory = Inventory::in_memory();
//!
//! inventory
//!     .create_product(NewProduct {
//!         name: "Rice".to_string(),
//!         quantity: Some(10),
//!         cost_price: None,
//!         sales_price: None,
//!         supplier: None,
//!         supplier_contact: None,
//!     })
//!     .unwrap();
//!
//! // Quantity changes are relative deltas, so they compose additively.
//! let product = inventory.apply_quantity_change("Rice", -3).unwrap();
//! assert_eq!(product.quantity, 7);
//! let product = inventory.apply_quantity_change("Rice", 20).unwrap();
//! assert_eq!(product.quantity, 27);
//! ```
//!
//! ## Soft References
//!
//! Records reference products by name and customers by id without any
//! enforced foreign keys. Deleting a product leaves its records behind,
//! and every aggregate tolerates the dangling reference.

pub mod base;
pub mod customer;
mod engine;
pub mod error;
pub mod ledger;
pub mod product;
pub mod record;
pub mod stats;
mod store;

pub use base::{CustomerId, RecordId};
pub use customer::{Customer, CustomerFilter, NewCustomer};
pub use engine::Inventory;
pub use error::InventoryError;
pub use product::{NewProduct, Product};
pub use record::{MovementKind, NewRecord, RecordPatch, StockRecord};
pub use stats::SpendFormula;
pub use store::{JsonFileStore, MemoryStore, Store};
