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

//! Persistence adapter.
//!
//! [`Store`] is the single seam between the ledger/statistics engines and
//! storage. Two interchangeable backends ship with the crate:
//!
//! - [`JsonFileStore`]: one JSON document file per collection, whole
//!   collection read and overwritten on every mutation.
//! - [`MemoryStore`]: an in-process document store with per-document
//!   atomic operations.
//!
//! Engines must not assume which backend is active; aggregation is always
//! computed client-side over `list` output.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::base::{CustomerId, RecordId};
use crate::customer::{Customer, NewCustomer};
use crate::error::InventoryError;
use crate::product::Product;
use crate::record::{RecordPatch, StockRecord};

/// Storage contract for the three entity collections.
///
/// Listing order for records is insertion order, which the ledger relies
/// on for stable date-tie breaking. All operations are point reads/writes;
/// nothing here spans two collections atomically.
pub trait Store: Send + Sync {
    // --- products, keyed by unique name ---

    fn products(&self) -> Result<Vec<Product>, InventoryError>;

    fn find_product(&self, name: &str) -> Result<Option<Product>, InventoryError>;

    /// Fails with [`InventoryError::ProductExists`] when the name is taken.
    fn insert_product(&self, product: Product) -> Result<(), InventoryError>;

    /// Inserts or replaces by name (bulk-import semantics).
    fn upsert_product(&self, product: Product) -> Result<(), InventoryError>;

    /// Relative quantity increment: `quantity += delta`, returning the
    /// updated product. Fails with [`InventoryError::ProductNotFound`].
    fn adjust_quantity(&self, name: &str, delta: i64) -> Result<Product, InventoryError>;

    /// Fails with [`InventoryError::ProductNotFound`]. Records referencing
    /// the product are left in place (soft references).
    fn delete_product(&self, name: &str) -> Result<(), InventoryError>;

    // --- records, keyed by generated id ---

    fn records(&self) -> Result<Vec<StockRecord>, InventoryError>;

    /// Fails with [`InventoryError::DuplicateRecord`] when the id is taken.
    fn insert_record(&self, record: StockRecord) -> Result<(), InventoryError>;

    /// Partial-field update; fails with [`InventoryError::RecordNotFound`].
    fn update_record(
        &self,
        id: RecordId,
        patch: &RecordPatch,
    ) -> Result<StockRecord, InventoryError>;

    /// Fails with [`InventoryError::RecordNotFound`].
    fn delete_record(&self, id: RecordId) -> Result<(), InventoryError>;

    // --- customers, keyed by generated id ---

    fn customers(&self) -> Result<Vec<Customer>, InventoryError>;

    fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>, InventoryError>;

    fn insert_customer(&self, customer: Customer) -> Result<(), InventoryError>;

    /// Full replace of the writable fields; fails with
    /// [`InventoryError::CustomerNotFound`].
    fn update_customer(
        &self,
        id: CustomerId,
        replacement: NewCustomer,
    ) -> Result<Customer, InventoryError>;

    /// Fails with [`InventoryError::CustomerNotFound`].
    fn delete_customer(&self, id: CustomerId) -> Result<(), InventoryError>;
}
