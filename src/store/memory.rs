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

//! In-process document store.
//!
//! Sharded maps give per-document atomic operations: a quantity adjustment
//! happens under the entry lock, the in-process analogue of a document
//! database's `$inc`. Record insertion order is tracked separately so the
//! ledger's date-tie breaking stays stable.

use crate::base::{CustomerId, RecordId};
use crate::customer::{Customer, NewCustomer};
use crate::error::InventoryError;
use crate::product::Product;
use crate::record::{RecordPatch, StockRecord};
use crate::store::Store;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;

/// Stock records indexed by id, with insertion order preserved.
///
/// The map gives O(1) point access and duplicate detection; the order log
/// drives `records()` listing. Unlike an append-only log, entries can be
/// removed, so order lives in a mutexed vec rather than a lock-free queue.
#[derive(Debug, Default)]
struct RecordLog {
    records: DashMap<RecordId, StockRecord>,
    order: Mutex<Vec<RecordId>>,
}

impl RecordLog {
    fn push(&self, record: StockRecord) -> Result<(), InventoryError> {
        // Entry API for atomic check-and-insert.
        match self.records.entry(record.id) {
            Entry::Occupied(_) => Err(InventoryError::DuplicateRecord),
            Entry::Vacant(entry) => {
                let id = record.id;
                entry.insert(record);
                self.order.lock().push(id);
                Ok(())
            }
        }
    }

    fn snapshot(&self) -> Vec<StockRecord> {
        let order = self.order.lock();
        order
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| r.clone()))
            .collect()
    }

    fn update(&self, id: RecordId, patch: &RecordPatch) -> Result<StockRecord, InventoryError> {
        let mut record = self
            .records
            .get_mut(&id)
            .ok_or(InventoryError::RecordNotFound)?;
        patch.apply(&mut record);
        Ok(record.clone())
    }

    fn remove(&self, id: RecordId) -> Result<(), InventoryError> {
        self.records
            .remove(&id)
            .ok_or(InventoryError::RecordNotFound)?;
        self.order.lock().retain(|entry| *entry != id);
        Ok(())
    }
}

/// In-memory [`Store`] with document-database semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    products: DashMap<String, Product>,
    records: RecordLog,
    customers: DashMap<CustomerId, Customer>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn products(&self) -> Result<Vec<Product>, InventoryError> {
        Ok(self.products.iter().map(|entry| entry.value().clone()).collect())
    }

    fn find_product(&self, name: &str) -> Result<Option<Product>, InventoryError> {
        Ok(self.products.get(name).map(|entry| entry.value().clone()))
    }

    fn insert_product(&self, product: Product) -> Result<(), InventoryError> {
        match self.products.entry(product.name.clone()) {
            Entry::Occupied(_) => Err(InventoryError::ProductExists),
            Entry::Vacant(entry) => {
                entry.insert(product);
                Ok(())
            }
        }
    }

    fn upsert_product(&self, product: Product) -> Result<(), InventoryError> {
        self.products.insert(product.name.clone(), product);
        Ok(())
    }

    fn adjust_quantity(&self, name: &str, delta: i64) -> Result<Product, InventoryError> {
        // Increment under the entry lock so concurrent deltas compose.
        let mut product = self
            .products
            .get_mut(name)
            .ok_or(InventoryError::ProductNotFound)?;
        product.quantity += delta;
        Ok(product.clone())
    }

    fn delete_product(&self, name: &str) -> Result<(), InventoryError> {
        self.products
            .remove(name)
            .ok_or(InventoryError::ProductNotFound)?;
        Ok(())
    }

    fn records(&self) -> Result<Vec<StockRecord>, InventoryError> {
        Ok(self.records.snapshot())
    }

    fn insert_record(&self, record: StockRecord) -> Result<(), InventoryError> {
        self.records.push(record)
    }

    fn update_record(
        &self,
        id: RecordId,
        patch: &RecordPatch,
    ) -> Result<StockRecord, InventoryError> {
        self.records.update(id, patch)
    }

    fn delete_record(&self, id: RecordId) -> Result<(), InventoryError> {
        self.records.remove(id)
    }

    fn customers(&self) -> Result<Vec<Customer>, InventoryError> {
        Ok(self.customers.iter().map(|entry| entry.value().clone()).collect())
    }

    fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>, InventoryError> {
        Ok(self.customers.get(&id).map(|entry| entry.value().clone()))
    }

    fn insert_customer(&self, customer: Customer) -> Result<(), InventoryError> {
        self.customers.insert(customer.id, customer);
        Ok(())
    }

    fn update_customer(
        &self,
        id: CustomerId,
        replacement: NewCustomer,
    ) -> Result<Customer, InventoryError> {
        let mut customer = self
            .customers
            .get_mut(&id)
            .ok_or(InventoryError::CustomerNotFound)?;
        customer.name = replacement.name;
        customer.business = replacement.business;
        customer.location = replacement.location;
        customer.contact = replacement.contact;
        Ok(customer.clone())
    }

    fn delete_customer(&self, id: CustomerId) -> Result<(), InventoryError> {
        self.customers
            .remove(&id)
            .ok_or(InventoryError::CustomerNotFound)?;
        Ok(())
    }
}
