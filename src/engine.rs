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

//! Inventory engine.
//!
//! [`Inventory`] ties the persistence adapter, the ledger derivations, and
//! the statistics aggregates together behind one handle. The store is
//! injected at construction and never reached as ambient state, so the
//! same engine runs unchanged over the file backend or the in-memory
//! document store.

use crate::base::{CustomerId, RecordId};
use crate::customer::{Customer, CustomerFilter, NewCustomer};
use crate::error::InventoryError;
use crate::ledger::{self, RestockReport, StockEvent};
use crate::product::{NewProduct, Product};
use crate::record::{MovementKind, NewRecord, RecordPatch, StockRecord};
use crate::stats::{
    self, CustomerReport, CustomerSpend, DashboardStats, ProductSales, ProductSalesDetail,
    SpendFormula, TypeStats,
};
use crate::store::{MemoryStore, Store};
use std::sync::Arc;
use tracing::debug;

/// Inventory engine over an injected persistence adapter.
///
/// # Invariants
///
/// - Product names are unique; creation is rejected on collision no matter
///   how the other fields differ.
/// - Product quantities only move by relative deltas, so concurrent
///   adjustments compose additively.
/// - A record's movement kind is fixed by the creating operation, never by
///   the client payload.
/// - Records are never cascaded when their product or customer disappears;
///   every aggregate tolerates dangling soft references.
pub struct Inventory {
    store: Arc<dyn Store>,
}

impl Inventory {
    /// Creates an engine over the given store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Inventory { store }
    }

    /// Convenience constructor over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Inventory::new(Arc::new(MemoryStore::new()))
    }

    // --- products ---

    pub fn products(&self) -> Result<Vec<Product>, InventoryError> {
        self.store.products()
    }

    /// Fails with [`InventoryError::ProductNotFound`].
    pub fn get_product(&self, name: &str) -> Result<Product, InventoryError> {
        self.store
            .find_product(name)?
            .ok_or(InventoryError::ProductNotFound)
    }

    /// Creates a product, rejecting duplicates by name.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::MissingField`] - empty `name`.
    /// - [`InventoryError::ProductExists`] - name already taken.
    pub fn create_product(&self, new: NewProduct) -> Result<Product, InventoryError> {
        if new.name.trim().is_empty() {
            return Err(InventoryError::MissingField("name"));
        }
        let product = new.into_product();
        self.store.insert_product(product.clone())?;
        debug!(name = %product.name, quantity = product.quantity, "product created");
        Ok(product)
    }

    /// Bulk import: upserts each product by name, returning the count.
    /// Entries with empty names are skipped rather than aborting the batch.
    pub fn import_products(&self, products: Vec<Product>) -> Result<usize, InventoryError> {
        let mut imported = 0;
        for product in products {
            if product.name.trim().is_empty() {
                debug!("skipping import entry with empty name");
                continue;
            }
            self.store.upsert_product(product)?;
            imported += 1;
        }
        Ok(imported)
    }

    /// Applies a relative quantity delta and returns the updated product.
    ///
    /// # Errors
    ///
    /// [`InventoryError::ProductNotFound`] - no product matches `name`.
    pub fn apply_quantity_change(
        &self,
        name: &str,
        delta: i64,
    ) -> Result<Product, InventoryError> {
        let product = self.store.adjust_quantity(name, delta)?;
        debug!(name, delta, quantity = product.quantity, "quantity adjusted");
        Ok(product)
    }

    /// Deletes a product by name. Its records stay behind as dangling soft
    /// references.
    pub fn delete_product(&self, name: &str) -> Result<(), InventoryError> {
        self.store.delete_product(name)
    }

    // --- records ---

    pub fn records(&self) -> Result<Vec<StockRecord>, InventoryError> {
        self.store.records()
    }

    /// Creates a movement record. `kind` comes from the calling operation
    /// (the endpoint path), overriding anything in the payload.
    ///
    /// The referenced product's stored quantity is *not* touched; quantity
    /// adjustments are a separate, independent write.
    pub fn create_record(
        &self,
        kind: MovementKind,
        new: NewRecord,
    ) -> Result<StockRecord, InventoryError> {
        if new.name.trim().is_empty() {
            return Err(InventoryError::MissingField("name"));
        }
        let record = new.into_record(kind);
        self.store.insert_record(record.clone())?;
        debug!(id = %record.id, %kind, name = %record.name, "record created");
        Ok(record)
    }

    /// Partial-field update keyed by id.
    pub fn update_record(
        &self,
        id: RecordId,
        patch: &RecordPatch,
    ) -> Result<StockRecord, InventoryError> {
        self.store.update_record(id, patch)
    }

    pub fn delete_record(&self, id: RecordId) -> Result<(), InventoryError> {
        self.store.delete_record(id)
    }

    // --- customers ---

    /// Lists customers matching an exact-field filter (an empty filter
    /// lists everyone).
    pub fn customers(&self, filter: &CustomerFilter) -> Result<Vec<Customer>, InventoryError> {
        Ok(self
            .store
            .customers()?
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect())
    }

    /// Fails with [`InventoryError::CustomerNotFound`].
    pub fn get_customer(&self, id: CustomerId) -> Result<Customer, InventoryError> {
        self.store
            .find_customer(id)?
            .ok_or(InventoryError::CustomerNotFound)
    }

    /// Creates a customer; `name`, `business`, and `location` must be
    /// non-empty.
    pub fn create_customer(&self, new: NewCustomer) -> Result<Customer, InventoryError> {
        validate_customer(&new)?;
        let customer = new.into_customer();
        self.store.insert_customer(customer.clone())?;
        debug!(id = %customer.id, name = %customer.name, "customer created");
        Ok(customer)
    }

    /// Full-field replace keyed by id, with the same presence checks as
    /// creation.
    pub fn update_customer(
        &self,
        id: CustomerId,
        replacement: NewCustomer,
    ) -> Result<Customer, InventoryError> {
        validate_customer(&replacement)?;
        self.store.update_customer(id, replacement)
    }

    pub fn delete_customer(&self, id: CustomerId) -> Result<(), InventoryError> {
        self.store.delete_customer(id)
    }

    // --- ledger derivations ---

    /// Cumulative stock curve for one product, derived from its records.
    ///
    /// Fails with [`InventoryError::ProductNotFound`] when the product does
    /// not exist; records naming it would otherwise be dangling and the
    /// curve meaningless as a product view.
    pub fn product_stock_history(&self, name: &str) -> Result<Vec<StockEvent>, InventoryError> {
        self.get_product(name)?;
        let records: Vec<StockRecord> = self
            .store
            .records()?
            .into_iter()
            .filter(|r| r.name == name)
            .collect();
        Ok(ledger::stock_history(&records))
    }

    /// Restock cadence for one product, seeded with its current stored
    /// quantity.
    pub fn product_restock_report(&self, name: &str) -> Result<RestockReport, InventoryError> {
        let product = self.get_product(name)?;
        let mut incoming: Vec<StockRecord> = self
            .store
            .records()?
            .into_iter()
            .filter(|r| r.name == name && r.kind == MovementKind::Incoming)
            .collect();
        incoming.sort_by_key(|r| r.date);
        Ok(ledger::restock_frequency(&incoming, product.quantity))
    }

    // --- statistics ---

    pub fn best_selling_products(
        &self,
        limit: usize,
    ) -> Result<Vec<ProductSales>, InventoryError> {
        Ok(stats::best_selling(&self.store.records()?, limit))
    }

    pub fn best_selling_products_with_details(
        &self,
        limit: usize,
    ) -> Result<Vec<ProductSalesDetail>, InventoryError> {
        let records = self.store.records()?;
        let products = self.store.products()?;
        Ok(stats::best_selling_with_details(&records, &products, limit))
    }

    pub fn top_customers(
        &self,
        formula: SpendFormula,
        limit: usize,
    ) -> Result<Vec<CustomerSpend>, InventoryError> {
        let records = self.store.records()?;
        let customers = self.store.customers()?;
        Ok(stats::top_customers(&records, &customers, formula, limit))
    }

    /// Purchase reports for every customer.
    pub fn per_customer_stats(&self) -> Result<Vec<CustomerReport>, InventoryError> {
        let customers = self.store.customers()?;
        let records = self.store.records()?;
        let products = self.store.products()?;
        Ok(stats::per_customer_stats(&customers, &records, &products))
    }

    /// Purchase report for a single customer.
    pub fn customer_stats(&self, id: CustomerId) -> Result<CustomerReport, InventoryError> {
        let customer = self.get_customer(id)?;
        let records = self.store.records()?;
        let products = self.store.products()?;
        let mut reports = stats::per_customer_stats(&[customer], &records, &products);
        Ok(reports.remove(0))
    }

    /// Independent entity counts; no joins.
    pub fn dashboard_stats(&self) -> Result<DashboardStats, InventoryError> {
        Ok(DashboardStats {
            products: self.store.products()?.len(),
            records: self.store.records()?.len(),
            customers: self.store.customers()?.len(),
        })
    }

    /// Record counts per movement type.
    pub fn type_stats(&self) -> Result<TypeStats, InventoryError> {
        Ok(stats::type_stats(&self.store.records()?))
    }
}

fn validate_customer(new: &NewCustomer) -> Result<(), InventoryError> {
    if new.name.trim().is_empty() {
        return Err(InventoryError::MissingField("name"));
    }
    if new.business.trim().is_empty() {
        return Err(InventoryError::MissingField("business"));
    }
    if new.location.trim().is_empty() {
        return Err(InventoryError::MissingField("location"));
    }
    Ok(())
}
