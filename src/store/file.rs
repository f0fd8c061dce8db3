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

//! Flat-file document store.
//!
//! One JSON file per collection under a data directory. Every mutation
//! reads the whole collection, mutates it in memory, and overwrites the
//! file. A per-collection mutex serializes read-modify-write cycles within
//! this process; cross-process writers remain last-writer-wins.

use crate::base::{CustomerId, RecordId};
use crate::customer::{Customer, NewCustomer};
use crate::error::InventoryError;
use crate::product::Product;
use crate::record::{RecordPatch, StockRecord};
use crate::store::Store;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single collection file plus its write lock.
struct Collection<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> Collection<T> {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
            _marker: std::marker::PhantomData,
        }
    }

    /// Reads the full collection. A missing file reads as empty, matching
    /// first-run behavior.
    fn load(&self) -> Result<Vec<T>, InventoryError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, items: &[T]) -> Result<(), InventoryError> {
        let bytes = serde_json::to_vec_pretty(items)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Runs a read-modify-write cycle under the collection lock.
    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, InventoryError>,
    ) -> Result<R, InventoryError> {
        let _guard = self.lock.lock();
        let mut items = self.load()?;
        let result = f(&mut items)?;
        self.save(&items)?;
        Ok(result)
    }
}

/// File-backed [`Store`] rooted at a data directory.
pub struct JsonFileStore {
    products: Collection<Product>,
    records: Collection<StockRecord>,
    customers: Collection<Customer>,
}

impl JsonFileStore {
    /// Opens (creating if necessary) a data directory holding
    /// `products.json`, `records.json`, and `customers.json`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, InventoryError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        debug!(dir = %dir.display(), "opened file store");
        Ok(Self {
            products: Collection::new(dir.join("products.json")),
            records: Collection::new(dir.join("records.json")),
            customers: Collection::new(dir.join("customers.json")),
        })
    }
}

impl Store for JsonFileStore {
    fn products(&self) -> Result<Vec<Product>, InventoryError> {
        self.products.load()
    }

    fn find_product(&self, name: &str) -> Result<Option<Product>, InventoryError> {
        Ok(self.products.load()?.into_iter().find(|p| p.name == name))
    }

    fn insert_product(&self, product: Product) -> Result<(), InventoryError> {
        self.products.mutate(|products| {
            if products.iter().any(|p| p.name == product.name) {
                return Err(InventoryError::ProductExists);
            }
            products.push(product);
            Ok(())
        })
    }

    fn upsert_product(&self, product: Product) -> Result<(), InventoryError> {
        self.products.mutate(|products| {
            match products.iter_mut().find(|p| p.name == product.name) {
                Some(existing) => *existing = product,
                None => products.push(product),
            }
            Ok(())
        })
    }

    fn adjust_quantity(&self, name: &str, delta: i64) -> Result<Product, InventoryError> {
        self.products.mutate(|products| {
            let product = products
                .iter_mut()
                .find(|p| p.name == name)
                .ok_or(InventoryError::ProductNotFound)?;
            product.quantity += delta;
            Ok(product.clone())
        })
    }

    fn delete_product(&self, name: &str) -> Result<(), InventoryError> {
        self.products.mutate(|products| {
            let before = products.len();
            products.retain(|p| p.name != name);
            if products.len() == before {
                return Err(InventoryError::ProductNotFound);
            }
            Ok(())
        })
    }

    fn records(&self) -> Result<Vec<StockRecord>, InventoryError> {
        self.records.load()
    }

    fn insert_record(&self, record: StockRecord) -> Result<(), InventoryError> {
        self.records.mutate(|records| {
            if records.iter().any(|r| r.id == record.id) {
                return Err(InventoryError::DuplicateRecord);
            }
            records.push(record);
            Ok(())
        })
    }

    fn update_record(
        &self,
        id: RecordId,
        patch: &RecordPatch,
    ) -> Result<StockRecord, InventoryError> {
        self.records.mutate(|records| {
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(InventoryError::RecordNotFound)?;
            patch.apply(record);
            Ok(record.clone())
        })
    }

    fn delete_record(&self, id: RecordId) -> Result<(), InventoryError> {
        self.records.mutate(|records| {
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() == before {
                return Err(InventoryError::RecordNotFound);
            }
            Ok(())
        })
    }

    fn customers(&self) -> Result<Vec<Customer>, InventoryError> {
        self.customers.load()
    }

    fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>, InventoryError> {
        Ok(self.customers.load()?.into_iter().find(|c| c.id == id))
    }

    fn insert_customer(&self, customer: Customer) -> Result<(), InventoryError> {
        self.customers.mutate(|customers| {
            customers.push(customer);
            Ok(())
        })
    }

    fn update_customer(
        &self,
        id: CustomerId,
        replacement: NewCustomer,
    ) -> Result<Customer, InventoryError> {
        self.customers.mutate(|customers| {
            let customer = customers
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or(InventoryError::CustomerNotFound)?;
            customer.name = replacement.name;
            customer.business = replacement.business;
            customer.location = replacement.location;
            customer.contact = replacement.contact;
            Ok(customer.clone())
        })
    }

    fn delete_customer(&self, id: CustomerId) -> Result<(), InventoryError> {
        self.customers.mutate(|customers| {
            let before = customers.len();
            customers.retain(|c| c.id != id);
            if customers.len() == before {
                return Err(InventoryError::CustomerNotFound);
            }
            Ok(())
        })
    }
}
