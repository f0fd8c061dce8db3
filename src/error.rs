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

//! Error types for inventory operations.

use thiserror::Error;

/// Inventory operation errors.
///
/// Every failure a caller can observe maps to one of these variants; the
/// HTTP surface translates them to 400 (validation), 404 (missing entity),
/// or 500 (persistence) responses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// A required field is missing or empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A product with the same name already exists
    #[error("product already exists")]
    ProductExists,

    /// A record with the same ID already exists
    #[error("duplicate record ID")]
    DuplicateRecord,

    /// No product matches the given name
    #[error("product not found")]
    ProductNotFound,

    /// No record matches the given ID
    #[error("record not found")]
    RecordNotFound,

    /// No customer matches the given ID
    #[error("customer not found")]
    CustomerNotFound,

    /// Backend read, write, or decode failure
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl From<std::io::Error> for InventoryError {
    fn from(err: std::io::Error) -> Self {
        InventoryError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(err: serde_json::Error) -> Self {
        InventoryError::Persistence(err.to_string())
    }
}
