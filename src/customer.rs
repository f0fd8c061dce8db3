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

//! Customer entity.

use crate::base::CustomerId;
use serde::{Deserialize, Serialize};

/// A customer of the trading business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub business: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// Payload for creating a customer, and the replacement body for updates.
///
/// `name`, `business`, and `location` are required non-empty; updates
/// replace all four writable fields wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub business: String,
    pub location: String,
    #[serde(default)]
    pub contact: Option<String>,
}

impl NewCustomer {
    /// Builds the stored customer with a fresh id.
    pub fn into_customer(self) -> Customer {
        Customer {
            id: CustomerId::generate(),
            name: self.name,
            business: self.business,
            location: self.location,
            contact: self.contact,
        }
    }
}

/// Exact-match filter for customer queries. Absent fields match anything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub business: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

impl CustomerFilter {
    /// Whether a customer satisfies every present field.
    pub fn matches(&self, customer: &Customer) -> bool {
        self.name.as_ref().is_none_or(|v| *v == customer.name)
            && self.business.as_ref().is_none_or(|v| *v == customer.business)
            && self.location.as_ref().is_none_or(|v| *v == customer.location)
            && self
                .contact
                .as_ref()
                .is_none_or(|v| customer.contact.as_deref() == Some(v.as_str()))
    }
}
