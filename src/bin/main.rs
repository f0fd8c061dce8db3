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

use chrono::NaiveDate;
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use stock_ledger_rs::{Inventory, MovementKind, NewProduct, NewRecord};
use tracing::debug;

/// Stock Ledger - Process stock-movement CSV files
///
/// Reads movements from a CSV file and outputs per-product stock levels to
/// stdout. Products are created on first sight; each movement adjusts the
/// product quantity by its signed delta.
#[derive(Parser, Debug)]
#[command(name = "stock-ledger-rs")]
#[command(about = "An inventory engine that processes stock-movement CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with stock movements
    ///
    /// Expected format: type,name,quantity,date,cost
    /// Example: cargo run -- movements.csv > levels.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let inventory = match process_movements(BufReader::new(file)) {
        Ok(inventory) => inventory,
        Err(e) => {
            eprintln!("Error processing movements: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_levels(&inventory, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `type, name, quantity, date, cost`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    movement_type: String,
    name: String,
    quantity: i64,
    date: NaiveDate,
    #[serde(deserialize_with = "csv::invalid_option")]
    cost: Option<Decimal>,
}

impl CsvRecord {
    /// Converts the CSV record into a movement kind and record payload.
    ///
    /// Returns `None` for unknown movement types or empty product names.
    fn into_movement(self) -> Option<(MovementKind, NewRecord)> {
        let kind = match self.movement_type.to_lowercase().as_str() {
            "incoming" => MovementKind::Incoming,
            "outgoing" => MovementKind::Outgoing,
            _ => return None,
        };
        if self.name.trim().is_empty() {
            return None;
        }
        Some((
            kind,
            NewRecord {
                name: self.name,
                quantity: self.quantity,
                date: self.date,
                cost: self.cost.unwrap_or(Decimal::ZERO),
                supplier: None,
                customer_id: None,
            },
        ))
    }
}

/// Process stock movements from a CSV reader.
///
/// Streams the file row by row, creating products on first sight and
/// applying each movement as a signed quantity delta (incoming adds,
/// outgoing subtracts). Malformed rows and unknown movement types are
/// skipped; row-level failures never abort the run.
///
/// # CSV Format
///
/// Expected columns: `type, name, quantity, date, cost`
/// - `type`: Movement type (incoming, outgoing)
/// - `name`: Product name
/// - `quantity`: Moved amount (i64)
/// - `date`: ISO date (YYYY-MM-DD)
/// - `cost`: Total monetary value of the movement (optional)
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is
/// invalid.
pub fn process_movements<R: Read>(reader: R) -> Result<Inventory, csv::Error> {
    let inventory = Inventory::in_memory();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<CsvRecord>() {
        match result {
            Ok(row) => {
                let Some((kind, movement)) = row.into_movement() else {
                    debug!("skipping invalid movement row");
                    continue;
                };

                let name = movement.name.clone();
                let delta = match kind {
                    MovementKind::Incoming => movement.quantity,
                    MovementKind::Outgoing => -movement.quantity,
                };

                // First sight of a name creates the product at zero.
                if inventory.get_product(&name).is_err() {
                    let _ = inventory.create_product(NewProduct {
                        name: name.clone(),
                        quantity: Some(0),
                        cost_price: None,
                        sales_price: None,
                        supplier: None,
                        supplier_contact: None,
                    });
                }

                if let Err(e) = inventory.create_record(kind, movement) {
                    debug!(%name, "skipping movement: {}", e);
                    continue;
                }
                if let Err(e) = inventory.apply_quantity_change(&name, delta) {
                    debug!(%name, "skipping quantity delta: {}", e);
                }
            }
            Err(e) => {
                debug!("skipping malformed row: {}", e);
                continue;
            }
        }
    }

    Ok(inventory)
}

/// Per-product summary row for the output CSV.
#[derive(Debug, Serialize)]
struct LevelRow {
    name: String,
    quantity: i64,
    incoming: i64,
    outgoing: i64,
}

/// Write per-product stock levels to a CSV writer.
///
/// Rows are sorted by product name so output is deterministic across
/// backends.
///
/// # CSV Format
///
/// Columns: `name, quantity, incoming, outgoing`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_levels<W: Write>(inventory: &Inventory, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    let mut products = inventory.products().unwrap_or_default();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    let records = inventory.records().unwrap_or_default();

    for product in products {
        let incoming: i64 = records
            .iter()
            .filter(|r| r.name == product.name && r.kind == MovementKind::Incoming)
            .map(|r| r.quantity)
            .sum();
        let outgoing: i64 = records
            .iter()
            .filter(|r| r.name == product.name && r.kind == MovementKind::Outgoing)
            .map(|r| r.quantity)
            .sum();
        wtr.serialize(LevelRow {
            name: product.name,
            quantity: product.quantity,
            incoming,
            outgoing,
        })?;
    }

    wtr.flush()?;
    Ok(())
}
