//! REST API server example for the inventory engine.
//!
//! Run with: `cargo run --example server`
//!
//! Set `STOCK_LEDGER_DATA_DIR` to back the server with flat JSON document
//! files; leave it unset for the in-memory document store.
//!
//! ## Endpoints
//!
//! - `GET    /api/products`               - List products
//! - `POST   /api/products`               - Create a product (409-free: duplicate name is a 400)
//! - `POST   /api/products/import`        - Bulk upsert products
//! - `PUT    /api/products/:name`         - Apply a relative quantity delta
//! - `DELETE /api/products/:name`         - Delete a product
//! - `GET    /api/products/:name/history` - Cumulative stock curve
//! - `GET    /api/products/:name/restocks`- Restock cadence
//! - `GET    /api/records`                - List records
//! - `POST   /api/records/incoming`       - Create an incoming record
//! - `POST   /api/records/outgoing`       - Create an outgoing record
//! - `PUT    /api/records/:id`            - Partial-field record update
//! - `DELETE /api/records/:id`            - Delete a record
//! - `GET    /api/records/download`       - Records as a JSON attachment
//! - `GET    /api/customers`              - List/filter customers
//! - `POST   /api/customers`              - Create a customer
//! - `PUT    /api/customers/:id`          - Replace a customer
//! - `DELETE /api/customers/:id`          - Delete a customer
//! - `GET    /api/customers/:id/stats`    - Purchase report for one customer
//! - `GET    /stats`                      - Record counts per movement type
//! - `GET    /products/stats`             - Best-selling products
//! - `GET    /customers/stats`            - Top customers by spend
//! - `GET    /api/dashboard/stats`        - Entity totals
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST http://localhost:5000/api/products \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Rice", "quantity": 10}'
//!
//! curl -X PUT http://localhost:5000/api/products/Rice \
//!   -H "Content-Type: application/json" \
//!   -d '{"quantityChange": -3}'
//!
//! curl http://localhost:5000/products/stats
//! ```

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stock_ledger_rs::{
    Customer, CustomerFilter, CustomerId, Inventory, InventoryError, JsonFileStore, MovementKind,
    NewCustomer, NewProduct, NewRecord, Product, RecordId, RecordPatch, SpendFormula, StockRecord,
};
use tokio::net::TcpListener;
use tracing::info;

// === Request/Response DTOs ===

/// Body for `PUT /api/products/:name` - a relative delta, never an
/// absolute set.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityChange {
    pub quantity_change: i64,
}

/// Query parameters for ranked aggregates.
#[derive(Debug, Deserialize)]
pub struct RankingParams {
    pub limit: Option<usize>,
    pub formula: Option<SpendFormula>,
    /// When false, `/products/stats` skips the product join and keeps
    /// entries whose product no longer exists.
    pub details: Option<bool>,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the inventory engine.
#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<Inventory>,
}

// === Error Handling ===

/// Wrapper for converting `InventoryError` into HTTP responses.
pub struct AppError(InventoryError);

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            InventoryError::MissingField(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELD"),
            InventoryError::ProductExists => (StatusCode::BAD_REQUEST, "PRODUCT_EXISTS"),
            InventoryError::DuplicateRecord => (StatusCode::BAD_REQUEST, "DUPLICATE_RECORD"),
            InventoryError::ProductNotFound => (StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
            InventoryError::RecordNotFound => (StatusCode::NOT_FOUND, "RECORD_NOT_FOUND"),
            InventoryError::CustomerNotFound => (StatusCode::NOT_FOUND, "CUSTOMER_NOT_FOUND"),
            InventoryError::Persistence(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_FAILURE")
            }
        };

        (
            status,
            Json(ErrorResponse {
                message: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Product Handlers ===

async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.inventory.products()?))
}

async fn create_product(
    State(state): State<AppState>,
    Json(new): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state.inventory.create_product(new)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn import_products(
    State(state): State<AppState>,
    Json(products): Json<Vec<Product>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let imported = state.inventory.import_products(products)?;
    Ok(Json(serde_json::json!({ "imported": imported })))
}

async fn change_quantity(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(change): Json<QuantityChange>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .inventory
        .apply_quantity_change(&name, change.quantity_change)?;
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.inventory.delete_product(&name)?;
    Ok(StatusCode::OK)
}

async fn product_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let history = state.inventory.product_stock_history(&name)?;
    Ok(Json(history).into_response())
}

async fn product_restocks(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let report = state.inventory.product_restock_report(&name)?;
    Ok(Json(report).into_response())
}

// === Record Handlers ===

async fn list_records(
    State(state): State<AppState>,
) -> Result<Json<Vec<StockRecord>>, AppError> {
    Ok(Json(state.inventory.records()?))
}

async fn create_incoming_record(
    State(state): State<AppState>,
    Json(new): Json<NewRecord>,
) -> Result<(StatusCode, Json<StockRecord>), AppError> {
    let record = state.inventory.create_record(MovementKind::Incoming, new)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn create_outgoing_record(
    State(state): State<AppState>,
    Json(new): Json<NewRecord>,
) -> Result<(StatusCode, Json<StockRecord>), AppError> {
    let record = state.inventory.create_record(MovementKind::Outgoing, new)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(patch): Json<RecordPatch>,
) -> Result<Json<StockRecord>, AppError> {
    Ok(Json(state.inventory.update_record(id, &patch)?))
}

async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<StatusCode, AppError> {
    state.inventory.delete_record(id)?;
    Ok(StatusCode::OK)
}

/// Returns the full records collection as a downloadable JSON attachment
/// named `records-<ISO-date>.json`.
async fn download_records(State(state): State<AppState>) -> Result<Response, AppError> {
    let records = state.inventory.records()?;
    let filename = format!("records-{}.json", chrono::Utc::now().format("%Y-%m-%d"));
    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Json(records),
    )
        .into_response())
}

// === Customer Handlers ===

async fn list_customers(
    State(state): State<AppState>,
    Query(filter): Query<CustomerFilter>,
) -> Result<Json<Vec<Customer>>, AppError> {
    Ok(Json(state.inventory.customers(&filter)?))
}

async fn create_customer(
    State(state): State<AppState>,
    Json(new): Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let customer = state.inventory.create_customer(new)?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
    Json(replacement): Json<NewCustomer>,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(state.inventory.update_customer(id, replacement)?))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<StatusCode, AppError> {
    state.inventory.delete_customer(id)?;
    Ok(StatusCode::OK)
}

async fn customer_stats(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<Response, AppError> {
    let report = state.inventory.customer_stats(id)?;
    Ok(Json(report).into_response())
}

// === Statistics Handlers ===

async fn record_type_stats(State(state): State<AppState>) -> Result<Response, AppError> {
    Ok(Json(state.inventory.type_stats()?).into_response())
}

async fn best_selling_stats(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> Result<Response, AppError> {
    let limit = params.limit.unwrap_or(stock_ledger_rs::stats::DEFAULT_TOP_LIMIT);
    if params.details.unwrap_or(true) {
        Ok(Json(state.inventory.best_selling_products_with_details(limit)?).into_response())
    } else {
        Ok(Json(state.inventory.best_selling_products(limit)?).into_response())
    }
}

async fn top_customer_stats(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> Result<Response, AppError> {
    let limit = params.limit.unwrap_or(stock_ledger_rs::stats::DEFAULT_TOP_LIMIT);
    let formula = params.formula.unwrap_or_default();
    Ok(Json(state.inventory.top_customers(formula, limit)?).into_response())
}

async fn dashboard_stats(State(state): State<AppState>) -> Result<Response, AppError> {
    Ok(Json(state.inventory.dashboard_stats()?).into_response())
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/import", post(import_products))
        .route(
            "/api/products/{name}",
            put(change_quantity).delete(delete_product),
        )
        .route("/api/products/{name}/history", get(product_history))
        .route("/api/products/{name}/restocks", get(product_restocks))
        .route("/api/records", get(list_records))
        .route("/api/records/incoming", post(create_incoming_record))
        .route("/api/records/outgoing", post(create_outgoing_record))
        .route("/api/records/download", get(download_records))
        .route("/api/records/{id}", put(update_record).delete(delete_record))
        .route("/api/customers", get(list_customers).post(create_customer))
        .route(
            "/api/customers/{id}",
            put(update_customer).delete(delete_customer),
        )
        .route("/api/customers/{id}/stats", get(customer_stats))
        .route("/stats", get(record_type_stats))
        .route("/products/stats", get(best_selling_stats))
        .route("/customers/stats", get(top_customer_stats))
        .route("/api/dashboard/stats", get(dashboard_stats))
        .with_state(state)
}

// === Main ===

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // One configuration value selects the backend.
    let inventory = match std::env::var("STOCK_LEDGER_DATA_DIR") {
        Ok(dir) => {
            info!(%dir, "using file-backed store");
            Inventory::new(Arc::new(JsonFileStore::open(dir).unwrap()))
        }
        Err(_) => {
            info!("using in-memory store");
            Inventory::in_memory()
        }
    };

    let state = AppState {
        inventory: Arc::new(inventory),
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:5000").await.unwrap();
    info!("Inventory API server running on http://127.0.0.1:5000");

    axum::serve(listener, app).await.unwrap();
}
