//! Route definitions for the Scrapyard Ledger API

use axum::{routing::get, routing::post, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/lots", lot_routes())
        .nest("/sales", sale_routes())
        .nest("/records", record_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/reports", report_routes())
}

/// Lot management routes
fn lot_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_lots).post(handlers::create_lot))
        .route("/selectable", get(handlers::list_selectable_lots))
        .route(
            "/:lot_id",
            get(handlers::get_lot)
                .put(handlers::update_lot)
                .delete(handlers::delete_lot),
        )
}

/// Sale recording routes
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route(
            "/:sale_id",
            get(handlers::get_sale)
                .put(handlers::update_sale)
                .delete(handlers::delete_sale),
        )
}

/// Loaded record set routes
fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_summary))
        .route("/reload", post(handlers::reload_records))
}

/// Dashboard routes
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_dashboard))
        .route("/overview", get(handlers::get_overview))
}

/// Report export routes
fn report_routes() -> Router<AppState> {
    Router::new().route("/lots", get(handlers::get_lot_report))
}
