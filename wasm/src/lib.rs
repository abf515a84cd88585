//! WebAssembly module for the Scrapyard Ledger dashboard
//!
//! Provides client-side computation for:
//! - The full dashboard (headline, trend, rollups, stalled lots)
//! - The filtered sales table
//! - Lot and sale form validation
//!
//! Records and parameters cross the boundary as JSON strings in the same
//! camelCase shape the server API uses.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::analytics::{self, DashboardParams};
use shared::listing::{self, SalesQuery};
use shared::models::{Lot, LotInput, Sale, SaleInput};
use shared::validation::{validate_lot_code_unique, validate_lot_input, validate_sale_input};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("scrapyard-wasm ready"));
}

// ============================================================================
// Boundary helpers
// ============================================================================

fn parse<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", raw, e))
}

fn load_records(lots_json: &str, sales_json: &str) -> Result<(Vec<Lot>, Vec<Sale>), String> {
    Ok((parse(lots_json, "lots")?, parse(sales_json, "sales")?))
}

/// Evaluation date: explicit `YYYY-MM-DD`, or the browser's local date when empty
fn resolve_today(raw: &str) -> Result<NaiveDate, String> {
    if !raw.trim().is_empty() {
        return parse_date(raw);
    }
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .ok_or_else(|| "Browser returned an invalid date".to_string())
}

fn warn_orphans(lots: &[Lot], sales: &[Sale]) {
    let orphans = sales
        .iter()
        .filter(|s| !lots.iter().any(|l| l.id == s.lot_id))
        .count();
    if orphans > 0 {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "{} sales reference missing lots and were ignored",
            orphans
        )));
    }
}

// ============================================================================
// Computation (target independent)
// ============================================================================

fn dashboard_json(
    lots_json: &str,
    sales_json: &str,
    params_json: &str,
    today: NaiveDate,
) -> Result<String, String> {
    let (lots, sales) = load_records(lots_json, sales_json)?;
    let params: DashboardParams = if params_json.trim().is_empty() {
        DashboardParams::default()
    } else {
        parse(params_json, "params")?
    };
    to_json(&analytics::build_dashboard(&lots, &sales, &params, today))
}

fn sales_page_json(lots_json: &str, sales_json: &str, query_json: &str) -> Result<String, String> {
    let (lots, sales) = load_records(lots_json, sales_json)?;
    let query: SalesQuery = if query_json.trim().is_empty() {
        SalesQuery::default()
    } else {
        parse(query_json, "query")?
    };
    to_json(&listing::list_sales(&lots, &sales, &query))
}

fn stalled_json(
    lots_json: &str,
    sales_json: &str,
    threshold_days: i32,
    today: NaiveDate,
) -> Result<String, String> {
    let (lots, sales) = load_records(lots_json, sales_json)?;
    to_json(&analytics::stalled_lots(
        &lots,
        &sales,
        i64::from(threshold_days),
        today,
    ))
}

#[derive(Serialize)]
struct FieldError {
    field: &'static str,
    message: String,
}

/// Empty string when valid, otherwise the first field error as JSON
fn lot_form_errors(input_json: &str, lots_json: &str, editing_id: &str) -> Result<String, String> {
    let input: LotInput = parse(input_json, "lot")?;
    let lots: Vec<Lot> = parse(lots_json, "lots")?;
    let editing = Some(editing_id).filter(|id| !id.is_empty());

    let failure = validate_lot_input(&input).err().or_else(|| {
        validate_lot_code_unique(&input.lot_code, &lots, editing)
            .err()
            .map(|m| ("lotCode", m.to_string()))
    });
    match failure {
        Some((field, message)) => to_json(&FieldError { field, message }),
        None => Ok(String::new()),
    }
}

fn sale_form_errors(input_json: &str) -> Result<String, String> {
    let input: SaleInput = parse(input_json, "sale")?;
    match validate_sale_input(&input) {
        Err((field, message)) => to_json(&FieldError { field, message }),
        Ok(()) => Ok(String::new()),
    }
}

fn margin(profit: f64, sales: f64) -> f64 {
    let (Ok(profit), Ok(sales)) = (Decimal::try_from(profit), Decimal::try_from(sales)) else {
        return 0.0;
    };
    analytics::margin_percent(profit, sales)
        .to_f64()
        .unwrap_or(0.0)
}

// ============================================================================
// Exports
// ============================================================================

/// Compute the whole dashboard. `today` is `YYYY-MM-DD` or empty for the
/// browser's current date.
#[wasm_bindgen]
pub fn compute_dashboard(
    lots_json: &str,
    sales_json: &str,
    params_json: &str,
    today: &str,
) -> Result<String, JsValue> {
    let today = resolve_today(today).map_err(|e| JsValue::from_str(&e))?;
    if let (Ok(lots), Ok(sales)) = (
        serde_json::from_str::<Vec<Lot>>(lots_json),
        serde_json::from_str::<Vec<Sale>>(sales_json),
    ) {
        warn_orphans(&lots, &sales);
    }
    dashboard_json(lots_json, sales_json, params_json, today).map_err(|e| JsValue::from_str(&e))
}

/// One page of the filtered sales table
#[wasm_bindgen]
pub fn list_sales(lots_json: &str, sales_json: &str, query_json: &str) -> Result<String, JsValue> {
    sales_page_json(lots_json, sales_json, query_json).map_err(|e| JsValue::from_str(&e))
}

/// Lots idle for more than `threshold_days`
#[wasm_bindgen]
pub fn stalled_lots(
    lots_json: &str,
    sales_json: &str,
    threshold_days: i32,
    today: &str,
) -> Result<String, JsValue> {
    let today = resolve_today(today).map_err(|e| JsValue::from_str(&e))?;
    stalled_json(lots_json, sales_json, threshold_days, today).map_err(|e| JsValue::from_str(&e))
}

/// Profit over sales as a percentage; 0 when nothing sold
#[wasm_bindgen]
pub fn margin_percent(profit: f64, sales: f64) -> f64 {
    margin(profit, sales)
}

/// Validate the lot form before submitting it
#[wasm_bindgen]
pub fn validate_lot_form(
    input_json: &str,
    lots_json: &str,
    editing_id: &str,
) -> Result<String, JsValue> {
    lot_form_errors(input_json, lots_json, editing_id).map_err(|e| JsValue::from_str(&e))
}

/// Validate the sale form before submitting it
#[wasm_bindgen]
pub fn validate_sale_form(input_json: &str) -> Result<String, JsValue> {
    sale_form_errors(input_json).map_err(|e| JsValue::from_str(&e))
}
