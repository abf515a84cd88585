//! Dashboard and report export handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use shared::analytics::{Dashboard, Overview};

use crate::error::AppResult;
use crate::services::dashboard::{self, DashboardQuery, ReportFormat};
use crate::AppState;

/// Get the full dashboard for the selected filters
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<Dashboard>> {
    let records = state.records.read().await;
    let data = dashboard::dashboard(&records, &query, &state.config.analytics)?;
    Ok(Json(data))
}

/// Unfiltered header totals
pub async fn get_overview(State(state): State<AppState>) -> Json<Overview> {
    let records = state.records.read().await;
    Json(dashboard::header_overview(&records))
}

/// Per-lot CMV report
pub async fn get_lot_report(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<impl IntoResponse> {
    let format = query.format()?;
    let data = {
        let records = state.records.read().await;
        dashboard::lot_report(&records, &query, &state.config.analytics)?
    };

    if format == ReportFormat::Csv {
        let csv = dashboard::export_to_csv(&data)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"lot_report.csv\""),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(data).into_response())
    }
}
