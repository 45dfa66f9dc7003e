//! Sales reports, as JSON or a CSV download.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::api::middleware::require_admin;
use crate::api::AppState;
use crate::config::DEFAULT_REPORT_WINDOW_DAYS;
use crate::domain::{Principal, Report, ReportKind, ReportWindow};
use crate::errors::AppResult;
use crate::types::CsvAttachment;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Trailing window in days, `0` for all time
    pub days: Option<u32>,
    pub format: Option<ReportFormat>,
}

pub fn report_routes() -> Router<AppState> {
    Router::new().route("/reports/:kind", get(get_report))
}

/// Generate a report over the trailing window
#[utoipa::path(
    get,
    path = "/admin/reports/{kind}",
    tag = "Admin",
    params(
        ("kind" = ReportKind, Path, description = "overview, sales, products or users"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "Report tagged by `type`; overview shown. CSV when format=csv", body = crate::domain::reporting::OverviewReport),
        (status = 400, description = "Unknown report kind"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_report(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(kind): Path<String>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    require_admin(&principal)?;

    let kind: ReportKind = kind.parse()?;
    let now = Utc::now();
    let window = ReportWindow::trailing_days(query.days.unwrap_or(DEFAULT_REPORT_WINDOW_DAYS), now)
        .with_offset(state.report_utc_offset);

    let report = state.report_service.report(kind, window).await?;
    tracing::debug!(kind = %kind, days = ?window.days(), "Report generated");

    Ok(match query.format.unwrap_or_default() {
        ReportFormat::Json => Json(report).into_response(),
        ReportFormat::Csv => {
            let today = now.with_timezone(&state.report_utc_offset).date_naive();
            csv_download(&report, today)
        }
    })
}

fn csv_download(report: &Report, on: NaiveDate) -> Response {
    CsvAttachment {
        filename: report.csv_filename(on),
        body: report.to_csv(),
    }
    .into_response()
}
