use crate::{AppState, auth::AuthUser, error::AppError};
use analytics::{AnalyticsEngine, AnalyticsReport, DateRange};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

/// # GET /api/analytics
/// Builds the dashboard report: overall totals, top clients by revenue,
/// and the trailing six-month series. The date filter only applies when
/// both ends are given.
pub async fn get_analytics(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsReport>, AppError> {
    let date_range = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => Some(DateRange { start, end }),
        _ => None,
    };

    let (items, clients) = tokio::try_join!(
        state.db_repo.items_snapshot(),
        state.db_repo.clients_snapshot()
    )?;

    let report = AnalyticsEngine::new().aggregate(&items, &clients, date_range);
    Ok(Json(report))
}
