use crate::{AppState, auth::AuthUser, error::AppError};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use core_types::{ExchangeRate, NewExchangeRate};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesQuery {
    #[serde(default = "default_from")]
    currency_from: String,
    #[serde(default = "default_to")]
    currency_to: String,
    #[serde(default = "default_rate_limit")]
    limit: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestRateQuery {
    #[serde(default = "default_from")]
    currency_from: String,
    #[serde(default = "default_to")]
    currency_to: String,
}

fn default_from() -> String {
    "USD".to_string()
}

fn default_to() -> String {
    "KZT".to_string()
}

fn default_rate_limit() -> i64 {
    10
}

fn validate_rate(payload: &NewExchangeRate) -> Result<(), AppError> {
    if payload.currency_from.len() != 3 || payload.currency_to.len() != 3 {
        return Err(AppError::Validation(
            "Currency codes must be 3 letters".to_string(),
        ));
    }
    if !(payload.rate > 0.0) {
        return Err(AppError::Validation("rate must be positive".to_string()));
    }
    Ok(())
}

/// # GET /api/exchange-rates
/// The most recent rates for a currency pair, newest date first.
pub async fn list_rates(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<RatesQuery>,
) -> Result<Json<Vec<ExchangeRate>>, AppError> {
    let rates = state
        .db_repo
        .list_exchange_rates(&query.currency_from, &query.currency_to, query.limit.max(1))
        .await?;
    Ok(Json(rates))
}

/// # GET /api/exchange-rates/latest
pub async fn latest_rate(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<LatestRateQuery>,
) -> Result<Json<ExchangeRate>, AppError> {
    let rate = state
        .db_repo
        .latest_exchange_rate(&query.currency_from, &query.currency_to)
        .await?
        .ok_or_else(|| AppError::NotFound("Exchange rate not found".to_string()))?;
    Ok(Json(rate))
}

/// # POST /api/exchange-rates
/// Records a rate for a (from, to, date) triple; an existing triple has its
/// rate overwritten rather than duplicated, answering 200 instead of 201.
pub async fn create_rate(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewExchangeRate>,
) -> Result<(StatusCode, Json<ExchangeRate>), AppError> {
    validate_rate(&payload)?;

    let (rate, created) = state.db_repo.upsert_exchange_rate(&payload).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(rate)))
}
