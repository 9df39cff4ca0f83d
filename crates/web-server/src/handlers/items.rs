use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    handlers::{Pagination, default_limit, default_page},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use core_types::ItemDraft;
use database::{ClientSummary, ItemWithClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsQuery {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_limit")]
    limit: i64,
    client_id: Option<i64>,
    product_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ItemsPage {
    pub items: Vec<ItemWithClient>,
    pub pagination: Pagination,
}

fn validate_item(draft: &ItemDraft) -> Result<(), AppError> {
    if draft.product_code.trim().is_empty() {
        return Err(AppError::Validation("productCode is required".to_string()));
    }
    if draft.quantity < 1 {
        return Err(AppError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }
    for (field, value) in [
        ("weight", draft.weight),
        ("priceUsd", draft.price_usd),
        ("exchangeRate", draft.exchange_rate),
    ] {
        if let Some(value) = value {
            if !(value > 0.0) {
                return Err(AppError::Validation(format!("{field} must be positive")));
            }
        }
    }
    Ok(())
}

/// # GET /api/items
/// Fetches one page of items with their owning clients; optional filters
/// are an exact client id and a product-code substring.
pub async fn list_items(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ItemsQuery>,
) -> Result<Json<ItemsPage>, AppError> {
    let page = query.page.max(1);
    let limit = query.limit.max(1);

    let (items, total) = state
        .db_repo
        .list_items(page, limit, query.client_id, query.product_code.as_deref())
        .await?;

    Ok(Json(ItemsPage {
        items,
        pagination: Pagination::new(total, page, limit),
    }))
}

/// # GET /api/items/:id
pub async fn get_item(
    _auth: AuthUser,
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ItemWithClient>, AppError> {
    let item = state
        .db_repo
        .find_item(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;
    Ok(Json(item))
}

/// # POST /api/items
/// Validates the draft, fills in the derived monetary fields, and stores it.
pub async fn create_item(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ItemDraft>,
) -> Result<(StatusCode, Json<ItemWithClient>), AppError> {
    validate_item(&payload)?;

    let client = state
        .db_repo
        .find_client(payload.client_id)
        .await?
        .ok_or_else(|| AppError::Validation("Client not found".to_string()))?;

    let draft = ledger::derive(payload);
    let item = state.db_repo.create_item(&draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(ItemWithClient {
            item,
            client: ClientSummary::from(&client),
        }),
    ))
}

/// # PUT /api/items/:id
/// Replaces the item. The derivation runs on exactly the fields present in
/// this request; stored sibling fields are never pulled into it.
pub async fn update_item(
    _auth: AuthUser,
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ItemDraft>,
) -> Result<Json<ItemWithClient>, AppError> {
    validate_item(&payload)?;

    let client = state
        .db_repo
        .find_client(payload.client_id)
        .await?
        .ok_or_else(|| AppError::Validation("Client not found".to_string()))?;

    let draft = ledger::derive(payload);
    let item = state
        .db_repo
        .update_item(id, &draft)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    Ok(Json(ItemWithClient {
        item,
        client: ClientSummary::from(&client),
    }))
}

/// # DELETE /api/items/:id
pub async fn delete_item(
    _auth: AuthUser,
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    if !state.db_repo.delete_item(id).await? {
        return Err(AppError::NotFound("Item not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> ItemDraft {
        ItemDraft {
            client_id: 1,
            product_code: "PC-1".to_string(),
            arrival_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            quantity: 1,
            weight: None,
            price_usd: None,
            exchange_rate: None,
            amount_kzt: None,
            cost_price: None,
            margin: None,
            notes: None,
        }
    }

    #[test]
    fn accepts_a_minimal_draft() {
        assert!(validate_item(&draft()).is_ok());
    }

    #[test]
    fn rejects_non_positive_quantities_and_prices() {
        let mut d = draft();
        d.quantity = 0;
        assert!(validate_item(&d).is_err());

        let mut d = draft();
        d.price_usd = Some(0.0);
        assert!(validate_item(&d).is_err());

        let mut d = draft();
        d.weight = Some(-1.5);
        assert!(validate_item(&d).is_err());
    }

    #[test]
    fn zero_amount_is_allowed_as_an_explicit_override() {
        let mut d = draft();
        d.amount_kzt = Some(0.0);
        d.cost_price = Some(0.0);
        d.margin = Some(0.0);
        assert!(validate_item(&d).is_ok());
    }

    #[test]
    fn rejects_blank_product_codes() {
        let mut d = draft();
        d.product_code = "   ".to_string();
        assert!(validate_item(&d).is_err());
    }
}
