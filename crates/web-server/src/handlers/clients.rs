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
use core_types::{Client, NewClient};
use database::{ClientDetail, ClientOverview};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ClientsQuery {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_limit")]
    limit: i64,
    search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClientsPage {
    pub clients: Vec<ClientOverview>,
    pub pagination: Pagination,
}

fn validate_client(payload: &NewClient) -> Result<(), AppError> {
    if payload.client_code.trim().is_empty() {
        return Err(AppError::Validation("clientCode is required".to_string()));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if payload.phone.trim().is_empty() {
        return Err(AppError::Validation("phone is required".to_string()));
    }
    if let Some(email) = &payload.email {
        if !email.contains('@') {
            return Err(AppError::Validation("email must be valid".to_string()));
        }
    }
    Ok(())
}

/// # GET /api/clients
/// Fetches one page of clients with their item counts; `search` matches
/// name, client code, or phone.
pub async fn list_clients(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClientsQuery>,
) -> Result<Json<ClientsPage>, AppError> {
    let page = query.page.max(1);
    let limit = query.limit.max(1);

    let (clients, total) = state
        .db_repo
        .list_clients(page, limit, query.search.as_deref())
        .await?;

    Ok(Json(ClientsPage {
        clients,
        pagination: Pagination::new(total, page, limit),
    }))
}

/// # GET /api/clients/:id
/// Fetches a single client together with all of its items.
pub async fn get_client(
    _auth: AuthUser,
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClientDetail>, AppError> {
    let detail = state
        .db_repo
        .get_client_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;
    Ok(Json(detail))
}

/// # POST /api/clients
pub async fn create_client(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewClient>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    validate_client(&payload)?;

    if state
        .db_repo
        .client_code_taken(&payload.client_code, None)
        .await?
    {
        return Err(AppError::Validation(
            "Client code already exists".to_string(),
        ));
    }

    let client = state.db_repo.create_client(&payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// # PUT /api/clients/:id
pub async fn update_client(
    _auth: AuthUser,
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewClient>,
) -> Result<Json<Client>, AppError> {
    validate_client(&payload)?;

    // The code must stay unique, but the row being updated may keep its own.
    if state
        .db_repo
        .client_code_taken(&payload.client_code, Some(id))
        .await?
    {
        return Err(AppError::Validation(
            "Client code already exists".to_string(),
        ));
    }

    let client = state
        .db_repo
        .update_client(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;
    Ok(Json(client))
}

/// # DELETE /api/clients/:id
/// Removes the client; its items go with it.
pub async fn delete_client(
    _auth: AuthUser,
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    if !state.db_repo.delete_client(id).await? {
        return Err(AppError::NotFound("Client not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
