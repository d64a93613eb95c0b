use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::domains::policies::actions::{
    prepare_new_policy, prepare_update, CreatePolicyInput, UpdatePolicyInput,
};
use crate::domains::policies::models::{CategoryCount, Policy, PolicyFilter};
use crate::server::app::AppState;
use crate::server::error::ApiError;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListPoliciesQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListPoliciesQuery {
    pub fn into_filter(self) -> PolicyFilter {
        let blank_to_none = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        PolicyFilter {
            category: blank_to_none(self.category),
            search: blank_to_none(self.q),
            include_inactive: self.include_inactive,
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid policy id: {}", raw)))
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("policy {} not found", id))
}

/// `GET /api/policies`
pub async fn list_policies_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<ListPoliciesQuery>,
) -> Result<Json<Vec<Policy>>, ApiError> {
    let filter = query.into_filter();
    let policies = Policy::list(&filter, &state.deps.db_pool).await?;
    Ok(Json(policies))
}

/// `GET /api/policies/categories`
pub async fn list_categories_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<CategoryCount>>, ApiError> {
    let categories = Policy::categories(&state.deps.db_pool).await?;
    Ok(Json(categories))
}

/// `GET /api/policies/:id`
pub async fn get_policy_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Policy>, ApiError> {
    let id = parse_id(&id)?;
    Policy::find_by_id(id, &state.deps.db_pool)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// `POST /api/policies`
pub async fn create_policy_handler(
    Extension(state): Extension<AppState>,
    Json(input): Json<CreatePolicyInput>,
) -> Result<(StatusCode, Json<Policy>), ApiError> {
    let new_policy = prepare_new_policy(input).map_err(ApiError::BadRequest)?;
    let policy = Policy::create(new_policy, &state.deps.db_pool)
        .await
        .map_err(ApiError::from_store)?;

    tracing::info!(id = %policy.id, identifier = %policy.identifier, "Policy created");
    Ok((StatusCode::CREATED, Json(policy)))
}

/// `PUT /api/policies/:id`
pub async fn update_policy_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePolicyInput>,
) -> Result<Json<Policy>, ApiError> {
    let id = parse_id(&id)?;
    let changes = prepare_update(input).map_err(ApiError::BadRequest)?;

    Policy::update(id, changes, &state.deps.db_pool)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// `DELETE /api/policies/:id`
pub async fn delete_policy_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;

    if Policy::delete(id, &state.deps.db_pool).await? {
        tracing::info!(id = %id, "Policy deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
