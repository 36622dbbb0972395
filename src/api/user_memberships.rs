// src/api/user_memberships.rs

use actix_web::http::StatusCode;
use actix_web::{delete, get, patch, post, put, web, HttpResponse};

use crate::billing::{self, RenewalOutcome};
use crate::error::ApiError;
use crate::models::{
    MembershipPurchase, UserMembershipFilter, UserMembershipPatch, UserMembershipPayload,
};
use crate::{db, AppState};

#[utoipa::path(
    get,
    path = "/api/user-memberships",
    tag = "user-memberships",
    params(("user" = Option<i32>, Query, description = "Only rows of this member")),
    responses(
        (status = 200, description = "Membership ledger", body = [crate::models::UserMembership])
    )
)]
#[get("/user-memberships")]
pub async fn list_user_memberships(
    state: web::Data<AppState>,
    filter: web::Query<UserMembershipFilter>,
) -> Result<HttpResponse, ApiError> {
    let items = db::list_user_memberships(&state.pool, filter.user, billing::today()).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// Buys a plan for a member. An existing row for the same plan is extended
/// while active and restarted once expired; no second row is created.
#[utoipa::path(
    post,
    path = "/api/user-memberships",
    tag = "user-memberships",
    request_body = MembershipPurchase,
    responses(
        (status = 201, description = "First membership created",
            body = crate::billing::RenewalResult),
        (status = 200, description = "Membership renewed or reactivated",
            body = crate::billing::RenewalResult),
        (status = 400, description = "Unknown user or membership type"),
        (status = 403, description = "Read-only mode")
    )
)]
#[post("/user-memberships")]
pub async fn purchase_membership(
    state: web::Data<AppState>,
    payload: web::Json<MembershipPurchase>,
) -> Result<HttpResponse, ApiError> {
    let result = billing::renew_membership(
        &state.pool,
        payload.user,
        payload.membership_type,
        billing::today(),
    )
    .await?;

    let status = match result.status {
        RenewalOutcome::Created => StatusCode::CREATED,
        RenewalOutcome::Renewed | RenewalOutcome::Reactivated => StatusCode::OK,
    };
    Ok(HttpResponse::build(status).json(result))
}

#[utoipa::path(
    get,
    path = "/api/user-memberships/{id}",
    tag = "user-memberships",
    params(("id" = i32, Path, description = "Ledger row id")),
    responses(
        (status = 200, body = crate::models::UserMembership),
        (status = 404, description = "Not found")
    )
)]
#[get("/user-memberships/{id}")]
pub async fn get_user_membership(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let item = db::get_user_membership(&state.pool, path.into_inner(), billing::today())
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(item))
}

async fn apply_patch(
    state: &AppState,
    id: i32,
    patch: UserMembershipPatch,
) -> Result<HttpResponse, ApiError> {
    let mut tx = state.pool.begin().await?;

    if let Some(user) = patch.user {
        if !db::user_exists(&mut *tx, user).await? {
            return Err(ApiError::field("user", billing::MISSING_PK));
        }
    }
    if let Some(membership_type) = patch.membership_type {
        if db::get_membership_type(&mut *tx, membership_type).await?.is_none() {
            return Err(ApiError::field("membership_type", billing::MISSING_PK));
        }
    }

    if !db::update_user_membership(&mut *tx, id, &patch).await? {
        return Err(ApiError::NotFound);
    }
    let updated = db::get_user_membership(&mut *tx, id, billing::today())
        .await?
        .ok_or(ApiError::NotFound)?;
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    put,
    path = "/api/user-memberships/{id}",
    tag = "user-memberships",
    params(("id" = i32, Path, description = "Ledger row id")),
    request_body = UserMembershipPayload,
    responses(
        (status = 200, body = crate::models::UserMembership),
        (status = 400, description = "Invalid references or end_date before start_date"),
        (status = 404, description = "Not found")
    )
)]
#[put("/user-memberships/{id}")]
pub async fn replace_user_membership(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    payload: web::Json<UserMembershipPayload>,
) -> Result<HttpResponse, ApiError> {
    apply_patch(&state, path.into_inner(), payload.into_inner().into()).await
}

#[utoipa::path(
    patch,
    path = "/api/user-memberships/{id}",
    tag = "user-memberships",
    params(("id" = i32, Path, description = "Ledger row id")),
    request_body = UserMembershipPatch,
    responses(
        (status = 200, body = crate::models::UserMembership),
        (status = 400, description = "Invalid references or end_date before start_date"),
        (status = 404, description = "Not found")
    )
)]
#[patch("/user-memberships/{id}")]
pub async fn update_user_membership(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    payload: web::Json<UserMembershipPatch>,
) -> Result<HttpResponse, ApiError> {
    apply_patch(&state, path.into_inner(), payload.into_inner()).await
}

#[utoipa::path(
    delete,
    path = "/api/user-memberships/{id}",
    tag = "user-memberships",
    params(("id" = i32, Path, description = "Ledger row id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
#[delete("/user-memberships/{id}")]
pub async fn delete_user_membership(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    if !db::delete_user_membership(&state.pool, path.into_inner()).await? {
        return Err(ApiError::NotFound);
    }
    Ok(HttpResponse::NoContent().finish())
}
