// src/api/memberships.rs

use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{MembershipTypePatch, MembershipTypePayload};
use crate::{db, AppState};

const SOLD_PLAN: &str = "membership type is referenced by sales and cannot be modified";

#[utoipa::path(
    get,
    path = "/api/memberships",
    tag = "memberships",
    responses(
        (status = 200, description = "Membership catalog", body = [crate::models::MembershipType])
    )
)]
#[get("/memberships")]
pub async fn list_membership_types(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let items = db::list_membership_types(&state.pool).await?;
    Ok(HttpResponse::Ok().json(items))
}

#[utoipa::path(
    post,
    path = "/api/memberships",
    tag = "memberships",
    request_body = MembershipTypePayload,
    responses(
        (status = 201, description = "Membership type created",
            body = crate::models::MembershipType),
        (status = 400, description = "Invalid payload or duplicate name"),
        (status = 403, description = "Read-only mode")
    )
)]
#[post("/memberships")]
pub async fn create_membership_type(
    state: web::Data<AppState>,
    payload: web::Json<MembershipTypePayload>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;
    let created = db::insert_membership_type(&state.pool, &payload).await?;
    log::info!("membership type created id={} name={}", created.id, created.name);
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/api/memberships/{id}",
    tag = "memberships",
    params(("id" = i32, Path, description = "Membership type id")),
    responses(
        (status = 200, body = crate::models::MembershipType),
        (status = 404, description = "Not found")
    )
)]
#[get("/memberships/{id}")]
pub async fn get_membership_type(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let item = db::get_membership_type(&state.pool, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(item))
}

async fn apply_patch(
    state: &AppState,
    id: i32,
    patch: MembershipTypePatch,
) -> Result<HttpResponse, ApiError> {
    patch.validate()?;

    let mut tx = state.pool.begin().await?;
    if db::membership_type_in_sales(&mut *tx, id).await? {
        return Err(ApiError::BadRequest(SOLD_PLAN.into()));
    }
    let updated = db::update_membership_type(&mut *tx, id, &patch)
        .await?
        .ok_or(ApiError::NotFound)?;
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    put,
    path = "/api/memberships/{id}",
    tag = "memberships",
    params(("id" = i32, Path, description = "Membership type id")),
    request_body = MembershipTypePayload,
    responses(
        (status = 200, body = crate::models::MembershipType),
        (status = 400, description = "Invalid payload or plan already sold"),
        (status = 404, description = "Not found")
    )
)]
#[put("/memberships/{id}")]
pub async fn replace_membership_type(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    payload: web::Json<MembershipTypePayload>,
) -> Result<HttpResponse, ApiError> {
    apply_patch(&state, path.into_inner(), payload.into_inner().into()).await
}

#[utoipa::path(
    patch,
    path = "/api/memberships/{id}",
    tag = "memberships",
    params(("id" = i32, Path, description = "Membership type id")),
    request_body = MembershipTypePatch,
    responses(
        (status = 200, body = crate::models::MembershipType),
        (status = 400, description = "Invalid payload or plan already sold"),
        (status = 404, description = "Not found")
    )
)]
#[patch("/memberships/{id}")]
pub async fn update_membership_type(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    payload: web::Json<MembershipTypePatch>,
) -> Result<HttpResponse, ApiError> {
    apply_patch(&state, path.into_inner(), payload.into_inner()).await
}

#[utoipa::path(
    delete,
    path = "/api/memberships/{id}",
    tag = "memberships",
    params(("id" = i32, Path, description = "Membership type id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Plan still referenced"),
        (status = 404, description = "Not found")
    )
)]
#[delete("/memberships/{id}")]
pub async fn delete_membership_type(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let mut tx = state.pool.begin().await?;
    if db::membership_type_in_sales(&mut *tx, id).await? {
        return Err(ApiError::BadRequest(SOLD_PLAN.into()));
    }
    if !db::delete_membership_type(&mut *tx, id).await? {
        return Err(ApiError::NotFound);
    }
    tx.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}
