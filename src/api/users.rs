// src/api/users.rs

use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use bcrypt::{hash, DEFAULT_COST};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{NewUser, UserChanges, UserPatch, UserPayload};
use crate::{db, AppState};

fn hash_password(password: &str) -> Result<String, ApiError> {
    hash(password, DEFAULT_COST).map_err(|e| ApiError::Internal(format!("bcrypt hash error: {e}")))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses((status = 200, description = "Accounts", body = [crate::models::User]))
)]
#[get("/users")]
pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let users = db::list_users(&state.pool).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "Account created", body = crate::models::User),
        (status = 400, description = "Invalid payload or username taken"),
        (status = 403, description = "Read-only mode")
    )
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<AppState>,
    payload: web::Json<UserPayload>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;
    let payload = payload.into_inner();

    let user = db::insert_user(
        &state.pool,
        &NewUser {
            password_hash: hash_password(&payload.password)?,
            username: payload.username,
            email: payload.email.unwrap_or_default(),
            first_name: payload.first_name.unwrap_or_default(),
            last_name: payload.last_name.unwrap_or_default(),
        },
    )
    .await?;

    log::info!("user created id={} username={}", user.id, user.username);
    Ok(HttpResponse::Created().json(user))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, body = crate::models::User),
        (status = 404, description = "Not found")
    )
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let user = db::get_user(&state.pool, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(user))
}

async fn apply_patch(
    state: &AppState,
    id: i32,
    patch: UserPatch,
) -> Result<HttpResponse, ApiError> {
    let changes = UserChanges {
        password_hash: patch.password.as_deref().map(hash_password).transpose()?,
        username: patch.username,
        email: patch.email,
        first_name: patch.first_name,
        last_name: patch.last_name,
    };
    let user = db::update_user(&state.pool, id, &changes)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(user))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    request_body = UserPayload,
    responses(
        (status = 200, body = crate::models::User),
        (status = 400, description = "Invalid payload or username taken"),
        (status = 404, description = "Not found")
    )
)]
#[put("/users/{id}")]
pub async fn replace_user(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    payload: web::Json<UserPayload>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;
    apply_patch(&state, path.into_inner(), payload.into_inner().into()).await
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    request_body = UserPatch,
    responses(
        (status = 200, body = crate::models::User),
        (status = 400, description = "Invalid payload or username taken"),
        (status = 404, description = "Not found")
    )
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    payload: web::Json<UserPatch>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;
    apply_patch(&state, path.into_inner(), payload.into_inner()).await
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted; the account's sales keep an empty buyer"),
        (status = 404, description = "Not found")
    )
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    if !db::delete_user(&state.pool, path.into_inner()).await? {
        return Err(ApiError::NotFound);
    }
    Ok(HttpResponse::NoContent().finish())
}
