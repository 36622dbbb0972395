// src/api/products.rs

use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{ProductoPatch, ProductoPayload};
use crate::{db, AppState};

#[utoipa::path(
    get,
    path = "/api/productos",
    tag = "productos",
    responses((status = 200, description = "Inventory", body = [crate::models::Producto]))
)]
#[get("/productos")]
pub async fn list_productos(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let productos = db::list_productos(&state.pool).await?;
    Ok(HttpResponse::Ok().json(productos))
}

#[utoipa::path(
    post,
    path = "/api/productos",
    tag = "productos",
    request_body = ProductoPayload,
    responses(
        (status = 201, description = "Product created", body = crate::models::Producto),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Read-only mode")
    )
)]
#[post("/productos")]
pub async fn create_producto(
    state: web::Data<AppState>,
    payload: web::Json<ProductoPayload>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;
    let producto = db::insert_producto(&state.pool, &payload).await?;
    Ok(HttpResponse::Created().json(producto))
}

#[utoipa::path(
    get,
    path = "/api/productos/{id}",
    tag = "productos",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, body = crate::models::Producto),
        (status = 404, description = "Not found")
    )
)]
#[get("/productos/{id}")]
pub async fn get_producto(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let producto = db::get_producto(&state.pool, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(producto))
}

async fn apply_patch(
    state: &AppState,
    id: i32,
    patch: ProductoPatch,
) -> Result<HttpResponse, ApiError> {
    patch.validate()?;
    let producto = db::update_producto(&state.pool, id, &patch)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(producto))
}

#[utoipa::path(
    put,
    path = "/api/productos/{id}",
    tag = "productos",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductoPayload,
    responses(
        (status = 200, body = crate::models::Producto),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Not found")
    )
)]
#[put("/productos/{id}")]
pub async fn replace_producto(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    payload: web::Json<ProductoPayload>,
) -> Result<HttpResponse, ApiError> {
    apply_patch(&state, path.into_inner(), payload.into_inner().into()).await
}

#[utoipa::path(
    patch,
    path = "/api/productos/{id}",
    tag = "productos",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductoPatch,
    responses(
        (status = 200, body = crate::models::Producto),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Not found")
    )
)]
#[patch("/productos/{id}")]
pub async fn update_producto(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    payload: web::Json<ProductoPatch>,
) -> Result<HttpResponse, ApiError> {
    apply_patch(&state, path.into_inner(), payload.into_inner()).await
}

#[utoipa::path(
    delete,
    path = "/api/productos/{id}",
    tag = "productos",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Deleted; past sales keep their snapshot"),
        (status = 404, description = "Not found")
    )
)]
#[delete("/productos/{id}")]
pub async fn delete_producto(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    if !db::delete_producto(&state.pool, path.into_inner()).await? {
        return Err(ApiError::NotFound);
    }
    Ok(HttpResponse::NoContent().finish())
}
