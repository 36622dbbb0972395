// src/api/sales.rs

use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{CreateSaleRequest, SaleCreated};
use crate::{billing, db, AppState};

#[utoipa::path(
    get,
    path = "/api/ventas",
    tag = "ventas",
    responses(
        (status = 200, description = "Sales ledger, newest first", body = [crate::models::Venta])
    )
)]
#[get("/ventas")]
pub async fn list_ventas(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let ventas = db::list_ventas(&state.pool).await?;
    Ok(HttpResponse::Ok().json(ventas))
}

#[utoipa::path(
    get,
    path = "/api/ventas/{id}",
    tag = "ventas",
    params(("id" = i32, Path, description = "Sale id")),
    responses(
        (status = 200, body = crate::models::Venta),
        (status = 404, description = "Not found")
    )
)]
#[get("/ventas/{id}")]
pub async fn get_venta(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let venta = db::get_venta(&state.pool, path.into_inner())
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(venta))
}

/// Point-of-sale checkout: takes every line out of stock or none of them.
#[utoipa::path(
    post,
    path = "/api/crear-venta",
    tag = "ventas",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Sale recorded", body = SaleCreated),
        (status = 400, description = "Invalid payload, unknown product or insufficient stock"),
        (status = 403, description = "Read-only mode")
    )
)]
#[post("/crear-venta")]
pub async fn create_venta(
    state: web::Data<AppState>,
    payload: web::Json<CreateSaleRequest>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;
    let venta_id = billing::record_sale(&state.pool, &payload).await?;
    Ok(HttpResponse::Created().json(SaleCreated {
        message: "Sale recorded".into(),
        venta_id,
    }))
}
