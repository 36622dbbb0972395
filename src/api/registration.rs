// src/api/registration.rs

use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{RegistrationCreated, RegistrationRequest};
use crate::{billing, AppState};

/// Front-desk sign-up: account, first membership and its sale in one step.
#[utoipa::path(
    post,
    path = "/api/registro",
    tag = "registration",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Member registered", body = RegistrationCreated),
        (status = 400, description = "Invalid payload, username taken or unknown plan"),
        (status = 403, description = "Read-only mode")
    )
)]
#[post("/registro")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegistrationRequest>,
) -> Result<HttpResponse, ApiError> {
    payload.validate()?;
    let registration = billing::register_member(&state.pool, &payload, billing::today()).await?;

    Ok(HttpResponse::Created().json(RegistrationCreated {
        message: "Member registered".into(),
        user: registration.user,
        membership: registration.membership,
        venta_id: registration.venta_id,
    }))
}
