// src/api/read_only.rs

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::{web, Error, ResponseError};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::task::{Context, Poll};

use crate::error::ApiError;
use crate::AppState;

/// Middleware that:
/// - reads `AppState::read_only`, fixed at start-up
/// - lets GET/HEAD/OPTIONS through untouched
/// - answers every other method with the static 403 payload
pub struct ReadOnlyGuard;

impl<S, B> Transform<S, ServiceRequest> for ReadOnlyGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ReadOnlyGuardInner<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ReadOnlyGuardInner { service }))
    }
}

pub struct ReadOnlyGuardInner<S> {
    service: S,
}

fn is_safe(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

impl<S, B> Service<ServiceRequest> for ReadOnlyGuardInner<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let read_only = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.read_only)
            .unwrap_or(false);

        if read_only && !is_safe(req.method()) {
            log::warn!("read-only mode rejected {} {}", req.method(), req.path());
            let response = ApiError::ReadOnly.error_response().map_into_right_body();
            let (req, _) = req.into_parts();
            return Box::pin(async move { Ok(ServiceResponse::new(req, response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
