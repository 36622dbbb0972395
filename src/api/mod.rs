// src/api/mod.rs

pub mod memberships;
pub mod products;
pub mod read_only;
pub mod registration;
pub mod sales;
pub mod user_memberships;
pub mod users;

use actix_web::web;

use crate::error::ApiError;

/// JSON extractor settings shared by every route: decoding failures become 400s.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("rejected request body: {err}");
        ApiError::Malformed(err.to_string()).into()
    })
}

/// Mounts the whole `/api` surface behind the read-only guard.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            .wrap(read_only::ReadOnlyGuard)
            .service(memberships::list_membership_types)
            .service(memberships::create_membership_type)
            .service(memberships::get_membership_type)
            .service(memberships::replace_membership_type)
            .service(memberships::update_membership_type)
            .service(memberships::delete_membership_type)
            .service(user_memberships::list_user_memberships)
            .service(user_memberships::purchase_membership)
            .service(user_memberships::get_user_membership)
            .service(user_memberships::replace_user_membership)
            .service(user_memberships::update_user_membership)
            .service(user_memberships::delete_user_membership)
            .service(users::list_users)
            .service(users::create_user)
            .service(users::get_user)
            .service(users::replace_user)
            .service(users::update_user)
            .service(users::delete_user)
            .service(products::list_productos)
            .service(products::create_producto)
            .service(products::get_producto)
            .service(products::replace_producto)
            .service(products::update_producto)
            .service(products::delete_producto)
            .service(sales::list_ventas)
            .service(sales::get_venta)
            .service(sales::create_venta)
            .service(registration::register),
    );
}
