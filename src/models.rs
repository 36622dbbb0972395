// src/models.rs

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Largest amount a NUMERIC(10, 2) column accepts, exclusive.
const MONEY_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Rejects negative amounts and anything that does not fit NUMERIC(10, 2).
pub fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    let message = if value.is_sign_negative() && !value.is_zero() {
        Some("must be zero or greater")
    } else if value.normalize().scale() > 2 {
        Some("ensure that there are no more than 2 decimal places")
    } else if *value >= MONEY_LIMIT {
        Some("ensure that there are no more than 10 digits in total")
    } else {
        None
    };

    match message {
        Some(message) => {
            let mut err = ValidationError::new("money");
            err.message = Some(Cow::Borrowed(message));
            Err(err)
        }
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Membership catalog

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MembershipType {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    /// 0 means a single day pass.
    pub duration_days: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MembershipTypePayload {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_money"))]
    pub price: Decimal,
    #[validate(range(min = 0, message = "must be zero or greater"))]
    pub duration_days: i32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct MembershipTypePatch {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "must be zero or greater"))]
    pub duration_days: Option<i32>,
}

impl From<MembershipTypePayload> for MembershipTypePatch {
    fn from(p: MembershipTypePayload) -> Self {
        Self {
            name: Some(p.name),
            price: Some(p.price),
            duration_days: Some(p.duration_days),
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts

/// Account as exposed by the API. The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserPayload {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub username: String,
    #[validate(email(message = "enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "this field may not be blank"))]
    pub password: String,
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub last_name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UserPatch {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "this field may not be blank"))]
    pub password: Option<String>,
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub last_name: Option<String>,
}

impl From<UserPayload> for UserPatch {
    fn from(p: UserPayload) -> Self {
        Self {
            username: Some(p.username),
            email: Some(p.email.unwrap_or_default()),
            password: Some(p.password),
            first_name: Some(p.first_name.unwrap_or_default()),
            last_name: Some(p.last_name.unwrap_or_default()),
        }
    }
}

/// Row ready for insertion; the password is already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Column changes for an account update; `None` leaves the column as is.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Membership ledger

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UserMembership {
    pub id: i32,
    #[sqlx(rename = "user_id")]
    pub user: i32,
    #[sqlx(rename = "membership_type_id")]
    pub membership_type: i32,
    pub membership_type_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
}

/// Body of `POST /api/user-memberships`: buy, renew or reactivate a plan.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MembershipPurchase {
    pub user: i32,
    pub membership_type: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserMembershipPayload {
    pub user: i32,
    pub membership_type: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserMembershipPatch {
    pub user: Option<i32>,
    pub membership_type: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<UserMembershipPayload> for UserMembershipPatch {
    fn from(p: UserMembershipPayload) -> Self {
        Self {
            user: Some(p.user),
            membership_type: Some(p.membership_type),
            start_date: Some(p.start_date),
            end_date: Some(p.end_date),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserMembershipFilter {
    pub user: Option<i32>,
}

// ---------------------------------------------------------------------------
// Inventory

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Producto {
    pub id: i32,
    pub nombre: String,
    pub stock: i32,
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductoPayload {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub nombre: String,
    #[validate(range(min = 0, message = "must be zero or greater"))]
    pub stock: i32,
    #[validate(custom(function = "validate_money"))]
    pub price: Decimal,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ProductoPatch {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub nombre: Option<String>,
    #[validate(range(min = 0, message = "must be zero or greater"))]
    pub stock: Option<i32>,
    #[validate(custom(function = "validate_money"))]
    pub price: Option<Decimal>,
}

impl From<ProductoPayload> for ProductoPatch {
    fn from(p: ProductoPayload) -> Self {
        Self {
            nombre: Some(p.nombre),
            stock: Some(p.stock),
            price: Some(p.price),
        }
    }
}

// ---------------------------------------------------------------------------
// Sales ledger

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Venta {
    pub id: i32,
    #[sqlx(rename = "cliente_id")]
    pub cliente: Option<i32>,
    pub total: Decimal,
    pub metodo_pago: String,
    #[schema(value_type = Vec<Object>)]
    pub detalle_productos: serde_json::Value,
    pub fecha: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaleItem {
    pub producto: i32,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub cantidad: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSaleRequest {
    pub cliente: i32,
    #[validate(custom(function = "validate_money"))]
    pub total: Decimal,
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub metodo_pago: String,
    #[validate(length(min = 1, message = "a sale needs at least one item"), nested)]
    pub productos: Vec<SaleItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleCreated {
    pub message: String,
    pub venta_id: i32,
}

// ---------------------------------------------------------------------------
// Registration

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegistrationRequest {
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub username: String,
    #[validate(email(message = "enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "this field may not be blank"))]
    pub password: String,
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub last_name: Option<String>,
    pub membership_type: i32,
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub metodo_pago: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationCreated {
    pub message: String,
    pub user: User,
    pub membership: UserMembership,
    pub venta_id: i32,
}
