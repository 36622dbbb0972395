// src/db.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use crate::billing::Period;
use crate::models::{
    MembershipType, MembershipTypePatch, MembershipTypePayload, NewUser, Producto, ProductoPatch,
    ProductoPayload, User, UserChanges, UserMembership, UserMembershipPatch, Venta,
};

// ---------------------------------------------------------------------------
// membership_types

pub async fn list_membership_types(pool: &PgPool) -> Result<Vec<MembershipType>, sqlx::Error> {
    sqlx::query_as::<_, MembershipType>(
        "SELECT id, name, price, duration_days FROM membership_types ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

pub async fn get_membership_type<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i32,
) -> Result<Option<MembershipType>, sqlx::Error> {
    sqlx::query_as::<_, MembershipType>(
        "SELECT id, name, price, duration_days FROM membership_types WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn insert_membership_type(
    pool: &PgPool,
    input: &MembershipTypePayload,
) -> Result<MembershipType, sqlx::Error> {
    sqlx::query_as::<_, MembershipType>(
        r#"INSERT INTO membership_types (name, price, duration_days)
           VALUES ($1, $2, $3)
           RETURNING id, name, price, duration_days"#,
    )
    .bind(&input.name)
    .bind(input.price)
    .bind(input.duration_days)
    .fetch_one(pool)
    .await
}

pub async fn update_membership_type<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i32,
    patch: &MembershipTypePatch,
) -> Result<Option<MembershipType>, sqlx::Error> {
    sqlx::query_as::<_, MembershipType>(
        r#"UPDATE membership_types
           SET name = COALESCE($2, name),
               price = COALESCE($3, price),
               duration_days = COALESCE($4, duration_days)
           WHERE id = $1
           RETURNING id, name, price, duration_days"#,
    )
    .bind(id)
    .bind(patch.name.as_deref())
    .bind(patch.price)
    .bind(patch.duration_days)
    .fetch_optional(executor)
    .await
}

pub async fn delete_membership_type<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i32,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM membership_types WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// True when any sale snapshot mentions this membership type.
pub async fn membership_type_in_sales<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i32,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM ventas WHERE detalle_productos @> $1)",
    )
    .bind(serde_json::json!([{ "membership_type_id": id }]))
    .fetch_one(executor)
    .await
}

// ---------------------------------------------------------------------------
// users

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, date_joined";

pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
        .fetch_all(pool)
        .await
}

pub async fn get_user<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i32,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn user_exists<'e, E: PgExecutor<'e>>(executor: E, id: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
}

pub async fn insert_user<'e, E: PgExecutor<'e>>(
    executor: E,
    input: &NewUser,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"INSERT INTO users (username, email, password_hash, first_name, last_name)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING {USER_COLUMNS}"#
    ))
    .bind(&input.username)
    .bind(&input.email)
    .bind(&input.password_hash)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .fetch_one(executor)
    .await
}

pub async fn update_user(
    pool: &PgPool,
    id: i32,
    changes: &UserChanges,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"UPDATE users
           SET username = COALESCE($2, username),
               email = COALESCE($3, email),
               password_hash = COALESCE($4, password_hash),
               first_name = COALESCE($5, first_name),
               last_name = COALESCE($6, last_name)
           WHERE id = $1
           RETURNING {USER_COLUMNS}"#
    ))
    .bind(id)
    .bind(changes.username.as_deref())
    .bind(changes.email.as_deref())
    .bind(changes.password_hash.as_deref())
    .bind(changes.first_name.as_deref())
    .bind(changes.last_name.as_deref())
    .fetch_optional(pool)
    .await
}

pub async fn delete_user(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// user_memberships

// `$1` is the caller's "today", the same date renewals are planned against.
const MEMBERSHIP_SELECT: &str = r#"SELECT um.id, um.user_id, um.membership_type_id,
              mt.name AS membership_type_name,
              um.start_date, um.end_date,
              (um.end_date >= $1::DATE) AS is_active
       FROM user_memberships um
       JOIN membership_types mt ON mt.id = um.membership_type_id"#;

pub async fn list_user_memberships(
    pool: &PgPool,
    user_id: Option<i32>,
    today: NaiveDate,
) -> Result<Vec<UserMembership>, sqlx::Error> {
    sqlx::query_as::<_, UserMembership>(&format!(
        "{MEMBERSHIP_SELECT} WHERE ($2::INTEGER IS NULL OR um.user_id = $2) ORDER BY um.id"
    ))
    .bind(today)
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_user_membership<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i32,
    today: NaiveDate,
) -> Result<Option<UserMembership>, sqlx::Error> {
    sqlx::query_as::<_, UserMembership>(&format!("{MEMBERSHIP_SELECT} WHERE um.id = $2"))
        .bind(today)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// First ledger row for the pair, locked for the rest of the transaction.
pub async fn lock_first_membership<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: i32,
    membership_type_id: i32,
) -> Result<Option<(i32, Period)>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i32, NaiveDate, NaiveDate)>(
        r#"SELECT id, start_date, end_date
           FROM user_memberships
           WHERE user_id = $1 AND membership_type_id = $2
           ORDER BY id
           LIMIT 1
           FOR UPDATE"#,
    )
    .bind(user_id)
    .bind(membership_type_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|(id, start_date, end_date)| (id, Period { start_date, end_date })))
}

pub async fn insert_user_membership<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: i32,
    membership_type_id: i32,
    period: Period,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO user_memberships (user_id, membership_type_id, start_date, end_date)
           VALUES ($1, $2, $3, $4)
           RETURNING id"#,
    )
    .bind(user_id)
    .bind(membership_type_id)
    .bind(period.start_date)
    .bind(period.end_date)
    .fetch_one(executor)
    .await
}

pub async fn set_membership_period<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i32,
    period: Period,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE user_memberships SET start_date = $2, end_date = $3 WHERE id = $1")
        .bind(id)
        .bind(period.start_date)
        .bind(period.end_date)
        .execute(executor)
        .await?;
    Ok(())
}

/// Returns false when the row does not exist.
pub async fn update_user_membership<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i32,
    patch: &UserMembershipPatch,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        r#"UPDATE user_memberships
           SET user_id = COALESCE($2, user_id),
               membership_type_id = COALESCE($3, membership_type_id),
               start_date = COALESCE($4, start_date),
               end_date = COALESCE($5, end_date)
           WHERE id = $1"#,
    )
    .bind(id)
    .bind(patch.user)
    .bind(patch.membership_type)
    .bind(patch.start_date)
    .bind(patch.end_date)
    .execute(executor)
    .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn delete_user_membership(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM user_memberships WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// productos

pub async fn list_productos(pool: &PgPool) -> Result<Vec<Producto>, sqlx::Error> {
    sqlx::query_as::<_, Producto>("SELECT id, nombre, stock, price FROM productos ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn get_producto(pool: &PgPool, id: i32) -> Result<Option<Producto>, sqlx::Error> {
    sqlx::query_as::<_, Producto>("SELECT id, nombre, stock, price FROM productos WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Live product row, locked until the surrounding transaction ends.
pub async fn lock_producto<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i32,
) -> Result<Option<Producto>, sqlx::Error> {
    sqlx::query_as::<_, Producto>(
        "SELECT id, nombre, stock, price FROM productos WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn insert_producto(
    pool: &PgPool,
    input: &ProductoPayload,
) -> Result<Producto, sqlx::Error> {
    sqlx::query_as::<_, Producto>(
        r#"INSERT INTO productos (nombre, stock, price)
           VALUES ($1, $2, $3)
           RETURNING id, nombre, stock, price"#,
    )
    .bind(&input.nombre)
    .bind(input.stock)
    .bind(input.price)
    .fetch_one(pool)
    .await
}

pub async fn update_producto(
    pool: &PgPool,
    id: i32,
    patch: &ProductoPatch,
) -> Result<Option<Producto>, sqlx::Error> {
    sqlx::query_as::<_, Producto>(
        r#"UPDATE productos
           SET nombre = COALESCE($2, nombre),
               stock = COALESCE($3, stock),
               price = COALESCE($4, price)
           WHERE id = $1
           RETURNING id, nombre, stock, price"#,
    )
    .bind(id)
    .bind(patch.nombre.as_deref())
    .bind(patch.stock)
    .bind(patch.price)
    .fetch_optional(pool)
    .await
}

pub async fn set_producto_stock<'e, E: PgExecutor<'e>>(
    executor: E,
    id: i32,
    stock: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE productos SET stock = $2 WHERE id = $1")
        .bind(id)
        .bind(stock)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn delete_producto(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM productos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// ventas

const VENTA_COLUMNS: &str = "id, cliente_id, total, metodo_pago, detalle_productos, fecha";

pub async fn list_ventas(pool: &PgPool) -> Result<Vec<Venta>, sqlx::Error> {
    sqlx::query_as::<_, Venta>(&format!(
        "SELECT {VENTA_COLUMNS} FROM ventas ORDER BY fecha DESC, id DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn get_venta(pool: &PgPool, id: i32) -> Result<Option<Venta>, sqlx::Error> {
    sqlx::query_as::<_, Venta>(&format!("SELECT {VENTA_COLUMNS} FROM ventas WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_venta<'e, E: PgExecutor<'e>>(
    executor: E,
    cliente_id: i32,
    total: Decimal,
    metodo_pago: &str,
    detalle_productos: &serde_json::Value,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO ventas (cliente_id, total, metodo_pago, detalle_productos)
           VALUES ($1, $2, $3, $4)
           RETURNING id"#,
    )
    .bind(cliente_id)
    .bind(total)
    .bind(metodo_pago)
    .bind(detalle_productos)
    .fetch_one(executor)
    .await
}
