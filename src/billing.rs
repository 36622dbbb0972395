// src/billing.rs

use chrono::{Days, Local, NaiveDate};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::db;
use crate::error::ApiError;
use crate::models::{
    CreateSaleRequest, MembershipType, NewUser, Producto, RegistrationRequest, User,
    UserMembership,
};

pub(crate) const MISSING_PK: &str = "invalid pk - object does not exist.";

/// Calendar date the server considers "today".
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Days a purchase of this plan is worth. A zero-day plan still grants one day.
pub fn effective_duration(duration_days: i32) -> u64 {
    u64::try_from(duration_days).unwrap_or(0).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RenewalOutcome {
    Created,
    Renewed,
    Reactivated,
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate, ApiError> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| ApiError::BadRequest("membership period is out of range".into()))
}

/// Next period for a (user, plan) pair given the first ledger row, if any.
///
/// - no row: a fresh period starting today
/// - active row (`end_date >= today`): end extended by the plan duration, start kept
/// - expired row: restarted from today
pub fn plan_renewal(
    today: NaiveDate,
    existing: Option<Period>,
    duration_days: i32,
) -> Result<(RenewalOutcome, Period), ApiError> {
    let days = effective_duration(duration_days);
    match existing {
        None => Ok((
            RenewalOutcome::Created,
            Period {
                start_date: today,
                end_date: add_days(today, days)?,
            },
        )),
        Some(current) if current.end_date >= today => Ok((
            RenewalOutcome::Renewed,
            Period {
                start_date: current.start_date,
                end_date: add_days(current.end_date, days)?,
            },
        )),
        Some(_) => Ok((
            RenewalOutcome::Reactivated,
            Period {
                start_date: today,
                end_date: add_days(today, days)?,
            },
        )),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenewalResult {
    pub status: RenewalOutcome,
    pub message: String,
    pub end_date: NaiveDate,
    pub membership: UserMembership,
}

/// Buys, renews or reactivates `membership_type_id` for `user_id` in one transaction.
pub async fn renew_membership(
    pool: &PgPool,
    user_id: i32,
    membership_type_id: i32,
    today: NaiveDate,
) -> Result<RenewalResult, ApiError> {
    let mut tx = pool.begin().await?;

    let plan = db::get_membership_type(&mut *tx, membership_type_id)
        .await?
        .ok_or_else(|| ApiError::field("membership_type", MISSING_PK))?;
    if !db::user_exists(&mut *tx, user_id).await? {
        return Err(ApiError::field("user", MISSING_PK));
    }

    let existing = db::lock_first_membership(&mut *tx, user_id, plan.id).await?;
    let (outcome, period) = plan_renewal(today, existing.map(|(_, p)| p), plan.duration_days)?;

    let membership_id = match existing {
        Some((id, _)) => {
            db::set_membership_period(&mut *tx, id, period).await?;
            id
        }
        None => db::insert_user_membership(&mut *tx, user_id, plan.id, period).await?,
    };

    let membership = db::get_user_membership(&mut *tx, membership_id, today)
        .await?
        .ok_or(ApiError::NotFound)?;
    tx.commit().await?;

    let message = match outcome {
        RenewalOutcome::Created => format!("Membership created, ends on {}", period.end_date),
        RenewalOutcome::Renewed => format!("Membership renewed, new end date {}", period.end_date),
        RenewalOutcome::Reactivated => {
            format!("Membership reactivated, new end date {}", period.end_date)
        }
    };
    log::info!(
        "membership {:?} user_id={} membership_type_id={} end_date={}",
        outcome,
        user_id,
        plan.id,
        period.end_date
    );

    Ok(RenewalResult {
        status: outcome,
        message,
        end_date: period.end_date,
        membership,
    })
}

/// Point-in-time copy of a sold product line.
pub fn product_line(producto: &Producto, cantidad: i32) -> Value {
    json!({
        "producto_id": producto.id,
        "nombre": producto.nombre,
        "cantidad": cantidad,
        "precio": producto.price,
    })
}

/// Point-in-time copy of a sold membership plan.
pub fn membership_line(plan: &MembershipType) -> Value {
    json!({
        "membership_type_id": plan.id,
        "nombre": plan.name,
        "cantidad": 1,
        "precio": plan.price,
    })
}

/// Records a sale and takes the sold quantities out of stock, all or nothing.
///
/// Returns the id of the new sale.
pub async fn record_sale(pool: &PgPool, sale: &CreateSaleRequest) -> Result<i32, ApiError> {
    let mut tx = pool.begin().await?;

    if !db::user_exists(&mut *tx, sale.cliente).await? {
        return Err(ApiError::field("cliente", MISSING_PK));
    }

    let mut lines = Vec::with_capacity(sale.productos.len());
    for item in &sale.productos {
        let producto = db::lock_producto(&mut *tx, item.producto)
            .await?
            .ok_or_else(|| {
                ApiError::BadRequest(format!("Product {} does not exist", item.producto))
            })?;

        if producto.stock < item.cantidad {
            log::warn!(
                "sale rejected: producto_id={} stock={} requested={}",
                producto.id,
                producto.stock,
                item.cantidad
            );
            return Err(ApiError::BadRequest(format!(
                "Insufficient stock for {} (available {}, requested {})",
                producto.nombre, producto.stock, item.cantidad
            )));
        }

        db::set_producto_stock(&mut *tx, producto.id, producto.stock - item.cantidad).await?;
        lines.push(product_line(&producto, item.cantidad));
    }

    let venta_id = db::insert_venta(
        &mut *tx,
        sale.cliente,
        sale.total,
        &sale.metodo_pago,
        &Value::Array(lines),
    )
    .await?;
    tx.commit().await?;

    log::info!(
        "sale recorded venta_id={} cliente={} total={} items={}",
        venta_id,
        sale.cliente,
        sale.total,
        sale.productos.len()
    );
    Ok(venta_id)
}

#[derive(Debug)]
pub struct Registration {
    pub user: User,
    pub membership: UserMembership,
    pub venta_id: i32,
}

/// Creates an account, its first membership and the matching sale in one transaction.
pub async fn register_member(
    pool: &PgPool,
    input: &RegistrationRequest,
    today: NaiveDate,
) -> Result<Registration, ApiError> {
    let password_hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("bcrypt hash error: {e}")))?;

    let mut tx = pool.begin().await?;

    let plan = db::get_membership_type(&mut *tx, input.membership_type)
        .await?
        .ok_or_else(|| ApiError::field("membership_type", MISSING_PK))?;

    let user = db::insert_user(
        &mut *tx,
        &NewUser {
            username: input.username.clone(),
            email: input.email.clone().unwrap_or_default(),
            password_hash,
            first_name: input.first_name.clone().unwrap_or_default(),
            last_name: input.last_name.clone().unwrap_or_default(),
        },
    )
    .await?;

    let (_, period) = plan_renewal(today, None, plan.duration_days)?;
    let membership_id = db::insert_user_membership(&mut *tx, user.id, plan.id, period).await?;

    let snapshot = Value::Array(vec![membership_line(&plan)]);
    let venta_id = db::insert_venta(&mut *tx, user.id, plan.price, &input.metodo_pago, &snapshot)
        .await?;

    let membership = db::get_user_membership(&mut *tx, membership_id, today)
        .await?
        .ok_or(ApiError::NotFound)?;
    tx.commit().await?;

    log::info!(
        "registered user_id={} membership_type_id={} venta_id={}",
        user.id,
        plan.id,
        venta_id
    );
    Ok(Registration {
        user,
        membership,
        venta_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn period(start: &str, end: &str) -> Period {
        Period {
            start_date: d(start),
            end_date: d(end),
        }
    }

    #[test]
    fn first_purchase_starts_today() {
        let (outcome, p) = plan_renewal(d("2024-03-10"), None, 30).unwrap();
        assert_eq!(outcome, RenewalOutcome::Created);
        assert_eq!(p, period("2024-03-10", "2024-04-09"));
    }

    #[test]
    fn day_pass_counts_as_one_day() {
        let (_, p) = plan_renewal(d("2024-03-10"), None, 0).unwrap();
        assert_eq!(p.end_date, d("2024-03-11"));
    }

    #[test]
    fn active_membership_is_extended_from_its_end_date() {
        let current = period("2024-03-01", "2024-03-31");
        let (outcome, p) = plan_renewal(d("2024-03-10"), Some(current), 30).unwrap();
        assert_eq!(outcome, RenewalOutcome::Renewed);
        assert_eq!(p, period("2024-03-01", "2024-04-30"));
    }

    #[test]
    fn membership_ending_today_is_still_active() {
        let current = period("2024-02-10", "2024-03-10");
        let (outcome, p) = plan_renewal(d("2024-03-10"), Some(current), 7).unwrap();
        assert_eq!(outcome, RenewalOutcome::Renewed);
        assert_eq!(p, period("2024-02-10", "2024-03-17"));
    }

    #[test]
    fn expired_membership_restarts_today() {
        let current = period("2024-01-01", "2024-01-31");
        let (outcome, p) = plan_renewal(d("2024-03-10"), Some(current), 30).unwrap();
        assert_eq!(outcome, RenewalOutcome::Reactivated);
        assert_eq!(p, period("2024-03-10", "2024-04-09"));
    }

    #[test]
    fn renewed_period_never_ends_before_it_starts() {
        let today = d("2024-03-10");
        let rows = [
            None,
            Some(period("2024-03-01", "2024-03-20")),
            Some(period("2023-01-01", "2023-02-01")),
        ];
        for existing in rows {
            for days in [0, 1, 365] {
                let (_, p) = plan_renewal(today, existing, days).unwrap();
                assert!(p.end_date > p.start_date);
            }
        }
    }

    #[test]
    fn snapshot_lines_copy_name_and_price() {
        let producto = Producto {
            id: 7,
            nombre: "Proteína".into(),
            stock: 3,
            price: Decimal::from_str("12.50").unwrap(),
        };
        let line = product_line(&producto, 2);
        assert_eq!(line["producto_id"], 7);
        assert_eq!(line["nombre"], "Proteína");
        assert_eq!(line["cantidad"], 2);
        assert_eq!(line["precio"], "12.50");

        let plan = MembershipType {
            id: 3,
            name: "Mensual".into(),
            price: Decimal::from_str("300.00").unwrap(),
            duration_days: 30,
        };
        let line = membership_line(&plan);
        assert_eq!(line["membership_type_id"], 3);
        assert_eq!(line["cantidad"], 1);
        assert_eq!(line["precio"], "300.00");
    }
}
