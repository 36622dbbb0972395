#![allow(dead_code)]

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::env;
use std::sync::OnceLock;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use gym_backoffice::AppState;

fn split_db_url(url: &str) -> Result<(String, String), String> {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base.to_string(), Some(query)),
        None => (url.to_string(), None),
    };

    let db_start = base
        .rfind('/')
        .ok_or_else(|| "invalid database url".to_string())?;
    if db_start + 1 >= base.len() {
        return Err("database name is empty".to_string());
    }

    let db_name = base[db_start + 1..].to_string();
    let mut admin_url = format!("{}postgres", &base[..db_start + 1]);
    if let Some(query) = query {
        admin_url = format!("{admin_url}?{query}");
    }

    Ok((admin_url, db_name))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

static TEST_DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct TestDb {
    pub pool: PgPool,
    pub url: String,
    _guard: MutexGuard<'static, ()>,
}

/// Recreates and migrates the database named by `TEST_DATABASE_URL`.
pub async fn init_test_db() -> TestDb {
    dotenvy::dotenv().ok();
    let test_url = env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let (admin_url, db_name) =
        split_db_url(&test_url).expect("invalid TEST_DATABASE_URL format");

    let lock = TEST_DB_LOCK.get_or_init(|| Mutex::new(()));
    let guard = lock.lock().await;

    let admin_pool = PgPool::connect(&admin_url)
        .await
        .expect("connect admin db");

    let _ = sqlx::query("SELECT pg_advisory_lock(424242)")
        .execute(&admin_pool)
        .await;

    let quoted_name = quote_identifier(&db_name);
    let drop_sql = format!("DROP DATABASE IF EXISTS {quoted_name} WITH (FORCE)");
    let create_sql = format!("CREATE DATABASE {quoted_name}");

    let _ = sqlx::query(&drop_sql).execute(&admin_pool).await;
    if let Err(e) = sqlx::query(&create_sql).execute(&admin_pool).await {
        eprintln!("create test db error: {e}");
        let _ = sqlx::query(&drop_sql).execute(&admin_pool).await;
        sqlx::query(&create_sql)
            .execute(&admin_pool)
            .await
            .expect("create test db retry");
    }

    let _ = sqlx::query("SELECT pg_advisory_unlock(424242)")
        .execute(&admin_pool)
        .await;
    admin_pool.close().await;

    let pool = PgPool::connect(&test_url)
        .await
        .expect("connect test db");
    sqlx::migrate!().run(&pool).await.expect("migrations");
    TestDb {
        pool,
        url: test_url,
        _guard: guard,
    }
}

/// Second pool on the test database whose sessions run in `time_zone`,
/// so `CURRENT_DATE` on the server can differ from the process's local date.
pub async fn connect_with_time_zone(url: &str, time_zone: &'static str) -> PgPool {
    PgPoolOptions::new()
        .max_connections(2)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query(&format!("SET TIME ZONE '{time_zone}'"))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(url)
        .await
        .expect("connect test db with time zone")
}

pub fn build_state(pool: PgPool, read_only: bool) -> AppState {
    AppState { pool, read_only }
}

pub fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

pub async fn insert_user(pool: &PgPool) -> i32 {
    sqlx::query_scalar(
        r#"INSERT INTO users (username, email, password_hash)
           VALUES ($1, $2, 'test-hash')
           RETURNING id"#,
    )
    .bind(unique("member"))
    .bind("member@example.com")
    .fetch_one(pool)
    .await
    .expect("insert user")
}

pub async fn insert_membership_type(pool: &PgPool, price: &str, duration_days: i32) -> i32 {
    sqlx::query_scalar(
        r#"INSERT INTO membership_types (name, price, duration_days)
           VALUES ($1, $2::numeric, $3)
           RETURNING id"#,
    )
    .bind(unique("plan"))
    .bind(price)
    .bind(duration_days)
    .fetch_one(pool)
    .await
    .expect("insert membership type")
}

pub async fn insert_producto(pool: &PgPool, nombre: &str, stock: i32, price: &str) -> i32 {
    sqlx::query_scalar(
        r#"INSERT INTO productos (nombre, stock, price)
           VALUES ($1, $2, $3::numeric)
           RETURNING id"#,
    )
    .bind(nombre)
    .bind(stock)
    .bind(price)
    .fetch_one(pool)
    .await
    .expect("insert producto")
}

pub async fn stock_of(pool: &PgPool, producto_id: i32) -> i32 {
    sqlx::query_scalar("SELECT stock FROM productos WHERE id = $1")
        .bind(producto_id)
        .fetch_one(pool)
        .await
        .expect("select stock")
}

pub async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count rows")
}
