use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use gym_backoffice::api;

mod support;

#[actix_web::test]
async fn sale_takes_quantity_out_of_stock() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let cliente = support::insert_user(pool).await;
    let producto = support::insert_producto(pool, "Proteina", 5, "25.00").await;

    let state = web::Data::new(support::build_state(pool.clone(), false));
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let req = TestRequest::post()
        .uri("/api/crear-venta")
        .set_json(json!({
            "cliente": cliente,
            "total": "75.00",
            "metodo_pago": "efectivo",
            "productos": [{ "producto": producto, "cantidad": 3 }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let venta_id = body["venta_id"].as_i64().expect("venta_id");

    assert_eq!(support::stock_of(pool, producto).await, 2);
    assert_eq!(support::count(pool, "ventas").await, 1);

    let req = TestRequest::get()
        .uri(&format!("/api/ventas/{venta_id}"))
        .to_request();
    let venta: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(venta["cliente"], cliente);
    assert_eq!(venta["total"], "75.00");
    assert_eq!(venta["metodo_pago"], "efectivo");
    assert_eq!(venta["detalle_productos"][0]["producto_id"], producto);
    assert_eq!(venta["detalle_productos"][0]["cantidad"], 3);
    assert_eq!(venta["detalle_productos"][0]["nombre"], "Proteina");
}

#[actix_web::test]
async fn insufficient_stock_leaves_everything_untouched() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let cliente = support::insert_user(pool).await;
    let producto = support::insert_producto(pool, "Creatina", 2, "30.00").await;

    let state = web::Data::new(support::build_state(pool.clone(), false));
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let req = TestRequest::post()
        .uri("/api/crear-venta")
        .set_json(json!({
            "cliente": cliente,
            "total": "90.00",
            "metodo_pago": "tarjeta",
            "productos": [{ "producto": producto, "cantidad": 3 }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("Insufficient stock"));

    assert_eq!(support::stock_of(pool, producto).await, 2);
    assert_eq!(support::count(pool, "ventas").await, 0);
}

#[actix_web::test]
async fn failing_line_rolls_back_earlier_lines() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let cliente = support::insert_user(pool).await;
    let agua = support::insert_producto(pool, "Agua", 10, "1.50").await;
    let barra = support::insert_producto(pool, "Barra", 1, "2.00").await;

    let state = web::Data::new(support::build_state(pool.clone(), false));
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let req = TestRequest::post()
        .uri("/api/crear-venta")
        .set_json(json!({
            "cliente": cliente,
            "total": "19.00",
            "metodo_pago": "efectivo",
            "productos": [
                { "producto": agua, "cantidad": 4 },
                { "producto": barra, "cantidad": 2 }
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(support::stock_of(pool, agua).await, 10);
    assert_eq!(support::stock_of(pool, barra).await, 1);
    assert_eq!(support::count(pool, "ventas").await, 0);
}

#[actix_web::test]
async fn unknown_product_is_rejected() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let cliente = support::insert_user(pool).await;
    let agua = support::insert_producto(pool, "Agua", 10, "1.50").await;

    let state = web::Data::new(support::build_state(pool.clone(), false));
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let req = TestRequest::post()
        .uri("/api/crear-venta")
        .set_json(json!({
            "cliente": cliente,
            "total": "3.00",
            "metodo_pago": "efectivo",
            "productos": [
                { "producto": agua, "cantidad": 2 },
                { "producto": agua + 1000, "cantidad": 1 }
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(support::stock_of(pool, agua).await, 10);
    assert_eq!(support::count(pool, "ventas").await, 0);
}

#[actix_web::test]
async fn invalid_sale_payload_reports_item_fields() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let cliente = support::insert_user(pool).await;
    let agua = support::insert_producto(pool, "Agua", 10, "1.50").await;

    let state = web::Data::new(support::build_state(pool.clone(), false));
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let req = TestRequest::post()
        .uri("/api/crear-venta")
        .set_json(json!({
            "cliente": cliente,
            "total": "0.00",
            "metodo_pago": "efectivo",
            "productos": [{ "producto": agua, "cantidad": 0 }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["productos[0].cantidad"].is_array());

    let req = TestRequest::post()
        .uri("/api/crear-venta")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].is_string());

    assert_eq!(support::stock_of(pool, agua).await, 10);
}

#[actix_web::test]
async fn past_sales_keep_their_snapshot() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let cliente = support::insert_user(pool).await;
    let producto = support::insert_producto(pool, "Guantes", 4, "12.50").await;

    let state = web::Data::new(support::build_state(pool.clone(), false));
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let req = TestRequest::post()
        .uri("/api/crear-venta")
        .set_json(json!({
            "cliente": cliente,
            "total": "12.50",
            "metodo_pago": "efectivo",
            "productos": [{ "producto": producto, "cantidad": 1 }]
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let venta_id = body["venta_id"].as_i64().expect("venta_id");

    let req = TestRequest::patch()
        .uri(&format!("/api/productos/{producto}"))
        .set_json(json!({ "nombre": "Guantes Pro", "price": "20.00" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri(&format!("/api/ventas/{venta_id}"))
        .to_request();
    let venta: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(venta["detalle_productos"][0]["nombre"], "Guantes");
    assert_eq!(venta["detalle_productos"][0]["precio"], "12.50");
}

#[actix_web::test]
async fn sales_ledger_has_no_write_routes() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let state = web::Data::new(support::build_state(pool.clone(), false));
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let req = TestRequest::post()
        .uri("/api/ventas")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());

    let req = TestRequest::delete().uri("/api/ventas/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}

#[actix_web::test]
async fn product_stock_cannot_be_set_negative() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let producto = support::insert_producto(pool, "Toalla", 3, "8.00").await;

    let state = web::Data::new(support::build_state(pool.clone(), false));
    let app = test::init_service(App::new().app_data(state).configure(api::configure)).await;

    let req = TestRequest::patch()
        .uri(&format!("/api/productos/{producto}"))
        .set_json(json!({ "stock": -1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["stock"].is_array());
    assert_eq!(support::stock_of(pool, producto).await, 3);
}
