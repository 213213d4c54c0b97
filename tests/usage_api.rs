use actix_web::{http::StatusCode, test, web, App};
use chrono::{Duration, Utc};
use fridgy_server::db::{EntitlementStore, PlanStatus, Subscription, UsageStore};
use fridgy_server::quota::usage_date;
use fridgy_server::{build_cors, InMemoryStore};
use std::sync::Arc;
use uuid::Uuid;

mod common;

const UPSTREAM: &str = "http://127.0.0.1:9";

fn premium(user_id: Uuid, expiry_days: i64) -> Subscription {
    Subscription {
        user_id,
        email: Some("chef@example.com".to_string()),
        plan_status: PlanStatus::Monthly,
        subscription_expiry: Some(Utc::now() + Duration::days(expiry_days)),
        paystack_reference: Some("ref_premium".to_string()),
        amount_paid: Some(500_000),
        currency: Some("NGN".to_string()),
        updated_at: Utc::now(),
    }
}

#[actix_web::test]
async fn test_check_usage_for_new_user() {
    let store = Arc::new(InMemoryStore::new());
    let state = common::state_with(common::settings(UPSTREAM), store);
    let app = test::init_service(
        App::new().app_data(web::Data::new(state)).configure(fridgy_server::configure)
    ).await;

    let user_id = Uuid::new_v4();
    let req = test::TestRequest::post()
        .uri("/check-usage")
        .insert_header(common::bearer(user_id, "chef@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["canGenerate"], true);
    assert_eq!(json["isPremium"], false);
    assert_eq!(json["remaining"], 3);
    assert_eq!(json["generationsToday"], 0);
}

#[actix_web::test]
async fn test_check_usage_at_limit() {
    let store = Arc::new(InMemoryStore::new());
    let user_id = Uuid::new_v4();
    store.set_generations(user_id, usage_date(Utc::now()), 3).await;

    let state = common::state_with(common::settings(UPSTREAM), store);
    let app = test::init_service(
        App::new().app_data(web::Data::new(state)).configure(fridgy_server::configure)
    ).await;

    let req = test::TestRequest::post()
        .uri("/check-usage")
        .insert_header(common::bearer(user_id, "chef@example.com"))
        .to_request();
    let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["canGenerate"], false);
    assert_eq!(json["remaining"], 0);
    assert_eq!(json["generationsToday"], 3);
}

#[actix_web::test]
async fn test_check_usage_premium() {
    let store = Arc::new(InMemoryStore::new());
    let user_id = Uuid::new_v4();
    store.set_generations(user_id, usage_date(Utc::now()), 7).await;
    store.upsert_subscription(&premium(user_id, 10)).await.unwrap();

    let state = common::state_with(common::settings(UPSTREAM), store);
    let app = test::init_service(
        App::new().app_data(web::Data::new(state)).configure(fridgy_server::configure)
    ).await;

    let req = test::TestRequest::post()
        .uri("/check-usage")
        .insert_header(common::bearer(user_id, "chef@example.com"))
        .to_request();
    let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["canGenerate"], true);
    assert_eq!(json["isPremium"], true);
    assert_eq!(json["remaining"], -1);
}

#[actix_web::test]
async fn test_check_usage_expired_subscription_counts_as_free() {
    let store = Arc::new(InMemoryStore::new());
    let user_id = Uuid::new_v4();
    store.set_generations(user_id, usage_date(Utc::now()), 2).await;
    store.upsert_subscription(&premium(user_id, -1)).await.unwrap();

    let state = common::state_with(common::settings(UPSTREAM), store);
    let app = test::init_service(
        App::new().app_data(web::Data::new(state)).configure(fridgy_server::configure)
    ).await;

    let req = test::TestRequest::post()
        .uri("/check-usage")
        .insert_header(common::bearer(user_id, "chef@example.com"))
        .to_request();
    let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["isPremium"], false);
    assert_eq!(json["remaining"], 1);
}

#[actix_web::test]
async fn test_usage_endpoints_reject_missing_token() {
    let state = common::state_with(common::settings(UPSTREAM), Arc::new(InMemoryStore::new()));
    let app = test::init_service(
        App::new().app_data(web::Data::new(state)).configure(fridgy_server::configure)
    ).await;

    for uri in ["/check-usage", "/track-usage"] {
        let req = test::TestRequest::post().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["error"], "Authentication error: No authorization header");
    }
}

#[actix_web::test]
async fn test_track_usage_then_check() {
    let store = Arc::new(InMemoryStore::new());
    let state = common::state_with(common::settings(UPSTREAM), store.clone());
    let app = test::init_service(
        App::new().app_data(web::Data::new(state)).configure(fridgy_server::configure)
    ).await;

    let user_id = Uuid::new_v4();
    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/track-usage")
            .insert_header(common::bearer(user_id, "chef@example.com"))
            .to_request();
        let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(json["success"], true);
    }

    let req = test::TestRequest::post()
        .uri("/check-usage")
        .insert_header(common::bearer(user_id, "chef@example.com"))
        .to_request();
    let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["canGenerate"], false);
    assert_eq!(json["generationsToday"], 3);
}

#[actix_web::test]
async fn test_track_usage_skips_premium_users() {
    let store = Arc::new(InMemoryStore::new());
    let user_id = Uuid::new_v4();
    store.upsert_subscription(&premium(user_id, 30)).await.unwrap();

    let state = common::state_with(common::settings(UPSTREAM), store.clone());
    let app = test::init_service(
        App::new().app_data(web::Data::new(state)).configure(fridgy_server::configure)
    ).await;

    let req = test::TestRequest::post()
        .uri("/track-usage")
        .insert_header(common::bearer(user_id, "chef@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let count = store.generations_on(user_id, usage_date(Utc::now())).await.unwrap();
    assert_eq!(count, 0);
}

#[actix_web::test]
async fn test_preflight_is_answered_with_cors_headers() {
    let settings = common::settings(UPSTREAM);
    let cors = settings.cors.clone();
    let state = common::state_with(settings, Arc::new(InMemoryStore::new()));
    let app = test::init_service(
        App::new()
            .wrap(build_cors(&cors))
            .app_data(web::Data::new(state))
            .configure(fridgy_server::configure)
    ).await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/check-usage")
        .insert_header(("Origin", "http://localhost:3000"))
        .insert_header(("Access-Control-Request-Method", "POST"))
        .insert_header(("Access-Control-Request-Headers", "authorization, content-type"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("access-control-allow-origin"));
}
