use actix_web::{test, web, App};
use chrono::DateTime;
use fridgy_server::InMemoryStore;
use std::sync::Arc;

mod common;

#[actix_web::test]
async fn test_health_check() {
    let state = common::state_with(common::settings("http://127.0.0.1:9"), Arc::new(InMemoryStore::new()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(fridgy_server::configure)
    ).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["status"], "healthy");
    assert!(DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
}
