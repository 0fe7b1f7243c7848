//! HTTP-level tests for the `/maps` endpoints that never reach the provider
//! or the database.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};

#[tokio::test]
async fn suggestions_reject_short_input() {
    let response = get(common::build_offline_app(), "/maps/get-suggestions?input=a").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "Input must be between 2 and 100 characters");
}

#[tokio::test]
async fn suggestions_without_api_key_are_a_sanitized_dependency_error() {
    let response = get(common::build_offline_app(), "/maps/get-suggestions?input=powai").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "DEPENDENCY_ERROR");
    assert_eq!(json["message"], "An upstream service is unavailable");
}

#[tokio::test]
async fn coordinates_require_authentication() {
    let response = get(common::build_offline_app(), "/maps/get-coordinates?address=Powai").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
