use actix_web::{App, http::StatusCode, test, web::Data};
use hrms::model::kra::KraScore;
use hrms::model::role::Role;
use hrms::models::TokenType;
use hrms::policy::SandwichLeaveResult;
use hrms::routes;
use pretty_assertions::assert_eq;
use serde_json::json;

mod common;

macro_rules! init_app {
    () => {{
        let config = common::test_config();
        let pool = common::lazy_pool(&config);
        test::init_service(
            App::new()
                .app_data(Data::new(pool))
                .app_data(Data::new(config.clone()))
                .configure(move |cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

fn friday_to_sunday() -> serde_json::Value {
    json!({
        "application": {
            "start_date": "2024-01-05",
            "end_date": "2024-01-07",
            "status": "pending",
            "applied_at": "2023-12-29T04:30:00Z"
        }
    })
}

#[actix_web::test]
async fn protected_routes_require_a_token() {
    let app = init_app!();

    let resp = test::call_service(
        &app,
        common::post_json("/api/leave/deduction", None, friday_to_sunday()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        common::post_json("/api/leave/deduction", Some("not-a-jwt"), friday_to_sunday())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn refresh_tokens_are_refused() {
    let app = init_app!();
    let token = common::token_for(Role::Employee, Some(1000), TokenType::Refresh);

    let resp = test::call_service(
        &app,
        common::post_json("/api/leave/deduction", Some(&token), friday_to_sunday()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn preview_charges_friday_to_sunday_as_four_days() {
    let app = init_app!();
    let token = common::access_token(Role::Employee);

    let resp = test::call_service(
        &app,
        common::post_json("/api/leave/deduction", Some(&token), friday_to_sunday()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let result: SandwichLeaveResult = test::read_body_json(resp).await;
    assert_eq!(result.deducted_days, 4.0);
    assert_eq!(result.actual_days, 1.0);
    assert!(result.is_sandwich_leave);
    assert!(result.reason.contains("Friday + Saturday + Sunday"));
}

#[actix_web::test]
async fn preview_pairs_friday_with_following_monday() {
    let app = init_app!();
    let token = common::access_token(Role::Employee);

    let body = json!({
        "application": {
            "id": 1,
            "start_date": "2024-01-05",
            "end_date": "2024-01-05",
            "status": "approved",
            "applied_at": "2023-12-20T04:30:00Z"
        },
        "siblings": [{
            "id": 2,
            "start_date": "2024-01-08",
            "end_date": "2024-01-08",
            "status": "pending",
            "applied_at": "2023-12-20T05:00:00Z"
        }]
    });

    let resp = test::call_service(
        &app,
        common::post_json("/api/leave/deduction", Some(&token), body).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let result: SandwichLeaveResult = test::read_body_json(resp).await;
    assert_eq!(result.deducted_days, 2.0);
    assert!(result.is_sandwich_leave);
}

#[actix_web::test]
async fn preview_subtracts_mandatory_holidays() {
    let app = init_app!();
    let token = common::access_token(Role::Hr);

    let body = json!({
        "application": {
            "start_date": "2024-01-01",
            "end_date": "2024-01-05",
            "status": "approved",
            "applied_at": "2023-12-20T04:30:00Z"
        },
        "holidays": [
            { "date": "2024-01-03", "name": "Company day", "is_optional": false },
            { "date": "2024-01-04", "name": "Regional festival", "is_optional": true }
        ]
    });

    let resp = test::call_service(
        &app,
        common::post_json("/api/leave/deduction", Some(&token), body).to_request(),
    )
    .await;
    let result: SandwichLeaveResult = test::read_body_json(resp).await;

    assert_eq!(result.deducted_days, 4.0);
    assert!(!result.is_sandwich_leave);
    assert_eq!(result.details.holidays, 1);
}

#[actix_web::test]
async fn preview_rejects_reversed_ranges() {
    let app = init_app!();
    let token = common::access_token(Role::Employee);

    let body = json!({
        "application": {
            "start_date": "2024-01-08",
            "end_date": "2024-01-05",
            "status": "pending",
            "applied_at": "2023-12-29T04:30:00Z"
        }
    });

    let resp = test::call_service(
        &app,
        common::post_json("/api/leave/deduction", Some(&token), body).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "end_date 2024-01-05 is before start_date 2024-01-08");
}

#[actix_web::test]
async fn kra_score_matches_worked_example() {
    let app = init_app!();
    let token = common::access_token(Role::Manager);

    let body = json!({
        "employee_id": 1000,
        "evaluations": [
            { "goal": "Hiring", "weight": 25, "awarded_points": 30, "max_points": 35 },
            { "goal": "Retention", "weight": 25, "awarded_points": 25, "max_points": 35 },
            { "goal": "Training", "weight": 25, "awarded_points": 10, "max_points": 35 },
            { "goal": "Compliance", "weight": 15, "awarded_points": 20, "max_points": 25 },
            { "goal": "Engagement", "weight": 10, "awarded_points": 0, "max_points": 10 }
        ]
    });

    let resp = test::call_service(
        &app,
        common::post_json("/api/kra/score", Some(&token), body).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let score: KraScore = test::read_body_json(resp).await;
    assert_eq!(score.goal_count, 5);
    assert!((score.percentage - 1925.0 / 3100.0 * 100.0).abs() < 1e-9);
}

#[actix_web::test]
async fn kra_score_of_nothing_is_zero() {
    let app = init_app!();
    let token = common::access_token(Role::Manager);

    let resp = test::call_service(
        &app,
        common::post_json("/api/kra/score", Some(&token), json!({ "evaluations": [] }))
            .to_request(),
    )
    .await;
    let score: KraScore = test::read_body_json(resp).await;
    assert_eq!(score.percentage, 0.0);
}

#[actix_web::test]
async fn kra_score_rejects_negative_weights() {
    let app = init_app!();
    let token = common::access_token(Role::Manager);

    let body = json!({
        "evaluations": [
            { "goal": "Hiring", "weight": -25, "awarded_points": 30, "max_points": 35 }
        ]
    });

    let resp = test::call_service(
        &app,
        common::post_json("/api/kra/score", Some(&token), body).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn leave_list_is_closed_to_employees() {
    let app = init_app!();
    let token = common::access_token(Role::Employee);

    // the HR guard answers before any query runs
    let resp = test::call_service(&app, common::get("/api/leave", Some(&token)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn submitting_leave_needs_an_employee_profile() {
    let app = init_app!();
    let token = common::token_for(Role::Admin, None, TokenType::Access);

    let body = json!({
        "start_date": "2024-01-05",
        "end_date": "2024-01-05",
        "leave_type": "annual"
    });

    let resp = test::call_service(
        &app,
        common::post_json("/api/leave", Some(&token), body).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn leave_list_rejects_out_of_range_page() {
    let app = init_app!();
    let token = common::access_token(Role::Hr);

    let resp = test::call_service(
        &app,
        common::get("/api/leave?page=18446744073709551615", Some(&token)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Bad request: page is out of range");
}

#[actix_web::test]
async fn malformed_authorization_header_is_unauthorized() {
    let app = init_app!();

    let resp = test::call_service(
        &app,
        common::post_json("/api/kra/score", None, json!({ "evaluations": [] }))
            .insert_header(("Authorization", "Basic YXNoYTpzZWNyZXQ="))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Bearer"));
}
