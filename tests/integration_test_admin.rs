mod common;

use axum::http::StatusCode;
use chrono::{Duration, Weekday};
use common::{body_text, next_weekday, TestApp};
use serde_json::Value;

async fn json(res: axum::http::Response<axum::body::Body>) -> Value {
    serde_json::from_str(&body_text(res).await).unwrap()
}

#[tokio::test]
async fn test_admin_lists_all_bookings() {
    let app = TestApp::new().await;
    let admin = app.login_admin("manager").await;
    let monday = next_weekday(Weekday::Mon);

    app.seed_booking("alice", monday, "19:00", 2).await;
    app.seed_booking("bob", monday, "18:00", 4).await;
    app.seed_booking("bob", monday + Duration::days(1), "17:00", 6).await;

    let res = app.get("/api/v1/admin/bookings", Some(&admin)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = json(res).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["name"], "bob party");
    assert_eq!(rows[0]["status"], "PENDING");
    assert_eq!(rows[2]["number_of_guests"], 6);
}

#[tokio::test]
async fn test_admin_filters() {
    let app = TestApp::new().await;
    let admin = app.login_admin("manager").await;
    let monday = next_weekday(Weekday::Mon);
    let tuesday = monday + Duration::days(1);

    app.seed_booking("alice", monday, "19:00", 2).await;
    app.seed_booking("bob", monday, "18:00", 4).await;
    app.seed_booking("carol", tuesday, "19:00", 6).await;

    let uri = format!("/api/v1/admin/bookings?date={}", monday.format("%Y-%m-%d"));
    let body = json(app.get(&uri, Some(&admin)).await).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let body = json(app.get("/api/v1/admin/bookings?time=19:00", Some(&admin)).await).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let body = json(app.get("/api/v1/admin/bookings?q=CAROL", Some(&admin)).await).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["email"], "carol@example.com");

    let body = json(app.get("/api/v1/admin/bookings?status=pending", Some(&admin)).await).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let body = json(app.get("/api/v1/admin/bookings?status=cancelled", Some(&admin)).await).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_rejects_bad_filter() {
    let app = TestApp::new().await;
    let admin = app.login_admin("manager").await;

    let res = app.get("/api/v1/admin/bookings?date=tomorrow", Some(&admin)).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json(res).await;
    assert_eq!(body["error"], "Invalid date format");
}

#[tokio::test]
async fn test_member_cannot_list_all_bookings() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;

    let res = app.get("/api/v1/admin/bookings", Some(&alice)).await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_ensure_admin_is_idempotent() {
    let app = TestApp::new().await;
    app.login_admin("manager").await;
    app.login_admin("manager").await;

    let admin = app.state.user_repo.find_by_username("manager").await.unwrap().unwrap();
    assert!(admin.is_admin());
}
