//! Integration tests for the public ticket application flow.

mod helpers;

use http::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn issue_individual_tickets() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Organizer", "organizer@example.com").await;
    let org = app.create_organization(&token, "Drama Club").await;
    let event = app.create_event(&token, org, "Autumn Festival").await;
    let session = app.create_session(&token, event, 50).await;

    let response = app
        .issue(json!({
            "session_id": session,
            "name": "Yamada Taro",
            "name_kana": "やまだ たろう",
            "email": "taro@example.com",
            "quantity": 3,
        }))
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let tickets = response.data().get("tickets").unwrap().as_array().unwrap();
    assert_eq!(tickets.len(), 3);
    for ticket in tickets {
        assert_eq!(ticket["is_group"], json!(false));
        assert_eq!(ticket["group_size"], json!(1));
        assert_eq!(ticket["used_count"], json!(0));
        assert!(ticket["code"].as_str().is_some());
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn issue_group_ticket() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Organizer", "organizer@example.com").await;
    let org = app.create_organization(&token, "Drama Club").await;
    let event = app.create_event(&token, org, "Autumn Festival").await;
    let session = app.create_session(&token, event, 50).await;

    let response = app
        .issue(json!({
            "session_id": session,
            "name": "Suzuki Hanako",
            "name_kana": "すずき はなこ",
            "email": "hanako@example.com",
            "is_group": true,
            "group_size": 4,
        }))
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let tickets = response.data().get("tickets").unwrap().as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["is_group"], json!(true));
    assert_eq!(tickets[0]["group_size"], json!(4));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn issuance_is_atomic_against_capacity() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Organizer", "organizer@example.com").await;
    let org = app.create_organization(&token, "Drama Club").await;
    let event = app.create_event(&token, org, "Autumn Festival").await;
    let session = app.create_session(&token, event, 5).await;

    // Fill 3 of the 5 seats.
    let response = app
        .issue(json!({
            "session_id": session,
            "name": "First Applicant",
            "name_kana": "ふぁーすと",
            "email": "first@example.com",
            "quantity": 3,
        }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

    // A group of 4 no longer fits; the whole request is rejected.
    let response = app
        .issue(json!({
            "session_id": session,
            "name": "Big Group",
            "name_kana": "びっぐ",
            "email": "group@example.com",
            "is_group": true,
            "group_size": 4,
        }))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT, "{}", response.body);
    assert_eq!(response.body["error"], json!("CAPACITY_EXCEEDED"));
    assert_eq!(response.body["details"]["remaining"], json!(2));

    // No partial issuance happened.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 3);

    // The remaining 2 seats are still available.
    let response = app
        .issue(json!({
            "session_id": session,
            "name": "Last Pair",
            "name_kana": "らすと",
            "email": "pair@example.com",
            "quantity": 2,
        }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn group_application_requires_a_headcount() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Organizer", "organizer@example.com").await;
    let org = app.create_organization(&token, "Drama Club").await;
    let event = app.create_event(&token, org, "Autumn Festival").await;
    let session = app.create_session(&token, event, 50).await;

    let response = app
        .issue(json!({
            "session_id": session,
            "name": "No Size",
            "name_kana": "のーさいず",
            "email": "nosize@example.com",
            "is_group": true,
        }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);

    // A group of one is admitted like any other group ticket.
    let response = app
        .issue(json!({
            "session_id": session,
            "name": "Solo Group",
            "name_kana": "そろ",
            "email": "solo@example.com",
            "is_group": true,
            "group_size": 1,
        }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let tickets = response.data().get("tickets").unwrap().as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["is_group"], json!(true));
    assert_eq!(tickets[0]["group_size"], json!(1));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn capacity_endpoint_reports_the_ledger() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Organizer", "organizer@example.com").await;
    let org = app.create_organization(&token, "Drama Club").await;
    let event = app.create_event(&token, org, "Autumn Festival").await;
    let session = app.create_session(&token, event, 10).await;

    let response = app
        .request("GET", &format!("/api/sessions/{session}/capacity"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.data()["remaining_capacity"], json!(10));

    let response = app
        .issue(json!({
            "session_id": session,
            "name": "Suzuki Hanako",
            "name_kana": "すずき はなこ",
            "email": "hanako@example.com",
            "is_group": true,
            "group_size": 6,
        }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

    let response = app
        .request("GET", &format!("/api/sessions/{session}/capacity"), None, None)
        .await;
    assert_eq!(response.data()["capacity"], json!(10));
    assert_eq!(response.data()["issued_headcount"], json!(6));
    assert_eq!(response.data()["remaining_capacity"], json!(4));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn applicants_can_list_their_tickets_by_email() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Organizer", "organizer@example.com").await;
    let org = app.create_organization(&token, "Drama Club").await;
    let event = app.create_event(&token, org, "Autumn Festival").await;
    let session = app.create_session(&token, event, 50).await;

    for email in ["taro@example.com", "taro@example.com", "other@example.com"] {
        let response = app
            .issue(json!({
                "session_id": session,
                "name": "Applicant",
                "name_kana": "あぷりかんと",
                "email": email,
                "quantity": 1,
            }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    }

    let response = app
        .request("GET", "/api/tickets?email=taro%40example.com", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let tickets = response.data();
    let tickets = tickets.as_array().unwrap();
    assert_eq!(tickets.len(), 2);
    for ticket in tickets {
        assert_eq!(ticket["email"], json!("taro@example.com"));
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn issuance_rejects_unknown_session() {
    let app = helpers::TestApp::new().await;

    let response = app
        .issue(json!({
            "session_id": uuid::Uuid::new_v4(),
            "name": "Ghost",
            "name_kana": "ごーすと",
            "email": "ghost@example.com",
            "quantity": 1,
        }))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", response.body);
}
