#[cfg(test)]
mod integration_tests {
    use crate::test_utils::test_utils::setup_test_app;
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};

    /// Log in through the API and return the bearer token.
    async fn login(server: &TestServer, username: &str, password: &str) -> String {
        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
    }

    /// Create a member through the API, returning its id.
    async fn create_member(server: &TestServer, token: &str, first: &str, last: &str, email: &str) -> i64 {
        let response = server
            .post("/api/v1/members")
            .add_header(header::AUTHORIZATION, bearer(token))
            .json(&json!({
                "first_name": first,
                "last_name": last,
                "email": email,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["data"]["id"].as_i64().unwrap()
    }

    /// Create an event through the API, returning its id.
    async fn create_event(server: &TestServer, token: &str, title: &str, days_from_now: i64) -> i64 {
        let date = (Utc::now() + Duration::days(days_from_now))
            .naive_utc()
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        let response = server
            .post("/api/v1/events")
            .add_header(header::AUTHORIZATION, bearer(token))
            .json(&json!({
                "title": title,
                "description": "Incontro annuale",
                "date": date,
                "location": "Sede centrale",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": "admin", "password": "wrong" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": "nobody", "password": "password123" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_first_account_bootstraps_to_administrator() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // The seeded "admin" account asked for the associate role; the
        // first-account rule must have promoted it anyway
        let token = login(&server, "admin", "password123").await;
        let response = server
            .get("/api/v1/profile")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["role"], "administrator");

        // The second seeded account kept its requested role
        let token = login(&server, "staff", "password123").await;
        let response = server
            .get("/api/v1/profile")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"]["role"], "associate");
    }

    #[tokio::test]
    async fn test_members_require_administrator() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // Anonymous callers are rejected outright
        let response = server.get("/api/v1/members").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        // Associates get a forbidden, not a listing
        let staff_token = login(&server, "staff", "password123").await;
        let response = server
            .get("/api/v1/members")
            .add_header(header::AUTHORIZATION, bearer(&staff_token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_member_listing_is_ordered_by_name() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = login(&server, "admin", "password123").await;

        create_member(&server, &token, "Mario", "Rossi", "mario@example.com").await;
        create_member(&server, &token, "Anna", "Bianchi", "anna@example.com").await;

        let response = server
            .get("/api/v1/members")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["full_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Anna Bianchi", "Mario Rossi"]);
    }

    #[tokio::test]
    async fn test_duplicate_member_email_conflict() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = login(&server, "admin", "password123").await;

        create_member(&server, &token, "Mario", "Rossi", "mario@example.com").await;
        let response = server
            .post("/api/v1/members")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({
                "first_name": "Marco",
                "last_name": "Rossi",
                "email": "mario@example.com",
            }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["code"], "EMAIL_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_member_with_account_username_clash_leaves_no_orphan() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = login(&server, "admin", "password123").await;

        // "staff" is already taken by a seeded account
        let response = server
            .post("/api/v1/members/with-account")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({
                "first_name": "Mario",
                "last_name": "Rossi",
                "email": "mario@example.com",
                "username": "staff",
                "password": "password123",
            }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["code"], "USERNAME_ALREADY_EXISTS");

        // The failed composite must not have written the member row
        let response = server
            .get("/api/v1/members")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_member_role_update_syncs_linked_account() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let admin_token = login(&server, "admin", "password123").await;

        let response = server
            .post("/api/v1/members/with-account")
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .json(&json!({
                "first_name": "Laura",
                "last_name": "Bianchi",
                "email": "laura@example.com",
                "username": "laura",
                "password": "password123",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let member_id = body["data"]["id"].as_i64().unwrap();

        // Promote the member through the roster; the account must follow
        let response = server
            .put(&format!("/api/v1/members/{member_id}"))
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .json(&json!({
                "first_name": "Laura",
                "last_name": "Bianchi",
                "email": "laura@example.com",
                "role": "administrator",
            }))
            .await;
        response.assert_status(StatusCode::OK);

        let token = login(&server, "laura", "password123").await;
        let response = server
            .get("/api/v1/profile")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"]["role"], "administrator");
        assert_eq!(body["data"]["display_name"], "Laura Bianchi");
    }

    #[tokio::test]
    async fn test_fee_uniqueness_per_member_and_year() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = login(&server, "admin", "password123").await;
        let member_id = create_member(&server, &token, "Mario", "Rossi", "mario@example.com").await;

        let fee = json!({ "member_id": member_id, "year": 2026, "amount": "50.00" });
        let response = server
            .post("/api/v1/fees")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&fee)
            .await;
        response.assert_status(StatusCode::CREATED);

        // Same member and year conflicts
        let response = server
            .post("/api/v1/fees")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&fee)
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["code"], "FEE_YEAR_ALREADY_EXISTS");

        // A different year is fine
        let response = server
            .post("/api/v1/fees")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({ "member_id": member_id, "year": 2025, "amount": "45.00" }))
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_fee_visibility_by_role() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let admin_token = login(&server, "admin", "password123").await;

        // A member with a login, plus a member without one
        let response = server
            .post("/api/v1/members/with-account")
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .json(&json!({
                "first_name": "Mario",
                "last_name": "Rossi",
                "email": "mario@example.com",
                "username": "mario",
                "password": "password123",
            }))
            .await;
        let body: Value = response.json();
        let mario_id = body["data"]["id"].as_i64().unwrap();
        let laura_id = create_member(&server, &admin_token, "Laura", "Bianchi", "laura@example.com").await;

        for (member_id, year) in [(mario_id, 2026), (laura_id, 2026)] {
            server
                .post("/api/v1/fees")
                .add_header(header::AUTHORIZATION, bearer(&admin_token))
                .json(&json!({ "member_id": member_id, "year": year, "amount": "50.00" }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        // The administrator sees both fees, joined with member names
        let response = server
            .get("/api/v1/fees")
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert!(body["data"][0]["member_name"].is_string());

        // Mario only sees his own
        let mario_token = login(&server, "mario", "password123").await;
        let response = server
            .get("/api/v1/fees")
            .add_header(header::AUTHORIZATION, bearer(&mario_token))
            .await;
        let body: Value = response.json();
        let fees = body["data"].as_array().unwrap();
        assert_eq!(fees.len(), 1);
        assert_eq!(fees[0]["member_id"].as_i64().unwrap(), mario_id);

        // An associate login without a member gets an empty list, not an error
        let staff_token = login(&server, "staff", "password123").await;
        let response = server
            .get("/api/v1/fees")
            .add_header(header::AUTHORIZATION, bearer(&staff_token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 0);

        // Mario cannot read Laura's fee detail; the admin can
        let response = server
            .get(&format!("/api/v1/members/{laura_id}/fees"))
            .add_header(header::AUTHORIZATION, bearer(&mario_token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .get(&format!("/api/v1/members/{laura_id}/fees"))
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_events_listing_is_public() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = login(&server, "admin", "password123").await;
        create_event(&server, &token, "Assemblea", 1).await;

        // No authentication required for the listing
        let response = server.get("/api/v1/events").await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["future"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["future"][0]["is_future"], true);
        assert_eq!(body["data"]["registered_event_ids"].as_array().unwrap().len(), 0);

        // Creating events is not public
        let response = server
            .post("/api/v1/events")
            .json(&json!({
                "title": "Intrusione",
                "date": "2026-09-01T18:00:00",
                "location": "Sede",
            }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_event_registration_end_to_end() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let admin_token = login(&server, "admin", "password123").await;

        // Create Mario Rossi with a login, and tomorrow's event
        server
            .post("/api/v1/members/with-account")
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .json(&json!({
                "first_name": "Mario",
                "last_name": "Rossi",
                "email": "mario.rossi@example.com",
                "username": "mario",
                "password": "password123",
            }))
            .await
            .assert_status(StatusCode::CREATED);
        let event_id = create_event(&server, &admin_token, "Assemblea", 1).await;

        // First registration creates the participation
        let mario_token = login(&server, "mario", "password123").await;
        let response = server
            .post(&format!("/api/v1/events/{event_id}/register"))
            .add_header(header::AUTHORIZATION, bearer(&mario_token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["created"], true);
        let participation_id = body["data"]["participation"]["id"].as_i64().unwrap();
        let registered_at = body["data"]["participation"]["registered_at"].clone();

        // Registering again is idempotent and keeps the original timestamp
        let response = server
            .post(&format!("/api/v1/events/{event_id}/register"))
            .add_header(header::AUTHORIZATION, bearer(&mario_token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["created"], false);
        assert_eq!(body["data"]["participation"]["id"].as_i64().unwrap(), participation_id);
        assert_eq!(body["data"]["participation"]["registered_at"], registered_at);

        // The administrator confirms the presence
        let response = server
            .put(&format!("/api/v1/participations/{participation_id}"))
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .json(&json!({ "presence": true }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["presence"], true);
        assert_eq!(body["data"]["registered_at"], registered_at);

        // The listing still shows the event as future, with Mario registered
        let response = server
            .get("/api/v1/events")
            .add_header(header::AUTHORIZATION, bearer(&mario_token))
            .await;
        let body: Value = response.json();
        let future_ids: Vec<i64> = body["data"]["future"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_i64().unwrap())
            .collect();
        assert!(future_ids.contains(&event_id));
        assert_eq!(body["data"]["registered_event_ids"][0].as_i64().unwrap(), event_id);
    }

    #[tokio::test]
    async fn test_account_without_member_cannot_register() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let admin_token = login(&server, "admin", "password123").await;
        let event_id = create_event(&server, &admin_token, "Assemblea", 1).await;

        let staff_token = login(&server, "staff", "password123").await;
        let response = server
            .post(&format!("/api/v1/events/{event_id}/register"))
            .add_header(header::AUTHORIZATION, bearer(&staff_token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_participation_update_requires_administrator() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let admin_token = login(&server, "admin", "password123").await;

        server
            .post("/api/v1/members/with-account")
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .json(&json!({
                "first_name": "Mario",
                "last_name": "Rossi",
                "email": "mario@example.com",
                "username": "mario",
                "password": "password123",
            }))
            .await
            .assert_status(StatusCode::CREATED);
        let event_id = create_event(&server, &admin_token, "Assemblea", 1).await;

        let mario_token = login(&server, "mario", "password123").await;
        let response = server
            .post(&format!("/api/v1/events/{event_id}/register"))
            .add_header(header::AUTHORIZATION, bearer(&mario_token))
            .await;
        let body: Value = response.json();
        let participation_id = body["data"]["participation"]["id"].as_i64().unwrap();

        let response = server
            .put(&format!("/api/v1/participations/{participation_id}"))
            .add_header(header::AUTHORIZATION, bearer(&mario_token))
            .json(&json!({ "presence": true }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_transaction_totals_are_decimal_exact() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = login(&server, "admin", "password123").await;

        for _ in 0..3 {
            server
                .post("/api/v1/transactions")
                .add_header(header::AUTHORIZATION, bearer(&token))
                .json(&json!({
                    "transaction_type": "income",
                    "amount": "10.10",
                    "description": "Quota",
                }))
                .await
                .assert_status(StatusCode::CREATED);
        }
        server
            .post("/api/v1/transactions")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({
                "transaction_type": "expense",
                "amount": "5.05",
                "description": "Cancelleria",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get("/api/v1/transactions")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["totals"]["income_total"], "30.30");
        assert_eq!(body["data"]["totals"]["expense_total"], "5.05");
        assert_eq!(body["data"]["totals"]["balance"], "25.25");
        assert_eq!(body["data"]["transactions"].as_array().unwrap().len(), 4);

        // The expense is the newest row and carries a negative signed amount
        assert_eq!(body["data"]["transactions"][0]["signed_amount"], "-5.05");
    }

    #[tokio::test]
    async fn test_transactions_require_administrator() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let staff_token = login(&server, "staff", "password123").await;

        let response = server
            .get("/api/v1/transactions")
            .add_header(header::AUTHORIZATION, bearer(&staff_token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .post("/api/v1/transactions")
            .add_header(header::AUTHORIZATION, bearer(&staff_token))
            .json(&json!({
                "transaction_type": "income",
                "amount": "10.00",
                "description": "Quota",
            }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_event_deletion_cascades_and_preserves_transactions() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let admin_token = login(&server, "admin", "password123").await;

        server
            .post("/api/v1/members/with-account")
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .json(&json!({
                "first_name": "Mario",
                "last_name": "Rossi",
                "email": "mario@example.com",
                "username": "mario",
                "password": "password123",
            }))
            .await
            .assert_status(StatusCode::CREATED);
        let event_id = create_event(&server, &admin_token, "Assemblea", 1).await;

        let mario_token = login(&server, "mario", "password123").await;
        server
            .post(&format!("/api/v1/events/{event_id}/register"))
            .add_header(header::AUTHORIZATION, bearer(&mario_token))
            .await
            .assert_status(StatusCode::OK);

        server
            .post("/api/v1/transactions")
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .json(&json!({
                "transaction_type": "income",
                "amount": "200.00",
                "description": "Donazioni assemblea",
                "event_id": event_id,
            }))
            .await
            .assert_status(StatusCode::CREATED);

        // Delete the event
        let response = server
            .delete(&format!("/api/v1/events/{event_id}"))
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .await;
        response.assert_status(StatusCode::OK);

        // Its participations are gone with it
        let response = server
            .get(&format!("/api/v1/events/{event_id}/participations"))
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        // The transaction survives with the event reference cleared
        let response = server
            .get("/api/v1/transactions")
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .await;
        let body: Value = response.json();
        let transactions = body["data"]["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
        assert!(transactions[0]["event_id"].is_null());
        assert!(transactions[0]["event_title"].is_null());
    }

    #[tokio::test]
    async fn test_dashboard_requires_administrator() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let staff_token = login(&server, "staff", "password123").await;
        let response = server
            .get("/api/v1/dashboard")
            .add_header(header::AUTHORIZATION, bearer(&staff_token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server.get("/api/v1/dashboard").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_dashboard_summary_contents() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = login(&server, "admin", "password123").await;

        let member_id = create_member(&server, &token, "Mario", "Rossi", "mario@example.com").await;
        create_event(&server, &token, "Assemblea", 1).await;
        server
            .post("/api/v1/fees")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({ "member_id": member_id, "year": 2026, "amount": "50.00", "status": "paid" }))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/api/v1/transactions")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({
                "transaction_type": "income",
                "amount": "200.00",
                "description": "Donazioni",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get("/api/v1/dashboard")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["active_member_count"].as_u64().unwrap(), 1);
        assert_eq!(body["data"]["event_count"].as_u64().unwrap(), 1);
        assert_eq!(body["data"]["income_total"], "200.00");
        assert_eq!(body["data"]["balance"], "200.00");
        assert_eq!(body["data"]["recent_events"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["fees_by_status"][0]["status"], "paid");
        assert_eq!(body["data"]["fees_by_status"][0]["count"].as_i64().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_profile_update_and_password_change() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let admin_token = login(&server, "admin", "password123").await;

        server
            .post("/api/v1/members/with-account")
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .json(&json!({
                "first_name": "Mario",
                "last_name": "Rossi",
                "email": "mario@example.com",
                "username": "mario",
                "password": "password123",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let token = login(&server, "mario", "password123").await;

        // Update the profile; the linked member follows
        let response = server
            .put("/api/v1/profile")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({
                "username": "mario.rossi",
                "first_name": "Mario",
                "last_name": "Rossi",
                "email": "mario.rossi@example.com",
                "phone": "3331234567",
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["username"], "mario.rossi");
        assert_eq!(body["data"]["email"], "mario.rossi@example.com");

        let response = server
            .get("/api/v1/members")
            .add_header(header::AUTHORIZATION, bearer(&admin_token))
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"][0]["email"], "mario.rossi@example.com");
        assert_eq!(body["data"][0]["phone"], "3331234567");

        // Change the password; the old one stops working
        let response = server
            .put("/api/v1/profile/password")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({ "old_password": "password123", "new_password": "nuova-password" }))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": "mario.rossi", "password": "password123" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        login(&server, "mario.rossi", "nuova-password").await;
    }

    #[tokio::test]
    async fn test_wrong_old_password_is_rejected() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let token = login(&server, "staff", "password123").await;

        let response = server
            .put("/api/v1/profile/password")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&json!({ "old_password": "wrong", "new_password": "nuova-password" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
