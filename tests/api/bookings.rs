use crate::helpers::{booking_body, received_requests, spawn_app, spawn_app_with};
use axum_reservations::domain::TableType;
use diesel_async::RunQueryDsl;
use std::time::Duration;
use wiremock::matchers::any;
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn valid_booking_reserves_the_table_and_records_one_booking() {
    let app = spawn_app().await;
    app.accept_notifications().await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::FourPair).await;

    let response = app
        .post_booking(&booking_body(user_id, branch.id, table.table.id, "19:30"))
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["booking_id"].as_i64().is_some());
    assert!(app.table(table.table.id).await.booked);
    assert_eq!(app.booking_count(table.table.id).await, 1);
}

#[tokio::test]
async fn reference_scenario_stores_the_slot_and_notifies_admins() {
    let app = spawn_app().await;
    app.accept_notifications().await;
    let mut connection = app.connection().await;
    for statement in [
        "INSERT INTO users (id, name, username, email, phone, password_hash) \
         VALUES (5, 'Asha Raman', 'asha', 'asha@example.com', '+919876543210', 'x')",
        "INSERT INTO branches (id, name, location, contact) \
         VALUES (2, 'Harbour View', 'Kochi', '+914842000000')",
        "INSERT INTO tables (id, branch_id, table_name, table_type, chair_count, price_cents) \
         VALUES (7, 2, 'T7', '4-pair', 4, 50000)",
    ] {
        diesel::sql_query(statement)
            .execute(&mut connection)
            .await
            .expect("Failed to seed scenario");
    }
    drop(connection);
    let mut observer = app.observers.subscribe();

    let response = app.post_booking(&booking_body(5, 2, 7, "19:30")).await;
    assert_eq!(response.status().as_u16(), 201);

    let bookings: serde_json::Value =
        app.get("/bookings/user/5").await.json().await.unwrap();
    assert_eq!(bookings[0]["booking_time"], "2025-06-01T19:30:00");
    assert_eq!(bookings[0]["table_name"], "T7");
    assert!(app.table(7).await.booked);
    assert_eq!(
        app.notification_messages().await,
        vec!["New booking for Table T7 in Harbour View (without_food)".to_string()]
    );
    let pushed = tokio::time::timeout(Duration::from_secs(2), observer.recv())
        .await
        .expect("No push within two seconds")
        .expect("Observer was closed");
    assert_eq!(
        pushed.message,
        "New booking for Table T7 in Harbour View (without_food)"
    );

    let emails = received_requests(&app.email_server, 1).await;
    let email: serde_json::Value = serde_json::from_slice(&emails[0].body).unwrap();
    assert_eq!(email["To"], "asha@example.com");
    assert_eq!(email["Subject"], "Booking Confirmation");
    let sms = received_requests(&app.sms_server, 1).await;
    let sms_body = String::from_utf8_lossy(&sms[0].body);
    assert!(sms_body.contains("To=%2B919876543210"));
}

#[tokio::test]
async fn seconds_in_the_time_are_dropped() {
    let app = spawn_app().await;
    app.accept_notifications().await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::TwoPair).await;

    let response = app
        .post_booking(&booking_body(user_id, branch.id, table.table.id, "19:30:45"))
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let bookings: serde_json::Value = app
        .get(&format!("/bookings/user/{}", user_id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(bookings[0]["booking_time"], "2025-06-01T19:30:00");
}

#[tokio::test]
async fn booking_succeeds_when_notification_providers_are_unreachable() {
    let closed_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let app = spawn_app_with(|c| {
        c.email_client.base_url = format!("http://127.0.0.1:{}", closed_port);
        c.sms_client.base_url = format!("http://127.0.0.1:{}", closed_port);
    })
    .await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::FourPair).await;

    let response = app
        .post_booking(&booking_body(user_id, branch.id, table.table.id, "19:30"))
        .await;

    assert_eq!(response.status().as_u16(), 201);
    assert!(app.table(table.table.id).await.booked);
}

#[tokio::test]
async fn provider_errors_do_not_fail_the_booking() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.sms_server)
        .await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::FourPair).await;

    let response = app
        .post_booking(&booking_body(user_id, branch.id, table.table.id, "19:30"))
        .await;

    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(received_requests(&app.email_server, 1).await.len(), 1);
}

#[tokio::test]
async fn booking_an_already_booked_table_returns_409() {
    let app = spawn_app().await;
    app.accept_notifications().await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::FourPair).await;

    let first = app
        .post_booking(&booking_body(user_id, branch.id, table.table.id, "19:30"))
        .await;
    let second = app
        .post_booking(&booking_body(user_id, branch.id, table.table.id, "21:00"))
        .await;

    assert_eq!(first.status().as_u16(), 201);
    assert_eq!(second.status().as_u16(), 409);
    assert_eq!(app.booking_count(table.table.id).await, 1);
    assert_eq!(app.notification_messages().await.len(), 1);
}

#[tokio::test]
async fn concurrent_bookings_of_one_table_have_exactly_one_winner() {
    let app = spawn_app().await;
    app.accept_notifications().await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::EightPair).await;

    let attempts = (0..8).map(|i| {
        let body = booking_body(
            user_id,
            branch.id,
            table.table.id,
            &format!("{}:00", 12 + i),
        );
        let app = &app;
        async move { app.post_booking(&body).await.status().as_u16() }
    });
    let statuses = futures_util::future::join_all(attempts).await;

    assert_eq!(statuses.iter().filter(|s| **s == 201).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == 409).count(), 7);
    assert_eq!(app.booking_count(table.table.id).await, 1);
}

#[tokio::test]
async fn missing_fields_are_rejected_with_400() {
    let app = spawn_app().await;
    let test_cases = [
        "user_id",
        "hotel_id",
        "table_id",
        "date",
        "time",
        "name",
        "email",
        "phone",
        "table_name",
        "hotel_name",
        "hotel_location",
        "table_size",
        "food_status",
    ];
    for field in test_cases {
        let mut body = booking_body(1, 1, 1, "19:30");
        body.as_object_mut().unwrap().remove(field);

        let response = app.post_booking(&body).await;

        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not fail with 400 when {} was missing",
            field
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains(field));
    }
}

#[tokio::test]
async fn invalid_fields_are_rejected_with_400() {
    let app = spawn_app().await;
    let test_cases = [
        ("phone", "12345", "short phone"),
        ("phone", "+91abcdefghij", "non-numeric phone"),
        ("email", "not-an-email", "bad email"),
        ("date", "01/06/2025", "bad date"),
        ("time", "7pm", "bad time"),
        ("food_status", "maybe", "unknown food status"),
        ("name", "   ", "blank name"),
    ];
    for (field, value, description) in test_cases {
        let mut body = booking_body(1, 1, 1, "19:30");
        body[field] = serde_json::json!(value);

        let response = app.post_booking(&body).await;

        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not fail with 400 for a {}",
            description
        );
    }
}

#[tokio::test]
async fn unknown_table_is_404_and_foreign_branch_is_400() {
    let app = spawn_app().await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let other_branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::TwoPair).await;

    let unknown = app
        .post_booking(&booking_body(user_id, branch.id, table.table.id + 100, "19:30"))
        .await;
    let foreign = app
        .post_booking(&booking_body(user_id, other_branch.id, table.table.id, "19:30"))
        .await;

    assert_eq!(unknown.status().as_u16(), 404);
    assert_eq!(foreign.status().as_u16(), 400);
    assert!(!app.table(table.table.id).await.booked);
    assert_eq!(app.booking_count(table.table.id).await, 0);
}

#[tokio::test]
async fn unknown_user_is_404_and_nothing_is_reserved() {
    let app = spawn_app().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::TwoPair).await;

    let response = app
        .post_booking(&booking_body(4242, branch.id, table.table.id, "19:30"))
        .await;

    assert_eq!(response.status().as_u16(), 404);
    assert!(!app.table(table.table.id).await.booked);
    assert!(app.notification_messages().await.is_empty());
}

#[tokio::test]
async fn cancelling_a_booking_releases_the_table() {
    let app = spawn_app().await;
    app.accept_notifications().await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::FourPair).await;
    let created: serde_json::Value = app
        .post_booking(&booking_body(user_id, branch.id, table.table.id, "19:30"))
        .await
        .json()
        .await
        .unwrap();
    let booking_id = created["booking_id"].as_i64().unwrap();

    let not_owner = app
        .delete(&format!("/bookings/{}?user_id={}", booking_id, user_id + 1))
        .await;
    assert_eq!(not_owner.status().as_u16(), 404);
    assert!(app.table(table.table.id).await.booked);

    let response = app
        .delete(&format!("/bookings/{}?user_id={}", booking_id, user_id))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    assert!(!app.table(table.table.id).await.booked);
    assert_eq!(app.booking_count(table.table.id).await, 0);

    let again = app
        .delete(&format!("/bookings/{}?user_id={}", booking_id, user_id))
        .await;
    assert_eq!(again.status().as_u16(), 404);
}

#[tokio::test]
async fn exhausted_pool_returns_503_with_retry_after() {
    let app = spawn_app_with(|c| {
        c.database.max_connections = 1;
        c.database.acquire_timeout_ms = 200;
    })
    .await;
    let held = app.connection().await;

    let response = app.post_booking(&booking_body(1, 1, 1, "19:30")).await;

    assert_eq!(response.status().as_u16(), 503);
    assert_eq!(
        response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok()),
        Some("1")
    );
    drop(held);
}

#[tokio::test]
async fn quote_multiplies_food_by_chairs_and_applies_the_coupon() {
    let app = spawn_app().await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::FourPair).await;
    let food: serde_json::Value = app
        .post_json(
            "/foods",
            &serde_json::json!({"name": "Masala Dosa", "category": "Breakfast", "price_cents": 12_050}),
        )
        .await
        .json()
        .await
        .unwrap();
    let food_id = food["id"].as_i64().unwrap();
    let coupon = app
        .post_json(
            "/coupons",
            &serde_json::json!({
                "user_id": user_id,
                "coupon_code": "QUOTE15",
                "discount": 15,
                "reason": "Loyal guest",
                "expires_at": "2999-12-31"
            }),
        )
        .await;
    assert_eq!(coupon.status().as_u16(), 201);

    let response = app
        .post_json(
            "/bookings/quote",
            &serde_json::json!({
                "user_id": user_id,
                "table_id": table.table.id,
                "food_ids": [food_id],
                "coupon_code": "QUOTE15"
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let quote: serde_json::Value = response.json().await.unwrap();
    // 50_000 + 12_050 * 4 = 98_200; 85% of that is 83_470.
    assert_eq!(quote["pretotal_cents"], 98_200);
    assert_eq!(quote["discount_percent"], 15);
    assert_eq!(quote["total_cents"], 83_470);

    // Quoting validates the coupon without redeeming it.
    let validate = app
        .post_json(
            "/coupons/validate",
            &serde_json::json!({"user_id": user_id, "coupon_code": "QUOTE15"}),
        )
        .await;
    assert_eq!(validate.status().as_u16(), 200);
}

#[tokio::test]
async fn quote_for_unknown_food_is_404() {
    let app = spawn_app().await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::TwoPair).await;

    let response = app
        .post_json(
            "/bookings/quote",
            &serde_json::json!({
                "user_id": user_id,
                "table_id": table.table.id,
                "food_ids": [9999]
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn quote_too_large_for_64_bits_is_rejected() {
    let app = spawn_app().await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::FourPair).await;
    let food: serde_json::Value = app
        .post_json(
            "/foods",
            &serde_json::json!({"name": "Gold Leaf Thali", "category": "Dinner", "price_cents": i64::MAX / 2}),
        )
        .await
        .json()
        .await
        .unwrap();
    let food_id = food["id"].as_i64().unwrap();

    let response = app
        .post_json(
            "/bookings/quote",
            &serde_json::json!({
                "user_id": user_id,
                "table_id": table.table.id,
                "food_ids": [food_id]
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "The quoted amount is too large.");
}
