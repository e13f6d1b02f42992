use crate::helpers::{booking_body, spawn_app};
use axum_reservations::domain::TableType;
use std::time::Duration;

#[tokio::test]
async fn notifications_are_listed_newest_first() {
    let app = spawn_app().await;
    app.accept_notifications().await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let first = app.seed_table(branch.id, TableType::TwoPair).await;
    let second = app.seed_table(branch.id, TableType::TwoPair).await;
    for table in [&first, &second] {
        let response = app
            .post_booking(&booking_body(user_id, branch.id, table.table.id, "19:30"))
            .await;
        assert_eq!(response.status().as_u16(), 201);
    }

    let listed: serde_json::Value =
        app.get("/notifications").await.json().await.unwrap();

    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0]["id"].as_i64() > listed[1]["id"].as_i64());
}

#[tokio::test]
async fn deleting_a_notification_is_idempotent() {
    let app = spawn_app().await;
    app.accept_notifications().await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::TwoPair).await;
    app.post_booking(&booking_body(user_id, branch.id, table.table.id, "19:30"))
        .await;
    let listed: serde_json::Value =
        app.get("/notifications").await.json().await.unwrap();
    let id = listed[0]["id"].as_i64().unwrap();

    for _ in 0..2 {
        let response = app.delete(&format!("/notifications/{}", id)).await;
        assert_eq!(response.status().as_u16(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);
    }
    let unknown = app.delete("/notifications/424242").await;
    assert_eq!(unknown.status().as_u16(), 200);
    assert!(app.notification_messages().await.is_empty());
}

#[tokio::test]
async fn every_live_observer_receives_the_booking_push() {
    let app = spawn_app().await;
    app.accept_notifications().await;
    let mut first = app.observers.subscribe();
    let mut second = app.observers.subscribe();
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::TwoPair).await;

    app.post_booking(&booking_body(user_id, branch.id, table.table.id, "19:30"))
        .await;

    for observer in [&mut first, &mut second] {
        let event = tokio::time::timeout(Duration::from_secs(2), observer.recv())
            .await
            .expect("No push within two seconds")
            .expect("Observer was closed");
        assert!(event.message.starts_with("New booking for Table T7"));
    }
}

#[tokio::test]
async fn disconnected_observers_do_not_affect_bookings() {
    let app = spawn_app().await;
    app.accept_notifications().await;
    let gone = app.observers.subscribe();
    drop(gone);
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::TwoPair).await;

    let response = app
        .post_booking(&booking_body(user_id, branch.id, table.table.id, "19:30"))
        .await;

    assert_eq!(response.status().as_u16(), 201);
    assert!(app.observers.is_empty());
    assert_eq!(app.notification_messages().await.len(), 1);
}

#[tokio::test]
async fn cancellation_is_announced() {
    let app = spawn_app().await;
    app.accept_notifications().await;
    let user_id = app.seed_user().await;
    let branch = app.seed_branch().await;
    let table = app.seed_table(branch.id, TableType::TwoPair).await;
    let created: serde_json::Value = app
        .post_booking(&booking_body(user_id, branch.id, table.table.id, "19:30"))
        .await
        .json()
        .await
        .unwrap();
    let booking_id = created["booking_id"].as_i64().unwrap();

    app.delete(&format!("/bookings/{}?user_id={}", booking_id, user_id))
        .await;

    let expected = format!(
        "Booking {} for table {} was cancelled",
        booking_id, table.table.id
    );
    let messages = app.notification_messages().await;
    assert_eq!(messages.last(), Some(&expected));
}
