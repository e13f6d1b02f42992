use axum_reservations::catalog::{self, TableWithChairs};
use axum_reservations::configuration::{get_configuration, DatabaseSettings, Settings};
use axum_reservations::database::{get_connection, DatabaseConnectionPool};
use axum_reservations::domain::TableType;
use axum_reservations::models::{Branch, DiningTable, NewBranch, NewUser};
use axum_reservations::notifications::ObserverRegistry;
use axum_reservations::schema::{bookings, notifications, tables, users};
use axum_reservations::startup::Application;
use axum_reservations::telemetry::setup_tracing;
use diesel::prelude::*;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use once_cell::sync::Lazy;
use reqwest::Client;
use secrecy::ExposeSecret;
use std::future::IntoFuture;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MIGRATION: EmbeddedMigrations = embed_migrations!();

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter = "debug";
    if std::env::var("TEST_LOG").is_ok() {
        setup_tracing("test", default_filter, std::io::stdout);
    } else {
        setup_tracing("test", default_filter, std::io::sink);
    }
});

pub struct TestApp {
    pub address: String,
    pub pool: DatabaseConnectionPool,
    pub observers: ObserverRegistry,
    pub email_server: MockServer,
    pub sms_server: MockServer,
    pub api_client: Client,
}

impl TestApp {
    pub async fn check_health(&self) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/health_check", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_json(
        &self,
        route: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.api_client
            .post(&format!("{}{}", &self.address, route))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn put_json(
        &self,
        route: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.api_client
            .put(&format!("{}{}", &self.address, route))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get(&self, route: &str) -> reqwest::Response {
        self.api_client
            .get(&format!("{}{}", &self.address, route))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete(&self, route: &str) -> reqwest::Response {
        self.api_client
            .delete(&format!("{}{}", &self.address, route))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_booking(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_json("/bookings", body).await
    }

    /// Both providers accept every message.
    pub async fn accept_notifications(&self) {
        Mock::given(path("/email"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.email_server)
            .await;
        Mock::given(path_regex(r"^/2010-04-01/Accounts/.+/Messages\.json$"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.sms_server)
            .await;
    }

    pub async fn connection(
        &self,
    ) -> axum_reservations::database::DatabaseConnection {
        get_connection(&self.pool)
            .await
            .expect("Could not retrieve database connection")
    }

    pub async fn seed_user(&self) -> i32 {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();
        let username = Uuid::now_v7().to_string();
        let user = NewUser {
            name: &name,
            username: &username,
            email: &email,
            phone: "+919876543210",
            password_hash: "not-a-real-hash",
            role: "user",
        };
        diesel::insert_into(users::table)
            .values(&user)
            .returning(users::id)
            .get_result(&mut self.connection().await)
            .await
            .expect("Failed to add user")
    }

    pub async fn seed_branch(&self) -> Branch {
        let branch = NewBranch {
            name: "Harbour View".into(),
            location: "Kochi".into(),
            contact: "+914842000000".into(),
            description: String::new(),
            image_path: None,
        };
        axum_reservations::database::queries::insert_branch(
            &mut *self.connection().await,
            &branch,
        )
        .await
        .expect("Failed to add branch")
    }

    pub async fn seed_table(
        &self,
        branch_id: i32,
        table_type: TableType,
    ) -> TableWithChairs {
        catalog::create_table(
            &mut *self.connection().await,
            branch_id,
            &format!("T-{}", Uuid::now_v7().simple()),
            table_type,
            50_000,
        )
        .await
        .expect("Failed to add table")
    }

    pub async fn table(&self, table_id: i32) -> DiningTable {
        tables::table
            .find(table_id)
            .select(DiningTable::as_select())
            .first(&mut self.connection().await)
            .await
            .expect("Failed to read table")
    }

    pub async fn booking_count(&self, table_id: i32) -> i64 {
        bookings::table
            .filter(bookings::table_id.eq(table_id))
            .count()
            .get_result(&mut self.connection().await)
            .await
            .expect("Failed to count bookings")
    }

    pub async fn notification_messages(&self) -> Vec<String> {
        notifications::table
            .order(notifications::id)
            .select(notifications::message)
            .load(&mut self.connection().await)
            .await
            .expect("Failed to read notifications")
    }
}

/// A complete booking body for `table`.
pub fn booking_body(
    user_id: i32,
    hotel_id: i32,
    table_id: i32,
    time: &str,
) -> serde_json::Value {
    serde_json::json!({
        "user_id": user_id,
        "hotel_id": hotel_id,
        "table_id": table_id,
        "date": "2025-06-01",
        "time": time,
        "name": "Asha Raman",
        "email": "asha@example.com",
        "phone": "9876543210",
        "table_name": "T7",
        "hotel_name": "Harbour View",
        "hotel_location": "Kochi",
        "table_size": "4-pair",
        "food_status": "without_food"
    })
}

/// Polls `server` until it has seen `expected` requests or gives up.
pub async fn received_requests(
    server: &MockServer,
    expected: usize,
) -> Vec<wiremock::Request> {
    for _ in 0..50 {
        let requests = server.received_requests().await.unwrap_or_default();
        if requests.len() >= expected {
            return requests;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    server.received_requests().await.unwrap_or_default()
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Settings)) -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    let sms_server = MockServer::start().await;
    let configuration = {
        let mut c = get_configuration().expect("failed to get configuration");
        c.database.database_name = Uuid::now_v7().to_string();
        c.application.port = 0;
        c.email_client.base_url = email_server.uri();
        c.sms_client.base_url = sms_server.uri();
        customize(&mut c);
        c
    };

    configure_database(&configuration.database).await;

    let application = Application::build(configuration)
        .await
        .expect("Failed to build app.");
    let testapp = TestApp {
        address: format!("http://127.0.0.1:{}", application.port()),
        pool: application.pool(),
        observers: application.observers(),
        email_server,
        sms_server,
        api_client: Client::new(),
    };
    tokio::spawn(application.run_until_stopped().into_future());
    testapp
}

async fn configure_database(db_settings: &DatabaseSettings) {
    let mut db_conn = AsyncPgConnection::establish(
        db_settings
            .connection_string_without_database()
            .expose_secret(),
    )
    .await
    .expect("Failed to connect");
    diesel::sql_query(format!(
        r#"CREATE DATABASE "{}";"#,
        db_settings.database_name
    ))
    .execute(&mut db_conn)
    .await
    .expect("Failed to create database");
    let conn_string = db_settings.connection_string().clone();
    axum_reservations::telemetry::spawn_blocking_with_tracing(move || {
        let mut db_conn: AsyncConnectionWrapper<AsyncPgConnection> =
            AsyncConnectionWrapper::<AsyncPgConnection>::establish(
                conn_string.expose_secret(),
            )
            .expect("Error");
        db_conn
            .run_pending_migrations(MIGRATION)
            .expect("Failed to run migrations");
    })
    .await
    .expect("thread panic");
}
