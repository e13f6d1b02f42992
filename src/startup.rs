use std::sync::Arc;

use anyhow::Context;
use axum::{extract::Request, routing, serve::Serve, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info_span;
use uuid::Uuid;

use crate::booking::Notifiers;
use crate::configuration::Settings;
use crate::database::{create_connection_pool, DatabaseConnectionPool};
use crate::email_client::EmailClient;
use crate::notifications::{NotificationBroadcaster, ObserverRegistry};
use crate::routes;
use crate::sms_client::SmsClient;

#[derive(Clone)]
pub struct ApplicationState {
    pub database_pool: DatabaseConnectionPool,
    pub broadcaster: NotificationBroadcaster,
    pub notifiers: Notifiers,
    pub default_country_code: Arc<str>,
}

pub struct Application {
    port: u16,
    pool: DatabaseConnectionPool,
    observers: ObserverRegistry,
    server: Serve<Router, Router>,
}

impl Application {
    pub async fn build(configuration: Settings) -> anyhow::Result<Self> {
        let pool = create_connection_pool(&configuration.database)
            .context("Failed to build the database pool.")?;

        let sender = configuration
            .email_client
            .sender()
            .map_err(anyhow::Error::msg)
            .context("Invalid sender email address.")?;
        let email_client = EmailClient::new(
            reqwest::Url::parse(&configuration.email_client.base_url)
                .context("Invalid email API base url.")?,
            sender,
            configuration.email_client.api_token.clone(),
            configuration.email_client.timeout(),
        )
        .context("Failed to build the email client.")?;
        let sms_client = SmsClient::new(
            reqwest::Url::parse(&configuration.sms_client.base_url)
                .context("Invalid SMS API base url.")?,
            configuration.sms_client.account_sid.clone(),
            configuration.sms_client.auth_token.clone(),
            configuration.sms_client.from_number.clone(),
            configuration.sms_client.timeout(),
        )
        .context("Failed to build the SMS client.")?;

        let observers =
            ObserverRegistry::new(configuration.notifications.observer_buffer);
        let app_state = ApplicationState {
            database_pool: pool.clone(),
            broadcaster: NotificationBroadcaster::new(
                pool.clone(),
                observers.clone(),
            ),
            notifiers: Notifiers {
                email: Arc::new(email_client),
                sms: Arc::new(sms_client),
            },
            default_country_code: configuration
                .application
                .default_country_code
                .as_str()
                .into(),
        };

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {}", address))?;
        let port = listener.local_addr()?.port();
        tracing::info!(%address, port, "Listening.");

        Ok(Self {
            port,
            pool,
            observers,
            server: run(listener, app_state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn pool(&self) -> DatabaseConnectionPool {
        self.pool.clone()
    }

    pub fn observers(&self) -> ObserverRegistry {
        self.observers.clone()
    }

    /// Serves until Ctrl-C or SIGTERM, then ends every live admin push
    /// subscription so their sockets close.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let observers = self.observers;
        self.server
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                observers.close_all();
            })
            .await
    }
}

pub fn run(
    listener: TcpListener,
    app_state: ApplicationState,
) -> Serve<Router, Router> {
    let app: Router = Router::new()
        .route("/health_check", routing::get(routes::health_check))
        .route("/bookings", routing::post(routes::create_booking))
        .route("/bookings/quote", routing::post(routes::quote_booking))
        .route("/bookings/user/:user_id", routing::get(routes::user_bookings))
        .route("/bookings/:booking_id", routing::delete(routes::cancel_booking))
        .route("/notifications", routing::get(routes::list_notifications))
        .route(
            "/notifications/live",
            routing::get(routes::live_notifications),
        )
        .route(
            "/notifications/:id",
            routing::delete(routes::delete_notification),
        )
        .route("/coupons", routing::post(routes::create_coupon))
        .route("/coupons/validate", routing::post(routes::validate_coupon))
        .route("/coupons/use", routing::post(routes::use_coupon))
        .route(
            "/coupons/:code",
            routing::get(routes::get_coupon).delete(routes::delete_coupon),
        )
        .route(
            "/users/eligible-for-coupons",
            routing::get(routes::eligible_users),
        )
        .route(
            "/branches",
            routing::get(routes::list_branches).post(routes::create_branch),
        )
        .route(
            "/branches/:id",
            routing::put(routes::update_branch).delete(routes::delete_branch),
        )
        .route("/branches/:id/tables", routing::get(routes::branch_tables))
        .route("/tables", routing::post(routes::create_table))
        .route(
            "/tables/:id",
            routing::put(routes::update_table).delete(routes::delete_table),
        )
        .route(
            "/foods",
            routing::get(routes::list_foods).post(routes::create_food),
        )
        .route(
            "/foods/:id",
            routing::put(routes::update_food).delete(routes::delete_food),
        )
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &Request<_>| {
                let request_id = Uuid::now_v7();
                info_span!("Http Request", %request_id, request_uri = %request.uri())
            },
        ))
        .with_state(app_state);

    axum::serve(listener, app)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down."),
    }
}
