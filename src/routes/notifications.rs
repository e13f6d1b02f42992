use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::database::{get_connection, queries, ConnectionUnavailable};
use crate::models::Notification;
use crate::notifications::Observer;
use crate::routes::Acknowledgement;
use crate::startup::ApplicationState;
use crate::utils::{error_response, retryable_response};

#[derive(thiserror::Error, Debug)]
pub enum NotificationError {
    #[error("Failed to read notifications.")]
    DatabaseError(#[from] diesel::result::Error),
    #[error(transparent)]
    ConnectionUnavailable(#[from] ConnectionUnavailable),
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        tracing::error!("{} Reason: {:?}", self, self);
        match self {
            NotificationError::ConnectionUnavailable(e) => {
                retryable_response(e.to_string())
            }
            NotificationError::DatabaseError(_) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
            ),
        }
    }
}

#[tracing::instrument(name = "Listing notifications", skip(app_state))]
pub async fn list_notifications(
    State(app_state): State<ApplicationState>,
) -> Result<Json<Vec<Notification>>, NotificationError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    Ok(Json(queries::get_notifications(&mut connection).await?))
}

/// Succeeds whether or not the notification existed.
#[tracing::instrument(name = "Deleting notification", skip(app_state))]
pub async fn delete_notification(
    State(app_state): State<ApplicationState>,
    Path(id): Path<i32>,
) -> Result<Json<Acknowledgement>, NotificationError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    let deleted = queries::delete_notification(&mut connection, id).await?;
    tracing::info!(deleted, "Notification removed.");
    Ok(Acknowledgement::ok())
}

pub async fn live_notifications(
    ws: WebSocketUpgrade,
    State(app_state): State<ApplicationState>,
) -> Response {
    let observers = app_state.broadcaster.observers().clone();
    ws.on_upgrade(move |socket| relay(socket, observers.subscribe()))
}

/// Forwards pushed events to one admin socket until either side goes away.
#[tracing::instrument(name = "Relaying notifications", skip_all, fields(observer_id = %observer.id()))]
async fn relay(mut socket: WebSocket, mut observer: Observer) {
    loop {
        tokio::select! {
            event = observer.recv() => {
                let Some(event) = event else {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                };
                let payload = match serde_json::to_string(&event) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::error!(error = %e, "Could not encode push event.");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("Admin socket closed.");
}
