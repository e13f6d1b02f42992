use crate::models::{Notification, NotificationEntry};
use crate::schema::notifications;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

#[tracing::instrument(name = "Saving notification.", skip(connection))]
pub async fn insert_notification(
    connection: &mut AsyncPgConnection,
    message: &str,
) -> Result<Notification, diesel::result::Error> {
    diesel::insert_into(notifications::table)
        .values(&NotificationEntry {
            message,
            created_at: Utc::now(),
        })
        .returning(Notification::as_returning())
        .get_result(connection)
        .await
}

#[tracing::instrument(name = "Listing notifications.", skip(connection))]
pub async fn get_notifications(
    connection: &mut AsyncPgConnection,
) -> Result<Vec<Notification>, diesel::result::Error> {
    notifications::table
        .order((notifications::created_at.desc(), notifications::id.desc()))
        .select(Notification::as_select())
        .load(connection)
        .await
}

#[tracing::instrument(name = "Deleting notification.", skip(connection))]
pub async fn delete_notification(
    connection: &mut AsyncPgConnection,
    id: i32,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(notifications::table.find(id))
        .execute(connection)
        .await
}
