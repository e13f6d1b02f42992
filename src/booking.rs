//! The booking transaction: a booking row and the table's `booked` flag are
//! written in one transaction, then notifications go out best effort.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, NaiveDateTime};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};

use crate::coupons::{self, CouponError};
use crate::database::{get_connection, queries, ConnectionUnavailable};
use crate::domain::{CouponCode, Discount, InvalidBooking, NewBooking, PriceQuote};
use crate::email_client::send::send_booking_confirmation;
use crate::models::BookingEntry;
use crate::notifier::{EmailSender, SmsSender};
use crate::startup::ApplicationState;
use crate::telemetry::spawn_with_tracing;
use crate::utils::{
    error_response, foreign_key_violation, is_unique_violation,
    retryable_response,
};

/// Email and SMS ports shared by every request.
#[derive(Clone)]
pub struct Notifiers {
    pub email: Arc<dyn EmailSender>,
    pub sms: Arc<dyn SmsSender>,
}

#[derive(Debug)]
pub struct BookingReceipt {
    pub booking_id: i32,
    pub booking_time: NaiveDateTime,
}

#[derive(thiserror::Error, Debug)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] InvalidBooking),
    #[error("Table {table_id} does not belong to branch {hotel_id}.")]
    WrongBranch { table_id: i32, hotel_id: i32 },
    #[error("Table {0} is already booked.")]
    TableUnavailable(i32),
    #[error("{0} not found.")]
    NotFound(&'static str),
    #[error("Booking failed.")]
    TransactionError(#[from] diesel::result::Error),
    #[error(transparent)]
    ConnectionUnavailable(#[from] ConnectionUnavailable),
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        tracing::error!("{} Reason: {:?}", self, self);
        let status = match &self {
            BookingError::Validation(_) | BookingError::WrongBranch { .. } => {
                StatusCode::BAD_REQUEST
            }
            BookingError::TableUnavailable(_) => StatusCode::CONFLICT,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::ConnectionUnavailable(e) => {
                return retryable_response(e.to_string())
            }
            BookingError::TransactionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, self.to_string())
    }
}

/// Reserves the table and records the booking.
///
/// Success means both writes committed. The admin notification and the guest
/// confirmations happen afterwards and cannot change the outcome.
#[tracing::instrument(
    name = "Creating booking",
    skip(app_state, booking),
    fields(
        user_id = booking.user_id,
        hotel_id = booking.hotel_id,
        table_id = booking.table_id
    )
)]
pub async fn create_booking(
    app_state: &ApplicationState,
    booking: NewBooking,
) -> Result<BookingReceipt, BookingError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    let receipt = connection
        .transaction::<_, BookingError, _>(|conn| {
            let booking = &booking;
            async move {
                let entry = BookingEntry {
                    user_id: booking.user_id,
                    hotel_id: booking.hotel_id,
                    table_id: booking.table_id,
                    booking_date: booking.slot.date(),
                    booking_time: booking.slot.booking_time(),
                    food_status: booking.food_status.as_str(),
                };
                let booking_id = queries::insert_booking(conn, &entry)
                    .await
                    .map_err(|e| classify_insert_error(e, booking.table_id))?;
                let reserved = queries::mark_table_booked(
                    conn,
                    booking.table_id,
                    booking.hotel_id,
                )
                .await?;
                if !reserved {
                    return Err(unavailable_reason(conn, booking).await);
                }
                Ok(BookingReceipt {
                    booking_id,
                    booking_time: entry.booking_time,
                })
            }
            .scope_boxed()
        })
        .await?;
    drop(connection);
    tracing::info!(booking_id = receipt.booking_id, "Booking committed.");

    let message = format!(
        "New booking for Table {} in {} ({})",
        booking.display.table_name,
        booking.display.hotel_name,
        booking.food_status
    );
    if let Err(e) = app_state.broadcaster.publish(&message).await {
        tracing::warn!(error = ?e, "Booking notification was not saved.");
    }

    let notifiers = app_state.notifiers.clone();
    spawn_with_tracing(async move {
        dispatch_confirmations(&notifiers, &booking).await;
    });

    Ok(receipt)
}

fn classify_insert_error(error: diesel::result::Error, table_id: i32) -> BookingError {
    if is_unique_violation(&error) {
        return BookingError::TableUnavailable(table_id);
    }
    match foreign_key_violation(&error) {
        Some(constraint) if constraint.contains("user_id") => {
            BookingError::NotFound("User")
        }
        Some(constraint) if constraint.contains("hotel_id") => {
            BookingError::NotFound("Branch")
        }
        Some(_) => BookingError::NotFound("Table"),
        None => BookingError::TransactionError(error),
    }
}

async fn unavailable_reason(
    conn: &mut AsyncPgConnection,
    booking: &NewBooking,
) -> BookingError {
    match queries::find_table(conn, booking.table_id).await {
        Ok(None) => BookingError::NotFound("Table"),
        Ok(Some(table)) if table.branch_id != booking.hotel_id => {
            BookingError::WrongBranch {
                table_id: booking.table_id,
                hotel_id: booking.hotel_id,
            }
        }
        Ok(Some(_)) => BookingError::TableUnavailable(booking.table_id),
        Err(e) => BookingError::TransactionError(e),
    }
}

/// The guest-facing text shared by the email and SMS confirmations.
pub fn confirmation_text(booking: &NewBooking) -> String {
    format!(
        "Hello {}, your table is successfully booked at our restaurant.\n\
         Table Name: {} ({})\n\
         Hotel Name: {} ({})\n\
         Date: {}\n\
         Arrival Time: {}\n\
         Food Status: {}\n\n\
         We look forward to serving you. Thank you!",
        booking.name,
        booking.display.table_name,
        booking.display.table_size,
        booking.display.hotel_name,
        booking.display.hotel_location,
        booking.slot.date(),
        booking.slot.arrival(),
        booking.food_status,
    )
}

#[tracing::instrument(name = "Dispatching booking confirmations", skip_all)]
async fn dispatch_confirmations(notifiers: &Notifiers, booking: &NewBooking) {
    let text = confirmation_text(booking);
    let (email, sms) = tokio::join!(
        send_booking_confirmation(notifiers.email.as_ref(), booking, &text),
        notifiers.sms.send_sms(&booking.phone, &text),
    );
    if let Err(e) = email {
        tracing::error!(error = ?e, "Booking confirmation email failed.");
    }
    if let Err(e) = sms {
        tracing::error!(error = ?e, "Booking confirmation SMS failed.");
    }
}

/// Deletes a booking owned by `user_id`. The table is released in the same
/// transaction when no other booking still holds it.
#[tracing::instrument(name = "Cancelling booking", skip(app_state))]
pub async fn cancel_booking(
    app_state: &ApplicationState,
    booking_id: i32,
    user_id: i32,
) -> Result<(), BookingError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    let table_id = connection
        .transaction::<_, BookingError, _>(|conn| {
            async move {
                let table_id =
                    queries::delete_user_booking(conn, booking_id, user_id)
                        .await?
                        .ok_or(BookingError::NotFound("Booking"))?;
                queries::release_table_if_unbooked(conn, table_id).await?;
                Ok(table_id)
            }
            .scope_boxed()
        })
        .await?;
    drop(connection);

    let message =
        format!("Booking {} for table {} was cancelled", booking_id, table_id);
    if let Err(e) = app_state.broadcaster.publish(&message).await {
        tracing::warn!(error = ?e, "Cancellation notification was not saved.");
    }
    Ok(())
}

#[derive(thiserror::Error, Debug)]
pub enum QuoteError {
    #[error("{0} not found.")]
    NotFound(String),
    #[error("The quoted amount is too large.")]
    AmountTooLarge,
    #[error(transparent)]
    Coupon(#[from] CouponError),
    #[error("Could not compute the quote.")]
    DatabaseError(#[from] diesel::result::Error),
    #[error(transparent)]
    ConnectionUnavailable(#[from] ConnectionUnavailable),
}

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        match self {
            QuoteError::Coupon(e) => e.into_response(),
            QuoteError::NotFound(_) => {
                tracing::error!("{} Reason: {:?}", self, self);
                error_response(StatusCode::NOT_FOUND, self.to_string())
            }
            QuoteError::AmountTooLarge => {
                tracing::error!("{} Reason: {:?}", self, self);
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            }
            QuoteError::ConnectionUnavailable(e) => {
                tracing::error!("{} Reason: {:?}", e, e);
                retryable_response(e.to_string())
            }
            QuoteError::DatabaseError(_) => {
                tracing::error!("{} Reason: {:?}", self, self);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong",
                )
            }
        }
    }
}

/// Prices a table with an optional food order and coupon. The coupon is
/// validated but not redeemed.
#[tracing::instrument(name = "Quoting booking price", skip(connection, coupon_code))]
pub async fn quote(
    connection: &mut AsyncPgConnection,
    user_id: i32,
    table_id: i32,
    food_ids: &[i32],
    coupon_code: Option<&CouponCode>,
    today: NaiveDate,
) -> Result<PriceQuote, QuoteError> {
    let table = queries::find_table(connection, table_id)
        .await?
        .ok_or_else(|| QuoteError::NotFound(format!("Table {}", table_id)))?;
    let prices = queries::get_food_prices(connection, food_ids).await?;
    let food_prices = food_ids
        .iter()
        .map(|id| {
            prices
                .iter()
                .find(|(food_id, _)| food_id == id)
                .map(|(_, price)| *price)
                .ok_or_else(|| QuoteError::NotFound(format!("Food {}", id)))
        })
        .collect::<Result<Vec<i64>, _>>()?;
    let discount = match coupon_code {
        Some(code) => {
            coupons::validate_coupon(connection, user_id, code, today).await?
        }
        None => Discount::none(),
    };
    PriceQuote::new(table.price_cents, &food_prices, table.chair_count, discount)
        .ok_or(QuoteError::AmountTooLarge)
}
