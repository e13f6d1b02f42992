use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::booking::{self, BookingError, QuoteError};
use crate::coupons::CouponError;
use crate::database::{get_connection, queries};
use crate::domain::{CouponCode, NewBooking, PriceQuote};
use crate::models::BookingSummary;
use crate::startup::ApplicationState;

/// Every field is optional so a missing one becomes a 400 naming the field
/// instead of a body rejection.
#[derive(serde::Deserialize, Debug, Default)]
pub struct BookingForm {
    pub user_id: Option<i32>,
    pub hotel_id: Option<i32>,
    pub table_id: Option<i32>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub table_name: Option<String>,
    pub hotel_name: Option<String>,
    pub hotel_location: Option<String>,
    pub table_size: Option<String>,
    pub food_status: Option<String>,
}

#[derive(Serialize)]
pub struct BookingCreated {
    success: bool,
    message: String,
    booking_id: i32,
}

#[tracing::instrument(
    name = "Booking a table",
    skip(app_state, form),
    fields(table_id = ?form.table_id, hotel_id = ?form.hotel_id)
)]
pub async fn create_booking(
    State(app_state): State<ApplicationState>,
    Json(form): Json<BookingForm>,
) -> Result<(StatusCode, Json<BookingCreated>), BookingError> {
    let new_booking = NewBooking::parse(form, &app_state.default_country_code)?;
    let receipt = booking::create_booking(&app_state, new_booking).await?;
    Ok((
        StatusCode::CREATED,
        Json(BookingCreated {
            success: true,
            message: "Table booked successfully! Notifications sent.".into(),
            booking_id: receipt.booking_id,
        }),
    ))
}

#[tracing::instrument(name = "Listing user bookings", skip(app_state))]
pub async fn user_bookings(
    State(app_state): State<ApplicationState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<BookingSummary>>, BookingError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    let bookings = queries::get_user_bookings(&mut connection, user_id).await?;
    Ok(Json(bookings))
}

#[derive(serde::Deserialize, Debug)]
pub struct CancelParameters {
    user_id: i32,
}

#[derive(Serialize)]
pub struct Acknowledgement {
    success: bool,
}

impl Acknowledgement {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

pub async fn cancel_booking(
    State(app_state): State<ApplicationState>,
    Path(booking_id): Path<i32>,
    Query(parameters): Query<CancelParameters>,
) -> Result<Json<Acknowledgement>, BookingError> {
    booking::cancel_booking(&app_state, booking_id, parameters.user_id).await?;
    Ok(Acknowledgement::ok())
}

#[derive(serde::Deserialize, Debug)]
pub struct QuoteRequest {
    user_id: i32,
    table_id: i32,
    #[serde(default)]
    food_ids: Vec<i32>,
    coupon_code: Option<String>,
}

#[tracing::instrument(name = "Quoting a booking", skip(app_state))]
pub async fn quote_booking(
    State(app_state): State<ApplicationState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<PriceQuote>, QuoteError> {
    let coupon_code = request
        .coupon_code
        .filter(|code| !code.trim().is_empty())
        .map(CouponCode::try_from)
        .transpose()
        .map_err(|e| CouponError::Validation(e.to_string()))?;
    let mut connection = get_connection(&app_state.database_pool).await?;
    let quote = booking::quote(
        &mut connection,
        request.user_id,
        request.table_id,
        &request.food_ids,
        coupon_code.as_ref(),
        Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(quote))
}
