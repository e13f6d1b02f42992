use crate::routes::BookingForm;

use super::{
    booking_slot::{BookingSlot, InvalidBookingSlot},
    contact_email::ContactEmail,
    customer_name::{CustomerName, InvalidNameError},
    food_status::FoodStatus,
    phone_number::{InvalidPhoneNumber, PhoneNumber},
};

/// Display fields copied into the confirmation texts.
#[derive(Debug, Clone)]
pub struct BookingDisplay {
    pub table_name: String,
    pub table_size: String,
    pub hotel_name: String,
    pub hotel_location: String,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i32,
    pub hotel_id: i32,
    pub table_id: i32,
    pub slot: BookingSlot,
    pub name: CustomerName,
    pub email: ContactEmail,
    pub phone: PhoneNumber,
    pub food_status: FoodStatus,
    pub display: BookingDisplay,
}

impl NewBooking {
    pub fn parse(
        form: BookingForm,
        default_country_code: &str,
    ) -> Result<Self, InvalidBooking> {
        let user_id = required(form.user_id, "user_id")?;
        let hotel_id = required(form.hotel_id, "hotel_id")?;
        let table_id = required(form.table_id, "table_id")?;
        let date = required_text(form.date, "date")?;
        let time = required_text(form.time, "time")?;
        let name = required_text(form.name, "name")?;
        let email = required_text(form.email, "email")?;
        let phone = required_text(form.phone, "phone")?;
        let table_name = required_text(form.table_name, "table_name")?;
        let hotel_name = required_text(form.hotel_name, "hotel_name")?;
        let hotel_location =
            required_text(form.hotel_location, "hotel_location")?;
        let table_size = required_text(form.table_size, "table_size")?;
        let food_status = required_text(form.food_status, "food_status")?;

        Ok(Self {
            user_id,
            hotel_id,
            table_id,
            slot: BookingSlot::parse(&date, &time)?,
            name: CustomerName::try_from(name)?,
            email: ContactEmail::try_from(email)
                .map_err(InvalidBooking::InvalidEmail)?,
            phone: PhoneNumber::parse(&phone, default_country_code)?,
            food_status: FoodStatus::try_from(food_status)
                .map_err(InvalidBooking::InvalidFoodStatus)?,
            display: BookingDisplay {
                table_name,
                table_size,
                hotel_name,
                hotel_location,
            },
        })
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, InvalidBooking> {
    value.ok_or(InvalidBooking::MissingField(field))
}

fn required_text(
    value: Option<String>,
    field: &'static str,
) -> Result<String, InvalidBooking> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(InvalidBooking::MissingField(field)),
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InvalidBooking {
    #[error("Missing required field: {0}.")]
    MissingField(&'static str),
    #[error(transparent)]
    InvalidSlot(#[from] InvalidBookingSlot),
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),
    #[error("{0}")]
    InvalidEmail(String),
    #[error(transparent)]
    InvalidPhone(#[from] InvalidPhoneNumber),
    #[error("{0}")]
    InvalidFoodStatus(String),
}
