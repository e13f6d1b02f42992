use crate::{domain::NewBooking, notifier::DeliveryError, TEMPLATES};

use crate::notifier::EmailSender;

#[tracing::instrument(
    name = "Send a booking confirmation email",
    skip(email_sender, booking, plain_text_body),
    fields(table_id = booking.table_id)
)]
pub async fn send_booking_confirmation(
    email_sender: &dyn EmailSender,
    booking: &NewBooking,
    plain_text_body: &str,
) -> Result<(), DeliveryError> {
    let mut tera_context = tera::Context::new();
    tera_context.insert("name", booking.name.as_ref());
    tera_context.insert("table_name", &booking.display.table_name);
    tera_context.insert("table_size", &booking.display.table_size);
    tera_context.insert("hotel_name", &booking.display.hotel_name);
    tera_context.insert("hotel_location", &booking.display.hotel_location);
    tera_context.insert("date", &booking.slot.date().to_string());
    tera_context.insert("arrival", &booking.slot.arrival());
    tera_context.insert("food_status", booking.food_status.as_str());
    let html_body = TEMPLATES
        .render("emails/booking_confirmation.html", &tera_context)
        .map_err(|e| {
            DeliveryError::Rendering(format!(
                "Could not render email html with error: {:?}",
                e
            ))
        })?;
    email_sender
        .send_email(
            &booking.email,
            "Booking Confirmation",
            plain_text_body,
            &html_body,
        )
        .await?;
    tracing::info!("Booking confirmation email sent.");
    Ok(())
}
