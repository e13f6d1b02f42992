use crate::models::{BookingEntry, BookingSummary};
use crate::schema::{bookings, branches, tables};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

#[tracing::instrument(name = "Inserting booking into database.", skip(connection, entry))]
pub async fn insert_booking(
    connection: &mut AsyncPgConnection,
    entry: &BookingEntry<'_>,
) -> Result<i32, diesel::result::Error> {
    diesel::insert_into(bookings::table)
        .values(entry)
        .returning(bookings::id)
        .get_result(connection)
        .await
}

/// Flips `booked` only while the table is still free, so of two concurrent
/// bookings the second one blocks on the row lock and then matches nothing.
#[tracing::instrument(name = "Marking table as booked.", skip(connection))]
pub async fn mark_table_booked(
    connection: &mut AsyncPgConnection,
    table_id: i32,
    branch_id: i32,
) -> Result<bool, diesel::result::Error> {
    let updated = diesel::update(
        tables::table
            .filter(tables::id.eq(table_id))
            .filter(tables::branch_id.eq(branch_id))
            .filter(tables::booked.eq(false)),
    )
    .set(tables::booked.eq(true))
    .execute(connection)
    .await?;
    Ok(updated == 1)
}

#[tracing::instrument(name = "Releasing table if unreferenced.", skip(connection))]
pub async fn release_table_if_unbooked(
    connection: &mut AsyncPgConnection,
    table_id: i32,
) -> Result<bool, diesel::result::Error> {
    let still_referenced: bool = diesel::select(exists(
        bookings::table.filter(bookings::table_id.eq(table_id)),
    ))
    .get_result(connection)
    .await?;
    if still_referenced {
        return Ok(false);
    }
    diesel::update(tables::table.find(table_id))
        .set(tables::booked.eq(false))
        .execute(connection)
        .await?;
    Ok(true)
}

/// Deletes a booking owned by `user_id` and returns the table it held.
#[tracing::instrument(name = "Deleting booking.", skip(connection))]
pub async fn delete_user_booking(
    connection: &mut AsyncPgConnection,
    booking_id: i32,
    user_id: i32,
) -> Result<Option<i32>, diesel::result::Error> {
    diesel::delete(
        bookings::table
            .filter(bookings::id.eq(booking_id))
            .filter(bookings::user_id.eq(user_id)),
    )
    .returning(bookings::table_id)
    .get_result(connection)
    .await
    .optional()
}

#[tracing::instrument(name = "Listing bookings of a user.", skip(connection))]
pub async fn get_user_bookings(
    connection: &mut AsyncPgConnection,
    user_id: i32,
) -> Result<Vec<BookingSummary>, diesel::result::Error> {
    bookings::table
        .inner_join(branches::table)
        .left_join(tables::table)
        .filter(bookings::user_id.eq(user_id))
        .order(bookings::booking_time.desc())
        .select((
            bookings::id,
            bookings::booking_time,
            bookings::table_id,
            branches::name,
            branches::location,
            tables::table_name.nullable(),
        ))
        .load(connection)
        .await
}
