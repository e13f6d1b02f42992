use crate::models::{Coupon, CouponEntry, EligibleUser, Redemption};
use crate::schema::{bookings, coupons, user_coupons, users};
use diesel::dsl::{count, exists};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

#[tracing::instrument(name = "Looking up coupon by code.", skip(connection))]
pub async fn find_coupon(
    connection: &mut AsyncPgConnection,
    code: &str,
) -> Result<Option<Coupon>, diesel::result::Error> {
    coupons::table
        .filter(coupons::coupon_code.eq(code))
        .select(Coupon::as_select())
        .first(connection)
        .await
        .optional()
}

#[tracing::instrument(name = "Checking coupon redemption ledger.", skip(connection))]
pub async fn has_redeemed(
    connection: &mut AsyncPgConnection,
    user_id: i32,
    code: &str,
) -> Result<bool, diesel::result::Error> {
    diesel::select(exists(
        user_coupons::table
            .filter(user_coupons::user_id.eq(user_id))
            .filter(user_coupons::coupon_code.eq(code)),
    ))
    .get_result(connection)
    .await
}

#[tracing::instrument(name = "Recording coupon redemption.", skip(connection, redemption))]
pub async fn insert_redemption(
    connection: &mut AsyncPgConnection,
    redemption: &Redemption<'_>,
) -> Result<(), diesel::result::Error> {
    diesel::insert_into(user_coupons::table)
        .values(redemption)
        .execute(connection)
        .await?;
    Ok(())
}

#[tracing::instrument(name = "Checking for an existing user coupon.", skip(connection))]
pub async fn user_has_coupon(
    connection: &mut AsyncPgConnection,
    user_id: i32,
) -> Result<bool, diesel::result::Error> {
    diesel::select(exists(coupons::table.filter(coupons::user_id.eq(user_id))))
        .get_result(connection)
        .await
}

#[tracing::instrument(name = "Inserting coupon.", skip(connection, entry))]
pub async fn insert_coupon(
    connection: &mut AsyncPgConnection,
    entry: &CouponEntry<'_>,
) -> Result<Coupon, diesel::result::Error> {
    diesel::insert_into(coupons::table)
        .values(entry)
        .returning(Coupon::as_returning())
        .get_result(connection)
        .await
}

#[tracing::instrument(name = "Deleting coupon.", skip(connection))]
pub async fn delete_coupon_by_code(
    connection: &mut AsyncPgConnection,
    code: &str,
) -> Result<usize, diesel::result::Error> {
    diesel::delete(coupons::table.filter(coupons::coupon_code.eq(code)))
        .execute(connection)
        .await
}

#[tracing::instrument(name = "Listing users eligible for coupons.", skip(connection))]
pub async fn get_users_with_bookings(
    connection: &mut AsyncPgConnection,
    min_bookings: i64,
) -> Result<Vec<EligibleUser>, diesel::result::Error> {
    users::table
        .inner_join(bookings::table)
        .group_by((users::id, users::name, users::email))
        .having(count(bookings::id).ge(min_bookings))
        .order(users::id)
        .select((users::id, users::name, users::email, count(bookings::id)))
        .load(connection)
        .await
}
