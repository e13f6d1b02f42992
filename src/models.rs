use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

#[derive(Queryable, Selectable, Serialize, Debug)]
#[diesel(table_name = crate::schema::branches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Branch {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub contact: String,
    pub description: String,
    pub image_path: Option<String>,
}

#[derive(Insertable, serde::Deserialize)]
#[diesel(table_name = crate::schema::branches)]
pub struct NewBranch {
    pub name: String,
    pub location: String,
    pub contact: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_path: Option<String>,
}

#[derive(AsChangeset, serde::Deserialize, Debug)]
#[diesel(table_name = crate::schema::branches)]
pub struct BranchChanges {
    pub name: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub description: Option<String>,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = crate::schema::tables)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DiningTable {
    pub id: i32,
    pub branch_id: i32,
    pub table_name: String,
    pub table_type: String,
    pub chair_count: i32,
    pub price_cents: i64,
    pub booked: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tables)]
pub struct NewDiningTable<'a> {
    pub branch_id: i32,
    pub table_name: &'a str,
    pub table_type: &'a str,
    pub chair_count: i32,
    pub price_cents: i64,
    pub booked: bool,
}

#[derive(AsChangeset, serde::Deserialize)]
#[diesel(table_name = crate::schema::tables)]
pub struct DiningTableChanges {
    pub table_name: Option<String>,
    pub price_cents: Option<i64>,
}

#[derive(Queryable, Selectable, Serialize, Debug)]
#[diesel(table_name = crate::schema::chairs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Chair {
    pub id: i32,
    pub table_id: i32,
    pub chair_number: i32,
    pub chair_name: String,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = crate::schema::chairs)]
pub struct NewChair {
    pub table_id: i32,
    pub chair_number: i32,
    pub chair_name: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::bookings)]
pub struct BookingEntry<'a> {
    pub user_id: i32,
    pub hotel_id: i32,
    pub table_id: i32,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveDateTime,
    pub food_status: &'a str,
}

#[derive(Queryable, Serialize, Debug)]
pub struct BookingSummary {
    pub booking_id: i32,
    pub booking_time: NaiveDateTime,
    pub table_id: i32,
    pub hotel_name: String,
    pub location: String,
    pub table_name: Option<String>,
}

#[derive(Queryable, Selectable, Serialize, Debug)]
#[diesel(table_name = crate::schema::foods)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Food {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub description: String,
}

#[derive(Insertable, AsChangeset, serde::Deserialize)]
#[diesel(table_name = crate::schema::foods)]
pub struct FoodEntry {
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    #[serde(default)]
    pub description: String,
}

#[derive(Queryable, Selectable, Serialize, Debug)]
#[diesel(table_name = crate::schema::coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Coupon {
    pub id: i32,
    pub user_id: i32,
    pub coupon_code: String,
    pub discount: i32,
    pub reason: String,
    pub expiry_date: NaiveDate,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::coupons)]
pub struct CouponEntry<'a> {
    pub user_id: i32,
    pub coupon_code: &'a str,
    pub discount: i32,
    pub reason: &'a str,
    pub expiry_date: NaiveDate,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::user_coupons)]
pub struct Redemption<'a> {
    pub user_id: i32,
    pub coupon_code: &'a str,
    pub used_at: DateTime<Utc>,
}

#[derive(Queryable, Serialize, Debug)]
pub struct EligibleUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub booking_count: i64,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = crate::schema::notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    pub id: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::notifications)]
pub struct NotificationEntry<'a> {
    pub message: &'a str,
    pub created_at: DateTime<Utc>,
}
