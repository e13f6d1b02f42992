//! Coupon rules: one coupon per user, valid through its expiry date, and
//! redeemable once per user.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, NaiveDate, Utc};
use diesel_async::AsyncPgConnection;

use crate::database::{queries, ConnectionUnavailable};
use crate::domain::{CouponCode, Discount};
use crate::models::{Coupon, CouponEntry, EligibleUser, Redemption};
use crate::utils::{
    error_response, foreign_key_violation, is_unique_violation,
    retryable_response,
};

/// Bookings a user needs before admins consider them for a coupon.
pub const ELIGIBLE_BOOKING_COUNT: i64 = 5;

#[derive(thiserror::Error, Debug)]
pub enum CouponError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid coupon.")]
    Invalid,
    #[error("Coupon not found.")]
    NotFound,
    #[error("Coupon has expired.")]
    Expired,
    #[error("Coupon already used.")]
    AlreadyUsed,
    #[error("User already has an existing coupon!")]
    Conflict,
    #[error("User {0} does not exist.")]
    UnknownUser(i32),
    #[error("A database error occurred while processing the coupon.")]
    DatabaseError(#[from] diesel::result::Error),
    #[error(transparent)]
    ConnectionUnavailable(#[from] ConnectionUnavailable),
}

impl IntoResponse for CouponError {
    fn into_response(self) -> Response {
        tracing::error!("{} Reason: {:?}", self, self);
        match self {
            CouponError::Validation(_)
            | CouponError::Invalid
            | CouponError::Expired
            | CouponError::AlreadyUsed
            | CouponError::Conflict
            | CouponError::UnknownUser(_) => {
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            }
            CouponError::NotFound => {
                error_response(StatusCode::NOT_FOUND, self.to_string())
            }
            CouponError::ConnectionUnavailable(e) => {
                retryable_response(e.to_string())
            }
            CouponError::DatabaseError(_) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
            ),
        }
    }
}

/// A validated request to issue a coupon.
pub struct CouponDraft {
    pub user_id: i32,
    pub code: CouponCode,
    pub discount: Discount,
    pub reason: String,
    pub expiry_date: NaiveDate,
}

impl CouponDraft {
    /// `expires_at` is a date, or an RFC 3339 timestamp whose UTC date is used.
    pub fn parse(
        user_id: i32,
        code: String,
        discount: i32,
        reason: String,
        expires_at: &str,
    ) -> Result<Self, CouponError> {
        let code = CouponCode::try_from(code)
            .map_err(|e| CouponError::Validation(e.to_string()))?;
        let discount =
            Discount::try_from(discount).map_err(CouponError::Validation)?;
        let expires_at = expires_at.trim();
        let expiry_date = NaiveDate::parse_from_str(expires_at, "%Y-%m-%d")
            .or_else(|_| {
                DateTime::parse_from_rfc3339(expires_at)
                    .map(|at| at.with_timezone(&Utc).date_naive())
            })
            .map_err(|_| {
                CouponError::Validation(format!(
                    "{} is not a valid expiry date.",
                    expires_at
                ))
            })?;
        Ok(Self {
            user_id,
            code,
            discount,
            reason: reason.trim().to_string(),
            expiry_date,
        })
    }
}

/// Checks, in order: the code exists, it has not expired, and `user_id` has
/// not redeemed it yet. Read-only, so repeated calls agree until redemption.
#[tracing::instrument(name = "Validating coupon", skip(connection, code), fields(code = %code))]
pub async fn validate_coupon(
    connection: &mut AsyncPgConnection,
    user_id: i32,
    code: &CouponCode,
    today: NaiveDate,
) -> Result<Discount, CouponError> {
    let coupon = queries::find_coupon(connection, code.as_ref())
        .await?
        .ok_or(CouponError::Invalid)?;
    if today > coupon.expiry_date {
        return Err(CouponError::Expired);
    }
    if queries::has_redeemed(connection, user_id, code.as_ref()).await? {
        return Err(CouponError::AlreadyUsed);
    }
    Discount::try_from(coupon.discount).map_err(CouponError::Validation)
}

/// Appends to the redemption ledger. The ledger is unique per user and code,
/// so a replayed redemption fails with `AlreadyUsed`.
#[tracing::instrument(name = "Redeeming coupon", skip(connection, code), fields(code = %code))]
pub async fn redeem_coupon(
    connection: &mut AsyncPgConnection,
    user_id: i32,
    code: &CouponCode,
    now: DateTime<Utc>,
) -> Result<(), CouponError> {
    let redemption = Redemption {
        user_id,
        coupon_code: code.as_ref(),
        used_at: now,
    };
    queries::insert_redemption(connection, &redemption)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CouponError::AlreadyUsed
            } else if foreign_key_violation(&e).is_some() {
                CouponError::UnknownUser(user_id)
            } else {
                CouponError::DatabaseError(e)
            }
        })
}

#[tracing::instrument(name = "Creating coupon", skip(connection, draft), fields(user_id = draft.user_id))]
pub async fn create_coupon(
    connection: &mut AsyncPgConnection,
    draft: &CouponDraft,
) -> Result<Coupon, CouponError> {
    if queries::user_has_coupon(connection, draft.user_id).await? {
        return Err(CouponError::Conflict);
    }
    let entry = CouponEntry {
        user_id: draft.user_id,
        coupon_code: draft.code.as_ref(),
        discount: draft.discount.percent(),
        reason: &draft.reason,
        expiry_date: draft.expiry_date,
    };
    queries::insert_coupon(connection, &entry).await.map_err(|e| {
        if is_unique_violation(&e) {
            CouponError::Conflict
        } else if foreign_key_violation(&e).is_some() {
            CouponError::UnknownUser(draft.user_id)
        } else {
            CouponError::DatabaseError(e)
        }
    })
}

#[tracing::instrument(name = "Looking up active coupon", skip(connection, code), fields(code = %code))]
pub async fn find_active_coupon(
    connection: &mut AsyncPgConnection,
    code: &CouponCode,
    today: NaiveDate,
) -> Result<Coupon, CouponError> {
    match queries::find_coupon(connection, code.as_ref()).await? {
        Some(coupon) if coupon.expiry_date >= today => Ok(coupon),
        _ => Err(CouponError::NotFound),
    }
}

#[tracing::instrument(name = "Deleting coupon", skip(connection, code), fields(code = %code))]
pub async fn delete_coupon(
    connection: &mut AsyncPgConnection,
    code: &CouponCode,
) -> Result<(), CouponError> {
    match queries::delete_coupon_by_code(connection, code.as_ref()).await? {
        0 => Err(CouponError::NotFound),
        _ => Ok(()),
    }
}

pub async fn eligible_users(
    connection: &mut AsyncPgConnection,
) -> Result<Vec<EligibleUser>, CouponError> {
    Ok(queries::get_users_with_bookings(connection, ELIGIBLE_BOOKING_COUNT)
        .await?)
}
