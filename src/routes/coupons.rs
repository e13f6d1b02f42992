use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::AsyncConnection;
use serde::Serialize;

use crate::coupons::{self, CouponDraft, CouponError};
use crate::database::get_connection;
use crate::domain::CouponCode;
use crate::models::{Coupon, EligibleUser};
use crate::routes::Acknowledgement;
use crate::startup::ApplicationState;

#[derive(serde::Deserialize, Debug)]
pub struct CouponRequest {
    user_id: i32,
    coupon_code: String,
}

impl CouponRequest {
    fn code(&self) -> Result<CouponCode, CouponError> {
        CouponCode::try_from(self.coupon_code.clone())
            .map_err(|e| CouponError::Validation(e.to_string()))
    }
}

#[derive(Serialize)]
pub struct CouponAccepted {
    message: &'static str,
    discount: i32,
}

#[tracing::instrument(name = "Validating a coupon", skip(app_state))]
pub async fn validate_coupon(
    State(app_state): State<ApplicationState>,
    Json(request): Json<CouponRequest>,
) -> Result<Json<CouponAccepted>, CouponError> {
    let code = request.code()?;
    let mut connection = get_connection(&app_state.database_pool).await?;
    let discount = coupons::validate_coupon(
        &mut connection,
        request.user_id,
        &code,
        Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(CouponAccepted {
        message: "Coupon is valid!",
        discount: discount.percent(),
    }))
}

/// Validation and redemption share one transaction, so a concurrent replay
/// ends on the ledger's unique index as `AlreadyUsed`.
#[tracing::instrument(name = "Using a coupon", skip(app_state))]
pub async fn use_coupon(
    State(app_state): State<ApplicationState>,
    Json(request): Json<CouponRequest>,
) -> Result<Json<CouponAccepted>, CouponError> {
    let code = request.code()?;
    let user_id = request.user_id;
    let mut connection = get_connection(&app_state.database_pool).await?;
    let discount = connection
        .transaction::<_, CouponError, _>(|conn| {
            let code = &code;
            async move {
                let now = Utc::now();
                let discount = coupons::validate_coupon(
                    conn,
                    user_id,
                    code,
                    now.date_naive(),
                )
                .await?;
                coupons::redeem_coupon(conn, user_id, code, now).await?;
                Ok(discount)
            }
            .scope_boxed()
        })
        .await?;
    Ok(Json(CouponAccepted {
        message: "Coupon applied successfully!",
        discount: discount.percent(),
    }))
}

#[derive(serde::Deserialize, Debug)]
pub struct NewCouponRequest {
    user_id: i32,
    coupon_code: String,
    discount: i32,
    #[serde(default)]
    reason: String,
    expires_at: String,
}

#[tracing::instrument(name = "Issuing a coupon", skip(app_state))]
pub async fn create_coupon(
    State(app_state): State<ApplicationState>,
    Json(request): Json<NewCouponRequest>,
) -> Result<(StatusCode, Json<Coupon>), CouponError> {
    let draft = CouponDraft::parse(
        request.user_id,
        request.coupon_code,
        request.discount,
        request.reason,
        &request.expires_at,
    )?;
    let mut connection = get_connection(&app_state.database_pool).await?;
    let coupon = coupons::create_coupon(&mut connection, &draft).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

pub async fn get_coupon(
    State(app_state): State<ApplicationState>,
    Path(code): Path<String>,
) -> Result<Json<Coupon>, CouponError> {
    let code = CouponCode::try_from(code).map_err(|_| CouponError::NotFound)?;
    let mut connection = get_connection(&app_state.database_pool).await?;
    let coupon = coupons::find_active_coupon(
        &mut connection,
        &code,
        Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(coupon))
}

pub async fn delete_coupon(
    State(app_state): State<ApplicationState>,
    Path(code): Path<String>,
) -> Result<Json<Acknowledgement>, CouponError> {
    let code = CouponCode::try_from(code).map_err(|_| CouponError::NotFound)?;
    let mut connection = get_connection(&app_state.database_pool).await?;
    coupons::delete_coupon(&mut connection, &code).await?;
    Ok(Acknowledgement::ok())
}

pub async fn eligible_users(
    State(app_state): State<ApplicationState>,
) -> Result<Json<Vec<EligibleUser>>, CouponError> {
    let mut connection = get_connection(&app_state.database_pool).await?;
    Ok(Json(coupons::eligible_users(&mut connection).await?))
}
