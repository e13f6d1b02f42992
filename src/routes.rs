mod bookings;
mod catalog;
mod coupons;
mod health_check;
mod notifications;

pub use bookings::*;
pub use catalog::*;
pub use coupons::*;
pub use health_check::*;
pub use notifications::*;
