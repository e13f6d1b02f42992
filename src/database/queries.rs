mod booking_queries;
mod catalog_queries;
mod coupon_queries;
mod notification_queries;

pub use booking_queries::*;
pub use catalog_queries::*;
pub use coupon_queries::*;
pub use notification_queries::*;
