mod booking_slot;
mod contact_email;
mod coupon_code;
mod customer_name;
mod discount;
mod food_status;
mod new_booking;
mod phone_number;
mod table_type;

pub use booking_slot::*;
pub use contact_email::*;
pub use coupon_code::*;
pub use customer_name::*;
pub use discount::*;
pub use food_status::*;
pub use new_booking::*;
pub use phone_number::*;
pub use table_type::*;
