#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponCode(String);

impl TryFrom<String> for CouponCode {
    type Error = InvalidCouponCode;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim().to_string();
        let is_of_right_size = (1..=64).contains(&value.len());
        let has_invalid_characters = value
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        if !is_of_right_size || has_invalid_characters {
            return Err(InvalidCouponCode(value));
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for CouponCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CouponCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(thiserror::Error, Debug)]
#[error("'{0}' is not a valid coupon code.")]
pub struct InvalidCouponCode(String);
