/// A phone number in international format: `+` followed by 10 to 15 digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Numbers without a leading `+` get `default_prefix` prepended before
    /// the format check.
    pub fn parse(
        raw: &str,
        default_prefix: &str,
    ) -> Result<Self, InvalidPhoneNumber> {
        let raw = raw.trim();
        let normalized = if raw.starts_with('+') {
            raw.to_string()
        } else {
            format!("{}{}", default_prefix, raw)
        };
        let is_well_formed = normalized.strip_prefix('+').is_some_and(|digits| {
            (10..=15).contains(&digits.len())
                && digits.chars().all(|c| c.is_ascii_digit())
        });
        if is_well_formed {
            Ok(Self(normalized))
        } else {
            Err(InvalidPhoneNumber(raw.to_string()))
        }
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(thiserror::Error, Debug)]
#[error("{0} is not a valid phone number.")]
pub struct InvalidPhoneNumber(String);
