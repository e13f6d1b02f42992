use validator::ValidateEmail;

#[derive(Debug, Clone)]
pub struct ContactEmail(String);

impl TryFrom<String> for ContactEmail {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim().to_string();
        if ValidateEmail::validate_email(&value) {
            Ok(Self(value))
        } else {
            Err(format!("{} is not a valid email address.", value))
        }
    }
}

impl AsRef<str> for ContactEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContactEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
