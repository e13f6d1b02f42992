use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone)]
pub struct CustomerName(String);

impl TryFrom<String> for CustomerName {
    type Error = InvalidNameError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(InvalidNameError::NameIsEmpty);
        }
        if value.graphemes(true).count() > 256 {
            return Err(InvalidNameError::NameIsTooLong);
        }
        let forbidden_characters =
            ['/', '(', ')', '"', '<', '>', '\\', '{', '}'];
        if value.chars().any(|g| forbidden_characters.contains(&g)) {
            Err(InvalidNameError::ForbiddenCharacters)
        } else {
            Ok(Self(value))
        }
    }
}

impl AsRef<str> for CustomerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InvalidNameError {
    #[error("Name is too long.")]
    NameIsTooLong,
    #[error("Name is empty.")]
    NameIsEmpty,
    #[error("Name has forbidden characters.")]
    ForbiddenCharacters,
}
