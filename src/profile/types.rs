use std::fmt;

use serde::{Deserialize, Serialize};

/// One `user_profiles` row, keyed by the user's id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserProfile {
    /// Blank profile for a user who has not saved one yet.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Name to greet the user with.
    pub fn display_name<'a>(&'a self, email: &'a str) -> &'a str {
        let username = self.username.trim();
        if username.is_empty() {
            email
        } else {
            username
        }
    }

    /// Sets the age from free-form text; blank clears it.
    pub fn set_age_text(&mut self, text: &str) -> Result<(), ProfileError> {
        self.age = parse_age(text)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    InvalidAge(String),
    MissingExtension(String),
    Unreadable(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAge(text) => write!(f, "`{}` is not a valid age", text),
            Self::MissingExtension(name) => write!(f, "`{}` has no file extension", name),
            Self::Unreadable(message) => write!(f, "could not read avatar: {}", message),
        }
    }
}

impl std::error::Error for ProfileError {}

/// Blank text means "no age"; anything else must be a whole number.
pub fn parse_age(text: &str) -> Result<Option<u32>, ProfileError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| ProfileError::InvalidAge(trimmed.to_string()))
}

/// Storage path for a user's avatar: `<user_id>.<ext>`.
pub fn avatar_path(user_id: &str, file_name: &str) -> Result<String, ProfileError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && !ext.contains('/'))
        .ok_or_else(|| ProfileError::MissingExtension(file_name.to_string()))?;
    Ok(format!("{}.{}", user_id, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_age_text() {
        assert_eq!(parse_age(""), Ok(None));
        assert_eq!(parse_age(" 34 "), Ok(Some(34)));
        assert_eq!(
            parse_age("thirty"),
            Err(ProfileError::InvalidAge("thirty".to_string()))
        );

        let mut profile = UserProfile::empty("u1");
        profile.set_age_text("41").expect("valid age");
        assert_eq!(profile.age, Some(41));
        assert!(profile.set_age_text("-1").is_err());
        assert_eq!(profile.age, Some(41));
    }

    #[test]
    fn avatar_path_uses_user_id_and_extension() {
        assert_eq!(avatar_path("u1", "Me.PNG"), Ok("u1.png".to_string()));
        assert_eq!(avatar_path("u1", "photo.final.jpg"), Ok("u1.jpg".to_string()));
        assert!(matches!(
            avatar_path("u1", "avatar"),
            Err(ProfileError::MissingExtension(_))
        ));
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut profile = UserProfile::empty("u1");
        assert_eq!(profile.display_name("ada@example.com"), "ada@example.com");
        profile.username = "ada".to_string();
        assert_eq!(profile.display_name("ada@example.com"), "ada");
    }
}
