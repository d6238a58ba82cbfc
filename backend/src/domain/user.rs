//! User account records as stored by the remote gateway.
//!
//! Passwords arrive pre-hashed; this layer stores and returns the hash
//! verbatim and never inspects it.

use std::fmt;

/// Validation errors returned by [`NewUser::try_new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password hash was empty.
    EmptyPasswordHash,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPasswordHash => write!(f, "password hash must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// A user account to insert.
///
/// ## Invariants
/// - `username` is trimmed and non-empty; it is the natural key.
/// - `password_hash` is non-empty and stored exactly as provided.
///
/// # Examples
/// ```
/// use hydraulic_store::domain::NewUser;
///
/// let user = NewUser::try_new(" ada ", "$argon2id$...", "Ada Lovelace")
///     .unwrap()
///     .with_email("ada@example.test");
/// assert_eq!(user.username(), "ada");
/// assert_eq!(user.email(), Some("ada@example.test"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    username: String,
    password_hash: String,
    display_name: String,
    email: Option<String>,
}

impl NewUser {
    /// Validate and construct a new user record.
    pub fn try_new(
        username: &str,
        password_hash: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let password_hash = password_hash.into();
        if password_hash.is_empty() {
            return Err(UserValidationError::EmptyPasswordHash);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password_hash,
            display_name: display_name.into(),
            email: None,
        })
    }

    /// Attach an optional contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Natural key.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Caller-provided password hash.
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Display name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Optional email.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// A user account read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Natural key.
    pub username: String,
    /// Stored password hash.
    pub password_hash: String,
    /// Display name.
    pub display_name: String,
    /// Email, absent for accounts created before the column existed.
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::blank("   ", "hash", UserValidationError::EmptyUsername)]
    #[case::empty_hash("ada", "", UserValidationError::EmptyPasswordHash)]
    fn rejects_invalid_inputs(
        #[case] username: &str,
        #[case] hash: &str,
        #[case] expected: UserValidationError,
    ) {
        let error = NewUser::try_new(username, hash, "Ada").expect_err("invalid");
        assert_eq!(error, expected);
    }

    #[test]
    fn email_defaults_to_absent() {
        let user = NewUser::try_new("ada", "hash", "Ada").expect("valid user");
        assert!(user.email().is_none());
    }
}
