use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradepost_core::{DomainError, DomainResult, ProductId, UserId};

/// A registered marketplace user.
///
/// `favorites` keeps insertion order; membership changes go through
/// [`crate::favorites`] so the idempotency rules hold everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub favorites: Vec<ProductId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a new user record from validated registration input and a
    /// pre-computed password hash.
    pub fn new(registration: &Registration, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            username: registration.username.trim().to_string(),
            email: registration.email.trim().to_lowercase(),
            password_hash,
            favorites: Vec::new(),
            created_at: now,
        }
    }
}

/// Raw registration input, validated before any hashing or storage.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn validate(&self) -> DomainResult<()> {
        if self.username.trim().is_empty() {
            return Err(DomainError::validation("username is required"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        // A full RFC 5322 check buys nothing here; reject the obviously broken.
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(DomainError::validation("email is not valid"));
        }
        if self.password.len() < 6 {
            return Err(DomainError::validation(
                "password must be at least 6 characters",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            username: "john_doe".to_string(),
            email: "john@example.com".to_string(),
            password: "password123".to_string(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn empty_username_is_rejected() {
        let mut r = registration();
        r.username = "   ".to_string();
        assert!(matches!(r.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn email_without_at_sign_is_rejected() {
        let mut r = registration();
        r.email = "john.example.com".to_string();
        assert!(matches!(r.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn short_password_is_rejected() {
        let mut r = registration();
        r.password = "abc".to_string();
        assert!(matches!(r.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn new_user_normalizes_email_and_username() {
        let mut r = registration();
        r.email = "  John@Example.COM ".to_string();
        r.username = " john_doe ".to_string();
        let user = User::new(&r, "hash".to_string(), Utc::now());
        assert_eq!(user.email, "john@example.com");
        assert_eq!(user.username, "john_doe");
        assert!(user.favorites.is_empty());
    }
}
