//! Pure validation rules for marketplace entities
//!
//! These checks are cross-field rules that hold regardless of transport or
//! storage; the backend maps `ValidationError` to a field-keyed 400.

use thiserror::Error;

use crate::models::OfferDetailData;

pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MIN_OFFER_DETAILS: usize = 3;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// A failed validation, keyed by the offending field
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Validate the cross-field rules of a registration request
///
/// Uniqueness of username and email is a storage concern and checked by the
/// backend against the database.
pub fn validate_registration(
    username: &str,
    password: &str,
    repeated_password: &str,
) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::new("username", "Username is required."));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::new(
            "username",
            "Username must be at most 150 characters.",
        ));
    }
    if password.is_empty() {
        return Err(ValidationError::new("password", "Password is required."));
    }
    if password != repeated_password {
        return Err(ValidationError::new(
            "repeated_password",
            "Passwords do not match.",
        ));
    }
    Ok(())
}

/// Validate a review rating (1-5 inclusive)
pub fn validate_rating(rating: i32) -> Result<(), ValidationError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::new(
            "rating",
            "Rating must be between 1 and 5.",
        ));
    }
    Ok(())
}

/// Validate the tier set submitted with a new offer
///
/// An offer needs at least three tiers and each tier tag may appear only
/// once within the offer.
pub fn validate_offer_details(details: &[OfferDetailData]) -> Result<(), ValidationError> {
    if details.len() < MIN_OFFER_DETAILS {
        return Err(ValidationError::new(
            "details",
            "An offer requires at least 3 details.",
        ));
    }
    for (i, detail) in details.iter().enumerate() {
        if details[..i].iter().any(|d| d.offer_type == detail.offer_type) {
            return Err(ValidationError::new(
                "details",
                "Each offer_type may appear only once per offer.",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OfferType;
    use proptest::prelude::*;

    fn detail(offer_type: OfferType) -> OfferDetailData {
        OfferDetailData {
            title: "Logo Design".to_string(),
            revisions: 2,
            delivery_time_in_days: 5,
            price: 100,
            features: vec!["Logo".to_string()],
            offer_type,
        }
    }

    #[test]
    fn registration_accepts_matching_passwords() {
        assert!(validate_registration("alice", "secret123", "secret123").is_ok());
    }

    #[test]
    fn registration_rejects_password_mismatch() {
        let err = validate_registration("alice", "secret123", "secret124").unwrap_err();
        assert_eq!(err.field, "repeated_password");
    }

    #[test]
    fn registration_rejects_blank_username() {
        let err = validate_registration("   ", "secret123", "secret123").unwrap_err();
        assert_eq!(err.field, "username");
    }

    #[test]
    fn registration_rejects_overlong_username() {
        let name = "a".repeat(MAX_USERNAME_LENGTH + 1);
        let err = validate_registration(&name, "pw", "pw").unwrap_err();
        assert_eq!(err.field, "username");
    }

    #[test]
    fn offer_needs_three_details() {
        let details = vec![detail(OfferType::Basic), detail(OfferType::Standard)];
        let err = validate_offer_details(&details).unwrap_err();
        assert_eq!(err.field, "details");
    }

    #[test]
    fn offer_rejects_duplicate_tier() {
        let details = vec![
            detail(OfferType::Basic),
            detail(OfferType::Basic),
            detail(OfferType::Premium),
        ];
        let err = validate_offer_details(&details).unwrap_err();
        assert_eq!(err.field, "details");
    }

    #[test]
    fn offer_accepts_full_tier_set() {
        let details = vec![
            detail(OfferType::Basic),
            detail(OfferType::Standard),
            detail(OfferType::Premium),
        ];
        assert!(validate_offer_details(&details).is_ok());
    }

    proptest! {
        #[test]
        fn rating_valid_iff_in_range(rating in -100i32..100) {
            let result = validate_rating(rating);
            prop_assert_eq!(result.is_ok(), (1..=5).contains(&rating));
        }
    }
}
