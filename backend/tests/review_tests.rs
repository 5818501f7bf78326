//! Tests for the review rating rules

use shared::{validate_rating, MAX_RATING, MIN_RATING};

#[test]
fn ratings_one_through_five_are_accepted() {
    for rating in MIN_RATING..=MAX_RATING {
        assert!(validate_rating(rating).is_ok(), "rating {} rejected", rating);
    }
}

#[test]
fn zero_and_six_are_rejected() {
    assert!(validate_rating(0).is_err());
    assert!(validate_rating(6).is_err());
}

#[test]
fn negative_ratings_are_rejected() {
    let err = validate_rating(-3).unwrap_err();
    assert_eq!(err.field, "rating");
}
