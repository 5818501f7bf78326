//! Tests for the offer tier rules
//!
//! Verifies that an offer requires at least three details and that each
//! tier tag appears at most once per offer.

use shared::{validate_offer_details, OfferDetailData, OfferType};

fn detail(offer_type: OfferType, price: i32) -> OfferDetailData {
    OfferDetailData {
        title: "Website".to_string(),
        revisions: 3,
        delivery_time_in_days: 7,
        price,
        features: vec!["Responsive layout".to_string()],
        offer_type,
    }
}

mod tier_set_rules {
    use super::*;

    #[test]
    fn empty_detail_list_is_rejected() {
        let err = validate_offer_details(&[]).unwrap_err();
        assert_eq!(err.field, "details");
        assert!(err.message.contains("at least 3"));
    }

    #[test]
    fn two_details_are_rejected() {
        let details = vec![
            detail(OfferType::Basic, 100),
            detail(OfferType::Standard, 200),
        ];
        assert!(validate_offer_details(&details).is_err());
    }

    #[test]
    fn three_distinct_tiers_are_accepted() {
        let details = vec![
            detail(OfferType::Basic, 100),
            detail(OfferType::Standard, 200),
            detail(OfferType::Premium, 300),
        ];
        assert!(validate_offer_details(&details).is_ok());
    }

    #[test]
    fn repeated_tier_is_rejected_even_with_enough_details() {
        let details = vec![
            detail(OfferType::Basic, 100),
            detail(OfferType::Standard, 200),
            detail(OfferType::Standard, 250),
            detail(OfferType::Premium, 300),
        ];
        let err = validate_offer_details(&details).unwrap_err();
        assert_eq!(err.field, "details");
    }
}

mod tier_tags {
    use super::*;

    #[test]
    fn tier_tags_parse_and_round_trip() {
        for tier in [OfferType::Basic, OfferType::Standard, OfferType::Premium] {
            assert_eq!(OfferType::from_str(tier.as_str()), Some(tier));
        }
    }

    #[test]
    fn unknown_tier_tags_are_rejected() {
        assert_eq!(OfferType::from_str("gold"), None);
        assert_eq!(OfferType::from_str("Basic"), None);
    }

    #[test]
    fn tier_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OfferType::Premium).unwrap(),
            "\"premium\""
        );
    }
}
