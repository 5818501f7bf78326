//! Tests for the order status vocabulary
//!
//! An order accepts exactly three states and the wire format uses the
//! snake_case tags the API contract names.

use shared::OrderStatus;

mod status_parsing {
    use super::*;

    #[test]
    fn all_three_states_parse() {
        assert_eq!(
            OrderStatus::from_str("in_progress"),
            Some(OrderStatus::InProgress)
        );
        assert_eq!(
            OrderStatus::from_str("completed"),
            Some(OrderStatus::Completed)
        );
        assert_eq!(
            OrderStatus::from_str("cancelled"),
            Some(OrderStatus::Cancelled)
        );
    }

    #[test]
    fn unknown_states_are_rejected() {
        assert_eq!(OrderStatus::from_str("done"), None);
        assert_eq!(OrderStatus::from_str("IN_PROGRESS"), None);
        assert_eq!(OrderStatus::from_str(""), None);
        assert_eq!(OrderStatus::from_str("in progress"), None);
    }

    #[test]
    fn as_str_round_trips() {
        for status in [
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
    }
}

mod wire_format {
    use super::*;

    #[test]
    fn status_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }

    #[test]
    fn status_deserializes_from_snake_case() {
        let status: OrderStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, OrderStatus::Completed);
    }

    #[test]
    fn status_rejects_unknown_tags() {
        assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_err());
    }
}
