//! Tests for registration input rules and the role vocabulary

use shared::{validate_registration, UserRole};

mod registration_rules {
    use super::*;

    #[test]
    fn valid_input_passes() {
        assert!(validate_registration("maxmuster", "pass1234", "pass1234").is_ok());
    }

    #[test]
    fn mismatched_passwords_fail_on_repeated_password() {
        let err = validate_registration("maxmuster", "pass1234", "pass5678").unwrap_err();
        assert_eq!(err.field, "repeated_password");
        assert!(err.message.contains("match"));
    }

    #[test]
    fn empty_password_fails() {
        let err = validate_registration("maxmuster", "", "").unwrap_err();
        assert_eq!(err.field, "password");
    }

    #[test]
    fn username_at_limit_passes() {
        let name = "a".repeat(150);
        assert!(validate_registration(&name, "pw", "pw").is_ok());
    }
}

mod roles {
    use super::*;

    #[test]
    fn only_customer_and_business_parse() {
        assert_eq!(UserRole::from_str("customer"), Some(UserRole::Customer));
        assert_eq!(UserRole::from_str("business"), Some(UserRole::Business));
        assert_eq!(UserRole::from_str("admin"), None);
        assert_eq!(UserRole::from_str("Customer"), None);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserRole::Business).unwrap(),
            "\"business\""
        );
    }
}
