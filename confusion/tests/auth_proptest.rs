/// Property-based tests for password hashing and token issuance
///
/// Argon2 is deliberately slow, so the hashing properties run a handful of
/// cases only.
use confusion::auth::{AuthError, PasswordHasher, TokenIssuer};
use proptest::prelude::*;

const SECRET: &str = "proptest_secret_that_is_at_least_32_chars";

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn test_hash_verifies_own_password(password in ".{0,64}") {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash(&password).unwrap();
        prop_assert!(hasher.verify(Some(&hash), &password).unwrap());
    }

    #[test]
    fn test_hash_rejects_other_password(
        first in "[a-zA-Z0-9]{1,32}",
        second in "[a-zA-Z0-9]{1,32}",
    ) {
        prop_assume!(first != second);
        let hasher = PasswordHasher::new();
        let hash = hasher.hash(&first).unwrap();
        prop_assert!(!hasher.verify(Some(&hash), &second).unwrap());
    }
}

proptest! {
    #[test]
    fn test_token_round_trips_identity(user_id in any::<i64>(), admin in any::<bool>()) {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue(user_id, admin).unwrap();
        let claims = issuer.verify(&token).unwrap();

        prop_assert_eq!(claims.user_id(), Some(user_id));
        prop_assert_eq!(claims.admin, admin);
    }

    #[test]
    fn test_truncated_token_rejected(user_id in 1i64..1_000_000, cut in 1usize..20) {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue(user_id, false).unwrap();
        let truncated = &token[..token.len() - cut];

        prop_assert!(matches!(issuer.verify(truncated), Err(AuthError::InvalidToken)));
    }
}
