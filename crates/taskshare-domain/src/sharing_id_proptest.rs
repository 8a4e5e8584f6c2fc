//! Property-based tests for the sharing identifier codec.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::sharing_id::{encode_sharing_id, parse_sharing_id};

    /// Strategy to generate root share ids the way the authoritative system
    /// assigns them (opaque alphanumeric tokens, never containing the pipe
    /// separator).
    fn root_share_id_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_-]{1,24}"
    }

    proptest! {
        #[test]
        fn test_sharing_id_round_trips(
            root in root_share_id_strategy(),
            category_id in any::<i32>()
        ) {
            let encoded = encode_sharing_id(&root, category_id);
            let decoded = parse_sharing_id(&encoded);
            prop_assert!(decoded.is_ok(), "failed for: {}", encoded);
            let (decoded_root, decoded_category) = decoded.unwrap();
            prop_assert_eq!(decoded_root, root);
            prop_assert_eq!(decoded_category, category_id);
        }

        #[test]
        fn test_identifiers_with_extra_tokens_are_rejected(
            root in root_share_id_strategy(),
            category_id in any::<i32>(),
            extra in "[A-Za-z0-9]{1,8}"
        ) {
            let value = format!("{root}|{category_id}|{extra}");
            prop_assert!(parse_sharing_id(&value).is_err(), "should reject: {}", value);
        }
    }
}
