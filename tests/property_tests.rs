//! Property-based tests for the ledger's pure rules.
//!
//! These use proptest to check invariants across a wide range of inputs.

use chrono::{Datelike, Duration, TimeZone, Utc};
use inventory_ledger_api::{
    auth::TokenService,
    config::AppConfig,
    dto::PageQuery,
    entities::{TransactionStatus, TransactionType},
    handlers::common::resolve_paging,
    services::transactions::month_bounds,
};
use proptest::prelude::*;

const SECRET: &str = "property_test_signing_secret_long_enough_0001";

fn movement_strategy() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::Purchase),
        Just(TransactionType::Sale),
        Just(TransactionType::ReturnToSupplier),
    ]
}

fn email_strategy() -> impl Strategy<Value = String> {
    ("[a-z]{3,10}", "[a-z]{3,8}", prop_oneof!["com", "org", "net", "io"])
        .prop_map(|(local, domain, tld)| format!("{}@{}.{}", local, domain, tld))
}

// Property: a month's bounds contain every instant of that month and nothing else
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn month_bounds_contain_exactly_their_month(
        year in 1970i32..2100,
        month in 1u32..=12,
        day_offset in 0i64..31,
        seconds in 0i64..86_400,
    ) {
        let (from, until) = month_bounds(month, year).unwrap();
        let instant = from + Duration::days(day_offset) + Duration::seconds(seconds);

        let inside = instant >= from && instant < until;
        let same_month = instant.year() == year && instant.month() == month;
        prop_assert_eq!(inside, same_month);
    }

    #[test]
    fn consecutive_months_tile_without_gaps(year in 1970i32..2100, month in 1u32..=11) {
        let (_, until) = month_bounds(month, year).unwrap();
        let (next_from, _) = month_bounds(month + 1, year).unwrap();
        prop_assert_eq!(until, next_from);
    }

    #[test]
    fn out_of_range_months_are_rejected(year in 1970i32..2100, month in 13u32..1000) {
        prop_assert!(month_bounds(month, year).is_err());
        prop_assert!(month_bounds(0, year).is_err());
    }
}

// Property: movement kinds carry consistent stock and supplier rules
proptest! {
    #[test]
    fn only_purchases_add_stock(kind in movement_strategy(), quantity in 1i32..100_000) {
        let delta = kind.stock_direction() * quantity;
        prop_assert_eq!(delta > 0, kind == TransactionType::Purchase);
        prop_assert_eq!(delta.abs(), quantity);
    }

    #[test]
    fn supplier_rule_matches_movement(kind in movement_strategy()) {
        prop_assert_eq!(kind.requires_supplier(), kind != TransactionType::Sale);
        let expected = if kind == TransactionType::ReturnToSupplier {
            TransactionStatus::Processing
        } else {
            TransactionStatus::Completed
        };
        prop_assert_eq!(kind.initial_status(), expected);
    }
}

// Property: a token is honoured for its subject strictly before expiry and never after
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn token_validity_tracks_expiry(
        email in email_strategy(),
        ttl_secs in 60u64..1_000_000,
        elapsed in 0i64..2_000_000,
    ) {
        let tokens = TokenService::new(SECRET, ttl_secs);
        let issued_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let token = tokens.issue_at(&email, issued_at).unwrap();

        let now = issued_at + Duration::seconds(elapsed);
        let expected = elapsed < ttl_secs as i64;
        prop_assert_eq!(tokens.validate_at(&token, &email, now), expected);
        prop_assert!(!tokens.validate_at(&token, "someone-else@example.com", issued_at));
    }

    #[test]
    fn tokens_from_another_secret_are_never_valid(email in email_strategy()) {
        let ours = TokenService::new(SECRET, 3600);
        let theirs = TokenService::new("a_completely_different_signing_secret_0002", 3600);
        let token = theirs.issue(&email).unwrap();

        prop_assert!(!ours.validate(&token, &email));
        prop_assert!(ours.extract_subject(&token).is_err());
    }
}

// Property: listing sizes are accepted exactly within [1, max_page_size]
proptest! {
    #[test]
    fn page_size_is_bounded_by_configuration(
        max in 1u64..5_000,
        size in proptest::option::of(0u64..10_000),
        page in proptest::option::of(0u64..1_000),
    ) {
        let mut config = AppConfig::new(
            "sqlite::memory:".into(),
            SECRET.into(),
            "127.0.0.1".into(),
            8080,
            "test".into(),
        );
        config.max_page_size = max;
        config.default_page_size = max;

        let query = PageQuery { page, size, search_text: None };
        let result = resolve_paging(&query, &config);

        let effective = size.unwrap_or(max);
        if (1..=max).contains(&effective) {
            prop_assert_eq!(result.unwrap(), (page.unwrap_or(0), effective));
        } else {
            prop_assert!(result.is_err());
        }
    }
}
