//! Property-based tests for the argument parser and suggestion ranking.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use pcshell::core::errors::ErrorCode;
use pcshell::registry::params::{Param, ParamSpec, ParseError};
use pcshell::engine::suggest::{suggest, MAX_DISTANCE, MAX_SUGGESTIONS};

/// Strategy for plain tokens that need no quoting.
fn plain_token() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./-]{1,12}"
}

/// Strategy for a list spec: a sequence of required/optional flags.
fn list_spec() -> impl Strategy<Value = ParamSpec> {
    prop::collection::vec(any::<bool>(), 0..6).prop_map(|flags| {
        ParamSpec::List(
            flags
                .into_iter()
                .enumerate()
                .map(|(i, optional)| {
                    let name = format!("p{}", i);
                    if optional {
                        Param::optional(name)
                    } else {
                        Param::required(name)
                    }
                })
                .collect(),
        )
    })
}

proptest! {
    /// A list spec fails iff fewer tokens than required entries are given,
    /// and otherwise returns every token.
    #[test]
    fn list_enforces_minimum_count_only(
        spec in list_spec(),
        tokens in prop::collection::vec(plain_token(), 0..10),
    ) {
        let required = spec.required_count();
        let result = spec.parse(&tokens.join(" "));

        if tokens.len() < required {
            prop_assert_eq!(result, Err(ParseError::InsufficientArguments { required }));
        } else {
            prop_assert_eq!(result, Ok(tokens));
        }
    }

    /// Quoting a token with spaces keeps it as one argument.
    #[test]
    fn double_quoted_token_is_one_argument(
        words in prop::collection::vec("[a-z]{1,6}", 1..5),
        tail in plain_token(),
    ) {
        let grouped = words.join(" ");
        let line = format!("\"{}\" {}", grouped, tail);
        let parsed = ParamSpec::Variadic.parse(&line).unwrap();
        prop_assert_eq!(parsed, vec![grouped, tail]);
    }

    /// Suggestions are bounded, close, and sorted by distance.
    #[test]
    fn suggestions_are_ranked(
        input in "[a-z]{1,8}",
        pool in prop::collection::vec("[a-z]{1,8}", 0..20),
    ) {
        let out = suggest(&input, pool.iter().map(String::as_str));

        prop_assert!(out.len() <= MAX_SUGGESTIONS);
        for s in &out {
            prop_assert!(s.distance <= MAX_DISTANCE);
            prop_assert!(pool.contains(&s.name));
        }
        for pair in out.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
        }
    }

    /// An exact match, when present, is always the first suggestion.
    #[test]
    fn exact_match_ranks_first(
        input in "[a-z]{3,8}",
        mut pool in prop::collection::vec("[a-z]{3,8}", 0..10),
        at in any::<prop::sample::Index>(),
    ) {
        let i = at.index(pool.len() + 1);
        pool.insert(i, input.clone());

        let out = suggest(&input, pool.iter().map(String::as_str));
        prop_assert_eq!(out[0].distance, 0);
        prop_assert_eq!(&out[0].name, &input);
    }

    /// Every code in 0..=1024 maps to exactly one band label.
    #[test]
    fn every_code_has_a_band(code in 0u16..=1024) {
        let label = ErrorCode::new(code).unwrap().kind().label();
        prop_assert!(!label.is_empty());
        if code >= 1000 {
            prop_assert_eq!(label, "UNKNOWN");
        }
    }
}
