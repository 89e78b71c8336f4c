//! Property-based tests for case generation.
//!
//! Invariants tested:
//! - Targeted values sit exactly on, or one past, the configured limit
//! - Non-targeted fields keep their nominal values (single-fault isolation)
//! - No two cases in a run share a token or a name/email/comment value

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::{collections::HashSet, sync::Arc};

use proptest::prelude::*;
use strum::IntoEnumIterator;
use wpharness_core::{
    case::{max_nominal_length, NOMINAL_URL},
    BoundaryLimits, CaseGenerator, ClockTokenSource, Expectation, FormField,
    LimitedField, Partition, SequenceTokenSource,
};

fn fast_config() -> ProptestConfig {
    ProptestConfig {
        cases: 64,
        max_shrink_iters: 128,
        ..ProptestConfig::default()
    }
}

/// Limits small enough to keep generated values cheap, never below what a
/// nominal value needs.
fn limits_strategy() -> impl Strategy<Value = BoundaryLimits> {
    (
        max_nominal_length(LimitedField::Name)..=400_usize,
        max_nominal_length(LimitedField::Email)..=200_usize,
        max_nominal_length(LimitedField::Comment)..=2_000_usize,
    )
        .prop_map(|(name, email, comment)| BoundaryLimits {
            name,
            email,
            comment,
        })
}

fn generator(limits: BoundaryLimits, seed: u64) -> CaseGenerator {
    CaseGenerator::new(limits, Arc::new(SequenceTokenSource::starting_at(seed)))
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

proptest! {
    #![proptest_config(fast_config())]

    /// Property: over-limit values are exactly limit + 1 characters
    #[test]
    fn prop_over_max_is_one_past_limit(limits in limits_strategy(), seed in 0..u64::MAX / 2) {
        let gen = generator(limits, seed);

        prop_assert_eq!(char_len(&gen.generate(Partition::OverMaxName).name), limits.name + 1);
        prop_assert_eq!(char_len(&gen.generate(Partition::OverMaxEmail).email), limits.email + 1);
        prop_assert_eq!(
            char_len(&gen.generate(Partition::OverMaxComment).comment),
            limits.comment + 1
        );
    }

    /// Property: max-valid values are exactly the limit
    #[test]
    fn prop_max_valid_sits_on_limit(limits in limits_strategy(), seed in 0..u64::MAX / 2) {
        let gen = generator(limits, seed);

        prop_assert_eq!(char_len(&gen.generate(Partition::MaxValidName).name), limits.name);
        prop_assert_eq!(
            char_len(&gen.generate(Partition::MaxValidComment).comment),
            limits.comment
        );
    }

    /// Property: over-limit email addresses keep a local part and the fixed domain
    #[test]
    fn prop_over_max_email_is_well_formed(limits in limits_strategy(), seed in 0..u64::MAX / 2) {
        let email = generator(limits, seed).generate(Partition::OverMaxEmail).email;
        let (local, domain) = email.split_once('@').unwrap_or_default();
        prop_assert!(!local.is_empty());
        prop_assert_eq!(domain, "domain.com");
    }

    /// Property: every field except the target holds its nominal value, and
    /// that value is within its limit
    #[test]
    fn prop_single_fault_isolation(limits in limits_strategy(), seed in 0..u64::MAX / 2) {
        let gen = generator(limits, seed);
        for partition in Partition::all() {
            let case = gen.generate(partition);
            let token = case.token.to_string();
            let target = partition.target();

            for field in LimitedField::iter() {
                if target != Some(field.form_field()) {
                    let value = case.value(field.form_field()).unwrap_or_default();
                    prop_assert!(
                        char_len(value) <= limits.limit(field),
                        "{} {} is {} chars, limit {}",
                        partition,
                        field,
                        char_len(value),
                        limits.limit(field)
                    );
                }
            }

            if target != Some(FormField::Author) {
                prop_assert_eq!(&case.name, &format!("John Smith {token}"));
            }
            if target != Some(FormField::Email) {
                prop_assert_eq!(&case.email, &format!("john{token}@example.com"));
            }
            if target != Some(FormField::Url) {
                prop_assert_eq!(case.url.as_deref(), Some(NOMINAL_URL));
            }
            if target != Some(FormField::Comment) {
                prop_assert_eq!(&case.comment, &format!("This is a great post! {token}"));
            }
        }
    }

    /// Property: a full run never repeats a token or a field value
    #[test]
    fn prop_run_values_are_unique(seed in 0..u64::MAX / 2) {
        let gen = generator(BoundaryLimits::default(), seed);
        let cases: Vec<_> = Partition::all().map(|p| gen.generate(p)).collect();

        let tokens: HashSet<_> = cases.iter().map(|c| c.token).collect();
        let names: HashSet<_> = cases.iter().map(|c| c.name.as_str()).collect();
        let emails: HashSet<_> = cases.iter().map(|c| c.email.as_str()).collect();
        let comments: HashSet<_> = cases.iter().map(|c| c.comment.as_str()).collect();

        prop_assert_eq!(tokens.len(), cases.len());
        prop_assert_eq!(names.len(), cases.len());
        prop_assert_eq!(emails.len(), cases.len());
        prop_assert_eq!(comments.len(), cases.len());
    }
}

/// GIVEN: the wall-clock token source
/// WHEN: generating two full runs back to back
/// THEN: no token repeats across the runs
#[test]
fn clock_tokens_never_repeat_across_runs() {
    let gen = CaseGenerator::new(BoundaryLimits::default(), Arc::new(ClockTokenSource::new()));
    let tokens: Vec<_> = Partition::all()
        .chain(Partition::all())
        .map(|p| gen.generate(p).token)
        .collect();
    let unique: HashSet<_> = tokens.iter().collect();
    assert_eq!(unique.len(), tokens.len());
}

/// GIVEN: the documented limits
/// WHEN: checking every length expectation
/// THEN: the case for that partition overshoots the right field by one
#[test]
fn length_partitions_overshoot_their_own_field() {
    let limits = BoundaryLimits::default();
    let gen = generator(limits, 1);
    for partition in Partition::all() {
        if let Expectation::LengthRejected { field } = partition.expectation() {
            let case = gen.generate(partition);
            let value = case.value(field.form_field()).unwrap_or_default();
            assert_eq!(char_len(value), limits.limit(field) + 1, "{partition}");
        }
    }
    assert_eq!(limits.limit(LimitedField::Email) + 1, 101);
}
