//! # wpharness-core
//!
//! Boundary-value oracle for the WordPress comment form.
//!
//! Everything here is pure decision logic:
//!
//! - [`CaseGenerator`] builds one [`TestCase`] per [`Partition`]
//! - [`classify`] maps a [`PageState`] to an [`OutcomeClass`] through an
//!   ordered rule list, first match wins
//! - [`judge`] turns a classification into a [`Verdict`] for the partition's
//!   [`Expectation`]
//!
//! Browsers, HTTP and the suite runner live in the `scenarios` crate.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` / `expect()` / `panic!()` outside tests
//! - No `unsafe`

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod case;
pub mod classifier;
pub mod config;
mod error;
pub mod limits;
pub mod oracle;
pub mod page;
pub mod partition;
pub mod token;

pub use case::{CaseGenerator, TestCase};
pub use classifier::{classify, Classification, Disposition, OutcomeClass, RuleId};
pub use config::{load_config, Config, DriverKind};
pub use error::{Error, Result};
pub use limits::{BoundaryLimits, FormField, LimitedField};
pub use oracle::{judge, Evidence, Verdict, VerdictStatus};
pub use page::{NativeValidity, PageSignals, PageState};
pub use partition::{Constraint, Expectation, Partition};
pub use token::{ClockTokenSource, SequenceTokenSource, TokenSource, UniquenessToken};
