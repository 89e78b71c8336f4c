//! The comment-form suite: generate, submit and judge every partition in order.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use wpharness_core::{judge, CaseGenerator, Classification, Partition, VerdictStatus};

use crate::driver::Submitter;

/// Outcome of one case, including cases the harness could not submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    pub case_id: String,
    pub partition: Partition,
    pub title: String,
    /// `None` when the submission itself failed.
    pub classification: Option<Classification>,
    pub status: VerdictStatus,
    pub duration_ms: u64,
    pub url: Option<String>,
}

/// Verdict counts over a suite's cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteTotals {
    pub passed: usize,
    pub noted: usize,
    pub failed: usize,
}

impl SuiteTotals {
    fn tally(cases: &[CaseReport]) -> Self {
        cases.iter().fold(Self::default(), |mut totals, case| {
            match case.status {
                VerdictStatus::Pass => totals.passed += 1,
                VerdictStatus::PassWithNote(_) => totals.noted += 1,
                VerdictStatus::Fail(_) => totals.failed += 1,
            }
            totals
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    #[serde(flatten)]
    pub totals: SuiteTotals,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    #[must_use]
    pub fn new(started_at: DateTime<Utc>, cases: Vec<CaseReport>) -> Self {
        Self {
            started_at,
            totals: SuiteTotals::tally(&cases),
            cases,
        }
    }

    #[must_use]
    pub const fn passed(&self) -> usize {
        self.totals.passed
    }

    #[must_use]
    pub const fn noted(&self) -> usize {
        self.totals.noted
    }

    #[must_use]
    pub const fn failed(&self) -> usize {
        self.totals.failed
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.totals.failed == 0
    }
}

pub struct CommentSuite<D> {
    driver: D,
    generator: CaseGenerator,
    post_id: u64,
    partitions: Vec<Partition>,
}

impl<D: Submitter> CommentSuite<D> {
    /// A suite over every partition, in case-id order.
    pub fn new(driver: D, generator: CaseGenerator, post_id: u64) -> Self {
        Self {
            driver,
            generator,
            post_id,
            partitions: Partition::all().collect(),
        }
    }

    /// Restrict the run to `partitions`, keeping suite order.
    #[must_use]
    pub fn only(mut self, partitions: &[Partition]) -> Self {
        self.partitions.retain(|p| partitions.contains(p));
        self
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Run every selected case once. Submission errors fail that case only.
    pub async fn run(&mut self) -> SuiteReport {
        let started_at = Utc::now();
        let mut cases = Vec::with_capacity(self.partitions.len());

        for &partition in &self.partitions {
            let case = self.generator.generate(partition);
            let case_id = partition.case_id();
            info!(case_id = %case_id, title = partition.title(), "Running case");
            let start = Instant::now();

            let report = match self.driver.submit(&case).await {
                Ok(page) => {
                    let verdict = judge(&case, &page, self.post_id);
                    if let VerdictStatus::Fail(reason) = &verdict.status {
                        warn!(case_id = %case_id, reason = %reason, "Case failed");
                    }
                    CaseReport {
                        case_id,
                        partition,
                        title: partition.title().to_string(),
                        classification: Some(verdict.classification),
                        status: verdict.status,
                        duration_ms: elapsed_ms(start),
                        url: Some(page.url),
                    }
                }
                Err(e) => {
                    error!(case_id = %case_id, error = %e, "Submission failed");
                    CaseReport {
                        case_id,
                        partition,
                        title: partition.title().to_string(),
                        classification: None,
                        status: VerdictStatus::Fail(e.to_string()),
                        duration_ms: elapsed_ms(start),
                        url: None,
                    }
                }
            };
            cases.push(report);
        }

        let report = SuiteReport::new(started_at, cases);
        info!(
            passed = report.passed(),
            noted = report.noted(),
            failed = report.failed(),
            "Comment suite finished"
        );
        report
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
