//! Full security-analysis pass: one entry point for callers that want
//! the whole pipeline rather than individual components.
//!
//! The pass runs in a fixed order, and the order of the narration it
//! appends to the log is part of the contract with the display layer:
//! state-estimation note, cascade messages (per-round overload warnings,
//! then the stability or collapse verdict), the N-1 vulnerability block,
//! and finally the pass/fail summary.

use crate::cascade::{self, CascadeOutcome, CascadeResult};
use crate::contingency::{self, ScreeningReport};
use crate::dc::{self, SolveResult};
use crate::estimation::{self, EstimationResult, EstimatorConfig};
use gsa_core::{AnalysisLog, GsaError, GsaResult, OutageSet, Snapshot};
use tracing::info;

/// Builder for a complete security-analysis pass.
pub struct SecurityAnalysis<'a> {
    snapshot: &'a Snapshot,
    outages: OutageSet,
    estimator: EstimatorConfig,
}

impl<'a> SecurityAnalysis<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            outages: OutageSet::new(),
            estimator: EstimatorConfig::default(),
        }
    }

    /// Declare the scenario's outage set.
    pub fn with_outages(mut self, outages: OutageSet) -> Self {
        self.outages = outages;
        self
    }

    /// Declare the scenario from a comma-separated command string.
    pub fn with_commands(mut self, commands: &str) -> Self {
        self.outages = OutageSet::parse(commands);
        self
    }

    /// Override the state-estimator configuration.
    pub fn with_estimator(mut self, config: EstimatorConfig) -> Self {
        self.estimator = config;
        self
    }

    /// Run the full pass: base solve, state estimation, cascade
    /// propagation, then N-1 screening against the converged state.
    ///
    /// Screening is skipped when the cascade collapses; the log then ends
    /// with the collapse diagnostic instead of an N-1 verdict.
    pub fn run(self) -> GsaResult<AnalysisReport> {
        if self.snapshot.bus_count() < 2 {
            return Err(GsaError::Topology(format!(
                "security analysis needs at least 2 buses, have {}",
                self.snapshot.bus_count()
            )));
        }

        let mut log = AnalysisLog::new();

        // Base case: the pristine system, before any declared outage
        let base = match dc::solve(self.snapshot, &OutageSet::new()) {
            Ok(result) => Some(result),
            Err(err) if err.is_singular() => {
                log.error("Base topology is not solvable: network is disconnected.");
                None
            }
            Err(err) => return Err(err),
        };

        let estimation = base.as_ref().map(|result| {
            log.info("State estimation reconciled telemetry against the base case.");
            estimation::estimate(self.snapshot, result, &OutageSet::new(), &self.estimator)
        });

        let cascade = cascade::simulate(self.snapshot, &self.outages, &mut log)?;

        let screening = match (&cascade.outcome, &cascade.result) {
            (CascadeOutcome::Stable, Some(current)) => Some(contingency::screen_n1(
                self.snapshot,
                current,
                &cascade.outages,
                &mut log,
            )),
            _ => None,
        };

        info!(
            outcome = ?cascade.outcome,
            rounds = cascade.rounds,
            findings = log.count(gsa_core::Severity::Warning),
            "security analysis complete"
        );

        Ok(AnalysisReport {
            base,
            estimation,
            cascade,
            screening,
            log,
        })
    }
}

/// Everything one pass produced.
#[derive(Debug)]
pub struct AnalysisReport {
    /// Pristine-system solve, `None` when the base topology is islanded
    pub base: Option<SolveResult>,
    /// Diagnostic state estimation over the base case
    pub estimation: Option<EstimationResult>,
    /// Cascade outcome, final outage state, and the converged solve
    pub cascade: CascadeResult,
    /// N-1 screening of the converged state, `None` on collapse
    pub screening: Option<ScreeningReport>,
    /// Ordered narration for display
    pub log: AnalysisLog,
}

impl AnalysisReport {
    /// The converged "current" solve, when one exists.
    pub fn current(&self) -> Option<&SolveResult> {
        self.cascade.result.as_ref()
    }

    /// True when the system is stable and passed the N-1 criterion.
    pub fn is_secure(&self) -> bool {
        self.cascade.outcome == CascadeOutcome::Stable
            && self.screening.as_ref().is_some_and(|s| s.passes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsa_core::{Branch, Bus, BusId};

    fn ring(limit: f64) -> Snapshot {
        let buses = vec![
            Bus::new(BusId::new(1)).with_generation(100.0, 200.0),
            Bus::new(BusId::new(2)),
            Bus::new(BusId::new(3)).with_load(100.0, 0.0),
        ];
        let branches = vec![
            Branch::new(BusId::new(1), BusId::new(2), 0.1).with_limit(limit),
            Branch::new(BusId::new(2), BusId::new(3), 0.1).with_limit(limit),
            Branch::new(BusId::new(3), BusId::new(1), 0.1).with_limit(limit),
        ];
        Snapshot::new(&buses, &branches)
    }

    #[test]
    fn test_unconstrained_system_is_secure() {
        let snapshot = ring(0.0);
        let report = SecurityAnalysis::new(&snapshot).run().unwrap();

        assert!(report.is_secure());
        assert!(report.base.is_some());
        assert!(report.estimation.is_some());
        assert!(report.current().is_some());
    }

    #[test]
    fn test_collapse_skips_screening() {
        // Tight limit on the long path: declared trip of 1-2 overloads it
        // and the follow-on trip islands bus 3
        let snapshot = ring(80.0);
        let report = SecurityAnalysis::new(&snapshot)
            .with_commands("l1-2")
            .run()
            .unwrap();

        assert_eq!(report.cascade.outcome, CascadeOutcome::Collapsed);
        assert!(report.screening.is_none());
        assert!(!report.is_secure());
        assert!(report
            .log
            .messages()
            .any(|m| m.contains("electrical islands")));
    }

    #[test]
    fn test_too_few_buses_rejected() {
        let buses = vec![Bus::new(BusId::new(1))];
        let snapshot = Snapshot::new(&buses, &[]);
        let err = SecurityAnalysis::new(&snapshot).run().unwrap_err();

        assert!(matches!(err, GsaError::Topology(_)));
    }

    #[test]
    fn test_log_ordering_contract() {
        let snapshot = ring(0.0);
        let report = SecurityAnalysis::new(&snapshot)
            .with_commands("l1-2")
            .run()
            .unwrap();

        let messages: Vec<&str> = report.log.messages().collect();
        let cascade_pos = messages
            .iter()
            .position(|m| m.contains("cascading-failure propagation"))
            .unwrap();
        let screening_pos = messages
            .iter()
            .position(|m| m.contains("N-1 contingency screening"))
            .unwrap();
        let verdict_pos = messages
            .iter()
            .position(|m| m.contains("N-1 security criterion"))
            .unwrap();

        assert!(cascade_pos < screening_pos);
        assert!(screening_pos < verdict_pos);
    }
}
