//! Cascading-overload propagation simulator.
//!
//! A small state machine over the outage set: solve, trip every line
//! carrying more than its thermal limit, repeat. Each non-terminal round
//! strictly grows the outage set, so the loop ends in at most one round
//! per line. Terminal states are a stable operating point or a network
//! collapse (the solve goes singular because the trips islanded the
//! grid).
//!
//! Trips are simultaneous within a round: every overloaded line opens at
//! once, modelling instantaneous protective action with no selectivity.

use crate::dc::{self, SolveResult};
use gsa_core::{island_count, AnalysisLog, GsaError, GsaResult, OutageSet, Snapshot};
use tracing::debug;

/// Terminal state of a cascade run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// Flows settled within all limits
    Stable,
    /// Protective trips islanded the network
    Collapsed,
}

/// Result of a full cascade simulation.
#[derive(Debug)]
pub struct CascadeResult {
    pub outcome: CascadeOutcome,
    /// Converged solve of the final stable state; `None` on collapse
    pub result: Option<SolveResult>,
    /// Final outage state: the declared outages plus every simulator trip
    pub outages: OutageSet,
    /// Lines tripped by the simulator, in trip order
    pub tripped: Vec<String>,
    /// Solve rounds executed
    pub rounds: usize,
}

/// Run the cascade from a declared outage state.
///
/// An empty outage set short-circuits to a single base-case solve with no
/// propagation loop. Singular solves become [`CascadeOutcome::Collapsed`]
/// with an island-count diagnostic; any other solver error propagates.
pub fn simulate(
    snapshot: &Snapshot,
    declared: &OutageSet,
    log: &mut AnalysisLog,
) -> GsaResult<CascadeResult> {
    let mut outages = declared.clone();
    let mut tripped: Vec<String> = Vec::new();

    if declared.is_empty() {
        return match dc::solve(snapshot, &outages) {
            Ok(result) => {
                log.info("No outages declared: system in normal static operation.");
                Ok(CascadeResult {
                    outcome: CascadeOutcome::Stable,
                    result: Some(result),
                    outages,
                    tripped,
                    rounds: 1,
                })
            }
            Err(err) => collapse(snapshot, err, outages, tripped, 1, log),
        };
    }

    log.info("Starting cascading-failure propagation analysis...");

    let mut round = 0;
    loop {
        round += 1;
        let result = match dc::solve(snapshot, &outages) {
            Ok(result) => result,
            Err(err) => return collapse(snapshot, err, outages, tripped, round, log),
        };

        let mut overloaded: Vec<usize> = Vec::new();
        for (i, branch) in snapshot.branches().iter().enumerate() {
            if !branch.in_service || outages.branch_out(branch.name()) {
                continue;
            }
            let limit = branch.limit.value();
            if limit > 0.0 && result.flows_mw[i].abs() > limit {
                overloaded.push(i);
            }
        }

        if overloaded.is_empty() {
            if round > 1 {
                log.info(format!(
                    "System reached a stable equilibrium after {} rounds of cascading outages.",
                    round
                ));
            }
            debug!(rounds = round, tripped = tripped.len(), "cascade stable");
            return Ok(CascadeResult {
                outcome: CascadeOutcome::Stable,
                result: Some(result),
                outages,
                tripped,
                rounds: round,
            });
        }

        for &i in &overloaded {
            let branch = &snapshot.branches()[i];
            log.warning(format!(
                "Iteration {}: line {} overloaded at {:.2} MW (limit {:.2} MW), tripped.",
                round,
                branch.name(),
                result.flows_mw[i].abs(),
                branch.limit.value()
            ));
            outages.branches.insert(branch.name().to_string());
            tripped.push(branch.name().to_string());
        }
    }
}

fn collapse(
    snapshot: &Snapshot,
    err: GsaError,
    outages: OutageSet,
    tripped: Vec<String>,
    rounds: usize,
    log: &mut AnalysisLog,
) -> GsaResult<CascadeResult> {
    if !err.is_singular() {
        return Err(err);
    }
    let islands = island_count(snapshot, &outages);
    log.error(format!(
        "Network collapse: the outage state splits the grid into {} electrical islands.",
        islands
    ));
    debug!(rounds, islands, "cascade collapsed");
    Ok(CascadeResult {
        outcome: CascadeOutcome::Collapsed,
        result: None,
        outages,
        tripped,
        rounds,
    })
}
