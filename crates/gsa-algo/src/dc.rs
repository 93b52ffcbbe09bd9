//! DC power-flow solver.
//!
//! The classic lossless linearization: branch flow is proportional to the
//! angle difference across the branch, `flow = (θi - θj) / x`, and bus
//! angles come from inverting the reduced susceptance matrix. One solve
//! produces everything downstream consumers need: angles, flows, the
//! post-redispatch dispatch, and the GSF/LODF sensitivity matrices that
//! make contingency screening a matter of arithmetic instead of repeated
//! factorizations.

use crate::sensitivity;
use gsa_core::{GsaError, GsaResult, OutageSet, Snapshot};
use tracing::debug;

/// Effective series reactance used in all susceptance arithmetic.
///
/// Reactance is validated positive upstream; the floor only guards the
/// division against a pathological zero slipping through.
pub(crate) fn series_reactance(x: f64) -> f64 {
    x.abs().max(1e-6)
}

/// Complete output of one DC solve against a snapshot and outage state.
///
/// All per-bus vectors are indexed by bus ordinal, all per-branch vectors
/// by branch position in [`Snapshot::branches`].
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Full bus susceptance matrix (before slack reduction)
    pub b_matrix: Vec<Vec<f64>>,
    /// Inverse of the reduced susceptance matrix, embedded at full size
    /// with a zero slack row and column
    pub f_matrix: Vec<Vec<f64>>,
    /// Generation shift factors, branches x buses
    pub gsf: Vec<Vec<f64>>,
    /// Line outage distribution factors, branches x branches
    pub lodf: Vec<Vec<f64>>,
    /// Bus voltage angles in radians, slack fixed at zero
    pub angles_rad: Vec<f64>,
    /// Active flow per branch in MW (zero for outaged or dangling branches)
    pub flows_mw: Vec<f64>,
    /// Post-redispatch generation per bus in MW
    pub dispatch_mw: Vec<f64>,
}

impl SolveResult {
    /// Flow magnitude on the branch at `index`, in MW.
    pub fn flow_magnitude(&self, index: usize) -> f64 {
        self.flows_mw[index].abs()
    }
}

/// Run one DC power-flow solve.
///
/// Steps: assemble the susceptance matrix from every in-service,
/// non-outaged branch; invert the slack-reduced matrix; redispatch
/// generation to cover tripped units; compute angles, branch flows, and
/// the GSF/LODF sensitivities.
///
/// Returns [`GsaError::Singular`] when the outage state disconnects the
/// network; callers treat that as a collapse condition, not a failure.
pub fn solve(snapshot: &Snapshot, outages: &OutageSet) -> GsaResult<SolveResult> {
    let n = snapshot.bus_count();
    if n < 2 {
        return Err(GsaError::Topology(format!(
            "need at least 2 buses for DC power flow, have {}",
            n
        )));
    }

    let b_matrix = build_b_matrix(snapshot, outages);
    let f_matrix = invert_reduced(&b_matrix)?;

    let dispatch_mw = redispatch(snapshot, outages);
    let base = snapshot.base_power().value();

    // Net injections in per-unit, slack excluded
    let injections: Vec<f64> = snapshot
        .buses()
        .iter()
        .enumerate()
        .map(|(ordinal, bus)| {
            let load = if outages.load_shed(bus.id) {
                0.0
            } else {
                bus.load.value()
            };
            (dispatch_mw[ordinal] - load) / base
        })
        .collect();

    let mut angles_rad = vec![0.0; n];
    for i in 1..n {
        angles_rad[i] = (1..n).map(|j| f_matrix[i][j] * injections[j]).sum();
    }

    let flows_mw = branch_flows(snapshot, outages, &angles_rad);

    let gsf = sensitivity::gsf_matrix(snapshot, &f_matrix);
    let lodf = sensitivity::lodf_matrix(snapshot, &f_matrix);

    debug!(
        buses = n,
        branches = snapshot.branch_count(),
        "DC solve complete"
    );

    Ok(SolveResult {
        b_matrix,
        f_matrix,
        gsf,
        lodf,
        angles_rad,
        flows_mw,
        dispatch_mw,
    })
}

/// Assemble the full bus susceptance matrix.
///
/// Each in-service, non-outaged branch with both endpoints in the
/// snapshot contributes `b = 1/x` to the standard four positions.
/// Branches referencing unknown buses contribute nothing.
fn build_b_matrix(snapshot: &Snapshot, outages: &OutageSet) -> Vec<Vec<f64>> {
    let n = snapshot.bus_count();
    let mut b_matrix = vec![vec![0.0; n]; n];
    for branch in snapshot.branches() {
        if !branch.in_service || outages.branch_out(branch.name()) {
            continue;
        }
        if let Some((i, j)) = snapshot.endpoints(branch) {
            let b = 1.0 / series_reactance(branch.reactance);
            b_matrix[i][j] -= b;
            b_matrix[j][i] -= b;
            b_matrix[i][i] += b;
            b_matrix[j][j] += b;
        }
    }
    b_matrix
}

/// Invert the slack-reduced susceptance matrix and embed the result at
/// full size with zeros in the slack row and column.
fn invert_reduced(b_matrix: &[Vec<f64>]) -> GsaResult<Vec<Vec<f64>>> {
    let n = b_matrix.len();
    let m = n - 1;
    let mut reduced = vec![vec![0.0; m]; m];
    for i in 0..m {
        for j in 0..m {
            reduced[i][j] = b_matrix[i + 1][j + 1];
        }
    }

    let inverse = crate::linear::invert(&reduced)?;

    let mut f_matrix = vec![vec![0.0; n]; n];
    for i in 0..m {
        for j in 0..m {
            f_matrix[i + 1][j + 1] = inverse[i][j];
        }
    }
    Ok(f_matrix)
}

/// Effective generation per bus after covering tripped units.
///
/// Output lost to tripped generators is redistributed across the
/// surviving in-service units in proportion to their participation
/// weights, each capped at its own maximum. Headroom exhausted at one
/// unit is not re-offered to the others; any residual imbalance lands on
/// the slack, as the DC formulation allows.
fn redispatch(snapshot: &Snapshot, outages: &OutageSet) -> Vec<f64> {
    let buses = snapshot.buses();

    let mut lost_mw = 0.0;
    for bus in buses {
        if bus.gen_in_service && outages.generator_tripped(bus.id) {
            lost_mw += bus.generation.value();
        }
    }

    let survivor = |bus: &gsa_core::Bus| bus.gen_in_service && !outages.generator_tripped(bus.id);
    let total_participation: f64 = buses
        .iter()
        .filter(|b| survivor(b))
        .map(|b| b.participation)
        .sum();

    buses
        .iter()
        .map(|bus| {
            if !survivor(bus) {
                return 0.0;
            }
            let scheduled = bus.generation.value();
            if lost_mw > 0.0 && total_participation > 0.0 {
                let increment = lost_mw * bus.participation / total_participation;
                (scheduled + increment).min(bus.max_generation.value())
            } else {
                scheduled
            }
        })
        .collect()
}

/// MW flow per branch from the solved angles.
///
/// Outaged, out-of-service, and dangling branches carry exactly zero.
fn branch_flows(snapshot: &Snapshot, outages: &OutageSet, angles_rad: &[f64]) -> Vec<f64> {
    let base = snapshot.base_power().value();
    snapshot
        .branches()
        .iter()
        .map(|branch| {
            if !branch.in_service || outages.branch_out(branch.name()) {
                return 0.0;
            }
            match snapshot.endpoints(branch) {
                Some((i, j)) => {
                    (angles_rad[i] - angles_rad[j]) / series_reactance(branch.reactance) * base
                }
                None => 0.0,
            }
        })
        .collect()
}
