//! Linear sensitivity factors derived from the reduced-inverse matrix.
//!
//! Generation shift factors (GSF) and line outage distribution factors
//! (LODF) let the screener evaluate every single-element contingency with
//! plain arithmetic on the base-case solve, never re-factorizing.
//!
//! Both matrices are computed over the full declared branch list, in
//! branch order, so their rows line up with every other per-branch vector
//! in a solve result.

use crate::dc::series_reactance;
use gsa_core::Snapshot;

/// Denominator magnitude below which a branch outage is degenerate: the
/// branch is radial (or effectively so) and tripping it islands the
/// network, so no redistribution factor is meaningful.
const DEGENERATE_EPS: f64 = 1e-6;

/// Generation shift factors, one row per branch, one column per bus.
///
/// `gsf[l][n]` is the MW flow change on branch `l` per MW injected at the
/// bus with ordinal `n` (withdrawn at the slack):
///
/// ```text
/// GSF[l,n] = (F[i,n] - F[j,n]) / x_l
/// ```
///
/// Branches referencing unknown buses get a zero row.
pub fn gsf_matrix(snapshot: &Snapshot, f_matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = snapshot.bus_count();
    snapshot
        .branches()
        .iter()
        .map(|branch| match snapshot.endpoints(branch) {
            Some((i, j)) => {
                let x = series_reactance(branch.reactance);
                (0..n)
                    .map(|bus| (f_matrix[i][bus] - f_matrix[j][bus]) / x)
                    .collect()
            }
            None => vec![0.0; n],
        })
        .collect()
}

/// Line outage distribution factors, branches x branches.
///
/// `lodf[k][l]` is the fraction of branch `l`'s pre-outage flow that
/// shifts onto branch `k` when `l` trips. The diagonal is -1: a tripped
/// branch sheds its own flow entirely. A column whose denominator
/// magnitude falls below `1e-6` is degenerate (the outage islands the
/// network) and is left entirely zero, diagonal included, so superposed
/// estimates never amplify through it.
pub fn lodf_matrix(snapshot: &Snapshot, f_matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let branches = snapshot.branches();
    let count = branches.len();
    let mut lodf = vec![vec![0.0; count]; count];

    for (l, outaged) in branches.iter().enumerate() {
        let (i, m) = match snapshot.endpoints(outaged) {
            Some(pair) => pair,
            None => continue,
        };
        let x_l = series_reactance(outaged.reactance);
        let denom = x_l - (f_matrix[i][i] + f_matrix[m][m] - 2.0 * f_matrix[i][m]);
        if denom.abs() <= DEGENERATE_EPS {
            continue;
        }

        for (k, monitored) in branches.iter().enumerate() {
            if k == l {
                lodf[k][l] = -1.0;
                continue;
            }
            let (v, w) = match snapshot.endpoints(monitored) {
                Some(pair) => pair,
                None => continue,
            };
            let x_k = series_reactance(monitored.reactance);
            let numer =
                (f_matrix[v][i] - f_matrix[v][m]) - (f_matrix[w][i] - f_matrix[w][m]);
            lodf[k][l] = (x_l / x_k) * numer / denom;
        }
    }

    lodf
}
