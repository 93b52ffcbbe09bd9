//! # gsa-algo: Grid Security-Analysis Algorithms
//!
//! The analytical engine behind the security-analysis pipeline: DC
//! power-flow solving, linear sensitivity factors, preventive N-1
//! contingency screening, cascading-failure simulation, and WLS state
//! estimation over synthetic telemetry.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | DC solve | [`dc`] | angles, flows, B/F matrices, dispatch |
//! | Sensitivities | [`sensitivity`] | GSF and LODF matrices |
//! | Cascade | [`cascade`] | stable/collapsed verdict, final outage state |
//! | N-1 screen | [`contingency`] | worst-case flows, vulnerability list |
//! | Estimation | [`estimation`] | measured vs. filtered flow series |
//!
//! Every stage downstream of the solver works by superposition on one
//! solve's matrices; only the cascade re-invokes the solver, once per
//! round. All computation is single-threaded, synchronous, and pure with
//! respect to the snapshot.
//!
//! ## Example
//!
//! ```ignore
//! use gsa_algo::SecurityAnalysis;
//! use gsa_core::Snapshot;
//!
//! let snapshot = Snapshot::new(&buses, &branches);
//! let report = SecurityAnalysis::new(&snapshot)
//!     .with_commands("l1-4, g2")
//!     .run()?;
//!
//! for message in report.log.messages() {
//!     println!("{message}");
//! }
//! ```

pub mod analysis;
pub mod cascade;
pub mod contingency;
pub mod dc;
pub mod estimation;
pub mod linear;
pub mod sensitivity;

pub use analysis::{AnalysisReport, SecurityAnalysis};
pub use cascade::{CascadeOutcome, CascadeResult};
pub use contingency::{Contingency, ScreeningReport, Vulnerability};
pub use dc::SolveResult;
pub use estimation::{EstimationResult, EstimatorConfig};
