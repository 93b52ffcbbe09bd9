//! # gsa-core: Grid Security-Analysis Data Model
//!
//! Fundamental data structures shared by the security-analysis engine:
//! buses, branches, topology snapshots, outage command sets, units,
//! errors, and the ordered analysis log.
//!
//! ## Design Philosophy
//!
//! The topology is owned by the calling application layer (editor,
//! importer) and handed to the engine as plain slices of [`Bus`] and
//! [`Branch`] records. Each analysis pass begins by deriving an immutable
//! [`Snapshot`]: buses sorted ascending by external id, with the resulting
//! ordinal position serving as the dense matrix index. The bus at ordinal
//! 0 is the slack (reference) bus: its angle is fixed at zero and the
//! reduced-matrix formulation lets it absorb any system imbalance. This
//! ordering is a design invariant, not a user choice: relabeling which bus
//! sorts first shifts absolute angles but leaves physical flows unchanged.
//!
//! Deriving the index map fresh per pass (rather than caching it on the
//! mutable topology) rules out the staleness bugs that come with
//! edit-during-analysis interleavings; the surrounding application only
//! has to guarantee that no partially-written topology is ever visible to
//! a pass.
//!
//! ## Modules
//!
//! - [`units`] - Newtype wrappers for MW, Mvar, MVA, per-unit, radians
//! - [`error`] - Unified [`GsaError`] / [`GsaResult`]
//! - [`log`] - Ordered, append-only analysis narration
//! - [`outage`] - Outage command sets and the token grammar
//! - [`islands`] - Connectivity/island queries over a snapshot

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod error;
pub mod islands;
pub mod log;
pub mod outage;
pub mod units;

pub use error::{GsaError, GsaResult};
pub use islands::{is_connected, island_count};
pub use log::{AnalysisLog, LogEntry, Severity};
pub use outage::OutageSet;
pub use units::{Megavars, MegavoltAmperes, Megawatts, PerUnit, Radians};

/// System base power used to normalize injections, in MVA.
pub const DEFAULT_BASE_POWER: MegavoltAmperes = MegavoltAmperes(100.0);

/// External bus identifier: unique, arbitrary, not necessarily contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(usize);

impl BusId {
    #[inline]
    pub fn new(value: usize) -> Self {
        BusId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for BusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Informational bus category; the DC solver treats all buses uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BusKind {
    Generator,
    #[default]
    Load,
}

/// A network bus with its co-located generation and load.
#[derive(Debug, Clone)]
pub struct Bus {
    pub id: BusId,
    /// Category tag, informational only
    pub kind: BusKind,
    /// Scheduled voltage magnitude, clamped to [0.5, 1.5] pu at
    /// construction; unused by DC flow but retained for completeness
    pub voltage_schedule: PerUnit,
    /// Scheduled active generation
    pub generation: Megawatts,
    /// Active load
    pub load: Megawatts,
    /// Reactive load, unused by DC flow
    pub reactive_load: Megavars,
    /// Maximum generation capacity (redispatch cap)
    pub max_generation: Megawatts,
    /// Redispatch participation weight, must be non-negative
    pub participation: f64,
    /// Generator in-service flag
    pub gen_in_service: bool,
}

impl Bus {
    /// Create a bus with no generation or load attached.
    pub fn new(id: BusId) -> Self {
        Self {
            id,
            kind: BusKind::Load,
            voltage_schedule: PerUnit::ONE,
            generation: Megawatts(0.0),
            load: Megawatts(0.0),
            reactive_load: Megavars(0.0),
            max_generation: Megawatts(1000.0),
            participation: 1.0,
            gen_in_service: true,
        }
    }

    /// Attach scheduled generation and its capacity cap.
    pub fn with_generation(mut self, generation: f64, max_generation: f64) -> Self {
        self.kind = BusKind::Generator;
        self.generation = Megawatts(generation);
        self.max_generation = Megawatts(max_generation);
        self
    }

    /// Attach active and reactive load.
    pub fn with_load(mut self, active: f64, reactive: f64) -> Self {
        self.load = Megawatts(active);
        self.reactive_load = Megavars(reactive);
        self
    }

    /// Set the redispatch participation weight (clamped to ≥ 0).
    pub fn with_participation(mut self, weight: f64) -> Self {
        self.participation = weight.max(0.0);
        self
    }

    /// Set the scheduled voltage magnitude (clamped to [0.5, 1.5] pu).
    pub fn with_voltage_schedule(mut self, pu: f64) -> Self {
        self.voltage_schedule = PerUnit(pu.clamp(0.5, 1.5));
        self
    }
}

/// A transmission branch between two buses.
///
/// The (from, to) declaration order fixes the flow-sign convention: a
/// positive flow runs from `from_bus` toward `to_bus`. The derived name
/// `"{from}-{to}"` is the stable key outage commands address the branch
/// by; it is computed once at construction and treated as opaque when
/// matching.
#[derive(Debug, Clone)]
pub struct Branch {
    pub from_bus: BusId,
    pub to_bus: BusId,
    /// Series resistance in pu, informational (DC flow ignores it)
    pub resistance: f64,
    /// Series reactance in pu; must be positive, validated upstream
    pub reactance: f64,
    /// Shunt susceptance in pu, informational
    pub shunt_susceptance: f64,
    /// Thermal limit; 0 means unconstrained
    pub limit: Megawatts,
    /// Operational status flag
    pub in_service: bool,
    name: String,
}

impl Branch {
    /// Create an in-service branch with the given series reactance.
    pub fn new(from_bus: BusId, to_bus: BusId, reactance: f64) -> Self {
        Self {
            from_bus,
            to_bus,
            resistance: 0.0,
            reactance,
            shunt_susceptance: 0.0,
            limit: Megawatts(0.0),
            in_service: true,
            name: format!("{}-{}", from_bus.value(), to_bus.value()),
        }
    }

    /// Attach a thermal limit in MW (0 = unconstrained).
    pub fn with_limit(mut self, limit_mw: f64) -> Self {
        self.limit = Megawatts(limit_mw);
        self
    }

    /// Set the series resistance in pu (clamped to ≥ 0).
    pub fn with_resistance(mut self, resistance: f64) -> Self {
        self.resistance = resistance.max(0.0);
        self
    }

    /// Set the shunt susceptance in pu.
    pub fn with_shunt_susceptance(mut self, b: f64) -> Self {
        self.shunt_susceptance = b;
        self
    }

    /// Mark the branch out of service.
    pub fn out_of_service(mut self) -> Self {
        self.in_service = false;
        self
    }

    /// The stable `"from-to"` display/outage key.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Immutable per-analysis view of the topology.
///
/// Owns a sorted copy of the buses plus the id→ordinal index map, both
/// derived fresh when the snapshot is built. Branches keep their declared
/// order; all per-branch result vectors are indexed parallel to it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    buses: Vec<Bus>,
    branches: Vec<Branch>,
    index: HashMap<BusId, usize>,
    base_power: MegavoltAmperes,
}

impl Snapshot {
    /// Build a snapshot with the default 100 MVA system base.
    pub fn new(buses: &[Bus], branches: &[Branch]) -> Self {
        Self::with_base_power(buses, branches, DEFAULT_BASE_POWER)
    }

    /// Build a snapshot with an explicit system base power.
    ///
    /// Buses are sorted ascending by id; on duplicate ids the last record
    /// wins, matching last-write semantics of an editing surface.
    pub fn with_base_power(
        buses: &[Bus],
        branches: &[Branch],
        base_power: MegavoltAmperes,
    ) -> Self {
        let mut by_id: HashMap<BusId, Bus> = HashMap::with_capacity(buses.len());
        for bus in buses {
            by_id.insert(bus.id, bus.clone());
        }
        let mut sorted: Vec<Bus> = by_id.into_values().collect();
        sorted.sort_by_key(|b| b.id);

        let index = sorted
            .iter()
            .enumerate()
            .map(|(ordinal, bus)| (bus.id, ordinal))
            .collect();

        Self {
            buses: sorted,
            branches: branches.to_vec(),
            index,
            base_power,
        }
    }

    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Buses in ordinal (matrix index) order; ordinal 0 is the slack.
    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    /// Branches in declared order.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Matrix ordinal of an external bus id, if present.
    pub fn ordinal(&self, id: BusId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Both branch endpoints resolved to ordinals, if present.
    pub fn endpoints(&self, branch: &Branch) -> Option<(usize, usize)> {
        Some((self.ordinal(branch.from_bus)?, self.ordinal(branch.to_bus)?))
    }

    pub fn base_power(&self) -> MegavoltAmperes {
        self.base_power
    }
}
