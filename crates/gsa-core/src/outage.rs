//! Outage command sets: which elements are forced out for a scenario.
//!
//! Three disjoint sets address the three outage kinds: branches by their
//! derived `"from-to"` name, tripped generators and shed loads by bus id.
//! The set is an opaque immutable input to the engine; branch names are
//! matched as whole strings, never re-parsed into endpoint pairs.

use crate::BusId;
use serde::Serialize;
use std::collections::HashSet;

/// A scenario's forced outages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutageSet {
    /// Branch names (`"from-to"`) forced out of service
    pub branches: HashSet<String>,
    /// Bus ids whose generators are tripped
    pub generators: HashSet<BusId>,
    /// Bus ids whose loads are shed
    pub loads: HashSet<BusId>,
}

impl OutageSet {
    /// Empty outage set (the base case)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty() && self.generators.is_empty() && self.loads.is_empty()
    }

    /// True if the named branch is forced out in this scenario.
    pub fn branch_out(&self, name: &str) -> bool {
        self.branches.contains(name)
    }

    /// True if the generator at `bus` is tripped in this scenario.
    pub fn generator_tripped(&self, bus: BusId) -> bool {
        self.generators.contains(&bus)
    }

    /// True if the load at `bus` is shed in this scenario.
    pub fn load_shed(&self, bus: BusId) -> bool {
        self.loads.contains(&bus)
    }

    /// Parse a comma-separated outage command list.
    ///
    /// Token grammar (whitespace ignored):
    /// - `l<name>`: branch outage by derived name, e.g. `l1-4`
    /// - `g<digits>`: generator trip by bus id, e.g. `g2`
    /// - `c<digits>`: load shed by bus id, e.g. `c3`
    /// - a bare token containing `-`: branch outage, e.g. `1-4`
    ///
    /// Malformed numeric tokens are dropped without error; the command box
    /// is live-edited and partial input must never poison a scenario.
    pub fn parse(commands: &str) -> Self {
        let mut set = OutageSet::new();
        let cleaned: String = commands.chars().filter(|c| !c.is_whitespace()).collect();
        for token in cleaned.split(',') {
            if token.is_empty() {
                continue;
            }
            if let Some(rest) = token.strip_prefix('l') {
                set.branches.insert(rest.to_string());
            } else if let Some(rest) = token.strip_prefix('g') {
                if let Ok(id) = rest.parse::<usize>() {
                    set.generators.insert(BusId::new(id));
                }
            } else if let Some(rest) = token.strip_prefix('c') {
                if let Ok(id) = rest.parse::<usize>() {
                    set.loads.insert(BusId::new(id));
                }
            } else if token.contains('-') {
                set.branches.insert(token.to_string());
            }
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_commands() {
        let set = OutageSet::parse("l1-4, g2, c3");
        assert!(set.branch_out("1-4"));
        assert!(set.generator_tripped(BusId::new(2)));
        assert!(set.load_shed(BusId::new(3)));
    }

    #[test]
    fn test_parse_bare_branch_name() {
        let set = OutageSet::parse("2-5");
        assert!(set.branch_out("2-5"));
        assert!(set.generators.is_empty());
    }

    #[test]
    fn test_parse_drops_malformed_numeric_tokens() {
        let set = OutageSet::parse("gx, c, g1.5, g7");
        assert_eq!(set.generators.len(), 1);
        assert!(set.generator_tripped(BusId::new(7)));
        assert!(set.loads.is_empty());
    }

    #[test]
    fn test_parse_ignores_empty_tokens_and_whitespace() {
        let set = OutageSet::parse("  l1-2 ,, g 4 ,");
        assert!(set.branch_out("1-2"));
        assert!(set.generator_tripped(BusId::new(4)));
        assert_eq!(set.branches.len(), 1);
    }

    #[test]
    fn test_empty_set() {
        assert!(OutageSet::parse("").is_empty());
        assert!(!OutageSet::parse("g1").is_empty());
    }
}
