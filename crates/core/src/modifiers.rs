//! Modifier accumulation: built-in baselines plus user-declared buffs.
//!
//! Buffs are purely additive per stat. Sources are structured keys so a
//! declared line can be matched against a baseline entry without relying on
//! exact spelling.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::catalog::StatKind;

/// Where a modifier comes from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModifierSource {
    /// The stat's intrinsic starting value.
    Base,
    /// Any other source, keyed by its normalized name.
    Named(String),
}

impl ModifierSource {
    /// Case-insensitive, whitespace-collapsed reading of a source name.
    pub fn parse(name: &str) -> Self {
        let key = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if key == "base" {
            ModifierSource::Base
        } else {
            ModifierSource::Named(key)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    pub stat: StatKind,
    pub source: ModifierSource,
    pub value: Decimal,
}

// ──────────────────────────────────────────────
// Baseline table
// ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BaselineTable {
    entries: Vec<Modifier>,
}

impl BaselineTable {
    /// Values every cookie starts with.
    pub fn builtin() -> Self {
        let base = |stat, value: i64| Modifier {
            stat,
            source: ModifierSource::Base,
            value: Decimal::from(value),
        };
        BaselineTable {
            entries: vec![
                base(StatKind::Atk, 100),
                base(StatKind::Crit, 5),
                base(StatKind::CritDmg, 150),
                base(StatKind::Hp, 100),
            ],
        }
    }

    pub fn new(entries: Vec<Modifier>) -> Self {
        BaselineTable { entries }
    }

    pub fn entries(&self) -> &[Modifier] {
        &self.entries
    }

    /// Whether a declared line for `stat` from `source` restates a baseline.
    pub fn covers(&self, stat: StatKind, source: &ModifierSource) -> bool {
        self.entries
            .iter()
            .any(|m| m.stat == stat && &m.source == source)
    }
}

impl Default for BaselineTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ──────────────────────────────────────────────
// Accumulated vector
// ──────────────────────────────────────────────

/// Per-stat additive totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers(BTreeMap<StatKind, Decimal>);

impl Modifiers {
    pub fn get(&self, stat: StatKind) -> Decimal {
        self.0.get(&stat).copied().unwrap_or(Decimal::ZERO)
    }

    /// Saturates at the decimal limits instead of overflowing.
    pub fn add(&mut self, stat: StatKind, value: Decimal) {
        let total = self.0.entry(stat).or_insert(Decimal::ZERO);
        *total = total.saturating_add(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKind, Decimal)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// A copy with `deltas` added on top; `self` is untouched.
    pub fn with_overrides(&self, deltas: &BTreeMap<StatKind, Decimal>) -> Modifiers {
        let mut copy = self.clone();
        for (stat, delta) in deltas {
            copy.add(*stat, *delta);
        }
        copy
    }
}

impl Serialize for Modifiers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k.name(), v.to_string())))
    }
}

/// Baseline sum plus declared sum for every stat present in either.
pub fn accumulate(baseline: &BaselineTable, declared: &[Modifier]) -> Modifiers {
    let mut mods = Modifiers::default();
    for m in baseline.entries().iter().chain(declared) {
        mods.add(m.stat, m.value);
    }
    mods
}
