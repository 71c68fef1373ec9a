//! Item model: single toppings, five-topping sets, and set-bonus valuation.
//!
//! Toppings are produced by an external extraction pipeline and are only
//! read here. A [`ToppingSet`] borrows its members; sets are built per
//! candidate by the search and thrown away.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;

use crate::catalog::{Resonance, StatKind};
use crate::constraint::Equality;
use crate::error::ToppingError;

/// Most secondary stats a topping can carry.
pub const MAX_SECONDARY: usize = 4;

/// Number of toppings equipped on one cookie.
pub const SET_SIZE: usize = 5;

// ──────────────────────────────────────────────
// Topping
// ──────────────────────────────────────────────

/// One topping: a primary stat and up to four secondary rolls.
///
/// Not `PartialEq`: two toppings with identical rolls are different
/// inventory entries. Compare with [`Topping::same_instance`].
#[derive(Debug, Clone)]
pub struct Topping {
    flavor: StatKind,
    /// Primary first, then secondaries in roll order.
    substats: Vec<(StatKind, Decimal)>,
    resonance: Option<Resonance>,
}

impl Topping {
    pub fn new(
        primary: (StatKind, Decimal),
        secondary: Vec<(StatKind, Decimal)>,
        resonance: Option<Resonance>,
    ) -> Self {
        let mut substats = Vec::with_capacity(secondary.len() + 1);
        substats.push(primary);
        substats.extend(secondary);
        Topping {
            flavor: primary.0,
            substats,
            resonance,
        }
    }

    /// Primary stat; decides which set bonus the topping counts toward.
    pub fn flavor(&self) -> StatKind {
        self.flavor
    }

    pub fn primary(&self) -> (StatKind, Decimal) {
        self.substats[0]
    }

    pub fn secondary(&self) -> &[(StatKind, Decimal)] {
        &self.substats[1..]
    }

    pub fn resonance(&self) -> Option<Resonance> {
        self.resonance
    }

    /// Identity comparison.
    pub fn same_instance(&self, other: &Topping) -> bool {
        std::ptr::eq(self, other)
    }

    /// Contribution of this topping to the given stats.
    pub fn value(&self, stats: &[StatKind]) -> Decimal {
        self.substats
            .iter()
            .filter(|(stat, _)| stats.contains(stat))
            .map(|(_, value)| *value)
            .sum()
    }

    /// Check the roll against the catalog.
    pub fn validate(&self) -> Result<(), ToppingError> {
        let (flavor, value) = self.primary();
        let info = flavor
            .info()
            .ok_or(ToppingError::NotAToppingStat { stat: flavor })?;
        if value > info.value {
            return Err(ToppingError::PrimaryAboveCeiling {
                stat: flavor,
                value,
                ceiling: info.value,
            });
        }

        let secondary = self.secondary();
        if secondary.len() > MAX_SECONDARY {
            return Err(ToppingError::TooManySecondary {
                count: secondary.len(),
            });
        }

        for (idx, (stat, value)) in secondary.iter().enumerate() {
            if secondary[..idx].iter().any(|(seen, _)| seen == stat) {
                return Err(ToppingError::DuplicateSecondary { stat: *stat });
            }
            let info = stat
                .info()
                .ok_or(ToppingError::NotAToppingStat { stat: *stat })?;
            if *value < info.minsub || *value > info.maxsub {
                return Err(ToppingError::SecondaryOutOfRange {
                    stat: *stat,
                    value: *value,
                    min: info.minsub,
                    max: info.maxsub,
                });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl fmt::Display for Topping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let medium = self.flavor.info().map_or(self.flavor.name(), |i| i.medium);
        write!(f, "{} :", medium)?;
        for (idx, (stat, value)) in self.secondary().iter().enumerate() {
            let short = stat.info().map_or(stat.name(), |i| i.short);
            let sep = if idx == 0 { " " } else { ", " };
            write!(f, "{}{} - {}", sep, short, value)?;
        }
        Ok(())
    }
}

// ──────────────────────────────────────────────
// ToppingSet
// ──────────────────────────────────────────────

/// A full loadout of exactly five toppings.
#[derive(Debug, Clone, Copy)]
pub struct ToppingSet<'a> {
    toppings: [&'a Topping; SET_SIZE],
}

impl<'a> ToppingSet<'a> {
    pub fn new(toppings: [&'a Topping; SET_SIZE]) -> Self {
        ToppingSet { toppings }
    }

    /// Build from a slice; `None` unless it holds exactly five toppings.
    pub fn from_slice(toppings: &[&'a Topping]) -> Option<Self> {
        let toppings: [&'a Topping; SET_SIZE] = toppings.try_into().ok()?;
        Some(ToppingSet { toppings })
    }

    pub fn toppings(&self) -> &[&'a Topping] {
        &self.toppings
    }

    /// Summed rolls for `stat`, plus the tart when it targets the same stat.
    pub fn raw(&self, stat: StatKind, tart: Option<&Equality>) -> Decimal {
        let total: Decimal = self.toppings.iter().map(|t| t.value(&[stat])).sum();
        match tart {
            Some(tart) if tart.substat == stat => total + tart.target,
            _ => total,
        }
    }

    /// Richest satisfied set-bonus tier for `stat` as (count, bonus).
    pub fn set_effect(&self, stat: StatKind) -> (usize, Decimal) {
        let Some(info) = stat.info() else {
            return (0, Decimal::ZERO);
        };
        let matching = self.toppings.iter().filter(|t| t.flavor == stat).count();
        info.combos
            .iter()
            .rev()
            .find(|(required, _)| matching >= *required)
            .copied()
            .unwrap_or((0, Decimal::ZERO))
    }

    /// Raw value plus set bonus, summed over `stats`.
    pub fn value(&self, stats: &[StatKind], tart: Option<&Equality>) -> Decimal {
        stats
            .iter()
            .map(|stat| self.raw(*stat, tart) + self.set_effect(*stat).1)
            .sum()
    }
}

impl fmt::Display for ToppingSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            (StatKind::Atk, "ATK", StatKind::Def, "DEF"),
            (StatKind::Hp, "HP", StatKind::AtkSpd, "ATK SPD"),
            (StatKind::Crit, "CRIT%", StatKind::Cooldown, "CD"),
            (StatKind::DmgResist, "DMGRES", StatKind::CritResist, "CRITRES"),
            (StatKind::AmplifyBuff, "BUFF", StatKind::DebuffResist, "BUFFRES"),
        ];
        writeln!(f, "┌─────────────┬─────────────┐")?;
        for (left, left_label, right, right_label) in rows {
            writeln!(
                f,
                "│{:<8}{:>4}%│{:<8}{:>4}%│",
                left_label,
                self.raw(left, None).to_string(),
                right_label,
                self.raw(right, None).to_string(),
            )?;
        }
        write!(f, "└─────────────┴─────────────┘")
    }
}

// ──────────────────────────────────────────────
// Admissible set-bonus bound
// ──────────────────────────────────────────────

/// Upper bound on the set-bonus total any completion of `partial` can earn
/// over `stats`, with `free_slots` toppings still to be placed.
///
/// Each stat is assumed to receive every free slot. The result is the best
/// of: a 2-piece and a 3-piece bonus from two different stats, two 2-piece
/// bonuses from two different stats, or a single tier from one stat. It
/// never falls below the set-effect part of [`ToppingSet::value`] for any
/// completed set.
pub fn best_possible_set_effect(
    partial: &[&Topping],
    stats: &[StatKind],
    free_slots: usize,
) -> Decimal {
    // tier -> stat -> best bonus reachable at that tier
    let mut best: BTreeMap<usize, BTreeMap<StatKind, Decimal>> = BTreeMap::new();

    for stat in stats {
        let Some(info) = stat.info() else {
            continue;
        };
        let matching = partial.iter().filter(|t| t.flavor == *stat).count();
        let reachable = matching + free_slots;
        for (required, bonus) in info.combos {
            if *required <= reachable {
                let slot = best
                    .entry(*required)
                    .or_default()
                    .entry(*stat)
                    .or_insert(Decimal::ZERO);
                *slot = (*slot).max(*bonus);
            }
        }
    }

    let tier = |n: usize| best.get(&n).cloned().unwrap_or_default();
    let twos = tier(2);
    let threes = tier(3);

    let best_pair = |left: &BTreeMap<StatKind, Decimal>, right: &BTreeMap<StatKind, Decimal>| {
        let mut top = Decimal::ZERO;
        for (s_left, b_left) in left {
            for (s_right, b_right) in right {
                if s_left != s_right {
                    top = top.max(*b_left + *b_right);
                }
            }
        }
        top
    };

    let mut result = best_pair(&twos, &threes).max(best_pair(&twos, &twos));
    for tier_map in best.values() {
        if let Some(top) = tier_map.values().max() {
            result = result.max(*top);
        }
    }
    result
}
