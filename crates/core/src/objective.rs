//! Objective language: what the search maximizes for a cookie.
//!
//! A clause is a mapping with a required `max` key. `Combo` needs a
//! `substats` list; `E[DMG]` and `Vitality` accept per-stat override keys
//! that are added to a private copy of the cookie's modifiers.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_yaml_ng::Value;

use crate::catalog::{StatKind, ELEMENTAL_DMG};
use crate::constraint::Equality;
use crate::document::yaml_decimal;
use crate::error::CompileError;
use crate::modifiers::Modifiers;
use crate::topping::ToppingSet;

const EXPECTED_DAMAGE_STATS: [StatKind; 2] = [StatKind::Atk, StatKind::Crit];

const VITALITY_STATS: [StatKind; 4] = [
    StatKind::Hp,
    StatKind::Def,
    StatKind::DmgResist,
    StatKind::Crit,
];

/// Damage reduction is capped below 100% so the vitality quotient stays finite.
const DMG_RESIST_CAP: Decimal = Decimal::from_parts(99, 0, 0, false, 2);

// ──────────────────────────────────────────────
// Special objective payload
// ──────────────────────────────────────────────

/// Domain of a stat's topping-derived magnitude, as a fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatBounds {
    pub min: Decimal,
    pub max: Decimal,
}

impl StatBounds {
    fn clamp(&self, value: Decimal) -> Decimal {
        value.min(self.max).max(self.min)
    }
}

/// Shared state of the expected-value objectives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Special {
    mods: Modifiers,
    bounds: BTreeMap<StatKind, StatBounds>,
}

impl Special {
    fn new(mods: Modifiers) -> Self {
        let mut bounds = BTreeMap::new();
        bounds.insert(
            StatKind::Crit,
            StatBounds {
                min: Decimal::ZERO,
                max: Decimal::ONE,
            },
        );
        Special { mods, bounds }
    }

    /// Modifier copy including the clause's overrides.
    pub fn mods(&self) -> &Modifiers {
        &self.mods
    }

    pub fn bounds(&self) -> &BTreeMap<StatKind, StatBounds> {
        &self.bounds
    }

    /// Record a `>=` requirement of `target` percent.
    pub fn tighten_floor(&mut self, stat: StatKind, target: Decimal) {
        if let Some(b) = self.bounds.get_mut(&stat) {
            b.min = b.min.min(target / Decimal::ONE_HUNDRED);
        }
    }

    /// Record a non-zero `<=` requirement of `target` percent.
    pub fn tighten_ceiling(&mut self, stat: StatKind, target: Decimal) {
        if let Some(b) = self.bounds.get_mut(&stat) {
            b.max = b.max.min(target / Decimal::ONE_HUNDRED);
        }
    }

    fn fraction(&self, stat: StatKind, set: &ToppingSet<'_>, tart: Option<&Equality>) -> Decimal {
        (self.mods.get(stat) + set.value(&[stat], tart)) / Decimal::ONE_HUNDRED
    }

    /// Expected crit multiplier, `1 + p * (crit_dmg - 1)`.
    fn crit_factor(&self, set: &ToppingSet<'_>, tart: Option<&Equality>) -> Decimal {
        let from_set = set.value(&[StatKind::Crit], tart) / Decimal::ONE_HUNDRED;
        let from_set = match self.bounds.get(&StatKind::Crit) {
            Some(b) => b.clamp(from_set),
            None => from_set,
        };
        let chance = (self.mods.get(StatKind::Crit) / Decimal::ONE_HUNDRED + from_set)
            .min(Decimal::ONE);
        let crit_dmg = self.mods.get(StatKind::CritDmg) / Decimal::ONE_HUNDRED;
        Decimal::ONE + chance * (crit_dmg - Decimal::ONE)
    }

    fn expected_damage(&self, set: &ToppingSet<'_>, tart: Option<&Equality>) -> Decimal {
        let atk = self.fraction(StatKind::Atk, set, tart);
        let elem: Decimal = ELEMENTAL_DMG.iter().map(|s| self.mods.get(*s)).sum();
        let elem = Decimal::ONE + elem / Decimal::ONE_HUNDRED;
        let mult = Decimal::ONE + self.mods.get(StatKind::AtkMult) / Decimal::ONE_HUNDRED;
        atk * self.crit_factor(set, tart) * elem * mult
    }

    fn expected_vitality(&self, set: &ToppingSet<'_>, tart: Option<&Equality>) -> Decimal {
        let hp = self.fraction(StatKind::Hp, set, tart);
        let def = self.fraction(StatKind::Def, set, tart);
        let dmgres = self.fraction(StatKind::DmgResist, set, tart).min(DMG_RESIST_CAP);
        hp * (Decimal::ONE + def) / (Decimal::ONE - dmgres) * self.crit_factor(set, tart)
    }
}

// ──────────────────────────────────────────────
// Objective
// ──────────────────────────────────────────────

/// Weighted sum over an explicit stat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combo {
    stats: Vec<StatKind>,
    weights: BTreeMap<StatKind, Decimal>,
}

impl Combo {
    pub fn stats(&self) -> &[StatKind] {
        &self.stats
    }

    pub fn weight(&self, stat: StatKind) -> Decimal {
        self.weights.get(&stat).copied().unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Objective {
    Single(StatKind),
    Combo(Combo),
    ExpectedDamage(Special),
    ExpectedVitality(Special),
}

impl Objective {
    /// Selector as written after `max:`.
    pub fn kind(&self) -> StatKind {
        match self {
            Objective::Single(stat) => *stat,
            Objective::Combo(_) => StatKind::Combo,
            Objective::ExpectedDamage(_) => StatKind::ExpectedDamage,
            Objective::ExpectedVitality(_) => StatKind::Vitality,
        }
    }

    /// Stats the objective reads from a topping set.
    pub fn stats(&self) -> &[StatKind] {
        match self {
            Objective::Single(stat) => std::slice::from_ref(stat),
            Objective::Combo(combo) => combo.stats(),
            Objective::ExpectedDamage(_) => &EXPECTED_DAMAGE_STATS,
            Objective::ExpectedVitality(_) => &VITALITY_STATS,
        }
    }

    pub fn special(&self) -> Option<&Special> {
        match self {
            Objective::ExpectedDamage(s) | Objective::ExpectedVitality(s) => Some(s),
            _ => None,
        }
    }

    pub fn special_mut(&mut self) -> Option<&mut Special> {
        match self {
            Objective::ExpectedDamage(s) | Objective::ExpectedVitality(s) => Some(s),
            _ => None,
        }
    }

    /// Score of a complete set.
    pub fn value(&self, set: &ToppingSet<'_>, tart: Option<&Equality>) -> Decimal {
        match self {
            Objective::Single(stat) => set.value(&[*stat], tart),
            Objective::Combo(combo) => combo
                .stats
                .iter()
                .map(|s| combo.weight(*s) * set.value(&[*s], tart))
                .sum(),
            Objective::ExpectedDamage(s) => s.expected_damage(set, tart),
            Objective::ExpectedVitality(s) => s.expected_vitality(set, tart),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "max {}", self.kind())
    }
}

// ──────────────────────────────────────────────
// Parsing
// ──────────────────────────────────────────────

/// Build an objective from its clause. `mods` is read, never changed.
pub fn parse_objective(
    cookie: &str,
    clause: &BTreeMap<String, Value>,
    mods: &Modifiers,
) -> Result<Objective, CompileError> {
    let malformed = |reason: &str| CompileError::MalformedObjective {
        cookie: cookie.to_string(),
        reason: reason.to_string(),
    };
    let stat_named = |name: &str| {
        StatKind::from_name(name).ok_or_else(|| CompileError::UnknownStat {
            cookie: cookie.to_string(),
            name: name.to_string(),
        })
    };

    let max = clause
        .get("max")
        .ok_or_else(|| CompileError::ObjectiveWithoutMax {
            cookie: cookie.to_string(),
        })?;
    let max = max
        .as_str()
        .ok_or_else(|| malformed("'max' must name a stat"))?;

    match stat_named(max)? {
        StatKind::Combo => {
            let listed = clause
                .get("substats")
                .and_then(Value::as_sequence)
                .filter(|seq| !seq.is_empty())
                .ok_or_else(|| malformed("Combo objective must specify substats"))?;
            let mut stats = Vec::with_capacity(listed.len());
            for item in listed {
                let name = item
                    .as_str()
                    .ok_or_else(|| malformed("Combo substats must be stat names"))?;
                let stat = stat_named(name)?;
                if stat.is_objective_selector() {
                    return Err(malformed("Combo substats cannot be objective kinds"));
                }
                if !stats.contains(&stat) {
                    stats.push(stat);
                }
            }
            let weights = stats.iter().map(|s| (*s, mods.get(*s))).collect();
            Ok(Objective::Combo(Combo { stats, weights }))
        }
        kind @ (StatKind::ExpectedDamage | StatKind::Vitality) => {
            let mut deltas = BTreeMap::new();
            for (key, value) in clause {
                if key == "max" {
                    continue;
                }
                let stat = stat_named(key)?;
                let delta = yaml_decimal(value).ok_or_else(|| {
                    malformed(&format!("override for {} must be a number", stat))
                })?;
                let total = deltas.entry(stat).or_insert(Decimal::ZERO);
                *total = total.saturating_add(delta);
            }
            let special = Special::new(mods.with_overrides(&deltas));
            Ok(if kind == StatKind::ExpectedDamage {
                Objective::ExpectedDamage(special)
            } else {
                Objective::ExpectedVitality(special)
            })
        }
        stat if stat.is_topping_stat() => Ok(Objective::Single(stat)),
        stat => Err(malformed(&format!(
            "{} cannot be maximized by toppings",
            stat
        ))),
    }
}
