//! Per-cookie requirements and their compiled form.
//!
//! [`Requirements`] is what the document says about one cookie.
//! [`Requirements::realize`] turns it into [`CompiledRequirements`], an
//! immutable value holding every derived view the search reads. Relative
//! constraints stay pending on that value until
//! [`CompiledRequirements::resolve`] is given the sibling loadouts.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::{Resonance, StatKind, TOPPING_STATS};
use crate::constraint::{collapse, Bound, BoundOp, Constraint, Equality, Relative};
use crate::error::CompileError;
use crate::modifiers::Modifiers;
use crate::objective::Objective;
use crate::topping::{self, Topping, ToppingSet};

// ──────────────────────────────────────────────
// Sibling context
// ──────────────────────────────────────────────

/// Stat values achieved by the loadouts of cookies optimized earlier.
pub trait SiblingStats {
    fn stat_of(&self, cookie: &str, stat: StatKind) -> Option<Decimal>;
}

/// No sibling has a loadout yet.
impl SiblingStats for () {
    fn stat_of(&self, _cookie: &str, _stat: StatKind) -> Option<Decimal> {
        None
    }
}

/// Finalized loadout values keyed by cookie name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiblingTable {
    values: BTreeMap<String, BTreeMap<StatKind, Decimal>>,
}

impl SiblingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cookie: &str, stat: StatKind, value: Decimal) {
        self.values
            .entry(cookie.to_string())
            .or_default()
            .insert(stat, value);
    }

    /// Record every topping stat of a cookie's finalized set.
    pub fn record(&mut self, cookie: &str, set: &ToppingSet<'_>, tart: Option<&Equality>) {
        for stat in TOPPING_STATS {
            self.insert(cookie, stat, set.value(&[stat], tart));
        }
    }
}

impl SiblingStats for SiblingTable {
    fn stat_of(&self, cookie: &str, stat: StatKind) -> Option<Decimal> {
        self.values.get(cookie)?.get(&stat).copied()
    }
}

// ──────────────────────────────────────────────
// Requirements
// ──────────────────────────────────────────────

/// One cookie's parsed requirement block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirements {
    pub name: String,
    pub valid: Vec<Constraint>,
    pub objective: Objective,
    pub mods: Modifiers,
    /// Always contains [`Resonance::Normal`].
    pub resonance: BTreeSet<Resonance>,
    pub tart: Option<Equality>,
    pub biscuit: Vec<Equality>,
    pub weight: Option<u32>,
}

impl Requirements {
    /// Lower, offset, fuzz, collapse and check the constraints, then tighten
    /// the objective's bounds. Relative constraints are left pending.
    pub fn realize(&self) -> Result<CompiledRequirements, CompileError> {
        let pending = self
            .valid
            .iter()
            .filter_map(Constraint::as_relative)
            .cloned()
            .collect();
        self.finish(Vec::new(), pending)
    }

    /// `resolved` holds the bounds of Relative constraints already lowered
    /// against sibling values; `relative_reqs` the ones still waiting.
    fn finish(
        &self,
        resolved: Vec<Bound>,
        relative_reqs: Vec<Relative>,
    ) -> Result<CompiledRequirements, CompileError> {
        let mut lowered: Vec<Bound> = self
            .valid
            .iter()
            .filter_map(Constraint::bounds)
            .flatten()
            .collect();
        lowered.extend(resolved);

        let merged_biscuit = merge_biscuit(&self.biscuit);
        let bonus = |stat: StatKind| {
            merged_biscuit
                .iter()
                .find(|b| b.substat == stat)
                .map_or(Decimal::ZERO, |b| b.target)
        };

        let adjusted: Vec<Bound> = lowered
            .into_iter()
            .map(|b| b.offset(bonus(b.substat)).fuzz())
            .collect();
        let adjusted_valid = collapse(&adjusted);

        for floor in adjusted_valid.iter().filter(|b| b.op == BoundOp::AtLeast) {
            let ceiling = adjusted_valid
                .iter()
                .find(|b| b.op == BoundOp::AtMost && b.substat == floor.substat);
            if let Some(ceiling) = ceiling {
                if floor.target > ceiling.target {
                    return Err(CompileError::Infeasible {
                        cookie: self.name.clone(),
                        stat: floor.substat,
                        low: floor.target,
                        high: ceiling.target,
                    });
                }
            }
        }

        let mut objective = self.objective.clone();
        if let Some(special) = objective.special_mut() {
            for b in &adjusted_valid {
                match b.op {
                    BoundOp::AtLeast => special.tighten_floor(b.substat, b.target),
                    BoundOp::AtMost if !b.target.is_zero() => {
                        special.tighten_ceiling(b.substat, b.target)
                    }
                    BoundOp::AtMost => {}
                }
            }
        }

        let floor_reqs: Vec<Bound> = adjusted_valid
            .iter()
            .filter(|b| b.op == BoundOp::AtLeast)
            .copied()
            .collect();
        let ceiling_reqs = adjusted_valid
            .iter()
            .filter(|b| b.op == BoundOp::AtMost && !b.target.is_zero())
            .copied()
            .collect();
        let zero_reqs = adjusted_valid
            .iter()
            .filter(|b| b.op == BoundOp::AtMost && b.target.is_zero())
            .copied()
            .collect();

        let objective_stats = objective.stats();
        let valid_substats: Vec<StatKind> = floor_reqs
            .iter()
            .map(|b| b.substat)
            .filter(|s| !objective_stats.contains(s))
            .collect();
        let all_substats: Vec<StatKind> = valid_substats
            .iter()
            .chain(objective_stats)
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        tracing::debug!(
            cookie = %self.name,
            bounds = adjusted_valid.len(),
            pending = relative_reqs.len(),
            objective = %objective,
            "realized requirements"
        );

        Ok(CompiledRequirements {
            source: self.clone(),
            objective,
            adjusted_valid,
            merged_biscuit,
            floor_reqs,
            ceiling_reqs,
            zero_reqs,
            valid_substats,
            all_substats,
            relative_reqs,
        })
    }
}

/// Sum same-stat biscuit lines; output ordered by stat.
fn merge_biscuit(lines: &[Equality]) -> Vec<Equality> {
    let mut totals: BTreeMap<StatKind, Decimal> = BTreeMap::new();
    for line in lines {
        let total = totals.entry(line.substat).or_insert(Decimal::ZERO);
        *total = total.saturating_add(line.target);
    }
    totals
        .into_iter()
        .map(|(substat, target)| Equality { substat, target })
        .collect()
}

// ──────────────────────────────────────────────
// Compiled requirements
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRequirements {
    source: Requirements,
    objective: Objective,
    adjusted_valid: Vec<Bound>,
    merged_biscuit: Vec<Equality>,
    floor_reqs: Vec<Bound>,
    ceiling_reqs: Vec<Bound>,
    zero_reqs: Vec<Bound>,
    valid_substats: Vec<StatKind>,
    all_substats: Vec<StatKind>,
    relative_reqs: Vec<Relative>,
}

impl CompiledRequirements {
    pub fn name(&self) -> &str {
        &self.source.name
    }

    /// Constraints as written, before any adjustment.
    pub fn constraints(&self) -> &[Constraint] {
        &self.source.valid
    }

    /// Objective with bounds tightened by the adjusted constraints.
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn mods(&self) -> &Modifiers {
        &self.source.mods
    }

    pub fn resonance(&self) -> &BTreeSet<Resonance> {
        &self.source.resonance
    }

    pub fn tart(&self) -> Option<&Equality> {
        self.source.tart.as_ref()
    }

    pub fn biscuit(&self) -> &[Equality] {
        &self.source.biscuit
    }

    pub fn weight(&self) -> Option<u32> {
        self.source.weight
    }

    /// Collapsed bounds after biscuit offset and fuzz, sorted by stat.
    pub fn adjusted_valid(&self) -> &[Bound] {
        &self.adjusted_valid
    }

    pub fn merged_biscuit(&self) -> &[Equality] {
        &self.merged_biscuit
    }

    pub fn floor_reqs(&self) -> &[Bound] {
        &self.floor_reqs
    }

    /// `<=` bounds with a non-zero target.
    pub fn ceiling_reqs(&self) -> &[Bound] {
        &self.ceiling_reqs
    }

    /// `<= 0` bounds: stats the set must not carry at all.
    pub fn zero_reqs(&self) -> &[Bound] {
        &self.zero_reqs
    }

    pub fn floor(&self, stat: StatKind) -> Decimal {
        self.floor_reqs
            .iter()
            .find(|b| b.substat == stat)
            .map_or(Decimal::ZERO, |b| b.target)
    }

    /// Floor stats that the objective does not already read.
    pub fn valid_substats(&self) -> &[StatKind] {
        &self.valid_substats
    }

    pub fn all_substats(&self) -> &[StatKind] {
        &self.all_substats
    }

    /// Relative constraints not yet lowered. Until [`Self::resolve`] runs
    /// they take no part in the adjusted bounds.
    pub fn relative_reqs(&self) -> &[Relative] {
        &self.relative_reqs
    }

    pub fn is_resolved(&self) -> bool {
        self.relative_reqs.is_empty()
    }

    /// Lower the pending Relative constraints against sibling values and
    /// re-run offset, fuzz, collapse, the contradiction check and objective
    /// tightening over the full constraint list.
    pub fn resolve<S>(&self, siblings: &S) -> Result<CompiledRequirements, CompileError>
    where
        S: SiblingStats + ?Sized,
    {
        if self.is_resolved() {
            return Ok(self.clone());
        }
        let resolved = self
            .relative_reqs
            .iter()
            .map(|rel| {
                siblings
                    .stat_of(&rel.cookie, rel.substat)
                    .map(|value| rel.resolve(value))
                    .ok_or_else(|| CompileError::UnresolvedRelative {
                        cookie: self.name().to_string(),
                        target: rel.cookie.clone(),
                        stat: rel.substat,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.source.finish(resolved, Vec::new())
    }

    /// Whether a topping's resonance lets this cookie use it.
    pub fn accepts(&self, topping: &Topping) -> bool {
        match topping.resonance() {
            None => true,
            Some(r) => self.source.resonance.contains(&r),
        }
    }

    pub fn is_satisfied_by(&self, set: &ToppingSet<'_>) -> bool {
        let tart = self.tart();
        self.adjusted_valid
            .iter()
            .all(|b| b.holds(set.value(&[b.substat], tart)))
    }

    pub fn score(&self, set: &ToppingSet<'_>) -> Decimal {
        self.objective.value(set, self.tart())
    }

    pub fn best_possible_set_effect(
        &self,
        partial: &[&Topping],
        stats: &[StatKind],
        free_slots: usize,
    ) -> Decimal {
        topping::best_possible_set_effect(partial, stats, free_slots)
    }

    pub fn summary(&self) -> RequirementSummary<'_> {
        RequirementSummary {
            name: self.name(),
            resonance: self.resonance().iter().copied().collect(),
            tart: self.tart(),
            biscuit: self.biscuit(),
            merged_biscuit: self.merged_biscuit(),
            constraints: self.constraints().iter().map(|c| c.to_string()).collect(),
            pending: self.relative_reqs.iter().map(|r| r.cookie.as_str()).collect(),
            bounds: self.adjusted_valid(),
            objective: self.objective.kind(),
            objective_stats: self.objective.stats(),
            weight: self.weight(),
        }
    }
}

/// Serializable view for JSON output.
#[derive(Debug, Serialize)]
pub struct RequirementSummary<'a> {
    pub name: &'a str,
    pub resonance: Vec<Resonance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tart: Option<&'a Equality>,
    pub biscuit: &'a [Equality],
    pub merged_biscuit: &'a [Equality],
    pub constraints: Vec<String>,
    /// Cookies whose loadouts the pending Relative constraints still need.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pending: Vec<&'a str>,
    pub bounds: &'a [Bound],
    pub objective: StatKind,
    pub objective_stats: &'a [StatKind],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

impl fmt::Display for CompiledRequirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name())?;
        let tags: Vec<&str> = self
            .resonance()
            .iter()
            .filter(|r| **r != Resonance::Normal)
            .map(|r| r.name())
            .collect();
        if !tags.is_empty() {
            writeln!(f, "├ Resonance: {}", tags.join(", "))?;
        }
        if let Some(tart) = self.tart() {
            writeln!(f, "├ Tart: {}", tart)?;
        }
        for line in self.biscuit() {
            writeln!(f, "├ Biscuit: {}", line)?;
        }
        for constraint in self.constraints() {
            writeln!(f, "├ {}", constraint)?;
        }
        write!(f, "└ {}", self.objective)?;
        if let Objective::Combo(combo) = &self.objective {
            for stat in combo.stats() {
                write!(f, "\n  ↳ {} (x{})", stat, combo.weight(*stat))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{parse_constraint, parse_equality_line};
    use crate::modifiers::{accumulate, BaselineTable};
    use crate::objective::parse_objective;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn requirements(lines: &[&str], objective: &str) -> Requirements {
        let mods = accumulate(&BaselineTable::builtin(), &[]);
        let clause = serde_yaml_ng::from_str(objective).unwrap();
        Requirements {
            name: "Test Cookie".to_string(),
            valid: lines.iter().map(|l| parse_constraint(l).unwrap()).collect(),
            objective: parse_objective("Test Cookie", &clause, &mods).unwrap(),
            mods,
            resonance: BTreeSet::from([Resonance::Normal]),
            tart: None,
            biscuit: vec![],
            weight: None,
        }
    }

    fn plain(flavor: StatKind, value: &str) -> Topping {
        Topping::new((flavor, dec(value)), vec![], None)
    }

    #[test]
    fn contradictory_bounds_are_infeasible() {
        let req = requirements(&["ATK >= 50", "ATK <= 30"], "max: HP");
        let err = req.realize().unwrap_err();
        assert_eq!(
            err,
            CompileError::Infeasible {
                cookie: "Test Cookie".to_string(),
                stat: StatKind::Atk,
                low: dec("49.9"),
                high: dec("30.1"),
            }
        );
    }

    #[test]
    fn compatible_bounds_compile() {
        let req = requirements(&["ATK >= 30", "ATK <= 50"], "max: HP");
        let compiled = req.realize().unwrap();
        assert_eq!(
            compiled.adjusted_valid(),
            &[
                Bound::at_least(StatKind::Atk, dec("29.9")),
                Bound::at_most(StatKind::Atk, dec("50.1")),
            ]
        );
        assert_eq!(compiled.floor(StatKind::Atk), dec("29.9"));
        assert_eq!(compiled.floor(StatKind::Hp), Decimal::ZERO);
    }

    #[test]
    fn fuzz_cannot_rescue_a_true_contradiction() {
        let req = requirements(&["ATK >= 30.3", "ATK <= 30"], "max: HP");
        assert!(req.realize().is_err());
        let req = requirements(&["ATK >= 30.2", "ATK <= 30"], "max: HP");
        assert!(req.realize().is_ok());
    }

    #[test]
    fn biscuit_lines_merge_and_offset_every_bound() {
        let mut req = requirements(&["ATK >= 10", "2 <= ATK <= 12", "CRIT% >= 5"], "max: HP");
        req.biscuit = vec![
            parse_equality_line("ATK = 4").unwrap(),
            parse_equality_line("ATK = 2.5").unwrap(),
        ];
        let compiled = req.realize().unwrap();
        assert_eq!(
            compiled.merged_biscuit(),
            &[Equality {
                substat: StatKind::Atk,
                target: dec("6.5"),
            }]
        );
        // floors: 10 - 6.5 = 3.5 and max(0, 2 - 6.5) = 0, then fuzzed
        assert_eq!(compiled.floor(StatKind::Atk), dec("3.4"));
        assert_eq!(compiled.ceiling_reqs()[0].target, dec("5.6"));
        assert_eq!(compiled.floor(StatKind::Crit), dec("4.9"));
    }

    #[test]
    fn biscuit_offset_never_goes_negative() {
        let mut req = requirements(&["ATK >= 3", "ATK <= 4"], "max: HP");
        req.biscuit = vec![parse_equality_line("ATK = 10").unwrap()];
        let compiled = req.realize().unwrap();
        assert!(compiled.adjusted_valid().iter().all(|b| b.target >= Decimal::ZERO));
        // the ceiling is driven to a hard exclusion
        assert_eq!(compiled.zero_reqs().len(), 1);
        assert!(compiled.ceiling_reqs().is_empty());
    }

    #[test]
    fn zero_ceiling_stays_a_hard_exclusion() {
        let req = requirements(&["Cooldown <= 0", "ATK SPD >= 20"], "max: ATK");
        let compiled = req.realize().unwrap();
        assert_eq!(
            compiled.zero_reqs(),
            &[Bound::at_most(StatKind::Cooldown, Decimal::ZERO)]
        );
        assert_eq!(compiled.valid_substats(), &[StatKind::AtkSpd]);
        assert_eq!(compiled.all_substats(), &[StatKind::Atk, StatKind::AtkSpd]);
    }

    #[test]
    fn objective_stats_are_not_valid_substats() {
        let req = requirements(&["ATK >= 10", "HP >= 5"], "max: ATK");
        let compiled = req.realize().unwrap();
        assert_eq!(compiled.valid_substats(), &[StatKind::Hp]);
        assert_eq!(compiled.all_substats(), &[StatKind::Atk, StatKind::Hp]);
    }

    #[test]
    fn relative_stays_pending_until_resolved() {
        let req = requirements(&["ATK SPD > Wind Archer Cookie", "ATK >= 10"], "max: ATK");
        let compiled = req.realize().unwrap();
        assert!(!compiled.is_resolved());
        assert_eq!(compiled.relative_reqs().len(), 1);
        assert_eq!(compiled.relative_reqs()[0].cookie, "Wind Archer Cookie");
        assert_eq!(compiled.floor(StatKind::AtkSpd), Decimal::ZERO);
        assert_eq!(compiled.floor(StatKind::Atk), dec("9.9"));

        assert!(matches!(
            compiled.resolve(&()),
            Err(CompileError::UnresolvedRelative { .. })
        ));

        let mut siblings = SiblingTable::new();
        siblings.insert("Wind Archer Cookie", StatKind::AtkSpd, dec("20"));
        let resolved = compiled.resolve(&siblings).unwrap();
        assert!(resolved.is_resolved());
        // 20 + 0.1, then fuzzed back down
        assert_eq!(resolved.floor(StatKind::AtkSpd), dec("20"));
        assert_eq!(resolved.floor(StatKind::Atk), dec("9.9"));
        assert_eq!(resolved.resolve(&()).unwrap(), resolved);
    }

    #[test]
    fn resolving_can_expose_a_contradiction() {
        let req = requirements(
            &["ATK SPD <= 10", "ATK SPD >= Wind Archer Cookie"],
            "max: ATK",
        );
        let compiled = req.realize().unwrap();
        let mut siblings = SiblingTable::new();
        siblings.insert("Wind Archer Cookie", StatKind::AtkSpd, dec("24.5"));
        assert_eq!(
            compiled.resolve(&siblings).unwrap_err(),
            CompileError::Infeasible {
                cookie: "Test Cookie".to_string(),
                stat: StatKind::AtkSpd,
                low: dec("24.4"),
                high: dec("10.1"),
            }
        );
    }

    #[test]
    fn resolved_relative_tightens_special_objective() {
        let req = requirements(&["CRIT% <= Sea Fairy Cookie"], "max: E[DMG]");
        let compiled = req.realize().unwrap();
        let crit = |c: &CompiledRequirements| {
            c.objective().special().unwrap().bounds()[&StatKind::Crit].max
        };
        assert_eq!(crit(&compiled), Decimal::ONE);
        let mut siblings = SiblingTable::new();
        siblings.insert("Sea Fairy Cookie", StatKind::Crit, dec("40"));
        assert_eq!(crit(&compiled.resolve(&siblings).unwrap()), dec("0.401"));
    }

    #[test]
    fn special_objective_crit_ceiling_tightens() {
        let req = requirements(&["CRIT% <= 30", "CRIT% >= 10"], "max: E[DMG]");
        let compiled = req.realize().unwrap();
        let bounds = compiled.objective().special().unwrap().bounds();
        assert_eq!(bounds[&StatKind::Crit].max, dec("0.301"));
        assert_eq!(bounds[&StatKind::Crit].min, Decimal::ZERO);
        // the uncompiled objective is untouched
        assert_eq!(
            req.objective.special().unwrap().bounds()[&StatKind::Crit].max,
            Decimal::ONE
        );
    }

    #[test]
    fn adding_constraints_only_shrinks_the_region() {
        let loose = requirements(&["ATK >= 10"], "max: HP").realize().unwrap();
        let tight = requirements(&["ATK >= 10", "ATK >= 20", "HP <= 30"], "max: HP")
            .realize()
            .unwrap();
        let r: Vec<Topping> = (0..5).map(|_| plain(StatKind::Atk, "3")).collect();
        let set = ToppingSet::new([&r[0], &r[1], &r[2], &r[3], &r[4]]);
        // ATK 15 + 10 set bonus = 25 satisfies both
        assert!(loose.is_satisfied_by(&set));
        assert!(tight.is_satisfied_by(&set));

        let r: Vec<Topping> = (0..5).map(|_| plain(StatKind::Hp, "3")).collect();
        let set = ToppingSet::new([&r[0], &r[1], &r[2], &r[3], &r[4]]);
        assert!(!loose.is_satisfied_by(&set));
        assert!(!tight.is_satisfied_by(&set));
    }

    #[test]
    fn accepts_filters_by_resonance() {
        let mut req = requirements(&[], "max: ATK");
        req.resonance.insert(Resonance::SeaSalt);
        let compiled = req.realize().unwrap();
        let plain_top = plain(StatKind::Atk, "9");
        let sea = Topping::new((StatKind::Atk, dec("9")), vec![], Some(Resonance::SeaSalt));
        let moon = Topping::new((StatKind::Atk, dec("9")), vec![], Some(Resonance::Moonkissed));
        assert!(compiled.accepts(&plain_top));
        assert!(compiled.accepts(&sea));
        assert!(!compiled.accepts(&moon));
    }

    #[test]
    fn score_applies_tart() {
        let mut req = requirements(&[], "max: CRIT%");
        req.tart = parse_equality_line("CRIT% = 3");
        let compiled = req.realize().unwrap();
        let r: Vec<Topping> = (0..5).map(|_| plain(StatKind::Crit, "9")).collect();
        let set = ToppingSet::new([&r[0], &r[1], &r[2], &r[3], &r[4]]);
        assert_eq!(compiled.score(&set), dec("56"));
    }

    #[test]
    fn summary_lists_everything() {
        let mut req = requirements(
            &["ATK SPD >= 20", "0 <= Cooldown <= 5"],
            "max: Combo\nsubstats: [ATK, CRIT%]",
        );
        req.resonance.insert(Resonance::SeaSalt);
        req.tart = parse_equality_line("CRIT% = 3");
        req.biscuit = vec![parse_equality_line("ATK = 4").unwrap()];
        let text = req.realize().unwrap().to_string();
        let expected = "Test Cookie\n\
            ├ Resonance: Sea Salt\n\
            ├ Tart: CRIT% = 3\n\
            ├ Biscuit: ATK = 4\n\
            ├ ATK SPD >= 20\n\
            ├ Cooldown <= 5\n\
            └ max Combo\n  \
            ↳ ATK (x100)\n  \
            ↳ CRIT% (x5)";
        assert_eq!(text, expected);
    }

    #[test]
    fn summary_prints_biscuit_lines_as_written() {
        let mut req = requirements(&[], "max: ATK");
        req.biscuit = vec![
            parse_equality_line("ATK = 4").unwrap(),
            parse_equality_line("ATK = 2.5").unwrap(),
        ];
        let compiled = req.realize().unwrap();
        let text = compiled.to_string();
        assert!(text.contains("├ Biscuit: ATK = 4\n├ Biscuit: ATK = 2.5\n"));
        assert!(!text.contains("6.5"));

        let json = serde_json::to_value(compiled.summary()).unwrap();
        assert_eq!(json["biscuit"].as_array().unwrap().len(), 2);
        assert_eq!(json["merged_biscuit"][0]["target"], "6.5");
    }

    #[test]
    fn summary_serializes_to_json() {
        let compiled = requirements(&["ATK >= 10"], "max: HP").realize().unwrap();
        let json = serde_json::to_value(compiled.summary()).unwrap();
        assert_eq!(json["name"], "Test Cookie");
        assert_eq!(json["objective"], "HP");
        assert_eq!(json["bounds"][0]["op"], ">=");
        assert_eq!(json["bounds"][0]["substat"], "ATK");
        assert_eq!(json["resonance"][0], "Normal");
    }

    #[test]
    fn compiled_requirements_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledRequirements>();
        assert_send_sync::<Topping>();
        assert_send_sync::<ToppingSet<'static>>();
    }
}
