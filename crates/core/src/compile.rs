//! Document-level compilation.
//!
//! Every cookie is attempted in document order. A cookie that fails is
//! reported and left out; it cannot be the target of a later Relative
//! constraint. A name declared twice keeps its first block.
//!
//! Relative constraints only need their target declared earlier to
//! compile. Lowering them against loadout values is a separate step,
//! [`Compilation::resolve`].

use std::collections::{BTreeMap, BTreeSet};

use serde_yaml_ng::Value;

use crate::catalog::Resonance;
use crate::constraint::{parse_constraint, parse_equality_line, Constraint};
use crate::cookies::CookieDirectory;
use crate::document::{
    field_lines, CookieBlock, NormalizeOptions, RequirementEntry, RequirementsDocument,
};
use crate::error::{CompileError, DocumentError};
use crate::modifiers::{accumulate, BaselineTable, Modifiers};
use crate::objective::{parse_objective, Objective};
use crate::requirements::{CompiledRequirements, Requirements, SiblingStats};

/// Result of compiling a whole document.
#[derive(Debug, Default)]
pub struct Compilation {
    /// Successfully compiled cookies, in document order.
    pub cookies: Vec<CompiledRequirements>,
    pub errors: Vec<CompileError>,
}

impl Compilation {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CompiledRequirements> {
        self.cookies.iter().find(|c| c.name() == name)
    }

    /// Resolve every pending Relative constraint against sibling values.
    /// Cookies that fail to resolve move to [`Compilation::errors`].
    pub fn resolve<S>(self, siblings: &S) -> Compilation
    where
        S: SiblingStats + ?Sized,
    {
        let mut out = Compilation {
            cookies: Vec::with_capacity(self.cookies.len()),
            errors: self.errors,
        };
        for cookie in self.cookies {
            if cookie.is_resolved() {
                out.cookies.push(cookie);
                continue;
            }
            match cookie.resolve(siblings) {
                Ok(resolved) => {
                    tracing::debug!(cookie = %resolved.name(), "resolved relative requirements");
                    out.cookies.push(resolved);
                }
                Err(e) => {
                    tracing::debug!(cookie = %cookie.name(), error = %e, "cookie rejected");
                    out.errors.push(e);
                }
            }
        }
        out
    }
}

/// Normalize, accumulate modifiers, and compile every cookie.
///
/// Document-wide problems (bad modifiers or leaderboard) fail the whole
/// call; per-cookie problems are collected in [`Compilation::errors`].
pub fn compile_document(
    doc: &RequirementsDocument,
    directory: &dyn CookieDirectory,
) -> Result<Compilation, DocumentError> {
    let baseline = BaselineTable::builtin();
    let mut doc = doc.clone();
    doc.normalize(&baseline, NormalizeOptions::default());

    let mods = accumulate(&baseline, &doc.declared_modifiers()?);
    let weights = doc.leaderboard_weights()?;

    let mut out = Compilation::default();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut declared: BTreeSet<&str> = BTreeSet::new();
    for block in &doc.cookies {
        if !declared.insert(block.name.as_str()) {
            tracing::debug!(cookie = %block.name, "duplicate cookie rejected");
            out.errors.push(CompileError::DuplicateCookie {
                cookie: block.name.clone(),
            });
            continue;
        }
        let compiled = build_requirements(block, &mods, directory, &weights, &seen)
            .and_then(|req| req.realize());
        match compiled {
            Ok(compiled) => {
                tracing::debug!(cookie = %block.name, "compiled cookie");
                seen.insert(block.name.clone());
                out.cookies.push(compiled);
            }
            Err(e) => {
                tracing::debug!(cookie = %block.name, error = %e, "cookie rejected");
                out.errors.push(e);
            }
        }
    }
    Ok(out)
}

/// Parse one cookie block. `seen` holds the names that compiled earlier.
pub fn build_requirements(
    block: &CookieBlock,
    mods: &Modifiers,
    directory: &dyn CookieDirectory,
    weights: &BTreeMap<String, u32>,
    seen: &BTreeSet<String>,
) -> Result<Requirements, CompileError> {
    let cookie = block.name.as_str();

    let malformed = |field: &'static str, entry: &Value| CompileError::MalformedEntry {
        cookie: cookie.to_string(),
        field,
        entry: render_entry(entry),
    };

    let mut resonance = BTreeSet::from([Resonance::Normal]);
    if block.resonant.is_null() {
        resonance.extend(directory.resonances(cookie).unwrap_or_default());
    } else {
        for name in field_lines(&block.resonant).map_err(|e| malformed("resonant", e))? {
            let tag = Resonance::from_name(&name).ok_or_else(|| {
                CompileError::UnknownResonance {
                    cookie: cookie.to_string(),
                    name: name.clone(),
                }
            })?;
            resonance.insert(tag);
        }
    }

    let tart_lines = field_lines(&block.tart).map_err(|e| malformed("tart", e))?;
    let tart = match tart_lines.as_slice() {
        [] => None,
        [line] => Some(parse_equality_line(line).ok_or_else(|| {
            CompileError::UnparseableTart {
                cookie: cookie.to_string(),
                line: line.clone(),
            }
        })?),
        _ => {
            return Err(CompileError::MultipleTarts {
                cookie: cookie.to_string(),
            })
        }
    };

    let biscuit = field_lines(&block.biscuit)
        .map_err(|e| malformed("biscuit", e))?
        .iter()
        .map(|line| {
            parse_equality_line(line).ok_or_else(|| CompileError::UnparseableBiscuit {
                cookie: cookie.to_string(),
                line: line.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut valid = Vec::new();
    let mut objective: Option<Objective> = None;
    for entry in &block.requirements {
        match entry {
            RequirementEntry::Line(line) => {
                let constraint =
                    parse_constraint(line).ok_or_else(|| CompileError::Unparseable {
                        cookie: cookie.to_string(),
                        line: line.clone(),
                    })?;
                if let Constraint::Relative(rel) = &constraint {
                    if !seen.contains(&rel.cookie) {
                        return Err(CompileError::ForwardReference {
                            cookie: cookie.to_string(),
                            target: rel.cookie.clone(),
                            line: line.clone(),
                        });
                    }
                }
                valid.push(constraint);
            }
            RequirementEntry::Clause(clause) => {
                if objective.is_some() {
                    return Err(CompileError::DuplicateObjective {
                        cookie: cookie.to_string(),
                    });
                }
                objective = Some(parse_objective(cookie, clause, mods)?);
            }
            RequirementEntry::Other(value) => return Err(malformed("requirements", value)),
        }
    }
    let objective = objective.ok_or_else(|| CompileError::MissingObjective {
        cookie: cookie.to_string(),
    })?;

    Ok(Requirements {
        name: block.name.clone(),
        valid,
        objective,
        mods: mods.clone(),
        resonance,
        tart,
        biscuit,
        weight: weights.get(cookie).copied(),
    })
}

/// Render a rejected entry on one line, in flow style.
fn render_entry(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StatKind;
    use crate::cookies::{EmptyDirectory, MapDirectory};

    fn compile(yaml: &str) -> Compilation {
        let doc = RequirementsDocument::from_yaml_str(yaml).unwrap();
        compile_document(&doc, &EmptyDirectory).unwrap()
    }

    #[test]
    fn missing_and_duplicate_objectives() {
        let out = compile(
            r#"
cookies:
  - name: A
    requirements: ["ATK >= 10"]
  - name: B
    requirements:
      - max: ATK
      - max: HP
"#,
        );
        assert!(out.cookies.is_empty());
        assert_eq!(out.errors.len(), 2);
        assert!(matches!(out.errors[0], CompileError::MissingObjective { .. }));
        assert!(matches!(out.errors[1], CompileError::DuplicateObjective { .. }));
    }

    #[test]
    fn unparseable_line_names_cookie_and_text() {
        let out = compile(
            r#"
cookies:
  - name: Espresso Cookie
    requirements:
      - "ATK is big"
      - max: ATK
"#,
        );
        assert_eq!(
            out.errors,
            vec![CompileError::Unparseable {
                cookie: "Espresso Cookie".to_string(),
                line: "ATK is big".to_string(),
            }]
        );
        assert!(out.errors[0].to_string().contains("ATK is big"));
    }

    #[test]
    fn tart_and_biscuit_lines() {
        let out = compile(
            r#"
cookies:
  - name: A
    tart: ["CRIT% = 3", "ATK = 2"]
    requirements: [{ max: ATK }]
  - name: B
    tart: ["CRIT% >= 3"]
    requirements: [{ max: ATK }]
  - name: C
    biscuit: ["ATK = lots"]
    requirements: [{ max: ATK }]
"#,
        );
        assert!(matches!(out.errors[0], CompileError::MultipleTarts { .. }));
        assert!(matches!(out.errors[1], CompileError::UnparseableTart { .. }));
        assert!(matches!(out.errors[2], CompileError::UnparseableBiscuit { .. }));
    }

    #[test]
    fn failed_cookie_does_not_stop_siblings() {
        let out = compile(
            r#"
cookies:
  - name: A
    requirements: ["ATK >= 50", "ATK <= 30", { max: HP }]
  - name: B
    requirements: ["ATK >= 30", "ATK <= 50", { max: HP }]
"#,
        );
        assert_eq!(out.cookies.len(), 1);
        assert_eq!(out.cookies[0].name(), "B");
        assert!(matches!(out.errors[0], CompileError::Infeasible { .. }));
        assert!(!out.is_ok());
    }

    #[test]
    fn mistyped_block_rejects_only_its_cookie() {
        let out = compile(
            r#"
cookies:
  - name: Tart Cookie
    tart: 3
    requirements: [{ max: ATK }]
  - name: Number Cookie
    requirements:
      - 50
      - max: ATK
  - name: Good Cookie
    tart: "CRIT% = 3"
    requirements: ["ATK >= 10", { max: ATK }]
"#,
        );
        assert_eq!(
            out.errors,
            vec![
                CompileError::MalformedEntry {
                    cookie: "Tart Cookie".to_string(),
                    field: "tart",
                    entry: "3".to_string(),
                },
                CompileError::MalformedEntry {
                    cookie: "Number Cookie".to_string(),
                    field: "requirements",
                    entry: "50".to_string(),
                },
            ]
        );
        let good = out.get("Good Cookie").unwrap();
        assert_eq!(good.tart().unwrap().to_string(), "CRIT% = 3");
        assert!(out.errors[1].to_string().contains("Number Cookie"));
    }

    #[test]
    fn later_duplicate_name_is_rejected() {
        let out = compile(
            r#"
cookies:
  - name: A
    requirements: ["ATK >= 10", { max: ATK }]
  - name: A
    requirements: [{ max: HP }]
  - name: B
    requirements: ["ATK SPD >= A", { max: HP }]
"#,
        );
        assert_eq!(out.cookies.len(), 2);
        assert_eq!(out.get("A").unwrap().objective().kind(), StatKind::Atk);
        assert_eq!(
            out.errors,
            vec![CompileError::DuplicateCookie {
                cookie: "A".to_string(),
            }]
        );
        assert_eq!(out.errors[0].kind(), "duplicate_cookie");
    }

    #[test]
    fn resolve_moves_unresolvable_cookies_to_errors() {
        let out = compile(
            r#"
cookies:
  - name: A
    requirements: ["ATK SPD >= 20", { max: ATK }]
  - name: B
    requirements: ["ATK SPD > A", { max: CRIT% }]
  - name: C
    requirements: ["CRIT% >= A", { max: HP }]
"#,
        );
        assert!(out.is_ok());
        assert_eq!(out.cookies.len(), 3);

        let mut siblings = crate::requirements::SiblingTable::new();
        siblings.insert("A", StatKind::AtkSpd, rust_decimal::Decimal::from(24));
        let out = out.resolve(&siblings);
        assert!(out.cookies.iter().all(|c| c.is_resolved()));
        assert_eq!(
            out.get("B").unwrap().floor(StatKind::AtkSpd),
            rust_decimal::Decimal::from(24)
        );
        assert!(out.get("C").is_none());
        assert!(matches!(
            &out.errors[..],
            [CompileError::UnresolvedRelative { cookie, .. }] if cookie == "C"
        ));
    }

    #[test]
    fn directory_supplies_default_resonance() {
        let doc = RequirementsDocument::from_yaml_str(
            r#"
cookies:
  - name: Sea Fairy Cookie
    requirements: [{ max: ATK }]
  - name: Wind Archer Cookie
    resonant: [Moonkissed]
    requirements: [{ max: ATK }]
"#,
        )
        .unwrap();
        let dir = MapDirectory::from_yaml_str(
            "Sea Fairy Cookie: [Sea Salt]\nWind Archer Cookie: [Trio]\n",
        )
        .unwrap();
        let out = compile_document(&doc, &dir).unwrap();
        let sea = out.get("Sea Fairy Cookie").unwrap();
        assert!(sea.resonance().contains(&Resonance::SeaSalt));
        assert!(sea.resonance().contains(&Resonance::Normal));
        let wind = out.get("Wind Archer Cookie").unwrap();
        assert!(wind.resonance().contains(&Resonance::Moonkissed));
        assert!(!wind.resonance().contains(&Resonance::Trio));
    }

    #[test]
    fn unknown_resonance_is_reported() {
        let out = compile(
            r#"
cookies:
  - name: A
    resonant: [Salty]
    requirements: [{ max: ATK }]
"#,
        );
        assert!(matches!(out.errors[0], CompileError::UnknownResonance { .. }));
    }

    #[test]
    fn leaderboard_weight_is_attached() {
        let out = compile(
            r#"
leaderboard:
  A: 4
cookies:
  - name: A
    requirements: [{ max: ATK }]
  - name: B
    requirements: [{ max: ATK }]
"#,
        );
        assert_eq!(out.get("A").unwrap().weight(), Some(4));
        assert_eq!(out.get("B").unwrap().weight(), None);
    }

    #[test]
    fn zero_leaderboard_weight_is_no_weight() {
        let out = compile(
            r#"
leaderboard:
  A: 0
cookies:
  - name: A
    requirements: [{ max: ATK }]
"#,
        );
        assert_eq!(out.get("A").unwrap().weight(), None);
    }

    #[test]
    fn huge_modifier_value_fails_without_panicking() {
        let doc = RequirementsDocument::from_yaml_str(
            r#"
modifiers:
  ATK:
    - { source: Guild, value: "79228162514264337593543950335" }
cookies:
  - name: A
    requirements: [{ max: ATK }]
"#,
        )
        .unwrap();
        assert!(matches!(
            compile_document(&doc, &EmptyDirectory),
            Err(DocumentError::BadModifierValue { .. })
        ));

        let out = compile(
            r#"
cookies:
  - name: A
    requirements:
      - "ATK >= 79228162514264337593543950335"
      - { max: E[DMG], ATK: 79228162514264337593543950335 }
"#,
        );
        assert!(matches!(out.errors[0], CompileError::Unparseable { .. }));
    }

    #[test]
    fn baseline_duplicates_are_not_double_counted() {
        let out = compile(
            r#"
modifiers:
  ATK:
    - { source: Base, value: 100 }
    - { source: Guild Buff, value: 10 }
cookies:
  - name: A
    requirements: [{ max: ATK }]
"#,
        );
        assert_eq!(
            out.cookies[0].mods().get(StatKind::Atk),
            rust_decimal::Decimal::from(110)
        );
    }

    #[test]
    fn document_errors_fail_the_whole_call() {
        let doc = RequirementsDocument::from_yaml_str(
            "modifiers:\n  Speed:\n    - { source: Guild, value: 3 }\ncookies: []\n",
        )
        .unwrap();
        assert!(matches!(
            compile_document(&doc, &EmptyDirectory),
            Err(DocumentError::UnknownModifierStat(_))
        ));
    }
}
