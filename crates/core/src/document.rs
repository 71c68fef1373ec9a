//! YAML requirements document: serde model, loading, and normalization.
//!
//! The document is kept close to what users write. Stat names, modifier
//! values and leaderboard weights stay untyped until compilation so that a
//! bad entry is reported against the section it came from. Cookie fields
//! are read loosely for the same reason: a mistyped field rejects only its
//! cookie, not the document.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

use crate::catalog::StatKind;
use crate::constraint::MAX_INPUT;
use crate::error::DocumentError;
use crate::modifiers::{BaselineTable, Modifier, ModifierSource};

const LEGACY_VITALITY: &str = "E[Vit]";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementsDocument {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modifiers: BTreeMap<String, Vec<ModifierLine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub cookies: Vec<CookieBlock>,
}

/// One declared buff: `{ source: Guild Buff, value: 10 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierLine {
    pub source: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieBlock {
    pub name: String,
    /// Null means "ask the cookie directory".
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub resonant: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub tart: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub biscuit: Value,
    #[serde(default)]
    pub requirements: Vec<RequirementEntry>,
}

/// A requirement list item: a constraint line or an objective clause.
/// Anything else is kept as [`RequirementEntry::Other`] and rejected when
/// its cookie compiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequirementEntry {
    Line(String),
    Clause(BTreeMap<String, Value>),
    Other(Value),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub strip_leaderboard: bool,
}

impl RequirementsDocument {
    pub fn from_yaml_str(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> Result<String, DocumentError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Rewrite the document into canonical form.
    ///
    /// Declared modifier lines whose source restates a baseline entry for
    /// the same stat are dropped, as are stats left with no lines. Lines for
    /// unknown stats are kept so compilation can report them.
    pub fn normalize(&mut self, baseline: &BaselineTable, options: NormalizeOptions) {
        if options.strip_leaderboard && self.leaderboard.take().is_some() {
            tracing::debug!("stripped leaderboard section");
        }

        for cookie in &mut self.cookies {
            for entry in &mut cookie.requirements {
                let RequirementEntry::Clause(clause) = entry else {
                    continue;
                };
                let legacy = clause
                    .get("max")
                    .and_then(Value::as_str)
                    .is_some_and(|max| max.trim().eq_ignore_ascii_case(LEGACY_VITALITY));
                if legacy {
                    tracing::debug!(cookie = %cookie.name, "rewrote legacy E[Vit] objective");
                    clause.insert("max".to_string(), Value::from(StatKind::Vitality.name()));
                }
            }
        }

        self.modifiers.retain(|stat_name, lines| {
            let Some(stat) = StatKind::from_name(stat_name) else {
                return true;
            };
            lines.retain(|line| {
                let redundant = baseline.covers(stat, &ModifierSource::parse(&line.source));
                if redundant {
                    tracing::warn!(
                        stat = %stat,
                        source = %line.source,
                        "removed modifier line duplicating a built-in baseline"
                    );
                }
                !redundant
            });
            !lines.is_empty()
        });
    }

    /// Typed view of the `modifiers` section.
    pub fn declared_modifiers(&self) -> Result<Vec<Modifier>, DocumentError> {
        let mut out = Vec::new();
        for (stat_name, lines) in &self.modifiers {
            let stat = StatKind::from_name(stat_name)
                .ok_or_else(|| DocumentError::UnknownModifierStat(stat_name.clone()))?;
            for line in lines {
                let value =
                    yaml_decimal(&line.value).ok_or_else(|| DocumentError::BadModifierValue {
                        stat: stat_name.clone(),
                        source_name: line.source.clone(),
                    })?;
                out.push(Modifier {
                    stat,
                    source: ModifierSource::parse(&line.source),
                    value,
                });
            }
        }
        Ok(out)
    }

    /// Leaderboard weights by cookie name; empty when the section is absent.
    /// A weight of 0 means unweighted and is left out.
    pub fn leaderboard_weights(&self) -> Result<BTreeMap<String, u32>, DocumentError> {
        let mut weights = BTreeMap::new();
        let Some(board) = &self.leaderboard else {
            return Ok(weights);
        };
        for (name, weight) in board {
            let weight = weight
                .as_u64()
                .and_then(|w| u32::try_from(w).ok())
                .ok_or_else(|| DocumentError::BadLeaderboardWeight(name.clone()))?;
            if weight > 0 {
                weights.insert(name.clone(), weight);
            }
        }
        Ok(weights)
    }
}

/// Read a `resonant`, `tart` or `biscuit` field as lines. A lone string is
/// one line. On failure the offending value is returned.
pub fn field_lines(value: &Value) -> Result<Vec<String>, &Value> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Sequence(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or(item))
            .collect(),
        other => Err(other),
    }
}

/// Read a YAML scalar as an exact decimal. Strings may carry a trailing `%`.
/// Magnitudes above [`MAX_INPUT`] are rejected.
pub fn yaml_decimal(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s.strip_suffix('%').unwrap_or(s).trim_end()).ok()
        }
        _ => None,
    };
    parsed.filter(|v| v.abs() <= MAX_INPUT)
}
