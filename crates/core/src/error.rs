//! Error types for document loading, cookie compilation, and topping checks.

use rust_decimal::Decimal;

use crate::catalog::StatKind;

/// A failure that rejects a single cookie. Every variant names the cookie.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("{cookie} : one objective must be specified")]
    MissingObjective { cookie: String },

    #[error("{cookie} : only one objective may be specified")]
    DuplicateObjective { cookie: String },

    #[error("{cookie} : objective must have the 'max' key")]
    ObjectiveWithoutMax { cookie: String },

    #[error("{cookie} : malformed objective: {reason}")]
    MalformedObjective { cookie: String, reason: String },

    #[error("{cookie} : unknown stat '{name}'")]
    UnknownStat { cookie: String, name: String },

    #[error("{cookie} : unknown resonance '{name}'")]
    UnknownResonance { cookie: String, name: String },

    #[error("{cookie} : could not parse {line}")]
    Unparseable { cookie: String, line: String },

    #[error("{cookie} : could not parse tart {line}")]
    UnparseableTart { cookie: String, line: String },

    #[error("{cookie} : could not parse biscuit {line}")]
    UnparseableBiscuit { cookie: String, line: String },

    #[error("{cookie} : only one tart may be specified")]
    MultipleTarts { cookie: String },

    #[error("{cookie} : malformed {field} entry {entry}")]
    MalformedEntry {
        cookie: String,
        field: &'static str,
        entry: String,
    },

    #[error("{cookie} : cookie is already declared earlier in the document")]
    DuplicateCookie { cookie: String },

    #[error("{cookie} : relative target '{target}' must be a previously seen cookie ({line})")]
    ForwardReference {
        cookie: String,
        target: String,
        line: String,
    },

    #[error("{cookie} : no {stat} value available for relative target '{target}'")]
    UnresolvedRelative {
        cookie: String,
        target: String,
        stat: StatKind,
    },

    #[error("{cookie} contains impossible requirements {low} <= {stat} <= {high}")]
    Infeasible {
        cookie: String,
        stat: StatKind,
        low: Decimal,
        high: Decimal,
    },
}

impl CompileError {
    pub fn cookie(&self) -> &str {
        match self {
            CompileError::MissingObjective { cookie }
            | CompileError::DuplicateObjective { cookie }
            | CompileError::ObjectiveWithoutMax { cookie }
            | CompileError::MalformedObjective { cookie, .. }
            | CompileError::UnknownStat { cookie, .. }
            | CompileError::UnknownResonance { cookie, .. }
            | CompileError::Unparseable { cookie, .. }
            | CompileError::UnparseableTart { cookie, .. }
            | CompileError::UnparseableBiscuit { cookie, .. }
            | CompileError::MultipleTarts { cookie }
            | CompileError::MalformedEntry { cookie, .. }
            | CompileError::DuplicateCookie { cookie }
            | CompileError::ForwardReference { cookie, .. }
            | CompileError::UnresolvedRelative { cookie, .. }
            | CompileError::Infeasible { cookie, .. } => cookie,
        }
    }

    /// Stable machine-readable tag for JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::MissingObjective { .. } => "missing_objective",
            CompileError::DuplicateObjective { .. } => "duplicate_objective",
            CompileError::ObjectiveWithoutMax { .. } => "objective_without_max",
            CompileError::MalformedObjective { .. } => "malformed_objective",
            CompileError::UnknownStat { .. } => "unknown_stat",
            CompileError::UnknownResonance { .. } => "unknown_resonance",
            CompileError::Unparseable { .. } => "unparseable",
            CompileError::UnparseableTart { .. } => "unparseable_tart",
            CompileError::UnparseableBiscuit { .. } => "unparseable_biscuit",
            CompileError::MultipleTarts { .. } => "multiple_tarts",
            CompileError::MalformedEntry { .. } => "malformed_entry",
            CompileError::DuplicateCookie { .. } => "duplicate_cookie",
            CompileError::ForwardReference { .. } => "forward_reference",
            CompileError::UnresolvedRelative { .. } => "unresolved_relative",
            CompileError::Infeasible { .. } => "infeasible",
        }
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "cookie":  self.cookie(),
            "kind":    self.kind(),
            "message": self.to_string(),
        })
    }
}

/// A failure that rejects the whole document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("modifiers: unknown stat '{0}'")]
    UnknownModifierStat(String),

    #[error("modifiers: {stat} source '{source_name}' has a non-numeric or out-of-range value")]
    BadModifierValue { stat: String, source_name: String },

    #[error("leaderboard: weight for '{0}' is not an integer")]
    BadLeaderboardWeight(String),

    #[error("cookie directory: {0}")]
    Directory(String),
}

/// Why a topping roll is not legal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToppingError {
    #[error("{stat} is not a topping stat")]
    NotAToppingStat { stat: StatKind },

    #[error("{stat} primary {value} exceeds ceiling {ceiling}")]
    PrimaryAboveCeiling {
        stat: StatKind,
        value: Decimal,
        ceiling: Decimal,
    },

    #[error("{count} secondary stats, at most 4 allowed")]
    TooManySecondary { count: usize },

    #[error("{stat} appears twice among secondary stats")]
    DuplicateSecondary { stat: StatKind },

    #[error("{stat} secondary {value} outside [{min}, {max}]")]
    SecondaryOutOfRange {
        stat: StatKind,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },
}
