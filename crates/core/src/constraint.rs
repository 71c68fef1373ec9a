//! Constraint language: the four textual requirement forms and their
//! lowering to primitive bounds.
//!
//! ```text
//! Minimum    STAT >= N
//! Range      L <= STAT <= H      or      STAT <= H
//! Equality   STAT = N            (also ==)
//! Relative   STAT OP COOKIE [+|- N]      OP in >=, >, <=, <
//! ```
//!
//! `≥` and `≤` are accepted for `>=` and `<=`; a number may carry a trailing
//! `%`. Forms are tried in [`PARSE_ORDER`] and the first match wins, so an
//! ambiguous line resolves by priority rather than by best fit.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::StatKind;

/// Smallest step the game displays for any stat value.
pub const INCREMENT: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Largest magnitude accepted for any number read from a document.
pub const MAX_INPUT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

// ──────────────────────────────────────────────
// Primitive bounds
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BoundOp {
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = "<=")]
    AtMost,
}

impl BoundOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BoundOp::AtLeast => ">=",
            BoundOp::AtMost => "<=",
        }
    }
}

/// `substat >= target` or `substat <= target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bound {
    pub substat: StatKind,
    pub op: BoundOp,
    pub target: Decimal,
}

impl Bound {
    pub fn at_least(substat: StatKind, target: Decimal) -> Self {
        Bound {
            substat,
            op: BoundOp::AtLeast,
            target,
        }
    }

    pub fn at_most(substat: StatKind, target: Decimal) -> Self {
        Bound {
            substat,
            op: BoundOp::AtMost,
            target,
        }
    }

    /// Subtract a guaranteed bonus, never below zero.
    pub fn offset(self, bonus: Decimal) -> Self {
        Bound {
            target: self.target.saturating_sub(bonus).max(Decimal::ZERO),
            ..self
        }
    }

    /// Widen by one [`INCREMENT`] toward the looser side. Hard exclusions
    /// (`<= 0`) are left as they are.
    pub fn fuzz(self) -> Self {
        let target = match self.op {
            BoundOp::AtLeast => self.target.saturating_sub(INCREMENT).max(Decimal::ZERO),
            BoundOp::AtMost if self.target.is_zero() => self.target,
            BoundOp::AtMost => self.target.saturating_add(INCREMENT),
        };
        Bound { target, ..self }
    }

    pub fn holds(&self, value: Decimal) -> bool {
        match self.op {
            BoundOp::AtLeast => value >= self.target,
            BoundOp::AtMost => value <= self.target,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.substat, self.op.symbol(), self.target)
    }
}

/// Keep only the tightest bound per (stat, direction).
///
/// The output is sorted by stat then direction, so the result does not
/// depend on input order and collapsing twice changes nothing.
pub fn collapse(bounds: &[Bound]) -> Vec<Bound> {
    let mut tightest: BTreeMap<(StatKind, BoundOp), Decimal> = BTreeMap::new();
    for bound in bounds {
        tightest
            .entry((bound.substat, bound.op))
            .and_modify(|current| {
                *current = match bound.op {
                    BoundOp::AtLeast => (*current).max(bound.target),
                    BoundOp::AtMost => (*current).min(bound.target),
                }
            })
            .or_insert(bound.target);
    }
    tightest
        .into_iter()
        .map(|((substat, op), target)| Bound {
            substat,
            op,
            target,
        })
        .collect()
}

// ──────────────────────────────────────────────
// Constraint forms
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minimum {
    pub substat: StatKind,
    pub target: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub substat: StatKind,
    pub low_target: Decimal,
    pub high_target: Decimal,
}

/// Exact value. Also the shape of tart and biscuit lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Equality {
    pub substat: StatKind,
    pub target: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeOp {
    Greater,
    GreaterEq,
    Less,
    LessEq,
}

impl RelativeOp {
    pub fn symbol(self) -> &'static str {
        match self {
            RelativeOp::Greater => ">",
            RelativeOp::GreaterEq => ">=",
            RelativeOp::Less => "<",
            RelativeOp::LessEq => "<=",
        }
    }
}

/// Compare against the same stat of another cookie's loadout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relative {
    pub substat: StatKind,
    pub op: RelativeOp,
    pub cookie: String,
    pub offset: Decimal,
}

impl Relative {
    /// Turn into a concrete bound once the sibling's value is known.
    pub fn resolve(&self, sibling_value: Decimal) -> Bound {
        let base = sibling_value.saturating_add(self.offset);
        let target = match self.op {
            RelativeOp::Greater => base.saturating_add(INCREMENT),
            RelativeOp::Less => base.saturating_sub(INCREMENT),
            RelativeOp::GreaterEq | RelativeOp::LessEq => base,
        }
        .max(Decimal::ZERO);
        match self.op {
            RelativeOp::Greater | RelativeOp::GreaterEq => Bound::at_least(self.substat, target),
            RelativeOp::Less | RelativeOp::LessEq => Bound::at_most(self.substat, target),
        }
    }
}

/// A parsed requirement line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Minimum(Minimum),
    Range(Range),
    Equality(Equality),
    Relative(Relative),
}

impl Constraint {
    pub fn substat(&self) -> StatKind {
        match self {
            Constraint::Minimum(c) => c.substat,
            Constraint::Range(c) => c.substat,
            Constraint::Equality(c) => c.substat,
            Constraint::Relative(c) => c.substat,
        }
    }

    pub fn as_relative(&self) -> Option<&Relative> {
        match self {
            Constraint::Relative(r) => Some(r),
            _ => None,
        }
    }

    /// Bounds for every form except Relative, which needs
    /// [`Relative::resolve`] and yields `None` here.
    pub fn bounds(&self) -> Option<Vec<Bound>> {
        match self {
            Constraint::Minimum(c) => Some(vec![Bound::at_least(c.substat, c.target)]),
            Constraint::Range(c) => {
                let mut out = Vec::with_capacity(2);
                if c.low_target > Decimal::ZERO {
                    out.push(Bound::at_least(c.substat, c.low_target));
                }
                out.push(Bound::at_most(c.substat, c.high_target));
                Some(out)
            }
            Constraint::Equality(c) => Some(vec![
                Bound::at_least(c.substat, c.target),
                Bound::at_most(c.substat, c.target),
            ]),
            Constraint::Relative(_) => None,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Minimum(c) => write!(f, "{} >= {}", c.substat, c.target),
            Constraint::Range(c) if c.low_target.is_zero() => {
                write!(f, "{} <= {}", c.substat, c.high_target)
            }
            Constraint::Range(c) => {
                write!(f, "{} <= {} <= {}", c.low_target, c.substat, c.high_target)
            }
            Constraint::Equality(c) => write!(f, "{}", c),
            Constraint::Relative(c) => {
                write!(f, "{} {} {}", c.substat, c.op.symbol(), c.cookie)?;
                if c.offset > Decimal::ZERO {
                    write!(f, " + {}", c.offset)?;
                } else if c.offset < Decimal::ZERO {
                    write!(f, " - {}", -c.offset)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Equality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.substat, self.target)
    }
}

// ──────────────────────────────────────────────
// Parsing
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintForm {
    Minimum,
    Range,
    Equality,
    Relative,
}

/// Order in which forms are tried. Changing it changes how ambiguous
/// lines resolve.
pub const PARSE_ORDER: [ConstraintForm; 4] = [
    ConstraintForm::Minimum,
    ConstraintForm::Range,
    ConstraintForm::Equality,
    ConstraintForm::Relative,
];

impl ConstraintForm {
    pub fn parse(self, text: &str) -> Option<Constraint> {
        let text = normalize_ops(text);
        match self {
            ConstraintForm::Minimum => parse_minimum(&text).map(Constraint::Minimum),
            ConstraintForm::Range => parse_range(&text).map(Constraint::Range),
            ConstraintForm::Equality => parse_equality(&text).map(Constraint::Equality),
            ConstraintForm::Relative => parse_relative(&text).map(Constraint::Relative),
        }
    }
}

/// Parse a requirement line with the first form in [`PARSE_ORDER`] that
/// accepts it.
pub fn parse_constraint(text: &str) -> Option<Constraint> {
    PARSE_ORDER.iter().find_map(|form| form.parse(text))
}

/// Parse a tart or biscuit line, which only come in the equality form.
pub fn parse_equality_line(text: &str) -> Option<Equality> {
    parse_equality(&normalize_ops(text))
}

fn normalize_ops(text: &str) -> String {
    text.replace('≥', ">=").replace('≤', "<=")
}

fn parse_number(text: &str) -> Option<Decimal> {
    let text = text.trim();
    let text = text.strip_suffix('%').unwrap_or(text).trim_end();
    let value = Decimal::from_str(text).ok()?;
    if (value.is_sign_negative() && !value.is_zero()) || value > MAX_INPUT {
        return None;
    }
    Some(value)
}

fn parse_stat(text: &str) -> Option<StatKind> {
    StatKind::from_name(text)
}

fn parse_minimum(text: &str) -> Option<Minimum> {
    if text.contains("<=") {
        return None;
    }
    let (lhs, rhs) = text.split_once(">=")?;
    if rhs.contains(">=") {
        return None;
    }
    Some(Minimum {
        substat: parse_stat(lhs)?,
        target: parse_number(rhs)?,
    })
}

fn parse_range(text: &str) -> Option<Range> {
    if text.contains(">=") {
        return None;
    }
    let parts: Vec<&str> = text.split("<=").collect();
    match parts.as_slice() {
        [stat, high] => Some(Range {
            substat: parse_stat(stat)?,
            low_target: Decimal::ZERO,
            high_target: parse_number(high)?,
        }),
        [low, stat, high] => Some(Range {
            substat: parse_stat(stat)?,
            low_target: parse_number(low)?,
            high_target: parse_number(high)?,
        }),
        _ => None,
    }
}

fn parse_equality(text: &str) -> Option<Equality> {
    if text.contains('<') || text.contains('>') {
        return None;
    }
    let text = text.replace("==", "=");
    let (lhs, rhs) = text.split_once('=')?;
    if rhs.contains('=') {
        return None;
    }
    Some(Equality {
        substat: parse_stat(lhs)?,
        target: parse_number(rhs)?,
    })
}

fn parse_relative(text: &str) -> Option<Relative> {
    // two-character operators first so ">=" is not read as ">"
    let candidates = [
        (">=", RelativeOp::GreaterEq),
        ("<=", RelativeOp::LessEq),
        (">", RelativeOp::Greater),
        ("<", RelativeOp::Less),
    ];
    let (symbol, op) = candidates
        .iter()
        .find(|(symbol, _)| text.contains(symbol))?;
    let (lhs, rhs) = text.split_once(symbol)?;
    if rhs.contains('<') || rhs.contains('>') || rhs.contains('=') {
        return None;
    }
    let substat = parse_stat(lhs)?;

    let tokens: Vec<&str> = rhs.split_whitespace().collect();
    let (name_tokens, offset) = match tokens.as_slice() {
        [name @ .., sign, amount] if (*sign == "+" || *sign == "-") && !name.is_empty() => {
            let amount = parse_number(amount)?;
            let offset = if *sign == "-" { -amount } else { amount };
            (name, offset)
        }
        all => (all, Decimal::ZERO),
    };
    if name_tokens.is_empty() {
        return None;
    }
    let cookie = name_tokens.join(" ");
    // a target that reads like a number is a malformed bound, not a cookie
    if cookie.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.')) {
        return None;
    }
    Some(Relative {
        substat,
        op: *op,
        cookie,
        offset,
    })
}
