//! Auxiliary input files: topping loadouts and sibling stat tables.

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_yaml_ng::Value;
use topping_core::document::yaml_decimal;
use topping_core::{Resonance, SiblingTable, StatKind, Topping, ToppingError};

#[derive(Debug, thiserror::Error)]
pub(crate) enum InputError {
    #[error("error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing YAML in '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("topping {index}: unknown stat '{name}'")]
    UnknownStat { index: usize, name: String },

    #[error("topping {index}: {stat} value is not a number")]
    BadValue { index: usize, stat: String },

    #[error("topping {index}: unknown resonance '{name}'")]
    UnknownResonance { index: usize, name: String },

    #[error("topping {index}: {source}")]
    InvalidTopping {
        index: usize,
        #[source]
        source: ToppingError,
    },

    #[error("siblings: {cookie}: bad entry for '{stat}'")]
    BadSibling { cookie: String, stat: String },
}

#[derive(Debug, Deserialize)]
struct ToppingEntry {
    primary: (String, Value),
    #[serde(default)]
    substats: Vec<(String, Value)>,
    #[serde(default)]
    resonance: Option<String>,
}

fn read(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|e| InputError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn parse_yaml<T: serde::de::DeserializeOwned>(path: &Path, text: &str) -> Result<T, InputError> {
    serde_yaml_ng::from_str(text).map_err(|e| InputError::Yaml {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load and validate a list of toppings. Indices in errors are 1-based.
pub(crate) fn load_loadout(path: &Path) -> Result<Vec<Topping>, InputError> {
    let entries: Vec<ToppingEntry> = parse_yaml(path, &read(path)?)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| build_topping(idx + 1, entry))
        .collect()
}

fn build_topping(index: usize, entry: ToppingEntry) -> Result<Topping, InputError> {
    let roll = |(name, value): &(String, Value)| -> Result<(StatKind, Decimal), InputError> {
        let stat = StatKind::from_name(name).ok_or_else(|| InputError::UnknownStat {
            index,
            name: name.clone(),
        })?;
        let value = yaml_decimal(value).ok_or_else(|| InputError::BadValue {
            index,
            stat: name.clone(),
        })?;
        Ok((stat, value))
    };

    let primary = roll(&entry.primary)?;
    let secondary = entry
        .substats
        .iter()
        .map(roll)
        .collect::<Result<Vec<_>, _>>()?;
    let resonance = match &entry.resonance {
        None => None,
        Some(name) => Some(Resonance::from_name(name).ok_or_else(|| {
            InputError::UnknownResonance {
                index,
                name: name.clone(),
            }
        })?),
    };

    let topping = Topping::new(primary, secondary, resonance);
    topping
        .validate()
        .map_err(|source| InputError::InvalidTopping { index, source })?;
    Ok(topping)
}

/// Load `Cookie Name: { STAT: value, ... }` into a sibling table.
pub(crate) fn load_siblings(path: &Path) -> Result<SiblingTable, InputError> {
    let raw: BTreeMap<String, BTreeMap<String, Value>> = parse_yaml(path, &read(path)?)?;
    let mut table = SiblingTable::new();
    for (cookie, stats) in raw {
        for (name, value) in stats {
            let parsed = StatKind::from_name(&name).zip(yaml_decimal(&value));
            let Some((stat, value)) = parsed else {
                return Err(InputError::BadSibling {
                    cookie,
                    stat: name,
                });
            };
            table.insert(&cookie, stat, value);
        }
    }
    Ok(table)
}
