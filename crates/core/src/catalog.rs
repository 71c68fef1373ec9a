//! Stat catalog: stat kinds, resonance tags, and the per-stat info table.
//!
//! Everything here is static data. Values are exact decimals; the game
//! displays every roll with at most one fractional digit.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

// ──────────────────────────────────────────────
// Stat kinds
// ──────────────────────────────────────────────

/// Identifier for a substat, attribute, or synthetic objective selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatKind {
    // topping substats
    DmgResist,
    Atk,
    Cooldown,
    AtkSpd,
    Crit,
    Hp,
    AmplifyBuff,
    Def,
    DebuffResist,
    CritResist,
    // elemental damage (biscuit / objective overrides only)
    DarkDmg,
    ElecDmg,
    FireDmg,
    EarthDmg,
    PoisonDmg,
    LightDmg,
    // attributes
    CritDmg,
    AtkMult,
    // objective selectors
    Combo,
    ExpectedDamage,
    Vitality,
}

/// The ten stats a topping can roll, in catalog order.
pub const TOPPING_STATS: [StatKind; 10] = [
    StatKind::DmgResist,
    StatKind::Atk,
    StatKind::Cooldown,
    StatKind::AtkSpd,
    StatKind::Crit,
    StatKind::Hp,
    StatKind::AmplifyBuff,
    StatKind::Def,
    StatKind::DebuffResist,
    StatKind::CritResist,
];

pub const ELEMENTAL_DMG: [StatKind; 6] = [
    StatKind::DarkDmg,
    StatKind::ElecDmg,
    StatKind::FireDmg,
    StatKind::EarthDmg,
    StatKind::PoisonDmg,
    StatKind::LightDmg,
];

const ALL_STATS: [StatKind; 21] = [
    StatKind::DmgResist,
    StatKind::Atk,
    StatKind::Cooldown,
    StatKind::AtkSpd,
    StatKind::Crit,
    StatKind::Hp,
    StatKind::AmplifyBuff,
    StatKind::Def,
    StatKind::DebuffResist,
    StatKind::CritResist,
    StatKind::DarkDmg,
    StatKind::ElecDmg,
    StatKind::FireDmg,
    StatKind::EarthDmg,
    StatKind::PoisonDmg,
    StatKind::LightDmg,
    StatKind::CritDmg,
    StatKind::AtkMult,
    StatKind::Combo,
    StatKind::ExpectedDamage,
    StatKind::Vitality,
];

impl StatKind {
    /// Canonical display name, as written in requirement documents.
    pub fn name(self) -> &'static str {
        match self {
            StatKind::DmgResist => "DMG Resist",
            StatKind::Atk => "ATK",
            StatKind::Cooldown => "Cooldown",
            StatKind::AtkSpd => "ATK SPD",
            StatKind::Crit => "CRIT%",
            StatKind::Hp => "HP",
            StatKind::AmplifyBuff => "Amplify Buff",
            StatKind::Def => "DEF",
            StatKind::DebuffResist => "Debuff Resist",
            StatKind::CritResist => "CRIT Resist",
            StatKind::DarkDmg => "DARK DMG",
            StatKind::ElecDmg => "ELEC DMG",
            StatKind::FireDmg => "FIRE DMG",
            StatKind::EarthDmg => "EARTH DMG",
            StatKind::PoisonDmg => "POISON DMG",
            StatKind::LightDmg => "LIGHT DMG",
            StatKind::CritDmg => "CRIT DMG",
            StatKind::AtkMult => "ATK MULT",
            StatKind::Combo => "Combo",
            StatKind::ExpectedDamage => "E[DMG]",
            StatKind::Vitality => "Vitality",
        }
    }

    /// Look up a stat by display name or compact alias, ignoring case and
    /// surrounding whitespace.
    pub fn from_name(name: &str) -> Option<StatKind> {
        let needle = name.trim();
        if needle.is_empty() {
            return None;
        }
        ALL_STATS.iter().copied().find(|kind| {
            kind.name().eq_ignore_ascii_case(needle)
                || kind
                    .info()
                    .is_some_and(|info| info.medium.eq_ignore_ascii_case(needle))
        })
    }

    /// Catalog entry for topping stats; `None` for everything else.
    pub fn info(self) -> Option<&'static StatInfo> {
        TOPPING_STATS
            .iter()
            .position(|k| *k == self)
            .map(|idx| &INFO[idx])
    }

    pub fn is_topping_stat(self) -> bool {
        self.info().is_some()
    }

    pub fn is_objective_selector(self) -> bool {
        matches!(
            self,
            StatKind::Combo | StatKind::ExpectedDamage | StatKind::Vitality
        )
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for StatKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ──────────────────────────────────────────────
// Resonance
// ──────────────────────────────────────────────

/// Resonance tag of a topping or a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resonance {
    Normal,
    Moonkissed,
    Trio,
    Draconic,
    TropicalRock,
    SeaSalt,
    RadiantCheese,
    FrostedCrystal,
    LifeSprouting,
    Destructive,
    Fragrant,
    IrisGem,
    Deceitful,
    Truthful,
    SacredVow,
}

const ALL_RESONANCES: [Resonance; 15] = [
    Resonance::Normal,
    Resonance::Moonkissed,
    Resonance::Trio,
    Resonance::Draconic,
    Resonance::TropicalRock,
    Resonance::SeaSalt,
    Resonance::RadiantCheese,
    Resonance::FrostedCrystal,
    Resonance::LifeSprouting,
    Resonance::Destructive,
    Resonance::Fragrant,
    Resonance::IrisGem,
    Resonance::Deceitful,
    Resonance::Truthful,
    Resonance::SacredVow,
];

impl Resonance {
    pub fn name(self) -> &'static str {
        match self {
            Resonance::Normal => "Normal",
            Resonance::Moonkissed => "Moonkissed",
            Resonance::Trio => "Trio",
            Resonance::Draconic => "Draconic",
            Resonance::TropicalRock => "Tropical Rock",
            Resonance::SeaSalt => "Sea Salt",
            Resonance::RadiantCheese => "Radiant Cheese",
            Resonance::FrostedCrystal => "Frosted Crystal",
            Resonance::LifeSprouting => "Life-sprouting",
            Resonance::Destructive => "Destructive",
            Resonance::Fragrant => "Fragrant",
            Resonance::IrisGem => "Iris Gem",
            Resonance::Deceitful => "Deceitful",
            Resonance::Truthful => "Truthful",
            Resonance::SacredVow => "Sacred Vow",
        }
    }

    pub fn from_name(name: &str) -> Option<Resonance> {
        let needle = name.trim();
        ALL_RESONANCES
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(needle))
    }
}

impl fmt::Display for Resonance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Resonance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ──────────────────────────────────────────────
// Stat info table
// ──────────────────────────────────────────────

/// Static description of one topping stat.
#[derive(Debug)]
pub struct StatInfo {
    pub kind: StatKind,
    /// Topping name, e.g. "Searing Raspberry".
    pub topping: &'static str,
    /// Three-letter tag used in compact renderings.
    pub short: &'static str,
    /// Compact alias, also accepted by [`StatKind::from_name`].
    pub medium: &'static str,
    /// Ceiling on the primary value of a single topping.
    pub value: Decimal,
    /// Set-bonus schedule: (matching primary count, bonus). Thresholds are
    /// strictly increasing and bonuses non-decreasing.
    pub combos: &'static [(usize, Decimal)],
    /// Smallest legal secondary roll.
    pub minsub: Decimal,
    /// Largest legal secondary roll.
    pub maxsub: Decimal,
}

const fn d(num: u32, scale: u32) -> Decimal {
    Decimal::from_parts(num, 0, 0, false, scale)
}

/// Indexed in [`TOPPING_STATS`] order.
static INFO: [StatInfo; 10] = [
    StatInfo {
        kind: StatKind::DmgResist,
        topping: "Solid Almond",
        short: "DRS",
        medium: "DMGRES",
        value: d(41, 1),
        combos: &[(2, d(3, 0)), (3, d(7, 0)), (5, d(8, 0)), (6, d(10, 0))],
        minsub: d(1, 0),
        maxsub: d(6, 0),
    },
    StatInfo {
        kind: StatKind::Atk,
        topping: "Searing Raspberry",
        short: "ATK",
        medium: "ATK",
        value: d(9, 0),
        combos: &[(2, d(4, 0)), (3, d(8, 0)), (5, d(10, 0)), (6, d(12, 0))],
        minsub: d(1, 0),
        maxsub: d(3, 0),
    },
    StatInfo {
        kind: StatKind::Cooldown,
        topping: "Swift Chocolate",
        short: "CD",
        medium: "CD",
        value: d(3, 0),
        combos: &[(2, d(2, 0)), (3, d(4, 0)), (5, d(5, 0)), (6, d(6, 0))],
        minsub: d(1, 0),
        maxsub: d(2, 0),
    },
    StatInfo {
        kind: StatKind::AtkSpd,
        topping: "Bouncy Caramel",
        short: "SPD",
        medium: "ATKSPD",
        value: d(41, 1),
        combos: &[(2, d(7, 0)), (3, d(8, 0)), (5, d(10, 0)), (6, d(12, 0))],
        minsub: d(1, 0),
        maxsub: d(3, 0),
    },
    StatInfo {
        kind: StatKind::Crit,
        topping: "Juicy Apple Jelly",
        short: "CRT",
        medium: "CRIT",
        value: d(9, 0),
        combos: &[(2, d(4, 0)), (3, d(6, 0)), (5, d(8, 0)), (6, d(10, 0))],
        minsub: d(1, 0),
        maxsub: d(3, 0),
    },
    StatInfo {
        kind: StatKind::Hp,
        topping: "Healthy Peanut",
        short: "HP",
        medium: "HP",
        value: d(9, 0),
        combos: &[(2, d(4, 0)), (3, d(10, 0)), (5, d(12, 0)), (6, d(15, 0))],
        minsub: d(1, 0),
        maxsub: d(3, 0),
    },
    StatInfo {
        kind: StatKind::AmplifyBuff,
        topping: "Sweet Candy",
        short: "BUF",
        medium: "BUFF",
        value: d(3, 0),
        combos: &[(2, d(9, 0)), (3, d(10, 0)), (5, d(11, 0)), (6, d(12, 0))],
        minsub: d(1, 0),
        maxsub: d(2, 0),
    },
    StatInfo {
        kind: StatKind::Def,
        topping: "Hard Walnut",
        short: "DEF",
        medium: "DEF",
        value: d(9, 0),
        combos: &[(2, d(10, 0)), (3, d(13, 0)), (5, d(20, 0)), (6, d(25, 0))],
        minsub: d(1, 0),
        maxsub: d(3, 0),
    },
    StatInfo {
        kind: StatKind::DebuffResist,
        topping: "Fresh Kiwi",
        short: "DBF",
        medium: "BUFFRES",
        value: d(3, 0),
        combos: &[(2, d(10, 0)), (3, d(11, 0)), (5, d(12, 0)), (6, d(13, 0))],
        minsub: d(1, 0),
        maxsub: d(2, 0),
    },
    StatInfo {
        kind: StatKind::CritResist,
        topping: "Hearty Hazelnut",
        short: "CRS",
        medium: "CRITRES",
        value: d(45, 1),
        combos: &[(2, d(20, 0)), (3, d(25, 0)), (5, d(30, 0)), (6, d(35, 0))],
        minsub: d(3, 0),
        maxsub: d(4, 0),
    },
];
