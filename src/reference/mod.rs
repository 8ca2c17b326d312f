//! Static reference data: realms and playable classes.
//!
//! Loaded once at start and passed explicitly to whatever validates or renders
//! characters. The record itself never consults it.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::identity::Character;

const CLASSIC_REALMS: [&str; 37] = [
    "Amnennar",
    "Ashbringer",
    "Auberdine",
    "Bloodfang",
    "Chromie",
    "Dragon's Call",
    "Dreadmist",
    "Everlook",
    "Finkle",
    "Firemaw",
    "Flamegor",
    "Flamelash",
    "Gandling",
    "Gehennas",
    "Golemagg",
    "Hydraxian Waterlords",
    "Judgement",
    "Lakeshire",
    "Lucifron",
    "Mirage Raceway",
    "Mograine",
    "Nethergarde Keep",
    "Noggenfogger",
    "Patchwerk",
    "Pyrewood Village",
    "Razorfen",
    "Razorgore",
    "Rhok'delar",
    "Shazzrah",
    "Skullflame",
    "Stonespine",
    "Sulfuron",
    "Ten Storms",
    "Transcendence",
    "Venoxis",
    "Wyrmthalak",
    "Zandalar Tribe",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("unknown realm: {0}")]
    UnknownRealm(String),
    #[error("unknown class: {0}")]
    UnknownClass(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realm {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterClass {
    Warrior,
    Paladin,
    Mage,
    Druid,
    Shaman,
    Warlock,
    Rogue,
    Priest,
}

impl CharacterClass {
    pub const ALL: [Self; 8] = [
        Self::Warrior,
        Self::Paladin,
        Self::Mage,
        Self::Druid,
        Self::Shaman,
        Self::Warlock,
        Self::Rogue,
        Self::Priest,
    ];

    /// Name used in character records and icon paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Paladin => "paladin",
            Self::Mage => "mage",
            Self::Druid => "druid",
            Self::Shaman => "shaman",
            Self::Warlock => "warlock",
            Self::Rogue => "rogue",
            Self::Priest => "priest",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacterClass {
    type Err = ReferenceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ReferenceError::UnknownClass(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub realms: Vec<Realm>,
    pub classes: Vec<CharacterClass>,
}

impl ReferenceData {
    /// The realm list and classes the site launched with.
    #[must_use]
    pub fn classic() -> Self {
        let realms = CLASSIC_REALMS
            .iter()
            .zip(0u32..)
            .map(|(name, id)| Realm {
                id,
                name: (*name).to_string(),
            })
            .collect();

        Self {
            realms,
            classes: CharacterClass::ALL.to_vec(),
        }
    }

    /// Case-insensitive realm lookup.
    #[must_use]
    pub fn realm(&self, name: &str) -> Option<&Realm> {
        let wanted = name.trim();
        self.realms
            .iter()
            .find(|realm| realm.name.eq_ignore_ascii_case(wanted))
    }

    /// # Errors
    /// Returns `ReferenceError::UnknownClass` if `name` is not a class offered
    /// by this data set.
    pub fn class(&self, name: &str) -> Result<CharacterClass, ReferenceError> {
        let class: CharacterClass = name.parse()?;
        if self.classes.contains(&class) {
            Ok(class)
        } else {
            Err(ReferenceError::UnknownClass(name.to_string()))
        }
    }

    /// Check a character's realm and class before it is added to a roster.
    ///
    /// # Errors
    /// Returns `ReferenceError::UnknownRealm` or `ReferenceError::UnknownClass`.
    pub fn validate(&self, character: &Character) -> Result<(), ReferenceError> {
        if self.realm(&character.realm).is_none() {
            return Err(ReferenceError::UnknownRealm(character.realm.clone()));
        }
        self.class(&character.class_name)?;
        Ok(())
    }

    /// Rewrite realm and class to their canonical spelling.
    ///
    /// # Errors
    /// Same as [`ReferenceData::validate`].
    pub fn canonicalize(&self, mut character: Character) -> Result<Character, ReferenceError> {
        let realm = self
            .realm(&character.realm)
            .ok_or_else(|| ReferenceError::UnknownRealm(character.realm.clone()))?;
        character.realm.clone_from(&realm.name);
        character.class_name = self.class(&character.class_name)?.as_str().to_string();
        Ok(character)
    }
}
