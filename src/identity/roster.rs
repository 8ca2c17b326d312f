//! Character roster and the primary-character pointer.
//!
//! The primary character is stored by name and resolved on every read. When
//! the named character is removed the pointer is left as-is and simply stops
//! resolving, so [`UserRecord::primary_character`] returns `None` and
//! [`UserRecord::class_icon`] falls back to the placeholder icon.

use serde::{Deserialize, Serialize};

use super::{error::RosterError, record::UserRecord};

const CLASS_ICON_DIR: &str = "/images/profileicons";
const FALLBACK_CLASS_ICON: &str = "egg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub realm: String,
    pub name: String,
    pub faction: String,
    pub class_name: String,
    pub role: String,
    pub level: u32,
}

impl Character {
    #[must_use]
    pub fn new(
        realm: &str,
        name: &str,
        faction: &str,
        class_name: &str,
        role: &str,
        level: u32,
    ) -> Self {
        Self {
            realm: realm.to_string(),
            name: name.to_string(),
            faction: faction.to_string(),
            class_name: class_name.to_string(),
            role: role.to_string(),
            level,
        }
    }
}

impl UserRecord {
    /// Roster in insertion (display) order.
    #[must_use]
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    #[must_use]
    pub fn character(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|character| character.name == name)
    }

    /// The stored pointer, which may not resolve.
    #[must_use]
    pub fn primary_character_name(&self) -> Option<&str> {
        self.primary_character.as_deref()
    }

    #[must_use]
    pub fn primary_character(&self) -> Option<&Character> {
        self.primary_character
            .as_deref()
            .and_then(|name| self.character(name))
    }

    /// Profile icon for the primary character, or the placeholder when there
    /// is none (even if the roster is not empty).
    #[must_use]
    pub fn class_icon(&self) -> String {
        let class_file = self
            .primary_character()
            .map_or(FALLBACK_CLASS_ICON, |character| character.class_name.as_str());
        format!("{CLASS_ICON_DIR}/{class_file}.png")
    }

    /// # Errors
    /// Returns `RosterError::DuplicateCharacterName` if the name is taken.
    pub fn add_character(&mut self, character: Character) -> Result<(), RosterError> {
        if self.character(&character.name).is_some() {
            return Err(RosterError::DuplicateCharacterName(character.name));
        }

        self.characters.push(character);
        self.touch();
        Ok(())
    }

    /// Removes the named character; absent names are a no-op. The primary
    /// pointer is not cleared.
    pub fn remove_character(&mut self, name: &str) -> Option<Character> {
        let index = self
            .characters
            .iter()
            .position(|character| character.name == name)?;
        let removed = self.characters.remove(index);
        self.touch();
        Some(removed)
    }

    /// # Errors
    /// Returns `RosterError::UnknownCharacter` if no roster entry has `name`;
    /// the current pointer is kept.
    pub fn set_primary_character(&mut self, name: &str) -> Result<(), RosterError> {
        if self.character(name).is_none() {
            return Err(RosterError::UnknownCharacter(name.to_string()));
        }

        self.primary_character = Some(name.to_string());
        self.touch();
        Ok(())
    }
}
