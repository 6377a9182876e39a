use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::BattleError;

/// Elemental affinity of a card.
/// Drives the spell effectiveness multipliers in [`crate::rules`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    /// Fire (strong against normal, weak against water)
    Fire,
    /// Water (strong against fire, weak against normal)
    Water,
    /// Normal, sometimes called "regular" in card catalogs
    Normal,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Element::Fire => "fire",
            Element::Water => "water",
            Element::Normal => "normal",
        };
        f.write_str(s)
    }
}

/// Whether a card fights as a creature or as a spell.
/// Only spells are subject to elemental damage adjustment.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    /// Creature card
    Monster,
    /// Spell card
    Spell,
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardKind::Monster => f.write_str("monster"),
            CardKind::Spell => f.write_str("spell"),
        }
    }
}

/// Stable card identity. Ownership transfer and deck bookkeeping compare
/// cards by this value only, never by name.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single battle card.
///
/// `damage` is only ever modified on a round-local copy; the card stored in a
/// player's deck keeps its printed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Identity used for ownership transfer
    pub id: CardId,
    /// Display name, also matched by the special interaction table
    pub name: String,
    /// Printed damage (finite, non-negative)
    pub damage: f64,
    /// Monster or spell
    pub kind: CardKind,
    /// Elemental affinity
    pub element: Element,
    /// Reserved by an open trade offer; locked cards never fight
    #[serde(default)]
    pub locked: bool,
}

impl Card {
    pub fn new(
        id: impl Into<CardId>,
        name: impl Into<String>,
        damage: f64,
        kind: CardKind,
        element: Element,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            damage,
            kind,
            element,
            locked: false,
        }
    }

    /// Build a card whose kind and element follow the catalog naming scheme:
    /// `"...Spell"` names are spells, a `"Water"`/`"Fire"` prefix sets the
    /// element, everything else is a normal monster.
    pub fn from_name(id: impl Into<CardId>, name: impl Into<String>, damage: f64) -> Self {
        let name = name.into();
        let kind = kind_from_name(&name);
        let element = element_from_name(&name);
        Self::new(id, name, damage, kind, element)
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn is_playable(&self) -> bool {
        !self.locked
    }

    pub fn is_spell(&self) -> bool {
        self.kind == CardKind::Spell
    }

    /// Reject damage values the round comparison cannot order.
    pub fn validate(&self) -> Result<(), BattleError> {
        if !self.damage.is_finite() {
            return Err(BattleError::InvalidCard {
                card: self.id.clone(),
                reason: format!("damage {} is not finite", self.damage),
            });
        }
        if self.damage < 0.0 {
            return Err(BattleError::InvalidCard {
                card: self.id.clone(),
                reason: format!("damage {} is negative", self.damage),
            });
        }
        Ok(())
    }
}

impl From<String> for CardId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

pub fn kind_from_name(name: &str) -> CardKind {
    if name.contains("Spell") {
        CardKind::Spell
    } else {
        CardKind::Monster
    }
}

pub fn element_from_name(name: &str) -> Element {
    if name.starts_with("Water") {
        Element::Water
    } else if name.starts_with("Fire") {
        Element::Fire
    } else {
        Element::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_derives_kind_and_element() {
        let spell = Card::from_name("c1", "WaterSpell", 20.0);
        assert_eq!(spell.kind, CardKind::Spell);
        assert_eq!(spell.element, Element::Water);

        let elf = Card::from_name("c2", "FireElf", 15.0);
        assert_eq!(elf.kind, CardKind::Monster);
        assert_eq!(elf.element, Element::Fire);

        let goblin = Card::from_name("c3", "RegularGoblin", 10.0);
        assert_eq!(goblin.kind, CardKind::Monster);
        assert_eq!(goblin.element, Element::Normal);

        let regular_spell = Card::from_name("c4", "RegularSpell", 10.0);
        assert_eq!(regular_spell.kind, CardKind::Spell);
        assert_eq!(regular_spell.element, Element::Normal);
    }

    #[test]
    fn locked_cards_are_not_playable() {
        let card = Card::from_name("c1", "Knight", 30.0);
        assert!(card.is_playable());
        assert!(!card.locked().is_playable());
    }

    #[test]
    fn validate_rejects_negative_and_nan_damage() {
        assert!(Card::from_name("ok", "Ork", 0.0).validate().is_ok());
        assert!(matches!(
            Card::from_name("neg", "Ork", -1.0).validate(),
            Err(BattleError::InvalidCard { .. })
        ));
        assert!(matches!(
            Card::from_name("nan", "Ork", f64::NAN).validate(),
            Err(BattleError::InvalidCard { .. })
        ));
    }

    #[test]
    fn card_serializes_with_lowercase_enums() {
        let card = Card::from_name("c9", "FireSpell", 12.5);
        let json = serde_json::to_value(&card).expect("serialize");
        assert_eq!(json["id"], "c9");
        assert_eq!(json["kind"], "spell");
        assert_eq!(json["element"], "fire");
        assert_eq!(json["locked"], false);
    }
}
