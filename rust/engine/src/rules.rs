use crate::cards::{Card, Element};

/// Rounds played before a battle is declared a draw
pub const MAX_ROUNDS: u32 = 100;
/// Rating change for the battle winner
pub const WIN_RATING_DELTA: i32 = 3;
/// Rating change for the battle loser (the result is floored at zero)
pub const LOSS_RATING_DELTA: i32 = -5;

/// One of the two battle participants, in call order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Side {
    /// First player passed to the engine
    First,
    /// Second player passed to the engine
    Second,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

/// Which card of a special interaction takes the round.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RuleWinner {
    /// The card matching `trigger`
    Trigger,
    /// The card matching `victim`
    Victim,
}

/// A named-card-pair override that bypasses damage comparison.
/// Names are matched by case-sensitive substring containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialInteraction {
    pub trigger: &'static str,
    pub victim: &'static str,
    pub winner: RuleWinner,
    pub message: &'static str,
}

/// Fixed rule list. Iteration order is significant: the first matching rule wins.
pub const SPECIAL_INTERACTIONS: [SpecialInteraction; 5] = [
    SpecialInteraction {
        trigger: "Goblin",
        victim: "Dragon",
        winner: RuleWinner::Victim,
        message: "Goblins are too afraid of Dragons to attack.",
    },
    SpecialInteraction {
        trigger: "Wizard",
        victim: "Orc",
        winner: RuleWinner::Trigger,
        message: "Wizards can control Orcs, so Orcs cannot attack Wizards.",
    },
    SpecialInteraction {
        trigger: "Knight",
        victim: "WaterSpell",
        winner: RuleWinner::Victim,
        message: "The armor of Knights is so heavy that WaterSpells make them drown instantly.",
    },
    SpecialInteraction {
        trigger: "Kraken",
        victim: "Spell",
        winner: RuleWinner::Trigger,
        message: "Krakens are immune against all spells.",
    },
    SpecialInteraction {
        trigger: "FireElf",
        victim: "Dragon",
        winner: RuleWinner::Trigger,
        message: "Fire Elves can evade attacks from Dragons, having known them since they were little.",
    },
];

/// A special interaction that fired, and the side it awards the round to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialMatch {
    pub rule: &'static SpecialInteraction,
    pub winner: Side,
}

/// Look up the first special interaction matching the two selected cards.
///
/// Matching is symmetric: a rule fires whether the first or the second card
/// carries the trigger name.
///
/// # Examples
///
/// ```
/// use duelyard_engine::cards::Card;
/// use duelyard_engine::rules::{find_special_interaction, Side};
///
/// let dragon = Card::from_name("d", "Dragon", 50.0);
/// let goblin = Card::from_name("g", "WaterGoblin", 10.0);
///
/// let hit = find_special_interaction(&goblin, &dragon).expect("rule fires");
/// assert_eq!(hit.winner, Side::Second);
/// assert!(hit.rule.message.contains("afraid of Dragons"));
///
/// // Swapping the cards swaps the winning side
/// let hit = find_special_interaction(&dragon, &goblin).expect("rule fires");
/// assert_eq!(hit.winner, Side::First);
/// ```
pub fn find_special_interaction(first: &Card, second: &Card) -> Option<SpecialMatch> {
    SPECIAL_INTERACTIONS.iter().find_map(|rule| {
        let trigger_side = if first.name.contains(rule.trigger) && second.name.contains(rule.victim)
        {
            Side::First
        } else if second.name.contains(rule.trigger) && first.name.contains(rule.victim) {
            Side::Second
        } else {
            return None;
        };
        let winner = match rule.winner {
            RuleWinner::Trigger => trigger_side,
            RuleWinner::Victim => trigger_side.other(),
        };
        Some(SpecialMatch { rule, winner })
    })
}

/// Damage multiplier for a spell of element `attacker` hitting `defender`.
///
/// Returns `None` for same-element and unlisted pairs.
///
/// ```
/// use duelyard_engine::cards::Element;
/// use duelyard_engine::rules::element_multiplier;
///
/// assert_eq!(element_multiplier(Element::Water, Element::Fire), Some(2.0));
/// assert_eq!(element_multiplier(Element::Fire, Element::Water), Some(0.5));
/// assert_eq!(element_multiplier(Element::Normal, Element::Normal), None);
/// ```
pub fn element_multiplier(attacker: Element, defender: Element) -> Option<f64> {
    use Element::{Fire, Normal, Water};
    match (attacker, defender) {
        (Water, Fire) | (Fire, Normal) | (Normal, Water) => Some(2.0),
        (Fire, Water) | (Normal, Fire) | (Water, Normal) => Some(0.5),
        _ => None,
    }
}

/// Outcome of an elemental adjustment attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageAdjustment {
    /// No change applied
    Unchanged,
    /// Damage was scaled from `from` to `to`
    Adjusted { from: f64, to: f64 },
}

/// Scale a spell card's damage by its effectiveness against `opponent`.
///
/// Monsters, unlisted element pairs and zero damage report `Unchanged`. Call this on the
/// round-local copy only.
pub fn adjust_damage_based_on_element(card: &mut Card, opponent: &Card) -> DamageAdjustment {
    if !card.is_spell() {
        return DamageAdjustment::Unchanged;
    }
    match element_multiplier(card.element, opponent.element) {
        Some(multiplier) => {
            let from = card.damage;
            card.damage = from * multiplier;
            if card.damage == from {
                DamageAdjustment::Unchanged
            } else {
                DamageAdjustment::Adjusted {
                    from,
                    to: card.damage,
                }
            }
        }
        None => DamageAdjustment::Unchanged,
    }
}
