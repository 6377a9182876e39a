//! `rules` command: the fixed battle rules in readable form.

use crate::error::CliError;
use duelyard_engine::cards::Element;
use duelyard_engine::rules::{
    element_multiplier, RuleWinner, LOSS_RATING_DELTA, MAX_ROUNDS, SPECIAL_INTERACTIONS,
    WIN_RATING_DELTA,
};
use std::io::Write;

const ELEMENTS: [Element; 3] = [Element::Water, Element::Fire, Element::Normal];

pub fn handle_rules_command(out: &mut dyn Write) -> Result<(), CliError> {
    writeln!(out, "Special interactions (first match wins):")?;
    for (i, rule) in SPECIAL_INTERACTIONS.iter().enumerate() {
        let winner = match rule.winner {
            RuleWinner::Trigger => rule.trigger,
            RuleWinner::Victim => rule.victim,
        };
        writeln!(
            out,
            "  {}. {} vs {}: {} wins. {}",
            i + 1,
            rule.trigger,
            rule.victim,
            winner,
            rule.message
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Element chart (spells only, attacker vs defender):")?;
    for attacker in ELEMENTS {
        for defender in ELEMENTS {
            if let Some(factor) = element_multiplier(attacker, defender) {
                writeln!(out, "  {} vs {}: x{}", attacker, defender, factor)?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "A battle is a draw after {} rounds.", MAX_ROUNDS)?;
    writeln!(
        out,
        "Rating: winner {:+}, loser {:+} (never below 0).",
        WIN_RATING_DELTA, LOSS_RATING_DELTA
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_rules_in_order() {
        let mut out = Vec::new();
        handle_rules_command(&mut out).expect("rules");
        let text = String::from_utf8(out).expect("utf8");

        let goblin = text.find("1. Goblin vs Dragon: Dragon wins.").expect("goblin rule");
        let elf = text.find("5. FireElf vs Dragon: FireElf wins.").expect("elf rule");
        assert!(goblin < elf);
        assert!(text.contains("water vs fire: x2"));
        assert!(text.contains("fire vs water: x0.5"));
        assert!(!text.contains("water vs water"));
        assert!(text.contains("draw after 100 rounds"));
        assert!(text.contains("winner +3, loser -5"));
    }
}
