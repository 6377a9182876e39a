use std::sync::Arc;

use crate::cards::Card;

/// Persistence callbacks the engine invokes while resolving a battle.
///
/// All calls are fire-and-forget: implementations swallow their own failures
/// and the engine never rolls a round back because of them. They may be
/// invoked from whatever thread runs the battle, so implementations guard
/// their own state.
pub trait BattleEffects: Send + Sync {
    /// Change `username`'s rating by `delta`, flooring at zero.
    fn update_rating(&self, username: &str, delta: i32);

    fn record_win(&self, username: &str);

    fn record_loss(&self, username: &str);

    /// `card` now belongs to `new_owner`.
    fn transfer_card_ownership(&self, new_owner: &str, card: &Card);
}

/// Effects sink that discards every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEffects;

impl BattleEffects for NoopEffects {
    fn update_rating(&self, _username: &str, _delta: i32) {}
    fn record_win(&self, _username: &str) {}
    fn record_loss(&self, _username: &str) {}
    fn transfer_card_ownership(&self, _new_owner: &str, _card: &Card) {}
}

impl<T: BattleEffects + ?Sized> BattleEffects for &T {
    fn update_rating(&self, username: &str, delta: i32) {
        (**self).update_rating(username, delta)
    }
    fn record_win(&self, username: &str) {
        (**self).record_win(username)
    }
    fn record_loss(&self, username: &str) {
        (**self).record_loss(username)
    }
    fn transfer_card_ownership(&self, new_owner: &str, card: &Card) {
        (**self).transfer_card_ownership(new_owner, card)
    }
}

impl<T: BattleEffects + ?Sized> BattleEffects for Arc<T> {
    fn update_rating(&self, username: &str, delta: i32) {
        (**self).update_rating(username, delta)
    }
    fn record_win(&self, username: &str) {
        (**self).record_win(username)
    }
    fn record_loss(&self, username: &str) {
        (**self).record_loss(username)
    }
    fn transfer_card_ownership(&self, new_owner: &str, card: &Card) {
        (**self).transfer_card_ownership(new_owner, card)
    }
}
