//! Turn counter

use super::subscribers::{SubscriptionId, Subscribers};

pub struct GameTurnManager {
    current_turn: u32,
    turn_started: Subscribers<u32>,
}

impl Default for GameTurnManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTurnManager {
    /// Starts on turn 1
    pub fn new() -> Self {
        Self {
            current_turn: 1,
            turn_started: Subscribers::default(),
        }
    }

    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    /// Advance and notify listeners with the new turn number
    pub fn next_turn(&mut self) -> u32 {
        self.current_turn += 1;
        log::info!("Turn {} started", self.current_turn);
        self.turn_started.notify(&self.current_turn);
        self.current_turn
    }

    pub fn subscribe_turn_started(
        &mut self,
        listener: impl FnMut(&u32) + 'static,
    ) -> SubscriptionId {
        self.turn_started.subscribe(listener)
    }

    pub fn unsubscribe_turn_started(&mut self, id: SubscriptionId) -> bool {
        self.turn_started.unsubscribe(id)
    }
}
