use crate::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Node-local state of a verification card
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationCardState {
    Initial,
    /// The node produced and stored choice return code material for the card
    Sent,
    /// The node accepted the vote-cast confirmation
    Confirmed,
}

impl Default for VerificationCardState {
    fn default() -> Self {
        VerificationCardState::Initial
    }
}

/// A card's state together with its confirmation attempt counter
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationCardStatus {
    state: VerificationCardState,
    confirmation_attempts: u32,
}

impl VerificationCardStatus {
    pub fn new(state: VerificationCardState, confirmation_attempts: u32) -> Self {
        VerificationCardStatus {
            state,
            confirmation_attempts,
        }
    }

    pub fn state(&self) -> VerificationCardState {
        self.state
    }

    pub fn is_sent_vote(&self) -> bool {
        self.state != VerificationCardState::Initial
    }

    pub fn is_not_confirmed_vote(&self) -> bool {
        self.state != VerificationCardState::Confirmed
    }

    pub fn set_sent_vote(&mut self) {
        if self.state == VerificationCardState::Initial {
            self.state = VerificationCardState::Sent;
        }
    }

    pub fn set_confirmed_vote(&mut self) {
        self.state = VerificationCardState::Confirmed;
    }

    /// The id the next confirmation attempt will get
    pub fn next_attempt_id(&self) -> u32 {
        self.confirmation_attempts
    }

    pub fn confirmation_attempts(&self) -> u32 {
        self.confirmation_attempts
    }

    pub fn increment_attempts(&mut self) {
        self.confirmation_attempts += 1;
    }
}

/// Check that a vote was sent and is not yet confirmed on this node
pub(crate) fn check_sent_and_not_confirmed(
    card_id: VerificationCardId,
    status: &VerificationCardStatus,
) -> Result<(), StateGuardError> {
    if !status.is_sent_vote() {
        return Err(StateGuardError::new(card_id, StateGuard::NotSent));
    }
    if !status.is_not_confirmed_vote() {
        return Err(StateGuardError::new(card_id, StateGuard::AlreadyConfirmed));
    }
    Ok(())
}

/// Access to a node's per-card state, owned by the node's storage layer.
///
/// Guard checks and the state transitions they protect must not interleave between two calls
/// for the same card, so all access goes through `with_card`, which runs one read-modify-write
/// unit with exclusive access to the card's status. Calls for different cards may run
/// concurrently.
pub trait NodeStateGuard {
    /// Run `f` with exclusive access to the status of `card_id`.
    ///
    /// Unknown cards start out as `Initial` with no attempts. Changes made by `f` are kept only
    /// if it returns `Ok`.
    fn with_card<T, F>(&self, card_id: VerificationCardId, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut VerificationCardStatus) -> Result<T, Error>;
}

impl<S: NodeStateGuard> NodeStateGuard for &S {
    fn with_card<T, F>(&self, card_id: VerificationCardId, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut VerificationCardStatus) -> Result<T, Error>,
    {
        (**self).with_card(card_id, f)
    }
}

impl<S: NodeStateGuard> NodeStateGuard for Arc<S> {
    fn with_card<T, F>(&self, card_id: VerificationCardId, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut VerificationCardStatus) -> Result<T, Error>,
    {
        (**self).with_card(card_id, f)
    }
}

/// A simple node state store that keeps everything in memory.
///
/// Each card has its own lock, so `with_card` on one card never waits on work for another.
#[derive(Default, Debug)]
pub struct MemNodeState {
    cards: Mutex<HashMap<VerificationCardId, Arc<Mutex<VerificationCardStatus>>>>,
}

impl MemNodeState {
    /// Record that choice return codes were sent for a card
    pub fn set_sent_vote(&self, card_id: VerificationCardId) -> Result<(), Error> {
        self.with_card(card_id, |status| {
            status.set_sent_vote();
            Ok(())
        })
    }

    /// Current status of a card
    pub fn status(&self, card_id: VerificationCardId) -> Result<VerificationCardStatus, Error> {
        self.with_card(card_id, |status| Ok(status.clone()))
    }

    fn card(&self, card_id: VerificationCardId) -> Result<Arc<Mutex<VerificationCardStatus>>, Error> {
        let mut cards = self
            .cards
            .lock()
            .map_err(|_| Error::Store("node state lock poisoned".to_owned()))?;
        Ok(cards.entry(card_id).or_default().clone())
    }
}

impl NodeStateGuard for MemNodeState {
    fn with_card<T, F>(&self, card_id: VerificationCardId, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut VerificationCardStatus) -> Result<T, Error>,
    {
        let card = self.card(card_id)?;
        let mut current = card
            .lock()
            .map_err(|_| Error::Store(format!("lock poisoned for verification card {}", card_id)))?;

        let mut status = current.clone();
        let result = f(&mut status)?;
        *current = status;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        let mut status = VerificationCardStatus::default();
        assert!(!status.is_sent_vote());
        assert!(status.is_not_confirmed_vote());

        status.set_sent_vote();
        assert_eq!(status.state(), VerificationCardState::Sent);

        status.set_confirmed_vote();
        assert!(status.is_sent_vote());
        assert!(!status.is_not_confirmed_vote());

        // Sending again does not move a confirmed card backwards
        status.set_sent_vote();
        assert_eq!(status.state(), VerificationCardState::Confirmed);
    }

    #[test]
    fn test_mem_node_state_rolls_back_on_error() {
        let store = MemNodeState::default();
        let card_id = VerificationCardId::new_v4();
        store.set_sent_vote(card_id).unwrap();

        let result: Result<(), Error> = store.with_card(card_id, |status| {
            status.increment_attempts();
            status.set_confirmed_vote();
            Err(StateGuardError::new(card_id, StateGuard::NotSent).into())
        });
        assert!(result.is_err());

        let status = store.status(card_id).unwrap();
        assert_eq!(status.state(), VerificationCardState::Sent);
        assert_eq!(status.confirmation_attempts(), 0);

        store
            .with_card(card_id, |status| {
                status.increment_attempts();
                Ok(())
            })
            .unwrap();
        assert_eq!(store.status(card_id).unwrap().confirmation_attempts(), 1);
    }

    #[test]
    fn test_mem_node_state_locks_per_card() {
        let store = MemNodeState::default();
        let first = VerificationCardId::new_v4();
        let second = VerificationCardId::new_v4();

        // Holding one card does not block another
        store
            .with_card(first, |status| {
                status.set_sent_vote();
                store.set_sent_vote(second)?;
                Ok(())
            })
            .unwrap();

        assert!(store.status(first).unwrap().is_sent_vote());
        assert!(store.status(second).unwrap().is_sent_vote());
    }
}
