use crate::*;
use ed25519_dalek::PublicKey;
use std::collections::BTreeMap;
use tracing::info;

/// Receives the signed outcome of a dispute resolution run
pub trait ConfirmationUpdater {
    /// Check that the resolved confirmed votes could be applied, without changing anything.
    fn check(
        &self,
        _election_event_id: ElectionEventId,
        _allow_lists: &BTreeMap<VerificationCardSetId, AllowList>,
        _payload: &Signed<ResolvedConfirmedVotesPayload>,
    ) -> Result<bool, Error> {
        Ok(true)
    }

    /// Apply the resolved confirmed votes. Returns whether the update was accepted.
    fn apply(
        &self,
        election_event_id: ElectionEventId,
        allow_lists: &BTreeMap<VerificationCardSetId, AllowList>,
        payload: &Signed<ResolvedConfirmedVotesPayload>,
    ) -> Result<bool, Error>;
}

/// Updates several nodes. Every updater is checked before any of them applies the payload.
impl<U: ConfirmationUpdater> ConfirmationUpdater for Vec<U> {
    fn check(
        &self,
        election_event_id: ElectionEventId,
        allow_lists: &BTreeMap<VerificationCardSetId, AllowList>,
        payload: &Signed<ResolvedConfirmedVotesPayload>,
    ) -> Result<bool, Error> {
        for updater in self {
            if !updater.check(election_event_id, allow_lists, payload)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn apply(
        &self,
        election_event_id: ElectionEventId,
        allow_lists: &BTreeMap<VerificationCardSetId, AllowList>,
        payload: &Signed<ResolvedConfirmedVotesPayload>,
    ) -> Result<bool, Error> {
        if !self.check(election_event_id, allow_lists, payload)? {
            return Ok(false);
        }
        for updater in self {
            if !updater.apply(election_event_id, allow_lists, payload)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Check a dispute resolution payload against a node's state without changing it.
///
/// The signature must verify under `trusted_key`, the payload must be for `election_event_id`,
/// each vote's combined hash must be on its card set's allow list, and each card must have been
/// sent on this node.
pub fn check_resolved_confirmed_votes<S: NodeStateGuard>(
    state: &S,
    election_event_id: ElectionEventId,
    allow_lists: &BTreeMap<VerificationCardSetId, AllowList>,
    payload: &Signed<ResolvedConfirmedVotesPayload>,
    trusted_key: &PublicKey,
) -> Result<(), Error> {
    payload.verify_signature()?;
    if &payload.resolver_public_key != trusted_key {
        return Err(Error::MismatchedPublicKeys);
    }
    if payload.election_event_id != election_event_id {
        return Err(PreconditionError::ElectionEventMismatch {
            what: "resolved confirmed votes payload",
            node_id: NodeId::Ccr1,
            expected: election_event_id,
            found: payload.election_event_id,
        }
        .into());
    }

    for vote in &payload.resolved_confirmed_votes {
        let allow_list = allow_lists
            .get(&vote.verification_card_set_id)
            .ok_or(PreconditionError::UnknownVerificationCardSet(
                vote.verification_card_set_id,
            ))?;
        if !allow_list.contains(&vote.combined_hash(election_event_id)) {
            return Err(Error::ResolvedVoteNotAllowListed(vote.verification_card_id));
        }
        state.with_card(vote.verification_card_id, |status| {
            check_sent(vote.verification_card_id, status)
        })?;
    }
    Ok(())
}

fn check_sent(card_id: VerificationCardId, status: &VerificationCardStatus) -> Result<(), Error> {
    if status.is_sent_vote() {
        Ok(())
    } else {
        Err(StateGuardError::new(card_id, StateGuard::NotSent).into())
    }
}

/// Apply a dispute resolution payload to a node's state.
///
/// Every vote passes `check_resolved_confirmed_votes` before any card changes. Cards already
/// confirmed stay as they are. Returns the number of cards newly confirmed.
pub fn apply_resolved_confirmed_votes<S: NodeStateGuard>(
    state: &S,
    election_event_id: ElectionEventId,
    allow_lists: &BTreeMap<VerificationCardSetId, AllowList>,
    payload: &Signed<ResolvedConfirmedVotesPayload>,
    trusted_key: &PublicKey,
) -> Result<usize, Error> {
    check_resolved_confirmed_votes(state, election_event_id, allow_lists, payload, trusted_key)?;

    let mut confirmed = 0;
    for vote in &payload.resolved_confirmed_votes {
        let card_id = vote.verification_card_id;
        let newly_confirmed = state.with_card(card_id, |status| {
            check_sent(card_id, status)?;
            if status.is_not_confirmed_vote() {
                status.set_confirmed_vote();
                Ok(true)
            } else {
                Ok(false)
            }
        })?;
        if newly_confirmed {
            confirmed += 1;
        }
    }

    info!(
        election_event_id = %election_event_id,
        confirmed,
        resolved = payload.resolved_confirmed_votes.len(),
        "applied resolved confirmed votes"
    );
    Ok(confirmed)
}

/// Applies resolved votes to one node's state
pub struct NodeConfirmationUpdater<S> {
    state: S,
    trusted_key: PublicKey,
}

impl<S: NodeStateGuard> NodeConfirmationUpdater<S> {
    pub fn new(state: S, trusted_key: PublicKey) -> Self {
        NodeConfirmationUpdater { state, trusted_key }
    }
}

impl<S: NodeStateGuard> ConfirmationUpdater for NodeConfirmationUpdater<S> {
    fn check(
        &self,
        election_event_id: ElectionEventId,
        allow_lists: &BTreeMap<VerificationCardSetId, AllowList>,
        payload: &Signed<ResolvedConfirmedVotesPayload>,
    ) -> Result<bool, Error> {
        check_resolved_confirmed_votes(
            &self.state,
            election_event_id,
            allow_lists,
            payload,
            &self.trusted_key,
        )?;
        Ok(true)
    }

    fn apply(
        &self,
        election_event_id: ElectionEventId,
        allow_lists: &BTreeMap<VerificationCardSetId, AllowList>,
        payload: &Signed<ResolvedConfirmedVotesPayload>,
    ) -> Result<bool, Error> {
        apply_resolved_confirmed_votes(
            &self.state,
            election_event_id,
            allow_lists,
            payload,
            &self.trusted_key,
        )?;
        Ok(true)
    }
}
