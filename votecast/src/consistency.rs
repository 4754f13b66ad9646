use crate::*;
use std::collections::BTreeMap;
use tracing::warn;

/// A check over the four nodes' extractions that must pass before anything is resolved
pub trait ConsistencyCheck {
    fn check(&self, input: &DisputeResolverInput) -> Result<(), DisputeError>;
}

/// Decides which votes are confirmed according to the hashed shares the nodes hold
pub trait VoteConfirmationResolver {
    fn resolve(&self, input: &DisputeResolverInput) -> Result<Vec<ResolvedConfirmedVote>, DisputeError>;
}

/// All four nodes hold the same election event configuration
#[derive(Clone, Copy, Debug, Default)]
pub struct ElectionEventConsistency;

impl ConsistencyCheck for ElectionEventConsistency {
    fn check(&self, input: &DisputeResolverInput) -> Result<(), DisputeError> {
        let reference = input.election_event(NodeId::Ccr1);
        let reference_hash = reference.encryption_group.encryption_parameters_hash();
        let reference_context = normalized_context(&reference.election_event_context);

        for (node_id, event) in input.election_events().iter().skip(1) {
            let consistent = event.encryption_group.encryption_parameters_hash() == reference_hash
                && normalized_context(&event.election_event_context) == reference_context;
            if !consistent {
                return Err(DisputeError::ElectionEventInconsistent {
                    election_event_id: input.election_event_id(),
                    node_id,
                });
            }
        }
        Ok(())
    }
}

type NormalizedContext<'a> = (u64, u64, u64, BTreeMap<VerificationCardSetId, &'a VerificationCardSetContext>);

// Card set contexts compared independent of their order in the extraction
fn normalized_context(context: &ElectionEventContext) -> NormalizedContext {
    (
        context.start_time,
        context.finish_time,
        context.grace_period_secs,
        context
            .verification_card_set_contexts
            .iter()
            .map(|c| (c.verification_card_set_id, c))
            .collect(),
    )
}

/// Every node holds the same votes
#[derive(Clone, Copy, Debug, Default)]
pub struct VoteConsistency;

impl ConsistencyCheck for VoteConsistency {
    fn check(&self, input: &DisputeResolverInput) -> Result<(), DisputeError> {
        let by_node = cards_by_node(input)?;
        let election_event_id = input.election_event_id();

        for card_id in input.extracted_verification_card_ids() {
            let mut reference: Option<&ExtractedVerificationCard> = None;
            for (node_id, cards) in &by_node {
                let node_id = *node_id;
                let card = *cards.get(&card_id).ok_or(DisputeError::VoteMissing {
                    election_event_id,
                    card_id,
                    node_id,
                })?;
                match reference {
                    None => reference = Some(card),
                    Some(expected) => {
                        if card.verification_card_set_id != expected.verification_card_set_id
                            || card.encrypted_vote != expected.encrypted_vote
                        {
                            return Err(DisputeError::VoteMismatch {
                                election_event_id,
                                card_id,
                                node_id,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Each node's cards by id, rejecting a card listed twice by the same node
fn cards_by_node(
    input: &DisputeResolverInput,
) -> Result<Vec<(NodeId, BTreeMap<VerificationCardId, &ExtractedVerificationCard>)>, DisputeError> {
    let election_event_id = input.election_event_id();
    let mut by_node = Vec::with_capacity(NUMBER_OF_NODES);

    for (node_id, cards) in input.verification_cards().iter() {
        let mut map = BTreeMap::new();
        for card in &cards.verification_cards {
            if map.insert(card.verification_card_id, card).is_some() {
                return Err(DisputeError::DuplicateVerificationCard {
                    election_event_id,
                    card_id: card.verification_card_id,
                    node_id,
                });
            }
        }
        by_node.push((node_id, map));
    }

    Ok(by_node)
}

/// Resolves a vote as confirmed when, for some attempt, the four nodes' hashed shares recombine
/// to an entry of the card set's allow list.
///
/// A node's share for an attempt may be found in any node's extraction, since every node stores
/// the peer shares it received. The lowest such attempt is reported.
#[derive(Clone, Copy, Debug, Default)]
pub struct VoteConfirmationConsistency;

impl VoteConfirmationResolver for VoteConfirmationConsistency {
    fn resolve(&self, input: &DisputeResolverInput) -> Result<Vec<ResolvedConfirmedVote>, DisputeError> {
        let election_event_id = input.election_event_id();
        let allow_lists = input.election_event(NodeId::Ccr1).allow_lists();

        // card id -> (card set id, attempt id -> share per node, confirmed on some node)
        let mut cards: BTreeMap<VerificationCardId, CardShares> = BTreeMap::new();
        for (_, extraction) in input.verification_cards().iter() {
            for card in &extraction.verification_cards {
                let entry = cards
                    .entry(card.verification_card_id)
                    .or_insert_with(|| CardShares::new(card.verification_card_set_id));
                entry.confirmed_somewhere |= card.state == VerificationCardState::Confirmed;

                for attempt in &card.confirmation_attempts {
                    let slots = entry.attempts.entry(attempt.attempt_id).or_default();
                    for share in &attempt.hashed_lvcc_shares {
                        let slot = &mut slots[share.node_id.index()];
                        match slot {
                            Some(existing) if *existing != share.hashed_lvcc_share => {
                                return Err(DisputeError::ConflictingHashedShares {
                                    election_event_id,
                                    card_id: card.verification_card_id,
                                    node_id: share.node_id,
                                    attempt_id: attempt.attempt_id,
                                });
                            }
                            Some(_) => {}
                            None => *slot = Some(share.hashed_lvcc_share.clone()),
                        }
                    }
                }
            }
        }

        let mut resolved = Vec::new();
        for (card_id, shares) in cards {
            let verification_card_set_id = shares.verification_card_set_id;
            let allow_list = allow_lists
                .get(&verification_card_set_id)
                .ok_or(DisputeError::MissingAllowList {
                    election_event_id,
                    verification_card_set_id,
                })?;

            let found = shares.attempts.into_iter().find_map(|(_, slots)| {
                let complete: Option<Vec<HashedLvccShare>> = slots.iter().cloned().collect();
                let vote = ResolvedConfirmedVote::new(card_id, verification_card_set_id, complete?).ok()?;
                if allow_list.contains(&vote.combined_hash(election_event_id)) {
                    Some(vote)
                } else {
                    None
                }
            });

            match found {
                Some(vote) => resolved.push(vote),
                None if shares.confirmed_somewhere => warn!(
                    election_event_id = %election_event_id,
                    card_id = %card_id,
                    "verification card is confirmed on some node but its hashed shares do not match the allow list"
                ),
                None => {}
            }
        }

        Ok(resolved)
    }
}

struct CardShares {
    verification_card_set_id: VerificationCardSetId,
    attempts: BTreeMap<u32, [Option<HashedLvccShare>; NUMBER_OF_NODES]>,
    confirmed_somewhere: bool,
}

impl CardShares {
    fn new(verification_card_set_id: VerificationCardSetId) -> Self {
        CardShares {
            verification_card_set_id,
            attempts: BTreeMap::new(),
            confirmed_somewhere: false,
        }
    }
}
