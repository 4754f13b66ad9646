use crate::*;
use std::collections::BTreeSet;

/// The validated input of a dispute resolution run: one election event snapshot and one card
/// list from each of the four nodes, all for the same election event and encryption group.
#[derive(Clone, Debug)]
pub struct DisputeResolverInput {
    election_events: NodeIndexed<ExtractedElectionEvent>,
    verification_cards: NodeIndexed<ExtractedVerificationCards>,
}

impl DisputeResolverInput {
    pub fn new(
        election_events: Vec<ExtractedElectionEvent>,
        verification_cards: Vec<ExtractedVerificationCards>,
    ) -> Result<Self, PreconditionError> {
        let election_events =
            NodeIndexed::from_items("election event extractions", election_events, |e| e.node_id)?;
        let verification_cards = NodeIndexed::from_items(
            "verification card extractions",
            verification_cards,
            |c| c.node_id,
        )?;

        let reference = election_events.get(NodeId::Ccr1);
        let expected = reference.election_event_id;
        let group = &reference.encryption_group;

        let check = |what: &'static str, node_id: NodeId, found: ElectionEventId, found_group: Option<&GqGroup>| {
            if found != expected {
                return Err(PreconditionError::ElectionEventMismatch {
                    what,
                    node_id,
                    expected,
                    found,
                });
            }
            match found_group {
                Some(g) if g != group => Err(PreconditionError::EncryptionGroupMismatch {
                    what,
                    node_id,
                    election_event_id: expected,
                }),
                _ => Ok(()),
            }
        };

        for (node_id, event) in election_events.iter() {
            check(
                "election event extraction",
                node_id,
                event.election_event_id,
                Some(&event.encryption_group),
            )?;
        }
        for (node_id, cards) in verification_cards.iter() {
            check(
                "verification card extraction",
                node_id,
                cards.election_event_id,
                Some(&cards.encryption_group),
            )?;
            for card in &cards.verification_cards {
                check("verification card", node_id, card.election_event_id, None)?;
            }
        }

        Ok(DisputeResolverInput {
            election_events,
            verification_cards,
        })
    }

    pub fn election_event_id(&self) -> ElectionEventId {
        self.election_events.get(NodeId::Ccr1).election_event_id
    }

    pub fn encryption_group(&self) -> &GqGroup {
        &self.election_events.get(NodeId::Ccr1).encryption_group
    }

    pub fn election_event(&self, node_id: NodeId) -> &ExtractedElectionEvent {
        self.election_events.get(node_id)
    }

    pub fn election_events(&self) -> &NodeIndexed<ExtractedElectionEvent> {
        &self.election_events
    }

    pub fn verification_cards(&self) -> &NodeIndexed<ExtractedVerificationCards> {
        &self.verification_cards
    }

    /// Distinct card ids extracted from any node
    pub fn extracted_verification_card_ids(&self) -> BTreeSet<VerificationCardId> {
        self.verification_cards
            .iter()
            .flat_map(|(_, cards)| cards.verification_cards.iter())
            .map(|card| card.verification_card_id)
            .collect()
    }
}
