use crate::*;
use content_inspector::ContentType;
use num_bigint::BigUint;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use uuid::Uuid;

/// Per card set part of an election event context
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VerificationCardSetContext {
    pub verification_card_set_id: VerificationCardSetId,
    pub ballot_box_id: Uuid,
    pub test_ballot_box: bool,
    pub number_of_eligible_voters: u64,
    pub long_vote_cast_return_codes_allow_list: AllowList,
}

/// Configuration of an election event as a node holds it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ElectionEventContext {
    /// Unix timestamps in seconds
    pub start_time: u64,
    pub finish_time: u64,
    pub grace_period_secs: u64,
    pub verification_card_set_contexts: Vec<VerificationCardSetContext>,
}

/// A node's snapshot of an election event's configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExtractedElectionEvent {
    pub node_id: NodeId,
    pub election_event_id: ElectionEventId,
    pub encryption_group: GqGroup,
    pub election_event_context: ElectionEventContext,
}

impl ExtractedElectionEvent {
    pub fn allow_list(&self, verification_card_set_id: VerificationCardSetId) -> Option<&AllowList> {
        self.election_event_context
            .verification_card_set_contexts
            .iter()
            .find(|context| context.verification_card_set_id == verification_card_set_id)
            .map(|context| &context.long_vote_cast_return_codes_allow_list)
    }

    /// All allow lists keyed by card set
    pub fn allow_lists(&self) -> BTreeMap<VerificationCardSetId, AllowList> {
        self.election_event_context
            .verification_card_set_contexts
            .iter()
            .map(|context| {
                (
                    context.verification_card_set_id,
                    context.long_vote_cast_return_codes_allow_list.clone(),
                )
            })
            .collect()
    }
}

/// An ElGamal ciphertext over the encryption group
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EncryptedVote {
    #[serde(with = "biguint_hex")]
    pub gamma: BigUint,

    #[serde(with = "biguint_hex_vec")]
    pub phis: Vec<BigUint>,
}

/// A hashed LVCC share as stored by a node, tagged with the node that computed it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NodeHashedLvccShare {
    pub node_id: NodeId,
    pub hashed_lvcc_share: HashedLvccShare,
}

/// The hashed shares a node has on file for one confirmation attempt
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExtractedConfirmationAttempt {
    pub attempt_id: u32,
    pub hashed_lvcc_shares: Vec<NodeHashedLvccShare>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExtractedVerificationCard {
    pub election_event_id: ElectionEventId,
    pub verification_card_set_id: VerificationCardSetId,
    pub verification_card_id: VerificationCardId,
    pub encrypted_vote: EncryptedVote,
    pub state: VerificationCardState,

    #[serde(default)]
    pub confirmation_attempts: Vec<ExtractedConfirmationAttempt>,
}

/// All verification cards with a vote on one node
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExtractedVerificationCards {
    pub node_id: NodeId,
    pub election_event_id: ElectionEventId,
    pub encryption_group: GqGroup,
    pub verification_cards: Vec<ExtractedVerificationCard>,
}

/// Everything extracted from the four nodes for one dispute resolution run
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DisputeExtraction {
    pub election_events: Vec<ExtractedElectionEvent>,
    pub verification_cards: Vec<ExtractedVerificationCards>,
}

impl DisputeExtraction {
    /// Unpack from JSON or CBOR bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        match content_inspector::inspect(bytes) {
            ContentType::UTF_8 => Ok(serde_json::from_slice(bytes)?),
            ContentType::BINARY => Ok(serde_cbor::from_slice(bytes)?),
            _ => Err(Error::DeserializationUnknownFormat),
        }
    }
}

impl TryFrom<DisputeExtraction> for DisputeResolverInput {
    type Error = PreconditionError;

    fn try_from(extraction: DisputeExtraction) -> Result<Self, Self::Error> {
        DisputeResolverInput::new(extraction.election_events, extraction.verification_cards)
    }
}
