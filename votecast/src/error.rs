use crate::*;

use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("votecast: precondition violated: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("votecast: state guard violated: {0}")]
    StateGuard(#[from] StateGuardError),

    #[error("votecast: node state store error: {0}")]
    Store(String),

    #[error("votecast: invalid configuration: {0}")]
    Config(String),

    #[error("votecast: key derivation failed: requested output too long")]
    KeyDerivation,

    #[error("votecast: no return codes generation secret key for election event {0}")]
    MissingSecretKey(ElectionEventId),

    #[error("votecast: signature error: {0}")]
    SignatureError(#[from] ed25519_dalek::SignatureError),

    #[error("votecast: mismatched public keys")]
    MismatchedPublicKeys,

    #[error("votecast: resolved vote for verification card {0} does not match the allow list")]
    ResolvedVoteNotAllowListed(VerificationCardId),

    #[error("votecast: CBOR error: {0}")]
    CBORSerialization(#[from] serde_cbor::Error),

    #[error("votecast: JSON error: {0}")]
    JSONSerialization(#[from] serde_json::Error),

    #[error("votecast: error deserializing: unknown format")]
    DeserializationUnknownFormat,
}

/// Bad input shape, rejected before any computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("invalid {kind} identifier {value:?}")]
    InvalidIdentifier { kind: &'static str, value: String },

    #[error("invalid node id {0}: expected 1 to {}", NUMBER_OF_NODES)]
    InvalidNodeId(u8),

    #[error("invalid encryption group: {0}")]
    InvalidGroup(&'static str),

    #[error("{0} does not belong to the encryption group")]
    NotGroupMember(&'static str),

    #[error("{0} is not in the exponent range of the encryption group")]
    ExponentOutOfRange(&'static str),

    #[error("{0} belongs to a different encryption group than the context")]
    GroupMismatch(&'static str),

    #[error("invalid hashed LVCC share {value:?}: {reason}")]
    InvalidHashedShare { value: String, reason: &'static str },

    #[error("wrong number of hashed LVCC shares: expected {expected}, found {found}")]
    WrongNumberOfShares { expected: usize, found: usize },

    #[error("hashed LVCC share of node {0} supplied as a peer share")]
    PeerIsOwnNode(NodeId),

    #[error("own hashed LVCC share of node {node_id} cannot be placed among {peers} peer shares")]
    OwnShareOutOfRange { node_id: NodeId, peers: usize },

    #[error("wrong number of {what}: expected {}, found {found}", NUMBER_OF_NODES)]
    WrongNumberOfExtractions { what: &'static str, found: usize },

    #[error("duplicate node id {node_id} in {what}")]
    DuplicateNodeId { what: &'static str, node_id: NodeId },

    #[error("{what} of node {node_id} reports election event {found}, expected {expected}")]
    ElectionEventMismatch {
        what: &'static str,
        node_id: NodeId,
        expected: ElectionEventId,
        found: ElectionEventId,
    },

    #[error("{what} of node {node_id} uses a different encryption group in election event {election_event_id}")]
    EncryptionGroupMismatch {
        what: &'static str,
        node_id: NodeId,
        election_event_id: ElectionEventId,
    },

    #[error("no allow list for verification card set {0}")]
    UnknownVerificationCardSet(VerificationCardSetId),
}

/// The per-card state guards consulted by the confirmation protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateGuard {
    /// No choice return codes were sent for the card on this node.
    NotSent,
    /// The node already confirmed the vote.
    AlreadyConfirmed,
    /// The confirmation attempt counter reached its maximum.
    AttemptsExhausted { max: u32 },
}

impl std::fmt::Display for StateGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            StateGuard::NotSent => write!(f, "vote has not been sent"),
            StateGuard::AlreadyConfirmed => write!(f, "vote is already confirmed"),
            StateGuard::AttemptsExhausted { max } => {
                write!(f, "maximum number of confirmation attempts ({}) exceeded", max)
            }
        }
    }
}

/// A state guard rejected a call for a verification card.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("verification card {card_id}: {guard}")]
pub struct StateGuardError {
    pub card_id: VerificationCardId,
    pub guard: StateGuard,
}

impl StateGuardError {
    pub fn new(card_id: VerificationCardId, guard: StateGuard) -> Self {
        StateGuardError { card_id, guard }
    }
}

/// Fatal failures of a dispute resolution run
#[derive(Debug, Error)]
pub enum DisputeError {
    #[error("election event {election_event_id}: extraction of node {node_id} differs from node 1")]
    ElectionEventInconsistent {
        election_event_id: ElectionEventId,
        node_id: NodeId,
    },

    #[error("election event {election_event_id}: verification card {card_id} is missing on node {node_id}")]
    VoteMissing {
        election_event_id: ElectionEventId,
        card_id: VerificationCardId,
        node_id: NodeId,
    },

    #[error("election event {election_event_id}: vote of verification card {card_id} on node {node_id} differs from the other nodes")]
    VoteMismatch {
        election_event_id: ElectionEventId,
        card_id: VerificationCardId,
        node_id: NodeId,
    },

    #[error("election event {election_event_id}: verification card {card_id} extracted twice from node {node_id}")]
    DuplicateVerificationCard {
        election_event_id: ElectionEventId,
        card_id: VerificationCardId,
        node_id: NodeId,
    },

    #[error("election event {election_event_id}: conflicting hashed LVCC shares of node {node_id} for verification card {card_id}, attempt {attempt_id}")]
    ConflictingHashedShares {
        election_event_id: ElectionEventId,
        card_id: VerificationCardId,
        node_id: NodeId,
        attempt_id: u32,
    },

    #[error("election event {election_event_id}: no allow list for verification card set {verification_card_set_id}")]
    MissingAllowList {
        election_event_id: ElectionEventId,
        verification_card_set_id: VerificationCardSetId,
    },

    #[error("election event {election_event_id}: {resolved} resolved confirmed votes exceed {extracted} extracted verification cards")]
    TooManyResolvedVotes {
        election_event_id: ElectionEventId,
        resolved: usize,
        extracted: usize,
    },

    #[error("election event {election_event_id}: resolved confirmed votes were not applied")]
    UpdateRejected { election_event_id: ElectionEventId },

    #[error("election event {election_event_id}: {source}")]
    Failed {
        election_event_id: ElectionEventId,
        source: Error,
    },
}

impl DisputeError {
    /// The election event the failed run belongs to
    pub fn election_event_id(&self) -> ElectionEventId {
        match self {
            DisputeError::ElectionEventInconsistent {
                election_event_id, ..
            }
            | DisputeError::VoteMissing {
                election_event_id, ..
            }
            | DisputeError::VoteMismatch {
                election_event_id, ..
            }
            | DisputeError::DuplicateVerificationCard {
                election_event_id, ..
            }
            | DisputeError::ConflictingHashedShares {
                election_event_id, ..
            }
            | DisputeError::MissingAllowList {
                election_event_id, ..
            }
            | DisputeError::TooManyResolvedVotes {
                election_event_id, ..
            }
            | DisputeError::UpdateRejected { election_event_id }
            | DisputeError::Failed {
                election_event_id, ..
            } => *election_event_id,
        }
    }
}
