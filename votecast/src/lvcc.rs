use crate::*;
use std::convert::{TryFrom, TryInto};
use std::str::FromStr;

/// Length of a base64-encoded hash
pub const HASHED_LVCC_SHARE_LENGTH: usize = 44;

/// A node's long vote cast return code share: its masked contribution to the vote-cast
/// return code.
///
/// The share never leaves the node that computed it. Only its hash is exchanged.
#[derive(Clone, PartialEq, Eq)]
pub struct LvccShare(GqElement);

impl LvccShare {
    pub(crate) fn new(element: GqElement) -> Self {
        LvccShare(element)
    }

    pub fn element(&self) -> &GqElement {
        &self.0
    }
}

impl std::fmt::Debug for LvccShare {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "LvccShare(<redacted>)")
    }
}

/// Base64 encoded hash of one node's LVCC share, the unit exchanged between nodes
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct HashedLvccShare(String);

impl HashedLvccShare {
    pub(crate) fn from_digest(digest: &[u8; HASH_LENGTH]) -> Self {
        HashedLvccShare(base64_encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for HashedLvccShare {
    type Error = PreconditionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.len() != HASHED_LVCC_SHARE_LENGTH {
            return Err(PreconditionError::InvalidHashedShare {
                value,
                reason: "wrong length",
            });
        }
        match base64::decode(&value) {
            Ok(decoded) if decoded.len() == HASH_LENGTH => Ok(HashedLvccShare(value)),
            Ok(_) => Err(PreconditionError::InvalidHashedShare {
                value,
                reason: "wrong digest length",
            }),
            Err(_) => Err(PreconditionError::InvalidHashedShare {
                value,
                reason: "invalid base64",
            }),
        }
    }
}

impl FromStr for HashedLvccShare {
    type Err = PreconditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HashedLvccShare::try_from(s.to_owned())
    }
}

impl From<HashedLvccShare> for String {
    fn from(share: HashedLvccShare) -> Self {
        share.0
    }
}

impl std::fmt::Display for HashedLvccShare {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exactly one hashed LVCC share per node, in node order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "Vec<HashedLvccShare>", into = "Vec<HashedLvccShare>")]
pub struct HashedLvccShares([HashedLvccShare; NUMBER_OF_NODES]);

impl HashedLvccShares {
    pub fn get(&self, node_id: NodeId) -> &HashedLvccShare {
        &self.0[node_id.index()]
    }

    /// Iterate in node order
    pub fn iter(&self) -> impl Iterator<Item = &HashedLvccShare> {
        self.0.iter()
    }
}

impl TryFrom<Vec<HashedLvccShare>> for HashedLvccShares {
    type Error = PreconditionError;

    fn try_from(shares: Vec<HashedLvccShare>) -> Result<Self, Self::Error> {
        let shares: [HashedLvccShare; NUMBER_OF_NODES] =
            shares
                .try_into()
                .map_err(|shares: Vec<HashedLvccShare>| PreconditionError::WrongNumberOfShares {
                    expected: NUMBER_OF_NODES,
                    found: shares.len(),
                })?;
        Ok(HashedLvccShares(shares))
    }
}

impl From<HashedLvccShares> for Vec<HashedLvccShare> {
    fn from(shares: HashedLvccShares) -> Self {
        shares.0.to_vec()
    }
}

/// Combine the four nodes' hashed shares into the hash looked up in the allow list.
///
/// Setup uses the same combination to build the allow list, so the result only matches an
/// entry if all four shares come from the real node secrets.
pub fn combine_hashed_lvcc_shares(
    election_event_id: ElectionEventId,
    verification_card_set_id: VerificationCardSetId,
    verification_card_id: VerificationCardId,
    shares: &HashedLvccShares,
) -> String {
    let mut values = Vec::with_capacity(1 + NUMBER_OF_NODES);
    values.push(Hashable::List(vec![
        Hashable::from("VerifyLVCCHash"),
        Hashable::from(election_event_id.to_string()),
        Hashable::from(verification_card_set_id.to_string()),
        Hashable::from(verification_card_id.to_string()),
    ]));
    values.extend(shares.iter().map(|share| Hashable::from(share.as_str())));

    base64_encode(&recursive_hash(&values))
}
