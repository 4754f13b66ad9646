use crate::*;
use ed25519_dalek::PublicKey;
use std::convert::TryFrom;

/// A vote the dispute resolution found to be confirmed, with the four hashed shares that prove it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfirmedVote {
    pub verification_card_id: VerificationCardId,
    pub verification_card_set_id: VerificationCardSetId,
    pub hashed_lvcc_shares: HashedLvccShares,
}

impl ResolvedConfirmedVote {
    pub fn new(
        verification_card_id: VerificationCardId,
        verification_card_set_id: VerificationCardSetId,
        hashed_lvcc_shares: Vec<HashedLvccShare>,
    ) -> Result<Self, PreconditionError> {
        Ok(ResolvedConfirmedVote {
            verification_card_id,
            verification_card_set_id,
            hashed_lvcc_shares: HashedLvccShares::try_from(hashed_lvcc_shares)?,
        })
    }

    /// The combined hash this vote is expected to have on the allow list
    pub fn combined_hash(&self, election_event_id: ElectionEventId) -> String {
        combine_hashed_lvcc_shares(
            election_event_id,
            self.verification_card_set_id,
            self.verification_card_id,
            &self.hashed_lvcc_shares,
        )
    }
}

/// The correction produced by a dispute resolution run, signed by the resolver
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfirmedVotesPayload {
    pub election_event_id: ElectionEventId,
    pub encryption_group: GqGroup,
    pub resolved_confirmed_votes: Vec<ResolvedConfirmedVote>,

    #[serde(with = "EdPublicKeyHex")]
    pub resolver_public_key: PublicKey,
}

impl Signable for ResolvedConfirmedVotesPayload {
    fn public(&self) -> PublicKey {
        self.resolver_public_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_vote_requires_four_shares() {
        let share = HashedLvccShare::from_digest(&[9; HASH_LENGTH]);
        let err = ResolvedConfirmedVote::new(
            VerificationCardId::new_v4(),
            VerificationCardSetId::new_v4(),
            vec![share.clone(), share.clone(), share],
        )
        .unwrap_err();
        assert_eq!(
            err,
            PreconditionError::WrongNumberOfShares {
                expected: 4,
                found: 3
            }
        );
    }
}
