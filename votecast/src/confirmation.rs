use crate::*;
use tracing::{debug, warn};

/// Everything that scopes one node's work on one verification card
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationContext {
    pub encryption_group: GqGroup,
    pub node_id: NodeId,
    pub election_event_id: ElectionEventId,
    pub verification_card_set_id: VerificationCardSetId,
    pub verification_card_id: VerificationCardId,
}

/// Input to LVCC share creation
#[derive(Clone, Debug)]
pub struct CreateLvccShareInput {
    /// Confirmation key submitted by the voter
    pub confirmation_key: GqElement,

    /// This node's return codes generation secret key for the election event
    pub return_codes_generation_secret_key: ZqElement,
}

#[derive(Clone, Debug)]
pub struct CreateLvccShareOutput {
    pub lvcc_share: LvccShare,
    pub hashed_lvcc_share: HashedLvccShare,

    /// Value of the attempt counter before this call
    pub attempt_id: u32,
}

/// Computes a node's LVCC share for a voter's confirmation attempt.
///
/// Each node runs this independently, without talking to the other nodes. Only the hashed
/// share is passed on to the other nodes.
pub struct ConfirmationShareGenerator<S> {
    state: S,
    max_confirmation_attempts: u32,
}

impl<S: NodeStateGuard> ConfirmationShareGenerator<S> {
    pub fn new(state: S, config: &ConfirmationConfig) -> Self {
        ConfirmationShareGenerator {
            state,
            max_confirmation_attempts: config.max_confirmation_attempts,
        }
    }

    /// Create this node's LVCC share and its hash.
    ///
    /// The card must be sent, not yet confirmed, and below the attempt limit. Only successful
    /// calls are counted: a successful call consumes one confirmation attempt even if the caller
    /// discards the result, while a call rejected by a precondition or state check leaves the
    /// counter unchanged.
    pub fn create_share(
        &self,
        context: &ConfirmationContext,
        input: &CreateLvccShareInput,
    ) -> Result<CreateLvccShareOutput, Error> {
        if input.confirmation_key.group() != &context.encryption_group {
            return Err(PreconditionError::GroupMismatch("confirmation key").into());
        }
        if input.return_codes_generation_secret_key.q() != context.encryption_group.q() {
            return Err(
                PreconditionError::GroupMismatch("return codes generation secret key").into(),
            );
        }

        let card_id = context.verification_card_id;
        let max = self.max_confirmation_attempts;

        // Pure, so it runs before the card is locked
        let (lvcc_share, hashed_lvcc_share) = compute_lvcc_share(context, input)?;

        let result = self.state.with_card(card_id, |status| {
            check_sent_and_not_confirmed(card_id, status)?;
            if status.next_attempt_id() >= max {
                return Err(StateGuardError::new(card_id, StateGuard::AttemptsExhausted { max }).into());
            }

            let attempt_id = status.next_attempt_id();
            status.increment_attempts();

            Ok(CreateLvccShareOutput {
                lvcc_share,
                hashed_lvcc_share,
                attempt_id,
            })
        });

        match &result {
            Ok(output) => debug!(
                card_id = %card_id,
                node_id = %context.node_id,
                attempt_id = output.attempt_id,
                "created LVCC share"
            ),
            Err(Error::StateGuard(e)) => warn!(node_id = %context.node_id, "rejected LVCC share creation: {}", e),
            Err(_) => {}
        }

        result
    }
}

fn compute_lvcc_share(
    context: &ConfirmationContext,
    input: &CreateLvccShareInput,
) -> Result<(LvccShare, HashedLvccShare), Error> {
    let group = &context.encryption_group;
    let ee = context.election_event_id.to_string();
    let vcs = context.verification_card_set_id.to_string();
    let vc = context.verification_card_id.to_string();

    // Per-voter key derived from the node's secret
    let voter_key = kdf_to_zq(
        &input.return_codes_generation_secret_key,
        &["VoterVoteCastReturnCodeGeneration", &ee, &vcs, &vc],
    )?;

    let hashed_confirmation_key = hash_and_square(input.confirmation_key.value(), group)?;
    let lvcc_share = hashed_confirmation_key.exponentiate(&voter_key)?;

    let digest = recursive_hash(&[
        Hashable::List(vec![
            Hashable::from("CreateLVCCShare"),
            Hashable::from(ee),
            Hashable::from(vcs),
            Hashable::from(vc),
            Hashable::from(context.node_id.to_string()),
        ]),
        Hashable::from(lvcc_share.value()),
    ]);

    Ok((LvccShare::new(lvcc_share), HashedLvccShare::from_digest(&digest)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn test_create_share_requires_sent_vote() {
        let node = TestNode::new(NodeId::Ccr1, 11);
        let card = TestCard::new(&node.group);

        // Never sent
        let err = node.create_share(&card).unwrap_err();
        assert!(matches!(
            err,
            Error::StateGuard(StateGuardError { guard: StateGuard::NotSent, card_id }) if card_id == card.card_id
        ));
        assert_eq!(node.status(&card).confirmation_attempts(), 0);

        node.state.set_sent_vote(card.card_id).unwrap();
        let output = node.create_share(&card).unwrap();
        assert_eq!(output.attempt_id, 0);
        assert_eq!(node.status(&card).confirmation_attempts(), 1);
    }

    #[test]
    fn test_create_share_rejects_confirmed_vote() {
        let node = TestNode::new(NodeId::Ccr2, 12);
        let card = TestCard::new(&node.group);
        node.state.set_sent_vote(card.card_id).unwrap();
        node.state
            .with_card(card.card_id, |status| {
                status.set_confirmed_vote();
                Ok(())
            })
            .unwrap();

        let err = node.create_share(&card).unwrap_err();
        assert!(matches!(
            err,
            Error::StateGuard(StateGuardError { guard: StateGuard::AlreadyConfirmed, .. })
        ));
        assert!(err.to_string().contains(&card.card_id.to_string()));
    }

    #[test]
    fn test_attempt_limit() {
        let node = TestNode::new(NodeId::Ccr3, 13);
        let card = TestCard::new(&node.group);
        node.state.set_sent_vote(card.card_id).unwrap();

        let max = node.config.max_confirmation_attempts;
        for expected_attempt in 0..max {
            let output = node.create_share(&card).unwrap();
            assert_eq!(output.attempt_id, expected_attempt);
        }

        let err = node.create_share(&card).unwrap_err();
        assert!(matches!(
            err,
            Error::StateGuard(StateGuardError { guard: StateGuard::AttemptsExhausted { max: m }, .. }) if m == max
        ));
        assert_eq!(node.status(&card).confirmation_attempts(), max);
    }

    #[test]
    fn test_same_inputs_same_share() {
        let node = TestNode::new(NodeId::Ccr4, 14);
        let card = TestCard::new(&node.group);
        node.state.set_sent_vote(card.card_id).unwrap();

        let first = node.create_share(&card).unwrap();
        let second = node.create_share(&card).unwrap();
        assert_eq!(first.hashed_lvcc_share, second.hashed_lvcc_share);
        assert_eq!(first.lvcc_share, second.lvcc_share);
        assert_eq!(second.attempt_id, 1);
        assert!(node.group.is_member(first.lvcc_share.element().value()));
        assert_eq!(format!("{:?}", first.lvcc_share), "LvccShare(<redacted>)");
    }

    #[test]
    fn test_group_mismatch() {
        let node = TestNode::new(NodeId::Ccr1, 15);
        let card = TestCard::new(&node.group);
        node.state.set_sent_vote(card.card_id).unwrap();

        let other_group = small_group();
        let foreign_key = CreateLvccShareInput {
            confirmation_key: other_group.generator(),
            return_codes_generation_secret_key: node.secret.clone(),
        };
        let err = node
            .generator()
            .create_share(&node.context(&card), &foreign_key)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Precondition(PreconditionError::GroupMismatch("confirmation key"))
        ));

        let foreign_secret = CreateLvccShareInput {
            confirmation_key: card.confirmation_key.clone(),
            return_codes_generation_secret_key: ZqElement::reduce(
                &num_bigint::BigUint::from(3u32),
                other_group.q(),
            ),
        };
        let err = node
            .generator()
            .create_share(&node.context(&card), &foreign_secret)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Precondition(PreconditionError::GroupMismatch(
                "return codes generation secret key"
            ))
        ));

        // Nothing was consumed
        assert_eq!(node.status(&card).confirmation_attempts(), 0);
    }
}
