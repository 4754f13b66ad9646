use crate::*;
use std::convert::TryFrom;
use tracing::{debug, info};

/// Input to LVCC hash verification
pub struct VerifyLvccHashInput<'a, A: ?Sized> {
    pub allow_list: &'a A,

    /// This node's own hashed share for the attempt
    pub hashed_lvcc_share: HashedLvccShare,

    /// Hashed shares received from the three other nodes, in any order
    pub other_hashed_lvcc_shares: Vec<(NodeId, HashedLvccShare)>,
}

/// Put the own hashed share and the three peer shares in node order.
///
/// Peers may arrive in any order. Exactly three are expected, none from `node_id` itself and
/// no node twice.
pub fn order_hashed_lvcc_shares(
    node_id: NodeId,
    own: HashedLvccShare,
    mut peers: Vec<(NodeId, HashedLvccShare)>,
) -> Result<HashedLvccShares, PreconditionError> {
    if peers.len() != NUMBER_OF_NODES - 1 {
        return Err(PreconditionError::WrongNumberOfShares {
            expected: NUMBER_OF_NODES - 1,
            found: peers.len(),
        });
    }
    if peers.iter().any(|(peer, _)| *peer == node_id) {
        return Err(PreconditionError::PeerIsOwnNode(node_id));
    }

    peers.sort_by_key(|(peer, _)| *peer);
    if let Some(window) = peers.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(PreconditionError::DuplicateNodeId {
            what: "peer hashed LVCC shares",
            node_id: window[0].0,
        });
    }

    let position = node_id.index();
    if position > peers.len() {
        return Err(PreconditionError::OwnShareOutOfRange {
            node_id,
            peers: peers.len(),
        });
    }

    let mut ordered: Vec<HashedLvccShare> = peers.into_iter().map(|(_, share)| share).collect();
    ordered.insert(position, own);

    HashedLvccShares::try_from(ordered)
}

/// Checks the four hashed shares of an attempt against the allow list and confirms the vote
/// on this node when they match.
pub struct ConfirmationHashVerifier<S> {
    state: S,
}

impl<S: NodeStateGuard> ConfirmationHashVerifier<S> {
    pub fn new(state: S) -> Self {
        ConfirmationHashVerifier { state }
    }

    /// Returns whether the combined hash is on the allow list.
    ///
    /// On `true` the card is `Confirmed` on this node. On `false` nothing changes, and the voter
    /// may retry while attempts remain. Verifying an already confirmed card again with a
    /// matching hash returns `true` without changing anything.
    pub fn verify<A>(
        &self,
        context: &ConfirmationContext,
        input: VerifyLvccHashInput<A>,
    ) -> Result<bool, Error>
    where
        A: LongVoteCastReturnCodesAllowList + ?Sized,
    {
        let card_id = context.verification_card_id;
        let shares = order_hashed_lvcc_shares(
            context.node_id,
            input.hashed_lvcc_share,
            input.other_hashed_lvcc_shares,
        )?;

        let combined = combine_hashed_lvcc_shares(
            context.election_event_id,
            context.verification_card_set_id,
            card_id,
            &shares,
        );
        let allowed = input.allow_list.contains(&combined);

        let newly_confirmed = self.state.with_card(card_id, |status| {
            if allowed && status.state() == VerificationCardState::Confirmed {
                return Ok(false);
            }
            check_sent_and_not_confirmed(card_id, status)?;
            if allowed {
                status.set_confirmed_vote();
            }
            Ok(allowed)
        })?;

        if newly_confirmed {
            info!(card_id = %card_id, node_id = %context.node_id, "confirmed vote");
        } else if !allowed {
            debug!(card_id = %card_id, node_id = %context.node_id, "combined LVCC hash not in allow list");
        }

        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn share(byte: u8) -> HashedLvccShare {
        HashedLvccShare::from_digest(&[byte; HASH_LENGTH])
    }

    #[test]
    fn test_order_shares() {
        let peers = vec![
            (NodeId::Ccr4, share(4)),
            (NodeId::Ccr1, share(1)),
            (NodeId::Ccr2, share(2)),
        ];
        let ordered = order_hashed_lvcc_shares(NodeId::Ccr3, share(3), peers).unwrap();
        let values: Vec<_> = ordered.iter().cloned().collect();
        assert_eq!(values, vec![share(1), share(2), share(3), share(4)]);

        let last = order_hashed_lvcc_shares(
            NodeId::Ccr4,
            share(4),
            vec![(NodeId::Ccr2, share(2)), (NodeId::Ccr3, share(3)), (NodeId::Ccr1, share(1))],
        )
        .unwrap();
        assert_eq!(last.get(NodeId::Ccr4), &share(4));
        assert_eq!(last.get(NodeId::Ccr1), &share(1));
    }

    #[test]
    fn test_order_shares_rejects_bad_peers() {
        assert_eq!(
            order_hashed_lvcc_shares(NodeId::Ccr1, share(1), vec![(NodeId::Ccr2, share(2))]),
            Err(PreconditionError::WrongNumberOfShares { expected: 3, found: 1 })
        );
        assert_eq!(
            order_hashed_lvcc_shares(
                NodeId::Ccr1,
                share(1),
                vec![(NodeId::Ccr1, share(1)), (NodeId::Ccr2, share(2)), (NodeId::Ccr3, share(3))]
            ),
            Err(PreconditionError::PeerIsOwnNode(NodeId::Ccr1))
        );
        assert_eq!(
            order_hashed_lvcc_shares(
                NodeId::Ccr1,
                share(1),
                vec![(NodeId::Ccr2, share(2)), (NodeId::Ccr2, share(2)), (NodeId::Ccr3, share(3))]
            ),
            Err(PreconditionError::DuplicateNodeId {
                what: "peer hashed LVCC shares",
                node_id: NodeId::Ccr2
            })
        );
    }

    #[test]
    fn test_not_allow_listed_changes_nothing() {
        let node = TestNode::new(NodeId::Ccr2, 21);
        let card = TestCard::new(&node.group);
        node.state.set_sent_vote(card.card_id).unwrap();

        let reject_all = |_: &str| false;
        let peers = vec![
            (NodeId::Ccr1, share(1)),
            (NodeId::Ccr3, share(3)),
            (NodeId::Ccr4, share(4)),
        ];
        let input = VerifyLvccHashInput {
            allow_list: &reject_all,
            hashed_lvcc_share: share(2),
            other_hashed_lvcc_shares: peers,
        };
        let verifier = ConfirmationHashVerifier::new(&node.state);
        assert!(!verifier.verify(&node.context(&card), input).unwrap());
        assert_eq!(node.status(&card).state(), VerificationCardState::Sent);
        assert_eq!(node.status(&card).confirmation_attempts(), 0);
    }

    #[test]
    fn test_verify_requires_sent_vote() {
        let node = TestNode::new(NodeId::Ccr1, 22);
        let card = TestCard::new(&node.group);

        let accept_all = |_: &str| true;
        let input = VerifyLvccHashInput {
            allow_list: &accept_all,
            hashed_lvcc_share: share(1),
            other_hashed_lvcc_shares: vec![
                (NodeId::Ccr2, share(2)),
                (NodeId::Ccr3, share(3)),
                (NodeId::Ccr4, share(4)),
            ],
        };
        let err = ConfirmationHashVerifier::new(&node.state)
            .verify(&node.context(&card), input)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::StateGuard(StateGuardError { guard: StateGuard::NotSent, .. })
        ));
        assert_eq!(node.status(&card).state(), VerificationCardState::Initial);
    }
}
