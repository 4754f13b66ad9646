use crate::*;
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use tracing::{error, info};

/// Progress of a dispute resolution run. Phases only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DisputeResolutionPhase {
    Start,
    ElectionEventChecked,
    VoteChecked,
    ConfirmationResolved,
    Saved,
}

/// Runs the offline reconciliation of the four nodes' confirmation state after the election
/// closed, and hands the signed list of confirmed votes to an updater.
///
/// Any failed check aborts the run. Nothing is passed to the updater unless all checks pass.
pub struct DisputeResolver<R = VoteConfirmationConsistency> {
    resolver: R,
    phase: DisputeResolutionPhase,
}

impl DisputeResolver {
    pub fn new() -> Self {
        DisputeResolver::with_resolver(VoteConfirmationConsistency)
    }
}

impl Default for DisputeResolver {
    fn default() -> Self {
        DisputeResolver::new()
    }
}

impl<R: VoteConfirmationResolver> DisputeResolver<R> {
    pub fn with_resolver(resolver: R) -> Self {
        DisputeResolver {
            resolver,
            phase: DisputeResolutionPhase::Start,
        }
    }

    pub fn phase(&self) -> DisputeResolutionPhase {
        self.phase
    }

    fn advance(&mut self, election_event_id: ElectionEventId, phase: DisputeResolutionPhase) {
        info!(election_event_id = %election_event_id, "dispute resolution: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    pub fn resolve<U: ConfirmationUpdater + ?Sized>(
        &mut self,
        input: &DisputeResolverInput,
        signing_key: &SecretKey,
        updater: &U,
    ) -> Result<Signed<ResolvedConfirmedVotesPayload>, DisputeError> {
        let election_event_id = input.election_event_id();
        self.phase = DisputeResolutionPhase::Start;

        let result = self.run(input, signing_key, updater);
        if let Err(e) = &result {
            error!(election_event_id = %election_event_id, phase = ?self.phase, "dispute resolution failed: {}", e);
        }
        result
    }

    fn run<U: ConfirmationUpdater + ?Sized>(
        &mut self,
        input: &DisputeResolverInput,
        signing_key: &SecretKey,
        updater: &U,
    ) -> Result<Signed<ResolvedConfirmedVotesPayload>, DisputeError> {
        let election_event_id = input.election_event_id();
        let failed = |source: Error| DisputeError::Failed {
            election_event_id,
            source,
        };

        ElectionEventConsistency.check(input)?;
        self.advance(election_event_id, DisputeResolutionPhase::ElectionEventChecked);

        VoteConsistency.check(input)?;
        self.advance(election_event_id, DisputeResolutionPhase::VoteChecked);

        let resolved_confirmed_votes = self.resolver.resolve(input)?;
        let extracted = input.extracted_verification_card_ids().len();
        if resolved_confirmed_votes.len() > extracted {
            return Err(DisputeError::TooManyResolvedVotes {
                election_event_id,
                resolved: resolved_confirmed_votes.len(),
                extracted,
            });
        }
        info!(
            election_event_id = %election_event_id,
            resolved = resolved_confirmed_votes.len(),
            extracted,
            "resolved confirmed votes"
        );
        self.advance(election_event_id, DisputeResolutionPhase::ConfirmationResolved);

        let payload = ResolvedConfirmedVotesPayload {
            election_event_id,
            encryption_group: input.encryption_group().clone(),
            resolved_confirmed_votes,
            resolver_public_key: PublicKey::from(signing_key),
        };
        let signed = Signed::sign(signing_key, payload).map_err(failed)?;

        let allow_lists = input.election_event(NodeId::Ccr1).allow_lists();
        let accepted = updater
            .apply(election_event_id, &allow_lists, &signed)
            .map_err(failed)?;
        if !accepted {
            return Err(DisputeError::UpdateRejected { election_event_id });
        }
        self.advance(election_event_id, DisputeResolutionPhase::Saved);

        Ok(signed)
    }
}
