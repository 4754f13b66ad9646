use crate::*;
use num_bigint::BigUint;
use std::collections::HashMap;
use std::sync::RwLock;

/// Source of a node's return codes generation secret keys
pub trait ReturnCodesKeyStore {
    fn return_codes_generation_secret_key(
        &self,
        election_event_id: ElectionEventId,
    ) -> Result<ZqElement, Error>;
}

/// Secret keys held in memory, keyed by election event
#[derive(Default)]
pub struct MemKeyStore {
    inner: RwLock<HashMap<ElectionEventId, ZqElement>>,
}

impl MemKeyStore {
    pub fn insert(&self, election_event_id: ElectionEventId, key: ZqElement) -> Result<(), Error> {
        let mut keys = self
            .inner
            .write()
            .map_err(|_| Error::Store("key store lock poisoned".to_owned()))?;
        keys.insert(election_event_id, key);
        Ok(())
    }
}

impl ReturnCodesKeyStore for MemKeyStore {
    fn return_codes_generation_secret_key(
        &self,
        election_event_id: ElectionEventId,
    ) -> Result<ZqElement, Error> {
        let keys = self
            .inner
            .read()
            .map_err(|_| Error::Store("key store lock poisoned".to_owned()))?;
        keys.get(&election_event_id)
            .cloned()
            .ok_or(Error::MissingSecretKey(election_event_id))
    }
}

/// One control component node's side of the confirmation protocol.
///
/// Looks up the node's secret key and builds the per-card context from plain identifiers, so
/// callers handling messages only deal with ids, the confirmation key and hashed shares.
pub struct ConfirmationService<K, S> {
    node_id: NodeId,
    encryption_group: GqGroup,
    keys: K,
    generator: ConfirmationShareGenerator<S>,
    verifier: ConfirmationHashVerifier<S>,
}

impl<K, S> ConfirmationService<K, S>
where
    K: ReturnCodesKeyStore,
    S: NodeStateGuard + Clone,
{
    pub fn new(
        node_id: NodeId,
        encryption_group: GqGroup,
        keys: K,
        state: S,
        config: &ConfirmationConfig,
    ) -> Self {
        ConfirmationService {
            node_id,
            encryption_group,
            keys,
            generator: ConfirmationShareGenerator::new(state.clone(), config),
            verifier: ConfirmationHashVerifier::new(state),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    fn context(
        &self,
        election_event_id: ElectionEventId,
        verification_card_set_id: VerificationCardSetId,
        verification_card_id: VerificationCardId,
    ) -> ConfirmationContext {
        ConfirmationContext {
            encryption_group: self.encryption_group.clone(),
            node_id: self.node_id,
            election_event_id,
            verification_card_set_id,
            verification_card_id,
        }
    }

    /// Handle a voter's confirmation key: compute this node's LVCC share for the attempt
    pub fn create_lvcc_share(
        &self,
        election_event_id: ElectionEventId,
        verification_card_set_id: VerificationCardSetId,
        verification_card_id: VerificationCardId,
        confirmation_key: &BigUint,
    ) -> Result<CreateLvccShareOutput, Error> {
        let confirmation_key = GqElement::new(
            confirmation_key.clone(),
            &self.encryption_group,
            "confirmation key",
        )?;
        let secret_key = self
            .keys
            .return_codes_generation_secret_key(election_event_id)?;

        let context = self.context(election_event_id, verification_card_set_id, verification_card_id);
        self.generator.create_share(
            &context,
            &CreateLvccShareInput {
                confirmation_key,
                return_codes_generation_secret_key: secret_key,
            },
        )
    }

    /// Handle the peers' hashed shares for an attempt
    pub fn verify_lvcc_hash<A>(
        &self,
        election_event_id: ElectionEventId,
        verification_card_set_id: VerificationCardSetId,
        verification_card_id: VerificationCardId,
        input: VerifyLvccHashInput<A>,
    ) -> Result<bool, Error>
    where
        A: LongVoteCastReturnCodesAllowList + ?Sized,
    {
        let context = self.context(election_event_id, verification_card_set_id, verification_card_id);
        self.verifier.verify(&context, input)
    }
}
