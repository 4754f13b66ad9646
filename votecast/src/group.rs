use crate::*;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use std::convert::TryFrom;

/// The encryption group: the subgroup of quadratic residues modulo a safe prime `p = 2q + 1`.
///
/// All share-valued quantities of an election live in this group. The group is validated when
/// constructed, so a `GqGroup` value always satisfies `p = 2q + 1`, `1 < g < p` and `g^q = 1 mod p`.
/// Primality of `p` and `q` is assumed to have been checked when the election was set up.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "GqGroupParameters", into = "GqGroupParameters")]
pub struct GqGroup {
    p: BigUint,
    q: BigUint,
    g: BigUint,
}

/// Raw, unvalidated group parameters as found in extraction files
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GqGroupParameters {
    #[serde(with = "biguint_hex")]
    pub p: BigUint,
    #[serde(with = "biguint_hex")]
    pub q: BigUint,
    #[serde(with = "biguint_hex")]
    pub g: BigUint,
}

impl GqGroup {
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Result<Self, PreconditionError> {
        if q < BigUint::from(2u32) {
            return Err(PreconditionError::InvalidGroup("order too small"));
        }
        if p != &q * 2u32 + 1u32 {
            return Err(PreconditionError::InvalidGroup("modulus is not 2q + 1"));
        }
        if g <= BigUint::one() || g >= p {
            return Err(PreconditionError::InvalidGroup("generator out of range"));
        }
        if !g.modpow(&q, &p).is_one() {
            return Err(PreconditionError::InvalidGroup(
                "generator is not a quadratic residue",
            ));
        }

        Ok(GqGroup { p, q, g })
    }

    /// The modulus
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// The group order
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    pub fn generator(&self) -> GqElement {
        GqElement {
            value: self.g.clone(),
            group: self.clone(),
        }
    }

    /// Group membership by Euler's criterion
    pub fn is_member(&self, value: &BigUint) -> bool {
        !value.is_zero() && value < &self.p && value.modpow(&self.q, &self.p).is_one()
    }

    /// Hash of the encryption parameters, comparable across nodes
    pub fn encryption_parameters_hash(&self) -> String {
        let digest = recursive_hash(&[
            Hashable::from("EncryptionParameters"),
            Hashable::from(&self.p),
            Hashable::from(&self.q),
            Hashable::from(&self.g),
        ]);
        base64_encode(&digest)
    }
}

impl TryFrom<GqGroupParameters> for GqGroup {
    type Error = PreconditionError;

    fn try_from(params: GqGroupParameters) -> Result<Self, Self::Error> {
        GqGroup::new(params.p, params.q, params.g)
    }
}

impl From<GqGroup> for GqGroupParameters {
    fn from(group: GqGroup) -> Self {
        GqGroupParameters {
            p: group.p,
            q: group.q,
            g: group.g,
        }
    }
}

/// A member of a `GqGroup`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GqElement {
    value: BigUint,
    group: GqGroup,
}

impl GqElement {
    /// Validate that `value` is a member of `group`.
    ///
    /// `what` names the value in the error when it is not a member.
    pub fn new(value: BigUint, group: &GqGroup, what: &'static str) -> Result<Self, PreconditionError> {
        if !group.is_member(&value) {
            return Err(PreconditionError::NotGroupMember(what));
        }
        Ok(GqElement {
            value,
            group: group.clone(),
        })
    }

    // Only for values that are members by construction
    pub(crate) fn new_unchecked(value: BigUint, group: &GqGroup) -> Self {
        GqElement {
            value,
            group: group.clone(),
        }
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn group(&self) -> &GqGroup {
        &self.group
    }

    /// Raise this element to the power of `exponent`
    pub fn exponentiate(&self, exponent: &ZqElement) -> Result<GqElement, PreconditionError> {
        if exponent.q() != self.group.q() {
            return Err(PreconditionError::GroupMismatch("exponent"));
        }
        Ok(GqElement {
            value: self.value.modpow(exponent.value(), &self.group.p),
            group: self.group.clone(),
        })
    }
}

/// An exponent: an integer modulo the group order `q`
#[derive(Clone, PartialEq, Eq)]
pub struct ZqElement {
    value: BigUint,
    q: BigUint,
}

impl ZqElement {
    pub fn new(value: BigUint, q: &BigUint, what: &'static str) -> Result<Self, PreconditionError> {
        if &value >= q {
            return Err(PreconditionError::ExponentOutOfRange(what));
        }
        Ok(ZqElement {
            value,
            q: q.clone(),
        })
    }

    /// Reduce `value` modulo `q`
    pub fn reduce(value: &BigUint, q: &BigUint) -> Self {
        ZqElement {
            value: value % q,
            q: q.clone(),
        }
    }

    /// A uniformly random exponent (with negligible bias)
    pub fn random<R: RngCore + CryptoRng>(q: &BigUint, rng: &mut R) -> Self {
        let mut bytes = vec![0u8; ((q.bits() + 7) / 8) as usize + 16];
        rng.fill_bytes(&mut bytes);
        ZqElement::reduce(&BigUint::from_bytes_be(&bytes), q)
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// Fixed-length big-endian encoding, `len` bytes long
    pub(crate) fn to_fixed_bytes(&self, len: usize) -> Vec<u8> {
        let bytes = self.value.to_bytes_be();
        let mut fixed = vec![0u8; len.saturating_sub(bytes.len())];
        fixed.extend_from_slice(&bytes);
        fixed
    }
}

// Exponents are usually secret keys
impl std::fmt::Debug for ZqElement {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ZqElement(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{small_group, test_group};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_group_validation() {
        let group = test_group();
        assert!(group.is_member(group.generator().value()));

        // p != 2q + 1
        assert!(GqGroup::new(
            BigUint::from(29u32),
            BigUint::from(11u32),
            BigUint::from(2u32)
        )
        .is_err());

        // 5 is not a quadratic residue mod 23
        assert_eq!(
            GqGroup::new(
                BigUint::from(23u32),
                BigUint::from(11u32),
                BigUint::from(5u32)
            ),
            Err(PreconditionError::InvalidGroup(
                "generator is not a quadratic residue"
            ))
        );

        // Round trips through hex parameters
        let json = serde_json::to_string(&group).unwrap();
        let parsed: GqGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, group);

        let bad = r#"{"p":"1d","q":"b","g":"2"}"#;
        assert!(serde_json::from_str::<GqGroup>(bad).is_err());
    }

    #[test]
    fn test_elements() {
        let group = small_group();
        assert!(GqElement::new(BigUint::from(4u32), &group, "element").is_ok());
        assert_eq!(
            GqElement::new(BigUint::from(5u32), &group, "element"),
            Err(PreconditionError::NotGroupMember("element"))
        );
        assert_eq!(
            GqElement::new(BigUint::from(0u32), &group, "element"),
            Err(PreconditionError::NotGroupMember("element"))
        );

        // 2^3 = 8 mod 23
        let exponent = ZqElement::new(BigUint::from(3u32), group.q(), "exponent").unwrap();
        let result = group.generator().exponentiate(&exponent).unwrap();
        assert_eq!(result.value(), &BigUint::from(8u32));

        assert!(ZqElement::new(BigUint::from(11u32), group.q(), "exponent").is_err());

        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let foreign = ZqElement::random(test_group().q(), &mut rng);
        assert_eq!(
            group.generator().exponentiate(&foreign),
            Err(PreconditionError::GroupMismatch("exponent"))
        );
    }

    #[test]
    fn test_parameters_hash() {
        assert_eq!(
            test_group().encryption_parameters_hash(),
            test_group().encryption_parameters_hash()
        );
        assert_ne!(
            test_group().encryption_parameters_hash(),
            small_group().encryption_parameters_hash()
        );
    }
}
