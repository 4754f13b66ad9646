//! Deterministic hashing primitives shared by every node.
//!
//! Values are hashed through a typed, recursive encoding so that a list of values can never
//! collide with the concatenation of its members:
//!
//! - bytes: `H(0x00 || bytes)`
//! - integers: `H(0x01 || big-endian bytes)`
//! - strings: `H(0x02 || utf-8 bytes)`
//! - lists: `H(0x03 || H(v1) || ... || H(vn))`
//!
//! `H` is SHA-256.
use crate::*;
use digest::Digest;
use hkdf::Hkdf;
use num_bigint::BigUint;
use sha2::Sha256;

/// Length of a digest in bytes
pub const HASH_LENGTH: usize = 32;

/// A value that can be fed to `recursive_hash`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hashable {
    Bytes(Vec<u8>),
    Integer(BigUint),
    Text(String),
    List(Vec<Hashable>),
}

impl From<&str> for Hashable {
    fn from(s: &str) -> Self {
        Hashable::Text(s.to_owned())
    }
}

impl From<String> for Hashable {
    fn from(s: String) -> Self {
        Hashable::Text(s)
    }
}

impl From<&BigUint> for Hashable {
    fn from(n: &BigUint) -> Self {
        Hashable::Integer(n.clone())
    }
}

impl From<Vec<Hashable>> for Hashable {
    fn from(values: Vec<Hashable>) -> Self {
        Hashable::List(values)
    }
}

fn hash_one(value: &Hashable) -> [u8; HASH_LENGTH] {
    let mut hasher = Sha256::new();
    match value {
        Hashable::Bytes(bytes) => {
            hasher.update(&[0x00u8]);
            hasher.update(bytes);
        }
        Hashable::Integer(n) => {
            hasher.update(&[0x01u8]);
            hasher.update(&n.to_bytes_be());
        }
        Hashable::Text(s) => {
            hasher.update(&[0x02u8]);
            hasher.update(s.as_bytes());
        }
        Hashable::List(values) => return hash_list(values),
    }
    finish(hasher)
}

fn hash_list(values: &[Hashable]) -> [u8; HASH_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(&[0x03u8]);
    for value in values {
        hasher.update(&hash_one(value));
    }
    finish(hasher)
}

fn finish(hasher: Sha256) -> [u8; HASH_LENGTH] {
    let mut digest = [0u8; HASH_LENGTH];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Hash one value, or a list of values when given more than one.
pub fn recursive_hash(values: &[Hashable]) -> [u8; HASH_LENGTH] {
    match values {
        [single] => hash_one(single),
        _ => hash_list(values),
    }
}

// Output length for hashing into Zq: 256 extra bits make the modular bias negligible
fn zq_output_length(q: &BigUint) -> usize {
    ((q.bits() + 256 + 7) / 8) as usize
}

/// Hash values to an integer in `[0, q)`
pub fn recursive_hash_to_zq(q: &BigUint, values: &[Hashable]) -> Result<BigUint, Error> {
    let digest = recursive_hash(values);
    let hk = Hkdf::<Sha256>::new(None, &digest);

    let mut okm = vec![0u8; zq_output_length(q)];
    hk.expand(b"RecursiveHashToZq", &mut okm)
        .map_err(|_| Error::KeyDerivation)?;

    Ok(BigUint::from_bytes_be(&okm) % q)
}

/// Derive an exponent from a secret key and a context.
///
/// The info strings are length-prefixed before expansion so that no two contexts share an encoding.
pub fn kdf_to_zq(secret: &ZqElement, info: &[&str]) -> Result<ZqElement, Error> {
    let q = secret.q();
    let ikm = secret.to_fixed_bytes(((q.bits() + 7) / 8) as usize);
    let hk = Hkdf::<Sha256>::new(None, &ikm);

    let mut encoded_info = Vec::new();
    for s in info {
        encoded_info.extend_from_slice(&(s.len() as u32).to_be_bytes());
        encoded_info.extend_from_slice(s.as_bytes());
    }

    let mut okm = vec![0u8; zq_output_length(q)];
    hk.expand(&encoded_info, &mut okm)
        .map_err(|_| Error::KeyDerivation)?;

    Ok(ZqElement::reduce(&BigUint::from_bytes_be(&okm), q))
}

/// Map an integer to a group element.
///
/// The integer is hashed to `[1, q]` and squared modulo `p`, so the result is always a
/// non-zero quadratic residue.
pub fn hash_and_square(x: &BigUint, group: &GqGroup) -> Result<GqElement, Error> {
    let hashed = recursive_hash_to_zq(group.q(), &[Hashable::from(x)])? + 1u32;
    let squared = hashed.modpow(&BigUint::from(2u32), group.p());
    Ok(GqElement::new_unchecked(squared, group))
}

pub fn base64_encode(digest: &[u8]) -> String {
    base64::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_group;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_recursive_hash() {
        let a = recursive_hash(&[Hashable::from("a"), Hashable::from("b")]);
        let b = recursive_hash(&[Hashable::from("a"), Hashable::from("b")]);
        assert_eq!(a, b);

        // Lists and concatenations differ
        let concatenated = recursive_hash(&[Hashable::from("ab")]);
        assert_ne!(a, concatenated);

        // A single value is not the same as a list of one
        let single = recursive_hash(&[Hashable::from("a")]);
        let list = recursive_hash(&[Hashable::List(vec![Hashable::from("a")])]);
        assert_ne!(single, list);

        // Type tags separate strings from bytes
        let text = recursive_hash(&[Hashable::from("a")]);
        let bytes = recursive_hash(&[Hashable::Bytes(b"a".to_vec())]);
        assert_ne!(text, bytes);
    }

    #[test]
    fn test_hash_to_group() {
        let group = test_group();
        let x = BigUint::from(42u32);

        let element = hash_and_square(&x, &group).unwrap();
        assert!(group.is_member(element.value()));
        assert_eq!(element, hash_and_square(&x, &group).unwrap());
        assert_ne!(element, hash_and_square(&BigUint::from(43u32), &group).unwrap());

        let zq = recursive_hash_to_zq(group.q(), &[Hashable::from(&x)]).unwrap();
        assert!(&zq < group.q());
    }

    #[test]
    fn test_kdf_to_zq() {
        let group = test_group();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let secret = ZqElement::random(group.q(), &mut rng);

        let k1 = kdf_to_zq(&secret, &["purpose", "ab", "c"]).unwrap();
        let k2 = kdf_to_zq(&secret, &["purpose", "ab", "c"]).unwrap();
        assert_eq!(k1, k2);
        assert!(k1.value() < group.q());

        // Length prefixes keep contexts apart
        let k3 = kdf_to_zq(&secret, &["purpose", "a", "bc"]).unwrap();
        assert_ne!(k1, k3);

        let other = ZqElement::random(group.q(), &mut rng);
        assert_ne!(k1, kdf_to_zq(&other, &["purpose", "ab", "c"]).unwrap());
    }
}
