use crate::*;
use serde::Serialize;
use ed25519_dalek::ExpandedSecretKey;
use ed25519_dalek::Keypair;
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use ed25519_dalek::Signature;
use std::convert::AsRef;
use std::ops::Deref;

/// Generate an ed25519 keypair for signing dispute resolution payloads
pub fn generate_keypair() -> (SecretKey, PublicKey) {
    let mut csprng = rand::rngs::OsRng {};
    let Keypair { public, secret } = Keypair::generate(&mut csprng);
    (secret, public)
}

/// A payload that carries the public key of its signer
#[doc(hidden)]
pub trait Signable: Serialize {
    fn public(&self) -> PublicKey;

    fn as_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_cbor::to_vec(&self)?)
    }
}

/// A generic signed payload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Signed<T: Signable> {
    pub payload: T,

    #[serde(with = "EdSignatureHex")]
    pub sig: Signature,
}

impl<T: Signable> Signed<T> {
    /// Sign a payload, producing a Signed<T>
    pub fn sign(secret: &SecretKey, payload: T) -> Result<Self, Error> {
        let public_key = PublicKey::from(secret);
        if public_key != payload.public() {
            return Err(Error::MismatchedPublicKeys);
        }

        let serialized = payload.as_bytes()?;

        let expanded: ExpandedSecretKey = secret.into();
        let signature = expanded.sign(&serialized, &public_key);

        Ok(Signed {
            payload,
            sig: signature,
        })
    }

    /// Verify the signature against the public key in the payload
    pub fn verify_signature(&self) -> Result<(), Error> {
        let serialized = self.payload.as_bytes()?;
        Ok(self.payload.public().verify_strict(&serialized, &self.sig)?)
    }

    /// Get the inner unsigned payload
    pub fn inner(&self) -> &T {
        &self.payload
    }
}

impl<T: Signable> AsRef<T> for Signed<T> {
    fn as_ref(&self) -> &T {
        &self.payload
    }
}

impl<T: Signable> Deref for Signed<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[derive(Serialize, Deserialize, Clone, Debug)]
    struct Note {
        text: String,
        #[serde(with = "EdPublicKeyHex")]
        author: PublicKey,
    }

    impl Signable for Note {
        fn public(&self) -> PublicKey {
            self.author
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let (secret, public) = test_signing_key(1);
        let note = Note {
            text: "hello".to_owned(),
            author: public,
        };

        let mut signed = Signed::sign(&secret, note.clone()).unwrap();
        signed.verify_signature().unwrap();
        assert_eq!(signed.text, "hello");

        // Keys and signatures travel as hex strings
        let json = serde_json::to_string(&signed).unwrap();
        assert!(json.contains(&hex::encode(public.as_bytes())));
        assert!(json.contains(&hex::encode(&signed.sig.to_bytes()[..])));
        let parsed: Signed<Note> = serde_json::from_str(&json).unwrap();
        parsed.verify_signature().unwrap();

        signed.payload.text = "tampered".to_owned();
        assert!(signed.verify_signature().is_err());

        let (other_secret, _) = test_signing_key(2);
        assert!(matches!(
            Signed::sign(&other_secret, note),
            Err(Error::MismatchedPublicKeys)
        ));
    }
}
