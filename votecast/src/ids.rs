use crate::*;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use uuid::Uuid;

// Identifiers are UUIDs on the wire. Parsing validates the form, so a value of one of
// these types is always syntactically valid.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier
            pub fn new_v4() -> Self {
                $name(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                $name(uuid)
            }
        }

        impl FromStr for $name {
            type Err = PreconditionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map($name)
                    .map_err(|_| PreconditionError::InvalidIdentifier {
                        kind: $kind,
                        value: s.to_owned(),
                    })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                FromStr::from_str(&s).map_err(de::Error::custom)
            }
        }
    };
}

uuid_identifier!(
    /// Election event identifier
    ElectionEventId,
    "election event"
);

uuid_identifier!(
    /// Verification card set identifier
    ///
    /// A verification card set groups the verification cards of one ballot box, and scopes
    /// the long vote cast return codes allow list.
    VerificationCardSetId,
    "verification card set"
);

uuid_identifier!(
    /// Verification card identifier
    VerificationCardId,
    "verification card"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        let card_id = VerificationCardId::new_v4();
        let stringed = card_id.to_string();
        let from_string = VerificationCardId::from_str(&stringed).unwrap();
        assert_eq!(card_id, from_string);

        let json = serde_json::to_string(&card_id).unwrap();
        assert_eq!(json, format!("\"{}\"", stringed));

        let err = ElectionEventId::from_str("not-a-uuid").unwrap_err();
        assert_eq!(
            err,
            PreconditionError::InvalidIdentifier {
                kind: "election event",
                value: "not-a-uuid".to_owned()
            }
        );
        assert!(serde_json::from_str::<VerificationCardSetId>("\"1234\"").is_err());
    }
}
