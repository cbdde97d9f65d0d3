//! `#[serde(with = "...")]` helpers for [`VerifiableId`] fields.
//!
//! The derived impls on [`VerifiableId`] use the bare integer. Token claims and
//! JSON APIs usually carry identifiers as strings instead (JavaScript numbers
//! lose precision past 2^53 and claim fields like `jti` are strings), which is
//! what these modules provide.
//!
//! [`VerifiableId`]: crate::VerifiableId

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod as_decimal_str {
    use super::{Deserialize, Deserializer, Serialize, Serializer};
    use crate::VerifiableId;
    use std::borrow::Cow;

    /// Serialize an ID as its decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &VerifiableId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.to_string().serialize(s)
    }

    /// Deserialize an ID from its decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a decimal integer
    /// - The value exceeds the 48-bit layout
    pub fn deserialize<'de, D>(d: D) -> Result<VerifiableId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Cow::<'de, str>::deserialize(d)?;
        VerifiableId::from_decimal_str(&s).map_err(serde::de::Error::custom)
    }
}

pub mod as_hex_str {
    use super::{Deserialize, Deserializer, Serialize, Serializer};
    use crate::VerifiableId;
    use std::borrow::Cow;

    /// Serialize an ID as lowercase hex without a prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &VerifiableId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.to_hex_string().serialize(s)
    }

    /// Deserialize an ID from a hex string, with or without `0x`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a hexadecimal integer
    /// - The value exceeds the 48-bit layout
    pub fn deserialize<'de, D>(d: D) -> Result<VerifiableId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Cow::<'de, str>::deserialize(d)?;
        VerifiableId::from_hex_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Settings, VerifiableId};
    use core::time::Duration;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Claims {
        #[serde(with = "crate::as_decimal_str")]
        jti: VerifiableId,
        #[serde(with = "crate::as_hex_str")]
        trace: VerifiableId,
        raw: VerifiableId,
    }

    #[test]
    fn claims_round_trip_through_json() {
        let claims = Claims {
            jti: VerifiableId::from_raw(0x10021),
            trace: VerifiableId::from_raw(0x10021),
            raw: VerifiableId::from_raw(0x10021),
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"{"jti":"65569","trace":"10021","raw":65569}"#);
        assert_eq!(serde_json::from_str::<Claims>(&json).unwrap(), claims);
    }

    #[test]
    fn string_helpers_reject_overflow() {
        let json = r#"{"jti":"281474976710656","trace":"1","raw":1}"#;
        let err = serde_json::from_str::<Claims>(json).unwrap_err();
        assert!(err.to_string().contains("exceeds the 48-bit layout"));

        let json = r#"{"jti":"1","trace":"zz","raw":1}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"secret_key":"k"}"#).unwrap();
        assert_eq!(settings.secret_key, "k");
        assert_eq!(settings.start_time, None);

        let settings: Settings =
            serde_json::from_str(r#"{"start_time":{"secs":1700000000,"nanos":0}}"#).unwrap();
        assert_eq!(settings.start_time, Some(Duration::from_secs(1_700_000_000)));
        assert_eq!(settings.secret_key, "");
    }
}
