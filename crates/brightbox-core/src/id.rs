//! Strongly-typed identifier wrappers for Brightbox resources.
//!
//! Brightbox identifiers are short prefixed handles such as `cip-jsjc5` or
//! `int-ztqbx`. The wrappers here validate the prefix on construction,
//! preventing identifier mix-ups at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

fn is_valid_handle(id: &str, prefix: &str) -> bool {
    match id.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('-')) {
        Some(suffix) => !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_alphanumeric()),
        None => false,
    }
}

/// Macro to generate strongly-typed identifier wrapper types.
macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Identifier prefix for this resource type.
            pub const PREFIX: &'static str = $prefix;

            /// Creates a validated identifier from a string.
            ///
            /// # Errors
            ///
            /// Returns an error if the string does not carry the expected
            /// prefix or contains non-alphanumeric characters.
            pub fn new(id: impl Into<String>) -> Result<Self> {
                let id = id.into();
                if is_valid_handle(&id, Self::PREFIX) {
                    Ok(Self(id))
                } else {
                    Err(Error::InvalidId(id))
                }
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Converts into the inner string.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = String::deserialize(deserializer)?;
                Self::new(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

prefixed_id!(CloudIpId, "cip", "Cloud IP identifier");
prefixed_id!(InterfaceId, "int", "Server network interface identifier");

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CLOUD_IP: &str = "cip-jsjc5";
    const VALID_INTERFACE: &str = "int-ztqbx";

    #[test]
    fn test_cloud_ip_id_new_valid() {
        let id = CloudIpId::new(VALID_CLOUD_IP).unwrap();
        assert_eq!(id.as_str(), VALID_CLOUD_IP);
    }

    #[test]
    fn test_cloud_ip_id_new_wrong_prefix() {
        let result = CloudIpId::new("srv-xvpn7");
        assert!(matches!(result.unwrap_err(), Error::InvalidId(_)));
    }

    #[test]
    fn test_cloud_ip_id_new_missing_suffix() {
        assert!(CloudIpId::new("cip-").is_err());
        assert!(CloudIpId::new("cip").is_err());
    }

    #[test]
    fn test_cloud_ip_id_new_invalid_characters() {
        assert!(CloudIpId::new("cip-jsj c5").is_err());
        assert!(CloudIpId::new("cip-jsjc5/../x").is_err());
    }

    #[test]
    fn test_cloud_ip_id_from_str() {
        let id: CloudIpId = VALID_CLOUD_IP.parse().unwrap();
        assert_eq!(id.to_string(), VALID_CLOUD_IP);
    }

    #[test]
    fn test_cloud_ip_id_display() {
        let id = CloudIpId::new(VALID_CLOUD_IP).unwrap();
        assert_eq!(format!("{id}"), VALID_CLOUD_IP);
    }

    #[test]
    fn test_cloud_ip_id_into_string() {
        let id = CloudIpId::new(VALID_CLOUD_IP).unwrap();
        let s: String = id.into();
        assert_eq!(s, VALID_CLOUD_IP);
    }

    #[test]
    fn test_cloud_ip_id_as_ref() {
        let id = CloudIpId::new(VALID_CLOUD_IP).unwrap();
        let s: &str = id.as_ref();
        assert_eq!(s, VALID_CLOUD_IP);
    }

    #[test]
    fn test_cloud_ip_id_serialize() {
        let id = CloudIpId::new(VALID_CLOUD_IP).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{VALID_CLOUD_IP}\""));
    }

    #[test]
    fn test_cloud_ip_id_deserialize() {
        let json = format!("\"{VALID_CLOUD_IP}\"");
        let id: CloudIpId = serde_json::from_str(&json).unwrap();
        assert_eq!(id.as_str(), VALID_CLOUD_IP);
    }

    #[test]
    fn test_cloud_ip_id_deserialize_rejects_wrong_prefix() {
        let result: std::result::Result<CloudIpId, _> = serde_json::from_str("\"srv-xvpn7\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_interface_id() {
        let id = InterfaceId::new(VALID_INTERFACE).unwrap();
        assert_eq!(id.to_string(), VALID_INTERFACE);
        assert_eq!(InterfaceId::PREFIX, "int");
    }

    #[test]
    fn test_id_hash() {
        use std::collections::HashSet;

        let id1 = CloudIpId::new("cip-aaaaa").unwrap();
        let id2 = CloudIpId::new("cip-bbbbb").unwrap();
        let id3 = CloudIpId::new("cip-aaaaa").unwrap();

        let mut set = HashSet::new();
        set.insert(id1);
        set.insert(id2);
        set.insert(id3);

        assert_eq!(set.len(), 2);
    }
}
