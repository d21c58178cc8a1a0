//! Normalization from raw API payloads into canonical entities.
//!
//! The provider returns richly nested JSON; these constructors reduce it
//! to the canonical [`Node`], [`Image`], [`Size`] and [`Location`] shapes.
//! Fields outside each entity's allow-list are dropped rather than carried
//! around, and structural surprises surface as
//! [`Error::SchemaViolation`](brightbox_core::Error::SchemaViolation)
//! naming the entity under inspection.

use crate::models::{Extra, Image, Location, Node, Size};
use crate::state::NodeState;
use brightbox_core::{Error, Result};
use serde_json::{Map, Value};

/// Server fields preserved in [`Node::extra`].
pub const NODE_EXTRA_KEYS: &[&str] = &[
    "fqdn",
    "status",
    "interfaces",
    "zone",
    "snapshots",
    "server_groups",
    "hostname",
    "started_at",
    "created_at",
    "deleted_at",
];

/// Image fields preserved in [`Image::extra`].
pub const IMAGE_EXTRA_KEYS: &[&str] = &[
    "ancestor",
    "arch",
    "compatibility_mode",
    "created_at",
    "description",
    "disk_size",
    "min_ram",
    "official",
    "owner",
    "public",
    "source",
    "source_type",
    "status",
    "username",
    "virtual_size",
    "licence_name",
];

/// Upper bound on nested image ancestors before normalization bails out.
pub const MAX_ANCESTOR_DEPTH: usize = 32;

// Every zone the provider operates is in the United Kingdom.
const COUNTRY_CODE: &str = "GB";

fn object<'a>(entity: &'static str, value: &'a Value) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::schema(entity, "payload is not a JSON object"))
}

fn require<'a>(
    entity: &'static str,
    source: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Value> {
    source
        .get(key)
        .ok_or_else(|| Error::schema(entity, format!("missing field `{key}`")))
}

fn require_str<'a>(
    entity: &'static str,
    source: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a str> {
    require(entity, source, key)?
        .as_str()
        .ok_or_else(|| Error::schema(entity, format!("field `{key}` is not a string")))
}

fn optional_str<'a>(
    entity: &'static str,
    source: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a str>> {
    match source.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| Error::schema(entity, format!("field `{key}` is not a string"))),
    }
}

fn require_u64(entity: &'static str, source: &Map<String, Value>, key: &str) -> Result<u64> {
    require(entity, source, key)?
        .as_u64()
        .ok_or_else(|| Error::schema(entity, format!("field `{key}` is not an unsigned integer")))
}

fn require_array<'a>(
    entity: &'static str,
    source: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Vec<Value>> {
    require(entity, source, key)?
        .as_array()
        .ok_or_else(|| Error::schema(entity, format!("field `{key}` is not an array")))
}

/// Copies the allow-listed keys that are present in `source`, nulls
/// included, into a fresh bag.
fn extract(source: &Map<String, Value>, keys: &[&str]) -> Extra {
    let mut extra = Extra::new();
    for key in keys {
        if let Some(value) = source.get(*key) {
            extra.insert((*key).to_string(), value.clone());
        }
    }
    extra
}

impl Node {
    /// Builds a canonical node from a raw server payload.
    ///
    /// Public addresses are collected in provider order: every cloud IP's
    /// `public_ip` first, then each interface's `ipv6_address`. Interface
    /// `ipv4_address` values become the private addresses. An interface
    /// may omit either address family (absent or `null` contributes
    /// nothing), but an address that is present must be a string, and a
    /// cloud IP without a `public_ip` is malformed.
    pub fn from_api(value: &Value) -> Result<Self> {
        let source = object("server", value)?;
        let id = require_str("server", source, "id")?.to_string();
        let name = require_str("server", source, "name")?.to_string();
        let state = NodeState::from_provider_status(require_str("server", source, "status")?)?;

        let mut public_ips = Vec::new();
        let mut private_ips = Vec::new();
        for entry in require_array("server", source, "cloud_ips")? {
            let cloud_ip = object("cloud_ip", entry)?;
            public_ips.push(require_str("cloud_ip", cloud_ip, "public_ip")?.to_string());
        }
        for entry in require_array("server", source, "interfaces")? {
            let interface = object("interface", entry)?;
            if let Some(ipv4) = optional_str("interface", interface, "ipv4_address")? {
                private_ips.push(ipv4.to_string());
            }
            if let Some(ipv6) = optional_str("interface", interface, "ipv6_address")? {
                public_ips.push(ipv6.to_string());
            }
        }

        let size = Size::from_api(require("server", source, "server_type")?)?;
        let image = Image::from_api(require("server", source, "image")?)?;

        Ok(Self {
            id,
            name,
            state,
            public_ips,
            private_ips,
            size,
            image,
            extra: extract(source, NODE_EXTRA_KEYS),
        })
    }
}

impl Image {
    /// Builds a canonical image from a raw image payload.
    ///
    /// The `ancestor` entry in [`Image::extra`] always exists: it holds
    /// the recursively normalized parent image, or `null` when the
    /// provider reports none.
    pub fn from_api(value: &Value) -> Result<Self> {
        Self::from_api_at_depth(value, 0)
    }

    fn from_api_at_depth(value: &Value, depth: usize) -> Result<Self> {
        if depth > MAX_ANCESTOR_DEPTH {
            return Err(Error::schema(
                "image",
                format!("ancestor chain deeper than {MAX_ANCESTOR_DEPTH}"),
            ));
        }
        let source = object("image", value)?;
        let id = require_str("image", source, "id")?.to_string();
        let name = require_str("image", source, "name")?.to_string();

        let mut extra = extract(source, IMAGE_EXTRA_KEYS);
        let ancestor = match source.get("ancestor") {
            Some(parent) if !parent.is_null() => {
                serde_json::to_value(Self::from_api_at_depth(parent, depth + 1)?)?
            }
            _ => Value::Null,
        };
        extra.insert("ancestor".to_string(), ancestor);

        Ok(Self { id, name, extra })
    }
}

impl Size {
    /// Builds a canonical size from a raw server type payload.
    ///
    /// The provider reports neither bandwidth nor price, so both are
    /// fixed at zero.
    pub fn from_api(value: &Value) -> Result<Self> {
        let source = object("server_type", value)?;
        Ok(Self {
            id: require_str("server_type", source, "id")?.to_string(),
            name: require_str("server_type", source, "name")?.to_string(),
            ram: require_u64("server_type", source, "ram")?,
            disk: require_u64("server_type", source, "disk_size")?,
            bandwidth: 0,
            price: 0.0,
        })
    }
}

impl Location {
    /// Builds a canonical location from a raw zone payload.
    pub fn from_api(value: &Value) -> Result<Self> {
        let source = object("zone", value)?;
        Ok(Self {
            id: require_str("zone", source, "id")?.to_string(),
            name: require_str("zone", source, "handle")?.to_string(),
            country: COUNTRY_CODE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn server_payload() -> Value {
        json!({
            "id": "srv-xvpn7",
            "url": "servers/srv-xvpn7",
            "name": "web-1",
            "status": "active",
            "hostname": "srv-xvpn7",
            "fqdn": "srv-xvpn7.gb1.brightbox.com",
            "created_at": "2012-01-23T04:20:43Z",
            "started_at": "2012-01-23T04:21:18Z",
            "deleted_at": null,
            "account": {"id": "acc-tqs4c"},
            "server_type": {
                "id": "typ-urtky",
                "name": "Brightbox Small Instance",
                "ram": 2048,
                "disk_size": 81920
            },
            "image": {
                "id": "img-arm8f",
                "name": "ubuntu-lucid-10.04",
                "ancestor": null
            },
            "zone": {"id": "zon-6mxqw", "handle": "gb1-a"},
            "cloud_ips": [
                {"id": "cip-ja24a", "public_ip": "109.107.35.16", "status": "mapped"}
            ],
            "interfaces": [
                {"id": "int-mc3a9", "ipv4_address": "10.74.210.210"}
            ],
            "snapshots": [],
            "server_groups": [{"id": "grp-irgkw"}]
        })
    }

    #[test]
    fn test_node_normalization() {
        let node = Node::from_api(&server_payload()).unwrap();

        assert_eq!(node.id, "srv-xvpn7");
        assert_eq!(node.name, "web-1");
        assert_eq!(node.state, NodeState::Running);
        assert_eq!(node.public_ips, vec!["109.107.35.16"]);
        assert_eq!(node.private_ips, vec!["10.74.210.210"]);
        assert_eq!(node.size.id, "typ-urtky");
        assert_eq!(node.size.ram, 2048);
        assert_eq!(node.image.id, "img-arm8f");

        assert_eq!(node.extra["fqdn"], json!("srv-xvpn7.gb1.brightbox.com"));
        assert_eq!(node.extra["zone"]["handle"], json!("gb1-a"));
        assert_eq!(node.extra["deleted_at"], Value::Null);
        assert!(!node.extra.contains_key("url"));
        assert!(!node.extra.contains_key("account"));
    }

    #[test]
    fn test_node_public_ip_ordering() {
        let mut payload = server_payload();
        payload["cloud_ips"] = json!([
            {"id": "cip-ja24a", "public_ip": "109.107.35.16"},
            {"id": "cip-kw5ft", "public_ip": "109.107.36.102"}
        ]);
        payload["interfaces"] = json!([
            {
                "id": "int-mc3a9",
                "ipv4_address": "10.74.210.210",
                "ipv6_address": "2a02:1348:14c:393a:24:19ff:fef0:e4ea"
            }
        ]);

        let node = Node::from_api(&payload).unwrap();
        assert_eq!(
            node.public_ips,
            vec![
                "109.107.35.16",
                "109.107.36.102",
                "2a02:1348:14c:393a:24:19ff:fef0:e4ea"
            ]
        );
        assert_eq!(node.private_ips, vec!["10.74.210.210"]);
    }

    #[test]
    fn test_node_interface_missing_address_family_is_skipped() {
        let mut payload = server_payload();
        payload["cloud_ips"] = json!([]);
        payload["interfaces"] = json!([
            {"id": "int-mtwcm", "ipv4_address": "10.240.228.234"},
            {"id": "int-eu4na", "ipv6_address": "2a02:1348:14c:393a:24:19ff:fef0:e4ea"},
            {"id": "int-ed9wi", "ipv4_address": null}
        ]);

        let node = Node::from_api(&payload).unwrap();
        assert_eq!(
            node.public_ips,
            vec!["2a02:1348:14c:393a:24:19ff:fef0:e4ea"]
        );
        assert_eq!(node.private_ips, vec!["10.240.228.234"]);
    }

    #[test]
    fn test_node_interface_non_string_address_is_schema_violation() {
        let mut payload = server_payload();
        payload["interfaces"] = json!([{"id": "int-mc3a9", "ipv4_address": 42}]);

        let error = Node::from_api(&payload).unwrap_err();
        assert!(matches!(
            error,
            Error::SchemaViolation { entity: "interface", .. }
        ));
        assert!(error
            .to_string()
            .contains("field `ipv4_address` is not a string"));

        payload["interfaces"] = json!([{"id": "int-mc3a9", "ipv6_address": ["2a02::1"]}]);
        let error = Node::from_api(&payload).unwrap_err();
        assert!(error
            .to_string()
            .contains("field `ipv6_address` is not a string"));
    }

    #[test]
    fn test_node_missing_status_is_schema_violation() {
        let mut payload = server_payload();
        payload.as_object_mut().unwrap().remove("status");

        let error = Node::from_api(&payload).unwrap_err();
        assert!(matches!(
            error,
            Error::SchemaViolation { entity: "server", .. }
        ));
        assert!(error.to_string().contains("missing field `status`"));
    }

    #[test]
    fn test_node_cloud_ip_without_public_ip_is_schema_violation() {
        let mut payload = server_payload();
        payload["cloud_ips"] = json!([{"id": "cip-ja24a", "status": "mapped"}]);

        let error = Node::from_api(&payload).unwrap_err();
        assert!(matches!(
            error,
            Error::SchemaViolation { entity: "cloud_ip", .. }
        ));
    }

    #[test]
    fn test_node_non_string_id_is_schema_violation() {
        let mut payload = server_payload();
        payload["id"] = json!(42);

        let error = Node::from_api(&payload).unwrap_err();
        assert!(error.to_string().contains("field `id` is not a string"));
    }

    #[test]
    fn test_node_normalization_is_repeatable() {
        let payload = server_payload();
        let first = Node::from_api(&payload).unwrap();
        let second = Node::from_api(&payload).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_image_extra_allow_list() {
        let image = Image::from_api(&json!({
            "id": "img-arm8f",
            "url": "images/img-arm8f",
            "name": "ubuntu-lucid-10.04",
            "arch": "i686",
            "compatibility_mode": false,
            "created_at": "2012-01-22T05:36:24Z",
            "disk_size": 671,
            "min_ram": null,
            "official": false,
            "owner": "acc-tqs4c",
            "public": true,
            "source": "oneiric-i386-20178.gz",
            "source_type": "upload",
            "status": "deprecated",
            "username": "ubuntu",
            "virtual_size": 1025
        }))
        .unwrap();

        assert_eq!(image.id, "img-arm8f");
        assert_eq!(image.name, "ubuntu-lucid-10.04");
        assert_eq!(image.extra["arch"], json!("i686"));
        assert_eq!(image.extra["min_ram"], Value::Null);
        assert_eq!(image.extra["virtual_size"], json!(1025));
        assert!(!image.extra.contains_key("url"));
        assert!(!image.extra.contains_key("licence_name"));
    }

    #[test]
    fn test_image_ancestor_is_normalized() {
        let image = Image::from_api(&json!({
            "id": "img-j93gd",
            "name": "ubuntu-maverick-10.10",
            "ancestor": {
                "id": "img-99q79",
                "url": "images/img-99q79",
                "name": "CentOS 5.5 server",
                "arch": "x86_64",
                "ancestor": null
            }
        }))
        .unwrap();

        let ancestor = &image.extra["ancestor"];
        assert_eq!(ancestor["id"], json!("img-99q79"));
        assert_eq!(ancestor["name"], json!("CentOS 5.5 server"));
        assert_eq!(ancestor["extra"]["arch"], json!("x86_64"));
        assert_eq!(ancestor["extra"]["ancestor"], Value::Null);
        assert!(ancestor["extra"].get("url").is_none());
    }

    #[test]
    fn test_image_null_ancestor_yields_null_entry() {
        let image = Image::from_api(&json!({
            "id": "img-99q79",
            "name": "CentOS 5.5 server",
            "ancestor": null
        }))
        .unwrap();

        assert_eq!(image.extra["ancestor"], Value::Null);
    }

    #[test]
    fn test_image_absent_ancestor_yields_null_entry() {
        let image = Image::from_api(&json!({
            "id": "img-99q79",
            "name": "CentOS 5.5 server"
        }))
        .unwrap();

        assert_eq!(image.extra["ancestor"], Value::Null);
    }

    #[test]
    fn test_image_empty_ancestor_object_is_schema_violation() {
        let error = Image::from_api(&json!({
            "id": "img-j93gd",
            "name": "ubuntu-maverick-10.10",
            "ancestor": {}
        }))
        .unwrap_err();

        assert!(matches!(
            error,
            Error::SchemaViolation { entity: "image", .. }
        ));
        assert!(error.to_string().contains("missing field `id`"));
    }

    #[test]
    fn test_image_ancestor_chain_depth_limit() {
        let mut payload = json!({"id": "img-00000", "name": "base"});
        for index in 1..=40 {
            payload = json!({
                "id": format!("img-{index:05}"),
                "name": format!("layer {index}"),
                "ancestor": payload
            });
        }

        let error = Image::from_api(&payload).unwrap_err();
        assert!(matches!(
            error,
            Error::SchemaViolation { entity: "image", .. }
        ));
        assert!(error.to_string().contains("ancestor chain deeper than"));
    }

    #[test]
    fn test_size_fills_unreported_fields() {
        let size = Size::from_api(&json!({
            "id": "typ-4nssg",
            "name": "Brightbox Nano Instance",
            "status": "experimental",
            "ram": 512,
            "disk_size": 20480
        }))
        .unwrap();

        assert_eq!(size.id, "typ-4nssg");
        assert_eq!(size.ram, 512);
        assert_eq!(size.disk, 20480);
        assert_eq!(size.bandwidth, 0);
        assert!((size.price - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_size_non_numeric_ram_is_schema_violation() {
        let error = Size::from_api(&json!({
            "id": "typ-4nssg",
            "name": "Brightbox Nano Instance",
            "ram": "lots",
            "disk_size": 20480
        }))
        .unwrap_err();

        assert!(matches!(
            error,
            Error::SchemaViolation { entity: "server_type", .. }
        ));
    }

    #[test]
    fn test_location_uses_handle_and_fixed_country() {
        let location = Location::from_api(&json!({
            "id": "zon-6mxqw",
            "handle": "gb1-a"
        }))
        .unwrap();

        assert_eq!(location.id, "zon-6mxqw");
        assert_eq!(location.name, "gb1-a");
        assert_eq!(location.country, "GB");
    }

    #[test]
    fn test_location_missing_handle_is_schema_violation() {
        let error = Location::from_api(&json!({"id": "zon-6mxqw"})).unwrap_err();
        assert!(matches!(
            error,
            Error::SchemaViolation { entity: "zone", .. }
        ));
    }
}
