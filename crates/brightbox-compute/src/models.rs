//! Canonical compute entities and request payloads.

use crate::state::NodeState;
use brightbox_core::id::{CloudIpId, InterfaceId};
use serde::{Deserialize, Serialize};

/// Provider-specific fields preserved alongside the canonical attributes.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Canonical compute node (a Brightbox server).
///
/// Size and image are held by value: they are a snapshot taken when the
/// node was normalized, not a live link. Nodes are never mutated after
/// construction; a fresher view comes from re-normalizing a later
/// response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Provider identifier (`srv-xxxxx`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Canonical lifecycle state
    pub state: NodeState,
    /// Public addresses: cloud IPs first, then interface IPv6 addresses
    pub public_ips: Vec<String>,
    /// Private interface IPv4 addresses
    pub private_ips: Vec<String>,
    /// Server type the node was provisioned with
    pub size: Size,
    /// Image the node was provisioned from
    pub image: Image,
    /// Allow-listed provider fields
    #[serde(default)]
    pub extra: Extra,
}

/// Canonical machine image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Provider identifier (`img-xxxxx`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Allow-listed provider fields; `ancestor` holds the normalized
    /// parent image when the provider reports one
    #[serde(default)]
    pub extra: Extra,
}

/// Canonical compute flavor (a Brightbox server type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Provider identifier (`typ-xxxxx`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Memory in MB
    pub ram: u64,
    /// Disk in MB
    pub disk: u64,
    /// Bandwidth allowance; the provider does not report one
    pub bandwidth: u64,
    /// Price; the provider does not report one
    pub price: f64,
}

/// Canonical location (a Brightbox zone).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Provider identifier (`zon-xxxxx`)
    pub id: String,
    /// Zone handle (`gb1-a`)
    pub name: String,
    /// ISO country code
    pub country: String,
}

/// A provider-managed public address, attachable to server interfaces
/// independently of server lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudIp {
    /// Cloud IP identifier
    pub id: CloudIpId,
    /// Public address
    pub public_ip: String,
    /// Provider status (`mapped`, `unmapped`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Reverse DNS entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_dns: Option<String>,
    /// Remaining provider fields
    #[serde(flatten)]
    pub extra: Extra,
}

/// Payload for the create-server operation.
///
/// All five keys are always sent. `user_data` and `zone` fall back to the
/// empty string; omitting the `zone` key is not the same as sending it
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateServerRequest {
    /// Server display name
    pub name: String,
    /// Server type identifier
    pub server_type: String,
    /// Image identifier
    pub image: String,
    /// User data script passed to the instance
    pub user_data: String,
    /// Zone identifier, empty to let the provider place the server
    pub zone: String,
}

/// Payload for mapping a cloud IP onto a server interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapCloudIpRequest {
    /// Destination interface identifier
    pub interface: InterfaceId,
}
