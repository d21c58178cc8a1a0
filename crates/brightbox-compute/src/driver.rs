//! Compute driver facade.
//!
//! [`ComputeDriver`] is the provider-neutral seam callers program
//! against; [`BrightboxDriver`] implements it over an authenticated
//! [`BrightboxConnection`], plus the cloud IP operations that have no
//! provider-neutral equivalent.

use crate::models::{CloudIp, CreateServerRequest, Image, Location, MapCloudIpRequest, Node, Size};
use async_trait::async_trait;
use brightbox_core::auth::ClientCredentials;
use brightbox_core::config::BrightboxConfig;
use brightbox_core::connection::BrightboxConnection;
use brightbox_core::id::{CloudIpId, InterfaceId};
use brightbox_core::{Error, Result};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

/// Provider-neutral compute operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComputeDriver: Send + Sync {
    /// List the account's servers.
    async fn list_nodes(&self) -> Result<Vec<Node>>;

    /// List the images visible to the account.
    async fn list_images(&self) -> Result<Vec<Image>>;

    /// List the available server types.
    async fn list_sizes(&self) -> Result<Vec<Size>>;

    /// List the provider's zones.
    async fn list_locations(&self) -> Result<Vec<Location>>;

    /// Provision a new server and return its first observed state.
    async fn create_node<'a>(
        &self,
        name: &str,
        size: &Size,
        image: &Image,
        location: Option<&'a Location>,
    ) -> Result<Node>;

    /// Request deletion of a server.
    ///
    /// Deletion is asynchronous; `true` means the provider accepted the
    /// request, not that the server is gone.
    async fn destroy_node(&self, node: &Node) -> Result<bool>;

    /// Reboot a server. The provider has no reboot endpoint, so this
    /// always fails with [`Error::Unsupported`].
    async fn reboot_node(&self, node: &Node) -> Result<bool>;
}

// Mutation endpoints expect a JSON object body even when there is
// nothing to send.
fn empty_body() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Brightbox implementation of [`ComputeDriver`].
#[derive(Debug, Clone)]
pub struct BrightboxDriver {
    connection: BrightboxConnection,
}

impl BrightboxDriver {
    /// Create a driver against the default API endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(credentials: ClientCredentials) -> Result<Self> {
        Self::with_config(credentials, &BrightboxConfig::new())
    }

    /// Create a driver with explicit endpoint configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation or the
    /// HTTP client cannot be constructed.
    pub fn with_config(credentials: ClientCredentials, config: &BrightboxConfig) -> Result<Self> {
        Ok(Self {
            connection: BrightboxConnection::new(credentials, config)?,
        })
    }

    async fn list_collection<T>(
        &self,
        path: &str,
        normalize: fn(&Value) -> Result<T>,
    ) -> Result<Vec<T>> {
        let response = self.connection.get(path).await?;
        let items: Vec<Value> = response.json()?;
        items.iter().map(normalize).collect()
    }

    /// List the account's cloud IPs.
    ///
    /// # Errors
    ///
    /// Returns an error for transport or API failures.
    pub async fn list_cloud_ips(&self) -> Result<Vec<CloudIp>> {
        let response = self.connection.get("cloud_ips").await?;
        response.json()
    }

    /// Allocate a new cloud IP and return it.
    ///
    /// # Errors
    ///
    /// Returns an error for transport or API failures.
    pub async fn create_cloud_ip(&self) -> Result<CloudIp> {
        let response = self.connection.post("cloud_ips", &empty_body()).await?;
        response.json()
    }

    /// Map a cloud IP onto a server interface.
    ///
    /// Mapping is asynchronous; `true` means the provider accepted the
    /// request with 202.
    ///
    /// # Errors
    ///
    /// Returns an error for transport or API failures.
    pub async fn map_cloud_ip(
        &self,
        cloud_ip: &CloudIpId,
        interface: &InterfaceId,
    ) -> Result<bool> {
        let request = MapCloudIpRequest {
            interface: interface.clone(),
        };
        debug!(cloud_ip = %cloud_ip, interface = %interface, "Mapping cloud IP");
        let response = self
            .connection
            .post(&format!("cloud_ips/{cloud_ip}/map"), &request)
            .await?;
        Ok(response.status() == StatusCode::ACCEPTED)
    }

    /// Detach a cloud IP from whatever it is mapped to.
    ///
    /// Unmapping is asynchronous; `true` means the provider accepted the
    /// request with 202.
    ///
    /// # Errors
    ///
    /// Returns an error for transport or API failures.
    pub async fn unmap_cloud_ip(&self, cloud_ip: &CloudIpId) -> Result<bool> {
        let response = self
            .connection
            .post(&format!("cloud_ips/{cloud_ip}/unmap"), &empty_body())
            .await?;
        Ok(response.status() == StatusCode::ACCEPTED)
    }

    /// Release a cloud IP back to the provider.
    ///
    /// Unlike mapping and unmapping, release completes synchronously and
    /// acknowledges with 200.
    ///
    /// # Errors
    ///
    /// Returns an error for transport or API failures.
    pub async fn destroy_cloud_ip(&self, cloud_ip: &CloudIpId) -> Result<bool> {
        let response = self
            .connection
            .delete(&format!("cloud_ips/{cloud_ip}"))
            .await?;
        Ok(response.status() == StatusCode::OK)
    }
}

#[async_trait]
impl ComputeDriver for BrightboxDriver {
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        self.list_collection("servers", Node::from_api).await
    }

    async fn list_images(&self) -> Result<Vec<Image>> {
        self.list_collection("images", Image::from_api).await
    }

    async fn list_sizes(&self) -> Result<Vec<Size>> {
        self.list_collection("server_types", Size::from_api).await
    }

    async fn list_locations(&self) -> Result<Vec<Location>> {
        self.list_collection("zones", Location::from_api).await
    }

    async fn create_node<'a>(
        &self,
        name: &str,
        size: &Size,
        image: &Image,
        location: Option<&'a Location>,
    ) -> Result<Node> {
        let request = CreateServerRequest {
            name: name.to_string(),
            server_type: size.id.clone(),
            image: image.id.clone(),
            user_data: String::new(),
            zone: location
                .map(|location| location.id.clone())
                .unwrap_or_default(),
        };

        debug!(name, server_type = %request.server_type, image = %request.image, "Creating server");

        let response = self.connection.post("servers", &request).await?;
        let body: Value = response.json()?;
        Node::from_api(&body)
    }

    async fn destroy_node(&self, node: &Node) -> Result<bool> {
        debug!(server = %node.id, "Destroying server");
        let response = self
            .connection
            .delete(&format!("servers/{}", node.id))
            .await?;
        Ok(response.status() == StatusCode::ACCEPTED)
    }

    async fn reboot_node(&self, _node: &Node) -> Result<bool> {
        Err(Error::Unsupported("reboot_node"))
    }
}
