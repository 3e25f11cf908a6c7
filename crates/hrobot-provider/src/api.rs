//! Client seam used by the resource and data-source handlers.

use async_trait::async_trait;
use hrobot_api::{
    BootConfig, CreateKeyRequest, Firewall, FirewallRequest, LinuxConfig, LinuxRequest,
    RescueConfig, RescueRequest, RobotClient, Server, SshKey, VSwitch, VSwitchRequest,
};
use hrobot_core::ids::{ServerNumber, VSwitchId};
use hrobot_core::Result;

/// Robot operations the handlers depend on.
///
/// Implemented by [`RobotClient`]; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RobotApi: Send + Sync {
    /// Fetch a server.
    async fn get_server(&self, number: ServerNumber) -> Result<Server>;

    /// List every server.
    async fn list_servers(&self) -> Result<Vec<Server>>;

    /// Fetch the boot overview.
    async fn get_boot(&self, number: ServerNumber) -> Result<BootConfig>;

    /// Arm the rescue system.
    async fn enable_rescue(
        &self,
        number: ServerNumber,
        request: &RescueRequest,
    ) -> Result<RescueConfig>;

    /// Disarm the rescue system.
    async fn disable_rescue(&self, number: ServerNumber) -> Result<RescueConfig>;

    /// Arm a Linux installation.
    async fn enable_linux(
        &self,
        number: ServerNumber,
        request: &LinuxRequest,
    ) -> Result<LinuxConfig>;

    /// Disarm a Linux installation.
    async fn disable_linux(&self, number: ServerNumber) -> Result<LinuxConfig>;

    /// Fetch a firewall.
    async fn get_firewall(&self, number: ServerNumber) -> Result<Firewall>;

    /// Replace a firewall configuration.
    async fn set_firewall(
        &self,
        number: ServerNumber,
        request: &FirewallRequest,
    ) -> Result<Firewall>;

    /// Clear a firewall configuration.
    async fn delete_firewall(&self, number: ServerNumber) -> Result<Firewall>;

    /// Fetch a vSwitch.
    async fn get_vswitch(&self, id: VSwitchId) -> Result<VSwitch>;

    /// Create a vSwitch.
    async fn create_vswitch(&self, request: &VSwitchRequest) -> Result<VSwitch>;

    /// Rename a vSwitch or change its VLAN.
    async fn update_vswitch(&self, id: VSwitchId, request: &VSwitchRequest) -> Result<()>;

    /// Cancel a vSwitch.
    async fn cancel_vswitch(&self, id: VSwitchId, cancellation_date: &str) -> Result<()>;

    /// Attach servers to a vSwitch.
    async fn add_vswitch_servers(&self, id: VSwitchId, servers: Vec<ServerNumber>) -> Result<()>;

    /// Detach servers from a vSwitch.
    async fn remove_vswitch_servers(
        &self,
        id: VSwitchId,
        servers: Vec<ServerNumber>,
    ) -> Result<()>;

    /// Fetch a key by fingerprint.
    async fn get_key(&self, fingerprint: &str) -> Result<SshKey>;

    /// Upload a key.
    async fn create_key(&self, request: &CreateKeyRequest) -> Result<SshKey>;

    /// Rename a key.
    async fn rename_key(&self, fingerprint: &str, name: &str) -> Result<SshKey>;

    /// Delete a key.
    async fn delete_key(&self, fingerprint: &str) -> Result<()>;
}

#[async_trait]
impl RobotApi for RobotClient {
    async fn get_server(&self, number: ServerNumber) -> Result<Server> {
        RobotClient::get_server(self, number).await
    }

    async fn list_servers(&self) -> Result<Vec<Server>> {
        RobotClient::list_servers(self).await
    }

    async fn get_boot(&self, number: ServerNumber) -> Result<BootConfig> {
        RobotClient::get_boot(self, number).await
    }

    async fn enable_rescue(
        &self,
        number: ServerNumber,
        request: &RescueRequest,
    ) -> Result<RescueConfig> {
        RobotClient::enable_rescue(self, number, request).await
    }

    async fn disable_rescue(&self, number: ServerNumber) -> Result<RescueConfig> {
        RobotClient::disable_rescue(self, number).await
    }

    async fn enable_linux(
        &self,
        number: ServerNumber,
        request: &LinuxRequest,
    ) -> Result<LinuxConfig> {
        RobotClient::enable_linux(self, number, request).await
    }

    async fn disable_linux(&self, number: ServerNumber) -> Result<LinuxConfig> {
        RobotClient::disable_linux(self, number).await
    }

    async fn get_firewall(&self, number: ServerNumber) -> Result<Firewall> {
        RobotClient::get_firewall(self, number).await
    }

    async fn set_firewall(
        &self,
        number: ServerNumber,
        request: &FirewallRequest,
    ) -> Result<Firewall> {
        RobotClient::set_firewall(self, number, request).await
    }

    async fn delete_firewall(&self, number: ServerNumber) -> Result<Firewall> {
        RobotClient::delete_firewall(self, number).await
    }

    async fn get_vswitch(&self, id: VSwitchId) -> Result<VSwitch> {
        RobotClient::get_vswitch(self, id).await
    }

    async fn create_vswitch(&self, request: &VSwitchRequest) -> Result<VSwitch> {
        RobotClient::create_vswitch(self, request).await
    }

    async fn update_vswitch(&self, id: VSwitchId, request: &VSwitchRequest) -> Result<()> {
        RobotClient::update_vswitch(self, id, request).await
    }

    async fn cancel_vswitch(&self, id: VSwitchId, cancellation_date: &str) -> Result<()> {
        RobotClient::cancel_vswitch(self, id, cancellation_date).await
    }

    async fn add_vswitch_servers(&self, id: VSwitchId, servers: Vec<ServerNumber>) -> Result<()> {
        RobotClient::add_vswitch_servers(self, id, &servers).await
    }

    async fn remove_vswitch_servers(
        &self,
        id: VSwitchId,
        servers: Vec<ServerNumber>,
    ) -> Result<()> {
        RobotClient::remove_vswitch_servers(self, id, &servers).await
    }

    async fn get_key(&self, fingerprint: &str) -> Result<SshKey> {
        RobotClient::get_key(self, fingerprint).await
    }

    async fn create_key(&self, request: &CreateKeyRequest) -> Result<SshKey> {
        RobotClient::create_key(self, request).await
    }

    async fn rename_key(&self, fingerprint: &str, name: &str) -> Result<SshKey> {
        RobotClient::rename_key(self, fingerprint, name).await
    }

    async fn delete_key(&self, fingerprint: &str) -> Result<()> {
        RobotClient::delete_key(self, fingerprint).await
    }
}
