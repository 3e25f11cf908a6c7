//! Managed resources.

use crate::api::RobotApi;
use crate::diagnostics::Diagnostic;
use crate::schema::Schema;
use crate::state::ResourceData;
use async_trait::async_trait;
use hrobot_core::ids::ServerNumber;

pub mod boot;
pub mod firewall;
pub mod ssh_key;
pub mod vswitch;

pub use boot::BootResource;
pub use firewall::FirewallResource;
pub use ssh_key::SshKeyResource;
pub use vswitch::VSwitchResource;

/// Lifecycle handlers of a managed resource type.
///
/// Handlers mutate `data` in place. After `read`, an instance without an id
/// no longer exists upstream and should be dropped from state.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Registered type name.
    fn type_name(&self) -> &'static str;

    /// Attribute schema.
    fn schema(&self) -> Schema;

    /// Create the upstream object and set the id.
    async fn create(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic>;

    /// Refresh attributes from upstream.
    async fn read(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic>;

    /// Move the upstream object from `prior` to the configuration in `data`.
    async fn update(
        &self,
        api: &dyn RobotApi,
        prior: &ResourceData,
        data: &mut ResourceData,
    ) -> Result<(), Diagnostic>;

    /// Remove the upstream object and clear the id.
    async fn delete(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic>;
}

/// Every resource type, in registration order.
#[must_use]
pub fn all() -> Vec<Box<dyn Resource>> {
    vec![
        Box::new(BootResource),
        Box::new(FirewallResource),
        Box::new(VSwitchResource),
        Box::new(SshKeyResource),
    ]
}

/// Read the `server_number` attribute.
pub(crate) fn server_number(data: &ResourceData) -> Result<ServerNumber, Diagnostic> {
    let raw = data.require_i64("server_number")?;
    ServerNumber::try_from(raw).map_err(|err| {
        Diagnostic::from_error("Invalid server number", &err).with_attribute("server_number")
    })
}
