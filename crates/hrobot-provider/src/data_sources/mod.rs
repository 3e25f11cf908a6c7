//! Read-only data sources.

use crate::api::RobotApi;
use crate::diagnostics::Diagnostic;
use crate::schema::Schema;
use crate::state::ResourceData;
use async_trait::async_trait;

pub mod boot;
pub mod server;
pub mod servers;
pub mod ssh_key;
pub mod vswitch;

pub use boot::BootDataSource;
pub use server::ServerDataSource;
pub use servers::ServersDataSource;
pub use ssh_key::SshKeyDataSource;
pub use vswitch::VSwitchDataSource;

/// Read handler of a data source type.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Registered type name.
    fn type_name(&self) -> &'static str;

    /// Attribute schema.
    fn schema(&self) -> Schema;

    /// Populate computed attributes and set the id.
    async fn read(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic>;
}

/// Every data source type, in registration order.
#[must_use]
pub fn all() -> Vec<Box<dyn DataSource>> {
    vec![
        Box::new(BootDataSource),
        Box::new(ServerDataSource),
        Box::new(ServersDataSource),
        Box::new(VSwitchDataSource),
        Box::new(SshKeyDataSource),
    ]
}
