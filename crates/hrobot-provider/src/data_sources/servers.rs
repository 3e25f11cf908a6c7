//! `hetzner-robot_servers`: every server of the account.

use super::server::server_fields;
use super::DataSource;
use crate::api::RobotApi;
use crate::diagnostics::Diagnostic;
use crate::flatten::server_attributes;
use crate::schema::{object, Attribute, Schema};
use crate::state::ResourceData;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Fixed id of the server list.
pub const SERVERS_ID: &str = "servers";

/// Server list data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServersDataSource;

#[async_trait]
impl DataSource for ServersDataSource {
    fn type_name(&self) -> &'static str {
        "hetzner-robot_servers"
    }

    fn schema(&self) -> Schema {
        let element = object(
            std::iter::once(("server_number", Attribute::computed_int())).chain(server_fields()),
        );
        Schema::v0().with_attribute("servers", Attribute::computed_list(element))
    }

    async fn read(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let servers = api
            .list_servers()
            .await
            .map_err(|err| Diagnostic::from_error("Unable to fetch servers", &err))?;

        debug!(count = servers.len(), "Read server list");
        let items: Vec<Value> = servers
            .iter()
            .map(|server| Value::Object(server_attributes(server)))
            .collect();
        data.set("servers", Value::Array(items));
        data.set_id(SERVERS_ID);
        Ok(())
    }
}
