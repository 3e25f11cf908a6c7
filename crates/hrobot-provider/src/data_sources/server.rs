//! `hetzner-robot_server`: a single dedicated server.

use super::DataSource;
use crate::api::RobotApi;
use crate::diagnostics::Diagnostic;
use crate::flatten::server_attributes;
use crate::resources::server_number;
use crate::schema::{object, Attribute, AttributeType, Schema};
use crate::state::ResourceData;
use async_trait::async_trait;
use tracing::debug;

/// Single server data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerDataSource;

/// Computed server attributes, keyed as in [`server_attributes`].
pub(crate) fn server_fields() -> Vec<(&'static str, Attribute)> {
    let mut fields = vec![
        ("server_name", Attribute::computed_string().with_description("Server name")),
        ("server_ip", Attribute::computed_string().with_description("Server IP")),
        ("server_ipv6", Attribute::computed_string().with_description("Server IPv6 Net")),
        ("datacenter", Attribute::computed_string().with_description("Data center")),
        (
            "is_cancelled",
            Attribute::computed_bool().with_description("Status of server cancellation"),
        ),
        ("paid_until", Attribute::computed_string().with_description("Paid until date")),
        ("product", Attribute::computed_string().with_description("Server product name")),
        (
            "ip_addresses",
            Attribute::computed_list(AttributeType::String)
                .with_description("Array of assigned single IP addresses"),
        ),
        (
            "server_subnets",
            Attribute::computed_list(object([
                ("ip", Attribute::computed_string()),
                ("mask", Attribute::computed_string()),
            ]))
            .with_description("Array of assigned subnets"),
        ),
        ("status", Attribute::computed_string().with_description("Server status")),
        ("traffic", Attribute::computed_string().with_description("Free traffic quota")),
        (
            "linked_storagebox",
            Attribute::computed_int().with_description("Linked Storage Box ID"),
        ),
    ];
    let flags = [
        ("reset", "reset system"),
        ("rescue", "rescue system"),
        ("vnc", "VNC installation"),
        ("windows", "Windows installation"),
        ("plesk", "Plesk installation"),
        ("cpanel", "cPanel installation"),
        ("wol", "Wake on LAN"),
        ("hot_swap", "hot swap"),
    ];
    for (flag, feature) in flags {
        fields.push((
            flag,
            Attribute::computed_bool().with_description(format!("Whether {feature} is available")),
        ));
    }
    fields
}

#[async_trait]
impl DataSource for ServerDataSource {
    fn type_name(&self) -> &'static str {
        "hetzner-robot_server"
    }

    fn schema(&self) -> Schema {
        server_fields().into_iter().fold(
            Schema::v0().with_attribute(
                "server_number",
                Attribute::required_int().with_description("Server number"),
            ),
            |schema, (name, attribute)| schema.with_attribute(name, attribute),
        )
    }

    async fn read(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let number = server_number(data)?;
        let server = api.get_server(number).await.map_err(|err| {
            Diagnostic::from_error(format!("Unable to find server {number}"), &err)
        })?;

        debug!(server_number = %number, "Read server");
        data.merge(server_attributes(&server));
        data.set_id(number.to_string());
        Ok(())
    }
}
