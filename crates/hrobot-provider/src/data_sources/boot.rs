//! `hetzner-robot_boot`: boot profiles of a server and the options they offer.

use super::DataSource;
use crate::api::RobotApi;
use crate::diagnostics::Diagnostic;
use crate::flatten::boot_overview_attributes;
use crate::resources::server_number;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::state::ResourceData;
use async_trait::async_trait;

/// Boot overview data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootDataSource;

#[async_trait]
impl DataSource for BootDataSource {
    fn type_name(&self) -> &'static str {
        "hetzner-robot_boot"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("server_number", Attribute::required_int())
            .with_attribute(
                "active_profile",
                Attribute::computed_string()
                    .with_description("Armed profile, empty when none is active"),
            )
            .with_attribute("server_ip", Attribute::computed_string())
            .with_attribute("server_ipv6", Attribute::computed_string())
            .with_attribute("rescue_active", Attribute::computed_bool())
            .with_attribute(
                "rescue_os",
                Attribute::computed_list(AttributeType::String)
                    .with_description("Selected or available rescue systems"),
            )
            .with_attribute("linux_active", Attribute::computed_bool())
            .with_attribute("linux_dist", Attribute::computed_list(AttributeType::String))
            .with_attribute("linux_lang", Attribute::computed_list(AttributeType::String))
    }

    async fn read(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let number = server_number(data)?;
        let boot = api.get_boot(number).await.map_err(|err| {
            Diagnostic::from_error(
                format!("Unable to read boot configuration of server {number}"),
                &err,
            )
        })?;

        data.merge(boot_overview_attributes(&boot));
        data.set_id(number.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockRobotApi;
    use hrobot_api::{BootConfig, Choice, RescueConfig};
    use serde_json::json;

    #[tokio::test]
    async fn read_reports_available_options() {
        let mut api = MockRobotApi::new();
        api.expect_get_boot().returning(|number| {
            Ok(BootConfig {
                rescue: Some(RescueConfig {
                    server_number: number,
                    server_ip: Some("123.123.123.123".into()),
                    server_ipv6_net: None,
                    os: Choice::Available(vec!["linux".into(), "vkvm".into()]),
                    arch: None,
                    active: false,
                    password: None,
                    authorized_key: vec![],
                    host_key: vec![],
                }),
                linux: None,
            })
        });

        let mut data = ResourceData::from_value(json!({"server_number": 321})).unwrap();
        BootDataSource.read(&api, &mut data).await.unwrap();

        assert_eq!(data.id(), Some("321"));
        assert_eq!(data.get_str("active_profile"), Some(""));
        assert_eq!(data.get_string_list("rescue_os"), vec!["linux", "vkvm"]);
        assert_eq!(data.get_bool("linux_active"), Some(false));
        assert!(BootDataSource.schema().validate(data.attributes()).is_empty());
    }
}
