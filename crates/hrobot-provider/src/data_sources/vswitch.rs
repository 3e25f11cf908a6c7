//! `hetzner-robot_vswitch`: look up a vSwitch by id.

use super::DataSource;
use crate::api::RobotApi;
use crate::diagnostics::Diagnostic;
use crate::flatten::vswitch_attributes;
use crate::resources::vswitch::computed_attributes;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::state::ResourceData;
use async_trait::async_trait;
use hrobot_core::ids::VSwitchId;

/// vSwitch data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct VSwitchDataSource;

#[async_trait]
impl DataSource for VSwitchDataSource {
    fn type_name(&self) -> &'static str {
        "hetzner-robot_vswitch"
    }

    fn schema(&self) -> Schema {
        computed_attributes(
            Schema::v0()
                .with_attribute("vswitch_id", Attribute::required_int())
                .with_attribute("name", Attribute::computed_string())
                .with_attribute("vlan", Attribute::computed_int())
                .with_attribute("servers", Attribute::computed_list(AttributeType::Int)),
        )
    }

    async fn read(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let raw = data.require_i64("vswitch_id")?;
        let id = VSwitchId::try_from(raw).map_err(|err| {
            Diagnostic::from_error("Invalid vSwitch id", &err).with_attribute("vswitch_id")
        })?;

        let vswitch = api
            .get_vswitch(id)
            .await
            .map_err(|err| Diagnostic::from_error(format!("Unable to find vSwitch {id}"), &err))?;

        data.merge(vswitch_attributes(&vswitch));
        data.set_id(id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockRobotApi;
    use hrobot_api::models::CloudNetwork;
    use hrobot_api::VSwitch;
    use hrobot_core::{ApiError, Error};
    use serde_json::json;

    #[tokio::test]
    async fn read_includes_cloud_networks() {
        let mut api = MockRobotApi::new();
        api.expect_get_vswitch().returning(|id| {
            Ok(VSwitch {
                id,
                name: "backend".into(),
                vlan: 4000,
                cancelled: false,
                servers: vec![],
                subnets: vec![],
                cloud_networks: vec![CloudNetwork {
                    id: 123,
                    ip: "10.0.2.0".into(),
                    mask: 24,
                    gateway: Some("10.0.2.1".into()),
                }],
            })
        });

        let mut data = ResourceData::from_value(json!({"vswitch_id": 4321})).unwrap();
        VSwitchDataSource.read(&api, &mut data).await.unwrap();

        assert_eq!(data.id(), Some("4321"));
        assert_eq!(data.get_str("name"), Some("backend"));
        assert_eq!(
            data.get("cloud_networks"),
            Some(&json!([{"id": 123, "ip": "10.0.2.0", "mask": 24, "gateway": "10.0.2.1"}]))
        );
        assert!(VSwitchDataSource.schema().validate(data.attributes()).is_empty());
    }

    #[tokio::test]
    async fn read_not_found_is_an_error() {
        let mut api = MockRobotApi::new();
        api.expect_get_vswitch()
            .returning(|_| Err(Error::Api(ApiError::from_response(404, "not found"))));

        let mut data = ResourceData::from_value(json!({"vswitch_id": 1})).unwrap();
        let err = VSwitchDataSource.read(&api, &mut data).await.unwrap_err();
        assert_eq!(err.summary, "Unable to find vSwitch 1");
    }
}
