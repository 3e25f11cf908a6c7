//! `hetzner-robot_ssh_key`: look up a stored key by fingerprint.

use super::DataSource;
use crate::api::RobotApi;
use crate::diagnostics::Diagnostic;
use crate::flatten::key_attributes;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;
use async_trait::async_trait;

/// SSH key data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshKeyDataSource;

#[async_trait]
impl DataSource for SshKeyDataSource {
    fn type_name(&self) -> &'static str {
        "hetzner-robot_ssh_key"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_attribute("fingerprint", Attribute::required_string())
            .with_attribute("name", Attribute::computed_string())
            .with_attribute("type", Attribute::computed_string())
            .with_attribute("size", Attribute::computed_int())
            .with_attribute("data", Attribute::computed_string())
            .with_attribute("created_at", Attribute::computed_string())
    }

    async fn read(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let fingerprint = data.require_str("fingerprint")?.to_string();
        let key = api.get_key(&fingerprint).await.map_err(|err| {
            Diagnostic::from_error(format!("Unable to find SSH key {fingerprint}"), &err)
        })?;

        data.merge(key_attributes(&key));
        data.set_id(fingerprint);
        Ok(())
    }
}
