//! `hetzner-robot_ssh_key`: a public key stored in Robot for rescue and installs.

use super::Resource;
use crate::api::RobotApi;
use crate::diagnostics::Diagnostic;
use crate::flatten::key_attributes;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceData;
use async_trait::async_trait;
use hrobot_api::{CreateKeyRequest, SshKey};
use tracing::{info, warn};

/// SSH key resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshKeyResource;

#[async_trait]
impl Resource for SshKeyResource {
    fn type_name(&self) -> &'static str {
        "hetzner-robot_ssh_key"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("SSH public key stored in Robot")
            .with_attribute("name", Attribute::required_string())
            .with_attribute(
                "data",
                Attribute::required_string()
                    .force_new()
                    .with_description("Public key in OpenSSH format"),
            )
            .with_attribute("fingerprint", Attribute::computed_string())
            .with_attribute("type", Attribute::computed_string())
            .with_attribute("size", Attribute::computed_int())
            .with_attribute("created_at", Attribute::computed_string())
    }

    async fn create(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let request = CreateKeyRequest {
            name: data.require_str("name")?.to_string(),
            data: data.require_str("data")?.to_string(),
        };
        let key = api.create_key(&request).await.map_err(|err| {
            Diagnostic::from_error(format!("Unable to create SSH key `{}`", request.name), &err)
        })?;

        info!(fingerprint = %key.fingerprint, "Created SSH key");
        data.set_id(key.fingerprint.clone());
        store(data, &key);
        Ok(())
    }

    async fn read(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let fingerprint = data.require_id("SSH key")?.to_string();
        match api.get_key(&fingerprint).await {
            Ok(key) => {
                store(data, &key);
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                warn!(%fingerprint, "SSH key not found, removing from state");
                data.clear_id();
                Ok(())
            }
            Err(err) => Err(Diagnostic::from_error(
                format!("Unable to read SSH key {fingerprint}"),
                &err,
            )),
        }
    }

    async fn update(
        &self,
        api: &dyn RobotApi,
        prior: &ResourceData,
        data: &mut ResourceData,
    ) -> Result<(), Diagnostic> {
        let fingerprint = data.require_id("SSH key")?.to_string();
        let name = data.require_str("name")?.to_string();
        if prior.get_str("name") == Some(name.as_str()) {
            return Ok(());
        }

        let key = api.rename_key(&fingerprint, &name).await.map_err(|err| {
            Diagnostic::from_error(format!("Unable to rename SSH key {fingerprint}"), &err)
        })?;
        info!(%fingerprint, %name, "Renamed SSH key");
        store(data, &key);
        Ok(())
    }

    async fn delete(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let fingerprint = data.require_id("SSH key")?.to_string();
        match api.delete_key(&fingerprint).await {
            Ok(()) => info!(%fingerprint, "Deleted SSH key"),
            Err(err) if err.is_not_found() => {
                warn!(%fingerprint, "SSH key not found while deleting");
            }
            Err(err) => {
                return Err(Diagnostic::from_error(
                    format!("Unable to delete SSH key {fingerprint}"),
                    &err,
                ))
            }
        }
        data.clear_id();
        Ok(())
    }
}

/// Copy upstream attributes, keeping configured key material as written.
fn store(data: &mut ResourceData, key: &SshKey) {
    let mut attributes = key_attributes(key);
    if data.get_str("data").is_some() {
        attributes.remove("data");
    }
    data.merge(attributes);
}
