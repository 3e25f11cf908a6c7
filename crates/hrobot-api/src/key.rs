//! SSH key endpoints (`/key`).

use crate::client::{RobotClient, CREATED, OK};
use crate::models::{CreateKeyRequest, KeyEnvelope, SshKey};
use crate::Result;
use hrobot_core::form::FormParams;
use reqwest::Method;

impl RobotClient {
    /// List every stored key.
    pub async fn list_keys(&self) -> Result<Vec<SshKey>> {
        let envelopes: Vec<KeyEnvelope> = self.get_json("key", OK).await?;
        Ok(envelopes.into_iter().map(|envelope| envelope.key).collect())
    }

    /// Fetch a key by fingerprint.
    pub async fn get_key(&self, fingerprint: &str) -> Result<SshKey> {
        let path = format!("key/{fingerprint}");
        let envelope: KeyEnvelope = self.get_json(&path, OK).await?;
        Ok(envelope.key)
    }

    /// Upload a key.
    pub async fn create_key(&self, request: &CreateKeyRequest) -> Result<SshKey> {
        let envelope: KeyEnvelope = self
            .send_form(Method::POST, "key", &request.to_form(), CREATED)
            .await?;
        Ok(envelope.key)
    }

    /// Rename a key.
    pub async fn rename_key(&self, fingerprint: &str, name: &str) -> Result<SshKey> {
        let path = format!("key/{fingerprint}");
        let mut form = FormParams::new();
        form.push("name", name);
        let envelope: KeyEnvelope = self
            .send_form(Method::POST, &path, &form.into_pairs(), OK)
            .await?;
        Ok(envelope.key)
    }

    /// Delete a key.
    pub async fn delete_key(&self, fingerprint: &str) -> Result<()> {
        let path = format!("key/{fingerprint}");
        self.send_form_discarding(Method::DELETE, &path, &[], OK)
            .await
    }
}
