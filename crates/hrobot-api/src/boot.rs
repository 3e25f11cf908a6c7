//! Boot configuration endpoints (`/boot/{number}`).

use crate::client::{RobotClient, OK};
use crate::models::{
    BootConfig, BootEnvelope, LinuxConfig, LinuxEnvelope, LinuxRequest, RescueConfig,
    RescueEnvelope, RescueRequest,
};
use crate::Result;
use hrobot_core::ids::ServerNumber;
use reqwest::Method;

impl RobotClient {
    /// Fetch the overview of every boot profile of a server.
    pub async fn get_boot(&self, number: ServerNumber) -> Result<BootConfig> {
        let path = format!("boot/{number}");
        let envelope: BootEnvelope = self.get_json(&path, OK).await?;
        Ok(envelope.boot)
    }

    /// Fetch the rescue system profile.
    pub async fn get_rescue(&self, number: ServerNumber) -> Result<RescueConfig> {
        let path = format!("boot/{number}/rescue");
        let envelope: RescueEnvelope = self.get_json(&path, OK).await?;
        Ok(envelope.rescue)
    }

    /// Arm the rescue system for the next boot.
    ///
    /// The returned record carries the generated root password.
    pub async fn enable_rescue(
        &self,
        number: ServerNumber,
        request: &RescueRequest,
    ) -> Result<RescueConfig> {
        let path = format!("boot/{number}/rescue");
        let envelope: RescueEnvelope = self
            .send_form(Method::POST, &path, &request.to_form(), OK)
            .await?;
        Ok(envelope.rescue)
    }

    /// Disarm the rescue system.
    pub async fn disable_rescue(&self, number: ServerNumber) -> Result<RescueConfig> {
        let path = format!("boot/{number}/rescue");
        let envelope: RescueEnvelope = self.send_form(Method::DELETE, &path, &[], OK).await?;
        Ok(envelope.rescue)
    }

    /// Fetch the Linux installation profile.
    pub async fn get_linux(&self, number: ServerNumber) -> Result<LinuxConfig> {
        let path = format!("boot/{number}/linux");
        let envelope: LinuxEnvelope = self.get_json(&path, OK).await?;
        Ok(envelope.linux)
    }

    /// Arm an automatic Linux installation for the next boot.
    pub async fn enable_linux(
        &self,
        number: ServerNumber,
        request: &LinuxRequest,
    ) -> Result<LinuxConfig> {
        let path = format!("boot/{number}/linux");
        let envelope: LinuxEnvelope = self
            .send_form(Method::POST, &path, &request.to_form(), OK)
            .await?;
        Ok(envelope.linux)
    }

    /// Disarm the Linux installation.
    pub async fn disable_linux(&self, number: ServerNumber) -> Result<LinuxConfig> {
        let path = format!("boot/{number}/linux");
        let envelope: LinuxEnvelope = self.send_form(Method::DELETE, &path, &[], OK).await?;
        Ok(envelope.linux)
    }
}
