//! Dedicated server endpoints (`/server`).

use crate::client::{decode, RobotClient, OK, OK_OR_ACCEPTED};
use crate::models::{RenameServerRequest, Server, ServerEnvelope};
use crate::Result;
use hrobot_core::ids::ServerNumber;
use reqwest::Method;
use tracing::debug;

/// Decode a `{"server": {...}}` body.
///
/// # Errors
///
/// Returns a decode error if the body is not a single wrapped server record.
pub fn parse_server(body: &str) -> Result<Server> {
    decode::<ServerEnvelope>("server/{number}", body).map(|envelope| envelope.server)
}

/// Decode a `[{"server": {...}}, ...]` body, preserving order.
///
/// Arrays of bare server objects and objects holding a `server` array are
/// rejected; the first undecodable element fails the whole list.
///
/// # Errors
///
/// Returns a decode error if the body does not match the documented envelope.
pub fn parse_server_list(body: &str) -> Result<Vec<Server>> {
    let envelopes = decode::<Vec<ServerEnvelope>>("server", body)?;
    Ok(envelopes
        .into_iter()
        .map(|envelope| envelope.server)
        .collect())
}

impl RobotClient {
    /// Fetch a single server by number.
    pub async fn get_server(&self, number: ServerNumber) -> Result<Server> {
        let path = format!("server/{number}");
        let envelope: ServerEnvelope = self.get_json(&path, OK_OR_ACCEPTED).await?;
        Ok(envelope.server)
    }

    /// List every server of the account.
    pub async fn list_servers(&self) -> Result<Vec<Server>> {
        let body = self
            .execute(Method::GET, "server", None, OK_OR_ACCEPTED)
            .await?;
        let servers = parse_server_list(&body)?;
        debug!(count = servers.len(), "Decoded server list");
        Ok(servers)
    }

    /// Change the name of a server.
    pub async fn rename_server(
        &self,
        number: ServerNumber,
        request: &RenameServerRequest,
    ) -> Result<Server> {
        let path = format!("server/{number}");
        let envelope: ServerEnvelope = self
            .send_form(Method::POST, &path, &request.to_form(), OK)
            .await?;
        Ok(envelope.server)
    }
}
