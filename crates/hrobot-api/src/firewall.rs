//! Firewall endpoints (`/firewall/{number}`).

use crate::client::{RobotClient, OK, OK_OR_ACCEPTED};
use crate::models::{Firewall, FirewallEnvelope, FirewallRequest};
use crate::Result;
use hrobot_core::ids::ServerNumber;
use reqwest::Method;

impl RobotClient {
    /// Fetch the firewall configuration of a server.
    pub async fn get_firewall(&self, number: ServerNumber) -> Result<Firewall> {
        let path = format!("firewall/{number}");
        let envelope: FirewallEnvelope = self.get_json(&path, OK).await?;
        Ok(envelope.firewall)
    }

    /// Replace the firewall configuration of a server.
    ///
    /// Robot applies the change asynchronously; the returned record usually
    /// reports status `in process`.
    pub async fn set_firewall(
        &self,
        number: ServerNumber,
        request: &FirewallRequest,
    ) -> Result<Firewall> {
        let path = format!("firewall/{number}");
        let envelope: FirewallEnvelope = self
            .send_form(Method::POST, &path, &request.to_form(), OK_OR_ACCEPTED)
            .await?;
        Ok(envelope.firewall)
    }

    /// Remove every rule and disable the firewall.
    pub async fn delete_firewall(&self, number: ServerNumber) -> Result<Firewall> {
        let path = format!("firewall/{number}");
        let envelope: FirewallEnvelope = self
            .send_form(Method::DELETE, &path, &[], OK_OR_ACCEPTED)
            .await?;
        Ok(envelope.firewall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FirewallRule, FirewallRules, FirewallStatus, RuleAction};
    use hrobot_core::Error;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> RobotClient {
        RobotClient::new(server.uri()).unwrap()
    }

    fn firewall_body(status: &str, input: serde_json::Value) -> serde_json::Value {
        json!({"firewall": {
            "server_ip": "123.123.123.123",
            "server_number": 321,
            "status": status,
            "filter_ipv6": false,
            "whitelist_hos": true,
            "port": "main",
            "rules": {"input": input, "output": []}
        }})
    }

    #[tokio::test]
    async fn get_firewall_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/firewall/321"))
            .respond_with(ResponseTemplate::new(200).set_body_json(firewall_body(
                "active",
                json!([{"ip_version": "ipv4", "name": "web", "dst_port": "443", "action": "accept"}]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let firewall = client.get_firewall(ServerNumber::new(321)).await.unwrap();
        assert_eq!(firewall.status, FirewallStatus::Active);
        assert!(firewall.whitelist_hos);
        assert_eq!(firewall.rules.input[0].name, "web");
    }

    #[tokio::test]
    async fn set_firewall_accepts_202() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/firewall/321"))
            .and(body_string_contains("status=active"))
            .and(body_string_contains("rules%5Binput%5D%5B0%5D%5Bname%5D=web"))
            .respond_with(ResponseTemplate::new(202).set_body_json(firewall_body(
                "in process",
                json!([{"name": "web", "dst_port": "443", "action": "accept"}]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = FirewallRequest {
            status: FirewallStatus::Active,
            filter_ipv6: false,
            whitelist_hos: true,
            rules: FirewallRules {
                input: vec![FirewallRule {
                    name: "web".into(),
                    ip_version: None,
                    dst_ip: None,
                    src_ip: None,
                    dst_port: Some("443".into()),
                    src_port: None,
                    protocol: None,
                    tcp_flags: None,
                    action: RuleAction::Accept,
                }],
                output: vec![],
            },
        };

        let firewall = client
            .set_firewall(ServerNumber::new(321), &request)
            .await
            .unwrap();
        assert_eq!(firewall.status, FirewallStatus::InProcess);
    }

    #[tokio::test]
    async fn delete_firewall_success() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/firewall/321"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(firewall_body("in process", json!([]))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let firewall = client.delete_firewall(ServerNumber::new(321)).await.unwrap();
        assert!(firewall.rules.input.is_empty());
    }

    #[tokio::test]
    async fn get_firewall_rejects_unknown_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/firewall/321"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(firewall_body("exploded", json!([]))),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.get_firewall(ServerNumber::new(321)).await.unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));
    }
}
