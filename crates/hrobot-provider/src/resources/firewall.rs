//! `hetzner-robot_firewall`: the stateless packet filter in front of a server.

use super::{server_number, Resource};
use crate::api::RobotApi;
use crate::diagnostics::Diagnostic;
use crate::flatten::firewall_attributes;
use crate::schema::{object, Attribute, Schema};
use crate::state::ResourceData;
use async_trait::async_trait;
use hrobot_api::models::{IpVersion, RuleAction};
use hrobot_api::{Firewall, FirewallRequest, FirewallRule, FirewallRules, FirewallStatus};
use serde_json::Value;
use tracing::{info, warn};

/// Firewall resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirewallResource;

fn rule_schema() -> Attribute {
    Attribute::optional_list(object([
        ("name", Attribute::required_string()),
        ("action", Attribute::required_string().with_description("`accept` or `discard`")),
        ("ip_version", Attribute::optional_string().with_description("`ipv4` or `ipv6`")),
        ("dst_ip", Attribute::optional_string()),
        ("src_ip", Attribute::optional_string()),
        ("dst_port", Attribute::optional_string()),
        ("src_port", Attribute::optional_string()),
        ("protocol", Attribute::optional_string()),
        ("tcp_flags", Attribute::optional_string()),
    ]))
}

#[async_trait]
impl Resource for FirewallResource {
    fn type_name(&self) -> &'static str {
        "hetzner-robot_firewall"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Firewall configuration of a dedicated server")
            .with_attribute("server_number", Attribute::required_int().force_new())
            .with_attribute(
                "status",
                Attribute::optional_string()
                    .with_default("active")
                    .with_description("`active` or `disabled`"),
            )
            .with_attribute("filter_ipv6", Attribute::optional_bool().with_default(false))
            .with_attribute(
                "whitelist_hos",
                Attribute::optional_bool()
                    .with_default(true)
                    .with_description("Allow Hetzner services through the firewall"),
            )
            .with_attribute("input_rules", rule_schema().also_computed())
            .with_attribute("output_rules", rule_schema().also_computed())
            .with_attribute("server_ip", Attribute::computed_string())
            .with_attribute("port", Attribute::computed_string())
    }

    async fn create(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        apply(api, data).await?;
        let number = server_number(data)?;
        data.set_id(number.to_string());
        Ok(())
    }

    async fn read(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let number = server_number(data)?;
        match api.get_firewall(number).await {
            Ok(firewall) => {
                store(data, &firewall);
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                warn!(server_number = %number, "Firewall not found, removing from state");
                data.clear_id();
                Ok(())
            }
            Err(err) => Err(Diagnostic::from_error(
                format!("Unable to read firewall of server {number}"),
                &err,
            )),
        }
    }

    async fn update(
        &self,
        api: &dyn RobotApi,
        _prior: &ResourceData,
        data: &mut ResourceData,
    ) -> Result<(), Diagnostic> {
        apply(api, data).await
    }

    async fn delete(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let number = server_number(data)?;
        match api.delete_firewall(number).await {
            Ok(_) => info!(server_number = %number, "Cleared firewall"),
            Err(err) if err.is_not_found() => {
                warn!(server_number = %number, "Firewall not found while deleting");
            }
            Err(err) => {
                return Err(Diagnostic::from_error(
                    format!("Unable to delete firewall of server {number}"),
                    &err,
                ))
            }
        }
        data.clear_id();
        Ok(())
    }
}

async fn apply(api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
    let number = server_number(data)?;
    let request = request(data)?;
    let firewall = api.set_firewall(number, &request).await.map_err(|err| {
        Diagnostic::from_error(format!("Unable to configure firewall of server {number}"), &err)
    })?;
    info!(
        server_number = %number,
        input = request.rules.input.len(),
        output = request.rules.output.len(),
        "Configured firewall"
    );
    store(data, &firewall);
    Ok(())
}

/// Copy upstream state, keeping the configured status while a change rolls out.
fn store(data: &mut ResourceData, firewall: &Firewall) {
    let mut attributes = firewall_attributes(firewall);
    if firewall.status == FirewallStatus::InProcess {
        attributes.remove("status");
    }
    data.merge(attributes);
}

fn request(data: &ResourceData) -> Result<FirewallRequest, Diagnostic> {
    let status = match data.get_str("status").unwrap_or("active") {
        "active" => FirewallStatus::Active,
        "disabled" => FirewallStatus::Disabled,
        other => {
            return Err(Diagnostic::error("Invalid firewall status")
                .with_attribute("status")
                .with_detail(format!("`{other}` is neither `active` nor `disabled`")))
        }
    };

    Ok(FirewallRequest {
        status,
        filter_ipv6: data.get_bool("filter_ipv6").unwrap_or(false),
        whitelist_hos: data.get_bool("whitelist_hos").unwrap_or(true),
        rules: FirewallRules {
            input: rules(data, "input_rules")?,
            output: rules(data, "output_rules")?,
        },
    })
}

fn rules(data: &ResourceData, key: &str) -> Result<Vec<FirewallRule>, Diagnostic> {
    data.get_list(key)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| rule(item, &format!("{key}[{index}]")))
                .collect()
        })
        .unwrap_or_else(|| Ok(Vec::new()))
}

fn rule(item: &Value, path: &str) -> Result<FirewallRule, Diagnostic> {
    let field = |name: &str| item.get(name).and_then(Value::as_str).map(str::to_string);
    let invalid = |name: &str, detail: String| {
        Diagnostic::error("Invalid firewall rule")
            .with_attribute(format!("{path}.{name}"))
            .with_detail(detail)
    };

    let action = match field("action").as_deref() {
        Some("accept") => RuleAction::Accept,
        Some("discard") => RuleAction::Discard,
        other => {
            return Err(invalid(
                "action",
                format!("expected `accept` or `discard`, got {other:?}"),
            ))
        }
    };
    let ip_version = match field("ip_version").as_deref() {
        None => None,
        Some("ipv4") => Some(IpVersion::Ipv4),
        Some("ipv6") => Some(IpVersion::Ipv6),
        Some(other) => {
            return Err(invalid(
                "ip_version",
                format!("expected `ipv4` or `ipv6`, got `{other}`"),
            ))
        }
    };

    Ok(FirewallRule {
        name: field("name").unwrap_or_default(),
        ip_version,
        dst_ip: field("dst_ip"),
        src_ip: field("src_ip"),
        dst_port: field("dst_port"),
        src_port: field("src_port"),
        protocol: field("protocol"),
        tcp_flags: field("tcp_flags"),
        action,
    })
}
