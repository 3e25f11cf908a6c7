//! Mapping from typed Robot records to host attribute maps.
//!
//! Optional record fields become zero values (`""`, `0`) so every declared
//! attribute is always present after a read.

use crate::state::AttributeMap;
use hrobot_api::models::{
    CloudNetwork, FirewallRule, ServerSubnet, VSwitchServer, VSwitchSubnet,
};
use hrobot_api::{BootConfig, Choice, Firewall, Server, SshKey, VSwitch};
use serde_json::{json, Value};

/// Attributes of a server record.
#[must_use]
pub fn server_attributes(server: &Server) -> AttributeMap {
    let mut map = AttributeMap::new();
    map.insert("server_number".into(), json!(server.server_number.get()));
    map.insert("server_name".into(), json!(server.server_name));
    map.insert("server_ip".into(), json!(server.server_ip.as_deref().unwrap_or_default()));
    map.insert(
        "server_ipv6".into(),
        json!(server.server_ipv6_net.as_deref().unwrap_or_default()),
    );
    map.insert("datacenter".into(), json!(server.data_center));
    map.insert("is_cancelled".into(), json!(server.cancelled));
    map.insert(
        "paid_until".into(),
        json!(server
            .paid_until
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()),
    );
    map.insert("product".into(), json!(server.product));
    map.insert("ip_addresses".into(), json!(server.ips));
    map.insert(
        "server_subnets".into(),
        Value::Array(server.subnets.iter().map(subnet_value).collect()),
    );
    map.insert("status".into(), json!(server.status));
    map.insert("traffic".into(), json!(server.traffic));
    map.insert(
        "linked_storagebox".into(),
        json!(server.linked_storagebox.unwrap_or_default()),
    );
    for (name, flag) in [
        ("reset", server.reset),
        ("rescue", server.rescue),
        ("vnc", server.vnc),
        ("windows", server.windows),
        ("plesk", server.plesk),
        ("cpanel", server.cpanel),
        ("wol", server.wol),
        ("hot_swap", server.hot_swap),
    ] {
        map.insert(name.into(), Value::Bool(flag));
    }
    map
}

fn subnet_value(subnet: &ServerSubnet) -> Value {
    json!({"ip": subnet.ip, "mask": subnet.mask})
}

fn choice_strings(choice: &Choice<String>) -> Value {
    json!(choice.as_slice())
}

/// Attributes of the boot overview, one group per profile.
#[must_use]
pub fn boot_overview_attributes(boot: &BootConfig) -> AttributeMap {
    let mut map = AttributeMap::new();
    map.insert(
        "active_profile".into(),
        json!(boot
            .active_profile()
            .map(|profile| profile.as_str())
            .unwrap_or_default()),
    );

    let (server_ip, server_ipv6) = boot
        .rescue
        .as_ref()
        .map(|r| (r.server_ip.clone(), r.server_ipv6_net.clone()))
        .or_else(|| {
            boot.linux
                .as_ref()
                .map(|l| (l.server_ip.clone(), l.server_ipv6_net.clone()))
        })
        .unwrap_or_default();
    map.insert("server_ip".into(), json!(server_ip.unwrap_or_default()));
    map.insert("server_ipv6".into(), json!(server_ipv6.unwrap_or_default()));

    let rescue = boot.rescue.as_ref();
    map.insert("rescue_active".into(), json!(rescue.is_some_and(|r| r.active)));
    map.insert(
        "rescue_os".into(),
        rescue.map_or_else(|| json!([]), |r| choice_strings(&r.os)),
    );

    let linux = boot.linux.as_ref();
    map.insert("linux_active".into(), json!(linux.is_some_and(|l| l.active)));
    map.insert(
        "linux_dist".into(),
        linux.map_or_else(|| json!([]), |l| choice_strings(&l.dist)),
    );
    map.insert(
        "linux_lang".into(),
        linux.map_or_else(|| json!([]), |l| choice_strings(&l.lang)),
    );
    map
}

/// Attributes of a firewall.
#[must_use]
pub fn firewall_attributes(firewall: &Firewall) -> AttributeMap {
    let mut map = AttributeMap::new();
    map.insert("server_number".into(), json!(firewall.server_number.get()));
    map.insert("server_ip".into(), json!(firewall.server_ip.as_deref().unwrap_or_default()));
    map.insert("status".into(), json!(firewall.status.as_str()));
    map.insert("filter_ipv6".into(), json!(firewall.filter_ipv6));
    map.insert("whitelist_hos".into(), json!(firewall.whitelist_hos));
    map.insert("port".into(), json!(firewall.port.as_deref().unwrap_or_default()));
    map.insert(
        "input_rules".into(),
        Value::Array(firewall.rules.input.iter().map(rule_value).collect()),
    );
    map.insert(
        "output_rules".into(),
        Value::Array(firewall.rules.output.iter().map(rule_value).collect()),
    );
    map
}

fn rule_value(rule: &FirewallRule) -> Value {
    let mut map = AttributeMap::new();
    map.insert("name".into(), json!(rule.name));
    map.insert("action".into(), json!(rule.action.as_str()));
    if let Some(version) = rule.ip_version {
        map.insert("ip_version".into(), json!(version.as_str()));
    }
    for (key, value) in [
        ("dst_ip", &rule.dst_ip),
        ("src_ip", &rule.src_ip),
        ("dst_port", &rule.dst_port),
        ("src_port", &rule.src_port),
        ("protocol", &rule.protocol),
        ("tcp_flags", &rule.tcp_flags),
    ] {
        if let Some(value) = value {
            map.insert(key.into(), json!(value));
        }
    }
    Value::Object(map)
}

/// Attributes of a vSwitch.
#[must_use]
pub fn vswitch_attributes(vswitch: &VSwitch) -> AttributeMap {
    let mut map = AttributeMap::new();
    map.insert("name".into(), json!(vswitch.name));
    map.insert("vlan".into(), json!(vswitch.vlan));
    map.insert("is_cancelled".into(), json!(vswitch.cancelled));
    map.insert(
        "servers".into(),
        Value::Array(
            vswitch
                .servers
                .iter()
                .map(|s: &VSwitchServer| json!(s.server_number.get()))
                .collect(),
        ),
    );
    map.insert(
        "subnets".into(),
        Value::Array(vswitch.subnets.iter().map(vswitch_subnet_value).collect()),
    );
    map.insert(
        "cloud_networks".into(),
        Value::Array(vswitch.cloud_networks.iter().map(cloud_network_value).collect()),
    );
    map
}

fn vswitch_subnet_value(subnet: &VSwitchSubnet) -> Value {
    json!({
        "ip": subnet.ip,
        "mask": subnet.mask,
        "gateway": subnet.gateway.as_deref().unwrap_or_default(),
    })
}

fn cloud_network_value(network: &CloudNetwork) -> Value {
    json!({
        "id": network.id,
        "ip": network.ip,
        "mask": network.mask,
        "gateway": network.gateway.as_deref().unwrap_or_default(),
    })
}

/// Attributes of an SSH key.
#[must_use]
pub fn key_attributes(key: &SshKey) -> AttributeMap {
    let mut map = AttributeMap::new();
    map.insert("name".into(), json!(key.name));
    map.insert("fingerprint".into(), json!(key.fingerprint));
    map.insert("type".into(), json!(key.key_type));
    map.insert("size".into(), json!(key.size));
    map.insert("data".into(), json!(key.data.as_deref().unwrap_or_default()));
    map.insert(
        "created_at".into(),
        json!(key.created_at.as_deref().unwrap_or_default()),
    );
    map
}
