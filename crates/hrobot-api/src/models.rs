//! Robot web service data models.

use chrono::NaiveDate;
use hrobot_core::form::FormParams;
use hrobot_core::ids::{ServerNumber, VSwitchId};
use serde::{Deserialize, Deserializer, Serialize};

/// A dedicated server as returned by `GET /server` and `GET /server/{number}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Server {
    /// Server number, the stable identity of the machine.
    pub server_number: ServerNumber,
    /// Customer-assigned name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub server_name: String,
    /// Main IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ip: Option<String>,
    /// Main IPv6 network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ipv6_net: Option<String>,
    /// Product name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub product: String,
    /// Data center label.
    #[serde(rename = "dc", default, deserialize_with = "null_as_default")]
    pub data_center: String,
    /// Free traffic quota, `unlimited` for unmetered servers.
    #[serde(default, deserialize_with = "null_as_default")]
    pub traffic: String,
    /// Provisioning status (`ready` or `in process`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Whether the server has been cancelled.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cancelled: bool,
    /// Date up to which the server is paid.
    /// Values that are not `YYYY-MM-DD` read as `None`.
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub paid_until: Option<NaiveDate>,
    /// Additional single IP addresses.
    #[serde(rename = "ip", default, deserialize_with = "null_as_default")]
    pub ips: Vec<String>,
    /// Additional subnets.
    #[serde(rename = "subnet", default, deserialize_with = "null_as_default")]
    pub subnets: Vec<ServerSubnet>,
    /// Linked storage box id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_storagebox: Option<u64>,
    /// Reset system available.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reset: bool,
    /// Rescue system available.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rescue: bool,
    /// VNC installation available.
    #[serde(default, deserialize_with = "null_as_default")]
    pub vnc: bool,
    /// Windows installation available.
    #[serde(default, deserialize_with = "null_as_default")]
    pub windows: bool,
    /// Plesk installation available.
    #[serde(default, deserialize_with = "null_as_default")]
    pub plesk: bool,
    /// cPanel installation available.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpanel: bool,
    /// Wake on LAN available.
    #[serde(default, deserialize_with = "null_as_default")]
    pub wol: bool,
    /// Hot swap available.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hot_swap: bool,
}

impl Server {
    /// Create a record carrying only the server number.
    #[must_use]
    pub fn new(server_number: ServerNumber) -> Self {
        Self {
            server_number,
            server_name: String::new(),
            server_ip: None,
            server_ipv6_net: None,
            product: String::new(),
            data_center: String::new(),
            traffic: String::new(),
            status: String::new(),
            cancelled: false,
            paid_until: None,
            ips: Vec::new(),
            subnets: Vec::new(),
            linked_storagebox: None,
            reset: false,
            rescue: false,
            vnc: false,
            windows: false,
            plesk: false,
            cpanel: false,
            wol: false,
            hot_swap: false,
        }
    }
}

/// Subnet routed to a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerSubnet {
    /// Network address.
    pub ip: String,
    /// Prefix length as reported by Robot.
    pub mask: String,
}

/// `{"server": {...}}` wrapper used by the server endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerEnvelope {
    /// Wrapped server record.
    pub server: Server,
}

/// Request payload for renaming a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameServerRequest {
    /// New server name.
    pub server_name: String,
}

impl RenameServerRequest {
    /// Convert to form fields.
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = FormParams::new();
        form.push("server_name", &self.server_name);
        form.into_pairs()
    }
}

/// A boot option that is either the selected value (profile active) or the
/// list of values Robot offers (profile inactive).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Choice<T> {
    /// Value in effect.
    Selected(T),
    /// Values that may be chosen.
    Available(Vec<T>),
}

impl<T> Choice<T> {
    /// Returns the selected value, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&T> {
        match self {
            Self::Selected(value) => Some(value),
            Self::Available(_) => None,
        }
    }

    /// Returns every value carried by the choice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Selected(value) => std::slice::from_ref(value),
            Self::Available(values) => values.as_slice(),
        }
    }
}

/// `{"key": {...}}` wrapper used by the key endpoints and boot key lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyEnvelope {
    /// Wrapped key.
    pub key: SshKey,
}

/// SSH public key stored in Robot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SshKey {
    /// Key name (absent for host keys).
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// MD5 fingerprint, the key's identity.
    pub fingerprint: String,
    /// Algorithm (`RSA`, `ECDSA`, `ED25519`, ...).
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub key_type: String,
    /// Key size in bits.
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u32,
    /// Key material in OpenSSH format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Creation timestamp as reported by Robot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Request payload for uploading a key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateKeyRequest {
    /// Key name.
    pub name: String,
    /// Key material in OpenSSH or SSH2 format.
    pub data: String,
}

impl CreateKeyRequest {
    /// Convert to form fields.
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = FormParams::new();
        form.push("name", &self.name);
        form.push("data", &self.data);
        form.into_pairs()
    }
}

/// Overview of every boot profile of a server (`GET /boot/{number}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BootConfig {
    /// Rescue system profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescue: Option<RescueConfig>,
    /// Linux installation profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<LinuxConfig>,
}

impl BootConfig {
    /// Returns the profile currently armed for the next boot, if any.
    #[must_use]
    pub fn active_profile(&self) -> Option<BootProfile> {
        if self.rescue.as_ref().is_some_and(|r| r.active) {
            Some(BootProfile::Rescue)
        } else if self.linux.as_ref().is_some_and(|l| l.active) {
            Some(BootProfile::Linux)
        } else {
            None
        }
    }
}

/// `{"boot": {...}}` wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BootEnvelope {
    /// Wrapped boot overview.
    pub boot: BootConfig,
}

/// Boot profiles that can be armed through this crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BootProfile {
    /// Rescue system.
    Rescue,
    /// Automatic Linux installation.
    Linux,
}

impl BootProfile {
    /// Path segment under `/boot/{number}/`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rescue => "rescue",
            Self::Linux => "linux",
        }
    }
}

impl std::fmt::Display for BootProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BootProfile {
    type Err = hrobot_core::Error;

    fn from_str(s: &str) -> hrobot_core::Result<Self> {
        match s {
            "rescue" => Ok(Self::Rescue),
            "linux" => Ok(Self::Linux),
            other => Err(hrobot_core::Error::InvalidRequest(format!(
                "unknown boot profile `{other}` (expected `rescue` or `linux`)"
            ))),
        }
    }
}

/// Rescue system profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RescueConfig {
    /// Server number.
    pub server_number: ServerNumber,
    /// Main IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ip: Option<String>,
    /// Main IPv6 network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ipv6_net: Option<String>,
    /// Operating system of the rescue image.
    pub os: Choice<String>,
    /// Architecture, omitted by newer API revisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<Choice<u16>>,
    /// Whether the profile is armed.
    pub active: bool,
    /// Root password, present right after activation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Keys installed for root.
    #[serde(default, deserialize_with = "null_as_default")]
    pub authorized_key: Vec<KeyEnvelope>,
    /// Host keys of the rescue system.
    #[serde(default, deserialize_with = "null_as_default")]
    pub host_key: Vec<KeyEnvelope>,
}

/// `{"rescue": {...}}` wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RescueEnvelope {
    /// Wrapped rescue profile.
    pub rescue: RescueConfig,
}

/// Request payload for arming the rescue system.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RescueRequest {
    /// Operating system of the rescue image (`linux`, `vkvm`, ...).
    pub os: String,
    /// Architecture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<u16>,
    /// Fingerprints of keys to install.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorized_keys: Vec<String>,
}

impl RescueRequest {
    /// Convert to form fields.
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = FormParams::new();
        form.push("os", &self.os);
        form.push_opt("arch", self.arch);
        form.push_all("authorized_key", &self.authorized_keys);
        form.into_pairs()
    }
}

/// Linux installation profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinuxConfig {
    /// Server number.
    pub server_number: ServerNumber,
    /// Main IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ip: Option<String>,
    /// Main IPv6 network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ipv6_net: Option<String>,
    /// Distribution.
    pub dist: Choice<String>,
    /// Architecture, omitted by newer API revisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<Choice<u16>>,
    /// Installation language.
    pub lang: Choice<String>,
    /// Whether the profile is armed.
    pub active: bool,
    /// Root password, present right after activation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Keys installed for root.
    #[serde(default, deserialize_with = "null_as_default")]
    pub authorized_key: Vec<KeyEnvelope>,
    /// Host keys of the installed system.
    #[serde(default, deserialize_with = "null_as_default")]
    pub host_key: Vec<KeyEnvelope>,
}

/// `{"linux": {...}}` wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinuxEnvelope {
    /// Wrapped Linux profile.
    pub linux: LinuxConfig,
}

/// Request payload for arming a Linux installation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinuxRequest {
    /// Distribution name as listed by Robot.
    pub dist: String,
    /// Architecture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<u16>,
    /// Installation language.
    pub lang: String,
    /// Fingerprints of keys to install.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorized_keys: Vec<String>,
}

impl LinuxRequest {
    /// Convert to form fields.
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = FormParams::new();
        form.push("dist", &self.dist);
        form.push_opt("arch", self.arch);
        form.push("lang", &self.lang);
        form.push_all("authorized_key", &self.authorized_keys);
        form.into_pairs()
    }
}

/// Firewall state of a server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FirewallStatus {
    /// Filtering enabled.
    #[serde(rename = "active")]
    Active,
    /// Filtering disabled.
    #[serde(rename = "disabled")]
    Disabled,
    /// A change is being rolled out.
    #[serde(rename = "in process")]
    InProcess,
}

impl FirewallStatus {
    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
            Self::InProcess => "in process",
        }
    }
}

/// IP family a firewall rule applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    /// IPv4 only.
    Ipv4,
    /// IPv6 only.
    Ipv6,
}

impl IpVersion {
    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
        }
    }
}

/// What happens to packets matching a rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    /// Let the packet through.
    Accept,
    /// Drop the packet.
    Discard,
}

impl RuleAction {
    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Discard => "discard",
        }
    }
}

/// A single firewall rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirewallRule {
    /// Rule name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// IP family, both when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<IpVersion>,
    /// Destination address or network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_ip: Option<String>,
    /// Source address or network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_ip: Option<String>,
    /// Destination port or range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_port: Option<String>,
    /// Source port or range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_port: Option<String>,
    /// Protocol (`tcp`, `udp`, `icmp`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// TCP flag expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_flags: Option<String>,
    /// Action.
    pub action: RuleAction,
}

impl FirewallRule {
    fn push_form(&self, form: &mut FormParams, prefix: &str) {
        form.push(format!("{prefix}[name]"), &self.name);
        form.push_opt(format!("{prefix}[ip_version]"), self.ip_version.map(|v| v.as_str()));
        form.push_opt(format!("{prefix}[dst_ip]"), self.dst_ip.as_ref());
        form.push_opt(format!("{prefix}[src_ip]"), self.src_ip.as_ref());
        form.push_opt(format!("{prefix}[dst_port]"), self.dst_port.as_ref());
        form.push_opt(format!("{prefix}[src_port]"), self.src_port.as_ref());
        form.push_opt(format!("{prefix}[protocol]"), self.protocol.as_ref());
        form.push_opt(format!("{prefix}[tcp_flags]"), self.tcp_flags.as_ref());
        form.push(format!("{prefix}[action]"), self.action.as_str());
    }
}

/// Input and output rule chains.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirewallRules {
    /// Rules for incoming traffic.
    #[serde(default, deserialize_with = "null_as_default")]
    pub input: Vec<FirewallRule>,
    /// Rules for outgoing traffic.
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: Vec<FirewallRule>,
}

/// Firewall configuration of a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Firewall {
    /// Server number.
    pub server_number: ServerNumber,
    /// Main IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ip: Option<String>,
    /// Current state.
    pub status: FirewallStatus,
    /// Whether IPv6 traffic is filtered.
    #[serde(default, deserialize_with = "null_as_default")]
    pub filter_ipv6: bool,
    /// Whether Hetzner services are whitelisted.
    #[serde(default, deserialize_with = "null_as_default")]
    pub whitelist_hos: bool,
    /// Switch port the firewall is attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// Rule chains.
    #[serde(default)]
    pub rules: FirewallRules,
}

/// `{"firewall": {...}}` wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirewallEnvelope {
    /// Wrapped firewall.
    pub firewall: Firewall,
}

/// Request payload replacing a server's firewall configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirewallRequest {
    /// Desired state, `active` or `disabled`.
    pub status: FirewallStatus,
    /// Filter IPv6 traffic.
    pub filter_ipv6: bool,
    /// Whitelist Hetzner services.
    pub whitelist_hos: bool,
    /// Rule chains.
    pub rules: FirewallRules,
}

impl FirewallRequest {
    /// Convert to form fields, flattening rules into `rules[chain][index][field]`.
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = FormParams::new();
        form.push("status", self.status.as_str());
        form.push("filter_ipv6", self.filter_ipv6);
        form.push("whitelist_hos", self.whitelist_hos);
        for (index, rule) in self.rules.input.iter().enumerate() {
            rule.push_form(&mut form, &format!("rules[input][{index}]"));
        }
        for (index, rule) in self.rules.output.iter().enumerate() {
            rule.push_form(&mut form, &format!("rules[output][{index}]"));
        }
        form.into_pairs()
    }
}

/// vSwitch summary as listed by `GET /vswitch`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VSwitchSummary {
    /// vSwitch id.
    pub id: VSwitchId,
    /// Name.
    pub name: String,
    /// VLAN id.
    pub vlan: u16,
    /// Whether the vSwitch has been cancelled.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cancelled: bool,
}

/// vSwitch with its attachments (`GET /vswitch/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VSwitch {
    /// vSwitch id.
    pub id: VSwitchId,
    /// Name.
    pub name: String,
    /// VLAN id.
    pub vlan: u16,
    /// Whether the vSwitch has been cancelled.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cancelled: bool,
    /// Attached servers.
    #[serde(rename = "server", default, deserialize_with = "null_as_default")]
    pub servers: Vec<VSwitchServer>,
    /// Routed subnets.
    #[serde(rename = "subnet", default, deserialize_with = "null_as_default")]
    pub subnets: Vec<VSwitchSubnet>,
    /// Connected cloud networks.
    #[serde(rename = "cloud_network", default, deserialize_with = "null_as_default")]
    pub cloud_networks: Vec<CloudNetwork>,
}

/// Server attached to a vSwitch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VSwitchServer {
    /// Server number.
    pub server_number: ServerNumber,
    /// Main IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ip: Option<String>,
    /// Main IPv6 network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ipv6_net: Option<String>,
    /// Attachment status (`ready`, `in process`, `failed`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

/// Subnet routed into a vSwitch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VSwitchSubnet {
    /// Network address.
    pub ip: String,
    /// Prefix length.
    pub mask: u8,
    /// Gateway address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}

/// Cloud network connected to a vSwitch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CloudNetwork {
    /// Cloud network id.
    pub id: u64,
    /// Network address.
    pub ip: String,
    /// Prefix length.
    pub mask: u8,
    /// Gateway address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}

/// Request payload for creating or updating a vSwitch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VSwitchRequest {
    /// Name.
    pub name: String,
    /// VLAN id (4000-4091).
    pub vlan: u16,
}

impl VSwitchRequest {
    /// Convert to form fields.
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = FormParams::new();
        form.push("name", &self.name);
        form.push("vlan", self.vlan);
        form.into_pairs()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let option = Option::<T>::deserialize(deserializer)?;
    Ok(option.unwrap_or_default())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paid_until_tolerates_odd_values() {
        for raw in [json!(""), json!(null), json!("02.09.2010")] {
            let server: Server =
                serde_json::from_value(json!({"server_number": 1, "paid_until": raw})).unwrap();
            assert_eq!(server.paid_until, None);
        }
        let server: Server =
            serde_json::from_value(json!({"server_number": 1, "paid_until": "2010-09-02"}))
                .unwrap();
        assert_eq!(server.paid_until, NaiveDate::from_ymd_opt(2010, 9, 2));
    }

    #[test]
    fn server_minimal_body_zero_fills() {
        let envelope: ServerEnvelope = serde_json::from_value(json!({
            "server": {
                "server_number": 12345,
                "server_name": "web1",
                "server_ip": "1.2.3.4",
                "status": "ready"
            }
        }))
        .unwrap();

        let mut expected = Server::new(ServerNumber::new(12345));
        expected.server_name = "web1".into();
        expected.server_ip = Some("1.2.3.4".into());
        expected.status = "ready".into();
        assert_eq!(envelope.server, expected);
    }

    #[test]
    fn server_nulls_become_zero_values() {
        let server: Server = serde_json::from_value(json!({
            "server_number": 7,
            "server_name": null,
            "server_ipv6_net": null,
            "ip": null,
            "subnet": null,
            "linked_storagebox": null,
            "hot_swap": null
        }))
        .unwrap();

        assert_eq!(server, Server::new(ServerNumber::new(7)));
    }

    #[test]
    fn server_roundtrip() {
        let mut server = Server::new(ServerNumber::new(321));
        server.server_ip = Some("123.123.123.123".into());
        server.server_ipv6_net = Some("2a01:f48:111:4221::".into());
        server.paid_until = NaiveDate::from_ymd_opt(2010, 9, 2);
        server.ips = vec!["123.123.123.123".into()];
        server.subnets = vec![ServerSubnet {
            ip: "2a01:4f8:111:4221::".into(),
            mask: "64".into(),
        }];
        server.linked_storagebox = Some(12345);
        server.wol = true;

        let encoded = serde_json::to_value(&server).unwrap();
        assert_eq!(encoded["dc"], json!(""));
        assert_eq!(encoded["paid_until"], json!("2010-09-02"));
        let decoded: Server = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, server);
    }

    #[test]
    fn server_wrong_field_type_is_rejected() {
        let result = serde_json::from_value::<Server>(json!({
            "server_number": "12345"
        }));
        assert!(result.is_err());

        let result = serde_json::from_value::<Server>(json!({
            "server_number": 1,
            "cancelled": "no"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn server_requires_number() {
        assert!(serde_json::from_value::<Server>(json!({"server_name": "web1"})).is_err());
    }

    #[test]
    fn choice_decodes_scalar_and_list() {
        let selected: Choice<String> = serde_json::from_value(json!("linux")).unwrap();
        assert_eq!(selected.selected().map(String::as_str), Some("linux"));
        assert_eq!(selected.as_slice().len(), 1);

        let available: Choice<u16> = serde_json::from_value(json!([64, 32])).unwrap();
        assert!(available.selected().is_none());
        assert_eq!(available.as_slice(), &[64, 32]);
    }

    #[test]
    fn boot_active_profile() {
        let boot: BootConfig = serde_json::from_value(json!({
            "rescue": {
                "server_number": 321,
                "server_ip": "123.123.123.123",
                "os": ["linux", "vkvm"],
                "arch": [64, 32],
                "active": false,
                "password": null,
                "authorized_key": [],
                "host_key": []
            },
            "linux": {
                "server_number": 321,
                "dist": "Debian 12 base",
                "arch": 64,
                "lang": "en",
                "active": true,
                "password": "s3cret",
                "authorized_key": null,
                "host_key": null
            },
            "vnc": {"server_number": 321, "active": false}
        }))
        .unwrap();

        assert_eq!(boot.active_profile(), Some(BootProfile::Linux));
        let linux = boot.linux.unwrap();
        assert_eq!(linux.dist.selected().map(String::as_str), Some("Debian 12 base"));
        assert_eq!(linux.password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn boot_profile_parse() {
        assert_eq!("rescue".parse::<BootProfile>().unwrap(), BootProfile::Rescue);
        assert_eq!("linux".parse::<BootProfile>().unwrap(), BootProfile::Linux);
        assert!("windows".parse::<BootProfile>().is_err());
    }

    #[test]
    fn rescue_request_form() {
        let request = RescueRequest {
            os: "linux".into(),
            arch: Some(64),
            authorized_keys: vec!["aa:bb".into()],
        };
        assert_eq!(
            request.to_form(),
            vec![
                ("os".to_string(), "linux".to_string()),
                ("arch".to_string(), "64".to_string()),
                ("authorized_key[]".to_string(), "aa:bb".to_string()),
            ]
        );
    }

    #[test]
    fn firewall_decodes_in_process_status() {
        let firewall: Firewall = serde_json::from_value(json!({
            "server_ip": "123.123.123.123",
            "server_number": 321,
            "status": "in process",
            "filter_ipv6": false,
            "whitelist_hos": true,
            "port": "main",
            "rules": {
                "input": [{
                    "ip_version": "ipv4",
                    "name": "rule 1",
                    "dst_ip": null,
                    "src_ip": "1.1.1.1",
                    "dst_port": "80",
                    "src_port": null,
                    "protocol": null,
                    "tcp_flags": null,
                    "action": "accept"
                }],
                "output": []
            }
        }))
        .unwrap();

        assert_eq!(firewall.status, FirewallStatus::InProcess);
        assert_eq!(firewall.rules.input.len(), 1);
        assert_eq!(firewall.rules.input[0].action, RuleAction::Accept);
        assert_eq!(firewall.rules.input[0].dst_port.as_deref(), Some("80"));
    }

    #[test]
    fn firewall_request_form_flattens_rules() {
        let request = FirewallRequest {
            status: FirewallStatus::Active,
            filter_ipv6: false,
            whitelist_hos: true,
            rules: FirewallRules {
                input: vec![FirewallRule {
                    name: "ssh".into(),
                    ip_version: Some(IpVersion::Ipv4),
                    dst_ip: None,
                    src_ip: None,
                    dst_port: Some("22".into()),
                    src_port: None,
                    protocol: Some("tcp".into()),
                    tcp_flags: None,
                    action: RuleAction::Accept,
                }],
                output: vec![],
            },
        };

        let form = request.to_form();
        assert!(form.contains(&("status".into(), "active".into())));
        assert!(form.contains(&("whitelist_hos".into(), "true".into())));
        assert!(form.contains(&("rules[input][0][name]".into(), "ssh".into())));
        assert!(form.contains(&("rules[input][0][ip_version]".into(), "ipv4".into())));
        assert!(form.contains(&("rules[input][0][dst_port]".into(), "22".into())));
        assert!(form.contains(&("rules[input][0][action]".into(), "accept".into())));
        assert!(!form.iter().any(|(k, _)| k == "rules[input][0][src_ip]"));
    }

    #[test]
    fn vswitch_detail_decodes_attachments() {
        let vswitch: VSwitch = serde_json::from_value(json!({
            "id": 4321,
            "name": "vswitch 1",
            "vlan": 4000,
            "cancelled": false,
            "server": [{
                "server_ip": "123.123.123.123",
                "server_ipv6_net": "2a01:4f8:111:4221::",
                "server_number": 321,
                "status": "ready"
            }],
            "subnet": [{"ip": "213.239.252.48", "mask": 29, "gateway": "213.239.252.49"}],
            "cloud_network": [{"id": 123, "ip": "10.0.2.0", "mask": 24, "gateway": "10.0.2.1"}]
        }))
        .unwrap();

        assert_eq!(vswitch.id, VSwitchId::new(4321));
        assert_eq!(vswitch.servers[0].server_number, ServerNumber::new(321));
        assert_eq!(vswitch.subnets[0].mask, 29);
        assert_eq!(vswitch.cloud_networks[0].id, 123);
    }

    #[test]
    fn key_envelope_decodes_type_field() {
        let envelope: KeyEnvelope = serde_json::from_value(json!({
            "key": {
                "name": "key1",
                "fingerprint": "56:29:99:a4:5d:ed:ac:95:c1:f5:88:82:90:5d:dd:10",
                "type": "ECDSA",
                "size": 521,
                "data": "ecdsa-sha2-nistp521 AAAAE2VjZHNhLXNoYTItbmlzdHA1MjEAAAAIbmlzdHA1MjEAAACFBAQ5",
                "created_at": "2021-12-31 23:59:59"
            }
        }))
        .unwrap();

        assert_eq!(envelope.key.key_type, "ECDSA");
        assert_eq!(envelope.key.size, 521);
    }
}
