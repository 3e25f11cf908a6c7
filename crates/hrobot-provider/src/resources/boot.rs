//! `hetzner-robot_boot`: arm the rescue system or a Linux installation.

use super::{server_number, Resource};
use crate::api::RobotApi;
use crate::diagnostics::Diagnostic;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::state::ResourceData;
use async_trait::async_trait;
use hrobot_api::{BootProfile, LinuxConfig, LinuxRequest, RescueConfig, RescueRequest};
use hrobot_core::ids::ServerNumber;
use serde_json::json;
use tracing::{info, warn};

const DEFAULT_RESCUE_OS: &str = "linux";
const DEFAULT_LANG: &str = "en";

/// Boot configuration resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootResource;

#[async_trait]
impl Resource for BootResource {
    fn type_name(&self) -> &'static str {
        "hetzner-robot_boot"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("Boot profile armed for the next reboot of a dedicated server")
            .with_attribute(
                "server_number",
                Attribute::required_int()
                    .force_new()
                    .with_description("Server number"),
            )
            .with_attribute(
                "profile",
                Attribute::required_string().with_description("`rescue` or `linux`"),
            )
            .with_attribute(
                "os",
                Attribute::optional_string()
                    .also_computed()
                    .with_description("Rescue system operating system"),
            )
            .with_attribute(
                "dist",
                Attribute::optional_string()
                    .also_computed()
                    .with_description("Linux distribution to install"),
            )
            .with_attribute(
                "lang",
                Attribute::optional_string()
                    .also_computed()
                    .with_description("Installation language"),
            )
            .with_attribute("arch", Attribute::optional_int().also_computed())
            .with_attribute(
                "authorized_keys",
                Attribute::optional_list(AttributeType::String)
                    .with_description("Fingerprints of SSH keys to install"),
            )
            .with_attribute("active", Attribute::computed_bool())
            .with_attribute("password", Attribute::computed_string().sensitive())
            .with_attribute("server_ip", Attribute::computed_string())
            .with_attribute("server_ipv6", Attribute::computed_string())
    }

    async fn create(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let number = server_number(data)?;
        let profile = profile(data)?;
        enable(api, number, profile, data).await?;
        data.set_id(number.to_string());
        Ok(())
    }

    async fn read(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let number = server_number(data)?;
        let profile = profile(data)?;

        let boot = match api.get_boot(number).await {
            Ok(boot) => boot,
            Err(err) if err.is_not_found() => {
                warn!(server_number = %number, "Server not found, removing boot configuration from state");
                data.clear_id();
                return Ok(());
            }
            Err(err) => {
                return Err(Diagnostic::from_error(
                    format!("Unable to read boot configuration of server {number}"),
                    &err,
                ))
            }
        };

        let still_active = match profile {
            BootProfile::Rescue => boot
                .rescue
                .filter(|rescue| rescue.active)
                .map(|rescue| apply_rescue(data, &rescue)),
            BootProfile::Linux => boot
                .linux
                .filter(|linux| linux.active)
                .map(|linux| apply_linux(data, &linux)),
        };

        if still_active.is_none() {
            warn!(server_number = %number, %profile, "Boot profile no longer active, removing from state");
            data.clear_id();
        }
        Ok(())
    }

    async fn update(
        &self,
        api: &dyn RobotApi,
        prior: &ResourceData,
        data: &mut ResourceData,
    ) -> Result<(), Diagnostic> {
        let number = server_number(data)?;
        let previous = profile(prior)?;
        let next = profile(data)?;

        disable(api, number, previous).await?;
        enable(api, number, next, data).await
    }

    async fn delete(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let number = server_number(data)?;
        let profile = profile(data)?;
        disable(api, number, profile).await?;
        data.clear_id();
        Ok(())
    }
}

fn profile(data: &ResourceData) -> Result<BootProfile, Diagnostic> {
    data.require_str("profile")?
        .parse()
        .map_err(|err| Diagnostic::from_error("Invalid boot profile", &err).with_attribute("profile"))
}

fn arch(data: &ResourceData) -> Result<Option<u16>, Diagnostic> {
    data.get_i64("arch")
        .map(u16::try_from)
        .transpose()
        .map_err(|_| Diagnostic::error("Invalid architecture").with_attribute("arch"))
}

fn rescue_request(data: &ResourceData) -> Result<RescueRequest, Diagnostic> {
    Ok(RescueRequest {
        os: data.get_str("os").unwrap_or(DEFAULT_RESCUE_OS).to_string(),
        arch: arch(data)?,
        authorized_keys: data.get_string_list("authorized_keys"),
    })
}

fn linux_request(data: &ResourceData) -> Result<LinuxRequest, Diagnostic> {
    let dist = data.get_str("dist").ok_or_else(|| {
        Diagnostic::error("Missing required attribute")
            .with_attribute("dist")
            .with_detail("`dist` must be set for the linux profile")
    })?;
    Ok(LinuxRequest {
        dist: dist.to_string(),
        arch: arch(data)?,
        lang: data.get_str("lang").unwrap_or(DEFAULT_LANG).to_string(),
        authorized_keys: data.get_string_list("authorized_keys"),
    })
}

async fn enable(
    api: &dyn RobotApi,
    number: ServerNumber,
    profile: BootProfile,
    data: &mut ResourceData,
) -> Result<(), Diagnostic> {
    let failed = |err: hrobot_core::Error| {
        Diagnostic::from_error(format!("Unable to enable {profile} on server {number}"), &err)
    };

    match profile {
        BootProfile::Rescue => {
            let request = rescue_request(data)?;
            let rescue = api.enable_rescue(number, &request).await.map_err(failed)?;
            apply_rescue(data, &rescue);
        }
        BootProfile::Linux => {
            let request = linux_request(data)?;
            let linux = api.enable_linux(number, &request).await.map_err(failed)?;
            apply_linux(data, &linux);
        }
    }

    info!(server_number = %number, %profile, "Enabled boot profile");
    Ok(())
}

async fn disable(
    api: &dyn RobotApi,
    number: ServerNumber,
    profile: BootProfile,
) -> Result<(), Diagnostic> {
    let result = match profile {
        BootProfile::Rescue => api.disable_rescue(number).await.map(|_| ()),
        BootProfile::Linux => api.disable_linux(number).await.map(|_| ()),
    };

    match result {
        Ok(()) => {
            info!(server_number = %number, %profile, "Disabled boot profile");
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            warn!(server_number = %number, %profile, "Server not found while disabling boot profile");
            Ok(())
        }
        Err(err) => Err(Diagnostic::from_error(
            format!("Unable to disable {profile} on server {number}"),
            &err,
        )),
    }
}

fn apply_common(
    data: &mut ResourceData,
    password: Option<&String>,
    server_ip: Option<&String>,
    server_ipv6: Option<&String>,
) {
    data.set("active", true);
    if let Some(password) = password {
        data.set("password", password.as_str());
    }
    data.set("server_ip", server_ip.map_or("", String::as_str));
    data.set("server_ipv6", server_ipv6.map_or("", String::as_str));
}

fn apply_rescue(data: &mut ResourceData, rescue: &RescueConfig) {
    apply_common(
        data,
        rescue.password.as_ref(),
        rescue.server_ip.as_ref(),
        rescue.server_ipv6_net.as_ref(),
    );
    if let Some(os) = rescue.os.selected() {
        data.set("os", os.as_str());
    }
    if let Some(arch) = rescue.arch.as_ref().and_then(|a| a.selected()) {
        data.set("arch", json!(arch));
    }
}

fn apply_linux(data: &mut ResourceData, linux: &LinuxConfig) {
    apply_common(
        data,
        linux.password.as_ref(),
        linux.server_ip.as_ref(),
        linux.server_ipv6_net.as_ref(),
    );
    if let Some(dist) = linux.dist.selected() {
        data.set("dist", dist.as_str());
    }
    if let Some(lang) = linux.lang.selected() {
        data.set("lang", lang.as_str());
    }
    if let Some(arch) = linux.arch.as_ref().and_then(|a| a.selected()) {
        data.set("arch", json!(arch));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockRobotApi;
    use hrobot_api::{BootConfig, Choice};
    use hrobot_core::{ApiError, Error};
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn rescue_config(active: bool) -> RescueConfig {
        RescueConfig {
            server_number: ServerNumber::new(321),
            server_ip: Some("123.123.123.123".into()),
            server_ipv6_net: Some("2a01:4f8:111:4221::".into()),
            os: if active {
                Choice::Selected("linux".into())
            } else {
                Choice::Available(vec!["linux".into(), "vkvm".into()])
            },
            arch: None,
            active,
            password: active.then(|| "jEt0dtUvomJ".to_string()),
            authorized_key: vec![],
            host_key: vec![],
        }
    }

    fn linux_config(active: bool) -> LinuxConfig {
        LinuxConfig {
            server_number: ServerNumber::new(321),
            server_ip: Some("123.123.123.123".into()),
            server_ipv6_net: None,
            dist: Choice::Selected("Debian 12 base".into()),
            arch: Some(Choice::Selected(64)),
            lang: Choice::Selected("en".into()),
            active,
            password: active.then(|| "pw".to_string()),
            authorized_key: vec![],
            host_key: vec![],
        }
    }

    fn data(profile: &str) -> ResourceData {
        ResourceData::from_value(json!({"server_number": 321, "profile": profile})).unwrap()
    }

    fn not_found() -> Error {
        Error::Api(ApiError::from_response(404, "not found"))
    }

    #[tokio::test]
    async fn create_rescue_records_password() {
        let mut api = MockRobotApi::new();
        api.expect_enable_rescue()
            .withf(|number, request| {
                *number == ServerNumber::new(321) && request.os == "linux" && request.arch.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(rescue_config(true)));

        let mut data = data("rescue");
        BootResource.create(&api, &mut data).await.unwrap();

        assert_eq!(data.id(), Some("321"));
        assert_eq!(data.get_str("password"), Some("jEt0dtUvomJ"));
        assert_eq!(data.get_bool("active"), Some(true));
        assert_eq!(data.get_str("server_ipv6"), Some("2a01:4f8:111:4221::"));
    }

    #[tokio::test]
    async fn create_linux_requires_dist() {
        let api = MockRobotApi::new();
        let mut data = data("linux");
        let err = BootResource.create(&api, &mut data).await.unwrap_err();
        assert_eq!(err.attribute.as_deref(), Some("dist"));
        assert_eq!(data.id(), None);
    }

    #[tokio::test]
    async fn create_rejects_unknown_profile() {
        let api = MockRobotApi::new();
        let err = BootResource
            .create(&api, &mut data("windows"))
            .await
            .unwrap_err();
        assert_eq!(err.attribute.as_deref(), Some("profile"));
    }

    #[tokio::test]
    async fn create_conflict_is_reported() {
        let mut api = MockRobotApi::new();
        api.expect_enable_rescue().returning(|_, _| {
            Err(Error::Api(ApiError::from_response(
                409,
                r#"{"error":{"status":409,"code":"BOOT_ALREADY_ENABLED","message":"A boot option is already active"}}"#,
            )))
        });

        let err = BootResource
            .create(&api, &mut data("rescue"))
            .await
            .unwrap_err();
        assert_eq!(err.summary, "Unable to enable rescue on server 321");
        assert!(err.detail.unwrap().contains("BOOT_ALREADY_ENABLED"));
    }

    #[tokio::test]
    async fn read_keeps_active_profile() {
        let mut api = MockRobotApi::new();
        api.expect_get_boot()
            .with(eq(ServerNumber::new(321)))
            .returning(|_| {
                Ok(BootConfig {
                    rescue: Some(rescue_config(false)),
                    linux: Some(linux_config(true)),
                })
            });

        let mut data = data("linux").with_id("321");
        BootResource.read(&api, &mut data).await.unwrap();
        assert_eq!(data.id(), Some("321"));
        assert_eq!(data.get_str("dist"), Some("Debian 12 base"));
        assert_eq!(data.get_i64("arch"), Some(64));
    }

    #[tokio::test]
    async fn read_clears_id_when_profile_inactive() {
        let mut api = MockRobotApi::new();
        api.expect_get_boot().returning(|_| {
            Ok(BootConfig {
                rescue: Some(rescue_config(false)),
                linux: None,
            })
        });

        let mut data = data("rescue").with_id("321");
        BootResource.read(&api, &mut data).await.unwrap();
        assert_eq!(data.id(), None);
    }

    #[tokio::test]
    async fn read_clears_id_when_server_gone() {
        let mut api = MockRobotApi::new();
        api.expect_get_boot().returning(|_| Err(not_found()));

        let mut data = data("rescue").with_id("321");
        BootResource.read(&api, &mut data).await.unwrap();
        assert_eq!(data.id(), None);
    }

    #[tokio::test]
    async fn update_disables_previous_then_enables_next() {
        let mut api = MockRobotApi::new();
        let mut seq = Sequence::new();
        api.expect_disable_rescue()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(rescue_config(false)));
        api.expect_enable_linux()
            .withf(|_, request| request.dist == "Debian 12 base" && request.lang == "en")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(linux_config(true)));

        let prior = data("rescue").with_id("321");
        let mut next = data("linux").with_id("321");
        next.set("dist", "Debian 12 base");

        BootResource.update(&api, &prior, &mut next).await.unwrap();
        assert_eq!(next.get_str("password"), Some("pw"));
    }

    #[tokio::test]
    async fn delete_tolerates_missing_server() {
        let mut api = MockRobotApi::new();
        api.expect_disable_linux()
            .times(1)
            .returning(|_| Err(not_found()));

        let mut data = data("linux").with_id("321");
        BootResource.delete(&api, &mut data).await.unwrap();
        assert_eq!(data.id(), None);
    }

    #[test]
    fn schema_marks_password_sensitive() {
        let schema = BootResource.schema();
        assert!(schema.attribute("password").unwrap().sensitive);
        assert!(schema.attribute("server_number").unwrap().force_new);
    }
}
