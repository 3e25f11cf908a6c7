//! `hetzner-robot_vswitch`: a layer-2 network between dedicated servers.

use super::Resource;
use crate::api::RobotApi;
use crate::diagnostics::Diagnostic;
use crate::flatten::vswitch_attributes;
use crate::schema::{object, Attribute, AttributeType, Schema};
use crate::state::ResourceData;
use async_trait::async_trait;
use hrobot_api::VSwitchRequest;
use hrobot_core::ids::{ServerNumber, VSwitchId};
use serde_json::json;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// vSwitches are cancelled effective immediately.
const CANCELLATION_DATE: &str = "now";

/// vSwitch resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct VSwitchResource;

/// Computed vSwitch attributes shared with the data source.
pub(crate) fn computed_attributes(schema: Schema) -> Schema {
    schema
        .with_attribute("is_cancelled", Attribute::computed_bool())
        .with_attribute(
            "subnets",
            Attribute::computed_list(object([
                ("ip", Attribute::computed_string()),
                ("mask", Attribute::computed_int()),
                ("gateway", Attribute::computed_string()),
            ])),
        )
        .with_attribute(
            "cloud_networks",
            Attribute::computed_list(object([
                ("id", Attribute::computed_int()),
                ("ip", Attribute::computed_string()),
                ("mask", Attribute::computed_int()),
                ("gateway", Attribute::computed_string()),
            ])),
        )
}

#[async_trait]
impl Resource for VSwitchResource {
    fn type_name(&self) -> &'static str {
        "hetzner-robot_vswitch"
    }

    fn schema(&self) -> Schema {
        computed_attributes(
            Schema::v0()
                .with_description("vSwitch connecting dedicated servers")
                .with_attribute("name", Attribute::required_string())
                .with_attribute(
                    "vlan",
                    Attribute::required_int().with_description("VLAN id between 4000 and 4091"),
                )
                .with_attribute(
                    "servers",
                    Attribute::optional_list(AttributeType::Int)
                        .also_computed()
                        .with_description("Numbers of attached servers"),
                ),
        )
    }

    async fn create(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let request = request(data)?;
        let desired = servers(data)?;

        let vswitch = api.create_vswitch(&request).await.map_err(|err| {
            Diagnostic::from_error(format!("Unable to create vSwitch `{}`", request.name), &err)
        })?;
        data.set_id(vswitch.id.to_string());
        info!(vswitch_id = %vswitch.id, vlan = vswitch.vlan, "Created vSwitch");

        data.merge(vswitch_attributes(&vswitch));
        if !desired.is_empty() {
            // The id stays set so the host keeps tracking the new vSwitch.
            if let Err(diagnostic) =
                attach(api, vswitch.id, desired.iter().copied().collect()).await
            {
                set_servers(data, &BTreeSet::new());
                return Err(diagnostic);
            }
        }
        set_servers(data, &desired);
        Ok(())
    }

    async fn read(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let id = vswitch_id(data)?;
        let vswitch = match api.get_vswitch(id).await {
            Ok(vswitch) => vswitch,
            Err(err) if err.is_not_found() => {
                warn!(vswitch_id = %id, "vSwitch not found, removing from state");
                data.clear_id();
                return Ok(());
            }
            Err(err) => {
                return Err(Diagnostic::from_error(
                    format!("Unable to read vSwitch {id}"),
                    &err,
                ))
            }
        };

        if vswitch.cancelled {
            warn!(vswitch_id = %id, "vSwitch is cancelled, removing from state");
            data.clear_id();
            return Ok(());
        }
        data.merge(vswitch_attributes(&vswitch));
        Ok(())
    }

    async fn update(
        &self,
        api: &dyn RobotApi,
        _prior: &ResourceData,
        data: &mut ResourceData,
    ) -> Result<(), Diagnostic> {
        let id = vswitch_id(data)?;
        let request = request(data)?;
        let desired = servers(data)?;

        let live = api
            .get_vswitch(id)
            .await
            .map_err(|err| Diagnostic::from_error(format!("Unable to read vSwitch {id}"), &err))?;

        if live.name != request.name || live.vlan != request.vlan {
            api.update_vswitch(id, &request).await.map_err(|err| {
                Diagnostic::from_error(format!("Unable to update vSwitch {id}"), &err)
            })?;
            info!(vswitch_id = %id, name = %request.name, vlan = request.vlan, "Updated vSwitch");
        }

        let attached: BTreeSet<ServerNumber> =
            live.servers.iter().map(|s| s.server_number).collect();
        let to_remove: Vec<ServerNumber> = attached.difference(&desired).copied().collect();
        let to_add: Vec<ServerNumber> = desired.difference(&attached).copied().collect();

        if !to_remove.is_empty() {
            let count = to_remove.len();
            api.remove_vswitch_servers(id, to_remove)
                .await
                .map_err(|err| {
                    Diagnostic::from_error(
                        format!("Unable to detach servers from vSwitch {id}"),
                        &err,
                    )
                })?;
            info!(vswitch_id = %id, count, "Detached servers from vSwitch");
        }
        if !to_add.is_empty() {
            attach(api, id, to_add).await?;
        }

        data.merge(vswitch_attributes(&live));
        data.set("name", request.name.as_str());
        data.set("vlan", request.vlan);
        set_servers(data, &desired);
        Ok(())
    }

    async fn delete(&self, api: &dyn RobotApi, data: &mut ResourceData) -> Result<(), Diagnostic> {
        let id = vswitch_id(data)?;
        match api.cancel_vswitch(id, CANCELLATION_DATE).await {
            Ok(()) => info!(vswitch_id = %id, "Cancelled vSwitch"),
            Err(err) if err.is_not_found() => {
                warn!(vswitch_id = %id, "vSwitch not found while cancelling");
            }
            Err(err) => {
                return Err(Diagnostic::from_error(
                    format!("Unable to cancel vSwitch {id}"),
                    &err,
                ))
            }
        }
        data.clear_id();
        Ok(())
    }
}

fn vswitch_id(data: &ResourceData) -> Result<VSwitchId, Diagnostic> {
    VSwitchId::parse_str(data.require_id("vSwitch")?)
        .map_err(|err| Diagnostic::from_error("Invalid vSwitch id", &err))
}

fn request(data: &ResourceData) -> Result<VSwitchRequest, Diagnostic> {
    let vlan = data.require_i64("vlan")?;
    let vlan = u16::try_from(vlan).map_err(|_| {
        Diagnostic::error("Invalid VLAN id")
            .with_attribute("vlan")
            .with_detail(format!("{vlan} is out of range"))
    })?;
    Ok(VSwitchRequest {
        name: data.require_str("name")?.to_string(),
        vlan,
    })
}

fn servers(data: &ResourceData) -> Result<BTreeSet<ServerNumber>, Diagnostic> {
    data.get_int_list("servers")
        .into_iter()
        .map(|raw| {
            ServerNumber::try_from(raw).map_err(|err| {
                Diagnostic::from_error("Invalid server number", &err).with_attribute("servers")
            })
        })
        .collect()
}

fn set_servers(data: &mut ResourceData, servers: &BTreeSet<ServerNumber>) {
    let numbers: Vec<u32> = servers.iter().map(|number| number.get()).collect();
    data.set("servers", json!(numbers));
}

async fn attach(
    api: &dyn RobotApi,
    id: VSwitchId,
    servers: Vec<ServerNumber>,
) -> Result<(), Diagnostic> {
    let count = servers.len();
    api.add_vswitch_servers(id, servers).await.map_err(|err| {
        Diagnostic::from_error(format!("Unable to attach servers to vSwitch {id}"), &err)
    })?;
    info!(vswitch_id = %id, count, "Attached servers to vSwitch");
    Ok(())
}
