//! vSwitch endpoints (`/vswitch`).

use crate::client::{RobotClient, CREATED, OK};
use crate::models::{VSwitch, VSwitchRequest, VSwitchSummary};
use crate::Result;
use hrobot_core::form::FormParams;
use hrobot_core::ids::{ServerNumber, VSwitchId};
use reqwest::Method;

impl RobotClient {
    /// List every vSwitch of the account.
    pub async fn list_vswitches(&self) -> Result<Vec<VSwitchSummary>> {
        self.get_json("vswitch", OK).await
    }

    /// Fetch a vSwitch with its attached servers, subnets and cloud networks.
    pub async fn get_vswitch(&self, id: VSwitchId) -> Result<VSwitch> {
        let path = format!("vswitch/{id}");
        self.get_json(&path, OK).await
    }

    /// Create a vSwitch.
    pub async fn create_vswitch(&self, request: &VSwitchRequest) -> Result<VSwitch> {
        self.send_form(Method::POST, "vswitch", &request.to_form(), CREATED)
            .await
    }

    /// Change the name and VLAN of a vSwitch.
    pub async fn update_vswitch(&self, id: VSwitchId, request: &VSwitchRequest) -> Result<()> {
        let path = format!("vswitch/{id}");
        self.send_form_discarding(Method::POST, &path, &request.to_form(), CREATED)
            .await
    }

    /// Cancel a vSwitch at `cancellation_date` (`now` or `YYYY-MM-DD`).
    pub async fn cancel_vswitch(&self, id: VSwitchId, cancellation_date: &str) -> Result<()> {
        let path = format!("vswitch/{id}");
        let mut form = FormParams::new();
        form.push("cancellation_date", cancellation_date);
        self.send_form_discarding(Method::DELETE, &path, &form.into_pairs(), OK)
            .await
    }

    /// Attach servers to a vSwitch.
    pub async fn add_vswitch_servers(&self, id: VSwitchId, servers: &[ServerNumber]) -> Result<()> {
        let path = format!("vswitch/{id}/server");
        self.send_form_discarding(Method::POST, &path, &server_form(servers), CREATED)
            .await
    }

    /// Detach servers from a vSwitch.
    pub async fn remove_vswitch_servers(
        &self,
        id: VSwitchId,
        servers: &[ServerNumber],
    ) -> Result<()> {
        let path = format!("vswitch/{id}/server");
        self.send_form_discarding(Method::DELETE, &path, &server_form(servers), OK)
            .await
    }
}

fn server_form(servers: &[ServerNumber]) -> Vec<(String, String)> {
    let mut form = FormParams::new();
    form.push_all("server", servers);
    form.into_pairs()
}
