//! Provider registry and lifecycle dispatch.
//!
//! The [`Provider`] owns the type tables and, once configured, the shared
//! client handle. Every dispatch validates its input against the registered
//! schema before the handler runs.

use crate::api::RobotApi;
use crate::data_sources::{self, DataSource};
use crate::diagnostics::{has_errors, Diagnostic};
use crate::resources::{self, Resource};
use crate::schema::{Attribute, Schema};
use crate::state::{AttributeMap, ResourceData};
use hrobot_api::RobotClient;
use hrobot_core::config::{RobotConfig, DEFAULT_URL, PASSWORD_ENV, URL_ENV, USERNAME_ENV};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a dispatched call.
pub type DispatchResult<T> = std::result::Result<T, Vec<Diagnostic>>;

/// Failed create.
///
/// `state` is set when the handler failed after the upstream object was
/// created; the host must record it so the object can be refreshed or
/// destroyed later.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateError {
    /// Partial state carrying the new id, if any.
    pub state: Option<ResourceData>,
    /// What went wrong.
    pub diagnostics: Vec<Diagnostic>,
}

impl From<Vec<Diagnostic>> for CreateError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            state: None,
            diagnostics,
        }
    }
}

/// Provider registry.
pub struct Provider {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
    api: Option<Arc<dyn RobotApi>>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .field("configured", &self.api.is_some())
            .finish()
    }
}

impl Provider {
    /// Registry with every resource and data source, not yet configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resources: resources::all()
                .into_iter()
                .map(|resource| (resource.type_name(), resource))
                .collect(),
            data_sources: data_sources::all()
                .into_iter()
                .map(|source| (source.type_name(), source))
                .collect(),
            api: None,
        }
    }

    /// Use `api` instead of building a client in [`Provider::configure`].
    #[must_use]
    pub fn with_api(mut self, api: Arc<dyn RobotApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Schema of the provider block.
    #[must_use]
    pub fn config_schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "username",
                Attribute::optional_string()
                    .with_env_default(USERNAME_ENV)
                    .with_description("Robot web service username"),
            )
            .with_attribute(
                "password",
                Attribute::optional_string()
                    .sensitive()
                    .with_env_default(PASSWORD_ENV)
                    .with_description("Robot web service password"),
            )
            .with_attribute(
                "url",
                Attribute::optional_string()
                    .with_env_default(URL_ENV)
                    .with_default(DEFAULT_URL)
                    .with_description("Robot web service base URL"),
            )
    }

    /// Registered resource type names.
    #[must_use]
    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// Registered data source type names.
    #[must_use]
    pub fn data_source_types(&self) -> Vec<&'static str> {
        self.data_sources.keys().copied().collect()
    }

    /// Schema of a resource type.
    #[must_use]
    pub fn resource_schema(&self, type_name: &str) -> Option<Schema> {
        self.resources.get(type_name).map(|resource| resource.schema())
    }

    /// Schema of a data source type.
    #[must_use]
    pub fn data_source_schema(&self, type_name: &str) -> Option<Schema> {
        self.data_sources.get(type_name).map(|source| source.schema())
    }

    /// Whether a client handle is available.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api.is_some()
    }

    /// Configure from the provider block, defaulting from the process environment.
    pub fn configure(&mut self, config: Value) -> Vec<Diagnostic> {
        self.configure_with(config, |name| std::env::var(name).ok())
    }

    /// Configure from the provider block, defaulting through `lookup`.
    pub fn configure_with<F>(&mut self, config: Value, lookup: F) -> Vec<Diagnostic>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = match into_attributes(config) {
            Ok(values) => values,
            Err(diagnostic) => return vec![diagnostic],
        };

        let schema = Self::config_schema();
        schema.apply_defaults(&mut values, lookup);
        let mut diagnostics = schema.validate_config(&values);
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        let setting = |name: &str| {
            values
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let config = match RobotConfig::new(setting("username"), setting("password"), setting("url"))
        {
            Ok(config) => config,
            Err(err) => {
                diagnostics.push(Diagnostic::from_error("Invalid provider configuration", &err));
                return diagnostics;
            }
        };

        match RobotClient::from_config(&config) {
            Ok(client) => {
                info!(url = %config.url, username = %config.username, "Configured Robot client");
                self.api = Some(Arc::new(client));
            }
            Err(err) => {
                diagnostics.push(Diagnostic::from_error("Unable to create Robot client", &err));
            }
        }
        diagnostics
    }

    fn api(&self) -> DispatchResult<&dyn RobotApi> {
        self.api.as_deref().ok_or_else(|| {
            vec![Diagnostic::error("Provider not configured")
                .with_detail("configure must succeed before resources are managed")]
        })
    }

    fn resource(&self, type_name: &str) -> DispatchResult<&dyn Resource> {
        self.resources
            .get(type_name)
            .map(Box::as_ref)
            .ok_or_else(|| vec![unknown_type("resource", type_name)])
    }

    fn data_source(&self, type_name: &str) -> DispatchResult<&dyn DataSource> {
        self.data_sources
            .get(type_name)
            .map(Box::as_ref)
            .ok_or_else(|| vec![unknown_type("data source", type_name)])
    }

    /// Check a resource configuration without calling the API.
    #[must_use]
    pub fn validate_resource_config(&self, type_name: &str, config: &Value) -> Vec<Diagnostic> {
        match self.resource(type_name) {
            Ok(resource) => match prepare_config(&resource.schema(), config.clone()) {
                Ok(_) => Vec::new(),
                Err(diagnostics) => diagnostics,
            },
            Err(diagnostics) => diagnostics,
        }
    }

    /// Create a resource from its configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`CreateError`] whose `state` is set if the upstream object
    /// exists despite the failure.
    pub async fn create(
        &self,
        type_name: &str,
        config: Value,
    ) -> std::result::Result<ResourceData, CreateError> {
        let resource = self.resource(type_name)?;
        let mut data = prepare_config(&resource.schema(), config)?;
        let api = self.api()?;

        debug!(type_name, "Dispatching create");
        match resource.create(api, &mut data).await {
            Ok(()) => Ok(data),
            Err(diagnostic) => {
                if let Some(id) = data.id() {
                    warn!(type_name, id, "Create failed after the object was created upstream");
                }
                Err(CreateError {
                    state: data.id().is_some().then_some(data),
                    diagnostics: vec![diagnostic],
                })
            }
        }
    }

    /// Refresh a resource. The returned state has no id if the object is gone.
    pub async fn read(&self, type_name: &str, state: ResourceData) -> DispatchResult<ResourceData> {
        let resource = self.resource(type_name)?;
        let mut data = check_state(&resource.schema(), state)?;
        let api = self.api()?;

        debug!(type_name, id = ?data.id(), "Dispatching read");
        resource.read(api, &mut data).await.map_err(|d| vec![d])?;
        Ok(data)
    }

    /// Move a resource from `prior` state to a new configuration.
    ///
    /// The id and any computed attributes the configuration leaves unset are
    /// carried over from `prior`.
    pub async fn update(
        &self,
        type_name: &str,
        prior: ResourceData,
        config: Value,
    ) -> DispatchResult<ResourceData> {
        let resource = self.resource(type_name)?;
        let schema = resource.schema();
        let prior = check_state(&schema, prior)?;
        let mut data = prepare_config(&schema, config)?;

        let id = prior
            .require_id(type_name)
            .map_err(|d| vec![d])?
            .to_string();
        data.set_id(id);
        for (name, attribute) in &schema.attributes {
            if attribute.computed && data.get(name).is_none() {
                if let Some(value) = prior.get(name) {
                    data.set(name.clone(), value.clone());
                }
            }
        }

        let api = self.api()?;
        debug!(type_name, id = ?data.id(), "Dispatching update");
        resource
            .update(api, &prior, &mut data)
            .await
            .map_err(|d| vec![d])?;
        Ok(data)
    }

    /// Delete a resource.
    pub async fn delete(&self, type_name: &str, state: ResourceData) -> DispatchResult<()> {
        let resource = self.resource(type_name)?;
        let mut data = check_state(&resource.schema(), state)?;
        let api = self.api()?;

        debug!(type_name, id = ?data.id(), "Dispatching delete");
        resource.delete(api, &mut data).await.map_err(|d| vec![d])
    }

    /// Read a data source from its configuration.
    pub async fn read_data_source(
        &self,
        type_name: &str,
        config: Value,
    ) -> DispatchResult<ResourceData> {
        let source = self.data_source(type_name)?;
        let mut data = prepare_config(&source.schema(), config)?;
        let api = self.api()?;

        debug!(type_name, "Dispatching data source read");
        source.read(api, &mut data).await.map_err(|d| vec![d])?;
        Ok(data)
    }
}

fn unknown_type(kind: &str, type_name: &str) -> Diagnostic {
    Diagnostic::error(format!("Unknown {kind} type"))
        .with_detail(format!("`{type_name}` is not provided by hetzner-robot"))
}

fn into_attributes(value: Value) -> Result<AttributeMap, Diagnostic> {
    ResourceData::from_value(value).map(|data| data.attributes().clone())
}

/// Apply static defaults to a user configuration and validate it.
fn prepare_config(schema: &Schema, config: Value) -> DispatchResult<ResourceData> {
    let mut values = into_attributes(config).map_err(|d| vec![d])?;
    schema.apply_defaults(&mut values, |_| None);
    let diagnostics = schema.validate_config(&values);
    if has_errors(&diagnostics) {
        return Err(diagnostics);
    }
    Ok(ResourceData::from_attributes(values))
}

/// Validate stored state, which may carry computed attributes.
fn check_state(schema: &Schema, state: ResourceData) -> DispatchResult<ResourceData> {
    let diagnostics = schema.validate(state.attributes());
    if has_errors(&diagnostics) {
        return Err(diagnostics);
    }
    Ok(state)
}
