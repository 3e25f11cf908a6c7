//! Asynchronous Robot client implementation.

use crate::Result;
use hrobot_core::client::ClientConfig;
use hrobot_core::config::RobotConfig;
use hrobot_core::{ApiError, Error};
use reqwest::header::ACCEPT;
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("hrobot-api/", env!("CARGO_PKG_VERSION"));

/// Reads answer 200, asynchronous changes (firewall) may answer 202.
pub(crate) const OK_OR_ACCEPTED: &[StatusCode] = &[StatusCode::OK, StatusCode::ACCEPTED];

/// Plain success.
pub(crate) const OK: &[StatusCode] = &[StatusCode::OK];

/// Object creation.
pub(crate) const CREATED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];

#[derive(Debug)]
struct Credentials {
    username: String,
    password: SecretString,
}

/// Builder for [`RobotClient`].
#[derive(Debug, Clone)]
pub struct RobotClientBuilder {
    base_url: Url,
    http_config: ClientConfig,
    credentials: Option<Arc<Credentials>>,
}

impl RobotClientBuilder {
    /// Create a new builder with the provided Robot base URL.
    ///
    /// The URL should include the protocol and hostname (e.g. `https://robot-ws.your-server.de`).
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let mut url = Url::parse(base_url.as_ref()).map_err(|err| {
            Error::ConfigError(format!(
                "Invalid Robot base URL `{}`: {err}",
                base_url.as_ref()
            ))
        })?;

        // Relative joins replace the last segment unless the path ends in a slash.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            base_url: url,
            http_config: ClientConfig::new(),
            credentials: None,
        })
    }

    /// Create a builder from resolved connection settings.
    pub fn from_config(config: &RobotConfig) -> Result<Self> {
        Ok(Self::new(&config.url)?
            .with_basic_auth(config.username.clone(), config.expose_password()))
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Configure HTTP basic authentication.
    #[must_use]
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password: String = password.into();
        self.credentials = Some(Arc::new(Credentials {
            username: username.into(),
            password: SecretString::from(password),
        }));
        self
    }

    /// Build the Robot client.
    pub fn build(self) -> Result<RobotClient> {
        let mut builder = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host);

        if let Some(timeout) = self.http_config.timeout {
            builder = builder.timeout(timeout);
        }
        if !self.http_config.enable_compression {
            builder = builder.no_gzip();
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build Robot HTTP client: {err}"))
        })?;

        Ok(RobotClient {
            http,
            base_url: self.base_url,
            credentials: self.credentials,
            log_requests: self.http_config.enable_logging,
        })
    }
}

/// Asynchronous Robot web service client.
///
/// Cloning is cheap; clones share the connection pool and credentials.
#[derive(Clone)]
pub struct RobotClient {
    http: Client,
    base_url: Url,
    credentials: Option<Arc<Credentials>>,
    log_requests: bool,
}

impl RobotClient {
    /// Create a new client for the given base URL without credentials.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        RobotClientBuilder::new(base_url)?.build()
    }

    /// Create an authenticated client from resolved connection settings.
    pub fn from_config(config: &RobotConfig) -> Result<Self> {
        RobotClientBuilder::from_config(config)?.build()
    }

    /// Access the underlying base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let normalized = path.strip_prefix('/').unwrap_or(path);

        self.base_url
            .join(normalized)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid Robot path `{path}`: {err}")))
    }

    /// Perform one round trip and return the body if the status is accepted.
    pub(crate) async fn execute(
        &self,
        method: Method,
        path: &str,
        form: Option<&[(String, String)]>,
        accepted: &[StatusCode],
    ) -> Result<String> {
        let url = self.build_url(path)?;
        let mut request = self.http.request(method.clone(), url);

        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(
                &credentials.username,
                Some(credentials.password.expose_secret()),
            );
        }
        request = request.header(ACCEPT, "application/json");

        if let Some(fields) = form {
            request = request.form(fields);
        }

        if self.log_requests {
            info!(%method, path, "Robot request");
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(%method, path, status = status.as_u16(), "Robot response");

        if accepted.contains(&status) {
            Ok(body)
        } else {
            Err(map_status_to_error(status, &body))
        }
    }

    pub(crate) async fn get_json<R>(&self, path: &str, accepted: &[StatusCode]) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let body = self.execute(Method::GET, path, None, accepted).await?;
        decode(path, &body)
    }

    pub(crate) async fn send_form<R>(
        &self,
        method: Method,
        path: &str,
        form: &[(String, String)],
        accepted: &[StatusCode],
    ) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let body = self.execute(method, path, Some(form), accepted).await?;
        decode(path, &body)
    }

    /// Send a request whose response carries no payload of interest.
    pub(crate) async fn send_form_discarding(
        &self,
        method: Method,
        path: &str,
        form: &[(String, String)],
        accepted: &[StatusCode],
    ) -> Result<()> {
        self.execute(method, path, Some(form), accepted)
            .await
            .map(|_| ())
    }
}

/// Decode a response body, naming the endpoint in the error.
pub(crate) fn decode<R>(path: &str, body: &str) -> Result<R>
where
    R: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|err| {
        Error::DecodeError(format!("unexpected response body for `{path}`: {err}"))
    })
}

fn map_status_to_error(status: StatusCode, body: &str) -> Error {
    let error = ApiError::from_response(status.as_u16(), body);
    if status.is_server_error() {
        warn!(status = error.status, code = ?error.code, "Robot server error");
    }
    Error::Api(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{basic_auth, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn builder_normalizes_base_path() {
        let client = RobotClient::new("http://robot.local/api").unwrap();
        assert_eq!(client.base_url().as_str(), "http://robot.local/api/");
        assert_eq!(
            client.build_url("/server/1").unwrap().as_str(),
            "http://robot.local/api/server/1"
        );
    }

    #[test]
    fn builder_rejects_invalid_url() {
        let err = RobotClientBuilder::new("robot.local").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn builder_accepts_http_config() {
        let client = RobotClientBuilder::new("https://robot-ws.your-server.de")
            .unwrap()
            .with_http_config(
                ClientConfig::new()
                    .with_timeout(Duration::from_secs(5))
                    .with_logging(false),
            )
            .build()
            .unwrap();
        assert!(!client.log_requests);
    }

    #[tokio::test]
    async fn execute_sends_basic_auth_and_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/server/321"))
            .and(basic_auth("robot-user", "secret"))
            .and(header("accept", "application/json"))
            .and(body_string("server_name=web+2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = RobotClientBuilder::new(server.uri())
            .unwrap()
            .with_basic_auth("robot-user", "secret")
            .build()
            .unwrap();
        let form = vec![("server_name".to_string(), "web 2".to_string())];
        let body = client
            .execute(Method::POST, "server/321", Some(&form), OK)
            .await
            .unwrap();
        assert_eq!(body, "{}");
    }

    #[tokio::test]
    async fn execute_rejects_status_outside_accepted_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/server"))
            .respond_with(ResponseTemplate::new(201).set_body_string("[]"))
            .mount(&server)
            .await;

        let client = RobotClient::new(server.uri()).unwrap();
        let err = client
            .execute(Method::GET, "server", None, OK_OR_ACCEPTED)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(201));
    }

    #[tokio::test]
    async fn execute_parses_vendor_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/server/9"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"status": 401, "code": "UNAUTHORIZED", "message": "Unauthorized"}
            })))
            .mount(&server)
            .await;

        let client = RobotClient::new(server.uri()).unwrap();
        let err = client
            .execute(Method::GET, "server/9", None, OK)
            .await
            .unwrap_err();
        match err {
            Error::Api(api) => {
                assert_eq!(api.status, 401);
                assert_eq!(api.code.as_deref(), Some("UNAUTHORIZED"));
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn decode_names_the_endpoint() {
        let err = decode::<serde_json::Value>("server", "{truncated").unwrap_err();
        match err {
            Error::DecodeError(message) => assert!(message.contains("`server`")),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
