// Session-cookie authenticated HTTP client for the appliance.
//
// Wraps `reqwest::Client` with APS-specific login handling and runs every
// reply through the response classifier. One `ApsSession` is one login
// session: Unauthenticated -> Authenticated -> Closed, never reused across
// invocations.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::response::classify;
use crate::transport::TransportConfig;

/// Login endpoint, special-cased because failure is signalled by a
/// re-rendered HTML login form rather than an error status.
pub const LOGIN_ENDPOINT: &str = "/platform/login";
/// Logout endpoint.
pub const LOGOUT_ENDPOINT: &str = "/platform/logout";

/// Marker text present in the classifier's message when the appliance
/// answered a login attempt by re-rendering the login page, i.e. the
/// credentials were rejected. The appliance offers no structured failure
/// signal for this case.
const LOGIN_PAGE_MARKER: &str = "Username\nPassword\nLog In\n";

/// HTTP verbs the appliance API uses.
///
/// A closed enum: an unsupported verb is unrepresentable rather than a
/// runtime lookup failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings for one appliance, immutable after load.
#[derive(Debug, Clone)]
pub struct Credentials {
    server_url: String,
    username: String,
    password: SecretString,
    verify_tls: bool,
}

impl Credentials {
    /// Build credentials; any trailing slashes on the server URL are
    /// stripped so endpoint paths can be appended verbatim.
    pub fn new(
        server_url: &str,
        username: impl Into<String>,
        password: SecretString,
        verify_tls: bool,
    ) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_owned(),
            username: username.into(),
            password,
            verify_tls,
        }
    }

    /// The appliance base URL, without a trailing slash.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Unauthenticated,
    Authenticated,
    Closed,
}

/// One authenticated session against the appliance.
pub struct ApsSession {
    http: reqwest::Client,
    credentials: Credentials,
    state: SessionState,
}

impl ApsSession {
    /// Create an unauthenticated session. Call [`ApsSession::login`] before
    /// issuing requests.
    pub fn new(credentials: Credentials) -> Result<Self, Error> {
        let http = TransportConfig::new(credentials.verify_tls)
            .with_cookie_jar()
            .build_client()?;
        Ok(Self {
            http,
            credentials,
            state: SessionState::Unauthenticated,
        })
    }

    /// Whether login has succeeded and the session is still open.
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Authenticate against `/platform/login` with form-encoded credentials.
    ///
    /// The appliance answers a bad login with HTTP 200 and a re-rendered
    /// HTML login form, so success requires both status 200 and the absence
    /// of the login-page marker from the classified message. The classifier
    /// still runs on every reply for its diagnostics.
    pub async fn login(&mut self) -> Result<(), Error> {
        // Fresh client and cookie jar per login; the appliance issues a new
        // session cookie each time.
        self.http = TransportConfig::new(self.credentials.verify_tls)
            .with_cookie_jar()
            .build_client()?;
        self.state = SessionState::Unauthenticated;

        let url = format!("{}{}", self.credentials.server_url, LOGIN_ENDPOINT);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.expose_secret()),
            ])
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = response.status().as_u16();
        let content_type = content_type_of(&response);
        let body = response.text().await.map_err(Error::Transport)?;
        let outcome = classify(status, content_type.as_deref(), &body);

        match (status, outcome) {
            (200, Err(err)) if err.to_string().contains(LOGIN_PAGE_MARKER) => {
                Err(Error::Authentication {
                    message: "Invalid Credentials".to_owned(),
                })
            }
            // Any other 200 counts as a successful login, classifier
            // verdict notwithstanding.
            (200, _) | (_, Ok(_)) => {
                self.state = SessionState::Authenticated;
                debug!("login successful");
                Ok(())
            }
            (_, Err(err)) => Err(err),
        }
    }

    /// Issue an authenticated request and classify the reply.
    ///
    /// `endpoint` is appended to the configured base URL; `query` entries
    /// become URL query parameters. DELETE replies with status 204 carry no
    /// body to classify and short-circuit to a null payload.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<&[(&str, &str)]>,
    ) -> Result<Value, Error> {
        if self.state != SessionState::Authenticated {
            return Err(Error::Authentication {
                message: "session is not authenticated".to_owned(),
            });
        }

        let url = format!("{}{}", self.credentials.server_url, endpoint);
        debug!("{} {}", method, url);

        let mut request = match method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Put => self.http.put(&url),
            Method::Delete => self.http.delete(&url),
        };
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await.map_err(Error::Transport)?;
        let status = response.status().as_u16();

        if method == Method::Delete && status == 204 {
            return Ok(Value::Null);
        }

        let content_type = content_type_of(&response);
        let body = response.text().await.map_err(Error::Transport)?;
        classify(status, content_type.as_deref(), &body)
    }

    /// End the session via `/platform/logout`.
    ///
    /// The session transitions to Closed whatever the outcome; a failure is
    /// returned so the caller can report it, but the session is gone either
    /// way.
    pub async fn logout(&mut self) -> Result<(), Error> {
        let result = self.request(Method::Post, LOGOUT_ENDPOINT, None).await;
        self.state = SessionState::Closed;
        result.map(|_| ())
    }
}

fn content_type_of(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
