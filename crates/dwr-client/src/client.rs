//! DWR client: session handshake and `plaincall` dispatch.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cookie::Cookie;
use tracing::{debug, error};
use url::Url;

use dwr_config::ClientConfig;

use crate::cookies::PublicSuffixJar;
use crate::error::DwrError;
use crate::params::Params;
use crate::session::{
    is_cookie_value, CallbackTokenExtractor, ScriptSessionId, SessionTokenExtractor,
    SESSION_COOKIE_NAME,
};

/// Script hosting the handshake method.
pub const SYSTEM_SCRIPT: &str = "__System";

/// Handshake method issuing the server session token.
pub const GENERATE_ID_METHOD: &str = "generateId";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for [`DwrClient`].
pub struct DwrClientBuilder {
    base_url: String,
    base_params: Params,
    connect_timeout: Duration,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    token_extractor: Box<dyn SessionTokenExtractor>,
}

impl DwrClientBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            base_params: Params::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: None,
            user_agent: None,
            token_extractor: Box::new(CallbackTokenExtractor::new()),
        }
    }

    /// Add a parameter sent with every call.
    pub fn base_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_params.insert(key, value);
        self
    }

    /// Add several parameters sent with every call.
    pub fn base_params(mut self, params: impl Into<Params>) -> Self {
        self.base_params.merge(&params.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Whole-request timeout enforced by the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Replace the strategy that reads the session token from the handshake reply.
    pub fn token_extractor(mut self, extractor: Box<dyn SessionTokenExtractor>) -> Self {
        self.token_extractor = extractor;
        self
    }

    /// Build an uninitialized client. Calls fail until
    /// [`DwrClient::initialize`] succeeds.
    pub fn build(self) -> Result<DwrClient, DwrError> {
        let base_url = Url::parse(&self.base_url).map_err(|source| {
            error!("Invalid DWR base URL '{}': {}", self.base_url, source);
            DwrError::InvalidBaseUrl {
                url: self.base_url.clone(),
                source,
            }
        })?;

        let cookie_jar = Arc::new(PublicSuffixJar::new());
        let mut http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .cookie_provider(Arc::clone(&cookie_jar))
            .connect_timeout(self.connect_timeout);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            http = http.user_agent(user_agent);
        }
        let http = http.build().map_err(|e| {
            error!("Failed to build DWR HTTP client: {}", e);
            DwrError::HttpClientBuild(e)
        })?;

        Ok(DwrClient {
            http,
            cookie_jar,
            base_url,
            batch_id: 0,
            initialized: false,
            script_session_id: None,
            base_params: self.base_params,
            token_extractor: self.token_extractor,
        })
    }

    /// Build the client and run the session handshake.
    pub async fn connect(self) -> Result<DwrClient, DwrError> {
        let mut client = self.build()?;
        client.initialize().await?;
        Ok(client)
    }
}

/// A DWR client bound to one server and one script session.
///
/// Calls take `&mut self`: the batch counter and session state belong to a
/// single caller at a time. Wrap the client in a
/// [`SharedDwrClient`](crate::SharedDwrClient) to share it between tasks.
pub struct DwrClient {
    http: reqwest::Client,
    cookie_jar: Arc<PublicSuffixJar>,
    base_url: Url,
    batch_id: u64,
    initialized: bool,
    script_session_id: Option<ScriptSessionId>,
    base_params: Params,
    token_extractor: Box<dyn SessionTokenExtractor>,
}

impl fmt::Debug for DwrClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DwrClient")
            .field("base_url", &self.base_url.as_str())
            .field("batch_id", &self.batch_id)
            .field("initialized", &self.initialized)
            .field("script_session_id", &self.session_id())
            .field("base_params", &self.base_params)
            .finish_non_exhaustive()
    }
}

impl DwrClient {
    /// Connect to `base_url` and negotiate a session.
    ///
    /// `base_params` are sent with every call unless a call overrides them.
    pub async fn new(base_url: &str, base_params: Params) -> Result<Self, DwrError> {
        Self::builder(base_url).base_params(base_params).connect().await
    }

    pub fn builder(base_url: impl Into<String>) -> DwrClientBuilder {
        DwrClientBuilder::new(base_url)
    }

    /// Builder preloaded from configuration.
    pub fn builder_from_config(config: &ClientConfig) -> DwrClientBuilder {
        let mut builder = Self::builder(config.base_url.as_str())
            .base_params(config.base_params.clone())
            .connect_timeout(config.connect_timeout());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(ref user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        builder
    }

    /// Connect using configuration and negotiate a session.
    pub async fn from_config(config: &ClientConfig) -> Result<Self, DwrError> {
        Self::builder_from_config(config).connect().await
    }

    /// Underlying HTTP client; cookies are kept in its jar.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn cookie_jar(&self) -> &Arc<PublicSuffixJar> {
        &self.cookie_jar
    }

    /// Current script session id, or an empty string before initialization.
    pub fn session_id(&self) -> String {
        self.script_session_id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn script_session_id(&self) -> Option<&ScriptSessionId> {
        self.script_session_id.as_ref()
    }

    /// Batch id the next call will carry.
    pub fn batch_id(&self) -> u64 {
        self.batch_id
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn base_params(&self) -> &Params {
        &self.base_params
    }

    /// Run the `__System.generateId` handshake.
    ///
    /// Resets the batch counter, derives a new script session id and stores
    /// the server token as the `DWRSESSIONID` cookie. On failure the client
    /// is left uninitialized.
    pub async fn initialize(&mut self) -> Result<(), DwrError> {
        self.batch_id = 0;
        // The handshake itself goes through `request`, which requires this flag.
        self.initialized = true;

        match self.handshake().await {
            Ok(session) => {
                debug!(
                    "DWR session established: batch_id={}, page_id={}",
                    self.batch_id,
                    session.page_id()
                );
                self.script_session_id = Some(session);
                Ok(())
            }
            Err(e) => {
                self.initialized = false;
                self.script_session_id = None;
                Err(e)
            }
        }
    }

    async fn handshake(&mut self) -> Result<ScriptSessionId, DwrError> {
        let response = self
            .request("", SYSTEM_SCRIPT, GENERATE_ID_METHOD, &[], None)
            .await?;
        let body = response.text().await?;

        // The token doubles as a cookie value, so it must survive the
        // cookie header unchanged.
        let token = self
            .token_extractor
            .extract(&body)
            .filter(|token| is_cookie_value(token))
            .ok_or(DwrError::SessionTokenNotFound)?;

        let cookie = Cookie::new(SESSION_COOKIE_NAME, token);
        self.cookie_jar.add_cookie(&cookie, &self.base_url);

        Ok(ScriptSessionId::generate(token))
    }

    /// Send `script.method` as a `plaincall` POST and return the raw response.
    ///
    /// `extra_params` override base parameters, which override the generated
    /// `page`, `batchId`, `scriptSessionId`, `c0-scriptName` and
    /// `c0-methodName`. Positional `args` are not encoded; pass arguments as
    /// `c0-paramN` entries in `extra_params`.
    ///
    /// The batch counter advances only when the transport returns a response.
    pub async fn request(
        &mut self,
        page: &str,
        script: &str,
        method: &str,
        _args: &[&str],
        extra_params: Option<&Params>,
    ) -> Result<reqwest::Response, DwrError> {
        if !self.initialized {
            return Err(DwrError::NotInitialized);
        }

        let params = self.build_params(page, script, method, extra_params);
        let url = self.call_url(script, method);
        debug!("DWR call: url={}, batch_id={}", url, self.batch_id);

        let response = self.http.post(&url).body(params.encode()).send().await?;

        self.batch_id += 1;
        Ok(response)
    }

    fn build_params(
        &self,
        page: &str,
        script: &str,
        method: &str,
        extra_params: Option<&Params>,
    ) -> Params {
        let mut params = Params::new();
        params.insert("page", page.replace('/', "%2F"));
        params.insert("batchId", self.batch_id.to_string());
        params.insert("scriptSessionId", self.session_id());
        params.insert("c0-scriptName", script);
        params.insert("c0-methodName", method);

        params.merge(&self.base_params);
        if let Some(extra) = extra_params {
            params.merge(extra);
        }
        params
    }

    fn call_url(&self, script: &str, method: &str) -> String {
        format!(
            "{}/dwr/call/plaincall/{}.{}.dwr",
            self.base_url.as_str().trim_end_matches('/'),
            script,
            method
        )
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
