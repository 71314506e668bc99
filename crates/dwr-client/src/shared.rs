//! Mutex-guarded client handle for use from several tasks.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::client::DwrClient;
use crate::error::DwrError;
use crate::params::Params;

/// Cloneable handle serializing access to one [`DwrClient`].
///
/// Each call holds the lock until response headers arrive, so batch ids
/// are handed out in the order calls acquire the lock.
#[derive(Clone, Debug)]
pub struct SharedDwrClient {
    inner: Arc<Mutex<DwrClient>>,
}

impl SharedDwrClient {
    pub fn new(client: DwrClient) -> Self {
        Self {
            inner: Arc::new(Mutex::new(client)),
        }
    }

    /// See [`DwrClient::request`].
    pub async fn request(
        &self,
        page: &str,
        script: &str,
        method: &str,
        args: &[&str],
        extra_params: Option<&Params>,
    ) -> Result<reqwest::Response, DwrError> {
        let mut client = self.inner.lock().await;
        client.request(page, script, method, args, extra_params).await
    }

    /// See [`DwrClient::initialize`].
    pub async fn initialize(&self) -> Result<(), DwrError> {
        self.inner.lock().await.initialize().await
    }

    pub async fn session_id(&self) -> String {
        self.inner.lock().await.session_id()
    }

    pub async fn batch_id(&self) -> u64 {
        self.inner.lock().await.batch_id()
    }

    /// Recover the client if this is the last handle.
    pub fn try_unwrap(self) -> Result<DwrClient, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<DwrClient> for SharedDwrClient {
    fn from(client: DwrClient) -> Self {
        Self::new(client)
    }
}
