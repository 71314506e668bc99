//! # DWR Client
//!
//! Client for Direct Web Remoting (DWR) endpoints.
//!
//! A [`DwrClient`] performs the `__System.generateId` handshake to obtain a
//! server session token, derives the script session id from it, and then
//! encodes remote calls as `plaincall` POST requests. Reply payloads are
//! returned untouched as [`reqwest::Response`]s; interpreting the
//! `handleCallback(...)` script is left to the caller.
//!
//! ```no_run
//! use dwr_client::{DwrClient, Params};
//!
//! # async fn run() -> Result<(), dwr_client::DwrError> {
//! let base: Params = [("callCount", "1"), ("c0-id", "0")].into_iter().collect();
//! let mut client = DwrClient::new("https://example.com/app", base).await?;
//!
//! let extra: Params = [("c0-param0", "string:42")].into_iter().collect();
//! let response = client
//!     .request("index.html", "MySvcAjax", "getData", &[], Some(&extra))
//!     .await?;
//! println!("{}", response.text().await?);
//! # Ok(())
//! # }
//! ```

mod client;
mod cookies;
mod error;
mod params;
mod session;
mod shared;

pub use client::{DwrClient, DwrClientBuilder, GENERATE_ID_METHOD, SYSTEM_SCRIPT};
pub use cookies::PublicSuffixJar;
pub use error::DwrError;
pub use params::Params;
pub use session::{
    is_cookie_value, tokenify, CallbackTokenExtractor, ScriptSessionId, SessionTokenExtractor,
    SESSION_COOKIE_NAME,
};
pub use shared::SharedDwrClient;
