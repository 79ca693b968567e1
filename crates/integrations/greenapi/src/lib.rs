//! Green-API WhatsApp transport for Herald.
//!
//! This crate implements the [`Transport`](herald_transport::Transport) trait,
//! delivering group and contact messages through the
//! [Green-API](https://green-api.com/en/docs/api/) `sendMessage` and
//! `sendFileByUrl` methods.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use herald_greenapi::{GreenApiConfig, GreenApiTransport};
//!
//! let config = GreenApiConfig::new("1101000001", "api-token")
//!     .with_api_base_url("https://7103.api.greenapi.com");
//! let transport = GreenApiTransport::new(config).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use config::GreenApiConfig;
pub use error::GreenApiError;
pub use transport::GreenApiTransport;
pub use types::{SendFileByUrlRequest, SendMessageRequest, SendResponse, StateInstanceResponse};
