//! Rust client for the Plurk API.
//!
//! Log in with [`PlurkClient::login`], then read timelines, post plurks and
//! responses, and answer friend requests. Permalinks resolve to plurk ids
//! offline with [`permalink_to_plurk_id`].
//!
//! ```no_run
//! use plurk::{Credentials, PlurkClient, PlurkConfig, TimeWindow, permalink_to_plurk_id};
//!
//! # async fn run() -> plurk::Result<()> {
//! let client = PlurkClient::new(PlurkConfig::new())?;
//! let me = client.login(&Credentials::new("johndoe", "secret!")).await?;
//!
//! let plurks = client.get_plurks(me.id, TimeWindow::all()).await?;
//! client.add_plurk("en", "is", "tired (:").await?;
//!
//! let plurk_id = permalink_to_plurk_id("https://www.plurk.com/p/ajd4")?;
//! let responses = client.get_responses(plurk_id).await?;
//! # let _ = (plurks, responses);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
pub mod cookie;
mod endpoints;
pub mod error;
pub mod params;
pub mod permalink;
mod session;
mod transport;
pub mod types;

pub use client::PlurkClient;
pub use config::{Credentials, PlurkConfig};
pub use error::{PlurkError, Result};
pub use permalink::{permalink_to_plurk_id, plurk_id_to_permalink};
pub use session::Session;
pub use tokio_util::sync::CancellationToken;
pub use types::*;
