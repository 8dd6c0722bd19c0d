//! Client for a production-tracking HTTP service using the FNAUTH
//! request-signing scheme.
//!
//! The crate centers on a credential session: an explicit
//! `authenticate` call exchanges login/password for a short-lived
//! access key/secret pair, and every subsequent request is signed with
//! HMAC-SHA256 over a canonical representation of the request. Tokens
//! within two hours of expiry are refreshed transparently, with
//! concurrent callers sharing a single refresh.
//!
//! # Quick Start (async)
//!
//! ```no_run
//! use fntrack::{Client, RevisionLocator};
//!
//! # async fn example() -> fntrack::Result<()> {
//! let client = Client::new()?;
//! client
//!     .authenticate("https://track.example.com", "artist", "hunter2")
//!     .await?;
//!
//! let revision = client
//!     .sequence_revision(&RevisionLocator::new(1, 2, 1))
//!     .await?;
//! println!("comment: {:?}", revision.comment);
//! # Ok(())
//! # }
//! ```
//!
//! Callers hitting endpoints this client does not wrap can obtain the
//! signed header set directly:
//!
//! ```no_run
//! use fntrack::{Client, Content};
//!
//! # async fn example() -> fntrack::Result<()> {
//! # let client = Client::new()?;
//! let headers = client
//!     .signed_headers("GET", "/show/1/sequence/2/revision/1", &Content::Empty)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod session;
pub mod sign;

#[cfg(feature = "blocking")]
pub mod blocking;

mod exec;
mod headers;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use request::{NewSequenceRevision, PanelLocator, RevisionLocator, RevisionedPanel};
pub use response::{Dialogue, Panel, RevisionMeta, SequenceRevision};
pub use session::{Identity, Token};
pub use sign::Content;

// Compile-time assertions: key types must be Send + Sync for use across threads.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<Client>;
    let _ = assert_send_sync::<ClientError>;
    let _ = assert_send_sync::<Token>;
};
