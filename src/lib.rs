//! # Builderport - MikkiMUD Builder Port Client
//!
//! Builderport is an asynchronous client for the MikkiMUD "builder port":
//! a line-oriented, base64-armored, transactional text protocol spoken over
//! TCP for reading and mutating the MUD's world database (rooms, exits,
//! extra descriptions).
//!
//! ## Features
//!
//! - **Typed world snapshots**: rooms, exits, extra descriptions, and zone
//!   catalogs decoded from bulk `DATA` replies.
//! - **Transactional writes**: mutations are batched in server-side
//!   transactions scoped to zone sets, with exactly-once commit-or-abort.
//! - **Armored text**: free-form fields travel as base64 tokens so embedded
//!   newlines and world-file terminators never break the wire framing.
//! - **Async design**: built on Tokio; commands on a session are strictly
//!   serialized with no pipelining.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use builderport::client::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut session = Session::new("127.0.0.1", 9697, "secret");
//!     session.connect().await?;
//!
//!     let catalog = session.list_zones().await?;
//!     println!("{} zones", catalog.count);
//!
//!     session.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`client`] - session lifecycle, line transport, armor codec, transactions
//! - [`world`] - typed room/exit/zone snapshots and the direction tables
//! - [`config`] - TOML configuration and bearer-token discovery
//! - [`logutil`] - log sanitization helpers

pub mod client;
pub mod config;
pub mod logutil;
pub mod world;
