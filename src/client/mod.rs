//! # Builder Port Client
//!
//! Asynchronous client for the MikkiMUD builder port: a line-oriented,
//! base64-armored, transactional text protocol spoken over TCP.
//!
//! ## Session Lifecycle
//!
//! A [`Session`] progresses through several states:
//! 1. **Disconnected** - created cold, no socket bound
//! 2. **Greeted** - TCP connected, server banners consumed
//! 3. **Authenticated** - `hello <token> 1` answered with `OK`
//! 4. **InTransaction** - a [`TransactionScope`] is live
//! 5. **Closed** - `disconnect()` ran
//!
//! ## Usage
//!
//! ```rust,no_run
//! use builderport::client::Session;
//! use builderport::world::RoomPatch;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut session = Session::new("127.0.0.1", 9697, "secret");
//!     session.connect().await?;
//!
//!     let room = session.get_room(1204).await?;
//!     println!("{room:?}");
//!
//!     let mut tx = session.transaction(&[12]).await?;
//!     let outcome = tx
//!         .room_patch(1204, &RoomPatch::default().name("A hallway"))
//!         .await;
//!     tx.finish(outcome).await?;
//!
//!     session.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Ordering
//!
//! Commands on one session are strictly serialized: each command's full
//! reply (single-line, or bulk through `END`) is consumed before the next
//! command is sent. One logical task owns a session at a time; a cancelled
//! operation leaves the wire position unknown and the session should be
//! torn down.

pub mod armor;
pub mod errors;
mod records;
pub mod transaction;
pub mod transport;

use std::time::Duration;

use log::{debug, info};
use tokio::time::timeout;

pub use errors::{BuilderPortError, Result};
pub use transaction::TransactionScope;
pub use transport::LineTransport;

use crate::logutil::escape_log;
use crate::world::{zone_of, Room, ZoneCatalog};
use records::DataRecord;

/// Default builder port endpoint.
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9697;

/// Protocol version sent in the `hello` command.
const PROTO_VERSION: u32 = 1;

/// Banner markers that identify greeting lines at connect time.
const PRODUCT_TAG: &str = "mikkimud";
const STATUS_PORT_TAG: &str = "status port";

/// The greeting preamble is at most this many lines.
const MAX_GREETING_LINES: usize = 5;

/// How long to wait for another greeting line before deciding the preamble
/// is over. Servers that send fewer than five banners then go quiet.
const GREETING_POLL: Duration = Duration::from_millis(750);

/// How many lines to read, skipping empties, when hunting for a reply.
const MAX_REPLY_SKIP: usize = 3;

/// Connection lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Greeted,
    Authenticated,
    InTransaction,
    Closed,
}

/// A live, possibly-authenticated builder port connection.
///
/// Holds the transport handles, the bearer token, and the lifecycle state.
/// Token discovery belongs to the caller (see [`crate::config`]); the
/// session takes the token as an explicit parameter.
#[derive(Debug)]
pub struct Session {
    host: String,
    port: u16,
    token: String,
    transport: Option<LineTransport>,
    state: SessionState,
}

impl Session {
    /// Create a cold session. No I/O happens until [`connect`](Self::connect).
    pub fn new(host: impl Into<String>, port: u16, token: impl Into<String>) -> Self {
        Session {
            host: host.into(),
            port,
            token: token.into(),
            transport: None,
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(
            self.state,
            SessionState::Authenticated | SessionState::InTransaction
        )
    }

    /// Open the TCP connection, consume the greeting preamble, and
    /// authenticate with `hello <token> 1`.
    ///
    /// On an authentication failure the session stays in `Greeted`; the
    /// caller may `disconnect()` and retry with a different token.
    pub async fn connect(&mut self) -> Result<()> {
        let mut transport = LineTransport::connect(&self.host, self.port).await?;
        info!("connected to builder port {}:{}", self.host, self.port);
        Self::drain_greeting(&mut transport).await?;
        self.transport = Some(transport);
        self.state = SessionState::Greeted;
        self.authenticate().await
    }

    /// Consume up to five greeting lines. A banner contains the product
    /// name or the phrase "status port" (case-insensitive); the first
    /// non-banner non-empty line ends the preamble, as does a quiet socket.
    async fn drain_greeting(transport: &mut LineTransport) -> Result<()> {
        for _ in 0..MAX_GREETING_LINES {
            let line = match timeout(GREETING_POLL, transport.read_line()).await {
                Err(_) => break, // server went quiet, preamble is over
                Ok(read) => read?,
            };
            if line.is_empty() {
                continue;
            }
            if !Self::is_banner(&line) {
                debug!("end of greeting preamble: {}", escape_log(&line));
                break;
            }
            debug!("greeting banner: {}", escape_log(&line));
        }
        Ok(())
    }

    fn is_banner(line: &str) -> bool {
        let lower = line.to_lowercase();
        lower.contains(PRODUCT_TAG) || lower.contains(STATUS_PORT_TAG)
    }

    async fn authenticate(&mut self) -> Result<()> {
        let hello = format!("hello {} {}", self.token, PROTO_VERSION);
        self.transport_mut()?.send_line(&hello).await?;
        let reply = self.read_reply().await?;
        if reply.starts_with("OK") {
            self.state = SessionState::Authenticated;
            info!("builder port authentication succeeded");
            Ok(())
        } else {
            Err(BuilderPortError::Protocol {
                code: 401,
                message: format!("Authentication failed: {reply}"),
            })
        }
    }

    /// Best-effort teardown: send `quit` (ignoring I/O errors), close the
    /// write half, drop the handles, and mark the session closed.
    pub async fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            let _ = transport.send_line("quit").await;
            transport.close().await;
        }
        self.state = SessionState::Closed;
        info!("builder port session closed");
    }

    /// Fetch one room as a typed snapshot. Returns `Ok(None)` when the
    /// zone loads but contains no `DATA ROOM` for the requested vnum.
    pub async fn get_room(&mut self, vnum: i32) -> Result<Option<Room>> {
        let zone = zone_of(vnum);
        self.transport_mut()?
            .send_line(&format!("wld_load {zone}"))
            .await?;
        let first = self.read_reply().await?;
        Self::check_reply(&first)?;
        let lines = self.read_bulk().await?;

        let mut room: Option<Room> = None;
        let mut exits = Vec::new();
        let mut extra_descs = Vec::new();
        let mut special_function = None;
        for line in &lines {
            let Some(record) = records::parse_data_line(line) else {
                debug!("skipping unrecognized bulk line: {}", escape_log(line));
                continue;
            };
            match record {
                DataRecord::Room {
                    vnum: v,
                    zone,
                    sector,
                    width,
                    height,
                    flags,
                    name,
                    description,
                } if v == vnum => {
                    room = Some(Room {
                        vnum: v,
                        zone,
                        sector,
                        width,
                        height,
                        flags,
                        name,
                        description,
                        exits: Vec::new(),
                        extra_descs: Vec::new(),
                        special_function: None,
                    });
                }
                DataRecord::Exit { vnum: v, exit } if v == vnum => exits.push(exit),
                DataRecord::ExtraDesc { vnum: v, extra } if v == vnum => extra_descs.push(extra),
                DataRecord::SpecFunc { vnum: v, name } if v == vnum => {
                    special_function = Some(name);
                }
                _ => {}
            }
        }

        Ok(room.map(|mut r| {
            r.exits = exits;
            r.extra_descs = extra_descs;
            r.special_function = special_function;
            r
        }))
    }

    /// List zones plus the sector/flag/specfunc vocabularies. A non-`OK`
    /// initial reply yields an empty catalog rather than an error; only
    /// transport failures propagate.
    pub async fn list_zones(&mut self) -> Result<ZoneCatalog> {
        self.transport_mut()?.send_line("wld_list").await?;
        let first = self.read_reply().await?;
        if !first.starts_with("OK") {
            debug!("wld_list refused ({}); returning empty catalog", escape_log(&first));
            return Ok(ZoneCatalog::default());
        }
        let lines = self.read_bulk().await?;

        let mut catalog = ZoneCatalog::default();
        for line in &lines {
            match records::parse_data_line(line) {
                Some(DataRecord::Zone(zone)) => catalog.zones.push(zone),
                Some(DataRecord::Sector(sector)) => catalog.sectors.push(sector),
                Some(DataRecord::RoomFlags(flags)) => catalog.room_flags = flags,
                Some(DataRecord::SpecFuncs(funcs)) => catalog.spec_funcs = funcs,
                _ => debug!("skipping unrecognized bulk line: {}", escape_log(line)),
            }
        }
        catalog.count = catalog.zones.len();
        Ok(catalog)
    }

    /// Open a server-side transaction over the given zones. The returned
    /// scope borrows the session mutably, so at most one scope can be live
    /// per session; release it with commit, abort, or finish.
    pub async fn transaction(&mut self, zones: &[i32]) -> Result<TransactionScope<'_>> {
        let cmd = format!("tx_begin ZONES {}", zone_csv(zones));
        self.exec(&cmd).await?;
        self.state = SessionState::InTransaction;
        Ok(TransactionScope::new(self))
    }

    /// Run one single-line command: send it, find the first non-empty
    /// reply line, and interpret `OK`/`ERROR`. Returns the `OK` payload.
    pub(crate) async fn exec(&mut self, command: &str) -> Result<String> {
        self.transport_mut()?.send_line(command).await?;
        let reply = self.read_reply().await?;
        Self::check_reply(&reply)
    }

    /// Send `tx_commit` or `tx_abort` and check the reply. The session
    /// leaves the transaction state either way; after a failed commit the
    /// server side is the authority on what survived.
    pub(crate) async fn end_transaction(&mut self, command: &str) -> Result<()> {
        let result = self.exec(command).await;
        self.state = SessionState::Authenticated;
        result.map(drop)
    }

    fn transport_mut(&mut self) -> Result<&mut LineTransport> {
        self.transport.as_mut().ok_or(BuilderPortError::NotConnected)
    }

    /// Read up to [`MAX_REPLY_SKIP`] lines, skipping empties, and return
    /// the first non-empty one (or the last empty line read).
    async fn read_reply(&mut self) -> Result<String> {
        let transport = self.transport.as_mut().ok_or(BuilderPortError::NotConnected)?;
        let mut line = String::new();
        for _ in 0..MAX_REPLY_SKIP {
            line = transport.read_line().await?;
            if !line.is_empty() {
                break;
            }
        }
        Ok(line)
    }

    /// Interpret a single reply line: `OK[ <payload>]` yields the payload,
    /// `ERROR <code> <msg_b64>` yields a typed error, anything else folds
    /// to a code-500 protocol error.
    fn check_reply(reply: &str) -> Result<String> {
        if let Some(payload) = reply.strip_prefix("OK") {
            return Ok(payload.trim_start().to_string());
        }
        if reply.starts_with("ERROR") {
            return Err(BuilderPortError::from_error_line(reply));
        }
        Err(BuilderPortError::Protocol {
            code: 500,
            message: format!("Unexpected reply: {}", escape_log(reply)),
        })
    }

    /// Consume data lines until the `END` terminator. A bare empty line is
    /// accepted as end-of-bulk for servers that elide `END`.
    async fn read_bulk(&mut self) -> Result<Vec<String>> {
        let transport = self.transport.as_mut().ok_or(BuilderPortError::NotConnected)?;
        let mut lines = Vec::new();
        loop {
            let line = transport.read_line().await?;
            if line == "END" || line.is_empty() {
                break;
            }
            lines.push(line);
        }
        Ok(lines)
    }
}

/// Render a zone id set as the CSV argument of `tx_begin`/`validate`/`export`.
pub(crate) fn zone_csv(zones: &[i32]) -> String {
    zones
        .iter()
        .map(|z| z.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_reply_extracts_payload() {
        assert_eq!(Session::check_reply("OK").unwrap(), "");
        assert_eq!(Session::check_reply("OK 42 rooms").unwrap(), "42 rooms");
    }

    #[test]
    fn check_reply_surfaces_typed_errors() {
        match Session::check_reply("ERROR 409 Y29uZmxpY3Q=") {
            Err(BuilderPortError::Protocol { code, message }) => {
                assert_eq!(code, 409);
                assert_eq!(message, "conflict");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn check_reply_folds_garbage_to_500() {
        match Session::check_reply("??? what") {
            Err(BuilderPortError::Protocol { code, .. }) => assert_eq!(code, 500),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn banner_detection_is_case_insensitive() {
        assert!(Session::is_banner("Welcome to MikkiMUD status port"));
        assert!(Session::is_banner("MIKKIMUD v3"));
        assert!(Session::is_banner("this is a Status Port"));
        assert!(!Session::is_banner("OK"));
        assert!(!Session::is_banner("login:"));
    }

    #[test]
    fn zone_csv_joins_ids() {
        assert_eq!(zone_csv(&[12]), "12");
        assert_eq!(zone_csv(&[12, 30, 31]), "12,30,31");
    }
}
