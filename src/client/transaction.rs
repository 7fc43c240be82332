//! Transaction scope over a declared zone set.
//!
//! A scope owns the server-side transaction from the `tx_begin` reply until
//! exactly one of `tx_commit` or `tx_abort` has been answered. The scope
//! borrows the session mutably, so a second scope on the same session is
//! impossible while one is live.

use log::warn;

use crate::client::armor;
use crate::client::errors::Result;
use crate::client::{zone_csv, Session};
use crate::world::{LinkMode, Room, RoomPatch};

/// Active server-side transaction. Obtained via [`Session::transaction`];
/// must be released through [`commit`](Self::commit),
/// [`abort`](Self::abort), or [`finish`](Self::finish).
#[derive(Debug)]
pub struct TransactionScope<'a> {
    session: &'a mut Session,
    active: bool,
}

impl<'a> TransactionScope<'a> {
    pub(crate) fn new(session: &'a mut Session) -> Self {
        TransactionScope {
            session,
            active: true,
        }
    }

    /// Non-destructive field update. Emits only the fields set in `patch`;
    /// an empty patch is a no-op and sends nothing.
    pub async fn room_patch(&mut self, vnum: i32, patch: &RoomPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let mut cmd = format!("room_patch {vnum}");
        if let Some(name) = &patch.name {
            cmd.push_str(&format!(" NAME {}", armor::encode_token(name)));
        }
        if let Some(desc) = &patch.description {
            cmd.push_str(&format!(" DESC {}", armor::encode_token(desc)));
        }
        if let Some(sector) = patch.sector {
            cmd.push_str(&format!(" SECTOR {sector}"));
        }
        if let Some(flags) = patch.flags {
            cmd.push_str(&format!(" FLAGS {flags}"));
        }
        if let Some(width) = patch.width {
            cmd.push_str(&format!(" WIDTH {width}"));
        }
        if let Some(height) = patch.height {
            cmd.push_str(&format!(" HEIGHT {height}"));
        }
        if let Some(func) = &patch.spec_func {
            cmd.push_str(&format!(" SPECFUNC {func}"));
        }
        self.session.exec(&cmd).await.map(drop)
    }

    /// Destructive replacement of a room's scalar fields. The server clears
    /// the room's exits and extra descriptions.
    pub async fn room_full(&mut self, room: &Room) -> Result<()> {
        let cmd = format!(
            "room_full {} {} {} {} {} {} {} {}",
            room.vnum,
            room.zone,
            room.sector,
            room.width,
            room.height,
            room.flags,
            armor::encode_token(&room.name),
            armor::encode_token(&room.description),
        );
        self.session.exec(&cmd).await.map(drop)
    }

    /// Create, replace, or remove an exit. `to = -1` removes the exit;
    /// [`LinkMode::Bidir`] has the server create the reciprocal exit too.
    #[allow(clippy::too_many_arguments)]
    pub async fn link_rooms(
        &mut self,
        from: i32,
        direction: u8,
        to: i32,
        flags: i32,
        key: i32,
        description: &str,
        keywords: &str,
        mode: LinkMode,
    ) -> Result<()> {
        let cmd = format!(
            "link {from} {direction} {to} {flags} {key} {} {} {}",
            armor::encode_token(description),
            armor::encode_token(keywords),
            mode.as_wire(),
        );
        self.session.exec(&cmd).await.map(drop)
    }

    /// Ask the server to validate the listed zones.
    pub async fn validate(&mut self, zones: &[i32]) -> Result<()> {
        let cmd = format!("validate ZONES {}", zone_csv(zones));
        self.session.exec(&cmd).await.map(drop)
    }

    /// Persist the listed zones to disk. The server refuses with an `ERROR`
    /// reply when validation fails.
    pub async fn export(&mut self, zones: &[i32]) -> Result<()> {
        let cmd = format!("export ZONES {}", zone_csv(zones));
        self.session.exec(&cmd).await.map(drop)
    }

    /// Commit the transaction and release the scope.
    pub async fn commit(mut self) -> Result<()> {
        self.active = false;
        self.session.end_transaction("tx_commit").await
    }

    /// Roll the transaction back and release the scope.
    pub async fn abort(mut self) -> Result<()> {
        self.active = false;
        self.session.end_transaction("tx_abort").await
    }

    /// Release the scope based on the outcome of the scoped work: commit on
    /// `Ok`, abort on `Err`. When the abort itself fails, the abort error is
    /// surfaced and the original failure is logged.
    pub async fn finish<T>(self, body: Result<T>) -> Result<T> {
        match body {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(original) => match self.abort().await {
                Ok(()) => Err(original),
                Err(abort_err) => {
                    warn!(
                        "tx_abort failed after in-flight error ({original}); surfacing abort failure"
                    );
                    Err(abort_err)
                }
            },
        }
    }
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        if self.active {
            // Cannot run async I/O here; the leak is the caller's to fix by
            // routing every exit path through commit/abort/finish.
            warn!("transaction scope dropped while active; server-side transaction left open");
        }
    }
}
