//! Typed snapshots of builder port world records.
//!
//! Rooms, exits, and extra descriptions are read-only snapshots assembled
//! from bulk `DATA` replies; they are never mutated in place. Mutations go
//! back to the server as explicit commands inside a transaction (see
//! [`crate::client::TransactionScope`]).

use serde::{Deserialize, Serialize};

/// Fixed direction-name table, indexed by wire direction code 0-9.
///
/// The mapping is part of the wire contract and is never negotiated.
pub const DIRECTION_NAMES: [&str; 10] = [
    "North",
    "East",
    "South",
    "West",
    "Up",
    "Down",
    "Northeast",
    "Northwest",
    "Southeast",
    "Southwest",
];

/// Human name for a wire direction code. Unknown codes render as `Dir_<n>`.
pub fn direction_name(code: u8) -> String {
    DIRECTION_NAMES
        .get(code as usize)
        .map(|s| (*s).to_string())
        .unwrap_or_else(|| format!("Dir_{}", code))
}

/// Reciprocal direction for bidirectional links: north<->south, east<->west,
/// up<->down, and the four diagonal pairs.
pub fn opposite_direction(code: u8) -> Option<u8> {
    match code {
        0 => Some(2),
        1 => Some(3),
        2 => Some(0),
        3 => Some(1),
        4 => Some(5),
        5 => Some(4),
        6 => Some(9),
        7 => Some(8),
        8 => Some(7),
        9 => Some(6),
        _ => None,
    }
}

/// Parse a direction given on the command line: a bare code (`0`-`9`), a
/// full name (`north`), or a compass abbreviation (`n`, `ne`, ...).
pub fn parse_direction(s: &str) -> Option<u8> {
    if let Ok(n) = s.parse::<u8>() {
        return (n <= 9).then_some(n);
    }
    match s.to_ascii_lowercase().as_str() {
        "n" | "north" => Some(0),
        "e" | "east" => Some(1),
        "s" | "south" => Some(2),
        "w" | "west" => Some(3),
        "u" | "up" => Some(4),
        "d" | "down" => Some(5),
        "ne" | "northeast" => Some(6),
        "nw" | "northwest" => Some(7),
        "se" | "southeast" => Some(8),
        "sw" | "southwest" => Some(9),
        _ => None,
    }
}

/// Zone that owns a room vnum. Zones group up to 100 rooms.
pub fn zone_of(vnum: i32) -> i32 {
    vnum / 100
}

/// Directed link from a room to another. Immutable part of a [`Room`] snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exit {
    /// Wire direction code, 0-9.
    pub direction: u8,
    /// Human name from the fixed table (`Dir_<n>` for unknown codes).
    pub direction_name: String,
    /// Destination vnum; -1 means the exit leads nowhere.
    pub to_vnum: i32,
    pub flags: i32,
    /// Key object vnum; -1 means no key.
    pub key: i32,
    pub description: String,
    pub keywords: String,
}

/// Keyword-targeted extra description attached to a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtraDesc {
    pub keywords: String,
    pub description: String,
}

/// Read-only snapshot of a world room as reported by `wld_load`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    pub vnum: i32,
    pub zone: i32,
    pub sector: i32,
    pub width: i32,
    pub height: i32,
    /// Room flag bitfield; flag names come from [`ZoneCatalog::room_flags`].
    pub flags: i32,
    pub name: String,
    pub description: String,
    pub exits: Vec<Exit>,
    pub extra_descs: Vec<ExtraDesc>,
    /// Special function assigned to the room, if any.
    pub special_function: Option<String>,
}

/// One zone entry from `wld_list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZoneEntry {
    pub vnum: i32,
    pub name: String,
}

/// One sector type from `wld_list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectorType {
    pub id: i32,
    pub name: String,
}

/// Snapshot of the server's zone listing plus the vocabularies (sector
/// types, room flag names, special function names) builders pick from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZoneCatalog {
    pub zones: Vec<ZoneEntry>,
    pub sectors: Vec<SectorType>,
    pub room_flags: Vec<String>,
    pub spec_funcs: Vec<String>,
    pub count: usize,
}

/// Non-destructive field update for `room_patch`. Only fields that are set
/// are emitted on the wire; everything else is left untouched server-side.
#[derive(Debug, Clone, Default)]
pub struct RoomPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sector: Option<i32>,
    pub flags: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub spec_func: Option<String>,
}

impl RoomPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.sector.is_none()
            && self.flags.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.spec_func.is_none()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn sector(mut self, sector: i32) -> Self {
        self.sector = Some(sector);
        self
    }

    pub fn flags(mut self, flags: i32) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn width(mut self, width: i32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: i32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn spec_func(mut self, func: impl Into<String>) -> Self {
        self.spec_func = Some(func.into());
        self
    }
}

/// Whether `link` creates the reciprocal exit as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Server also creates the opposite-direction exit in the destination room.
    Bidir,
    /// Only the forward exit is touched.
    Oneway,
}

impl LinkMode {
    pub fn as_wire(self) -> &'static str {
        match self {
            LinkMode::Bidir => "BIDIR",
            LinkMode::Oneway => "ONEWAY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_names_match_fixed_table() {
        assert_eq!(direction_name(0), "North");
        assert_eq!(direction_name(1), "East");
        assert_eq!(direction_name(5), "Down");
        assert_eq!(direction_name(9), "Southwest");
        assert_eq!(direction_name(14), "Dir_14");
    }

    #[test]
    fn opposites_are_reciprocal() {
        for code in 0u8..=9 {
            let opp = opposite_direction(code).expect("valid code has an opposite");
            assert_eq!(opposite_direction(opp), Some(code));
        }
        assert_eq!(opposite_direction(0), Some(2));
        assert_eq!(opposite_direction(6), Some(9));
        assert_eq!(opposite_direction(7), Some(8));
        assert_eq!(opposite_direction(10), None);
    }

    #[test]
    fn zone_is_vnum_div_100() {
        assert_eq!(zone_of(1204), 12);
        assert_eq!(zone_of(99), 0);
        assert_eq!(zone_of(100), 1);
    }

    #[test]
    fn parses_direction_inputs() {
        assert_eq!(parse_direction("3"), Some(3));
        assert_eq!(parse_direction("north"), Some(0));
        assert_eq!(parse_direction("NE"), Some(6));
        assert_eq!(parse_direction("sw"), Some(9));
        assert_eq!(parse_direction("10"), None);
        assert_eq!(parse_direction("sideways"), None);
    }

    #[test]
    fn room_patch_tracks_set_fields() {
        assert!(RoomPatch::default().is_empty());
        let patch = RoomPatch::default().name("A hallway").sector(1);
        assert!(!patch.is_empty());
        assert_eq!(patch.name.as_deref(), Some("A hallway"));
        assert_eq!(patch.sector, Some(1));
        assert_eq!(patch.flags, None);
    }
}
