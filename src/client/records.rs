//! Decoding of `DATA` record lines from bulk replies.
//!
//! Record lines are whitespace-positional with base64-armored free-text
//! fields. Splits are capped so the final armored field keeps any internal
//! spaces; the cap per record type is part of the observed server contract.

use crate::client::armor;
use crate::world::{direction_name, Exit, ExtraDesc, SectorType, ZoneEntry};

/// One decoded `DATA` record from a bulk reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DataRecord {
    Room {
        vnum: i32,
        zone: i32,
        sector: i32,
        width: i32,
        height: i32,
        flags: i32,
        name: String,
        description: String,
    },
    Exit {
        vnum: i32,
        exit: Exit,
    },
    ExtraDesc {
        vnum: i32,
        extra: ExtraDesc,
    },
    SpecFunc {
        vnum: i32,
        name: String,
    },
    Zone(ZoneEntry),
    Sector(SectorType),
    RoomFlags(Vec<String>),
    SpecFuncs(Vec<String>),
}

/// Parse one bulk-reply line. Returns `None` for lines that are not
/// recognizable records; the caller skips those.
pub(crate) fn parse_data_line(line: &str) -> Option<DataRecord> {
    let rest = line.strip_prefix("DATA ")?;
    let tag = rest.split_whitespace().next()?;
    match tag {
        "ROOM" => parse_room(line),
        "EXIT" => parse_exit(line),
        "EXTRADESC" => parse_extradesc(line),
        "SPECFUNC" => parse_specfunc(line),
        "ZONE" => parse_zone(line),
        "SECTOR" => parse_sector(line),
        "ROOMFLAGS" => Some(DataRecord::RoomFlags(parse_csv_payload(line, "ROOMFLAGS")?)),
        "SPECFUNCS" => Some(DataRecord::SpecFuncs(parse_csv_payload(line, "SPECFUNCS")?)),
        _ => None,
    }
}

fn int(token: &str) -> Option<i32> {
    token.trim().parse::<i32>().ok()
}

/// `DATA ROOM <vnum> <zone> <sector> <width> <height> <flags> <name_b64> [<desc_b64>]`
/// — eight splits, then the armored tail is split once more (base64 tokens
/// carry no spaces, so this is safe).
fn parse_room(line: &str) -> Option<DataRecord> {
    let parts: Vec<&str> = line.splitn(9, ' ').collect();
    if parts.len() < 9 {
        return None;
    }
    let mut tail = parts[8].splitn(2, ' ');
    let name = armor::decode(tail.next().unwrap_or(""));
    let description = armor::decode(tail.next().unwrap_or("").trim());
    Some(DataRecord::Room {
        vnum: int(parts[2])?,
        zone: int(parts[3])?,
        sector: int(parts[4])?,
        width: int(parts[5])?,
        height: int(parts[6])?,
        flags: int(parts[7])?,
        name,
        description,
    })
}

/// `DATA EXIT <vnum> <dir> <to_vnum> <flags> <key> <desc_b64> <keywords_b64>`
fn parse_exit(line: &str) -> Option<DataRecord> {
    let parts: Vec<&str> = line.splitn(9, ' ').collect();
    if parts.len() < 8 {
        return None;
    }
    let direction = u8::try_from(int(parts[3])?).ok()?;
    Some(DataRecord::Exit {
        vnum: int(parts[2])?,
        exit: Exit {
            direction,
            direction_name: direction_name(direction),
            to_vnum: int(parts[4])?,
            flags: int(parts[5])?,
            key: int(parts[6])?,
            description: armor::decode(parts[7]),
            keywords: armor::decode(parts.get(8).copied().unwrap_or("-")),
        },
    })
}

/// `DATA EXTRADESC <vnum> <keywords_b64> <description_b64>`
fn parse_extradesc(line: &str) -> Option<DataRecord> {
    let parts: Vec<&str> = line.splitn(5, ' ').collect();
    if parts.len() < 4 {
        return None;
    }
    Some(DataRecord::ExtraDesc {
        vnum: int(parts[2])?,
        extra: ExtraDesc {
            keywords: armor::decode(parts[3]),
            description: armor::decode(parts.get(4).copied().unwrap_or("-")),
        },
    })
}

/// `DATA SPECFUNC <vnum> <function_name>`
fn parse_specfunc(line: &str) -> Option<DataRecord> {
    let parts: Vec<&str> = line.splitn(4, ' ').collect();
    if parts.len() < 4 {
        return None;
    }
    Some(DataRecord::SpecFunc {
        vnum: int(parts[2])?,
        name: parts[3].trim().to_string(),
    })
}

/// `DATA ZONE <vnum> <name_b64>`
fn parse_zone(line: &str) -> Option<DataRecord> {
    let parts: Vec<&str> = line.splitn(4, ' ').collect();
    if parts.len() < 4 {
        return None;
    }
    Some(DataRecord::Zone(ZoneEntry {
        vnum: int(parts[2])?,
        name: armor::decode(parts[3].trim()),
    }))
}

/// `DATA SECTOR <id> <name_b64>`
fn parse_sector(line: &str) -> Option<DataRecord> {
    let parts: Vec<&str> = line.splitn(4, ' ').collect();
    if parts.len() < 4 {
        return None;
    }
    Some(DataRecord::Sector(SectorType {
        id: int(parts[2])?,
        name: armor::decode(parts[3].trim()),
    }))
}

/// `DATA ROOMFLAGS <csv>` / `DATA SPECFUNCS <csv>` — the payload after the
/// fixed prefix is a comma-separated list of human names.
fn parse_csv_payload(line: &str, tag: &str) -> Option<Vec<String>> {
    let prefix = format!("DATA {tag}");
    let payload = line.strip_prefix(&prefix)?;
    Some(
        payload
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}
