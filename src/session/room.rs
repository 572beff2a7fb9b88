use briefing_client_config::ClientConfig;

/// Reserved room name that puts the client into demo mode: it connects to
/// no room but keeps the full UI alive for embedding demos.
pub const DEMO_ROOM: &str = "embed-demo";

/// Outcome of resolving the addressable location against the room path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomResolution {
    pub room: Option<String>,
    /// New visible address, to be applied via history mutation only.
    pub rewrite: Option<String>,
    pub embed_demo: bool,
}

/// Extract the raw room part from a path. The legacy deployment matched
/// `/ng/<id>` as well as `/ngs/<id>`; everything else matches on the
/// configured room path prefix.
fn room_from_path(path: &str, config: &ClientConfig) -> Option<String> {
    if config.is_legacy_room_path() {
        path.strip_prefix("/ngs/")
            .or_else(|| path.strip_prefix("/ng/"))
            .map(str::to_string)
    } else {
        path.strip_prefix(config.room_path.as_str()).map(str::to_string)
    }
}

/// Canonical form of a room name: lowercase, with anything outside
/// `[a-z0-9_-]` collapsed into single dashes.
pub fn normalize_room_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            out.push(ch);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Resolve and normalize the room from the current path. A missing or
/// empty room yields `room = None` plus a rewrite to the bare room path;
/// a non-canonical room name yields its canonical form plus a matching
/// rewrite.
pub fn resolve_room(path: &str, config: &ClientConfig) -> RoomResolution {
    let no_room = RoomResolution {
        room: None,
        rewrite: Some(config.bare_room_path()),
        embed_demo: false,
    };

    let Some(raw) = room_from_path(path, config) else {
        return no_room;
    };

    let room = normalize_room_name(&raw);
    if room.is_empty() {
        return no_room;
    }

    let rewrite = (room != raw).then(|| format!("{}{}", config.room_path, room));

    if room == DEMO_ROOM {
        return RoomResolution {
            room: None,
            rewrite,
            embed_demo: true,
        };
    }

    RoomResolution {
        room: Some(room),
        rewrite,
        embed_demo: false,
    }
}
