use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Owned copy of everything a renderer needs, detached from the session so it can be sent elsewhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub size: Coord2,
    pub phase: Phase,
    pub flags_remaining: isize,
    pub elapsed_secs: u64,
    pub tiles: Array2<Tile>,
}

impl Snapshot {
    pub fn from_session<G: BoardGenerator>(session: &GameSession<G>) -> Self {
        let size = session.size();
        let tiles = Array2::from_shape_fn(size.to_nd_index(), |(row, col)| {
            session
                .tile_at((row as Coord, col as Coord))
                .unwrap_or_default()
        });

        Self {
            size,
            phase: session.phase(),
            flags_remaining: session.flags_remaining(),
            elapsed_secs: session.elapsed_secs(),
            tiles,
        }
    }

    pub fn tile_at(&self, coords: Coord2) -> Option<Tile> {
        self.tiles.get(coords.to_nd_index()).copied()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
