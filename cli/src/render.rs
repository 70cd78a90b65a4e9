use core::fmt::Write;
use minesweep_core::{Phase, Snapshot, Tile};

fn tile_char(tile: Tile) -> char {
    match tile {
        Tile::Hidden => '#',
        Tile::Flag => 'F',
        Tile::Question => '?',
        Tile::Empty => '.',
        Tile::Number(count) => char::from(b'0' + count),
        Tile::Mine => '*',
        Tile::FlaggedMine => 'X',
        Tile::Exploded => '@',
    }
}

fn status_line(snapshot: &Snapshot) -> &'static str {
    match snapshot.phase {
        Phase::AwaitingFirstClick => "reveal any cell to start",
        Phase::InProgress => "in progress",
        Phase::Won => "you win! any move starts a new game",
        Phase::Lost => "game over, any move starts a new game",
    }
}

/// Draws the board with row and column indices, followed by the counters.
pub(crate) fn render(snapshot: &Snapshot) -> String {
    let (_, cols) = snapshot.size;
    let mut out = String::new();

    out.push_str("    ");
    for col in 0..cols {
        let _ = write!(out, "{:>3}", col);
    }
    out.push('\n');

    for (row, tiles) in snapshot.tiles.rows().into_iter().enumerate() {
        let _ = write!(out, "{:>3} ", row);
        for &tile in tiles {
            let _ = write!(out, "{:>3}", tile_char(tile));
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "flags left: {}  time: {}s  {}",
        snapshot.flags_remaining,
        snapshot.elapsed_secs,
        status_line(snapshot)
    );
    out
}
