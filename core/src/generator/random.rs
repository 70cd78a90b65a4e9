use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Rejection sampling gives up after this many boards and places mines around the start cell directly.
pub const MAX_GENERATION_ATTEMPTS: u32 = 10_000;

/// Boards less likely than this to satisfy the start policy skip rejection sampling altogether.
const MIN_ACCEPT_PROBABILITY: f64 = 1e-3;

/// Chance that uniformly placed mines leave every cell reserved by `start_tile` free.
///
/// That is `C(total - reserved, mines) / C(total, mines)`, expanded into a product so nothing overflows.
fn acceptance_probability(config: GameConfig, safe_cell: Coord2, start_tile: StartTile) -> f64 {
    let reserved = match start_tile {
        StartTile::Random => return 1.0,
        StartTile::SimpleSafe => 1,
        StartTile::AlwaysZero => 1 + NeighborIter::new(safe_cell, config.size()).count(),
    };
    let total = f64::from(config.total_cells());
    let free = total - f64::from(config.mines());

    (0..reserved)
        .map(|i| {
            let i = i as f64;
            ((free - i) / (total - i)).max(0.0)
        })
        .product()
}

/// Generation strategy that places mines uniformly at random and throws boards away until the start cell satisfies
/// the [`StartTile`] policy.
#[derive(Clone, Debug)]
pub struct RandomBoardGenerator {
    rng: SmallRng,
    start_tile: StartTile,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64, start_tile: StartTile) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            start_tile,
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(seed, StartTile::default())
    }

    pub fn from_entropy() -> Self {
        let seed = rand::random();
        log::debug!("generator seed: {}", seed);
        Self::from_seed(seed)
    }

    pub fn start_tile(&self) -> StartTile {
        self.start_tile
    }

    /// Weakens the configured policy when the board cannot possibly satisfy it.
    fn effective_start_tile(&self, config: GameConfig, safe_cell: Coord2) -> StartTile {
        use StartTile::*;

        if config.validate_coords(safe_cell).is_err() {
            log::warn!("Start cell {:?} outside the board, fallback to random", safe_cell);
            return Random;
        }

        let total_cells = config.total_cells();
        let neighborhood = 1 + NeighborIter::new(safe_cell, config.size()).count() as CellCount;
        match self.start_tile {
            Random => Random,
            SimpleSafe | AlwaysZero if config.mines() + 1 > total_cells => {
                log::warn!("Cannot make start cell safe, fallback to random");
                Random
            }
            SimpleSafe => SimpleSafe,
            AlwaysZero if config.mines() + neighborhood > total_cells => {
                log::warn!("Cannot make start cell zero, fallback to simple safe");
                SimpleSafe
            }
            AlwaysZero => AlwaysZero,
        }
    }

    /// Draws random cells and skips the ones already mined until `config.mines()` are placed.
    fn place_mines(&mut self, config: GameConfig) -> Array2<bool> {
        let (rows, cols) = config.size();
        let mut mine_mask: Array2<bool> = Array2::default(config.size().to_nd_index());
        // a full board would never finish
        let mines = config.mines().min(config.total_cells());
        let mut placed = 0;

        while placed < mines {
            let coords: Coord2 = (self.rng.random_range(0..rows), self.rng.random_range(0..cols));
            let cell = &mut mine_mask[coords.to_nd_index()];
            if !*cell {
                *cell = true;
                placed += 1;
            }
        }

        mine_mask
    }

    /// Places mines uniformly among the cells the policy leaves open, for boards too dense for rejection sampling.
    fn place_mines_around(
        &mut self,
        config: GameConfig,
        safe_cell: Coord2,
        start_tile: StartTile,
    ) -> Array2<bool> {
        let mut reserved: Array2<bool> = Array2::default(config.size().to_nd_index());
        match start_tile {
            StartTile::Random => {}
            StartTile::SimpleSafe => reserved[safe_cell.to_nd_index()] = true,
            StartTile::AlwaysZero => {
                reserved[safe_cell.to_nd_index()] = true;
                for coords in reserved.iter_neighbors(safe_cell) {
                    reserved[coords.to_nd_index()] = true;
                }
            }
        }

        let candidates: Vec<_> = reserved
            .indexed_iter()
            .filter(|(_, reserved)| !**reserved)
            .map(|(index, _)| index)
            .collect();
        let mines = usize::from(config.mines()).min(candidates.len());

        let mut mine_mask: Array2<bool> = Array2::default(config.size().to_nd_index());
        for i in rand::seq::index::sample(&mut self.rng, candidates.len(), mines) {
            mine_mask[candidates[i]] = true;
        }
        mine_mask
    }
}

impl Default for RandomBoardGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(&mut self, config: GameConfig, safe_cell: Coord2) -> Result<Board> {
        let start_tile = self.effective_start_tile(config, safe_cell);

        let odds = acceptance_probability(config, safe_cell, start_tile);
        if odds < MIN_ACCEPT_PROBABILITY {
            log::debug!(
                "Acceptance odds {:e} too low, placing mines around {:?} directly",
                odds,
                safe_cell
            );
            return Board::from_mine_mask(self.place_mines_around(config, safe_cell, start_tile));
        }

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let board = Board::from_mine_mask(self.place_mines(config))?;
            if start_tile == StartTile::Random || start_tile.accepts(board[safe_cell]) {
                log::debug!(
                    "Generated board {:?} with {} mines after {} attempt(s)",
                    config.size(),
                    board.mine_count(),
                    attempt
                );
                return Ok(board);
            }
        }

        log::warn!(
            "No acceptable board after {} attempts, placing mines around {:?} directly",
            MAX_GENERATION_ATTEMPTS,
            safe_cell
        );
        Board::from_mine_mask(self.place_mines_around(config, safe_cell, start_tile))
    }
}
