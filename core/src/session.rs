use core::time::Duration;
use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Top-level state of a match. Transitions only go forward:
/// - AwaitingFirstClick -> InProgress
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No board yet, it is generated around the first revealed cell
    AwaitingFirstClick,
    InProgress,
    Won,
    Lost,
}

impl Phase {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::AwaitingFirstClick)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::AwaitingFirstClick
    }
}

/// Marker cycle applied by [`GameSession::toggle_flag`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagCycle {
    /// Hidden -> Flagged -> Hidden
    TwoState,
    /// Hidden -> Flagged -> Questioned -> Hidden
    #[default]
    ThreeState,
}

/// Everything that only exists once the first reveal dealt the board.
#[derive(Clone, Debug)]
struct Deal {
    board: Board,
    phase: Phase,
    started_at: Instant,
    ended_at: Option<Instant>,
    triggered_mine: Option<Coord2>,
}

impl Deal {
    fn new(board: Board) -> Self {
        Self {
            board,
            phase: Phase::InProgress,
            started_at: Instant::now(),
            ended_at: None,
            triggered_mine: None,
        }
    }

    fn end(&mut self, phase: Phase) {
        if self.phase.is_finished() {
            return;
        }
        self.phase = phase;
        self.ended_at = Some(Instant::now());
        log::debug!("match ended: {:?} after {:?}", phase, self.elapsed());
    }

    fn elapsed(&self) -> Duration {
        self.ended_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.started_at)
    }
}

/// One match from the first click to a win or a loss.
///
/// Every action is a no-op on input that makes no sense at that moment (coordinates outside the board, revealing a
/// flagged cell, anything after the match ended) since that is what pointing devices produce all the time.
#[derive(Clone, Debug)]
pub struct GameSession<G = RandomBoardGenerator> {
    config: GameConfig,
    generator: G,
    flag_cycle: FlagCycle,
    cells: Array2<CellState>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    /// `None` while awaiting the first click.
    deal: Option<Deal>,
}

impl GameSession<RandomBoardGenerator> {
    pub fn new(config: GameConfig) -> Self {
        Self::with_generator(config, RandomBoardGenerator::from_entropy())
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_generator(config, RandomBoardGenerator::from_seed(seed))
    }
}

impl GameSession<FixedBoardGenerator> {
    /// Session that always plays on `board`, the first click gets no protection.
    pub fn with_board(board: Board) -> Self {
        let config = board.game_config();
        Self::with_generator(config, FixedBoardGenerator::new(board))
    }
}

impl<G: BoardGenerator> GameSession<G> {
    pub fn with_generator(config: GameConfig, generator: G) -> Self {
        Self {
            config,
            generator,
            flag_cycle: FlagCycle::default(),
            cells: Array2::default(config.size().to_nd_index()),
            revealed_count: 0,
            flagged_count: 0,
            deal: None,
        }
    }

    pub fn with_flag_cycle(mut self, flag_cycle: FlagCycle) -> Self {
        self.flag_cycle = flag_cycle;
        self
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn flag_cycle(&self) -> FlagCycle {
        self.flag_cycle
    }

    pub fn phase(&self) -> Phase {
        self.deal.as_ref().map_or(Phase::AwaitingFirstClick, |deal| deal.phase)
    }

    pub fn is_finished(&self) -> bool {
        self.phase().is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.config.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines()
    }

    /// Mines minus flags placed, negative when the player put down more flags than there are mines.
    pub fn flags_remaining(&self) -> isize {
        (self.config.mines() as isize) - (self.flagged_count as isize)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    /// Time since the first reveal, frozen once the match ended, zero before the first reveal.
    pub fn elapsed(&self) -> Duration {
        self.deal.as_ref().map_or(Duration::ZERO, Deal::elapsed)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed().as_secs()
    }

    /// The board, once the first reveal generated it.
    pub fn board(&self) -> Option<&Board> {
        self.deal.as_ref().map(|deal| &deal.board)
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.deal.as_ref().and_then(|deal| deal.triggered_mine)
    }

    pub fn cell_state(&self, coords: Coord2) -> Option<CellState> {
        let coords = self.config.validate_coords(coords).ok()?;
        Some(self.cells[coords.to_nd_index()])
    }

    pub fn tile_at(&self, coords: Coord2) -> Option<Tile> {
        let coords = self.config.validate_coords(coords).ok()?;
        Some(self.view_tile(coords))
    }

    /// Reveals a hidden cell, generating the board around it on the first call.
    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        use RevealOutcome::*;

        let Ok(coords) = self.config.validate_coords(coords) else {
            log::debug!("ignoring reveal outside the board at {:?}", coords);
            return NoChange;
        };
        if self.is_finished() || self.cells[coords.to_nd_index()] != CellState::Hidden {
            return NoChange;
        }

        if self.deal.is_none() {
            log::debug!("first reveal at {:?}, generating board", coords);
            match self.generator.generate(self.config, coords) {
                Ok(board) => self.deal = Some(Deal::new(board)),
                Err(err) => {
                    log::warn!("cannot deal a board for {:?}: {}", self.config, err);
                    return NoChange;
                }
            }
        }
        let Some(deal) = self.deal.as_mut() else {
            return NoChange;
        };

        match deal.board[coords] {
            CellContent::Mine => {
                self.cells[coords.to_nd_index()] = CellState::Revealed;
                deal.triggered_mine = Some(coords);
                deal.end(Phase::Lost);
                return HitMine;
            }
            CellContent::Empty => {
                let opened = flood_reveal(&deal.board, &mut self.cells, coords);
                log::debug!("flood opened {} cells from {:?}", opened, coords);
                self.revealed_count += opened;
            }
            CellContent::Adjacent(count) => {
                self.cells[coords.to_nd_index()] = CellState::Revealed;
                self.revealed_count += 1;
                log::debug!("opened {:?}, adjacent mines: {}", coords, count);
            }
        }

        if self.check_won() { Won } else { Revealed }
    }

    /// Cycles the marker on an unrevealed cell according to the session's [`FlagCycle`].
    pub fn toggle_flag(&mut self, coords: Coord2) -> MarkOutcome {
        use CellState::*;

        let Ok(coords) = self.config.validate_coords(coords) else {
            log::debug!("ignoring flag outside the board at {:?}", coords);
            return MarkOutcome::NoChange;
        };
        if self.is_finished() {
            return MarkOutcome::NoChange;
        }

        let cell = &mut self.cells[coords.to_nd_index()];
        let next = match (*cell, self.flag_cycle) {
            (Revealed, _) => return MarkOutcome::NoChange,
            (Hidden, _) => Flagged,
            (Flagged, FlagCycle::ThreeState) => Questioned,
            (Flagged, FlagCycle::TwoState) => Hidden,
            (Questioned, _) => Hidden,
        };
        if *cell == Flagged {
            self.flagged_count -= 1;
        }
        if next == Flagged {
            self.flagged_count += 1;
        }
        log::debug!("mark {:?}: {:?} -> {:?}", coords, *cell, next);
        *cell = next;

        if self.check_won() {
            MarkOutcome::Won
        } else {
            MarkOutcome::Changed
        }
    }

    /// Throws the board and all progress away, the next reveal deals a new board with the same configuration.
    pub fn restart(&mut self) {
        log::debug!("restarting {:?}", self.config);
        self.cells = Array2::default(self.config.size().to_nd_index());
        self.revealed_count = 0;
        self.flagged_count = 0;
        self.deal = None;
    }

    /// Won when every safe cell is revealed and exactly the mines are flagged.
    ///
    /// Flags can only sit on unrevealed cells, with all safe cells revealed those are the mines, so matching counts
    /// mean the flagged set is the mine set.
    fn check_won(&mut self) -> bool {
        let Some(deal) = self.deal.as_mut() else {
            return false;
        };
        if deal.phase != Phase::InProgress {
            return false;
        }
        if self.revealed_count == deal.board.safe_cell_count()
            && self.flagged_count == deal.board.mine_count()
        {
            deal.end(Phase::Won);
            true
        } else {
            false
        }
    }

    fn view_tile(&self, coords: Coord2) -> Tile {
        let state = self.cells[coords.to_nd_index()];
        let Some(deal) = &self.deal else {
            return match state {
                CellState::Flagged => Tile::Flag,
                CellState::Questioned => Tile::Question,
                _ => Tile::Hidden,
            };
        };

        match (deal.phase, state, deal.board[coords]) {
            (Phase::Lost, _, CellContent::Mine) if deal.triggered_mine == Some(coords) => {
                Tile::Exploded
            }
            (Phase::Lost, CellState::Flagged | CellState::Questioned, CellContent::Mine) => {
                Tile::FlaggedMine
            }
            (Phase::Lost, _, CellContent::Mine) => Tile::Mine,
            (_, CellState::Hidden, _) => Tile::Hidden,
            (_, CellState::Flagged, _) => Tile::Flag,
            (_, CellState::Questioned, _) => Tile::Question,
            (_, CellState::Revealed, CellContent::Mine) => Tile::Exploded,
            (_, CellState::Revealed, CellContent::Empty) => Tile::Empty,
            (_, CellState::Revealed, CellContent::Adjacent(count)) => Tile::Number(count),
        }
    }
}

/// Reveals `start` and the connected region of empty cells around it plus its numbered border.
///
/// `start` must be a hidden, empty cell. Marked cells are neither revealed nor crossed. Returns how many cells were
/// revealed.
fn flood_reveal(board: &Board, cells: &mut Array2<CellState>, start: Coord2) -> CellCount {
    let mut visited = HashSet::new();
    visited.insert(start);
    let mut to_visit = vec![start];
    let mut opened = 0;

    while let Some(coords) = to_visit.pop() {
        cells[coords.to_nd_index()] = CellState::Revealed;
        opened += 1;

        if !board[coords].is_empty() {
            continue;
        }
        for neighbor in board.iter_neighbors(coords) {
            if cells[neighbor.to_nd_index()] == CellState::Hidden && visited.insert(neighbor) {
                log::trace!("flood reaches {:?} from {:?}", neighbor, coords);
                to_visit.push(neighbor);
            }
        }
    }

    opened
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(size: Coord2, mines: &[Coord2]) -> GameSession<FixedBoardGenerator> {
        GameSession::with_board(Board::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn reveal_hits_mine_and_sets_triggered_cell() {
        let mut session = session((2, 2), &[(0, 0)]);

        let outcome = session.reveal((0, 0));

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(session.phase(), Phase::Lost);
        assert_eq!(session.triggered_mine(), Some((0, 0)));
        assert_eq!(session.tile_at((0, 0)), Some(Tile::Exploded));
        assert_eq!(session.cell_state((1, 1)), Some(CellState::Hidden));
        assert_eq!(session.revealed_count(), 0);
    }

    #[test]
    fn reveal_flood_fill_opens_zero_region() {
        let mut session = session((3, 3), &[(2, 2)]);

        let outcome = session.reveal((0, 0));

        assert_eq!(outcome, RevealOutcome::Revealed);
        assert_eq!(session.tile_at((0, 0)), Some(Tile::Empty));
        assert_eq!(session.tile_at((1, 1)), Some(Tile::Number(1)));
        assert_eq!(session.tile_at((2, 2)), Some(Tile::Hidden));
        assert_eq!(session.revealed_count(), 8);
    }

    #[test]
    fn numbered_cell_does_not_expand() {
        let mut session = session((3, 3), &[(0, 0)]);

        assert_eq!(session.reveal((1, 1)), RevealOutcome::Revealed);

        assert_eq!(session.revealed_count(), 1);
        assert_eq!(session.cell_state((2, 2)), Some(CellState::Hidden));
    }

    #[test]
    fn flood_does_not_cross_marked_cells() {
        let mut session = session((1, 5), &[(0, 4)]);
        session.toggle_flag((0, 1));

        session.reveal((0, 0));

        assert_eq!(session.cell_state((0, 0)), Some(CellState::Revealed));
        assert_eq!(session.cell_state((0, 1)), Some(CellState::Flagged));
        assert_eq!(session.cell_state((0, 2)), Some(CellState::Hidden));
        assert_eq!(session.revealed_count(), 1);
    }

    #[test]
    fn marked_cells_cannot_be_revealed() {
        let mut session = session((2, 2), &[(1, 1)]);

        session.toggle_flag((0, 0));
        assert_eq!(session.reveal((0, 0)), RevealOutcome::NoChange);

        session.toggle_flag((0, 0));
        assert_eq!(session.cell_state((0, 0)), Some(CellState::Questioned));
        assert_eq!(session.reveal((0, 0)), RevealOutcome::NoChange);
        assert_eq!(session.phase(), Phase::AwaitingFirstClick);
    }

    #[test]
    fn three_state_cycle_restores_flag_count() {
        let mut session = session((2, 2), &[(1, 1)]);
        let start = session.flags_remaining();

        assert_eq!(session.toggle_flag((0, 1)), MarkOutcome::Changed);
        assert_eq!(session.flags_remaining(), start - 1);
        assert_eq!(session.toggle_flag((0, 1)), MarkOutcome::Changed);
        assert_eq!(session.cell_state((0, 1)), Some(CellState::Questioned));
        assert_eq!(session.flags_remaining(), start);
        assert_eq!(session.toggle_flag((0, 1)), MarkOutcome::Changed);

        assert_eq!(session.cell_state((0, 1)), Some(CellState::Hidden));
        assert_eq!(session.flags_remaining(), start);
    }

    #[test]
    fn two_state_cycle_skips_question_mark() {
        let mut session = session((2, 2), &[(1, 1)]).with_flag_cycle(FlagCycle::TwoState);

        session.toggle_flag((0, 1));
        assert_eq!(session.cell_state((0, 1)), Some(CellState::Flagged));
        session.toggle_flag((0, 1));
        assert_eq!(session.cell_state((0, 1)), Some(CellState::Hidden));
        assert_eq!(session.flags_remaining(), 1);
    }

    #[test]
    fn flagging_revealed_cell_is_no_op() {
        let mut session = session((2, 2), &[(1, 1)]);
        session.reveal((0, 0));

        assert_eq!(session.toggle_flag((0, 0)), MarkOutcome::NoChange);
        assert_eq!(session.flags_remaining(), 1);
    }

    #[test]
    fn winning_needs_flags_on_exactly_the_mines() {
        let mut session = session((2, 1), &[(0, 0)]);

        assert_eq!(session.reveal((1, 0)), RevealOutcome::Revealed);
        assert_eq!(session.phase(), Phase::InProgress);

        assert_eq!(session.toggle_flag((0, 0)), MarkOutcome::Won);
        assert_eq!(session.phase(), Phase::Won);
        assert!(session.is_finished());
        assert_eq!(session.tile_at((0, 0)), Some(Tile::Flag));
    }

    #[test]
    fn reveal_completes_board_when_mines_already_flagged() {
        let mut session = session((1, 3), &[(0, 0)]);
        session.toggle_flag((0, 0));

        assert_eq!(session.reveal((0, 2)), RevealOutcome::Won);
        assert_eq!(session.phase(), Phase::Won);
    }

    #[test]
    fn misflag_blocks_the_win() {
        let mut session = session((1, 4), &[(0, 0)]);
        session.toggle_flag((0, 3));
        session.reveal((0, 1));
        session.reveal((0, 2));
        session.toggle_flag((0, 0));

        assert_eq!(session.phase(), Phase::InProgress);

        // flag -> question, then reveal the misflagged cell
        session.toggle_flag((0, 3));
        session.toggle_flag((0, 3));
        assert_eq!(session.reveal((0, 3)), RevealOutcome::Won);
    }

    #[test]
    fn actions_after_loss_are_ignored() {
        let mut session = session((2, 2), &[(0, 0)]);
        session.reveal((0, 0));

        assert_eq!(session.reveal((1, 1)), RevealOutcome::NoChange);
        assert_eq!(session.toggle_flag((1, 1)), MarkOutcome::NoChange);
        assert_eq!(session.cell_state((1, 1)), Some(CellState::Hidden));
        assert_eq!(session.phase(), Phase::Lost);
    }

    #[test]
    fn loss_shows_every_mine() {
        let mut session = session((1, 5), &[(0, 0), (0, 2), (0, 4)]);
        session.toggle_flag((0, 2));
        session.toggle_flag((0, 1));
        session.toggle_flag((0, 1));

        assert_eq!(session.reveal((0, 4)), RevealOutcome::HitMine);

        assert_eq!(session.tile_at((0, 0)), Some(Tile::Mine));
        assert_eq!(session.tile_at((0, 1)), Some(Tile::Question));
        assert_eq!(session.tile_at((0, 2)), Some(Tile::FlaggedMine));
        assert_eq!(session.tile_at((0, 3)), Some(Tile::Hidden));
        assert_eq!(session.tile_at((0, 4)), Some(Tile::Exploded));
    }

    #[test]
    fn out_of_bounds_input_is_ignored() {
        let mut session = session((2, 2), &[(0, 0)]);

        assert_eq!(session.reveal((2, 0)), RevealOutcome::NoChange);
        assert_eq!(session.toggle_flag((0, 9)), MarkOutcome::NoChange);
        assert_eq!(session.tile_at((5, 5)), None);
        assert_eq!(session.phase(), Phase::AwaitingFirstClick);
    }

    #[test]
    fn mismatched_fixed_board_is_never_dealt() {
        let generator = FixedBoardGenerator::from_mine_coords((2, 2), &[(0, 0)]).unwrap();
        let mut session = GameSession::with_generator(GameConfig::new(5, 5, 1).unwrap(), generator);

        assert_eq!(session.reveal((4, 4)), RevealOutcome::NoChange);
        assert_eq!(session.reveal((1, 1)), RevealOutcome::NoChange);

        assert_eq!(session.phase(), Phase::AwaitingFirstClick);
        assert!(session.board().is_none());
        assert_eq!(session.cell_state((4, 4)), Some(CellState::Hidden));
        assert_eq!(session.toggle_flag((4, 4)), MarkOutcome::Changed);
    }

    #[test]
    fn timer_starts_on_first_reveal_and_freezes_at_end() {
        let mut session = session((2, 2), &[(0, 0)]);
        session.toggle_flag((1, 1));
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert!(session.board().is_none());

        session.reveal((0, 0));
        let frozen = session.elapsed();
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(session.elapsed(), frozen);
    }

    #[test]
    fn restart_discards_board_and_marks() {
        let mut session = GameSession::with_seed(GameConfig::beginner(), 9);
        session.toggle_flag((8, 8));
        session.reveal((4, 4));
        assert_eq!(session.phase(), Phase::InProgress);

        session.restart();

        assert_eq!(session.phase(), Phase::AwaitingFirstClick);
        assert!(session.board().is_none());
        assert_eq!(session.flags_remaining(), 10);
        assert_eq!(session.revealed_count(), 0);
        assert_eq!(session.cell_state((8, 8)), Some(CellState::Hidden));
        assert_eq!(session.elapsed(), Duration::ZERO);
    }
}
