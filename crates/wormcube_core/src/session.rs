use std::collections::BTreeSet;

use rand::Rng;

use crate::{
    ChaosLevel, ChaosTick, CubeState, ManifoldMap, Move, ScrambleParams, StickerPos, Twist,
    Victory, WinConditions, chaos_tick, detect_win_conditions, is_possible_chaos_tick, scramble,
};

/// Snapshot of the cube before or after a move, used for undo and redo.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HistoryEntry {
    state: CubeState,
    mv: Move,
}

/// Cube in play, with its history and the victories reached so far.
///
/// Every mutating method returns the victory conditions that became true for
/// the first time since the last scramble. An unscrambled cube never counts
/// as a victory.
#[derive(Debug, Clone)]
pub struct Session {
    state: CubeState,
    manifold: ManifoldMap,
    chaos_level: ChaosLevel,

    scrambled: bool,
    scramble: Option<ScrambleParams>,
    scramble_twists: Vec<Twist>,

    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    twist_count: u64,
    flip_count: u64,

    victories: BTreeSet<Victory>,
    newly_won: Vec<Victory>,
}
impl Session {
    /// Constructs a session with a solved cube of the given size.
    pub fn new(size: u8) -> Self {
        let state = CubeState::new(size);
        let manifold = ManifoldMap::build(&state);
        Self {
            state,
            manifold,
            chaos_level: ChaosLevel::OFF,

            scrambled: false,
            scramble: None,
            scramble_twists: vec![],

            undo_stack: vec![],
            redo_stack: vec![],
            twist_count: 0,
            flip_count: 0,

            victories: BTreeSet::new(),
            newly_won: vec![],
        }
    }

    /// Returns the current cube state.
    pub fn state(&self) -> &CubeState {
        &self.state
    }
    /// Returns the number of layers along each axis.
    pub fn size(&self) -> u8 {
        self.state.size()
    }
    /// Returns the manifold map for the current cube.
    pub fn manifold(&self) -> &ManifoldMap {
        &self.manifold
    }
    /// Returns the chaos level.
    pub fn chaos_level(&self) -> ChaosLevel {
        self.chaos_level
    }
    /// Sets the chaos level.
    pub fn set_chaos_level(&mut self, level: ChaosLevel) {
        self.chaos_level = level;
    }

    /// Returns the parameters of the last scramble, if the cube has been
    /// scrambled since it was last reset and the scramble was generated
    /// deterministically.
    pub fn scramble_params(&self) -> Option<&ScrambleParams> {
        self.scramble.as_ref()
    }
    /// Returns the twists of the last scramble.
    pub fn scramble_twists(&self) -> &[Twist] {
        &self.scramble_twists
    }
    /// Returns whether the cube has been scrambled since it was last reset.
    pub fn is_scrambled(&self) -> bool {
        self.scrambled
    }

    /// Returns the number of twists done, not counting undone twists.
    pub fn twist_count(&self) -> u64 {
        self.twist_count
    }
    /// Returns the number of flips done, not counting undone flips.
    pub fn flip_count(&self) -> u64 {
        self.flip_count
    }
    /// Iterates over the moves that can be undone, oldest first.
    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.undo_stack.iter().map(|entry| entry.mv)
    }
    /// Returns whether there is a move to undo.
    pub fn has_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }
    /// Returns whether there is a move to redo.
    pub fn has_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Evaluates every victory condition on the current cube.
    pub fn win_conditions(&self) -> WinConditions {
        detect_win_conditions(&self.state)
    }
    /// Returns every victory reached since the last scramble.
    pub fn victories(&self) -> &BTreeSet<Victory> {
        &self.victories
    }
    /// Returns the victories reached for the first time by the last change to
    /// the cube.
    pub fn newly_won(&self) -> &[Victory] {
        &self.newly_won
    }

    /// Resets the cube to solved and clears all history.
    pub fn reset(&mut self) {
        let chaos_level = self.chaos_level;
        *self = Self::new(self.size());
        self.chaos_level = chaos_level;
    }
    /// Replaces the cube with a solved cube of a different size and clears
    /// all history.
    pub fn resize(&mut self, size: u8) {
        let chaos_level = self.chaos_level;
        *self = Self::new(size);
        self.chaos_level = chaos_level;
    }

    /// Resets the cube and then scrambles it.
    pub fn scramble(&mut self, params: &ScrambleParams) {
        let scrambled = scramble(self.size(), params);
        self.apply_scramble(Some(scrambled.params), scrambled.twists);
    }

    /// Resets the cube and then applies a known scramble sequence, such as
    /// one loaded from a log file. `params` is `None` if the sequence was not
    /// generated deterministically.
    pub fn apply_scramble(&mut self, params: Option<ScrambleParams>, twists: Vec<Twist>) {
        self.reset();
        self.state = self.state.twists(twists.iter().copied());
        self.scrambled = true;
        self.scramble = params;
        self.scramble_twists = twists;
        log::debug!(
            "scrambled {0}x{0}x{0} cube with {1} twists",
            self.size(),
            self.scramble_twists.len(),
        );
    }

    /// Returns whether a move would change the cube.
    pub fn is_valid_move(&self, mv: Move) -> bool {
        match mv {
            Move::Twist(twist) => twist.is_valid_for(self.size()),
            Move::Flip(pos) => self.manifold.partner(pos).is_some(),
        }
    }

    /// Applies a move. Invalid moves are ignored.
    pub fn apply(&mut self, mv: Move) -> Vec<Victory> {
        match mv {
            Move::Twist(twist) => self.twist(twist),
            Move::Flip(pos) => self.flip(pos),
        }
    }

    /// Twists a slice. Twists of slices that do not exist are ignored.
    pub fn twist(&mut self, twist: Twist) -> Vec<Victory> {
        if !self.is_valid_move(Move::Twist(twist)) {
            self.newly_won.clear();
            return vec![];
        }
        let new_state = self.state.twist(twist);
        self.push_move(new_state, Move::Twist(twist));
        self.twist_count += 1;
        self.update_victories()
    }

    /// Flips a sticker and its antipodal partner. Positions without a sticker
    /// are ignored.
    pub fn flip(&mut self, pos: StickerPos) -> Vec<Victory> {
        if !self.is_valid_move(Move::Flip(pos)) {
            self.newly_won.clear();
            return vec![];
        }
        let new_state = self.state.flip_sticker_pair(pos, &self.manifold);
        self.push_move(new_state, Move::Flip(pos));
        self.flip_count += 1;
        self.update_victories()
    }

    /// Undoes the last move, restoring the cube exactly as it was before.
    /// Returns the move that was undone.
    pub fn undo(&mut self) -> Option<Move> {
        let HistoryEntry { state, mv } = self.undo_stack.pop()?;
        let after = std::mem::replace(&mut self.state, state);
        self.redo_stack.push(HistoryEntry { state: after, mv });
        self.adjust_counts(mv, false);
        self.update_victories();
        Some(mv)
    }

    /// Redoes the last undone move. Returns the move that was redone.
    pub fn redo(&mut self) -> Option<Move> {
        let HistoryEntry { state, mv } = self.redo_stack.pop()?;
        let before = std::mem::replace(&mut self.state, state);
        self.undo_stack.push(HistoryEntry { state: before, mv });
        self.adjust_counts(mv, true);
        self.update_victories();
        Some(mv)
    }

    /// Runs one chaos tick at the session's chaos level.
    ///
    /// If anything flipped, the undo and redo history is cleared, since the
    /// earlier snapshots no longer lead to the current cube.
    pub fn chaos_tick(&mut self, rng: &mut impl Rng) -> ChaosTick {
        let tick = chaos_tick(&self.state, self.chaos_level, &self.manifold, rng);
        if tick.flipped().is_empty() {
            self.newly_won.clear();
        } else {
            self.state = tick.state.clone();
            self.clear_history();
            self.update_victories();
        }
        tick
    }

    /// Applies flips that were produced by a chaos tick, such as when
    /// replaying a log.
    ///
    /// Returns `None` and leaves the session unchanged if chaos is off or the
    /// flips could not have come from one chaos tick on the current cube (see
    /// [`is_possible_chaos_tick()`]).
    pub fn apply_chaos_flips(&mut self, flips: &[StickerPos]) -> Option<Vec<Victory>> {
        if !self.chaos_level.is_on() || !is_possible_chaos_tick(&self.state, flips) {
            return None;
        }
        if flips.is_empty() {
            self.newly_won.clear();
            return Some(vec![]);
        }
        for &pos in flips {
            self.state = self.state.flip_sticker_pair(pos, &self.manifold);
        }
        self.clear_history();
        Some(self.update_victories())
    }

    fn push_move(&mut self, new_state: CubeState, mv: Move) {
        let before = std::mem::replace(&mut self.state, new_state);
        self.undo_stack.push(HistoryEntry { state: before, mv });
        self.redo_stack.clear();
    }

    fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn adjust_counts(&mut self, mv: Move, forward: bool) {
        let counter = match mv {
            Move::Twist(_) => &mut self.twist_count,
            Move::Flip(_) => &mut self.flip_count,
        };
        *counter = if forward {
            *counter + 1
        } else {
            counter.saturating_sub(1)
        };
    }

    fn update_victories(&mut self) -> Vec<Victory> {
        self.newly_won.clear();
        if !self.is_scrambled() {
            return vec![];
        }
        for victory in self.win_conditions().achieved() {
            if self.victories.insert(victory) {
                log::info!("victory: {victory}");
                self.newly_won.push(victory);
            }
        }
        self.newly_won.clone()
    }
}
