use rand::Rng;
use wormcube_core::notation::format_moves;
use wormcube_core::{
    ChaosLevel, ChaosTick, Move, ScrambleParams, Session, Timestamp, Twist, Victory,
};

use crate::{LogEvent, LoggedSession, Scramble};

/// [`Session`] that records everything that happens to it.
#[derive(Debug, Clone)]
pub struct Recorder {
    session: Session,
    initial_chaos_level: ChaosLevel,
    scramble: Option<Scramble>,
    log: Vec<LogEvent>,
    started: Timestamp,
}
impl Recorder {
    /// Starts recording a new session with a solved cube.
    pub fn new(size: u8, chaos_level: ChaosLevel) -> Self {
        let mut session = Session::new(size);
        session.set_chaos_level(chaos_level);
        let started = Timestamp::now();
        Self {
            session,
            initial_chaos_level: chaos_level,
            scramble: None,
            log: vec![LogEvent::StartSession {
                time: Some(started),
            }],
            started,
        }
    }

    /// Returns the session being recorded.
    pub fn session(&self) -> &Session {
        &self.session
    }
    /// Returns the events recorded so far.
    pub fn events(&self) -> &[LogEvent] {
        &self.log
    }

    /// Scrambles the cube.
    ///
    /// A session log holds at most one scramble. Scrambling again starts over
    /// from a fresh log.
    pub fn scramble(&mut self, params: &ScrambleParams) {
        if self.scramble.is_some() {
            log::warn!("discarding previous scramble from session log");
            *self = Self::new(self.session.size(), self.session.chaos_level());
        }
        self.session.scramble(params);
        let twists = format_moves(self.session.scramble_twists());
        self.scramble = Some(Scramble::new(params.clone(), twists));
        self.log.push(LogEvent::Scramble {
            time: Some(Timestamp::now()),
        });
    }

    /// Applies a move. Moves that do not change the cube are not recorded.
    pub fn apply(&mut self, mv: Move) -> Vec<Victory> {
        if !self.session.is_valid_move(mv) {
            return vec![];
        }
        match self.log.last_mut() {
            Some(LogEvent::Moves(moves)) => {
                moves.push(' ');
                moves.push_str(&mv.to_string());
            }
            _ => self.log.push(LogEvent::Moves(mv.to_string())),
        }
        let won = self.session.apply(mv);
        self.record_victories(&won);
        won
    }

    /// Twists a slice. See [`Recorder::apply()`].
    pub fn twist(&mut self, twist: Twist) -> Vec<Victory> {
        self.apply(Move::Twist(twist))
    }

    /// Undoes the last move, if there is one.
    pub fn undo(&mut self) -> Option<Move> {
        let mv = self.session.undo()?;
        self.log.push(LogEvent::Undo {
            time: Some(Timestamp::now()),
        });
        let won = self.session.newly_won().to_vec();
        self.record_victories(&won);
        Some(mv)
    }

    /// Redoes the last undone move, if there is one.
    pub fn redo(&mut self) -> Option<Move> {
        let mv = self.session.redo()?;
        self.log.push(LogEvent::Redo {
            time: Some(Timestamp::now()),
        });
        let won = self.session.newly_won().to_vec();
        self.record_victories(&won);
        Some(mv)
    }

    /// Changes the chaos level.
    pub fn set_chaos_level(&mut self, level: ChaosLevel) {
        if level == self.session.chaos_level() {
            return;
        }
        self.session.set_chaos_level(level);
        self.log.push(LogEvent::SetChaosLevel {
            time: Some(Timestamp::now()),
            level,
        });
    }

    /// Runs one chaos tick. Ticks that flip nothing are not recorded.
    pub fn chaos_tick(&mut self, rng: &mut impl Rng) -> ChaosTick {
        let tick = self.session.chaos_tick(rng);
        let flipped = tick.flipped();
        if !flipped.is_empty() {
            self.log.push(LogEvent::Chaos {
                time: Some(Timestamp::now()),
                flips: format_moves(flipped.into_iter().map(Move::Flip)),
            });
            let won = self.session.newly_won().to_vec();
            self.record_victories(&won);
        }
        tick
    }

    /// Ends the session and returns its log.
    pub fn finish(mut self) -> LoggedSession {
        let now = Timestamp::now();
        self.log.push(LogEvent::EndSession { time: Some(now) });
        LoggedSession {
            size: self.session.size(),
            chaos_level: self.initial_chaos_level,
            victories: self.session.victories().iter().copied().collect(),
            duration: Some(self.millis_since_start(now)),
            scramble: self.scramble,
            log: self.log,
        }
    }

    fn millis_since_start(&self, now: Timestamp) -> i64 {
        now.millis_since(self.started).max(0)
    }

    fn record_victories(&mut self, won: &[Victory]) {
        let now = Timestamp::now();
        for &condition in won {
            self.log.push(LogEvent::Victory {
                time: Some(now),
                duration: Some(self.millis_since_start(now)),
                condition,
            });
        }
    }
}
