//! Functions for verifying session logs by replaying them.

use std::collections::BTreeSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use wormcube_core::notation::{self, NotationError};
use wormcube_core::{
    MAX_SCRAMBLE_TWISTS, Move, ScrambleParams, ScrambleType, Session, StickerPos, Timestamp,
    Victory, WinConditions, is_supported_size, scramble_twists,
};

use super::*;

/// Error produced when a session log does not replay to the outcome it claims.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ReplayError {
    #[error("unsupported cube size {0}")]
    UnsupportedSize(u8),
    #[error("bad notation in event {event}: {source}")]
    BadNotation {
        event: usize,
        source: NotationError,
    },
    #[error("scramble twists do not match the scramble parameters")]
    ScrambleMismatch,
    #[error(
        "scramble has {twists} twists, but at most {max} are allowed",
        max = MAX_SCRAMBLE_TWISTS,
    )]
    ScrambleTooLong { twists: u64 },
    #[error("event {event} scrambles, but the log has no scramble")]
    MissingScramble { event: usize },
    #[error("event {event} scrambles a second time")]
    DuplicateScramble { event: usize },
    #[error("event {event} undoes, but there is nothing to undo")]
    NothingToUndo { event: usize },
    #[error("event {event} redoes, but there is nothing to redo")]
    NothingToRedo { event: usize },
    #[error("event {event} is a chaos tick, but chaos is off")]
    ChaosWhileOff { event: usize },
    #[error("event {event} flips {pos} by chaos, but there is no sticker there")]
    InvalidChaosFlip { event: usize, pos: StickerPos },
    #[error("event {event} has flips that could not come from one chaos tick")]
    ImpossibleChaosTick { event: usize },
    #[error("event {event} claims {victory} which was not reached by the preceding move")]
    UnearnedVictory { event: usize, victory: Victory },
    #[error("log claims victories {claimed:?}, but replay reached {replayed:?}")]
    ClaimedVictoryMismatch {
        claimed: Vec<Victory>,
        replayed: Vec<Victory>,
    },
}

/// Info about a replayed session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReplayVerification {
    /// Number of layers along each axis.
    pub size: u8,
    /// Parameters used to determine the scramble, or `None` if the scramble
    /// was not generated deterministically.
    pub scramble: Option<ScrambleParams>,
    /// Number of twists in the scramble.
    pub scramble_twist_count: usize,
    /// Number of twists in the solution, not counting undone twists.
    pub twist_count: u64,
    /// Number of flips in the solution, not counting undone flips.
    pub flip_count: u64,
    /// Number of flips made by chaos ticks.
    pub chaos_flip_count: u64,
    /// Victory conditions reached, in order.
    pub victories: Vec<Victory>,
    /// Victory conditions that hold on the final cube.
    pub final_conditions: WinConditions,
    /// Whether the log contains a single play session.
    pub single_session: bool,
    /// Timestamp when the last victory was reached, if known.
    pub time_completed: Option<Timestamp>,
}

/// Replays a session log and checks that it reaches the victories it claims.
pub fn verify(logged: &LoggedSession) -> Result<ReplayVerification, ReplayError> {
    if !is_supported_size(logged.size) {
        return Err(ReplayError::UnsupportedSize(logged.size));
    }

    let scramble = logged
        .scramble
        .as_ref()
        .map(|scramble| check_scramble(logged.size, scramble))
        .transpose()?;

    let mut session = Session::new(logged.size);
    session.set_chaos_level(logged.chaos_level);

    let mut victories = vec![];
    let mut last_won: Vec<Victory> = vec![];
    let mut chaos_flip_count = 0;
    let mut session_starts = 0;
    let mut time_completed = None;
    for (event, log_event) in logged.log.iter().enumerate() {
        match log_event {
            LogEvent::Scramble { .. } => {
                let Some((params, twists)) = scramble.clone() else {
                    return Err(ReplayError::MissingScramble { event });
                };
                if session.is_scrambled() {
                    return Err(ReplayError::DuplicateScramble { event });
                }
                session.apply_scramble(params, twists);
                last_won.clear();
            }
            LogEvent::Moves(moves) => {
                last_won.clear();
                for mv in parse(moves, event)? {
                    last_won.extend(session.apply(mv));
                }
            }
            LogEvent::Undo { .. } => {
                session
                    .undo()
                    .ok_or(ReplayError::NothingToUndo { event })?;
                last_won = session.newly_won().to_vec();
            }
            LogEvent::Redo { .. } => {
                session
                    .redo()
                    .ok_or(ReplayError::NothingToRedo { event })?;
                last_won = session.newly_won().to_vec();
            }
            LogEvent::Chaos { flips, .. } => {
                if !session.chaos_level().is_on() {
                    return Err(ReplayError::ChaosWhileOff { event });
                }
                let flips: Vec<StickerPos> = parse(flips, event)?
                    .into_iter()
                    .map(|mv| match mv {
                        Move::Flip(pos) => Ok(pos),
                        Move::Twist(twist) => Err(ReplayError::BadNotation {
                            event,
                            source: NotationError::InvalidMove {
                                token: twist.to_string(),
                                index: 0,
                            },
                        }),
                    })
                    .try_collect()?;
                if let Some(&pos) = flips
                    .iter()
                    .find(|&&pos| !session.is_valid_move(Move::Flip(pos)))
                {
                    return Err(ReplayError::InvalidChaosFlip { event, pos });
                }
                last_won = session
                    .apply_chaos_flips(&flips)
                    .ok_or(ReplayError::ImpossibleChaosTick { event })?;
                chaos_flip_count += flips.len() as u64;
            }
            LogEvent::SetChaosLevel { level, .. } => session.set_chaos_level(*level),
            LogEvent::Victory {
                time, condition, ..
            } => {
                // Each victory is announced once per move that reached it.
                let Some(i) = last_won.iter().position(|v| v == condition) else {
                    return Err(ReplayError::UnearnedVictory {
                        event,
                        victory: *condition,
                    });
                };
                last_won.remove(i);
                victories.push(*condition);
                time_completed = time.or(time_completed);
            }
            LogEvent::StartSession { .. } => session_starts += 1,
            LogEvent::EndSession { .. } => (),
        }
    }

    let claimed: BTreeSet<Victory> = logged.victories.iter().copied().collect();
    let announced: BTreeSet<Victory> = victories.iter().copied().collect();
    if &claimed != session.victories() || announced != claimed {
        return Err(ReplayError::ClaimedVictoryMismatch {
            claimed: logged.victories.clone(),
            replayed: session.victories().iter().copied().collect(),
        });
    }

    log::info!(
        "verified {0}x{0}x{0} session with {1} victories",
        logged.size,
        victories.len(),
    );

    Ok(ReplayVerification {
        size: logged.size,
        scramble: session.scramble_params().cloned(),
        scramble_twist_count: session.scramble_twists().len(),
        twist_count: session.twist_count(),
        flip_count: session.flip_count(),
        chaos_flip_count,
        victories,
        final_conditions: session.win_conditions(),
        single_session: session_starts <= 1,
        time_completed,
    })
}

/// Parses the scramble twists and checks them against the scramble
/// parameters, if there are any.
fn check_scramble(
    size: u8,
    scramble: &Scramble,
) -> Result<(Option<ScrambleParams>, Vec<wormcube_core::Twist>), ReplayError> {
    if let ScrambleType::Partial(n) = scramble.ty
        && scramble.ty.is_too_long()
    {
        return Err(ReplayError::ScrambleTooLong { twists: n.into() });
    }
    let twists = notation::parse_twists(&scramble.twists)
        .map_err(|source| ReplayError::BadNotation { event: 0, source })?;
    if twists.len() > MAX_SCRAMBLE_TWISTS as usize {
        return Err(ReplayError::ScrambleTooLong {
            twists: twists.len() as u64,
        });
    }
    let params = scramble.params();
    if let Some(params) = &params {
        if scramble_twists(size, params) != twists {
            return Err(ReplayError::ScrambleMismatch);
        }
    } else {
        log::warn!("scramble was not generated deterministically");
    }
    Ok((params, twists))
}

fn parse(moves: &str, event: usize) -> Result<Vec<Move>, ReplayError> {
    notation::parse_moves(moves).map_err(|source| ReplayError::BadNotation { event, source })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use wormcube_core::{ChaosLevel, Direction, Twist};

    use super::*;

    fn solved_session(chaos: bool) -> LoggedSession {
        let mut recorder = Recorder::new(3, ChaosLevel::OFF);
        let time = "2025-04-05T06:07:08.090Z".parse().unwrap();
        recorder.scramble(&ScrambleParams::with_seed(ScrambleType::Partial(4), time, "v"));
        let solution: Vec<Twist> = recorder
            .session()
            .scramble_twists()
            .iter()
            .rev()
            .map(|t| t.rev())
            .collect();

        let flip = StickerPos::new(2, 2, 2, Direction::PY);
        recorder.apply(Move::Flip(flip));
        if chaos {
            recorder.set_chaos_level(ChaosLevel::MAX);
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
            for _ in 0..5 {
                recorder.chaos_tick(&mut rng);
            }
            recorder.set_chaos_level(ChaosLevel::OFF);
            // Chaos clears the undo history, so undo the flips by hand.
            let flipped: Vec<StickerPos> = recorder
                .session()
                .state()
                .stickers()
                .filter(|(pos, s)| s.is_flipped() && pos.dir.sign() == wormcube_core::Sign::Pos)
                .map(|(pos, _)| pos)
                .collect();
            for pos in flipped {
                recorder.apply(Move::Flip(pos));
            }
        } else {
            recorder.undo();
            recorder.redo();
            recorder.undo();
        }
        for twist in solution {
            recorder.twist(twist);
        }
        recorder.finish()
    }

    #[test]
    fn test_verify_recorded_session() {
        let logged = solved_session(false);
        let verification = verify(&logged).unwrap();
        assert_eq!(verification.size, 3);
        assert_eq!(verification.scramble_twist_count, 4);
        assert_eq!(verification.flip_count, 0);
        assert_eq!(verification.chaos_flip_count, 0);
        assert!(verification.final_conditions.rubiks);
        assert!(verification.single_session);
        assert!(verification.victories.contains(&Victory::Ultimate));
        assert!(verification.time_completed.is_some());
    }

    #[test]
    fn test_verify_chaos_session() {
        let logged = solved_session(true);
        let verification = verify(&logged).unwrap();
        assert!(verification.final_conditions.ultimate);
        assert!(verification.chaos_flip_count > 0);
    }

    #[test]
    fn test_verify_after_serialization() {
        let log_file = LogFile {
            program: None,
            sessions: vec![solved_session(false)],
        };
        let (loaded, _) = LogFile::deserialize(&log_file.serialize().unwrap()).unwrap();
        assert_eq!(
            verify(&loaded.sessions[0]),
            verify(&log_file.sessions[0]),
        );
    }

    #[test]
    fn test_tampered_logs() {
        let logged = solved_session(false);

        let mut bad = logged.clone();
        bad.size = 7;
        assert_eq!(verify(&bad), Err(ReplayError::UnsupportedSize(7)));

        let mut bad = logged.clone();
        if let Some(scramble) = &mut bad.scramble {
            scramble.twists = "X0 X0 X0 X0".to_owned();
        }
        assert_eq!(verify(&bad), Err(ReplayError::ScrambleMismatch));

        let mut bad = logged.clone();
        bad.victories.push(Victory::Worm);
        assert!(matches!(
            verify(&bad),
            Err(ReplayError::ClaimedVictoryMismatch { .. }),
        ));

        let mut bad = logged.clone();
        bad.log.retain(|event| !matches!(event, LogEvent::Moves(_)));
        assert!(verify(&bad).is_err());

        let mut bad = logged;
        bad.log.insert(2, LogEvent::Moves("X0 Q7".to_owned()));
        assert!(matches!(
            verify(&bad),
            Err(ReplayError::BadNotation { event: 2, .. }),
        ));
    }

    #[test]
    fn test_tampered_chaos() {
        let logged = solved_session(false);
        assert_eq!(logged.chaos_level, ChaosLevel::OFF);
        let with_chaos = |logged: &LoggedSession, flips: &str| {
            let mut bad = logged.clone();
            bad.log.insert(
                2,
                LogEvent::Chaos {
                    time: None,
                    flips: flips.to_owned(),
                },
            );
            bad
        };

        let bad = with_chaos(&logged, "@1,1,1,PZ @9,9,9,PX");
        assert_eq!(verify(&bad), Err(ReplayError::ChaosWhileOff { event: 2 }));

        let mut logged = logged;
        logged.chaos_level = ChaosLevel::MAX;
        let bad = with_chaos(&logged, "@9,9,9,PX");
        assert_eq!(
            verify(&bad),
            Err(ReplayError::InvalidChaosFlip {
                event: 2,
                pos: StickerPos::new(9, 9, 9, Direction::PX),
            }),
        );

        // Right after the scramble nothing is flipped, so nothing can spread.
        let bad = with_chaos(&logged, "@1,1,2,PZ");
        assert_eq!(verify(&bad), Err(ReplayError::ImpossibleChaosTick { event: 2 }));
    }

    #[test]
    fn test_duplicate_victory() {
        let mut logged = solved_session(false);
        let i = logged
            .log
            .iter()
            .position(|event| matches!(event, LogEvent::Victory { .. }))
            .unwrap();
        let duplicate = logged.log[i].clone();
        logged.log.insert(i + 1, duplicate);
        assert!(matches!(
            verify(&logged),
            Err(ReplayError::UnearnedVictory { event, .. }) if event == i + 1,
        ));
    }

    #[test]
    fn test_scramble_too_long() {
        let mut logged = solved_session(false);
        if let Some(scramble) = &mut logged.scramble {
            scramble.ty = ScrambleType::Partial(u32::MAX);
        }
        assert_eq!(
            verify(&logged),
            Err(ReplayError::ScrambleTooLong {
                twists: u32::MAX.into(),
            }),
        );

        let mut logged = solved_session(false);
        if let Some(scramble) = &mut logged.scramble {
            scramble.seed = None;
            scramble.twists = vec!["X0"; MAX_SCRAMBLE_TWISTS as usize + 1].join(" ");
        }
        assert!(matches!(
            verify(&logged),
            Err(ReplayError::ScrambleTooLong { .. }),
        ));
    }

    #[test]
    fn test_nondeterministic_scramble() {
        let mut logged = solved_session(false);
        if let Some(scramble) = &mut logged.scramble {
            scramble.seed = None;
        }
        let verification = verify(&logged).unwrap();
        assert_eq!(verification.scramble, None);
    }
}
