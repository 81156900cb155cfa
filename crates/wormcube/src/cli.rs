use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use eyre::{Context, OptionExt, Result, bail};
use itertools::Itertools;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use wormcube_core::notation;
use wormcube_core::{
    ChaosClock, ChaosLevel, CubeState, Direction, MAX_SCRAMBLE_TWISTS, ManifoldMap, Move,
    ScrambleParams, ScrambleType, StickerPos, Timestamp, is_supported_size, manifold_neighbors,
};
use wormcube_log::verify::{ReplayVerification, verify};
use wormcube_log::{LogFile, Recorder};
use wormcube_prefs::Preferences;

use crate::{PROGRAM, display};

/// WORM³, a Rubik's cube with wormholes.
///
/// With no subcommand, prints a solved cube of the size from the user
/// preferences.
#[derive(clap::Parser, Debug)]
#[command(version, about, args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub subcommand: Option<Subcommand>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Print a cube, optionally scrambled.
    Show {
        #[command(flatten)]
        cube: CubeArgs,
        /// Also print the sudokube numbers of each face.
        #[arg(long)]
        values: bool,
    },
    /// Apply a sequence of moves to a cube and print the result.
    ///
    /// Twists are written as an axis, a slice, and an optional `'`, such as
    /// `X0` or `Y2'`. Flips are written as `@x,y,z,DIR`, such as `@1,1,2,PZ`.
    Play {
        #[command(flatten)]
        cube: CubeArgs,
        /// Moves to apply, separated by spaces.
        moves: Vec<String>,
        /// Write a session log to this file.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Flip a sticker and let chaos spread from it.
    Chaos {
        #[command(flatten)]
        cube: CubeArgs,
        /// Chaos level from 1 to 4. Defaults to the user preferences.
        #[arg(short, long)]
        level: Option<u8>,
        /// Sticker to flip first. Defaults to the center of the front face.
        #[arg(long, value_parser = parse_flip)]
        flip: Option<StickerPos>,
        /// Number of seconds of chaos to simulate.
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,
        /// Seed for the chaos random number generator.
        #[arg(long)]
        rng_seed: Option<u64>,
    },
    /// Print the neighbors and antipodal partner of a sticker.
    Neighbors {
        /// Number of layers along each axis.
        #[arg(short = 'n', long)]
        size: Option<u8>,
        x: u8,
        y: u8,
        z: u8,
        /// Direction the sticker faces, such as `PZ` or `NX`.
        dir: Direction,
    },
    /// Verify a session log file and print the results as JSON.
    Verify {
        /// Log file to verify, or `-` for stdin.
        #[arg(value_parser)]
        log_file: clio::Input,
    },
    /// Print the current user preferences.
    Prefs {
        /// Print the path of the preferences file instead.
        #[arg(long)]
        path: bool,
    },
}

/// Options shared by subcommands that build a cube.
#[derive(clap::Args, Debug)]
pub struct CubeArgs {
    /// Number of layers along each axis. Defaults to the user preferences.
    #[arg(short = 'n', long)]
    size: Option<u8>,
    /// Scramble the cube before doing anything else.
    #[arg(short, long)]
    scramble: bool,
    /// Number of scramble twists. Defaults to the user preferences.
    #[arg(long)]
    length: Option<u32>,
    /// Seed for the scramble.
    ///
    /// Scrambles with the same seed and timestamp are identical.
    #[arg(long)]
    seed: Option<String>,
    /// Timestamp for the scramble, such as `2025-01-01T00:00:00.000Z`.
    /// Defaults to the current time.
    #[arg(long)]
    time: Option<Timestamp>,
}
impl CubeArgs {
    fn size(&self, prefs: &Preferences) -> Result<u8> {
        checked_size(self.size.unwrap_or(prefs.cube_size))
    }

    fn scramble_params(&self, prefs: &Preferences) -> Option<ScrambleParams> {
        if !self.scramble {
            return None;
        }
        let ty = match self.length {
            Some(n) if n > MAX_SCRAMBLE_TWISTS => {
                log::warn!("scramble length {n} is too long; using {MAX_SCRAMBLE_TWISTS}");
                ScrambleType::Partial(MAX_SCRAMBLE_TWISTS)
            }
            Some(n) => ScrambleType::Partial(n),
            None => prefs.scramble_type(),
        };
        Some(match (&self.seed, self.time) {
            (None, None) => ScrambleParams::new(ty),
            (seed, time) => ScrambleParams::with_seed(
                ty,
                time.unwrap_or_else(Timestamp::now),
                seed.clone().unwrap_or_default(),
            ),
        })
    }
}

pub fn exec(args: Args) -> Result<()> {
    let prefs = Preferences::load();

    match args.subcommand {
        None => {
            let size = checked_size(prefs.cube_size)?;
            println!("{}", display::cube_string(&CubeState::new(size)));
        }

        Some(Subcommand::Show { cube, values }) => {
            let mut recorder = Recorder::new(cube.size(&prefs)?, ChaosLevel::OFF);
            if let Some(params) = cube.scramble_params(&prefs) {
                recorder.scramble(&params);
                print_scramble(&recorder);
            }
            let state = recorder.session().state();
            println!("{}", display::cube_string(state));
            if values {
                for dir in Direction::ALL {
                    println!("\n{dir} values\n{}", display::values_string(state, dir));
                }
            }
        }

        Some(Subcommand::Play { cube, moves, log }) => {
            let moves = notation::parse_moves(&moves.join(" ")).context("error parsing moves")?;

            let mut recorder = Recorder::new(cube.size(&prefs)?, prefs.chaos_level());
            if let Some(params) = cube.scramble_params(&prefs) {
                recorder.scramble(&params);
                print_scramble(&recorder);
            }
            for mv in moves {
                if !recorder.session().is_valid_move(mv) {
                    log::warn!("ignoring move {mv}, which does not fit this cube");
                }
                for victory in recorder.apply(mv) {
                    println!("Victory: {victory} after {mv}");
                }
            }

            let session = recorder.session();
            println!("{}\n", display::cube_string(session.state()));
            println!("{}", display::win_string(session.win_conditions()));
            println!(
                "{} twists, {} flips",
                session.twist_count(),
                session.flip_count(),
            );

            let log_path = match log {
                Some(path) => Some(path),
                None if prefs.record_log => Some(default_log_path(&prefs)?),
                None => None,
            };
            if let Some(path) = log_path {
                save_log(recorder, &path)?;
            }
        }

        Some(Subcommand::Chaos {
            cube,
            level,
            flip,
            seconds,
            rng_seed,
        }) => {
            let level = match level {
                Some(level) => ChaosLevel::new(level)
                    .ok_or_eyre("chaos level must be between 0 and 4")?,
                None => prefs.chaos_level(),
            };
            if !level.is_on() {
                bail!("chaos is off; pass --level to turn it on");
            }

            let size = cube.size(&prefs)?;
            let mut recorder = Recorder::new(size, level);
            if let Some(params) = cube.scramble_params(&prefs) {
                recorder.scramble(&params);
                print_scramble(&recorder);
            }
            let center = size / 2;
            let flip = flip.unwrap_or(StickerPos::new(center, center, size - 1, Direction::PZ));
            if !recorder.session().is_valid_move(Move::Flip(flip)) {
                bail!("{flip} is not a sticker on this cube");
            }
            recorder.apply(Move::Flip(flip));

            let rng_seed = rng_seed.unwrap_or_else(rand::random);
            log::info!("chaos rng seed: {rng_seed}");
            let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);

            let mut clock = ChaosClock::new(level);
            let elapsed =
                Duration::try_from_secs_f64(seconds).context("invalid number of seconds")?;
            let ticks = clock.advance(elapsed);
            for i in 1..=ticks {
                let tick = recorder.chaos_tick(&mut rng);
                let Some(source) = tick.source else {
                    println!("tick {i}: the cube is stable");
                    break;
                };
                let flipped = tick.flipped();
                println!(
                    "tick {i}: source {source}, flipped [{}]",
                    flipped.iter().join(" "),
                );
            }

            let session = recorder.session();
            println!("\n{}\n", display::cube_string(session.state()));
            println!("{} stickers flipped", session.state().flipped_count());
            println!("{}", display::win_string(session.win_conditions()));
        }

        Some(Subcommand::Neighbors { size, x, y, z, dir }) => {
            let size = checked_size(size.unwrap_or(prefs.cube_size))?;
            let pos = StickerPos::new(x, y, z, dir);
            if !pos.is_on_surface(size) {
                bail!("{pos} is not on the surface of a {size}x{size}x{size} cube");
            }
            let manifold = ManifoldMap::build(&CubeState::new(size));
            println!("neighbors: {}", manifold_neighbors(pos, size).iter().join(" "));
            match manifold.partner(pos) {
                Some(partner) => println!("partner: {partner}"),
                None => println!("partner: none"),
            }
        }

        Some(Subcommand::Verify { mut log_file }) => {
            let mut s = String::new();
            log_file
                .read_to_string(&mut s)
                .context("error reading log file")?;
            let (log_file, warnings) =
                LogFile::deserialize(&s).context("error deserializing log file")?;
            for warning in warnings {
                log::warn!("{warning}");
            }

            let output: Vec<VerifyOutput> = log_file
                .sessions
                .iter()
                .map(|session| {
                    let digest = session.digest_v1_hex()?;
                    Ok(match verify(session) {
                        Ok(verification) => VerifyOutput::Verified {
                            digest,
                            verification,
                        },
                        Err(e) => VerifyOutput::Failed {
                            digest,
                            error: e.to_string(),
                        },
                    })
                })
                .collect::<Result<_>>()?;
            write_json_output(&output)?;
        }

        Some(Subcommand::Prefs { path }) => {
            if path {
                println!("{}", wormcube_prefs::prefs_file()?.display());
            } else {
                print!("{}", serde_norway::to_string(&prefs)?);
            }
        }
    }

    Ok(())
}

/// Result of verifying one session in a log file.
#[derive(Serialize, Debug)]
#[serde(untagged)]
enum VerifyOutput {
    Verified {
        digest: String,
        #[serde(flatten)]
        verification: ReplayVerification,
    },
    Failed {
        digest: String,
        error: String,
    },
}

fn checked_size(size: u8) -> Result<u8> {
    if !is_supported_size(size) {
        bail!(
            "unsupported cube size {size}; expected {} to {}",
            wormcube_core::SUPPORTED_SIZES.start(),
            wormcube_core::SUPPORTED_SIZES.end(),
        );
    }
    Ok(size)
}

fn parse_flip(s: &str) -> Result<StickerPos, String> {
    let s = s.strip_prefix('@').unwrap_or(s);
    match notation::parse_move(&format!("@{s}")) {
        Ok(Move::Flip(pos)) => Ok(pos),
        _ => Err(format!("expected a sticker such as 1,1,2,PZ; got {s:?}")),
    }
}

fn print_scramble(recorder: &Recorder) {
    let session = recorder.session();
    println!(
        "Scramble: {}\n",
        notation::format_moves(session.scramble_twists()),
    );
}

fn default_log_path(prefs: &Preferences) -> Result<PathBuf> {
    let time = Timestamp::now().file_stem();
    Ok(prefs.log_dir()?.join(format!("session_{time}.json")))
}

fn save_log(recorder: Recorder, path: &std::path::Path) -> Result<()> {
    let log_file = LogFile {
        program: Some(PROGRAM.clone()),
        sessions: vec![recorder.finish()],
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).context("error creating log directory")?;
    }
    let contents = log_file.serialize().context("error serializing log file")?;
    std::fs::write(path, contents).context("error writing log file")?;
    log::info!("saved session log to {}", path.display());
    Ok(())
}

fn write_json_output<T: Serialize>(value: &T) -> Result<()> {
    serde_json::to_writer_pretty(std::io::stdout(), value)?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_flip() {
        assert_eq!(parse_flip("1,1,2,PZ"), Ok(StickerPos::new(1, 1, 2, Direction::PZ)));
        assert_eq!(parse_flip("@0,2,1,nx"), Ok(StickerPos::new(0, 2, 1, Direction::NX)));
        assert!(parse_flip("X0").is_err());
    }

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from(["wormcube", "play", "-n", "4", "-s", "X0", "@1,1,3,PZ"])
            .unwrap();
        let Some(Subcommand::Play { cube, moves, log }) = args.subcommand else {
            panic!("expected play subcommand");
        };
        assert_eq!(cube.size, Some(4));
        assert!(cube.scramble);
        assert_eq!(moves, ["X0", "@1,1,3,PZ"]);
        assert_eq!(log, None);

        let args = Args::try_parse_from(["wormcube", "neighbors", "1", "1", "2", "PZ"]).unwrap();
        assert!(matches!(
            args.subcommand,
            Some(Subcommand::Neighbors { dir: Direction::PZ, .. }),
        ));

        assert!(Args::try_parse_from(["wormcube", "neighbors", "1", "1", "2", "QQ"]).is_err());
    }

    #[test]
    fn test_scramble_params() {
        let prefs = Preferences::default();
        let args = Args::try_parse_from([
            "wormcube",
            "show",
            "--scramble",
            "--length",
            "7",
            "--seed",
            "abc",
            "--time",
            "2025-01-01T00:00:00.000Z",
        ])
        .unwrap();
        let Some(Subcommand::Show { cube, .. }) = args.subcommand else {
            panic!("expected show subcommand");
        };
        let params = cube.scramble_params(&prefs).unwrap();
        assert_eq!(params.ty, ScrambleType::Partial(7));
        assert_eq!(params.seed, "abc");
        assert_eq!(params.time.to_string(), "2025-01-01T00:00:00.000Z");
        assert_eq!(cube.size(&prefs).unwrap(), 3);

        let args = Args::try_parse_from(["wormcube", "show", "-s", "--length", "4294967295"])
            .unwrap();
        let Some(Subcommand::Show { cube, .. }) = args.subcommand else {
            panic!("expected show subcommand");
        };
        let params = cube.scramble_params(&prefs).unwrap();
        assert_eq!(params.ty, ScrambleType::Partial(MAX_SCRAMBLE_TWISTS));
    }

    #[test]
    fn test_default_log_path() {
        let prefs = Preferences {
            log_dir: Some(PathBuf::from("logs")),
            ..Default::default()
        };
        let path = default_log_path(&prefs).unwrap();
        assert_eq!(path.parent(), Some(std::path::Path::new("logs")));
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("session_") && name.ends_with("Z.json"));
        assert!(!name.contains(':'));
    }

    #[test]
    fn test_checked_size() {
        assert!(checked_size(3).is_ok());
        assert!(checked_size(2).is_err());
        assert!(checked_size(6).is_err());
    }
}
