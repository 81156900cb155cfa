use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Axis, CubeState, Sign, Timestamp, Twist};

/// Number of twists in a full scramble, per layer of the cube.
pub const FULL_SCRAMBLE_TWISTS_PER_LAYER: u32 = 10;

/// Maximum number of twists in any scramble.
pub const MAX_SCRAMBLE_TWISTS: u32 = 1000;

/// Parameters to deterministically generate a twist sequence to scramble a
/// cube.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScrambleParams {
    /// Type of scramble to generate.
    pub ty: ScrambleType,
    /// Timestamp when the scramble was requested.
    pub time: Timestamp,
    /// Random seed, sourced from the OS random number generator.
    pub seed: String,
}
impl ScrambleParams {
    /// Generates a new scramble based on the current time and a random number.
    pub fn new(ty: ScrambleType) -> Self {
        let time = Timestamp::now();
        let seed = Self::seed_from_time_and_u64(time, rand::rng().random());
        Self { ty, time, seed }
    }

    /// Generates scramble parameters from a fixed seed, for reproducible
    /// scrambles.
    pub fn with_seed(ty: ScrambleType, time: Timestamp, seed: impl Into<String>) -> Self {
        let seed = seed.into();
        Self { ty, time, seed }
    }

    /// Returns the random number generator that determines the scramble.
    pub fn rng(&self) -> ChaCha12Rng {
        let mut sha256 = Sha256::new();
        sha256.update(self.time.to_string().as_bytes());
        sha256.update((self.seed.len() as u64).to_le_bytes());
        sha256.update(self.seed.as_bytes());
        let digest = sha256.finalize();

        let mut seed = [0_u8; 32];
        seed.copy_from_slice(&digest);
        ChaCha12Rng::from_seed(seed)
    }

    fn seed_from_time_and_u64(time: Timestamp, random_u64: u64) -> String {
        format!("{time}_{random_u64}")
    }
}

/// Type of scramble to generate.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScrambleType {
    /// Full scramble.
    Full,
    /// Partial scramble of a specific number of moves.
    Partial(u32),
}
impl ScrambleType {
    /// Returns the number of twists to apply to a cube of the given size,
    /// which is never more than [`MAX_SCRAMBLE_TWISTS`].
    pub fn twist_count(self, size: u8) -> u32 {
        let n = match self {
            ScrambleType::Full => FULL_SCRAMBLE_TWISTS_PER_LAYER * u32::from(size),
            ScrambleType::Partial(n) => n,
        };
        n.min(MAX_SCRAMBLE_TWISTS)
    }

    /// Returns whether the scramble asks for more than
    /// [`MAX_SCRAMBLE_TWISTS`] twists.
    pub fn is_too_long(self) -> bool {
        matches!(self, ScrambleType::Partial(n) if n > MAX_SCRAMBLE_TWISTS)
    }
}

/// Output of scrambling a cube.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrambledCube {
    /// Parameters used to generate the scramble.
    pub params: ScrambleParams,
    /// Scramble twists applied.
    pub twists: Vec<Twist>,
    /// State of the cube after scrambling.
    pub state: CubeState,
}

/// Returns a uniformly random twist of a cube of the given size, or `None` if
/// the cube has no layers.
pub fn random_twist(size: u8, rng: &mut impl Rng) -> Option<Twist> {
    if size == 0 {
        return None;
    }
    let axis = Axis::ALL[rng.random_range(0..3)];
    let slice = rng.random_range(0..size);
    let dir = if rng.random_bool(0.5) {
        Sign::Pos
    } else {
        Sign::Neg
    };
    Some(Twist::new(axis, slice, dir))
}

/// Generates the scramble twist sequence for a cube of the given size.
///
/// No twist is immediately followed by its inverse.
pub fn scramble_twists(size: u8, params: &ScrambleParams) -> Vec<Twist> {
    let mut rng = params.rng();
    let count = params.ty.twist_count(size) as usize;
    let mut twists: Vec<Twist> = Vec::with_capacity(count);
    while twists.len() < count {
        let Some(twist) = random_twist(size, &mut rng) else {
            break;
        };
        if twists.last().is_some_and(|&prev| prev.rev() == twist) {
            continue;
        }
        twists.push(twist);
    }
    twists
}

/// Scrambles a solved cube of the given size.
pub fn scramble(size: u8, params: &ScrambleParams) -> ScrambledCube {
    let twists = scramble_twists(size, params);
    let state = CubeState::new(size).twists(twists.iter().copied());
    ScrambledCube {
        params: params.clone(),
        twists,
        state,
    }
}
