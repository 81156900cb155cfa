//! Chaos mode: flips that spread on their own over time.

use std::fmt;
use std::time::Duration;

use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{CubeState, ManifoldMap, StickerPos, face_neighbors};

/// Chance, relative to the level's base rate, that a flip spreads to each
/// neighbor of the source.
pub const NEIGHBOR_SPREAD_FACTOR: f64 = 0.6;

/// Intensity of chaos mode, from 0 (off) to 4.
///
/// Levels above 4 are clamped to 4 when deserializing.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "u8", into = "u8")]
pub struct ChaosLevel(u8);
impl From<u8> for ChaosLevel {
    fn from(value: u8) -> Self {
        Self::saturating(value)
    }
}
impl From<ChaosLevel> for u8 {
    fn from(value: ChaosLevel) -> Self {
        value.0
    }
}
impl fmt::Display for ChaosLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl ChaosLevel {
    /// Chaos mode disabled.
    pub const OFF: Self = Self(0);
    /// Highest chaos level.
    pub const MAX: Self = Self(4);

    /// Constructs a chaos level, or returns `None` if it is greater than 4.
    pub fn new(level: u8) -> Option<Self> {
        (level <= Self::MAX.0).then_some(Self(level))
    }
    /// Constructs a chaos level, clamping it to the range 0 to 4.
    pub fn saturating(level: u8) -> Self {
        Self(level.min(Self::MAX.0))
    }
    /// Returns the level as an integer from 0 to 4.
    pub fn get(self) -> u8 {
        self.0
    }
    /// Returns whether chaos mode is enabled.
    pub fn is_on(self) -> bool {
        self.0 > 0
    }

    /// Returns the time between chaos ticks, or `None` if chaos is off.
    pub fn period(self) -> Option<Duration> {
        let ms = match self.0 {
            1 => 1000,
            2 => 750,
            3 => 500,
            4 => 350,
            _ => return None,
        };
        Some(Duration::from_millis(ms))
    }

    /// Returns the base probability used for spreading flips.
    pub fn base(self) -> f64 {
        match self.0 {
            1 => 0.1,
            2 => 0.2,
            3 => 0.35,
            4 => 0.5,
            _ => 0.0,
        }
    }

    /// Returns the chance that the source of a chaos tick flips again, given
    /// how many times it has been flipped: `base · ln(flips + 1)`, at most 1.
    pub fn self_flip_chance(self, flips: u32) -> f64 {
        (self.base() * f64::from(flips).ln_1p()).clamp(0.0, 1.0)
    }

    /// Returns the chance that a chaos tick spreads to each neighbor of its
    /// source: `base · 0.6`.
    pub fn spread_chance(self) -> f64 {
        (self.base() * NEIGHBOR_SPREAD_FACTOR).clamp(0.0, 1.0)
    }
}

/// Flip that spread from one sticker to a neighbor during a chaos tick.
///
/// The renderer draws these as waves traveling from `from` to `to`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChaosWave {
    /// Source of the wave.
    pub from: StickerPos,
    /// Sticker that was flipped.
    pub to: StickerPos,
}

/// Result of one chaos tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaosTick {
    /// New state of the cube.
    pub state: CubeState,
    /// Sticker chosen as the source, or `None` if no sticker was unstable.
    pub source: Option<StickerPos>,
    /// Whether the source flipped again.
    pub self_flipped: bool,
    /// Flips that spread to neighbors of the source.
    pub waves: Vec<ChaosWave>,
}
impl ChaosTick {
    /// Returns every position passed to [`CubeState::flip_sticker_pair()`]
    /// during the tick, in order. Replaying these flips reproduces the tick.
    pub fn flipped(&self) -> Vec<StickerPos> {
        let source = self.source.filter(|_| self.self_flipped);
        source
            .into_iter()
            .chain(self.waves.iter().map(|wave| wave.to))
            .collect()
    }
}

/// Returns every sticker that is currently flipped and on the surface.
pub fn unstable_stickers(state: &CubeState) -> Vec<StickerPos> {
    let size = state.size();
    state
        .stickers()
        .filter(|(pos, sticker)| sticker.is_flipped() && pos.is_on_surface(size))
        .map(|(pos, _)| pos)
        .collect()
}

/// Advances chaos mode by one tick.
///
/// A random unstable sticker is chosen as the source. It flips again with
/// probability `base · ln(flips + 1)`, and each of its neighbors on the same
/// face flips with probability `base · 0.6`.
pub fn chaos_tick(
    state: &CubeState,
    level: ChaosLevel,
    manifold: &ManifoldMap,
    rng: &mut impl Rng,
) -> ChaosTick {
    let mut ret = ChaosTick {
        state: state.clone(),
        source: None,
        self_flipped: false,
        waves: vec![],
    };
    if !level.is_on() {
        return ret;
    }

    let unstable = unstable_stickers(state);
    if unstable.is_empty() {
        return ret;
    }
    let source = unstable[rng.random_range(0..unstable.len())];
    ret.source = Some(source);

    let flips = state.sticker(source).map_or(0, |s| s.flips);
    if rng.random_bool(level.self_flip_chance(flips)) {
        ret.state = ret.state.flip_sticker_pair(source, manifold);
        ret.self_flipped = true;
    }

    let spread_chance = level.spread_chance();
    for neighbor in face_neighbors(source, state.size()) {
        if ret.state.sticker(neighbor).is_some() && rng.random_bool(spread_chance) {
            ret.state = ret.state.flip_sticker_pair(neighbor, manifold);
            ret.waves.push(ChaosWave {
                from: source,
                to: neighbor,
            });
        }
    }

    log::trace!(
        "chaos tick from {source}: self_flipped={}, {} waves",
        ret.self_flipped,
        ret.waves.len(),
    );
    ret
}

/// Returns whether `flips` could be the [`ChaosTick::flipped()`] list of a
/// single chaos tick on `state`.
///
/// The first flip may be the source flipping again. Every other flip must be
/// a distinct neighbor, on the same face, of a source that is unstable in
/// `state`. An empty list is always possible.
pub fn is_possible_chaos_tick(state: &CubeState, flips: &[StickerPos]) -> bool {
    let Some(&first) = flips.first() else {
        return true;
    };
    if !flips.iter().all_unique() {
        return false;
    }
    let size = state.size();
    let unstable = unstable_stickers(state);
    let spreads_from = |source: StickerPos, waves: &[StickerPos]| {
        let neighbors = face_neighbors(source, size);
        unstable.contains(&source) && waves.iter().all(|w| neighbors.contains(w))
    };
    spreads_from(first, &flips[1..]) || unstable.iter().any(|&source| spreads_from(source, flips))
}

/// Accumulates elapsed time and reports when chaos ticks are due.
///
/// The engine never waits; the caller advances the clock from its own frame
/// loop and runs [`chaos_tick()`] once per due tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChaosClock {
    level: ChaosLevel,
    accumulated: Duration,
}
impl ChaosClock {
    /// Constructs a clock for a chaos level.
    pub fn new(level: ChaosLevel) -> Self {
        Self {
            level,
            accumulated: Duration::ZERO,
        }
    }
    /// Returns the chaos level.
    pub fn level(&self) -> ChaosLevel {
        self.level
    }
    /// Changes the chaos level and resets the accumulated time.
    pub fn set_level(&mut self, level: ChaosLevel) {
        self.level = level;
        self.accumulated = Duration::ZERO;
    }

    /// Advances the clock and returns the number of ticks that are now due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let Some(period) = self.level.period() else {
            self.accumulated = Duration::ZERO;
            return 0;
        };
        self.accumulated += elapsed;
        let mut ticks = 0;
        while self.accumulated >= period {
            self.accumulated -= period;
            ticks += 1;
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::Direction;

    #[test]
    fn test_levels() {
        assert_eq!(ChaosLevel::new(5), None);
        assert_eq!(ChaosLevel::saturating(9), ChaosLevel::MAX);
        assert_eq!(ChaosLevel::OFF.period(), None);
        let periods: Vec<u64> = (1..=4)
            .filter_map(|i| ChaosLevel::new(i)?.period())
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(periods, [1000, 750, 500, 350]);
        let bases: Vec<f64> = (0..=4).map(|i| ChaosLevel::saturating(i).base()).collect();
        assert_eq!(bases, [0.0, 0.1, 0.2, 0.35, 0.5]);
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}",
        );
    }

    #[test]
    fn test_chances() {
        let bases = [0.0, 0.1, 0.2, 0.35, 0.5];
        for (i, base) in bases.into_iter().enumerate() {
            let level = ChaosLevel::saturating(i as u8);
            assert_close(level.spread_chance(), base * 0.6);
            assert_close(level.self_flip_chance(0), 0.0);
            assert_close(level.self_flip_chance(1), base * 2.0_f64.ln());
            assert_close(level.self_flip_chance(4), base * 5.0_f64.ln());
        }
        // ln(1 + 100) is well over 2, so the chance is clamped.
        assert_close(ChaosLevel::MAX.self_flip_chance(100), 1.0);
        assert_close(ChaosLevel::saturating(1).self_flip_chance(100), 0.1 * 101.0_f64.ln());
    }

    #[test]
    fn test_tick_rates() {
        // Each of the two unstable stickers is a face center, flipped once,
        // with four neighbors on its face.
        let cube = CubeState::new(3);
        let manifold = ManifoldMap::build(&cube);
        let cube = cube.flip_sticker_pair(StickerPos::new(1, 1, 2, Direction::PZ), &manifold);
        let level = ChaosLevel::MAX;
        let mut rng = ChaCha8Rng::seed_from_u64(2024);

        const TICKS: u32 = 10_000;
        let mut self_flips = 0;
        let mut waves = 0;
        for _ in 0..TICKS {
            let tick = chaos_tick(&cube, level, &manifold, &mut rng);
            self_flips += u32::from(tick.self_flipped);
            waves += tick.waves.len() as u32;
        }

        let self_rate = f64::from(self_flips) / f64::from(TICKS);
        let wave_rate = f64::from(waves) / f64::from(TICKS);
        let expected_self = 0.5 * 2.0_f64.ln();
        let expected_waves = 4.0 * 0.5 * 0.6;
        assert!(
            (self_rate - expected_self).abs() < 0.02,
            "self-flip rate {self_rate}, expected {expected_self}",
        );
        assert!(
            (wave_rate - expected_waves).abs() < 0.05,
            "wave rate {wave_rate}, expected {expected_waves}",
        );
    }

    #[test]
    fn test_possible_chaos_ticks() {
        let cube = CubeState::new(3);
        let manifold = ManifoldMap::build(&cube);
        assert!(is_possible_chaos_tick(&cube, &[]));
        let center = StickerPos::new(1, 1, 2, Direction::PZ);
        // Nothing is unstable on a solved cube.
        assert!(!is_possible_chaos_tick(&cube, &[center]));

        let cube = cube.flip_sticker_pair(center, &manifold);
        let up = StickerPos::new(1, 2, 2, Direction::PZ);
        let left = StickerPos::new(0, 1, 2, Direction::PZ);
        assert!(is_possible_chaos_tick(&cube, &[center]));
        assert!(is_possible_chaos_tick(&cube, &[center, up, left]));
        assert!(is_possible_chaos_tick(&cube, &[up, left]));
        assert!(!is_possible_chaos_tick(&cube, &[up, up]));
        // A corner is not a neighbor of the center.
        let corner = StickerPos::new(0, 0, 2, Direction::PZ);
        assert!(!is_possible_chaos_tick(&cube, &[center, corner]));
        // A neighbor across an edge is not on the same face.
        let across = StickerPos::new(1, 2, 2, Direction::PY);
        assert!(!is_possible_chaos_tick(&cube, &[up, across]));
    }

    #[test]
    fn test_clock() {
        let mut clock = ChaosClock::new(ChaosLevel::saturating(3));
        assert_eq!(clock.advance(Duration::from_millis(400)), 0);
        assert_eq!(clock.advance(Duration::from_millis(400)), 1);
        assert_eq!(clock.advance(Duration::from_millis(1200)), 2);
        clock.set_level(ChaosLevel::OFF);
        assert_eq!(clock.advance(Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_no_unstable_stickers() {
        let cube = CubeState::new(3);
        let manifold = ManifoldMap::build(&cube);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tick = chaos_tick(&cube, ChaosLevel::MAX, &manifold, &mut rng);
        assert_eq!(tick.source, None);
        assert_eq!(tick.state, cube);
    }

    #[test]
    fn test_chaos_off() {
        let cube = CubeState::new(3);
        let manifold = ManifoldMap::build(&cube);
        let cube = cube.flip_sticker_pair(StickerPos::new(1, 1, 2, Direction::PZ), &manifold);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tick = chaos_tick(&cube, ChaosLevel::OFF, &manifold, &mut rng);
        assert_eq!(tick.state, cube);
        assert!(tick.waves.is_empty());
    }

    #[test]
    fn test_chaos_spreads_from_unstable_stickers() {
        let cube = CubeState::new(4);
        let manifold = ManifoldMap::build(&cube);
        let cube = cube.flip_sticker_pair(StickerPos::new(1, 2, 3, Direction::PZ), &manifold);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let mut state = cube.clone();
        let mut total_waves = 0;
        for _ in 0..50 {
            let before = state.clone();
            let unstable = unstable_stickers(&before);
            let tick = chaos_tick(&before, ChaosLevel::MAX, &manifold, &mut rng);
            let source = tick.source.expect("some sticker is flipped");
            assert!(unstable.contains(&source));

            let mut targets: Vec<StickerPos> = tick.waves.iter().map(|w| w.to).collect();
            targets.sort();
            targets.dedup();
            assert_eq!(targets.len(), tick.waves.len());
            for wave in &tick.waves {
                assert_eq!(wave.from, source);
                assert_eq!(wave.to.dir, source.dir);
                assert!(before.sticker(wave.to).is_some());
            }

            assert!(is_possible_chaos_tick(&before, &tick.flipped()));

            // Replaying the reported flips reproduces the tick.
            let replayed = tick
                .flipped()
                .into_iter()
                .fold(before, |s, pos| s.flip_sticker_pair(pos, &manifold));
            assert_eq!(replayed, tick.state);

            total_waves += tick.waves.len();
            state = tick.state;
            if unstable_stickers(&state).is_empty() {
                state = cube.clone();
            }
        }
        assert!(total_waves > 0);
    }
}
