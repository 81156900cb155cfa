use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::sticker_triples;
use crate::*;

#[test]
fn test_antipodal_involution() {
    for c in 1..=6 {
        assert_eq!(ANTIPODAL_COLOR[ANTIPODAL_COLOR[c] as usize], c as u8);
    }
}

#[test]
fn test_solved_state_is_antipodally_consistent() {
    for size in 1..=5 {
        let cube = make_cubies(size);
        for (pos, sticker) in cube.stickers() {
            let partner = cube.sticker(pos.antipode(size)).unwrap();
            assert_eq!(sticker.orig, partner.orig.antipodal(), "{pos}");
        }
    }
}

#[test]
fn test_flip_involution() {
    let cube = CubeState::new(4).twists([
        Twist::new(Axis::X, 1, Sign::Pos),
        Twist::new(Axis::Z, 3, Sign::Neg),
    ]);
    let manifold = build_manifold_grid_map(&cube);
    for (pos, _) in cube.stickers() {
        let partner = manifold.partner(pos).unwrap();
        let once = cube.flip_sticker_pair(pos, &manifold);
        let twice = once.flip_sticker_pair(pos, &build_manifold_grid_map(&once));
        for p in [pos, partner] {
            let before = cube.sticker(p).unwrap();
            let after = twice.sticker(p).unwrap();
            assert_eq!(after.curr, before.curr);
            assert_eq!(after.flips, before.flips + 2);
        }
    }
}

#[test]
fn test_rotation_has_order_four() {
    for size in 1..=5 {
        let cube = CubeState::new(size).flip_sticker_pair(
            StickerPos::new(0, 0, 0, Direction::NX),
            &ManifoldMap::build(&CubeState::new(size)),
        );
        for axis in Axis::ALL {
            for slice in 0..size {
                for dir in [Sign::Pos, Sign::Neg] {
                    let once = cube.rotate_slice(axis, slice, dir);
                    let four = (0..3).fold(once, |s, _| s.rotate_slice(axis, slice, dir));
                    assert_eq!(four, cube, "{axis}{slice} {dir}");
                }
            }
        }
    }
}

#[test]
fn test_rotations_preserve_stickers() {
    let size = 5;
    let original = CubeState::new(size);
    let manifold = ManifoldMap::build(&original);
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut cube = original.clone();
    for i in 0..60 {
        if i % 7 == 0 {
            let stickers: Vec<StickerPos> = cube.stickers().map(|(p, _)| p).collect();
            let pos = stickers[rand::Rng::random_range(&mut rng, 0..stickers.len())];
            cube = cube.flip_sticker_pair(pos, &manifold);
        }
        let before = sticker_triples(&cube);
        let twist = random_twist(size, &mut rng).unwrap();
        cube = cube.twist(twist);
        assert_eq!(sticker_triples(&cube), before);
        for (pos, _) in cube.stickers() {
            assert!(pos.is_on_surface(size));
        }
    }
}

#[test]
fn test_chaos_never_invents_stickers() {
    let cube = CubeState::new(3);
    let manifold = ManifoldMap::build(&cube);
    let mut state = cube.flip_sticker_pair(StickerPos::new(2, 1, 1, Direction::PX), &manifold);
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    for _ in 0..200 {
        let tick = chaos_tick(&state, ChaosLevel::MAX, &manifold, &mut rng);
        for wave in &tick.waves {
            for p in [wave.from, wave.to] {
                assert!(state.sticker(p).is_some());
                assert!(p.is_on_surface(3));
            }
        }
        state = tick.state;
    }
}
