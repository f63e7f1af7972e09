//! Deterministic board helpers used during arbiter initialization (spec
//! §4.5 steps 2-4): reward generation and the elliptical spawn layout.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The ellipse-shrink constant from spec §4.5 ("`k ≈ 2.75-3.0`"). The
/// original reference implementation uses `2.75` exactly; reproduced here
/// bit-for-bit since test fixtures assert concrete spawn coordinates.
const ELLIPSE_K: f64 = 2.75;

/// Fills a row-major `width*height` board with rewards in `1..=9`, seeded
/// deterministically so fixtures can assert exact boards for a given seed.
pub fn generate_rewards(width: u16, height: u16, seed: u64) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let cells = width as usize * height as usize;
    (0..cells).map(|_| rng.gen_range(1..=9)).collect()
}

/// Computes agent `i`'s spawn coordinates on a deterministic ellipse
/// centered on the board (spec §4.5 step 4).
///
/// `x = cx + round(rx * cos(theta_i))`, `y = cy + round(ry * sin(theta_i))`,
/// `theta_i = 2*pi*i/N`, clamped into `[0, width) x [0, height)`.
pub fn spawn_position(width: u16, height: u16, agent_count: u32, i: u32) -> (u16, u16) {
    let cx = width as i32 / 2;
    let cy = height as i32 / 2;

    let mut rx = width as f64 / ELLIPSE_K;
    let mut ry = height as f64 / ELLIPSE_K;
    if rx < 1.0 {
        rx = 1.0;
    }
    if ry < 1.0 {
        ry = 1.0;
    }

    let theta = 2.0 * std::f64::consts::PI * f64::from(i) / f64::from(agent_count);
    let tx = cx + (rx * theta.cos()).round() as i32;
    let ty = cy + (ry * theta.sin()).round() as i32;

    let x = tx.clamp(0, width as i32 - 1) as u16;
    let y = ty.clamp(0, height as i32 - 1) as u16;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_positions_are_in_bounds() {
        for n in 1..=9u32 {
            for i in 0..n {
                let (x, y) = spawn_position(10, 10, n, i);
                assert!(x < 10);
                assert!(y < 10);
            }
        }
    }

    #[test]
    fn spawn_is_deterministic() {
        let a = spawn_position(20, 14, 4, 2);
        let b = spawn_position(20, 14, 4, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn single_agent_spawns_near_center_plus_radius() {
        // theta_0 = 0 => cos=1, sin=0 => (cx + round(rx), cy)
        let (x, y) = spawn_position(11, 11, 1, 0);
        let cx = 5i32;
        let rx = (11.0f64 / ELLIPSE_K).round() as i32;
        assert_eq!(x as i32, (cx + rx).clamp(0, 10));
        assert_eq!(y, 5);
    }

    #[test]
    fn rewards_are_in_range_and_reproducible() {
        let a = generate_rewards(10, 10, 42);
        let b = generate_rewards(10, 10, 42);
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| (1..=9).contains(&v)));
    }

    #[test]
    fn different_seeds_usually_differ() {
        let a = generate_rewards(10, 10, 1);
        let b = generate_rewards(10, 10, 2);
        assert_ne!(a, b);
    }
}
