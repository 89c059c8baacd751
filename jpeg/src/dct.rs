//! Separable floating point 8x8 DCT (ITU-T T.81 A.3.3).

use std::f32::consts::{FRAC_1_SQRT_2, PI};
use std::sync::OnceLock;

/// `basis[u][x] = C(u) / 2 * cos((2x + 1) u pi / 16)`
fn basis() -> &'static [[f32; 8]; 8] {
    static BASIS: OnceLock<[[f32; 8]; 8]> = OnceLock::new();
    BASIS.get_or_init(|| {
        let mut b = [[0f32; 8]; 8];
        for (u, row) in b.iter_mut().enumerate() {
            let c = if u == 0 { FRAC_1_SQRT_2 } else { 1. };
            for (x, v) in row.iter_mut().enumerate() {
                *v = c / 2. * ((2 * x + 1) as f32 * u as f32 * PI / 16.).cos();
            }
        }
        b
    })
}

/// Forward DCT of a level-shifted block in natural order.
pub fn forward(block: &[f32; 64]) -> [f32; 64] {
    let b = basis();
    let mut tmp = [0f32; 64];
    // rows
    for y in 0..8 {
        for u in 0..8 {
            tmp[y * 8 + u] = (0..8).map(|x| b[u][x] * block[y * 8 + x]).sum();
        }
    }
    let mut out = [0f32; 64];
    // columns
    for u in 0..8 {
        for v in 0..8 {
            out[v * 8 + u] = (0..8).map(|y| b[v][y] * tmp[y * 8 + u]).sum();
        }
    }
    out
}

/// Inverse DCT of a dequantized block in natural order.
/// The result is still level-shifted.
pub fn inverse(coefficients: &[f32; 64]) -> [f32; 64] {
    let b = basis();
    let mut tmp = [0f32; 64];
    for v in 0..8 {
        for x in 0..8 {
            tmp[v * 8 + x] = (0..8).map(|u| b[u][x] * coefficients[v * 8 + u]).sum();
        }
    }
    let mut out = [0f32; 64];
    for x in 0..8 {
        for y in 0..8 {
            out[y * 8 + x] = (0..8).map(|v| b[v][y] * tmp[v * 8 + x]).sum();
        }
    }
    out
}
