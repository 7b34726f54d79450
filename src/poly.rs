//! Quadratic least-squares fitting and prediction.
//!
//! Both the builder and the accessors evaluate a span's polynomial through
//! [`predict`], so the prediction used to compute a residual at build time is
//! bit-for-bit the prediction it is added back to at read time. Everything is
//! plain IEEE-754 `f64` arithmetic in a fixed order (no fused multiply-add),
//! which keeps the results identical across platforms.

/// Number of coefficients per span polynomial.
pub const POLY_COEF_CNT: usize = 3;

/// Coefficients `[c0, c1, c2]` of `c0 + c1*x + c2*x^2`.
pub type Poly = [f64; POLY_COEF_CNT];

/// Predictions are clamped to this magnitude before conversion to integer.
const PREDICT_LIMIT: f64 = (1u64 << 52) as f64;

/// Evaluate `poly` at span-local offset `x`, rounded half to even.
#[inline]
pub fn predict(poly: &Poly, x: u32) -> i64 {
    let x = x as f64;
    let v = (poly[0] + (poly[1] + poly[2] * x) * x).round_ties_even();
    v.clamp(-PREDICT_LIMIT, PREDICT_LIMIT) as i64
}

/// Least-squares fit of `ys[i]` against `x = i`.
///
/// Fewer than three points get an exact lower-degree fit. A singular system
/// falls back to the mean.
pub fn fit(ys: &[u32]) -> Poly {
    match ys.len() {
        0 => [0.0; POLY_COEF_CNT],
        1 => [ys[0] as f64, 0.0, 0.0],
        2 => [ys[0] as f64, ys[1] as f64 - ys[0] as f64, 0.0],
        _ => solve_normal(ys),
    }
}

fn solve_normal(ys: &[u32]) -> Poly {
    // s[k] = sum x^k, t[k] = sum x^k * y
    let mut s = [0.0f64; 5];
    let mut t = [0.0f64; 3];
    for (i, &y) in ys.iter().enumerate() {
        let x = i as f64;
        let mut xk = 1.0f64;
        for (k, sk) in s.iter_mut().enumerate() {
            *sk += xk;
            if let Some(tk) = t.get_mut(k) {
                *tk += xk * y as f64;
            }
            xk *= x;
        }
    }

    let a = [[s[0], s[1], s[2]], [s[1], s[2], s[3]], [s[2], s[3], s[4]]];
    let d = det3(&a);
    if d == 0.0 {
        return [t[0] / s[0], 0.0, 0.0];
    }

    let mut coef = [0.0f64; POLY_COEF_CNT];
    for (j, c) in coef.iter_mut().enumerate() {
        let mut m = a;
        for (r, row) in m.iter_mut().enumerate() {
            row[j] = t[r];
        }
        *c = det3(&m) / d;
    }
    coef
}

#[inline]
fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}
