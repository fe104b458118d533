use super::Vector2d;
use cgmath::prelude::*;
use cgmath::{Basis2, Rad};

/// Rotates a vector 90 degrees clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Rotates a vector by `angle` radians.
///
/// Positive angles turn the positive x-axis towards the positive y-axis.
pub fn rotate(vec: Vector2d, angle: f64) -> Vector2d {
    if angle == 0.0 {
        return vec;
    }
    Basis2::from_angle(Rad(angle)).rotate_vector(vec)
}

/// The signed angle in radians which rotates `from` onto `to`, in `[-pi, pi]`.
pub fn rotation(from: Vector2d, to: Vector2d) -> f64 {
    from.angle(to).0
}

/// Cosine of the angle between two vectors.
///
/// Returns 1 if either vector has zero length, so that a missing direction
/// never looks like a turn.
pub fn cos_between(a: Vector2d, b: Vector2d) -> f64 {
    let norm = a.magnitude() * b.magnitude();
    if norm == 0.0 {
        1.0
    } else {
        (a.dot(b) / norm).clamp(-1.0, 1.0)
    }
}

/// Normalises a vector, returning `fallback` if it has zero length.
pub fn normalize_or(vec: Vector2d, fallback: Vector2d) -> Vector2d {
    let mag = vec.magnitude();
    if mag > 0.0 {
        vec / mag
    } else {
        fallback
    }
}

/// Finds a root of `f` in `[a, b]` by bisection.
///
/// The caller must ensure that `f(a)` and `f(b)` differ in sign (or that one
/// of them is zero). Iterates until the interval is narrower than `tol`.
pub fn bisect(f: impl Fn(f64) -> f64, mut a: f64, mut b: f64, tol: f64) -> f64 {
    let mut fa = f(a);
    let fb = f(b);
    if fa == 0.0 {
        return a;
    }
    if fb == 0.0 {
        return b;
    }
    for _ in 0..128 {
        let mid = 0.5 * (a + b);
        if b - a < tol {
            return mid;
        }
        let fm = f(mid);
        if fm == 0.0 {
            return mid;
        }
        if fm.signum() == fa.signum() {
            a = mid;
            fa = fm;
        } else {
            b = mid;
        }
    }
    0.5 * (a + b)
}
