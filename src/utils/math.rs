//! # Weighted Selection
//!
//! Random selection helpers used by template and clutter selection.

use rand::Rng;

/// Picks an index from `weights` with probability proportional to its weight.
///
/// Weights that are NaN or not positive never get picked. A `+inf` weight is
/// picked immediately (the first one wins). Returns `None` for an empty
/// slice or when nothing has positive weight.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use roomweave::weighted_index;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// assert_eq!(weighted_index(&[f32::INFINITY, 1.0], &mut rng), Some(0));
/// assert_eq!(weighted_index(&[0.0, 0.0], &mut rng), None);
/// assert_eq!(weighted_index(&[], &mut rng), None);
/// ```
pub fn weighted_index<R: Rng + ?Sized>(weights: &[f32], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let mut total = 0.0f32;
    for (i, &w) in weights.iter().enumerate() {
        if w == f32::INFINITY {
            return Some(i);
        }
        if w > 0.0 {
            total += w;
        }
    }

    let r: f32 = rng.gen();
    let mut cumulative = 0.0f32;
    for (i, &w) in weights.iter().enumerate() {
        if w.is_nan() || w <= 0.0 {
            continue;
        }
        cumulative += w / total;
        if cumulative >= r {
            return Some(i);
        }
    }

    None
}

/// Rolls a chance expressed in tenths.
///
/// `chance` is truncated to one decimal place before the roll, so `0.59`
/// behaves like `0.5`. A chance of `1.0` always succeeds and `0.0` never does.
pub fn roll_tenths<R: Rng + ?Sized>(chance: f32, rng: &mut R) -> bool {
    let tenths = (chance.clamp(0.0, 1.0) * 10.0) as u32;
    rng.gen_range(0..10u32) < tenths
}

/// Rolls a uniform sample in `[0, 1)` and succeeds when it is at most `chance`.
pub fn roll_chance<R: Rng + ?Sized>(chance: f32, rng: &mut R) -> bool {
    let sample: f32 = rng.gen();
    sample <= chance
}
