//! Maximum-information item selection.
//!
//! Each candidate is scored by its Fisher information at the current ability
//! plus a uniform jitter in `[0, 0.01)` that breaks ties. The jitter comes
//! from a caller-supplied RNG so sessions never share a random stream and
//! tests can seed it.

use rand::Rng;
use rand_pcg::Pcg64;

use crate::error::CatError;
use crate::model::{CandidateItem, ItemParameters, UnknownLevelPolicy};

/// Upper bound (exclusive) of the tie-breaking jitter.
pub const TIE_BREAK_JITTER: f64 = 0.01;

/// Seedable generator used for per-session selection.
pub type SelectionRng = Pcg64;

/// Create a selection RNG from a seed.
pub fn seeded_rng(seed: u64) -> SelectionRng {
    use rand::SeedableRng;
    Pcg64::seed_from_u64(seed)
}

/// Pick the candidate with the highest jittered information at `theta`.
///
/// Returns `Ok(None)` for an empty pool. With the strict policy, a candidate
/// whose difficulty cannot be resolved is an error.
pub fn select_next_item<'a, R>(
    theta: f64,
    candidates: &'a [CandidateItem],
    policy: UnknownLevelPolicy,
    rng: &mut R,
) -> Result<Option<&'a CandidateItem>, CatError>
where
    R: Rng,
{
    let mut best: Option<&CandidateItem> = None;
    let mut best_score = f64::NEG_INFINITY;

    for item in candidates {
        let b = item.difficulty.resolve(policy)?;
        let info = ItemParameters::with_difficulty(b).information(theta);
        let score = info + rng.random_range(0.0..TIE_BREAK_JITTER);

        if score > best_score {
            best_score = score;
            best = Some(item);
        }
    }

    if let Some(item) = best {
        tracing::debug!(item = %item.id, theta, score = best_score, "selected item");
    }

    Ok(best)
}
