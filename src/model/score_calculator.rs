//! Pure scoring formulas. Nothing in here touches the ledger; every function
//! maps its arguments to a number and can be called with any config in any
//! order.

/// # Growth multiplier
///
/// Scales the value of a problem solved in later events:
/// `2^(index / period)`, so the event at `index == period` is worth exactly
/// twice the event at index 0.
///
/// - `index` is the event's 0-based chronological position among same-kind
///   events.
/// - `period` is the number of events it takes for points to double. A
///   period of zero or less degenerates to a constant 1.0.
pub fn growth_multiplier(index: i32, period: i32) -> f64 {
    if period <= 0 {
        return 1.0;
    }

    let exponent = index as f64 / period as f64;
    2.0_f64.powf(exponent)
}

/// # Rank bonus
///
/// Extra points for a bounded top cohort, decaying linearly:
/// `max_bonus - (max_bonus / top_n) * (rank - 1)`.
///
/// Rank 1 earns `max_bonus`, rank `top_n` earns `max_bonus / top_n`, and
/// everyone past the cohort earns nothing.
pub fn rank_bonus(rank: i32, top_n: i32, max_bonus: f64) -> f64 {
    if rank > top_n || top_n <= 0 {
        return 0.0;
    }

    let decrement = max_bonus / top_n as f64;
    max_bonus - decrement * (rank - 1) as f64
}

/// # Hybrid points
///
/// The canonical per-event score: a solved-fraction base scaled by the
/// growth multiplier, plus the top-N rank bonus.
///
/// `(solved / max_solved) * base_weight * growth_multiplier(index, period)
///  + rank_bonus(rank, top_n, max_bonus)`
///
/// The fractional term is 0 when nobody solved anything (`max_solved <= 0`).
#[allow(clippy::too_many_arguments)]
pub fn hybrid_points(
    solved: i32,
    rank: i32,
    max_solved: i32,
    base_weight: f64,
    index: i32,
    period: i32,
    top_n: i32,
    max_bonus: f64
) -> f64 {
    let mut base_points = 0.0;
    if max_solved > 0 {
        base_points = base_weight * (solved as f64 / max_solved as f64);
    }

    let problems_score = base_points * growth_multiplier(index, period);
    let rank_score = rank_bonus(rank, top_n, max_bonus);

    problems_score + rank_score
}

/// Superseded field-relative model, kept as the documented reference
/// variant. The bonus decays across the entire field instead of a fixed
/// top-N cohort, and there is no growth over the event sequence. The
/// ingestion path never calls this.
pub fn legacy_points(
    solved: i32,
    rank: i32,
    total_participants: i32,
    max_solved: i32,
    weight: f64,
    bonus: f64
) -> f64 {
    let mut problems_score = 0.0;
    if max_solved > 0 {
        problems_score = weight * (solved as f64 / max_solved as f64);
    }

    let mut rank_score = 0.0;
    if total_participants > 1 {
        rank_score = bonus * (1.0 - (rank - 1) as f64 / (total_participants - 1) as f64);
    }

    problems_score + rank_score
}
