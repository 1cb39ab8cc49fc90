//! Performance scoring
//!
//! Converts raw session feedback (time taken, hints consumed, solution
//! quality ratings) into a normalized performance score in [0, 1]. The score
//! is the sum of four independently weighted components, each monotonically
//! better with better input.
//!
//! The time component is a deliberate step function: a fast unaided solve is
//! worth four times a slow one, with no partial credit in between.

/// Sentinel time value meaning "could not solve without seeing the solution"
pub const UNSOLVED: i32 = -1;

/// Minutes at or under which a solve earns the full time weight
pub const FAST_SOLVE_MINUTES: i32 = 30;

/// Minutes at or under which a solve earns half the fast reward
pub const SLOW_SOLVE_MINUTES: i32 = 45;

/// Maximum contribution of the time component
pub const TIME_WEIGHT: f64 = 0.4;

/// Maximum contribution of the hint component
pub const HINT_WEIGHT: f64 = 0.3;

/// Maximum contribution of each quality rating (optimality, bugs)
pub const RATING_WEIGHT: f64 = 0.15;

/// Raw feedback for one completed attempt
///
/// All values are pre-validated by the caller: `time_taken_minutes` is `-1`
/// or non-negative, `hints_used` is non-negative, and both ratings are on the
/// 1-5 scale (1 = worst, 5 = best).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    /// Minutes spent, or [`UNSOLVED`]
    pub time_taken_minutes: i32,
    /// Count of hints consumed
    pub hints_used: i32,
    /// How optimal the solution was, 1-5
    pub optimality: i32,
    /// How bug-free the first version was, 1-5
    pub bugs: i32,
}

impl Feedback {
    /// Performance score for this feedback
    pub fn score(&self) -> f64 {
        compute_score(
            self.time_taken_minutes,
            self.hints_used,
            self.optimality,
            self.bugs,
        )
    }
}

/// Compute the performance score for one attempt
///
/// Pure and total over pre-validated inputs; the result is always in [0, 1].
pub fn compute_score(time_taken_minutes: i32, hints_used: i32, optimality: i32, bugs: i32) -> f64 {
    // Step function rather than a linear ramp: fast unaided solves are what
    // the schedule optimizes for
    let time_score = if time_taken_minutes == UNSOLVED {
        0.0
    } else if time_taken_minutes <= FAST_SOLVE_MINUTES {
        TIME_WEIGHT
    } else if time_taken_minutes <= SLOW_SOLVE_MINUTES {
        0.2
    } else {
        0.1
    };

    // Strictly decreasing in the hint count, asymptotic toward zero
    let hint_score = if hints_used == 0 {
        HINT_WEIGHT
    } else {
        HINT_WEIGHT / f64::from(hints_used + 1)
    };

    // Linear maps of the 1-5 ratings onto [0, RATING_WEIGHT]
    let optimality_score = f64::from(optimality - 1) / 4.0 * RATING_WEIGHT;
    let bug_score = f64::from(bugs - 1) / 4.0 * RATING_WEIGHT;

    time_score + hint_score + optimality_score + bug_score
}

// ============================================================================
// TESTS
// ============================================================================
