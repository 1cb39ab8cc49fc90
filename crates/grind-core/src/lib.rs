//! # Grind Core
//!
//! Decision engine for practicing algorithmic problems on a spaced-repetition
//! schedule that adapts to demonstrated mastery:
//!
//! - **Performance scoring**: time, hints, and solution-quality feedback
//!   blended into a normalized score in [0, 1]
//! - **Review scheduling**: SM-2 style easiness factor (floored at 1.3) and
//!   interval growth, with a sticky per-question mastery flag
//! - **Progression gate**: a tier unlocks once strictly more than half of it
//!   is mastered
//! - **Daily selection**: an easy -> medium -> hard -> mastery phase cascade
//!   that blends new material with review by priority, at most two questions
//!   per day
//!
//! Execution is single-learner, single-process, and offline. The engine
//! consumes and produces plain data; persistence sits behind the
//! [`QuestionStore`] trait so tests can swap in an in-memory fake.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chrono::{Local, Utc};
//! use grind_core::prelude::*;
//!
//! let store = SqliteStore::new(None)?;
//!
//! // Pick (or redisplay) today's questions
//! let mut rng = rand::thread_rng();
//! let outcome = select_today(&store, Local::now().date_naive(), false, &mut rng)?;
//!
//! // Record a completed attempt
//! let mut question = store.question(3)?.expect("known id");
//! let feedback = Feedback { time_taken_minutes: 25, hints_used: 0, optimality: 5, bugs: 4 };
//! process_review(&mut question, &feedback, Utc::now());
//! store.save_question(&question)?;
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod question;
pub mod review;
pub mod scoring;
pub mod select;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Entity model
pub use question::{Difficulty, Question, SeedQuestion, TodayEntry};

// Scoring
pub use scoring::{compute_score, Feedback, UNSOLVED};

// Review scheduling and progression
pub use review::{
    is_tier_unlocked, process_review, INITIAL_EASINESS, MIN_EASINESS, PROVEN_MASTERY_THRESHOLD,
    RECALL_THRESHOLD, UNLOCK_PERCENTAGE,
};

// Daily selection
pub use select::{generate, select_today, Phase, TierPools, TodayOutcome, QUESTIONS_PER_DAY};

// Storage layer
pub use storage::{QuestionStore, Result, SqliteStore, StoreError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        compute_score, is_tier_unlocked, process_review, select_today, Difficulty, Feedback,
        Phase, Question, QuestionStore, Result, SeedQuestion, SqliteStore, StoreError,
        TierPools, TodayEntry, TodayOutcome,
    };
}
