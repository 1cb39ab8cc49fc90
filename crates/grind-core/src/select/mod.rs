//! Daily question selection
//!
//! Orchestrates the per-day assignment lifecycle and the difficulty phase
//! cascade. A day's set is generated at most once, redisplayed untouched
//! until every entry is completed, and regenerated after that only on an
//! explicit request - never repeating a question already assigned today.
//!
//! Phases are evaluated in order and the first match wins:
//!
//! 1. Easy: two focus picks while any easy question is unattempted
//! 2. Medium: one focus pick plus a review drawn from attempted easy/medium
//! 3. Hard: one focus pick plus a review drawn from everything attempted
//! 4. Mastery: the two highest-scoring questions overall

use std::cmp::Ordering;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::question::{Question, TodayEntry};
use crate::storage::{QuestionStore, Result};

/// Size of a generated daily set
pub const QUESTIONS_PER_DAY: usize = 2;

// ============================================================================
// OUTCOME TYPES
// ============================================================================

/// Which phase of the difficulty progression produced a daily set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Working through easy questions
    Easy,
    /// Easy attempted; working through medium with a review slot
    Medium,
    /// Easy and medium attempted; working through hard with a review slot
    Hard,
    /// Everything attempted; resurfacing the strongest scores
    Mastery,
}

impl Phase {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Easy => "easy",
            Phase::Medium => "medium",
            Phase::Hard => "hard",
            Phase::Mastery => "mastery",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of asking for today's questions
#[derive(Debug, Clone)]
pub enum TodayOutcome {
    /// Today's set exists and still has open entries; shown unchanged
    Pending(Vec<TodayEntry>),
    /// Today's set is fully completed and no further set was requested
    AllDone,
    /// A new set was generated and persisted for today
    Fresh {
        /// Phase that produced the set
        phase: Phase,
        /// The selected questions, focus first
        questions: Vec<Question>,
    },
    /// No questions are available or eligible; not an error
    Empty,
}

/// Questions grouped by tier, plus the flat id-ordered list
pub struct TierPools {
    /// Easy tier, id order
    pub easy: Vec<Question>,
    /// Medium tier, id order
    pub medium: Vec<Question>,
    /// Hard tier, id order
    pub hard: Vec<Question>,
    /// Every question, id order
    pub all: Vec<Question>,
}

impl TierPools {
    /// Load all tiers from the store
    pub fn load<S: QuestionStore>(store: &S) -> Result<Self> {
        Ok(Self {
            easy: store.questions_by_tier(crate::question::Difficulty::Easy)?,
            medium: store.questions_by_tier(crate::question::Difficulty::Medium)?,
            hard: store.questions_by_tier(crate::question::Difficulty::Hard)?,
            all: store.all_questions()?,
        })
    }
}

// ============================================================================
// SELECTION
// ============================================================================

/// Produce today's question set
///
/// Reuses an existing assignment when one is still open, reports completion
/// when it is done, and otherwise generates and persists a fresh set -
/// skipping ids already assigned today when `want_more` regenerates after a
/// finished set.
pub fn select_today<S: QuestionStore, R: Rng>(
    store: &S,
    today: NaiveDate,
    want_more: bool,
    rng: &mut R,
) -> Result<TodayOutcome> {
    let existing = store.today_assignments(today)?;
    if !existing.is_empty() {
        if existing.iter().any(|entry| !entry.completed) {
            return Ok(TodayOutcome::Pending(existing));
        }
        if !want_more {
            return Ok(TodayOutcome::AllDone);
        }
    }

    let exclude: Vec<i64> = existing.iter().map(|entry| entry.question.id).collect();
    let pools = TierPools::load(store)?;

    match generate(&pools, &exclude, rng) {
        Some((phase, questions)) if !questions.is_empty() => {
            tracing::debug!(phase = %phase, count = questions.len(), "generated daily set");
            store.save_today_assignments(&questions, today)?;
            Ok(TodayOutcome::Fresh { phase, questions })
        }
        _ => Ok(TodayOutcome::Empty),
    }
}

/// Run the phase cascade over the given pools
///
/// `exclude` removes questions already assigned today from every candidate
/// pool; phase triggers still look at the full tier so progression is not
/// affected by what happened to be assigned.
pub fn generate<R: Rng>(
    pools: &TierPools,
    exclude: &[i64],
    rng: &mut R,
) -> Option<(Phase, Vec<Question>)> {
    if !all_attempted(&pools.easy) {
        let picks = easy_phase(&eligible(&pools.easy, exclude), rng);
        if !picks.is_empty() {
            return Some((Phase::Easy, picks));
        }
    }

    if !all_attempted(&pools.medium) {
        let review_pool: Vec<&Question> = eligible(&pools.easy, exclude)
            .into_iter()
            .chain(eligible(&pools.medium, exclude))
            .collect();
        let picks = focus_and_review(&eligible(&pools.medium, exclude), &review_pool, rng);
        return Some((Phase::Medium, picks));
    }

    if !all_attempted(&pools.hard) {
        let picks = focus_and_review(
            &eligible(&pools.hard, exclude),
            &eligible(&pools.all, exclude),
            rng,
        );
        return Some((Phase::Hard, picks));
    }

    let picks = mastery_phase(&eligible(&pools.all, exclude));
    if picks.is_empty() {
        None
    } else {
        Some((Phase::Mastery, picks))
    }
}

// ============================================================================
// PHASE HELPERS
// ============================================================================

/// Empty pools count as fully attempted so the cascade can move past them
fn all_attempted(questions: &[Question]) -> bool {
    questions.iter().all(|q| q.attempted)
}

fn eligible<'a>(pool: &'a [Question], exclude: &[i64]) -> Vec<&'a Question> {
    pool.iter().filter(|q| !exclude.contains(&q.id)).collect()
}

/// Two focus picks from the easy pool
fn easy_phase<R: Rng>(pool: &[&Question], rng: &mut R) -> Vec<Question> {
    let mut picks = Vec::new();

    let Some(first) = focus_pick(pool, rng) else {
        return picks;
    };
    picks.push(first.clone());

    let remaining: Vec<&Question> = pool.iter().copied().filter(|q| q.id != first.id).collect();
    if let Some(second) = focus_pick(&remaining, rng) {
        picks.push(second.clone());
    }

    picks
}

/// One focus pick plus the strongest-scoring attempted review candidate
fn focus_and_review<R: Rng>(
    focus_pool: &[&Question],
    review_pool: &[&Question],
    rng: &mut R,
) -> Vec<Question> {
    let mut picks = Vec::new();

    let Some(focus) = focus_pick(focus_pool, rng) else {
        return picks;
    };
    picks.push(focus.clone());

    let review = highest_p_score(
        review_pool
            .iter()
            .copied()
            .filter(|q| q.attempted && q.id != focus.id),
    );
    if let Some(review) = review {
        picks.push(review.clone());
    }

    picks
}

/// The two strongest scores across every question, ties in id order
fn mastery_phase(pool: &[&Question]) -> Vec<Question> {
    let mut ranked = pool.to_vec();
    // Stable sort, so equal scores keep their original order
    ranked.sort_by(|a, b| {
        b.last_p_score
            .partial_cmp(&a.last_p_score)
            .unwrap_or(Ordering::Equal)
    });

    ranked.into_iter().take(QUESTIONS_PER_DAY).cloned().collect()
}

/// Pick a focus question from a pool
///
/// Unattempted questions are chosen uniformly at random; once a pool is fully
/// attempted the strongest non-mastered score is focused instead. Mastered
/// questions are done as focus material for their tier.
fn focus_pick<'a, R: Rng>(pool: &[&'a Question], rng: &mut R) -> Option<&'a Question> {
    let unattempted: Vec<&Question> = pool.iter().copied().filter(|q| !q.attempted).collect();
    if !unattempted.is_empty() {
        return unattempted.choose(rng).copied();
    }

    highest_p_score(pool.iter().copied().filter(|q| q.attempted && !q.mastered))
}

/// Strictly-greater comparison keeps the first-encountered question on ties
fn highest_p_score<'a>(candidates: impl IntoIterator<Item = &'a Question>) -> Option<&'a Question> {
    let mut best: Option<&Question> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.last_p_score > current.last_p_score => {
                best = Some(candidate);
            }
            None => best = Some(candidate),
            _ => {}
        }
    }
    best
}

// ============================================================================
// TESTS
// ============================================================================
