//! Review scheduling
//!
//! The per-question state machine that turns a performance score into
//! updated scheduling parameters, plus the progression gate that decides
//! when a difficulty tier counts as unlocked.
//!
//! Scheduling follows the SM-2 family: an easiness factor floored at 1.3
//! governs interval growth, a streak of successful recalls walks the
//! interval through 1 day, 6 days, then `interval * EF`, and any failed
//! recall resets the streak and docks the easiness factor.

use chrono::{DateTime, Utc};

use crate::question::Question;
use crate::scoring::Feedback;

/// Easiness factor assigned to brand-new questions
pub const INITIAL_EASINESS: f64 = 2.5;

/// Hard floor for the easiness factor
pub const MIN_EASINESS: f64 = 1.3;

/// Scores at or above this count as a successful recall
pub const RECALL_THRESHOLD: f64 = 0.6;

/// First-attempt score that earns mastery outright
pub const INSTANT_MASTERY_THRESHOLD: f64 = 0.95;

/// Score that, achieved on two consecutive attempts, earns mastery
pub const PROVEN_MASTERY_THRESHOLD: f64 = 0.85;

/// Interval after the first successful recall (and after any failure)
pub const FIRST_INTERVAL_DAYS: i32 = 1;

/// Interval after the second consecutive successful recall
pub const SECOND_INTERVAL_DAYS: i32 = 6;

/// Easiness penalty applied on a failed recall
pub const EASINESS_PENALTY: f64 = 0.2;

/// Mastery fraction a tier must strictly exceed to unlock the next one
pub const UNLOCK_PERCENTAGE: f64 = 50.0;

/// Apply one completed attempt to a question's review state
///
/// The update happens entirely in memory; callers persist the resulting
/// record in a single write so a storage failure leaves no partial state.
/// Must be called sequentially per question, never concurrently.
pub fn process_review(question: &mut Question, feedback: &Feedback, now: DateTime<Utc>) {
    question.attempt_count += 1;

    let score = feedback.score();

    // Guarded transition keeps mastery monotonic: nothing below ever clears it
    if !question.mastered {
        let instant = question.attempt_count == 1 && score >= INSTANT_MASTERY_THRESHOLD;
        // last_p_score still holds the previous attempt's score at this point
        let proven = question.attempt_count > 1
            && score >= PROVEN_MASTERY_THRESHOLD
            && question.last_p_score >= PROVEN_MASTERY_THRESHOLD;
        if instant || proven {
            question.mastered = true;
        }
    }

    if score >= RECALL_THRESHOLD {
        question.review_streak += 1;

        // SM-2 easiness update, anchored at 0.85 where the gain is exactly 0.1
        let shortfall = 0.85 - score;
        let new_ef =
            (question.easiness_factor + (0.1 - shortfall * (0.08 + shortfall * 0.02))).max(MIN_EASINESS);
        question.easiness_factor = new_ef;

        question.review_interval = match question.review_streak {
            1 => FIRST_INTERVAL_DAYS,
            2 => SECOND_INTERVAL_DAYS,
            _ => (f64::from(question.review_interval) * new_ef).round() as i32,
        };
    } else {
        question.review_streak = 0;
        question.review_interval = FIRST_INTERVAL_DAYS;
        question.easiness_factor = (question.easiness_factor - EASINESS_PENALTY).max(MIN_EASINESS);
    }

    // Becomes the "previous score" read by the next call's mastery check
    question.last_p_score = score;
    question.last_reviewed = Some(now);
    question.attempted = true;
}

/// Whether a tier's question set has crossed the progression gate
///
/// Strictly more than [`UNLOCK_PERCENTAGE`] of the tier must be mastered;
/// exactly half stays locked, as does an empty tier. Stateless and
/// re-evaluated on demand, never cached on the question.
pub fn is_tier_unlocked(questions: &[Question]) -> bool {
    if questions.is_empty() {
        return false;
    }

    let mastered = questions.iter().filter(|q| q.mastered).count();
    let percentage = mastered as f64 / questions.len() as f64 * 100.0;
    percentage > UNLOCK_PERCENTAGE
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::Difficulty;
    use crate::scoring::UNSOLVED;

    fn test_question() -> Question {
        Question::new(1, "Two Sum", "https://example.com/two-sum", Difficulty::Easy)
    }

    fn perfect() -> Feedback {
        // Scores 1.0
        Feedback {
            time_taken_minutes: 20,
            hints_used: 0,
            optimality: 5,
            bugs: 5,
        }
    }

    fn failing() -> Feedback {
        // Scores 0.05: unsolved, five hints, worst ratings
        Feedback {
            time_taken_minutes: UNSOLVED,
            hints_used: 5,
            optimality: 1,
            bugs: 1,
        }
    }

    #[test]
    fn test_instant_mastery_on_first_perfect_attempt() {
        let mut q = test_question();
        process_review(&mut q, &perfect(), Utc::now());

        assert_eq!(q.attempt_count, 1);
        assert!(q.mastered);
        assert!(q.attempted);
        assert_eq!(q.review_streak, 1);
        assert_eq!(q.review_interval, FIRST_INTERVAL_DAYS);
        assert_eq!(q.last_p_score, 1.0);
        assert!(q.last_reviewed.is_some());
    }

    #[test]
    fn test_proven_mastery_needs_two_qualifying_attempts() {
        let mut q = test_question();

        // 0.4 + 0.3 + 0.15 + 0.0375 = 0.8875: above 0.85 but below 0.95
        let good = Feedback {
            time_taken_minutes: 25,
            hints_used: 0,
            optimality: 5,
            bugs: 2,
        };
        process_review(&mut q, &good, Utc::now());
        assert!(!q.mastered, "one qualifying attempt must not master");

        process_review(&mut q, &perfect(), Utc::now());
        assert!(q.mastered, "second consecutive qualifying attempt masters");
        assert_eq!(q.attempt_count, 2);
        assert_eq!(q.review_interval, SECOND_INTERVAL_DAYS);
    }

    #[test]
    fn test_proven_mastery_broken_by_intervening_failure() {
        let mut q = test_question();
        let good = Feedback {
            time_taken_minutes: 25,
            hints_used: 0,
            optimality: 5,
            bugs: 2,
        };

        process_review(&mut q, &good, Utc::now());
        process_review(&mut q, &failing(), Utc::now());
        process_review(&mut q, &perfect(), Utc::now());
        assert!(!q.mastered, "previous attempt scored below 0.85");

        process_review(&mut q, &perfect(), Utc::now());
        assert!(q.mastered);
    }

    #[test]
    fn test_mastery_is_monotonic() {
        let mut q = test_question();
        process_review(&mut q, &perfect(), Utc::now());
        assert!(q.mastered);

        for _ in 0..10 {
            process_review(&mut q, &failing(), Utc::now());
            assert!(q.mastered, "mastery must never revert");
        }
    }

    #[test]
    fn test_failure_resets_streak_and_interval() {
        let mut q = test_question();
        q.attempted = true;
        q.attempt_count = 4;
        q.review_streak = 3;
        q.review_interval = 15;
        q.easiness_factor = 2.8;

        process_review(&mut q, &failing(), Utc::now());

        assert_eq!(q.review_streak, 0);
        assert_eq!(q.review_interval, FIRST_INTERVAL_DAYS);
        assert!((q.easiness_factor - 2.6).abs() < 1e-9);
        assert_eq!(q.attempt_count, 5);
    }

    #[test]
    fn test_easiness_factor_floor() {
        let mut q = test_question();
        for _ in 0..30 {
            process_review(&mut q, &failing(), Utc::now());
            assert!(q.easiness_factor >= MIN_EASINESS);
        }
        assert_eq!(q.easiness_factor, MIN_EASINESS);
    }

    #[test]
    fn test_interval_progression_over_a_streak() {
        let mut q = test_question();

        process_review(&mut q, &perfect(), Utc::now());
        assert_eq!(q.review_interval, 1);

        process_review(&mut q, &perfect(), Utc::now());
        assert_eq!(q.review_interval, 6);

        // Third success: round(6 * EF) with EF grown past 2.5
        process_review(&mut q, &perfect(), Utc::now());
        let expected = (6.0 * q.easiness_factor).round() as i32;
        assert_eq!(q.review_interval, expected);
        assert!(q.review_interval > 6);
    }

    #[test]
    fn test_successful_recall_at_threshold() {
        let mut q = test_question();
        // 0.2 + 0.3 + 0.075 + 0.0375 = 0.6125: a success, but no mastery
        let barely = Feedback {
            time_taken_minutes: 40,
            hints_used: 0,
            optimality: 3,
            bugs: 2,
        };
        process_review(&mut q, &barely, Utc::now());

        assert!(!q.mastered);
        assert_eq!(q.review_streak, 1);
        assert_eq!(q.review_interval, FIRST_INTERVAL_DAYS);
    }

    #[test]
    fn test_tier_unlocked_thresholds() {
        let question = |mastered| {
            let mut q = test_question();
            q.mastered = mastered;
            q
        };

        // Empty tier stays locked
        assert!(!is_tier_unlocked(&[]));

        // 25% mastered
        let quarter = vec![question(true), question(false), question(false), question(false)];
        assert!(!is_tier_unlocked(&quarter));

        // Exactly 50% stays locked
        let half = vec![question(true), question(true), question(false), question(false)];
        assert!(!is_tier_unlocked(&half));

        // Strictly above 50% unlocks
        let three_quarters = vec![question(true), question(true), question(true), question(false)];
        assert!(is_tier_unlocked(&three_quarters));

        let full = vec![question(true), question(true)];
        assert!(is_tier_unlocked(&full));
    }
}
