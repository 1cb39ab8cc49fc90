//! Question - The fundamental unit of practice
//!
//! Each question represents one algorithmic problem with:
//! - Static identity (name, reference URL, difficulty tier)
//! - Mutable review state owned by the review state machine
//! - A date-scoped "assigned today" view for the daily selector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::review::INITIAL_EASINESS;

// ============================================================================
// DIFFICULTY TIERS
// ============================================================================

/// Difficulty tier of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Warm-up problems, the starting tier
    Easy,
    /// Unlocked once every easy question has been attempted
    Medium,
    /// Unlocked once easy and medium are fully attempted
    Hard,
}

impl Difficulty {
    /// All tiers in progression order
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Parse from string name
    pub fn parse_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// QUESTION
// ============================================================================

/// A practice question with its review state
///
/// The review state fields are written exclusively by
/// [`process_review`](crate::review::process_review); the daily selector and
/// the progression gate only read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier, assigned by the store at creation
    pub id: i64,
    /// Problem name
    pub name: String,
    /// Reference URL for the problem statement
    pub url: String,
    /// Difficulty tier
    pub difficulty: Difficulty,

    // ========== Review state ==========
    /// Set on first completion, never reset
    pub attempted: bool,
    /// Timestamp of the most recent completion
    pub last_reviewed: Option<DateTime<Utc>>,
    /// Days until the next suggested review
    pub review_interval: i32,
    /// Growth multiplier for the review interval, never below 1.3
    pub easiness_factor: f64,
    /// Consecutive successful recalls (score >= 0.6)
    pub review_streak: i32,
    /// Sticky mastery flag; once true it never reverts
    pub mastered: bool,
    /// Completions recorded so far
    pub attempt_count: i32,
    /// Performance score of the most recent attempt, in [0, 1]
    pub last_p_score: f64,
}

impl Question {
    /// Create a question with fresh review state
    pub fn new(id: i64, name: impl Into<String>, url: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            id,
            name: name.into(),
            url: url.into(),
            difficulty,
            attempted: false,
            last_reviewed: None,
            review_interval: 0,
            easiness_factor: INITIAL_EASINESS,
            review_streak: 0,
            mastered: false,
            attempt_count: 0,
            last_p_score: 0.0,
        }
    }
}

// ============================================================================
// INPUT AND VIEW TYPES
// ============================================================================

/// A question as it appears in a JSON seed file
///
/// Uses `deny_unknown_fields` so typos in seed files fail loudly instead of
/// silently dropping data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedQuestion {
    /// Problem name
    pub name: String,
    /// Reference URL
    pub url: String,
    /// Difficulty tier
    pub difficulty: Difficulty,
}

/// A question assigned for the current day, with its completion flag
///
/// This is a derived, date-scoped view. The question's own review state is
/// the single source of truth for mastery and scheduling.
#[derive(Debug, Clone)]
pub struct TodayEntry {
    /// The assigned question
    pub question: Question,
    /// Whether the learner finished this entry today
    pub completed: bool,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_roundtrip() {
        for tier in Difficulty::ALL {
            assert_eq!(Difficulty::parse_name(tier.as_str()), Some(tier));
        }
        assert_eq!(Difficulty::parse_name("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse_name("expert"), None);
    }

    #[test]
    fn test_new_question_state() {
        let q = Question::new(1, "Two Sum", "https://example.com/two-sum", Difficulty::Easy);
        assert!(!q.attempted);
        assert!(!q.mastered);
        assert_eq!(q.review_interval, 0);
        assert_eq!(q.review_streak, 0);
        assert_eq!(q.attempt_count, 0);
        assert_eq!(q.easiness_factor, INITIAL_EASINESS);
        assert!(q.last_reviewed.is_none());
    }

    #[test]
    fn test_seed_question_parsing() {
        let json = r#"{"name": "Two Sum", "url": "https://example.com", "difficulty": "easy"}"#;
        let seed: SeedQuestion = serde_json::from_str(json).unwrap();
        assert_eq!(seed.difficulty, Difficulty::Easy);

        // Unknown tier names are rejected
        let bad = r#"{"name": "X", "url": "https://example.com", "difficulty": "expert"}"#;
        assert!(serde_json::from_str::<SeedQuestion>(bad).is_err());

        // Unknown fields are rejected
        let extra = r#"{"name": "X", "url": "u", "difficulty": "easy", "rating": 3}"#;
        assert!(serde_json::from_str::<SeedQuestion>(extra).is_err());
    }
}
