//! SQLite Storage Implementation
//!
//! Single-connection store for the one-learner, one-process model. Every
//! mutation is a single statement or transaction, so a failed command never
//! leaves a half-written review behind.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use crate::question::{Difficulty, Question, SeedQuestion, TodayEntry};

use super::{QuestionStore, Result, StoreError};

/// Column list shared by every question SELECT
const QUESTION_COLUMNS: &str = "id, name, url, difficulty, attempted, last_reviewed, \
     review_interval, easiness_factor, review_streak, mastered, attempt_count, last_p_score";

/// Assignment dates are stored at calendar-day granularity
const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// STORE
// ============================================================================

/// SQLite-backed [`QuestionStore`]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Open (and migrate) the store, creating the database if needed
    ///
    /// With no explicit path the database lives in the platform data
    /// directory, e.g. `~/.local/share/grind/grind.db` on Linux.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("com", "grind", "grind").ok_or_else(|| {
                    StoreError::Init("Could not determine project directories".to_string())
                })?;

                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                // Restrict directory permissions to owner-only on Unix
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let perms = std::fs::Permissions::from_mode(0o700);
                    let _ = std::fs::set_permissions(data_dir, perms);
                }
                data_dir.join("grind.db")
            }
        };

        let conn = Connection::open(&path)?;

        // Restrict database file permissions to owner-only on Unix
        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&conn)?;
        super::migrations::apply_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Init("Connection lock poisoned".to_string()))
    }

    fn query_questions(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Question>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, read_question_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        drop(stmt);
        drop(conn);

        rows.into_iter().map(hydrate_question).collect()
    }
}

impl QuestionStore for SqliteStore {
    fn questions_by_tier(&self, tier: Difficulty) -> Result<Vec<Question>> {
        self.query_questions(
            &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE difficulty = ?1 ORDER BY id"),
            params![tier.as_str()],
        )
    }

    fn all_questions(&self) -> Result<Vec<Question>> {
        self.query_questions(
            &format!("SELECT {QUESTION_COLUMNS} FROM questions ORDER BY id"),
            [],
        )
    }

    fn question(&self, id: i64) -> Result<Option<Question>> {
        let row = {
            let conn = self.lock()?;
            conn.query_row(
                &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
                params![id],
                read_question_row,
            )
            .optional()?
        };

        row.map(hydrate_question).transpose()
    }

    fn attempted_questions(&self) -> Result<Vec<Question>> {
        self.query_questions(
            &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE attempted = 1 ORDER BY id"),
            [],
        )
    }

    fn save_question(&self, question: &Question) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE questions SET
                name = ?2, url = ?3, difficulty = ?4, attempted = ?5,
                last_reviewed = ?6, review_interval = ?7, easiness_factor = ?8,
                review_streak = ?9, mastered = ?10, attempt_count = ?11,
                last_p_score = ?12
             WHERE id = ?1",
            params![
                question.id,
                question.name,
                question.url,
                question.difficulty.as_str(),
                question.attempted,
                question.last_reviewed.map(|dt| dt.to_rfc3339()),
                question.review_interval,
                question.easiness_factor,
                question.review_streak,
                question.mastered,
                question.attempt_count,
                question.last_p_score,
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound(question.id));
        }

        tracing::debug!(id = question.id, "saved question state");
        Ok(())
    }

    fn insert_questions(&self, seeds: &[SeedQuestion]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for seed in seeds {
            tx.execute(
                "INSERT INTO questions (name, url, difficulty) VALUES (?1, ?2, ?3)",
                params![seed.name, seed.url, seed.difficulty.as_str()],
            )?;
        }

        tx.commit()?;
        tracing::info!(count = seeds.len(), "seeded questions");
        Ok(seeds.len())
    }

    fn today_assignments(&self, date: NaiveDate) -> Result<Vec<TodayEntry>> {
        let rows = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(
                "SELECT q.id, q.name, q.url, q.difficulty, q.attempted, q.last_reviewed,
                        q.review_interval, q.easiness_factor, q.review_streak, q.mastered,
                        q.attempt_count, q.last_p_score, t.completed
                 FROM today_assignments t
                 JOIN questions q ON q.id = t.question_id
                 WHERE t.date = ?1
                 ORDER BY t.id",
            )?;
            stmt.query_map(params![date.format(DATE_FORMAT).to_string()], |row| {
                Ok((read_question_row(row)?, row.get::<_, bool>(12)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        rows.into_iter()
            .map(|(row, completed)| {
                Ok(TodayEntry {
                    question: hydrate_question(row)?,
                    completed,
                })
            })
            .collect()
    }

    fn save_today_assignments(&self, questions: &[Question], date: NaiveDate) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for question in questions {
            tx.execute(
                "INSERT INTO today_assignments (question_id, date, completed) VALUES (?1, ?2, 0)",
                params![question.id, date.format(DATE_FORMAT).to_string()],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn mark_assignment_completed(&self, question_id: i64, date: NaiveDate) -> Result<bool> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE today_assignments SET completed = 1 WHERE date = ?1 AND question_id = ?2",
            params![date.format(DATE_FORMAT).to_string(), question_id],
        )?;

        Ok(updated > 0)
    }
}

// ============================================================================
// ROW MAPPING
// ============================================================================

/// Raw question columns, before tier and timestamp parsing
struct QuestionRow {
    id: i64,
    name: String,
    url: String,
    difficulty: String,
    attempted: bool,
    last_reviewed: Option<String>,
    review_interval: i32,
    easiness_factor: f64,
    review_streak: i32,
    mastered: bool,
    attempt_count: i32,
    last_p_score: f64,
}

fn read_question_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuestionRow> {
    Ok(QuestionRow {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        difficulty: row.get(3)?,
        attempted: row.get(4)?,
        last_reviewed: row.get(5)?,
        review_interval: row.get(6)?,
        easiness_factor: row.get(7)?,
        review_streak: row.get(8)?,
        mastered: row.get(9)?,
        attempt_count: row.get(10)?,
        last_p_score: row.get(11)?,
    })
}

fn hydrate_question(row: QuestionRow) -> Result<Question> {
    let difficulty = Difficulty::parse_name(&row.difficulty)
        .ok_or_else(|| StoreError::InvalidDifficulty(row.difficulty.clone()))?;

    let last_reviewed = row
        .last_reviewed
        .map(|raw| parse_timestamp(&raw))
        .transpose()?;

    Ok(Question {
        id: row.id,
        name: row.name,
        url: row.url,
        difficulty,
        attempted: row.attempted,
        last_reviewed,
        review_interval: row.review_interval,
        easiness_factor: row.easiness_factor,
        review_streak: row.review_streak,
        mastered: row.mastered,
        attempt_count: row.attempt_count,
        last_p_score: row.last_p_score,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidTimestamp(format!("{raw}: {e}")))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seed(name: &str, difficulty: Difficulty) -> SeedQuestion {
        SeedQuestion {
            name: name.to_string(),
            url: format!("https://example.com/{}", name.to_lowercase().replace(' ', "-")),
            difficulty,
        }
    }

    fn create_test_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(Some(dir.path().join("test.db"))).unwrap();
        (dir, store)
    }

    #[test]
    fn test_store_starts_empty() {
        let (_dir, store) = create_test_store();
        assert!(store.all_questions().unwrap().is_empty());
        assert!(store.question(1).unwrap().is_none());
    }

    #[test]
    fn test_seed_and_fetch_by_tier() {
        let (_dir, store) = create_test_store();
        store
            .insert_questions(&[
                seed("Two Sum", Difficulty::Easy),
                seed("Word Ladder", Difficulty::Hard),
                seed("Valid Anagram", Difficulty::Easy),
            ])
            .unwrap();

        let easy = store.questions_by_tier(Difficulty::Easy).unwrap();
        assert_eq!(easy.len(), 2);
        assert!(easy.iter().all(|q| q.difficulty == Difficulty::Easy));
        assert!(!easy[0].attempted);
        assert_eq!(easy[0].easiness_factor, crate::review::INITIAL_EASINESS);

        assert!(store.questions_by_tier(Difficulty::Medium).unwrap().is_empty());
        assert_eq!(store.all_questions().unwrap().len(), 3);
    }

    #[test]
    fn test_save_question_roundtrips_review_state() {
        let (_dir, store) = create_test_store();
        store.insert_questions(&[seed("Two Sum", Difficulty::Easy)]).unwrap();

        let mut q = store.all_questions().unwrap().remove(0);
        q.attempted = true;
        q.last_reviewed = Some(Utc::now());
        q.review_interval = 6;
        q.easiness_factor = 2.36;
        q.review_streak = 2;
        q.mastered = true;
        q.attempt_count = 2;
        q.last_p_score = 0.8875;
        store.save_question(&q).unwrap();

        let loaded = store.question(q.id).unwrap().unwrap();
        assert!(loaded.attempted);
        assert_eq!(loaded.last_reviewed, q.last_reviewed);
        assert_eq!(loaded.review_interval, 6);
        assert_eq!(loaded.easiness_factor, 2.36);
        assert_eq!(loaded.review_streak, 2);
        assert!(loaded.mastered);
        assert_eq!(loaded.attempt_count, 2);
        assert_eq!(loaded.last_p_score, 0.8875);
    }

    #[test]
    fn test_save_unknown_question_is_not_found() {
        let (_dir, store) = create_test_store();
        let q = Question::new(99, "Ghost", "https://example.com", Difficulty::Easy);
        match store.save_question(&q) {
            Err(StoreError::NotFound(99)) => {}
            other => panic!("expected NotFound(99), got {other:?}"),
        }
    }

    #[test]
    fn test_attempted_questions_filter() {
        let (_dir, store) = create_test_store();
        store
            .insert_questions(&[
                seed("Two Sum", Difficulty::Easy),
                seed("Valid Anagram", Difficulty::Easy),
            ])
            .unwrap();

        let mut first = store.all_questions().unwrap().remove(0);
        first.attempted = true;
        store.save_question(&first).unwrap();

        let attempted = store.attempted_questions().unwrap();
        assert_eq!(attempted.len(), 1);
        assert_eq!(attempted[0].id, first.id);
    }

    #[test]
    fn test_assignments_are_scoped_by_date() {
        let (_dir, store) = create_test_store();
        store
            .insert_questions(&[
                seed("Two Sum", Difficulty::Easy),
                seed("Valid Anagram", Difficulty::Easy),
            ])
            .unwrap();
        let questions = store.all_questions().unwrap();

        let monday = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();

        store.save_today_assignments(&questions, monday).unwrap();
        assert_eq!(store.today_assignments(monday).unwrap().len(), 2);
        assert!(store.today_assignments(tuesday).unwrap().is_empty());

        let entries = store.today_assignments(monday).unwrap();
        assert!(entries.iter().all(|e| !e.completed));
    }

    #[test]
    fn test_mark_assignment_completed() {
        let (_dir, store) = create_test_store();
        store.insert_questions(&[seed("Two Sum", Difficulty::Easy)]).unwrap();
        let questions = store.all_questions().unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let other_day = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();

        store.save_today_assignments(&questions, day).unwrap();

        // Wrong day touches nothing
        assert!(!store.mark_assignment_completed(questions[0].id, other_day).unwrap());
        assert!(store.mark_assignment_completed(questions[0].id, day).unwrap());

        let entries = store.today_assignments(day).unwrap();
        assert!(entries[0].completed);

        // Unassigned question is a no-op
        assert!(!store.mark_assignment_completed(999, day).unwrap());
    }

    #[test]
    fn test_reopen_preserves_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let store = SqliteStore::new(Some(path.clone())).unwrap();
            store.insert_questions(&[seed("Two Sum", Difficulty::Easy)]).unwrap();
        }

        let store = SqliteStore::new(Some(path)).unwrap();
        assert_eq!(store.all_questions().unwrap().len(), 1);
    }
}
