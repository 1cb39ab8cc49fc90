//! In-memory store fake
//!
//! Backs selector tests so scheduling logic is exercised without touching
//! SQLite. Single-threaded by construction, like the rest of the engine.

use std::cell::RefCell;

use chrono::NaiveDate;

use crate::question::{Difficulty, Question, SeedQuestion, TodayEntry};

use super::{QuestionStore, Result};

struct AssignmentRow {
    question_id: i64,
    date: NaiveDate,
    completed: bool,
}

/// In-memory [`QuestionStore`]
pub struct MemoryStore {
    questions: RefCell<Vec<Question>>,
    assignments: RefCell<Vec<AssignmentRow>>,
}

impl MemoryStore {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions: RefCell::new(questions),
            assignments: RefCell::new(Vec::new()),
        }
    }
}

impl QuestionStore for MemoryStore {
    fn questions_by_tier(&self, tier: Difficulty) -> Result<Vec<Question>> {
        Ok(self
            .questions
            .borrow()
            .iter()
            .filter(|q| q.difficulty == tier)
            .cloned()
            .collect())
    }

    fn all_questions(&self) -> Result<Vec<Question>> {
        Ok(self.questions.borrow().clone())
    }

    fn question(&self, id: i64) -> Result<Option<Question>> {
        Ok(self.questions.borrow().iter().find(|q| q.id == id).cloned())
    }

    fn attempted_questions(&self) -> Result<Vec<Question>> {
        Ok(self
            .questions
            .borrow()
            .iter()
            .filter(|q| q.attempted)
            .cloned()
            .collect())
    }

    fn save_question(&self, question: &Question) -> Result<()> {
        let mut questions = self.questions.borrow_mut();
        match questions.iter_mut().find(|q| q.id == question.id) {
            Some(slot) => {
                *slot = question.clone();
                Ok(())
            }
            None => Err(super::StoreError::NotFound(question.id)),
        }
    }

    fn insert_questions(&self, seeds: &[SeedQuestion]) -> Result<usize> {
        let mut questions = self.questions.borrow_mut();
        let mut next_id = questions.iter().map(|q| q.id).max().unwrap_or(0) + 1;
        for seed in seeds {
            questions.push(Question::new(
                next_id,
                seed.name.clone(),
                seed.url.clone(),
                seed.difficulty,
            ));
            next_id += 1;
        }
        Ok(seeds.len())
    }

    fn today_assignments(&self, date: NaiveDate) -> Result<Vec<TodayEntry>> {
        let questions = self.questions.borrow();
        Ok(self
            .assignments
            .borrow()
            .iter()
            .filter(|a| a.date == date)
            .filter_map(|a| {
                questions.iter().find(|q| q.id == a.question_id).map(|q| TodayEntry {
                    question: q.clone(),
                    completed: a.completed,
                })
            })
            .collect())
    }

    fn save_today_assignments(&self, questions: &[Question], date: NaiveDate) -> Result<()> {
        let mut assignments = self.assignments.borrow_mut();
        for question in questions {
            assignments.push(AssignmentRow {
                question_id: question.id,
                date,
                completed: false,
            });
        }
        Ok(())
    }

    fn mark_assignment_completed(&self, question_id: i64, date: NaiveDate) -> Result<bool> {
        let mut matched = false;
        for row in self.assignments.borrow_mut().iter_mut() {
            if row.question_id == question_id && row.date == date {
                row.completed = true;
                matched = true;
            }
        }
        Ok(matched)
    }
}
