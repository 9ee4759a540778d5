//! Core types for the flashcard domain.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validation;

/// Kinds of user-owned resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    User,
    Flashcard,
    Tag,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Flashcard => "flashcard",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated question/answer pair for a new flashcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardContent {
    pub question: String,
    pub answer: String,
}

impl FlashcardContent {
    pub fn new(question: &str, answer: &str) -> Result<Self> {
        Ok(Self {
            question: validation::question(question)?,
            answer: validation::answer(answer)?,
        })
    }
}

/// Partial update of a flashcard. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardPatch {
    pub question: Option<String>,
    pub answer: Option<String>,
}

impl FlashcardPatch {
    /// Merge the patch over the current content, validating supplied fields.
    pub fn apply(&self, current: &FlashcardContent) -> Result<FlashcardContent> {
        let question = match &self.question {
            Some(q) => validation::question(q)?,
            None => current.question.clone(),
        };
        let answer = match &self.answer {
            Some(a) => validation::answer(a)?,
            None => current.answer.clone(),
        };
        Ok(FlashcardContent { question, answer })
    }

    /// True when the patch changes the question, which needs a uniqueness check.
    pub fn renames_question(&self, current: &FlashcardContent) -> bool {
        self.question
            .as_deref()
            .map(|q| q.trim() != current.question)
            .unwrap_or(false)
    }

    /// Check supplied fields without needing the stored flashcard.
    pub fn validate(&self) -> Result<()> {
        if let Some(q) = &self.question {
            validation::question(q)?;
        }
        if let Some(a) = &self.answer {
            validation::answer(a)?;
        }
        Ok(())
    }
}

/// Registration/login credentials after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Result<Self> {
        Ok(Self {
            username: validation::username(username)?,
            password: validation::password(password)?,
        })
    }
}
