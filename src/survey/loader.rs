//! JSON loaders for the roster and the question catalog

use super::question::{Catalog, Question, Respondent, Roster, OPTION_SLOTS};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("Invalid survey input: {0}")]
    Invalid(String),
}

/// Catalog file entry
#[derive(Debug, Deserialize)]
struct QuestionRecord {
    question: String,
    #[serde(default)]
    options: Vec<Option<String>>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| LoadError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Load the respondent roster, preserving file order
pub fn load_roster(path: impl AsRef<Path>) -> Result<Roster, LoadError> {
    let respondents: Vec<Respondent> = read_json(path.as_ref())?;
    validate_roster(&respondents)?;
    Ok(respondents.into())
}

/// Load the question catalog, assigning ordinals from file order
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, LoadError> {
    let records: Vec<QuestionRecord> = read_json(path.as_ref())?;
    let questions = records
        .into_iter()
        .enumerate()
        .map(|(i, record)| into_question(i + 1, record))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    for q in &questions {
        if !seen.insert(q.text.as_str()) {
            return Err(LoadError::Invalid(format!(
                "duplicate question text {:?}",
                q.text
            )));
        }
    }
    Ok(questions.into())
}

fn into_question(ordinal: usize, record: QuestionRecord) -> Result<Question, LoadError> {
    let text = record.question.trim().to_string();
    if text.is_empty() {
        return Err(LoadError::Invalid(format!("question {ordinal} has no text")));
    }
    if record.options.len() > OPTION_SLOTS {
        return Err(LoadError::Invalid(format!(
            "question {ordinal} has {} options, at most {OPTION_SLOTS} are allowed",
            record.options.len()
        )));
    }

    let mut options: [Option<String>; OPTION_SLOTS] = Default::default();
    for (slot, label) in options.iter_mut().zip(record.options) {
        *slot = label
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
    }
    Ok(Question::new(ordinal, text, options))
}

fn validate_roster(respondents: &[Respondent]) -> Result<(), LoadError> {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for r in respondents {
        if r.id.trim().is_empty() || r.display_name.trim().is_empty() {
            return Err(LoadError::Invalid(
                "respondent entries need a non-empty id and name".to_string(),
            ));
        }
        if !ids.insert(r.id.as_str()) {
            return Err(LoadError::Invalid(format!("duplicate respondent id {}", r.id)));
        }
        // Names key the grid columns
        if !names.insert(r.display_name.as_str()) {
            return Err(LoadError::Invalid(format!(
                "duplicate respondent name {}",
                r.display_name
            )));
        }
    }
    Ok(())
}
