//! TOML question bank loader.
//!
//! Loads quiz sets from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::grading::normalize_answer;
use crate::model::{Question, QuizSet};
use crate::traits::InMemoryBank;

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    #[serde(default)]
    key: Option<String>,
    name: String,
    #[serde(default)]
    description: String,
}

/// Parse a single TOML file into a `QuizSet`.
pub fn parse_quiz_set(path: &Path) -> Result<QuizSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_set_str(&content, path)
}

/// Parse a TOML string into a `QuizSet`.
///
/// The quiz key defaults to the file stem of `source_path`.
pub fn parse_quiz_set_str(content: &str, source_path: &Path) -> Result<QuizSet> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let key = match parsed.quiz.key {
        Some(key) if !key.trim().is_empty() => key.trim().to_string(),
        _ => source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .with_context(|| {
                format!("quiz has no key and none can be derived from {}", source_path.display())
            })?,
    };

    Ok(QuizSet {
        key,
        name: parsed.quiz.name,
        description: parsed.quiz.description,
        questions: parsed.questions,
    })
}

/// Recursively load every `.toml` quiz file under a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<QuizSet>> {
    let mut sets = Vec::new();

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }
    }

    Ok(sets)
}

/// Load a question bank from a single quiz file or a directory of them.
pub fn load_bank(path: &Path) -> Result<InMemoryBank> {
    let sets = if path.is_dir() {
        load_quiz_directory(path)?
    } else {
        vec![parse_quiz_set(path)?]
    };

    for set in &sets {
        for warning in validate_quiz_set(set) {
            tracing::warn!("quiz '{}': {}", set.key, warning.message);
        }
    }

    tracing::debug!("loaded {} quiz set(s) from {}", sets.len(), path.display());
    Ok(InMemoryBank::new(sets))
}

/// A warning from quiz set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz set for schema problems.
///
/// Malformed questions stay in the set; they are playable but always graded
/// as incorrect.
pub fn validate_quiz_set(set: &QuizSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "quiz has no questions and cannot be started".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for question in &set.questions {
        if !seen_ids.insert(question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    for question in &set.questions {
        if let Some(defect) = question.defect() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id),
                message: defect.to_string(),
            });
        }

        let mut seen_answers = HashSet::new();
        for answer in &question.answers {
            if !seen_answers.insert(normalize_answer(answer)) {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id),
                    message: format!("duplicate answer option: {answer}"),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[quiz]
key = "geo"
name = "Geography"
description = "Capitals and borders"

[[questions]]
id = 1
prompt = "What is the capital of France?"
answers = ["Paris", "Lyon", "Marseille"]

[questions.correct_answer]
text = "Paris"
explanation = "Paris is the capital of France."

[[questions]]
id = 2
prompt = "Which city is larger?"
answers = ["Oslo", "Bergen"]

[questions.correct_answer]
text = "Oslo"
explanation = "See the table."

[questions.table]
headers = ["City", "Population"]
rows = [["Oslo", "709k"], ["Bergen", "291k"]]
"#;

    #[test]
    fn parse_valid_toml() {
        let set = parse_quiz_set_str(VALID_TOML, &PathBuf::from("ignored.toml")).unwrap();
        assert_eq!(set.key, "geo");
        assert_eq!(set.name, "Geography");
        assert_eq!(set.questions.len(), 2);
        assert_eq!(set.questions[0].correct_text(), "Paris");
        let table = set.questions[1].table.as_ref().unwrap();
        assert_eq!(table.headers, vec!["City", "Population"]);
        assert_eq!(table.rows.len(), 2);
        assert!(validate_quiz_set(&set).is_empty());
    }

    #[test]
    fn key_defaults_to_file_stem() {
        let toml = r#"
[quiz]
name = "Minimal"

[[questions]]
id = 1
prompt = "2 + 2?"
answers = ["4", "5"]
correct_answer = { text = "4" }
"#;
        let set = parse_quiz_set_str(toml, &PathBuf::from("quizzes/arithmetic.toml")).unwrap();
        assert_eq!(set.key, "arithmetic");
        assert_eq!(set.questions[0].explanation(), "");
    }

    #[test]
    fn malformed_question_loads_with_warning() {
        let toml = r#"
[quiz]
key = "broken"
name = "Broken"

[[questions]]
id = 1
answers = ["a", "b"]

[[questions]]
id = 1
prompt = "No correct answer here"
answers = ["a", "a "]
"#;
        let set = parse_quiz_set_str(toml, &PathBuf::from("broken.toml")).unwrap();
        assert_eq!(set.questions.len(), 2);
        let warnings = validate_quiz_set(&set);
        assert!(warnings.iter().any(|w| w.message.contains("empty prompt")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate question ID")));
        assert!(warnings.iter().any(|w| w.message.contains("no correct answer")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate answer option")));
    }

    #[test]
    fn empty_quiz_is_flagged() {
        let set = parse_quiz_set_str("[quiz]\nname = \"Empty\"\n", &PathBuf::from("empty.toml"))
            .unwrap();
        let warnings = validate_quiz_set(&set);
        assert!(warnings.iter().any(|w| w.message.contains("no questions")));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_quiz_set_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("geo.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("bad.toml"), "not = [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let sets = load_quiz_directory(dir.path()).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].key, "geo");
    }

    #[test]
    fn load_bank_from_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geo.toml");
        std::fs::write(&path, VALID_TOML).unwrap();

        use crate::traits::QuestionBank;
        let bank = load_bank(&path).unwrap();
        assert_eq!(bank.quiz_keys(), vec!["geo"]);
    }

    #[test]
    fn load_bank_missing_path_fails() {
        assert!(load_bank(&PathBuf::from("/definitely/not/here.toml")).is_err());
    }
}
