//! Recipe files.
//!
//! Either a bare JSON array of steps or an object with a `title` and a
//! `steps` array. Step fields use camelCase (`stepNumber`,
//! `durationSeconds`, `isKeyStep`, ...).

use std::path::Path;

use serde::Deserialize;
use sous_core::{Step, StepSequence};

use crate::error::CliError;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RecipeFile {
    Titled {
        #[serde(default)]
        title: Option<String>,
        steps: Vec<Step>,
    },
    Bare(Vec<Step>),
}

/// A recipe as read from disk.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub title: Option<String>,
    pub steps: Vec<Step>,
}

impl Recipe {
    pub fn parse(text: &str) -> Result<Self, CliError> {
        let file: RecipeFile =
            serde_json::from_str(text).map_err(|e| CliError::Config(e.to_string()))?;
        Ok(match file {
            RecipeFile::Titled { title, steps } => Self { title, steps },
            RecipeFile::Bare(steps) => Self { title: None, steps },
        })
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
        Self::parse(&text).map_err(|e| match e {
            CliError::Config(msg) => CliError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Validate the steps the way a session would load them.
    pub fn sequence(&self) -> Result<StepSequence, CliError> {
        Ok(StepSequence::new(self.steps.clone())?)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled recipe")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sous_core::SessionError;
    use std::io::Write;

    #[test]
    fn test_parse_bare_array() {
        let recipe = Recipe::parse(
            r#"[{"stepNumber": 2, "instruction": "fry", "durationSeconds": 120},
                {"stepNumber": 1, "instruction": "cut"}]"#,
        )
        .unwrap();
        assert!(recipe.title.is_none());
        assert_eq!(recipe.steps.len(), 2);

        let sequence = recipe.sequence().unwrap();
        assert_eq!(sequence.get(0).unwrap().instruction, "cut");
    }

    #[test]
    fn test_parse_titled_object() {
        let recipe = Recipe::parse(
            r#"{"title": "Omelette", "steps": [{"stepNumber": 1, "instruction": "whisk", "isKeyStep": true}]}"#,
        )
        .unwrap();
        assert_eq!(recipe.display_title(), "Omelette");
        assert!(recipe.steps[0].is_key_step);
    }

    #[test]
    fn test_empty_recipe_fails_validation() {
        let recipe = Recipe::parse("[]").unwrap();
        assert!(matches!(
            recipe.sequence(),
            Err(CliError::Recipe(SessionError::EmptySequence))
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"stepNumber": 1, "instruction": "boil"}}]"#).unwrap();

        let recipe = Recipe::load(file.path()).unwrap();
        assert_eq!(recipe.steps[0].instruction, "boil");
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        assert!(matches!(Recipe::parse("{"), Err(CliError::Config(_))));
    }
}
