//! Recipe steps and the ordered sequence a session walks through.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// One instruction unit of a recipe.
///
/// Steps are immutable once loaded. `step_number` is the ordering key and
/// must be unique within a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Ordering key, unique within a sequence.
    pub step_number: u32,

    /// Text read aloud for this step.
    pub instruction: String,

    /// How long the step takes. Steps with a duration get a countdown
    /// timer when they are announced.
    #[serde(default)]
    pub duration_seconds: Option<i64>,

    /// Target temperature in degrees, if the step involves heat.
    #[serde(default)]
    pub temperature: Option<i32>,

    /// Whether the step is critical to the outcome of the recipe.
    #[serde(default)]
    pub is_key_step: bool,

    /// Extra note read after the instruction.
    #[serde(default)]
    pub reminder: Option<String>,
}

impl Step {
    pub fn new(step_number: u32, instruction: impl Into<String>) -> Self {
        Self {
            step_number,
            instruction: instruction.into(),
            duration_seconds: None,
            temperature: None,
            is_key_step: false,
            reminder: None,
        }
    }

    #[must_use]
    pub const fn with_duration(mut self, seconds: i64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, degrees: i32) -> Self {
        self.temperature = Some(degrees);
        self
    }

    #[must_use]
    pub fn with_reminder(mut self, reminder: impl Into<String>) -> Self {
        self.reminder = Some(reminder.into());
        self
    }

    #[must_use]
    pub const fn key_step(mut self) -> Self {
        self.is_key_step = true;
        self
    }

    /// Label used for this step's timer in spoken reminders.
    pub fn timer_label(&self) -> String {
        format!("step {}", self.step_number)
    }
}

/// Steps ordered ascending by `step_number`.
///
/// Input order is not trusted: [`StepSequence::new`] sorts. A sequence is
/// never empty and never contains two steps with the same number. Cloning is
/// cheap (the steps are shared), so snapshots can carry the whole sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSequence {
    steps: Arc<[Step]>,
}

impl StepSequence {
    /// Sort and validate a step list.
    ///
    /// Fails with [`SessionError::EmptySequence`] for an empty list and
    /// [`SessionError::DuplicateStepNumber`] when two steps share a number.
    pub fn new(mut steps: Vec<Step>) -> Result<Self, SessionError> {
        if steps.is_empty() {
            return Err(SessionError::EmptySequence);
        }

        let mut seen = HashSet::with_capacity(steps.len());
        if let Some(dup) = steps.iter().find(|s| !seen.insert(s.step_number)) {
            return Err(SessionError::DuplicateStepNumber(dup.step_number));
        }

        steps.sort_by_key(|s| s.step_number);
        Ok(Self {
            steps: steps.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Position of the step with the given number.
    pub fn position_of(&self, step_number: u32) -> Option<usize> {
        self.steps.iter().position(|s| s.step_number == step_number)
    }

    pub fn find(&self, step_number: u32) -> Option<&Step> {
        self.position_of(step_number).and_then(|i| self.steps.get(i))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    pub fn as_slice(&self) -> &[Step] {
        &self.steps
    }
}

impl<'a> IntoIterator for &'a StepSequence {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
