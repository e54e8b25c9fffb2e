//! Composition of the sentences the session speaks.
//!
//! Three utterances exist: the step announcement, the periodic timer
//! reminder, and the timer completion notice. All text passes through
//! [`clean`] so stray markup in recipe data is not read aloud.

use sous_core::Step;

/// Options that change how a step announcement reads.
#[derive(Debug, Clone, Copy)]
pub struct AnnouncementOptions {
    /// Include "set the heat to ... degrees" when the step has a temperature.
    pub temperature: bool,
}

impl Default for AnnouncementOptions {
    fn default() -> Self {
        Self { temperature: true }
    }
}

/// "Step {n} of {total}. {instruction}." followed by the optional key-step
/// emphasis, temperature, reminder note and duration.
pub fn step_announcement(step: &Step, total_steps: usize, options: AnnouncementOptions) -> String {
    let mut parts = vec![
        format!("Step {} of {}.", step.step_number, total_steps),
        sentence(&step.instruction),
    ];

    if step.is_key_step {
        parts.push("This is a key step.".to_string());
    }

    if options.temperature {
        if let Some(degrees) = step.temperature {
            parts.push(format!("Set the heat to {degrees} degrees."));
        }
    }

    if let Some(reminder) = step.reminder.as_deref().map(clean).filter(|r| !r.is_empty()) {
        parts.push(format!("Note: {}", sentence(&reminder)));
    }

    if let Some(seconds) = step.duration_seconds.filter(|s| *s > 0) {
        let seconds = u64::try_from(seconds).unwrap_or(0);
        parts.push(format!("About {} needed.", format_duration(seconds)));
    }

    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

/// "{label} — {minutes} and {seconds} remaining."
///
/// Both units are always spoken; hours fold into the minute count.
pub fn timer_reminder(label: &str, remaining_seconds: u64) -> String {
    format!(
        "{} — {} and {} remaining.",
        clean(label),
        plural(remaining_seconds / 60, "minute"),
        plural(remaining_seconds % 60, "second")
    )
}

/// "{label} is done, proceed to the next step."
pub fn timer_completion(label: &str) -> String {
    format!("{} is done, proceed to the next step.", clean(label))
}

/// Spoken form of a duration: "2 minutes", "1 minute and 30 seconds",
/// "1 hour, 5 minutes and 10 seconds".
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let units: Vec<String> = [(hours, "hour"), (minutes, "minute"), (seconds, "second")]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| plural(n, unit))
        .collect();

    match units.as_slice() {
        [] => plural(0, "second"),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Strip markdown emphasis and heading markers, collapse whitespace.
pub fn clean(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '_' | '#' | '`'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn sentence(text: &str) -> String {
    let text = clean(text);
    if text.is_empty() || text.ends_with(['.', '!', '?']) {
        text
    } else {
        format!("{text}.")
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announcement_for_plain_step() {
        let step = Step::new(1, "Cut the onions");
        assert_eq!(
            step_announcement(&step, 3, AnnouncementOptions::default()),
            "Step 1 of 3. Cut the onions."
        );
    }

    #[test]
    fn announcement_includes_reminder_and_duration() {
        let step = Step::new(2, "Fry the onions.")
            .with_duration(120)
            .with_reminder("stir often");
        assert_eq!(
            step_announcement(&step, 3, AnnouncementOptions::default()),
            "Step 2 of 3. Fry the onions. Note: stir often. About 2 minutes needed."
        );
    }

    #[test]
    fn announcement_includes_key_step_and_temperature() {
        let step = Step::new(4, "Sear the steak").key_step().with_temperature(230);
        let text = step_announcement(&step, 5, AnnouncementOptions::default());
        assert!(text.contains("This is a key step."));
        assert!(text.contains("Set the heat to 230 degrees."));

        let quiet = step_announcement(&step, 5, AnnouncementOptions { temperature: false });
        assert!(!quiet.contains("degrees"));
    }

    #[test]
    fn announcement_skips_non_positive_duration() {
        let step = Step::new(1, "Serve").with_duration(0);
        assert!(!step_announcement(&step, 1, AnnouncementOptions::default()).contains("needed"));
    }

    #[test]
    fn reminder_and_completion_text() {
        assert_eq!(
            timer_reminder("step 2", 120),
            "step 2 — 2 minutes and 0 seconds remaining."
        );
        assert_eq!(
            timer_reminder("*simmer*", 61),
            "simmer — 1 minute and 1 second remaining."
        );
        assert_eq!(
            timer_reminder("braise", 3_600),
            "braise — 60 minutes and 0 seconds remaining."
        );
        assert_eq!(
            timer_completion("step 2"),
            "step 2 is done, proceed to the next step."
        );
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0), "0 seconds");
        assert_eq!(format_duration(1), "1 second");
        assert_eq!(format_duration(60), "1 minute");
        assert_eq!(format_duration(90), "1 minute and 30 seconds");
        assert_eq!(format_duration(3910), "1 hour, 5 minutes and 10 seconds");
    }

    #[test]
    fn clean_strips_markup() {
        assert_eq!(clean("  **Whisk**   the _eggs_ "), "Whisk the eggs");
    }
}
