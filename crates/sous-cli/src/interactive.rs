//! Line commands accepted during `sous run`.

use std::str::FromStr;

/// One command typed at the session prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Next,
    Previous,
    GoTo(u32),
    /// Say the current step again.
    Repeat,
    PlayPause,
    /// Stop or resume the timer of a step.
    ToggleTimer(u32),
    ListTimers,
    /// Cancel every running timer.
    CancelTimers,
    Stop,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err("empty command".to_string());
        };
        let arg = words.next();
        if words.next().is_some() {
            return Err(format!("too many arguments for '{verb}'"));
        }

        let step_number = |name: &str| -> Result<u32, String> {
            let raw = arg.ok_or_else(|| format!("'{name}' needs a step number"))?;
            raw.parse()
                .map_err(|_| format!("'{raw}' is not a step number"))
        };

        match verb.to_ascii_lowercase().as_str() {
            "n" | "next" => Ok(Self::Next),
            "p" | "prev" | "previous" => Ok(Self::Previous),
            "g" | "go" | "goto" => step_number(verb).map(Self::GoTo),
            "r" | "repeat" => Ok(Self::Repeat),
            "t" | "toggle" | "pause" | "play" => Ok(Self::PlayPause),
            "timer" => step_number(verb).map(Self::ToggleTimer),
            "timers" => Ok(Self::ListTimers),
            "c" | "cancel" => Ok(Self::CancelTimers),
            "s" | "stop" => Ok(Self::Stop),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}', type 'h' for help")),
        }
    }
}

pub const HELP: &str = "\
Commands:
  n, next          next step
  p, prev          previous step
  g <n>            go to step n
  r, repeat        repeat the current step
  t, toggle        pause / resume narration
  timer <n>        stop or resume the timer of step n
  timers           list running timers
  c, cancel        cancel all timers
  s, stop          stop the session
  q, quit          release everything and exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("n".parse(), Ok(SessionCommand::Next));
        assert_eq!("  PREV ".parse(), Ok(SessionCommand::Previous));
        assert_eq!("timers".parse(), Ok(SessionCommand::ListTimers));
        assert_eq!("q".parse(), Ok(SessionCommand::Quit));
    }

    #[test]
    fn test_parse_step_arguments() {
        assert_eq!("g 3".parse(), Ok(SessionCommand::GoTo(3)));
        assert_eq!("timer 2".parse(), Ok(SessionCommand::ToggleTimer(2)));
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<SessionCommand>().is_err());
        assert!("g".parse::<SessionCommand>().is_err());
        assert!("g two".parse::<SessionCommand>().is_err());
        assert!("n 1 2".parse::<SessionCommand>().is_err());
        assert!("dance".parse::<SessionCommand>().is_err());
    }
}
