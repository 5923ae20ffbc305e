//! Interactive prompting
//!
//! All terminal interaction goes through the [`Prompter`] trait so that
//! menu and credential logic can be exercised with scripted answers.

use std::io::{self, Write};

use crate::error::{ReconcileError, ReconcileResult};

/// Source of operator answers
pub trait Prompter {
    /// Ask a question and return the answer line
    fn ask(&mut self, prompt: &str) -> ReconcileResult<String>;

    /// Ask a question without echoing the answer
    fn ask_secret(&mut self, prompt: &str) -> ReconcileResult<String>;

    /// Show a line of text
    fn say(&mut self, line: &str);
}

/// Prompter backed by stdin/stdout
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str) -> ReconcileResult<String> {
        print!("{}", prompt);
        io::stdout()
            .flush()
            .map_err(|e| ReconcileError::Io(e.to_string()))?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .map_err(|e| ReconcileError::Io(e.to_string()))?;
        if read == 0 {
            return Err(ReconcileError::Io("Unexpected end of input".into()));
        }

        Ok(input.trim().to_string())
    }

    fn ask_secret(&mut self, prompt: &str) -> ReconcileResult<String> {
        rpassword::prompt_password(prompt).map_err(|e| ReconcileError::Io(e.to_string()))
    }

    fn say(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Turn a 1-based menu answer into an index
pub fn parse_choice(answer: &str, len: usize) -> ReconcileResult<usize> {
    let answer = answer.trim().trim_start_matches('#');
    match answer.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => Err(ReconcileError::InvalidChoice(format!(
            "'{}' is not between 1 and {}",
            answer, len
        ))),
    }
}

/// Let the operator pick one item from a numbered menu.
///
/// A single item is picked without asking. Invalid answers re-prompt.
pub fn choose<'a, T>(
    prompter: &mut dyn Prompter,
    label: &str,
    items: &'a [T],
    name: impl Fn(&T) -> &str,
) -> ReconcileResult<&'a T> {
    match items.len() {
        0 => {
            return Err(ReconcileError::Config(format!(
                "No {}s available",
                label.to_lowercase()
            )))
        }
        1 => return Ok(&items[0]),
        _ => {}
    }

    loop {
        prompter.say(&format!("Choose a {}:", label.to_lowercase()));
        for (ix, item) in items.iter().enumerate() {
            prompter.say(&format!("#{}: {}", ix + 1, name(item)));
        }

        let answer = prompter.ask(&format!("{}: ", label))?;
        match parse_choice(&answer, items.len()) {
            Ok(index) => return Ok(&items[index]),
            Err(err @ ReconcileError::InvalidChoice(_)) => {
                tracing::debug!("re-prompting after {}", err);
                prompter.say(&err.to_string());
            }
            Err(err) => return Err(err),
        }
    }
}

/// Prompter that replays canned answers (test helper)
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub transcript: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            transcript: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> ReconcileResult<String> {
        self.transcript.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| ReconcileError::Io("Unexpected end of input".into()))
    }

    fn ask_secret(&mut self, prompt: &str) -> ReconcileResult<String> {
        self.ask(prompt)
    }

    fn say(&mut self, line: &str) {
        self.transcript.push(line.to_string());
    }
}
