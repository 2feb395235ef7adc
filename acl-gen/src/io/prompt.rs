//! Prompt engine abstraction and a line-based terminal implementation.
//!
//! The [`PromptEngine`] trait decouples the prompt flow from the terminal.
//! Tests use scripted engines that answer by question name without touching
//! stdin.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::debug;

use crate::core::questions::{Answers, Question, QuestionKind};
use crate::core::types::Choice;

/// Presents an ordered question group and returns the answer map.
///
/// Questions whose predicate is false given the answers collected so far must
/// be skipped and must not appear in the result.
pub trait PromptEngine {
    fn prompt(&mut self, questions: &[Question]) -> Result<Answers>;
}

/// Walk `questions` in order, asking only the visible ones.
pub fn ask_visible<F>(questions: &[Question], mut ask: F) -> Result<Answers>
where
    F: FnMut(&Question, &Answers) -> Result<Value>,
{
    let mut answers = Answers::new();
    for question in questions {
        if !question.is_visible(&answers) {
            debug!(question = question.name, "question hidden by predicate");
            continue;
        }
        let value = ask(question, &answers)?;
        answers.insert(question.name, value);
    }
    Ok(answers)
}

/// Interactive prompter reading answers line by line.
///
/// List questions accept a 1-based choice number or the choice value; an
/// empty line takes the default. Invalid input is re-asked.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<String> {
        self.output.flush().context("flush prompt output")?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("read prompt input")?;
        if read == 0 {
            return Err(anyhow!("prompt aborted: unexpected end of input"));
        }
        Ok(line.trim().to_string())
    }

    fn ask_list(&mut self, question: &Question, choices: &[Choice]) -> Result<Value> {
        if choices.is_empty() {
            return Err(anyhow!("question '{}' has no choices", question.name));
        }
        let default_idx = default_choice_index(question, choices);
        loop {
            writeln!(self.output, "? {}", question.message)?;
            for (idx, choice) in choices.iter().enumerate() {
                let marker = if Some(idx) == default_idx {
                    " (default)"
                } else {
                    ""
                };
                writeln!(self.output, "  {}) {}{}", idx + 1, choice.name, marker)?;
            }
            write!(self.output, "  Answer: ")?;
            let line = self.read_line()?;

            if line.is_empty() {
                if let Some(idx) = default_idx {
                    return Ok(choice_value(&choices[idx]));
                }
            } else if let Some(choice) = match_choice(&line, choices) {
                return Ok(choice_value(choice));
            }
            writeln!(
                self.output,
                ">> Please enter a number between 1 and {}",
                choices.len()
            )?;
        }
    }

    fn ask_input(&mut self, question: &Question) -> Result<Value> {
        let default = question.default.as_ref().and_then(Value::as_str);
        loop {
            match default {
                Some(default) => write!(self.output, "? {} ({}): ", question.message, default)?,
                None => write!(self.output, "? {}: ", question.message)?,
            }
            let line = self.read_line()?;
            let answer = match (line.is_empty(), default) {
                (true, Some(default)) => default.to_string(),
                (true, None) => {
                    writeln!(self.output, ">> A value is required")?;
                    continue;
                }
                (false, _) => line,
            };
            match question.validate.map(|validate| validate(&answer)) {
                Some(Err(message)) => writeln!(self.output, ">> {message}")?,
                _ => return Ok(Value::from(answer)),
            }
        }
    }
}

impl<R: BufRead, W: Write> PromptEngine for TerminalPrompter<R, W> {
    fn prompt(&mut self, questions: &[Question]) -> Result<Answers> {
        ask_visible(questions, |question, _answers| match &question.kind {
            QuestionKind::List(choices) => self.ask_list(question, choices),
            QuestionKind::Input => self.ask_input(question),
        })
    }
}

fn choice_value(choice: &Choice) -> Value {
    match &choice.value {
        Some(value) => Value::from(value.as_str()),
        None => Value::Null,
    }
}

/// Index of the choice matching the question default, or the first choice.
fn default_choice_index(question: &Question, choices: &[Choice]) -> Option<usize> {
    match &question.default {
        Some(default) => choices
            .iter()
            .position(|choice| &choice_value(choice) == default)
            .or(Some(0)),
        None => None,
    }
}

fn match_choice<'a>(line: &str, choices: &'a [Choice]) -> Option<&'a Choice> {
    if let Ok(number) = line.parse::<usize>() {
        return number.checked_sub(1).and_then(|idx| choices.get(idx));
    }
    choices
        .iter()
        .find(|choice| choice.value.as_deref() == Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::questions::{scope_is_method, validate_name};

    fn prompter(input: &str) -> TerminalPrompter<&[u8], Vec<u8>> {
        TerminalPrompter::new(input.as_bytes(), Vec::new())
    }

    fn scope_questions() -> Vec<Question> {
        vec![
            Question::list(
                "scope",
                "Select the ACL scope:",
                vec![Choice::new("All", "all"), Choice::new("Method", "method")],
            )
            .with_default(Value::from("all")),
            Question::input("method", "Enter the method name")
                .when(&["scope"], scope_is_method)
                .validated(validate_name),
        ]
    }

    #[test]
    fn list_accepts_number_and_skips_hidden_questions() {
        let mut engine = prompter("1\n");
        let answers = engine.prompt(&scope_questions()).expect("answers");
        assert_eq!(answers.get_str("scope"), Some("all"));
        assert!(!answers.contains("method"));
    }

    #[test]
    fn dependent_question_is_asked_when_visible() {
        let mut engine = prompter("method\nfindById\n");
        let answers = engine.prompt(&scope_questions()).expect("answers");
        assert_eq!(answers.get_str("scope"), Some("method"));
        assert_eq!(answers.get_str("method"), Some("findById"));
    }

    #[test]
    fn empty_line_takes_default() {
        let mut engine = prompter("\n");
        let answers = engine.prompt(&scope_questions()).expect("answers");
        assert_eq!(answers.get_str("scope"), Some("all"));
    }

    #[test]
    fn invalid_input_is_reasked() {
        let mut engine = prompter("9\n2\nfind one\nfind\n");
        let answers = engine.prompt(&scope_questions()).expect("answers");
        assert_eq!(answers.get_str("method"), Some("find"));
        let output = String::from_utf8(engine.into_output()).expect("utf8");
        assert!(output.contains("Please enter a number between 1 and 2"));
        assert!(output.contains("special characters"));
    }

    #[test]
    fn null_choice_answers_null() {
        let questions = vec![
            Question::list(
                "model",
                "Select the model",
                vec![Choice::null("(all models)"), Choice::plain("Book")],
            )
            .with_default(Value::Null),
        ];
        let mut engine = prompter("\n");
        let answers = engine.prompt(&questions).expect("answers");
        assert_eq!(answers.get("model"), Some(&Value::Null));
    }

    #[test]
    fn end_of_input_aborts() {
        let mut engine = prompter("");
        let err = engine.prompt(&scope_questions()).expect_err("eof");
        assert!(err.to_string().contains("end of input"));
    }
}
