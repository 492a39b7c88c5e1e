//! Line-oriented terminal front end for the wizard.

use std::fmt::Write as _;
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::answers::AnswerValue;
use super::render::{FieldWidget, NavAction, WizardView, LOADING_MESSAGE, NO_DATA_MESSAGE};
use super::state::{Redirect, WizardState};

/// Terminator line for multi-line text input.
const END_OF_TEXT: &str = ".";

/// Answer that clears a text field instead of keeping its value.
const CLEAR_TEXT: &str = "-";

/// How a terminal session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Finish was accepted; the caller should follow the redirect.
    Finished(Redirect),
    /// The user quit or input ended.
    Quit,
    /// Nothing to show (empty catalog or an error).
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Nav(NavAction),
    Edit,
    Quit,
}

fn parse_command(input: &str) -> Option<Command> {
    match input.to_ascii_lowercase().as_str() {
        "n" | "next" => Some(Command::Nav(NavAction::Next)),
        "b" | "back" => Some(Command::Nav(NavAction::Back)),
        "f" | "finish" => Some(Command::Nav(NavAction::Finish)),
        "e" | "edit" => Some(Command::Edit),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}

/// Format a view as plain text.
pub fn format_view(view: &WizardView) -> String {
    let step = match view {
        WizardView::Loading => return format!("{LOADING_MESSAGE}\n"),
        WizardView::Error { message } => return format!("Error: {message}\n"),
        WizardView::NoData => return format!("{NO_DATA_MESSAGE}\n"),
        WizardView::Step(step) => step,
    };

    let mut out = format!("\n{}\n", step.title);
    for widget in &step.fields {
        match widget {
            FieldWidget::TextInput {
                label,
                required,
                value,
                ..
            } => {
                let marker = if *required { " *" } else { "" };
                let _ = writeln!(out, "  {label}{marker}: {}", value.replace('\n', "\n    "));
            }
            FieldWidget::Toggle { label, checked, .. } => {
                let mark = if *checked { "x" } else { " " };
                let _ = writeln!(out, "  [{mark}] {label}");
            }
            FieldWidget::Unsupported {
                name,
                declared_type,
            } => {
                let _ = writeln!(out, "  ({name}: unsupported field type {declared_type:?})");
            }
        }
    }
    if let Some(message) = step.validation_message {
        let _ = writeln!(out, "{message}");
    }

    let buttons: Vec<String> = step
        .buttons
        .iter()
        .map(|b| {
            if b.enabled {
                format!("[{}]", b.action.label())
            } else {
                format!("[{} (disabled)]", b.action.label())
            }
        })
        .collect();
    let _ = writeln!(out, "{}", buttons.join(" "));
    out
}

/// Drives a [`WizardState`] from a line reader.
pub struct TerminalWizard<R, W> {
    input: R,
    output: W,
}

impl<R, W> TerminalWizard<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until Finish, quit, or end of input.
    pub async fn run(&mut self, state: &mut WizardState) -> io::Result<Outcome> {
        let view = state.view();
        if !matches!(view, WizardView::Step(_)) {
            self.write(&format_view(&view)).await?;
            return Ok(Outcome::NoData);
        }

        if !self.prompt_fields(state).await? {
            return Ok(Outcome::Quit);
        }

        loop {
            self.write(&format_view(&state.view())).await?;
            self.write("next/back/finish/edit/quit> ").await?;
            let Some(line) = self.read_line().await? else {
                return Ok(Outcome::Quit);
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let moved = match parse_command(line) {
                Some(Command::Nav(NavAction::Next)) => state.next().map(|_| ()),
                Some(Command::Nav(NavAction::Back)) => state.back().map(|_| ()),
                Some(Command::Nav(NavAction::Finish)) => match state.finish() {
                    Ok(redirect) => {
                        self.write(&format!("Redirecting to {}\n", redirect.target))
                            .await?;
                        return Ok(Outcome::Finished(redirect));
                    }
                    Err(e) => Err(e),
                },
                Some(Command::Edit) => Ok(()),
                Some(Command::Quit) => return Ok(Outcome::Quit),
                None => {
                    self.write(&format!("Unknown command: {line}\n")).await?;
                    continue;
                }
            };

            match moved {
                Ok(()) => {
                    if !self.prompt_fields(state).await? {
                        return Ok(Outcome::Quit);
                    }
                }
                Err(e) => self.write(&format!("{e}\n")).await?,
            }
        }
    }

    /// Ask for every field of the current step. An empty answer keeps the
    /// current value and a lone `-` clears a text field. Returns `false` when
    /// input ends.
    async fn prompt_fields(&mut self, state: &mut WizardState) -> io::Result<bool> {
        let WizardView::Step(view) = state.view() else {
            return Ok(true);
        };

        for widget in view.fields {
            let answer = match widget {
                FieldWidget::TextInput {
                    ref label,
                    required,
                    multiline,
                    ref value,
                    ..
                } => {
                    let marker = if required { " *" } else { "" };
                    let current = if value.is_empty() {
                        String::new()
                    } else {
                        format!(" [{value}] ('{CLEAR_TEXT}' clears)")
                    };
                    let text = if multiline {
                        self.write(&format!(
                            "{label}{marker}{current} (finish with a line containing only '{END_OF_TEXT}'):\n"
                        ))
                        .await?;
                        self.read_multiline().await?
                    } else {
                        self.write(&format!("{label}{marker}{current}: ")).await?;
                        self.read_line().await?
                    };
                    let Some(text) = text else {
                        return Ok(false);
                    };
                    match text.as_str() {
                        "" => None,
                        CLEAR_TEXT => Some(AnswerValue::Text(String::new())),
                        _ => Some(AnswerValue::Text(text)),
                    }
                }
                FieldWidget::Toggle { ref name, ref label, checked } => {
                    let current = match state.answers().get(name) {
                        Some(_) if checked => " [yes]",
                        Some(_) => " [no]",
                        None => "",
                    };
                    match self.read_toggle(label, current).await? {
                        Some(answer) => answer.map(AnswerValue::Flag),
                        None => return Ok(false),
                    }
                }
                FieldWidget::Unsupported {
                    ref name,
                    ref declared_type,
                } => {
                    self.write(&format!(
                        "Skipping {name}: unsupported field type {declared_type:?}\n"
                    ))
                    .await?;
                    None
                }
            };

            if let Some(answer) = answer {
                if let Err(e) = state.input(widget.name(), answer) {
                    self.write(&format!("{e}\n")).await?;
                }
            }
        }
        Ok(true)
    }

    /// `Ok(None)` on end of input, `Ok(Some(None))` to keep the current value.
    async fn read_toggle(&mut self, label: &str, current: &str) -> io::Result<Option<Option<bool>>> {
        loop {
            self.write(&format!("{label} [y/n]{current}: ")).await?;
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            if line.trim().is_empty() {
                return Ok(Some(None));
            }
            match parse_yes_no(&line) {
                Some(flag) => return Ok(Some(Some(flag))),
                None => self.write("Please answer y or n.\n").await?,
            }
        }
    }

    async fn read_multiline(&mut self) -> io::Result<Option<String>> {
        let mut lines = Vec::new();
        loop {
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            if line == END_OF_TEXT {
                return Ok(Some(lines.join("\n")));
            }
            lines.push(line);
        }
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    async fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{StepCatalog, default_catalog};

    async fn drive(state: &mut WizardState, script: &str) -> (Outcome, String) {
        let mut wizard = TerminalWizard::new(script.as_bytes(), Vec::new());
        let outcome = wizard.run(state).await.unwrap();
        let output = String::from_utf8(wizard.into_output()).unwrap();
        (outcome, output)
    }

    #[test]
    fn commands() {
        assert_eq!(parse_command("NEXT"), Some(Command::Nav(NavAction::Next)));
        assert_eq!(parse_command("b"), Some(Command::Nav(NavAction::Back)));
        assert_eq!(parse_command("finish"), Some(Command::Nav(NavAction::Finish)));
        assert_eq!(parse_command("jump"), None);
        assert_eq!(parse_yes_no(" Yes "), Some(true));
        assert_eq!(parse_yes_no("n"), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
    }

    #[tokio::test]
    async fn full_walkthrough_finishes() {
        let mut state = WizardState::with_catalog(default_catalog());
        let script = "Ada\n\nline one\nline two\n.\nnext\nUK\ny\nmaybe\nn\nfinish\n";
        let (outcome, output) = drive(&mut state, script).await;

        assert_eq!(outcome, Outcome::Finished(Redirect::home_after_onboarding()));
        assert!(output.contains("Step 1 of 2"));
        assert!(output.contains("Step 2 of 2"));
        assert!(output.contains("Please answer y or n."));
        assert!(output.contains("Redirecting to /home"));
        assert!(state.answers().is_empty());
    }

    #[tokio::test]
    async fn next_refused_until_required_filled() {
        let mut state = WizardState::with_catalog(default_catalog());
        let script = "\n\n.\nnext\nedit\nAda\n\n.\nnext\n\n\n\nquit\n";
        let (outcome, output) = drive(&mut state, script).await;

        assert_eq!(outcome, Outcome::Quit);
        assert!(output.contains("missing required fields: firstName"));
        assert!(output.contains("[Next (disabled)]"));
        assert_eq!(state.current_index(), 1);
    }

    #[tokio::test]
    async fn back_keeps_answers() {
        let mut state = WizardState::with_catalog(default_catalog());
        let script = "Ada\n\n.\nnext\n\n\n\nback\n\n\n.\nquit\n";
        let (outcome, output) = drive(&mut state, script).await;

        assert_eq!(outcome, Outcome::Quit);
        assert_eq!(state.current_index(), 0);
        assert!(output.contains("First Name * [Ada] ('-' clears): "));
    }

    #[tokio::test]
    async fn clearing_required_field_blocks_next() {
        let mut state = WizardState::with_catalog(default_catalog());
        let script = "Ada\nLovelace\n.\nedit\n-\n-\n.\nnext\nquit\n";
        let (outcome, output) = drive(&mut state, script).await;

        assert_eq!(outcome, Outcome::Quit);
        assert_eq!(state.current_index(), 0);
        assert_eq!(
            state.answers().get("firstName"),
            Some(&AnswerValue::Text(String::new()))
        );
        assert_eq!(
            state.answers().get("lastName"),
            Some(&AnswerValue::Text(String::new()))
        );
        assert!(!state.can_go_next());
        assert!(output.contains("missing required fields: firstName"));
    }

    #[tokio::test]
    async fn multiline_clear_marker() {
        let mut state = WizardState::with_catalog(default_catalog());
        let script = "Ada\n\nabout me\n.\nedit\n\n\n-\n.\nquit\n";
        let (outcome, _) = drive(&mut state, script).await;

        assert_eq!(outcome, Outcome::Quit);
        assert_eq!(state.answers().get("bio"), Some(&AnswerValue::Text(String::new())));
        assert!(state.can_go_next());
    }

    #[tokio::test]
    async fn end_of_input_quits() {
        let mut state = WizardState::with_catalog(default_catalog());
        let (outcome, _) = drive(&mut state, "Ada\n").await;
        assert_eq!(outcome, Outcome::Quit);
    }

    #[tokio::test]
    async fn empty_catalog_shows_no_data() {
        let mut state = WizardState::with_catalog(StepCatalog::default());
        let (outcome, output) = drive(&mut state, "next\n").await;
        assert_eq!(outcome, Outcome::NoData);
        assert!(output.contains(NO_DATA_MESSAGE));
    }

    #[test]
    fn format_step_view() {
        let mut state = WizardState::with_catalog(default_catalog());
        state
            .input("firstName", AnswerValue::Text("Ada".into()))
            .unwrap();
        let text = format_view(&state.view());
        assert!(text.contains("First Name *: Ada"));
        assert!(text.contains("[Next]"));
        assert!(!text.contains("Please fill"));
    }
}
