//! Blocking user interaction
//!
//! Engines ask questions through `Prompter`; the binary wires in the
//! terminal implementation and tests script the answers.

use crate::error::{Error, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::io::IsTerminal;

/// Ask-the-user capability
pub trait Prompter {
    /// Yes/no question
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;

    /// Pick one option; `None` means the user cancelled
    fn select(&self, message: &str, options: &[String]) -> Result<Option<usize>>;

    /// Free text, pre-filled with `initial`
    fn input(&self, message: &str, initial: &str) -> Result<String>;

    /// Whether answers can actually be collected
    fn is_interactive(&self) -> bool;
}

/// Prompts on the controlling terminal via dialoguer
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(|e| Error::Prompt(format!("Failed to read confirmation: {e}")))
    }

    fn select(&self, message: &str, options: &[String]) -> Result<Option<usize>> {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .items(options)
            .default(0)
            .interact_opt()
            .map_err(|e| Error::Prompt(format!("Failed to read selection: {e}")))
    }

    fn input(&self, message: &str, initial: &str) -> Result<String> {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Prompt(format!("Failed to read input: {e}")))
    }

    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
    }
}

/// Refuses every question, turning required input into a fatal error
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn confirm(&self, message: &str, _default: bool) -> Result<bool> {
        Err(Error::NonInteractive(message.to_string()))
    }

    fn select(&self, message: &str, _options: &[String]) -> Result<Option<usize>> {
        Err(Error::NonInteractive(message.to_string()))
    }

    fn input(&self, message: &str, _initial: &str) -> Result<String> {
        Err(Error::NonInteractive(message.to_string()))
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Pick the prompter for this process
pub fn default_prompter() -> Box<dyn Prompter> {
    let terminal = TerminalPrompter;
    if terminal.is_interactive() {
        Box::new(terminal)
    } else {
        Box::new(NonInteractive)
    }
}
