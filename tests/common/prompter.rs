//! Scripted answers for the Prompter

#![allow(dead_code)]

use git_ryu::error::{Error, Result};
use git_ryu::prompt::Prompter;
use std::cell::RefCell;
use std::collections::VecDeque;

/// One scripted answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Confirm(bool),
    Select(Option<usize>),
    Input(String),
}

/// Replays answers in order and records every question
///
/// A question with no scripted answer, or an answer of the wrong kind,
/// fails with `NonInteractive` so unexpected prompts surface in tests.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Answer>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Questions asked so far
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    /// Answers that were never used
    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, message: &str) -> Option<Answer> {
        self.asked.borrow_mut().push(message.to_string());
        self.answers.borrow_mut().pop_front()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, message: &str, _default: bool) -> Result<bool> {
        match self.next(message) {
            Some(Answer::Confirm(answer)) => Ok(answer),
            _ => Err(Error::NonInteractive(message.to_string())),
        }
    }

    fn select(&self, message: &str, _options: &[String]) -> Result<Option<usize>> {
        match self.next(message) {
            Some(Answer::Select(answer)) => Ok(answer),
            _ => Err(Error::NonInteractive(message.to_string())),
        }
    }

    fn input(&self, message: &str, _initial: &str) -> Result<String> {
        match self.next(message) {
            Some(Answer::Input(answer)) => Ok(answer),
            _ => Err(Error::NonInteractive(message.to_string())),
        }
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

/// Accepts every default: confirms, picks the first option, keeps initial text
#[derive(Default)]
pub struct YesPrompter {
    asked: RefCell<Vec<String>>,
}

impl YesPrompter {
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl Prompter for YesPrompter {
    fn confirm(&self, message: &str, _default: bool) -> Result<bool> {
        self.asked.borrow_mut().push(message.to_string());
        Ok(true)
    }

    fn select(&self, message: &str, _options: &[String]) -> Result<Option<usize>> {
        self.asked.borrow_mut().push(message.to_string());
        Ok(Some(0))
    }

    fn input(&self, message: &str, initial: &str) -> Result<String> {
        self.asked.borrow_mut().push(message.to_string());
        Ok(initial.to_string())
    }

    fn is_interactive(&self) -> bool {
        true
    }
}
