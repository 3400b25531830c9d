//! Interactive operator prompts.

use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use mockall::automock;
use thiserror::Error;

/// Errors raised while prompting the operator.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The terminal interaction failed or was aborted.
    #[error("prompt failed")]
    Terminal(#[from] dialoguer::Error),

    /// A selection was requested from an empty list.
    #[error("nothing to select for \"{0}\"")]
    NoItems(String),
}

/// Operator input collaborator.
#[automock]
pub trait Prompter: Send + Sync {
    /// Pick one of `items`; returns its index.
    ///
    /// # Errors
    ///
    /// Returns an error when `items` is empty or the terminal fails.
    fn select(&self, label: &str, items: &[String]) -> Result<usize, PromptError>;

    /// Free-text input. Blank answers are rejected; `default` is offered when
    /// present.
    ///
    /// # Errors
    ///
    /// Returns an error when the terminal fails.
    fn input(&self, label: &str, default: Option<String>) -> Result<String, PromptError>;

    /// Yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error when the terminal fails.
    fn confirm(&self, label: &str) -> Result<bool, PromptError>;
}

/// [`Prompter`] backed by `dialoguer` on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(&self, label: &str, items: &[String]) -> Result<usize, PromptError> {
        if items.is_empty() {
            return Err(PromptError::NoItems(label.to_string()));
        }

        let index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .items(items)
            .default(0)
            .interact()?;

        Ok(index)
    }

    fn input(&self, label: &str, default: Option<String>) -> Result<String, PromptError> {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme).with_prompt(label);

        if let Some(default) = default {
            input = input.default(default);
        }

        let value = input
            .validate_with(|value: &String| {
                if value.trim().is_empty() {
                    Err("this input must not be empty")
                } else {
                    Ok(())
                }
            })
            .interact_text()?;

        Ok(value.trim().to_string())
    }

    fn confirm(&self, label: &str) -> Result<bool, PromptError> {
        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .default(true)
            .interact()?;

        Ok(answer)
    }
}
