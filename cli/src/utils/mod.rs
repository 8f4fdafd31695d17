use anyhow::anyhow;
use colored::*;
use dialoguer::Confirm;

use personas_core::PersonaError;

pub mod progress;

pub use progress::Spinner;

/// Green one-line notice after a successful operation
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_warning(title: &str, message: &str) {
    eprintln!("{} {}", title.yellow().bold(), message.yellow());
}

/// Turn a core failure into the error shown to the user, headed by `action`.
pub fn failure(action: &str, err: PersonaError) -> anyhow::Error {
    match err.api_error() {
        Some(api) => anyhow!("{} ({}): {}", action, api.title(), api.message()),
        None => anyhow!("{}: {}", action, err),
    }
}

/// Ask a yes/no question; `default` is what Enter picks.
pub fn confirm(prompt: &str, default: bool) -> anyhow::Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
