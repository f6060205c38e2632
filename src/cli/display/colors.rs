//! Color mapping for build statuses, categories and thread states.
//!
//! `console` drops styling when the stream is not a terminal or `NO_COLOR`
//! is set.

use console::{style, StyledObject};

use crate::domain::models::{BuildStatus, Category, ThreadState};

pub fn colorize_status(status: BuildStatus) -> StyledObject<&'static str> {
    match status {
        BuildStatus::Success => style(status.as_str()).green(),
        BuildStatus::Failure => style(status.as_str()).red().bold(),
        BuildStatus::Unknown => style(status.as_str()).dim(),
    }
}

pub fn colorize_category(category: Category) -> StyledObject<&'static str> {
    match category {
        Category::Timing => style(category.as_str()).yellow(),
        Category::ResourceContention => style(category.as_str()).magenta(),
        Category::EnvironmentDependency => style(category.as_str()).blue(),
        Category::ThreadSafety => style(category.as_str()).red(),
        Category::Unclassified => style(category.as_str()).dim(),
    }
}

pub fn colorize_thread_state(state: ThreadState) -> StyledObject<&'static str> {
    if state.is_stalled() {
        style(state.as_str()).yellow()
    } else {
        style(state.as_str()).white()
    }
}

/// Flakiness rate: green at 0, yellow below 20, red otherwise.
pub fn colorize_rate(percent: u32) -> StyledObject<String> {
    let text = format!("{percent}%");
    match percent {
        0 => style(text).green(),
        1..=19 => style(text).yellow(),
        _ => style(text).red().bold(),
    }
}
