// View filters over the task list

use crate::task::Task;
use serde::{Deserialize, Serialize};

/// Which tasks a view shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,    // !completed
    Completed, // completed
}

impl Filter {
    pub const VARIANTS: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    /// Whether `task` belongs in this view
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
