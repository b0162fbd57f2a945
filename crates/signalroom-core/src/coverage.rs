//! Coverage assessment.
//!
//! Tells the user how much of their tool landscape the brief actually saw,
//! so a brief built from one connected tool does not read as complete.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Percentage at or above which coverage is high.
pub const HIGH_COVERAGE: u8 = 80;
/// Percentage at or above which coverage is medium.
pub const MEDIUM_COVERAGE: u8 = 40;

/// Trust bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageLevel {
    Low,
    Medium,
    High,
}

impl CoverageLevel {
    pub fn from_percentage(percentage: u8) -> Self {
        if percentage >= HIGH_COVERAGE {
            Self::High
        } else if percentage >= MEDIUM_COVERAGE {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Supported tools, grouped by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCatalog {
    /// Chat-style tools
    pub communication: BTreeSet<String>,
    /// Tracker-style tools
    pub task: BTreeSet<String>,
}

impl ToolCatalog {
    pub fn new<C, T, S>(communication: C, task: T) -> Self
    where
        C: IntoIterator<Item = S>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            communication: communication.into_iter().map(|s| normalize_tool(s.as_ref())).collect(),
            task: task.into_iter().map(|s| normalize_tool(s.as_ref())).collect(),
        }
    }

    /// Every supported tool.
    pub fn all(&self) -> BTreeSet<String> {
        self.communication.union(&self.task).cloned().collect()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new(["slack", "discord"], ["linear", "github", "notion"])
    }
}

/// How trustworthy the brief is given the connected tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageAssessment {
    pub overall: CoverageLevel,
    /// 0 to 100
    pub percentage: u8,
    pub communication_coverage: u8,
    pub task_coverage: u8,
    pub connected_tools: BTreeSet<String>,
    pub missing_tools: BTreeSet<String>,
    pub message: String,
}

/// Assesses coverage against a tool catalog.
#[derive(Debug, Clone, Default)]
pub struct CoverageAssessor {
    catalog: ToolCatalog,
}

impl CoverageAssessor {
    pub fn new(catalog: ToolCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Assess coverage for the given connected provider names.
    pub fn assess<I, S>(&self, connected: I) -> CoverageAssessment
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let known = self.catalog.all();
        let mut connected_tools = BTreeSet::new();
        for name in connected {
            let name = normalize_tool(name.as_ref());
            if known.contains(&name) {
                connected_tools.insert(name);
            } else {
                tracing::debug!(tool = %name, "ignoring connected tool outside the catalog");
            }
        }

        let communication = category_coverage(&self.catalog.communication, &connected_tools);
        let task = category_coverage(&self.catalog.task, &connected_tools);

        let percentage = match (communication, task) {
            (Some(c), Some(t)) => ((f64::from(c) + f64::from(t)) / 2.0).round() as u8,
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => 0,
        };
        let overall = CoverageLevel::from_percentage(percentage);
        let missing_tools: BTreeSet<String> = known.difference(&connected_tools).cloned().collect();
        let message = coverage_message(overall, percentage, &connected_tools, &missing_tools);

        CoverageAssessment {
            overall,
            percentage,
            communication_coverage: communication.unwrap_or(0),
            task_coverage: task.unwrap_or(0),
            connected_tools,
            missing_tools,
            message,
        }
    }
}

/// Assess coverage against the default catalog.
pub fn assess_coverage<I, S>(connected: I) -> CoverageAssessment
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    CoverageAssessor::default().assess(connected)
}

fn normalize_tool(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Rounded share of `known` that is connected; `None` for an empty category.
fn category_coverage(known: &BTreeSet<String>, connected: &BTreeSet<String>) -> Option<u8> {
    if known.is_empty() {
        return None;
    }
    let hit = known.intersection(connected).count();
    Some(((hit as f64 / known.len() as f64) * 100.0).round() as u8)
}

fn join_tools(tools: &BTreeSet<String>) -> String {
    tools.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn coverage_message(
    overall: CoverageLevel,
    percentage: u8,
    connected: &BTreeSet<String>,
    missing: &BTreeSet<String>,
) -> String {
    if connected.is_empty() {
        return "No tools are connected; this brief cannot see any of your work.".to_string();
    }
    match overall {
        CoverageLevel::High if missing.is_empty() => format!(
            "All {} supported tools are connected; this brief reflects your full workload.",
            connected.len()
        ),
        CoverageLevel::High => format!(
            "Coverage is high ({percentage}%), but {} not connected.",
            with_verb(missing)
        ),
        CoverageLevel::Medium => format!(
            "You're seeing part of the picture ({percentage}%). Connect {} for a complete brief.",
            join_tools(missing)
        ),
        CoverageLevel::Low => format!(
            "Coverage is low ({percentage}%). This brief may miss important items from {}.",
            join_tools(missing)
        ),
    }
}

fn with_verb(tools: &BTreeSet<String>) -> String {
    if tools.len() == 1 {
        format!("{} is", join_tools(tools))
    } else {
        format!("{} are", join_tools(tools))
    }
}
