//! Plan, change set, and publish handle types passed between stages.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One step of a plan.
///
/// Steps are structured at the planning boundary: the planner is
/// responsible for naming the target resource explicitly, so downstream
/// stages never re-derive file names from prose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// What to do in this step.
    pub instruction: String,

    /// The resource this step applies to, if the step touches one.
    pub target: Option<PathBuf>,
}

impl PlanStep {
    /// Create a step without a target resource.
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            target: None,
        }
    }

    /// Builder method to set the target resource.
    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Ordered sequence of steps produced by the planner for one task.
///
/// Consumed only by the editor stage; never persisted beyond a single
/// pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanResult {
    steps: Vec<PlanStep>,
}

impl PlanResult {
    /// Create a plan from an ordered list of steps.
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    /// The steps in plan order.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True if the planner produced no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Set of resource identifiers touched by one pipeline run.
///
/// Keeps first-touch order and ignores duplicate inserts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    paths: Vec<PathBuf>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a touched resource. Duplicates are ignored.
    pub fn insert(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    /// The touched resources in first-touch order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of touched resources.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True if nothing was touched.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate over the touched resources.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

impl FromIterator<PathBuf> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.insert(path);
        }
        set
    }
}

/// Handle to the external change request produced by the publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishHandle {
    /// Branch the changes were pushed to.
    pub branch: String,

    /// URL of the created change request.
    pub url: String,
}

impl PublishHandle {
    /// Create a new handle.
    pub fn new(branch: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            url: url.into(),
        }
    }
}
