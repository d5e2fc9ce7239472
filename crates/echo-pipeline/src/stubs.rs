//! Hand-rolled stage capability stubs for orchestrator and runner tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use echo_core::{
    ChangeSet, Editor, PlanResult, PlanStep, Planner, PublishHandle, Publisher, StageError,
    Verifier,
};

/// Shared invocation counter so tests can assert a stage was never reached.
#[derive(Clone, Default)]
pub(crate) struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub(crate) fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub(crate) struct StubPlanner {
    steps: usize,
    error: Option<String>,
}

impl StubPlanner {
    pub(crate) fn with_steps(steps: usize) -> Self {
        Self { steps, error: None }
    }

    pub(crate) fn failing(reason: &str) -> Self {
        Self {
            steps: 0,
            error: Some(reason.to_string()),
        }
    }
}

#[async_trait]
impl Planner for StubPlanner {
    async fn plan(&self, _description: &str) -> Result<PlanResult, StageError> {
        if let Some(reason) = &self.error {
            return Err(StageError::PlanningFailed(reason.clone()));
        }
        let steps = (0..self.steps)
            .map(|i| PlanStep::new(format!("step {}", i + 1)))
            .collect();
        Ok(PlanResult::new(steps))
    }
}

pub(crate) struct StubEditor {
    paths: Vec<String>,
    error: Option<String>,
}

impl StubEditor {
    pub(crate) fn touching(paths: &[&str]) -> Self {
        Self {
            paths: paths.iter().map(|p| p.to_string()).collect(),
            error: None,
        }
    }

    pub(crate) fn failing(reason: &str) -> Self {
        Self {
            paths: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

#[async_trait]
impl Editor for StubEditor {
    async fn apply(
        &self,
        _description: &str,
        _plan: &PlanResult,
    ) -> Result<ChangeSet, StageError> {
        if let Some(reason) = &self.error {
            return Err(StageError::EditFailed(reason.clone()));
        }
        let mut changed = ChangeSet::new();
        for path in &self.paths {
            changed.insert(path);
        }
        Ok(changed)
    }
}

pub(crate) struct StubVerifier {
    result: Result<bool, String>,
    calls: CallCounter,
}

impl StubVerifier {
    pub(crate) fn passing() -> Self {
        Self {
            result: Ok(true),
            calls: CallCounter::default(),
        }
    }

    pub(crate) fn failing_checks() -> Self {
        Self {
            result: Ok(false),
            calls: CallCounter::default(),
        }
    }

    pub(crate) fn broken(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
            calls: CallCounter::default(),
        }
    }

    pub(crate) fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl Verifier for StubVerifier {
    async fn check(&self, _changed: &ChangeSet) -> Result<bool, StageError> {
        self.calls.bump();
        match &self.result {
            Ok(passed) => Ok(*passed),
            Err(reason) => Err(StageError::VerificationFailed(reason.clone())),
        }
    }
}

pub(crate) struct StubPublisher {
    error: Option<String>,
    calls: CallCounter,
}

impl StubPublisher {
    pub(crate) fn ok() -> Self {
        Self {
            error: None,
            calls: CallCounter::default(),
        }
    }

    pub(crate) fn failing(reason: &str) -> Self {
        Self {
            error: Some(reason.to_string()),
            calls: CallCounter::default(),
        }
    }

    pub(crate) fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl Publisher for StubPublisher {
    async fn publish(
        &self,
        _description: &str,
        _changed: &ChangeSet,
    ) -> Result<PublishHandle, StageError> {
        self.calls.bump();
        if let Some(reason) = &self.error {
            return Err(StageError::PublishFailed(reason.clone()));
        }
        Ok(PublishHandle::new("agent-fix/test", "https://example.com/pr/1"))
    }
}
