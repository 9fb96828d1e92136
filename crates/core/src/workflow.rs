//! The workflow runner (spec §4.7): execute a sequence of intents against one
//! engine, honoring `atomic` (stop and flag for rollback on the first failure)
//! and `continueOnError` (run every step regardless, collect every outcome)
//! semantics. There is no real transaction log — "rollback" here means the
//! engine tells the caller a partial mutation happened, not that it undoes one.

use serde::{Deserialize, Serialize};

use crate::engine::PackfsEngine;
use crate::intent::{Intent, IntentResult};

/// A step list plus run semantics, loadable straight from the JSON shape the
/// CLI's `workflow` subcommand reads from a file (spec §10.5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub steps: Vec<Intent>,
    #[serde(default)]
    pub atomic: bool,
    #[serde(default)]
    pub continue_on_error: bool,
}

impl Workflow {
    pub fn new(steps: Vec<Intent>) -> Self {
        Self { steps, atomic: false, continue_on_error: false }
    }

    pub fn atomic(mut self) -> Self {
        self.atomic = true;
        self
    }

    pub fn continue_on_error(mut self) -> Self {
        self.continue_on_error = true;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<IntentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub success: bool,
    pub steps: Vec<StepOutcome>,
    /// Set whenever the run stopped because a step failed and the workflow was
    /// not `continueOnError` — whether `atomic` or the plain stop-and-fail
    /// default. There is no automatic undo; the caller reconciles manually.
    pub rollback_required: bool,
}

impl PackfsEngine {
    pub async fn run_workflow(&mut self, workflow: &Workflow) -> WorkflowResult {
        let mut outcomes = Vec::with_capacity(workflow.steps.len());
        let mut overall_success = true;
        let mut rollback_required = false;

        for (step_index, intent) in workflow.steps.iter().cloned().enumerate() {
            let started = std::time::Instant::now();
            let outcome = self.execute(intent).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let step_failed = match &outcome {
                Ok(result) => !result.success(),
                Err(_) => true,
            };

            let (result, error) = match outcome {
                Ok(result) => (Some(result), None),
                Err(e) => (None, Some(e.message())),
            };
            outcomes.push(StepOutcome { step_index, result, error, duration_ms });

            if step_failed {
                overall_success = false;
                // Stop-and-fail always leaves state the caller must reconcile: an
                // atomic workflow stops on its first failure by definition, and a
                // plain (non-continueOnError) workflow stops here too, regardless
                // of which step index failed.
                if !workflow.continue_on_error {
                    rollback_required = true;
                    break;
                }
            }
        }

        WorkflowResult { success: overall_success, steps: outcomes, rollback_required }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{
        AccessPreferences, AccessPurpose, FileAccessIntent, FileTarget, FileUpdateIntent, OperationOptions,
        UpdatePurpose,
    };

    fn read_intent(path: &str) -> Intent {
        Intent::Access(FileAccessIntent {
            purpose: AccessPurpose::Read,
            target: FileTarget::from_path(path),
            preferences: AccessPreferences::default(),
            options: OperationOptions::default(),
        })
    }

    fn create_intent(path: &str, content: &str) -> Intent {
        Intent::Update(FileUpdateIntent {
            purpose: UpdatePurpose::Create,
            target: FileTarget::from_path(path),
            content: Some(content.to_string()),
            options: OperationOptions::default(),
        })
    }

    #[test]
    fn deserializes_from_a_json_step_list() {
        let json = r#"{
            "atomic": true,
            "steps": [
                {"category": "update", "purpose": "create", "target": {"path": "a.txt"}, "content": "hi"}
            ]
        }"#;
        let workflow: Workflow = serde_json::from_str(json).unwrap();
        assert!(workflow.atomic);
        assert!(!workflow.continue_on_error);
        assert_eq!(workflow.steps.len(), 1);
    }

    #[tokio::test]
    async fn all_steps_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = PackfsEngine::start(dir.path()).await.unwrap();
        let workflow = Workflow::new(vec![create_intent("a.txt", "hello"), read_intent("a.txt")]);
        let result = engine.run_workflow(&workflow).await;
        assert!(result.success);
        assert_eq!(result.steps.len(), 2);
        assert!(!result.rollback_required);
    }

    #[tokio::test]
    async fn atomic_workflow_stops_and_flags_rollback_after_partial_success() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = PackfsEngine::start(dir.path()).await.unwrap();
        // Second step creates the same file again without createPath, which conflicts.
        let workflow =
            Workflow::new(vec![create_intent("a.txt", "hello"), create_intent("a.txt", "again")]).atomic();
        let result = engine.run_workflow(&workflow).await;
        assert!(!result.success);
        assert!(result.rollback_required);
        assert_eq!(result.steps.len(), 2);
    }

    #[tokio::test]
    async fn default_workflow_stops_and_flags_rollback_on_first_step_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = PackfsEngine::start(dir.path()).await.unwrap();
        // Neither atomic nor continueOnError: the very first step fails and the
        // run still has to stop-and-flag, with no prior successful step at all.
        let workflow = Workflow::new(vec![read_intent("missing.txt"), create_intent("a.txt", "hello")]);
        let result = engine.run_workflow(&workflow).await;
        assert!(!result.success);
        assert!(result.rollback_required);
        assert_eq!(result.steps.len(), 1);
    }

    #[tokio::test]
    async fn continue_on_error_runs_every_step() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = PackfsEngine::start(dir.path()).await.unwrap();
        let workflow = Workflow::new(vec![
            create_intent("a.txt", "hello"),
            create_intent("a.txt", "again"),
            read_intent("a.txt"),
        ])
        .continue_on_error();
        let result = engine.run_workflow(&workflow).await;
        assert!(!result.success);
        assert_eq!(result.steps.len(), 3);
        assert!(!result.rollback_required);
    }
}
