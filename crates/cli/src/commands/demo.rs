//! opsdesk demo command
//!
//! Replays the reference approval and task scenarios against in-memory
//! stores and prints each decision followed by the audit trail.

use crate::OutputOptions;
use clap::Args;
use console::style;
use kernel::{ApprovalAction, Identity, KernelConfig, KernelError, OpsKernel, TransitionRequest};
use serde_json::{json, Value};
use shared::{NewApproval, NewTask, TaskStatus, TaskUpdate};

#[derive(Debug, Args)]
pub struct DemoCommand {
    /// Organization id used for the scenario users
    #[arg(long, default_value = "org1")]
    pub org: String,
}

/// One decision made by the kernel during the demo
#[derive(Debug, Clone)]
pub struct DemoStep {
    pub description: String,
    pub outcome: std::result::Result<String, KernelError>,
}

impl DemoStep {
    fn new<T>(
        description: impl Into<String>,
        result: std::result::Result<T, KernelError>,
        summarize: impl FnOnce(&T) -> String,
    ) -> Self {
        Self {
            description: description.into(),
            outcome: result.as_ref().map(summarize).map_err(Clone::clone),
        }
    }

    fn to_json(&self) -> Value {
        match &self.outcome {
            Ok(summary) => json!({ "step": self.description, "ok": true, "result": summary }),
            Err(err) => json!({
                "step": self.description,
                "ok": false,
                "error": err.kind(),
                "message": err.to_string(),
            }),
        }
    }
}

impl DemoCommand {
    pub fn run(&self, config: KernelConfig, output: OutputOptions) -> anyhow::Result<()> {
        let (kernel, memory) = OpsKernel::in_memory(config);
        let steps = self.play(&kernel)?;
        let trail = memory.activity.entries_for(&self.org)?;

        if output.json {
            let report = json!({
                "steps": steps.iter().map(DemoStep::to_json).collect::<Vec<_>>(),
                "activity": trail,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("{}", style("Decisions").bold());
        for step in &steps {
            match &step.outcome {
                Ok(summary) => println!("  {} {}: {}", style("ok").green(), step.description, summary),
                Err(err) => println!(
                    "  {} {}: {}",
                    style(err.kind()).red(),
                    step.description,
                    style(err).dim()
                ),
            }
        }

        println!();
        println!("{}", style("Activity trail").bold());
        for entry in &trail {
            println!(
                "  {} {:<8} {:<12} {} by {}",
                entry.timestamp.format("%H:%M:%S%.3f"),
                entry.action,
                entry.entity,
                entry.entity_id,
                entry.user_id
            );
        }
        Ok(())
    }

    /// Run every scenario and collect the outcomes
    pub fn play(&self, kernel: &OpsKernel) -> anyhow::Result<Vec<DemoStep>> {
        let org = self.org.as_str();
        let requester = Identity::new("u1", org, "member");
        let member_approver = Identity::new("u2", org, "member");
        let approver = Identity::new("u2", org, "manager");
        let bystander = Identity::new("u3", org, "manager");
        let admin = Identity::new("u5", org, "admin");
        let outsider = Identity::new("x1", format!("{org}-other"), "admin");

        let mut steps = Vec::new();

        let travel = kernel.create_approval(&requester, NewApproval::new("Conference travel", "u2"))?;
        let budget = kernel.create_approval(&requester, NewApproval::new("Team budget", "u2"))?;

        let approve = |caller: &Identity, id: &str, notes: Option<&str>| {
            kernel.transition_approval(TransitionRequest::new(
                id,
                caller.clone(),
                ApprovalAction::approve(notes),
            ))
        };
        let status = |a: &shared::ApprovalRequest| a.status.to_string();

        steps.push(DemoStep::new(
            "designated member approves",
            approve(&member_approver, &travel.id, Some("ok")),
            status,
        ));
        steps.push(DemoStep::new(
            "non-designated manager approves",
            approve(&bystander, &travel.id, None),
            status,
        ));
        steps.push(DemoStep::new(
            "designated manager approves",
            approve(&approver, &travel.id, Some("ok")),
            status,
        ));
        steps.push(DemoStep::new(
            "decided approval approved again",
            approve(&admin, &travel.id, None),
            status,
        ));
        steps.push(DemoStep::new(
            "other tenant's admin reads approval",
            kernel.get_approval(&outsider, &budget.id),
            status,
        ));
        steps.push(DemoStep::new(
            "reject without a reason",
            kernel.transition_approval(TransitionRequest::new(
                &budget.id,
                admin.clone(),
                ApprovalAction::reject(None),
            )),
            status,
        ));
        steps.push(DemoStep::new(
            "admin rejects on another approver's behalf",
            kernel.transition_approval(TransitionRequest::new(
                &budget.id,
                admin.clone(),
                ApprovalAction::reject(Some("over budget")),
            )),
            status,
        ));

        let task = kernel.create_task(&requester, NewTask::new("Quarterly report"))?;
        let start = TaskUpdate {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        let task_status = |t: &shared::Task| t.status.to_string();

        steps.push(DemoStep::new(
            "creator edits own task",
            kernel.update_task(&requester, &task.id, start.clone()),
            task_status,
        ));
        steps.push(DemoStep::new(
            "another member edits the task",
            kernel.update_task(&Identity::new("u4", org, "member"), &task.id, start.clone()),
            task_status,
        ));
        steps.push(DemoStep::new(
            "manager edits the task",
            kernel.update_task(&Identity::new("u4", org, "manager"), &task.id, start),
            task_status,
        ));
        steps.push(DemoStep::new(
            "creator deletes own task",
            kernel.delete_task(&requester, &task.id),
            |t| t.id.clone(),
        ));

        tracing::debug!(steps = steps.len(), "demo finished");
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes() -> Vec<std::result::Result<String, &'static str>> {
        let (kernel, _) = OpsKernel::in_memory(KernelConfig::default());
        let demo = DemoCommand { org: "org1".to_string() };
        demo.play(&kernel)
            .unwrap()
            .into_iter()
            .map(|s| s.outcome.map_err(|e| e.kind()))
            .collect()
    }

    #[test]
    fn test_demo_decisions() {
        let outcomes = outcomes();
        assert_eq!(outcomes[0], Err("forbidden"));
        assert_eq!(outcomes[1], Err("forbidden"));
        assert_eq!(outcomes[2], Ok("approved".to_string()));
        assert_eq!(outcomes[3], Err("invalid_state"));
        assert_eq!(outcomes[4], Err("not_found"));
        assert_eq!(outcomes[5], Err("validation_failed"));
        assert_eq!(outcomes[6], Ok("rejected".to_string()));
        assert_eq!(outcomes[7], Ok("in-progress".to_string()));
        assert_eq!(outcomes[8], Err("forbidden"));
        assert_eq!(outcomes[9], Ok("in-progress".to_string()));
        assert_eq!(outcomes[10], Err("forbidden"));
    }

    #[test]
    fn test_demo_trail() {
        let (kernel, memory) = OpsKernel::in_memory(KernelConfig::default());
        DemoCommand { org: "acme".to_string() }.play(&kernel).unwrap();

        // two approvals, two decisions, one task, two edits
        assert_eq!(memory.activity.entries_for("acme").unwrap().len(), 7);
    }
}
