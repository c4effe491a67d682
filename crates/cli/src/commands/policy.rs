//! opsdesk policy command

use crate::OutputOptions;
use clap::{Args, Subcommand};
use console::style;
use rbac::{can_edit_task, RoleRegistry};
use serde_json::{json, Value};
use shared::{Permission, Role};

#[derive(Debug, Args)]
pub struct PolicyCommand {
    #[command(subcommand)]
    pub command: PolicySubcommand,
}

#[derive(Debug, Subcommand)]
pub enum PolicySubcommand {
    /// List all roles, highest rank first
    Roles,
    /// Show a role's permissions, or test a single permission
    Check {
        /// Role to check
        #[arg(short, long)]
        role: String,
        /// Permission token, e.g. task:delete
        #[arg(short, long)]
        permission: Option<String>,
    },
    /// Evaluate the task edit rule
    CanEdit {
        #[arg(short, long)]
        role: String,
        /// User id of the task creator
        #[arg(long)]
        creator: String,
        /// User id of the caller
        #[arg(long)]
        caller: String,
    },
}

impl PolicyCommand {
    pub fn run(&self, output: OutputOptions) -> anyhow::Result<()> {
        let report = match &self.command {
            PolicySubcommand::Roles => roles_report(),
            PolicySubcommand::Check { role, permission } => {
                check_report(role, permission.as_deref())?
            }
            PolicySubcommand::CanEdit {
                role,
                creator,
                caller,
            } => can_edit_report(role, creator, caller),
        };

        if output.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&self.command, &report);
        }
        Ok(())
    }
}

pub fn roles_report() -> Value {
    let roles: Vec<Value> = RoleRegistry::global()
        .definitions()
        .iter()
        .map(|d| {
            json!({
                "role": d.role.as_str(),
                "rank": d.rank,
                "description": d.description,
                "permissionCount": d.permissions().len(),
            })
        })
        .collect();
    json!({ "roles": roles })
}

/// Permission listing for a role, or a single allow/deny verdict
pub fn check_report(role_id: &str, permission: Option<&str>) -> anyhow::Result<Value> {
    let role: Role = role_id.parse()?;
    let definition = RoleRegistry::global().definition(role);

    match permission {
        Some(token) => {
            let permission: Permission = token.parse()?;
            Ok(json!({
                "role": role.as_str(),
                "permission": permission.as_str(),
                "allowed": definition.grants(permission),
            }))
        }
        None => {
            let granted: Vec<&str> = definition.permissions().iter().map(|p| p.as_str()).collect();
            Ok(json!({
                "role": role.as_str(),
                "rank": definition.rank,
                "permissions": granted,
            }))
        }
    }
}

pub fn can_edit_report(role: &str, creator: &str, caller: &str) -> Value {
    json!({
        "role": role,
        "creator": creator,
        "caller": caller,
        "allowed": can_edit_task(role, creator, caller),
    })
}

fn verdict(allowed: bool) -> String {
    if allowed {
        style("allowed").green().to_string()
    } else {
        style("denied").red().to_string()
    }
}

fn print_report(command: &PolicySubcommand, report: &Value) {
    match command {
        PolicySubcommand::Roles => {
            println!("{}", style("Available roles:").bold());
            for role in report["roles"].as_array().into_iter().flatten() {
                println!(
                    "  {:<8} rank {}  {:>2} permissions  {}",
                    role["role"].as_str().unwrap_or_default(),
                    role["rank"],
                    role["permissionCount"],
                    style(role["description"].as_str().unwrap_or_default()).dim(),
                );
            }
        }
        PolicySubcommand::Check { role, permission: Some(_) } => {
            println!(
                "{} -> {}: {}",
                role,
                report["permission"].as_str().unwrap_or_default(),
                verdict(report["allowed"].as_bool().unwrap_or(false)),
            );
        }
        PolicySubcommand::Check { role, permission: None } => {
            println!("{} {} (rank {})", style("Permissions for").bold(), role, report["rank"]);
            for permission in report["permissions"].as_array().into_iter().flatten() {
                println!("  - {}", permission.as_str().unwrap_or_default());
            }
        }
        PolicySubcommand::CanEdit { role, creator, caller } => {
            println!(
                "{} {} editing a task created by {}: {}",
                role,
                caller,
                creator,
                verdict(report["allowed"].as_bool().unwrap_or(false)),
            );
        }
    }
}
