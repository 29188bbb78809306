use colored::Colorize;
use giam_core::{PlannedAction, ReconcileOutcome, ServiceAccount};
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn outcome_cell(outcome: &ReconcileOutcome) -> String {
    match outcome {
        ReconcileOutcome::Created => "created".green().to_string(),
        ReconcileOutcome::Deleted => "deleted".yellow().to_string(),
        ReconcileOutcome::Unchanged(_) | ReconcileOutcome::AlreadyAbsent => {
            outcome.to_string().dimmed().to_string()
        }
    }
}

/// Summary of an `apply` run.
pub fn print_outcomes(outcomes: &[(String, ReconcileOutcome)], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let rows: Vec<Value> = outcomes
                .iter()
                .map(|(label, outcome)| {
                    serde_json::json!({
                        "label": label,
                        "result": outcome.to_string(),
                        "changed": outcome.changed(),
                    })
                })
                .collect();
            print_json(&Value::Array(rows));
        }
        OutputFormat::Table => {
            if outcomes.is_empty() {
                println!("No service accounts reconciled.");
                return;
            }
            let mut builder = Builder::default();
            builder.push_record(["Label", "Result"]);
            for (label, outcome) in outcomes {
                builder.push_record([label.clone(), outcome_cell(outcome)]);
            }
            println!("{}", builder.build().with(Style::rounded()));

            let changed = outcomes.iter().filter(|(_, o)| o.changed()).count();
            println!("{changed} changed, {} unchanged", outcomes.len() - changed);
        }
    }
}

/// Dry-run plan: one row per entry.
pub fn print_plan(plan: &[(String, PlannedAction)], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let rows: Vec<Value> = plan
                .iter()
                .map(|(label, action)| serde_json::json!({"label": label, "action": action.to_string()}))
                .collect();
            print_json(&Value::Array(rows));
        }
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Label", "Planned action"]);
            for (label, action) in plan {
                let cell = match action {
                    PlannedAction::Create => "create".green().to_string(),
                    PlannedAction::Delete => "delete".yellow().to_string(),
                    PlannedAction::None => "none".dimmed().to_string(),
                };
                builder.push_record([label.clone(), cell]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
}

pub fn print_account(account: &ServiceAccount, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_value(account) {
            Ok(value) => print_json(&value),
            Err(e) => print_error(&format!("Failed to encode account: {e}")),
        },
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            builder.push_record(["name", account.name.as_str()]);
            let optional = [
                ("displayName", &account.display_name),
                ("email", &account.email),
                ("uniqueId", &account.unique_id),
                ("oauth2ClientId", &account.oauth2_client_id),
                ("projectId", &account.project_id),
            ];
            for (field, value) in optional {
                builder.push_record([field, value.as_deref().unwrap_or("-")]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => print_error(&format!("Failed to encode output: {e}")),
    }
}
