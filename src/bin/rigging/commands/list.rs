//! `rigging list` command

use anyhow::Result;
use serde::Serialize;

use super::Session;
use crate::cli::{GlobalArgs, ListArgs};
use rigging::core::Operations;

#[derive(Debug, Serialize)]
struct PropertyInfo {
    name: String,
    kind: String,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    description: String,
}

#[derive(Debug, Serialize)]
struct OperationInfo {
    id: String,
    description: String,
    properties: Vec<PropertyInfo>,
}

fn describe(ops: &Operations) -> Vec<OperationInfo> {
    ops.iter()
        .map(|op| OperationInfo {
            id: op.id().to_string(),
            description: op.description().to_string(),
            properties: op
                .properties()
                .iter()
                .map(|p| PropertyInfo {
                    name: p.name().to_string(),
                    kind: p.kind().to_string(),
                    required: p.is_required(),
                    default: p.value().map(|v| v.to_string()),
                    description: p.description().to_string(),
                })
                .collect(),
        })
        .collect()
}

pub fn execute(global: &GlobalArgs, args: ListArgs) -> Result<()> {
    let session = Session::open(global)?;
    let ops = describe(&session.api().operations());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ops)?);
        return Ok(());
    }

    if ops.is_empty() {
        eprintln!("No operations available");
        return Ok(());
    }

    let width = ops.iter().map(|op| op.id.len()).max().unwrap_or(0);
    for op in &ops {
        println!("{:width$}  {}", op.id, op.description, width = width);
        if global.verbose {
            for prop in &op.properties {
                let mut line = format!("    {} ({})", prop.name, prop.kind);
                if prop.required {
                    line.push_str(" required");
                }
                if let Some(default) = &prop.default {
                    line.push_str(&format!(" [default: {}]", default));
                }
                println!("{}", line);
            }
        }
    }

    Ok(())
}
