use std::io::Read;

use anyhow::Context;
use desk_workflow::{TaskPatch, WorkflowError};

/// Read a JSON body from `path`, or stdin for `-`.
pub fn read_body(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("failed to read body from stdin")?;
        return Ok(body);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read body file {path}"))
}

pub fn parse_patch(body: &str) -> anyhow::Result<TaskPatch> {
    TaskPatch::from_json(body).map_err(|e| anyhow::anyhow!("{}: {e}", e.kind()))
}

/// Prefix the error kind so scripts can branch on it.
pub fn rejected(err: WorkflowError) -> anyhow::Error {
    anyhow::anyhow!("{}: {err}", err.kind())
}
