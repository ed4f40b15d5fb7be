use std::collections::HashMap;
use anyhow::{anyhow, Result};

use crate::model::filter::Filter;
use crate::model::task::Priority;

/// Metadata keys understood by `add`.
pub const TASK_KEYS: [&str; 2] = ["deadline", "priority"];

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub name: String,
    pub metadata: HashMap<String, String>,
}

pub fn parse_args(args: &[String]) -> ParsedInput {
    let mut name_parts = Vec::new();
    let mut metadata = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() {
                metadata.insert(key.to_string(), value.to_string());
                continue;
            }
        }
        name_parts.push(arg.as_str());
    }

    ParsedInput {
        name: name_parts.join(" "),
        metadata,
    }
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}

/// Replaces abbreviated metadata keys with their full names.
pub fn normalize_metadata(
    metadata: HashMap<String, String>,
    candidates: &[&str],
) -> Result<HashMap<String, String>> {
    let mut normalized = HashMap::new();
    for (key, value) in metadata {
        normalized.insert(expand_key(&key, candidates)?, value);
    }
    Ok(normalized)
}

pub fn parse_priority(s: &str) -> Result<Priority> {
    match s.trim().to_lowercase().as_str() {
        "h" | "high" => Ok(Priority::High),
        "m" | "med" | "medium" => Ok(Priority::Medium),
        "l" | "low" => Ok(Priority::Low),
        other => Err(anyhow!("Unknown priority: '{}' (expected high, medium or low)", other)),
    }
}

pub fn parse_filter(s: &str) -> Result<Filter> {
    let key = expand_key(&s.trim().to_lowercase(), &["all", "active", "completed"])?;
    match key.as_str() {
        "all" => Ok(Filter::All),
        "active" => Ok(Filter::Active),
        _ => Ok(Filter::Completed),
    }
}
