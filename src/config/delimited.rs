// src/config/delimited.rs

//! Delimited text task files.
//!
//! One task per line: `name,duration[,dependencies]`. The dependency field is
//! itself comma separated, so it has to be quoted when it lists more than one
//! task:
//!
//! ```text
//! # name, duration, dependencies
//! A,2
//! B,3,A
//! D,2,"B,C"
//! ```

use crate::config::model::{InputWarning, LoadedTasks};
use crate::dag::Task;

/// Parse delimited task definitions.
///
/// Blank lines and lines whose first field starts with `#` are skipped
/// silently. Rows with fewer than two fields or a duration that is not a
/// non-negative integer are skipped with a warning. Row numbers are 1-based
/// line numbers.
pub fn parse_delimited(contents: &str) -> LoadedTasks {
    let mut loaded = LoadedTasks::default();

    for (idx, line) in contents.lines().enumerate() {
        let row = idx + 1;
        let fields = split_fields(line);

        let first = match fields.first() {
            Some(f) if !(fields.len() == 1 && f.trim().is_empty()) => f,
            _ => continue,
        };
        if first.trim().starts_with('#') {
            continue;
        }

        if fields.len() < 2 {
            loaded.warnings.push(InputWarning::InvalidRow {
                row,
                content: format!("{fields:?}"),
            });
            continue;
        }

        let name = fields[0].trim();
        let duration = match fields[1].trim().parse::<u64>() {
            Ok(d) => d,
            Err(_) => {
                loaded.warnings.push(InputWarning::InvalidDuration {
                    row,
                    value: fields[1].clone(),
                });
                continue;
            }
        };

        let dependencies: Vec<&str> = fields
            .get(2)
            .map(|deps| {
                deps.split(',')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        loaded.tasks.push(Task::new(name, duration, dependencies));
    }

    loaded
}

/// Split one line on commas, honouring double quotes (`""` inside quotes is a
/// literal quote).
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields
}
