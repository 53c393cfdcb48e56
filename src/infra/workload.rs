//! Workload file loader.
//!
//! The format is line oriented:
//!
//! ```text
//! 4 4            <- first line of a block: total R1 and R2
//! T1 0 3 1 2 0   <- id arrival exec r1 r2 priority [repeat]
//! T2 1 2 2 1 5 2
//! $              <- closes the block
//! ```
//!
//! Blank lines are ignored. A malformed line is reported and skipped; only
//! an unreadable file is fatal.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::{Resources, SubsystemId, Task};

/// Line that closes a subsystem block.
pub const BLOCK_TERMINATOR: &str = "$";

/// A non-fatal problem found while parsing. The offending line is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIssue {
    /// Task line without an id and five numeric fields, or with non-numeric fields.
    #[error("line {line}: malformed task `{text}`")]
    MalformedTask {
        /// 1-based line number.
        line: usize,
        /// Trimmed line contents.
        text: String,
    },
    /// First line of a block is not two non-negative integers.
    #[error("line {line}: malformed resource line `{text}`")]
    MalformedResources {
        /// 1-based line number.
        line: usize,
        /// Trimmed line contents.
        text: String,
    },
    /// Task line with no open subsystem to receive it.
    #[error("line {line}: no subsystem available for task `{text}`")]
    OrphanTask {
        /// 1-based line number.
        line: usize,
        /// Trimmed line contents.
        text: String,
    },
}

/// Fatal loader failure.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The workload file could not be read.
    #[error("failed to read workload {}: {source}", .path.display())]
    Io {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// One subsystem's worth of workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemBlock {
    /// Sequential id, starting at 1.
    pub id: SubsystemId,
    /// Total R1/R2 capacity.
    pub capacity: Resources,
    /// Tasks in file order, all in the `Waiting` state.
    pub tasks: Vec<Task>,
}

/// Parsed workload plus everything that was skipped along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workload {
    /// Instantiated blocks in file order.
    pub blocks: Vec<SubsystemBlock>,
    /// Reported problems in line order.
    pub issues: Vec<ParseIssue>,
}

impl Workload {
    /// Total number of tasks across all blocks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.blocks.iter().map(|b| b.tasks.len()).sum()
    }
}

/// Read and parse a workload file.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read. Parse problems are
/// not errors; they are collected in [`Workload::issues`].
pub fn load_workload(path: impl AsRef<Path>) -> Result<Workload, LoadError> {
    let path = path.as_ref();
    let input = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let workload = parse_workload(&input);
    tracing::info!(
        "loaded {} subsystem(s) with {} task(s) from {}",
        workload.blocks.len(),
        workload.task_count(),
        path.display()
    );
    Ok(workload)
}

/// Parse workload text.
#[must_use]
pub fn parse_workload(input: &str) -> Workload {
    let mut workload = Workload::default();
    let mut current: Option<SubsystemBlock> = None;
    let mut in_block = false;
    let mut next_id: SubsystemId = 1;

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }

        if text == BLOCK_TERMINATOR {
            workload.blocks.extend(current.take());
            in_block = false;
            continue;
        }

        if !in_block {
            in_block = true;
            match parse_resources(text) {
                Some(capacity) => {
                    current = Some(SubsystemBlock {
                        id: next_id,
                        capacity,
                        tasks: Vec::new(),
                    });
                    next_id += 1;
                }
                None => report(
                    &mut workload,
                    ParseIssue::MalformedResources {
                        line,
                        text: text.to_string(),
                    },
                ),
            }
            continue;
        }

        let Some(block) = current.as_mut() else {
            report(
                &mut workload,
                ParseIssue::OrphanTask {
                    line,
                    text: text.to_string(),
                },
            );
            continue;
        };
        match parse_task(text) {
            Some(task) => block.tasks.push(task),
            None => report(
                &mut workload,
                ParseIssue::MalformedTask {
                    line,
                    text: text.to_string(),
                },
            ),
        }
    }

    // trailing block without a terminator
    workload.blocks.extend(current);
    workload
}

fn report(workload: &mut Workload, issue: ParseIssue) {
    tracing::warn!("{issue}");
    workload.issues.push(issue);
}

fn parse_resources(text: &str) -> Option<Resources> {
    let mut fields = text.split_whitespace();
    let r1 = fields.next()?.parse().ok()?;
    let r2 = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(Resources::new(r1, r2))
}

fn parse_task(text: &str) -> Option<Task> {
    let mut fields = text.split_whitespace();
    let id = fields.next()?;
    let numbers = fields
        .map(str::parse::<u32>)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    let (required, repeat) = match numbers.as_slice() {
        [a, e, r1, r2, p, rest @ ..] if rest.len() <= 1 => ([*a, *e, *r1, *r2, *p], rest.first()),
        _ => return None,
    };
    let [arrival, exec, r1, r2, priority] = required;
    let mut task = Task::new(id, arrival, exec, Resources::new(r1, r2)).with_priority(priority);
    if let Some(repeat) = repeat {
        task = task.with_repeat(*repeat);
    }
    Some(task)
}
