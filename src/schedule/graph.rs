//! Walks over the single-predecessor `depends_on` graph.
//!
//! Every task has at most one outgoing edge, so the graph is a set of simple
//! chains, each possibly ending in one loop. None of these functions mutate
//! the tasks; the editor may call them speculatively.

use std::collections::{HashMap, HashSet};

use crate::error::ScheduleError;
use crate::model::Task;

fn by_name(tasks: &[Task]) -> HashMap<&str, &Task> {
    tasks.iter().map(|t| (t.name.as_str(), t)).collect()
}

/// Would making `task` depend on `proposed` close a loop?
///
/// An empty or absent proposal never does; depending on yourself always does.
pub fn would_create_cycle(tasks: &[Task], task: &str, proposed: Option<&str>) -> bool {
    let Some(proposed) = proposed.filter(|p| !p.is_empty()) else {
        return false;
    };
    if proposed == task {
        return true;
    }

    let lookup = by_name(tasks);
    let mut visited = HashSet::new();
    let mut current = Some(proposed);
    while let Some(name) = current {
        if name == task {
            return true;
        }
        if !visited.insert(name) {
            break;
        }
        current = lookup.get(name).and_then(|t| t.dependency());
    }
    false
}

/// Find one dependency loop, in dependency order and closed on itself
/// (`["A", "B", "A"]` means A depends on B depends on A).
pub fn find_dependency_cycle(tasks: &[Task]) -> Option<Vec<String>> {
    let lookup = by_name(tasks);
    let mut visited: HashSet<&str> = HashSet::new();

    for root in tasks {
        let mut path: Vec<&str> = Vec::new();
        let mut current = Some(root.name.as_str());

        while let Some(name) = current {
            if let Some(pos) = path.iter().position(|p| *p == name) {
                let mut cycle: Vec<String> = path[pos..].iter().map(|s| s.to_string()).collect();
                cycle.push(name.to_string());
                return Some(cycle);
            }
            if !visited.insert(name) {
                break;
            }
            path.push(name);
            current = lookup
                .get(name)
                .and_then(|t| t.dependency())
                .filter(|dep| lookup.contains_key(dep));
        }
    }
    None
}

/// The predecessors of `task`, nearest first.
///
/// A repeat is appended as `"<name> (cycle!)"` and ends the walk; this is for
/// display only.
pub fn get_dependency_chain(tasks: &[Task], task: &str) -> Vec<String> {
    let lookup = by_name(tasks);
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = task;

    while let Some(dependency) = lookup.get(current).and_then(|t| t.dependency()) {
        if !visited.insert(dependency) {
            chain.push(format!("{dependency} (cycle!)"));
            break;
        }
        chain.push(dependency.to_string());
        current = dependency;
    }
    chain
}

/// Explain why `unresolved` tasks could not be dated.
///
/// Missing references are reported before loops, and a loop before the
/// generic fallback.
pub fn diagnose(tasks: &[Task], unresolved: &[&str]) -> ScheduleError {
    let lookup = by_name(tasks);

    for name in unresolved {
        if let Some(missing) = lookup
            .get(name)
            .and_then(|t| t.dependency())
            .filter(|dep| !lookup.contains_key(dep))
        {
            return ScheduleError::MissingDependency {
                task: name.to_string(),
                missing: missing.to_string(),
            };
        }
    }

    if let Some(cycle) = find_dependency_cycle(tasks) {
        return ScheduleError::CircularDependency { cycle };
    }

    ScheduleError::Unresolvable {
        tasks: unresolved.iter().map(|s| s.to_string()).collect(),
    }
}
