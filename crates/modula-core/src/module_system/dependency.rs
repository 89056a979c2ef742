use std::collections::{BTreeMap, BTreeSet, VecDeque};

use thiserror::Error;

use crate::module_system::record::{Module, ModuleRecord};

/// Module name -> declared dependency names
pub type DependencyGraph = BTreeMap<String, Vec<String>>;

/// Error that can occur when ordering modules by their dependencies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    /// Dependency cycle detected; carries every module left unordered
    #[error("Circular dependency detected among: {}", .0.join(", "))]
    CyclicDependency(Vec<String>),
}

/// Dependency checks over a module set.
///
/// Only direct dependencies gate enabling. Two disabled modules that require
/// each other can never be enabled one at a time; [`find_cycles`] reports
/// such groups.
///
/// [`find_cycles`]: DependencyResolver::find_cycles
pub struct DependencyResolver;

impl DependencyResolver {
    /// Declared dependencies of `name` that are absent or disabled, in
    /// declaration order. Unknown `name` gives an empty list.
    pub fn missing_dependencies(modules: &[ModuleRecord], name: &str) -> Vec<String> {
        let Some(module) = modules.iter().find(|m| m.name() == name) else {
            return Vec::new();
        };
        module
            .dependencies()
            .iter()
            .filter(|dependency| {
                !modules
                    .iter()
                    .any(|candidate| candidate.name() == dependency.as_str() && candidate.is_enabled())
            })
            .cloned()
            .collect()
    }

    pub fn can_enable(modules: &[ModuleRecord], name: &str) -> bool {
        Self::missing_dependencies(modules, name).is_empty()
    }

    pub fn dependency_graph(modules: &[ModuleRecord]) -> DependencyGraph {
        modules
            .iter()
            .map(|m| (m.name().to_string(), m.dependencies().to_vec()))
            .collect()
    }

    /// Modules that declare `name` as a dependency, in module order
    pub fn dependents(modules: &[ModuleRecord], name: &str) -> Vec<String> {
        modules
            .iter()
            .filter(|m| m.dependencies().iter().any(|d| d == name))
            .map(|m| m.name().to_string())
            .collect()
    }

    /// Dependencies-first ordering of the graph (Kahn's algorithm).
    ///
    /// Edges to names outside the graph are ignored. Ties resolve in name
    /// order.
    pub fn load_order(graph: &DependencyGraph) -> Result<Vec<String>, DependencyError> {
        // Remaining in-graph dependencies per module
        let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
        // Dependency -> modules waiting on it
        let mut waiting: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for (name, dependencies) in graph {
            let unique: BTreeSet<&str> = dependencies
                .iter()
                .map(String::as_str)
                .filter(|d| graph.contains_key(*d))
                .collect();
            pending.insert(name.as_str(), unique.len());
            for dependency in unique {
                waiting.entry(dependency).or_default().push(name.as_str());
            }
        }

        let mut queue: VecDeque<&str> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut ordered = Vec::with_capacity(graph.len());

        while let Some(name) = queue.pop_front() {
            ordered.push(name.to_string());
            for dependent in waiting.get(name).into_iter().flatten() {
                if let Some(count) = pending.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }

        if ordered.len() == graph.len() {
            Ok(ordered)
        } else {
            let leftover = graph
                .keys()
                .filter(|name| !ordered.contains(*name))
                .cloned()
                .collect();
            Err(DependencyError::CyclicDependency(leftover))
        }
    }

    /// Modules caught in, or blocked behind, a dependency cycle
    pub fn find_cycles(graph: &DependencyGraph) -> Vec<String> {
        match Self::load_order(graph) {
            Ok(_) => Vec::new(),
            Err(DependencyError::CyclicDependency(nodes)) => nodes,
        }
    }
}
