//! Task dependency graph
//!
//! Tasks are registered once at startup into an explicit directed acyclic
//! graph. Name uniqueness, dependency existence, and acyclicity are all
//! validated at construction time - there is no global mutable registry and
//! no reliance on declaration order.

use std::collections::HashMap;

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::{PipelineError, PipelineResult};
use crate::paths::AssetCategory;

/// Which lint engine a lint task drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintKind {
    Styles,
    Scripts,
}

/// The typed action a task performs when it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Delete a category's generated output
    Clean(AssetCategory),
    /// Full cleanse of the output tree
    CleanAll,
    /// Transform-and-publish a category
    Build(AssetCategory),
    /// Static-analysis gate
    Lint(LintKind),
    /// Stylesheet documentation generation
    Docs,
    /// Pure aggregation of dependencies, no action of its own
    Group,
}

/// A named unit of work with declared dependencies.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub name: String,
    pub deps: Vec<String>,
    pub action: TaskAction,
}

impl TaskSpec {
    pub fn new(name: &str, deps: &[&str], action: TaskAction) -> Self {
        Self {
            name: name.to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
            action,
        }
    }
}

/// Validated task dependency graph.
///
/// Edges point from a dependency to its dependents, so a topological order
/// of the graph is a valid execution order.
pub struct TaskGraph {
    graph: DiGraph<TaskSpec, ()>,
    index: HashMap<String, NodeIndex>,
}

impl TaskGraph {
    /// Build a graph from task specs, validating every invariant.
    pub fn build(specs: Vec<TaskSpec>) -> PipelineResult<Self> {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for spec in specs {
            let name = spec.name.clone();
            if index.contains_key(&name) {
                return Err(PipelineError::DuplicateTask { name });
            }
            let node = graph.add_node(spec);
            index.insert(name, node);
        }

        // Wire dependency edges now that every name is known.
        let nodes: Vec<NodeIndex> = index.values().copied().collect();
        for node in nodes {
            let (task, deps) = {
                let spec = &graph[node];
                (spec.name.clone(), spec.deps.clone())
            };
            for dep in deps {
                let dep_node =
                    *index
                        .get(&dep)
                        .ok_or_else(|| PipelineError::UnknownDependency {
                            task: task.clone(),
                            dependency: dep.clone(),
                        })?;
                graph.add_edge(dep_node, node, ());
                if is_cyclic_directed(&graph) {
                    return Err(PipelineError::DependencyCycle { task: task.clone() });
                }
            }
        }

        Ok(Self { graph, index })
    }

    /// The standard hobbes task registry: per-category clean and build
    /// tasks, the lint gates, docs, and the aggregate targets.
    pub fn standard() -> PipelineResult<Self> {
        let mut specs = Vec::new();

        for category in AssetCategory::ALL {
            specs.push(TaskSpec::new(
                category.clean_task(),
                &[],
                TaskAction::Clean(category),
            ));
            specs.push(TaskSpec::new(
                category.name(),
                &[category.clean_task()],
                TaskAction::Build(category),
            ));
        }

        specs.push(TaskSpec::new("clean:all", &[], TaskAction::CleanAll));
        specs.push(TaskSpec::new(
            "lint:styles",
            &[],
            TaskAction::Lint(LintKind::Styles),
        ));
        specs.push(TaskSpec::new(
            "lint:scripts",
            &[],
            TaskAction::Lint(LintKind::Scripts),
        ));
        specs.push(TaskSpec::new(
            "lint",
            &["lint:styles", "lint:scripts"],
            TaskAction::Group,
        ));
        specs.push(TaskSpec::new("docs", &[], TaskAction::Docs));
        specs.push(TaskSpec::new(
            "build:all",
            &["fonts", "styles", "scripts", "images", "markup"],
            TaskAction::Group,
        ));

        Self::build(specs)
    }

    /// Look up a task by name.
    pub fn get(&self, name: &str) -> Option<&TaskSpec> {
        self.index.get(name).map(|&node| &self.graph[node])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Every task in topological order (for the `tasks` listing).
    pub fn all_tasks(&self) -> PipelineResult<Vec<&TaskSpec>> {
        let sorted = self.toposort()?;
        Ok(sorted.into_iter().map(|n| &self.graph[n]).collect())
    }

    /// Execution order for one target task: its transitive dependencies
    /// followed by the task itself, each exactly once.
    pub fn execution_order(&self, name: &str) -> PipelineResult<Vec<&TaskSpec>> {
        let target = *self
            .index
            .get(name)
            .ok_or_else(|| PipelineError::UnknownTask {
                name: name.to_string(),
            })?;

        // Collect the ancestor closure, then filter a global topo order.
        let mut wanted = std::collections::HashSet::new();
        let mut stack = vec![target];
        while let Some(node) = stack.pop() {
            if !wanted.insert(node) {
                continue;
            }
            stack.extend(self.graph.neighbors_directed(node, Direction::Incoming));
        }

        let sorted = self.toposort()?;
        Ok(sorted
            .into_iter()
            .filter(|n| wanted.contains(n))
            .map(|n| &self.graph[n])
            .collect())
    }

    fn toposort(&self) -> PipelineResult<Vec<NodeIndex>> {
        toposort(&self.graph, None).map_err(|cycle| PipelineError::DependencyCycle {
            task: self.graph[cycle.node_id()].name.clone(),
        })
    }
}

impl std::fmt::Debug for TaskGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGraph")
            .field("tasks", &self.graph.node_count())
            .field("dependencies", &self.graph.edge_count())
            .finish()
    }
}
