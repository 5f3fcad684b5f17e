//! Immutable task DAG.
//!
//! Edges run from a task to the tasks that must wait for it. Construction
//! rejects duplicate names, unknown dependencies, shared output patterns and
//! cycles; once built the graph is never mutated.

use std::{
    cmp::Reverse,
    collections::{BTreeSet, BinaryHeap},
};

use globset::GlobBuilder;
use rustc_hash::FxHashMap;
use thiserror::Error;

use super::{Task, TaskName, TaskRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("task `{0}` is registered twice")]
    DuplicateTask(TaskName),

    #[error("task `{task}` depends on unknown task `{dependency}`")]
    UnknownDependency { task: TaskName, dependency: TaskName },

    #[error("ordering constraint names unknown task `{0}`")]
    UnknownTask(TaskName),

    #[error("output `{pattern}` of task `{second}` overlaps an output of task `{first}`")]
    OutputConflict {
        pattern: String,
        first: TaskName,
        second: TaskName,
    },

    /// Full cycle path, first task repeated at the end
    #[error("dependency cycle: {}", join_cycle(.0))]
    Cycle(Vec<TaskName>),
}

/// Whether two output patterns can name the same file.
///
/// Equal patterns overlap, as does a plain path matched by the other glob,
/// and a `dir/**` glob over another glob rooted inside `dir`. Patterns
/// rooted in `**` are checked only against plain paths.
pub(super) fn outputs_overlap(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (is_glob(a), is_glob(b)) {
        (false, false) => false,
        (true, false) => glob_matches(a, b),
        (false, true) => glob_matches(b, a),
        (true, true) => covers(a, b) || covers(b, a),
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

fn glob_matches(pattern: &str, path: &str) -> bool {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .is_ok_and(|glob| glob.compile_matcher().is_match(path))
}

/// `outer` is `dir/**` and `inner` starts with `dir/`.
fn covers(outer: &str, inner: &str) -> bool {
    outer
        .strip_suffix("/**")
        .filter(|dir| !dir.is_empty() && !is_glob(dir))
        .is_some_and(|dir| inner.strip_prefix(dir).is_some_and(|rest| rest.starts_with('/')))
}

fn join_cycle(path: &[TaskName]) -> String {
    path.iter()
        .map(TaskName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Ordered set of task names to execute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtySet(BTreeSet<TaskName>);

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every task in the graph; what a full build runs.
    pub fn full(graph: &TaskGraph) -> Self {
        graph.tasks.iter().map(|t| t.name.clone()).collect()
    }

    pub fn insert(&mut self, name: TaskName) -> bool {
        self.0.insert(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskName> {
        self.0.iter()
    }
}

impl FromIterator<TaskName> for DirtySet {
    fn from_iter<I: IntoIterator<Item = TaskName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<TaskName> for DirtySet {
    fn extend<I: IntoIterator<Item = TaskName>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl From<BTreeSet<TaskName>> for DirtySet {
    fn from(set: BTreeSet<TaskName>) -> Self {
        Self(set)
    }
}

/// Validated dependency graph over registered tasks.
///
/// Nodes are addressed by registration index; adjacency lists are sorted
/// ascending, so every traversal visits in registration order.
#[derive(Debug)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    index: FxHashMap<TaskName, usize>,
    /// Direct predecessors of each node
    deps: Vec<Vec<usize>>,
    /// Direct successors of each node
    dependents: Vec<Vec<usize>>,
}

impl TaskGraph {
    pub fn build(registry: TaskRegistry) -> Result<Self, GraphError> {
        let TaskRegistry { tasks, constraints } = registry;

        let mut index = FxHashMap::default();
        for (i, task) in tasks.iter().enumerate() {
            if index.insert(task.name.clone(), i).is_some() {
                return Err(GraphError::DuplicateTask(task.name.clone()));
            }
        }

        let mut deps = vec![Vec::new(); tasks.len()];
        for (i, task) in tasks.iter().enumerate() {
            for dep in &task.after {
                let &d = index.get(dep).ok_or_else(|| GraphError::UnknownDependency {
                    task: task.name.clone(),
                    dependency: dep.clone(),
                })?;
                deps[i].push(d);
            }
        }
        for (before, after) in &constraints {
            let &a = index
                .get(after)
                .ok_or_else(|| GraphError::UnknownTask(after.clone()))?;
            let &b = index.get(before).ok_or_else(|| GraphError::UnknownDependency {
                task: after.clone(),
                dependency: before.clone(),
            })?;
            deps[a].push(b);
        }

        let mut dependents = vec![Vec::new(); tasks.len()];
        for (i, list) in deps.iter_mut().enumerate() {
            list.sort_unstable();
            list.dedup();
            for &d in list.iter() {
                dependents[d].push(i);
            }
        }
        for list in &mut dependents {
            list.sort_unstable();
        }

        let graph = Self {
            tasks,
            index,
            deps,
            dependents,
        };
        graph.check_outputs()?;
        graph.check_cycles()?;
        Ok(graph)
    }

    /// Output patterns partition the output directory between tasks.
    fn check_outputs(&self) -> Result<(), GraphError> {
        let mut seen: Vec<(&str, usize)> = Vec::new();
        for (i, task) in self.tasks.iter().enumerate() {
            for pattern in &task.outputs {
                let clash = seen
                    .iter()
                    .find(|&&(other, owner)| owner != i && outputs_overlap(other, pattern));
                if let Some(&(_, first)) = clash {
                    return Err(GraphError::OutputConflict {
                        pattern: pattern.clone(),
                        first: self.tasks[first].name.clone(),
                        second: task.name.clone(),
                    });
                }
                seen.push((pattern.as_str(), i));
            }
        }
        Ok(())
    }

    /// Depth-first search with visiting/visited marks. A successor that is
    /// still being visited closes a cycle; the stack holds its full path.
    fn check_cycles(&self) -> Result<(), GraphError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            Visiting,
            Visited,
        }

        fn visit(
            graph: &TaskGraph,
            node: usize,
            marks: &mut [Mark],
            stack: &mut Vec<usize>,
        ) -> Result<(), GraphError> {
            marks[node] = Mark::Visiting;
            stack.push(node);

            for &next in &graph.dependents[node] {
                match marks[next] {
                    Mark::Visited => {}
                    Mark::Visiting => {
                        let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                        let mut path: Vec<_> = stack[start..]
                            .iter()
                            .map(|&n| graph.tasks[n].name.clone())
                            .collect();
                        path.push(graph.tasks[next].name.clone());
                        return Err(GraphError::Cycle(path));
                    }
                    Mark::Unvisited => visit(graph, next, marks, stack)?,
                }
            }

            stack.pop();
            marks[node] = Mark::Visited;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; self.tasks.len()];
        let mut stack = Vec::new();
        for node in 0..self.tasks.len() {
            if marks[node] == Mark::Unvisited {
                visit(self, node, &mut marks, &mut stack)?;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    pub(super) fn task(&self, node: usize) -> &Task {
        &self.tasks[node]
    }

    pub fn dependencies(&self, name: &str) -> Vec<&TaskName> {
        self.neighbours(name, &self.deps)
    }

    pub fn dependents(&self, name: &str) -> Vec<&TaskName> {
        self.neighbours(name, &self.dependents)
    }

    fn neighbours<'a>(&'a self, name: &str, edges: &'a [Vec<usize>]) -> Vec<&'a TaskName> {
        self.index
            .get(name)
            .map(|&i| edges[i].iter().map(|&n| &self.tasks[n].name).collect())
            .unwrap_or_default()
    }

    /// Every task in execution order.
    pub fn topo_order(&self) -> Vec<&Task> {
        let all = vec![true; self.tasks.len()];
        self.kahn(&all).into_iter().map(|i| &self.tasks[i]).collect()
    }

    /// The dirty tasks plus everything downstream of them, in execution order.
    ///
    /// Names not in the graph are ignored.
    pub(super) fn closure(&self, dirty: &DirtySet) -> Vec<usize> {
        let mut member = vec![false; self.tasks.len()];
        let mut queue: Vec<usize> = dirty
            .iter()
            .filter_map(|name| self.index.get(name).copied())
            .collect();

        while let Some(node) = queue.pop() {
            if member[node] {
                continue;
            }
            member[node] = true;
            queue.extend(self.dependents[node].iter().filter(|&&n| !member[n]));
        }

        self.kahn(&member)
    }

    /// Names of the closure of `dirty`, in execution order.
    pub fn plan(&self, dirty: &DirtySet) -> Vec<&TaskName> {
        self.closure(dirty)
            .into_iter()
            .map(|i| &self.tasks[i].name)
            .collect()
    }

    /// Kahn's algorithm over the member subgraph, ready ties broken by
    /// registration index.
    fn kahn(&self, member: &[bool]) -> Vec<usize> {
        let mut in_degree: Vec<usize> = (0..self.tasks.len())
            .map(|i| self.deps[i].iter().filter(|&&d| member[d]).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = (0..self.tasks.len())
            .filter(|&i| member[i] && in_degree[i] == 0)
            .map(Reverse)
            .collect();

        let mut order = Vec::new();
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for &next in &self.dependents[node] {
                if member[next] {
                    in_degree[next] -= 1;
                    if in_degree[next] == 0 {
                        ready.push(Reverse(next));
                    }
                }
            }
        }
        order
    }

    /// Group an execution order into dependency levels. Tasks within one
    /// level have no edges between them.
    pub(super) fn levels(&self, order: &[usize]) -> Vec<Vec<usize>> {
        let mut level: FxHashMap<usize, usize> = FxHashMap::default();
        let mut levels: Vec<Vec<usize>> = Vec::new();

        for &node in order {
            let lvl = self.deps[node]
                .iter()
                .filter_map(|d| level.get(d))
                .map(|l| l + 1)
                .max()
                .unwrap_or(0);
            level.insert(node, lvl);
            if levels.len() <= lvl {
                levels.resize_with(lvl + 1, Vec::new);
            }
            levels[lvl].push(node);
        }
        levels
    }
}
