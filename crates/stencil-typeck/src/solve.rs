//! The incremental solver.
//!
//! Constraints are applied to the root node one at a time, in order. A
//! concrete offset on a fresh path is first assumed to address a tuple;
//! the tuple remembers the snapshot taken just before it was created. If a
//! dynamic offset later reaches that tuple, extension returns
//! [`Extension::Rollback`]: the solver restores the bookmarked snapshot,
//! records the tuple's shape path as a lesson, and replays from there. With
//! the lesson present the same path becomes a list on replay, so each
//! shape path rolls back at most once and solving terminates.

use std::rc::Rc;

use rustc_hash::FxHashSet;
use stencil_common::path::Path;

use crate::constraint::Constraint;
use crate::error::TypeError;
use crate::node::{Extension, Node, Step};
use crate::ty::Ty;

/// Solver state between two steps: the tree built so far and the index of
/// the next constraint to apply.
#[derive(Debug)]
pub(crate) struct Snapshot {
    pub root: Rc<Node>,
    pub next: usize,
}

/// Hooks into the solving loop. Every method defaults to doing nothing.
pub trait SolveObserver {
    /// Called before constraint `index` is applied.
    fn on_step(&mut self, _index: usize, _constraint: &Constraint) {}

    /// Called when constraint `index` disproved the tuple at `lesson`;
    /// solving resumes at constraint `resume_at`.
    fn on_rollback(&mut self, _lesson: &Path, _index: usize, _resume_at: usize) {}
}

/// An observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl SolveObserver for NoopObserver {}

impl<O: SolveObserver + ?Sized> SolveObserver for &mut O {
    fn on_step(&mut self, index: usize, constraint: &Constraint) {
        (**self).on_step(index, constraint);
    }

    fn on_rollback(&mut self, lesson: &Path, index: usize, resume_at: usize) {
        (**self).on_rollback(lesson, index, resume_at);
    }
}

/// The outcome of a successful solve.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub ty: Ty,
    /// Shape paths proven to be lists, in the order they were learned.
    pub lessons: Vec<Path>,
    /// Constraint applications, replays included.
    pub steps: usize,
}

impl Solution {
    pub fn rollbacks(&self) -> usize {
        self.lessons.len()
    }
}

pub struct Solver<O = NoopObserver> {
    observer: O,
}

impl Solver {
    pub fn new() -> Self {
        Solver {
            observer: NoopObserver,
        }
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: SolveObserver> Solver<O> {
    pub fn with_observer(observer: O) -> Self {
        Solver { observer }
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Fold `constraints` into one type. A fresh lessons table and an empty
    /// root are used on every call.
    pub fn solve(&mut self, constraints: &[Constraint]) -> Result<Solution, TypeError> {
        let mut lessons = FxHashSet::default();
        let mut learned = Vec::new();
        let mut steps = 0;
        let mut current = Rc::new(Snapshot {
            root: Rc::new(Node::Empty),
            next: 0,
        });

        while let Some(constraint) = constraints.get(current.next) {
            steps += 1;
            self.observer.on_step(current.next, constraint);

            let step = Step {
                constraint,
                snapshot: &current,
                lessons: &lessons,
            };
            match current.root.extend(&step, 0, &mut Vec::new())? {
                Extension::Extended(root) => {
                    current = Rc::new(Snapshot {
                        root: Rc::new(root),
                        next: current.next + 1,
                    });
                }
                Extension::Rollback { snapshot, lesson } => {
                    self.observer
                        .on_rollback(&lesson, current.next, snapshot.next);
                    if !lessons.insert(lesson.clone()) {
                        unreachable!("tuple at `{lesson}` rolled back twice");
                    }
                    learned.push(lesson);
                    current = snapshot;
                }
            }
        }

        Ok(Solution {
            ty: current.root.derive(),
            lessons: learned,
            steps,
        })
    }
}

/// Solve with no observer.
pub fn solve(constraints: &[Constraint]) -> Result<Solution, TypeError> {
    Solver::new().solve(constraints)
}
