//! The solver's working tree.
//!
//! A `Node` mirrors a `Ty` but remembers where each shape was established.
//! Nodes are never mutated: extending one returns a new node that shares
//! every untouched child through `Rc`, so an older snapshot stays valid
//! after the solver moves on.
//!
//! Extension walks the constraint path one segment at a time. Alongside
//! the constraint path it tracks the *shape path* of the node being
//! visited: offsets crossed through a list are recorded as dynamic,
//! offsets crossed through a tuple keep their value. Lessons are keyed by
//! shape path. The shape path lives in one buffer that each level pushes
//! onto and pops from, and becomes a `Path` only when a rollback records
//! it.

use std::collections::BTreeMap;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use stencil_common::path::{Path, Segment};
use stencil_common::span::Span;

use crate::constraint::{Constraint, Requirement};
use crate::error::TypeError;
use crate::solve::Snapshot;
use crate::ty::{Field, Shape, Ty};

#[derive(Clone, Debug)]
pub(crate) enum Node {
    /// Nothing is known yet.
    Empty,
    /// The path exists. `scope` records that it was also narrowed into by a
    /// block, so it cannot later become an atomic leaf.
    Unknown { scope: bool, origin: Span },
    /// An atomic value.
    Leaf { ty: Ty, origin: Span },
    /// A dynamically sized list. Every element constraint lands in `child`.
    List {
        child: Rc<Node>,
        max_offset: Option<u32>,
        origin: Span,
    },
    /// A speculative fixed-arity tuple, with the snapshot to return to if
    /// a dynamic offset later proves it to be a list.
    Tuple {
        members: BTreeMap<u32, Rc<Node>>,
        bookmark: Rc<Snapshot>,
        origin: Span,
    },
    /// A dict, fields in first-seen order.
    Fields {
        fields: Vec<(String, Rc<Node>)>,
        origin: Span,
    },
}

/// The outcome of extending a node with one constraint.
#[derive(Debug)]
pub(crate) enum Extension {
    Extended(Node),
    /// A tuple assumption was disproven: resume from `snapshot` having
    /// learned that `lesson` is a list.
    Rollback {
        snapshot: Rc<Snapshot>,
        lesson: Path,
    },
}

/// Everything one extension step needs besides the node itself.
pub(crate) struct Step<'a> {
    pub constraint: &'a Constraint,
    /// The state before this constraint, saved by any tuple created now.
    pub snapshot: &'a Rc<Snapshot>,
    pub lessons: &'a FxHashSet<Path>,
}

impl Step<'_> {
    fn mismatch(&self, depth: usize, expected: Shape, established: Span) -> TypeError {
        TypeError::Mismatch {
            path: self.constraint.path.prefix(depth),
            expected,
            found: self.constraint.required.shape(),
            span: self.constraint.origin,
            established,
            trace: self.constraint.trace.spans(),
        }
    }
}

impl Node {
    /// Apply `step`'s constraint from segment `depth` onward. `at` is the
    /// shape path of this node and is left as it was found.
    pub(crate) fn extend(
        &self,
        step: &Step<'_>,
        depth: usize,
        at: &mut Vec<Segment>,
    ) -> Result<Extension, TypeError> {
        match step.constraint.path.segments().get(depth) {
            None => self.settle(step, depth).map(Extension::Extended),
            Some(Segment::Field(name)) => self.extend_field(name, step, depth, at),
            Some(Segment::Offset(offset)) => self.extend_offset(*offset, step, depth, at),
        }
    }

    /// The constraint's path ends at this node.
    fn settle(&self, step: &Step<'_>, depth: usize) -> Result<Node, TypeError> {
        let required = step.constraint.required;
        let origin = step.constraint.origin;

        match (self, required.atomic()) {
            (Node::Empty, None) => Ok(Node::Unknown {
                scope: required == Requirement::Scope,
                origin,
            }),
            (Node::Empty, Some(ty)) => Ok(Node::Leaf { ty, origin }),

            (Node::Unknown { scope: false, .. }, None) if required == Requirement::Scope => {
                Ok(Node::Unknown {
                    scope: true,
                    origin,
                })
            }
            (Node::Unknown { scope: true, origin: prior }, Some(_)) => {
                Err(step.mismatch(depth, Shape::Scope, *prior))
            }
            (Node::Unknown { scope: false, .. }, Some(ty)) => Ok(Node::Leaf { ty, origin }),

            (Node::Leaf { ty, origin: prior }, _) if required == Requirement::Scope => {
                Err(step.mismatch(depth, ty.shape(), *prior))
            }
            (Node::Leaf { ty, origin: prior }, Some(new)) => match ty.intersect(&new) {
                Ok(ty) => Ok(Node::Leaf { ty, origin: *prior }),
                Err(err) => Err(step.mismatch(depth, err.left.shape(), *prior)),
            },

            (
                Node::List { origin: prior, .. }
                | Node::Tuple { origin: prior, .. }
                | Node::Fields { origin: prior, .. },
                Some(_),
            ) => Err(step.mismatch(depth, self.shape(), *prior)),

            (_, None) => Ok(self.clone()),
        }
    }

    fn extend_field(
        &self,
        name: &str,
        step: &Step<'_>,
        depth: usize,
        at: &mut Vec<Segment>,
    ) -> Result<Extension, TypeError> {
        let (mut fields, origin) = match self {
            Node::Empty => (Vec::new(), step.constraint.origin),
            Node::Unknown { origin, .. } => (Vec::new(), *origin),
            Node::Fields { fields, origin } => (fields.clone(), *origin),
            Node::Leaf { origin, .. } | Node::List { origin, .. } | Node::Tuple { origin, .. } => {
                return Err(TypeError::NotADict {
                    path: step.constraint.path.prefix(depth),
                    field: name.to_string(),
                    found: self.derive(),
                    span: step.constraint.origin,
                    established: *origin,
                    trace: step.constraint.trace.spans(),
                })
            }
        };

        let index = match fields.iter().position(|(field, _)| field == name) {
            Some(index) => index,
            None => {
                fields.push((name.to_string(), Rc::new(Node::Empty)));
                fields.len() - 1
            }
        };
        at.push(Segment::field(name));
        let extended = fields[index].1.extend(step, depth + 1, at);
        at.pop();
        match extended? {
            Extension::Extended(child) => fields[index].1 = Rc::new(child),
            rollback @ Extension::Rollback { .. } => return Ok(rollback),
        }
        Ok(Extension::Extended(Node::Fields { fields, origin }))
    }

    fn extend_offset(
        &self,
        offset: Option<u32>,
        step: &Step<'_>,
        depth: usize,
        at: &mut Vec<Segment>,
    ) -> Result<Extension, TypeError> {
        match self {
            Node::Empty | Node::Unknown { .. } => {
                let origin = match self {
                    Node::Unknown { origin, .. } => *origin,
                    _ => step.constraint.origin,
                };
                if offset.is_none() || step.lessons.contains(at.as_slice()) {
                    Node::List {
                        child: Rc::new(Node::Empty),
                        max_offset: None,
                        origin,
                    }
                    .extend_offset(offset, step, depth, at)
                } else {
                    Node::Tuple {
                        members: BTreeMap::new(),
                        bookmark: Rc::clone(step.snapshot),
                        origin,
                    }
                    .extend_offset(offset, step, depth, at)
                }
            }

            Node::List {
                child,
                max_offset,
                origin,
            } => {
                at.push(Segment::dynamic());
                let extended = child.extend(step, depth + 1, at);
                at.pop();
                let child = match extended? {
                    Extension::Extended(child) => Rc::new(child),
                    rollback @ Extension::Rollback { .. } => return Ok(rollback),
                };
                Ok(Extension::Extended(Node::List {
                    child,
                    max_offset: (*max_offset).max(offset),
                    origin: *origin,
                }))
            }

            Node::Tuple {
                members,
                bookmark,
                origin,
            } => {
                let Some(index) = offset else {
                    return Ok(Extension::Rollback {
                        snapshot: Rc::clone(bookmark),
                        lesson: Path::new(at.clone()),
                    });
                };
                let member = members
                    .get(&index)
                    .cloned()
                    .unwrap_or_else(|| Rc::new(Node::Empty));
                at.push(Segment::offset(index));
                let extended = member.extend(step, depth + 1, at);
                at.pop();
                let member = match extended? {
                    Extension::Extended(member) => Rc::new(member),
                    rollback @ Extension::Rollback { .. } => return Ok(rollback),
                };
                let mut members = members.clone();
                members.insert(index, member);
                Ok(Extension::Extended(Node::Tuple {
                    members,
                    bookmark: Rc::clone(bookmark),
                    origin: *origin,
                }))
            }

            Node::Leaf { origin, .. } | Node::Fields { origin, .. } => {
                Err(TypeError::NotIndexable {
                    path: step.constraint.path.prefix(depth),
                    found: self.derive(),
                    span: step.constraint.origin,
                    established: *origin,
                    trace: step.constraint.trace.spans(),
                })
            }
        }
    }

    /// Convert the tree into its provenance-free type.
    pub(crate) fn derive(&self) -> Ty {
        match self {
            Node::Empty | Node::Unknown { .. } => Ty::Unknown,
            Node::Leaf { ty, .. } => ty.clone(),
            Node::List {
                child, max_offset, ..
            } => Ty::list(
                child.derive(),
                max_offset.map_or(0, |max| max as usize + 1),
            ),
            Node::Tuple { members, .. } => {
                let arity = members.keys().next_back().map_or(0, |max| *max as usize + 1);
                let mut tys = vec![Ty::Unknown; arity];
                for (index, member) in members {
                    tys[*index as usize] = member.derive();
                }
                Ty::tuple(tys)
            }
            Node::Fields { fields, .. } => Ty::dict(
                fields
                    .iter()
                    .map(|(name, node)| Field::new(name.clone(), node.derive()))
                    .collect(),
            ),
        }
    }

    fn shape(&self) -> Shape {
        match self {
            Node::Empty | Node::Unknown { .. } => Shape::Unknown,
            Node::Leaf { ty, .. } => ty.shape(),
            Node::List { .. } => Shape::List,
            Node::Tuple { .. } => Shape::Tuple,
            Node::Fields { .. } => Shape::Dict,
        }
    }
}
