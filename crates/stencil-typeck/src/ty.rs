//! The schema lattice.
//!
//! `Ty` describes the shape of data a template needs. `Unknown` is the top
//! element; [`Ty::intersect`] is the only way two types are combined, and
//! `Unknown` is its identity. Dict field sets and List/Tuple arities only
//! ever grow under intersection.

use std::fmt;

use serde::Serialize;
use stencil_common::path::{Path, Segment};

/// An inferred schema type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ty {
    /// Compatible with anything.
    Unknown,
    Str,
    Num,
    Bool,
    /// An object. Field names are unique and keep first-seen order.
    Dict { fields: Vec<Field> },
    /// A dynamically sized list with at least `min_length` elements.
    List { element: Box<Ty>, min_length: usize },
    /// A fixed-arity tuple.
    Tuple { members: Vec<Ty> },
}

/// A named member of a [`Ty::Dict`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub ty: Ty,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Field {
            name: name.into(),
            ty,
        }
    }
}

/// Two types with no common refinement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Incompatible {
    pub left: Ty,
    pub right: Ty,
}

impl fmt::Display for Incompatible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type mismatch: `{}` is not compatible with `{}`", self.left, self.right)
    }
}

impl std::error::Error for Incompatible {}

impl Ty {
    pub fn dict(fields: Vec<Field>) -> Ty {
        Ty::Dict { fields }
    }

    pub fn list(element: Ty, min_length: usize) -> Ty {
        Ty::List {
            element: Box::new(element),
            min_length,
        }
    }

    pub fn tuple(members: Vec<Ty>) -> Ty {
        Ty::Tuple { members }
    }

    /// The coarse shape of this type, for messages.
    pub fn shape(&self) -> Shape {
        match self {
            Ty::Unknown => Shape::Unknown,
            Ty::Str => Shape::Str,
            Ty::Num => Shape::Num,
            Ty::Bool => Shape::Bool,
            Ty::Dict { .. } => Shape::Dict,
            Ty::List { .. } => Shape::List,
            Ty::Tuple { .. } => Shape::Tuple,
        }
    }

    /// The greatest type compatible with both `self` and `other`.
    pub fn intersect(&self, other: &Ty) -> Result<Ty, Incompatible> {
        let incompatible = || Incompatible {
            left: self.clone(),
            right: other.clone(),
        };

        match (self, other) {
            (Ty::Unknown, t) | (t, Ty::Unknown) => Ok(t.clone()),
            (Ty::Str, Ty::Str) => Ok(Ty::Str),
            (Ty::Num, Ty::Num) => Ok(Ty::Num),
            (Ty::Bool, Ty::Bool) => Ok(Ty::Bool),

            (Ty::Dict { fields: left }, Ty::Dict { fields: right }) => {
                let mut fields = Vec::with_capacity(left.len() + right.len());
                for field in left {
                    let ty = match right.iter().find(|f| f.name == field.name) {
                        Some(other) => field.ty.intersect(&other.ty)?,
                        None => field.ty.clone(),
                    };
                    fields.push(Field::new(field.name.clone(), ty));
                }
                for field in right {
                    if !left.iter().any(|f| f.name == field.name) {
                        fields.push(field.clone());
                    }
                }
                Ok(Ty::Dict { fields })
            }

            (
                Ty::List {
                    element: left,
                    min_length: left_min,
                },
                Ty::List {
                    element: right,
                    min_length: right_min,
                },
            ) => Ok(Ty::list(left.intersect(right)?, *left_min.max(right_min))),

            (Ty::List { element, min_length }, Ty::Tuple { members })
            | (Ty::Tuple { members }, Ty::List { element, min_length }) => {
                let element = members
                    .iter()
                    .try_fold((**element).clone(), |acc, member| acc.intersect(member))?;
                Ok(Ty::list(element, (*min_length).max(members.len())))
            }

            (Ty::Tuple { members: left }, Ty::Tuple { members: right }) => {
                let arity = left.len().max(right.len());
                let members = (0..arity)
                    .map(|i| match (left.get(i), right.get(i)) {
                        (Some(l), Some(r)) => l.intersect(r),
                        (Some(t), None) | (None, Some(t)) => Ok(t.clone()),
                        (None, None) => unreachable!("index below the larger arity"),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Ty::Tuple { members })
            }

            _ => Err(incompatible()),
        }
    }

    /// What the schema says lives at `path`, if anything.
    ///
    /// `Unknown` answers for everything beneath it; a missing Dict field or
    /// an out-of-range tuple position answers `None`.
    pub fn at(&self, path: &Path) -> Option<&Ty> {
        let mut current = self;
        for segment in path.segments() {
            current = match (current, segment) {
                (Ty::Unknown, _) => return Some(current),
                (Ty::Dict { fields }, Segment::Field(name)) => {
                    &fields.iter().find(|f| &f.name == name)?.ty
                }
                (Ty::List { element, .. }, Segment::Offset(_)) => &**element,
                (Ty::Tuple { members }, Segment::Offset(Some(i))) => members.get(*i as usize)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Unknown => write!(f, "Unknown"),
            Ty::Str => write!(f, "Str"),
            Ty::Num => write!(f, "Num"),
            Ty::Bool => write!(f, "Bool"),
            Ty::Dict { fields } => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                write!(f, "}}")
            }
            Ty::List {
                element,
                min_length: 0,
            } => write!(f, "List<{element}>"),
            Ty::List {
                element,
                min_length,
            } => write!(f, "List<{element}, {min_length}..>"),
            Ty::Tuple { members } => {
                write!(f, "(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{member}")?;
                }
                if members.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// The coarse shape of a value, used when explaining mismatches and when
/// recording what a path has been proven to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Unknown,
    Str,
    Num,
    Bool,
    Dict,
    List,
    Tuple,
    /// Anything a `with` block can narrow into: not an atomic value.
    Scope,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Shape::Unknown => "Unknown",
            Shape::Str => "Str",
            Shape::Num => "Num",
            Shape::Bool => "Bool",
            Shape::Dict => "a dict",
            Shape::List => "a list",
            Shape::Tuple => "a tuple",
            Shape::Scope => "a block scope",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(fields: &[(&str, Ty)]) -> Ty {
        Ty::dict(
            fields
                .iter()
                .map(|(name, ty)| Field::new(*name, ty.clone()))
                .collect(),
        )
    }

    fn samples() -> Vec<Ty> {
        vec![
            Ty::Unknown,
            Ty::Str,
            Ty::Num,
            Ty::Bool,
            dict(&[("a", Ty::Str)]),
            Ty::list(Ty::Num, 2),
            Ty::tuple(vec![Ty::Str, Ty::Unknown]),
        ]
    }

    #[test]
    fn unknown_is_identity() {
        for t in samples() {
            assert_eq!(Ty::Unknown.intersect(&t), Ok(t.clone()));
            assert_eq!(t.intersect(&Ty::Unknown), Ok(t.clone()));
        }
    }

    #[test]
    fn intersect_is_idempotent() {
        for t in samples() {
            assert_eq!(t.intersect(&t), Ok(t.clone()), "{t} ∩ {t}");
        }
    }

    #[test]
    fn different_atomics_are_incompatible() {
        let err = Ty::Str.intersect(&Ty::Num).unwrap_err();
        assert_eq!(err.left, Ty::Str);
        assert_eq!(err.right, Ty::Num);
        assert_eq!(
            err.to_string(),
            "type mismatch: `Str` is not compatible with `Num`"
        );
        assert!(Ty::Bool.intersect(&dict(&[])).is_err());
        assert!(dict(&[]).intersect(&Ty::list(Ty::Str, 0)).is_err());
    }

    #[test]
    fn dict_union_keeps_first_seen_order() {
        let left = dict(&[("b", Ty::Unknown), ("a", Ty::Str)]);
        let right = dict(&[("c", Ty::Num), ("b", dict(&[("x", Ty::Str)]))]);
        let merged = left.intersect(&right).unwrap();
        assert_eq!(merged.to_string(), "{b: {x: Str}, a: Str, c: Num}");
        // Applying it again with the same operand changes nothing.
        assert_eq!(merged.intersect(&right), Ok(merged.clone()));
    }

    #[test]
    fn dict_field_conflict_fails() {
        let left = dict(&[("a", Ty::Str)]);
        let right = dict(&[("a", Ty::Bool)]);
        let err = left.intersect(&right).unwrap_err();
        assert_eq!((err.left, err.right), (Ty::Str, Ty::Bool));
    }

    #[test]
    fn list_with_list() {
        let merged = Ty::list(Ty::Unknown, 1)
            .intersect(&Ty::list(Ty::Str, 3))
            .unwrap();
        assert_eq!(merged, Ty::list(Ty::Str, 3));
    }

    #[test]
    fn list_absorbs_tuple_in_either_order() {
        let list = Ty::list(Ty::Unknown, 1);
        let tuple = Ty::tuple(vec![Ty::Str, Ty::Unknown, Ty::Str]);
        assert_eq!(list.intersect(&tuple), Ok(Ty::list(Ty::Str, 3)));
        assert_eq!(tuple.intersect(&list), Ok(Ty::list(Ty::Str, 3)));

        let mixed = Ty::tuple(vec![Ty::Str, Ty::Num]);
        assert!(list.intersect(&mixed).is_err());
    }

    #[test]
    fn tuple_with_tuple_grows_arity() {
        let short = Ty::tuple(vec![Ty::Str]);
        let long = Ty::tuple(vec![Ty::Unknown, Ty::Num, Ty::Bool]);
        assert_eq!(
            short.intersect(&long).unwrap().to_string(),
            "(Str, Num, Bool)"
        );
    }

    #[test]
    fn display_forms() {
        assert_eq!(dict(&[]).to_string(), "{}");
        assert_eq!(Ty::list(Ty::Str, 0).to_string(), "List<Str>");
        assert_eq!(Ty::list(Ty::Str, 2).to_string(), "List<Str, 2..>");
        assert_eq!(Ty::tuple(vec![Ty::Num]).to_string(), "(Num,)");
    }

    #[test]
    fn lookup_by_path() {
        let ty = dict(&[
            ("items", Ty::list(dict(&[("name", Ty::Str)]), 0)),
            ("pair", Ty::tuple(vec![Ty::Str, Ty::Num])),
            ("any", Ty::Unknown),
        ]);
        let path = |segments: Vec<Segment>| Path::new(segments);

        assert_eq!(ty.at(&Path::root()), Some(&ty));
        assert_eq!(
            ty.at(&path(vec![
                Segment::field("items"),
                Segment::dynamic(),
                Segment::field("name")
            ])),
            Some(&Ty::Str)
        );
        assert_eq!(
            ty.at(&path(vec![Segment::field("items"), Segment::offset(7)])),
            Some(&dict(&[("name", Ty::Str)]))
        );
        assert_eq!(
            ty.at(&path(vec![Segment::field("pair"), Segment::offset(1)])),
            Some(&Ty::Num)
        );
        assert_eq!(ty.at(&path(vec![Segment::field("pair"), Segment::offset(2)])), None);
        assert_eq!(
            ty.at(&path(vec![Segment::field("any"), Segment::field("deep")])),
            Some(&Ty::Unknown)
        );
        assert_eq!(ty.at(&path(vec![Segment::field("missing")])), None);
    }
}
