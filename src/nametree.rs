//! Finagle/linkerd-style name trees.
//!
//! A [`NameTree`] is an algebraic expression over leaves and a handful of
//! combinators (`Alt`, `Union`, `Weighted`) plus three distinguished
//! terminals (`Fail`, `Neg`, `Empty`). [`Dtab::lookup`](crate::Dtab::lookup)
//! produces one from a path; this module only knows how to build, render,
//! compare, and `map` them.
//!
//! # Examples
//!
//! Name trees can be built programmatically with `|`/`&` operators, which
//! flatten into a single n-ary `Alt`/`Union` the way repeated operators in
//! the grammar do:
//!
//! ```
//! use dtab::{NameTree, Path};
//!
//! let tree = NameTree::Leaf(Path::from_labels(vec!["humphrys"]))
//!     | NameTree::Leaf(Path::from_labels(vec!["smitten"]));
//! assert_eq!(
//!     "NameTree.Alt(NameTree.Leaf(Path(/humphrys)),NameTree.Leaf(Path(/smitten)))",
//!     tree.show(),
//! );
//! ```
//!
//! Weighted unions use the `&` operator on `Weighted` values built with
//! `NameTree::weighted`:
//!
//! ```
//! use dtab::{NameTree, Path};
//!
//! let tree = NameTree::Leaf(Path::from_labels(vec!["smitten"])).weighted(1.0)
//!     & NameTree::Leaf(Path::from_labels(vec!["humphrys"])).weighted(1.0);
//! assert_eq!(
//!     "NameTree.Union(NameTree.Weighted(1.0,NameTree.Leaf(Path(/smitten))),\
//!      NameTree.Weighted(1.0,NameTree.Leaf(Path(/humphrys))))",
//!     tree.show(),
//! );
//! ```

use std::fmt;
use std::ops;

/// A trait implemented by every type that can live at a `NameTree` leaf,
/// giving it the two distinct `show` renderings spec'd for leaves: `Path`
/// values render as `Path(<path.show>)`; everything else renders as its own
/// `Display`/debug form. Implemented per concrete leaf type rather than via
/// a blanket `Display` impl, since `Path` needs its own canonical form
/// rather than `Display`'s quoting.
pub trait LeafShow {
    fn leaf_show(&self) -> String;
}

impl LeafShow for String {
    fn leaf_show(&self) -> String {
        self.clone()
    }
}

impl<'a> LeafShow for &'a str {
    fn leaf_show(&self) -> String {
        (*self).to_string()
    }
}

/// Name trees represent a composite name whose interpretation is subject to
/// dtab evaluation rules.
///
/// `Alt`/`Union` hold any number of children (`n >= 1`); `Union`'s children
/// are always `Weighted`. `Fail`, `Neg`, and `Empty` are singleton
/// terminals, compared by variant rather than by identity (Rust's enums
/// make the "process-wide unique singleton" the source relies on automatic).
#[derive(Clone, Debug)]
pub enum NameTree<T> {
    Leaf(T),
    Alt(Vec<NameTree<T>>),
    Union(Vec<Weighted<T>>),
    Weighted(Weighted<T>),
    Fail,
    Neg,
    Empty,
}

use self::NameTree::*;

impl<T> NameTree<T> {
    /// Wraps `self` in a `Weighted` with the given weight. `self` must not
    /// already be a `Weighted` tree -- `Weighted`'s inner tree is never
    /// itself `Weighted`.
    #[inline]
    pub fn weighted(self, weight: f64) -> Weighted<T> {
        Weighted {
            weight,
            tree: Box::new(self),
        }
    }

    /// The tree functor: `Leaf(v) -> Leaf(f(v))`, recursing through `Alt`
    /// and `Union`/`Weighted`, leaving the terminals untouched.
    ///
    /// The original Python implementation's `Alt` case applies `f` directly
    /// to each child tree rather than recursing with `map(f)` -- see
    /// `NameTree.map_tree` in `dtab/tree.py`. That only type-checks in a
    /// dynamically-typed host; in Rust `f: Fn(T) -> U` cannot also be a
    /// `Fn(NameTree<T>) -> NameTree<U>`, so this recurses properly instead.
    /// The two behave identically whenever `Alt`'s children are `Leaf`s --
    /// the only shape `Dtab::lookup` ever produces.
    pub fn map<U>(self, f: &impl Fn(T) -> U) -> NameTree<U> {
        match self {
            Leaf(v) => Leaf(f(v)),
            Alt(trees) => Alt(trees.into_iter().map(|t| t.map(f)).collect()),
            Union(weighted) => Union(weighted.into_iter().map(|w| w.map(f)).collect()),
            Weighted(w) => NameTree::Weighted(w.map(f)),
            Fail => Fail,
            Neg => Neg,
            Empty => Empty,
        }
    }
}

impl NameTree<crate::path::Path> {
    /// Parses a name tree using the full grammar (`tree`, spec.md's top
    /// production): `|`-alternation of `&`-unions of weighted simples.
    pub fn read(s: &str) -> crate::error::Result<Self> {
        crate::parser::Parser::parse_all_name_tree(s)
    }
}

impl<T: LeafShow> NameTree<T> {
    /// The recursive textual rendering used for both equality and
    /// diagnostics.
    pub fn show(&self) -> String {
        match self {
            Leaf(v) => format!("NameTree.Leaf({})", v.leaf_show()),
            Alt(trees) => format!(
                "NameTree.Alt({})",
                trees.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
            ),
            Union(weighted) => format!(
                "NameTree.Union({})",
                weighted.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
            ),
            NameTree::Weighted(w) => w.to_string(),
            Fail => "NameTree.Fail".to_string(),
            Neg => "NameTree.Neg".to_string(),
            Empty => "NameTree.Empty".to_string(),
        }
    }
}

impl<T: LeafShow> fmt::Display for NameTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.show())
    }
}

impl<T: LeafShow> PartialEq for NameTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.show() == other.show()
    }
}

impl<T: LeafShow> Eq for NameTree<T> {}

impl<'a> From<&'a str> for NameTree<String> {
    /// `"~"`, `"!"`, and `"$"` become the negation, failure, and empty
    /// nodes; every other string becomes a `Leaf`.
    fn from(s: &'a str) -> Self {
        match s {
            "~" => Neg,
            "!" => Fail,
            "$" => Empty,
            other => Leaf(other.to_string()),
        }
    }
}

/// A non-negative weight paired with a subtree, used both as `NameTree`'s
/// own `Weighted` variant and as the element type of `Union`.
#[derive(Clone, Debug)]
pub struct Weighted<T> {
    pub weight: f64,
    pub tree: Box<NameTree<T>>,
}

impl<T> Weighted<T> {
    fn map<U>(self, f: &impl Fn(T) -> U) -> Weighted<U> {
        Weighted {
            weight: self.weight,
            tree: Box::new(self.tree.map(f)),
        }
    }
}

impl<T: LeafShow> fmt::Display for Weighted<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NameTree.Weighted({},{})", format_weight(self.weight), self.tree.show())
    }
}

/// Formats a weight as a decimal with a trailing `.0` when integer-valued
/// (`1.0` -> `"1.0"`, `0.5` -> `"0.5"`).
pub(crate) fn format_weight(w: f64) -> String {
    if w.fract() == 0.0 && w.is_finite() {
        format!("{:.1}", w)
    } else {
        let mut s = format!("{}", w);
        if !s.contains('.') {
            s.push_str(".0");
        }
        s
    }
}

/// The default weight used by a `weighted` grammar production with no
/// explicit `number *` prefix.
pub const DEFAULT_WEIGHT: f64 = 1.0;

impl<T, R> ops::BitOr<R> for NameTree<T>
where
    R: Into<NameTree<T>>,
{
    type Output = Self;
    /// Alternation. Flattens into a single `Alt` the way repeated `|` in
    /// the grammar does, rather than nesting binary `Alt`s.
    fn bitor(self, rhs: R) -> Self {
        let rhs = rhs.into();
        let mut trees = match self {
            Alt(trees) => trees,
            other => vec![other],
        };
        match rhs {
            Alt(more) => trees.extend(more),
            other => trees.push(other),
        }
        Alt(trees)
    }
}

impl<T> ops::BitAnd for Weighted<T> {
    type Output = NameTree<T>;
    /// Weighted union. Flattens into a single `Union` the way repeated `&`
    /// in the grammar does.
    fn bitand(self, rhs: Self) -> NameTree<T> {
        Union(vec![self, rhs])
    }
}

impl<T> ops::BitAnd<Weighted<T>> for NameTree<T> {
    type Output = NameTree<T>;
    fn bitand(self, rhs: Weighted<T>) -> NameTree<T> {
        match self {
            Union(mut weighted) => {
                weighted.push(rhs);
                Union(weighted)
            }
            other => Union(vec![other.weighted(DEFAULT_WEIGHT), rhs]),
        }
    }
}

/// A newtype used to give `f64` the overridable `*` operator for
/// constructing weighted subtrees, e.g. `W(0.7) * "/smitten"`.
pub struct W(pub f64);

impl<R> ops::Mul<R> for W
where
    R: Into<NameTree<String>>,
{
    type Output = Weighted<String>;
    fn mul(self, rhs: R) -> Self::Output {
        rhs.into().weighted(self.0)
    }
}

#[cfg(feature = "serialize")]
mod serialize {
    use super::{LeafShow, NameTree};
    use serde::ser::Serializer;

    pub fn serialize<S, T>(name_tree: &NameTree<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: LeafShow,
    {
        serializer.serialize_str(&name_tree.show())
    }
}

#[cfg(feature = "serialize")]
pub use self::serialize::serialize;
