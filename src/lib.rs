//! A library for parsing and evaluating Finagle/linkerd-style [dtab]s
//! (delegation tables): ordered lists of rewrite rules that turn a
//! hierarchical service name into a [`NameTree`] describing its possible
//! bindings.
//!
//! Three pieces do the work: the textual grammar [`parser`](mod@parser)
//! (not part of the public API -- reached through the `read` constructors
//! on [`Path`], [`NameTree`], [`Prefix`], [`Dentry`], and [`Dtab`]), the
//! [`NameTree`] algebraic data type, and [`Dtab::lookup`], which composes
//! matching [`Dentry`] rules into a tree. Everything else (name resolution,
//! address binding, I/O) is out of scope; this crate is a pure,
//! side-effect-free computation over strings and in-memory values, aside
//! from the one process-wide [`base`] dtab.
//!
//! [dtab]: https://linkerd.io/in-depth/dtabs/
#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

#[macro_use]
extern crate lazy_static;

pub mod dtab;
pub mod error;
pub mod nametree;
pub mod parser;
pub mod path;
pub mod prefix;

pub use self::dtab::{base, set_base, Dentry, Dtab, Name};
pub use self::error::{ParseError, Result};
pub use self::nametree::{LeafShow, NameTree, Weighted, DEFAULT_WEIGHT, W};
pub use self::path::Path;
pub use self::prefix::{Elem, Prefix};

/// Builds a single [`Dentry`] by parsing both sides with the full dtab
/// grammar, the way the dtab syntax itself writes a rule: `prefix => tree`.
///
/// # Examples
///
/// ```
/// #[macro_use]
/// extern crate dtab;
///
/// # fn main() {
/// let dentry = dentry!("/iceCreamStore" => "/smitten | /humphrys | /birite").unwrap();
/// assert_eq!(
///     "Label(iceCreamStore)=>NameTree.Alt(NameTree.Leaf(Path(/smitten)),\
///      NameTree.Leaf(Path(/humphrys)),NameTree.Leaf(Path(/birite)))",
///     dentry.show(),
/// );
/// # }
/// ```
#[macro_export]
macro_rules! dentry {
    ($prefix:expr => $tree:expr) => {
        $crate::Prefix::read($prefix)
            .and_then(|prefix| $crate::NameTree::read($tree).map(|tree| $crate::Dentry::new(prefix, tree)))
    };
}

/// Builds a [`Dtab`] from a sequence of `prefix => tree` pairs, each parsed
/// with the full grammar.
///
/// # Examples
///
/// ```
/// #[macro_use]
/// extern crate dtab;
///
/// # fn main() {
/// let dtab = dtab![
///     "/smitten" => "/USA/CA/SF/Harrison/2790";
///     "/iceCreamStore" => "/humphrys | /smitten";
/// ].unwrap();
///
/// assert_eq!(2, dtab.len());
/// # }
/// ```
#[macro_export]
macro_rules! dtab {
    ($($prefix:expr => $tree:expr;)+) => {{
        let dentries: $crate::error::Result<Vec<$crate::Dentry>> =
            vec![$($crate::dentry!($prefix => $tree)),+].into_iter().collect();
        dentries.map($crate::Dtab::new)
    }};
}

impl<'a> From<&'a str> for NameTree<Path> {
    /// `"~"`, `"!"`, and `"$"` become the negation, failure, and empty
    /// nodes; every other string becomes a single-label `Leaf`. Used by
    /// the `>>` operator below for quick programmatic construction; prefer
    /// [`NameTree::read`] for anything beyond a single label.
    fn from(s: &'a str) -> Self {
        match s {
            "~" => NameTree::Neg,
            "!" => NameTree::Fail,
            "$" => NameTree::Empty,
            other => NameTree::Leaf(Path::from(other)),
        }
    }
}

impl<R> ::std::ops::Shr<R> for Prefix
where
    R: Into<NameTree<Path>>,
{
    type Output = Dentry;
    /// `prefix >> tree` builds a `Dentry`, mirroring the dtab syntax's
    /// `prefix => tree` (`=>` is reserved in Rust; `>>` is the nearest
    /// overridable operator).
    fn shr(self, rhs: R) -> Self::Output {
        Dentry::new(self, rhs.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dentry_macro_parses_both_sides() {
        let dentry = dentry!("/iceCreamStore" => "/smitten | /humphrys").unwrap();
        assert_eq!(
            "Label(iceCreamStore)=>NameTree.Alt(NameTree.Leaf(Path(/smitten)),NameTree.Leaf(Path(/humphrys)))",
            dentry.show()
        );
    }

    #[test]
    fn dtab_macro_builds_multiple_dentries() {
        let built = dtab![
            "/smitten" => "/USA/CA/SF";
            "/iceCreamStore" => "/humphrys | /smitten";
        ]
        .unwrap();
        assert_eq!(2, built.len());
    }

    #[test]
    fn shr_operator_builds_dentry() {
        // `>>`'s right-hand side goes through `NameTree::from(&str)` ->
        // `Path::from(&str)`, which wraps the whole string as a single
        // label rather than parsing it as grammar text -- pass a bare
        // label here, not a leading-slash path.
        let dentry = Prefix::read("/iceCreamStore").unwrap() >> "smitten";
        assert_eq!(NameTree::Leaf(Path::from("smitten")), *dentry.tree());
    }
}
