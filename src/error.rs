//! The single error type raised by the grammar parser.
//!
//! Every fallible entry point in this crate (`Path::read`, `NameTree::read`,
//! `Prefix::read`, `Dentry::read`, `Dtab::read`) returns `Result<_,
//! ParseError>`. There is exactly one error kind: malformed input. Runtime
//! "wrong type passed to an API" errors, which the original dtab
//! implementations raise as a distinct `TypeError`, cannot occur here --
//! they are static type errors caught at compile time instead.

use std::fmt;

/// A convenience alias for the result of a parse.
pub type Result<T> = ::std::result::Result<T, ParseError>;

/// A single malformed-input error, carrying a message of the shape
/// `"<expected> expected but <found> found at '<context>'"`.
///
/// `<context>` is the entire input with the offending character bracketed
/// as `prefix[c]suffix`, or `input[]` when the failure is at end-of-input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub(crate) fn new(message: String) -> Self {
        ParseError { message }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ::std::error::Error for ParseError {}
