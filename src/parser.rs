//! A single-pass, character-indexed recursive-descent parser for the dtab
//! grammar.
//!
//! Grammar (normative):
//!
//! ```text
//! path      ::= '/' elems | '/'
//! elems     ::= elem '/' elems | elem
//! elem      ::= '*' | label
//! label     ::= labelchar+
//! labelchar ::= showable | '\' 'x' hexdigit hexdigit
//! showable  ::= one of [A-Za-z0-9_:.#$%\-]
//!
//! dtab      ::= dentry (';' dentry)* ';'?
//! dentry    ::= prefix '=>' tree
//! prefix    ::= '/' prefix_elems | '/'
//! prefix_elems ::= prefix_elem ('/' prefix_elem)*
//! prefix_elem  ::= '*' | label
//! tree      ::= tree1 ('|' tree1)*
//! tree1     ::= weighted ('&' weighted)*
//! weighted  ::= (number '*')? simple
//! simple    ::= '(' tree ')' | path | '!' | '~' | '$'
//! number    ::= [0-9]* ('.' [0-9]+)? with at most one '.'; lone '.' is an error
//! ```
//!
//! Whitespace and `#`-to-end-of-line comments are skipped everywhere the
//! grammar permits whitespace. Every `parse_all_*` entry point parses the
//! corresponding non-terminal, skips trailing whitespace/comments, and then
//! asserts end-of-input; trailing content is a parse error.

use crate::dtab::{Dentry, Dtab};
use crate::error::{ParseError, Result};
use crate::nametree::{NameTree, Weighted, DEFAULT_WEIGHT};
use crate::path::{is_showable, Path};
use crate::prefix::{Elem, Prefix};

/// A token in an error message: a literal character, end-of-input, or a
/// symbolic category such as `"label char"`.
enum Token {
    Char(char),
    Eoi,
    Category(&'static str),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Char(c) => format!("'{}'", c),
            Token::Eoi => "end of input".to_string(),
            Token::Category(s) => s.to_string(),
        }
    }
}

pub(crate) struct Parser {
    chars: Vec<char>,
    index: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Parser {
            chars: input.chars().collect(),
            index: 0,
        }
    }

    fn size(&self) -> usize {
        self.chars.len()
    }

    fn at_end(&self) -> bool {
        self.index >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_token(&self) -> Token {
        match self.peek() {
            Some(c) => Token::Char(c),
            None => Token::Eoi,
        }
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn illegal<T>(&self, expected: Token, found: Token) -> Result<T> {
        let context = if self.at_end() {
            let input: String = self.chars.iter().collect();
            format!("{}[]", input)
        } else {
            let prefix: String = self.chars[..self.index].iter().collect();
            let ch = self.chars[self.index];
            let suffix: String = self.chars[self.index + 1..].iter().collect();
            format!("{}[{}]{}", prefix, ch, suffix)
        };
        Err(ParseError::new(format!(
            "{} expected but {} found at '{}'",
            expected.describe(),
            found.describe(),
            context
        )))
    }

    fn maybe_eat(&mut self, c: char) -> bool {
        if self.peek() != Some(c) {
            return false;
        }
        self.advance();
        true
    }

    fn eat(&mut self, c: char) -> Result<()> {
        if self.maybe_eat(c) {
            Ok(())
        } else {
            self.illegal(Token::Char(c), self.peek_token())
        }
    }

    fn eat_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == '#' {
                self.eat_line();
            } else if is_whitespace(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn eat_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        if !self.at_end() {
            // `eat('\n')` cannot fail here: the loop above only stops at
            // end-of-input or at a newline.
            let _ = self.eat('\n');
        }
    }

    fn ensure_end(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            self.illegal(Token::Eoi, self.peek_token())
        }
    }

    fn parse_hex_char(&mut self) -> Result<u32> {
        match self.peek().and_then(|c| c.to_digit(16)) {
            Some(d) => {
                self.advance();
                Ok(d)
            }
            None => self.illegal(Token::Category("hex char"), self.peek_token()),
        }
    }

    fn is_label_char(&self, c: Option<char>) -> bool {
        matches!(c, Some(c) if is_showable(c) || c == '\\')
    }

    fn parse_label(&mut self) -> Result<String> {
        let mut bytes = Vec::new();
        loop {
            match self.peek() {
                Some(c) if is_showable(c) => {
                    self.advance();
                    bytes.push(c as u8);
                }
                Some('\\') => {
                    self.advance();
                    self.eat('x')?;
                    let hi = self.parse_hex_char()?;
                    let lo = self.parse_hex_char()?;
                    bytes.push(((hi << 4) | lo) as u8);
                }
                other => {
                    return self.illegal(
                        Token::Category("label char"),
                        other.map(Token::Char).unwrap_or(Token::Eoi),
                    )
                }
            }
            if !self.is_label_char(self.peek()) {
                break;
            }
        }
        String::from_utf8(bytes)
            .map_err(|_| ParseError::new("invalid utf-8 in label escape sequence".to_string()))
    }

    fn is_dentry_prefix_elem_char(&self, c: Option<char>) -> bool {
        matches!(c, Some('*')) || self.is_label_char(c)
    }

    fn parse_dentry_prefix_elem(&mut self) -> Result<Elem> {
        if self.maybe_eat('*') {
            Ok(Elem::Any)
        } else {
            self.parse_label().map(Elem::Label)
        }
    }

    fn is_number_char(&self, c: Option<char>) -> bool {
        matches!(c, Some(c) if c.is_ascii_digit() || c == '.')
    }

    fn parse_number(&mut self) -> Result<f64> {
        let mut result = String::new();
        let mut seen_dot = false;
        while self.is_number_char(self.peek()) {
            let c = self.peek().unwrap();
            if c == '.' {
                if seen_dot {
                    return self.illegal(Token::Category("number char"), Token::Char('.'));
                }
                seen_dot = true;
            }
            result.push(c);
            self.advance();
        }
        if result == "." {
            return self.illegal(Token::Category("weight"), Token::Char('.'));
        }
        result
            .parse()
            .map_err(|_| ParseError::new(format!("'{}' is not a valid number", result)))
    }

    fn parse_dentry_prefix(&mut self) -> Result<Prefix> {
        self.eat_whitespace();
        self.eat('/')?;
        if !self.is_dentry_prefix_elem_char(self.peek()) {
            return Ok(Prefix::empty());
        }
        let mut elems = Vec::new();
        loop {
            elems.push(self.parse_dentry_prefix_elem()?);
            if !self.maybe_eat('/') {
                break;
            }
        }
        Ok(Prefix::new(elems))
    }

    fn parse_path(&mut self) -> Result<Path> {
        self.eat_whitespace();
        self.eat('/')?;
        if !self.is_label_char(self.peek()) {
            return Ok(Path::empty());
        }
        let mut labels = Vec::new();
        loop {
            labels.push(self.parse_label()?);
            if !self.maybe_eat('/') {
                break;
            }
        }
        Ok(Path::from_labels(labels))
    }

    fn parse_tree(&mut self) -> Result<NameTree<Path>> {
        let mut trees = vec![self.parse_tree1()?];
        loop {
            self.eat_whitespace();
            if !self.maybe_eat('|') {
                break;
            }
            trees.push(self.parse_tree1()?);
        }
        if trees.len() > 1 {
            Ok(NameTree::Alt(trees))
        } else {
            Ok(trees.pop().unwrap())
        }
    }

    fn parse_tree1(&mut self) -> Result<NameTree<Path>> {
        let mut weighted = vec![self.parse_weighted()?];
        loop {
            self.eat_whitespace();
            if !self.maybe_eat('&') {
                break;
            }
            weighted.push(self.parse_weighted()?);
        }
        if weighted.len() > 1 {
            Ok(NameTree::Union(weighted))
        } else {
            Ok(*weighted.pop().unwrap().tree)
        }
    }

    fn parse_simple(&mut self) -> Result<NameTree<Path>> {
        self.eat_whitespace();
        match self.peek() {
            Some('(') => {
                self.advance();
                let tree = self.parse_tree()?;
                self.eat_whitespace();
                self.eat(')')?;
                Ok(tree)
            }
            Some('/') => Ok(NameTree::Leaf(self.parse_path()?)),
            Some('!') => {
                self.advance();
                Ok(NameTree::Fail)
            }
            Some('~') => {
                self.advance();
                Ok(NameTree::Neg)
            }
            Some('$') => {
                self.advance();
                Ok(NameTree::Empty)
            }
            other => self.illegal(
                Token::Category("simple"),
                other.map(Token::Char).unwrap_or(Token::Eoi),
            ),
        }
    }

    fn parse_weighted(&mut self) -> Result<Weighted<Path>> {
        self.eat_whitespace();
        let weight = if self.is_number_char(self.peek()) {
            let w = self.parse_number()?;
            self.eat_whitespace();
            self.eat('*')?;
            self.eat_whitespace();
            w
        } else {
            DEFAULT_WEIGHT
        };
        Ok(self.parse_simple()?.weighted(weight))
    }

    fn parse_dentry(&mut self) -> Result<Dentry> {
        let prefix = self.parse_dentry_prefix()?;
        self.eat_whitespace();
        self.eat('=')?;
        self.eat('>')?;
        let tree = self.parse_tree()?;
        Ok(Dentry::new(prefix, tree))
    }

    fn parse_dtab(&mut self) -> Result<Dtab> {
        let mut dentries = Vec::new();
        loop {
            self.eat_whitespace();
            if !self.at_end() {
                dentries.push(self.parse_dentry()?);
                self.eat_whitespace();
            }
            if !self.maybe_eat(';') {
                break;
            }
        }
        Ok(Dtab::new(dentries))
    }

    fn parse_all<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let parsed = parse(self)?;
        self.eat_whitespace();
        self.ensure_end()?;
        Ok(parsed)
    }

    pub(crate) fn parse_all_path(input: &str) -> Result<Path> {
        Parser::new(input).parse_all(Self::parse_path)
    }

    pub(crate) fn parse_all_name_tree(input: &str) -> Result<NameTree<Path>> {
        Parser::new(input).parse_all(Self::parse_tree)
    }

    pub(crate) fn parse_all_dentry(input: &str) -> Result<Dentry> {
        Parser::new(input).parse_all(Self::parse_dentry)
    }

    pub(crate) fn parse_all_dentry_prefix(input: &str) -> Result<Prefix> {
        let mut parser = Parser::new(input);
        if parser.size() == 0 {
            return Ok(Prefix::empty());
        }
        parser.parse_all(Self::parse_dentry_prefix)
    }

    pub(crate) fn parse_all_dtab(input: &str) -> Result<Dtab> {
        let mut parser = Parser::new(input);
        if parser.size() == 0 {
            return Ok(Dtab::empty());
        }
        parser.parse_all(Self::parse_dtab)
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}')
}
