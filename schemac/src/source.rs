//! Input units and the character cursor the scanner reads them with.
//!
//! [`Cursor`] is a small `Copy` value: scanning routines take one by value,
//! advance their own copy, and hand the new position back. Nothing is ever
//! re-read, so the whole scan stays single-pass.

use crate::error::{ScanError, ScanErrorKind, SourceLocation};
use std::path::{Path, PathBuf};

/// Marker that turns a line comment into an annotation.
pub const ANNOTATION_PREFIX: &str = "//@";

/// Longest offending token quoted in an error report.
const FOUND_TOKEN_LIMIT: usize = 20;

/// One input unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path the unit was loaded from; used in error reports.
    pub path: PathBuf,

    /// Full text of the unit.
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// A cursor positioned at the start of the unit.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.path, &self.content)
    }
}

/// An annotation tag read from a `//@Tag` line.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationToken<'a> {
    /// The tag, without the `//@` marker.
    pub name: &'a str,

    /// Cursor positioned at the tag, for error reports.
    pub at: Cursor<'a>,
}

/// Position-aware reader over one input unit.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    path: &'a Path,
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(path: &'a Path, src: &'a str) -> Self {
        Self {
            path,
            src,
            pos: 0,
            line: 1,
        }
    }

    /// The unread remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Current line (1-indexed).
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.path, self.line)
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume one character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Consume `len` bytes; `len` must end on a character boundary.
    fn advance(&mut self, len: usize) {
        let skipped = &self.src[self.pos..self.pos + len];
        self.line += skipped.matches('\n').count();
        self.pos += len;
    }

    pub fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Skip whitespace, then look at the next character.
    pub fn peek_non_ws(&mut self) -> Option<char> {
        self.skip_ws();
        self.peek()
    }

    /// Whether the unread input starts with `literal`, without skipping anything.
    pub fn starts_with(&self, literal: &str) -> bool {
        self.rest().starts_with(literal)
    }

    /// Skip whitespace, then test for `literal` without consuming it.
    pub fn test(&mut self, literal: &str) -> bool {
        self.skip_ws();
        self.starts_with(literal)
    }

    /// Skip whitespace, then consume `literal` if it is next.
    pub fn eat(&mut self, literal: &str) -> bool {
        if self.test(literal) {
            self.advance(literal.len());
            true
        } else {
            false
        }
    }

    /// Like [`eat`](Self::eat), but `keyword` must not run on into an identifier.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if !self.test(keyword) {
            return false;
        }
        let boundary = self.rest()[keyword.len()..].chars().next();
        if boundary.is_some_and(is_identifier_char) {
            return false;
        }
        self.advance(keyword.len());
        true
    }

    /// Skip through the end of the current line.
    pub fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    /// Move past the next occurrence of `literal`; stays put if there is none.
    pub fn skip_past(&mut self, literal: &str) -> bool {
        match self.rest().find(literal) {
            Some(offset) => {
                self.advance(offset + literal.len());
                true
            }
            None => false,
        }
    }

    /// Skip one `//` or `/* */` comment. Annotation lines are left alone.
    pub fn skip_comment(&mut self) -> Result<bool, ScanError> {
        self.skip_ws();
        if self.starts_with("//") && !self.starts_with(ANNOTATION_PREFIX) {
            self.skip_line();
            return Ok(true);
        }
        if self.starts_with("/*") {
            let start = *self;
            self.advance(2);
            if !self.skip_past("*/") {
                return Err(start.error(ScanErrorKind::Unterminated("block comment")));
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// Skip any run of comments and whitespace.
    pub fn skip_comments(&mut self) -> Result<(), ScanError> {
        while self.skip_comment()? {}
        Ok(())
    }

    /// Consume characters while `pred` holds and return them.
    pub fn read_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// Skip whitespace, then read `[A-Za-z0-9_]*`.
    pub fn read_identifier(&mut self) -> &'a str {
        self.skip_ws();
        self.read_while(is_identifier_char)
    }

    /// Skip whitespace, then read until whitespace or one of `stops`.
    pub fn read_token(&mut self, stops: &str) -> &'a str {
        self.skip_ws();
        self.read_while(|c| !c.is_whitespace() && !stops.contains(c))
    }

    /// Skip whitespace, then read until one of `stops`; the result is trimmed.
    pub fn read_until_any(&mut self, stops: &str) -> &'a str {
        self.skip_ws();
        self.read_while(|c| !stops.contains(c)).trim_end()
    }

    /// Like [`read_until_any`](Self::read_until_any), but a comment also ends the value.
    pub fn read_value(&mut self, stops: &str) -> &'a str {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if stops.contains(c) || self.starts_with("//") || self.starts_with("/*") {
                break;
            }
            self.bump();
        }
        self.src[start..self.pos].trim_end()
    }

    /// Advance to the next character in `stops` without consuming it.
    pub fn skip_until_any(&mut self, stops: &str) -> Option<char> {
        loop {
            let c = self.peek()?;
            if stops.contains(c) {
                return Some(c);
            }
            self.bump();
        }
    }

    /// Read a `//@Tag` annotation line if one is next.
    ///
    /// Everything after the tag up to the end of the line is commentary.
    pub fn take_annotation(&mut self) -> Option<AnnotationToken<'a>> {
        if !self.test(ANNOTATION_PREFIX) {
            return None;
        }
        self.advance(ANNOTATION_PREFIX.len());
        let at = *self;
        let name = self.read_while(is_identifier_char);
        self.skip_line();
        Some(AnnotationToken { name, at })
    }

    /// Build a fatal error at this position, quoting the next token.
    pub fn error(&self, kind: ScanErrorKind) -> ScanError {
        let mut ahead = *self;
        ahead.skip_ws();
        let found = ahead
            .rest()
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .chars()
            .take(FOUND_TOKEN_LIMIT)
            .collect();

        ScanError {
            kind,
            location: ahead.location(),
            found,
        }
    }
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
