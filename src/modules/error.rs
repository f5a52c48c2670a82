// Copyright notice and licensing information.
// SPDX-License-Identifier: Apache-2.0 OR MIT indicates dual licensing under Apache 2.0 or MIT licenses.
// Copyright © 2024 yamltree Contributors. All rights reserved.

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};
use std::io;
use std::sync::Arc;

/// An error that happened parsing, resolving, or emitting YAML.
pub struct Error(Box<ErrorImpl>);

/// Alias for a `Result` with the error type `yamltree::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// A position in the source: byte index, 0-based line, 0-based column.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Mark {
    pub index: usize,
    pub line: usize,
    pub column: usize,
}

impl Mark {
    pub fn new(index: usize, line: usize, column: usize) -> Self {
        Mark { index, line, column }
    }
}

impl Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line + 1, self.column + 1)
    }
}

/// The input location an error occurred at, exposed to callers.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    index: usize,
    line: usize,
    column: usize,
}

impl Location {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    fn from_mark(mark: Mark) -> Self {
        Location { index: mark.index, line: mark.line + 1, column: mark.column + 1 }
    }
}

/// The internal representation of an error.
#[derive(Debug)]
pub enum ErrorImpl {
    /// Malformed YAML: unterminated quote, bad indentation, a forbidden
    /// token in a plain scalar, a misplaced document separator, and so on.
    Syntax { mark: Mark, problem: String, line_text: String },
    /// `resolve()` could not find an anchor for an alias.
    UnknownAnchor { mark: Mark, name: String },
    /// A structural precondition was violated: changing a node's type
    /// while it has children, an inconsistent parent/child type pairing.
    InvalidTransition(String),
    /// Allocation failure, routed through the error callback.
    Alloc,
    /// A path-lookup could not find its target.
    PathNotFound { path: String, resolved_prefix: String },
    /// The emitter was asked to render a tag or anchor in JSON, which has
    /// no representation for either.
    JsonTagRejected,
    /// A generic message with an optional location.
    Message(String, Option<Mark>),
    /// An I/O error from a writer sink.
    Io(io::Error),
    /// A shared error implementation (cloned via `Arc` without copying
    /// the message).
    Shared(Arc<ErrorImpl>),
}

impl Error {
    /// Returns the `Location` this error occurred at, if any.
    pub fn location(&self) -> Option<Location> {
        self.0.mark().map(Location::from_mark)
    }

    pub fn shared(self) -> Arc<ErrorImpl> {
        if let ErrorImpl::Shared(err) = *self.0 {
            err
        } else {
            Arc::from(self.0)
        }
    }
}

impl From<ErrorImpl> for Error {
    fn from(inner: ErrorImpl) -> Self {
        Error(Box::new(inner))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error(Box::new(ErrorImpl::Io(err)))
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display(f)
    }
}

// Strip a layer of indirection from the `Debug` view, since `unwrap()` is
// often what a caller sees.
impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.debug(f)
    }
}

impl ErrorImpl {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ErrorImpl::Io(err) => err.source(),
            ErrorImpl::Shared(err) => err.source(),
            _ => None,
        }
    }

    fn mark(&self) -> Option<Mark> {
        match self {
            ErrorImpl::Syntax { mark, .. } | ErrorImpl::UnknownAnchor { mark, .. } => Some(*mark),
            ErrorImpl::Message(_, mark) => *mark,
            ErrorImpl::Shared(err) => err.mark(),
            _ => None,
        }
    }

    fn message_no_mark(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorImpl::Syntax { problem, .. } => f.write_str(problem),
            ErrorImpl::UnknownAnchor { name, .. } => write!(f, "unknown anchor '{name}'"),
            ErrorImpl::InvalidTransition(msg) => f.write_str(msg),
            ErrorImpl::Alloc => f.write_str("allocation failure"),
            ErrorImpl::PathNotFound { path, resolved_prefix } => {
                write!(f, "path '{path}' not found (resolved up to '{resolved_prefix}')")
            }
            ErrorImpl::JsonTagRejected => f.write_str("JSON has no representation for tags or anchors"),
            ErrorImpl::Message(msg, _) => f.write_str(msg),
            ErrorImpl::Io(err) => Display::fmt(err, f),
            ErrorImpl::Shared(_) => unreachable!(),
        }
    }

    fn display(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorImpl::Shared(err) => err.display(f),
            ErrorImpl::Syntax { mark, line_text, .. } => {
                self.message_no_mark(f)?;
                write!(f, " at {mark}\n{line_text}\n{caret:>width$}", caret = "^", width = mark.column + 1)
            }
            _ => {
                self.message_no_mark(f)?;
                if let Some(mark) = self.mark() {
                    write!(f, " at {mark}")?;
                }
                Ok(())
            }
        }
    }

    fn debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorImpl::Shared(err) => err.debug(f),
            _ => {
                f.write_str("Error(")?;
                struct MessageNoMark<'a>(&'a ErrorImpl);
                impl Display for MessageNoMark<'_> {
                    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        self.0.message_no_mark(f)
                    }
                }
                let msg = MessageNoMark(self).to_string();
                Debug::fmt(&msg, f)?;
                if let Some(mark) = self.mark() {
                    write!(f, ", line: {}, column: {}", mark.line + 1, mark.column + 1)?;
                }
                f.write_str(")")
            }
        }
    }
}

pub fn new(inner: ErrorImpl) -> Error {
    Error(Box::new(inner))
}

pub fn shared(shared: Arc<ErrorImpl>) -> Error {
    Error(Box::new(ErrorImpl::Shared(shared)))
}
