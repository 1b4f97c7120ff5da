//! Editor analysis core for the StreamQL pipe query language.
//!
//! Turns query text into a located AST and drives autocomplete, semantic
//! validation, and quick fixes from it. The core never executes a query;
//! it only analyzes structure and proposes textual completions and edits.
//!
//! ```ignore
//! use streamql_core::prelude::*;
//! let ast = build_ast(&parse("from logs | where bytes > 0"));
//! ```

pub mod ast;
pub mod autocomplete;
pub mod callbacks;
pub mod definitions;
pub mod error;
pub mod quickfix;
pub mod registry;
pub mod syntax;
pub mod validation;

pub use ast::build_ast;
pub use syntax::parse;

pub mod prelude {
    pub use crate::ast::{AstItem, AstNode, Span, build_ast, offset_to_line_column};
    pub use crate::autocomplete::{Suggestion, suggest};
    pub use crate::callbacks::{
        FieldDescriptor, PolicyDescriptor, ResourceCallbacks, SourceDescriptor, StaticCallbacks,
    };
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::quickfix::{QuickFix, quick_fixes};
    pub use crate::registry::Registry;
    pub use crate::syntax::parse;
    pub use crate::validation::{Diagnostic, Severity, validate, validate_ast};
}
