//! Fluxo parser: AST types, errors, and the recursive-descent parser

pub mod error;
pub mod expr;
pub mod parser;
pub mod program;
pub mod stmt;
mod utils;

pub use error::{ErrorLocation, ParseResult, ParserError, ParserErrorKind};
pub use expr::{Binary, Expr, ExprKind, ImportExpr, MemberAccess, Unary, VarRef};
pub use parser::Parser;
pub use program::Program;
pub use stmt::{Stmt, StmtKind};
