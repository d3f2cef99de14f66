//! Fluxo token kinds and lexer construction

pub mod builder;
pub mod token_kind;

pub use builder::{build_lexer, build_lexer_with_logger};
pub use token_kind::FluxoTokenKind;
