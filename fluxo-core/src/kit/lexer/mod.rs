//! Fluxo lexer kit
//!
//! Streaming lexical analysis:
//! - precise position tracking, usable for diagnostics and editors
//! - incremental feeding: source bytes may arrive in chunks
//! - a `Scanner` trait separating the token grammar from stream plumbing

pub mod fluxo;
pub mod lexer;
pub mod position;
pub mod scanner;
pub mod stream;

pub use fluxo::FluxoScanner;
pub use lexer::Lexer;
pub use position::{SourcePosition, SourceSpan};
pub use scanner::{ErrorKind, LexError, ScanResult, Scanner, Token as ScannerToken};
pub use stream::{CharStream, StreamCheckpoint, StreamError, StreamResult};
