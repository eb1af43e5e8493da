//! manac-lex - Lexical analyzer for mana source.
//!
//! Transforms a source string into an ordered stream of [`Token`]s
//! terminated by [`TokenKind::Eof`]. The lexer is total: any input
//! terminates, invalid characters advance the cursor without producing a
//! token, and the lexer itself never reports diagnostics (spec'd recovery
//! happens in the parser).

pub mod cursor;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{keyword_from_str, Token, TokenKind};
