//! Turns a token stream from `pinelint-lex` into an AST, tolerating and
//! recording malformed input rather than aborting at the first error.

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::{
    Arg, Block, Expr, Identifier, Literal, LiteralTag, Param, ScriptKind, Stmt, SwitchCase,
};
pub use error::ParseError;
pub use parser::{parse, Parser};
