pub mod ast;
pub mod context;
pub mod flavor;
pub mod function;
pub mod lexer;
pub mod parser;

pub use ast::{FunctionCallNode, Node};
pub use context::{Context, ContextError, DocumentInfo, DocumentType};
pub use flavor::Flavor;
pub use function::{Function, Library, Parameter, ValueKind};
pub use lexer::{LexError, Lexer, Token, TokenKind};
pub use parser::{parse, parse_blocks, parse_inline, resolve_references};
