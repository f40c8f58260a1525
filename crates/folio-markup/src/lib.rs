//! folio Markup
//!
//! Parser for the inline effect tags embedded in story text:
//!
//! ```text
//! <shake force=N>...</shake>  <instant>...</instant>  <slow speed=N>...</slow>
//! <fade speed=N>...</fade>    <glitch>...</glitch>
//! ```
//!
//! Unknown or malformed tags are kept as literal text. Attributes are kept
//! exactly as written and never defaulted here.

mod dom;
mod lexer;
mod node;
mod parser;
mod registry;
mod serialize;

pub use dom::{materialize, render_static};
pub use lexer::{tokenize, Token};
pub use node::{Attribute, Attributes, TaggedNode};
pub use parser::parse;
pub use registry::{lookup, EffectClass, TagSpec, TAG_REGISTRY};
pub use serialize::serialize;
