//! WML surface parsing.
//!
//! WML is line-oriented: tags, attributes, macro references, and
//! preprocessor directives all resolve within a line once cross-line string
//! state is tracked. The modules here turn raw lines into typed pieces the
//! checks consume.
//!
//! - [`attribute`] — `key=value` splitting with comment and quote handling
//! - [`elements`] — line lexing into typed structural events
//! - [`macros`] — `{MACRO arg ...}` reference parsing
//! - [`directives`] — `# wmllint:` magic comments
//! - [`tagstack`] — open-tag bookkeeping with close outcomes
//! - [`mapblock`] — embedded and standalone terrain grids
//! - [`iterator`] — a resumable line walk carrying scope ancestry
//! - [`translator`] — the per-file pipeline tying it all together

pub mod attribute;
pub mod directives;
pub mod elements;
pub mod iterator;
pub mod macros;
pub mod mapblock;
pub mod tagstack;
pub mod translator;

pub use attribute::{parse_attribute, Attribute};
pub use directives::Directive;
pub use iterator::{Visit, WmlIterator};
pub use macros::{parse_macroref, MacroRef};
pub use tagstack::TagStack;
pub use translator::translate_file;
