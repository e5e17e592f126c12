//! Email layout templates.
//!
//! This module provides:
//! - The immutable [`Template`] record and its save request
//! - The built-in [`DEFAULT_TEMPLATE`] layout
//! - A Handlebars renderer for `{{var}}`, `{{{var}}}` and `{{#if var}}...{{/if}}` layouts
//!
//! # Example
//!
//! ```ignore
//! let compiled = CompiledTemplate::compile(DEFAULT_TEMPLATE)?;
//!
//! let html = compiled.render(&json!({
//!     "title": "Spring sale",
//!     "content": "<p>Everything must go</p>",
//!     "imageUrl": "/api/images/4b1d...",
//!     "footer": "Unsubscribe"
//! }))?;
//! ```

mod layout;
mod renderer;
mod types;

pub use layout::DEFAULT_TEMPLATE;
pub use renderer::{render, CompiledTemplate, TemplateResult};
pub use types::{
    NewTemplate, SaveConfigRequest, SaveConfigResponse, Template, TemplateSyntaxError,
};
