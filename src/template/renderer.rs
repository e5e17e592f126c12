//! Layout rendering on top of the Handlebars engine.
//!
//! Layouts use `{{name}}` (HTML-escaped), `{{{name}}}` (verbatim) and
//! `{{#if name}} ... {{else}} ... {{/if}}`. Missing keys render as the empty
//! string, comments are dropped, and a block tag alone on its line takes the
//! whole line with it.

use handlebars::Handlebars;
use serde_json::{Map, Value};

use super::types::TemplateSyntaxError;

/// Result type for template compilation and rendering
pub type TemplateResult<T> = Result<T, TemplateSyntaxError>;

/// Registry name of the single layout a [`CompiledTemplate`] holds
const LAYOUT_NAME: &str = "layout";

/// A parsed layout, ready to render any number of times.
pub struct CompiledTemplate {
    registry: Handlebars<'static>,
}

impl CompiledTemplate {
    /// Parse layout source.
    pub fn compile(source: &str) -> TemplateResult<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(escape_html);
        registry
            .register_template_string(LAYOUT_NAME, source)
            .map_err(|e| TemplateSyntaxError::Compile(e.to_string()))?;

        Ok(Self { registry })
    }

    /// Render with the given data. Non-object data behaves like an empty object.
    pub fn render(&self, data: &Value) -> TemplateResult<String> {
        let empty = Value::Object(Map::new());
        let data = if data.is_object() { data } else { &empty };

        self.registry
            .render(LAYOUT_NAME, data)
            .map_err(|e| TemplateSyntaxError::Render(e.to_string()))
    }
}

/// Compile and render in one step.
pub fn render(source: &str, data: &Value) -> TemplateResult<String> {
    CompiledTemplate::compile(source)?.render(data)
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            _ => out.push(ch),
        }
    }
    out
}
