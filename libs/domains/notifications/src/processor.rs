//! Placeholder substitution for notification templates.
//!
//! The processor walks a template once, replacing every known
//! `PLACEHOLDER_<NAME>` token with the supplied value or the field default.
//! Unknown tokens are copied through untouched, and substituted values are
//! never rescanned, so a value that happens to contain a token stays literal.

use crate::models::TemplateKind;
use crate::templates::{TOKEN_PREFIX, TemplateField, TemplateRegistry, TemplateVars};
use tracing::debug;

/// How substituted values are written into HTML bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapePolicy {
    /// HTML-escape every substituted value.
    #[default]
    Html,
    /// Insert values verbatim. Only for input that is already sanitized.
    Trusted,
}

/// Subject and body ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Renders the fixed templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateProcessor {
    policy: EscapePolicy,
}

impl TemplateProcessor {
    pub fn new(policy: EscapePolicy) -> Self {
        Self { policy }
    }

    /// Replace every known token in `template`. Never fails.
    pub fn process(&self, template: &str, vars: &TemplateVars) -> String {
        substitute(template, vars, self.policy)
    }

    /// Render the registered template for `kind`.
    ///
    /// Subjects are plain text and are never escaped.
    pub fn render(&self, kind: TemplateKind, vars: &TemplateVars) -> RenderedEmail {
        let template = TemplateRegistry::get(kind);
        debug!(kind = %kind, policy = ?self.policy, "Rendering notification template");

        RenderedEmail {
            subject: substitute(template.subject, vars, EscapePolicy::Trusted),
            html: substitute(template.body, vars, self.policy),
        }
    }
}

fn substitute(template: &str, vars: &TemplateVars, policy: EscapePolicy) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(TOKEN_PREFIX) {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];

        match TemplateField::match_token(candidate) {
            Some(field) => {
                let value = vars.resolve(field);
                match policy {
                    EscapePolicy::Html => out.push_str(&handlebars::html_escape(value)),
                    EscapePolicy::Trusted => out.push_str(value),
                }
                rest = &candidate[field.token().len()..];
            }
            None => {
                out.push_str(TOKEN_PREFIX);
                rest = &candidate[TOKEN_PREFIX.len()..];
            }
        }
    }

    out.push_str(rest);
    out
}
