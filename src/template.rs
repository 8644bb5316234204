//! Prompt templates with named `{placeholder}` substitution.
//!
//! A template is rendered into a final prompt string before submission.
//! Rendering fails if a placeholder has no matching variable, so a typo in
//! a template surfaces as an error instead of leaking a literal `{name}`
//! to the model.

use std::collections::HashMap;

use crate::chat::{ChatMessage, ChatRole};
use crate::error::LlmError;

/// A parameterized prompt with named placeholders, e.g.
/// `"Explain {sport} in 100 words."`.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Creates a template from the given text.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Loads a template from an external file.
    ///
    /// Lets prompts live next to the application's configuration instead of
    /// in code.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, LlmError> {
        let template = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            LlmError::InvalidRequest(format!(
                "failed to read prompt template {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Ok(Self { template })
    }

    /// The raw, unrendered template text.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Renders the template by substituting every `{name}` placeholder with
    /// the matching variable.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::InvalidRequest` if a placeholder is unbound or
    /// a `{` is never closed.
    pub fn render(&self, vars: &HashMap<&str, &str>) -> Result<String, LlmError> {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after.find('}').ok_or_else(|| {
                LlmError::InvalidRequest(format!(
                    "unterminated placeholder in template: {}",
                    self.template
                ))
            })?;
            let name = &after[..end];
            let value = vars.get(name).ok_or_else(|| {
                LlmError::InvalidRequest(format!("unbound template placeholder: {{{name}}}"))
            })?;
            out.push_str(value);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Renders the template and wraps the result in a user message.
    pub fn create_message(&self, vars: &HashMap<&str, &str>) -> Result<ChatMessage, LlmError> {
        Ok(ChatMessage::user().content(self.render(vars)?).build())
    }
}

/// A template that renders into a system message framing the model's role.
#[derive(Debug, Clone)]
pub struct SystemPromptTemplate {
    inner: PromptTemplate,
}

impl SystemPromptTemplate {
    /// Creates a system template from the given text.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            inner: PromptTemplate::new(template),
        }
    }

    /// Creates a system message from a template without placeholders.
    pub fn create_message(&self) -> Result<ChatMessage, LlmError> {
        self.create_message_with(&HashMap::new())
    }

    /// Renders the template and wraps the result in a system message.
    pub fn create_message_with(
        &self,
        vars: &HashMap<&str, &str>,
    ) -> Result<ChatMessage, LlmError> {
        Ok(ChatMessage {
            role: ChatRole::System,
            content: self.inner.render(vars)?,
        })
    }
}
