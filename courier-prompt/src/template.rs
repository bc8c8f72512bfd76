use std::collections::{BTreeSet, HashMap};

use courier_core::CourierError;
use regex::Regex;

const PLACEHOLDER: &str = r"\{\{\s*(\w+)\s*\}\}";

/// A text template with `{{name}}` placeholders.
///
/// Unknown placeholders render as the empty string.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn render(&self, vars: &HashMap<&str, String>) -> Result<String, CourierError> {
        let pattern = placeholder_pattern()?;
        let rendered = pattern.replace_all(&self.template, |caps: &regex::Captures| {
            vars.get(&caps[1]).cloned().unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }

    /// Placeholder names in the template, deduplicated and sorted.
    pub fn variables(&self) -> Result<BTreeSet<String>, CourierError> {
        let pattern = placeholder_pattern()?;
        Ok(pattern
            .captures_iter(&self.template)
            .map(|caps| caps[1].to_string())
            .collect())
    }
}

fn placeholder_pattern() -> Result<Regex, CourierError> {
    Regex::new(PLACEHOLDER).map_err(|e| CourierError::InvalidConfig(e.to_string()))
}
