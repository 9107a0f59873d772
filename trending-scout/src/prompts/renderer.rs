//! Prompt renderer.

use crate::analysis::Section;
use crate::repository::RepositorySummary;
use chrono::NaiveDate;
use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde_json::{json, Value};

handlebars_helper!(thousands: |n: i64| group_thousands(n));

/// Creates a configured Handlebars registry.
///
/// The registry is configured with:
/// - No HTML escaping (prompts are plain text)
/// - Strict mode (catches missing variables)
/// - `thousands` helper for digit grouping
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_helper("thousands", Box::new(thousands));
    hbs
}

/// Renders translation and analysis prompts.
pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PromptRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptRenderer").finish_non_exhaustive()
    }
}

impl PromptRenderer {
    /// Creates a new prompt renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders the natural-language translation prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_translation_prompt(
        &self,
        query: &str,
        today: NaiveDate,
    ) -> Result<String, super::PromptError> {
        let data = json!({
            "query": query,
            "today": today.format("%Y-%m-%d").to_string(),
            "year_start": format!("{}-01-01", today.format("%Y")),
        });

        self.render_template(super::TRANSLATION_TEMPLATE, &data)
    }

    /// Renders the repository analysis prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_analysis_prompt(
        &self,
        repo: &RepositorySummary,
    ) -> Result<String, super::PromptError> {
        let sections: Vec<Value> = Section::ALL
            .iter()
            .enumerate()
            .map(|(i, section)| {
                json!({
                    "number": i + 1,
                    "heading": section.heading(),
                    "guidance": section.guidance(),
                })
            })
            .collect();

        let data = json!({
            "full_name": repo.full_name,
            "html_url": repo.html_url,
            "description": repo.description,
            "language": repo.language,
            "stars": repo.stars,
            "forks": repo.forks,
            "watchers": repo.watchers,
            "open_issues": repo.open_issues,
            "created": repo.created_at.format("%Y-%m-%d").to_string(),
            "pushed": repo.pushed_at.format("%Y-%m-%d").to_string(),
            "topics": repo.topics.join(", "),
            "license": repo.license,
            "sections": sections,
        });

        self.render_template(super::ANALYSIS_TEMPLATE, &data)
    }

    /// Renders a template with the given data.
    fn render_template(&self, template: &str, data: &Value) -> Result<String, super::PromptError> {
        Ok(self.handlebars.render_template(template, data)?)
    }
}

/// Formats an integer with comma thousands separators.
pub(crate) fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
