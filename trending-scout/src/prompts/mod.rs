//! Prompt rendering for the text-completion capability.
//!
//! Prompts are Handlebars templates rendered with strict mode enabled, so a
//! missing variable is a rendering error rather than an empty hole in the
//! prompt.

mod error;
mod renderer;

pub use error::PromptError;
pub(crate) use renderer::group_thousands;
pub use renderer::{create_handlebars_registry, PromptRenderer};

/// System instruction for natural-language query translation.
pub const TRANSLATION_SYSTEM: &str = "You convert natural-language requests into GitHub repository search queries. Reply with the query on a single line and nothing else.";

/// System instruction for repository analysis.
pub const ANALYSIS_SYSTEM: &str = "You are a developer advocate writing research notes about open-source repositories for podcast and video production. Be specific and factual.";

/// Template for translating a natural-language request into search syntax.
pub const TRANSLATION_TEMPLATE: &str = r#"Convert this natural language query into a GitHub repository search query.

Natural Query: "{{query}}"

Use GitHub search qualifiers such as:
- language:python
- stars:>100 or stars:10..500
- forks:>5
- created:>YYYY-MM-DD or pushed:>YYYY-MM-DD
- topic:machine-learning
- good-first-issues:>0
- in:name,description
- license:mit

Today is {{today}}. Resolve relative dates ("this year", "last month") against it.

Examples:
- "Python machine learning projects from this year" -> language:python topic:machine-learning created:>{{year_start}}
- "popular rust web frameworks" -> language:rust topic:web-framework stars:>1000
- "beginner friendly javascript projects" -> language:javascript good-first-issues:>0

Return only the search query, with no explanation."#;

/// Template for the five-section repository analysis.
pub const ANALYSIS_TEMPLATE: &str = r"Please analyze this GitHub repository and write structured notes suitable for podcast and video content.

Repository URL: {{html_url}}
Repository Name: {{full_name}}
Description: {{#if description}}{{description}}{{else}}No description available{{/if}}
Language: {{#if language}}{{language}}{{else}}Unknown{{/if}}
Stars: {{thousands stars}}
Forks: {{thousands forks}}
Watchers: {{thousands watchers}}
Open issues: {{thousands open_issues}}
License: {{#if license}}{{license}}{{else}}None{{/if}}
Created: {{created}}
Last push: {{pushed}}
Topics: {{#if topics}}{{topics}}{{else}}none{{/if}}

Answer using exactly these markdown headings, in this order:
{{#each sections}}

## {{number}}. {{heading}}
{{guidance}}
{{/each}}

Include specific examples, statistics and technical details. Do not add other top-level headings.";
