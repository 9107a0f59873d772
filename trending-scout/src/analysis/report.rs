//! Analysis report sections and response parsing.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Marker shown in place of a section the response did not contain.
pub const NOT_AVAILABLE: &str = "Not available.";

/// The five fixed sections of an analysis report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Overview,
    Technical,
    Community,
    ContentOpportunities,
    PracticalInsights,
}

impl Section {
    /// All sections in report order.
    pub const ALL: [Section; 5] = [
        Section::Overview,
        Section::Technical,
        Section::Community,
        Section::ContentOpportunities,
        Section::PracticalInsights,
    ];

    /// Heading requested in the prompt.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Section::Overview => "Repository Overview",
            Section::Technical => "Technical Analysis",
            Section::Community => "Community & Adoption",
            Section::ContentOpportunities => "Content Opportunities",
            Section::PracticalInsights => "Practical Insights",
        }
    }

    /// Stable machine-readable key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Section::Overview => "overview",
            Section::Technical => "technical",
            Section::Community => "community",
            Section::ContentOpportunities => "content-opportunities",
            Section::PracticalInsights => "practical-insights",
        }
    }

    /// Bullet points appended under the heading in the prompt.
    #[must_use]
    pub const fn guidance(self) -> &'static str {
        match self {
            Section::Overview => {
                "- What problem does this repository solve?\n- Who is the target audience?\n- What makes it unique?"
            }
            Section::Technical => {
                "- Key technologies and frameworks\n- Architecture and design patterns\n- Dependencies and ecosystem"
            }
            Section::Community => {
                "- Community engagement\n- Real-world usage\n- Recent development activity"
            }
            Section::ContentOpportunities => {
                "- Why is it interesting now?\n- Story angles for video content\n- Key talking points for developers"
            }
            Section::PracticalInsights => {
                "- Getting started summary\n- Common use cases\n- Learning curve and documentation quality"
            }
        }
    }

    /// Normalized names a response heading may use for this section.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Section::Overview => &["repository overview", "overview", "project overview"],
            Section::Technical => &["technical analysis", "technical", "technical details"],
            Section::Community => &["community and adoption", "community", "adoption"],
            Section::ContentOpportunities => &[
                "content opportunities",
                "content opportunity",
                "content ideas",
            ],
            Section::PracticalInsights => &["practical insights", "practical", "insights"],
        }
    }

    /// Recognizes a response line as one of the section headings.
    fn from_heading_line(line: &str) -> Option<Section> {
        let normalized = normalize_heading(line)?;
        Section::ALL
            .into_iter()
            .find(|s| s.aliases().contains(&normalized.as_str()))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// Text of one report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionText {
    Available(String),
    NotAvailable,
}

impl SectionText {
    /// Section body, or the not-available marker.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            SectionText::Available(text) => text,
            SectionText::NotAvailable => NOT_AVAILABLE,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, SectionText::Available(_))
    }
}

/// Structured analysis of a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// Repository the analysis describes.
    pub repository: String,
    sections: BTreeMap<Section, SectionText>,
}

impl AnalysisReport {
    /// Splits a completion response into the five sections.
    ///
    /// Sections whose heading is absent, or present with an empty body, are
    /// marked [`SectionText::NotAvailable`]. When a heading repeats, the first
    /// occurrence wins.
    #[must_use]
    pub fn parse(repository: impl Into<String>, response: &str) -> Self {
        let mut bodies: BTreeMap<Section, Vec<&str>> = BTreeMap::new();
        let mut current: Option<Section> = None;

        for line in response.lines() {
            if let Some(section) = Section::from_heading_line(line) {
                current = (!bodies.contains_key(&section)).then_some(section);
                if let Some(section) = current {
                    bodies.insert(section, Vec::new());
                }
                continue;
            }
            if heading_level(line).is_some_and(|level| level <= 2) {
                current = None;
                continue;
            }
            if let Some(body) = current.and_then(|s| bodies.get_mut(&s)) {
                body.push(line);
            }
        }

        let sections = Section::ALL
            .into_iter()
            .map(|section| {
                let text = bodies
                    .get(&section)
                    .map(|lines| lines.join("\n").trim().to_string())
                    .filter(|text| !text.is_empty())
                    .map_or(SectionText::NotAvailable, SectionText::Available);
                (section, text)
            })
            .collect();

        Self {
            repository: repository.into(),
            sections,
        }
    }

    /// Returns the text of `section`.
    #[must_use]
    pub fn section(&self, section: Section) -> &SectionText {
        self.sections
            .get(&section)
            .unwrap_or(&SectionText::NotAvailable)
    }

    /// Iterates sections in report order.
    pub fn sections(&self) -> impl Iterator<Item = (Section, &SectionText)> {
        self.sections.iter().map(|(s, t)| (*s, t))
    }

    /// Sections that were not found in the response.
    #[must_use]
    pub fn missing(&self) -> Vec<Section> {
        self.sections()
            .filter(|(_, text)| !text.is_available())
            .map(|(section, _)| section)
            .collect()
    }

    /// Whether every section was found.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Analysis: {}", self.repository)?;
        for (i, (section, text)) in self.sections().enumerate() {
            write!(f, "\n## {}. {}\n\n{}\n", i + 1, section.heading(), text.as_str())?;
        }
        Ok(())
    }
}

fn heading_level(line: &str) -> Option<usize> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    (level > 0 && trimmed[level..].starts_with(' ')).then_some(level)
}

/// A heading needs markup: `#`, bold or italic markers, leading numbering,
/// or a trailing colon. Bare words are body text.
fn has_heading_markup(text: &str) -> bool {
    text.starts_with(['#', '*', '_'])
        || text.starts_with(|c: char| c.is_ascii_digit())
        || text.trim_end_matches(['*', '_']).ends_with(':')
}

/// Reduces a heading line to lowercase words: markdown markers, numbering
/// and trailing colons removed, `&` spelled out.
fn normalize_heading(line: &str) -> Option<String> {
    let mut text = line.trim();
    if text.is_empty() || text.len() > 80 || !has_heading_markup(text) {
        return None;
    }

    text = text.trim_start_matches('#').trim();
    text = text.trim_matches(|c| c == '*' || c == '_').trim();
    text = text.trim_end_matches(':').trim();
    text = text.trim_matches(|c| c == '*' || c == '_').trim();

    let digits = text.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        text = text[digits..].trim_start_matches(['.', ')']).trim();
    }

    let normalized = text
        .to_lowercase()
        .replace('&', " and ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    (!normalized.is_empty()).then_some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "\
Here are my notes.

## 1. Repository Overview
A fast widget toolkit.

## 2. Technical Analysis
Written in Rust.
### Dependencies
Tokio.

## 3. Community & Adoption
Growing quickly.

## 4. Content Opportunities
Great demo material.

## 5. Practical Insights
Easy to start.
";

    #[test]
    fn parses_all_sections() {
        let report = AnalysisReport::parse("octo/widgets", FULL);

        assert!(report.is_complete());
        assert_eq!(
            report.section(Section::Overview).as_str(),
            "A fast widget toolkit."
        );
        assert_eq!(
            report.section(Section::Technical).as_str(),
            "Written in Rust.\n### Dependencies\nTokio."
        );
        assert_eq!(
            report.section(Section::PracticalInsights).as_str(),
            "Easy to start."
        );
    }

    #[test]
    fn missing_heading_is_marked_not_available() {
        let response = FULL.replace("## 3. Community & Adoption", "## 3. Something Else");
        let report = AnalysisReport::parse("octo/widgets", &response);

        assert_eq!(report.missing(), vec![Section::Community]);
        assert_eq!(report.section(Section::Community).as_str(), NOT_AVAILABLE);
        assert_eq!(
            report.section(Section::ContentOpportunities).as_str(),
            "Great demo material."
        );
    }

    #[test]
    fn tolerates_bold_and_unnumbered_headings() {
        let response = "**Repository Overview:**\nOne.\n\nTECHNICAL ANALYSIS:\nTwo.\n\n\
                        # community and adoption\nThree.";
        let report = AnalysisReport::parse("a/b", response);

        assert_eq!(report.section(Section::Overview).as_str(), "One.");
        assert_eq!(report.section(Section::Technical).as_str(), "Two.");
        assert_eq!(report.section(Section::Community).as_str(), "Three.");
        assert!(!report.section(Section::PracticalInsights).is_available());
    }

    #[test]
    fn bare_section_words_stay_in_body() {
        let response = "\
## Repository Overview
Three things stand out:
Community
The maintainers answer issues within a day.

## Community & Adoption
Used by several large projects.
";
        let report = AnalysisReport::parse("a/b", response);

        assert_eq!(
            report.section(Section::Overview).as_str(),
            "Three things stand out:\nCommunity\nThe maintainers answer issues within a day."
        );
        assert_eq!(
            report.section(Section::Community).as_str(),
            "Used by several large projects."
        );
    }

    #[test]
    fn empty_body_counts_as_missing() {
        let report =
            AnalysisReport::parse("a/b", "## Repository Overview\n\n## Practical Insights\nTips.");

        assert!(!report.section(Section::Overview).is_available());
        assert_eq!(report.section(Section::PracticalInsights).as_str(), "Tips.");
    }

    #[test]
    fn first_occurrence_of_repeated_heading_wins() {
        let report = AnalysisReport::parse(
            "a/b",
            "## Overview\nFirst.\n## Overview\nSecond.\n",
        );

        assert_eq!(report.section(Section::Overview).as_str(), "First.");
    }

    #[test]
    fn unrelated_top_level_heading_ends_section() {
        let report = AnalysisReport::parse(
            "a/b",
            "## Practical Insights\nTips.\n## Comparison & Context\nAlternatives.",
        );

        assert_eq!(report.section(Section::PracticalInsights).as_str(), "Tips.");
    }

    #[test]
    fn prose_only_response_is_fully_missing() {
        let report = AnalysisReport::parse("a/b", "I cannot help with that.");
        assert_eq!(report.missing().len(), 5);
    }

    #[test]
    fn display_renders_every_section() {
        let report = AnalysisReport::parse("a/b", "## Overview\nHello.");
        let rendered = report.to_string();

        assert!(rendered.contains("## 1. Repository Overview\n\nHello."));
        assert!(rendered.contains("## 5. Practical Insights\n\nNot available."));
    }
}
