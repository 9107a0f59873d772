//! Tolerant parsing of provider query syntax.
//!
//! Completion output has no format guarantee: it may be wrapped in code
//! fences, prefixed with a label, or surrounded by prose. The lenient parser
//! picks the line that looks most like a query and keeps what it recognizes.

use super::{Qualifier, QuerySpec, SortField, SortOrder};

/// What to do with a `key:value` token that is not a valid qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnknownTokens {
    Drop,
    KeepAsTerm,
}

/// Parses completion output. Returns `None` if no line carries at least one
/// recognized qualifier. A sort token alone does not count.
pub fn parse_lenient(response: &str) -> Option<QuerySpec> {
    response
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .map(|line| parse_line(strip_label(&clean_line(line)), UnknownTokens::Drop))
        .filter(|(_, recognized)| *recognized > 0)
        .fold(None, |best: Option<(QuerySpec, usize)>, candidate| match best {
            Some(best) if best.1 >= candidate.1 => Some(best),
            _ => Some(candidate),
        })
        .map(|(spec, _)| spec)
}

/// Parses user-supplied provider syntax. Never fails: tokens that are not
/// valid qualifiers are kept as free-text terms.
pub fn parse_raw(text: &str) -> QuerySpec {
    let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let (mut spec, _) = parse_line(&joined, UnknownTokens::KeepAsTerm);
    if spec.is_empty() {
        spec.terms.push(text.trim().to_string());
    }
    spec
}

fn clean_line(line: &str) -> String {
    let line = line.replace('`', "");
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line);
    let line = strip_numbering(line);
    let line = line.trim();

    if line.len() >= 2
        && ((line.starts_with('"') && line.ends_with('"'))
            || (line.starts_with('\'') && line.ends_with('\'')))
    {
        line[1..line.len() - 1].trim().to_string()
    } else {
        line.to_string()
    }
}

fn strip_numbering(line: &str) -> &str {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(". ") {
            return rest;
        }
    }
    line
}

/// Drops a leading `Label: ` prefix. Qualifiers never contain `": "`, so
/// everything before its last occurrence is prose.
fn strip_label(line: &str) -> &str {
    match line.rfind(": ") {
        Some(idx) => line[idx + 2..].trim(),
        None => line,
    }
}

/// Parses one line, returning the spec and the number of recognized
/// qualifiers.
fn parse_line(line: &str, unknown: UnknownTokens) -> (QuerySpec, usize) {
    let mut spec = QuerySpec::new();
    let mut recognized = 0;

    for token in tokenize(line) {
        if let Some((key, value)) = split_key_value(&token) {
            if key.eq_ignore_ascii_case("sort") {
                if let Some((sort, order)) = parse_sort(value) {
                    spec.sort = Some(sort);
                    spec.order = order;
                    continue;
                }
            } else if let Ok(qualifier) = token.parse::<Qualifier>() {
                spec.push_qualifier(qualifier);
                recognized += 1;
                continue;
            }

            if unknown == UnknownTokens::KeepAsTerm {
                spec.terms.push(token);
            }
            continue;
        }

        let term = token.trim_matches('"');
        if term.chars().any(char::is_alphanumeric) {
            spec.terms.push(term.to_string());
        }
    }

    (spec, recognized)
}

/// Splits on whitespace outside double quotes.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                current.push(ch);
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Recognizes `key:value` tokens whose key looks like a qualifier name.
fn split_key_value(token: &str) -> Option<(&str, &str)> {
    let (key, value) = token.split_once(':')?;
    let looks_like_key =
        !key.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic() || c == '-');
    (looks_like_key && !value.is_empty()).then_some((key, value))
}

/// Parses `stars`, `stars-desc`, `updated-asc`, ...
fn parse_sort(value: &str) -> Option<(SortField, SortOrder)> {
    let value = value.to_ascii_lowercase();
    let (field, order) = if let Some(field) = value.strip_suffix("-asc") {
        (field, SortOrder::Asc)
    } else if let Some(field) = value.strip_suffix("-desc") {
        (field, SortOrder::Desc)
    } else {
        (value.as_str(), SortOrder::Desc)
    };
    field.parse().ok().map(|sort| (sort, order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::RangeExpr;

    #[test]
    fn parses_clean_response() {
        let spec =
            parse_lenient("language:python topic:machine-learning created:>2025-01-01").unwrap();

        assert_eq!(spec.qualifiers.len(), 3);
        assert!(spec.terms.is_empty());
        assert!(spec.has_language());
    }

    #[test]
    fn tolerates_fences_labels_and_prose() {
        let response = "Sure! Here is the query you asked for.\n\n\
                        ```\nSearch Query: `language:rust stars:>1000 web framework`\n```\n\
                        Let me know if you need more.";
        let spec = parse_lenient(response).unwrap();

        assert_eq!(
            spec.to_query_string(),
            "web framework language:rust stars:>1000"
        );
    }

    #[test]
    fn picks_line_with_most_qualifiers() {
        let response = "Try language:go\nBetter: language:go stars:>50 topic:cli";
        let spec = parse_lenient(response).unwrap();

        assert_eq!(spec.qualifiers.len(), 3);
    }

    #[test]
    fn drops_unknown_and_invalid_tokens() {
        let spec = parse_lenient("language:js color:blue stars:lots forks:>5").unwrap();

        assert_eq!(spec.to_query_string(), "language:js forks:>5");
    }

    #[test]
    fn reads_sort_token() {
        let spec = parse_lenient("language:rust sort:updated-asc").unwrap();

        assert_eq!(spec.sort, Some(SortField::Updated));
        assert_eq!(spec.order, SortOrder::Asc);
        assert_eq!(spec.to_query_string(), "language:rust");
    }

    #[test]
    fn sort_alone_is_not_a_query() {
        assert!(parse_lenient("sort:stars").is_none());
        assert!(parse_lenient("Query: `sort:updated-desc`").is_none());
    }

    #[test]
    fn no_qualifiers_means_absent() {
        assert!(parse_lenient("I'm not sure what you mean.").is_none());
        assert!(parse_lenient("").is_none());
    }

    #[test]
    fn keeps_quoted_values_together() {
        let spec = parse_lenient("topic:\"machine learning\" stars:>10").unwrap();

        assert_eq!(
            spec.qualifiers[0],
            Qualifier::Topic("machine learning".to_string())
        );
        assert_eq!(spec.qualifiers[1], Qualifier::Stars(RangeExpr::GreaterThan(10)));
    }

    #[test]
    fn raw_keeps_unrecognized_tokens_as_terms() {
        let spec = parse_raw("tokio color:blue   stars:>10");

        assert_eq!(spec.terms, vec!["tokio", "color:blue"]);
        assert_eq!(spec.qualifiers, vec![Qualifier::Stars(RangeExpr::GreaterThan(10))]);
    }
}
