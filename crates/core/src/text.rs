use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<br\s*/?>|<[^>]*>").unwrap());

static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Convert rich-text HTML (as stored in Azure Boards) to plain text.
pub fn strip_html(input: &str) -> String {
    let text = TAG_RE.replace_all(input, |caps: &regex::Captures<'_>| {
        let tag = caps[0].to_ascii_lowercase();
        if tag.starts_with("<br") || matches!(tag.as_str(), "</p>" | "</div>" | "</li>") {
            "\n".to_string()
        } else {
            String::new()
        }
    });
    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    BLANK_RUN_RE
        .replace_all(decoded.trim(), "\n\n")
        .into_owned()
}

/// `refs/heads/feature/x` -> `feature/x`.
pub fn short_ref(name: &str) -> &str {
    name.strip_prefix("refs/heads/").unwrap_or(name)
}

pub fn format_date(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn format_datetime(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// `-` for blank values, otherwise the trimmed value.
pub fn or_dash(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "-".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Azure DevOps projections emit `null` for unset fields.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_html_drops_tags_and_decodes_entities() {
        let html = "<div>Steps:<br/>1. open &amp; click</div><p>2. see &lt;error&gt;</p>";
        assert_eq!(strip_html(html), "Steps:\n1. open & click\n2. see <error>");
    }

    #[test]
    fn strip_html_collapses_blank_runs() {
        assert_eq!(strip_html("a<br><br><br><br>b"), "a\n\nb");
    }

    #[test]
    fn short_ref_only_strips_heads_prefix() {
        assert_eq!(short_ref("refs/heads/feature/login"), "feature/login");
        assert_eq!(short_ref("refs/tags/v1"), "refs/tags/v1");
    }

    #[test]
    fn or_dash_handles_blank() {
        assert_eq!(or_dash("  "), "-");
        assert_eq!(or_dash(" x "), "x");
    }
}
