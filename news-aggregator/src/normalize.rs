use crate::rss_utils::feed::{estimate_reading_time_minutes, extract_text_from_html};
use crate::types::{NewArticle, RawItem};
use chrono::{DateTime, Utc};
use interfaces::{SourceName, DEFAULT_AUTHOR, DEFAULT_TITLE};

/// Maps a source-native item onto the stored record shape.
///
/// `default_categories` is used only when the item carries none of its own.
/// A missing publish time falls back to `now`.
pub fn normalize(
    raw: RawItem,
    source_name: SourceName,
    default_categories: &[String],
    now: DateTime<Utc>,
) -> NewArticle {
    let title = non_empty(raw.title).unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let summary = non_empty(raw.summary).unwrap_or_default();
    let body = non_empty(raw.body);

    let reading_text = match &body {
        Some(body) => extract_text_from_html(body),
        None if !summary.is_empty() => summary.clone(),
        None => title.clone(),
    };
    let estimated_read_minutes = estimate_reading_time_minutes(&reading_text);

    let categories = if raw.categories.is_empty() {
        default_categories.to_vec()
    } else {
        raw.categories
    };

    NewArticle {
        title,
        summary,
        body,
        source_url: raw.url,
        published_at: raw.published_at.unwrap_or(now),
        author: non_empty(raw.author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        categories,
        guid: raw.guid,
        external_id: raw.external_id,
        source_name,
        popularity_score: raw.popularity.unwrap_or(0),
        estimated_read_minutes,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
