//! Text helpers shared by the feed parser and normalization.

/// URL utilities
pub mod url {
    use url::Url;

    /// Extract domain from URL
    pub fn extract_domain(url_str: &str) -> Option<String> {
        Url::parse(url_str).ok()?.domain().map(|d| d.to_string())
    }

    /// True for absolute http(s) URLs with a host.
    pub fn is_resolvable(url_str: &str) -> bool {
        match Url::parse(url_str) {
            Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
            Err(_) => false,
        }
    }
}

/// Feed text utilities
pub mod feed {
    use scraper::Html;

    pub const WORDS_PER_MINUTE: usize = 200;

    /// Extract clean text content from HTML, decoding entities
    pub fn extract_text_from_html(html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        // keep words on either side of a tag apart
        fragment
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Estimate reading time based on content length, never less than a minute
    pub fn estimate_reading_time_minutes(content: &str) -> i32 {
        let word_count = content.split_whitespace().count();
        (word_count.div_ceil(WORDS_PER_MINUTE) as i32).max(1)
    }
}
