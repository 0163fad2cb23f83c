//! `[feed]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [feed]
//! url = "https://example.substack.com/feed"
//! section = "blog"                # Output: <public>/blog/_rendered/
//! default_creator = "Jane Doe"    # Used when an item has no author
//! timeout = 15                    # Seconds before the fetch is abandoned
//! max_redirects = 10
//! words_per_minute = 230          # Reading speed for the read-time estimate
//! user_agent = "folio"
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSectionConfig {
    /// Feed URL. Empty means "no feed configured": the index is written empty.
    pub url: String,
    /// Site section the posts are published under.
    pub section: String,
    /// Attribution when the item carries no creator.
    pub default_creator: String,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Maximum number of redirects followed.
    pub max_redirects: usize,
    /// Reading speed for the read-time estimate.
    pub words_per_minute: u32,
    /// `User-Agent` header sent with the request.
    pub user_agent: String,
}

impl Default for FeedSectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            section: "blog".into(),
            default_creator: "Anonymous".into(),
            timeout: 15,
            max_redirects: 10,
            words_per_minute: 230,
            user_agent: concat!("folio/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert!(config.feed.url.is_empty());
        assert_eq!(config.feed.section, "blog");
        assert_eq!(config.feed.timeout, 15);
        assert_eq!(config.feed.max_redirects, 10);
        assert_eq!(config.feed.words_per_minute, 230);
        assert!(config.feed.user_agent.starts_with("folio/"));
    }

    #[test]
    fn test_custom_config() {
        let config = test_parse_config(
            "[feed]\nurl = \"https://example.com/feed\"\ndefault_creator = \"Jane\"\ntimeout = 5",
        );
        assert_eq!(config.feed.url, "https://example.com/feed");
        assert_eq!(config.feed.default_creator, "Jane");
        assert_eq!(config.feed.timeout, 5);
    }
}
