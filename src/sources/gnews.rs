//! [GNews](https://gnews.io) search API.
//!
//! `GET https://gnews.io/api/v4/search?q=..&from=..&to=..&apikey=..` returns
//! `{"totalArticles": N, "articles": [{"title", "description", "url", ..}]}`.
//! The API rejects requests without a key, so a missing key is reported
//! without contacting it.

use super::SourceConfig;
use std::collections::BTreeMap;

pub const NAME: &str = "GNews";
pub const ENDPOINT: &str = "https://gnews.io/api/v4/search";

pub fn preset() -> SourceConfig {
    SourceConfig {
        name: NAME.into(),
        endpoint: Some(ENDPOINT.into()),
        query_param: "q".into(),
        from_param: "from".into(),
        to_param: "to".into(),
        key_param: Some("apikey".into()),
        api_key: None,
        api_key_env: Some("GNEWS_API_KEY".into()),
        key_required: true,
        extra_params: BTreeMap::from([
            ("lang".to_string(), "en".to_string()),
            ("max".to_string(), "10".to_string()),
        ]),
        count_pointer: "/totalArticles".into(),
        articles_pointer: Some("/articles".into()),
    }
}

/// Public search page for a term, used for manual quick-check links.
pub fn search_page(term: &str) -> String {
    format!("https://gnews.io/?q={}", urlencoding::encode(term))
}
