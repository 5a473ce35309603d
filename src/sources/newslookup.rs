//! NewsLookup search API.
//!
//! There is no well-known public endpoint for this service, so the preset
//! carries none: set `NEWSLOOKUP_ENDPOINT`, `--newslookup-endpoint`, or an
//! `endpoint:` in the YAML file. Responses are expected in the common
//! `{"totalResults": N, "articles": [..]}` layout; override `count_pointer`
//! and `articles_pointer` in the YAML file for a different layout.

use super::SourceConfig;
use std::collections::BTreeMap;

pub const NAME: &str = "NewsLookup";

pub fn preset() -> SourceConfig {
    SourceConfig {
        name: NAME.into(),
        endpoint: None,
        query_param: "q".into(),
        from_param: "from".into(),
        to_param: "to".into(),
        key_param: Some("apiKey".into()),
        api_key: None,
        api_key_env: Some("NEWSLOOKUP_API_KEY".into()),
        key_required: false,
        extra_params: BTreeMap::new(),
        count_pointer: "/totalResults".into(),
        articles_pointer: Some("/articles".into()),
    }
}
