use log::debug;

use super::{ProductHit, ProductSearch, SearchError, SearchResponse};
use crate::config::SearchConfig;

/// Product search over HTTP: `GET <endpoint>?q=<query>&per_page=<n>`.
pub struct HttpProductSearch {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpProductSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ProductSearch for HttpProductSearch {
    fn search(&self, query: &str, per_page: u32) -> Result<Vec<ProductHit>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let per_page = per_page.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("per_page", per_page.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }
        let body = response.text()?;
        debug!("Search response: {} bytes", body.len());
        parse_response(&body)
    }
}

pub fn parse_response(body: &str) -> Result<Vec<ProductHit>, SearchError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response.into_hits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_makes_no_request() {
        let config = SearchConfig {
            // Nothing listens here; a request would fail
            endpoint: "http://127.0.0.1:9/search".into(),
            ..SearchConfig::default()
        };
        let search = HttpProductSearch::new(&config).unwrap();
        assert!(search.search("   ", 20).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(parse_response("{\"error\": 1}"), Err(SearchError::Payload(_))));
    }
}
