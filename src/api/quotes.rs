/*
Doorman: a membership and media bot for a community Discord server.
Copyright (C) 2024 Doorman Contributors

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
use serde::Deserialize;

use crate::error::{upstream, Fault};

/// One quote as the quote API returns it: a single-element array of
/// `{"q": text, "a": author}` objects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Quote {
    #[serde(rename = "q")]
    pub text: String,
    #[serde(rename = "a")]
    pub author: String,
}

#[derive(Debug, Clone)]
pub struct QuoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl QuoteClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    pub async fn quote_of_day(&self) -> Result<Quote, Fault> {
        self.fetch("today").await
    }

    pub async fn random_quote(&self) -> Result<Quote, Fault> {
        self.fetch("random").await
    }

    async fn fetch(&self, endpoint: &str) -> Result<Quote, Fault> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.http.get(&url).send().await.map_err(upstream)?;
        if !response.status().is_success() {
            return Err(Fault::UpstreamUnavailable(format!(
                "quote API returned {}",
                response.status()
            )));
        }
        let quotes: Vec<Quote> = response.json().await.map_err(upstream)?;
        quotes.into_iter().next().ok_or_else(|| {
            Fault::UpstreamUnavailable("quote API returned an empty list".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_shape_deserializes() {
        let body = r#"[{"q": "Stay hungry.", "a": "Someone", "h": "<blockquote>...</blockquote>"}]"#;
        let quotes: Vec<Quote> = serde_json::from_str(body).unwrap();
        assert_eq!(
            quotes[0],
            Quote {
                text: "Stay hungry.".to_string(),
                author: "Someone".to_string(),
            }
        );
    }
}
