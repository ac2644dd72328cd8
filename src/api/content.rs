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
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::error::{upstream, Fault};
use crate::fetch::{CollectionItem, ContentSource, MediaProbe};

/// Client for the content API's random-item-per-collection endpoint. The
/// same client doubles as the media probe, since resolving an item's
/// content type is a plain HEAD against its URL.
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    url: String,
    title: Option<String>,
}

impl ContentClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl ContentSource for ContentClient {
    async fn random_item(&self, collection: &str) -> Result<CollectionItem, Fault> {
        let url = format!("{}/r/{}/random.json", self.base_url, collection);
        let response = self.http.get(&url).send().await.map_err(upstream)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Fault::CollectionNotFound(collection.to_string()));
        }
        if !response.status().is_success() {
            return Err(Fault::UpstreamUnavailable(format!(
                "content API returned {}",
                response.status()
            )));
        }
        // The random endpoint wraps the item in a one-element listing array.
        let listings: Vec<Listing> = response.json().await.map_err(upstream)?;
        let post = listings
            .into_iter()
            .next()
            .and_then(|listing| listing.data.children.into_iter().next())
            .map(|child| child.data)
            .ok_or_else(|| Fault::CollectionNotFound(collection.to_string()))?;
        debug!(collection, url = %post.url, "drew random item");
        Ok(CollectionItem {
            url: post.url,
            title: post.title,
        })
    }
}

#[async_trait]
impl MediaProbe for ContentClient {
    async fn content_type(&self, url: &str) -> Result<String, Fault> {
        let response = self.http.head(url).send().await.map_err(upstream)?;
        if !response.status().is_success() {
            return Err(Fault::UpstreamUnavailable(format!(
                "HEAD {} returned {}",
                url,
                response.status()
            )));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_shape_deserializes() {
        let body = r#"[{"data": {"children": [{"data": {
            "url": "https://i.example/x.png",
            "title": "a post",
            "score": 12
        }}]}}]"#;
        let listings: Vec<Listing> = serde_json::from_str(body).unwrap();
        let post = &listings[0].data.children[0].data;
        assert_eq!(post.url, "https://i.example/x.png");
        assert_eq!(post.title.as_deref(), Some("a post"));
    }

    #[test]
    fn empty_listing_means_no_collection() {
        let listings: Vec<Listing> = serde_json::from_str(r#"[{"data": {"children": []}}]"#).unwrap();
        assert!(listings
            .into_iter()
            .next()
            .and_then(|listing| listing.data.children.into_iter().next())
            .is_none());
    }
}
