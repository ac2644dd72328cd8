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
//! Typed random fetch: draw random items from a collection until one
//! resolves to an accepted media type. Collections can contain anything,
//! so the loop is capped rather than left to spin on a collection that
//! never produces something postable.

use async_trait::async_trait;
use tracing::{debug, trace, warn};

use crate::error::Fault;

/// How many random draws we make before giving up on a collection.
pub const MAX_FETCH_ATTEMPTS: u32 = 10;

/// File suffixes the bot is willing to embed as images.
pub const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".png", ".gif", ".gifv"];

/// One random draw from a collection. The collection API does not report
/// a usable content type; that is resolved separately against `url`.
#[derive(Debug, Clone)]
pub struct CollectionItem {
    pub url: String,
    pub title: Option<String>,
}

/// A draw whose content type has been resolved and accepted.
#[derive(Debug, Clone)]
pub struct RemoteItem {
    pub url: String,
    pub content_type: String,
    pub title: Option<String>,
}

/// Hands out random items from a named collection.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn random_item(&self, collection: &str) -> Result<CollectionItem, Fault>;
}

/// Resolves the content type of an item URL, HEAD-style.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn content_type(&self, url: &str) -> Result<String, Fault>;
}

/// Maps a MIME type to the file suffix used for acceptance checks.
/// `image/jpeg` is the one subtype whose conventional suffix differs
/// from its MIME spelling.
fn suffix_for(content_type: &str) -> String {
    let subtype = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .rsplit('/')
        .next()
        .unwrap_or(content_type)
        .trim();
    match subtype {
        "jpeg" => ".jpg".to_string(),
        other => format!(".{other}"),
    }
}

/// Draws from `collection` until an item's resolved type maps into
/// `accepted`, up to `max_attempts` draws. A failing request propagates
/// immediately; only type rejections trigger another draw.
pub async fn fetch_typed_random(
    source: &dyn ContentSource,
    probe: &dyn MediaProbe,
    collection: &str,
    accepted: &[&str],
    max_attempts: u32,
) -> Result<RemoteItem, Fault> {
    trace!(collection, max_attempts, "starting typed random fetch");
    for attempt in 1..=max_attempts {
        let item = source.random_item(collection).await?;
        let content_type = probe.content_type(&item.url).await?;
        let suffix = suffix_for(&content_type);
        if accepted.contains(&suffix.as_str()) {
            debug!(collection, attempt, %content_type, "accepted item");
            return Ok(RemoteItem {
                url: item.url,
                content_type,
                title: item.title,
            });
        }
        debug!(collection, attempt, %content_type, "rejected item, drawing again");
    }
    warn!(
        collection,
        max_attempts, "collection never produced an acceptable item"
    );
    Err(Fault::NoAcceptableItemFound {
        collection: collection.to_string(),
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Always hands out the same item, counting draws.
    struct SingleItemSource {
        item: CollectionItem,
        draws: AtomicU32,
    }

    impl SingleItemSource {
        fn new(url: &str) -> Self {
            Self {
                item: CollectionItem {
                    url: url.to_string(),
                    title: Some("a title".to_string()),
                },
                draws: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentSource for SingleItemSource {
        async fn random_item(&self, _collection: &str) -> Result<CollectionItem, Fault> {
            self.draws.fetch_add(1, Ordering::SeqCst);
            Ok(self.item.clone())
        }
    }

    /// Hands out a scripted sequence of items.
    struct SequenceSource {
        items: Mutex<VecDeque<CollectionItem>>,
    }

    impl SequenceSource {
        fn new(urls: &[&str]) -> Self {
            Self {
                items: Mutex::new(
                    urls.iter()
                        .map(|url| CollectionItem {
                            url: (*url).to_string(),
                            title: None,
                        })
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl ContentSource for SequenceSource {
        async fn random_item(&self, _collection: &str) -> Result<CollectionItem, Fault> {
            self.items
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Fault::UpstreamUnavailable("script exhausted".to_string()))
        }
    }

    /// Fails every draw the way a missing collection does.
    struct MissingCollectionSource {
        draws: AtomicU32,
    }

    #[async_trait]
    impl ContentSource for MissingCollectionSource {
        async fn random_item(&self, collection: &str) -> Result<CollectionItem, Fault> {
            self.draws.fetch_add(1, Ordering::SeqCst);
            Err(Fault::CollectionNotFound(collection.to_string()))
        }
    }

    /// Resolves content types from the URL suffix, like a static file host.
    struct ExtensionProbe;

    #[async_trait]
    impl MediaProbe for ExtensionProbe {
        async fn content_type(&self, url: &str) -> Result<String, Fault> {
            let content_type = if url.ends_with(".png") {
                "image/png"
            } else if url.ends_with(".jpg") {
                "image/jpeg"
            } else if url.ends_with(".gif") {
                "image/gif"
            } else {
                "text/html; charset=utf-8"
            };
            Ok(content_type.to_string())
        }
    }

    #[test]
    fn suffix_mapping() {
        assert_eq!(suffix_for("image/png"), ".png");
        assert_eq!(suffix_for("image/jpeg"), ".jpg");
        assert_eq!(suffix_for("image/jpeg; charset=utf-8"), ".jpg");
        assert_eq!(suffix_for("text/html"), ".html");
    }

    #[tokio::test]
    async fn accepts_first_matching_item() {
        let source = SingleItemSource::new("https://cdn.example/a.png");
        let item = fetch_typed_random(
            &source,
            &ExtensionProbe,
            "pics",
            IMAGE_SUFFIXES,
            MAX_FETCH_ATTEMPTS,
        )
        .await
        .unwrap();
        assert_eq!(item.content_type, "image/png");
        assert_eq!(item.title.as_deref(), Some("a title"));
        assert_eq!(source.draws.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn keeps_drawing_past_rejected_items() {
        let source = SequenceSource::new(&[
            "https://cdn.example/page.html",
            "https://cdn.example/clip.html",
            "https://cdn.example/b.jpg",
        ]);
        let item = fetch_typed_random(
            &source,
            &ExtensionProbe,
            "pics",
            IMAGE_SUFFIXES,
            MAX_FETCH_ATTEMPTS,
        )
        .await
        .unwrap();
        assert_eq!(item.url, "https://cdn.example/b.jpg");
        assert_eq!(item.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn adversarial_collection_is_bounded() {
        let source = SingleItemSource::new("https://cdn.example/page.html");
        let err = fetch_typed_random(
            &source,
            &ExtensionProbe,
            "textonly",
            IMAGE_SUFFIXES,
            MAX_FETCH_ATTEMPTS,
        )
        .await
        .unwrap_err();
        match err {
            Fault::NoAcceptableItemFound {
                collection,
                attempts,
            } => {
                assert_eq!(collection, "textonly");
                assert_eq!(attempts, MAX_FETCH_ATTEMPTS);
            }
            other => panic!("unexpected fault: {other}"),
        }
        assert_eq!(source.draws.load(Ordering::SeqCst), MAX_FETCH_ATTEMPTS);
    }

    #[tokio::test]
    async fn upstream_failure_propagates_without_retry() {
        let source = MissingCollectionSource {
            draws: AtomicU32::new(0),
        };
        let err = fetch_typed_random(
            &source,
            &ExtensionProbe,
            "ghosts",
            IMAGE_SUFFIXES,
            MAX_FETCH_ATTEMPTS,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Fault::CollectionNotFound(name) if name == "ghosts"));
        assert_eq!(source.draws.load(Ordering::SeqCst), 1);
    }
}
