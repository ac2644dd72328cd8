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
use serde_json::json;
use tracing::debug;

use crate::error::{upstream, Fault};
use crate::ledger::Snapshot;

/// Downloads files from the cloud-storage content endpoint. Token refresh
/// happens out of band; the token is assumed valid when a call is made.
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl StorageClient {
    pub fn new(http: reqwest::Client, base_url: String, token: String) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    pub async fn download(&self, path: &str) -> Result<Vec<u8>, Fault> {
        let url = format!("{}/2/files/download", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Dropbox-API-Arg", json!({ "path": path }).to_string())
            .send()
            .await
            .map_err(upstream)?;
        if !response.status().is_success() {
            return Err(Fault::UpstreamUnavailable(format!(
                "storage download of {} returned {}",
                path,
                response.status()
            )));
        }
        let bytes = response.bytes().await.map_err(upstream)?;
        debug!(path, len = bytes.len(), "downloaded ledger export");
        Ok(bytes.to_vec())
    }

    /// One fresh, parsed ledger snapshot. Fetched per invocation; nothing
    /// is cached.
    pub async fn load_snapshot(
        &self,
        path: &str,
        header_offset: usize,
    ) -> Result<Snapshot, Fault> {
        let bytes = self.download(path).await?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(Snapshot::parse(&text, header_offset))
    }
}
