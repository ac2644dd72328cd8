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
//! Configuration is one explicit value loaded at startup and passed into
//! the framework data, not module-global state.

use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord_token: String,
    /// Ledger dates are local dates in this timezone.
    #[serde(default = "default_timezone")]
    pub timezone: chrono_tz::Tz,
    /// Who users are told to ping when a command fails.
    pub escalation_contact: String,
    pub content: ContentConfig,
    pub quotes: QuotesConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_content_base")]
    pub base_url: String,
    pub default_collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotesConfig {
    #[serde(default = "default_quotes_base")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_storage_base")]
    pub storage_base_url: String,
    pub storage_token: String,
    /// Path of the sheet export inside cloud storage.
    pub sheet_path: String,
    /// Leading rows of the export that are headers, not records.
    #[serde(default = "default_header_offset")]
    pub header_offset: usize,
    pub member_role_id: u64,
    /// Holding this role counts as the privileged lifetime marker.
    pub lifetime_role_id: u64,
    pub notify_channel_id: u64,
}

fn default_timezone() -> chrono_tz::Tz {
    chrono_tz::UTC
}

fn default_content_base() -> String {
    "https://www.reddit.com".to_string()
}

fn default_quotes_base() -> String {
    "https://zenquotes.io/api".to_string()
}

fn default_storage_base() -> String {
    "https://content.dropboxapi.com".to_string()
}

fn default_header_offset() -> usize {
    1
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let config: Config = toml::from_str(
            r#"
            discord_token = "token"
            timezone = "Asia/Kolkata"
            escalation_contact = "@modmail"

            [content]
            default_collection = "memes"

            [quotes]

            [ledger]
            storage_token = "dbx-token"
            sheet_path = "/members.csv"
            member_role_id = 1
            lifetime_role_id = 2
            notify_channel_id = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.timezone, chrono_tz::Asia::Kolkata);
        assert_eq!(config.content.base_url, "https://www.reddit.com");
        assert_eq!(config.quotes.base_url, "https://zenquotes.io/api");
        assert_eq!(config.ledger.header_offset, 1);
        assert_eq!(
            config.ledger.storage_base_url,
            "https://content.dropboxapi.com"
        );
    }
}
