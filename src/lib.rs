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
//! Library root so tests and external tooling can reach the internal
//! modules used by the `doorman` binary.

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetch;
pub mod ledger;

use crate::api::content::ContentClient;
use crate::api::quotes::QuoteClient;
use crate::api::storage::StorageClient;
use crate::config::Config;

/// Shared state handed to every command invocation by the framework.
/// Built once at startup; commands hold no other mutable state.
pub struct Data {
    pub config: Config,
    pub content: ContentClient,
    pub quotes: QuoteClient,
    pub storage: StorageClient,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
