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
use poise::serenity_prelude::CreateEmbed;
use tracing::info;

use crate::api::quotes::Quote;
use crate::{Context, Error};

/// Posts the quote of the day.
#[poise::command(slash_command)]
pub async fn qotd(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    info!(user = %ctx.author().name, "qotd command invoked");
    match ctx.data().quotes.quote_of_day().await {
        Ok(quote) => send_quote(ctx, "Quote of the day", &quote).await,
        Err(fault) => super::report_fault(ctx, "qotd", &fault).await,
    }
}

/// Posts a random quote.
#[poise::command(slash_command)]
pub async fn quote(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    info!(user = %ctx.author().name, "quote command invoked");
    match ctx.data().quotes.random_quote().await {
        Ok(quote) => send_quote(ctx, "Random quote", &quote).await,
        Err(fault) => super::report_fault(ctx, "quote", &fault).await,
    }
}

async fn send_quote(ctx: Context<'_>, title: &str, quote: &Quote) -> Result<(), Error> {
    let embed = CreateEmbed::new()
        .title(title.to_string())
        .description(format!("\"{}\"\n\n~ {}", quote.text, quote.author));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
