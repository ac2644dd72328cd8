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

use crate::fetch::{fetch_typed_random, IMAGE_SUFFIXES, MAX_FETCH_ATTEMPTS};
use crate::{Context, Error};

/// Posts a random image from a content collection.
#[poise::command(slash_command)]
pub async fn meme(
    ctx: Context<'_>,
    #[description = "Collection to draw from"] collection: Option<String>,
) -> Result<(), Error> {
    // Drawing can take several round trips; acknowledge first.
    ctx.defer().await?;
    let data = ctx.data();
    let collection =
        collection.unwrap_or_else(|| data.config.content.default_collection.clone());
    info!(user = %ctx.author().name, collection, "meme command invoked");

    match fetch_typed_random(
        &data.content,
        &data.content,
        &collection,
        IMAGE_SUFFIXES,
        MAX_FETCH_ATTEMPTS,
    )
    .await
    {
        Ok(item) => {
            let title = item
                .title
                .unwrap_or_else(|| format!("Random pick from {collection}"));
            let embed = CreateEmbed::new().title(title).image(item.url);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            Ok(())
        }
        Err(fault) => super::report_fault(ctx, &collection, &fault).await,
    }
}
