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
mod media;
mod membership;
mod quotes;

use tracing::error;

use crate::error::Fault;
use crate::{Context, Data, Error};

/// Liveness check.
#[poise::command(slash_command)]
async fn doorctl(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say("doorman is up and running.").await?;
    Ok(())
}

/// Every function that is defined *should* be added to the
/// returned vector in get_commands to ensure it is registered (available for the user)
/// when the bot goes online.
pub fn get_commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        doorctl(),
        media::meme(),
        quotes::qotd(),
        quotes::quote(),
        membership::membership(),
        membership::sweep(),
    ]
}

/// The one place a [`Fault`] becomes words. Logs the failure with the
/// command and subject it happened under, then tells the invoking user
/// who to escalate to. Never propagates, so one bad command cannot take
/// the gateway connection with it.
pub(crate) async fn report_fault(
    ctx: Context<'_>,
    subject: &str,
    fault: &Fault,
) -> Result<(), Error> {
    error!(
        command = %ctx.command().qualified_name,
        subject,
        %fault,
        "command failed"
    );
    ctx.say(fault.user_message(&ctx.data().config.escalation_contact))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Discord rejects slash-command descriptions over 100 characters, and
    // the command macro turns each doc comment into one.
    const DESCRIPTION_LIMIT: usize = 100;

    #[test]
    fn command_descriptions_fit_the_platform_limit() {
        for command in get_commands() {
            if let Some(description) = &command.description {
                assert!(
                    description.chars().count() <= DESCRIPTION_LIMIT,
                    "description of '{}' is {} chars, limit is {}",
                    command.name,
                    description.chars().count(),
                    DESCRIPTION_LIMIT
                );
            }
        }
    }
}
