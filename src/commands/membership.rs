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
use chrono::{NaiveDateTime, Utc};
use poise::serenity_prelude::{ChannelId, GuildId, Http, RoleId, UserId};
use tracing::{info, warn};

use crate::error::Fault;
use crate::ledger::{self, classify, MembershipRecord, RoleSync, Snapshot};
use crate::{Context, Data, Error};

/// "now" in the ledger's timezone. Sheet dates are local dates, so the
/// day math has to happen in local time.
fn ledger_now(data: &Data) -> NaiveDateTime {
    Utc::now().with_timezone(&data.config.timezone).naive_local()
}

async fn fresh_snapshot(data: &Data) -> Result<Snapshot, Fault> {
    let ledger = &data.config.ledger;
    data.storage
        .load_snapshot(&ledger.sheet_path, ledger.header_offset)
        .await
}

async fn caller_is_lifetime(ctx: &Context<'_>) -> bool {
    let role = RoleId::new(ctx.data().config.ledger.lifetime_role_id);
    match ctx.author_member().await {
        Some(member) => member.roles.contains(&role),
        None => false,
    }
}

/// Reports a member's standing from a fresh ledger snapshot.
#[poise::command(slash_command)]
pub async fn membership(
    ctx: Context<'_>,
    #[description = "Ledger name to look up (defaults to your display name)"] member: Option<
        String,
    >,
) -> Result<(), Error> {
    ctx.defer().await?;
    let data = ctx.data();
    let subject = member.unwrap_or_else(|| ctx.author().name.clone());
    info!(user = %ctx.author().name, subject, "membership command invoked");

    let privileged = caller_is_lifetime(&ctx).await;
    let snapshot = match fresh_snapshot(data).await {
        Ok(snapshot) => snapshot,
        Err(fault) => return super::report_fault(ctx, &subject, &fault).await,
    };
    let record = match snapshot
        .find(&subject)
        .map(MembershipRecord::from_row)
        .transpose()
    {
        Ok(record) => record,
        Err(fault) => return super::report_fault(ctx, &subject, &fault).await,
    };

    let status = classify(record.as_ref(), ledger_now(data), privileged);
    ctx.say(format!("{subject}: {}", status.describe())).await?;
    Ok(())
}

/// Applies role changes through the serenity HTTP client. Rows without a
/// platform id cannot be reconciled and are skipped with a warning.
struct SerenityRoleSync<'a> {
    http: &'a Http,
    guild: GuildId,
    member_role: RoleId,
    notify_channel: ChannelId,
}

impl SerenityRoleSync<'_> {
    fn user_id(record: &MembershipRecord) -> Option<UserId> {
        record
            .external_ref
            .as_deref()
            .and_then(|id| id.parse::<u64>().ok())
            .map(UserId::new)
    }
}

#[async_trait]
impl RoleSync for SerenityRoleSync<'_> {
    async fn grant(&self, record: &MembershipRecord) -> Result<(), Fault> {
        let Some(user) = Self::user_id(record) else {
            warn!(subject = %record.subject_id, "no platform id in ledger row, skipping grant");
            return Ok(());
        };
        self.http
            .add_member_role(self.guild, user, self.member_role, Some("ledger sweep: active"))
            .await
            .map_err(|e| Fault::UpstreamUnavailable(format!("role grant failed: {e}")))
    }

    async fn revoke(&self, record: &MembershipRecord) -> Result<(), Fault> {
        let Some(user) = Self::user_id(record) else {
            warn!(subject = %record.subject_id, "no platform id in ledger row, skipping revoke");
            return Ok(());
        };
        self.http
            .remove_member_role(
                self.guild,
                user,
                self.member_role,
                Some("ledger sweep: expired"),
            )
            .await
            .map_err(|e| Fault::UpstreamUnavailable(format!("role revoke failed: {e}")))
    }

    async fn notify_expired(
        &self,
        record: &MembershipRecord,
        days_since: i64,
    ) -> Result<(), Fault> {
        let message = format!(
            "{} lapsed {days_since} day(s) ago and lost the member role.",
            record.subject_id
        );
        self.notify_channel
            .say(self.http, message)
            .await
            .map(|_| ())
            .map_err(|e| Fault::UpstreamUnavailable(format!("expiry notice failed: {e}")))
    }
}

/// Reclassifies every ledger row and reconciles the member role.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_ROLES")]
pub async fn sweep(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let data = ctx.data();
    info!(user = %ctx.author().name, "sweep command invoked");

    let Some(guild) = ctx.guild_id() else {
        ctx.say("This command only works inside a server.").await?;
        return Ok(());
    };

    let snapshot = match fresh_snapshot(data).await {
        Ok(snapshot) => snapshot,
        Err(fault) => return super::report_fault(ctx, "sweep", &fault).await,
    };

    let ledger_cfg = &data.config.ledger;
    let roles = SerenityRoleSync {
        http: ctx.http(),
        guild,
        member_role: RoleId::new(ledger_cfg.member_role_id),
        notify_channel: ChannelId::new(ledger_cfg.notify_channel_id),
    };

    match ledger::sweep(&snapshot, ledger_now(data), &roles).await {
        Ok(report) => {
            ctx.say(report.summary()).await?;
            Ok(())
        }
        Err(fault) => super::report_fault(ctx, "sweep", &fault).await,
    }
}
