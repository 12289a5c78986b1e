/*
 *  NitroVote - Discord bot tracking monthly Veil votes and Nitro rewards.
 *  Copyright (C) 2025  NitroVote contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::announce;
use crate::brand::{self, Tone};
use crate::commands;
use crate::utils::reply_private;
use crate::{Context, Error};
use serenity::all::{
    ChannelId, CreateEmbedFooter, CreateMessage, Guild, GuildChannel, Mentionable, Permissions,
};

/**
 * Channel chosen by the configured picker, among the text channels the bot can post in.
 */
async fn pick_channel(ctx: Context<'_>) -> Result<Option<ChannelId>, Error> {
    // The cache guard must not be held across the await below.
    let Some(guild) = ctx.guild().map(|guild| Guild::clone(&guild)) else {
        return Ok(None);
    };
    let bot_id = ctx.cache().current_user().id;
    let me = guild.member(ctx, bot_id).await?;

    let channels = announce::text_channels(&guild, &me);
    Ok(ctx
        .data()
        .picker
        .pick(&channels, guild.system_channel_id)
        .map(|channel| channel.id))
}

fn is_forbidden(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Http(http) => http.status_code().is_some_and(|s| s.as_u16() == 403),
        _ => false,
    }
}

#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MANAGE_GUILD",
    description_localized("en-US", "(Admin) Post last month's winners.")
)]
#[nitrovote::log_cmd]
pub async fn winners(
    ctx: Context<'_>,
    #[description = "Channel to post in (optional)"] channel: Option<GuildChannel>,
) -> Result<(), Error> {
    // Default permissions can be overridden by server admins, so check again:
    let permissions = ctx
        .author_member()
        .await
        .and_then(|member| member.permissions)
        .unwrap_or_else(Permissions::empty);
    if !ctx.data().policy.may_announce(permissions) {
        reply_private!(ctx, "You need **Manage Server** to run this.").await?;
        return Ok(());
    }

    let data = ctx.data();
    let window = data.clock.previous_month_now();
    let month = data.clock.label(&window, "%B %Y");

    // Winners are global, not per guild.
    let winners = match data
        .board
        .winners(
            &window,
            data.settings.min_votes(),
            data.settings.winner_count(),
        )
        .await
    {
        Ok(winners) => winners,
        Err(err) => return commands::report_unreadable(ctx, err).await,
    };

    if winners.is_empty() {
        reply_private!(ctx, "No eligible winners for **{month}**.").await?;
        return Ok(());
    }

    let lines: Vec<String> = winners
        .iter()
        .map(|w| {
            format!(
                "{} <@{}> — **{}** votes",
                brand::medal(w.place),
                w.user_id,
                w.votes
            )
        })
        .collect();
    let embed = data
        .brand
        .embed(
            format!("NitroVote Winners — {month}"),
            lines.join("\n"),
            Tone::Gold,
        )
        .footer(CreateEmbedFooter::new(format!(
            "Top {} win Nitro • Ties broken by who reached the total first • {}",
            data.settings.winner_count(),
            data.clock.tz().name()
        )));

    let target = match channel {
        Some(channel) => Some(channel.id),
        None => pick_channel(ctx).await?,
    };
    let Some(target) = target else {
        reply_private!(
            ctx,
            "I couldn't find a channel I can post in. Please pass a channel like `/winners #general`."
        )
        .await?;
        return Ok(());
    };

    match target
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await
    {
        Ok(_) => {
            tracing::info!(%month, channel = %target, winners = winners.len(), "posted winners");
            ctx.say(format!("Posted winners in {}.", target.mention()))
                .await?;
        }
        Err(err) if is_forbidden(&err) => {
            tracing::warn!(channel = %target, "not allowed to post winners");
            reply_private!(
                ctx,
                "I don't have permission to send messages in {}.",
                target.mention()
            )
            .await?;
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
