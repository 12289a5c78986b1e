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
use crate::brand::{self, Tone};
use crate::commands;
use crate::{Context, Error};
use serenity::all::UserId;
use poise::CreateReply;

/// Name shown for a voter, or a placeholder when Discord cannot resolve them.
async fn voter_name(ctx: Context<'_>, user_id: u64) -> String {
    let Some(id) = std::num::NonZeroU64::new(user_id).map(UserId::from) else {
        return format!("User {user_id}");
    };
    match id.to_user(ctx).await {
        Ok(user) => user.name,
        Err(err) => {
            tracing::debug!(user_id, error = %err, "could not resolve voter");
            format!("User {user_id}")
        }
    }
}

#[poise::command(
    slash_command,
    description_localized("en-US", "Show the top voters this month (global).")
)]
#[nitrovote::log_cmd]
pub async fn voteleaders(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let window = data.clock.current_month_now();

    let entries = match data
        .board
        .top_n(&window, data.settings.leaderboard_size())
        .await
    {
        Ok(entries) => entries,
        Err(err) => return commands::report_unreadable(ctx, err).await,
    };

    let description = if entries.is_empty() {
        "No votes recorded this month yet.".to_string()
    } else {
        let mut lines = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let name = voter_name(ctx, entry.user_id).await;
            let first_vote = data.clock.format(entry.first_vote_at, "%b %d, %I:%M %p %Z");
            lines.push(format!(
                "{} **{}** — **{}** _(first vote {})_",
                brand::medal(i + 1),
                name,
                entry.votes,
                first_vote
            ));
        }
        lines.join("\n")
    };

    let embed = data
        .brand
        .embed("Monthly Voting Leaderboard", description, Tone::Blue);
    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
