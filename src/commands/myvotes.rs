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
use crate::brand::Tone;
use crate::commands;
use crate::{Context, Error};
use poise::CreateReply;

#[poise::command(
    slash_command,
    description_localized("en-US", "See how many votes you have this month.")
)]
#[nitrovote::log_cmd]
pub async fn myvotes(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let window = data.clock.current_month_now();
    // Name the month the query actually covers, in the anchor zone.
    let month = data.clock.label(&window, "%B");

    let votes = match data.board.votes_for(ctx.author().id.get(), &window).await {
        Ok(votes) => votes,
        Err(err) => return commands::report_unreadable(ctx, err).await,
    };

    let min_votes = data.settings.min_votes();
    let (tone, tip) = if votes >= min_votes {
        (
            Tone::Gold,
            "You're qualified for rewards this month! 🎉".to_string(),
        )
    } else {
        (
            Tone::Pink,
            format!("Need **{}** more votes to qualify.", min_votes - votes),
        )
    };

    let embed = data.brand.embed(
        format!("{}'s Votes in {}", ctx.author().display_name(), month),
        format!("**{votes}** votes so far.\n\n{tip}"),
        tone,
    );
    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
