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
use crate::{Context, Error};
use poise::CreateReply;

#[poise::command(slash_command, description_localized("en-US", "List NitroVote commands."))]
#[nitrovote::log_cmd]
pub async fn cmds(ctx: Context<'_>) -> Result<(), Error> {
    let embed = ctx
        .data()
        .brand
        .embed("Commands", "Everything NitroVote can do:", Tone::Cyan)
        .field("/myvotes", "Show your votes this month", false)
        .field("/voteleaders", "Top voters this month (global)", false)
        .field("/rules", "Rewards & qualification rules", false)
        .field("/about", "What NitroVote is and how to play", false);
    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
