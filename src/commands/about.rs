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

#[poise::command(
    slash_command,
    description_localized("en-US", "What NitroVote is and how to participate.")
)]
#[nitrovote::log_cmd]
pub async fn about(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let description = format!(
        "**What is NitroVote?**\n\
        NitroVote is a monthly voting game for **Veil** (<@{veil}>) on top.gg.\n\n\
        **How to play**\n\
        • Type **`/vote`** on Veil bot to open the vote link.\n\
        • You can vote **every 12 hours**.\n\
        • Track your progress with **`/myvotes`** and see standings with **`/voteleaders`**.\n\n\
        _See **/rules** for eligibility and prize details._",
        veil = data.settings.veil_bot_id(),
    );

    let embed = data.brand.embed("About NitroVote", description, Tone::Purple);
    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
