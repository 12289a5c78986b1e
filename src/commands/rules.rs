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
    description_localized("en-US", "Official NitroVote rules and eligibility.")
)]
#[nitrovote::log_cmd]
pub async fn rules(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let description = format!(
        "• **Prizes:** **Top {winners} voters** each month receive **1 month of Discord Nitro**.\n\n\
        • **Eligibility:** You must log **≥ {min_votes} votes** during the month.\n\n\
        • **Tiebreaker:** If totals match, the user who reached that total **first** wins.\n\n\
        • **Timing:** Month boundaries use **{tz}** time.\n\n\
        • **Voting Cadence:** You may vote once **every 12 hours** via Veil's **/vote**.\n\n\
        • **Fair Play:** Fraud/alt/self-deal votes may be disqualified at our discretion.\n\n\
        _Not affiliated with or endorsed by Discord. \"Nitro\" is a trademark of Discord Inc._",
        winners = data.settings.winner_count(),
        min_votes = data.settings.min_votes(),
        tz = data.clock.tz().name(),
    );

    let embed = data.brand.embed("Rules", description, Tone::Cyan);
    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
