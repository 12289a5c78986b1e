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
use crate::ranking::RankError;
use crate::utils::reply_private;
use crate::{Context, Error};

pub mod about;
pub mod cmds;
pub mod license;
pub mod myvotes;
pub mod rules;
pub mod voteleaders;
pub mod winners;

/**
 * Tells the user the vote records could not be read. Store failures must never look like an
 * empty month.
 */
pub(crate) async fn report_unreadable(ctx: Context<'_>, err: RankError) -> Result<(), Error> {
    tracing::error!(error = %err, command = %ctx.command().qualified_name, "could not read votes");
    reply_private!(
        ctx,
        "I couldn't read the vote records right now. Please try again in a moment."
    )
    .await?;

    Ok(())
}
