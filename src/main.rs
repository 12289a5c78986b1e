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
mod announce;
mod brand;
mod clock;
mod commands;
mod ranking;
mod store;
mod utils;

use crate::announce::{AnnouncePolicy, ChannelPicker, MainChatPicker, ManagersOnly};
use crate::brand::Brand;
use crate::clock::MonthClock;
use crate::ranking::VoteBoard;
use crate::store::PgVoteStore;
use crate::utils::{reply_private, Settings};
use serenity::all::{ClientBuilder, Context as SerenityContext, FullEvent, GatewayIntents};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/* Poise-required data types: */

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// State shared by every command invocation.
pub struct Data {
    settings: Settings,
    clock: MonthClock,
    board: VoteBoard,
    brand: Brand,
    picker: Box<dyn ChannelPicker>,
    policy: Box<dyn AnnouncePolicy>,
}

async fn event_handler(
    _ctx: &SerenityContext,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    _data: &Data,
) -> Result<(), Error> {
    match event {
        // Ready (bot is started):
        FullEvent::Ready { data_about_bot, .. } => {
            tracing::info!(
                user = %data_about_bot.user.tag(),
                user_id = %data_about_bot.user.id,
                guilds = data_about_bot.guilds.len(),
                "connected"
            );
        }
        // Guild create (the bot joins a new server):
        FullEvent::GuildCreate { guild, is_new } => {
            if *is_new == Some(true) {
                tracing::info!(guild = %guild.name, guild_id = %guild.id, "joined guild");
            }
        }
        _ => {}
    }

    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(
                command = %ctx.command().qualified_name,
                error = %error,
                "command failed"
            );
            if let Err(err) = reply_private!(ctx, "Something went wrong running this command.").await
            {
                tracing::warn!(error = %err, "could not report the failure to the user");
            }
        }
        other => {
            if let Err(err) = poise::builtins::on_error(other).await {
                tracing::error!(error = %err, "could not handle a framework error");
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nitrovote=debug"));
    let json = env::var("NITROVOTE_LOG_FORMAT")
        .is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // A missing .env file is fine, the variables may come from the environment itself.
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = Settings::from_env()?;
    tracing::debug!(?settings, "loaded settings");

    let store = PgVoteStore::connect(settings.database_url()).await?;
    let board = VoteBoard::new(Arc::new(store), settings.store_timeout());
    let clock = MonthClock::new(settings.timezone());
    let token = settings.token().clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::about::about(),
                commands::cmds::cmds(),
                commands::license::license(),
                commands::myvotes::myvotes(),
                commands::rules::rules(),
                commands::voteleaders::voteleaders(),
                commands::winners::winners(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let brand = Brand::resolve(settings.logo_url().as_deref(), Some(ready.user.face()));
                tracing::info!(icon = ?brand.icon_url(), "commands registered");

                Ok(Data {
                    settings,
                    clock,
                    board,
                    brand,
                    picker: Box::new(MainChatPicker),
                    policy: Box::new(ManagersOnly),
                })
            })
        })
        .build();

    let intents = GatewayIntents::non_privileged();
    let mut client = ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    client.start().await?;
    Ok(())
}
