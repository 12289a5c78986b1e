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
use crate::ranking::DEFAULT_WINNERS;
use chrono_tz::Tz;
use getset::{CopyGetters, Getters};
use std::env;
use std::time::Duration;
use thiserror::Error;

/* Configuration: */

/// Veil's application id, used when pointing users at its `/vote` command.
const DEFAULT_VEIL_BOT_ID: u64 = 1403948162955219025;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Set {0} in your .env")]
    Missing(&'static str),

    #[error("Remove the 'Bot ' prefix from DISCORD_TOKEN, use only the raw token")]
    PrefixedToken,

    #[error("{name} has an invalid value `{value}`: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/**
 * Process-wide bot settings, read once at startup.
 *
 * Every value comes from the environment (optionally seeded from a `.env` file).
 */
#[derive(Clone, Getters, CopyGetters)]
pub struct Settings {
    #[getset(get = "pub")]
    token: String,
    #[getset(get = "pub")]
    database_url: String,
    /// Explicit brand icon. When missing, the bot's own avatar is used.
    #[getset(get = "pub")]
    logo_url: Option<String>,
    #[getset(get_copy = "pub")]
    veil_bot_id: u64,
    /// Zone whose calendar months delimit each voting period.
    #[getset(get_copy = "pub")]
    timezone: Tz,
    /// Minimum monthly votes to be eligible for a reward.
    #[getset(get_copy = "pub")]
    min_votes: u64,
    /// Number of rewarded voters per month.
    #[getset(get_copy = "pub")]
    winner_count: usize,
    #[getset(get_copy = "pub")]
    leaderboard_size: usize,
    #[getset(get_copy = "pub")]
    store_timeout: Duration,
}

// Tokens are deliberately left out.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("logo_url", &self.logo_url)
            .field("veil_bot_id", &self.veil_bot_id)
            .field("timezone", &self.timezone)
            .field("min_votes", &self.min_votes)
            .field("winner_count", &self.winner_count)
            .field("leaderboard_size", &self.leaderboard_size)
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}

impl Settings {
    pub fn from_env() -> Result<Settings, SettingsError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /**
     * Builds the settings from an arbitrary variable lookup.
     *
     * Values are trimmed and stripped of surrounding quotes; empty values count as unset.
     */
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
                .filter(|v| !v.is_empty())
        };

        let token = read("DISCORD_TOKEN")
            .or_else(|| read("N_DISCORD_TOKEN"))
            .ok_or(SettingsError::Missing("DISCORD_TOKEN"))?;
        if token.to_lowercase().starts_with("bot ") {
            return Err(SettingsError::PrefixedToken);
        }
        let database_url = read("DATABASE_URL")
            .or_else(|| read("N_DATABASE_URL"))
            .ok_or(SettingsError::Missing("DATABASE_URL"))?;

        let timezone = match read("NITROVOTE_TIMEZONE") {
            Some(name) => name.parse::<Tz>().map_err(|reason| SettingsError::Invalid {
                name: "NITROVOTE_TIMEZONE",
                value: name.clone(),
                reason: reason.to_string(),
            })?,
            None => chrono_tz::America::Chicago,
        };

        Ok(Self {
            token,
            database_url,
            logo_url: read("NITROVOTE_LOGO_URL"),
            veil_bot_id: parse_or(&read, "VEIL_BOT_ID", DEFAULT_VEIL_BOT_ID)?,
            timezone,
            min_votes: parse_or(&read, "NITROVOTE_MIN_VOTES", 30)?,
            winner_count: parse_or(&read, "NITROVOTE_WINNERS", DEFAULT_WINNERS)?,
            leaderboard_size: parse_or(&read, "NITROVOTE_LEADERBOARD_SIZE", 10)?,
            store_timeout: Duration::from_secs(parse_or(
                &read,
                "NITROVOTE_STORE_TIMEOUT_SECS",
                10,
            )?),
        })
    }
}

fn parse_or<T, R>(read: &R, name: &'static str, default: T) -> Result<T, SettingsError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    R: Fn(&str) -> Option<String>,
{
    match read(name) {
        Some(value) => value.parse().map_err(|e: T::Err| SettingsError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

/* Command helpers: */

/**
 * Macro for logging the usage of a command.
 */
macro_rules! log_cmd {
    ($ctx:ident) => {
        tracing::info!(
            command = %$ctx.invocation_string(),
            user_id = %$ctx.author().id,
            user = %$ctx.author().tag(),
            "executing command"
        );
    };
}
pub(crate) use log_cmd;

/**
 * Macro for replying with an ephemeral plain-text message.
 */
macro_rules! reply_private {
    ($ctx:ident, $($arg:tt)*) => {
        $ctx.send(
            poise::CreateReply::default()
                .content(format!($($arg)*))
                .ephemeral(true),
        )
    };
}
pub(crate) use reply_private;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let settings = Settings::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc.def"),
            ("DATABASE_URL", "postgres://votes"),
        ]))
        .unwrap();

        assert_eq!(settings.token(), "abc.def");
        assert_eq!(settings.timezone(), chrono_tz::America::Chicago);
        assert_eq!(settings.min_votes(), 30);
        assert_eq!(settings.winner_count(), 3);
        assert_eq!(settings.leaderboard_size(), 10);
        assert_eq!(settings.veil_bot_id(), 1403948162955219025);
        assert_eq!(settings.store_timeout(), Duration::from_secs(10));
        assert!(settings.logo_url().is_none());
    }

    #[test]
    fn quotes_are_stripped_and_fallback_names_are_used() {
        let settings = Settings::from_lookup(lookup(&[
            ("N_DISCORD_TOKEN", " \"abc.def\" "),
            ("N_DATABASE_URL", "'postgres://votes'"),
            ("NITROVOTE_LOGO_URL", ""),
        ]))
        .unwrap();

        assert_eq!(settings.token(), "abc.def");
        assert_eq!(settings.database_url(), "postgres://votes");
        assert!(settings.logo_url().is_none());
    }

    #[test]
    fn prefixed_token_is_rejected() {
        let result = Settings::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "Bot abc.def"),
            ("DATABASE_URL", "postgres://votes"),
        ]));
        assert!(matches!(result, Err(SettingsError::PrefixedToken)));
    }

    #[test]
    fn missing_database_is_reported() {
        let result = Settings::from_lookup(lookup(&[("DISCORD_TOKEN", "abc.def")]));
        assert!(matches!(result, Err(SettingsError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn invalid_values_are_reported() {
        let bad_zone = Settings::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc.def"),
            ("DATABASE_URL", "postgres://votes"),
            ("NITROVOTE_TIMEZONE", "Central"),
        ]));
        assert!(matches!(
            bad_zone,
            Err(SettingsError::Invalid { name: "NITROVOTE_TIMEZONE", .. })
        ));

        let bad_threshold = Settings::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc.def"),
            ("DATABASE_URL", "postgres://votes"),
            ("NITROVOTE_MIN_VOTES", "thirty"),
        ]));
        assert!(matches!(
            bad_threshold,
            Err(SettingsError::Invalid { name: "NITROVOTE_MIN_VOTES", .. })
        ));
    }
}
