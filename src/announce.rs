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
use serenity::all::{ChannelId, ChannelType, Guild, Member, Permissions};

/// Channel names that usually denote a server's main chat.
const PREFERRED_NAMES: [&str; 7] = [
    "general",
    "chat",
    "lobby",
    "main",
    "talk",
    "discussion",
    "welcome",
];

/**
 * A text channel as seen by the channel pickers, detached from the Discord cache.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelCandidate {
    pub id: ChannelId,
    pub name: String,
    pub nsfw: bool,
    /// Whether the bot may both see the channel and send messages to it.
    pub postable: bool,
    /// Position of the parent category, if any.
    pub category_position: Option<u16>,
    pub position: u16,
}

impl ChannelCandidate {
    fn usable(&self) -> bool {
        self.postable && !self.nsfw
    }

    /// Top-to-bottom order of the Discord sidebar. Uncategorised channels come first, and the
    /// channel id settles equal positions.
    fn sidebar_key(&self) -> (i32, u16, ChannelId) {
        (
            self.category_position.map_or(-1, i32::from),
            self.position,
            self.id,
        )
    }
}

/**
 * Strategy choosing where announcements go when no channel was given explicitly.
 */
pub trait ChannelPicker: Send + Sync {
    fn pick<'a>(
        &self,
        channels: &'a [ChannelCandidate],
        system_channel: Option<ChannelId>,
    ) -> Option<&'a ChannelCandidate>;
}

/**
 * Picks, in this order:
 * 1. The top-most usable channel with a common "main chat" name.
 * 2. The guild's system channel, if usable.
 * 3. The top-most usable text channel.
 */
#[derive(Clone, Copy, Debug, Default)]
pub struct MainChatPicker;

impl ChannelPicker for MainChatPicker {
    fn pick<'a>(
        &self,
        channels: &'a [ChannelCandidate],
        system_channel: Option<ChannelId>,
    ) -> Option<&'a ChannelCandidate> {
        let top_most = |pred: &dyn Fn(&ChannelCandidate) -> bool| {
            channels
                .iter()
                .filter(|c| c.usable() && pred(c))
                .min_by_key(|c| c.sidebar_key())
        };

        let preferred =
            |c: &ChannelCandidate| PREFERRED_NAMES.contains(&c.name.to_lowercase().as_str());

        top_most(&preferred)
            .or_else(|| {
                let id = system_channel?;
                channels.iter().find(|c| c.id == id && c.usable())
            })
            .or_else(|| top_most(&|_: &ChannelCandidate| true))
    }
}

/**
 * Strategy deciding which members may publish the monthly winners.
 */
pub trait AnnouncePolicy: Send + Sync {
    fn may_announce(&self, permissions: Permissions) -> bool;
}

/// Server managers and administrators only.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManagersOnly;

impl AnnouncePolicy for ManagersOnly {
    fn may_announce(&self, permissions: Permissions) -> bool {
        permissions.manage_guild() || permissions.administrator()
    }
}

/// Channels members read as chat: plain text and announcement channels.
fn is_text_like(kind: ChannelType) -> bool {
    matches!(kind, ChannelType::Text | ChannelType::News)
}

/**
 * Snapshot of a guild's text channels from the point of view of `me` (the bot's member).
 */
pub fn text_channels(guild: &Guild, me: &Member) -> Vec<ChannelCandidate> {
    guild
        .channels
        .values()
        .filter(|channel| is_text_like(channel.kind))
        .map(|channel| {
            let permissions = guild.user_permissions_in(channel, me);
            ChannelCandidate {
                id: channel.id,
                name: channel.name.clone(),
                nsfw: channel.nsfw,
                postable: permissions.view_channel() && permissions.send_messages(),
                category_position: channel
                    .parent_id
                    .and_then(|parent| guild.channels.get(&parent))
                    .map(|category| category.position),
                position: channel.position,
            }
        })
        .collect()
}
