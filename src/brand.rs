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
use serenity::all::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, Timestamp};

pub const BRAND_NAME: &str = "NitroVote";

/// Medals for the podium places; lower places are shown as `#n`.
pub const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// Colour tones of the logo's palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Pink,
    Cyan,
    Purple,
    Gold,
    Blue,
}

impl Tone {
    pub fn colour(self) -> u32 {
        match self {
            Tone::Pink => 0xF793FF,
            Tone::Cyan => 0x4DF1FF,
            Tone::Purple => 0xAA48FF,
            Tone::Gold => 0xF5A803,
            Tone::Blue => 0x0F8BFF,
        }
    }
}

/**
 * Visual identity shared by every embed the bot sends.
 *
 * Resolved once while the framework starts up and stored in the shared command data.
 */
#[derive(Clone, Debug)]
pub struct Brand {
    icon_url: Option<String>,
}

impl Brand {
    /// Prefers the configured logo, then the bot's own avatar.
    pub fn resolve(logo_url: Option<&str>, avatar_url: Option<String>) -> Brand {
        Self {
            icon_url: logo_url.map(str::to_string).or(avatar_url),
        }
    }

    pub fn icon_url(&self) -> Option<&str> {
        self.icon_url.as_deref()
    }

    pub fn embed(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        tone: Tone,
    ) -> CreateEmbed {
        let mut author = CreateEmbedAuthor::new(BRAND_NAME);
        let mut embed = CreateEmbed::new()
            .title(title)
            .description(description)
            .colour(tone.colour())
            .timestamp(Timestamp::now())
            .footer(CreateEmbedFooter::new(BRAND_NAME));

        if let Some(icon) = &self.icon_url {
            author = author.icon_url(icon);
            embed = embed.thumbnail(icon);
        }

        embed.author(author)
    }
}

/// Medal for a 1-based place.
pub fn medal(place: usize) -> String {
    match place.checked_sub(1).and_then(|i| MEDALS.get(i)) {
        Some(medal) => medal.to_string(),
        None => format!("#{place}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logo_takes_precedence_over_avatar() {
        let brand = Brand::resolve(
            Some("https://cdn/logo.png"),
            Some("https://cdn/avatar.png".into()),
        );
        assert_eq!(brand.icon_url(), Some("https://cdn/logo.png"));

        let brand = Brand::resolve(None, Some("https://cdn/avatar.png".into()));
        assert_eq!(brand.icon_url(), Some("https://cdn/avatar.png"));

        assert_eq!(Brand::resolve(None, None).icon_url(), None);
    }

    #[test]
    fn podium_places_get_medals() {
        assert_eq!(medal(1), "🥇");
        assert_eq!(medal(3), "🥉");
        assert_eq!(medal(4), "#4");
        assert_eq!(medal(10), "#10");
    }
}
