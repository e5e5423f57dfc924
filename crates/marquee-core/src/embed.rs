//! Embed URL Builder
//!
//! Maps a device class to a [`PlaybackIntent`] and serializes it into the
//! query string of the hosted player. Parameters are appended in a fixed
//! order so identical inputs always produce byte-identical URLs.

use crate::{
    types::{DeviceClass, EmbedProvider, EmbedUrl, MediaRef, PlaybackIntent},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use url::Url;

const VIMEO_PLAYER_BASE: &str = "https://player.vimeo.com/video/";
const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// Result of [`build_playback_config`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedConfig {
    pub device: DeviceClass,
    pub intent: PlaybackIntent,
    pub url: EmbedUrl,
}

/// Builder carrying the localization tag applied to every embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedUrlBuilder {
    language: String,
}

impl Default for EmbedUrlBuilder {
    fn default() -> Self {
        Self::new("en-US")
    }
}

impl EmbedUrlBuilder {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Build the intent and embed URL for a device and media item
    pub fn build(&self, device: DeviceClass, media: &MediaRef) -> Result<EmbedConfig> {
        validate_media_ref(media)?;

        let intent = PlaybackIntent::for_device(device);
        let url = match media.provider {
            EmbedProvider::Vimeo => self.vimeo_url(&media.id, &intent)?,
            EmbedProvider::YouTube => self.youtube_url(&media.id, &intent)?,
            EmbedProvider::LocalFile => EmbedUrl(media.id.clone()),
        };

        Ok(EmbedConfig { device, intent, url })
    }

    fn vimeo_url(&self, id: &str, intent: &PlaybackIntent) -> Result<EmbedUrl> {
        let mut url = Url::parse(VIMEO_PLAYER_BASE)?.join(id)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("autoplay", flag(intent.autoplay))
                .append_pair("muted", flag(intent.start_muted));
            if intent.inline_playback {
                query.append_pair("playsinline", "1");
            }
            query
                .append_pair("controls", flag(intent.show_native_controls))
                .append_pair("background", flag(intent.background_mode))
                // Branding suppression
                .append_pair("title", "0")
                .append_pair("byline", "0")
                .append_pair("portrait", "0")
                .append_pair("dnt", "1")
                .append_pair("texttrack", &self.language);
        }
        Ok(EmbedUrl(url.into()))
    }

    fn youtube_url(&self, key: &str, intent: &PlaybackIntent) -> Result<EmbedUrl> {
        let mut url = Url::parse(YOUTUBE_EMBED_BASE)?.join(key)?;
        let hl = self.language.split(['-', '_']).next().unwrap_or(&self.language);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("autoplay", flag(intent.autoplay))
                .append_pair("mute", flag(intent.start_muted));
            if intent.inline_playback {
                query.append_pair("playsinline", "1");
            }
            query.append_pair("controls", flag(intent.show_native_controls));
            if intent.background_mode {
                query.append_pair("loop", "1");
            }
            query
                .append_pair("modestbranding", "1")
                .append_pair("rel", "0")
                .append_pair("iv_load_policy", "3")
                .append_pair("hl", hl)
                .append_pair("enablejsapi", "1");
        }
        Ok(EmbedUrl(url.into()))
    }
}

/// Build the playback configuration with the default localization
pub fn build_playback_config(device: DeviceClass, media: &MediaRef) -> Result<EmbedConfig> {
    EmbedUrlBuilder::default().build(device, media)
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn validate_media_ref(media: &MediaRef) -> Result<()> {
    let id = media.id.as_str();
    let valid = match media.provider {
        EmbedProvider::Vimeo => !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()),
        EmbedProvider::YouTube => {
            !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        }
        EmbedProvider::LocalFile => !id.trim().is_empty(),
    };

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidMediaRef(format!("{:?} '{}'", media.provider, id)))
    }
}
