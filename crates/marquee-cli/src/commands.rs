//! CLI command implementations

use crate::output::{self, OutputFormat};
use marquee_core::{
    catalog::{CatalogClient, CatalogConfig, MediaType},
    ControllerConfig, DeviceClass, DeviceClassifier, EmbedProvider, EmbedUrlBuilder,
    EnvironmentSignals, MediaRef,
};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;
use tracing::{debug, info};

/// Load the controller config, defaults when no file is given
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ControllerConfig> {
    match path {
        Some(path) => Ok(ControllerConfig::from_file(path)?),
        None => Ok(ControllerConfig::default()),
    }
}

#[derive(Serialize)]
struct Classification<'a> {
    device: DeviceClass,
    user_agent: &'a str,
    touch_points: u32,
    platform: &'a str,
}

/// Classify a device
pub fn classify(
    user_agent: &str,
    touch_points: u32,
    platform: &str,
    config: &ControllerConfig,
    format: &str,
) -> anyhow::Result<()> {
    let signals = EnvironmentSignals::new(user_agent, touch_points, platform);
    let device = DeviceClassifier::new(config.tablet_touch_threshold).classify(&signals);
    debug!(device = %device, touch_points, platform, "Classified");

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            let result = Classification {
                device,
                user_agent,
                touch_points,
                platform,
            };
            println!("{}", output::to_json(&result));
        }
        OutputFormat::Text | OutputFormat::Table => println!("{}", device),
    }

    Ok(())
}

#[derive(Serialize, Tabled)]
struct EmbedRow {
    device: DeviceClass,
    autoplay: bool,
    muted: bool,
    inline: bool,
    url: String,
}

/// Build embed URLs
pub fn embed(
    media: &str,
    provider: &str,
    device: Option<&str>,
    config: &ControllerConfig,
    format: &str,
) -> anyhow::Result<()> {
    let provider: EmbedProvider = provider.parse()?;
    let media = MediaRef::new(provider, media);
    let devices = match device {
        Some(d) => vec![d.parse::<DeviceClass>()?],
        None => vec![DeviceClass::Desktop, DeviceClass::Mobile, DeviceClass::Tablet],
    };

    let builder = EmbedUrlBuilder::new(config.language.clone());
    let mut rows = Vec::with_capacity(devices.len());
    for device in devices {
        let embed = builder.build(device, &media)?;
        rows.push(EmbedRow {
            device,
            autoplay: embed.intent.autoplay,
            muted: embed.intent.start_muted,
            inline: embed.intent.inline_playback,
            url: embed.url.0,
        });
    }

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&rows)),
        OutputFormat::Table => println!("{}", output::table(&rows)),
        OutputFormat::Text => {
            for row in &rows {
                println!("{:<8} {}", row.device, row.url);
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct TrailerInfo {
    id: u64,
    name: Option<String>,
    genres: Vec<String>,
    trailer: Option<MediaRef>,
    embed_url: Option<String>,
}

/// Fetch a title's details and print its trailer embed
pub async fn trailer(
    id: u64,
    media_type: &str,
    device: &str,
    config: &ControllerConfig,
    format: &str,
) -> anyhow::Result<()> {
    let media_type = match media_type.to_ascii_lowercase().as_str() {
        "tv" => MediaType::Tv,
        _ => MediaType::Movie,
    };
    let device: DeviceClass = device.parse()?;

    let catalog = CatalogConfig::from_env()?.with_language(config.language.clone());
    let client = CatalogClient::new(catalog)?;
    info!(id, media_type = ?media_type, "Fetching title details");
    let details = client.details(id, media_type).await?;

    let trailer = details.trailer_ref();
    match &trailer {
        Some(media) => info!(id, key = %media.id, "Trailer found"),
        None => info!(id, "Title has no trailer"),
    }
    let embed_url = match &trailer {
        Some(media) => Some(EmbedUrlBuilder::new(config.language.clone()).build(device, media)?.url.0),
        None => None,
    };

    let info = TrailerInfo {
        id,
        name: details.title.clone().or(details.name.clone()),
        genres: details.genre_names().into_iter().map(String::from).collect(),
        trailer,
        embed_url,
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&info)),
        OutputFormat::Text | OutputFormat::Table => {
            println!("Title: {}", info.name.as_deref().unwrap_or("<untitled>"));
            if !info.genres.is_empty() {
                println!("  Genres: {}", info.genres.join(", "));
            }
            match &info.embed_url {
                Some(url) => println!("  Trailer: {}", url),
                None => println!("  Trailer: none"),
            }
        }
    }

    Ok(())
}
