//! Map image loading from a URL or a local file.

use crate::constants::MAX_TEXTURE_SIDE;
use folklore_map::config::MapSource;
use std::path::PathBuf;
use std::sync::mpsc;
use thiserror::Error;

const USER_AGENT: &str = "folklore-map";

/// Errors that can occur when loading and decoding the map image.
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("failed to download '{url}': {source}")]
    Download { url: String, source: reqwest::Error },
    #[error("failed to download '{url}': HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode image '{name}': {source}")]
    DecodeError {
        name: String,
        source: image::ImageError,
    },
    #[error("image decoding was interrupted: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

/// Decoded image data ready for texture creation.
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// State of the map image being loaded asynchronously.
pub enum AssetLoadState {
    /// Image is being fetched and decoded on the runtime.
    Loading(mpsc::Receiver<Result<DecodedImage, ImageLoadError>>),
    /// Image has been decoded and is ready for texture creation.
    Ready(DecodedImage),
    /// Loading failed; stores the error message (already displayed via toast).
    Error(String),
}

/// Fetches the raw bytes of the map image.
async fn read_source(source: &MapSource) -> Result<Vec<u8>, ImageLoadError> {
    match source {
        MapSource::Url(url) => {
            let download = |source| ImageLoadError::Download {
                url: url.clone(),
                source,
            };

            let response = reqwest::Client::new()
                .get(url)
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .send()
                .await
                .map_err(download)?;

            if !response.status().is_success() {
                return Err(ImageLoadError::Status {
                    url: url.clone(),
                    status: response.status().as_u16(),
                });
            }

            Ok(response.bytes().await.map_err(download)?.to_vec())
        }
        MapSource::File(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|source| ImageLoadError::Read {
                    path: path.clone(),
                    source,
                })
        }
    }
}

/// Decodes image bytes, downscaling anything larger than the texture limit.
fn decode_image(name: &str, bytes: &[u8]) -> Result<DecodedImage, ImageLoadError> {
    let mut img = image::load_from_memory(bytes).map_err(|source| ImageLoadError::DecodeError {
        name: name.to_string(),
        source,
    })?;

    if img.width().max(img.height()) > MAX_TEXTURE_SIDE {
        log::info!(
            "Downscaling {name} from {}x{} to fit {MAX_TEXTURE_SIDE}px",
            img.width(),
            img.height()
        );
        img = img.resize(
            MAX_TEXTURE_SIDE,
            MAX_TEXTURE_SIDE,
            image::imageops::FilterType::Triangle,
        );
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        pixels: rgba.into_raw(),
        width,
        height,
    })
}

/// Loads and decodes the map image from its source.
pub async fn load_map_image(source: MapSource) -> Result<DecodedImage, ImageLoadError> {
    let bytes = read_source(&source).await?;
    let name = source.to_string();
    log::info!("Fetched {} bytes for {name}", bytes.len());

    tokio::task::spawn_blocking(move || decode_image(&name, &bytes)).await?
}
