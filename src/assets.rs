use nannou::image::{self, DynamicImage};
use thiserror::Error;

use crate::audio::{AudioError, Track};
use crate::config::AssetPaths;
use crate::console::{console_log, console_warn};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {path}: {message}")]
    Fetch { path: String, message: String },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to decode audio {path}: {source}")]
    Audio {
        path: String,
        #[source]
        source: AudioError,
    },
}

/// Everything the greeting shows or plays. Missing pieces are `None`.
#[derive(Default)]
pub struct Assets {
    pub unlock_sound: Option<Track>,
    pub music: Option<Track>,
    pub images: Vec<Option<DynamicImage>>,
}

pub async fn load(paths: &AssetPaths, image_count: usize) -> Assets {
    let unlock_sound = found(load_track(&paths.resolve(&paths.unlock_sound)).await);
    let music = found(load_track(&paths.resolve(&paths.music)).await);
    let mut images = Vec::with_capacity(image_count);
    for index in 0..image_count {
        images.push(found(load_image(&paths.image(index)).await));
    }
    console_log!(
        "assets: {} of {} images, unlock sound {}, music {}",
        images.iter().filter(|i| i.is_some()).count(),
        image_count,
        if unlock_sound.is_some() { "ok" } else { "missing" },
        if music.is_some() { "ok" } else { "missing" },
    );
    Assets {
        unlock_sound,
        music,
        images,
    }
}

fn found<T>(result: Result<T, AssetError>) -> Option<T> {
    result
        .map_err(|err| console_warn!("assets: {}", err))
        .ok()
}

pub async fn load_track(path: &str) -> Result<Track, AssetError> {
    let bytes = read_bytes(path).await?;
    decode_track(path, &bytes)
}

pub async fn load_image(path: &str) -> Result<DynamicImage, AssetError> {
    let bytes = read_bytes(path).await?;
    decode_image(path, &bytes)
}

fn decode_track(path: &str, bytes: &[u8]) -> Result<Track, AssetError> {
    Track::decode_wav(bytes).map_err(|source| AssetError::Audio {
        path: path.to_string(),
        source,
    })
}

fn decode_image(path: &str, bytes: &[u8]) -> Result<DynamicImage, AssetError> {
    image::load_from_memory(bytes).map_err(|source| AssetError::Image {
        path: path.to_string(),
        source,
    })
}

cfg_if::cfg_if! {
    if #[cfg(target_family = "wasm")] {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        async fn read_bytes(path: &str) -> Result<Vec<u8>, AssetError> {
            let fetch_err = |message: String| AssetError::Fetch {
                path: path.to_string(),
                message,
            };
            let window = web_sys::window().ok_or_else(|| fetch_err("no window".to_string()))?;
            let response = JsFuture::from(window.fetch_with_str(path))
                .await
                .map_err(|err| fetch_err(format!("{:?}", err)))?;
            let response: web_sys::Response = response
                .dyn_into()
                .map_err(|_| fetch_err("not a response".to_string()))?;
            if !response.ok() {
                return Err(fetch_err(format!("status {}", response.status())));
            }
            let buffer = response
                .array_buffer()
                .map_err(|err| fetch_err(format!("{:?}", err)))?;
            let buffer = JsFuture::from(buffer)
                .await
                .map_err(|err| fetch_err(format!("{:?}", err)))?;
            Ok(js_sys::Uint8Array::new(&buffer).to_vec())
        }
    } else {
        async fn read_bytes(path: &str) -> Result<Vec<u8>, AssetError> {
            async_std::fs::read(path).await.map_err(|source| AssetError::Io {
                path: path.to_string(),
                source,
            })
        }
    }
}
