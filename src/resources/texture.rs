//! Fetching raw asset bytes and decoding images.
//!
//! Natively files are read from the asset directory with tokio; on wasm32 they
//! are fetched from `{origin}/assets/` with reqwest. Both paths stream the body
//! so callers can report progress.

use anyhow::Context as _;
use image::{ImageFormat, RgbaImage};

use crate::data_structures::image::ImageHandle;

#[cfg(target_arch = "wasm32")]
fn format_url(assets: &str, file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no global window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("could not read page origin: {e:?}"))?;
    let base = reqwest::Url::parse(&format!("{}/{}/", origin, assets.trim_matches('/')))?;
    Ok(base.join(file_name)?)
}

/// Read `file_name` below `assets`. `on_progress` receives the number of bytes
/// read so far and the total size when it is known.
pub async fn load_binary(
    assets: &str,
    file_name: &str,
    mut on_progress: impl FnMut(u64, Option<u64>),
) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        use futures::StreamExt;

        let url = format_url(assets, file_name)?;
        let response = reqwest::get(url.clone())
            .await
            .with_context(|| format!("request for {url} failed"))?
            .error_for_status()?;
        let total = response.content_length();
        let mut data = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk?);
            on_progress(data.len() as u64, total);
        }
        data
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        use tokio::io::AsyncReadExt;

        let path = std::path::Path::new(assets).join(file_name);
        let mut file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("could not open {}", path.display()))?;
        let total = file.metadata().await.ok().map(|m| m.len());
        let mut data = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut chunk = vec![0u8; 64 * 1024];
        loop {
            let read = file
                .read(&mut chunk)
                .await
                .with_context(|| format!("could not read {}", path.display()))?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
            on_progress(data.len() as u64, total);
        }
        data
    };

    Ok(data)
}

/// Decode an encoded image. `mime_type` (e.g. `image/png`) skips format guessing.
pub fn decode_image(bytes: &[u8], mime_type: Option<&str>) -> anyhow::Result<RgbaImage> {
    let img = match mime_type.and_then(ImageFormat::from_mime_type) {
        Some(format) => image::load_from_memory_with_format(bytes, format)?,
        None => image::load_from_memory(bytes)?,
    };
    Ok(img.to_rgba8())
}

pub async fn load_image(assets: &str, file_name: &str) -> anyhow::Result<RgbaImage> {
    let data = load_binary(assets, file_name, |_, _| {}).await?;
    decode_image(&data, None).with_context(|| format!("could not decode {file_name}"))
}

/// Load `file_name` into an already handed out `handle`. Failures are logged and
/// leave the handle pending forever.
pub async fn fill_image(assets: String, file_name: &'static str, handle: ImageHandle) {
    match load_image(&assets, file_name).await {
        Ok(image) => {
            log::debug!("Loaded texture {file_name}");
            handle.fill(image);
        }
        Err(e) => log::error!("Texture {file_name} failed to load: {e:#}"),
    }
}
