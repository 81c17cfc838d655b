use anyhow::{Context, Result};
use fs_extra::{copy_items, dir::CopyOptions};
use std::{env, path::PathBuf};

/// Ship the avatar and its textures next to the build output so a packaged
/// binary (or a wasm bundle) finds them under `assets/`.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets = manifest_dir.join("assets");
    if !assets.exists() {
        println!("cargo:warning=no assets/ directory, the viewer will have nothing to load");
        return Ok(());
    }

    let out_dir = env::var("OUT_DIR")?;
    let mut options = CopyOptions::new();
    options.overwrite = true;
    copy_items(&[assets], &out_dir, &options)
        .with_context(|| format!("could not copy assets into {out_dir}"))?;

    Ok(())
}
