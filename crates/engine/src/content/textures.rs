use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;

/// Decoded RGBA image, ready for the software blitter.
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to open texture {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub fn load_texture(path: &Path) -> Result<Texture, TextureError> {
    let reader = ImageReader::open(path).map_err(|source| TextureError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Texture {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

/// All decoded images for a level, keyed by texture name or animation
/// frame key. Owned by the world once loading finishes.
#[derive(Debug, Clone, Default)]
pub struct TextureStore {
    by_key: HashMap<String, Texture>,
}

impl TextureStore {
    pub fn insert(&mut self, key: String, texture: Texture) {
        self.by_key.insert(key, texture);
    }

    pub fn get(&self, key: &str) -> Option<&Texture> {
        self.by_key.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
