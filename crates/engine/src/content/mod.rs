mod loader;
mod manifest;
mod textures;

pub use loader::{load_level, LevelError, SpawnConventions, CURSOR_TEXTURE_KEY};
pub use manifest::{
    parse_level_manifest, read_level_manifest, AnimationDecl, LevelManifest, ManifestError,
    SpawnDecl, TextureDecl,
};
pub use textures::{load_texture, Texture, TextureError, TextureStore};
