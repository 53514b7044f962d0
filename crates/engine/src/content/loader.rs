use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::app::{AnimationDef, AnimationLibrary, Rect, SpriteSpec, SpriteWorld};
use crate::AppPaths;

use super::manifest::{read_level_manifest, AnimationDecl, ManifestError};
use super::textures::{load_texture, Texture, TextureStore};

/// Store key for the pointer image, loaded from `assets/textures/cursor.png`
/// independently of any level.
pub const CURSOR_TEXTURE_KEY: &str = "cursor";

#[derive(Debug, Error)]
pub enum LevelError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LevelStats {
    textures_loaded: usize,
    textures_skipped: usize,
    animations_loaded: usize,
    animations_skipped: usize,
    sprites_spawned: usize,
    spawns_skipped: usize,
}

/// Maps spawn kinds to the animation they start in (e.g. a player kind to
/// its southward idle). Kinds without an entry fall back to an animation
/// named exactly like the kind, then to a static texture.
#[derive(Debug, Clone, Default)]
pub struct SpawnConventions {
    initial_animation_by_kind: HashMap<String, String>,
}

impl SpawnConventions {
    pub fn with_initial_animation(mut self, kind: &str, animation: &str) -> Self {
        self.initial_animation_by_kind
            .insert(kind.to_string(), animation.to_string());
        self
    }

    fn initial_animation(&self, kind: &str) -> Option<&str> {
        self.initial_animation_by_kind.get(kind).map(String::as_str)
    }
}

/// Loads a level into the world: decodes every declared texture and
/// animation frame, spawns the declared sprites, hands the texture store to
/// the world, and returns the animation library for the gameplay layer.
///
/// Only an unreadable manifest is fatal. A texture or frame that fails to
/// load skips its declaration; a partially loaded animation discards the
/// frames already acquired; spawn kinds that resolve to nothing are skipped
/// silently.
pub fn load_level(
    paths: &AppPaths,
    level: &str,
    conventions: &SpawnConventions,
    world: &mut SpriteWorld,
) -> Result<AnimationLibrary, LevelError> {
    let manifest = read_level_manifest(&paths.level_path(level))?;
    let mut store = TextureStore::default();
    let mut library = AnimationLibrary::default();
    let mut stats = LevelStats::default();

    let mut texture_foot_sizes: HashMap<&str, (i32, i32)> = HashMap::new();
    for decl in &manifest.textures {
        let path = paths.texture_dir(level).join(format!("{}.png", decl.name));
        match load_texture(&path) {
            Ok(texture) => {
                texture_foot_sizes.insert(decl.name.as_str(), decl.foot_size);
                store.insert(decl.name.clone(), texture);
                stats.textures_loaded += 1;
            }
            Err(error) => {
                warn!(error = %error, texture = %decl.name, "texture load failed; declaration skipped");
                stats.textures_skipped += 1;
            }
        }
    }

    match load_texture(&paths.cursor_texture_path()) {
        Ok(texture) => store.insert(CURSOR_TEXTURE_KEY.to_string(), texture),
        Err(error) => warn!(error = %error, "cursor texture unavailable"),
    }

    for decl in &manifest.animations {
        match load_animation(paths, decl, &mut store) {
            Some(def) => {
                library.insert(def);
                stats.animations_loaded += 1;
            }
            None => stats.animations_skipped += 1,
        }
    }

    for decl in &manifest.spawns {
        for &point in &decl.points {
            if spawn_sprite(
                world,
                &decl.kind,
                point,
                conventions,
                &library,
                &store,
                &texture_foot_sizes,
            ) {
                stats.sprites_spawned += 1;
            } else {
                stats.spawns_skipped += 1;
            }
        }
    }

    world.set_textures(store);
    info!(
        level,
        textures = stats.textures_loaded,
        animations = stats.animations_loaded,
        sprites = stats.sprites_spawned,
        skipped_textures = stats.textures_skipped,
        skipped_animations = stats.animations_skipped,
        skipped_spawns = stats.spawns_skipped,
        "level_loaded"
    );
    Ok(library)
}

/// Loads all frames of one animation declaration. Frames live at
/// `assets/animations/<prefix>/<name><index>.png` with 1-based indices,
/// where `<prefix>` is the leading lowercase run of the animation name.
fn load_animation(
    paths: &AppPaths,
    decl: &AnimationDecl,
    store: &mut TextureStore,
) -> Option<AnimationDef> {
    if decl.frame_count == 0 || !(decl.frame_delay_ms > 0.0) {
        warn!(
            animation = %decl.name,
            frame_count = decl.frame_count,
            frame_delay_ms = decl.frame_delay_ms,
            "invalid animation declaration; skipped"
        );
        return None;
    }

    let prefix = kind_prefix(&decl.name);
    let frame_dir = paths.animation_dir().join(prefix);

    let mut loaded: Vec<(String, Texture)> = Vec::with_capacity(decl.frame_count as usize);
    for index in 1..=decl.frame_count {
        let key = format!("{}{}", decl.name, index);
        let path = frame_dir.join(format!("{key}.png"));
        match load_texture(&path) {
            Ok(texture) => loaded.push((key, texture)),
            Err(error) => {
                warn!(
                    error = %error,
                    animation = %decl.name,
                    frame = index,
                    "frame load failed; partial animation discarded"
                );
                return None;
            }
        }
    }

    let frames = loaded.iter().map(|(key, _)| key.clone()).collect();
    for (key, texture) in loaded {
        store.insert(key, texture);
    }

    Some(AnimationDef {
        name: decl.name.clone(),
        frames,
        frame_delay_ms: decl.frame_delay_ms,
        foot_size: decl.foot_size,
    })
}

/// The leading lowercase run of an animation name names its frame folder:
/// `batFlapS` loads from `animations/bat/`.
fn kind_prefix(animation_name: &str) -> String {
    animation_name
        .chars()
        .take_while(|ch| !ch.is_ascii_uppercase())
        .collect()
}

fn spawn_sprite(
    world: &mut SpriteWorld,
    kind: &str,
    point: (i32, i32),
    conventions: &SpawnConventions,
    library: &AnimationLibrary,
    store: &TextureStore,
    texture_foot_sizes: &HashMap<&str, (i32, i32)>,
) -> bool {
    let resolved = conventions
        .initial_animation(kind)
        .and_then(|name| library.get(name))
        .or_else(|| library.get(kind));

    let (texture_key, animation, foot_size) = match resolved {
        Some(def) => (def.frames[0].clone(), Some(def.name.clone()), def.foot_size),
        None => match texture_foot_sizes.get(kind) {
            Some(&foot_size) if store.contains_key(kind) => (kind.to_string(), None, foot_size),
            _ => {
                debug!(kind, "spawn kind resolved to nothing; skipped");
                return false;
            }
        },
    };

    let Some(texture) = store.get(&texture_key) else {
        debug!(kind, texture_key = %texture_key, "spawn texture missing; skipped");
        return false;
    };

    world.spawn(SpriteSpec {
        name: kind.to_string(),
        bounds: Rect::new(point.0, point.1, texture.width as i32, texture.height as i32),
        foot_size,
        texture_key,
        animation,
    });
    true
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    fn write_png(path: &Path, width: u32, height: u32) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        let mut img = image::RgbaImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgba([120, 140, 90, 255]);
        }
        img.save(path).expect("write png");
    }

    fn write_manifest(paths: &AppPaths, level: &str, contents: &str) {
        let path = paths.level_path(level);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(path, contents).expect("write manifest");
    }

    fn test_paths(dir: &tempfile::TempDir) -> AppPaths {
        AppPaths {
            root: dir.path().to_path_buf(),
            assets_dir: dir.path().join("assets"),
        }
    }

    #[test]
    fn kind_prefix_stops_at_first_uppercase() {
        assert_eq!(kind_prefix("batFlapS"), "bat");
        assert_eq!(kind_prefix("asterWalkNE"), "aster");
        assert_eq!(kind_prefix("lowercase"), "lowercase");
    }

    #[test]
    fn loads_textures_animations_and_spawns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = test_paths(&dir);
        write_manifest(
            &paths,
            "test",
            "[TEXTURES]\nrock 4 2\n[ANIMATIONS]\nbatFlapS 2 100 6 3\n[SPAWNS]\nbat 1 10 10\nrock 2 30 40 50 60\n",
        );
        write_png(&paths.texture_dir("test").join("rock.png"), 4, 4);
        write_png(&paths.animation_dir().join("bat/batFlapS1.png"), 8, 6);
        write_png(&paths.animation_dir().join("bat/batFlapS2.png"), 8, 6);

        let conventions = SpawnConventions::default().with_initial_animation("bat", "batFlapS");
        let mut world = SpriteWorld::new((1600, 1200));
        let library = load_level(&paths, "test", &conventions, &mut world).expect("load");

        assert_eq!(library.len(), 1);
        assert_eq!(world.sprite_count(), 3);

        let bat = world.find_by_name("bat").expect("bat");
        assert!(bat.animated);
        assert_eq!(bat.animation.as_deref(), Some("batFlapS"));
        assert_eq!(bat.texture_key, "batFlapS1");
        assert_eq!(bat.foot_size, (6, 3));
        assert_eq!((bat.bounds.w, bat.bounds.h), (8, 6));
        assert_eq!(bat.spawn_point, (10, 10));

        let rock = world.find_by_name("rock").expect("rock");
        assert!(!rock.animated);
        assert_eq!(rock.texture_key, "rock");
        assert_eq!(rock.foot_size, (4, 2));

        let store = world.textures().expect("store");
        assert!(store.contains_key("batFlapS1"));
        assert!(store.contains_key("batFlapS2"));
        assert!(store.contains_key("rock"));
    }

    #[test]
    fn missing_frame_discards_whole_animation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = test_paths(&dir);
        write_manifest(
            &paths,
            "test",
            "[ANIMATIONS]\nbatFlapS 2 100 6 3\n[SPAWNS]\nbat 1 10 10\n",
        );
        write_png(&paths.animation_dir().join("bat/batFlapS1.png"), 8, 6);

        let conventions = SpawnConventions::default().with_initial_animation("bat", "batFlapS");
        let mut world = SpriteWorld::new((1600, 1200));
        let library = load_level(&paths, "test", &conventions, &mut world).expect("load");

        assert!(library.is_empty());
        assert_eq!(world.sprite_count(), 0);
        let store = world.textures().expect("store");
        assert!(!store.contains_key("batFlapS1"));
    }

    #[test]
    fn unknown_spawn_kind_is_skipped_silently() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = test_paths(&dir);
        write_manifest(&paths, "test", "[SPAWNS]\nghost 1 0 0\n");

        let mut world = SpriteWorld::new((1600, 1200));
        load_level(&paths, "test", &SpawnConventions::default(), &mut world).expect("load");
        assert_eq!(world.sprite_count(), 0);
    }

    #[test]
    fn missing_texture_file_skips_declaration_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = test_paths(&dir);
        write_manifest(
            &paths,
            "test",
            "[TEXTURES]\nrock 4 2\nmoss 6 3\n[SPAWNS]\nrock 1 0 0\nmoss 1 5 5\n",
        );
        write_png(&paths.texture_dir("test").join("moss.png"), 5, 5);

        let mut world = SpriteWorld::new((1600, 1200));
        load_level(&paths, "test", &SpawnConventions::default(), &mut world).expect("load");

        assert_eq!(world.sprite_count(), 1);
        assert!(world.find_by_name("moss").is_some());
        assert!(world.find_by_name("rock").is_none());
    }

    #[test]
    fn animation_named_like_kind_is_used_without_convention() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = test_paths(&dir);
        write_manifest(
            &paths,
            "test",
            "[ANIMATIONS]\nember 2 100 4 2\n[SPAWNS]\nember 1 12 34\n",
        );
        write_png(&paths.animation_dir().join("ember/ember1.png"), 4, 4);
        write_png(&paths.animation_dir().join("ember/ember2.png"), 4, 4);

        let mut world = SpriteWorld::new((1600, 1200));
        load_level(&paths, "test", &SpawnConventions::default(), &mut world).expect("load");

        let ember = world.find_by_name("ember").expect("ember");
        assert_eq!(ember.animation.as_deref(), Some("ember"));
    }

    #[test]
    fn zero_frame_or_zero_delay_animation_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = test_paths(&dir);
        write_manifest(
            &paths,
            "test",
            "[ANIMATIONS]\nbatFlapS 0 100 6 3\nbatFlapN 2 0 6 3\n",
        );

        let mut world = SpriteWorld::new((1600, 1200));
        let library =
            load_level(&paths, "test", &SpawnConventions::default(), &mut world).expect("load");
        assert!(library.is_empty());
    }

    #[test]
    fn unreadable_manifest_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = test_paths(&dir);
        let error = load_level(
            &paths,
            "missing",
            &SpawnConventions::default(),
            &mut SpriteWorld::new((100, 100)),
        )
        .expect_err("missing manifest");
        assert!(matches!(error, LevelError::Manifest(_)));
    }
}
