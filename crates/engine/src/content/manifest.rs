use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDecl {
    pub name: String,
    pub foot_size: (i32, i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDecl {
    pub name: String,
    pub frame_count: u32,
    pub frame_delay_ms: f32,
    pub foot_size: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnDecl {
    pub kind: String,
    pub points: Vec<(i32, i32)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelManifest {
    pub textures: Vec<TextureDecl>,
    pub animations: Vec<AnimationDecl>,
    pub spawns: Vec<SpawnDecl>,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read level manifest {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Textures,
    Animations,
    Spawns,
}

pub fn read_level_manifest(path: &Path) -> Result<LevelManifest, ManifestError> {
    let raw = fs::read_to_string(path).map_err(|source| ManifestError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_level_manifest(&raw))
}

/// Parses the line-oriented level manifest. `#` lines and blank lines are
/// skipped; malformed declarations are warned about and dropped without
/// failing the whole manifest.
pub fn parse_level_manifest(raw: &str) -> LevelManifest {
    let mut manifest = LevelManifest::default();
    let mut section = Section::None;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line {
            "[TEXTURES]" => section = Section::Textures,
            "[ANIMATIONS]" => section = Section::Animations,
            "[SPAWNS]" => section = Section::Spawns,
            _ => match section {
                Section::Textures => {
                    if let Some(decl) = parse_texture_line(line) {
                        manifest.textures.push(decl);
                    }
                }
                Section::Animations => {
                    if let Some(decl) = parse_animation_line(line) {
                        manifest.animations.push(decl);
                    }
                }
                Section::Spawns => {
                    if let Some(decl) = parse_spawn_line(line) {
                        manifest.spawns.push(decl);
                    }
                }
                Section::None => {
                    warn!(line, "manifest line outside any section; skipped");
                }
            },
        }
    }

    manifest
}

fn parse_texture_line(line: &str) -> Option<TextureDecl> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    let foot_w = tokens.next().and_then(|t| t.parse::<i32>().ok());
    let foot_h = tokens.next().and_then(|t| t.parse::<i32>().ok());
    match (foot_w, foot_h) {
        (Some(foot_w), Some(foot_h)) => Some(TextureDecl {
            name: name.to_string(),
            foot_size: (foot_w, foot_h),
        }),
        _ => {
            warn!(line, "malformed texture declaration; skipped");
            None
        }
    }
}

fn parse_animation_line(line: &str) -> Option<AnimationDecl> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    let frame_count = tokens.next().and_then(|t| t.parse::<u32>().ok());
    let frame_delay_ms = tokens.next().and_then(|t| t.parse::<f32>().ok());
    let foot_w = tokens.next().and_then(|t| t.parse::<i32>().ok());
    let foot_h = tokens.next().and_then(|t| t.parse::<i32>().ok());
    match (frame_count, frame_delay_ms, foot_w, foot_h) {
        (Some(frame_count), Some(frame_delay_ms), Some(foot_w), Some(foot_h)) => {
            Some(AnimationDecl {
                name: name.to_string(),
                frame_count,
                frame_delay_ms,
                foot_size: (foot_w, foot_h),
            })
        }
        _ => {
            warn!(line, "malformed animation declaration; skipped");
            None
        }
    }
}

/// Spawn lines carry the kind, the instance count, and `count` coordinate
/// pairs on the same line. Fewer pairs than promised spawn only what is
/// there.
fn parse_spawn_line(line: &str) -> Option<SpawnDecl> {
    let mut tokens = line.split_whitespace();
    let kind = tokens.next()?;
    let Some(count) = tokens.next().and_then(|t| t.parse::<usize>().ok()) else {
        warn!(line, "malformed spawn declaration; skipped");
        return None;
    };

    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        let x = tokens.next().and_then(|t| t.parse::<i32>().ok());
        let y = tokens.next().and_then(|t| t.parse::<i32>().ok());
        match (x, y) {
            (Some(x), Some(y)) => points.push((x, y)),
            _ => {
                warn!(
                    line,
                    declared = count,
                    parsed = points.len(),
                    "spawn declaration short on coordinate pairs"
                );
                break;
            }
        }
    }

    Some(SpawnDecl {
        kind: kind.to_string(),
        points,
    })
}
