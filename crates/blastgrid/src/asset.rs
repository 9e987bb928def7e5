//! # Asset Cache
//!
//! Entities refer to their graphics and sounds by logical name (e.g.
//! `"graphics/teleport.png"`). The [`AssetCache`] resolves that name against
//! its root directory, loads the file the first time it's requested and hands
//! out shared handles afterward.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  AssetCache (owned by GameContext)                   │
//! │                                                      │
//! │  textures ── name → Arc<Texture>  (decoded RGBA8)    │
//! │  sounds   ── name → Arc<[u8]>     (raw bytes)        │
//! │  fonts    ── name → Arc<[u8]>     (raw bytes)        │
//! │                                                      │
//! │  sound_queue ── sounds requested this frame, drained │
//! │                 by whoever owns the audio device,    │
//! │                 cleared when the next frame starts   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Graceful Degradation
//!
//! A missing or corrupt file never stops the game. The failure is logged once
//! and a blank placeholder is cached under the requested name, so later
//! lookups are silent and cheap.
//!
//! ## Sound Requests
//!
//! The simulation doesn't own an audio device. Sounds are *requested*: the
//! cache queues the name unless sounds are muted or the per-frame limit of
//! parallel sounds is reached, and the host drains the queue after each
//! frame. [`begin_frame`](AssetCache::begin_frame) throws away whatever the
//! host didn't take, so the limit applies to one frame at a time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// User-facing audio options.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub sounds_mute: bool,
    pub sounds_volume: f32,
    pub music_mute: bool,
    pub music_volume: f32,
    /// Upper bound on sounds started in the same frame.
    pub max_parallel_sounds: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            sounds_mute: false,
            sounds_volume: 100.0,
            music_mute: false,
            music_volume: 100.0,
            max_parallel_sounds: 8,
        }
    }
}

/// A decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Texture {
    /// A 1x1 transparent placeholder.
    pub fn blank() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![0; 4],
        }
    }

    pub fn is_blank(&self) -> bool {
        self.width == 1 && self.height == 1 && self.rgba.iter().all(|&b| b == 0)
    }
}

pub struct AssetCache {
    root: PathBuf,
    textures: HashMap<String, Arc<Texture>>,
    sounds: HashMap<String, Arc<[u8]>>,
    fonts: HashMap<String, Arc<[u8]>>,
    sound_queue: Vec<String>,
}

impl AssetCache {
    /// Create a cache resolving names relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            textures: HashMap::new(),
            sounds: HashMap::new(),
            fonts: HashMap::new(),
            sound_queue: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get a texture, loading and decoding it on first use.
    pub fn texture(&mut self, name: &str) -> Arc<Texture> {
        if let Some(tex) = self.textures.get(name) {
            return Arc::clone(tex);
        }
        let path = self.root.join(name);
        let tex = match image::open(&path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let (width, height) = rgba.dimensions();
                log::debug!("loaded texture {name} ({width}x{height})");
                Texture {
                    width,
                    height,
                    rgba: rgba.into_raw(),
                }
            }
            Err(e) => {
                let path = path.display();
                log::warn!("Failed to load texture {path}: {e}. Using a blank texture.");
                Texture::blank()
            }
        };
        let tex = Arc::new(tex);
        self.textures.insert(name.to_string(), Arc::clone(&tex));
        tex
    }

    /// Get a sound's raw bytes, reading the file on first use.
    pub fn sound(&mut self, name: &str) -> Arc<[u8]> {
        load_bytes(&self.root, &mut self.sounds, name, "sound")
    }

    /// Get a font's raw bytes, reading the file on first use.
    pub fn font(&mut self, name: &str) -> Arc<[u8]> {
        load_bytes(&self.root, &mut self.fonts, name, "font")
    }

    /// Request a sound to be played this frame.
    ///
    /// Returns `false` if the request was dropped (muted or too many sounds).
    pub fn play_sound(&mut self, name: &str, options: &Options) -> bool {
        if options.sounds_mute {
            return false;
        }
        if self.sound_queue.len() >= options.max_parallel_sounds {
            log::debug!("dropping sound {name}: {} already queued", self.sound_queue.len());
            return false;
        }
        self.sound_queue.push(name.to_string());
        true
    }

    /// Take all queued sound requests.
    pub fn drain_sounds(&mut self) -> Vec<String> {
        std::mem::take(&mut self.sound_queue)
    }

    /// Start a new frame of sound requests.
    pub fn begin_frame(&mut self) {
        if !self.sound_queue.is_empty() {
            log::trace!("{} sound requests were never drained", self.sound_queue.len());
            self.sound_queue.clear();
        }
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

fn load_bytes(
    root: &Path,
    map: &mut HashMap<String, Arc<[u8]>>,
    name: &str,
    kind: &str,
) -> Arc<[u8]> {
    if let Some(bytes) = map.get(name) {
        return Arc::clone(bytes);
    }
    let path = root.join(name);
    let bytes: Arc<[u8]> = match std::fs::read(&path) {
        Ok(b) => b.into(),
        Err(e) => {
            log::warn!("Failed to load {kind} {}: {e}. Using an empty {kind}.", path.display());
            Arc::from(Vec::new())
        }
    };
    map.insert(name.to_string(), Arc::clone(&bytes));
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_texture_falls_back_to_blank() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = AssetCache::new(dir.path());
        let tex = cache.texture("nope.png");
        assert!(tex.is_blank());
        // Cached: second lookup returns the same allocation.
        assert!(Arc::ptr_eq(&tex, &cache.texture("nope.png")));
        assert_eq!(cache.texture_count(), 1);
    }

    #[test]
    fn texture_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]));
        img.save(dir.path().join("red.png")).unwrap();
        let mut cache = AssetCache::new(dir.path());
        let tex = cache.texture("red.png");
        assert_eq!((tex.width, tex.height), (2, 3));
        assert_eq!(&tex.rgba[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn sound_bytes_are_cached() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("warp.ogg"), b"OggS").unwrap();
        let mut cache = AssetCache::new(dir.path());
        assert_eq!(&*cache.sound("warp.ogg"), b"OggS");
        assert!(cache.sound("missing.ogg").is_empty());
    }

    #[test]
    fn sound_requests_honor_mute_and_limit() {
        let mut cache = AssetCache::new(".");
        let mut options = Options {
            max_parallel_sounds: 2,
            ..Options::default()
        };
        assert!(cache.play_sound("a", &options));
        assert!(cache.play_sound("b", &options));
        assert!(!cache.play_sound("c", &options));
        assert_eq!(cache.drain_sounds(), vec!["a".to_string(), "b".to_string()]);

        options.sounds_mute = true;
        assert!(!cache.play_sound("d", &options));
        assert!(cache.drain_sounds().is_empty());
    }

    #[test]
    fn sound_limit_is_per_frame() {
        let mut cache = AssetCache::new(".");
        let options = Options {
            max_parallel_sounds: 1,
            ..Options::default()
        };
        assert!(cache.play_sound("a", &options));
        assert!(!cache.play_sound("b", &options));
        // Nobody drained frame one.
        cache.begin_frame();
        assert!(cache.play_sound("c", &options));
        assert_eq!(cache.drain_sounds(), vec!["c".to_string()]);
    }
}
