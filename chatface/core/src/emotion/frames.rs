//! Frame Storage
//!
//! Animation frames are fixed-size RGB565 blobs addressed as
//! `<clip>/<index>.bin`. Loaded frames are wrapped in [`FrameBuffer`]s
//! accounted by a [`FramePool`], so the number of live buffers (and the
//! high-water mark) can be observed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{AnimationDescriptor, FrameGeometry};
use crate::error::FrameError;

// ============================================================================
// Backing Store
// ============================================================================

/// Path-addressed source of frame blobs
#[async_trait]
pub trait FrameStore: Send + Sync {
    /// Read frame `index` of `clip`
    async fn read_frame(&self, clip: &str, index: usize) -> Result<Vec<u8>, FrameError>;
}

/// Frame store backed by a directory tree (typically the SD card mount)
#[derive(Clone, Debug)]
pub struct FsFrameStore {
    root: PathBuf,
}

impl FsFrameStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of frame `index` of `clip`
    #[must_use]
    pub fn frame_path(&self, clip: &str, index: usize) -> PathBuf {
        self.root.join(clip).join(format!("{index}.bin"))
    }
}

#[async_trait]
impl FrameStore for FsFrameStore {
    async fn read_frame(&self, clip: &str, index: usize) -> Result<Vec<u8>, FrameError> {
        let path = self.frame_path(clip, index);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FrameError::Missing {
                clip: clip.to_string(),
                index,
            }),
            Err(source) => Err(FrameError::Io { path, source }),
        }
    }
}

/// In-memory frame store
#[derive(Debug, Default)]
pub struct MemoryFrameStore {
    frames: RwLock<HashMap<(String, usize), Vec<u8>>>,
}

impl MemoryFrameStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a frame
    pub fn insert(&self, clip: &str, index: usize, bytes: Vec<u8>) {
        self.frames.write().insert((clip.to_string(), index), bytes);
    }

    /// Remove a frame
    pub fn remove(&self, clip: &str, index: usize) -> Option<Vec<u8>> {
        self.frames.write().remove(&(clip.to_string(), index))
    }

    /// Fill every frame of `descriptor` with a solid shade per frame
    pub fn fill_clip(&self, descriptor: &AnimationDescriptor, geometry: FrameGeometry) {
        for index in 0..descriptor.frame_count {
            let shade = u8::try_from(index % 256).unwrap_or(u8::MAX);
            self.insert(descriptor.clip, index, vec![shade; geometry.frame_bytes()]);
        }
    }
}

#[async_trait]
impl FrameStore for MemoryFrameStore {
    async fn read_frame(&self, clip: &str, index: usize) -> Result<Vec<u8>, FrameError> {
        self.frames
            .read()
            .get(&(clip.to_string(), index))
            .cloned()
            .ok_or_else(|| FrameError::Missing {
                clip: clip.to_string(),
                index,
            })
    }
}

// ============================================================================
// Buffers
// ============================================================================

/// Accounting for frame buffers alive at any moment
#[derive(Debug, Default)]
pub struct FramePool {
    live: AtomicUsize,
    peak: AtomicUsize,
    allocated: AtomicUsize,
}

impl FramePool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Take ownership of a loaded frame
    pub fn adopt(self: &Arc<Self>, pixels: Vec<u8>) -> FrameBuffer {
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(live, Ordering::SeqCst);
        self.allocated.fetch_add(1, Ordering::Relaxed);
        FrameBuffer {
            pixels: pixels.into_boxed_slice(),
            pool: Arc::clone(self),
        }
    }

    /// Buffers currently alive
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of buffers alive at once
    #[must_use]
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Buffers adopted over the pool's lifetime
    #[must_use]
    pub fn total_allocated(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }
}

/// One preloaded frame, owned by exactly one playback session
#[derive(Debug)]
pub struct FrameBuffer {
    pixels: Box<[u8]>,
    pool: Arc<FramePool>,
}

impl FrameBuffer {
    /// Raw RGB565 bytes
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        self.pool.live.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Preloading
// ============================================================================

/// Load the frames of `descriptor` in order
///
/// Stops at the first frame that is missing, unreadable, or not exactly
/// `geometry.frame_bytes()` long; the frames loaded before it are returned.
pub(crate) async fn preload(
    store: &dyn FrameStore,
    pool: &Arc<FramePool>,
    descriptor: &AnimationDescriptor,
    geometry: FrameGeometry,
) -> Vec<FrameBuffer> {
    let expected = geometry.frame_bytes();
    let mut frames = Vec::with_capacity(descriptor.frame_count);

    for index in 0..descriptor.frame_count {
        let result = store
            .read_frame(descriptor.clip, index)
            .await
            .and_then(|bytes| {
                if bytes.len() == expected {
                    Ok(bytes)
                } else {
                    Err(FrameError::WrongSize {
                        clip: descriptor.clip.to_string(),
                        index,
                        expected,
                        actual: bytes.len(),
                    })
                }
            });

        match result {
            Ok(bytes) => frames.push(pool.adopt(bytes)),
            Err(e) => {
                tracing::warn!(
                    clip = descriptor.clip,
                    loaded = frames.len(),
                    error = %e,
                    "Frame preload aborted"
                );
                break;
            }
        }
    }

    frames
}
