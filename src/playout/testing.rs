//! In-memory catalog, frame sources and sinks for exercising the engine.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::{
    audio::{BoxedFrameSource, FrameOpener, FrameSource},
    catalog::{Catalog, CatalogEntry},
    common::PlayoutError,
    playout::{chunk::Chunk, sink::ChunkSink},
};

/// Polls `check` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    check()
}

/// Frames are `[tag, n]`, so a payload shows which track and frame it holds.
pub struct FakeFrames {
    tag: u8,
    total: usize,
    next: usize,
    fail_at: Option<usize>,
    released: Option<Arc<AtomicUsize>>,
}

impl FakeFrames {
    pub fn new(tag: u8, total: usize) -> Self {
        Self {
            tag,
            total,
            next: 0,
            fail_at: None,
            released: None,
        }
    }

    pub fn failing_at(mut self, frame: usize) -> Self {
        self.fail_at = Some(frame);
        self
    }
}

impl FrameSource for FakeFrames {
    fn next_frame(&mut self) -> Result<Option<Bytes>, PlayoutError> {
        if self.fail_at == Some(self.next) {
            return Err(PlayoutError::Decode {
                path: PathBuf::from(format!("{}.mp3", self.tag as char)),
                message: "corrupt frame".into(),
            });
        }
        if self.next >= self.total {
            return Ok(None);
        }
        let frame = Bytes::from(vec![self.tag, self.next as u8]);
        self.next += 1;
        Ok(Some(frame))
    }
}

impl Drop for FakeFrames {
    fn drop(&mut self) {
        if let Some(released) = &self.released {
            released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Clone, Copy)]
pub enum FakeTrack {
    Frames(usize),
    FailsAt { frames: usize, at: usize },
    Unopenable,
}

/// Catalog and opener in one: every file is named `<tag>.mp3`.
#[derive(Default)]
pub struct FakeLibrary {
    entries: Mutex<Vec<CatalogEntry>>,
    tracks: Mutex<HashMap<PathBuf, FakeTrack>>,
    pub opened: Mutex<Vec<PathBuf>>,
    pub released: Arc<AtomicUsize>,
    unreadable: AtomicBool,
}

impl FakeLibrary {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_tracks(tracks: &[(char, FakeTrack)]) -> Arc<Self> {
        let library = Self::new();
        for (tag, track) in tracks {
            library.add(*tag, *track);
        }
        library
    }

    pub fn add(&self, tag: char, track: FakeTrack) {
        let path = PathBuf::from(format!("{}.mp3", tag));
        self.entries.lock().push(CatalogEntry::file(path.clone()));
        self.tracks.lock().insert(path, track);
    }

    pub fn add_directory(&self, name: &str) {
        self.entries.lock().push(CatalogEntry {
            path: PathBuf::from(name),
            is_file: false,
        });
    }

    /// While set, listing the catalog fails as an unreadable directory would.
    pub fn set_unreadable(&self, unreadable: bool) {
        self.unreadable.store(unreadable, Ordering::SeqCst);
    }

    pub fn opened_count(&self) -> usize {
        self.opened.lock().len()
    }

    pub fn released_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl Catalog for FakeLibrary {
    fn entries(&self) -> Result<Vec<CatalogEntry>, PlayoutError> {
        if self.unreadable.load(Ordering::SeqCst) {
            return Err(PlayoutError::Catalog {
                path: PathBuf::from("music"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        Ok(self.entries.lock().clone())
    }
}

impl FrameOpener for FakeLibrary {
    fn open(&self, path: &Path) -> Result<BoxedFrameSource, PlayoutError> {
        let track = self.tracks.lock().get(path).copied().ok_or_else(|| PlayoutError::Open {
            path: path.to_path_buf(),
            message: "not a track".into(),
        })?;
        let tag = path.to_string_lossy().as_bytes()[0];

        let mut frames = match track {
            FakeTrack::Frames(n) => FakeFrames::new(tag, n),
            FakeTrack::FailsAt { frames, at } => FakeFrames::new(tag, frames).failing_at(at),
            FakeTrack::Unopenable => {
                return Err(PlayoutError::Open {
                    path: path.to_path_buf(),
                    message: "permission denied".into(),
                });
            }
        };
        self.opened.lock().push(path.to_path_buf());
        frames.released = Some(self.released.clone());
        Ok(Box::new(frames))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    Probe(bool),
    Write(u32),
}

/// Records every probe and write; capacity is toggled by the test.
pub struct RecordingSink {
    capacity: AtomicBool,
    closed: AtomicBool,
    pub chunks: Mutex<Vec<Chunk>>,
    pub events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new(capacity: bool) -> Arc<Self> {
        Arc::new(Self {
            capacity: AtomicBool::new(capacity),
            closed: AtomicBool::new(false),
            chunks: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn open() -> Arc<Self> {
        Self::new(true)
    }

    pub fn set_capacity(&self, capacity: bool) {
        self.capacity.store(capacity, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn indices(&self) -> Vec<u32> {
        self.chunks.lock().iter().map(|c| c.index).collect()
    }

    pub fn written(&self) -> usize {
        self.chunks.lock().len()
    }

    pub fn probes(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Probe(_)))
            .count()
    }
}

impl ChunkSink for RecordingSink {
    fn capacity_available(&self) -> Result<bool, PlayoutError> {
        if self.is_closed() {
            return Err(PlayoutError::ConnectionGone);
        }
        let capacity = self.capacity.load(Ordering::SeqCst);
        self.events.lock().push(SinkEvent::Probe(capacity));
        Ok(capacity)
    }

    fn write(&self, chunk: &Chunk) -> Result<(), PlayoutError> {
        if self.is_closed() {
            return Err(PlayoutError::ConnectionGone);
        }
        self.events.lock().push(SinkEvent::Write(chunk.index));
        self.chunks.lock().push(chunk.clone());
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
