//! `PlayoutEngine`: the playout loop and its public control surface.
//!
//! The loop runs on its own OS thread and owns nothing but the per-session
//! sequencer. Everything shared with the accept path lives in the
//! [`SessionManager`].

use std::{path::Path, sync::Arc, thread};

use tracing::{Level, debug, error, info, span, warn};

use crate::{
    audio::{FrameOpener, SymphoniaOpener},
    catalog::{Catalog, DirCatalog},
    common::{PlayoutError, SessionId},
    configs::{PlayoutConfig, TrackErrorPolicy},
    playout::{
        chunk::{Chunk, ChunkAssembler},
        sequencer::Sequencer,
        session::{ActiveSession, SessionManager, SessionStatus, Wait},
        sink::SharedSink,
    },
};

pub struct PlayoutEngine {
    config: PlayoutConfig,
    catalog: Arc<dyn Catalog>,
    opener: Arc<dyn FrameOpener>,
    sessions: SessionManager,
}

impl PlayoutEngine {
    pub fn new(
        config: PlayoutConfig,
        catalog: Arc<dyn Catalog>,
        opener: Arc<dyn FrameOpener>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            catalog,
            opener,
            sessions: SessionManager::new(),
        })
    }

    /// Engine over the configured directory, demuxing with symphonia.
    pub fn from_config(config: PlayoutConfig) -> Arc<Self> {
        let catalog = Arc::new(DirCatalog::new(config.catalog_path.clone()));
        Self::new(config, catalog, Arc::new(SymphoniaOpener))
    }

    pub fn config(&self) -> &PlayoutConfig {
        &self.config
    }

    pub fn catalog(&self) -> Arc<dyn Catalog> {
        self.catalog.clone()
    }

    pub fn attach(&self, sink: SharedSink) -> Result<SessionId, PlayoutError> {
        self.sessions.attach(sink)
    }

    pub fn detach(&self) -> Option<SessionId> {
        self.sessions.detach()
    }

    /// Detaches `id` if it is still current; used when a listener hangs up.
    pub fn detach_session(&self, id: &SessionId) -> bool {
        self.sessions.detach_session(id)
    }

    /// Stops playout permanently and closes the active connection.
    pub fn disable(&self) {
        self.sessions.disable();
    }

    pub fn status(&self) -> SessionStatus {
        self.sessions.status()
    }

    /// Starts the playout loop on a dedicated thread.
    pub fn spawn(self: &Arc<Self>) -> std::io::Result<thread::JoinHandle<()>> {
        let engine = self.clone();
        thread::Builder::new()
            .name("playout".into())
            .spawn(move || engine.run())
    }

    /// Runs the playout loop until the engine is disabled.
    pub fn run(&self) {
        info!(
            "Playout loop started: catalog={} frame_count={}",
            self.config.catalog_path.display(),
            self.config.frame_count
        );

        loop {
            match self.sessions.wait_for_session(self.config.poll_interval()) {
                Wait::Session(session) => self.serve(session),
                Wait::Idle => continue,
                Wait::Stopped => break,
            }
        }

        info!("Playout loop stopped");
    }

    fn serve(&self, session: ActiveSession) {
        let _span = span!(Level::INFO, "session", id = %session.id).entered();

        match self.play_catalog(&session) {
            Ok(sent) => {
                info!("Catalog pass complete: {} chunks", sent);
                self.sessions.finish(&session.id);
            }
            Err(e) if !self.sessions.is_current(&session.id) => {
                debug!("Session ended during playout: {}", e);
            }
            Err(e) => {
                error!("Session aborted: {}", e);
                self.sessions.detach_session(&session.id);
            }
        }
    }

    fn play_catalog(&self, session: &ActiveSession) -> Result<u64, PlayoutError> {
        let mut sequencer = Sequencer::new();

        for path in self.catalog.tracks()? {
            self.sessions.set_track(&session.id, &path);
            match self.play_track(session, &path, &mut sequencer) {
                Ok(()) => {}
                Err(e)
                    if e.is_track_local()
                        && self.config.on_track_error == TrackErrorPolicy::SkipTrack =>
                {
                    warn!("Skipping track: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(sequencer.issued())
    }

    /// Streams one track. The frame source is dropped, and the file closed,
    /// on every return path.
    fn play_track(
        &self,
        session: &ActiveSession,
        path: &Path,
        sequencer: &mut Sequencer,
    ) -> Result<(), PlayoutError> {
        debug!("Streaming {}", path.display());

        let mut frames = self.opener.open(path)?;
        let mut assembler = ChunkAssembler::new(frames.as_mut(), self.config.frame_count);

        while let Some(batch) = assembler.next_batch()? {
            self.await_capacity(session)?;
            let chunk = Chunk::new(sequencer.advance(), batch);
            session.sink.write(&chunk)?;
            self.sessions.record_chunk(&session.id);
        }

        Ok(())
    }

    /// Blocks until the sink can take a chunk, re-probing once per poll
    /// interval. Fails as soon as the session is no longer current.
    fn await_capacity(&self, session: &ActiveSession) -> Result<(), PlayoutError> {
        loop {
            if !self.sessions.is_current(&session.id) {
                return Err(PlayoutError::ConnectionGone);
            }
            if session.sink.capacity_available()? {
                return Ok(());
            }
            thread::sleep(self.config.poll_interval());
        }
    }
}
