use std::collections::BTreeMap;

use foundation::handles::TextureHandle;
use foundation::time::Time;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, Insert, TextureCache};
use crate::candidates::{DEFAULT_EXTENSIONS, has_extension, panorama_candidates};
use crate::request::{LoadPurpose, LoadTicket};
use crate::residency::TransitionState;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Total attempts per candidate path (first try included).
    pub max_attempts: u32,
    /// Delay between attempts on the same candidate (seconds).
    pub retry_delay_s: f64,
    /// Blend units per second; 2.4 fades in a little over 0.4 s.
    pub fade_rate: f64,
    pub extensions: Vec<String>,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_s: 0.2,
            fade_rate: 2.4,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Host-reported reason a texture could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct LoadFailure {
    pub reason: String,
}

impl LoadFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Work for the rendering host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureCommand {
    /// Decode/upload `path`, then report back via
    /// [`TextureTransitionController::complete`] with `ticket`.
    Load { ticket: LoadTicket, path: String },
    /// Free the GPU texture.
    Dispose(TextureHandle),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedTexture {
    pub handle: TextureHandle,
    pub path: String,
}

/// What the renderer should draw this frame: `base` at opacity `1 - blend`
/// under `incoming` at opacity `blend`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlendView {
    pub base: Option<TextureHandle>,
    pub incoming: Option<TextureHandle>,
    pub blend: f64,
}

#[derive(Debug, Clone)]
struct Target {
    area_id: String,
    panorama_ref: String,
    candidates: Vec<String>,
    candidate: usize,
    attempt: u32,
    retry_at: Option<Time>,
}

#[derive(Debug, Clone)]
struct InFlight {
    generation: u64,
    path: String,
    purpose: LoadPurpose,
}

/// Resolves, loads and cross-fades the panorama of the area being navigated to.
///
/// The controller never performs I/O. It queues [`TextureCommand`]s, the host
/// executes them and reports results through [`complete`](Self::complete),
/// and [`tick`](Self::tick) drives both the retry timer and the blend.
///
/// Staleness contract:
/// - Every [`navigate`](Self::navigate) bumps a generation counter.
/// - A display load from an older generation never changes base/incoming;
///   its texture is cached (or disposed if the path is already cached).
/// - After [`shutdown`](Self::shutdown) every late texture is disposed.
#[derive(Debug)]
pub struct TextureTransitionController {
    config: TransitionConfig,
    cache: TextureCache,
    clock: Time,
    generation: u64,
    next_ticket: u64,
    state: TransitionState,
    target: Option<Target>,
    in_flight: BTreeMap<LoadTicket, InFlight>,
    base: Option<DisplayedTexture>,
    incoming: Option<DisplayedTexture>,
    blend: f64,
    error_flag: bool,
    shut_down: bool,
    commands: Vec<TextureCommand>,
}

impl Default for TextureTransitionController {
    fn default() -> Self {
        Self::new(TransitionConfig::default())
    }
}

impl TextureTransitionController {
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            config,
            cache: TextureCache::new(),
            clock: Time::ZERO,
            generation: 0,
            next_ticket: 1,
            state: TransitionState::Idle,
            target: None,
            in_flight: BTreeMap::new(),
            base: None,
            incoming: None,
            blend: 1.0,
            error_flag: false,
            shut_down: false,
            commands: Vec::new(),
        }
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// Raised when every candidate of the current target failed.
    pub fn error_flag(&self) -> bool {
        self.error_flag
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn target_area_id(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.area_id.as_str())
    }

    pub fn base(&self) -> Option<&DisplayedTexture> {
        self.base.as_ref()
    }

    pub fn incoming(&self) -> Option<&DisplayedTexture> {
        self.incoming.as_ref()
    }

    pub fn blend(&self) -> f64 {
        self.blend
    }

    pub fn view(&self) -> BlendView {
        BlendView {
            base: self.base.as_ref().map(|t| t.handle),
            incoming: self.incoming.as_ref().map(|t| t.handle),
            blend: self.blend,
        }
    }

    pub fn cache(&self) -> &TextureCache {
        &self.cache
    }

    /// No load pending for the current target and no fade in progress.
    pub fn is_settled(&self) -> bool {
        self.incoming.is_none() && !matches!(self.state, TransitionState::Loading { .. })
    }

    pub fn drain_commands(&mut self) -> Vec<TextureCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Start showing the panorama of `area_id`.
    ///
    /// Re-navigating to the target that is already loading or shown is a
    /// no-op; after a failure it starts over.
    pub fn navigate(&mut self, area_id: &str, panorama_ref: &str) {
        if self.shut_down {
            debug!(area_id, "navigation after shutdown ignored");
            return;
        }

        if let Some(target) = &self.target {
            let same = target.area_id == area_id && target.panorama_ref == panorama_ref;
            if same && self.state != TransitionState::Failed {
                return;
            }
        }

        self.generation += 1;
        self.state = TransitionState::Resolving;

        let candidates = panorama_candidates(panorama_ref, self.config.extensions.as_slice());
        debug!(
            area_id,
            generation = self.generation,
            candidates = candidates.len(),
            "resolving panorama"
        );

        self.target = Some(Target {
            area_id: area_id.to_string(),
            panorama_ref: panorama_ref.to_string(),
            candidates,
            candidate: 0,
            attempt: 0,
            retry_at: None,
        });

        self.start_candidate();
    }

    /// Warm the cache for `paths`; only references with an extension are
    /// fetched, once each, without retries.
    pub fn prefetch<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>) {
        if self.shut_down {
            return;
        }
        for path in paths {
            let key = CacheKey::new(path);
            let pending = self.in_flight.values().any(|f| f.path == path);
            if !has_extension(path) || pending || self.cache.contains(&key) {
                continue;
            }
            self.issue_load(path.to_string(), LoadPurpose::Prefetch);
        }
    }

    /// Report the outcome of a [`TextureCommand::Load`].
    pub fn complete(&mut self, ticket: LoadTicket, result: Result<TextureHandle, LoadFailure>) {
        let Some(flight) = self.in_flight.remove(&ticket) else {
            // Unknown, or outlived a shutdown: nobody will ever display it.
            if let Ok(handle) = result {
                debug!(ticket = ticket.0, "disposing texture for unknown load");
                self.commands.push(TextureCommand::Dispose(handle));
            }
            return;
        };

        match (flight.purpose, result) {
            (LoadPurpose::Prefetch, Ok(handle)) => {
                self.store(&flight.path, handle);
            }
            (LoadPurpose::Prefetch, Err(err)) => {
                debug!(path = %flight.path, %err, "prefetch failed");
            }
            (LoadPurpose::Display, result) if flight.generation != self.generation => {
                debug!(path = %flight.path, generation = flight.generation, "stale load discarded");
                if let Ok(handle) = result {
                    self.store(&flight.path, handle);
                }
            }
            (LoadPurpose::Display, Ok(handle)) => {
                let handle = self.store(&flight.path, handle);
                self.error_flag = false;
                self.state = TransitionState::Ready;
                if let Some(target) = &self.target {
                    info!(area_id = %target.area_id, path = %flight.path, "panorama ready");
                }
                self.present(handle, flight.path);
            }
            (LoadPurpose::Display, Err(err)) => self.on_display_failure(&flight.path, err),
        }
    }

    /// Advance the retry timer and the cross-fade by `dt_s` seconds.
    pub fn tick(&mut self, dt_s: f64) {
        let dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
        self.clock = self.clock.after(dt_s);

        self.fire_due_retry();

        if self.incoming.is_some() && self.blend < 1.0 {
            self.blend = (self.blend + dt_s * self.config.fade_rate).min(1.0);
        }
        if self.blend >= 1.0 {
            if let Some(incoming) = self.incoming.take() {
                if let Some(old) = self.base.replace(incoming) {
                    self.release(old.handle);
                }
            }
        }
    }

    /// Release every texture this controller owns and stop accepting work.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.generation += 1;
        self.in_flight.clear();
        self.target = None;
        self.state = TransitionState::Idle;
        self.error_flag = false;

        let mut released = self.cache.release_all();
        for shown in [self.base.take(), self.incoming.take()].into_iter().flatten() {
            if !released.contains(&shown.handle) {
                released.push(shown.handle);
            }
        }
        self.blend = 1.0;

        debug!(textures = released.len(), "texture pool released");
        self.commands
            .extend(released.into_iter().map(TextureCommand::Dispose));
    }

    fn show_cached(&mut self, handle: TextureHandle, path: String) {
        self.error_flag = false;
        self.state = TransitionState::Ready;
        self.present(handle, path);
    }

    /// Take the current candidate from the cache, or begin its first load
    /// attempt. Fails once no candidates are left.
    fn start_candidate(&mut self) {
        let Some(target) = self.target.as_mut() else {
            return;
        };
        let Some(path) = target.candidates.get(target.candidate).cloned() else {
            self.fail();
            return;
        };

        if let Some(handle) = self.cache.peek(&CacheKey::new(path.as_str())) {
            self.show_cached(handle, path);
            return;
        }

        target.attempt = 1;
        target.retry_at = None;
        self.state = TransitionState::Loading {
            candidate: target.candidate,
            attempt: 1,
        };
        self.issue_load(path, LoadPurpose::Display);
    }

    fn on_display_failure(&mut self, path: &str, err: LoadFailure) {
        let max_attempts = self.config.max_attempts.max(1);
        let retry_at = self.clock.after(self.config.retry_delay_s);
        let Some(target) = self.target.as_mut() else {
            return;
        };
        debug!(path, attempt = target.attempt, %err, "panorama load failed");

        if target.attempt < max_attempts {
            target.attempt += 1;
            target.retry_at = Some(retry_at);
            self.state = TransitionState::Loading {
                candidate: target.candidate,
                attempt: target.attempt,
            };
            return;
        }

        target.candidate += 1;
        self.start_candidate();
    }

    fn fire_due_retry(&mut self) {
        let Some(target) = self.target.as_mut() else {
            return;
        };
        let Some(at) = target.retry_at else {
            return;
        };
        if !self.clock.has_reached(at) {
            return;
        }
        target.retry_at = None;
        if let Some(path) = target.candidates.get(target.candidate).cloned() {
            self.issue_load(path, LoadPurpose::Display);
        }
    }

    fn fail(&mut self) {
        self.state = TransitionState::Failed;
        self.error_flag = true;
        if let Some(target) = &self.target {
            warn!(
                area_id = %target.area_id,
                panorama = %target.panorama_ref,
                "panorama unavailable; keeping previous texture"
            );
        }
    }

    fn issue_load(&mut self, path: String, purpose: LoadPurpose) {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight.insert(
            ticket,
            InFlight {
                generation: self.generation,
                path: path.clone(),
                purpose,
            },
        );
        self.commands.push(TextureCommand::Load { ticket, path });
    }

    /// Cache `handle` under `path`, returning the handle to use from now on.
    fn store(&mut self, path: &str, handle: TextureHandle) -> TextureHandle {
        match self.cache.insert(CacheKey::new(path), handle) {
            Insert::Stored => handle,
            Insert::AlreadyCached(existing) => {
                if existing != handle {
                    self.commands.push(TextureCommand::Dispose(handle));
                }
                existing
            }
        }
    }

    fn present(&mut self, handle: TextureHandle, path: String) {
        let shown = DisplayedTexture { handle, path };

        if self.incoming.as_ref().is_some_and(|t| t.handle == handle) {
            return;
        }

        match self.base.as_ref().map(|t| t.handle) {
            None => {
                self.base = Some(shown);
                self.blend = 1.0;
            }
            Some(base) if base == handle => {
                // Back to what is already underneath; drop the half-faded layer.
                if let Some(old) = self.incoming.take() {
                    self.release(old.handle);
                }
                self.blend = 1.0;
            }
            Some(_) => {
                if let Some(old) = self.incoming.replace(shown) {
                    self.release(old.handle);
                }
                self.blend = 0.0;
            }
        }
    }

    /// Dispose `handle` unless the cache or a visible layer still uses it.
    fn release(&mut self, handle: TextureHandle) {
        let visible = self.base.as_ref().is_some_and(|t| t.handle == handle)
            || self.incoming.as_ref().is_some_and(|t| t.handle == handle);
        if self.cache.holds(handle) || visible {
            return;
        }
        self.commands.push(TextureCommand::Dispose(handle));
    }
}
