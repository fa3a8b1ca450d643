//! Best-effort asynchronous loading of the environment reflection map.
//!
//! Loading never blocks the frame loop. A loader decodes somewhere else and
//! hands its result to an [`EnvironmentCompletion`], which parks it in a
//! shared slot that the frame loop polls. Once the owning session is gone
//! the completion drops the result instead of touching released resources.

use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use thiserror::Error;

/// Environment map loading errors
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Failed to decode environment map: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Environment map is empty")]
    Empty,

    #[error("Loader gave up without reporting a result")]
    Abandoned,
}

/// Decoded equirectangular RGBA32F image
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<[f32; 4]>,
}

impl EnvironmentMap {
    /// Decode any format the `image` crate understands (EXR, HDR, PNG, ...)
    pub fn decode(path: &std::path::Path) -> Result<Self, EnvironmentError> {
        let rgba = image::open(path)?.into_rgba32f();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(EnvironmentError::Empty);
        }

        let texels = rgba
            .pixels()
            .map(|p| [p.0[0], p.0[1], p.0[2], p.0[3]])
            .collect();

        Ok(Self {
            width,
            height,
            texels,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }
}

/// Where a load stands, as seen by the frame loop
#[derive(Debug, Default)]
pub enum LoadState {
    Pending,
    Loaded(EnvironmentMap),
    Failed(EnvironmentError),
    /// Nothing to take: never started, or already taken by the frame loop
    #[default]
    Settled,
}

/// Shared load slot plus the liveness flag of its owner
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSlot {
    state: Arc<Mutex<LoadState>>,
    alive: Arc<AtomicBool>,
}

impl EnvironmentSlot {
    /// Mark a load as started and return the handle that finishes it
    pub fn begin(&self) -> EnvironmentCompletion {
        self.alive.store(true, Ordering::Release);
        *self.lock() = LoadState::Pending;
        EnvironmentCompletion {
            slot: Some(self.clone()),
        }
    }

    /// Take a finished result, leaving the slot settled
    pub fn take_finished(&self) -> Option<Result<EnvironmentMap, EnvironmentError>> {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, LoadState::Settled) {
            LoadState::Loaded(map) => Some(Ok(map)),
            LoadState::Failed(err) => Some(Err(err)),
            other => {
                *state = other;
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.lock(), LoadState::Pending)
    }

    /// Owner released: later completions are discarded
    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
        *self.lock() = LoadState::Settled;
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One-shot handle a loader uses to report its result.
///
/// Dropping it unused (a loader that panics or forgets it) counts as a
/// failed load, so the frame loop always gets an answer.
#[derive(Debug)]
pub struct EnvironmentCompletion {
    slot: Option<EnvironmentSlot>,
}

impl EnvironmentCompletion {
    /// Publish the result; returns false if the owner is already gone
    pub fn complete(mut self, result: Result<EnvironmentMap, EnvironmentError>) -> bool {
        match self.slot.take() {
            Some(slot) => Self::publish(&slot, result),
            None => false,
        }
    }

    fn publish(slot: &EnvironmentSlot, result: Result<EnvironmentMap, EnvironmentError>) -> bool {
        // Hold the lock across the liveness check so close() cannot interleave
        let mut state = slot.lock();
        if !slot.is_alive() {
            debug!("Environment map finished after teardown, discarding");
            return false;
        }
        *state = match result {
            Ok(map) => LoadState::Loaded(map),
            Err(err) => LoadState::Failed(err),
        };
        true
    }
}

impl Drop for EnvironmentCompletion {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            if slot.is_pending() {
                Self::publish(&slot, Err(EnvironmentError::Abandoned));
            }
        }
    }
}

/// Starts an environment map load that finishes through `completion`
pub trait EnvironmentLoader {
    fn begin(&self, url: &str, completion: EnvironmentCompletion);
}

/// Decodes files from disk on a worker thread
#[derive(Debug, Default, Clone, Copy)]
pub struct FileEnvironmentLoader;

impl EnvironmentLoader for FileEnvironmentLoader {
    fn begin(&self, url: &str, completion: EnvironmentCompletion) {
        let path = PathBuf::from(url);

        // A failed spawn drops the closure, and the completion with it
        let spawned = thread::Builder::new()
            .name("environment-loader".to_string())
            .spawn(move || {
                let result = EnvironmentMap::decode(&path);
                if let Ok(map) = &result {
                    info!(
                        "Environment map {} decoded ({}x{})",
                        path.display(),
                        map.width,
                        map.height
                    );
                }
                completion.complete(result);
            });

        if let Err(e) = spawned {
            warn!("Failed to start environment loader thread: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_map() -> EnvironmentMap {
        EnvironmentMap {
            width: 1,
            height: 1,
            texels: vec![[0.5, 0.5, 0.5, 1.0]],
        }
    }

    #[test]
    fn test_completion_publishes_result() {
        let slot = EnvironmentSlot::default();
        let completion = slot.begin();
        assert!(slot.is_pending());
        assert!(slot.take_finished().is_none());

        assert!(completion.complete(Ok(tiny_map())));
        assert!(matches!(slot.take_finished(), Some(Ok(_))));

        // Taken exactly once
        assert!(slot.take_finished().is_none());
    }

    #[test]
    fn test_completion_after_close_is_discarded() {
        let slot = EnvironmentSlot::default();
        let completion = slot.begin();
        slot.close();

        assert!(!completion.complete(Ok(tiny_map())));
        assert!(slot.take_finished().is_none());
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_dropped_completion_fails_the_load() {
        let slot = EnvironmentSlot::default();
        drop(slot.begin());

        assert!(matches!(slot.take_finished(), Some(Err(EnvironmentError::Abandoned))));
    }

    #[test]
    fn test_panicking_loader_still_finishes() {
        let slot = EnvironmentSlot::default();
        let completion = slot.begin();
        let worker = thread::spawn(move || {
            let _held = completion;
            panic!("decoder blew up");
        });
        assert!(worker.join().is_err());

        assert!(matches!(slot.take_finished(), Some(Err(_))));
    }

    #[test]
    fn test_completed_handle_is_not_overwritten_on_drop() {
        let slot = EnvironmentSlot::default();
        assert!(slot.begin().complete(Ok(tiny_map())));
        assert!(matches!(slot.take_finished(), Some(Ok(_))));
        assert!(slot.take_finished().is_none());
    }

    #[test]
    fn test_dropped_completion_after_close_stays_quiet() {
        let slot = EnvironmentSlot::default();
        let completion = slot.begin();
        slot.close();
        drop(completion);
        assert!(slot.take_finished().is_none());
    }

    #[test]
    fn test_map_bytes_layout() {
        let map = tiny_map();
        assert_eq!(map.bytes().len(), 16);
    }

    #[test]
    fn test_missing_file_fails_to_decode() {
        let result = EnvironmentMap::decode(std::path::Path::new("/nonexistent/env.exr"));
        assert!(result.is_err());
    }

    #[test]
    fn test_file_loader_reports_failure() {
        let slot = EnvironmentSlot::default();
        FileEnvironmentLoader.begin("/nonexistent/env.exr", slot.begin());

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let result = loop {
            if let Some(result) = slot.take_finished() {
                break result;
            }
            assert!(std::time::Instant::now() < deadline, "loader never finished");
            thread::sleep(std::time::Duration::from_millis(5));
        };
        assert!(result.is_err());
    }
}
