//! Load-once detection of the native engine library.
//!
//! The library is probed the first time the engine is actually demanded,
//! never at startup. A failed load is recorded here rather than raised, so a
//! missing engine costs nothing until someone selects the backend, and then
//! surfaces as a configuration error with the loader's reason attached.

use std::env;
use std::ffi::OsString;
use std::sync::OnceLock;

use tracing::debug;

use super::native::NativeEngine;
use crate::error::SolveError;

/// Environment variable overriding the engine library path.
pub const ENGINE_LIB_VAR: &str = "BATCHOPT_ENGINE_LIB";

/// Base name of the engine library, platform-decorated at load time.
const ENGINE_LIB_NAME: &str = "nlpengine";

static ENGINE: OnceLock<Result<NativeEngine, String>> = OnceLock::new();

/// Whether the native engine can be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// The library has not been demanded yet.
    NotProbed,

    /// The library loaded and all symbols resolved.
    Available,

    /// The load was attempted and failed.
    Unavailable { reason: String },
}

/// Reports the engine's current load state without triggering a probe.
#[must_use]
pub fn status() -> Availability {
    match ENGINE.get() {
        None => Availability::NotProbed,
        Some(Ok(_)) => Availability::Available,
        Some(Err(reason)) => Availability::Unavailable {
            reason: reason.clone(),
        },
    }
}

/// Probes the engine (loading it if this is the first demand) and reports
/// whether it is usable.
#[must_use]
pub fn probe() -> bool {
    engine().is_ok()
}

fn library_path() -> OsString {
    env::var_os(ENGINE_LIB_VAR).unwrap_or_else(|| libloading::library_filename(ENGINE_LIB_NAME))
}

/// The loaded engine, or the recorded reason it could not be loaded.
pub(crate) fn engine() -> Result<&'static NativeEngine, &'static str> {
    let slot = ENGINE.get_or_init(|| {
        let path = library_path();
        match NativeEngine::load(&path) {
            Ok(engine) => Ok(engine),
            Err(e) => {
                let reason = format!("{}: {e}", path.to_string_lossy());
                debug!(%reason, "native engine library not loaded");
                Err(reason)
            }
        }
    });
    match slot {
        Ok(engine) => Ok(engine),
        Err(reason) => Err(reason.as_str()),
    }
}

/// Maps a load failure into the error returned when the backend is selected.
pub(crate) fn unavailable(reason: &str) -> SolveError {
    SolveError::EngineUnavailable {
        reason: reason.to_owned(),
    }
}
