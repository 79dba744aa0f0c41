//! # soundstage-core
//!
//! Editing core of the Soundstage spatial-audio scene editor: the parameter
//! panel, gesture translation, mutation dispatch, playback, live-input
//! negotiation, asset attachment and undo. Independent of any UI toolkit;
//! the host supplies the rendering engine, audio engine, media devices and
//! sync sink.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use soundstage_core::config::Config;
//! use soundstage_core::engine::SystemClock;
//! use soundstage_core::session::EditorSession;
//! use soundstage_types::{OfflineSink, SceneState};
//!
//! let mut session = EditorSession::new(
//!     Config::load(),
//!     "editor-1",
//!     user_agent,
//!     SceneState::new(),
//!     engine,
//!     audio,
//!     media,
//!     OfflineSink,
//!     Box::new(SystemClock),
//! );
//! session.select(Selection::Entity(id))?;
//! session.begin_drag(handle, x)?;
//! session.drag_to(x + 12.0);
//! session.end_drag();
//! ```
//!
//! ## Module Overview
//!
//! - [`session`]: `EditorSession`, the owned context every UI event goes through
//! - [`panel`]: bound controls and the refresh-versus-rebuild rule
//! - [`descriptors`]: which controls each entity kind shows
//! - [`gesture`]: drags and typed entry turned into deltas
//! - [`dispatch`]: `dispatch_action()`, the single entry point for mutation
//! - [`live_input`]: device discovery and microphone stream ownership
//! - [`assets`]: file attachment, size ceiling and upload bookkeeping
//! - [`undo`]: cone and trajectory undo/redo
//! - [`journal`]: JSONL edit journal and replay
//! - [`config`]: TOML configuration (embedded defaults + user override)

pub mod assets;
pub mod config;
#[cfg(feature = "cpal")]
pub mod cpal_input;
pub mod descriptors;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod journal;
pub mod live_input;
pub mod navigation;
pub mod panel;
pub mod playback;
pub mod session;
pub mod undo;

pub use error::{EditError, EditResult, MediaError};
pub use session::EditorSession;
