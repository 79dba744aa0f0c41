//! Dispatch abstraction for edit actions.

use crate::{EditAction, MutationResult};

/// Anything that can apply an `EditAction` to a scene.
///
/// The editor session dispatches locally; replay tooling can dispatch
/// against a bare scene.
pub trait Dispatcher {
    fn dispatch(&mut self, action: &EditAction) -> MutationResult;
}
