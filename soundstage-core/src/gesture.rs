//! Gesture translator: pointer drags and typed entry become signed deltas.
//!
//! The translator never touches entity state. It produces `EditAction`s via
//! the descriptor's `mutate` and leaves dispatch to the session.

use soundstage_types::{EditAction, FieldTarget, ParamField, ParameterDescriptor};

use crate::engine::SceneEngine;
use crate::error::{EditError, EditResult};
use crate::panel::ControlHandle;

/// The in-progress drag. At most one exists at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSession {
    pub handle: ControlHandle,
    pub descriptor: ParameterDescriptor,
    pub origin_x: f32,
    pub last_x: f32,
}

pub struct GestureTranslator {
    session: Option<GestureSession>,
    pixels_per_unit: f32,
}

impl GestureTranslator {
    pub fn new(pixels_per_unit: f32) -> Self {
        Self {
            session: None,
            pixels_per_unit,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    /// Start a drag on a bound control. Rejected while another drag is live;
    /// the live one is left untouched.
    pub fn begin_drag(
        &mut self,
        handle: ControlHandle,
        descriptor: &ParameterDescriptor,
        x: f32,
        engine: &mut dyn SceneEngine,
    ) -> EditResult {
        if self.session.is_some() {
            log::debug!("drag start on {:?} ignored, gesture already active", handle);
            return Err(EditError::GestureActive);
        }
        if !descriptor.accepts_delta() {
            return Err(EditError::ValidationRejection(descriptor.label.clone()));
        }
        engine.suspend_controls();
        self.session = Some(GestureSession {
            handle,
            descriptor: descriptor.clone(),
            origin_x: x,
            last_x: x,
        });
        Ok(())
    }

    /// Pointer moved to `x`; the delta is measured from the previous event.
    pub fn drag_to(&mut self, x: f32) -> Option<EditAction> {
        let session = self.session.as_mut()?;
        let delta = (x - session.last_x) / self.pixels_per_unit;
        session.last_x = x;
        if delta == 0.0 || !delta.is_finite() {
            return None;
        }
        session.descriptor.mutate(delta)
    }

    /// End the drag and resume the viewport. Returns the edit that settles
    /// the gesture, if the field needs one.
    pub fn end_drag(&mut self, engine: &mut dyn SceneEngine) -> Option<EditAction> {
        let session = self.session.take()?;
        engine.resume_controls();
        session.descriptor.target.and_then(settle)
    }

    /// Abandon a drag without settling it.
    pub fn cancel(&mut self, engine: &mut dyn SceneEngine) {
        if self.session.take().is_some() {
            engine.resume_controls();
        }
    }

    /// Entry-time check of one typed character. Only sign, digits and the
    /// decimal point are accepted in a shared room.
    pub fn validate_keystroke(&self, ch: char, shared: bool) -> EditResult {
        if !shared || ch.is_ascii_digit() || ch == '-' || ch == '.' {
            Ok(())
        } else {
            Err(EditError::ValidationRejection(ch.to_string()))
        }
    }

    /// Commit a typed value. The delta is the difference to the displayed
    /// value times the field's scale, applied like a single drag tick.
    pub fn commit_typed(
        &self,
        descriptor: &ParameterDescriptor,
        text: &str,
        shared: bool,
    ) -> EditResult<Vec<EditAction>> {
        if shared {
            for ch in text.trim().chars() {
                self.validate_keystroke(ch, true)?;
            }
        }
        let typed: f32 = text
            .trim()
            .parse()
            .map_err(|_| EditError::ValidationRejection(text.to_string()))?;
        if !typed.is_finite() {
            return Err(EditError::ValidationRejection(text.to_string()));
        }
        let (Some(target), Some(previous)) = (descriptor.target, descriptor.current_number())
        else {
            return Err(EditError::ValidationRejection(text.to_string()));
        };

        let delta = (typed - previous) * target.field.typed_entry_scale();
        let mut actions = Vec::new();
        if let Some(action) = descriptor.mutate(delta) {
            actions.push(action);
        }
        actions.extend(settle(target));
        Ok(actions)
    }
}

/// Follow-up that closes an edit: scrubbing ends, and a hand-set phase gives
/// the movement speed back.
fn settle(target: FieldTarget) -> Option<EditAction> {
    match target.field {
        ParamField::PlaybackTime => Some(EditAction::EndScrub {
            entity: target.entity,
            cone: target.cone,
        }),
        ParamField::TrajectoryPhase => Some(EditAction::RestoreMovementSpeed(target.entity)),
        _ => None,
    }
}
