//! Live-input negotiation.
//!
//! Discovers input devices, remembers their channel counts, and exclusively
//! owns the microphone stream of each entity. Acquisition is two-phase:
//! `begin_select` tears down the old stream and returns a request; the host
//! opens the stream and hands the outcome to `complete_select`, which checks
//! the entity is still in live-input mode before keeping it.

use std::collections::HashMap;

use soundstage_types::{ChoiceOption, EntityId, SceneState};

use crate::config::Config;
use crate::engine::{InputDevice, MediaDevices, ProcessingHints, StreamConstraints, StreamHandle};
use crate::error::{EditError, EditResult, MediaError};

/// Choice value meaning "no device".
pub const NO_DEVICE: &str = "None";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiatorState {
    Idle,
    Enumerating,
    Acquiring { ticket: AcquisitionTicket },
    DeviceSelected { device: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AcquisitionTicket(u64);

/// A stream the host must open, then report back via `complete_select`.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionRequest {
    pub ticket: AcquisitionTicket,
    pub entity: EntityId,
    /// Composite id as chosen (`deviceId` or `deviceId_channel`).
    pub composite: String,
    pub constraints: StreamConstraints,
}

#[derive(Debug)]
struct EntityInput {
    state: NegotiatorState,
    stream: Option<StreamHandle>,
    pending: Option<(AcquisitionTicket, String)>,
}

impl Default for EntityInput {
    fn default() -> Self {
        Self {
            state: NegotiatorState::Idle,
            stream: None,
            pending: None,
        }
    }
}

/// Whether a user agent belongs to the Safari class, which rejects
/// processing hints in stream constraints.
pub fn is_safari_class(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    match ua.find("safari") {
        Some(pos) => {
            let before = &ua[..pos];
            !before.contains("chrome") && !before.contains("android")
        }
        None => false,
    }
}

pub struct LiveInputNegotiator {
    devices: Vec<InputDevice>,
    channel_counts: HashMap<String, u16>,
    authorized: bool,
    entities: HashMap<EntityId, EntityInput>,
    next_ticket: u64,
    reduced_constraints: bool,
    sample_rate: u32,
}

impl LiveInputNegotiator {
    pub fn new(user_agent: &str, config: &Config) -> Self {
        let reduced_constraints = config
            .reduced_constraints()
            .unwrap_or_else(|| is_safari_class(user_agent));
        Self {
            devices: Vec::new(),
            channel_counts: HashMap::new(),
            authorized: false,
            entities: HashMap::new(),
            next_ticket: 0,
            reduced_constraints,
            sample_rate: config.sample_rate(),
        }
    }

    pub fn state(&self, entity: EntityId) -> NegotiatorState {
        self.entities
            .get(&entity)
            .map(|e| e.state.clone())
            .unwrap_or(NegotiatorState::Idle)
    }

    pub fn active_stream(&self, entity: EntityId) -> Option<StreamHandle> {
        self.entities.get(&entity).and_then(|e| e.stream)
    }

    pub fn devices(&self) -> &[InputDevice] {
        &self.devices
    }

    pub fn channel_count(&self, device_id: &str) -> Option<u16> {
        self.channel_counts.get(device_id).copied()
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn uses_reduced_constraints(&self) -> bool {
        self.reduced_constraints
    }

    /// Refresh the device list for `entity`'s live-input panel. Returns
    /// `Ok(false)` on a cache hit: same device count and already authorized.
    pub fn refresh_devices(
        &mut self,
        entity: EntityId,
        media: &mut dyn MediaDevices,
    ) -> EditResult<bool> {
        let previous = self.state(entity);
        self.entry(entity).state = NegotiatorState::Enumerating;

        let result = self.enumerate(media);
        self.entry(entity).state = match (&result, previous) {
            (Ok(_), NegotiatorState::Enumerating) | (Err(_), _) => NegotiatorState::Idle,
            (Ok(_), prev) => prev,
        };
        result
    }

    fn enumerate(&mut self, media: &mut dyn MediaDevices) -> EditResult<bool> {
        let listed = media.enumerate_inputs().map_err(|e| {
            log::warn!(target: "live_input", "device enumeration failed: {}", e);
            EditError::from(e)
        })?;

        if listed.len() == self.devices.len() && self.authorized {
            log::debug!(target: "live_input", "device list unchanged ({} inputs)", listed.len());
            return Ok(false);
        }

        let listed = if self.authorized {
            listed
        } else {
            if let Err(e) = media.request_permission() {
                log::warn!(target: "live_input", "microphone permission refused: {}", e);
                return Err(e.into());
            }
            self.authorized = true;
            // Labels only appear once permission is granted.
            media.enumerate_inputs().map_err(EditError::from)?
        };

        self.channel_counts.clear();
        for device in &listed {
            match media.probe_channels(&device.id) {
                Ok(count) => {
                    self.channel_counts.insert(device.id.clone(), count);
                }
                Err(e) => {
                    log::debug!(target: "live_input", "channel probe failed for {}: {}", device.id, e)
                }
            }
        }
        log::info!(target: "live_input", "enumerated {} input devices", listed.len());
        self.devices = listed;
        Ok(true)
    }

    /// Options for the input choice: `None`, each device, then one entry per
    /// channel of multi-channel devices.
    pub fn device_choices(&self) -> Vec<ChoiceOption> {
        let mut options = vec![ChoiceOption::new(NO_DEVICE, NO_DEVICE)];
        for device in &self.devices {
            options.push(ChoiceOption::new(device.id.clone(), device.label.clone()));
            let channels = self.channel_count(&device.id).unwrap_or(0);
            if channels > 1 {
                for i in 1..=channels {
                    options.push(ChoiceOption::new(
                        format!("{}_{}", device.id, i),
                        format!("- Channel {}", i),
                    ));
                }
            }
        }
        options
    }

    /// Split a composite id into device id and 1-based channel.
    pub fn parse_composite(&self, composite: &str) -> (String, Option<u16>) {
        if self.devices.iter().any(|d| d.id == composite) {
            return (composite.to_string(), None);
        }
        match composite.rsplit_once('_') {
            Some((device, channel)) if !device.is_empty() => match channel.parse::<u16>() {
                Ok(ch) => (device.to_string(), Some(ch)),
                Err(_) => (composite.to_string(), None),
            },
            _ => (composite.to_string(), None),
        }
    }

    pub fn constraints_for(&self, composite: &str) -> StreamConstraints {
        let (device_id, channel) = self.parse_composite(composite);
        let processing = if self.reduced_constraints {
            None
        } else {
            Some(ProcessingHints {
                auto_gain_control: false,
                noise_suppression: false,
                echo_cancellation: false,
                sample_rate: self.sample_rate,
            })
        };
        StreamConstraints {
            device_id,
            channel,
            processing,
        }
    }

    /// Start selecting `choice` for `entity`. The entity's current stream is
    /// stopped first, even when the same device is chosen again. Choosing
    /// `None` just tears down and returns no request.
    pub fn begin_select(
        &mut self,
        entity: EntityId,
        choice: &str,
        media: &mut dyn MediaDevices,
    ) -> Option<AcquisitionRequest> {
        self.teardown(entity, media);

        if choice == NO_DEVICE {
            return None;
        }

        let ticket = AcquisitionTicket(self.next_ticket);
        self.next_ticket += 1;
        let constraints = self.constraints_for(choice);
        let slot = self.entry(entity);
        slot.state = NegotiatorState::Acquiring { ticket };
        slot.pending = Some((ticket, choice.to_string()));
        Some(AcquisitionRequest {
            ticket,
            entity,
            composite: choice.to_string(),
            constraints,
        })
    }

    /// Deliver the outcome of an acquisition. The stream is kept only if the
    /// ticket is still the entity's latest request and the entity is still in
    /// live-input mode now. Returns the entity and its selected composite id.
    pub fn complete_select(
        &mut self,
        ticket: AcquisitionTicket,
        outcome: Result<StreamHandle, MediaError>,
        scene: &SceneState,
        media: &mut dyn MediaDevices,
    ) -> EditResult<(EntityId, String)> {
        let owner = self
            .entities
            .iter()
            .find(|(_, e)| matches!(&e.pending, Some((t, _)) if *t == ticket))
            .map(|(id, _)| *id);

        let Some(entity) = owner else {
            if let Ok(stream) = outcome {
                media.stop_stream(stream);
            }
            log::debug!(target: "live_input", "acquisition {:?} superseded", ticket);
            return Err(EditError::StaleAsyncResult);
        };

        let slot = self.entry(entity);
        let composite = slot.pending.take().map(|(_, c)| c).unwrap_or_default();
        slot.state = NegotiatorState::Idle;

        let stream = match outcome {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!(target: "live_input", "could not open {}: {}", composite, e);
                return Err(e.into());
            }
        };

        let still_live = scene.entity(entity).is_some_and(|e| e.is_live_input());
        if !still_live {
            media.stop_stream(stream);
            log::debug!(target: "live_input", "entity {} left live input; dropping stream", entity);
            return Err(EditError::StaleAsyncResult);
        }

        let slot = self.entry(entity);
        slot.stream = Some(stream);
        slot.state = NegotiatorState::DeviceSelected {
            device: composite.clone(),
        };
        log::info!(target: "live_input", "entity {} now on input {}", entity, composite);
        Ok((entity, composite))
    }

    /// Stop `entity`'s stream and forget any pending request.
    pub fn teardown(&mut self, entity: EntityId, media: &mut dyn MediaDevices) {
        if let Some(slot) = self.entities.get_mut(&entity) {
            if let Some(stream) = slot.stream.take() {
                media.stop_stream(stream);
            }
            slot.pending = None;
            slot.state = NegotiatorState::Idle;
        }
    }

    fn entry(&mut self, entity: EntityId) -> &mut EntityInput {
        self.entities.entry(entity).or_default()
    }
}
