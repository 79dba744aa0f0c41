//! Parameter descriptors: one editable attribute as a panel control.
//!
//! A descriptor carries no closure. Its mutation is data: `mutate(delta)`
//! produces an `EditAction` addressed at `target`, which dispatch applies.

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::bounds;
use crate::{ConeId, EditAction, EntityId};

/// Which attribute of an entity a descriptor edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamField {
    PositionX,
    /// Second floor-plane axis, labelled "Position Y" in the panel.
    PositionZ,
    Altitude,
    Rotation,
    Volume,
    Spread,
    Latitude,
    Longitude,
    ZoneScale,
    TrajectoryPhase,
    MovementSpeed,
    PlaybackTime,
    InputSource,
    MicrophoneChannel,
}

impl ParamField {
    /// Multiplier from a typed value difference to the drag delta that
    /// produces it.
    pub fn typed_entry_scale(&self) -> f32 {
        match self {
            ParamField::Volume => bounds::GAIN_DRAG_DIVISOR,
            ParamField::ZoneScale => bounds::SCALE_DRAG_DIVISOR,
            ParamField::Spread => bounds::SPREAD_DRAG_DIVISOR,
            ParamField::MovementSpeed => bounds::SPEED_DRAG_DIVISOR,
            ParamField::TrajectoryPhase => bounds::PHASE_DRAG_DIVISOR,
            _ => 1.0,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ParamField::PositionX => "position-x",
            ParamField::PositionZ => "position-y",
            ParamField::Altitude => "altitude",
            ParamField::Rotation => "rotation",
            ParamField::Volume => "volume",
            ParamField::Spread => "spread",
            ParamField::Latitude => "latitude",
            ParamField::Longitude => "longitude",
            ParamField::ZoneScale => "scale",
            ParamField::TrajectoryPhase => "trajectory-position",
            ParamField::MovementSpeed => "speed",
            ParamField::PlaybackTime => "time",
            ParamField::InputSource => "input-source",
            ParamField::MicrophoneChannel => "channel",
        }
    }

    pub fn clamp_policy(&self) -> ClampPolicy {
        match self {
            ParamField::PositionX | ParamField::PositionZ => ClampPolicy::Unbounded,
            ParamField::Altitude => ClampPolicy::Range {
                min: bounds::ALTITUDE_MIN,
                max: bounds::ALTITUDE_MAX,
            },
            ParamField::Rotation => ClampPolicy::Wrap { min: -PI, max: PI },
            ParamField::Volume => ClampPolicy::Range {
                min: bounds::ENTITY_GAIN_MIN,
                max: bounds::ENTITY_GAIN_MAX,
            },
            ParamField::Spread => ClampPolicy::Range {
                min: bounds::SPREAD_MIN,
                max: bounds::SPREAD_MAX,
            },
            ParamField::Latitude => ClampPolicy::Wrap { min: -PI, max: PI },
            ParamField::Longitude => ClampPolicy::Wrap { min: -TAU, max: TAU },
            ParamField::ZoneScale => ClampPolicy::Range {
                min: bounds::ZONE_SCALE_MIN,
                max: bounds::ZONE_SCALE_MAX,
            },
            ParamField::TrajectoryPhase => ClampPolicy::Phase,
            ParamField::MovementSpeed => ClampPolicy::Range {
                min: bounds::SPEED_MIN,
                max: bounds::SPEED_MAX,
            },
            ParamField::PlaybackTime | ParamField::InputSource | ParamField::MicrophoneChannel => {
                ClampPolicy::Unbounded
            }
        }
    }
}

/// Address of the attribute a descriptor edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldTarget {
    pub entity: EntityId,
    pub cone: Option<ConeId>,
    pub field: ParamField,
}

impl FieldTarget {
    pub fn new(entity: EntityId, field: ParamField) -> Self {
        Self {
            entity,
            cone: None,
            field,
        }
    }

    pub fn cone(entity: EntityId, cone: ConeId, field: ParamField) -> Self {
        Self {
            entity,
            cone: Some(cone),
            field,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DescriptorKind {
    Numeric,
    Time,
    Toggle,
    Choice,
    Button,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClampPolicy {
    Unbounded,
    Range { min: f32, max: f32 },
    /// Values leaving the interval come back in from the other side.
    Wrap { min: f32, max: f32 },
    /// [0, 1] with the exact boundaries replaced by 0.01 / 0.99.
    Phase,
}

impl ClampPolicy {
    pub fn apply(&self, value: f32) -> f32 {
        match *self {
            ClampPolicy::Unbounded => value,
            ClampPolicy::Range { min, max } => value.clamp(min, max),
            ClampPolicy::Wrap { min, max } => {
                let span = max - min;
                if value > max {
                    value - span
                } else if value < min {
                    value + span
                } else {
                    value
                }
            }
            ClampPolicy::Phase => crate::substitute_phase(value.clamp(0.0, 1.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// What a control currently shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DisplayValue {
    Number(f32),
    /// Seconds; `None` when there is no sound attached.
    Time(Option<f64>),
    Text(String),
    Toggle(bool),
    Choice {
        selected: String,
        options: Vec<ChoiceOption>,
    },
}

impl DisplayValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            DisplayValue::Number(v) => Some(*v),
            DisplayValue::Time(Some(t)) => Some(*t as f32),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        match self {
            DisplayValue::Number(v) => format_number(*v),
            DisplayValue::Time(Some(t)) => format_time(*t),
            DisplayValue::Time(None) => "0:00".to_string(),
            DisplayValue::Text(s) => s.clone(),
            DisplayValue::Toggle(on) => (if *on { "on" } else { "off" }).to_string(),
            DisplayValue::Choice { selected, options } => options
                .iter()
                .find(|o| &o.value == selected)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| selected.clone()),
        }
    }
}

/// Buttons that trigger structural edits rather than numeric deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    AddCone(EntityId),
    DeleteCone(EntityId, ConeId),
    AddTrajectory(EntityId),
    DeleteTrajectory(EntityId),
    DetachSound(EntityId, Option<ConeId>),
    ToggleLiveInputMute(EntityId),
}

/// Secondary control shown next to a value, e.g. the play/pause toggle on a
/// time row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdditionalAction {
    TogglePlayback {
        entity: EntityId,
        cone: Option<ConeId>,
        playing: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub label: String,
    pub value: Option<DisplayValue>,
    pub button: Option<ButtonAction>,
    pub kind: DescriptorKind,
    pub css_class: String,
    pub suffix: Option<String>,
    pub clamp: ClampPolicy,
    pub target: Option<FieldTarget>,
    pub additional: Option<AdditionalAction>,
}

impl ParameterDescriptor {
    pub fn numeric(label: impl Into<String>, target: FieldTarget, value: f32) -> Self {
        Self {
            label: label.into(),
            value: Some(DisplayValue::Number(value)),
            button: None,
            kind: DescriptorKind::Numeric,
            css_class: target.field.css_class().to_string(),
            suffix: None,
            clamp: target.field.clamp_policy(),
            target: Some(target),
            additional: None,
        }
    }

    pub fn time(label: impl Into<String>, target: FieldTarget, seconds: Option<f64>) -> Self {
        Self {
            label: label.into(),
            value: Some(DisplayValue::Time(seconds)),
            button: None,
            kind: DescriptorKind::Time,
            css_class: target.field.css_class().to_string(),
            suffix: None,
            clamp: ClampPolicy::Unbounded,
            target: Some(target),
            additional: None,
        }
    }

    pub fn choice(
        label: impl Into<String>,
        target: FieldTarget,
        selected: impl Into<String>,
        options: Vec<ChoiceOption>,
    ) -> Self {
        Self {
            label: label.into(),
            value: Some(DisplayValue::Choice {
                selected: selected.into(),
                options,
            }),
            button: None,
            kind: DescriptorKind::Choice,
            css_class: target.field.css_class().to_string(),
            suffix: None,
            clamp: ClampPolicy::Unbounded,
            target: Some(target),
            additional: None,
        }
    }

    pub fn text(label: impl Into<String>, css_class: &str, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: Some(DisplayValue::Text(text.into())),
            button: None,
            kind: DescriptorKind::Numeric,
            css_class: css_class.to_string(),
            suffix: None,
            clamp: ClampPolicy::Unbounded,
            target: None,
            additional: None,
        }
    }

    pub fn button(label: impl Into<String>, css_class: &str, action: ButtonAction) -> Self {
        Self {
            label: label.into(),
            value: None,
            button: Some(action),
            kind: DescriptorKind::Button,
            css_class: css_class.to_string(),
            suffix: None,
            clamp: ClampPolicy::Unbounded,
            target: None,
            additional: None,
        }
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = Some(suffix.to_string());
        self
    }

    pub fn with_additional(mut self, additional: AdditionalAction) -> Self {
        self.additional = Some(additional);
        self
    }

    /// A descriptor with neither a value nor a button cannot render a control.
    pub fn is_malformed(&self) -> bool {
        self.value.is_none() && self.button.is_none()
    }

    /// Whether gestures on this control produce numeric deltas.
    pub fn accepts_delta(&self) -> bool {
        matches!(self.kind, DescriptorKind::Numeric | DescriptorKind::Time) && self.target.is_some()
    }

    /// The edit a delta on this control asks for.
    pub fn mutate(&self, delta: f32) -> Option<EditAction> {
        if !self.accepts_delta() {
            return None;
        }
        let target = self.target?;
        Some(EditAction::Adjust { target, delta })
    }

    pub fn current_number(&self) -> Option<f32> {
        self.value.as_ref().and_then(DisplayValue::as_number)
    }

    /// Text as shown in the control, suffix included.
    pub fn display(&self) -> String {
        let body = match &self.value {
            Some(v) => v.render(),
            None => self.label.clone(),
        };
        match &self.suffix {
            Some(s) => format!("{}{}", body, s),
            None => body,
        }
    }
}

/// Two decimals with trailing zeros dropped: `1.50` → `1.5`, `2.00` → `2`.
pub fn format_number(value: f32) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// `m:ss` from rounded seconds.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume_descriptor() -> ParameterDescriptor {
        ParameterDescriptor::numeric(
            "Volume",
            FieldTarget::new(EntityId::new(1), ParamField::Volume),
            1.0,
        )
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(0.126), "0.13");
        assert_eq!(format_number(-0.001), "0");
        assert_eq!(format_number(-12.25), "-12.25");
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(59.6), "1:00");
        assert_eq!(format_time(125.0), "2:05");
    }

    #[test]
    fn malformed_when_neither_value_nor_button() {
        let mut d = volume_descriptor();
        assert!(!d.is_malformed());
        d.value = None;
        assert!(d.is_malformed());
        d.button = Some(ButtonAction::AddCone(EntityId::new(1)));
        assert!(!d.is_malformed());
    }

    #[test]
    fn mutate_addresses_target() {
        let d = volume_descriptor();
        match d.mutate(3.0) {
            Some(EditAction::Adjust { target, delta }) => {
                assert_eq!(target.field, ParamField::Volume);
                assert_eq!(delta, 3.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn buttons_and_choices_do_not_take_deltas() {
        let b = ParameterDescriptor::button("ADD CONE", "add-cone", ButtonAction::AddCone(EntityId::new(1)));
        assert!(b.mutate(1.0).is_none());
        let c = ParameterDescriptor::choice(
            "Channel",
            FieldTarget::new(EntityId::new(1), ParamField::MicrophoneChannel),
            "none",
            vec![ChoiceOption::new("none", "None")],
        );
        assert!(c.mutate(1.0).is_none());
        assert_eq!(c.display(), "None");
    }

    #[test]
    fn clamp_policies() {
        assert_eq!(ParamField::Volume.clamp_policy().apply(5.0), 2.0);
        assert_eq!(ParamField::TrajectoryPhase.clamp_policy().apply(1.3), 0.99);
        let wrapped = ParamField::Longitude.clamp_policy().apply(TAU + 0.5);
        assert!((wrapped - 0.5).abs() < 1e-5);
    }

    #[test]
    fn typed_scales() {
        assert_eq!(ParamField::Volume.typed_entry_scale(), 50.0);
        assert_eq!(ParamField::ZoneScale.typed_entry_scale(), 50.0);
        assert_eq!(ParamField::Spread.typed_entry_scale(), 100.0);
        assert_eq!(ParamField::MovementSpeed.typed_entry_scale(), 10.0);
        assert_eq!(ParamField::PositionX.typed_entry_scale(), 1.0);
    }

    #[test]
    fn suffix_is_appended() {
        let d = ParameterDescriptor::numeric(
            "Latitude",
            FieldTarget::cone(EntityId::new(1), ConeId::new(0), ParamField::Latitude),
            45.0,
        )
        .with_suffix("˚");
        assert_eq!(d.display(), "45˚");
    }
}
