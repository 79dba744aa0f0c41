//! Descriptor catalogue: the controls each entity kind shows.

use soundstage_types::{
    AdditionalAction, ButtonAction, ChoiceOption, ConeId, ConeSource, DisplayValue, Entity,
    EntityKind, FieldTarget, ParamField, ParameterDescriptor, SceneState, SoundSlot, Trajectory,
};

use crate::live_input::NO_DEVICE;

pub const FILE_MODE: &str = "File";
pub const INPUT_MODE: &str = "Input";
pub const DEGREE_SUFFIX: &str = "˚";

/// What the catalogue needs beyond the scene itself.
pub struct DescribeContext<'a> {
    pub now: f64,
    /// Options for the live-input channel choice.
    pub input_choices: &'a [ChoiceOption],
}

/// All descriptors for `entity`, in panel order.
pub fn describe(scene: &SceneState, entity: &Entity, ctx: &DescribeContext<'_>) -> Vec<ParameterDescriptor> {
    let mut out = Vec::new();
    match &entity.kind {
        EntityKind::Object(obj) => {
            let id = entity.id;
            let live = obj.live_input.enabled;
            out.push(ParameterDescriptor::choice(
                "File | Input",
                FieldTarget::new(id, ParamField::InputSource),
                if live { INPUT_MODE } else { FILE_MODE },
                vec![
                    ChoiceOption::new(FILE_MODE, FILE_MODE),
                    ChoiceOption::new(INPUT_MODE, INPUT_MODE),
                ],
            ));
            if live {
                out.push(ParameterDescriptor::choice(
                    "Channel",
                    FieldTarget::new(id, ParamField::MicrophoneChannel),
                    obj.live_input.device.clone().unwrap_or_else(|| NO_DEVICE.to_string()),
                    ctx.input_choices.to_vec(),
                ));
                out.push(ParameterDescriptor::numeric(
                    "Volume",
                    FieldTarget::new(id, ParamField::Volume),
                    obj.live_input.volume,
                ));
                out.push(ParameterDescriptor::button(
                    if obj.live_input.muted { "UNMUTE" } else { "MUTE" },
                    "mute",
                    ButtonAction::ToggleLiveInputMute(id),
                ));
            } else {
                sound_rows(&mut out, entity, None, obj.sound.as_ref(), ctx.now);
            }
            position_rows(&mut out, entity, !scene.editing_object);
            out.push(ParameterDescriptor::button("ADD CONE", "add-cone", ButtonAction::AddCone(id)));
            if let Some(cone_id) = obj.interactive_cone {
                if let Some(idx) = obj.cone_index(cone_id) {
                    cone_rows(&mut out, entity, &obj.cones[idx], idx, obj.cones.len(), ctx.now);
                }
            }
            trajectory_rows(&mut out, entity, obj.trajectory.as_ref(), !scene.editing_object);
        }
        EntityKind::Zone(zone) => {
            let id = entity.id;
            sound_rows(&mut out, entity, None, zone.sound.as_ref(), ctx.now);
            out.push(ParameterDescriptor::numeric(
                "Scale",
                FieldTarget::new(id, ParamField::ZoneScale),
                zone.scale,
            ));
            out.push(ParameterDescriptor::numeric(
                "Position X",
                FieldTarget::new(id, ParamField::PositionX),
                zone.position.x,
            ));
            out.push(ParameterDescriptor::numeric(
                "Position Y",
                FieldTarget::new(id, ParamField::PositionZ),
                zone.position.z,
            ));
            out.push(rotation_row(entity, zone.rotation));
        }
        EntityKind::Head(head) => {
            position_rows(&mut out, entity, true);
            out.push(rotation_row(entity, head.rotation));
            trajectory_rows(&mut out, entity, head.trajectory.as_ref(), true);
        }
    }
    out
}

fn rotation_row(entity: &Entity, radians: f32) -> ParameterDescriptor {
    ParameterDescriptor::numeric(
        "Rotation",
        FieldTarget::new(entity.id, ParamField::Rotation),
        radians.to_degrees().round(),
    )
    .with_suffix(DEGREE_SUFFIX)
}

fn position_rows(out: &mut Vec<ParameterDescriptor>, entity: &Entity, with_altitude: bool) {
    let position = entity.position();
    out.push(ParameterDescriptor::numeric(
        "Position X",
        FieldTarget::new(entity.id, ParamField::PositionX),
        position.x,
    ));
    out.push(ParameterDescriptor::numeric(
        "Position Y",
        FieldTarget::new(entity.id, ParamField::PositionZ),
        position.z,
    ));
    if with_altitude {
        out.push(ParameterDescriptor::numeric(
            "Altitude",
            FieldTarget::new(entity.id, ParamField::Altitude),
            position.y,
        ));
    }
}

/// File name, time with its play toggle, and volume of one sound.
fn sound_rows(
    out: &mut Vec<ParameterDescriptor>,
    entity: &Entity,
    cone: Option<ConeId>,
    sound: Option<&SoundSlot>,
    now: f64,
) {
    let target = |field| FieldTarget {
        entity: entity.id,
        cone,
        field,
    };
    let file = sound.map(|s| s.asset.name.clone()).unwrap_or_else(|| "N/A".to_string());
    out.push(ParameterDescriptor::text("File", "file", file));

    let mut time = ParameterDescriptor::time(
        "Time",
        target(ParamField::PlaybackTime),
        sound.map(|s| s.playback.time_at(now)),
    );
    if let Some(slot) = sound {
        time = time.with_additional(AdditionalAction::TogglePlayback {
            entity: entity.id,
            cone,
            playing: slot.is_playing(),
        });
        if cone.is_none() {
            out.push(ParameterDescriptor::button(
                "REMOVE FILE",
                "detach",
                ButtonAction::DetachSound(entity.id, None),
            ));
        }
    }
    out.push(time);
    if let Some(slot) = sound {
        out.push(ParameterDescriptor::numeric("Volume", target(ParamField::Volume), slot.gain));
    }
}

fn cone_rows(
    out: &mut Vec<ParameterDescriptor>,
    entity: &Entity,
    cone: &ConeSource,
    index: usize,
    count: usize,
    now: f64,
) {
    let target = |field| FieldTarget::cone(entity.id, cone.id, field);
    out.push(ParameterDescriptor::text(
        "",
        "cone-title",
        format!("CONE {} OF {}", index + 1, count),
    ));
    out.push(ParameterDescriptor::button(
        "Delete",
        "delete-cone",
        ButtonAction::DeleteCone(entity.id, cone.id),
    ));
    sound_rows(out, entity, Some(cone.id), Some(&cone.sound), now);
    out.push(ParameterDescriptor::numeric("Spread", target(ParamField::Spread), cone.spread));
    out.push(
        ParameterDescriptor::numeric(
            "Longitude",
            target(ParamField::Longitude),
            cone.longitude.to_degrees().round(),
        )
        .with_suffix(DEGREE_SUFFIX),
    );
    out.push(
        ParameterDescriptor::numeric(
            "Latitude",
            target(ParamField::Latitude),
            cone.latitude.to_degrees().round(),
        )
        .with_suffix(DEGREE_SUFFIX),
    );
}

fn trajectory_rows(
    out: &mut Vec<ParameterDescriptor>,
    entity: &Entity,
    trajectory: Option<&Trajectory>,
    allow_add: bool,
) {
    match trajectory {
        Some(t) => {
            out.push(ParameterDescriptor::button(
                "Delete",
                "delete-trajectory",
                ButtonAction::DeleteTrajectory(entity.id),
            ));
            out.push(ParameterDescriptor::numeric(
                "Speed",
                FieldTarget::new(entity.id, ParamField::MovementSpeed),
                t.speed,
            ));
            out.push(ParameterDescriptor::numeric(
                "Position",
                FieldTarget::new(entity.id, ParamField::TrajectoryPhase),
                t.phase,
            ));
        }
        None if allow_add => out.push(ParameterDescriptor::button(
            "ADD TRAJECTORY",
            "add-trajectory",
            ButtonAction::AddTrajectory(entity.id),
        )),
        None => {}
    }
}
