//! Parameter panel: live descriptors and their control bindings.
//!
//! Each bound descriptor gets one opaque handle. Refreshing updates what a
//! control shows without touching its binding; a rebuild drops every
//! binding and binds the new descriptor set.

use soundstage_types::{ButtonAction, DisplayValue, EntityId, FieldTarget, ParameterDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlHandle(u32);

impl ControlHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// What the user selected. A trajectory is shown through its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Entity(EntityId),
    Trajectory(EntityId),
}

impl Selection {
    pub fn entity(self) -> EntityId {
        match self {
            Selection::Entity(id) | Selection::Trajectory(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    Rebuilt,
    Refreshed,
}

/// Identity of a control across refreshes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ControlKey {
    Field(FieldTarget),
    Button(ButtonAction),
    Static(String),
}

fn key_of(descriptor: &ParameterDescriptor) -> ControlKey {
    if let Some(target) = descriptor.target {
        ControlKey::Field(target)
    } else if let Some(button) = descriptor.button {
        ControlKey::Button(button)
    } else {
        ControlKey::Static(format!("{}/{}", descriptor.css_class, descriptor.label))
    }
}

#[derive(Debug)]
struct Control {
    handle: ControlHandle,
    key: ControlKey,
    descriptor: ParameterDescriptor,
}

#[derive(Debug, Default)]
pub struct Panel {
    displayed: Option<EntityId>,
    controls: Vec<Control>,
    next_handle: u32,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn displayed(&self) -> Option<EntityId> {
        self.displayed
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Bind a descriptor to a new control. Malformed descriptors are skipped.
    /// Binding an editable descriptor whose control already exists returns
    /// the existing handle and changes nothing. Static text always binds.
    pub fn bind_parameter(&mut self, descriptor: ParameterDescriptor) -> Option<ControlHandle> {
        if descriptor.is_malformed() {
            log::debug!("skipping malformed descriptor {:?}", descriptor.label);
            return None;
        }
        let key = key_of(&descriptor);
        if !matches!(key, ControlKey::Static(_)) {
            if let Some(existing) = self.controls.iter().find(|c| c.key == key) {
                return Some(existing.handle);
            }
        }
        let handle = ControlHandle(self.next_handle);
        self.next_handle += 1;
        self.controls.push(Control {
            handle,
            key,
            descriptor,
        });
        Some(handle)
    }

    /// Update what a control shows. Returns false for an unknown handle.
    pub fn refresh_parameter(&mut self, handle: ControlHandle, value: DisplayValue) -> bool {
        match self.controls.iter_mut().find(|c| c.handle == handle) {
            Some(control) => {
                control.descriptor.value = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn unbind(&mut self, handle: ControlHandle) -> bool {
        let before = self.controls.len();
        self.controls.retain(|c| c.handle != handle);
        self.controls.len() != before
    }

    pub fn descriptor(&self, handle: ControlHandle) -> Option<&ParameterDescriptor> {
        self.controls
            .iter()
            .find(|c| c.handle == handle)
            .map(|c| &c.descriptor)
    }

    pub fn find(&self, target: FieldTarget) -> Option<ControlHandle> {
        let key = ControlKey::Field(target);
        self.controls.iter().find(|c| c.key == key).map(|c| c.handle)
    }

    pub fn find_button(&self, action: ButtonAction) -> Option<ControlHandle> {
        let key = ControlKey::Button(action);
        self.controls.iter().find(|c| c.key == key).map(|c| c.handle)
    }

    pub fn controls(&self) -> impl Iterator<Item = (ControlHandle, &ParameterDescriptor)> {
        self.controls.iter().map(|c| (c.handle, &c.descriptor))
    }

    /// Show `selection`. The same entity as the one displayed is refreshed in
    /// place; any other entity clears the panel and binds `descriptors`.
    pub fn show(&mut self, selection: Selection, descriptors: Vec<ParameterDescriptor>) -> ShowOutcome {
        let id = selection.entity();
        if self.displayed == Some(id) && self.same_layout(&descriptors) {
            for (control, fresh) in self
                .controls
                .iter_mut()
                .zip(descriptors.into_iter().filter(|d| !d.is_malformed()))
            {
                control.descriptor = fresh;
            }
            return ShowOutcome::Refreshed;
        }
        self.rebuild(id, descriptors);
        ShowOutcome::Rebuilt
    }

    /// Drop every binding and bind `descriptors` for `entity`.
    pub fn rebuild(&mut self, entity: EntityId, descriptors: Vec<ParameterDescriptor>) {
        self.controls.clear();
        self.displayed = Some(entity);
        for descriptor in descriptors {
            self.bind_parameter(descriptor);
        }
    }

    pub fn clear(&mut self) {
        self.controls.clear();
        self.displayed = None;
    }

    fn same_layout(&self, descriptors: &[ParameterDescriptor]) -> bool {
        let mut fresh = descriptors.iter().filter(|d| !d.is_malformed()).map(key_of);
        self.controls.iter().all(|c| fresh.next().as_ref() == Some(&c.key)) && fresh.next().is_none()
    }
}
