// Typed attribute storage for unit properties (speed, level, ...).

use bevy_ecs::prelude::Component;
use log::info;
use rustc_hash::{FxHashMap, FxHashSet};

/// Keys of the per-unit attribute store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitField {
    /// World units per second.
    MovementSpeed,
    Level,
}

#[derive(Debug, Clone, Component, Default)]
pub struct UpdateFields {
    pub floats: FxHashMap<UnitField, f32>,
    pub uints: FxHashMap<UnitField, u32>,
    /// Keys written since the replication layer last drained them.
    pub changed: FxHashSet<UnitField>,
}

impl UpdateFields {
    /// Fields every freshly created unit starts with.
    pub fn for_new_unit(movement_speed: f32) -> Self {
        let mut fields = Self::default();
        fields.set_float_value(UnitField::MovementSpeed, movement_speed);
        fields.set_uint32_value(UnitField::Level, 1);
        fields.changed.clear();
        fields
    }
    pub fn get_float_value(&self, field: UnitField) -> f32 {
        self.floats.get(&field).copied().unwrap_or(0.0)
    }
    pub fn set_float_value(&mut self, field: UnitField, value: f32) {
        self.floats.insert(field, value);
        self.changed.insert(field);
    }
    pub fn get_uint32_value(&self, field: UnitField) -> u32 {
        self.uints.get(&field).copied().unwrap_or(0)
    }
    pub fn set_uint32_value(&mut self, field: UnitField, value: u32) {
        self.uints.insert(field, value);
        self.changed.insert(field);
    }
    pub fn movement_speed(&self) -> f32 {
        self.get_float_value(UnitField::MovementSpeed)
    }
    pub fn level(&self) -> u16 {
        self.get_uint32_value(UnitField::Level) as u16
    }
    /// Set the unit level. `on_load` marks values restored from storage,
    /// which are applied silently.
    pub fn set_level(&mut self, level: u16, on_load: bool) {
        let old = self.level();
        self.set_uint32_value(UnitField::Level, level as u32);

        if on_load || old == level {
            return;
        }
        info!("unit level changed {} -> {}", old, level);
    }
    /// Drain the set of keys written since the last call.
    pub fn take_changed(&mut self) -> Vec<UnitField> {
        self.changed.drain().collect()
    }
}
