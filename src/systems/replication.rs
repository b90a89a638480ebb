//! What observers learn about units outside movement packets.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::directionalmovement::DirectionalMovement;
use crate::components::mapposition::MapPosition;
use crate::components::unit::Unit;
use crate::components::updatefields::UpdateFields;
use crate::movement::context::UnitView;
use crate::resources::broadcast::Broadcaster;

/// Send the create block of every unit spawned since the last run.
pub fn announce_new_units(
    query: Query<(&Unit, &MapPosition, &DirectionalMovement), Added<Unit>>,
    broadcaster: Res<Broadcaster>,
) {
    for (unit, position, movement) in query.iter() {
        let view = UnitView::new(&broadcaster, unit.guid, position, movement);
        broadcaster.send_to_nearby(unit.guid, view.create_block());
    }
}

/// Drain changed attribute keys. Field values themselves are replicated by
/// the session layer; here only the change set is consumed.
pub fn flush_field_changes(mut query: Query<(&Unit, &mut UpdateFields)>) {
    for (unit, mut fields) in query.iter_mut() {
        // read first so untouched units keep their change tick
        if fields.changed.is_empty() {
            continue;
        }
        let changed = fields.take_changed();
        debug!("unit {}: fields changed {:?}", unit.guid, changed);
    }
}
