//! Time update system.
//!
//! Advances the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per simulation tick.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Advance the millisecond clock by `dt_ms`.
///
/// The counter wraps on overflow; consumers measure elapsed time with
/// [`get_ms_time_diff`](crate::resources::worldtime::get_ms_time_diff).
pub fn update_world_time(world: &mut World, dt_ms: u32) {
    let mut wt = world.resource_mut::<WorldTime>();
    wt.now_ms = wt.now_ms.wrapping_add(dt_ms);
    wt.delta_ms = dt_ms;
    wt.tick_count += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_world_time_wraps() {
        let mut world = World::new();
        world.insert_resource(WorldTime::starting_at(u32::MAX - 10));
        update_world_time(&mut world, 20);
        let wt = world.resource::<WorldTime>();
        assert_eq!(wt.now_ms, 9);
        assert_eq!(wt.delta_ms, 20);
        assert_eq!(wt.tick_count, 1);
    }
}
