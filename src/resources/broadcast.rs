//! ECS resources that bridge the simulation with the packet transport thread.
//!
//! Use [`setup_transport`] once during initialization to spawn the transport
//! thread and insert the [`Broadcaster`] resource. Call [`shutdown_transport`]
//! during teardown to flush and join the thread.
//!
//! Broadcasting is fire-and-forget: a unit never waits for delivery and a
//! closed channel is silently ignored. Packets from one unit keep the order in
//! which they were sent because they all travel through a single channel.

use crate::components::unit::Guid;
use crate::events::packets::{NearbyBroadcast, ServerPacket};
use crate::systems::transport::transport_thread;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;

/// Commands sent *to* the transport thread.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCmd {
    Broadcast(NearbyBroadcast),
    Shutdown,
}

/// Receives every broadcast on the transport thread.
///
/// Implementations own "who is nearby" and the byte encoding of packets.
pub trait PacketSink: Send + 'static {
    fn deliver(&mut self, broadcast: NearbyBroadcast);
}

/// Sending half of the broadcast channel.
#[derive(Resource, Clone)]
pub struct Broadcaster {
    tx: Sender<TransportCmd>,
}

impl Broadcaster {
    /// Create a broadcaster together with the receiving end of its channel.
    ///
    /// Useful when the caller drives delivery itself (tests, tools).
    pub fn channel() -> (Self, Receiver<TransportCmd>) {
        let (tx, rx) = unbounded::<TransportCmd>();
        (Self { tx }, rx)
    }

    /// Send `packet` to every observer near the unit `source`.
    pub fn send_to_nearby(&self, source: Guid, packet: ServerPacket) {
        if self
            .tx
            .send(TransportCmd::Broadcast(NearbyBroadcast { source, packet }))
            .is_err()
        {
            debug!("transport closed, dropping packet from unit {}", source);
        }
    }
}

/// Join handle of the background transport thread.
#[derive(Resource)]
pub struct TransportHandle {
    pub handle: std::thread::JoinHandle<()>,
}

/// Spawn the transport thread and register the bridge resources.
///
/// This function:
/// - Creates the command channel.
/// - Spawns the background thread running [`transport_thread`] over `sink`.
/// - Inserts [`Broadcaster`] and [`TransportHandle`].
pub fn setup_transport(world: &mut World, sink: impl PacketSink) {
    let (broadcaster, rx) = Broadcaster::channel();

    let handle = std::thread::spawn(move || transport_thread(rx, sink));

    world.insert_resource(broadcaster);
    world.insert_resource(TransportHandle { handle });
}

/// Gracefully request shutdown of the transport thread and join it.
///
/// Packets queued before the call are still delivered.
pub fn shutdown_transport(world: &mut World) {
    if let Some(bridge) = world.remove_resource::<Broadcaster>() {
        let _ = bridge.tx.send(TransportCmd::Shutdown);
    }
    if let Some(transport) = world.remove_resource::<TransportHandle>() {
        let _ = transport.handle.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CollectSink(Arc<Mutex<Vec<NearbyBroadcast>>>);

    impl PacketSink for CollectSink {
        fn deliver(&mut self, broadcast: NearbyBroadcast) {
            self.0.lock().unwrap().push(broadcast);
        }
    }

    #[test]
    fn test_channel_preserves_order() {
        let (broadcaster, rx) = Broadcaster::channel();
        broadcaster.send_to_nearby(
            1,
            ServerPacket::MoveStartDirection {
                guid: 1,
                direction: 1,
            },
        );
        broadcaster.send_to_nearby(
            1,
            ServerPacket::MoveStartDirection {
                guid: 1,
                direction: 2,
            },
        );
        let directions: Vec<u8> = rx
            .try_iter()
            .filter_map(|cmd| match cmd {
                TransportCmd::Broadcast(NearbyBroadcast {
                    packet: ServerPacket::MoveStartDirection { direction, .. },
                    ..
                }) => Some(direction),
                _ => None,
            })
            .collect();
        assert_eq!(directions, vec![1, 2]);
    }

    #[test]
    fn test_send_after_receiver_dropped_is_ignored() {
        let (broadcaster, rx) = Broadcaster::channel();
        drop(rx);
        broadcaster.send_to_nearby(
            3,
            ServerPacket::MoveStartDirection {
                guid: 3,
                direction: 4,
            },
        );
    }

    #[test]
    fn test_setup_and_shutdown_delivers_queued_packets() {
        let sink = CollectSink::default();
        let delivered = sink.0.clone();
        let mut world = World::new();
        setup_transport(&mut world, sink);
        world.resource::<Broadcaster>().send_to_nearby(
            5,
            ServerPacket::MoveHeartbeat {
                guid: 5,
                move_mask: 2,
                x: 1.0,
                y: 1.0,
            },
        );
        shutdown_transport(&mut world);
        assert!(!world.contains_resource::<Broadcaster>());
        let delivered = delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].source, 5);
    }
}
