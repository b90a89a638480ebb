//! Packet transport backed by a dedicated thread.
//!
//! [`transport_thread`] runs on its own OS thread and hands every broadcast
//! it receives to a [`PacketSink`]. The simulation only ever touches the
//! sending half of the channel, so a slow sink never stalls a tick.
//!
//! See also: [`crate::resources::broadcast`].

use crate::events::packets::NearbyBroadcast;
use crate::resources::broadcast::{PacketSink, TransportCmd};
use crossbeam_channel::Receiver;
use log::{debug, info};

/// Entry point of the transport thread.
///
/// Blocks on the command channel until [`TransportCmd::Shutdown`] arrives or
/// every sender is dropped.
pub fn transport_thread(rx: Receiver<TransportCmd>, mut sink: impl PacketSink) {
    let mut delivered: u64 = 0;
    while let Ok(cmd) = rx.recv() {
        match cmd {
            TransportCmd::Broadcast(broadcast) => {
                sink.deliver(broadcast);
                delivered += 1;
            }
            TransportCmd::Shutdown => {
                debug!("transport shutdown requested");
                break;
            }
        }
    }
    info!("transport thread exiting after {} packets", delivered);
}

/// Sink that logs every packet as a JSON line.
///
/// Stands in for the real network layer in the headless server.
#[derive(Default)]
pub struct LogSink;

impl PacketSink for LogSink {
    fn deliver(&mut self, broadcast: NearbyBroadcast) {
        match serde_json::to_string(&broadcast.packet) {
            Ok(json) => info!("[nearby {}] {}", broadcast.source, json),
            Err(e) => log::warn!("failed to encode packet from {}: {}", broadcast.source, e),
        }
    }
}
