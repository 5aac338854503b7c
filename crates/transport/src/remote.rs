//! UDP link to the remote platform.

use std::{io, net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use bridge_core::SchedulerHandle;
use shared::protocol::RemoteCommand;
use tokio::{net::UdpSocket, sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::osc::{decode_packet, encode_command, to_remote_message};

const MAX_DATAGRAM: usize = 8192;

#[async_trait]
pub trait DatagramLink: Send + Sync {
    async fn send(&self, datagram: &[u8]) -> io::Result<()>;
}

/// Sends every datagram to one fixed remote address.
#[derive(Clone)]
pub struct UdpLink {
    socket: Arc<UdpSocket>,
    target: SocketAddr,
}

impl UdpLink {
    pub fn new(socket: Arc<UdpSocket>, target: SocketAddr) -> Self {
        Self { socket, target }
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

#[async_trait]
impl DatagramLink for UdpLink {
    async fn send(&self, datagram: &[u8]) -> io::Result<()> {
        self.socket.send_to(datagram, self.target).await.map(|_| ())
    }
}

/// Decodes a datagram and queues every message the mirror understands.
/// Returns the number of messages posted.
pub fn handle_datagram(bytes: &[u8], scheduler: &SchedulerHandle) -> usize {
    let messages = match decode_packet(bytes) {
        Ok(messages) => messages,
        Err(err) => {
            warn!(%err, len = bytes.len(), "remote: dropping undecodable datagram");
            return 0;
        }
    };

    let mut posted = 0;
    for message in messages {
        match to_remote_message(&message) {
            Ok(remote) => {
                if scheduler.post_remote(remote) {
                    posted += 1;
                }
            }
            Err(err) if err.is_unknown_address() => {
                debug!(address = %message.addr, args = ?message.args, "remote: unhandled message");
            }
            Err(err) => warn!(%err, "remote: dropping message"),
        }
    }
    posted
}

/// Receives datagrams until the socket fails or the scheduler goes away.
pub fn spawn_listener(socket: Arc<UdpSocket>, scheduler: SchedulerHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            match socket.recv_from(&mut buf).await {
                Ok((len, peer)) => {
                    debug!(%peer, len, "remote: datagram received");
                    handle_datagram(&buf[..len], &scheduler);
                }
                Err(err) => {
                    warn!(%err, "remote: receive failed, stopping listener");
                    break;
                }
            }
        }
    })
}

/// Encodes and sends queued commands until every sender is dropped.
pub async fn run_writer<L: DatagramLink>(link: L, mut commands: UnboundedReceiver<RemoteCommand>) {
    while let Some(command) = commands.recv().await {
        let datagram = match encode_command(&command) {
            Ok(datagram) => datagram,
            Err(err) => {
                warn!(%err, ?command, "remote: failed to encode command");
                continue;
            }
        };
        if let Err(err) = link.send(&datagram).await {
            warn!(%err, address = %command.address(), "remote: send failed");
        }
    }
    info!("remote: writer stopped");
}

pub fn spawn_writer<L>(link: L, commands: UnboundedReceiver<RemoteCommand>) -> JoinHandle<()>
where
    L: DatagramLink + 'static,
{
    tokio::spawn(run_writer(link, commands))
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
