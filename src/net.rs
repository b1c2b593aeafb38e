//! Optional peer link. Snapshots are best-effort JSON datagrams; there is no
//! authority and no reconciliation. Any failure drops the session to offline
//! play for the rest of the run.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Vector2D;

const MAX_DATAGRAM: usize = 2048;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Outbound state for one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub player_id: u64,
    pub position: Vector2D,
    pub facing: Vector2D,
    pub alive: bool,
    pub score: u32,
    pub wave: u32,
}

/// A peer's last known state, as tracked locally.
#[derive(Clone, Debug, PartialEq)]
pub struct PeerSnapshot {
    pub snapshot: Snapshot,
    /// Local clock time the snapshot arrived.
    pub received_at: f64,
}

pub trait NetLink {
    fn send(&mut self, snapshot: &Snapshot) -> Result<(), NetError>;
    fn poll(&mut self) -> Result<Vec<Snapshot>, NetError>;
}

/// Single-player stand-in: sends nowhere, never hears anyone.
#[derive(Debug, Default)]
pub struct OfflineLink;

impl NetLink for OfflineLink {
    fn send(&mut self, _snapshot: &Snapshot) -> Result<(), NetError> {
        Ok(())
    }

    fn poll(&mut self) -> Result<Vec<Snapshot>, NetError> {
        Ok(Vec::new())
    }
}

pub struct UdpLink {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpLink {
    pub fn connect(bind: SocketAddr, peer: SocketAddr) -> Result<Self, NetError> {
        let socket = UdpSocket::bind(bind)?;
        socket.set_nonblocking(true)?;
        Ok(UdpLink { socket, peer })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetError> {
        Ok(self.socket.local_addr()?)
    }
}

impl NetLink for UdpLink {
    fn send(&mut self, snapshot: &Snapshot) -> Result<(), NetError> {
        let bytes = serde_json::to_vec(snapshot)?;
        self.socket.send_to(&bytes, self.peer)?;
        Ok(())
    }

    fn poll(&mut self) -> Result<Vec<Snapshot>, NetError> {
        let mut received = Vec::new();
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            match self.socket.recv_from(&mut buf) {
                Ok((len, from)) => match serde_json::from_slice::<Snapshot>(&buf[..len]) {
                    Ok(snapshot) => received.push(snapshot),
                    // A garbled datagram is not worth dropping the session over.
                    Err(e) => debug!("Ignoring malformed snapshot from {}: {}", from, e),
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(received)
    }
}

/// Wraps a link and falls back to offline play on the first error.
pub struct NetSession {
    link: Box<dyn NetLink>,
    local_id: u64,
    online: bool,
    peers: HashMap<u64, PeerSnapshot>,
    peer_timeout: f64,
}

impl NetSession {
    pub fn new(link: Box<dyn NetLink>, local_id: u64, peer_timeout: f64) -> Self {
        NetSession {
            link,
            local_id,
            online: true,
            peers: HashMap::new(),
            peer_timeout,
        }
    }

    pub fn offline() -> Self {
        let mut session = NetSession::new(Box::new(OfflineLink), 0, 0.0);
        session.online = false;
        session
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn local_id(&self) -> u64 {
        self.local_id
    }

    /// Send our snapshot and absorb whatever peers sent since last frame.
    pub fn exchange(&mut self, snapshot: &Snapshot, now: f64) {
        if !self.online {
            return;
        }
        let result = self.link.send(snapshot).and_then(|_| self.link.poll());
        match result {
            Ok(received) => {
                for snapshot in received.into_iter().filter(|s| s.player_id != self.local_id) {
                    self.peers.insert(snapshot.player_id, PeerSnapshot { snapshot, received_at: now });
                }
            }
            Err(e) => {
                warn!("Network unavailable, continuing single-player: {}", e);
                self.online = false;
                self.peers.clear();
            }
        }
        let timeout = self.peer_timeout;
        self.peers.retain(|_, peer| now - peer.received_at <= timeout);
    }

    pub fn peers(&self) -> impl Iterator<Item = &PeerSnapshot> {
        self.peers.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct ScriptedLink {
        inbox: VecDeque<Result<Vec<Snapshot>, NetError>>,
    }

    impl NetLink for ScriptedLink {
        fn send(&mut self, _snapshot: &Snapshot) -> Result<(), NetError> {
            Ok(())
        }

        fn poll(&mut self) -> Result<Vec<Snapshot>, NetError> {
            self.inbox.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn snapshot(player_id: u64) -> Snapshot {
        Snapshot {
            player_id,
            position: Vector2D::new(1.0, 2.0),
            facing: Vector2D::FORWARD,
            alive: true,
            score: 0,
            wave: 1,
        }
    }

    #[test]
    fn tracks_peers_and_ignores_own_echo() {
        let link = ScriptedLink {
            inbox: VecDeque::from([Ok(vec![snapshot(1), snapshot(2)])]),
        };
        let mut session = NetSession::new(Box::new(link), 1, 5.0);
        session.exchange(&snapshot(1), 0.0);
        let peers: Vec<u64> = session.peers().map(|p| p.snapshot.player_id).collect();
        assert_eq!(peers, vec![2]);
    }

    #[test]
    fn stale_peers_expire() {
        let link = ScriptedLink {
            inbox: VecDeque::from([Ok(vec![snapshot(2)])]),
        };
        let mut session = NetSession::new(Box::new(link), 1, 5.0);
        session.exchange(&snapshot(1), 0.0);
        session.exchange(&snapshot(1), 10.0);
        assert_eq!(session.peers().count(), 0);
        assert!(session.is_online());
    }

    #[test]
    fn error_falls_back_to_offline() {
        let failure = std::io::Error::new(ErrorKind::ConnectionRefused, "refused");
        let link = ScriptedLink {
            inbox: VecDeque::from([Ok(vec![snapshot(2)]), Err(NetError::Io(failure))]),
        };
        let mut session = NetSession::new(Box::new(link), 1, 5.0);
        session.exchange(&snapshot(1), 0.0);
        assert_eq!(session.peers().count(), 1);
        session.exchange(&snapshot(1), 0.1);
        assert!(!session.is_online());
        assert_eq!(session.peers().count(), 0);
        session.exchange(&snapshot(1), 0.2);
        assert!(!session.is_online());
    }

    #[test]
    fn udp_links_exchange_snapshots() {
        let loopback: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let probe_a = UdpSocket::bind(loopback).unwrap();
        let probe_b = UdpSocket::bind(loopback).unwrap();
        let (addr_a, addr_b) = (probe_a.local_addr().unwrap(), probe_b.local_addr().unwrap());
        drop((probe_a, probe_b));

        let mut a = UdpLink::connect(addr_a, addr_b).unwrap();
        let mut b = UdpLink::connect(addr_b, addr_a).unwrap();
        a.send(&snapshot(7)).unwrap();

        let mut received = Vec::new();
        for _ in 0..100 {
            received.extend(b.poll().unwrap());
            if !received.is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(received, vec![snapshot(7)]);
    }
}
