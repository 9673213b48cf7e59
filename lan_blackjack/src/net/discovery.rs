//! UDP discovery. Dealers broadcast offer frames once a second while
//! players listen for them and pick a table.

use log::debug;
use std::{
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket},
    sync::mpsc::{self, RecvTimeoutError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use super::messages::Offer;
use super::wire::WireMessage;

/// UDP port dealers announce themselves on.
pub const OFFER_PORT: u16 = 13122;

/// Pause between consecutive offer broadcasts (1 second)
pub const BROADCAST_INTERVAL: Duration = Duration::from_secs(1);

/// How long a player holds out for the dealer it asked for before
/// settling for any other table (10 seconds)
pub const DEFAULT_PREFER_WINDOW: Duration = Duration::from_secs(10);

/// Name a dealer announces when none is configured.
pub const DEFAULT_DEALER_NAME: &str = "lan-blackjack dealer";

/// Handle to a background broadcaster thread. Dropping the handle
/// stops the thread on its next tick; [`BroadcastHandle::stop`] shuts
/// it down promptly and joins it.
#[derive(Debug)]
pub struct BroadcastHandle {
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl BroadcastHandle {
    pub fn stop(self) {
        // Send fails only when the thread is already gone.
        let _ = self.stop.send(());
        let _ = self.handle.join();
    }
}

/// Starts a thread that broadcasts `offer` every second until told to
/// stop. Frames go to the limited broadcast address and, optionally,
/// one directed address. Send failures are logged and skipped.
pub fn spawn_broadcaster(
    offer: &Offer,
    offer_port: u16,
    directed: Option<SocketAddr>,
) -> io::Result<BroadcastHandle> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.set_broadcast(true)?;

    let frame = offer.encode();
    let mut targets = vec![SocketAddr::from((Ipv4Addr::BROADCAST, offer_port))];
    if let Some(addr) = directed {
        targets.push(addr);
    }

    let (stop, ticks) = mpsc::channel();
    let handle = thread::spawn(move || loop {
        for target in &targets {
            if let Err(error) = socket.send_to(&frame, target) {
                debug!("Offer broadcast to {target} failed: {error}");
            }
        }
        match ticks.recv_timeout(BROADCAST_INTERVAL) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    });

    Ok(BroadcastHandle { stop, handle })
}

/// A dealer discovered via an offer frame. The address combines the
/// datagram's source IP with the offered TCP port.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiscoveredDealer {
    pub addr: SocketAddr,
    pub server_name: String,
}

/// Picks a dealer from a stream of observed offers. An offer whose
/// name matches the expected one wins immediately; any other offer is
/// remembered and returned once the preference window lapses.
#[derive(Debug)]
pub struct OfferSelector {
    expected_name: Option<String>,
    deadline: Instant,
    fallback: Option<DiscoveredDealer>,
}

impl OfferSelector {
    pub fn new(expected_name: Option<String>, deadline: Instant) -> Self {
        Self {
            expected_name,
            deadline,
            fallback: None,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Feeds one decoded offer to the selector. Names are compared
    /// with surrounding whitespace trimmed.
    pub fn observe(
        &mut self,
        offer: &Offer,
        source: IpAddr,
        now: Instant,
    ) -> Option<DiscoveredDealer> {
        let dealer = DiscoveredDealer {
            addr: SocketAddr::new(source, offer.tcp_port),
            server_name: offer.server_name.clone(),
        };
        match &self.expected_name {
            Some(expected) if offer.server_name.trim() != expected.trim() => {
                // Remember the first other table in case the expected
                // one never shows up.
                if self.fallback.is_none() {
                    self.fallback = Some(dealer);
                }
                self.lapsed(now)
            }
            _ => Some(dealer),
        }
    }

    /// Hands out the remembered fallback once the preference window
    /// has lapsed.
    pub fn lapsed(&mut self, now: Instant) -> Option<DiscoveredDealer> {
        if now >= self.deadline {
            self.fallback.take()
        } else {
            None
        }
    }
}

/// Settings for [`listen_for_offer`].
#[derive(Clone, Debug)]
pub struct ListenerConfig {
    /// UDP port to listen for offers on.
    pub offer_port: u16,
    /// Dealer name to hold out for, if any.
    pub expected_name: Option<String>,
    /// How long to hold out before settling for another table.
    pub prefer_window: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            offer_port: OFFER_PORT,
            expected_name: None,
            prefer_window: DEFAULT_PREFER_WINDOW,
        }
    }
}

/// Blocks until a dealer is picked. Malformed datagrams are discarded
/// without touching the preference window.
pub fn listen_for_offer(config: &ListenerConfig) -> io::Result<DiscoveredDealer> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.offer_port))?;
    wait_for_offer(&socket, config.expected_name.clone(), config.prefer_window)
}

fn wait_for_offer(
    socket: &UdpSocket,
    expected_name: Option<String>,
    prefer_window: Duration,
) -> io::Result<DiscoveredDealer> {
    let mut selector = OfferSelector::new(expected_name, Instant::now() + prefer_window);
    let mut buf = [0u8; 64];
    loop {
        let now = Instant::now();
        if let Some(dealer) = selector.lapsed(now) {
            return Ok(dealer);
        }

        // Wake up at the deadline even when nothing arrives. A zero
        // read timeout is an error, and after the deadline the next
        // offer decides anyway, so block indefinitely then.
        let timeout = selector
            .deadline()
            .checked_duration_since(now)
            .filter(|remaining| !remaining.is_zero());
        socket.set_read_timeout(timeout)?;

        let (n, source) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                continue;
            }
            Err(error) => return Err(error),
        };

        let offer = match Offer::decode(&buf[..n]) {
            Ok(offer) => offer,
            Err(error) => {
                debug!("Discarding malformed datagram from {source}: {error}");
                continue;
            }
        };

        if let Some(dealer) = selector.observe(&offer, source.ip(), Instant::now()) {
            return Ok(dealer);
        }
    }
}
