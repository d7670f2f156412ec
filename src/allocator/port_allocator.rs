//! Randomized base-port selection and sequential port hand-out.
//!
//! Every replica set or sharded cluster draws one random base port from a
//! wide range, then assigns members sequentially from it. Parallel test runs
//! on one host therefore rarely collide.

use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tracing::debug;

use crate::PortRange;
use crate::Result;
use crate::TopologyError;

lazy_static! {
    static ref SHARED_ALLOCATOR: Arc<PortAllocator> = Arc::new(PortAllocator::from_entropy());
}

/// Thread-safe random source for base ports
#[derive(Debug)]
pub struct PortAllocator {
    rng: Mutex<StdRng>,
}

impl PortAllocator {
    /// Seeds from the operating system's entropy source
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic allocator, same seed gives the same base ports
    pub fn seeded(seed: u64) -> Self {
        debug!(seed, "seeded port allocator");
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Process-wide allocator, seeded once on first use
    pub fn shared() -> Arc<PortAllocator> {
        SHARED_ALLOCATOR.clone()
    }

    /// Uniform draw from `[range.start, range.end)`.
    /// Callers validate ranges up front; an empty range yields its start.
    pub fn draw(
        &self,
        range: PortRange,
    ) -> u16 {
        if range.is_empty() {
            return range.start;
        }
        self.rng.lock().gen_range(range.start..range.end)
    }

    /// Draws a base and wraps it in a sequential counter
    pub fn counter(
        &self,
        range: PortRange,
    ) -> PortCounter {
        PortCounter::new(self.draw(range))
    }
}

/// Monotonic port counter seeded from a random base
#[derive(Debug, Clone)]
pub struct PortCounter {
    start: u16,
    next: Option<u16>,
}

impl PortCounter {
    pub fn new(start: u16) -> Self {
        Self {
            start,
            next: Some(start),
        }
    }

    /// Port the next call to [`PortCounter::next_port`] returns
    pub fn peek(&self) -> Option<u16> {
        self.next
    }

    /// Hands out the next port. Ports are strictly increasing;
    /// running past `u16::MAX` is an error, never a wrap-around.
    pub fn next_port(&mut self) -> Result<u16> {
        let port = self.next.ok_or(TopologyError::PortsExhausted { start: self.start })?;
        self.next = port.checked_add(1);
        Ok(port)
    }
}
