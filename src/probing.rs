//! Probing policies used to resolve collisions.
//!
//! A policy is created for a single walk from a home slot and produces the
//! candidate slots to visit after it, one per call to [`Probe::advance`]. The
//! sequence depends only on the start slot, the modulus, and how many times
//! `advance` has been called.

/// A collision-resolution strategy for the open-addressing table.
///
/// Implementations are stateless between lookups: the table builds a fresh
/// probe for every walk.
pub trait Probe {
    /// Begins a probe sequence at `start` over a table of `modulus` slots.
    fn start(start: usize, modulus: usize) -> Self;

    /// Returns the next candidate slot.
    fn advance(&mut self) -> usize;

    /// Number of calls to [`advance`](Probe::advance) after which the
    /// sequence is guaranteed to have visited every slot of a power-of-two
    /// `modulus`.
    fn probe_limit(modulus: usize) -> usize;
}

/// Linear probing: each step moves one slot forward.
///
/// # Examples
///
/// ```rust
/// use probe_hash::probing::LinearProbing;
/// use probe_hash::probing::Probe;
///
/// let mut probe = LinearProbing::start(6, 8);
/// assert_eq!(probe.advance(), 7);
/// assert_eq!(probe.advance(), 0);
/// assert_eq!(probe.advance(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearProbing {
    current: usize,
    modulus: usize,
}

impl Probe for LinearProbing {
    #[inline(always)]
    fn start(start: usize, modulus: usize) -> Self {
        debug_assert!(modulus > 0);
        Self {
            current: start,
            modulus,
        }
    }

    #[inline(always)]
    fn advance(&mut self) -> usize {
        self.current += 1;
        if self.current == self.modulus {
            self.current = 0;
        }
        self.current
    }

    #[inline(always)]
    fn probe_limit(modulus: usize) -> usize {
        modulus
    }
}

/// Quadratic probing: the n-th step moves `n²` slots forward, so the offsets
/// from the home slot are 1, 5, 14, 30, ...
///
/// # Examples
///
/// ```rust
/// use probe_hash::probing::Probe;
/// use probe_hash::probing::QuadraticProbing;
///
/// let mut probe = QuadraticProbing::start(0, 8);
/// assert_eq!(probe.advance(), 1);
/// assert_eq!(probe.advance(), 5);
/// assert_eq!(probe.advance(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadraticProbing {
    current: usize,
    modulus: usize,
    step: usize,
}

impl Probe for QuadraticProbing {
    #[inline(always)]
    fn start(start: usize, modulus: usize) -> Self {
        debug_assert!(modulus > 0);
        Self {
            current: start,
            modulus,
            step: 1,
        }
    }

    #[inline(always)]
    fn advance(&mut self) -> usize {
        let delta = (self.step as u128) * (self.step as u128);
        self.current = ((self.current as u128 + delta) % self.modulus as u128) as usize;
        self.step += 1;
        self.current
    }

    #[inline(always)]
    fn probe_limit(modulus: usize) -> usize {
        modulus.saturating_mul(2)
    }
}
