//! Reusable rendezvous for the worker phases
//!
//! `std::sync::Barrier` has no notion of failure: if one worker dies the
//! others wait forever. `PhaseBarrier` adds a broken state. Once any party
//! calls [`PhaseBarrier::abort`] (explicitly or by unwinding through an
//! [`AbortOnPanic`] guard) every current and future `wait` returns
//! [`SimError::BarrierBroken`].

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use log::error;

use super::errors::SimError;

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    broken: bool,
}

#[derive(Debug)]
pub struct PhaseBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl PhaseBarrier {
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "a barrier needs at least one party");
        Self {
            parties,
            state: Mutex::new(BarrierState { arrived: 0, generation: 0, broken: false }),
            released: Condvar::new(),
        }
    }

    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Block until all parties arrive.
    ///
    /// Returns `Ok(true)` for the party that completed the generation,
    /// `Ok(false)` for the others.
    pub fn wait(&self) -> Result<bool, SimError> {
        let mut state = self.lock();
        if state.broken {
            return Err(SimError::BarrierBroken);
        }

        let generation = state.generation;
        state.arrived += 1;

        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.released.notify_all();
            return Ok(true);
        }

        while state.generation == generation && !state.broken {
            state = self.released.wait(state).unwrap_or_else(PoisonError::into_inner);
        }

        // a generation that completed before the break still counts
        if state.generation == generation {
            Err(SimError::BarrierBroken)
        } else {
            Ok(false)
        }
    }

    /// Break the barrier and release every waiting party with an error.
    pub fn abort(&self) {
        let mut state = self.lock();
        if !state.broken {
            state.broken = true;
            self.released.notify_all();
        }
    }

    pub fn is_broken(&self) -> bool {
        self.lock().broken
    }

    /// The state is only mutated in short non-panicking sections, so a
    /// poisoned lock still holds consistent data.
    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Breaks the barrier if the owning thread unwinds.
pub struct AbortOnPanic<'a> {
    barrier: &'a PhaseBarrier,
    id: usize,
}

impl<'a> AbortOnPanic<'a> {
    pub fn new(barrier: &'a PhaseBarrier, id: usize) -> Self {
        Self { barrier, id }
    }
}

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            error!("worker {} panicked, breaking phase barrier", self.id);
            self.barrier.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn single_party_never_blocks() {
        let barrier = PhaseBarrier::new(1);
        for _ in 0..3 {
            assert!(barrier.wait().unwrap());
        }
    }

    #[test]
    fn releases_all_parties_each_generation() {
        let barrier = PhaseBarrier::new(4);
        let leaders = AtomicUsize::new(0);
        let passed = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..10 {
                        if barrier.wait().unwrap() {
                            leaders.fetch_add(1, Ordering::Relaxed);
                        }
                        passed.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });

        assert_eq!(leaders.load(Ordering::Relaxed), 10);
        assert_eq!(passed.load(Ordering::Relaxed), 40);
    }

    #[test]
    fn abort_releases_waiters_with_error() {
        let barrier = PhaseBarrier::new(3);

        thread::scope(|s| {
            let waiters: Vec<_> = (0..2).map(|_| s.spawn(|| barrier.wait())).collect();
            // give the waiters a chance to block; correctness does not depend on it
            thread::sleep(std::time::Duration::from_millis(20));
            barrier.abort();
            for w in waiters {
                assert!(matches!(w.join().unwrap(), Err(SimError::BarrierBroken)));
            }
        });

        assert!(barrier.is_broken());
        assert!(matches!(barrier.wait(), Err(SimError::BarrierBroken)));
    }

    #[test]
    fn panicking_party_breaks_barrier() {
        let barrier = PhaseBarrier::new(2);

        thread::scope(|s| {
            let other = s.spawn(|| barrier.wait());
            let doomed = s.spawn(|| {
                let _guard = AbortOnPanic::new(&barrier, 1);
                panic!("boom");
            });
            assert!(doomed.join().is_err());
            assert!(matches!(other.join().unwrap(), Err(SimError::BarrierBroken)));
        });
    }
}
