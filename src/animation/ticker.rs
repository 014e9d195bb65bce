//! Tick source and the subscription handles effect instances hold on it.
//!
//! Everything here is single-threaded: the ledger is shared through `Rc<RefCell<_>>`
//! between the ticker, its probes and the live handles.

use std::{
    cell::RefCell,
    collections::BTreeSet,
    rc::Rc,
};

#[derive(Debug, Default)]
struct Ledger {
    next_id: u64,
    live: BTreeSet<u64>,
    issued: u64,
    released: u64,
}

/// Continuous tick source: turns wall-clock timestamps into elapsed seconds.
#[derive(Debug)]
pub struct Ticker {
    ledger: Rc<RefCell<Ledger>>,
    last_secs: Option<f64>,
    max_dt: f64,
    frame: u64,
}

impl Ticker {
    /// `max_dt` bounds the elapsed time handed out per tick.
    pub fn new(max_dt: f64) -> Self {
        Self {
            ledger: Rc::default(),
            last_secs: None,
            max_dt: if max_dt.is_finite() && max_dt > 0.0 {
                max_dt
            } else {
                f64::INFINITY
            },
            frame: 0,
        }
    }

    /// Register one callback slot. The returned handle must be released (or dropped) to
    /// unregister it.
    pub fn subscribe(&self) -> TickSubscription {
        let mut ledger = self.ledger.borrow_mut();
        let id = ledger.next_id;
        ledger.next_id += 1;
        ledger.live.insert(id);
        ledger.issued += 1;
        TickSubscription {
            id,
            ledger: Some(Rc::clone(&self.ledger)),
        }
    }

    /// Elapsed seconds since the previous timestamp, clamped to `[0, max_dt]`. The first
    /// call returns 0.
    pub fn advance_to(&mut self, now_secs: f64) -> f64 {
        let dt = match self.last_secs {
            Some(last) => self.clamp_dt(now_secs - last),
            None => 0.0,
        };
        if now_secs.is_finite() {
            self.last_secs = Some(now_secs);
        }
        dt
    }

    /// Clamp an externally measured elapsed time the same way [`Ticker::advance_to`] does.
    pub fn clamp_dt(&self, dt: f64) -> f64 {
        if dt.is_finite() {
            dt.clamp(0.0, self.max_dt)
        } else {
            0.0
        }
    }

    /// Number the next frame. Called once per tick by the scheduler.
    pub fn count_frame(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn outstanding(&self) -> usize {
        self.ledger.borrow().live.len()
    }

    /// Instrumentation handle that outlives the ticker.
    pub fn probe(&self) -> TickerProbe {
        TickerProbe {
            ledger: Rc::clone(&self.ledger),
        }
    }
}

/// Read-only view of a ticker's subscription ledger.
#[derive(Clone, Debug)]
pub struct TickerProbe {
    ledger: Rc<RefCell<Ledger>>,
}

impl TickerProbe {
    pub fn outstanding(&self) -> usize {
        self.ledger.borrow().live.len()
    }

    pub fn issued(&self) -> u64 {
        self.ledger.borrow().issued
    }

    pub fn released(&self) -> u64 {
        self.ledger.borrow().released
    }
}

/// Owned tick-subscription handle. Releasing is idempotent; dropping releases.
#[derive(Debug)]
pub struct TickSubscription {
    id: u64,
    ledger: Option<Rc<RefCell<Ledger>>>,
}

impl TickSubscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.ledger.is_some()
    }

    /// Unregister. Returns `true` only for the call that actually released.
    pub fn release(&mut self) -> bool {
        let Some(ledger) = self.ledger.take() else {
            return false;
        };
        let mut ledger = ledger.borrow_mut();
        if ledger.live.remove(&self.id) {
            ledger.released += 1;
            true
        } else {
            false
        }
    }
}

impl Drop for TickSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ticker.rs"]
mod tests;
