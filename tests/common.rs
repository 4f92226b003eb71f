//! Shared fixtures: an in-memory store and a hand-driven clock that can be
//! reopened across simulated sessions.

use std::rc::Rc;

use chrono::NaiveDate;
use wonderkids::config::RulesConfig;
use wonderkids::progress::{
    FixedClock, MemoryBackend, Progression, StateStore, DEFAULT_STORAGE_KEY,
};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One installation: the backend and clock outlive any single `Progression`.
pub struct Harness {
    pub clock: Rc<FixedClock>,
    pub backend: Rc<MemoryBackend>,
}

impl Harness {
    pub fn new() -> Self {
        Self::starting_on(day(2026, 3, 2))
    }

    pub fn starting_on(start: NaiveDate) -> Self {
        Self {
            clock: Rc::new(FixedClock::new(start)),
            backend: Rc::new(MemoryBackend::new()),
        }
    }

    pub fn open(&self) -> Progression {
        self.open_with(RulesConfig::default())
    }

    pub fn open_with(&self, rules: RulesConfig) -> Progression {
        let store = StateStore::new(Box::new(self.backend.clone()), DEFAULT_STORAGE_KEY);
        Progression::open(store, rules, Box::new(self.clock.clone()))
    }

    /// The stored document, parsed.
    #[allow(dead_code)]
    pub fn stored(&self) -> serde_json::Value {
        let raw = self
            .backend
            .raw(DEFAULT_STORAGE_KEY)
            .expect("document written");
        serde_json::from_str(&raw).unwrap()
    }
}
