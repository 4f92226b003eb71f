//! Calendar source for day rollovers and bonus claims.

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use std::cell::Cell;

/// Supplies "now" and "today" to the store. Day comparisons use the player's
/// local calendar, timestamps are UTC.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    fn today(&self) -> NaiveDate;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a chosen day that can be moved forward by hand.
#[derive(Debug, Clone)]
pub struct FixedClock {
    day: Cell<NaiveDate>,
}

impl FixedClock {
    pub fn new(day: NaiveDate) -> Self {
        Self { day: Cell::new(day) }
    }

    pub fn set(&self, day: NaiveDate) {
        self.day.set(day);
    }

    pub fn advance_days(&self, days: i64) {
        self.day.set(self.day.get() + Duration::days(days));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let noon = self
            .day
            .get()
            .and_hms_opt(12, 0, 0)
            .unwrap_or_default();
        DateTime::from_naive_utc_and_offset(noon, Utc)
    }

    fn today(&self) -> NaiveDate {
        self.day.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
