// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Once-a-day trigger for the update check

use chrono::{NaiveDate, NaiveDateTime, Timelike};

#[derive(Debug, Clone)]
pub struct UpdateSchedule {
    update_hour: u32,
    last_day: Option<NaiveDate>,
    pending: bool,
}

impl UpdateSchedule {
    pub fn new(update_hour: u32) -> Self {
        Self {
            update_hour,
            last_day: None,
            pending: false,
        }
    }

    /// Feed the current local time; true at most once per calendar day, during `update_hour`.
    ///
    /// A new day arms the check; it fires on the first observation inside the update hour.
    pub fn observe(&mut self, now: NaiveDateTime) -> bool {
        let day = now.date();
        if self.last_day != Some(day) {
            self.last_day = Some(day);
            self.pending = true;
        }

        if self.pending && now.hour() == self.update_hour {
            self.pending = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_fires_once_in_update_hour() {
        let mut schedule = UpdateSchedule::new(3);
        assert!(!schedule.observe(at(1, 2, 59)));
        assert!(schedule.observe(at(1, 3, 1)));
        assert!(!schedule.observe(at(1, 3, 6)));
        assert!(!schedule.observe(at(1, 4, 0)));
    }

    #[test]
    fn test_fires_again_next_day() {
        let mut schedule = UpdateSchedule::new(3);
        assert!(schedule.observe(at(1, 3, 0)));
        assert!(!schedule.observe(at(1, 23, 59)));
        assert!(!schedule.observe(at(2, 0, 0)));
        assert!(schedule.observe(at(2, 3, 30)));
    }

    #[test]
    fn test_missed_hour_waits_for_next_day() {
        let mut schedule = UpdateSchedule::new(3);
        assert!(!schedule.observe(at(1, 10, 0)));
        assert!(!schedule.observe(at(1, 22, 0)));
        assert!(schedule.observe(at(2, 3, 0)));
    }
}
