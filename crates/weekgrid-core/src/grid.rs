//! The fixed weekly grid: time slots by day columns.

use serde::{Deserialize, Serialize};

use crate::model::{Activity, SlotTime, Weekday};

/// Generate the start times of the daily grid.
///
/// Every hour from `start_hour` through `end_hour` is split into
/// `interval_minutes` steps. In the final hour only minutes up to `:30` are
/// kept, so `(9, 20, 30)` yields `09:00 ..= 20:30`.
pub fn time_slots(start_hour: u8, end_hour: u8, interval_minutes: u8) -> Vec<SlotTime> {
    if interval_minutes == 0 {
        return Vec::new();
    }
    let mut slots = Vec::new();
    for hour in start_hour..=end_hour.min(23) {
        for minute in (0..60).step_by(usize::from(interval_minutes)) {
            if hour == end_hour && minute > 30 {
                break;
            }
            if let Some(slot) = SlotTime::new(hour, minute) {
                slots.push(slot);
            }
        }
    }
    slots
}

/// Days and times a client should render, as served by `GET /api/slots`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub days: Vec<Weekday>,
    pub times: Vec<SlotTime>,
}

impl GridLayout {
    pub fn new(times: Vec<SlotTime>) -> Self {
        Self {
            days: Weekday::ALL.to_vec(),
            times,
        }
    }
}

/// One rendered row: a start time and the activity in each day column.
#[derive(Debug)]
pub struct GridRow<'a> {
    pub time: SlotTime,
    pub cells: [Option<&'a Activity>; 7],
}

/// Activities laid out on the weekly grid.
#[derive(Debug)]
pub struct WeekGrid<'a> {
    rows: Vec<GridRow<'a>>,
    unplaced: Vec<&'a Activity>,
}

impl<'a> WeekGrid<'a> {
    pub fn build(activities: &'a [Activity], slots: &[SlotTime]) -> Self {
        let rows = slots
            .iter()
            .map(|&time| GridRow {
                time,
                cells: Weekday::ALL.map(|day| find_activity(activities, day, time)),
            })
            .collect();

        let unplaced = activities
            .iter()
            .filter(|a| !slots.contains(&a.time))
            .collect();

        Self { rows, unplaced }
    }

    pub fn rows(&self) -> &[GridRow<'a>] {
        &self.rows
    }

    /// Activities whose start time is not one of the grid's slots.
    pub fn unplaced(&self) -> &[&'a Activity] {
        &self.unplaced
    }

    pub fn occupied(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.iter().filter(|c| c.is_some()).count())
            .sum()
    }
}

fn find_activity(activities: &[Activity], day: Weekday, time: SlotTime) -> Option<&Activity> {
    activities.iter().find(|a| a.occupies(day, time))
}
