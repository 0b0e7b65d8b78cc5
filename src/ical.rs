use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use icalendar::{Calendar, Component, Event, EventLike};

use crate::models::ScheduleEntry;

#[derive(Clone, Default)]
pub struct ScheduleExporter;

impl ScheduleExporter {
    pub fn new() -> Self {
        Self
    }

    /// Start and end of an entry, if its date and time fields are well formed.
    pub fn entry_bounds(entry: &ScheduleEntry) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let date = NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d").ok()?;
        let (start, end) = entry.time.split_once(" - ")?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").ok()?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").ok()?;
        Some((date.and_time(start), date.and_time(end)))
    }

    /// Builds a calendar from the entries that can be placed in time.
    /// Returns `None` when no entry qualifies.
    pub fn generate(&self, entries: &[ScheduleEntry]) -> Option<Vec<u8>> {
        let mut calendar = Calendar::new();
        calendar.name("Högskolan Dalarna Schedule");
        let mut events = 0usize;

        for entry in entries {
            let Some((start, end)) = Self::entry_bounds(entry) else {
                tracing::debug!(date = %entry.date, time = %entry.time, "entry not placeable, skipped");
                continue;
            };

            let mut event = Event::new();
            event.summary(&format!("{}: {}", entry.course, entry.session_type));
            event.starts(start);
            event.ends(end);
            event.location(&entry.room);
            event.description(&format!("Instructor: {}", entry.instructor));
            event.uid(&format!(
                "{}-{}-{}-du-schedule",
                start.format("%Y%m%dT%H%M%S"),
                entry.course.replace(' ', "-"),
                entry.room.replace(' ', "-")
            ));
            calendar.push(event);
            events += 1;
        }

        (events > 0).then(|| calendar.to_string().into_bytes())
    }
}
