//! Decoder for TimeEdit booking descriptors.
//!
//! A descriptor is the `title` attribute of a booking node, for example
//!
//! ```text
//!  2026-01-22 10:00 - 12:00 H3LLJ_DITMG, GMI35S_V3NJJ, Handledning, Ulrika Artursson Wissa, Internet, Samtal298 (zoom) ID 669241
//! ```
//!
//! The format is owned by the upstream page and only loosely structured, so
//! every field is located by position and degrades to [`MISSING`] on its own
//! when its position is not there. Decoding never fails.

use crate::models::ScheduleEntry;

/// Placeholder for a field that could not be located.
pub const MISSING: &str = "Missing";

/// Marker that shows the instructor slot holds a group label instead.
const GROUP_MARKER: &str = "grupp";

/// Comma-split view over one descriptor.
struct Descriptor<'a> {
    parts: Vec<&'a str>,
}

impl<'a> Descriptor<'a> {
    fn new(raw: &'a str) -> Self {
        let parts = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split(',').map(str::trim).collect()
        };
        Self { parts }
    }

    /// Segment `n` counted from the end, `1` being the last one.
    fn from_end(&self, n: usize) -> Option<&'a str> {
        self.parts
            .len()
            .checked_sub(n)
            .and_then(|idx| self.parts.get(idx).copied())
    }

    fn time_tokens(&self) -> Vec<&'a str> {
        self.parts
            .first()
            .map(|head| head.split(' ').collect())
            .unwrap_or_default()
    }

    fn date(&self) -> Option<String> {
        self.time_tokens().first().map(|d| d.to_string())
    }

    // Token 2 is the "-" separator and is not checked.
    fn time(&self) -> Option<String> {
        match self.time_tokens().as_slice() {
            [_, start, _, end, ..] => Some(format!("{start} - {end}")),
            _ => None,
        }
    }

    fn course(&self) -> Option<String> {
        self.parts.get(1).map(|c| c.to_string())
    }

    fn instructor(&self) -> Option<String> {
        if self.parts.len() < 4 {
            return None;
        }
        let candidate = self.parts[3];
        if candidate.to_lowercase().contains(GROUP_MARKER) {
            self.from_end(3).map(str::to_string)
        } else {
            Some(candidate.to_string())
        }
    }

    fn room(&self) -> Option<String> {
        self.from_end(1)
            .and_then(|last| last.split(' ').next())
            .map(str::to_string)
    }

    fn session_type(&self) -> Option<String> {
        if self.parts.len() < 4 {
            return None;
        }
        self.from_end(4).map(str::to_string)
    }
}

fn or_missing(field: Option<String>) -> String {
    field.unwrap_or_else(|| MISSING.to_string())
}

/// Decodes a single booking descriptor into a [`ScheduleEntry`].
pub fn decode(raw: &str) -> ScheduleEntry {
    let descriptor = Descriptor::new(raw);
    ScheduleEntry {
        date: or_missing(descriptor.date()),
        time: or_missing(descriptor.time()),
        course: or_missing(descriptor.course()),
        instructor: or_missing(descriptor.instructor()),
        room: or_missing(descriptor.room()),
        session_type: or_missing(descriptor.session_type()),
    }
}

/// Decodes every descriptor, one entry per input, in input order.
pub fn decode_all<S: AsRef<str>>(raws: &[S]) -> Vec<ScheduleEntry> {
    raws.iter().map(|raw| decode(raw.as_ref())).collect()
}
