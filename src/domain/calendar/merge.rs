//! Merging several calendar feeds into one document.

use std::collections::HashSet;

use ical::property::Property;

use super::{Calendar, escape_text, property};

/// Calendar-level properties written on a merged document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeHeader {
    pub product_id: String,
    pub name: String,
    pub description: String,
}

impl MergeHeader {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            product_id: "-//calendar-shortener//Merged Calendar//EN".to_string(),
            description: name.clone(),
            name,
        }
    }

    fn properties(&self) -> Vec<Property> {
        vec![
            property("VERSION", "2.0"),
            property("PRODID", self.product_id.as_str()),
            property("CALSCALE", "GREGORIAN"),
            property("X-WR-CALNAME", escape_text(&self.name)),
            property("X-WR-CALDESC", escape_text(&self.description)),
        ]
    }
}

impl Default for MergeHeader {
    fn default() -> Self {
        Self::new("Custom USI Calendar")
    }
}

/// Combines calendars into a single document.
///
/// Every event of every input is kept, in input order, including events that
/// look identical: the merged event count is always the sum of the input
/// counts. Other components are carried over ahead of the events; a
/// `VTIMEZONE` is written once per `TZID`.
pub fn merge(header: &MergeHeader, inputs: &[Calendar]) -> Calendar {
    let mut seen_timezones = HashSet::new();

    let others = inputs
        .iter()
        .flat_map(|cal| cal.components.iter())
        .filter(|c| !c.is_event())
        .filter(|c| {
            c.name() != "VTIMEZONE"
                || c.property("TZID")
                    .is_none_or(|tzid| seen_timezones.insert(tzid.to_string()))
        })
        .cloned();

    let events = inputs.iter().flat_map(|cal| cal.events()).cloned();

    let merged = Calendar::from_parts(header.properties(), others.chain(events).collect());

    debug_assert_eq!(
        merged.event_count(),
        inputs.iter().map(Calendar::event_count).sum::<usize>()
    );

    merged
}
