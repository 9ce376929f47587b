//! Minimal iCalendar (RFC 5545) document model.
//!
//! Feeds are read with the `ical` parser and kept as raw properties, so events
//! pass through the service unchanged apart from line folding. Only what the
//! service needs is interpreted: component kinds, a handful of event
//! properties and the subject an event belongs to. `VEVENT` (with its
//! alarms) and `VTIMEZONE` (with its transitions) are carried; other
//! top-level components are not.
//!
//! A subject is identified by the event's `URL` property, or by its `SUMMARY`
//! when the event has no `URL`.

pub mod merge;

use std::collections::HashSet;
use std::io::Cursor;

use ical::IcalParser;
use ical::parser::ical::component::{
    IcalEvent, IcalTimeZone, IcalTimeZoneTransition, IcalTimeZoneTransitionType,
};
use ical::property::Property;

pub use merge::{MergeHeader, merge};

/// Maximum octets per physical line before folding.
const MAX_LINE_OCTETS: usize = 75;

/// Errors raised while reading a calendar feed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IcsError {
    #[error("document does not contain a VCALENDAR")]
    NotACalendar,

    #[error("malformed calendar: {0}")]
    Parse(String),
}

/// A component (`VEVENT`, `VTIMEZONE`, ...) with its own properties and any
/// nested sub-components.
#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    properties: Vec<Property>,
    children: Vec<Component>,
}

impl Component {
    fn leaf(name: &str, properties: Vec<Property>) -> Self {
        Self {
            name: name.to_string(),
            properties,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_event(&self) -> bool {
        self.name == "VEVENT"
    }

    /// Value of the first property called `name`.
    ///
    /// Properties of nested components (e.g. a `VALARM` inside an event) are
    /// not considered.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(|p| p.value.as_deref())
    }

    /// Subject identifier of an event: its `URL`, else its `SUMMARY`.
    pub fn subject_id(&self) -> Option<&str> {
        self.property("URL").or_else(|| self.property("SUMMARY"))
    }

    fn matches_any(&self, selected: &HashSet<&str>) -> bool {
        let by_url = self.property("URL").is_some_and(|v| selected.contains(v));
        let by_summary = self
            .property("SUMMARY")
            .is_some_and(|v| selected.contains(v));
        by_url || by_summary
    }
}

impl From<IcalEvent> for Component {
    fn from(event: IcalEvent) -> Self {
        Self {
            name: "VEVENT".to_string(),
            properties: event.properties,
            children: event
                .alarms
                .into_iter()
                .map(|alarm| Component::leaf("VALARM", alarm.properties))
                .collect(),
        }
    }
}

impl From<IcalTimeZoneTransition> for Component {
    fn from(transition: IcalTimeZoneTransition) -> Self {
        let name = match transition.transition {
            IcalTimeZoneTransitionType::STANDARD => "STANDARD",
            IcalTimeZoneTransitionType::DAYLIGHT => "DAYLIGHT",
        };
        Component::leaf(name, transition.properties)
    }
}

impl From<IcalTimeZone> for Component {
    fn from(timezone: IcalTimeZone) -> Self {
        Self {
            name: "VTIMEZONE".to_string(),
            properties: timezone.properties,
            children: timezone.transitions.into_iter().map(Into::into).collect(),
        }
    }
}

/// A subject offered by a calendar feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectEntry {
    pub id: String,
    pub name: String,
}

/// A parsed `VCALENDAR` document.
#[derive(Debug, Clone, Default)]
pub struct Calendar {
    properties: Vec<Property>,
    components: Vec<Component>,
}

impl Calendar {
    /// Builds a calendar from calendar-level properties and components.
    pub fn from_parts(properties: Vec<Property>, components: Vec<Component>) -> Self {
        Self {
            properties,
            components,
        }
    }

    /// Parses an ICS document.
    ///
    /// Only the first `VCALENDAR` is read; time zones come before events.
    ///
    /// # Errors
    ///
    /// Returns [`IcsError`] when the text holds no calendar or the first one
    /// is malformed.
    pub fn parse(text: &str) -> Result<Self, IcsError> {
        let text = text.trim_start_matches('\u{feff}');

        let calendar = IcalParser::new(Cursor::new(text.as_bytes()))
            .next()
            .ok_or(IcsError::NotACalendar)?
            .map_err(|e| IcsError::Parse(e.to_string()))?;

        let components = calendar
            .timezones
            .into_iter()
            .map(Component::from)
            .chain(calendar.events.into_iter().map(Component::from))
            .collect();

        Ok(Self {
            properties: calendar.properties,
            components,
        })
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn events(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.is_event())
    }

    pub fn event_count(&self) -> usize {
        self.events().count()
    }

    /// Subjects offered by this calendar, in order of first appearance.
    pub fn subject_catalog(&self) -> Vec<SubjectEntry> {
        let mut seen = HashSet::new();

        self.events()
            .filter_map(|event| {
                let id = event.subject_id()?;
                if !seen.insert(id) {
                    return None;
                }
                let name = event.property("SUMMARY").unwrap_or(id);
                Some(SubjectEntry {
                    id: id.to_string(),
                    name: name.to_string(),
                })
            })
            .collect()
    }

    /// Identifiers of every subject this calendar offers.
    pub fn subject_ids(&self) -> HashSet<&str> {
        self.events().filter_map(Component::subject_id).collect()
    }

    /// Keeps only the events of the selected subjects.
    ///
    /// Non-event components such as `VTIMEZONE` are always kept.
    pub fn filter_subjects(&self, selected: &[String]) -> Calendar {
        let selected: HashSet<&str> = selected.iter().map(String::as_str).collect();

        Calendar {
            properties: self.properties.clone(),
            components: self
                .components
                .iter()
                .filter(|c| !c.is_event() || c.matches_any(&selected))
                .cloned()
                .collect(),
        }
    }

    /// Serializes the calendar with CRLF line endings and folded lines.
    pub fn to_ics(&self) -> String {
        let mut out = String::new();
        let mut writer = FoldedWriter::new(&mut out);

        writer.write_line("BEGIN:VCALENDAR");
        for property in &self.properties {
            writer.write_property(property);
        }
        for component in &self.components {
            writer.write_component(component);
        }
        writer.write_line("END:VCALENDAR");

        out
    }
}

/// Builds a property without parameters.
pub(crate) fn property(name: &str, value: impl Into<String>) -> Property {
    Property {
        name: name.to_string(),
        params: None,
        value: Some(value.into()),
    }
}

struct FoldedWriter<'a> {
    buf: &'a mut String,
}

impl<'a> FoldedWriter<'a> {
    fn new(buf: &'a mut String) -> Self {
        Self { buf }
    }

    fn write_component(&mut self, component: &Component) {
        self.write_line(&format!("BEGIN:{}", component.name));
        for property in &component.properties {
            self.write_property(property);
        }
        for child in &component.children {
            self.write_component(child);
        }
        self.write_line(&format!("END:{}", component.name));
    }

    fn write_property(&mut self, property: &Property) {
        let mut line = property.name.clone();

        for (key, values) in property.params.iter().flatten() {
            line.push(';');
            line.push_str(key);
            line.push('=');
            let values: Vec<_> = values.iter().map(|v| quote_param(v)).collect();
            line.push_str(&values.join(","));
        }

        line.push(':');
        line.push_str(property.value.as_deref().unwrap_or_default());
        self.write_line(&line);
    }

    fn write_line(&mut self, line: &str) {
        let mut rest = line;
        let mut limit = MAX_LINE_OCTETS;

        while rest.len() > limit {
            let mut cut = limit;
            while !rest.is_char_boundary(cut) {
                cut -= 1;
            }
            self.buf.push_str(&rest[..cut]);
            self.buf.push_str("\r\n ");
            rest = &rest[cut..];
            limit = MAX_LINE_OCTETS - 1;
        }

        self.buf.push_str(rest);
        self.buf.push_str("\r\n");
    }
}

/// Parameter values holding `:`, `;` or `,` must be quoted.
fn quote_param(value: &str) -> String {
    if !value.starts_with('"') && value.contains([':', ';', ',']) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Escapes a TEXT value (RFC 5545 section 3.3.11).
pub(crate) fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
