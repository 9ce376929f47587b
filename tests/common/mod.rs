#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use calendar_shortener::application::services::{CatalogService, ShortenService};
use calendar_shortener::domain::calendar::MergeHeader;
use calendar_shortener::domain::calendar_source::{CalendarSource, SourceError, SubjectGroup};
use calendar_shortener::domain::validation::RequestValidator;
use calendar_shortener::infrastructure::cache::NullCache;
use calendar_shortener::infrastructure::persistence::{
    MemoryCompositeLinkRepository, MemorySimpleLinkRepository,
};
use calendar_shortener::state::AppState;
use calendar_shortener::utils::code_generator::ShortCodeGenerator;

pub const COURSE_URL: &str = "https://calendar.example/dept/42";
pub const OTHER_COURSE_URL: &str = "https://calendar.example/dept/43";
pub const URL_PATTERN: &str = r"^https://calendar\.example/.+";

/// Builds an ICS feed with one event per `(summary, url)` pair.
pub fn feed(events: &[(&str, Option<&str>)]) -> String {
    let mut ics = String::from(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//Feed//EN\r\n\
         BEGIN:VTIMEZONE\r\nTZID:Europe/Zurich\r\nBEGIN:STANDARD\r\n\
         DTSTART:19701025T030000\r\nTZOFFSETFROM:+0200\r\nTZOFFSETTO:+0100\r\n\
         END:STANDARD\r\nEND:VTIMEZONE\r\n",
    );
    for (i, (summary, url)) in events.iter().enumerate() {
        ics.push_str("BEGIN:VEVENT\r\n");
        ics.push_str(&format!("UID:event-{i}@test\r\n"));
        ics.push_str(&format!("SUMMARY:{summary}\r\n"));
        if let Some(url) = url {
            ics.push_str(&format!("URL:{url}\r\n"));
        }
        ics.push_str("DTSTART;TZID=Europe/Zurich:20250301T101500\r\n");
        ics.push_str("END:VEVENT\r\n");
    }
    ics.push_str("END:VCALENDAR\r\n");
    ics
}

pub fn event_count(ics: &str) -> usize {
    ics.lines().filter(|l| l.trim_end() == "BEGIN:VEVENT").count()
}

/// In-process calendar source with fixed feeds.
///
/// Unknown URLs and subject ids report [`SourceError::NotFound`]. While
/// [`FakeCalendarSource::set_down`] is on, every fetch fails as unavailable.
#[derive(Default)]
pub struct FakeCalendarSource {
    courses: HashMap<String, String>,
    subjects: HashMap<String, String>,
    groups: Vec<SubjectGroup>,
    down: AtomicBool,
    fetches: AtomicUsize,
}

impl FakeCalendarSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(mut self, url: &str, body: String) -> Self {
        self.courses.insert(url.to_string(), body);
        self
    }

    pub fn with_subject(mut self, id: &str, body: String) -> Self {
        self.subjects.insert(id.to_string(), body);
        self
    }

    pub fn with_group(mut self, id: &str, course_name: &str, subjects: &[&str]) -> Self {
        self.groups.push(SubjectGroup {
            id: id.to_string(),
            course_name: course_name.to_string(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn lookup(&self, feeds: &HashMap<String, String>, key: &str) -> Result<String, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable(format!("{key}: connection refused")));
        }
        feeds
            .get(key)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(key.to_string()))
    }
}

#[async_trait]
impl CalendarSource for FakeCalendarSource {
    async fn course_calendar(&self, url: &str) -> Result<String, SourceError> {
        self.lookup(&self.courses, url)
    }

    async fn subject_calendar(&self, subject_id: &str) -> Result<String, SourceError> {
        self.lookup(&self.subjects, subject_id)
    }

    async fn calendars(&self) -> Result<Vec<String>, SourceError> {
        let mut cals: Vec<String> = self.courses.keys().cloned().collect();
        cals.sort();
        Ok(cals)
    }

    async fn subject_groups(&self) -> Result<Vec<SubjectGroup>, SourceError> {
        Ok(self.groups.clone())
    }
}

/// A source offering two course calendars, three subject feeds and one group.
pub fn default_source() -> FakeCalendarSource {
    FakeCalendarSource::new()
        .with_course(
            COURSE_URL,
            feed(&[
                ("CS101", None),
                ("CS102", None),
                ("CS101", None),
                ("MA201", None),
            ]),
        )
        .with_course(
            OTHER_COURSE_URL,
            feed(&[("Algebra", Some("https://calendar.example/subject/1"))]),
        )
        .with_subject("100", feed(&[("Ethics", None), ("Ethics", None)]))
        .with_subject("200", feed(&[("Robotics", None)]))
        .with_subject("300", feed(&[]))
        .with_group("77", "Master in Informatics", &["100", "200"])
}

pub struct TestApp {
    pub state: AppState,
    pub source: Arc<FakeCalendarSource>,
}

pub fn create_test_state(source: FakeCalendarSource) -> TestApp {
    create_test_state_with_base(source, None)
}

pub fn create_test_state_with_base(
    source: FakeCalendarSource,
    public_base_url: Option<&str>,
) -> TestApp {
    let source = Arc::new(source);
    let validator = RequestValidator::new(URL_PATTERN).unwrap();

    let shorten_service = Arc::new(ShortenService::new(
        Arc::new(MemorySimpleLinkRepository::new()),
        Arc::new(MemoryCompositeLinkRepository::new()),
        source.clone(),
        validator.clone(),
        ShortCodeGenerator::default(),
        MergeHeader::default(),
    ));
    let catalog_service = Arc::new(CatalogService::new(source.clone(), validator));

    let state = AppState {
        shorten_service,
        catalog_service,
        cache: Arc::new(NullCache::new()),
        public_base_url: public_base_url.map(str::to_string),
    };

    TestApp { state, source }
}

/// Code at the end of a short URL.
pub fn code_of(short_url: &str) -> &str {
    short_url.rsplit('/').next().unwrap_or_default()
}
