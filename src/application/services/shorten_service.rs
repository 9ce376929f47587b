//! Short link creation and calendar resolution.

use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::domain::calendar::{Calendar, MergeHeader, merge};
use crate::domain::calendar_source::{CalendarSource, SourceError};
use crate::domain::entities::{CompositeLink, NewCompositeLink, NewSimpleLink, SimpleLink};
use crate::domain::repositories::{CompositeLinkRepository, GetOrCreate, SimpleLinkRepository};
use crate::domain::validation::{
    RequestValidator, ValidationError, check_subject_id, ensure_in_catalog,
};
use crate::error::AppError;
use crate::utils::code_generator::{ShortCodeGenerator, is_valid_code};

/// The two kinds of short links, each with its own code space and route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Simple,
    Composite,
}

impl LinkKind {
    pub fn route(&self) -> &'static str {
        match self {
            Self::Simple => "s",
            Self::Composite => "cs",
        }
    }
}

/// Which feed a fetch task was for.
#[derive(Debug, Clone)]
enum Feed {
    Base(String),
    Subject(usize, String),
}

impl Feed {
    fn label(&self) -> &str {
        match self {
            Self::Base(url) => url,
            Self::Subject(_, id) => id,
        }
    }
}

/// How a missing feed is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    /// While creating a link: a missing feed means the request named it wrongly.
    Validate,
    /// While resolving a stored link: every failure is the source's.
    Resolve,
}

/// Service for creating short links and serving the calendars they point to.
///
/// Creation is idempotent: the same request (in any subject order) always
/// yields the same record. Resolution re-fetches upstream feeds on every call.
pub struct ShortenService {
    simple_links: Arc<dyn SimpleLinkRepository>,
    composite_links: Arc<dyn CompositeLinkRepository>,
    source: Arc<dyn CalendarSource>,
    validator: RequestValidator,
    generator: ShortCodeGenerator,
    merge_header: MergeHeader,
}

impl ShortenService {
    pub fn new(
        simple_links: Arc<dyn SimpleLinkRepository>,
        composite_links: Arc<dyn CompositeLinkRepository>,
        source: Arc<dyn CalendarSource>,
        validator: RequestValidator,
        generator: ShortCodeGenerator,
        merge_header: MergeHeader,
    ) -> Self {
        Self {
            simple_links,
            composite_links,
            source,
            validator,
            generator,
            merge_header,
        }
    }

    /// Returns the short link for a calendar URL and subject selection,
    /// creating it on first use.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the request breaks a validation rule,
    ///   including subjects the calendar does not offer
    /// - [`AppError::SourceUnavailable`] if the calendar cannot be fetched
    /// - [`AppError::StoreUnavailable`] on storage errors
    pub async fn shorten(
        &self,
        url: Option<&str>,
        subjects: Option<&str>,
    ) -> Result<SimpleLink, AppError> {
        let selection = self.validator.validate_simple(url, subjects)?;

        let calendar = self
            .fetch_course(&selection.url, FetchMode::Validate)
            .await?;
        ensure_in_catalog(&selection.subjects, &calendar.subject_ids())?;

        let new_link = NewSimpleLink::new(self.generator.generate(), &selection);
        self.store_simple(new_link).await
    }

    /// Returns the filtered calendar behind a simple short code as ICS text.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code is unknown
    /// - [`AppError::SourceUnavailable`] if the calendar cannot be fetched
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        let link = self.find_simple(code).await?;

        let calendar = self.fetch_course(&link.url, FetchMode::Resolve).await?;

        Ok(calendar.filter_subjects(&link.subjects).to_ics())
    }

    /// Looks up a simple link by code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    pub async fn find_simple(&self, code: &str) -> Result<SimpleLink, AppError> {
        let link = if is_valid_code(code) {
            self.simple_links.find_by_code(code).await?
        } else {
            None
        };

        link.ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    /// Returns the composite link for a merge request, creating it on first use.
    ///
    /// Every feed is fetched before anything is stored, so a failed request
    /// leaves no record behind.
    ///
    /// # Errors
    ///
    /// Same as [`Self::shorten`]; an extra subject without a feed is reported
    /// as [`ValidationError::UnknownSubject`].
    pub async fn shorten_composite(
        &self,
        has_base_calendar: bool,
        url: Option<&str>,
        subjects: Option<&str>,
        extra_subjects: Option<&str>,
    ) -> Result<CompositeLink, AppError> {
        let selection =
            self.validator
                .validate_composite(has_base_calendar, url, subjects, extra_subjects)?;

        for subject in &selection.extra_subjects {
            check_subject_id(subject)?;
        }

        let base_url = selection.base.as_ref().map(|b| b.url.as_str());
        let (base, extras) = self
            .fetch_feeds(base_url, &selection.extra_subjects, FetchMode::Validate)
            .await?;

        let mut inputs = Vec::with_capacity(extras.len() + 1);
        if let Some(base) = base {
            ensure_in_catalog(selection.base_subjects(), &base.subject_ids())?;
            inputs.push(base.filter_subjects(selection.base_subjects()));
        }
        inputs.extend(extras);

        let event_count = merge(&self.merge_header, &inputs).event_count() as i64;

        let new_link =
            NewCompositeLink::new(self.generator.generate(), &selection, Some(event_count));
        self.store_composite(new_link).await
    }

    /// Returns the merged calendar behind a composite short code as ICS text.
    ///
    /// A merged event count that differs from the one recorded at creation is
    /// logged; upstream feeds change over time.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code is unknown
    /// - [`AppError::SourceUnavailable`] if any feed cannot be fetched
    pub async fn resolve_composite(&self, code: &str) -> Result<String, AppError> {
        let link = self.find_composite(code).await?;

        let base_url = link
            .base_url
            .as_deref()
            .filter(|_| link.has_base_calendar);
        let (base, extras) = self
            .fetch_feeds(base_url, &link.extra_subjects, FetchMode::Resolve)
            .await?;

        let mut inputs = Vec::with_capacity(extras.len() + 1);
        if let Some(base) = base {
            inputs.push(base.filter_subjects(&link.base_subjects));
        }
        inputs.extend(extras);

        let merged = merge(&self.merge_header, &inputs);

        if let Some(expected) = link.event_count {
            let actual = merged.event_count() as i64;
            if actual != expected {
                warn!(
                    code = %link.code,
                    expected,
                    actual,
                    "Composite calendar event count changed since creation"
                );
            }
        }

        Ok(merged.to_ics())
    }

    /// Looks up a composite link by code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    pub async fn find_composite(&self, code: &str) -> Result<CompositeLink, AppError> {
        let link = if is_valid_code(code) {
            self.composite_links.find_by_code(code).await?
        } else {
            None
        };

        link.ok_or_else(|| {
            AppError::not_found("Composite link not found", json!({ "code": code }))
        })
    }

    /// Number of stored simple and composite links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage errors.
    pub async fn link_counts(&self) -> Result<(i64, i64), AppError> {
        let simple = self.simple_links.count().await?;
        let composite = self.composite_links.count().await?;
        Ok((simple, composite))
    }

    /// Builds the public short URL for a code.
    pub fn short_url(base: &str, kind: LinkKind, code: &str) -> String {
        format!("{}/{}/{}", base.trim_end_matches('/'), kind.route(), code)
    }

    async fn store_simple(&self, mut new_link: NewSimpleLink) -> Result<SimpleLink, AppError> {
        loop {
            match self.simple_links.get_or_create(new_link.clone()).await? {
                GetOrCreate::Created(link) => {
                    info!(code = %link.code, url = %link.url, "Created short link");
                    return Ok(link);
                }
                GetOrCreate::Existing(link) => {
                    debug!(code = %link.code, "Reusing existing short link");
                    return Ok(link);
                }
                GetOrCreate::CodeTaken => {
                    debug!(code = %new_link.code, "Short code collision, drawing again");
                    new_link = new_link.with_code(self.generator.generate());
                }
            }
        }
    }

    async fn store_composite(
        &self,
        mut new_link: NewCompositeLink,
    ) -> Result<CompositeLink, AppError> {
        loop {
            match self.composite_links.get_or_create(new_link.clone()).await? {
                GetOrCreate::Created(link) => {
                    info!(
                        code = %link.code,
                        extra_subjects = link.extra_subjects.len(),
                        "Created composite link"
                    );
                    return Ok(link);
                }
                GetOrCreate::Existing(link) => {
                    debug!(code = %link.code, "Reusing existing composite link");
                    return Ok(link);
                }
                GetOrCreate::CodeTaken => {
                    debug!(code = %new_link.code, "Composite code collision, drawing again");
                    new_link = new_link.with_code(self.generator.generate());
                }
            }
        }
    }

    async fn fetch_course(&self, url: &str, mode: FetchMode) -> Result<Calendar, AppError> {
        let feed = Feed::Base(url.to_string());
        let body = self
            .source
            .course_calendar(url)
            .await
            .map_err(|e| feed_error(&feed, e, mode))?;

        parse_feed(&feed, &body)
    }

    /// Fetches the base feed (if any) and every subject feed concurrently.
    ///
    /// Subject calendars come back in the order of `subject_ids`. Returning
    /// early drops the join set, which aborts the fetches still running.
    async fn fetch_feeds(
        &self,
        base_url: Option<&str>,
        subject_ids: &[String],
        mode: FetchMode,
    ) -> Result<(Option<Calendar>, Vec<Calendar>), AppError> {
        let mut tasks = JoinSet::new();

        if let Some(url) = base_url {
            let source = Arc::clone(&self.source);
            let url = url.to_string();
            tasks.spawn(async move {
                let result = source.course_calendar(&url).await;
                (Feed::Base(url), result)
            });
        }

        for (index, id) in subject_ids.iter().enumerate() {
            let source = Arc::clone(&self.source);
            let feed = Feed::Subject(index, id.clone());
            tasks.spawn(async move {
                let result = source.subject_calendar(feed.label()).await;
                (feed, result)
            });
        }

        let mut base = None;
        let mut subjects: Vec<Option<Calendar>> = subject_ids.iter().map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            let (feed, result) = joined.map_err(|e| {
                AppError::source_unavailable(
                    "Calendar fetch task failed",
                    json!({ "reason": e.to_string() }),
                )
            })?;

            let body = result.map_err(|e| feed_error(&feed, e, mode))?;
            let calendar = parse_feed(&feed, &body)?;

            match feed {
                Feed::Base(_) => base = Some(calendar),
                Feed::Subject(index, _) => subjects[index] = Some(calendar),
            }
        }

        Ok((base, subjects.into_iter().flatten().collect()))
    }
}

fn feed_error(feed: &Feed, error: SourceError, mode: FetchMode) -> AppError {
    match (mode, &error, feed) {
        (FetchMode::Validate, SourceError::NotFound(_), Feed::Base(url)) => {
            ValidationError::InvalidUrl { url: url.clone() }.into()
        }
        (FetchMode::Validate, SourceError::NotFound(_), Feed::Subject(_, id)) => {
            ValidationError::UnknownSubject { subject: id.clone() }.into()
        }
        _ => AppError::source_unavailable(
            "Calendar source unavailable",
            json!({ "feed": feed.label(), "reason": error.to_string() }),
        ),
    }
}

fn parse_feed(feed: &Feed, body: &str) -> Result<Calendar, AppError> {
    Calendar::parse(body).map_err(|e| {
        AppError::source_unavailable(
            "Malformed calendar feed",
            json!({ "feed": feed.label(), "reason": e.to_string() }),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::tests::feed;
    use crate::domain::calendar_source::MockCalendarSource;
    use crate::domain::repositories::{MockCompositeLinkRepository, MockSimpleLinkRepository};
    use crate::infrastructure::persistence::{
        MemoryCompositeLinkRepository, MemorySimpleLinkRepository,
    };
    use crate::domain::calendar_source::SubjectGroup;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const URL: &str = "https://calendar.example/dept/42";

    fn course_feed() -> String {
        feed(&[
            ("CS101", None),
            ("CS102", None),
            ("CS101", None),
            ("MA201", None),
        ])
    }

    fn subject_feed(id: &str) -> Result<String, SourceError> {
        match id {
            "100" => Ok(feed(&[("Ext 100 lecture", None), ("Ext 100 lab", None)])),
            "200" => Ok(feed(&[("Ext 200 lecture", None)])),
            "300" => Ok(feed(&[])),
            other => Err(SourceError::NotFound(other.to_string())),
        }
    }

    fn fake_source() -> MockCalendarSource {
        let mut source = MockCalendarSource::new();
        source
            .expect_course_calendar()
            .returning(|url| match url {
                URL => Ok(course_feed()),
                other => Err(SourceError::NotFound(other.to_string())),
            });
        source
            .expect_subject_calendar()
            .returning(|id| subject_feed(id));
        source
    }

    struct Fixture {
        service: ShortenService,
        simple_links: Arc<MemorySimpleLinkRepository>,
        composite_links: Arc<MemoryCompositeLinkRepository>,
    }

    fn fixture_with_source(source: impl CalendarSource + 'static) -> Fixture {
        let simple_links = Arc::new(MemorySimpleLinkRepository::new());
        let composite_links = Arc::new(MemoryCompositeLinkRepository::new());

        let service = ShortenService::new(
            simple_links.clone(),
            composite_links.clone(),
            Arc::new(source),
            RequestValidator::new(r"^https://calendar\.example/.+").unwrap(),
            ShortCodeGenerator::default(),
            MergeHeader::default(),
        );

        Fixture {
            service,
            simple_links,
            composite_links,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_source(fake_source())
    }

    fn service_with_repos(
        simple: MockSimpleLinkRepository,
        composite: MockCompositeLinkRepository,
        source: MockCalendarSource,
    ) -> ShortenService {
        ShortenService::new(
            Arc::new(simple),
            Arc::new(composite),
            Arc::new(source),
            RequestValidator::new(r"^https://calendar\.example/.+").unwrap(),
            ShortCodeGenerator::default(),
            MergeHeader::default(),
        )
    }

    fn is_rule(err: &AppError, rule: &str) -> bool {
        matches!(err, AppError::Validation(v) if v.rule() == rule)
    }

    #[tokio::test]
    async fn test_shorten_is_idempotent_across_subject_order() {
        let f = fixture();

        let first = f.service.shorten(Some(URL), Some("CS101~CS102")).await.unwrap();
        let again = f.service.shorten(Some(URL), Some("CS101~CS102")).await.unwrap();
        let swapped = f.service.shorten(Some(URL), Some("CS102~CS101")).await.unwrap();

        assert_eq!(first.code, again.code);
        assert_eq!(first.code, swapped.code);
        assert_eq!(f.simple_links.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_shorten_distinct_selections_get_distinct_codes() {
        let f = fixture();

        let a = f.service.shorten(Some(URL), Some("CS101")).await.unwrap();
        let b = f.service.shorten(Some(URL), Some("CS102")).await.unwrap();

        assert_ne!(a.code, b.code);
        assert_eq!(f.simple_links.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_shorten_unknown_subject() {
        let f = fixture();

        let err = f
            .service
            .shorten(Some(URL), Some("CS101~XX999"))
            .await
            .unwrap_err();

        assert!(is_rule(&err, "unknown_subject"));
        assert_eq!(f.simple_links.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_shorten_unknown_calendar_is_invalid_url() {
        let f = fixture();

        let err = f
            .service
            .shorten(Some("https://calendar.example/missing"), Some("CS101"))
            .await
            .unwrap_err();

        assert!(is_rule(&err, "invalid_url"));
    }

    #[tokio::test]
    async fn test_shorten_validation_happens_before_fetch() {
        let mut source = MockCalendarSource::new();
        source.expect_course_calendar().never();
        let f = fixture_with_source(source);

        let err = f
            .service
            .shorten(Some("http://aaa.com"), Some("CS101"))
            .await
            .unwrap_err();

        assert!(is_rule(&err, "invalid_url"));
    }

    #[tokio::test]
    async fn test_shorten_source_outage() {
        let mut source = MockCalendarSource::new();
        source
            .expect_course_calendar()
            .returning(|_| Err(SourceError::Unavailable("timeout".to_string())));
        let f = fixture_with_source(source);

        let err = f.service.shorten(Some(URL), Some("CS101")).await.unwrap_err();

        assert!(matches!(err, AppError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_shorten_draws_new_code_on_collision() {
        let mut simple = MockSimpleLinkRepository::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen_codes = Arc::new(std::sync::Mutex::new(Vec::new()));

        let counter = calls.clone();
        let codes = seen_codes.clone();
        simple
            .expect_get_or_create()
            .times(2)
            .returning(move |new_link| {
                codes.lock().unwrap().push(new_link.code.clone());
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(GetOrCreate::CodeTaken)
                } else {
                    Ok(GetOrCreate::Created(SimpleLink {
                        id: 1,
                        code: new_link.code,
                        url: new_link.url,
                        subjects: new_link.subjects,
                        created_at: Utc::now(),
                    }))
                }
            });

        let service =
            service_with_repos(simple, MockCompositeLinkRepository::new(), fake_source());

        let link = service.shorten(Some(URL), Some("CS101")).await.unwrap();

        let codes = seen_codes.lock().unwrap();
        assert_eq!(codes.len(), 2);
        assert_ne!(codes[0], codes[1]);
        assert_eq!(link.code, codes[1]);
    }

    #[tokio::test]
    async fn test_store_errors_are_not_retried() {
        let mut simple = MockSimpleLinkRepository::new();
        simple
            .expect_get_or_create()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("Database error", json!({}))));

        let service =
            service_with_repos(simple, MockCompositeLinkRepository::new(), fake_source());

        let err = service.shorten(Some(URL), Some("CS101")).await.unwrap_err();

        assert!(matches!(err, AppError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_resolve_returns_filtered_calendar() {
        let f = fixture();
        let link = f.service.shorten(Some(URL), Some("CS101")).await.unwrap();

        let ics = f.service.resolve(&link.code).await.unwrap();

        let calendar = Calendar::parse(&ics).unwrap();
        assert_eq!(calendar.event_count(), 2);
        assert!(calendar.events().all(|e| e.property("SUMMARY") == Some("CS101")));
    }

    #[tokio::test]
    async fn test_resolve_unknown_code() {
        let f = fixture();

        let err = f.service.resolve("unknownCode").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_malformed_code_skips_store() {
        let mut simple = MockSimpleLinkRepository::new();
        simple.expect_find_by_code().never();
        let service =
            service_with_repos(simple, MockCompositeLinkRepository::new(), fake_source());

        let err = service.resolve("../etc/passwd").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_composite_duplicate_creates_nothing() {
        let mut source = MockCalendarSource::new();
        source.expect_subject_calendar().never();
        let mut composite = MockCompositeLinkRepository::new();
        composite.expect_get_or_create().never();
        let service = service_with_repos(MockSimpleLinkRepository::new(), composite, source);

        let err = service
            .shorten_composite(false, Some(""), Some(""), Some("A~A"))
            .await
            .unwrap_err();

        assert!(is_rule(&err, "duplicate_subjects"));
    }

    #[tokio::test]
    async fn test_composite_records_event_count() {
        let f = fixture();

        let link = f
            .service
            .shorten_composite(false, None, None, Some("100~200~300"))
            .await
            .unwrap();

        assert_eq!(link.event_count, Some(3));
        assert!(!link.has_base_calendar);
        assert_eq!(link.base_url, None);
    }

    #[tokio::test]
    async fn test_composite_with_base_counts_filtered_events() {
        let f = fixture();

        let link = f
            .service
            .shorten_composite(true, Some(URL), Some("CS101"), Some("200"))
            .await
            .unwrap();

        assert_eq!(link.event_count, Some(3));
        assert_eq!(link.base_subjects, vec!["CS101"]);
    }

    #[tokio::test]
    async fn test_composite_is_idempotent() {
        let f = fixture();

        let a = f
            .service
            .shorten_composite(true, Some(URL), Some("CS102~CS101"), Some("200~100"))
            .await
            .unwrap();
        let b = f
            .service
            .shorten_composite(true, Some(URL), Some("CS101~CS102"), Some("100~200"))
            .await
            .unwrap();

        assert_eq!(a.code, b.code);
        assert_eq!(f.composite_links.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_composite_base_flag_ignores_base_fields_when_false() {
        let f = fixture();

        let a = f
            .service
            .shorten_composite(false, None, None, Some("100"))
            .await
            .unwrap();
        let b = f
            .service
            .shorten_composite(false, Some(URL), Some("CS101"), Some("100"))
            .await
            .unwrap();

        assert_eq!(a.code, b.code);
    }

    #[tokio::test]
    async fn test_composite_unknown_extra_subject() {
        let f = fixture();

        let err = f
            .service
            .shorten_composite(false, None, None, Some("100~999"))
            .await
            .unwrap_err();

        assert!(is_rule(&err, "unknown_subject"));
        assert_eq!(f.composite_links.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_composite_ill_formed_subject_id() {
        let mut source = MockCalendarSource::new();
        source.expect_subject_calendar().never();
        let f = fixture_with_source(source);

        let err = f
            .service
            .shorten_composite(false, None, None, Some("../../admin"))
            .await
            .unwrap_err();

        assert!(is_rule(&err, "unknown_subject"));
    }

    #[tokio::test]
    async fn test_composite_base_subject_not_offered() {
        let f = fixture();

        let err = f
            .service
            .shorten_composite(true, Some(URL), Some("NOPE"), Some("100"))
            .await
            .unwrap_err();

        assert!(is_rule(&err, "unknown_subject"));
    }

    #[tokio::test]
    async fn test_resolve_composite_merges_every_event() {
        let f = fixture();
        let link = f
            .service
            .shorten_composite(true, Some(URL), Some("CS101~MA201"), Some("100~200"))
            .await
            .unwrap();

        let ics = f.service.resolve_composite(&link.code).await.unwrap();

        let merged = Calendar::parse(&ics).unwrap();
        assert_eq!(merged.event_count(), 3 + 2 + 1);
        assert_eq!(Some(merged.event_count() as i64), link.event_count);
    }

    #[tokio::test]
    async fn test_resolve_composite_source_failure() {
        let f = fixture();
        let link = f
            .service
            .shorten_composite(false, None, None, Some("100"))
            .await
            .unwrap();

        let mut failing = MockCalendarSource::new();
        failing
            .expect_subject_calendar()
            .returning(|id| Err(SourceError::NotFound(id.to_string())));
        let service = ShortenService::new(
            f.simple_links.clone(),
            f.composite_links.clone(),
            Arc::new(failing),
            RequestValidator::new(r"^https://calendar\.example/.+").unwrap(),
            ShortCodeGenerator::default(),
            MergeHeader::default(),
        );

        let err = service.resolve_composite(&link.code).await.unwrap_err();

        assert!(matches!(err, AppError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_resolve_composite_unknown_code() {
        let f = fixture();

        let err = f.service.resolve_composite("unknownCode").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    /// Serves the course feed; subject fetches never complete.
    #[derive(Default)]
    struct StalledSubjects {
        started: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    struct ReleaseOnDrop(Arc<AtomicUsize>);

    impl Drop for ReleaseOnDrop {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CalendarSource for StalledSubjects {
        async fn course_calendar(&self, _url: &str) -> Result<String, SourceError> {
            Ok(course_feed())
        }

        async fn subject_calendar(&self, _subject_id: &str) -> Result<String, SourceError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let _release = ReleaseOnDrop(Arc::clone(&self.released));
            std::future::pending::<Result<String, SourceError>>().await
        }

        async fn calendars(&self) -> Result<Vec<String>, SourceError> {
            Ok(Vec::new())
        }

        async fn subject_groups(&self) -> Result<Vec<SubjectGroup>, SourceError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_dropped_composite_request_aborts_fetches() {
        let source = StalledSubjects::default();
        let started = Arc::clone(&source.started);
        let released = Arc::clone(&source.released);
        let f = fixture_with_source(source);

        let outcome = tokio::time::timeout(
            Duration::from_millis(100),
            f.service
                .shorten_composite(true, Some(URL), Some("CS101"), Some("100~200")),
        )
        .await;
        assert!(outcome.is_err());

        // Aborted tasks are dropped the next time the runtime schedules them.
        for _ in 0..100 {
            if released.load(Ordering::SeqCst) == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(released.load(Ordering::SeqCst), 2);
        assert_eq!(f.composite_links.count().await.unwrap(), 0);
    }

    #[test]
    fn test_short_url() {
        assert_eq!(
            ShortenService::short_url("https://cal.example/", LinkKind::Simple, "abc123XYZ0"),
            "https://cal.example/s/abc123XYZ0"
        );
        assert_eq!(
            ShortenService::short_url("", LinkKind::Composite, "abc123XYZ0"),
            "/cs/abc123XYZ0"
        );
    }
}
