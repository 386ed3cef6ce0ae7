//! Chapter assembly: read a chapter page by page until the server marks the end,
//! refuses, or the page cap is hit.

use crate::model::Session;
use crate::scraper::client::Transport;
use crate::scraper::error::PageError;
use crate::scraper::page::fetch_page;
use log::{debug, warn};
use std::time::Duration;

/// Appended to every chapter, whatever way it ended.
pub const CHAPTER_TERMINATOR: &str = "\n\n";

pub const DEFAULT_MAX_PAGES: u32 = 100;
pub const DEFAULT_PAGE_DELAY_MS: u64 = 1000;

/// Waits between page requests. Swapped out in tests.
pub trait Pause {
    fn pause(&mut self, duration: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Page cap and inter-request delay for one chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub max_pages: u32,
    pub delay: Duration,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
        }
    }
}

/// Why a chapter stopped.
#[derive(Debug)]
pub enum ChapterOutcome {
    /// The last page carried the end-of-chapter flag.
    Complete { pages: u32 },
    /// Server answered `status: false` for `page`.
    NoData { page: u32, message: String },
    /// `max_pages` pages were read without an end marker.
    Overrun { max_pages: u32 },
    /// Request or response for `page` was unusable.
    Failed { page: u32, error: PageError },
    /// The caller stopped iterating before the chapter ended.
    Interrupted { next_page: u32 },
}

impl ChapterOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, ChapterOutcome::Complete { .. })
    }
}

/// Lazy, finite sequence of sanitized page texts for one chapter.
///
/// Each `next` issues at most one request. Once it returns `None` it never requests again,
/// and [`ChapterPages::finish`] says why it stopped.
pub struct ChapterPages<'a, T: Transport + ?Sized, P: Pause + ?Sized> {
    transport: &'a mut T,
    session: &'a mut Session,
    pause: &'a mut P,
    chapter_id: &'a str,
    pagination: Pagination,
    page: u32,
    outcome: Option<ChapterOutcome>,
}

impl<'a, T: Transport + ?Sized, P: Pause + ?Sized> ChapterPages<'a, T, P> {
    pub fn new(
        transport: &'a mut T,
        session: &'a mut Session,
        pause: &'a mut P,
        chapter_id: &'a str,
        pagination: Pagination,
    ) -> Self {
        Self {
            transport,
            session,
            pause,
            chapter_id,
            pagination,
            page: 1,
            outcome: None,
        }
    }

    /// How the chapter ended. `Interrupted` if the sequence was not drained.
    pub fn finish(self) -> ChapterOutcome {
        self.outcome.unwrap_or(ChapterOutcome::Interrupted {
            next_page: self.page,
        })
    }
}

impl<T: Transport + ?Sized, P: Pause + ?Sized> Iterator for ChapterPages<'_, T, P> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.outcome.is_some() {
            return None;
        }
        if self.page > self.pagination.max_pages {
            self.outcome = Some(ChapterOutcome::Overrun {
                max_pages: self.pagination.max_pages,
            });
            return None;
        }
        // Page numbers only advance after a non-final page, so this is the gap between two requests.
        if self.page > 1 {
            self.pause.pause(self.pagination.delay);
        }

        let page = self.page;
        match fetch_page(&mut *self.transport, &mut *self.session, self.chapter_id, page) {
            Ok(result) => {
                if result.is_last_page {
                    self.outcome = Some(ChapterOutcome::Complete { pages: page });
                } else {
                    self.page += 1;
                }
                Some(result.text)
            }
            Err(PageError::NoData { message }) => {
                self.outcome = Some(ChapterOutcome::NoData { page, message });
                None
            }
            Err(error) => {
                self.outcome = Some(ChapterOutcome::Failed { page, error });
                None
            }
        }
    }
}

/// Text of one chapter (terminator included) and how it ended.
#[derive(Debug)]
pub struct AssembledChapter {
    pub text: String,
    pub outcome: ChapterOutcome,
}

/// Read every available page of `chapter_id`. Never fails: whatever was read before the
/// chapter stopped is kept, and the reason is logged.
pub fn assemble_chapter<T: Transport + ?Sized, P: Pause + ?Sized>(
    transport: &mut T,
    session: &mut Session,
    pause: &mut P,
    chapter_id: &str,
    pagination: Pagination,
) -> AssembledChapter {
    let mut pages = ChapterPages::new(transport, session, pause, chapter_id, pagination);
    let mut text = String::new();
    for page_text in pages.by_ref() {
        text.push_str(&page_text);
    }
    let outcome = pages.finish();

    match &outcome {
        ChapterOutcome::Complete { pages } => {
            debug!("Chapter {}: {} page(s)", chapter_id, pages)
        }
        ChapterOutcome::NoData { page, message } => warn!(
            "Chapter {}: no data at page {}: {}",
            chapter_id, page, message
        ),
        ChapterOutcome::Overrun { max_pages } => warn!(
            "Chapter {}: no end marker after {} pages, stopping",
            chapter_id, max_pages
        ),
        ChapterOutcome::Failed { page, error } => {
            warn!("Chapter {}: page {} failed: {}", chapter_id, page, error)
        }
        ChapterOutcome::Interrupted { next_page } => {
            warn!("Chapter {}: stopped before page {}", chapter_id, next_page)
        }
    }

    text.push_str(CHAPTER_TERMINATOR);
    AssembledChapter { text, outcome }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scraper::error::TransportError;
    use crate::scraper::page::tests::{no_data_body, page_body, test_session, ScriptedTransport};

    /// Records requested pauses instead of sleeping.
    #[derive(Default)]
    pub(crate) struct CountingPause {
        pub calls: Vec<Duration>,
    }

    impl Pause for CountingPause {
        fn pause(&mut self, duration: Duration) {
            self.calls.push(duration);
        }
    }

    fn pagination(max_pages: u32) -> Pagination {
        Pagination {
            max_pages,
            delay: Duration::from_millis(250),
        }
    }

    #[test]
    fn reads_until_last_page_with_one_pause_between_requests() {
        let mut transport = ScriptedTransport::with_posts([
            page_body("a", false),
            page_body("b", false),
            page_body("c", true),
        ]);
        let mut session = test_session();
        let mut pause = CountingPause::default();
        let chapter = assemble_chapter(&mut transport, &mut session, &mut pause, "5", pagination(10));
        assert_eq!(chapter.text, "abc\n\n");
        assert!(matches!(chapter.outcome, ChapterOutcome::Complete { pages: 3 }));
        assert_eq!(transport.sent.len(), 3);
        assert_eq!(pause.calls, vec![Duration::from_millis(250); 2]);
        let pages: Vec<_> = (0..3).filter_map(|i| transport.field(i, "page")).collect();
        assert_eq!(pages, vec!["1", "2", "3"]);
    }

    #[test]
    fn single_page_chapter_never_pauses() {
        let mut transport = ScriptedTransport::with_posts([page_body("only", true)]);
        let mut session = test_session();
        let mut pause = CountingPause::default();
        let chapter = assemble_chapter(&mut transport, &mut session, &mut pause, "5", pagination(10));
        assert_eq!(chapter.text, "only\n\n");
        assert!(pause.calls.is_empty());
    }

    #[test]
    fn no_data_keeps_text_read_so_far() {
        let mut transport = ScriptedTransport::with_posts([
            page_body("first ", false),
            no_data_body("Chapter is closed"),
            page_body("never", true),
        ]);
        let mut session = test_session();
        let mut pause = CountingPause::default();
        let chapter = assemble_chapter(&mut transport, &mut session, &mut pause, "5", pagination(10));
        assert_eq!(chapter.text, "first \n\n");
        match chapter.outcome {
            ChapterOutcome::NoData { page, message } => {
                assert_eq!(page, 2);
                assert_eq!(message, "Chapter is closed");
            }
            other => panic!("expected NoData, got {:?}", other),
        }
        assert_eq!(transport.sent.len(), 2);
    }

    #[test]
    fn page_cap_stops_chapter_without_extra_request() {
        let mut transport = ScriptedTransport::with_posts((0..5).map(|i| page_body(&i.to_string(), false)));
        let mut session = test_session();
        let mut pause = CountingPause::default();
        let chapter = assemble_chapter(&mut transport, &mut session, &mut pause, "5", pagination(3));
        assert_eq!(chapter.text, "012\n\n");
        assert!(matches!(chapter.outcome, ChapterOutcome::Overrun { max_pages: 3 }));
        assert_eq!(transport.sent.len(), 3);
        assert_eq!(pause.calls.len(), 2);
    }

    #[test]
    fn transport_failure_ends_chapter_like_no_data() {
        let mut transport = ScriptedTransport::default();
        transport.posts.push_back(Ok(page_body("kept", false)));
        transport.posts.push_back(Err(TransportError::HttpStatus {
            status: 403,
            url: "u".to_string(),
        }));
        let mut session = test_session();
        let mut pause = CountingPause::default();
        let chapter = assemble_chapter(&mut transport, &mut session, &mut pause, "5", pagination(10));
        assert_eq!(chapter.text, "kept\n\n");
        assert!(matches!(
            chapter.outcome,
            ChapterOutcome::Failed {
                page: 2,
                error: PageError::Transport(_)
            }
        ));
    }

    #[test]
    fn exhausted_sequence_stays_exhausted() {
        let mut transport = ScriptedTransport::with_posts([page_body("x", true), page_body("y", true)]);
        let mut session = test_session();
        let mut pause = CountingPause::default();
        let mut pages = ChapterPages::new(&mut transport, &mut session, &mut pause, "1", pagination(10));
        assert_eq!(pages.next().as_deref(), Some("x"));
        assert_eq!(pages.next(), None);
        assert_eq!(pages.next(), None);
        assert!(pages.finish().is_complete());
        assert_eq!(transport.sent.len(), 1);
    }

    #[test]
    fn dropping_sequence_early_reports_interrupted() {
        let mut transport = ScriptedTransport::with_posts([page_body("x", false)]);
        let mut session = test_session();
        let mut pause = CountingPause::default();
        let mut pages = ChapterPages::new(&mut transport, &mut session, &mut pause, "1", pagination(10));
        assert!(pages.next().is_some());
        assert!(matches!(
            pages.finish(),
            ChapterOutcome::Interrupted { next_page: 2 }
        ));
    }
}
