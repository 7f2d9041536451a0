//! Turns a session timeline into scrollable text pages.
//!
//! Layout, top to bottom: older history pages, the home page (last few played
//! tracks, now playing, next few tracks), then pages of the remaining queue.
//! The result is a pure function of the session and the elapsed position, so
//! the periodic refresh and event-driven refresh always agree.

use std::fmt::Write;
use std::time::Duration;

use super::format_duration;
use super::session::{PlayerSession, SessionState};
use super::track::Track;

/// History and queue entries shown around the now-playing line on the home page.
pub const PEEK_SIZE: usize = 5;
/// Entries per hidden history or queue page.
pub const PAGE_SIZE: usize = 10;
/// Display width of a title column, in characters.
pub const TITLE_WIDTH: usize = 32;

const EMPTY_QUEUE: &str = "The queue is empty.";

/// Rendered pages plus where the home page sits among them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub pages: Vec<String>,
    pub home_page_index: usize,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// A track with its position label relative to now playing (-1 is the last
/// played track, 1 is the next one).
struct Entry<'a> {
    label: isize,
    track: &'a Track,
}

/// The tracks making up one page, before rendering.
enum PageBody<'a> {
    History(Vec<Entry<'a>>),
    Home {
        history: Vec<Entry<'a>>,
        queue: Vec<Entry<'a>>,
    },
    Queue(Vec<Entry<'a>>),
}

/// Number of pages for the given timeline sizes.
pub fn page_count(history_len: usize, queue_len: usize) -> usize {
    let hidden_history = history_len.saturating_sub(PEEK_SIZE);
    let hidden_queue = queue_len.saturating_sub(PEEK_SIZE);
    hidden_history.div_ceil(PAGE_SIZE) + 1 + hidden_queue.div_ceil(PAGE_SIZE)
}

/// Paginate the session's timeline. `elapsed` is how far into the current track playback is.
pub fn paginate(session: &PlayerSession, elapsed: Option<Duration>) -> Pagination {
    let history = session.history().as_slice();
    let queue: Vec<&Track> = session.queue().iter().collect();

    if history.is_empty() && queue.is_empty() && session.current_track().is_none() {
        return Pagination {
            pages: vec![render_empty()],
            home_page_index: 0,
        };
    }

    let history_label = |index: usize| -((history.len() - index) as isize);
    let split = history.len().saturating_sub(PEEK_SIZE);
    let peek_queue = queue.len().min(PEEK_SIZE);

    let mut bodies = Vec::new();

    // Chunk hidden history from the newest end so the page next to home is full
    // and the oldest page holds the remainder.
    let mut history_pages = Vec::new();
    let mut end = split;
    while end > 0 {
        let start = end.saturating_sub(PAGE_SIZE);
        history_pages.push(PageBody::History(
            (start..end)
                .map(|i| Entry {
                    label: history_label(i),
                    track: &history[i],
                })
                .collect(),
        ));
        end = start;
    }
    history_pages.reverse();
    let home_page_index = history_pages.len();
    bodies.extend(history_pages);

    bodies.push(PageBody::Home {
        history: (split..history.len())
            .map(|i| Entry {
                label: history_label(i),
                track: &history[i],
            })
            .collect(),
        queue: (0..peek_queue)
            .map(|i| Entry {
                label: i as isize + 1,
                track: queue[i],
            })
            .collect(),
    });

    let mut start = peek_queue;
    while start < queue.len() {
        let end = (start + PAGE_SIZE).min(queue.len());
        bodies.push(PageBody::Queue(
            (start..end)
                .map(|i| Entry {
                    label: i as isize + 1,
                    track: queue[i],
                })
                .collect(),
        ));
        start = end;
    }

    let now_playing = now_playing_line(session, elapsed);
    let total = bodies.len();
    let pages = bodies
        .iter()
        .enumerate()
        .map(|(index, body)| render_page(body, &now_playing, index, total))
        .collect();

    Pagination {
        pages,
        home_page_index,
    }
}

/// Truncate (with an ellipsis) or pad `title` to exactly `width` characters.
/// Backticks become apostrophes so a title cannot close the page's code block.
pub fn fit_title(title: &str, width: usize) -> String {
    let title = title.replace('`', "'");
    let length = title.chars().count();
    if length > width {
        let mut fitted: String = title.chars().take(width.saturating_sub(1)).collect();
        fitted.push('…');
        fitted
    } else {
        format!("{:<width$}", title, width = width)
    }
}

fn now_playing_line(session: &PlayerSession, elapsed: Option<Duration>) -> String {
    match session.current_track() {
        Some(track) => {
            let marker = match session.state() {
                SessionState::Stopped => "⏸",
                _ => "▶",
            };
            let elapsed = elapsed.unwrap_or_default().min(track.duration);
            format!(
                "{} {} {} / {}",
                marker,
                fit_title(&track.title, TITLE_WIDTH),
                format_duration(elapsed),
                format_duration(track.duration)
            )
        }
        None => "■ Nothing is playing.".to_string(),
    }
}

fn render_entries(out: &mut String, entries: &[Entry<'_>]) {
    for entry in entries {
        let _ = writeln!(
            out,
            "{:>4}  {}  {}",
            entry.label,
            fit_title(&entry.track.title, TITLE_WIDTH),
            format_duration(entry.track.duration)
        );
    }
}

fn render_page(body: &PageBody<'_>, now_playing: &str, index: usize, total: usize) -> String {
    let mut out = String::from("```\n");

    if index > 0 {
        out.push_str("↑ older\n");
    }

    match body {
        PageBody::History(entries) => {
            render_entries(&mut out, entries);
            out.push('\n');
            out.push_str(now_playing);
            out.push('\n');
        }
        PageBody::Home { history, queue } => {
            render_entries(&mut out, history);
            out.push_str(now_playing);
            out.push('\n');
            if queue.is_empty() {
                out.push_str("      Nothing queued.\n");
            }
            render_entries(&mut out, queue);
        }
        PageBody::Queue(entries) => {
            out.push_str(now_playing);
            out.push_str("\n\n");
            render_entries(&mut out, entries);
        }
    }

    if index + 1 < total {
        out.push_str("↓ newer\n");
    }

    let _ = write!(out, "\nPage {} / {}\n```", index + 1, total);
    out
}

fn render_empty() -> String {
    format!("```\n{}\n\nPage 1 / 1\n```", EMPTY_QUEUE)
}
