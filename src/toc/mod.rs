//! Table of contents state: headings, the active heading, and tracking.
//!
//! - [`observer`]: derives the active heading from preview geometry
//! - [`navigator`]: scrolls the preview to a chosen heading

pub mod navigator;
pub mod observer;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

pub use navigator::{NavigationOutcome, NavigatorConfig, TocNavigator};
pub use observer::{HeadingElement, HeadingObserver, ObserverConfig, PreviewLayout};

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid slug pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid pattern"));
static REPEATED_DASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").expect("valid pattern"));

const SLUG_MAX_LEN: usize = 100;
const SLUG_FALLBACK: &str = "heading";
/// Glyph some renderers prepend to headings as a permalink marker.
const ANCHOR_GLYPH: char = '🔗';

/// A document heading as listed in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Unique id, stable across re-renders
    pub id: String,
    pub text: String,
    /// Heading level (1-6)
    pub level: u8,
    pub slug: String,
}

impl Heading {
    pub fn new(id: impl Into<String>, text: impl Into<String>, level: u8) -> Self {
        let id = id.into();
        Self {
            slug: id.clone(),
            id,
            text: text.into(),
            level,
        }
    }
}

/// Turn heading text into a URL-safe id.
///
/// # Example
///
/// ```
/// use marksync::toc::slugify;
///
/// assert_eq!(slugify("Getting Started!"), "getting-started");
/// assert_eq!(slugify("  "), "heading");
/// ```
pub fn slugify(text: &str) -> String {
    let lowered = normalize_heading_text(text).to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    let dashed = WHITESPACE.replace_all(stripped.trim(), "-");
    let mut slug = REPEATED_DASH
        .replace_all(&dashed, "-")
        .trim_matches('-')
        .to_string();

    if slug.chars().count() > SLUG_MAX_LEN {
        slug = slug.chars().take(SLUG_MAX_LEN).collect();
        // Avoid ending mid-word when a separator is reasonably close.
        if let Some(cut) = slug.rfind('-')
            && cut * 10 > SLUG_MAX_LEN * 7
        {
            slug.truncate(cut);
        }
    }

    if slug.is_empty() {
        SLUG_FALLBACK.to_string()
    } else {
        slug
    }
}

/// Normalize heading text for comparison: drop a leading anchor glyph,
/// trim, and collapse internal whitespace.
pub fn normalize_heading_text(text: &str) -> String {
    let text = text.trim().trim_start_matches(ANCHOR_GLYPH);
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Validated, duplicate-free heading list.
///
/// Every [`replace`](Self::replace) bumps the revision, even when the content
/// is identical, so observers know to re-bind.
#[derive(Debug, Clone, Default)]
pub struct HeadingList {
    headings: Vec<Heading>,
    revision: u64,
}

impl HeadingList {
    pub fn new(headings: Vec<Heading>) -> Self {
        let mut list = Self::default();
        list.replace(headings);
        list
    }

    /// Replace the list. Invalid headings and duplicate ids are dropped,
    /// keeping the first occurrence.
    pub fn replace(&mut self, incoming: Vec<Heading>) {
        let mut seen = HashSet::new();
        let mut headings = Vec::with_capacity(incoming.len());
        for heading in incoming {
            let id = heading.id.trim().to_string();
            let text = heading.text.trim().to_string();
            if id.is_empty() || text.is_empty() || !(1..=6).contains(&heading.level) {
                tracing::warn!(id = %heading.id, level = heading.level, "invalid heading dropped");
                continue;
            }
            if !seen.insert(id.clone()) {
                tracing::warn!(id = %id, "duplicate heading id, keeping first occurrence");
                continue;
            }
            let slug = if heading.slug.trim().is_empty() {
                id.clone()
            } else {
                heading.slug.trim().to_string()
            };
            headings.push(Heading {
                id,
                text,
                level: heading.level,
                slug,
            });
        }
        self.headings = headings;
        self.revision += 1;
        tracing::debug!(count = self.headings.len(), revision = self.revision, "headings updated");
    }

    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn as_slice(&self) -> &[Heading] {
        &self.headings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Heading> {
        self.headings.iter()
    }

    pub fn len(&self) -> usize {
        self.headings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    pub fn first(&self) -> Option<&Heading> {
        self.headings.first()
    }

    pub fn get(&self, id: &str) -> Option<&Heading> {
        self.headings.iter().find(|h| h.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.headings.iter().position(|h| h.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

/// The heading the reader is currently looking at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveHeading {
    id: Option<String>,
}

impl ActiveHeading {
    pub fn get(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Set the active id, returning whether it changed.
    pub fn set(&mut self, id: Option<String>) -> bool {
        if self.id == id {
            return false;
        }
        tracing::trace!(from = ?self.id, to = ?id, "active heading changed");
        self.id = id;
        true
    }

    pub fn clear(&mut self) -> bool {
        self.set(None)
    }
}

/// Headings plus the active one, as shown by the TOC sidebar.
#[derive(Debug, Clone, Default)]
pub struct TocState {
    headings: HeadingList,
    active: ActiveHeading,
}

impl TocState {
    pub fn headings(&self) -> &HeadingList {
        &self.headings
    }

    pub fn active(&self) -> Option<&str> {
        self.active.get()
    }

    pub const fn active_mut(&mut self) -> &mut ActiveHeading {
        &mut self.active
    }

    pub fn set_active(&mut self, id: Option<String>) -> bool {
        self.active.set(id)
    }

    /// Replace the headings, clearing the active one if it disappeared.
    pub fn set_headings(&mut self, headings: Vec<Heading>) {
        self.headings.replace(headings);
        if let Some(active) = self.active.get()
            && !self.headings.contains(active)
        {
            self.active.clear();
        }
    }

    /// Split borrow for components that read headings and write the active id.
    pub const fn parts_mut(&mut self) -> (&HeadingList, &mut ActiveHeading) {
        (&self.headings, &mut self.active)
    }
}
