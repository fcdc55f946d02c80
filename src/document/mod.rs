//! Markdown document rendering.
//!
//! This module handles:
//! - Parsing markdown with comrak and laying it out as preview rows
//! - Extracting headings with unique anchor ids for the TOC
//! - Laying out the raw source pane ([`source`])

mod parser;
pub mod source;
mod types;

pub use parser::{RenderOptions, parse};
pub use source::{SourceLayout, SourceRow};
pub use types::{Document, HeadingRef, InlineSpan, InlineStyle, LineType, RenderedLine};

/// Render options matching the table preferences in `settings`.
pub fn render_options(settings: &crate::config::Settings, width: u16) -> RenderOptions {
    RenderOptions {
        width,
        table_zebra_stripes: settings.table_zebra_stripes,
        table_alignment_indicators: settings.table_alignment_indicators,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_render_options_follow_settings() {
        let settings = Settings {
            table_zebra_stripes: true,
            table_alignment_indicators: false,
            ..Settings::default()
        };
        let options = render_options(&settings, 42);
        assert_eq!(options.width, 42);
        assert!(options.table_zebra_stripes);
        assert!(!options.table_alignment_indicators);
    }

    #[test]
    fn test_toc_headings_carry_ids_and_slugs() {
        let doc = Document::parse("# Intro\n\n## Intro").unwrap();
        let headings = doc.toc_headings();
        assert_eq!(headings[1].id, "intro-1");
        assert_eq!(headings[1].slug, "intro");
    }
}
