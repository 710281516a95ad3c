// Formatting utilities for replies that must fit Discord's length limit

/// How many items per section each summarization attempt keeps
const SUMMARY_STEPS: [usize; 5] = [20, 10, 5, 1, 0];

/// A titled list inside a reply (e.g. successes, errors, entries)
#[derive(Debug, Clone)]
pub struct Section {
    pub title: String,
    pub lines: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }
}

/// Count characters the way Discord does (not bytes)
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Truncate string to max characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if char_len(s) <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Marker appended to a section whose tail was cut
pub fn omitted_marker(count: usize) -> String {
    format!("…他 {}件は省略されました", count)
}

/// Render a header plus sections, summarizing deterministically when the
/// full text would exceed `limit` characters.
///
/// The full text is used when it fits. Otherwise each section keeps its
/// first N lines plus an omitted-count marker, trying smaller N until the
/// reply fits; the result is hard-truncated as a last resort.
pub fn render_within_limit(header: &str, sections: &[Section], limit: usize) -> String {
    let full = render(header, sections, None);
    if char_len(&full) <= limit {
        return full;
    }

    for keep in SUMMARY_STEPS {
        let summary = render(header, sections, Some(keep));
        if char_len(&summary) <= limit {
            return summary;
        }
    }

    truncate(&render(header, sections, Some(0)), limit)
}

fn render(header: &str, sections: &[Section], keep: Option<usize>) -> String {
    let mut out = header.trim_end().to_string();

    for section in sections.iter().filter(|s| !s.lines.is_empty()) {
        // Untitled sections continue directly under the header
        if !section.title.is_empty() {
            out.push_str("\n\n");
            out.push_str(&section.title);
        }

        let shown = keep.unwrap_or(section.lines.len()).min(section.lines.len());
        for line in &section.lines[..shown] {
            out.push('\n');
            out.push_str(line);
        }

        let hidden = section.lines.len() - shown;
        if hidden > 0 {
            out.push('\n');
            out.push_str(&omitted_marker(hidden));
        }
    }

    out
}
