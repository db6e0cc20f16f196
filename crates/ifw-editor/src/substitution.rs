//! Dictation phrase substitution.
//!
//! Phrases match whole words only (bounded by whitespace or the ends of the
//! text) and ignore case. Each phrase makes a single pass over the text, so a
//! replacement is never rescanned by its own phrase, while later (shorter)
//! phrases do see earlier rewrites.

use regex::{Regex, RegexBuilder};

use ifw_core::config::SubstitutionTable;
use ifw_core::error::{IfwError, Result};

#[derive(Debug, Clone)]
struct Rule {
    replacement: String,
    matcher: Regex,
}

/// A compiled substitution table.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionEngine {
    rules: Vec<Rule>,
}

impl SubstitutionEngine {
    /// Compile the table, longest phrase first with ties in declaration order.
    pub fn new(table: &SubstitutionTable) -> Result<Self> {
        let mut rules = Vec::with_capacity(table.len());
        for (phrase, replacement) in table.by_priority() {
            let matcher = RegexBuilder::new(&regex::escape(phrase))
                .case_insensitive(true)
                .build()
                .map_err(|e| IfwError::Config(format!("substitution '{}': {}", phrase, e)))?;
            rules.push(Rule {
                replacement: replacement.to_string(),
                matcher,
            });
        }
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrite `buffer` and reposition `cursor` (a char index).
    ///
    /// A cursor after a replaced phrase shifts by the length change, a cursor
    /// inside one lands after its replacement. The result is clamped to the
    /// new text.
    pub fn apply(&self, buffer: &str, cursor: usize) -> (String, usize) {
        let mut text = buffer.to_string();
        let mut cursor = cursor.min(text.chars().count());
        for rule in &self.rules {
            if let Some((rewritten, moved)) = rule.replace_words(&text, cursor) {
                text = rewritten;
                cursor = moved;
            }
        }
        (text, cursor)
    }
}

impl Rule {
    /// One pass of this rule. Returns `None` when nothing matched.
    fn replace_words(&self, text: &str, cursor: usize) -> Option<(String, usize)> {
        let replacement_len = self.replacement.chars().count() as isize;
        let mut out = String::with_capacity(text.len());
        let mut copied = 0usize;
        let mut search = 0usize;
        // Char index of byte offset `counted`, advanced incrementally.
        let mut counted = 0usize;
        let mut chars_before = 0usize;
        let mut delta: isize = 0;
        let mut landed: Option<isize> = None;
        let mut matched = false;

        while search <= text.len() {
            let Some(m) = self.matcher.find_at(text, search) else {
                break;
            };
            let (start, end) = (m.start(), m.end());
            if start == end {
                break;
            }
            if !(is_word_start(text, start) && is_word_end(text, end)) {
                search = start + text[start..].chars().next().map_or(1, char::len_utf8);
                continue;
            }

            chars_before += text[counted..start].chars().count();
            counted = start;
            let phrase_start = chars_before;
            let phrase_end = phrase_start + text[start..end].chars().count();

            if landed.is_none() {
                if cursor >= phrase_end {
                    delta += replacement_len - (phrase_end - phrase_start) as isize;
                } else if cursor > phrase_start {
                    landed = Some(phrase_start as isize + delta + replacement_len);
                }
            }

            out.push_str(&text[copied..start]);
            out.push_str(&self.replacement);
            copied = end;
            search = end;
            matched = true;
        }

        if !matched {
            return None;
        }
        out.push_str(&text[copied..]);

        let new_len = out.chars().count() as isize;
        let moved = landed
            .unwrap_or(cursor as isize + delta)
            .clamp(0, new_len) as usize;
        Some((out, moved))
    }
}

fn is_word_start(text: &str, at: usize) -> bool {
    text[..at].chars().next_back().map_or(true, char::is_whitespace)
}

fn is_word_end(text: &str, at: usize) -> bool {
    text[at..].chars().next().map_or(true, char::is_whitespace)
}
