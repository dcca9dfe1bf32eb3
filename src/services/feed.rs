// src/services/feed.rs

//! RSS feed parsing.
//!
//! Turns raw feed bytes into source-agnostic items. The collector only
//! needs (title, company, link, description) tuples; everything else in
//! the feed is ignored.

use quick_xml::Reader;
use quick_xml::events::Event;
use scraper::Html;

use crate::error::{AppError, Result};

/// A single feed entry before it becomes a [`Posting`](crate::models::Posting).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub company: String,
    pub link: String,
    pub description: String,
}

/// Fields being accumulated for the current `<item>`.
#[derive(Debug, Default)]
struct ItemBuilder {
    title: String,
    author: String,
    link: String,
    description: String,
}

impl ItemBuilder {
    fn field_mut(&mut self, element: &[u8]) -> Option<&mut String> {
        match element {
            b"title" => Some(&mut self.title),
            // `author` per the RSS spec, `dc:creator` in the wild
            b"author" | b"creator" => Some(&mut self.author),
            b"link" => Some(&mut self.link),
            b"description" => Some(&mut self.description),
            _ => None,
        }
    }

    fn build(self) -> Option<RawItem> {
        let title = collapse_whitespace(&self.title);
        if title.is_empty() {
            return None;
        }
        let company = collapse_whitespace(&self.author);
        Some(RawItem {
            title,
            company: if company.is_empty() {
                "N/A".to_string()
            } else {
                company
            },
            link: self.link.trim().to_string(),
            description: strip_markup(&self.description),
        })
    }
}

/// Parse an RSS document into raw items.
///
/// Items without a title are skipped; a missing `<author>` yields
/// company "N/A". Descriptions are stripped of markup.
pub fn parse_rss(bytes: &[u8]) -> Result<Vec<RawItem>> {
    let mut reader = Reader::from_reader(bytes);
    // Text nodes are kept verbatim; `build` collapses whitespace per
    // field, and text outside a captured field is ignored anyway.

    let mut items = Vec::new();
    let mut current: Option<ItemBuilder> = None;
    // Captured field name plus the depth it was opened at, so child
    // elements inside it (e.g. markup in a description) don't end the
    // capture early.
    let mut field: Option<(Vec<u8>, usize)> = None;
    let mut depth: usize = 0;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                let name = e.local_name();
                if name.as_ref() == b"item" {
                    current = Some(ItemBuilder::default());
                } else if current.is_some() && field.is_none() {
                    field = Some((name.as_ref().to_vec(), depth));
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                if name.as_ref() == b"item" {
                    if let Some(item) = current.take().and_then(ItemBuilder::build) {
                        items.push(item);
                    }
                    field = None;
                } else if field.as_ref().is_some_and(|(_, d)| *d == depth) {
                    field = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) => {
                if let (Some(item), Some((name, _))) = (current.as_mut(), field.as_ref()) {
                    if let Some(slot) = item.field_mut(name) {
                        let text = t
                            .unescape()
                            .map_err(|e| AppError::validation(format!("bad entity: {e}")))?;
                        slot.push_str(&text);
                    }
                }
            }
            Event::CData(t) => {
                if let (Some(item), Some((name, _))) = (current.as_mut(), field.as_ref()) {
                    if let Some(slot) = item.field_mut(name) {
                        slot.push_str(&String::from_utf8_lossy(&t.into_inner()));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(items)
}

/// Reduce an HTML description to plain text with collapsed whitespace.
fn strip_markup(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    collapse_whitespace(&text)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
