//! HTML scraping for the catalogue pages
//!
//! The remote service serves plain HTML; rows are extracted with
//! regular expressions, one shape per listing kind. A page that yields
//! neither rows nor a recognizable result header is reported as a parse
//! error for the whole operation — malformed individual rows are never
//! silently skipped, they simply do not match and make the page
//! unrecognizable when nothing else does.

use regex::Regex;

use ampmodel::{Author, Group, Track};

use crate::error::{RemoteError, Result};

/// One parsed listing page
#[derive(Debug)]
pub struct ListingPage<T> {
    /// Extracted rows, in page order
    pub rows: Vec<T>,
    /// Total advertised by the page header, if any (first page only)
    pub count_hint: Option<usize>,
    /// Offset of the next page, when a next-page link is present
    pub next_position: Option<u32>,
}

/// Parses a groups listing page
pub fn groups_page(html: &str) -> Result<ListingPage<Group>> {
    let row = Regex::new(
        r#"<a href="newresult\.php\?request=groupid&(?:amp;)?search=(\d+)">([^<]+)</a>"#,
    )?;

    let rows = row
        .captures_iter(html)
        .map(|caps| {
            Ok(Group {
                id: parse_id(&caps[1])?,
                name: decode_entities(&caps[2]),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    finish_listing(html, rows, "groups listing")
}

/// Parses an authors listing page (handle, country and group listings
/// share the same row shape; the country cell is optional)
pub fn authors_page(html: &str) -> Result<ListingPage<Author>> {
    let row = Regex::new(
        r#"(?x)
        <td><a\ href="detail\.php\?view=(\d+)">([^<]+)</a></td>\s*
        <td>([^<]*)</td>
        (?:\s*<td><a\ href="newresult\.php\?request=country&(?:amp;)?search=(\d+)">)?
        "#,
    )?;

    let rows = row
        .captures_iter(html)
        .map(|caps| {
            let real_name = decode_entities(&caps[3]);
            let mut author = Author::new(parse_id(&caps[1])?, decode_entities(&caps[2]));
            if !real_name.is_empty() {
                author.real_name = Some(real_name);
            }
            if let Some(country) = caps.get(4) {
                author.country_id = Some(parse_id(country.as_str())?);
            }
            Ok(author)
        })
        .collect::<Result<Vec<_>>>()?;

    finish_listing(html, rows, "authors listing")
}

/// Parses an author's modules page
///
/// The page does not repeat the author id; the caller supplies it.
pub fn author_tracks_page(html: &str, author_id: u32) -> Result<(Vec<Track>, Option<usize>)> {
    let row = Regex::new(
        r#"<td><a href="downmod\.php\?which=(\d+)">([^<]+)</a></td>(?:\s*<td>(\d+)Kb</td>)?"#,
    )?;

    let rows = row
        .captures_iter(html)
        .map(|caps| {
            let mut track = Track::new(parse_id(&caps[1])?, author_id, decode_entities(&caps[2]));
            if let Some(kb) = caps.get(3) {
                let kb: u64 = kb
                    .as_str()
                    .parse()
                    .map_err(|_| RemoteError::Parse(format!("bad module size: {}", &caps[0])))?;
                track.size_bytes = Some(kb * 1024);
            }
            Ok(track)
        })
        .collect::<Result<Vec<_>>>()?;

    let hint = modules_hint(html)?;
    if rows.is_empty() && hint.is_none() && !html.contains("Modules") {
        return Err(RemoteError::Parse(
            "unrecognizable author modules page".to_string(),
        ));
    }
    Ok((rows, hint))
}

/// Parses a track-search results page: (author, track) pairs
pub fn found_tracks_page(html: &str) -> Result<ListingPage<(Author, Track)>> {
    let row = Regex::new(
        r#"(?x)
        <td><a\ href="downmod\.php\?which=(\d+)">([^<]+)</a></td>\s*
        <td><a\ href="detail\.php\?view=(\d+)">([^<]+)</a></td>
        "#,
    )?;

    let rows = row
        .captures_iter(html)
        .map(|caps| {
            let author = Author::new(parse_id(&caps[3])?, decode_entities(&caps[4]));
            let track = Track::new(parse_id(&caps[1])?, author.id, decode_entities(&caps[2]));
            Ok((author, track))
        })
        .collect::<Result<Vec<_>>>()?;

    finish_listing(html, rows, "track search")
}

/// Validates a listing page and attaches header/pagination data
fn finish_listing<T>(html: &str, rows: Vec<T>, kind: &str) -> Result<ListingPage<T>> {
    let count_hint = count_hint(html)?;
    if rows.is_empty() && count_hint.is_none() {
        return Err(RemoteError::Parse(format!(
            "unrecognizable {kind} page (no rows, no result header)"
        )));
    }
    Ok(ListingPage {
        rows,
        count_hint,
        next_position: next_position(html)?,
    })
}

/// Extracts the `Results: N` header, when present
fn count_hint(html: &str) -> Result<Option<usize>> {
    let re = Regex::new(r"Results:\s*(?:<b>)?\s*(\d+)")?;
    capture_number(&re, html)
}

/// Extracts the `Modules: N` header of an author page, when present
fn modules_hint(html: &str) -> Result<Option<usize>> {
    let re = Regex::new(r"Modules:\s*(?:<b>)?\s*(\d+)")?;
    capture_number(&re, html)
}

fn capture_number(re: &Regex, html: &str) -> Result<Option<usize>> {
    match re.captures(html) {
        Some(caps) => {
            let n = caps[1]
                .parse()
                .map_err(|_| RemoteError::Parse(format!("bad result count: {}", &caps[1])))?;
            Ok(Some(n))
        }
        None => Ok(None),
    }
}

/// Extracts the offset of the next-page link, when present
fn next_position(html: &str) -> Result<Option<u32>> {
    let re = Regex::new(r#"(?i)<a[^>]+href="[^"]*position=(\d+)[^"]*"[^>]*>\s*next\b"#)?;
    match re.captures(html) {
        Some(caps) => Ok(Some(parse_id(&caps[1])?)),
        None => Ok(None),
    }
}

fn parse_id(digits: &str) -> Result<u32> {
    digits
        .parse()
        .map_err(|_| RemoteError::Parse(format!("bad identifier: {digits}")))
}

/// Decodes the few HTML entities the catalogue actually emits
fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}
