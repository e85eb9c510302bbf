use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tokio::task::spawn_blocking;

use crate::record::{ItemRecord, RecordBatch};
use crate::{Error, Result};

/// Class carried by every story row.
const ITEM_MARKER: &str = "athing";

/// Parses a listing page on the blocking pool.
pub(crate) async fn parse_html(html: String, base: Url) -> Result<RecordBatch> {
    let batch = spawn_blocking(move || parse_page(&html, &base)).await??;
    Ok(batch)
}

/// Extracts the story rows of one listing page, in document order.
///
/// Parsing is lenient: a field that is missing or malformed is left empty and
/// the row is still kept. A page without story rows yields an empty batch.
/// Relative links (`item?id=...` for Ask HN and friends) are resolved against `base`.
pub fn parse_page(html: &str, base: &Url) -> Result<RecordBatch> {
    let doc = Html::parse_document(html);

    // Create selectors.
    let row_selector = create_selector("tr")?;
    let rank_selector = create_selector("span.rank")?;
    let title_selector = create_selector("span.titleline > a, a.storylink")?;
    let score_selector = create_selector("span.score")?;
    let link_selector = create_selector("a")?;

    // There shouldn't be more than 30 entries per page.
    let mut batch = Vec::with_capacity(crate::NEWS_PER_PAGE);
    for row in doc.select(&row_selector) {
        if !row.value().classes().any(|class| class == ITEM_MARKER) {
            continue;
        }

        let rank = row
            .select(&rank_selector)
            .next()
            .map(element_text)
            .and_then(|label| label.trim_end_matches('.').parse().ok())
            .unwrap_or(0);

        let anchor = row.select(&title_selector).next();
        let title = anchor.map(element_text).unwrap_or_default();
        let link = anchor
            .and_then(|a| a.value().attr("href"))
            .map(|href| resolve_link(base, href))
            .unwrap_or_default();

        let id = row.value().attr("id").and_then(|id| id.parse().ok());

        let (score, comment_count) = match metadata_row(row) {
            Some(meta) => {
                let score = meta
                    .select(&score_selector)
                    .next()
                    .map(element_text)
                    .unwrap_or_default();
                let comments = meta
                    .select(&link_selector)
                    .map(element_text)
                    .find(|text| text.contains("comment"));
                (score, comments)
            }
            None => (String::new(), None),
        };

        batch.push(ItemRecord {
            rank,
            title,
            link,
            score,
            comment_count,
            id,
        });
    }
    Ok(batch)
}

/// The row right after a story row holds its score and comment links.
fn metadata_row(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.next_siblings()
        .find_map(ElementRef::wrap)
        .filter(|next| !next.value().classes().any(|class| class == ITEM_MARKER))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Absolute hrefs are kept as written, relative ones are joined onto `base`.
fn resolve_link(base: &Url, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    base.join(href)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}
