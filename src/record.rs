use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::config::DuplicateKey;

/// One story row scraped from the listing.
///
/// Fields that could not be extracted are left empty (or `None`) instead of
/// failing the whole row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// 1-based position. Provisional (as printed on the page) until the batch is merged.
    pub rank: u32,
    pub title: String,
    pub link: String,
    /// Raw score text, e.g. `"123 points"`.
    #[serde(default)]
    pub score: String,
    #[serde(default)]
    pub comment_count: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
}

impl ItemRecord {
    /// Value of the field records are deduplicated by.
    pub fn key(&self, field: DuplicateKey) -> Cow<'_, str> {
        match field {
            DuplicateKey::Link => Cow::Borrowed(&self.link),
            DuplicateKey::Title => Cow::Borrowed(&self.title),
            DuplicateKey::Id => match self.id {
                Some(id) => Cow::Owned(id.to_string()),
                None => Cow::Borrowed(""),
            },
        }
    }

    /// Leading number of the score text, `"57 points"` -> `57`.
    pub fn points(&self) -> Option<u32> {
        leading_number(&self.score)
    }

    pub fn comments(&self) -> Option<u32> {
        self.comment_count.as_deref().and_then(leading_number)
    }
}

fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

pub type RecordBatch = Vec<ItemRecord>;

/// Rewrites ranks to the contiguous sequence `1..=len`, keeping the order.
pub fn renumber(batch: &mut [ItemRecord]) {
    for (rank, record) in (1u32..).zip(batch.iter_mut()) {
        record.rank = rank;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_read_the_leading_number() {
        let record = ItemRecord {
            score: "142 points".into(),
            comment_count: Some("7\u{a0}comments".into()),
            ..Default::default()
        };
        assert_eq!(record.points(), Some(142));
        assert_eq!(record.comments(), Some(7));

        let empty = ItemRecord::default();
        assert_eq!(empty.points(), None);
        assert_eq!(empty.comments(), None);
    }

    #[test]
    fn key_follows_the_selected_field() {
        let record = ItemRecord {
            title: "Show HN".into(),
            link: "https://example.com".into(),
            id: Some(42),
            ..Default::default()
        };
        assert_eq!(record.key(DuplicateKey::Link), "https://example.com");
        assert_eq!(record.key(DuplicateKey::Title), "Show HN");
        assert_eq!(record.key(DuplicateKey::Id), "42");
    }

    #[test]
    fn renumber_fills_gaps() {
        let mut batch = vec![
            ItemRecord { rank: 31, ..Default::default() },
            ItemRecord { rank: 3, ..Default::default() },
            ItemRecord { rank: 0, ..Default::default() },
        ];
        renumber(&mut batch);
        let ranks: Vec<u32> = batch.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
}
