use crate::record::ItemRecord;

/// Renders a batch as a standalone page with one `<dt>` per story.
pub fn render_report(batch: &[ItemRecord]) -> String {
    let mut items = String::with_capacity(batch.len() * 128);
    for record in batch {
        items.push_str(&format!(
            "    <dt><label>{} </label><a href=\"{}\">{}</a></dt>\n",
            record.rank,
            escape(&record.link),
            escape(&record.title),
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>Hacker News</title>\n</head>\n<body>\n  <dl class=\"itemlist\">\n{items}  </dl>\n</body>\n</html>\n"
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_record_in_order() {
        let batch = vec![
            ItemRecord {
                rank: 1,
                title: "First".into(),
                link: "https://a.example".into(),
                ..Default::default()
            },
            ItemRecord {
                rank: 2,
                title: "Tom & \"Jerry\" <3".into(),
                link: "https://b.example/?q=1&r=2".into(),
                ..Default::default()
            },
        ];

        let html = render_report(&batch);
        let first = html.find("<label>1 </label><a href=\"https://a.example\">First</a>").unwrap();
        let second = html
            .find("<label>2 </label><a href=\"https://b.example/?q=1&amp;r=2\">Tom &amp; &quot;Jerry&quot; &lt;3</a>")
            .unwrap();
        assert!(first < second);
    }

    #[test]
    fn empty_batch_still_renders_list() {
        let html = render_report(&[]);
        assert!(html.contains("<dl class=\"itemlist\">"));
        assert!(!html.contains("<dt>"));
    }
}
