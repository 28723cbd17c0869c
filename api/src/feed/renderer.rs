//! Feed renderer
//!
//! Renders a feed snapshot as RSS 2.0, Atom 1.0 or JSON Feed 1.1.
//! Items keep their insertion order in every format.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::domain::entities::{Feed, FeedItem};

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";
pub const ATOM_CONTENT_TYPE: &str = "application/atom+xml; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/feed+json; charset=utf-8";

const DUBLIN_CORE_NS: &str = "http://purl.org/dc/elements/1.1/";
const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1.1";

/// Render a feed to RSS 2.0
pub fn render_rss(feed: &Feed) -> String {
    let mut buf = String::new();

    buf.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    buf.push_str(&format!(
        "<rss version=\"2.0\" xmlns:dc=\"{}\">\n",
        DUBLIN_CORE_NS
    ));
    buf.push_str("  <channel>\n");
    push_element(&mut buf, 4, "title", &feed.title);
    push_element(&mut buf, 4, "link", &feed.link);
    push_element(&mut buf, 4, "description", &feed.description);
    // RSS author fields must be email addresses; logins go in dc:creator
    push_element(&mut buf, 4, "dc:creator", &feed.author);
    push_element(&mut buf, 4, "pubDate", &feed.created.to_rfc2822());
    push_element(&mut buf, 4, "lastBuildDate", &feed.updated().to_rfc2822());

    for item in &feed.items {
        buf.push_str("    <item>\n");
        push_element(&mut buf, 6, "title", &item.title);
        push_element(&mut buf, 6, "link", &item.link);
        push_element(&mut buf, 6, "description", &item.description);
        push_element(&mut buf, 6, "dc:creator", &item.author);
        push_element(&mut buf, 6, "guid", &item.link);
        push_element(&mut buf, 6, "pubDate", &item.created.to_rfc2822());
        buf.push_str("    </item>\n");
    }

    buf.push_str("  </channel>\n");
    buf.push_str("</rss>\n");
    buf
}

/// Render a feed to Atom 1.0
pub fn render_atom(feed: &Feed) -> String {
    let mut buf = String::new();

    buf.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    buf.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
    push_element(&mut buf, 2, "title", &feed.title);
    push_element(&mut buf, 2, "id", &feed.link);
    push_link(&mut buf, 2, &feed.link);
    push_element(&mut buf, 2, "subtitle", &feed.description);
    push_author(&mut buf, 2, &feed.author);
    push_element(&mut buf, 2, "updated", &atom_time(feed.updated()));

    for item in &feed.items {
        buf.push_str("  <entry>\n");
        push_element(&mut buf, 4, "title", &item.title);
        push_element(&mut buf, 4, "id", &item.link);
        push_link(&mut buf, 4, &item.link);
        push_element(&mut buf, 4, "updated", &atom_time(item.created));
        push_author(&mut buf, 4, &item.author);
        push_element(&mut buf, 4, "summary", &item.description);
        buf.push_str("  </entry>\n");
    }

    buf.push_str("</feed>\n");
    buf
}

#[derive(Serialize)]
struct JsonFeed<'a> {
    version: &'static str,
    title: &'a str,
    home_page_url: &'a str,
    description: &'a str,
    authors: Vec<JsonAuthor<'a>>,
    items: Vec<JsonItem<'a>>,
}

#[derive(Serialize)]
struct JsonAuthor<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct JsonItem<'a> {
    id: &'a str,
    url: &'a str,
    title: &'a str,
    content_text: &'a str,
    date_published: String,
    authors: Vec<JsonAuthor<'a>>,
}

impl<'a> From<&'a FeedItem> for JsonItem<'a> {
    fn from(item: &'a FeedItem) -> Self {
        Self {
            id: &item.link,
            url: &item.link,
            title: &item.title,
            content_text: &item.description,
            date_published: atom_time(item.created),
            authors: vec![JsonAuthor { name: &item.author }],
        }
    }
}

/// Render a feed to JSON Feed 1.1
pub fn render_json(feed: &Feed) -> Result<String, serde_json::Error> {
    let doc = JsonFeed {
        version: JSON_FEED_VERSION,
        title: &feed.title,
        home_page_url: &feed.link,
        description: &feed.description,
        authors: vec![JsonAuthor { name: &feed.author }],
        items: feed.items.iter().map(JsonItem::from).collect(),
    };
    serde_json::to_string_pretty(&doc)
}

fn push_element(buf: &mut String, indent: usize, name: &str, text: &str) {
    buf.push_str(&" ".repeat(indent));
    buf.push_str(&format!("<{}>{}</{}>\n", name, xml_escape(text), name));
}

fn push_link(buf: &mut String, indent: usize, href: &str) {
    buf.push_str(&" ".repeat(indent));
    buf.push_str(&format!("<link href=\"{}\"/>\n", xml_escape(href)));
}

fn push_author(buf: &mut String, indent: usize, name: &str) {
    let pad = " ".repeat(indent);
    buf.push_str(&format!("{}<author>\n", pad));
    push_element(buf, indent + 2, "name", name);
    buf.push_str(&format!("{}</author>\n", pad));
}

fn atom_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Not representable in XML 1.0
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}
