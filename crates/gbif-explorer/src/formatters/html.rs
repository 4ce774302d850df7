//! HTML page rendering.
//!
//! Pages are assembled from strings; every interpolated value goes through
//! [`escape_html`].

use axum::http::StatusCode;
use serde::Deserialize;

use crate::filters::{CoordinateFilter, Facets, OccurrenceFilter, Page};
use crate::models::{Search, SearchStatus, StoredOccurrence};

const STYLE: &str = "body{font-family:sans-serif;margin:2em auto;max-width:72em;padding:0 1em}\
table{border-collapse:collapse;width:100%}th,td{border-bottom:1px solid #ddd;padding:.3em;text-align:left}\
.notice{padding:.5em 1em;margin:1em 0}.success{background:#e6f4ea}.error{background:#fce8e6}\
form.filters label{display:inline-block;margin:.2em 1em .2em 0}nav.pages a{margin:0 .3em}";

/// One-shot message carried in a redirect's query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notice {
    #[serde(default, rename = "notice")]
    pub message: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

impl Notice {
    /// Query string for a redirect carrying this message.
    #[must_use]
    pub fn query(message: &str, level: &str) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("notice", message)
            .append_pair("level", level)
            .finish()
    }

    fn render(&self) -> String {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => {
                let level = match self.level.as_deref() {
                    Some("error") => "error",
                    _ => "success",
                };
                format!("<div class=\"notice {level}\">{}</div>\n", escape_html(message))
            }
            _ => String::new(),
        }
    }
}

/// Escape text for HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{} - GBIF Explorer</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <header><a href=\"/\">GBIF Explorer</a></header>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

/// Home page: search form and recent searches.
#[must_use]
pub fn index_page(recent: &[Search], notice: &Notice) -> String {
    let mut body = String::from("<h1>Search GBIF occurrences by person</h1>\n");
    body.push_str(&notice.render());
    body.push_str(
        "<form method=\"post\" action=\"/search\">\n\
         <input type=\"text\" name=\"person_name\" placeholder=\"Recorder name, e.g. Jane Doe\" required>\n\
         <button type=\"submit\">Download records</button>\n</form>\n",
    );

    body.push_str("<h2>Recent searches</h2>\n");
    if recent.is_empty() {
        body.push_str("<p>No searches yet.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Name</th><th>Date</th><th>Status</th><th>Records</th><th></th></tr>\n",
        );
        for search in recent {
            body.push_str(&search_row(search));
        }
        body.push_str("</table>\n");
    }

    layout("Search", &body)
}

fn search_row(search: &Search) -> String {
    let name = escape_html(&search.person_name);
    let name_cell = if search.status == SearchStatus::Completed {
        format!("<a href=\"/results/{}\">{name}</a>", search.id)
    } else {
        name
    };
    let status = match (&search.status, &search.error_message) {
        (SearchStatus::Error, Some(message)) => {
            format!("error: {}", escape_html(message))
        }
        (status, _) => status.to_string(),
    };

    format!(
        "<tr><td>{name_cell}</td><td>{}</td><td>{status}</td><td>{}</td>\
         <td><form method=\"post\" action=\"/delete/{}\"><button type=\"submit\">Delete</button></form></td></tr>\n",
        search.created_at_display(),
        search.result_count,
        search.id,
    )
}

/// Results page for one search.
#[must_use]
pub fn results_page(
    search: &Search,
    page: &Page<StoredOccurrence>,
    facets: &Facets,
    filter: &OccurrenceFilter,
    notice: &Notice,
) -> String {
    let mut body = format!(
        "<h1>Occurrences for &ldquo;{}&rdquo;</h1>\n<p>{} records downloaded, {} matching filters.</p>\n",
        escape_html(&search.person_name),
        search.result_count,
        page.total
    );
    body.push_str(&notice.render());
    body.push_str(&filter_form(search.id, facets, filter));

    let export_query = encode_pairs(&filter.to_query_pairs());
    body.push_str(&format!(
        "<p><a href=\"/export/{}{}\">Export CSV</a></p>\n",
        search.id,
        if export_query.is_empty() { String::new() } else { format!("?{}", escape_html(&export_query)) }
    ));

    if page.items.is_empty() {
        body.push_str("<p>No occurrences match these filters.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Scientific name</th><th>Family</th><th>Recorded by</th>\
             <th>Identified by</th><th>Country</th><th>Date</th><th>Coordinates</th><th>Institution</th></tr>\n",
        );
        for stored in &page.items {
            body.push_str(&occurrence_row(stored));
        }
        body.push_str("</table>\n");
    }

    body.push_str(&pagination_nav(search.id, page, filter));
    layout(&search.person_name, &body)
}

fn occurrence_row(stored: &StoredOccurrence) -> String {
    let r = &stored.record;
    let opt = |v: &Option<String>| escape_html(v.as_deref().unwrap_or(""));
    let name = match &r.gbif_url {
        Some(url) => format!("<a href=\"{}\">{}</a>", escape_html(url), escape_html(r.name_or_default())),
        None => escape_html(r.name_or_default()),
    };
    let coords = match (r.decimal_latitude, r.decimal_longitude) {
        (Some(lat), Some(lon)) => format!("{lat:.4}, {lon:.4}"),
        _ => String::new(),
    };

    format!(
        "<tr><td>{name}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{coords}</td><td>{}</td></tr>\n",
        opt(&r.family),
        opt(&r.recorded_by),
        opt(&r.identified_by),
        opt(&r.country),
        escape_html(&r.display_date()),
        opt(&r.institution_code),
    )
}

fn filter_form(search_id: i64, facets: &Facets, filter: &OccurrenceFilter) -> String {
    let text_input = |label: &str, name: &str, value: &Option<String>| {
        format!(
            "<label>{label} <input type=\"text\" name=\"{name}\" value=\"{}\"></label>\n",
            escape_html(value.as_deref().unwrap_or(""))
        )
    };
    let select = |label: &str, name: &str, options: &[String], current: &Option<String>| {
        let mut html = format!("<label>{label} <select name=\"{name}\">\n<option value=\"\">Any</option>\n");
        for option in options {
            let selected = if current.as_deref() == Some(option.as_str()) { " selected" } else { "" };
            let value = escape_html(option);
            html.push_str(&format!("<option value=\"{value}\"{selected}>{value}</option>\n"));
        }
        html.push_str("</select></label>\n");
        html
    };
    let year_input = |label: &str, name: &str, value: Option<i32>| {
        format!(
            "<label>{label} <input type=\"number\" name=\"{name}\" min=\"{}\" max=\"{}\" value=\"{}\"></label>\n",
            facets.min_year,
            facets.max_year,
            value.map(|y| y.to_string()).unwrap_or_default()
        )
    };

    let mut html = format!("<form class=\"filters\" method=\"get\" action=\"/results/{search_id}\">\n");
    html.push_str(&text_input("Recorded by", "recorded_by", &filter.recorded_by));
    html.push_str(&text_input("Identified by", "identified_by", &filter.identified_by));
    html.push_str(&select("Country", "country", &facets.countries, &filter.country));
    html.push_str(&select("Family", "family", &facets.families, &filter.family));
    html.push_str(&year_input("Year from", "year_min", filter.year_min));
    html.push_str(&year_input("Year to", "year_max", filter.year_max));

    html.push_str("<label>Coordinates <select name=\"has_coordinates\">\n");
    for (value, label) in [
        (CoordinateFilter::Any, "Any"),
        (CoordinateFilter::Yes, "With coordinates"),
        (CoordinateFilter::No, "Without coordinates"),
    ] {
        let selected = if filter.has_coordinates == value { " selected" } else { "" };
        html.push_str(&format!("<option value=\"{}\"{selected}>{label}</option>\n", value.as_str()));
    }
    html.push_str("</select></label>\n");

    html.push_str(&format!(
        "<button type=\"submit\">Filter</button> <a href=\"/results/{search_id}\">Reset</a>\n</form>\n"
    ));
    html
}

fn pagination_nav(search_id: i64, page: &Page<StoredOccurrence>, filter: &OccurrenceFilter) -> String {
    if page.pages() <= 1 {
        return String::new();
    }

    let link = |target: usize, label: &str| {
        let mut pairs = filter.to_query_pairs();
        pairs.push(("page", target.to_string()));
        format!(
            "<a href=\"/results/{search_id}?{}\">{label}</a>",
            escape_html(&encode_pairs(&pairs))
        )
    };

    let mut html = String::from("<nav class=\"pages\">");
    if page.has_prev() {
        html.push_str(&link(page.page - 1, "&laquo; Previous"));
    }
    html.push_str(&format!("<span>Page {} of {}</span>", page.page, page.pages()));
    if page.has_next() {
        html.push_str(&link(page.page + 1, "Next &raquo;"));
    }
    html.push_str("</nav>\n");
    html
}

/// Minimal page for error responses.
#[must_use]
pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"/\">Back to search</a></p>\n",
        status.as_u16(),
        escape_html(message)
    );
    layout(status.canonical_reason().unwrap_or("Error"), &body)
}

fn encode_pairs(pairs: &[(&str, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}
