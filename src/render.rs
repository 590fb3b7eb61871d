use std::fmt;

use crate::filter::FilterState;
use crate::record::{CATEGORIES, COLUMN_NAMES, Record, STATUSES, TYPES, format_date};

pub const EMPTY_STATE_TEXT: &str = "No records match your filters.";

/// Filtered count against the fixed dataset size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    pub filtered: usize,
    pub total: usize,
}

impl Counter {
    pub fn new(filtered: usize, total: usize) -> Self {
        Self { filtered, total }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Showing {} of {} records", self.filtered, self.total)
    }
}

/// Escape text so it can only ever be read back as text, in element
/// content as well as in quoted attribute values.
pub fn escape_html(text: &str) -> String {
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

pub fn status_class(status: &str) -> String {
    format!("status-badge status-{}", escape_html(&status.to_lowercase()))
}

pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn render_row(record: &Record) -> String {
        format!(
            r#"<tr>
  <td>{name}</td>
  <td>{email}</td>
  <td><span class="category-badge">{category}</span></td>
  <td>{kind}</td>
  <td><span class="{status_class}">{status}</span></td>
  <td>{date}</td>
</tr>
"#,
            name = escape_html(&record.name),
            email = escape_html(&record.email),
            category = escape_html(&record.category),
            kind = escape_html(&record.kind),
            status_class = status_class(&record.status),
            status = escape_html(&record.status),
            date = escape_html(&format_date(&record.join_date)),
        )
    }

    /// Table body content. Always a full replacement of whatever was shown.
    pub fn render_rows<'a>(records: impl IntoIterator<Item = &'a Record>) -> String {
        records.into_iter().map(HtmlRenderer::render_row).collect()
    }

    fn render_select(id: &str, label: &str, options: &[&str], selected: Option<&str>) -> String {
        let mut html = format!(
            "<select id=\"{id}\" name=\"{id}\">\n    <option value=\"\">All {label}</option>\n"
        );
        for option in options {
            let marker = if selected == Some(*option) { " selected" } else { "" };
            let value = escape_html(option);
            html.push_str(&format!(
                "    <option value=\"{value}\"{marker}>{value}</option>\n"
            ));
        }
        html.push_str("  </select>");
        html
    }

    /// A complete, self-contained page for the given view.
    pub fn render_page(
        title: &str,
        search: &str,
        state: &FilterState,
        rows: &[&Record],
        counter: Counter,
    ) -> String {
        let header: String = COLUMN_NAMES
            .iter()
            .map(|name| format!("<th>{name}</th>"))
            .collect();
        let empty_display = if rows.is_empty() { "block" } else { "none" };

        format!(
            r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title}</title>
  <style>
    body {{ font-family: sans-serif; margin: 2rem; color: #1e293b; }}
    .controls {{ display: flex; gap: 0.5rem; margin-bottom: 1rem; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ text-align: left; padding: 0.5rem; border-bottom: 1px solid #e2e8f0; }}
    .category-badge {{ background: #e0e7ff; padding: 0.1rem 0.5rem; border-radius: 0.5rem; }}
    .status-badge {{ padding: 0.1rem 0.5rem; border-radius: 0.5rem; }}
    .status-active {{ background: #dcfce7; color: #166534; }}
    .status-inactive {{ background: #fee2e2; color: #991b1b; }}
    .status-pending {{ background: #fef9c3; color: #854d0e; }}
    #emptyState {{ padding: 2rem; text-align: center; color: #64748b; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <form class="controls" method="get">
  <input id="searchInput" name="search" type="text" placeholder="Search by name or email" value="{search}"/>
  {category}
  {kind}
  {status}
  <a id="resetBtn" href="?">Reset</a>
  </form>
  <p class="results">Showing <span id="resultCount">{filtered}</span> of <span id="totalCount">{total}</span> records</p>
  <table>
    <thead><tr>{header}</tr></thead>
    <tbody id="tableBody">
{body}    </tbody>
  </table>
  <div id="emptyState" style="display: {empty_display}">{empty_text}</div>
</body>
</html>
"####,
            title = escape_html(title),
            search = escape_html(search),
            category = HtmlRenderer::render_select(
                "categorySelect",
                "Categories",
                &CATEGORIES,
                state.category.as_deref()
            ),
            kind = HtmlRenderer::render_select("typeSelect", "Types", &TYPES, state.kind.as_deref()),
            status = HtmlRenderer::render_select(
                "statusSelect",
                "Statuses",
                &STATUSES,
                state.status.as_deref()
            ),
            filtered = counter.filtered,
            total = counter.total,
            body = HtmlRenderer::render_rows(rows.iter().copied()),
            empty_text = EMPTY_STATE_TEXT,
        )
    }
}
