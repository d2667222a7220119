//! Paged, sortable data table.
//!
//! Rows are JSON objects; each [`Column`] reads one (optionally dotted)
//! key. Paging and sorting state travel through the table's control link,
//! an [`ActionLink`] named `<table>-controlLink` carrying the `page`,
//! `column` and `ascending` parameters.

use std::cmp::Ordering;

use click_core::{
    format_message, impl_as_any, to_label, Context, Control, HtmlStringBuffer, Messages,
};
use serde::Serialize;
use serde_json::Value;

use crate::link::ActionLink;

/// Request parameter holding the zero-based page number.
pub const PAGE: &str = "page";

/// Request parameter holding the sorted column name.
pub const COLUMN: &str = "column";

/// Request parameter holding the sort direction.
pub const ASCENDING: &str = "ascending";

/// A table column bound to a row key.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    header: Option<String>,
    format: Option<String>,
    sortable: Option<bool>,
    escape: bool,
    class: Option<String>,
}

impl Column {
    /// Create a column reading the row key `name`. Dots select nested keys.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: None,
            format: None,
            sortable: None,
            escape: true,
            class: None,
        }
    }

    /// Set the header text; derived from the name by default.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Format values with a `{0}` pattern.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Override the table's sortable setting for this column.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }

    /// Render values as raw HTML instead of escaping them.
    pub fn raw_html(mut self) -> Self {
        self.escape = false;
        self
    }

    /// Set the cell CSS class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header text.
    pub fn header(&self) -> String {
        self.header.clone().unwrap_or_else(|| to_label(&self.name))
    }

    fn value<'a>(&self, row: &'a Value) -> Option<&'a Value> {
        self.name.split('.').try_fold(row, |value, key| value.get(key))
    }

    fn display(&self, row: &Value) -> String {
        let text = match self.value(row) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        match &self.format {
            Some(pattern) if !text.is_empty() => format_message(pattern, &[&text]),
            _ => text,
        }
    }

    fn render_cell(&self, row: &Value, buffer: &mut HtmlStringBuffer) {
        buffer.element_start("td");
        buffer.append_attribute_opt("class", self.class.as_deref());
        buffer.close_tag();
        let text = self.display(row);
        if self.escape {
            buffer.append_escaped(text);
        } else {
            buffer.append(text);
        }
        buffer.element_end_tag("td");
    }
}

/// Compare two cell values: missing and null first, then numbers, then
/// everything else as text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(_) => 2,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) if rank(a) == rank(b) && rank(a) > 0 => {
            x.to_string().cmp(&y.to_string())
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Data table with paging and column sorting.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    class: String,
    columns: Vec<Column>,
    rows: Vec<Value>,
    page_size: usize,
    page_number: usize,
    sort_column: Option<String>,
    ascending: bool,
    sortable: bool,
    show_banner: bool,
    listener: Option<String>,
    control_link: ActionLink,
}

impl Table {
    /// Create an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let control_link = ActionLink::new(format!("{}-controlLink", name));
        Self {
            name,
            class: "simple".to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            page_size: 0,
            page_number: 0,
            sort_column: None,
            ascending: true,
            sortable: false,
            show_banner: false,
            listener: None,
            control_link,
        }
    }

    /// Add a column.
    pub fn with_column(mut self, column: Column) -> Self {
        self.add_column(column);
        self
    }

    /// Show at most `page_size` rows per page (0 shows all rows).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Make every column sortable unless it says otherwise.
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Show the "items found" banner below the table.
    pub fn with_banner(mut self, show_banner: bool) -> Self {
        self.show_banner = show_banner;
        self
    }

    /// Set the table CSS class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Set the page listener fired when a paging or sorting link is clicked.
    pub fn with_listener(mut self, listener: impl Into<String>) -> Self {
        self.listener = Some(listener.into());
        self
    }

    /// Add a column.
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// The columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Replace the rows.
    pub fn set_rows(&mut self, rows: Vec<Value>) {
        self.rows = rows;
    }

    /// Replace the rows with serialized records.
    pub fn set_row_objects<T: Serialize>(&mut self, rows: &[T]) -> click_core::Result<()> {
        self.rows = rows
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    /// The rows, unsorted.
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    /// Zero-based page number, clamped to the last page.
    pub fn page_number(&self) -> usize {
        self.page_number.min(self.page_count() - 1)
    }

    /// Set the page number.
    pub fn set_page_number(&mut self, page_number: usize) {
        self.page_number = page_number;
    }

    /// Number of pages, at least one.
    pub fn page_count(&self) -> usize {
        if self.page_size == 0 || self.rows.is_empty() {
            1
        } else {
            self.rows.len().div_ceil(self.page_size)
        }
    }

    /// Sorted column, if any.
    pub fn sort_column(&self) -> Option<&str> {
        self.sort_column.as_deref()
    }

    /// Check whether sorting is ascending.
    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Sort by a column.
    pub fn set_sort(&mut self, column: impl Into<String>, ascending: bool) {
        self.sort_column = Some(column.into());
        self.ascending = ascending;
    }

    /// The paging and sorting link.
    pub fn control_link(&self) -> &ActionLink {
        &self.control_link
    }

    fn is_sortable(&self, column: &Column) -> bool {
        column.sortable.unwrap_or(self.sortable)
    }

    /// Rows of the current page, in display order.
    pub fn page_rows(&self) -> Vec<&Value> {
        let mut rows: Vec<&Value> = self.rows.iter().collect();

        let sort = self
            .sort_column
            .as_deref()
            .and_then(|name| self.columns.iter().find(|c| c.name() == name));
        if let Some(column) = sort {
            rows.sort_by(|a, b| {
                let ordering = compare_values(column.value(a), column.value(b));
                if self.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        if self.page_size == 0 {
            return rows;
        }
        let first = self.page_number() * self.page_size;
        rows.into_iter().skip(first).take(self.page_size).collect()
    }

    fn control_href(&self, ctx: &Context, page: usize, sort: Option<(&str, bool)>) -> String {
        let mut link = self.control_link.clone();
        link.set_parameter(PAGE, page.to_string());
        if let Some((column, ascending)) = sort {
            link.set_parameter(COLUMN, column);
            link.set_parameter(ASCENDING, ascending.to_string());
        }
        link.href(ctx)
    }

    fn current_sort(&self) -> Option<(&str, bool)> {
        self.sort_column.as_deref().map(|c| (c, self.ascending))
    }

    fn render_header(&self, ctx: &Context, buffer: &mut HtmlStringBuffer) {
        buffer.append("<thead>\n<tr>\n");
        for column in &self.columns {
            let header = column.header();
            if !self.is_sortable(column) {
                buffer
                    .append("<th>")
                    .append_escaped(&header)
                    .append("</th>\n");
                continue;
            }

            let sorted_here = self.sort_column.as_deref() == Some(column.name());
            let next_ascending = if sorted_here { !self.ascending } else { true };
            let class = match (sorted_here, self.ascending) {
                (true, true) => "sortable ascending",
                (true, false) => "sortable descending",
                _ => "sortable",
            };
            let href = self.control_href(
                ctx,
                self.page_number(),
                Some((column.name(), next_ascending)),
            );
            buffer
                .element_start("th")
                .append_attribute("class", class)
                .close_tag()
                .element_start("a")
                .append_attribute("href", href)
                .close_tag()
                .append_escaped(&header)
                .append("</a></th>\n");
        }
        buffer.append("</tr>\n</thead>\n");
    }

    fn render_body(&self, ctx: &Context, buffer: &mut HtmlStringBuffer) {
        buffer.append("<tbody>\n");
        let rows = self.page_rows();
        if rows.is_empty() {
            buffer
                .element_start("tr")
                .append_attribute("class", "odd")
                .close_tag()
                .element_start("td")
                .append_attribute("colspan", self.columns.len().max(1))
                .append_attribute("class", "error")
                .close_tag()
                .append(ctx.messages().text("table-no-rows-found"))
                .append("</td></tr>\n");
        }
        for (index, row) in rows.into_iter().enumerate() {
            let class = if (index + 1) % 2 == 0 { "even" } else { "odd" };
            buffer
                .element_start("tr")
                .append_attribute("class", class)
                .close_tag()
                .append("\n");
            for column in &self.columns {
                column.render_cell(row, buffer);
                buffer.append("\n");
            }
            buffer.append("</tr>\n");
        }
        buffer.append("</tbody>\n");
    }

    fn render_paging(&self, ctx: &Context, buffer: &mut HtmlStringBuffer) {
        let messages: &Messages = ctx.messages();
        let total = self.rows.len();

        if self.show_banner && total > 0 {
            let banner = if self.page_size == 0 {
                messages.format("table-page-banner-nolinks", &[&total])
            } else {
                let first = self.page_number() * self.page_size + 1;
                let last = (first - 1 + self.page_size).min(total);
                messages.format("table-page-banner", &[&total, &first, &last])
            };
            buffer
                .append("<div class=\"pagingBanner\">")
                .append(banner)
                .append("</div>\n");
        }

        let page_count = self.page_count();
        if page_count <= 1 {
            return;
        }

        let page = self.page_number();
        let last_page = page_count - 1;
        let sort = self.current_sort();
        let links = [
            ("table-first-label", 0, page > 0),
            ("table-previous-label", page.saturating_sub(1), page > 0),
            ("table-next-label", (page + 1).min(last_page), page < last_page),
            ("table-last-label", last_page, page < last_page),
        ];

        buffer.append("<div class=\"pagingLinks\">");
        for (i, (key, target, enabled)) in links.into_iter().enumerate() {
            if i > 0 {
                buffer.append(" | ");
            }
            let label = messages.text(key);
            if enabled {
                buffer
                    .element_start("a")
                    .append_attribute("href", self.control_href(ctx, target, sort))
                    .close_tag()
                    .append_escaped(label)
                    .element_end_tag("a");
            } else {
                buffer.append_escaped(label);
            }
        }
        buffer.append("</div>\n");
    }
}

impl Control for Table {
    fn name(&self) -> &str {
        &self.name
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        self.control_link.bind_request_value(ctx);
        if !self.control_link.is_clicked() {
            return;
        }
        if let Some(page) = ctx.request_parameter(PAGE).and_then(|p| p.trim().parse().ok()) {
            self.page_number = page;
        }
        if let Some(column) = ctx.request_parameter(COLUMN) {
            if self.columns.iter().any(|c| c.name() == column) {
                self.sort_column = Some(column.to_string());
            } else {
                tracing::debug!(table = %self.name, column, "ignoring unknown sort column");
            }
        }
        if let Some(ascending) = ctx.request_parameter(ASCENDING) {
            self.ascending = ascending != "false";
        }
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        self.bind_request_value(ctx);
        if self.control_link.is_clicked() {
            if let Some(listener) = &self.listener {
                ctx.dispatch_action_event(&self.name, listener);
            }
        }
        true
    }

    fn render(&self, ctx: &Context, buffer: &mut HtmlStringBuffer) {
        buffer
            .element_start("table")
            .append_attribute("class", &self.class)
            .append_attribute("id", &self.name)
            .close_tag()
            .append("\n");
        self.render_header(ctx, buffer);
        self.render_body(ctx, buffer);
        buffer.append("</table>\n");
        self.render_paging(ctx, buffer);
    }

    impl_as_any!();
}
