//! Page route listing.

use anyhow::Result;
use serde::Serialize;

use super::PagesArgs;
use crate::context::Context;

#[derive(Serialize)]
struct RouteRow<'a> {
    path: &'a str,
    page: &'a str,
    template: &'a str,
    headers: usize,
}

/// Run the pages command.
pub fn run(args: PagesArgs, ctx: &Context) -> Result<()> {
    let app = click_examples::application(ctx.config.clone())?;

    let rows: Vec<RouteRow<'_>> = app
        .registry()
        .routes()
        .filter(|route| {
            args.prefix
                .as_deref()
                .map_or(true, |prefix| route.path.starts_with(prefix))
        })
        .map(|route| RouteRow {
            path: &route.path,
            page: &route.page,
            template: route.template.as_deref().unwrap_or(&route.path),
            headers: route.headers.len(),
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header(&format!("Pages ({})", rows.len()));
    if rows.is_empty() {
        ctx.output.info("No page routes configured");
        return Ok(());
    }

    let widths = [
        rows.iter().map(|r| r.path.len()).max().unwrap_or(4).max(4),
        rows.iter().map(|r| r.page.len()).max().unwrap_or(4).max(4),
        rows.iter().map(|r| r.template.len()).max().unwrap_or(8).max(8),
    ];
    ctx.output.table_row(&["PATH", "PAGE", "TEMPLATE", "HEADERS"], &widths);
    for row in &rows {
        let headers = row.headers.to_string();
        ctx.output
            .table_row(&[row.path, row.page, row.template, &headers], &widths);
    }
    if !ctx.config.context_path.is_empty() {
        ctx.output
            .kv("context path", &ctx.config.context_path);
    }

    Ok(())
}
