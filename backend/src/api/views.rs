//! Server-rendered HTML pages: the upload form and the summary dashboard.

use std::fmt::Write as _;

use crate::api::types::download_links;
use crate::export::format_number;
use crate::models::StoreTotal;
use crate::transform::pipeline::AnalysisOutcome;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;max-width:60rem}\
table{border-collapse:collapse;margin-bottom:1.5rem}\
th,td{border:1px solid #ccc;padding:.3rem .8rem;text-align:left}\
th{background:#f3f3f3}.warn{color:#a60}";

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = escape_html(title),
    )
}

fn table(headers: &[&str], rows: impl IntoIterator<Item = Vec<String>>) -> String {
    let mut html = String::from("<table>\n<tr>");
    for h in headers {
        let _ = write!(html, "<th>{}</th>", escape_html(h));
    }
    html.push_str("</tr>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(&cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
    html
}

fn store_rows(totals: &[StoreTotal]) -> impl Iterator<Item = Vec<String>> + '_ {
    totals
        .iter()
        .map(|t| vec![t.store_id.to_string(), format_number(t.total_sales)])
}

/// Upload form.
pub fn render_index(max_upload_bytes: usize) -> String {
    let body = format!(
        "<h1>Retail Sales Analysis</h1>\n\
         <p>Upload a CSV file with <code>StoreID</code>, <code>Date</code> \
         and <code>Sales</code> columns (max {} MB).</p>\n\
         <form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" accept=\".csv,text/csv\">\n\
         <button type=\"submit\">Analyse</button>\n\
         </form>\n",
        max_upload_bytes / (1024 * 1024)
    );
    page("Retail Sales Analysis", &body)
}

/// Summary dashboard for one analysed upload.
pub fn render_dashboard(
    job_id: &str,
    file_name: Option<&str>,
    outcome: &AnalysisOutcome,
) -> String {
    let report = &outcome.report;
    let mut body = String::from("<h1>Sales Dashboard</h1>\n");

    let _ = writeln!(
        body,
        "<p>{} &middot; {} rows read, {} kept, {} duplicates removed</p>",
        escape_html(file_name.unwrap_or("upload")),
        report.cleaning.rows_read,
        report.cleaning.rows_kept,
        report.cleaning.duplicates_removed,
    );

    if !report.cleaning.issues.is_empty() {
        let _ = writeln!(
            body,
            "<p class=\"warn\">{} unparseable dates, {} unparseable sales values \
             (kept as blank date / 0)</p>",
            report.cleaning.unparseable_dates(),
            report.cleaning.unparseable_numbers(),
        );
    }

    body.push_str("<h2>Total Sales by Store</h2>\n");
    body.push_str(&table(&["StoreID", "TotalSales"], store_rows(&report.store_totals)));

    body.push_str("<h2>Average Sales by Weekday</h2>\n");
    body.push_str(&table(
        &["Weekday", "AvgSalesPerDay"],
        report
            .weekday_averages
            .iter()
            .map(|w| vec![w.weekday.clone(), format_number(w.avg_sales_per_day)]),
    ));

    body.push_str("<h2>Top 3 Stores</h2>\n");
    body.push_str(&table(&["StoreID", "TotalSales"], store_rows(&report.top_stores)));

    body.push_str("<h2>Downloads</h2>\n<ul>\n");
    for link in download_links(job_id) {
        let _ = writeln!(
            body,
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(&link.url),
            escape_html(&link.name)
        );
    }
    body.push_str("</ul>\n<p><a href=\"/\">Upload another file</a></p>\n");

    page("Sales Dashboard", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::logs::JobLogger;
    use crate::transform::pipeline::analyze_bytes;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_index_has_upload_form() {
        let html = render_index(50 * 1024 * 1024);
        assert!(html.contains("action=\"/upload\""));
        assert!(html.contains("name=\"file\""));
        assert!(html.contains("max 50 MB"));
    }

    #[test]
    fn test_dashboard_lists_tables_and_downloads() {
        let csv = "StoreID,Date,Sales\n<b>1</b>,2024-01-01,6000\n102,2024-01-02,4000\n";
        let outcome = analyze_bytes(csv.as_bytes(), &JobLogger::default()).unwrap();
        let html = render_dashboard("job-9", Some("sales.csv"), &outcome);

        assert!(html.contains("Total Sales by Store"));
        assert!(html.contains("<td>Tuesday</td><td>4000</td>"));
        assert!(html.contains("&lt;b&gt;1&lt;/b&gt;"));
        assert!(!html.contains("<b>1</b>"));
        assert!(html.contains("/download/job-9/store_sales_summary.csv"));
        assert!(html.contains("sales.csv"));
        assert!(!html.contains("class=\"warn\""));
    }
}
