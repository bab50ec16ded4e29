//! HTML rendering for the audit console.

use askama::Template;

use crate::audit::AuditRecord;

pub struct ConsoleRow<'a> {
    pub record: &'a AuditRecord,
    /// Request to the console's own listing; hidden by default, still deletable.
    pub is_console: bool,
}

#[derive(Template)]
#[template(path = "console.html")]
pub struct ConsolePage<'a> {
    pub rows: Vec<ConsoleRow<'a>>,
    pub list_path: &'a str,
    pub delete_path: &'a str,
    pub failed_writes: u64,
}

impl<'a> ConsolePage<'a> {
    /// `records` must already be in display order.
    pub fn new(
        records: &'a [AuditRecord],
        list_path: &'a str,
        delete_path: &'a str,
        failed_writes: u64,
    ) -> Self {
        let rows = records
            .iter()
            .map(|record| ConsoleRow {
                record,
                is_console: record.url == list_path,
            })
            .collect();

        Self {
            rows,
            list_path,
            delete_path,
            failed_writes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::RecordId;

    fn record(id: i64, url: &str) -> AuditRecord {
        AuditRecord {
            id: RecordId(id),
            country: "Japan".into(),
            region: "Tokyo".into(),
            city: "Chiyoda".into(),
            method: "GET".into(),
            client_ip: "1.2.3.4".into(),
            url: url.into(),
            timestamp: "2025/01/01 09:00:00".into(),
            source: "tool".into(),
        }
    }

    #[test]
    fn test_renders_rows_and_delete_form() {
        let records = vec![record(7, "/mine/list"), record(3, "/api/ipcheck/logo.svg")];
        let html = ConsolePage::new(&records, "/mine/list", "/mine/delete", 0)
            .render()
            .unwrap();

        assert!(html.contains(r#"<form method="post""#));
        assert!(html.contains(r#"name="deleteIds" value="7""#));
        assert!(html.contains(r#"name="deleteIds" value="3""#));
        assert_eq!(html.matches("console-row").count(), 2); // one row + the script selector
        assert!(html.find("value=\"7\"").unwrap() < html.find("value=\"3\"").unwrap());
        assert!(!html.contains("failed audit writes"));
        // Console rows start visible and selectable.
        assert!(html.contains(r#"<input type="checkbox" id="hide-console">"#));
    }

    #[test]
    fn test_escapes_recorded_values() {
        let records = vec![record(1, "/<script>alert(1)</script>")];
        let html = ConsolePage::new(&records, "/mine/list", "/mine/delete", 2)
            .render()
            .unwrap();

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("2 failed audit writes"));
    }
}
