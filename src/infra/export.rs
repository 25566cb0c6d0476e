use chrono::NaiveDateTime;
use rust_xlsxwriter::Workbook;
use serde_json::Value;

pub const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Render a result set to a one-sheet workbook: header row of column names,
/// one row per result row, returned as the file's bytes.
pub fn workbook_bytes(columns: &[String], rows: &[Value]) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("results")?;

    for (c, name) in columns.iter().enumerate() {
        sheet.write_string(0, c as u16, name)?;
    }

    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, name) in columns.iter().enumerate() {
            let c = c as u16;
            match row.get(name) {
                None | Some(Value::Null) => {}
                Some(Value::Bool(b)) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                Some(Value::Number(n)) => {
                    sheet.write_number(r, c, n.as_f64().unwrap_or(0.0))?;
                }
                Some(Value::String(s)) => {
                    sheet.write_string(r, c, s)?;
                }
                Some(other) => {
                    sheet.write_string(r, c, other.to_string())?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn export_filename(object: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "result_{}_{}.xlsx",
        object,
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn workbook_bytes_produces_a_zip_container() {
        let columns = vec!["id".to_string(), "status".to_string()];
        let rows = vec![
            json!({"id": 1, "status": "ACTIVE"}),
            json!({"id": 2, "status": null}),
        ];
        let bytes = workbook_bytes(&columns, &rows).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_result_still_writes_header_row() {
        let columns = vec!["id".to_string()];
        let bytes = workbook_bytes(&columns, &[]).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn filename_carries_object_and_timestamp() {
        let ts = NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap();
        assert_eq!(
            export_filename("CTOP", ts),
            "result_CTOP_20260806_101500.xlsx"
        );
    }
}
