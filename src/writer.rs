// src/writer.rs

use std::fs;
use std::path::Path;

use tempfile::Builder;
use tracing::info;

use crate::error::WriteError;
use crate::model::OutputRow;

/// Writes `rows` as CSV with a header line.
///
/// The table is written to a temporary file next to `path` and renamed over it
/// once fully flushed, so `path` either holds the complete new table or is left
/// as it was. The temporary file is removed if anything fails. An existing
/// table keeps its permissions; a new one gets the usual umask-derived mode.
pub fn write_rows(path: &Path, rows: &[OutputRow]) -> Result<(), WriteError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = temp_builder().tempfile_in(dir)?;
    match fs::metadata(path) {
        Ok(existing) => fs::set_permissions(temp.path(), existing.permissions())?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(temp);

    writer.write_record(OutputRow::HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let temp = writer.into_inner().map_err(|e| e.into_error())?;
    temp.as_file().sync_all()?;
    temp.persist(path)?;

    info!(path = %path.display(), rows = rows.len(), "Wrote output table");
    Ok(())
}

// tempfile defaults to 0600; request 0666 and let the umask narrow it
#[cfg(unix)]
fn temp_builder() -> Builder<'static, 'static> {
    use std::os::unix::fs::PermissionsExt;

    let mut builder = Builder::new();
    builder.permissions(fs::Permissions::from_mode(0o666));
    builder
}

#[cfg(not(unix))]
fn temp_builder() -> Builder<'static, 'static> {
    Builder::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, CustomerId};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    fn row(customer: &str, is_vip: bool) -> OutputRow {
        let day = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        OutputRow {
            customer_id: CustomerId::parse(customer).unwrap(),
            customer_name: "Smith, Jo".to_string(),
            registration_date: day,
            is_vip,
            order_id: "ORD-1".to_string(),
            order_date: day,
            product_id: 3,
            product_name: "Lamp".to_string(),
            category: Category::HomeGoods,
            unit_price: 12.5,
            item_quantity: 2,
            total_item_price: 25.0,
            total_order_value_percentage: 100.0,
        }
    }

    #[test]
    fn test_empty_rows_write_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_rows(&path, &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{}\n", OutputRow::HEADERS.join(",")));
    }

    #[test]
    fn test_rows_rendered_with_quoting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_rows(&path, &[row("7", true)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            concat!(
                "7,\"Smith, Jo\",2023-01-05 00:00:00,true,ORD-1,2023-01-05 00:00:00,",
                "3,Lamp,Home Goods,12.5,2,25.0,100.0"
            )
        );
    }

    #[test]
    fn test_overwrites_existing_file_without_leftovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale").unwrap();

        write_rows(&path, &[row("A", false)]).unwrap();

        assert!(fs::read_to_string(&path).unwrap().starts_with("customer_id,"));
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_missing_directory_fails_without_creating_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        assert!(matches!(write_rows(&path, &[]), Err(WriteError::Io(_))));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        for mode in [0o644, 0o640] {
            let path = dir.path().join(format!("out_{:o}.csv", mode));
            fs::write(&path, "stale").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();

            write_rows(&path, &[row("A", false)]).unwrap();

            let written = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(written, mode);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_gets_umask_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh.csv");
        let plain_path = dir.path().join("plain.csv");
        fs::write(&plain_path, "").unwrap();
        let plain_mode = fs::metadata(&plain_path).unwrap().permissions().mode() & 0o777;

        write_rows(&path, &[]).unwrap();

        let written = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(written, plain_mode);
    }
}
