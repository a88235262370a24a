use chrono::{DateTime, Utc};
use collabryta_shared::FileKind;
use rusqlite::params;

use crate::database::{decode_ts, encode_ts, Database};
use crate::error::{Result, StoreError};
use crate::models::{FileRecord, FileRow};

const FILE_COLUMNS: &str =
    "id, filename, file_path, file_type, file_size_bytes, title, description, uploaded_at, owner_id";

impl Database {
    pub fn insert_file(&self, file: &FileRow, now: DateTime<Utc>) -> Result<FileRecord> {
        self.conn().execute(
            "INSERT INTO files (filename, file_path, file_type, file_size_bytes, title,
                                description, uploaded_at, owner_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                file.filename,
                file.file_path,
                file.file_type.as_str(),
                file.file_size_bytes,
                file.title,
                file.description,
                encode_ts(&now),
                file.owner_id,
            ],
        )?;
        self.get_file(self.conn().last_insert_rowid())
    }

    pub fn get_file(&self, id: i64) -> Result<FileRecord> {
        self.conn()
            .query_row(
                &format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?1"),
                params![id],
                row_to_file,
            )
            .map_err(StoreError::from_lookup)
    }

    /// All uploads, oldest first, paginated.
    pub fn list_files(&self, skip: u32, limit: u32) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {FILE_COLUMNS} FROM files ORDER BY id ASC LIMIT ?1 OFFSET ?2"
        ))?;

        let rows = stmt.query_map(params![limit, skip], row_to_file)?;

        let mut files = Vec::new();
        for row in rows {
            files.push(row?);
        }
        Ok(files)
    }

    pub fn list_files_for_user(&self, owner_id: i64) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE owner_id = ?1 ORDER BY id ASC"
        ))?;

        let rows = stmt.query_map(params![owner_id], row_to_file)?;

        let mut files = Vec::new();
        for row in rows {
            files.push(row?);
        }
        Ok(files)
    }
}

fn row_to_file(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    let file_type: String = row.get(3)?;
    let uploaded_str: String = row.get(7)?;

    Ok(FileRecord {
        id: row.get(0)?,
        filename: row.get(1)?,
        file_path: row.get(2)?,
        file_type: FileKind::from_label(&file_type),
        file_size_bytes: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        uploaded_at: decode_ts(7, &uploaded_str)?,
        owner_id: row.get(8)?,
    })
}
