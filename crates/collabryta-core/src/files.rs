//! Upload metadata. Writing the bytes to `upload_dir` is the caller's job;
//! this module decides the stored name and path and records the upload.

use std::path::{Path, PathBuf};

use collabryta_shared::{FileKind, ValidationError};
use collabryta_store::{Database, FileRecord, FileRow};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::directory::Directory;
use crate::error::{CollabError, Result};
use crate::notifications::{Committed, Notifier};
use crate::triggers::EventTriggers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUpload {
    /// File name as sent by the client. Any directory part is discarded.
    pub original_name: String,
    pub title: String,
    pub description: Option<String>,
    pub size_bytes: u64,
}

pub struct FileService<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
    triggers: EventTriggers<'a>,
    upload_dir: &'a Path,
}

impl<'a> FileService<'a> {
    pub fn new(
        db: &'a Database,
        clock: &'a dyn Clock,
        directory: &'a dyn Directory,
        notifier: &'a dyn Notifier,
        upload_dir: &'a Path,
    ) -> Self {
        Self {
            db,
            clock,
            triggers: EventTriggers::new(notifier, directory),
            upload_dir,
        }
    }

    /// Record an upload by `owner_id` and confirm it to the uploader.
    ///
    /// The stored name is the upload time (`YYYYmmddHHMMSS`) joined to the
    /// original name with `_`; the file kind follows the extension.
    pub fn record_upload(&self, owner_id: i64, upload: &NewUpload) -> Result<Committed<FileRecord>> {
        ValidationError::require("title", &upload.title)?;
        let original = base_name(&upload.original_name)?;
        let size = i64::try_from(upload.size_bytes).map_err(|_| ValidationError::InvalidValue {
            field: "size_bytes",
            reason: format!("{} is too large", upload.size_bytes),
        })?;
        if self.db.find_user(owner_id)?.is_none() {
            return Err(CollabError::NotFound {
                entity: "user",
                id: owner_id,
            });
        }

        let now = self.clock.now();
        let filename = format!("{}_{original}", now.format("%Y%m%d%H%M%S"));
        let path = self.stored_path(&filename);

        let record = self.db.insert_file(
            &FileRow {
                file_type: FileKind::from_file_name(original),
                file_path: path.to_string_lossy().into_owned(),
                filename,
                file_size_bytes: size,
                title: upload.title.trim().to_string(),
                description: upload.description.clone(),
                owner_id,
            },
            now,
        )?;
        info!(file_id = record.id, owner_id, kind = %record.file_type.as_str(), "upload recorded");

        let fan_out = self.triggers.file_uploaded(&record);
        Ok(Committed {
            value: record,
            fan_out,
        })
    }

    /// Where the bytes of a stored file name belong.
    pub fn stored_path(&self, filename: &str) -> PathBuf {
        self.upload_dir.join(filename)
    }

    pub fn get(&self, file_id: i64) -> Result<FileRecord> {
        self.db
            .get_file(file_id)
            .map_err(CollabError::missing("file", file_id))
    }

    pub fn list(&self, skip: u32, limit: u32) -> Result<Vec<FileRecord>> {
        Ok(self.db.list_files(skip, limit)?)
    }

    pub fn list_for_user(&self, owner_id: i64) -> Result<Vec<FileRecord>> {
        Ok(self.db.list_files_for_user(owner_id)?)
    }
}

fn base_name(raw: &str) -> std::result::Result<&str, ValidationError> {
    // clients on Windows send backslash-separated paths
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    match Path::new(last).file_name().and_then(|n| n.to_str()) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(ValidationError::InvalidValue {
            field: "original_name",
            reason: format!("'{raw}' does not name a file"),
        }),
    }
}
