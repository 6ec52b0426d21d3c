use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{GatewayError, Record, Scope, StorageGateway, Visibility};

/// File-backed gateway: one JSON document per board
///
/// The document holds one object per `scope/visibility` pair, e.g.
/// `{"board/shared": {"sprint_start_day": "Monday"}}`.
/// Writes go to a temporary file which is then renamed over the original,
/// so a failed write never leaves a half-written record.
#[derive(Debug, Clone)]
pub struct FileGateway {
    path: PathBuf,
}

impl FileGateway {
    pub fn new(storage_dir: &Path, board_id: &str) -> Result<Self, GatewayError> {
        if board_id.is_empty()
            || board_id.contains(['/', '\\'])
            || board_id.starts_with('.')
        {
            return Err(GatewayError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid board id '{board_id}'"),
            )));
        }
        Ok(Self {
            path: storage_dir.join(format!("{board_id}.json")),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn section(scope: Scope, visibility: Visibility) -> String {
        format!("{scope}/{visibility}")
    }

    fn load_document(&self) -> Result<Map<String, Value>, GatewayError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(GatewayError::PermissionDenied(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    fn load_section(&self, scope: Scope, visibility: Visibility) -> Result<Record, GatewayError> {
        let mut document = self.load_document()?;
        match document.remove(&Self::section(scope, visibility)) {
            Some(Value::Object(record)) => Ok(record),
            Some(_) | None => Ok(Record::new()),
        }
    }

    fn store_section(
        &self,
        scope: Scope,
        visibility: Visibility,
        record: Record,
    ) -> Result<(), GatewayError> {
        let mut document = self.load_document()?;
        document.insert(Self::section(scope, visibility), Value::Object(record));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&document)?;
        write_replacing(&self.path, &json)?;

        debug!(path = %self.path.display(), "Wrote board storage");
        Ok(())
    }
}

/// Write through `<path>.tmp` and rename over `path`; the temporary file
/// does not outlive a failed rename
fn write_replacing(path: &Path, contents: &str) -> io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)?;
    if let Err(err) = fs::rename(&tmp_path, path) {
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            warn!(path = %tmp_path.display(), error = %cleanup, "Failed to remove temporary file");
        }
        return Err(err);
    }
    Ok(())
}

impl StorageGateway for FileGateway {
    async fn get(
        &self,
        scope: Scope,
        visibility: Visibility,
        key: &str,
    ) -> Result<Option<Value>, GatewayError> {
        Ok(self.load_section(scope, visibility)?.remove(key))
    }

    async fn get_all(&self, scope: Scope, visibility: Visibility) -> Result<Record, GatewayError> {
        self.load_section(scope, visibility)
    }

    async fn set(
        &self,
        scope: Scope,
        visibility: Visibility,
        record: Record,
    ) -> Result<(), GatewayError> {
        let mut stored = self.load_section(scope, visibility)?;
        let count = record.len();
        for (key, value) in record {
            stored.insert(key, value);
        }
        self.store_section(scope, visibility, stored)?;
        info!(path = %self.path.display(), %scope, %visibility, keys = count, "Saved record");
        Ok(())
    }

    async fn remove(
        &self,
        scope: Scope,
        visibility: Visibility,
        keys: &[String],
    ) -> Result<(), GatewayError> {
        let mut stored = self.load_section(scope, visibility)?;
        for key in keys {
            stored.shift_remove(key);
        }
        self.store_section(scope, visibility, stored)?;
        info!(path = %self.path.display(), %scope, %visibility, keys = keys.len(), "Removed keys");
        Ok(())
    }
}
