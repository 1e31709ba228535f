//! Notes and reading-position persistence.
//!
//! Two independent string values are kept: the learner's notes in a
//! long-lived store and the last viewed section in a session-scoped store.
//! Each write replaces the stored value; there is no conflict resolution.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{json_type_name, ImportError, StorageError};

/// Key of the notes value in the long-lived store.
pub const NOTES_KEY: &str = "lectern_notes";
/// Key of the last section id in the session store.
pub const LAST_SECTION_KEY: &str = "lectern_scroll";
/// Suggested file name for exported notes.
pub const EXPORT_FILE_NAME: &str = "lectern_notes.json";

/// A string key-value storage port.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store; its contents live as long as the value does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object file, rewritten on every change.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Write a sibling temp file and rename it over the store.
    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(io_err)?;
        let json = serde_json::to_string_pretty(values).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

/// Shape of an exported notes file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesExport {
    pub notes: String,
}

/// Validate an import payload and return the notes it carries.
pub fn parse_notes_payload(payload: &str) -> Result<String, ImportError> {
    let mut object = match serde_json::from_str(payload)? {
        serde_json::Value::Object(object) => object,
        other => return Err(ImportError::NotAnObject(json_type_name(&other))),
    };
    match object.remove("notes") {
        Some(serde_json::Value::String(notes)) => Ok(notes),
        Some(other) => Err(ImportError::NotesNotString(json_type_name(&other))),
        None => Err(ImportError::MissingNotes),
    }
}

/// Injected storage context for the reader.
pub struct ReaderContext {
    local: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
}

impl ReaderContext {
    pub fn new(local: Box<dyn KeyValueStore>, session: Box<dyn KeyValueStore>) -> Self {
        Self { local, session }
    }

    /// A context whose stores vanish with it.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
    }

    /// Stored notes, empty when none were saved.
    pub fn notes(&self) -> Result<String, StorageError> {
        Ok(self.local.get(NOTES_KEY)?.unwrap_or_default())
    }

    pub fn save_notes(&mut self, notes: &str) -> Result<(), StorageError> {
        self.local.set(NOTES_KEY, notes)
    }

    pub fn last_section(&self) -> Result<Option<String>, StorageError> {
        self.session.get(LAST_SECTION_KEY)
    }

    pub fn remember_section(&mut self, id: &str) -> Result<(), StorageError> {
        self.session.set(LAST_SECTION_KEY, id)
    }

    /// Serialize the stored notes as `{"notes": "..."}`.
    pub fn export_notes(&self) -> Result<String, StorageError> {
        let export = NotesExport {
            notes: self.notes()?,
        };
        // A struct with a single String field always serializes.
        Ok(serde_json::to_string_pretty(&export).unwrap_or_default())
    }

    /// Replace the stored notes with an import payload.
    ///
    /// The payload is fully validated before anything is written.
    pub fn import_notes(&mut self, payload: &str) -> Result<String, ImportError> {
        let notes = parse_notes_payload(payload)?;
        self.save_notes(&notes)?;
        tracing::info!("imported {} characters of notes", notes.chars().count());
        Ok(notes)
    }

    /// Read an import file and apply it.
    pub async fn import_notes_file(&mut self, path: &Path) -> Result<String, ImportError> {
        let payload = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ImportError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;
        self.import_notes(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_last_write_wins() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("local.json");

        let mut store = FileStore::new(&path);
        assert_eq!(store.get(NOTES_KEY).unwrap(), None);
        store.set(NOTES_KEY, "第一条笔记").unwrap();
        store.set("other", "x").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(NOTES_KEY).unwrap().as_deref(), Some("第一条笔记"));
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn file_store_replaces_file_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        std::fs::write(&path, r#"{"other": "kept"}"#).unwrap();

        let mut store = FileStore::new(&path);
        store.set(NOTES_KEY, "one").unwrap();
        store.set(NOTES_KEY, "two").unwrap();
        store.remove("other").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("local.json")]);

        let on_disk: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk[NOTES_KEY], "two");
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get(NOTES_KEY),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn stores_are_independent() {
        let mut ctx = ReaderContext::in_memory();
        ctx.save_notes("notes").unwrap();
        ctx.remember_section("Intro").unwrap();
        assert_eq!(ctx.notes().unwrap(), "notes");
        assert_eq!(ctx.last_section().unwrap().as_deref(), Some("Intro"));
    }

    #[test]
    fn export_shape() {
        let mut ctx = ReaderContext::in_memory();
        ctx.save_notes("line 1\nline \"2\"").unwrap();
        let exported = ctx.export_notes().unwrap();
        let parsed: NotesExport = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed.notes, "line 1\nline \"2\"");

        let empty = ReaderContext::in_memory().export_notes().unwrap();
        assert_eq!(
            serde_json::from_str::<NotesExport>(&empty).unwrap().notes,
            ""
        );
    }

    #[test]
    fn import_replaces_notes() {
        let mut ctx = ReaderContext::in_memory();
        ctx.save_notes("old").unwrap();
        let notes = ctx.import_notes(r#"{"notes": "new notes", "extra": 1}"#).unwrap();
        assert_eq!(notes, "new notes");
        assert_eq!(ctx.notes().unwrap(), "new notes");
    }

    #[test]
    fn import_non_string_notes_leaves_state() {
        let mut ctx = ReaderContext::in_memory();
        ctx.save_notes("keep me").unwrap();

        let err = ctx.import_notes(r#"{"notes": 42}"#).unwrap_err();
        assert!(matches!(err, ImportError::NotesNotString("number")));
        assert_eq!(ctx.notes().unwrap(), "keep me");
    }

    #[test]
    fn import_rejects_malformed_payloads() {
        let mut ctx = ReaderContext::in_memory();
        ctx.save_notes("keep me").unwrap();

        for payload in ["not json", "[\"notes\"]", "{}", r#"{"notes": null}"#] {
            let err = ctx.import_notes(payload).unwrap_err();
            assert!(err.is_malformed_payload(), "payload: {payload}");
        }
        assert!(matches!(
            parse_notes_payload("[]"),
            Err(ImportError::NotAnObject("array"))
        ));
        assert!(matches!(
            parse_notes_payload("{}"),
            Err(ImportError::MissingNotes)
        ));
        assert_eq!(ctx.notes().unwrap(), "keep me");
    }

    #[tokio::test]
    async fn import_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        std::fs::write(&path, r#"{"notes": "from file"}"#).unwrap();

        let mut ctx = ReaderContext::in_memory();
        assert_eq!(ctx.import_notes_file(&path).await.unwrap(), "from file");

        let missing = ctx.import_notes_file(&dir.path().join("absent.json")).await;
        assert!(matches!(missing, Err(ImportError::Unreadable { .. })));
        assert_eq!(ctx.notes().unwrap(), "from file");
    }
}
