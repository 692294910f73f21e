//! Host-backed file storage adapter and `.draw` payload (de)serialization
//! (§4.H, §6).
//!
//! The core never touches a filesystem directly; it calls through
//! [`PersistenceAdapter`], a trait the host implements over whatever
//! backing store it has (origin-private storage, local disk, an
//! in-memory fake for tests). Grounded on the teacher's
//! `LayoutPersistenceError` (`multi_viewport/persistence.rs`): a
//! hand-rolled `Display`/`Error` enum rather than a `thiserror` derive.

use std::fmt;

#[cfg(feature = "serde")]
use crate::history::Stroke;

/// The closed error taxonomy an adapter call can fail with (§4.H, §7.2).
#[derive(Debug)]
pub enum PersistenceError {
    NotSupported,
    PermissionDenied,
    NotFound(String),
    AlreadyExists(String),
    Unknown(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSupported => write!(f, "operation not supported by this host"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::NotFound(path) => write!(f, "not found: {path}"),
            Self::AlreadyExists(path) => write!(f, "already exists: {path}"),
            Self::Unknown(cause) => write!(f, "unknown error: {cause}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unknown(cause) => Some(cause.as_ref()),
            Self::NotSupported | Self::PermissionDenied | Self::NotFound(_) | Self::AlreadyExists(_) => None,
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(cause: std::io::Error) -> Self {
        Self::Unknown(Box::new(cause))
    }
}

/// A single entry as returned by [`PersistenceAdapter::list_root`].
#[derive(Clone, Debug, PartialEq)]
pub struct ListedEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Minimal surface the core requires from the host (§4.H). A path segment
/// never contains `/`; the root path is the empty string.
pub trait PersistenceAdapter {
    fn list_root(&self, path: &str) -> Result<Vec<ListedEntry>, PersistenceError>;
    fn read_file(&self, path: &str) -> Result<Vec<u8>, PersistenceError>;
    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), PersistenceError>;
    fn create_file(&mut self, parent: &str, name: &str) -> Result<String, PersistenceError>;
    fn create_folder(&mut self, parent: &str, name: &str) -> Result<String, PersistenceError>;
    fn rename(&mut self, parent: &str, old_name: &str, new_name: &str, is_dir: bool) -> Result<(), PersistenceError>;
    fn move_entry(&mut self, root: &str, source_path: &str, target_folder_path: &str, is_dir: bool) -> Result<(), PersistenceError>;
    fn delete(&mut self, parent: &str, name: &str, is_dir: bool) -> Result<(), PersistenceError>;
}

/// Names filtered from listings regardless of what the adapter returns
/// (§6): dotfiles and the host's own database bookkeeping files.
pub fn is_hidden_entry(name: &str) -> bool {
    name.starts_with('.')
        || name.starts_with("duckdb")
        || name.ends_with(".db")
        || name.ends_with(".db-journal")
        || name.ends_with(".db-wal")
}

/// Filters `entries` per [`is_hidden_entry`].
pub fn filter_hidden(entries: Vec<ListedEntry>) -> Vec<ListedEntry> {
    entries.into_iter().filter(|e| !is_hidden_entry(&e.name)).collect()
}

#[cfg(feature = "serde")]
mod draw_file {
    use serde::{Deserialize, Serialize};

    use crate::history::{Stroke, StrokePoint};

    #[derive(Serialize, Deserialize)]
    struct WirePoint {
        x: f64,
        y: f64,
    }

    #[derive(Serialize, Deserialize)]
    struct WireStroke {
        id: String,
        points: Vec<WirePoint>,
        color: String,
        width: f64,
    }

    #[derive(Serialize, Deserialize)]
    struct WireDrawFile {
        strokes: Vec<WireStroke>,
    }

    impl From<&Stroke> for WireStroke {
        fn from(stroke: &Stroke) -> Self {
            Self {
                id: stroke.id.clone(),
                points: stroke.points.iter().map(|p| WirePoint { x: p.x, y: p.y }).collect(),
                color: stroke.color.clone(),
                width: stroke.width,
            }
        }
    }

    impl From<WireStroke> for Stroke {
        fn from(wire: WireStroke) -> Self {
            Self {
                id: wire.id,
                points: wire.points.into_iter().map(|p| StrokePoint { x: p.x, y: p.y }).collect(),
                color: wire.color,
                width: wire.width,
            }
        }
    }

    pub(super) fn serialize(strokes: &[Stroke]) -> Result<Vec<u8>, serde_json::Error> {
        let wire = WireDrawFile { strokes: strokes.iter().map(WireStroke::from).collect() };
        serde_json::to_vec(&wire)
    }

    pub(super) fn deserialize(bytes: &[u8]) -> Result<Vec<Stroke>, serde_json::Error> {
        let wire: WireDrawFile = serde_json::from_slice(bytes)?;
        Ok(wire.strokes.into_iter().map(Stroke::from).collect())
    }
}

/// Failure modes specific to `.draw` payload (de)serialization, separate
/// from [`PersistenceError`] since a malformed file isn't a storage
/// failure.
#[cfg(feature = "serde")]
#[derive(Debug)]
pub enum DrawFileError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidStroke { reason: String },
}

#[cfg(feature = "serde")]
impl fmt::Display for DrawFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(cause) => write!(f, "i/o error reading .draw payload: {cause}"),
            Self::Json(cause) => write!(f, "invalid .draw payload: {cause}"),
            Self::InvalidStroke { reason } => write!(f, "invalid stroke: {reason}"),
        }
    }
}

#[cfg(feature = "serde")]
impl std::error::Error for DrawFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(cause) => Some(cause),
            Self::Json(cause) => Some(cause),
            Self::InvalidStroke { .. } => None,
        }
    }
}

#[cfg(feature = "serde")]
impl From<std::io::Error> for DrawFileError {
    fn from(cause: std::io::Error) -> Self {
        Self::Io(cause)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for DrawFileError {
    fn from(cause: serde_json::Error) -> Self {
        Self::Json(cause)
    }
}

#[cfg(feature = "serde")]
fn check_stroke_widths(strokes: &[Stroke]) -> Result<(), DrawFileError> {
    for stroke in strokes {
        if stroke.width <= 0.0 {
            return Err(DrawFileError::InvalidStroke { reason: format!("stroke {} has non-positive width {}", stroke.id, stroke.width) });
        }
    }
    Ok(())
}

/// Serializes `strokes` to the `.draw` JSON shape from §6.
#[cfg(feature = "serde")]
pub fn serialize_draw_file(strokes: &[Stroke]) -> Result<Vec<u8>, DrawFileError> {
    check_stroke_widths(strokes)?;
    Ok(draw_file::serialize(strokes)?)
}

/// Parses `.draw` JSON bytes into strokes, per §6.
#[cfg(feature = "serde")]
pub fn deserialize_draw_file(bytes: &[u8]) -> Result<Vec<Stroke>, DrawFileError> {
    let strokes = draw_file::deserialize(bytes)?;
    check_stroke_widths(&strokes)?;
    Ok(strokes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_entries_are_filtered_by_dot_prefix_and_db_suffixes() {
        assert!(is_hidden_entry(".gitignore"));
        assert!(is_hidden_entry("duckdb_internal"));
        assert!(is_hidden_entry("data.db"));
        assert!(is_hidden_entry("data.db-journal"));
        assert!(is_hidden_entry("data.db-wal"));
        assert!(!is_hidden_entry("drawing.draw"));
    }

    #[test]
    fn filter_hidden_keeps_only_visible_entries() {
        let entries = vec![
            ListedEntry { name: "notes.draw".to_owned(), is_dir: false },
            ListedEntry { name: ".DS_Store".to_owned(), is_dir: false },
            ListedEntry { name: "sketches".to_owned(), is_dir: true },
        ];
        let visible = filter_hidden(entries);
        assert_eq!(visible, vec![ListedEntry { name: "notes.draw".to_owned(), is_dir: false }, ListedEntry { name: "sketches".to_owned(), is_dir: true }]);
    }

    #[test]
    fn persistence_error_messages_name_the_path() {
        assert_eq!(PersistenceError::NotFound("a/b".to_owned()).to_string(), "not found: a/b");
        assert_eq!(PersistenceError::AlreadyExists("a/b".to_owned()).to_string(), "already exists: a/b");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn draw_file_round_trips_through_json() {
        use crate::history::StrokePoint;

        let strokes = vec![Stroke {
            id: "s1".to_owned(),
            points: vec![StrokePoint { x: 1.0, y: 2.0 }, StrokePoint { x: 3.0, y: 4.0 }],
            color: "#ff0000".to_owned(),
            width: 2.5,
        }];

        let bytes = serialize_draw_file(&strokes).unwrap();
        let json = String::from_utf8(bytes.clone()).unwrap();
        assert!(json.contains("\"strokes\""));
        assert!(json.contains("\"color\":\"#ff0000\""));

        let round_tripped = deserialize_draw_file(&bytes).unwrap();
        assert_eq!(round_tripped, strokes);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn draw_file_deserialize_rejects_malformed_json() {
        let result = deserialize_draw_file(b"not json");
        assert!(matches!(result, Err(DrawFileError::Json(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn draw_file_serialize_rejects_non_positive_width() {
        use crate::history::StrokePoint;

        let strokes = vec![Stroke {
            id: "s1".to_owned(),
            points: vec![StrokePoint { x: 0.0, y: 0.0 }],
            color: "#000000".to_owned(),
            width: 0.0,
        }];
        assert!(matches!(serialize_draw_file(&strokes), Err(DrawFileError::InvalidStroke { .. })));
    }

    #[test]
    fn persistence_error_unknown_wraps_io_error_as_source() {
        use std::error::Error as _;

        let io_err = std::io::Error::other("disk full");
        let err = PersistenceError::from(io_err);
        assert!(err.source().is_some());
        assert!(matches!(err, PersistenceError::Unknown(_)));
    }
}
