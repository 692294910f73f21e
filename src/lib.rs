#![forbid(unsafe_code)]

//! Core layout and docking engine for an in-browser drawing workspace:
//! a dock tree manager, a file-tree manager, a shared drag-drop position
//! classifier, and a per-panel undo/redo history engine.

pub mod content;
pub mod dock;
pub mod drop_intent;
pub mod file_tree;
pub mod history;
pub mod hotkeys;
pub mod ids;
pub mod persistence;
