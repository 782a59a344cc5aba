//! SpriteCel — layered, multi-frame pixel-art sprite engine.
//!
//! The crate owns the raster data model (palette, layers, frames, sprite),
//! the compositing and drawing primitives, a bounded undo stack, the binary
//! image exporters (BMP / PNG / GIF / frame sequence), and the .scl project
//! format. Interactive canvas handling and on-screen UI live outside this
//! crate and drive it through the `Sprite` and export APIs.
//!
//! The model is single-threaded by design: no internal locking, all bounds
//! fixed at construction time. Concurrent access (e.g. background autosave
//! against foreground edits) goes through `autosave::Autosave`, which shares
//! a `Mutex<Project>` with the editing thread.

pub mod autosave;
pub mod cli;
pub mod export;
pub mod frame;
pub mod history;
pub mod io;
pub mod layer;
pub mod logger;
pub mod palette;
pub mod project;
pub mod sprite;

pub use frame::Frame;
pub use history::UndoManager;
pub use layer::{Layer, PixelLayer};
pub use palette::Palette;
pub use project::Project;
pub use sprite::{Sprite, SpriteError};
