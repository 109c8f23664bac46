//! Storybook — scene composition.
//!
//! A page of the book is one image target. Its [`SceneController`] wires a
//! recognition gate, a timeline sequencer, a progress accumulator and an
//! idle watchdog together; [`StoryBook`] routes tracker and interaction
//! signals to the right page. Pages are described in YAML and validated
//! when loaded.

pub mod application;
pub mod domain;

pub use application::book::StoryBook;
pub use application::controller::{SceneController, SceneObserver};
pub use domain::config::{BookConfig, CueCatalogue, IdleConfig, PageConfig};
pub use domain::events::{SceneEvent, SceneEventKind};
pub use domain::phase::ScenePhase;
