//! Multi-page routing.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use storybook_core::clock::Clock;
use storybook_core::outbox::EventOutbox;
use storybook_core::signal::{InteractionSignal, RecognitionEvent};
use storybook_core::stage::Stage;
use tracing::debug;

use super::controller::{SceneController, SceneObserver};
use crate::domain::config::BookConfig;
use crate::domain::events::SceneEvent;

/// A book of independent pages, keyed by image target.
#[derive(Debug, Default)]
pub struct StoryBook {
    pages: BTreeMap<String, SceneController>,
}

impl StoryBook {
    /// Builds one controller per page. Every page issues its commands to
    /// the same stage.
    #[must_use]
    pub fn new(book: &BookConfig, stage: &Stage, clock: &Arc<dyn Clock>) -> Self {
        let pages = book
            .pages
            .iter()
            .map(|page| {
                (
                    page.target_id.clone(),
                    SceneController::new(page.clone(), stage.clone(), Arc::clone(clock)),
                )
            })
            .collect();
        Self { pages }
    }

    /// Registers an observer on every page.
    pub fn subscribe(&mut self, observer: &Arc<dyn SceneObserver>) {
        for page in self.pages.values_mut() {
            page.subscribe(Arc::clone(observer));
        }
    }

    /// Routes a tracker status change to the page for its target.
    pub fn on_recognition(&mut self, event: &RecognitionEvent) {
        match self.pages.get_mut(&event.target_id) {
            Some(page) => page.on_recognition(event),
            None => debug!(target_id = %event.target_id, "no page for target"),
        }
    }

    /// Routes an interaction to a page. Returns `true` if it counted.
    pub fn on_interaction(&mut self, target_id: &str, signal: &InteractionSignal) -> bool {
        match self.pages.get_mut(target_id) {
            Some(page) => page.on_interaction(signal),
            None => {
                debug!(target_id, "interaction for unknown page");
                false
            }
        }
    }

    /// Ticks every page, in target id order.
    pub fn tick(&mut self, delta: Duration) {
        for page in self.pages.values_mut() {
            page.tick(delta);
        }
    }

    /// Returns one page's controller.
    #[must_use]
    pub fn page(&self, target_id: &str) -> Option<&SceneController> {
        self.pages.get(target_id)
    }

    /// Returns a page's controller for direct calls such as
    /// [`SceneController::start_intro`].
    pub fn page_mut(&mut self, target_id: &str) -> Option<&mut SceneController> {
        self.pages.get_mut(target_id)
    }

    /// Iterates over the pages whose targets are currently recognized.
    pub fn active_pages(&self) -> impl Iterator<Item = &SceneController> {
        self.pages.values().filter(|page| page.phase().is_active())
    }

    /// Collects pending events from every page, page by page.
    pub fn take_pending_events(&mut self) -> Vec<SceneEvent> {
        self.pages
            .values_mut()
            .flat_map(|page| page.take_pending_events())
            .collect()
    }
}
