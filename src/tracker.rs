//! Tracker context: the current key universe and the codec that reads and
//! writes saves against it.
//!
//! Library callers own a [`Tracker`] and pass it around. The wasm bridge
//! keeps one in a `thread_local!` + `RefCell`, alive for as long as the Web
//! Worker keeps the module loaded.

use std::cell::RefCell;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::link::{self, SaveLink};
use crate::saves::compat::is_append_only;
use crate::saves::{OpenedSet, SaveCodec, SaveFile, SaveFormat};

/// What the map should show after looking at the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveView {
    /// Whether a save was found in the URL.
    pub save_found: bool,
    /// Facts to show as opened. Every known key when no save was found.
    pub opened: OpenedSet,
}

#[derive(Debug, Clone, Default)]
pub struct Tracker {
    codec: SaveCodec,
    /// Sorted, as loaded from `save_keys.json`.
    keys: Vec<String>,
}

impl Tracker {
    pub fn new(format: SaveFormat) -> Self {
        Self {
            codec: SaveCodec::new(format),
            keys: Vec::new(),
        }
    }

    pub fn codec(&self) -> &SaveCodec {
        &self.codec
    }

    pub fn format(&self) -> &SaveFormat {
        self.codec.format()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn set_format(&mut self, format: SaveFormat) {
        self.codec = SaveCodec::new(format);
    }

    /// Replace the key universe. Duplicates are dropped. Warns when the new
    /// universe would shift bit positions of saves made against the old one.
    pub fn load_keys(&mut self, mut keys: Vec<String>) {
        keys.sort_unstable();
        let before = keys.len();
        keys.dedup();
        if keys.len() != before {
            warn!(duplicates = before - keys.len(), "dropped duplicate keys");
        }
        let expected = self.format().expected_key_count;
        if keys.len() != expected {
            warn!(count = keys.len(), expected, "loaded key universe has unexpected size");
        }
        if !self.keys.is_empty() && !is_append_only(&self.keys, &keys) {
            warn!("key universe changed in place, older saves may decode wrongly");
        }
        debug!(count = keys.len(), "key universe loaded");
        self.keys = keys;
    }

    pub fn encode(&self, opened: &OpenedSet) -> Option<String> {
        self.codec.encode(&self.keys, opened)
    }

    pub fn decode(&self, encoded: &str) -> Result<Option<OpenedSet>> {
        self.codec.decode(&self.keys, encoded)
    }

    /// Encode the facts revealed in a game save file.
    pub fn encode_save_file(&self, json: &str) -> Result<Option<String>> {
        let save = SaveFile::from_json(json)?;
        Ok(self.encode(&save.opened_facts()))
    }

    /// Versioned link for `opened`, or `None` when it cannot be encoded.
    pub fn link(&self, opened: &OpenedSet) -> Option<SaveLink> {
        self.encode(opened)
            .map(|token| SaveLink::new(self.format(), token))
    }

    /// Resolve the map state from a location fragment. Without a usable save
    /// every known fact is shown.
    pub fn open_from_url(&self, fragment: &str) -> Result<SaveView> {
        if link::has_save_in_url(fragment, self.format()) {
            if let Some(opened) = link::get_save_from_url(&self.codec, &self.keys, fragment)? {
                return Ok(SaveView {
                    save_found: true,
                    opened,
                });
            }
        }
        Ok(SaveView {
            save_found: false,
            opened: self.keys.iter().cloned().collect(),
        })
    }
}

thread_local! {
    static TRACKER: RefCell<Tracker> = RefCell::new(Tracker::default());
}

/// Execute a closure with read access to the tracker.
pub fn with_tracker<F, R>(f: F) -> R
where
    F: FnOnce(&Tracker) -> R,
{
    TRACKER.with(|t| f(&t.borrow()))
}

/// Execute a closure with mutable access to the tracker.
pub fn with_tracker_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut Tracker) -> R,
{
    TRACKER.with(|t| f(&mut t.borrow_mut()))
}

/// Replace the whole tracker.
pub fn replace_tracker(tracker: Tracker) {
    TRACKER.with(|t| {
        *t.borrow_mut() = tracker;
    });
}
