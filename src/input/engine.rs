use crate::geometry::Layout;
use crate::keycodes::{Action, KeyEvent, KeyId};
use std::collections::HashMap;
use tracing::debug;

/// Emitted whenever a bound cell flips between idle and pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellStateChanged {
    pub cell_id: String,
    pub pressed: bool,
}

impl CellStateChanged {
    fn new(cell_id: &str, pressed: bool) -> Self {
        Self {
            cell_id: cell_id.to_string(),
            pressed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub events: u64,
    pub emitted: u64,
    pub repeats_suppressed: u64,
    pub unbound: u64,
}

/// Owns the Pressed-Set. Every method takes the active layout by reference;
/// the engine itself never holds on to one.
///
/// The set is keyed on physical keys. A collapsed modifier stays lit until
/// every physical key behind it is released.
#[derive(Debug, Default)]
pub struct InputStateEngine {
    pressed: HashMap<KeyId, KeyId>,
    held: HashMap<KeyId, usize>,
    stats: EngineStats,
}

impl InputStateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a normalized event from the listener.
    pub fn on_input(&mut self, layout: &Layout, event: &KeyEvent) -> Option<CellStateChanged> {
        self.apply(layout, &event.source, &event.key, event.action)
    }

    /// Applies an event for a key that is its own physical source.
    /// Auto-repeat presses and releases of keys that are not held are
    /// no-ops and return `None`.
    pub fn on_event(
        &mut self,
        layout: &Layout,
        key: &KeyId,
        action: Action,
    ) -> Option<CellStateChanged> {
        self.apply(layout, key, key, action)
    }

    fn apply(
        &mut self,
        layout: &Layout,
        source: &KeyId,
        key: &KeyId,
        action: Action,
    ) -> Option<CellStateChanged> {
        self.stats.events += 1;

        let key = match action {
            Action::Pressed => {
                if self.pressed.contains_key(source) {
                    self.stats.repeats_suppressed += 1;
                    return None;
                }
                self.pressed.insert(source.clone(), key.clone());
                let count = self.held.entry(key.clone()).or_insert(0);
                *count += 1;
                if *count > 1 {
                    debug!("{} already held through another source", key);
                    return None;
                }
                key.clone()
            }
            Action::Released => {
                // Released under the id it was pressed as.
                let key = self.pressed.remove(source)?;
                let count = self.held.get_mut(&key)?;
                *count -= 1;
                if *count > 0 {
                    return None;
                }
                self.held.remove(&key);
                key
            }
        };

        match layout.cell_for_key(&key) {
            Some(cell) => {
                self.stats.emitted += 1;
                Some(CellStateChanged::new(&cell.id, action == Action::Pressed))
            }
            None => {
                self.stats.unbound += 1;
                None
            }
        }
    }

    /// Whether any source holding the bound id `key` is down.
    pub fn is_pressed(&self, key: &KeyId) -> bool {
        self.held.contains_key(key)
    }

    /// Number of physical keys held.
    pub fn pressed_count(&self) -> usize {
        self.pressed.len()
    }

    /// Ids of the cells in `layout` currently lit, in z-order.
    pub fn highlighted<'a>(&self, layout: &'a Layout) -> Vec<&'a str> {
        layout
            .cells()
            .iter()
            .filter(|c| c.bound_key.as_ref().is_some_and(|k| self.held.contains_key(k)))
            .map(|c| c.id.as_str())
            .collect()
    }

    /// Empties the Pressed-Set, returning a release for every cell of
    /// `layout` that was lit. Used on layout switch, listener stop and
    /// focus loss.
    pub fn reset(&mut self, layout: &Layout) -> Vec<CellStateChanged> {
        let releases: Vec<CellStateChanged> = self
            .highlighted(layout)
            .into_iter()
            .map(|id| CellStateChanged::new(id, false))
            .collect();
        if !self.pressed.is_empty() {
            debug!(
                "Pressed-set cleared ({} keys, {} cells released)",
                self.pressed.len(),
                releases.len()
            );
        }
        self.pressed.clear();
        self.held.clear();
        self.stats.emitted += releases.len() as u64;
        releases
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}
