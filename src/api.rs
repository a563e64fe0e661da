//! The overlay session: one owner for the active layout, switching it
//! between live capture and editing.
//!
//! Listener threads never see the layout. They push into an [`EventQueue`]
//! and the thread that owns the session applies events in [`OverlaySession::pump`].

use crate::config::{Settings, Theme};
use crate::editor::LayoutEditor;
use crate::error::{OverlayError, OverlayResult};
use crate::geometry::Layout;
use crate::input::{CellStateChanged, EventQueue, InputMessage, InputStateEngine, Listener};
use crate::keycodes::{KeyRegistry, Normalizer};
use crate::render::{compose_frame, RenderAdapter};
use crate::store;
use std::path::Path;
use strum_macros::Display;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Capturing,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerStatus {
    Idle,
    Active,
    /// Start failed or permission was withdrawn. No live highlighting until
    /// a listener is started again.
    Inert(String),
}

enum State {
    Capturing {
        layout: Layout,
        engine: InputStateEngine,
    },
    Editing(LayoutEditor),
}

impl State {
    fn layout(&self) -> &Layout {
        match self {
            State::Capturing { layout, .. } => layout,
            State::Editing(editor) => editor.layout(),
        }
    }
}

fn draw<R: RenderAdapter>(state: &State, theme: &Theme, renderer: &mut R) {
    let frame = match state {
        State::Capturing { layout, engine } => compose_frame(layout, theme, |cell| {
            cell.bound_key.as_ref().is_some_and(|k| engine.is_pressed(k))
        }),
        State::Editing(editor) => compose_frame(editor.layout(), theme, |_| false),
    };
    renderer.render(&frame, theme);
}

pub struct OverlaySession<R: RenderAdapter> {
    settings: Settings,
    registry: KeyRegistry,
    normalizer: Normalizer,
    state: State,
    queue: EventQueue,
    listener: Option<Box<dyn Listener>>,
    status: ListenerStatus,
    discarded: u64,
    renderer: R,
}

impl<R: RenderAdapter> OverlaySession<R> {
    /// Starts in capture mode with no listener attached, and draws the
    /// first frame.
    pub fn new(layout: Layout, settings: Settings, renderer: R) -> Self {
        Self::with_registry(layout, settings, KeyRegistry::new_with_defaults(), renderer)
    }

    pub fn with_registry(
        layout: Layout,
        settings: Settings,
        registry: KeyRegistry,
        renderer: R,
    ) -> Self {
        let normalizer = Self::normalizer_for(&registry, &layout);
        let mut session = Self {
            settings,
            registry,
            normalizer,
            state: State::Capturing {
                layout,
                engine: InputStateEngine::new(),
            },
            queue: EventQueue::new(),
            listener: None,
            status: ListenerStatus::Idle,
            discarded: 0,
            renderer,
        };
        session.redraw();
        session
    }

    fn normalizer_for(registry: &KeyRegistry, layout: &Layout) -> Normalizer {
        Normalizer::new(registry.clone(), layout.locale).with_modifiers(layout.modifiers)
    }

    fn state(&self) -> &State {
        &self.state
    }

    fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Moves the state out for a transition, leaving an empty placeholder.
    fn take_state(&mut self) -> State {
        std::mem::replace(
            &mut self.state,
            State::Capturing {
                layout: Layout::new(""),
                engine: InputStateEngine::new(),
            },
        )
    }

    fn redraw(&mut self) {
        draw(&self.state, &self.settings.theme, &mut self.renderer);
    }

    // --- Accessors ---

    pub fn mode(&self) -> Mode {
        match self.state() {
            State::Capturing { .. } => Mode::Capturing,
            State::Editing(_) => Mode::Editing,
        }
    }

    pub fn layout(&self) -> &Layout {
        self.state().layout()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn theme(&self) -> &Theme {
        &self.settings.theme
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn status(&self) -> &ListenerStatus {
        &self.status
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn editor(&self) -> Option<&LayoutEditor> {
        match self.state() {
            State::Editing(editor) => Some(editor),
            State::Capturing { .. } => None,
        }
    }

    pub fn engine(&self) -> Option<&InputStateEngine> {
        match self.state() {
            State::Capturing { engine, .. } => Some(engine),
            State::Editing(_) => None,
        }
    }

    /// Cells lit right now. Always empty while editing.
    pub fn pressed_cells(&self) -> Vec<&str> {
        match self.state() {
            State::Capturing { layout, engine } => engine.highlighted(layout),
            State::Editing(_) => Vec::new(),
        }
    }

    /// Events thrown away because they arrived while editing.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    // --- Listener lifecycle ---

    /// Replaces any running listener. A start failure is logged and
    /// returned here once; the session then stays inert and usable.
    pub fn start_capture(&mut self, mut listener: Box<dyn Listener>) -> OverlayResult<()> {
        self.stop_listener();

        match listener.start(self.queue.sink()) {
            Ok(()) => {
                info!("Input listener '{}' started", listener.name());
                self.listener = Some(listener);
                self.status = ListenerStatus::Active;
                Ok(())
            }
            Err(e) => {
                error!("Could not start input listener '{}': {}", listener.name(), e);
                let reason = match &e {
                    OverlayError::PermissionDenied(r) => r.clone(),
                    other => other.to_string(),
                };
                self.status = ListenerStatus::Inert(reason);
                Err(e)
            }
        }
    }

    /// After this returns no event from the old listener reaches the
    /// engine, and every lit cell has been released.
    pub fn stop_listener(&mut self) -> Vec<CellStateChanged> {
        if let Some(mut listener) = self.listener.take() {
            listener.stop();
            info!("Input listener '{}' stopped", listener.name());
            self.status = ListenerStatus::Idle;
        }
        self.queue.invalidate();
        self.flush_pressed()
    }

    /// Blocks until a finite listener (a replayed script) has delivered
    /// everything it has.
    pub fn wait_for_listener(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener.join();
        }
    }

    fn flush_pressed(&mut self) -> Vec<CellStateChanged> {
        let released = match self.state_mut() {
            State::Capturing { layout, engine } => engine.reset(layout),
            State::Editing(_) => Vec::new(),
        };
        if !released.is_empty() {
            self.redraw();
        }
        released
    }

    // --- Event processing ---

    /// Applies everything queued so far and draws at most one frame.
    /// Returns the cell transitions, in arrival order.
    pub fn pump(&mut self) -> Vec<CellStateChanged> {
        let messages = self.queue.drain();
        if messages.is_empty() {
            return Vec::new();
        }

        if self.mode() == Mode::Editing {
            self.discarded += messages.len() as u64;
            debug!("Discarded {} input messages while editing", messages.len());
            return Vec::new();
        }

        let mut changes = Vec::new();
        let mut revoked = None;
        let State::Capturing { layout, engine } = &mut self.state else {
            return changes;
        };

        for msg in messages {
            match msg {
                InputMessage::Raw(event) => {
                    if let Some(key_event) = self.normalizer.normalize(&event) {
                        changes.extend(engine.on_input(layout, &key_event));
                    }
                }
                InputMessage::FocusLost => {
                    debug!("Focus lost; releasing held keys");
                    changes.extend(engine.reset(layout));
                }
                InputMessage::PermissionRevoked(reason) => {
                    changes.extend(engine.reset(layout));
                    revoked = Some(reason);
                    break;
                }
            }
        }

        if let Some(reason) = revoked {
            error!("Input permission revoked: {}", reason);
            if let Some(mut listener) = self.listener.take() {
                listener.stop();
            }
            self.queue.invalidate();
            self.status = ListenerStatus::Inert(reason);
        }

        if !changes.is_empty() {
            self.redraw();
        }
        changes
    }

    pub fn on_focus_lost(&mut self) -> Vec<CellStateChanged> {
        self.flush_pressed()
    }

    // --- Modes ---

    /// Releases every lit cell and hands the layout to a fresh editor.
    /// Queued input is dropped. No-op when already editing.
    pub fn enter_editing(&mut self) {
        if self.mode() == Mode::Editing {
            return;
        }
        let State::Capturing { layout, mut engine } = self.take_state() else {
            return;
        };
        let released = engine.reset(&layout);
        let stale = self.queue.drain().len();
        self.discarded += stale as u64;

        info!(
            "Entering edit mode ({} cells released, {} events dropped)",
            released.len(),
            stale
        );
        self.state = State::Editing(LayoutEditor::new(layout, self.settings.editor.clone()));
        self.redraw();
    }

    /// Takes the layout back from the editor, dropping its selection, and
    /// resumes live capture with an empty Pressed-Set.
    pub fn enter_capturing(&mut self) {
        if self.mode() == Mode::Capturing {
            return;
        }
        let State::Editing(editor) = self.take_state() else {
            return;
        };
        if editor.is_dirty() {
            warn!("Leaving edit mode with unsaved changes");
        }
        let layout = editor.into_layout();
        self.discarded += self.queue.drain().len() as u64;
        self.normalizer = Self::normalizer_for(&self.registry, &layout);

        info!("Entering capture mode on '{}'", layout.name);
        self.state = State::Capturing {
            layout,
            engine: InputStateEngine::new(),
        };
        self.redraw();
    }

    /// Editor operations, only while editing. The frame is redrawn after a
    /// successful edit.
    pub fn edit<T, F>(&mut self, f: F) -> OverlayResult<T>
    where
        F: FnOnce(&mut LayoutEditor) -> OverlayResult<T>,
    {
        let State::Editing(editor) = self.state_mut() else {
            return Err(OverlayError::WrongMode {
                operation: "edit",
                mode: "capturing",
            });
        };
        let out = f(editor)?;
        self.redraw();
        Ok(out)
    }

    /// Swaps the active layout. In capture mode every lit cell of the old
    /// layout is released first; the returned notifications say which.
    pub fn switch_layout(&mut self, layout: Layout) -> Vec<CellStateChanged> {
        info!("Switching layout to '{}'", layout.name);
        self.normalizer = Self::normalizer_for(&self.registry, &layout);
        let released = match self.state_mut() {
            State::Capturing {
                layout: current,
                engine,
            } => {
                let released = engine.reset(current);
                *current = layout;
                released
            }
            State::Editing(editor) => {
                editor.replace_layout(layout);
                Vec::new()
            }
        };
        self.redraw();
        released
    }

    // --- Settings ---

    /// Rejected settings leave the current ones in place.
    pub fn apply_settings(&mut self, settings: Settings) -> OverlayResult<()> {
        settings.editor.validate()?;
        if let State::Editing(editor) = self.state_mut() {
            editor.set_params(settings.editor.clone())?;
        }
        self.settings = settings;
        self.redraw();
        Ok(())
    }

    /// Leaves the current settings untouched if the file does not load.
    pub fn reload_settings<P: AsRef<Path>>(&mut self, path: P) -> OverlayResult<()> {
        let settings = store::load_settings(path)?;
        self.apply_settings(settings)
    }
}

impl<R: RenderAdapter> Drop for OverlaySession<R> {
    fn drop(&mut self) {
        if let Some(mut listener) = self.listener.take() {
            listener.stop();
        }
    }
}
