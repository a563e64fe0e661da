use super::queue::{EventSink, InputMessage};
use crate::error::{OverlayError, OverlayResult};
use crate::keycodes::{Action, MouseButton, RawEvent, RawInput};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// A global input source. Implementations deliver raw events from their own
/// thread or callback context through the sink and never touch a layout.
pub trait Listener: Send {
    /// Fails fast with `PermissionDenied` when the OS refuses input
    /// monitoring.
    fn start(&mut self, sink: EventSink) -> OverlayResult<()>;

    /// Must not return while a delivery is still in flight.
    fn stop(&mut self);

    /// Blocks until a finite source has delivered everything.
    fn join(&mut self) {}

    fn name(&self) -> &str;
}

// --- Script parsing ---

fn parse_input(token: &str) -> OverlayResult<RawInput> {
    if let Some(code) = token.strip_prefix("scan:") {
        let code = code
            .parse()
            .map_err(|_| OverlayError::Invalid(format!("bad scan code '{}'", code)))?;
        return Ok(RawInput::Scan(code));
    }
    if let Some(name) = token.strip_prefix("mouse:") {
        return MouseButton::from_name(name)
            .map(RawInput::Mouse)
            .ok_or_else(|| OverlayError::Invalid(format!("unknown mouse button '{}'", name)));
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(RawInput::Char(c)),
        _ => Ok(RawInput::Named(token.to_string())),
    }
}

/// Parses an input script, one message per line:
///
/// ```text
/// # comment
/// down w
/// down shift_r
/// up scan:17
/// down mouse:left
/// focus-lost
/// revoke accessibility disabled
/// ```
///
/// A key token is a single character, `scan:<code>`, `mouse:<button>`, or a
/// key name.
pub fn parse_script(text: &str) -> OverlayResult<Vec<InputMessage>> {
    let mut messages = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((v, r)) => (v, r.trim()),
            None => (line, ""),
        };

        let message = match verb.to_ascii_lowercase().as_str() {
            "focus-lost" => InputMessage::FocusLost,
            "revoke" => InputMessage::PermissionRevoked(rest.to_string()),
            other => {
                let action: Action = other.parse().map_err(|_| {
                    OverlayError::Invalid(format!("line {}: unknown verb '{}'", lineno + 1, verb))
                })?;
                if rest.is_empty() {
                    return Err(OverlayError::Invalid(format!(
                        "line {}: missing key after '{}'",
                        lineno + 1,
                        verb
                    )));
                }
                InputMessage::Raw(RawEvent::new(parse_input(rest)?, action))
            }
        };
        messages.push(message);
    }
    Ok(messages)
}

// --- Scripted listener ---

/// Replays a fixed message list from a background thread.
pub struct ScriptedListener {
    messages: Arc<Vec<InputMessage>>,
    denied: Option<String>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<usize>>,
}

impl ScriptedListener {
    pub fn new(messages: Vec<InputMessage>) -> Self {
        Self {
            messages: Arc::new(messages),
            denied: None,
            cancel: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn from_script(text: &str) -> OverlayResult<Self> {
        parse_script(text).map(Self::new)
    }

    /// A listener whose `start` always fails, as on a host without the
    /// input-monitoring permission.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            denied: Some(reason.into()),
            ..Self::new(Vec::new())
        }
    }
}

impl Listener for ScriptedListener {
    fn start(&mut self, sink: EventSink) -> OverlayResult<()> {
        if let Some(reason) = &self.denied {
            return Err(OverlayError::PermissionDenied(reason.clone()));
        }
        self.stop();
        self.cancel.store(false, Ordering::Release);

        let messages = Arc::clone(&self.messages);
        let cancel = Arc::clone(&self.cancel);
        debug!("Starting scripted listener ({} messages)", messages.len());

        self.handle = Some(thread::spawn(move || {
            let mut delivered = 0;
            for msg in messages.iter() {
                if cancel.load(Ordering::Acquire) || !sink.send(msg.clone()) {
                    break;
                }
                delivered += 1;
            }
            delivered
        }));
        Ok(())
    }

    fn stop(&mut self) {
        self.cancel.store(true, Ordering::Release);
        self.join();
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(n) => debug!("Scripted listener finished after {} messages", n),
                Err(_) => warn!("Scripted listener thread panicked"),
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// --- Manual listener ---

/// A listener driven by hand through a [`ManualHandle`], standing in for a
/// platform callback.
pub struct ManualListener {
    slot: Arc<Mutex<Option<EventSink>>>,
}

#[derive(Clone)]
pub struct ManualHandle {
    slot: Arc<Mutex<Option<EventSink>>>,
}

impl ManualListener {
    pub fn pair() -> (Self, ManualHandle) {
        let slot = Arc::new(Mutex::new(None));
        (
            Self {
                slot: Arc::clone(&slot),
            },
            ManualHandle { slot },
        )
    }
}

impl ManualHandle {
    /// False when the listener is stopped or the session discarded it.
    pub fn send(&self, message: InputMessage) -> bool {
        match self.slot.lock() {
            Ok(guard) => guard.as_ref().is_some_and(|sink| sink.send(message)),
            Err(_) => false,
        }
    }

    pub fn press(&self, input: RawInput) -> bool {
        self.send(InputMessage::Raw(RawEvent::press(input)))
    }

    pub fn release(&self, input: RawInput) -> bool {
        self.send(InputMessage::Raw(RawEvent::release(input)))
    }
}

impl Listener for ManualListener {
    fn start(&mut self, sink: EventSink) -> OverlayResult<()> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| OverlayError::Invalid("listener state poisoned".to_string()))?;
        *guard = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        // Taking the lock waits out any send in progress.
        if let Ok(mut guard) = self.slot.lock() {
            *guard = None;
        }
    }

    fn name(&self) -> &str {
        "manual"
    }
}
