//! Interactive label placement driven by pointer and key events.
//!
//! A [`LabelSession`] borrows a contour set for the length of the session
//! and consumes events from any iterator. Reading from an
//! `mpsc::Receiver` blocks the caller until the next event, which makes
//! the event stream the session's only suspension point.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::contour_set::ContourSet;
use crate::error::ContourResult;
use crate::geometry::Point;
use crate::labeler::Coordinates;

/// Pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Back,
    Forward,
}

/// A pointer or keyboard event at a screen position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    ButtonPress { button: MouseButton, x: f64, y: f64 },
    /// `key` is None for keys the backend could not name.
    KeyPress { key: Option<String>, x: f64, y: f64 },
}

impl InputEvent {
    pub fn position(&self) -> Point {
        match *self {
            InputEvent::ButtonPress { x, y, .. } | InputEvent::KeyPress { x, y, .. } => {
                Point::new(x, y)
            }
        }
    }
}

/// What a session does with one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Add,
    Remove,
    Stop,
    Ignore,
}

impl SessionAction {
    /// Middle click, escape and enter stop; right click, backspace and
    /// delete remove; left click and any other named key add.
    pub fn for_event(event: &InputEvent) -> Self {
        match event {
            InputEvent::ButtonPress { button, .. } => match button {
                MouseButton::Middle => SessionAction::Stop,
                MouseButton::Right => SessionAction::Remove,
                MouseButton::Left => SessionAction::Add,
                MouseButton::Back | MouseButton::Forward => SessionAction::Ignore,
            },
            InputEvent::KeyPress { key, .. } => match key.as_deref() {
                Some("escape") | Some("enter") => SessionAction::Stop,
                Some("backspace") | Some("delete") => SessionAction::Remove,
                Some(_) => SessionAction::Add,
                None => SessionAction::Ignore,
            },
        }
    }
}

/// Whether a session keeps reading events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionControl {
    Continue,
    Stop,
}

/// An interactive labeling session over a labeled contour set
pub struct LabelSession<'a> {
    set: &'a mut ContourSet,
    inline: bool,
    inline_spacing: f64,
    on_change: Option<Box<dyn FnMut(&ContourSet) + 'a>>,
}

impl<'a> LabelSession<'a> {
    /// Start a session. The set must have been configured by a labeling call.
    pub fn new(set: &'a mut ContourSet, inline: bool, inline_spacing: f64) -> Self {
        Self {
            set,
            inline,
            inline_spacing,
            on_change: None,
        }
    }

    /// Run `hook` after every added or removed label, e.g. to redraw.
    pub fn on_change<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&ContourSet) + 'a,
    {
        self.on_change = Some(Box::new(hook));
        self
    }

    /// Dispatch one event.
    pub fn handle(&mut self, event: &InputEvent) -> ContourResult<SessionControl> {
        match SessionAction::for_event(event) {
            SessionAction::Stop => return Ok(SessionControl::Stop),
            SessionAction::Remove => {
                // Inline labels have already cut their contours
                if !self.inline && !self.set.label_records().is_empty() {
                    self.set.pop_label(-1)?;
                    self.changed();
                }
            }
            SessionAction::Add => {
                let p = event.position();
                if self.set.transform().contains_screen(p) {
                    self.set.add_label_near(
                        p.x,
                        p.y,
                        self.inline,
                        self.inline_spacing,
                        Coordinates::Screen,
                    )?;
                    self.changed();
                }
            }
            SessionAction::Ignore => {}
        }
        Ok(SessionControl::Continue)
    }

    /// Consume events until a stop event or the end of the stream.
    ///
    /// Returns the number of labels the set holds afterwards.
    pub fn run<I>(mut self, events: I) -> ContourResult<usize>
    where
        I: IntoIterator<Item = InputEvent>,
    {
        info!("Select label locations; middle click, escape or enter to finish");
        for event in events {
            debug!(?event, "Label session event");
            if self.handle(&event)? == SessionControl::Stop {
                break;
            }
        }
        Ok(self.set.label_records().len())
    }

    fn changed(&mut self) {
        if let Some(hook) = self.on_change.as_mut() {
            hook(&*self.set);
        }
    }
}
