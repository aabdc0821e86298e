use egui::{Context, PointerButton, Pos2, Rect};

/// Keyboard modifier keys held during an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Command on macOS, Windows/Super elsewhere
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Ctrl or Cmd, the platform shortcut modifier
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

impl From<egui::Modifiers> for Modifiers {
    fn from(m: egui::Modifiers) -> Self {
        Self {
            shift: m.shift,
            ctrl: m.ctrl,
            alt: m.alt,
            meta: m.mac_cmd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

impl Button {
    fn from_egui(button: PointerButton) -> Option<Self> {
        match button {
            PointerButton::Primary => Some(Button::Primary),
            PointerButton::Middle => Some(Button::Middle),
            PointerButton::Secondary => Some(Button::Secondary),
            _ => None,
        }
    }
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// A letter key, lowercase
    Char(char),
}

impl Key {
    fn from_egui(key: egui::Key) -> Option<Self> {
        Some(match key {
            egui::Key::Delete => Key::Delete,
            egui::Key::Backspace => Key::Backspace,
            egui::Key::Escape => Key::Escape,
            egui::Key::ArrowUp => Key::ArrowUp,
            egui::Key::ArrowDown => Key::ArrowDown,
            egui::Key::ArrowLeft => Key::ArrowLeft,
            egui::Key::ArrowRight => Key::ArrowRight,
            other => {
                let name = other.name();
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => Key::Char(c.to_ascii_lowercase()),
                    _ => return None,
                }
            }
        })
    }
}

/// A pointer event in canvas pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pos: Pos2,
    pub button: Button,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn primary(pos: Pos2) -> Self {
        Self {
            pos,
            button: Button::Primary,
            modifiers: Modifiers::NONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// A text field has keyboard focus; editor shortcuts must not fire
    pub text_input_focused: bool,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            text_input_focused: false,
        }
    }
}

/// Input events in canvas space, produced from raw egui input
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    /// Pointer left the canvas or the window; ends any gesture
    PointerLeave,
    DoubleClick(PointerEvent),
    Key(KeyEvent),
}

/// Handles converting raw egui input into canvas-space [`InputEvent`]s
#[derive(Debug, Clone)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    pointer_over_canvas: bool,
    /// Screen rect the canvas is painted into
    canvas_rect: Option<Rect>,
    /// Screen pixels per canvas pixel
    canvas_scale: f32,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            last_pointer_pos: None,
            pointer_over_canvas: false,
            canvas_rect: None,
            canvas_scale: 1.0,
        }
    }

    /// Update where the canvas sits on screen and how it is scaled
    pub fn set_canvas_transform(&mut self, rect: Rect, scale: f32) {
        self.canvas_rect = Some(rect);
        self.canvas_scale = if scale > 0.0 { scale } else { 1.0 };
    }

    pub fn to_canvas(&self, screen: Pos2) -> Pos2 {
        let origin = self.canvas_rect.map_or(Pos2::ZERO, |r| r.min);
        Pos2::ZERO + (screen - origin) / self.canvas_scale
    }

    pub fn to_screen(&self, canvas: Pos2) -> Pos2 {
        let origin = self.canvas_rect.map_or(Pos2::ZERO, |r| r.min);
        origin + canvas.to_vec2() * self.canvas_scale
    }

    pub fn canvas_scale(&self) -> f32 {
        self.canvas_scale
    }

    fn over_canvas(&self, screen: Pos2) -> bool {
        self.canvas_rect.is_some_and(|r| r.contains(screen))
    }

    /// Follow the hover position from one frame to the next.
    ///
    /// Crossing out of the canvas, or out of the window, yields a
    /// [`InputEvent::PointerLeave`] instead of a move.
    pub fn track_pointer(&mut self, hover: Option<Pos2>, modifiers: Modifiers) -> Option<InputEvent> {
        let was_over = self.pointer_over_canvas;
        let last = self.last_pointer_pos;
        self.pointer_over_canvas = hover.is_some_and(|pos| self.over_canvas(pos));
        self.last_pointer_pos = hover;

        match hover {
            None if last.is_some() => Some(InputEvent::PointerLeave),
            Some(_) if was_over && !self.pointer_over_canvas => Some(InputEvent::PointerLeave),
            Some(pos) if Some(pos) != last => Some(InputEvent::PointerMove(PointerEvent {
                pos: self.to_canvas(pos),
                button: Button::Primary,
                modifiers,
            })),
            _ => None,
        }
    }

    /// Process raw egui input for this frame.
    ///
    /// Pointer-downs and double-clicks are only reported over the canvas.
    /// Leaving the canvas ends the gesture; moves and releases outside it
    /// are still reported.
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let text_input_focused = ctx.wants_keyboard_input();
        let mut events = Vec::new();

        ctx.input(|input| {
            let modifiers = Modifiers::from(input.modifiers);
            let hover = input.pointer.hover_pos();

            events.extend(self.track_pointer(hover, modifiers));

            if let Some(pos) = hover {
                for egui_button in [PointerButton::Primary, PointerButton::Secondary, PointerButton::Middle] {
                    let Some(button) = Button::from_egui(egui_button) else {
                        continue;
                    };
                    let event = PointerEvent {
                        pos: self.to_canvas(pos),
                        button,
                        modifiers,
                    };
                    if input.pointer.button_pressed(egui_button) && self.over_canvas(pos) {
                        events.push(InputEvent::PointerDown(event));
                    }
                    if input.pointer.button_released(egui_button) {
                        events.push(InputEvent::PointerUp(event));
                    }
                }
                if input.pointer.button_double_clicked(PointerButton::Primary) && self.over_canvas(pos) {
                    events.push(InputEvent::DoubleClick(PointerEvent {
                        pos: self.to_canvas(pos),
                        button: Button::Primary,
                        modifiers,
                    }));
                }
            }

            for event in &input.events {
                if let egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } = event
                {
                    if let Some(key) = Key::from_egui(*key) {
                        events.push(InputEvent::Key(KeyEvent {
                            key,
                            modifiers: Modifiers::from(*modifiers),
                            text_input_focused,
                        }));
                    }
                }
            }
        });

        events
    }
}
