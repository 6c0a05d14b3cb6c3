use eframe::egui::{self, Rect, Ui};

use crate::interaction::{InputEvent, Key, PointerButton};

use super::super::GrafatkoApp;
use super::super::render_utils::to_canvas;

/// One wheel notch turns by 15 degrees; egui reports roughly 40 points per notch.
const WHEEL_RADIANS_PER_POINT: f64 = std::f64::consts::PI / 12.0 / 40.0;

fn canvas_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

fn canvas_key(key: egui::Key) -> Option<Key> {
    match key {
        egui::Key::Space => Some(Key::Center),
        egui::Key::R => Some(Key::ToggleRoot),
        egui::Key::Delete => Some(Key::Delete),
        _ => None,
    }
}

/// Emits a key event when a modifier changed since the previous frame.
fn modifier_edge(events: &mut Vec<InputEvent>, held: &mut bool, now: bool, key: Key) {
    if *held == now {
        return;
    }

    *held = now;
    events.push(if now {
        InputEvent::KeyDown(key)
    } else {
        InputEvent::KeyUp(key)
    });
}

impl GrafatkoApp {
    /// Translates this frame's egui input into canvas events.
    pub(in crate::app) fn handle_canvas_input(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        let keyboard_free = !ui.ctx().wants_keyboard_input();
        let hovered = response.hovered();
        let tracker = &mut self.input;
        let mut events = Vec::new();

        ui.input(|input| {
            if let Some(pointer) = input.pointer.latest_pos()
                && tracker.pointer != Some(pointer)
            {
                tracker.pointer = Some(pointer);
                events.push(InputEvent::PointerMoved(to_canvas(rect, pointer)));
            }

            modifier_edge(&mut events, &mut tracker.group, input.modifiers.shift, Key::Group);
            modifier_edge(&mut events, &mut tracker.rotate, input.modifiers.alt, Key::Rotate);

            for event in &input.events {
                match event {
                    egui::Event::PointerButton {
                        pos,
                        button,
                        pressed,
                        ..
                    } => {
                        let Some(button) = canvas_button(*button) else {
                            continue;
                        };
                        if !*pressed {
                            events.push(InputEvent::Released(button));
                        } else if rect.contains(*pos) && hovered {
                            events.push(InputEvent::Pressed(button));
                        }
                    }
                    egui::Event::Key {
                        key: pressed_key,
                        pressed,
                        repeat,
                        ..
                    } if keyboard_free && !*repeat => {
                        let Some(key) = canvas_key(*pressed_key) else {
                            continue;
                        };
                        if key == Key::Center {
                            tracker.center = *pressed;
                        }
                        events.push(if *pressed {
                            InputEvent::KeyDown(key)
                        } else {
                            InputEvent::KeyUp(key)
                        });
                    }
                    _ => {}
                }
            }

            if !keyboard_free && tracker.center {
                tracker.center = false;
                events.push(InputEvent::KeyUp(Key::Center));
            }

            let scroll = input.raw_scroll_delta;
            let amount = f64::from(scroll.x + scroll.y);
            if hovered && amount != 0.0 {
                events.push(InputEvent::Wheel(amount * WHEEL_RADIANS_PER_POINT));
            }
        });

        for event in events {
            self.canvas.handle(event);
        }
    }
}
