use crate::{*, common_ui::*, draw::*, input::*};

// Input source driven by code: tests and the demo's headless mode script pointer, touch, and key events tick by tick.
// Call next_tick() between frames; it ages held buttons and clears per-tick input (typed text, wheel).
#[derive(Clone, Debug)]
pub struct ScriptedInput {
    cursor: [isize; 2],
    // Ticks the mouse button has been held; 0 = released.
    mouse_ticks: usize,
    touches: Vec<(TouchId, [isize; 2], usize)>,
    keys: Vec<(Key, usize)>,
    typed: String,
    wheel: [f64; 2],
    ticks_per_second: usize,
}

impl ScriptedInput {
    pub fn new() -> Self { Self {cursor: [0, 0], mouse_ticks: 0, touches: Vec::new(), keys: Vec::new(), typed: String::new(), wheel: [0.0, 0.0], ticks_per_second: 60} }

    pub fn set_tps(&mut self, tps: usize) { self.ticks_per_second = tps; }

    pub fn move_cursor(&mut self, pos: [isize; 2]) { self.cursor = pos; }

    // No-op if already held.
    pub fn press(&mut self) {
        if self.mouse_ticks == 0 {
            self.mouse_ticks = 1;
        }
    }
    pub fn release(&mut self) { self.mouse_ticks = 0; }

    pub fn press_at(&mut self, pos: [isize; 2]) {
        self.move_cursor(pos);
        self.press();
    }

    pub fn touch_start(&mut self, id: TouchId, pos: [isize; 2]) {
        self.touch_end(id);
        self.touches.push((id, pos, 1));
    }
    pub fn touch_move(&mut self, id: TouchId, pos: [isize; 2]) {
        if let Some(t) = self.touches.iter_mut().find(|t| t.0 == id) {
            t.1 = pos;
        }
    }
    pub fn touch_end(&mut self, id: TouchId) { self.touches.retain(|t| t.0 != id); }

    pub fn press_key(&mut self, key: Key) {
        if !self.keys.iter().any(|k| k.0 == key) {
            self.keys.push((key, 1));
        }
    }
    pub fn release_key(&mut self, key: Key) { self.keys.retain(|k| k.0 != key); }

    pub fn type_text(&mut self, s: &str) { self.typed.push_str(s); }

    pub fn scroll(&mut self, wheel: [f64; 2]) { self.wheel = wheel; }

    pub fn next_tick(&mut self) {
        if self.mouse_ticks > 0 {
            self.mouse_ticks += 1;
        }
        for t in &mut self.touches {
            t.2 += 1;
        }
        for k in &mut self.keys {
            k.1 += 1;
        }
        self.typed.clear();
        self.wheel = [0.0, 0.0];
    }
}

impl Default for ScriptedInput {
    fn default() -> Self { Self::new() }
}

impl InputSource for ScriptedInput {
    fn cursor_position(&self) -> [isize; 2] { self.cursor }
    fn is_mouse_pressed(&self) -> bool { self.mouse_ticks > 0 }
    fn is_mouse_just_pressed(&self) -> bool { self.mouse_ticks == 1 }

    fn append_touch_ids(&self, out: &mut Vec<TouchId>) { out.extend(self.touches.iter().map(|t| t.0)); }
    fn append_just_pressed_touch_ids(&self, out: &mut Vec<TouchId>) { out.extend(self.touches.iter().filter(|t| t.2 == 1).map(|t| t.0)); }
    fn touch_position(&self, id: TouchId) -> [isize; 2] { self.touches.iter().find(|t| t.0 == id).map_or([0, 0], |t| t.1) }

    fn wheel(&self) -> [f64; 2] { self.wheel }

    fn key_press_duration(&self, key: Key) -> usize { self.keys.iter().find(|k| k.0 == key).map_or(0, |k| k.1) }

    fn append_typed_text(&self, out: &mut String) { out.push_str(&self.typed); }

    fn ticks_per_second(&self) -> usize { self.ticks_per_second }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Clip(Rect),
    Rect(Rect, Color),
    Text {text: String, pos: [isize; 2], scale: usize, color: Color},
    Image {size: [usize; 2], pos: [isize; 2], scale: usize, color: Color},
}

// Backend that records what would be drawn.
#[derive(Clone, Debug)]
pub struct RecordingBackend {
    pub size: [usize; 2],
    pub calls: Vec<DrawCall>,
}

impl RecordingBackend {
    pub fn new(size: [usize; 2]) -> Self { Self {size, calls: Vec::new()} }

    pub fn clear(&mut self) { self.calls.clear(); }

    pub fn texts(&self) -> Vec<&str> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Text {text, ..} => Some(text.as_str()),
            _ => None,
        }).collect()
    }

    pub fn count_rects(&self) -> usize { self.calls.iter().filter(|c| matches!(c, DrawCall::Rect(..))).count() }
}

impl DrawBackend for RecordingBackend {
    fn size(&self) -> [usize; 2] { self.size }
    fn fill_rect(&mut self, rect: Rect, color: Color) { self.calls.push(DrawCall::Rect(rect, color)); }
    fn draw_text(&mut self, text: &str, pos: [isize; 2], scale: usize, color: Color) { self.calls.push(DrawCall::Text {text: text.to_string(), pos, scale, color}); }
    fn draw_image(&mut self, image: &IconImage, pos: [isize; 2], scale: usize, color: Color) { self.calls.push(DrawCall::Image {size: [image.width, image.height], pos, scale, color}); }
    fn set_clip(&mut self, rect: Rect) { self.calls.push(DrawCall::Clip(rect)); }
}
