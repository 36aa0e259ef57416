
// Keys the UI (and the demo game) care about. Text input arrives separately, as typed characters.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Key {
    Shift,
    Enter,
    Backspace,
    Escape,
    Space,
    Up,
    Down,
    Left,
    Right,
}
impl Key {
    pub const ALL: [Key; 9] = [Key::Shift, Key::Enter, Key::Backspace, Key::Escape, Key::Space, Key::Up, Key::Down, Key::Left, Key::Right];
    pub const COUNT: usize = Self::ALL.len();
}

pub type TouchId = u64;

// Raw input state for the current tick, polled from whatever windowing/game library hosts the UI.
pub trait InputSource {
    fn cursor_position(&self) -> [isize; 2];
    fn is_mouse_pressed(&self) -> bool;
    fn is_mouse_just_pressed(&self) -> bool;

    // Currently active touches.
    fn append_touch_ids(&self, out: &mut Vec<TouchId>);
    // Touches that started this tick.
    fn append_just_pressed_touch_ids(&self, out: &mut Vec<TouchId>);
    fn touch_position(&self, id: TouchId) -> [isize; 2];

    fn wheel(&self) -> [f64; 2];

    // Number of ticks the key has been held, including this one. 0 if not pressed, 1 on the tick it was pressed.
    fn key_press_duration(&self, key: Key) -> usize;

    // Characters typed this tick.
    fn append_typed_text(&self, out: &mut String);

    fn ticks_per_second(&self) -> usize { 60 }
}

// Auto-repeat cadence shared by held pointer buttons and held keys: fires on the first tick, then after an initial delay of 0.4s, every 4 ticks.
pub fn repeated(duration: usize, ticks_per_second: usize) -> bool {
    if duration == 1 {
        return true;
    }
    let delay = ticks_per_second * 24 / 60;
    if duration < delay {
        return false;
    }
    (duration - delay) % 4 == 0
}

// Mouse or single touch, whichever is active. The first touch is pinned as primary until it's released, so a second finger doesn't steal the pointer.
#[derive(Default, Clone, Debug)]
pub struct Pointing {
    touch_ids: Vec<TouchId>,
    just_pressed_touch_ids: Vec<TouchId>,
    primary_touch_id: Option<TouchId>,
    touch_pos: [isize; 2],
    cursor_pos: [isize; 2],
    mouse_pressed: bool,
    mouse_just_pressed: bool,
    duration: usize,
}
impl Pointing {
    pub fn update(&mut self, src: &dyn InputSource) {
        self.just_pressed_touch_ids.clear();
        src.append_just_pressed_touch_ids(&mut self.just_pressed_touch_ids);
        self.touch_ids.clear();
        src.append_touch_ids(&mut self.touch_ids);

        if self.touch_ids.is_empty() {
            self.primary_touch_id = None;
        } else if self.primary_touch_id.is_none() {
            self.primary_touch_id = Some(self.touch_ids[0]);
        }
        self.touch_pos = match self.primary_touch_id {
            Some(t) if self.touch_ids.contains(&t) => src.touch_position(t),
            _ => [0, 0],
        };
        self.cursor_pos = src.cursor_position();
        self.mouse_pressed = src.is_mouse_pressed();
        self.mouse_just_pressed = src.is_mouse_just_pressed();

        if self.pressed() {
            self.duration += 1;
        } else {
            self.duration = 0;
        }
    }

    pub fn is_touch_active(&self) -> bool {
        match self.primary_touch_id {
            Some(t) => self.touch_ids.contains(&t),
            None => false,
        }
    }

    pub fn position(&self) -> [isize; 2] { if self.is_touch_active() { self.touch_pos } else { self.cursor_pos } }

    pub fn pressed(&self) -> bool { self.is_touch_active() || self.mouse_pressed }

    pub fn just_pressed(&self) -> bool {
        match self.primary_touch_id {
            Some(t) if self.is_touch_active() => self.just_pressed_touch_ids.contains(&t),
            _ => self.mouse_just_pressed,
        }
    }

    // Ticks the pointer has been held.
    pub fn duration(&self) -> usize { self.duration }
}

// Everything the UI reads from the input source during one frame, copied at the start of `update` so that widgets don't need to borrow the source.
#[derive(Default, Clone, Debug)]
pub struct InputState {
    pub pointing: Pointing,
    pub key_durations: [usize; Key::COUNT],
    pub typed: String,
    pub wheel: [f64; 2],
    pub ticks_per_second: usize,
}
impl InputState {
    pub fn update(&mut self, src: &dyn InputSource) {
        self.pointing.update(src);
        for (i, k) in Key::ALL.iter().enumerate() {
            self.key_durations[i] = src.key_press_duration(*k);
        }
        self.typed.clear();
        src.append_typed_text(&mut self.typed);
        self.wheel = src.wheel();
        self.ticks_per_second = src.ticks_per_second().max(1);
    }

    pub fn key_duration(&self, key: Key) -> usize {
        Key::ALL.iter().position(|k| *k == key).map_or(0, |i| self.key_durations[i])
    }
    pub fn key_pressed(&self, key: Key) -> bool { self.key_duration(key) > 0 }
    pub fn key_just_pressed(&self, key: Key) -> bool { self.key_duration(key) == 1 }
    pub fn key_repeated(&self, key: Key) -> bool { repeated(self.key_duration(key), self.ticks_per_second) }
    pub fn pointing_repeated(&self) -> bool { repeated(self.pointing.duration(), self.ticks_per_second) }
}
