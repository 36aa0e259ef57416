use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

// Axis index into `pos`/`size` arrays.
pub const X: usize = 0;
pub const Y: usize = 1;

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, Hash)]
pub struct Rect {
    pub pos: [isize; 2],
    pub size: [usize; 2],
}
impl Rect {
    pub fn new(x: isize, y: isize, w: usize, h: usize) -> Self { Self {pos: [x, y], size: [w, h]} }
    // From corners; inverted corners produce an empty rect.
    pub fn from_corners(min: [isize; 2], max: [isize; 2]) -> Self { Self {pos: min, size: [(max[0] - min[0]).max(0) as usize, (max[1] - min[1]).max(0) as usize]} }

    pub fn end(&self, axis: usize) -> isize { self.pos[axis] + self.size[axis] as isize }

    pub fn x(&self) -> isize { self.pos[X] }
    pub fn y(&self) -> isize { self.pos[Y] }
    pub fn width(&self) -> usize { self.size[X] }
    pub fn height(&self) -> usize { self.size[Y] }
    pub fn right(&self) -> isize { self.end(X) }
    pub fn bottom(&self) -> isize { self.end(Y) }
    pub fn center(&self) -> [isize; 2] { [self.pos[0] + self.size[0] as isize / 2, self.pos[1] + self.size[1] as isize / 2] }

    pub fn intersection(mut self, r: Rect) -> Rect {
        for axis in 0..2 {
            let p = self.pos[axis].max(r.pos[axis]);
            self.size[axis] = (self.end(axis).min(r.end(axis)) - p).max(0) as usize;
            self.pos[axis] = p;
        }
        self
    }

    pub fn is_empty(&self) -> bool { self.size[0] == 0 || self.size[1] == 0 }

    // Empty rects overlap nothing.
    pub fn overlaps(&self, r: Rect) -> bool { !self.is_empty() && !r.is_empty() && !self.intersection(r).is_empty() }

    pub fn contains(&self, pos: [isize; 2]) -> bool { self.pos[0] <= pos[0] && self.end(0) > pos[0] && self.pos[1] <= pos[1] && self.end(1) > pos[1] }

    pub fn contains_rect(&self, r: Rect) -> bool {
        if r.is_empty() {
            return true;
        }
        (0..2).all(|a| self.pos[a] <= r.pos[a] && r.end(a) <= self.end(a))
    }

    // Shrink by `d` on every side (grow if negative). Sizes saturate at 0.
    pub fn inset(mut self, d: isize) -> Rect {
        for axis in 0..2 {
            self.pos[axis] += d;
            self.size[axis] = (self.size[axis] as isize - d * 2).max(0) as usize;
        }
        self
    }

    pub fn offset(mut self, d: [isize; 2]) -> Rect {
        self.pos[0] += d[0];
        self.pos[1] += d[1];
        self
    }

    // Multiply everything by an integer UI scale factor.
    pub fn scaled(self, s: usize) -> Rect { Rect {pos: [self.pos[0] * s as isize, self.pos[1] * s as isize], size: [self.size[0] * s, self.size[1] * s]} }

    pub fn set_right(&mut self, r: isize) { self.size[X] = (r - self.pos[X]).max(0) as usize; }
    pub fn set_bottom(&mut self, b: isize) { self.size[Y] = (b - self.pos[Y]).max(0) as usize; }
}

// RGBA, not premultiplied.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, Hash)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);
impl Color {
    pub fn white() -> Self { Self(255, 255, 255, 255) }
    pub fn black() -> Self { Self(0, 0, 0, 255) }
    pub fn alpha(&self) -> u8 { self.3 }
    // Scale alpha by a factor in [0, 1], e.g. for fading things out.
    pub fn fade(self, f: f32) -> Self { Self(self.0, self.1, self.2, (self.3 as f32 * f.clamp(0.0, 1.0)).round() as u8) }
}

// Width in monospace cells.
pub fn str_width(s: &str) -> usize {
    s.graphemes(true).map(|g| g.width()).sum()
}

// Removes the last grapheme cluster (not the last char, so that e.g. "e\u{301}" goes away in one backspace).
pub fn pop_grapheme(s: &mut String) -> bool {
    match s.grapheme_indices(true).next_back() {
        Some((i, _)) => { s.truncate(i); true }
        None => false,
    }
}

fn trim_line_tail(s: &str) -> &str { s.trim_end_matches(char::is_whitespace) }

// Splits text into lines no wider than `width` (as measured by `measure`), breaking only at Unicode line break opportunities (UAX #14):
// after spaces and hyphens, between ideographs, and always at newlines. A piece with no break opportunity wider than `width` is not split.
// Trailing whitespace of each line is dropped.
pub fn wrap_lines(text: &str, width: usize, measure: impl Fn(&str) -> usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut start = 0;
    for (end, opportunity) in linebreaks(text) {
        if end == start {
            continue;
        }
        let piece = &text[start..end];
        start = end;

        if line.is_empty() {
            line.push_str(piece);
        } else {
            let candidate = format!("{}{}", line, piece);
            if measure(trim_line_tail(&candidate)) > width {
                lines.push(trim_line_tail(&line).to_string());
                line.clear();
                line.push_str(piece);
            } else {
                line = candidate;
            }
        }

        if opportunity == BreakOpportunity::Mandatory {
            lines.push(trim_line_tail(&line).to_string());
            line.clear();
        }
    }
    if !line.is_empty() {
        lines.push(trim_line_tail(&line).to_string());
    }
    lines
}
