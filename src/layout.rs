use crate::{*, common_ui::*, style::*};
use std::mem;

// Grid layout of one region (window body, panel, grid cell). Every widget takes the next cell; when all cells are used, a new row starts with the same grid.
//
// Column/row sizes:
//   > 0: that many pixels,
//   == 0: style's default size,
//   < 0: proportional share of whatever is left after the fixed and default ones (and spacing), e.g. [100, -1, -2] = 100px, then 1/3 and 2/3 of the rest.
#[derive(Clone, Debug)]
pub struct Layout {
    pub body: Rect,
    // Cursor, relative to body.
    pub position: [isize; 2],
    // Furthest extent reached by any cell, absolute. Becomes the container's content size.
    pub max: [isize; 2],
    pub widths: Vec<isize>,
    pub heights: Vec<isize>,
    pub item_index: usize,
    pub next_row_y: isize,
    pub indent: isize,
}

pub const MIN_CELL_WIDTH: usize = 8;
pub const MIN_CELL_HEIGHT: usize = 6;

impl Layout {
    // `auto_resize` regions (popups, dropdown lists) default to one default-width column, because their own width comes from the content.
    pub fn new(body: Rect, scroll: [isize; 2], auto_resize: bool) -> Self {
        let mut l = Layout {body: body.offset([-scroll[0], -scroll[1]]), position: [0, 0], max: [-0x1000000, -0x1000000], widths: vec![0], heights: vec![0], item_index: 0, next_row_y: 0, indent: 0};
        if auto_resize {
            l.set_grid(&[0], &[]);
        } else {
            l.set_grid(&[], &[]);
        }
        l
    }

    // Empty `widths` means one full-width column; empty `heights` means one default-height row.
    pub fn set_grid(&mut self, widths: &[isize], heights: &[isize]) {
        self.widths.clear();
        self.widths.extend_from_slice(widths);
        if self.widths.is_empty() {
            self.widths.push(-1);
        }
        self.heights.clear();
        self.heights.extend_from_slice(heights);
        if self.heights.is_empty() {
            self.heights.push(0);
        }
        self.position = [self.indent, self.next_row_y];
        self.item_index = 0;
    }

    pub fn next_rect(&mut self, style: &Style) -> Rect {
        if self.item_index == self.widths.len() * self.heights.len() {
            self.position = [self.indent, self.next_row_y];
            self.item_index = 0;
        } else if self.item_index % self.widths.len() == 0 {
            self.position = [self.indent, self.next_row_y];
        }

        let width = resolve_size(&self.widths, self.item_index % self.widths.len(), MIN_CELL_WIDTH, style.default_width + style.padding * 2, self.body.width() as isize - self.indent, style.spacing);
        let height = resolve_size(&self.heights, self.item_index / self.widths.len(), MIN_CELL_HEIGHT, style.default_height, self.body.height() as isize, style.spacing);
        let r = Rect {pos: self.position, size: [width, height]};

        self.item_index += 1;
        self.position[X] += width as isize + style.spacing as isize;
        self.next_row_y = self.next_row_y.max(r.bottom() + style.spacing as isize);

        let r = r.offset(self.body.pos);
        self.max[X] = self.max[X].max(r.right());
        self.max[Y] = self.max[Y].max(r.bottom());
        r
    }

    // Extent reached so far, relative to body origin. Never negative, even if nothing was laid out.
    pub fn content_size(&self) -> [isize; 2] {
        [(self.max[X] - self.body.x()).max(0), (self.max[Y] - self.body.y()).max(0)]
    }

    // A nested layout (grid cell) closed: take over its cursor and extent where they reach further, so that this layout's content size covers the nested content.
    pub fn absorb_child(&mut self, child: &Layout) {
        self.position[X] = self.position[X].max(child.position[X] + child.body.x() - self.body.x());
        self.next_row_y = self.next_row_y.max(child.next_row_y + child.body.y() - self.body.y());
        self.max[X] = self.max[X].max(child.max[X]);
        self.max[Y] = self.max[Y].max(child.max[Y]);
    }
}

// Size of cell `index` along one axis. Proportional cells are split so that they add up exactly to the remainder; the last one absorbs rounding.
fn resolve_size(sizes: &[isize], index: usize, min_size: usize, default_size: usize, entire: isize, spacing: usize) -> usize {
    let s = sizes[index];
    if s > 0 {
        return s as usize;
    }
    if s == 0 {
        return default_size;
    }

    let gaps = sizes.len().saturating_sub(1) * spacing;
    let mut helper = RemainderFractionHelper::new(entire.max(0) as usize);
    helper.declare_fixed_part(gaps);
    for (i, &s) in sizes.iter().enumerate() {
        if s > 0 {
            helper.declare_fixed_part(s as usize);
        } else if s == 0 {
            helper.declare_fixed_part(default_size);
        } else {
            helper.declare_remainder_fraction(-s as f64, i);
        }
    }
    let mut size = 0;
    for (i, &s) in sizes[..=index].iter().enumerate() {
        if s < 0 {
            size = helper.calculate_remainder_fraction(-s as f64, i);
        }
    }
    size.max(min_size)
}

// Splits `size_total` among parts with fractional weights, after subtracting fixed parts, such that the rounded sizes sum exactly to the total.
// Parts must be declared in order, then calculated in the same order.
pub struct RemainderFractionHelper {
    size_total: usize,
    fraction_total: f64,
    size_allocated: usize,
    fraction_allocated: f64,
    last_remainder_idx: usize,
}
impl RemainderFractionHelper {
    pub fn new(size_total: usize) -> Self { Self {size_total, fraction_total: 0.0, size_allocated: 0, fraction_allocated: 0.0, last_remainder_idx: 0} }
    pub fn declare_fixed_part(&mut self, size: usize) {
        self.size_total = self.size_total.saturating_sub(size);
    }
    pub fn declare_remainder_fraction(&mut self, fraction: f64, idx: usize) {
        self.fraction_total += fraction.max(0.0);
        self.last_remainder_idx = idx;
    }
    pub fn calculate_remainder_fraction(&mut self, fraction: f64, idx: usize) -> usize {
        self.fraction_allocated += fraction.max(0.0);
        let fraction_total = if self.fraction_total == 0.0 {1.0} else {self.fraction_total};
        let mut s = (self.size_total as f64 * self.fraction_allocated / fraction_total + 0.5) as usize;
        if idx == self.last_remainder_idx {
            s = self.size_total;
        }
        s = s.max(self.size_allocated).min(self.size_total);
        s - mem::replace(&mut self.size_allocated, s)
    }
}
