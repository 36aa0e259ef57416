use crate::{*, common_ui::*, error::*, id::*, imgui::*, style::*};
use std::fmt;

// Clip rect that doesn't clip anything.
pub const UNCLIPPED: Rect = Rect {pos: [0, 0], size: [0x1000000, 0x1000000]};

pub trait TextMetrics {
    fn text_width(&self, s: &str) -> usize;
    fn line_height(&self) -> usize;
}

// Fixed-size cells, like the 6x12 debug font of most game engines. Width counts terminal columns, so wide characters take two cells.
#[derive(Clone, Copy, Debug)]
pub struct MonospaceMetrics {
    pub cell_width: usize,
    pub line_height: usize,
}
impl Default for MonospaceMetrics {
    fn default() -> Self { Self {cell_width: 6, line_height: 12} }
}
impl TextMetrics for MonospaceMetrics {
    fn text_width(&self, s: &str) -> usize { str_width(s) * self.cell_width }
    fn line_height(&self) -> usize { self.line_height }
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Icon {
    Check = 0,
    Collapsed,
    Expanded,
    Down,
    Up,
}
impl Icon {
    pub const ALL: [Icon; 5] = [Icon::Check, Icon::Collapsed, Icon::Expanded, Icon::Down, Icon::Up];
}

// Alpha mask, tinted with the command's color when drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconImage {
    pub width: usize,
    pub height: usize,
    pub alpha: Vec<u8>,
}
impl IconImage {
    pub fn new(width: usize, height: usize, alpha: Vec<u8>) -> Result<Self> {
        if alpha.len() != width * height {
            return err!(Format, "icon is {}x{} but has {} pixels", width, height, alpha.len());
        }
        Ok(Self {width, height, alpha})
    }

    // '#' is opaque, anything else transparent. Rows must have equal length.
    pub fn from_ascii(rows: &[&str]) -> Result<Self> {
        let width = rows.first().map_or(0, |r| r.len());
        let mut alpha = Vec::with_capacity(width * rows.len());
        for row in rows {
            if row.len() != width {
                return err!(Format, "icon rows have different lengths: {} vs {}", row.len(), width);
            }
            alpha.extend(row.bytes().map(|b| if b == b'#' {255} else {0}));
        }
        Self::new(width, rows.len(), alpha)
    }
}

pub struct IconSet {
    images: Vec<IconImage>,
}
impl IconSet {
    // Every icon must be provided.
    pub fn new(mut images: Vec<(Icon, IconImage)>) -> Result<Self> {
        let mut ordered = Vec::with_capacity(Icon::ALL.len());
        for icon in Icon::ALL {
            match images.iter().position(|(i, _)| *i == icon) {
                Some(idx) => ordered.push(images.swap_remove(idx).1),
                None => return err!(MissingAsset, "icon {:?} is missing", icon),
            }
        }
        Ok(Self {images: ordered})
    }

    pub fn builtin() -> Self {
        let rows: [&[&str]; 5] = [
            &["........",
              ".......#",
              "......##",
              "#....##.",
              "##..##..",
              ".####...",
              "..##....",
              "........"],
            &["..#.....",
              "..##....",
              "..###...",
              "..####..",
              "..###...",
              "..##....",
              "..#.....",
              "........"],
            &["........",
              "........",
              "#######.",
              ".#####..",
              "..###...",
              "...#....",
              "........",
              "........"],
            &["........",
              "........",
              "#######.",
              ".#####..",
              "..###...",
              "...#....",
              "........",
              "........"],
            &["........",
              "........",
              "...#....",
              "..###...",
              ".#####..",
              "#######.",
              "........",
              "........"],
        ];
        let images = rows.iter().map(|r| IconImage::from_ascii(r).unwrap_or(IconImage {width: 0, height: 0, alpha: Vec::new()})).collect();
        Self {images}
    }

    pub fn get(&self, icon: Icon) -> &IconImage { &self.images[icon as usize] }
}

// What the UI wants drawn, in unscaled UI pixels. Recorded per root container during update(), replayed by draw().
pub enum Command {
    Clip(Rect),
    Rect(Rect, Color),
    Text {pos: [isize; 2], color: Color, text: String},
    Icon {rect: Rect, icon: Icon, color: Color},
    // Caller-provided painting; gets the backend and the widget rect in physical pixels.
    Custom {rect: Rect, paint: Box<dyn Fn(&mut dyn DrawBackend, Rect)>},
}
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Clip(r) => write!(f, "Clip({:?})", r),
            Self::Rect(r, c) => write!(f, "Rect({:?}, {:?})", r, c),
            Self::Text {pos, color, text} => write!(f, "Text({:?}, {:?}, {:?})", pos, color, text),
            Self::Icon {rect, icon, color} => write!(f, "Icon({:?}, {:?}, {:?})", rect, icon, color),
            Self::Custom {rect, ..} => write!(f, "Custom({:?})", rect),
        }
    }
}

// The host's renderer. All coordinates here are physical pixels.
pub trait DrawBackend {
    fn size(&self) -> [usize; 2];
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn draw_text(&mut self, text: &str, pos: [isize; 2], scale: usize, color: Color);
    fn draw_image(&mut self, image: &IconImage, pos: [isize; 2], scale: usize, color: Color);
    // Restricts subsequent drawing to `rect`.
    fn set_clip(&mut self, rect: Rect);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Clipping {
    Visible,
    Partial,
    Hidden,
}

impl Context {
    pub(crate) fn clip_rect(&self) -> Rect {
        self.clip_stack.last().copied().unwrap_or(UNCLIPPED)
    }

    // New clip is the intersection with the current one.
    pub(crate) fn push_clip_rect(&mut self, r: Rect) {
        let last = self.clip_rect();
        self.clip_stack.push(r.intersection(last));
    }

    pub(crate) fn pop_clip_rect(&mut self) {
        self.clip_stack.pop();
    }

    pub(crate) fn check_clip(&self, bounds: Rect) -> Clipping {
        let cr = self.clip_rect();
        if !bounds.overlaps(cr) {
            Clipping::Hidden
        } else if cr.contains_rect(bounds) {
            Clipping::Visible
        } else {
            Clipping::Partial
        }
    }

    pub(crate) fn push_command(&mut self, cmd: Command) {
        let root = match self.current_root_container() {
            Some(id) => id,
            None => return self.latch(error!(Usage, "drawing outside of a window")),
        };
        if let Some(cnt) = self.containers.get_mut(&root) {
            cnt.commands.push(cmd);
        }
    }

    pub(crate) fn set_clip(&mut self, r: Rect) {
        self.push_command(Command::Clip(r));
    }

    pub(crate) fn draw_rect(&mut self, rect: Rect, color: Color) {
        let r = rect.intersection(self.clip_rect());
        if !r.is_empty() {
            self.push_command(Command::Rect(r, color));
        }
    }

    // 1px outline just inside `r`.
    pub(crate) fn draw_box(&mut self, r: Rect, color: Color) {
        let (w, h) = (r.width(), r.height());
        self.draw_rect(Rect::new(r.x() + 1, r.y(), w.saturating_sub(2), 1), color);
        self.draw_rect(Rect::new(r.x() + 1, r.bottom() - 1, w.saturating_sub(2), 1), color);
        self.draw_rect(Rect::new(r.x(), r.y(), 1, h), color);
        self.draw_rect(Rect::new(r.right() - 1, r.y(), 1, h), color);
    }

    pub(crate) fn draw_text(&mut self, text: &str, pos: [isize; 2], color: Color) {
        let bounds = Rect {pos, size: [self.metrics.text_width(text), self.metrics.line_height()]};
        let clipping = self.check_clip(bounds);
        if clipping == Clipping::Hidden {
            return;
        }
        if clipping == Clipping::Partial {
            let cr = self.clip_rect();
            self.set_clip(cr);
        }
        self.push_command(Command::Text {pos, color, text: text.to_string()});
        if clipping != Clipping::Visible {
            self.set_clip(UNCLIPPED);
        }
    }

    pub(crate) fn draw_icon(&mut self, icon: Icon, rect: Rect, color: Color) {
        let clipping = self.check_clip(rect);
        if clipping == Clipping::Hidden {
            return;
        }
        if clipping == Clipping::Partial {
            let cr = self.clip_rect();
            self.set_clip(cr);
        }
        self.push_command(Command::Icon {rect, icon, color});
        if clipping != Clipping::Visible {
            self.set_clip(UNCLIPPED);
        }
    }

    // Background plus border. Scrollbars and title bars have no border.
    pub(crate) fn draw_frame(&mut self, rect: Rect, color: ColorId) {
        self.draw_rect(rect, self.style.color(color));
        if matches!(color, ColorId::ScrollBase | ColorId::ScrollThumb | ColorId::TitleBg | ColorId::TitleBgTransparent) {
            return;
        }
        let border = self.style.color(ColorId::Border);
        if border.alpha() != 0 {
            self.draw_box(rect.inset(-1), border);
        }
    }

    pub(crate) fn draw_widget_frame(&mut self, id: WidgetId, rect: Rect, color: ColorId, opt: WidgetOptions) {
        if opt.contains(WidgetOptions::NO_FRAME) {
            return;
        }
        let color = color.highlighted(self.hover == Some(id), self.focus == Some(id));
        self.draw_frame(rect, color);
    }

    // One line of text inside `rect`, vertically centered, aligned per `opt`, clipped to `rect`.
    pub(crate) fn draw_widget_text(&mut self, text: &str, rect: Rect, color: ColorId, opt: WidgetOptions) {
        let tw = self.metrics.text_width(text) as isize;
        let th = self.metrics.line_height() as isize;
        let pad = self.style.padding as isize;
        let x = if opt.contains(WidgetOptions::ALIGN_CENTER) {
            rect.x() + (rect.width() as isize - tw) / 2
        } else if opt.contains(WidgetOptions::ALIGN_RIGHT) {
            rect.right() - tw - pad
        } else {
            rect.x() + pad
        };
        let y = rect.y() + (rect.height() as isize - th) / 2;
        let color = self.style.color(color);
        self.push_clip_rect(rect);
        self.draw_text(text, [x, y], color);
        self.pop_clip_rect();
    }

    // Commands of the last frame, bottom window first.
    pub fn commands(&self) -> impl Iterator<Item = &Command> + '_ {
        self.root_containers.iter().filter_map(move |id| self.containers.get(id)).flat_map(|c| c.commands.iter())
    }

    // Replays the last frame into `backend`, scaled. Draws nothing if the frame failed.
    // Also remembers the backend's size; windows are kept on screen when dragged.
    pub fn draw(&mut self, backend: &mut dyn DrawBackend) {
        if self.err.is_none() {
            let s = self.scale();
            for cmd in self.commands() {
                match cmd {
                    Command::Clip(r) => backend.set_clip(r.scaled(s)),
                    Command::Rect(r, c) => backend.fill_rect(r.scaled(s), *c),
                    Command::Text {pos, color, text} => backend.draw_text(text, [pos[X] * s as isize, pos[Y] * s as isize], s, *color),
                    Command::Icon {rect, icon, color} => {
                        let img = self.icons.get(*icon);
                        let x = rect.x() + (rect.width() as isize - img.width as isize) / 2;
                        let y = rect.y() + (rect.height() as isize - img.height as isize) / 2;
                        backend.draw_image(img, [x * s as isize, y * s as isize], s, *color);
                    }
                    Command::Custom {rect, paint} => paint(backend, rect.scaled(s)),
                }
            }
        }
        self.screen_size = backend.size();
    }

    // A widget that only paints: `paint` is called at draw time with the backend and the cell rect (physical pixels), clipped to the container.
    pub fn custom_draw(&mut self, paint: impl Fn(&mut dyn DrawBackend, Rect) + 'static) {
        self.wrap(|ctx| {
            ctx.widget(None, WidgetOptions::empty(), None, &mut (), |_, _, _, _| Event::none(), |ctx, _, r| {
                let cr = ctx.clip_rect();
                ctx.set_clip(cr);
                ctx.push_command(Command::Custom {rect: r, paint: Box::new(paint)});
                ctx.set_clip(UNCLIPPED);
            })?;
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::{*, draw::*, headless::*, common_ui::*};

    #[test]
    fn icon_sets() {
        let set = IconSet::builtin();
        for icon in Icon::ALL {
            let img = set.get(icon);
            assert_eq!((img.width, img.height), (8, 8));
            assert!(img.alpha.iter().any(|a| *a == 255));
        }
        let images: Vec<(Icon, IconImage)> = Icon::ALL[1..].iter().map(|i| (*i, set.get(*i).clone())).collect();
        assert!(IconSet::new(images).err().unwrap().is_missing_asset());
        assert!(IconImage::new(2, 2, vec![0; 3]).unwrap_err().is_format());
        assert!(IconImage::from_ascii(&["##", "#"]).unwrap_err().is_format());
    }

    #[test]
    fn partially_clipped_text_is_wrapped_in_clip_commands() {
        let mut ctx = Context::new();
        let input = ScriptedInput::new();
        // One word much wider than the window can't be wrapped, so it's drawn partially clipped. Fully visible text gets no clip commands.
        ctx.update(&input, |ctx| {
            ctx.window("W", Rect::new(0, 0, 100, 120), |ctx, _| {
                ctx.text("hi");
                ctx.text("abcdefghijklmnopqrstuvwxyz");
            });
            Ok(())
        }).unwrap();
        let cmds: Vec<&Command> = ctx.commands().collect();
        assert_eq!(cmds.iter().filter(|c| matches!(c, Command::Clip(_))).count(), 2, "{:?}", cmds);
        let wide = cmds.iter().position(|c| matches!(c, Command::Text {text, ..} if text.starts_with("abc"))).unwrap();
        match (cmds[wide - 1], cmds[wide + 1]) {
            (Command::Clip(before), Command::Clip(after)) => {
                assert!(before.right() <= 100);
                assert_eq!(*after, UNCLIPPED);
            }
            _ => panic!("{:?}", cmds),
        }

        let mut backend = RecordingBackend::new([320, 240]);
        ctx.draw(&mut backend);
        assert!(backend.texts().contains(&"hi"));
        assert!(backend.calls.iter().any(|c| matches!(c, DrawCall::Clip(r) if *r == UNCLIPPED)));
    }

    #[test]
    fn custom_paint_gets_scaled_rect() {
        let mut ctx = Context::new();
        ctx.set_scale(3).unwrap();
        let input = ScriptedInput::new();
        ctx.update(&input, |ctx| {
            ctx.window("W", Rect::new(0, 0, 100, 100), |ctx, _| {
                ctx.custom_draw(|backend, r| backend.fill_rect(r, Color(1, 2, 3, 255)));
            });
            Ok(())
        }).unwrap();
        let mut backend = RecordingBackend::new([600, 600]);
        ctx.draw(&mut backend);
        let r = backend.calls.iter().find_map(|c| match c { DrawCall::Rect(r, Color(1, 2, 3, 255)) => Some(*r), _ => None }).unwrap();
        // Window body starts below the title bar, inset by padding; scaled by 3.
        assert_eq!(r.x(), 5 * 3);
        assert_eq!(r.y(), (24 + 5) * 3);
        assert_eq!(r.height(), 18 * 3);
    }
}
