use crate::{*, common_ui::*, error::*, id::*, imgui::*, style::*, draw::*};
use std::{collections::{HashMap, HashSet}, panic::Location};

// Geometry of a container, as seen by the code that builds its content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContainerLayout {
    // Whole container, including title bar and scrollbars.
    pub bounds: Rect,
    // Content area: below the title, minus scrollbars. Content is clipped to it.
    pub body_bounds: Rect,
    // Extent of the content laid out in the last frame, relative to the content origin.
    pub content_size: [isize; 2],
    pub scroll_offset: [isize; 2],
}

// State that persists across frames for a window, panel, popup, or dropdown list.
#[derive(Default)]
pub struct Container {
    // Enclosing container, for panels.
    pub parent: Option<WidgetId>,
    pub layout: ContainerLayout,
    pub open: bool,
    pub collapsed: bool,
    // Draw commands of this frame. Only root containers have them; nested containers draw into their root.
    pub(crate) commands: Vec<Command>,
    // Headers and tree nodes whose expanded state differs from the initial one.
    toggled: HashSet<WidgetId>,
    // Text being edited, per text field.
    pub(crate) text_edits: HashMap<WidgetId, String>,
    // Frames until an open dropdown list closes after a selection, so the click that selected doesn't fall through.
    pub(crate) dropdown_close_delay: usize,
    // Touched during the current frame. Untouched containers are dropped at the end of the frame.
    pub(crate) used: bool,
}
impl Container {
    pub fn is_toggled(&self, id: WidgetId) -> bool { self.toggled.contains(&id) }

    pub fn toggle(&mut self, id: WidgetId) {
        if !self.toggled.remove(&id) {
            self.toggled.insert(id);
        }
    }

    // Ids this container remembers something about.
    pub(crate) fn state_ids(&self) -> impl Iterator<Item = &WidgetId> + '_ {
        self.toggled.iter().chain(self.text_edits.keys())
    }

    // Forgets the edit text of fields that weren't built this frame.
    pub(crate) fn retain_edits(&mut self, built: &HashSet<WidgetId>) {
        self.text_edits.retain(|id, _| built.contains(id));
    }
}

// Handle for opening/closing a popup from outside of its builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PopupId(pub WidgetId);

impl Context {
    // Looks up (or creates) the container and marks it used for this frame. With CLOSED, a missing container isn't created.
    pub(crate) fn container(&mut self, id: WidgetId, opt: WidgetOptions) -> Option<&mut Container> {
        if !self.containers.contains_key(&id) {
            if opt.contains(WidgetOptions::CLOSED) {
                return None;
            }
            self.containers.insert(id, Container {open: true, ..Default::default()});
        }
        let cnt = self.containers.get_mut(&id)?;
        cnt.used = true;
        Some(cnt)
    }

    pub(crate) fn current_container_id(&self) -> Result<WidgetId> {
        match self.container_stack.last() {
            Some(id) => Ok(*id),
            None => err!(Usage, "no current container; perhaps a window is absent"),
        }
    }

    pub(crate) fn current_container(&self) -> Result<&Container> {
        let id = self.current_container_id()?;
        match self.containers.get(&id) {
            Some(c) => Ok(c),
            None => err!(Internal, "container {:?} is on the stack but not in the registry", id),
        }
    }

    pub(crate) fn current_container_mut(&mut self) -> Result<&mut Container> {
        let id = self.current_container_id()?;
        match self.containers.get_mut(&id) {
            Some(c) => Ok(c),
            None => err!(Internal, "container {:?} is on the stack but not in the registry", id),
        }
    }

    // Walks up through panels to the window.
    pub(crate) fn current_root_container(&self) -> Option<WidgetId> {
        let mut id = *self.container_stack.last()?;
        while let Some(parent) = self.containers.get(&id)?.parent {
            id = parent;
        }
        Some(id)
    }

    // Topmost open root container under the pointer.
    pub(crate) fn hovering_root_container(&self) -> Option<WidgetId> {
        let p = self.pointing_position();
        self.root_containers.iter().rev().copied().find(|id| match self.containers.get(id) {
            Some(c) => c.open && c.layout.bounds.contains(p),
            None => false,
        })
    }

    pub(crate) fn bring_to_front(&mut self, id: WidgetId) {
        if let Some(i) = self.root_containers.iter().position(|r| *r == id) {
            let id = self.root_containers.remove(i);
            self.root_containers.push(id);
        }
    }

    // Movable, collapsible, resizable window. `initial` is used the first time; after that the window keeps its own bounds.
    // The builder gets the container's layout and lays out widgets in a grid, one full-width column by default.
    #[track_caller]
    pub fn window(&mut self, title: &str, initial: Rect, f: impl FnOnce(&mut Context, ContainerLayout)) {
        let part = self.ids.caller(Location::caller());
        self.wrap(|ctx| ctx.window_impl(title, initial, WidgetOptions::empty(), part, f));
    }

    #[track_caller]
    pub fn window_with_options(&mut self, title: &str, initial: Rect, opt: WidgetOptions, f: impl FnOnce(&mut Context, ContainerLayout)) {
        let part = self.ids.caller(Location::caller());
        self.wrap(|ctx| ctx.window_impl(title, initial, opt, part, f));
    }

    pub(crate) fn window_impl(&mut self, title: &str, initial: Rect, opt: WidgetOptions, part: IdPart, f: impl FnOnce(&mut Context, ContainerLayout)) -> Result<()> {
        self.with_id_part(part, |ctx, id| {
            ctx.current_id = Some(id);
            if !ctx.built_windows.insert(id) {
                log::warn!("window '{}' built twice in one frame ({:?}); both share the same state", title, id);
            }
            let bounds = match ctx.container(id, opt) {
                Some(cnt) if cnt.open => {
                    if cnt.layout.bounds.width() == 0 {
                        cnt.layout.bounds = initial;
                    }
                    cnt.layout.bounds
                }
                _ => return Ok(()),
            };
            ctx.container_stack.push(id);
            if !ctx.root_containers.contains(&id) {
                ctx.root_containers.push(id);
            }
            // A window built inside another window's builder isn't clipped to it.
            ctx.clip_stack.push(UNCLIPPED);
            let r = ctx.window_contents(title, opt, id, bounds, f);
            ctx.clip_stack.pop();
            ctx.container_stack.pop();
            r
        })
    }

    fn window_contents(&mut self, title: &str, opt: WidgetOptions, id: WidgetId, bounds: Rect, f: impl FnOnce(&mut Context, ContainerLayout)) -> Result<()> {
        let mut body = bounds;
        let collapsed = self.containers.get(&id).map_or(false, |c| c.collapsed);
        if !opt.contains(WidgetOptions::NO_FRAME) && !collapsed {
            self.draw_frame(bounds, ColorId::WindowBg);
        }

        if !opt.contains(WidgetOptions::NO_TITLE) {
            let mut tr = bounds;
            tr.size[Y] = self.style.title_height;
            self.draw_frame(tr, if collapsed {ColorId::TitleBgTransparent} else {ColorId::TitleBg});

            let title_id = id.push(self.ids.string("title"))?;
            let th = tr.height() as isize;
            let r = Rect::from_corners([tr.x() + th - self.style.padding as isize, tr.y()], [tr.right(), tr.bottom()]);
            self.widget_at(Some(title_id), opt, r, &mut (), |ctx, _, _, _| {
                if ctx.focus == Some(title_id) && ctx.input.pointing.pressed() {
                    ctx.drag_window(id, th);
                }
                Event::none()
            }, |ctx, _, r| ctx.draw_widget_text(title, r, ColorId::TitleText, opt));
            body.pos[Y] += th;
            body.size[Y] = body.size[Y].saturating_sub(tr.height());

            if !opt.contains(WidgetOptions::NO_CLOSE) {
                let collapse_id = id.push(self.ids.string("collapse"))?;
                let r = Rect::new(tr.x(), tr.y(), tr.height(), tr.height());
                self.widget_at(Some(collapse_id), opt, r, &mut (), |ctx, _, _, _| {
                    if ctx.input.pointing.just_pressed() && ctx.focus == Some(collapse_id) {
                        if let Some(cnt) = ctx.containers.get_mut(&id) {
                            cnt.collapsed = !cnt.collapsed;
                        }
                    }
                    Event::none()
                }, |ctx, _, r| {
                    let color = ctx.style.color(ColorId::TitleText);
                    ctx.draw_icon(if collapsed {Icon::Collapsed} else {Icon::Expanded}, r, color);
                });
            }
        }
        if collapsed {
            return Ok(());
        }

        self.push_container_body_layout(id, body, opt)?;
        let r = self.window_body(opt, id, bounds, f);
        let popped = self.pop_layout();
        r?;
        popped
    }

    fn window_body(&mut self, opt: WidgetOptions, id: WidgetId, bounds: Rect, f: impl FnOnce(&mut Context, ContainerLayout)) -> Result<()> {
        if !opt.contains(WidgetOptions::NO_RESIZE) {
            let sz = self.style.title_height;
            let resize_id = id.push(self.ids.string("resize"))?;
            let r = Rect::new(bounds.right() - sz as isize, bounds.bottom() - sz as isize, sz, sz);
            self.widget_at(Some(resize_id), WidgetOptions::empty(), r, &mut (), |ctx, _, _, _| {
                if ctx.focus == Some(resize_id) && ctx.input.pointing.pressed() {
                    ctx.resize_window(id);
                }
                Event::none()
            }, |_, _, _| ());
        }

        if opt.contains(WidgetOptions::AUTO_SIZE) {
            let body = self.layout()?.body;
            if let Some(cnt) = self.containers.get_mut(&id) {
                let b = &mut cnt.layout.bounds;
                for axis in [X, Y] {
                    let extra = b.size[axis] as isize - body.size[axis] as isize;
                    b.size[axis] = (cnt.layout.content_size[axis] + extra).max(0) as usize;
                }
            }
        }

        if opt.contains(WidgetOptions::POPUP) && self.input.pointing.just_pressed() && self.hovering_root_container() != Some(id) {
            if let Some(cnt) = self.containers.get_mut(&id) {
                if cnt.open {
                    log::debug!("popup {:?} closed by a press outside", id);
                }
                cnt.open = false;
            }
        }

        let layout = match self.containers.get(&id) {
            Some(c) => c.layout,
            None => return err!(Internal, "window container disappeared"),
        };
        self.push_clip_rect(layout.body_bounds);
        f(self, layout);
        self.pop_clip_rect();
        Ok(())
    }

    // Moves the window with the pointer, keeping the title bar reachable once the screen size is known.
    fn drag_window(&mut self, id: WidgetId, title_height: isize) {
        let delta = self.pointing_delta();
        let s = self.scale();
        let screen = [(self.screen_size[X] / s) as isize, (self.screen_size[Y] / s) as isize];
        let pad = self.style.padding as isize;
        let cnt = match self.containers.get_mut(&id) {
            Some(c) => c,
            None => return,
        };
        let mut b = cnt.layout.bounds.offset(delta);
        if screen[X] > 0 && b.right() >= screen[X] {
            b.pos[X] += screen[X] - b.right();
        }
        if b.x() < 0 {
            b.pos[X] = 0;
        }
        if screen[Y] > 0 && b.y() + title_height >= screen[Y] - pad {
            b.pos[Y] += screen[Y] - (b.y() + title_height);
        }
        if b.y() < 0 {
            b.pos[Y] = 0;
        }
        cnt.layout.bounds = b;
    }

    // Windows can't get smaller than 96x64 or, once the screen size is known, extend past it.
    fn resize_window(&mut self, id: WidgetId) {
        let delta = self.pointing_delta();
        let s = self.scale();
        let screen = [(self.screen_size[X] / s) as isize, (self.screen_size[Y] / s) as isize];
        let cnt = match self.containers.get_mut(&id) {
            Some(c) => c,
            None => return,
        };
        let b = &mut cnt.layout.bounds;
        let mut right = b.x() + (b.width() as isize + delta[X]).max(96);
        let mut bottom = b.y() + (b.height() as isize + delta[Y]).max(64);
        if screen[X] > 0 {
            right = right.min(screen[X]);
        }
        if screen[Y] > 0 {
            bottom = bottom.min(screen[Y]);
        }
        b.set_right(right);
        b.set_bottom(bottom);
    }

    // Lays out scrollbars, then starts the content layout of the container in what's left of `body`.
    fn push_container_body_layout(&mut self, id: WidgetId, body: Rect, opt: WidgetOptions) -> Result<()> {
        let body = if opt.contains(WidgetOptions::NO_SCROLL) { body } else { self.scrollbars(id, body)? };
        let cnt = match self.containers.get_mut(&id) {
            Some(c) => c,
            None => return err!(Internal, "container {:?} disappeared", id),
        };
        cnt.layout.body_bounds = body;
        let scroll = cnt.layout.scroll_offset;
        let pad = self.style.padding as isize;
        self.push_layout(body.inset(pad), scroll, opt.contains(WidgetOptions::AUTO_SIZE));
        Ok(())
    }

    // Returns the body minus the space taken by scrollbars. Whether a scrollbar is needed is decided from the previous frame's content size.
    fn scrollbars(&mut self, id: WidgetId, body: Rect) -> Result<Rect> {
        let sz = self.style.scrollbar_size;
        let pad = self.style.padding as isize * 2;
        let (content, prev_body) = match self.containers.get(&id) {
            Some(c) => (c.layout.content_size, c.layout.body_bounds),
            None => return err!(Internal, "container {:?} disappeared", id),
        };
        let cs = [content[X] + pad, content[Y] + pad];

        self.push_clip_rect(body);
        let mut body = body;
        if cs[Y] > prev_body.height() as isize {
            body.size[X] = body.size[X].saturating_sub(sz);
        }
        if cs[X] > prev_body.width() as isize {
            body.size[Y] = body.size[Y].saturating_sub(sz);
        }
        let r = self.scrollbar(id, body, cs, Y).and_then(|()| self.scrollbar(id, body, cs, X));
        self.pop_clip_rect();
        r?;
        Ok(body)
    }

    // Scrollbar along `axis`: to the right of the body for Y, below it for X.
    fn scrollbar(&mut self, id: WidgetId, body: Rect, cs: [isize; 2], axis: usize) -> Result<()> {
        let other = 1 - axis;
        let max_scroll = cs[axis] - body.size[axis] as isize;
        if max_scroll <= 0 || body.size[axis] == 0 {
            if let Some(cnt) = self.containers.get_mut(&id) {
                cnt.layout.scroll_offset[axis] = 0;
            }
            return Ok(());
        }

        let mut base = body;
        base.pos[other] = body.end(other);
        base.size[other] = self.style.scrollbar_size;
        let part = self.ids.string(if axis == Y {"scrollbar-y"} else {"scrollbar-x"});
        let bar_id = self.child_id(part)?;
        let thumb_size = self.style.thumb_size;
        self.widget_at(Some(bar_id), WidgetOptions::empty(), base, &mut (), |ctx, _, b, _| {
            let delta = ctx.pointing_delta();
            let dragging = ctx.focus == Some(bar_id) && ctx.input.pointing.pressed();
            let over = ctx.pointing_over(body);
            if let Some(cnt) = ctx.containers.get_mut(&id) {
                let off = &mut cnt.layout.scroll_offset[axis];
                if dragging {
                    *off += delta[axis] * cs[axis] / b.size[axis].max(1) as isize;
                }
                *off = (*off).max(0).min(max_scroll);
            }
            if over {
                ctx.scroll_target = Some(id);
            }
            Event::none()
        }, |ctx, _, b| {
            ctx.draw_frame(b, ColorId::ScrollBase);
            let offset = ctx.containers.get(&id).map_or(0, |c| c.layout.scroll_offset[axis]);
            let mut thumb = b;
            thumb.size[axis] = thumb_size.max(b.size[axis] * body.size[axis] / cs[axis] as usize);
            thumb.pos[axis] += offset * (b.size[axis] as isize - thumb.size[axis] as isize) / max_scroll;
            ctx.draw_frame(thumb, ColorId::ScrollThumb);
        });
        Ok(())
    }

    // Scrolls the current container. Applies to the next frame's layout.
    pub fn set_scroll(&mut self, offset: [isize; 2]) {
        self.wrap(|ctx| {
            ctx.current_container_mut()?.layout.scroll_offset = offset;
            Ok(())
        });
    }

    // Nested scrollable region taking one layout cell of the enclosing container.
    #[track_caller]
    pub fn panel(&mut self, opt: WidgetOptions, f: impl FnOnce(&mut Context, ContainerLayout)) {
        let part = self.ids.caller(Location::caller());
        self.wrap(|ctx| ctx.with_id_part(part, |ctx, id| {
            ctx.current_id = Some(id);
            let bounds = ctx.layout_next()?;
            if !opt.contains(WidgetOptions::NO_FRAME) {
                ctx.draw_frame(bounds, ColorId::PanelBg);
            }
            let parent = ctx.current_container_id()?;
            match ctx.container(id, opt) {
                Some(cnt) => {
                    cnt.parent = Some(parent);
                    cnt.layout.bounds = bounds;
                }
                None => return Ok(()),
            }
            ctx.container_stack.push(id);
            let r = ctx.panel_body(id, bounds, opt, f);
            ctx.container_stack.pop();
            r
        }));
    }

    fn panel_body(&mut self, id: WidgetId, bounds: Rect, opt: WidgetOptions, f: impl FnOnce(&mut Context, ContainerLayout)) -> Result<()> {
        self.push_container_body_layout(id, bounds, opt)?;
        let layout = self.current_container()?.layout;
        self.push_clip_rect(layout.body_bounds);
        f(self, layout);
        self.pop_clip_rect();
        self.pop_layout()
    }

    // Auto-sized, untitled window that starts closed and closes itself when a press lands outside of it.
    // Open it with open_popup(); the builder runs only while it's open.
    #[track_caller]
    pub fn popup(&mut self, f: impl FnOnce(&mut Context, ContainerLayout)) -> Option<PopupId> {
        let part = self.ids.caller(Location::caller());
        let id = match self.child_id(part) {
            Ok(id) => id,
            Err(e) => {
                self.latch(e);
                return None;
            }
        };
        let opt = WidgetOptions::POPUP | WidgetOptions::AUTO_SIZE | WidgetOptions::NO_RESIZE | WidgetOptions::NO_SCROLL | WidgetOptions::NO_TITLE | WidgetOptions::CLOSED;
        self.wrap(|ctx| ctx.window_impl("", Rect::default(), opt, part, f));
        Some(PopupId(id))
    }

    // Opens the popup at the pointer, on top of everything.
    pub fn open_popup(&mut self, popup: PopupId) {
        let p = self.pointing_position();
        let cnt = match self.container(popup.0, WidgetOptions::empty()) {
            Some(c) => c,
            None => return,
        };
        cnt.layout.bounds = Rect::new(p[X], p[Y], 1, 1);
        cnt.open = true;
        log::debug!("popup {:?} opened at {:?}", popup.0, p);
        self.bring_to_front(popup.0);
    }

    pub fn close_popup(&mut self, popup: PopupId) {
        if let Some(cnt) = self.containers.get_mut(&popup.0) {
            cnt.open = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{*, imgui::*, headless::*, common_ui::*, container::*};

    #[test]
    fn collapse_and_resize() {
        fn build(ctx: &mut Context, built: &mut usize) -> Result<()> {
            ctx.window("W", Rect::new(0, 0, 200, 100), |_, _| *built += 1);
            Ok(())
        }
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut built = 0;
        ctx.update(&input, |ctx| build(ctx, &mut built)).unwrap();
        assert_eq!(built, 1);

        // Collapse button is the square at the left of the title bar. The press frame still builds the body.
        input.move_cursor([12, 12]);
        input.next_tick();
        input.press();
        ctx.update(&input, |ctx| build(ctx, &mut built)).unwrap();
        input.next_tick();
        input.release();
        let flags = ctx.update(&input, |ctx| build(ctx, &mut built)).unwrap();
        assert_eq!(built, 2);
        assert!(flags.contains(CaptureFlags::HOVER));
        // Collapsed window only captures its title bar.
        input.move_cursor([50, 60]);
        input.next_tick();
        let flags = ctx.update(&input, |ctx| build(ctx, &mut built)).unwrap();
        assert!(!flags.contains(CaptureFlags::HOVER));
        assert_eq!(built, 2);

        // Expand again, then drag the resize handle in the bottom-right corner.
        input.move_cursor([12, 12]);
        input.next_tick();
        input.press();
        ctx.update(&input, |ctx| build(ctx, &mut built)).unwrap();
        input.next_tick();
        input.release();
        input.move_cursor([190, 90]);
        ctx.update(&input, |ctx| build(ctx, &mut built)).unwrap();
        input.next_tick();
        input.press();
        ctx.update(&input, |ctx| build(ctx, &mut built)).unwrap();
        input.next_tick();
        input.move_cursor([230, 110]);
        ctx.update(&input, |ctx| build(ctx, &mut built)).unwrap();
        assert_eq!(ctx.root_container_layouts()[0].bounds, Rect::new(0, 0, 240, 120));
        input.next_tick();
        input.move_cursor([0, 0]);
        ctx.update(&input, |ctx| build(ctx, &mut built)).unwrap();
        assert_eq!(ctx.root_container_layouts()[0].bounds, Rect::new(0, 0, 96, 64));
    }

    #[test]
    fn clicking_raises_window() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let build = |ctx: &mut Context| -> Result<()> {
            ctx.window("A", Rect::new(0, 0, 100, 100), |_, _| ());
            ctx.window("B", Rect::new(50, 50, 100, 100), |_, _| ());
            Ok(())
        };
        ctx.update(&input, build).unwrap();
        let b_id = ctx.root_containers[1];
        // Press in the part of A that B doesn't cover.
        input.move_cursor([20, 60]);
        input.press();
        ctx.update(&input, build).unwrap();
        assert_ne!(*ctx.root_containers.last().unwrap(), b_id);
        // Press in the overlap: B is below now, so A stays on top.
        input.next_tick();
        input.release();
        ctx.update(&input, build).unwrap();
        input.next_tick();
        input.move_cursor([70, 70]);
        input.press();
        ctx.update(&input, build).unwrap();
        assert_ne!(*ctx.root_containers.last().unwrap(), b_id);
        // Press where only B is.
        input.next_tick();
        input.release();
        ctx.update(&input, build).unwrap();
        input.next_tick();
        input.move_cursor([140, 140]);
        input.press();
        ctx.update(&input, build).unwrap();
        assert_eq!(*ctx.root_containers.last().unwrap(), b_id);
    }

    #[derive(Default)]
    struct PopupState {
        popup: Option<PopupId>,
        shown: usize,
        picked: bool,
    }

    fn popup_window(ctx: &mut Context, st: &mut PopupState) -> Result<()> {
        ctx.window("W", Rect::new(0, 0, 200, 200), |ctx, _| {
            st.popup = ctx.popup(|ctx, _| {
                st.shown += 1;
                ctx.button("pick").on(|| st.picked = true);
            });
        });
        Ok(())
    }

    #[test]
    fn popup_lifecycle() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut st = PopupState::default();

        ctx.update(&input, |ctx| popup_window(ctx, &mut st)).unwrap();
        assert_eq!(st.shown, 0);
        assert_eq!(ctx.root_container_layouts().len(), 1);

        input.move_cursor([50, 50]);
        input.next_tick();
        ctx.update(&input, |ctx| popup_window(ctx, &mut st)).unwrap();
        ctx.open_popup(st.popup.unwrap());
        input.next_tick();
        ctx.update(&input, |ctx| popup_window(ctx, &mut st)).unwrap();
        assert_eq!(st.shown, 1);
        assert_eq!(ctx.root_container_layouts().len(), 2);

        // Auto-size follows the content with a frame of lag.
        for _ in 0..2 {
            input.next_tick();
            ctx.update(&input, |ctx| popup_window(ctx, &mut st)).unwrap();
        }
        let layouts = ctx.root_container_layouts();
        let b = layouts[1].bounds;
        assert_eq!(b, Rect::new(50, 50, 80, 28));

        // Pressing the popup's button keeps the popup above its window.
        input.move_cursor(layouts[1].body_bounds.center());
        input.next_tick();
        input.press();
        ctx.update(&input, |ctx| popup_window(ctx, &mut st)).unwrap();
        assert!(st.picked);
        assert_eq!(ctx.root_container_layouts().len(), 2);
        assert_eq!(ctx.root_container_layouts()[1].bounds.pos, [50, 50]);

        // A press outside closes it. The builder still runs in that frame.
        input.next_tick();
        input.release();
        ctx.update(&input, |ctx| popup_window(ctx, &mut st)).unwrap();
        input.move_cursor([190, 190]);
        input.next_tick();
        input.press();
        ctx.update(&input, |ctx| popup_window(ctx, &mut st)).unwrap();
        input.next_tick();
        let before = st.shown;
        ctx.update(&input, |ctx| popup_window(ctx, &mut st)).unwrap();
        assert_eq!(st.shown, before);
        assert_eq!(ctx.root_container_layouts().len(), 1);

        // close_popup() works too.
        ctx.open_popup(st.popup.unwrap());
        input.next_tick();
        input.release();
        ctx.update(&input, |ctx| popup_window(ctx, &mut st)).unwrap();
        assert_eq!(ctx.root_container_layouts().len(), 2);
        ctx.close_popup(st.popup.unwrap());
        ctx.update(&input, |ctx| popup_window(ctx, &mut st)).unwrap();
        assert_eq!(ctx.root_container_layouts().len(), 1);
    }

    fn corner_popup(ctx: &mut Context, popup: &mut Option<PopupId>) -> Result<()> {
        ctx.window("W", Rect::new(0, 0, 100, 100), |ctx, _| {
            *popup = ctx.popup(|ctx, _| { ctx.button("pick"); });
        });
        Ok(())
    }

    #[test]
    fn closed_popup_does_not_capture_pointer() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut popup = None;

        // Opened near the window's corner, the popup sticks out of the window.
        input.move_cursor([90, 90]);
        ctx.update(&input, |ctx| corner_popup(ctx, &mut popup)).unwrap();
        ctx.open_popup(popup.unwrap());
        for _ in 0..3 {
            input.next_tick();
            ctx.update(&input, |ctx| corner_popup(ctx, &mut popup)).unwrap();
        }
        let b = ctx.root_container_layouts()[1].bounds;
        assert_eq!(b.pos, [90, 90]);
        assert!(b.contains([150, 100]));

        input.move_cursor([150, 100]);
        input.next_tick();
        let flags = ctx.update(&input, |ctx| corner_popup(ctx, &mut popup)).unwrap();
        assert!(flags.contains(CaptureFlags::HOVER));
        assert_eq!(ctx.hovering_root_container(), Some(popup.unwrap().0));

        // Once closed, the area it covered belongs to the game again.
        ctx.close_popup(popup.unwrap());
        input.next_tick();
        let flags = ctx.update(&input, |ctx| corner_popup(ctx, &mut popup)).unwrap();
        assert!(!flags.contains(CaptureFlags::HOVER));
        assert_eq!(ctx.hovering_root_container(), None);
        assert_eq!(ctx.root_container_layouts().len(), 1);
    }

    #[test]
    fn panel_scrolls_inside_window() {
        let mut ctx = Context::new();
        let input = ScriptedInput::new();
        let mut seen = ContainerLayout::default();
        let mut build = |ctx: &mut Context| -> Result<()> {
            ctx.window("W", Rect::new(0, 0, 300, 300), |ctx, _| {
                ctx.set_grid_layout(&[-1], &[100]);
                ctx.panel(WidgetOptions::empty(), |ctx, l| {
                    seen = l;
                    for i in 0..10 {
                        ctx.id_scope(&i.to_string(), |ctx| ctx.text("line"));
                    }
                    ctx.set_scroll([0, 40]);
                });
            });
            Ok(())
        };
        for _ in 0..3 {
            ctx.update(&input, &mut build).unwrap();
        }
        // Panel has the requested height and sits in the window body.
        assert_eq!(seen.bounds.height(), 100);
        assert_eq!(seen.scroll_offset, [0, 40]);
        assert!(seen.content_size[1] > 100);
        // Panel is a nested container: its commands go to the window, and it isn't a root.
        assert_eq!(ctx.root_containers.len(), 1);
        assert_eq!(ctx.containers.len(), 2);
    }
}
