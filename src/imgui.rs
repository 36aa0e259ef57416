use crate::{*, common_ui::*, error::*, id::*, input::*, layout::*, style::*, draw::*, container::*};
use std::{collections::{HashMap, HashSet}, mem, panic::Location};
use bitflags::*;

// Immediate-mode UI: the whole UI is described again every frame by calling widget functions on a Context.
// Widgets have no objects; the little state that has to survive between frames (window positions, scroll offsets, expanded headers,
// text being edited) lives in containers keyed by widget identity, and identity comes from where in the code the widget was created.
// Containers that weren't touched during a frame are dropped at the end of it.

bitflags! {
#[derive(Default)]
pub struct WidgetOptions: u32 {
    const ALIGN_CENTER = 0x1;
    const ALIGN_RIGHT = 0x2;
    // Widget doesn't take hover or focus.
    const NO_INTERACT = 0x4;
    const NO_FRAME = 0x8;
    const NO_RESIZE = 0x10;
    const NO_SCROLL = 0x20;
    // No collapse button in the title bar.
    const NO_CLOSE = 0x40;
    const NO_TITLE = 0x80;
    // Keep focus after the pointer is released (text fields). Otherwise focus only lasts while the pointer is held.
    const HOLD_FOCUS = 0x100;
    // Container resizes itself to its content.
    const AUTO_SIZE = 0x200;
    // Closes when a press lands outside of it.
    const POPUP = 0x400;
    // Don't create the container if it doesn't exist yet.
    const CLOSED = 0x800;
    // Header starts expanded.
    const EXPANDED = 0x1000;
}}

bitflags! {
#[derive(Default)]
pub struct CaptureFlags: u8 {
    // Pointer is over one of the UI's windows.
    const HOVER = 0x1;
    // Some widget has focus, e.g. a text field is being edited.
    const FOCUS = 0x2;
}}

// Result of a widget call: whether the widget's event (click, value change, commit) happened during this frame.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Event {
    fired: bool,
}
impl Event {
    pub fn none() -> Self { Self {fired: false} }
    pub fn fire() -> Self { Self {fired: true} }
    pub fn is_fired(&self) -> bool { self.fired }

    // Calls `f` right away if the event fired. Example: ctx.button("Reset").on(|| speed = 1);
    pub fn on(self, f: impl FnOnce()) -> Self {
        if self.fired {
            f();
        }
        self
    }
}
impl From<bool> for Event { fn from(fired: bool) -> Self { Self {fired} } }

pub type LayoutHook<'a> = &'a mut dyn FnMut(&mut Context, Rect) -> Result<()>;

pub struct Context {
    pub(crate) input: InputState,
    pub(crate) style: Style,
    pub(crate) metrics: Box<dyn TextMetrics>,
    pub(crate) icons: IconSet,
    pub(crate) ids: IdInterner,
    scale: usize,

    pub(crate) hover: Option<WidgetId>,
    pub(crate) focus: Option<WidgetId>,
    // Last widget created; target of set_text_field_value().
    pub(crate) current_id: Option<WidgetId>,
    // Focused widget was seen this frame. If not, focus is dropped at the end of the frame.
    pub(crate) keep_focus: bool,
    // Container that receives the mouse wheel at the end of the frame. Last one under the pointer wins.
    pub(crate) scroll_target: Option<WidgetId>,
    // Slider currently replaced by a text box (shift+click).
    pub(crate) number_edit: Option<WidgetId>,
    pub(crate) number_edit_buf: String,

    pub(crate) id_stack: WidgetId,
    pub(crate) containers: HashMap<WidgetId, Container>,
    // Root containers (windows, popups), bottom to top.
    pub(crate) root_containers: Vec<WidgetId>,
    // Windows built this frame, to catch two windows sharing an identity.
    pub(crate) built_windows: HashSet<WidgetId>,
    // Widgets with an identity built this frame. Edit buffers of the others are dropped at the end of the frame.
    pub(crate) built_widgets: HashSet<WidgetId>,
    pub(crate) container_stack: Vec<WidgetId>,
    pub(crate) clip_stack: Vec<Rect>,
    pub(crate) layout_stack: Vec<Layout>,

    pub(crate) last_pointing_pos: [isize; 2],
    // Size of the destination at the last draw(), in physical pixels. [0, 0] before the first draw; no clamping to screen happens then.
    pub(crate) screen_size: [usize; 2],

    // First error of the current frame. All widget calls after it are no-ops.
    pub(crate) err: Option<Error>,
}

impl Context {
    pub fn new() -> Self {
        Self::with_metrics(Box::new(MonospaceMetrics::default()), IconSet::builtin())
    }

    pub fn with_metrics(metrics: Box<dyn TextMetrics>, icons: IconSet) -> Self {
        let mut style = Style::default();
        style.indent = metrics.line_height();
        Context {input: InputState::default(), style, metrics, icons, ids: IdInterner::new(), scale: 1, hover: None, focus: None, current_id: None, keep_focus: false, scroll_target: None, number_edit: None, number_edit_buf: String::new(), id_stack: WidgetId::default(), containers: HashMap::new(), root_containers: Vec::new(), built_windows: HashSet::new(), built_widgets: HashSet::new(), container_stack: Vec::new(), clip_stack: Vec::new(), layout_stack: Vec::new(), last_pointing_pos: [0, 0], screen_size: [0, 0], err: None}
    }

    pub fn style(&self) -> &Style { &self.style }
    pub fn set_style(&mut self, style: Style) { self.style = style; }

    pub fn scale(&self) -> usize { self.scale }

    // Integer scale applied to everything at draw time. Pointer positions are divided by it.
    pub fn set_scale(&mut self, scale: usize) -> Result<()> {
        if scale < 1 {
            return err!(Usage, "scale must be >= 1, got {}", scale);
        }
        self.scale = scale;
        Ok(())
    }

    // Error that aborted the current (or last) frame, if any.
    pub fn error(&self) -> Option<&Error> { self.err.as_ref() }

    pub fn line_height(&self) -> usize { self.metrics.line_height() }
    pub fn text_width(&self, s: &str) -> usize { self.metrics.text_width(s) }

    // Runs one frame: snapshots input, calls `f` to describe the UI, then finalizes focus, scrolling, z-order, and drops containers that weren't used.
    // Returns what the UI is capturing, so the host can decide whether the game should see the input too.
    pub fn update(&mut self, input: &dyn InputSource, f: impl FnOnce(&mut Context) -> Result<()>) -> Result<CaptureFlags> {
        self.input.update(input);
        self.begin_update();

        let built = f(self);
        let flags = self.capture_flags();
        let latched = self.err.clone();
        let ended = self.end_update();

        built?;
        if let Some(e) = latched {
            return Err(e);
        }
        ended?;
        Ok(flags)
    }

    fn begin_update(&mut self) {
        self.err = None;
        for cnt in self.containers.values_mut() {
            cnt.used = false;
        }
        for id in &self.root_containers {
            if let Some(cnt) = self.containers.get_mut(id) {
                cnt.commands.clear();
            }
        }
        self.built_windows.clear();
        self.built_widgets.clear();
        self.scroll_target = None;
        self.current_id = None;

        // Normally empty already. Not empty only if the previous frame failed the end-of-frame check; start clean regardless.
        self.id_stack = WidgetId::default();
        self.container_stack.clear();
        self.clip_stack.clear();
        self.layout_stack.clear();
    }

    fn capture_flags(&self) -> CaptureFlags {
        let mut flags = CaptureFlags::empty();
        let p = self.pointing_position();
        for id in &self.root_containers {
            let cnt = match self.containers.get(id) {
                Some(c) if c.open => c,
                _ => continue,
            };
            let mut bounds = cnt.layout.bounds;
            if cnt.collapsed {
                bounds.size[Y] = bounds.size[Y].min(self.style.title_height);
            }
            if bounds.contains(p) {
                flags.insert(CaptureFlags::HOVER);
            }
        }
        if self.focus.is_some() {
            flags.insert(CaptureFlags::FOCUS);
        }
        flags
    }

    fn end_update(&mut self) -> Result<()> {
        if !self.id_stack.is_root() {
            return err!(Sanity, "id stack must be empty at the end of the frame");
        }
        if !self.container_stack.is_empty() {
            return err!(Sanity, "container stack must be empty at the end of the frame");
        }
        if !self.clip_stack.is_empty() {
            return err!(Sanity, "clip stack must be empty at the end of the frame");
        }
        if !self.layout_stack.is_empty() {
            return err!(Sanity, "layout stack must be empty at the end of the frame");
        }

        if let Some(target) = self.scroll_target {
            let wheel = self.input.wheel;
            if let Some(cnt) = self.containers.get_mut(&target) {
                cnt.layout.scroll_offset[X] += (wheel[X] * -30.0) as isize;
                cnt.layout.scroll_offset[Y] += (wheel[Y] * -30.0) as isize;
            }
        }

        if !self.keep_focus {
            self.focus = None;
        }
        self.keep_focus = false;

        // Clicking a window raises it. When the press lands on an open popup, the popup is the hovered root, so it stays on top of its parent.
        if self.input.pointing.just_pressed() {
            if let Some(id) = self.hovering_root_container() {
                self.bring_to_front(id);
            }
        }

        self.last_pointing_pos = self.pointing_position();

        let before = self.containers.len();
        let containers = &self.containers;
        self.root_containers.retain(|id| containers.get(id).map_or(false, |c| c.used));
        self.containers.retain(|_, c| c.used);
        if self.containers.len() != before {
            log::debug!("pruned {} unused containers", before - self.containers.len());
        }

        let built = &self.built_widgets;
        for cnt in self.containers.values_mut() {
            cnt.retain_edits(built);
        }
        // Identity tokens stay alive while some remembered state refers to them, even if nothing used them this frame (e.g. a tree node under a collapsed header).
        let mut keep: HashSet<IdPart> = HashSet::new();
        for (id, cnt) in &self.containers {
            keep.extend(id.parts());
            for state in cnt.state_ids() {
                keep.extend(state.parts());
            }
        }
        for id in [self.hover, self.focus, self.number_edit].iter().flatten() {
            keep.extend(id.parts());
        }
        let evicted = self.ids.evict_unused(&keep);
        if evicted != 0 {
            log::debug!("evicted {} stale identity tokens", evicted);
        }
        Ok(())
    }

    pub(crate) fn latch(&mut self, e: Error) {
        if self.err.is_none() {
            log::warn!("ui frame aborted: {:?}", e);
            self.err = Some(e);
        }
    }

    // Runs a fallible widget body. Once an error happened in this frame, widgets do nothing and report no events.
    pub(crate) fn wrap_event(&mut self, f: impl FnOnce(&mut Self) -> Result<Event>) -> Event {
        if self.err.is_some() {
            return Event::none();
        }
        match f(self) {
            Ok(e) => e,
            Err(e) => {
                self.latch(e);
                Event::none()
            }
        }
    }

    pub(crate) fn wrap(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) {
        self.wrap_event(|ctx| f(ctx).map(|()| Event::none()));
    }

    // Runs `f` with `part` appended to the identity path. The path is restored on every exit, including errors.
    pub(crate) fn with_id_part<R>(&mut self, part: IdPart, f: impl FnOnce(&mut Self, WidgetId) -> Result<R>) -> Result<R> {
        let id = self.id_stack.push(part)?;
        let saved = mem::replace(&mut self.id_stack, id);
        let r = f(self, id);
        self.id_stack = saved;
        r
    }

    // Identity of a widget created at `part` in the current scope.
    pub(crate) fn child_id(&self, part: IdPart) -> Result<WidgetId> { self.id_stack.push(part) }

    // Gives widgets created inside `f` distinct identities, e.g. when the same code creates one widget per list element:
    //   for (i, name) in names.iter().enumerate() { ctx.id_scope(name, |ctx| { ctx.checkbox(&mut enabled[i], name); }); }
    #[track_caller]
    pub fn id_scope(&mut self, name: &str, f: impl FnOnce(&mut Context)) {
        let site = self.ids.caller(Location::caller());
        let name = self.ids.string(name);
        self.wrap(|ctx| ctx.with_id_part(site, |ctx, _| ctx.with_id_part(name, |ctx, _| { f(ctx); Ok(()) })));
    }

    // Calls `f` `count` times, each iteration in its own identity scope.
    #[track_caller]
    pub fn loop_scope(&mut self, count: usize, mut f: impl FnMut(&mut Context, usize)) {
        let site = self.ids.caller(Location::caller());
        self.wrap(|ctx| ctx.with_id_part(site, |ctx, _| {
            for i in 0..count {
                let part = ctx.ids.int(i);
                ctx.with_id_part(part, |ctx, _| { f(ctx, i); Ok(()) })?;
            }
            Ok(())
        }));
    }

    pub(crate) fn pointing_position(&self) -> [isize; 2] {
        let p = self.input.pointing.position();
        let s = self.scale as isize;
        [p[X] / s, p[Y] / s]
    }

    pub(crate) fn pointing_delta(&self) -> [isize; 2] {
        // A touch that just started teleports the pointer; don't treat that as movement.
        if self.input.pointing.is_touch_active() && self.input.pointing.just_pressed() {
            return [0, 0];
        }
        let p = self.pointing_position();
        [p[X] - self.last_pointing_pos[X], p[Y] - self.last_pointing_pos[Y]]
    }

    pub(crate) fn pointing_over(&self, bounds: Rect) -> bool {
        let p = self.pointing_position();
        if !bounds.contains(p) || !self.clip_rect().contains(p) {
            return false;
        }
        self.hovering_root_container() == self.current_root_container()
    }

    pub(crate) fn set_focus(&mut self, id: Option<WidgetId>) {
        self.focus = id;
        self.keep_focus = true;
    }

    // Hover/focus bookkeeping, once per widget per frame. Returns true if the widget lost focus just now.
    pub(crate) fn handle_input_for_widget(&mut self, id: Option<WidgetId>, bounds: Rect, opt: WidgetOptions) -> bool {
        let id = match id {
            Some(id) => id,
            None => return false,
        };
        if self.focus == Some(id) {
            self.keep_focus = true;
        }
        if opt.contains(WidgetOptions::NO_INTERACT) {
            return false;
        }

        let hover = self.pointing_over(bounds);
        if hover {
            self.hover = Some(id);
        }

        let mut was_focused = false;
        if self.focus == Some(id) {
            if self.input.pointing.just_pressed() && !hover {
                self.set_focus(None);
                was_focused = true;
            }
            if !self.input.pointing.pressed() && !opt.contains(WidgetOptions::HOLD_FOCUS) {
                self.set_focus(None);
                was_focused = true;
            }
        }

        if self.hover == Some(id) {
            if self.input.pointing.just_pressed() {
                self.set_focus(Some(id));
            } else if !hover {
                self.hover = None;
            }
        }
        was_focused
    }

    // The one widget primitive. Takes the next cell from the layout, optionally lays out nested content in it (`layout` hook, for composite widgets),
    // updates hover/focus, runs `input` to compute the widget's event, and runs `draw` unless the cell is scrolled out of the container's body.
    // `state` is the value the widget edits; `input` gets it mutably, `draw` sees the result.
    // Anonymous widgets (id = None) never get hover or focus.
    pub(crate) fn widget<S: ?Sized>(&mut self, id: Option<WidgetId>, opt: WidgetOptions, layout: Option<LayoutHook>, state: &mut S, input: impl FnOnce(&mut Context, &mut S, Rect, bool) -> Event, draw: impl FnOnce(&mut Context, &S, Rect)) -> Result<Event> {
        self.current_id = id;
        if let Some(id) = id {
            self.built_widgets.insert(id);
        }
        let bounds = self.layout_next()?;

        if let Some(hook) = layout {
            self.push_layout(bounds, [0, 0], false);
            let built = hook(self, bounds);
            let n = self.layout_stack.len();
            if n >= 2 {
                let (parents, child) = self.layout_stack.split_at_mut(n - 1);
                parents[n - 2].absorb_child(&child[0]);
            }
            let popped = self.pop_layout();
            built?;
            popped?;
        }

        let was_focused = self.handle_input_for_widget(id, bounds, opt);
        let e = input(self, state, bounds, was_focused);
        // Input still matters for widgets scrolled out of view (e.g. a header's content may be visible even if the header isn't).
        if !self.current_container()?.layout.body_bounds.overlaps(bounds) {
            return Ok(e);
        }
        draw(self, state, bounds);
        Ok(e)
    }

    // Like widget(), but at a fixed rect instead of the next layout cell. Used for window decorations and scrollbars.
    pub(crate) fn widget_at<S: ?Sized>(&mut self, id: Option<WidgetId>, opt: WidgetOptions, bounds: Rect, state: &mut S, input: impl FnOnce(&mut Context, &mut S, Rect, bool) -> Event, draw: impl FnOnce(&mut Context, &S, Rect)) -> Event {
        self.current_id = id;
        let was_focused = self.handle_input_for_widget(id, bounds, opt);
        let e = input(self, state, bounds, was_focused);
        draw(self, state, bounds);
        e
    }

    pub(crate) fn layout(&mut self) -> Result<&mut Layout> {
        match self.layout_stack.last_mut() {
            Some(l) => Ok(l),
            None => err!(Usage, "layout stack is empty; perhaps a window is absent"),
        }
    }

    pub(crate) fn push_layout(&mut self, body: Rect, scroll: [isize; 2], auto_resize: bool) {
        self.layout_stack.push(Layout::new(body, scroll, auto_resize));
    }

    // Pops the innermost layout and records its extent as the current container's content size.
    pub(crate) fn pop_layout(&mut self) -> Result<()> {
        let l = match self.layout_stack.pop() {
            Some(l) => l,
            None => return err!(Sanity, "pop_layout without a layout"),
        };
        self.current_container_mut()?.layout.content_size = l.content_size();
        Ok(())
    }

    pub(crate) fn layout_next(&mut self) -> Result<Rect> {
        match self.layout_stack.last_mut() {
            Some(l) => Ok(l.next_rect(&self.style)),
            None => err!(Usage, "layout stack is empty; perhaps a window is absent"),
        }
    }

    // Sets the grid for the following widgets in the current window/panel/cell. See Layout for the meaning of sizes.
    // Empty `widths` = one column spanning the whole width (windows), empty `heights` = rows of default height.
    pub fn set_grid_layout(&mut self, widths: &[isize], heights: &[isize]) {
        self.wrap(|ctx| {
            ctx.layout()?.set_grid(widths, heights);
            Ok(())
        });
    }

    // Takes one layout cell and lays out whatever `f` creates inside it, with its own grid.
    pub fn grid_cell(&mut self, f: impl FnOnce(&mut Context, Rect)) {
        self.wrap(|ctx| ctx.grid_cell_impl(|ctx, r| { f(ctx, r); Ok(()) }));
    }

    pub(crate) fn grid_cell_impl(&mut self, f: impl FnOnce(&mut Context, Rect) -> Result<()>) -> Result<()> {
        let mut f = Some(f);
        let mut hook = |ctx: &mut Context, r: Rect| -> Result<()> {
            match f.take() {
                Some(f) => f(ctx, r),
                None => Ok(()),
            }
        };
        self.widget(None, WidgetOptions::empty(), Some(&mut hook), &mut (), |_, _, _, _| Event::none(), |_, _, _| ())?;
        Ok(())
    }

    // Containers that are alive after the last frame, bottom to top.
    pub fn root_container_layouts(&self) -> Vec<ContainerLayout> {
        self.root_containers.iter().filter_map(|id| self.containers.get(id)).filter(|c| c.open).map(|c| c.layout).collect()
    }
}

impl Default for Context {
    fn default() -> Self { Self::new() }
}
