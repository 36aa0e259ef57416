use crate::{*, common_ui::*, error::*, id::*, imgui::*, input::*, style::*, draw::*};
use std::{mem, panic::Location};

// Numbers editable by number fields and sliders.
pub(crate) trait Number: Copy + PartialEq + Default {
    fn parse(s: &str) -> Option<Self>;
    fn stepped(self, step: Self, up: bool) -> Self;
}
impl Number for i64 {
    fn parse(s: &str) -> Option<Self> { s.trim().parse().ok() }
    fn stepped(self, step: Self, up: bool) -> Self { if up { self.saturating_add(step) } else { self.saturating_sub(step) } }
}
impl Number for f64 {
    fn parse(s: &str) -> Option<Self> { s.trim().parse().ok() }
    fn stepped(self, step: Self, up: bool) -> Self { if up { self + step } else { self - step } }
}

impl Context {
    #[track_caller]
    pub fn button(&mut self, label: &str) -> Event {
        let part = self.ids.caller(Location::caller());
        self.wrap_event(|ctx| {
            let id = ctx.child_id(part)?;
            ctx.button_impl(label, WidgetOptions::ALIGN_CENTER, id)
        })
    }

    fn button_impl(&mut self, label: &str, opt: WidgetOptions, id: WidgetId) -> Result<Event> {
        self.widget(Some(id), opt, None, &mut (), |ctx, _, _, _| {
            Event::from(ctx.input.pointing.just_pressed() && ctx.focus == Some(id))
        }, |ctx, _, r| {
            ctx.draw_widget_frame(id, r, ColorId::Button, opt);
            if !label.is_empty() {
                ctx.draw_widget_text(label, r, ColorId::Text, opt);
            }
        })
    }

    #[track_caller]
    pub fn checkbox(&mut self, state: &mut bool, label: &str) -> Event {
        let part = self.ids.caller(Location::caller());
        self.wrap_event(|ctx| {
            let id = ctx.child_id(part)?;
            ctx.widget(Some(id), WidgetOptions::empty(), None, state, |ctx, state, _, _| {
                if ctx.input.pointing.just_pressed() && ctx.focus == Some(id) {
                    *state = !*state;
                    return Event::fire();
                }
                Event::none()
            }, |ctx, state, r| {
                let lh = ctx.line_height();
                let b = Rect::new(r.x(), r.y() + (r.height() as isize - lh as isize) / 2, lh, lh);
                ctx.draw_widget_frame(id, b, ColorId::Base, WidgetOptions::empty());
                if *state {
                    let color = ctx.style.color(ColorId::Text);
                    ctx.draw_icon(Icon::Check, b, color);
                }
                if !label.is_empty() {
                    let r = Rect::from_corners([r.x() + lh as isize, r.y()], [r.right(), r.bottom()]);
                    ctx.draw_widget_text(label, r, ColorId::Text, WidgetOptions::empty());
                }
            })
        })
    }

    // Integer slider over [low, high], snapping to multiples of `step` (0 = no snapping). Shift+click to type a value.
    #[track_caller]
    pub fn slider(&mut self, value: &mut i64, low: i64, high: i64, step: i64) -> Event {
        let part = self.ids.caller(Location::caller());
        self.wrap_event(|ctx| {
            let id = ctx.child_id(part)?;
            ctx.slider_impl(value, low, high, step, id, WidgetOptions::ALIGN_CENTER)
        })
    }

    fn slider_impl(&mut self, value: &mut i64, low: i64, high: i64, step: i64, id: WidgetId, opt: WidgetOptions) -> Result<Event> {
        if low > high {
            return err!(Usage, "slider low ({}) must be <= high ({})", low, high);
        }
        let last = *value;
        if self.number_text_field(value, id, &|v: i64| v.to_string())? {
            if self.number_edit == Some(id) {
                return Ok(Event::none());
            }
            // Typed value committed this frame.
            *value = (*value).max(low).min(high);
            return Ok(Event::from(*value != last));
        }

        let thumb = self.style.thumb_size;
        self.widget(Some(id), opt, None, value, |ctx, v, b, _| {
            if ctx.focus == Some(id) && ctx.input.pointing.pressed() {
                let w = b.width() as i128 - thumb as i128;
                if w > 0 {
                    let dx = (ctx.pointing_position()[X] - b.x() - thumb as isize / 2) as i128;
                    let mut x = low as i128 + dx * (high as i128 - low as i128 + step as i128) / w;
                    if step != 0 {
                        x = x / step as i128 * step as i128;
                    }
                    *v = x.max(low as i128).min(high as i128) as i64;
                }
            }
            *v = (*v).max(low).min(high);
            Event::from(*v != last)
        }, |ctx, v, b| {
            ctx.draw_widget_frame(id, b, ColorId::Base, opt);
            let range = high as i128 - low as i128;
            let x = if range > 0 { (*v as i128 - low as i128) * (b.width() as i128 - thumb as i128).max(0) / range } else { 0 };
            let t = Rect::new(b.x() + x as isize, b.y(), thumb, b.height());
            ctx.draw_widget_frame(id, t, ColorId::Button, opt);
            ctx.draw_widget_text(&v.to_string(), b, ColorId::Text, opt);
        })
    }

    // Float slider; the value is shown and edited with `digits` decimals.
    #[track_caller]
    pub fn slider_f(&mut self, value: &mut f64, low: f64, high: f64, step: f64, digits: usize) -> Event {
        let part = self.ids.caller(Location::caller());
        self.wrap_event(|ctx| {
            let id = ctx.child_id(part)?;
            ctx.slider_f_impl(value, low, high, step, digits, id, WidgetOptions::ALIGN_CENTER)
        })
    }

    fn slider_f_impl(&mut self, value: &mut f64, low: f64, high: f64, step: f64, digits: usize, id: WidgetId, opt: WidgetOptions) -> Result<Event> {
        if !(low <= high) {
            return err!(Usage, "slider low ({}) must be <= high ({})", low, high);
        }
        let last = *value;
        if self.number_text_field(value, id, &|v: f64| format!("{:.*}", digits, v))? {
            if self.number_edit == Some(id) {
                return Ok(Event::none());
            }
            *value = (*value).max(low).min(high);
            return Ok(Event::from(*value != last));
        }

        let thumb = self.style.thumb_size;
        self.widget(Some(id), opt, None, value, |ctx, v, b, _| {
            if ctx.focus == Some(id) && ctx.input.pointing.pressed() {
                let w = b.width() as f64 - thumb as f64;
                if w > 0.0 {
                    let dx = (ctx.pointing_position()[X] - b.x() - thumb as isize / 2) as f64;
                    *v = low + dx * (high - low + step) / w;
                    if step != 0.0 {
                        *v = (*v / step).round() * step;
                    }
                }
            }
            *v = (*v).max(low).min(high);
            Event::from(*v != last)
        }, |ctx, v, b| {
            ctx.draw_widget_frame(id, b, ColorId::Base, opt);
            let x = if high > low { (*v - low) * (b.width() as f64 - thumb as f64).max(0.0) / (high - low) } else { 0.0 };
            let t = Rect::new(b.x() + x as isize, b.y(), thumb, b.height());
            ctx.draw_widget_frame(id, t, ColorId::Button, opt);
            ctx.draw_widget_text(&format!("{:.*}", digits, v), b, ColorId::Text, opt);
        })
    }

    // Shift+click turns a slider into a text box for typing the value. Returns true if the text box was shown in this frame;
    // `value` is updated when the typed text is committed.
    fn number_text_field<T: Number>(&mut self, value: &mut T, id: WidgetId, format: &dyn Fn(T) -> String) -> Result<bool> {
        if self.input.pointing.just_pressed() && self.input.key_pressed(Key::Shift) && self.hover == Some(id) {
            self.number_edit = Some(id);
            self.number_edit_buf = format(*value);
            // The field's edit buffer may still hold the text of an earlier session.
            let text = self.number_edit_buf.clone();
            self.current_container_mut()?.text_edits.insert(id, text);
        }
        if self.number_edit != Some(id) {
            return Ok(false);
        }
        let mut buf = mem::take(&mut self.number_edit_buf);
        let committed = self.text_field_raw(&mut buf, id, WidgetOptions::ALIGN_RIGHT);
        if committed?.is_fired() {
            *value = T::parse(&buf).unwrap_or_default();
            self.number_edit = None;
            self.current_container_mut()?.text_edits.remove(&id);
        }
        self.number_edit_buf = buf;
        Ok(true)
    }

    // Single-line text input. Fires when editing is committed: Enter, or focus moving elsewhere.
    #[track_caller]
    pub fn text_field(&mut self, buf: &mut String) -> Event {
        let part = self.ids.caller(Location::caller());
        self.wrap_event(|ctx| {
            let id = ctx.child_id(part)?;
            ctx.text_field_raw(buf, id, WidgetOptions::empty())
        })
    }

    // Replaces the text of the text field created just before, including text being edited.
    pub fn set_text_field_value(&mut self, value: &str) {
        self.wrap(|ctx| {
            let id = match ctx.current_id {
                Some(id) => id,
                None => return Ok(()),
            };
            if let Some(edit) = ctx.current_container_mut()?.text_edits.get_mut(&id) {
                edit.clear();
                edit.push_str(value);
            }
            Ok(())
        });
    }

    pub(crate) fn text_field_raw(&mut self, buf: &mut String, id: WidgetId, opt: WidgetOptions) -> Result<Event> {
        let opt = opt | WidgetOptions::HOLD_FOCUS;
        self.widget(Some(id), opt, None, buf, |ctx, buf, _, was_focused| ctx.edit_text(buf, id, was_focused), |ctx, buf, r| ctx.draw_text_field(buf, id, r, opt))
    }

    fn edit_text(&mut self, buf: &mut String, id: WidgetId, was_focused: bool) -> Event {
        let focused = self.focus == Some(id);
        let cnt_id = match self.container_stack.last() {
            Some(c) => *c,
            None => return Event::none(),
        };
        let cnt = match self.containers.get_mut(&cnt_id) {
            Some(c) => c,
            None => return Event::none(),
        };
        let edit = cnt.text_edits.entry(id).or_insert_with(|| buf.clone());
        if !focused {
            if *buf != *edit {
                edit.clone_from(buf);
            }
            return Event::from(was_focused);
        }

        // Typing and editing keys don't mix within one frame.
        let typed: String = self.input.typed.chars().filter(|c| !c.is_control()).collect();
        let handled = !typed.is_empty();
        edit.push_str(&typed);
        if *buf != *edit {
            buf.clone_from(edit);
        }
        if !handled {
            if self.input.key_repeated(Key::Backspace) && pop_grapheme(buf) {
                edit.clone_from(buf);
            }
            if self.input.key_just_pressed(Key::Enter) {
                return Event::fire();
            }
        }
        Event::none()
    }

    fn draw_text_field(&mut self, buf: &str, id: WidgetId, r: Rect, opt: WidgetOptions) {
        self.draw_widget_frame(id, r, ColorId::Base, opt);
        if self.focus != Some(id) {
            self.draw_widget_text(buf, r, ColorId::Text, opt);
            return;
        }
        // Keep the end of the text and the caret visible.
        let color = self.style.color(ColorId::Text);
        let pad = self.style.padding as isize;
        let tw = self.metrics.text_width(buf) as isize;
        let th = self.metrics.line_height();
        let w = r.width() as isize;
        let tx = if opt.contains(WidgetOptions::ALIGN_CENTER) {
            r.x() + (w - tw) / 2
        } else if opt.contains(WidgetOptions::ALIGN_RIGHT) {
            r.x() + w - tw - pad
        } else {
            r.x() + (w - pad - tw - 1).min(pad)
        };
        let ty = r.y() + (r.height() as isize - th as isize) / 2;
        self.push_clip_rect(r);
        self.draw_text(buf, [tx, ty], color);
        self.draw_rect(Rect::new(tx + tw, ty, 1, th), color);
        self.pop_clip_rect();
    }

    // Text field for an integer, with up/down buttons next to it. Up/Down keys step the value while the field is focused.
    #[track_caller]
    pub fn number_field(&mut self, value: &mut i64, step: i64) -> Event {
        let part = self.ids.caller(Location::caller());
        self.wrap_event(|ctx| ctx.number_field_impl(value, step, part, &|v: i64| v.to_string()))
    }

    #[track_caller]
    pub fn number_field_f(&mut self, value: &mut f64, step: f64, digits: usize) -> Event {
        let part = self.ids.caller(Location::caller());
        self.wrap_event(|ctx| ctx.number_field_impl(value, step, part, &|v: f64| format!("{:.*}", digits, v)))
    }

    fn number_field_impl<T: Number>(&mut self, value: &mut T, step: T, part: IdPart, format: &dyn Fn(T) -> String) -> Result<Event> {
        let last = *value;
        let mut fired = false;
        self.with_id_part(part, |ctx, id| {
            ctx.grid_cell_impl(|ctx, _| {
                let lh = ctx.line_height() as isize;
                ctx.layout()?.set_grid(&[-1, lh], &[]);

                let mut buf = format(*value);
                if ctx.text_field_raw(&mut buf, id, WidgetOptions::ALIGN_RIGHT)?.is_fired() {
                    ctx.set_focus(None);
                    *value = T::parse(&buf).unwrap_or_default();
                    fired |= *value != last;
                }
                if ctx.focus == Some(id) {
                    let up = ctx.input.key_repeated(Key::Up);
                    let down = ctx.input.key_repeated(Key::Down);
                    if up || down {
                        let mut v = T::parse(&buf).unwrap_or_default();
                        if up {
                            v = v.stepped(step, true);
                        }
                        if down {
                            v = v.stepped(step, false);
                        }
                        *value = v;
                        let text = format(v);
                        if let Some(edit) = ctx.current_container_mut()?.text_edits.get_mut(&id) {
                            *edit = text;
                        }
                        fired = true;
                    }
                }

                ctx.grid_cell_impl(|ctx, _| {
                    ctx.layout()?.set_grid(&[], &[-1, -1]);
                    let up_id = id.push(ctx.ids.string("up"))?;
                    let down_id = id.push(ctx.ids.string("down"))?;
                    if ctx.spin_button(Icon::Up, up_id, up_id, down_id)?.is_fired() {
                        *value = value.stepped(step, true);
                        fired = true;
                    }
                    if ctx.spin_button(Icon::Down, down_id, up_id, down_id)?.is_fired() {
                        *value = value.stepped(step, false);
                        fired = true;
                    }
                    Ok(())
                })
            })
        })?;
        Ok(Event::from(fired))
    }

    // Fires on press and then auto-repeats while either spin button is held, as long as the pointer is on this one.
    fn spin_button(&mut self, icon: Icon, id: WidgetId, up_id: WidgetId, down_id: WidgetId) -> Result<Event> {
        let opt = WidgetOptions::ALIGN_CENTER;
        self.widget(Some(id), opt, None, &mut (), |ctx, _, b, _| {
            let held = ctx.focus == Some(up_id) || ctx.focus == Some(down_id);
            Event::from(held && ctx.input.pointing_repeated() && b.contains(ctx.pointing_position()))
        }, |ctx, _, b| {
            ctx.draw_widget_frame(id, b, ColorId::Button, opt);
            let color = ctx.style.color(ColorId::Text);
            ctx.draw_icon(icon, b, color);
        })
    }

    // Button showing the selected option; clicking it opens a list of all options below it.
    #[track_caller]
    pub fn dropdown<S: AsRef<str>>(&mut self, selected: &mut usize, options: &[S]) -> Event {
        let part = self.ids.caller(Location::caller());
        self.wrap_event(|ctx| ctx.dropdown_impl(selected, options, part))
    }

    fn dropdown_impl<S: AsRef<str>>(&mut self, selected: &mut usize, options: &[S], part: IdPart) -> Result<Event> {
        if options.is_empty() {
            return Ok(Event::none());
        }
        if *selected >= options.len() {
            *selected = 0;
        }
        let last = *selected;
        let id = self.child_id(part)?;
        let tps = self.input.ticks_per_second;
        match self.container(id, WidgetOptions::empty()) {
            Some(cnt) => {
                if cnt.dropdown_close_delay > 0 {
                    cnt.dropdown_close_delay -= 1;
                    if cnt.dropdown_close_delay == 0 {
                        cnt.open = false;
                    }
                }
                if cnt.layout.bounds.is_empty() {
                    cnt.open = false;
                }
            }
            None => return err!(Internal, "dropdown container wasn't created"),
        }

        // The list is a window of its own, on top of everything while open.
        self.window_impl("", Rect::default(), WidgetOptions::NO_RESIZE | WidgetOptions::NO_TITLE, part, |ctx, _| {
            if ctx.containers.get(&id).map_or(false, |c| c.open) {
                ctx.bring_to_front(id);
            }
            ctx.set_grid_layout(&[-1], &[]);
            ctx.loop_scope(options.len(), |ctx, i| {
                if ctx.button(options[i].as_ref()).is_fired() {
                    *selected = i;
                    if let Some(cnt) = ctx.containers.get_mut(&id) {
                        // Stay open briefly so the selection is visible and the click doesn't reach whatever is below.
                        cnt.dropdown_close_delay = (tps / 10).max(1);
                    }
                }
            });
        })?;

        let opt = WidgetOptions::ALIGN_CENTER;
        let style = self.style.clone();
        let n = options.len();
        self.widget(Some(id), opt, None, selected, |ctx, selected, b, _| {
            let just_pressed = ctx.input.pointing.just_pressed();
            let p = ctx.pointing_position();
            let focused = ctx.focus == Some(id);
            let cnt = match ctx.containers.get_mut(&id) {
                Some(c) => c,
                None => return Event::none(),
            };
            if cnt.open && just_pressed && !b.contains(p) && !cnt.layout.bounds.contains(p) && cnt.dropdown_close_delay == 0 {
                cnt.open = false;
            }
            if just_pressed && focused {
                cnt.dropdown_close_delay = 0;
                if cnt.open {
                    cnt.open = false;
                } else {
                    cnt.open = true;
                    let h = (n * (style.default_height + style.padding + 1)).min(style.default_height * 12);
                    cnt.layout.bounds = Rect::new(b.x(), b.bottom(), b.width(), h);
                    log::debug!("dropdown {:?} opened with {} options", id, n);
                }
            }
            Event::from(*selected != last)
        }, |ctx, selected, b| {
            ctx.draw_widget_frame(id, b, ColorId::Button, opt);
            let aw = b.height();
            let text_r = Rect::new(b.x(), b.y(), b.width().saturating_sub(aw), b.height());
            ctx.draw_widget_text(options[*selected].as_ref(), text_r, ColorId::Text, opt);
            let open = ctx.containers.get(&id).map_or(false, |c| c.open);
            let color = ctx.style.color(ColorId::Text);
            ctx.draw_icon(if open {Icon::Up} else {Icon::Down}, Rect::new(b.right() - aw as isize, b.y(), aw, b.height()), color);
        })
    }

    // Collapsible section: `f` builds the content while expanded. Clicking the header toggles it starting from the next frame.
    #[track_caller]
    pub fn header(&mut self, label: &str, expanded: bool, f: impl FnOnce(&mut Context)) {
        let part = self.ids.caller(Location::caller());
        self.wrap(|ctx| {
            let id = ctx.child_id(part)?;
            let opt = if expanded {WidgetOptions::EXPANDED} else {WidgetOptions::empty()};
            ctx.header_impl(label, false, opt, id, |ctx| { f(ctx); Ok(()) })
        });
    }

    // Like header(), but drawn without a frame and indenting its content.
    #[track_caller]
    pub fn tree_node(&mut self, label: &str, f: impl FnOnce(&mut Context)) {
        let part = self.ids.caller(Location::caller());
        self.wrap(|ctx| {
            let id = ctx.child_id(part)?;
            ctx.header_impl(label, true, WidgetOptions::empty(), id, |ctx| {
                let indent = ctx.style.indent as isize;
                ctx.layout()?.indent += indent;
                f(ctx);
                ctx.layout()?.indent -= indent;
                Ok(())
            })
        });
    }

    fn header_impl(&mut self, label: &str, is_tree_node: bool, opt: WidgetOptions, id: WidgetId, f: impl FnOnce(&mut Context) -> Result<()>) -> Result<()> {
        self.layout()?.set_grid(&[], &[]);
        let toggled = self.current_container()?.is_toggled(id);
        let expanded = if opt.contains(WidgetOptions::EXPANDED) { !toggled } else { toggled };

        let e = self.widget(Some(id), WidgetOptions::empty(), None, &mut (), |ctx, _, _, _| {
            if ctx.input.pointing.just_pressed() && ctx.focus == Some(id) {
                if let Ok(cnt) = ctx.current_container_mut() {
                    cnt.toggle(id);
                }
            }
            Event::from(expanded)
        }, |ctx, _, b| {
            if is_tree_node {
                if ctx.hover == Some(id) {
                    ctx.draw_frame(b, ColorId::ButtonHover);
                }
            } else {
                ctx.draw_widget_frame(id, b, ColorId::Button, WidgetOptions::empty());
            }
            let h = b.height();
            let color = ctx.style.color(ColorId::Text);
            ctx.draw_icon(if expanded {Icon::Expanded} else {Icon::Collapsed}, Rect::new(b.x(), b.y(), h, h), color);
            let r = Rect::from_corners([b.x() + h as isize - ctx.style.padding as isize, b.y()], [b.right(), b.bottom()]);
            ctx.draw_widget_text(label, r, ColorId::Text, WidgetOptions::empty());
        })?;

        if e.is_fired() {
            f(self)?;
        }
        Ok(())
    }

    // Static text, word-wrapped to the cell width.
    pub fn text(&mut self, text: &str) {
        self.wrap(|ctx| ctx.grid_cell_impl(|ctx, bounds| {
            let lh = ctx.line_height() as isize;
            ctx.layout()?.set_grid(&[-1], &[lh]);
            let width = bounds.width().saturating_sub(ctx.style.padding);
            let lines = wrap_lines(text, width, |s| ctx.metrics.text_width(s));
            for line in &lines {
                ctx.widget(None, WidgetOptions::empty(), None, &mut (), |_, _, _, _| Event::none(), |ctx, _, r| {
                    ctx.draw_widget_text(line, r, ColorId::Text, WidgetOptions::empty());
                })?;
            }
            Ok(())
        }));
    }
}

#[cfg(test)]
mod tests {
    use crate::{*, imgui::*, headless::*, common_ui::*, input::*};
    use rand::random;

    // Runs a frame with a 200x200 window at the origin. Its first widget is at (5, 29), 178 wide (190 once the scrollbar check
    // sees that nothing overflows), 18 high.
    fn frame(ctx: &mut Context, input: &mut ScriptedInput, f: impl FnOnce(&mut Context)) -> CaptureFlags {
        let flags = ctx.update(&*input, |ctx| {
            ctx.window("W", Rect::new(0, 0, 200, 200), |ctx, _| f(ctx));
            Ok(())
        }).unwrap();
        input.next_tick();
        flags
    }

    #[test]
    fn button_fires_once_per_press() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut clicks = 0;
        input.move_cursor([50, 38]);
        frame(&mut ctx, &mut input, |ctx| { ctx.button("a").on(|| clicks += 1); });
        input.press();
        for _ in 0..5 {
            frame(&mut ctx, &mut input, |ctx| { ctx.button("a").on(|| clicks += 1); });
        }
        assert_eq!(clicks, 1);
        input.release();
        frame(&mut ctx, &mut input, |ctx| { ctx.button("a").on(|| clicks += 1); });
        input.press();
        frame(&mut ctx, &mut input, |ctx| { ctx.button("a").on(|| clicks += 1); });
        assert_eq!(clicks, 2);
    }

    #[test]
    fn checkbox_toggles() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut on = false;
        input.move_cursor([10, 38]);
        frame(&mut ctx, &mut input, |ctx| { ctx.checkbox(&mut on, "enabled"); });
        input.press();
        let mut fired = false;
        frame(&mut ctx, &mut input, |ctx| fired = ctx.checkbox(&mut on, "enabled").is_fired());
        assert!(fired && on);
        frame(&mut ctx, &mut input, |ctx| fired = ctx.checkbox(&mut on, "enabled").is_fired());
        assert!(!fired && on);
    }

    #[test]
    fn slider_drag_stays_in_range() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        frame(&mut ctx, &mut input, |_| ());
        for _ in 0..200 {
            let low = random::<i64>() % 1000;
            let high = low + (random::<u64>() % 1000) as i64;
            let step = (random::<u64>() % 10) as i64;
            let mut v = low;
            input.release();
            frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, low, high, step); });
            input.move_cursor([random::<isize>() % 400 - 100, 38]);
            input.press();
            frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, low, high, step); });
            assert!(v >= low && v <= high, "{} not in [{}, {}]", v, low, high);
            if step > 1 && v != low && v != high {
                assert_eq!(v % step, 0);
            }
        }
    }

    #[test]
    fn slider_ends_and_middle() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut v = 50.0;
        frame(&mut ctx, &mut input, |_| ());
        // Far right of the track is the maximum, far left the minimum.
        input.move_cursor([194, 38]);
        input.press();
        let mut fired = false;
        frame(&mut ctx, &mut input, |ctx| fired = ctx.slider_f(&mut v, 0.0, 100.0, 0.0, 1).is_fired());
        assert!(fired);
        assert_eq!(v, 100.0);
        input.move_cursor([5, 38]);
        frame(&mut ctx, &mut input, |ctx| fired = ctx.slider_f(&mut v, 0.0, 100.0, 0.0, 1).is_fired());
        assert!(fired);
        assert_eq!(v, 0.0);
        // Holding still doesn't fire.
        frame(&mut ctx, &mut input, |ctx| fired = ctx.slider_f(&mut v, 0.0, 100.0, 0.0, 1).is_fired());
        assert!(!fired);

        // Out-of-range value is clamped on the next frame even without input.
        input.release();
        let mut v = 500.0;
        frame(&mut ctx, &mut input, |ctx| fired = ctx.slider_f(&mut v, 0.0, 100.0, 0.0, 1).is_fired());
        assert!(fired);
        assert_eq!(v, 100.0);
    }

    #[test]
    fn shift_click_edits_slider_value() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut v = 3;
        let mut fired = false;
        input.move_cursor([50, 38]);
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 10, 1); });
        input.press_key(Key::Shift);
        input.press();
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 10, 1); });
        assert_eq!(ctx.number_edit_buf, "3");
        input.release();
        input.release_key(Key::Shift);
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 10, 1); });
        input.press_key(Key::Backspace);
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 10, 1); });
        input.release_key(Key::Backspace);
        input.type_text("42");
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 10, 1); });
        assert_eq!(v, 3);
        input.press_key(Key::Enter);
        frame(&mut ctx, &mut input, |ctx| fired = ctx.slider(&mut v, 0, 10, 1).is_fired());
        // Typed value is clamped to the range.
        assert!(fired);
        assert_eq!(v, 10);
        assert!(ctx.number_edit.is_none());
    }

    #[test]
    fn second_slider_edit_starts_from_current_value() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut v = 3;
        let mut fired = false;
        input.move_cursor([50, 38]);
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 100, 1); });
        input.press_key(Key::Shift);
        input.press();
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 100, 1); });
        input.release();
        input.release_key(Key::Shift);
        input.press_key(Key::Backspace);
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 100, 1); });
        input.release_key(Key::Backspace);
        input.type_text("22");
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 100, 1); });
        input.press_key(Key::Enter);
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 100, 1); });
        input.release_key(Key::Enter);
        assert_eq!(v, 22);
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 100, 1); });

        // The value changes behind the UI's back; the next edit shows it, and committing it unchanged keeps it.
        v = 50;
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 100, 1); });
        input.press_key(Key::Shift);
        input.press();
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 100, 1); });
        assert_eq!(ctx.number_edit_buf, "50");
        input.release();
        input.release_key(Key::Shift);
        frame(&mut ctx, &mut input, |ctx| { ctx.slider(&mut v, 0, 100, 1); });
        input.press_key(Key::Enter);
        frame(&mut ctx, &mut input, |ctx| fired = ctx.slider(&mut v, 0, 100, 1).is_fired());
        assert!(!fired);
        assert_eq!(v, 50);
        assert!(ctx.number_edit.is_none());
    }

    #[test]
    fn text_field_editing() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut text = String::from("héllo👍");
        let mut fired = false;
        input.move_cursor([50, 38]);
        frame(&mut ctx, &mut input, |ctx| { ctx.text_field(&mut text); });
        input.press();
        frame(&mut ctx, &mut input, |ctx| { ctx.text_field(&mut text); });
        input.release();

        // Backspace removes whole graphemes.
        input.press_key(Key::Backspace);
        frame(&mut ctx, &mut input, |ctx| { ctx.text_field(&mut text); });
        assert_eq!(text, "héllo");
        // Held: repeats only after the initial delay.
        for _ in 0..10 {
            frame(&mut ctx, &mut input, |ctx| { ctx.text_field(&mut text); });
        }
        assert_eq!(text, "héllo");
        input.release_key(Key::Backspace);

        input.type_text(" world");
        frame(&mut ctx, &mut input, |ctx| fired = ctx.text_field(&mut text).is_fired());
        assert_eq!(text, "héllo world");
        assert!(!fired);

        input.press_key(Key::Enter);
        frame(&mut ctx, &mut input, |ctx| fired = ctx.text_field(&mut text).is_fired());
        assert!(fired);
        input.release_key(Key::Enter);

        // Clicking elsewhere commits too.
        input.move_cursor([50, 150]);
        input.press();
        frame(&mut ctx, &mut input, |ctx| fired = ctx.text_field(&mut text).is_fired());
        assert!(fired);
        frame(&mut ctx, &mut input, |ctx| fired = ctx.text_field(&mut text).is_fired());
        assert!(!fired);

        // Unfocused field follows the caller's string.
        text = String::from("reset");
        frame(&mut ctx, &mut input, |ctx| { ctx.text_field(&mut text); });
        assert_eq!(text, "reset");
    }

    #[test]
    fn set_text_field_value_replaces_edit() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut text = String::from("abc");
        input.move_cursor([50, 38]);
        frame(&mut ctx, &mut input, |ctx| { ctx.text_field(&mut text); });
        input.press();
        frame(&mut ctx, &mut input, |ctx| { ctx.text_field(&mut text); });
        input.release();
        frame(&mut ctx, &mut input, |ctx| {
            ctx.text_field(&mut text);
            ctx.set_text_field_value("xyz");
        });
        input.type_text("!");
        frame(&mut ctx, &mut input, |ctx| { ctx.text_field(&mut text); });
        assert_eq!(text, "xyz!");
    }

    #[test]
    fn number_field_keys_and_spin_buttons() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut v = 10;
        let mut fired = false;
        // Text part spans the cell minus the spin column (12 wide) and spacing.
        input.move_cursor([50, 38]);
        frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });
        frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });
        input.press();
        frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });
        input.release();
        input.press_key(Key::Up);
        frame(&mut ctx, &mut input, |ctx| fired = ctx.number_field(&mut v, 5).is_fired());
        assert!(fired);
        assert_eq!(v, 15);
        input.release_key(Key::Up);
        input.press_key(Key::Down);
        frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });
        frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });
        assert_eq!(v, 10);
        input.release_key(Key::Down);

        // Typing garbage and committing gives 0.
        input.type_text("x");
        frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });
        input.press_key(Key::Enter);
        frame(&mut ctx, &mut input, |ctx| fired = ctx.number_field(&mut v, 5).is_fired());
        assert!(fired);
        assert_eq!(v, 0);
        input.release_key(Key::Enter);

        // Upper half of the spin column steps up; holding it repeats after the delay.
        let spin = [194 - 6, 31];
        input.move_cursor(spin);
        frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });
        input.press();
        frame(&mut ctx, &mut input, |ctx| fired = ctx.number_field(&mut v, 5).is_fired());
        assert!(fired);
        assert_eq!(v, 5);
        for _ in 0..25 {
            frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });
        }
        assert_eq!(v, 10);
        input.release();
        frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });

        let mut f = 1.5;
        input.move_cursor([spin[0], 44]);
        frame(&mut ctx, &mut input, |ctx| { ctx.number_field_f(&mut f, 0.25, 2); });
        input.press();
        frame(&mut ctx, &mut input, |ctx| { ctx.number_field_f(&mut f, 0.25, 2); });
        assert_eq!(f, 1.25);
    }

    #[test]
    fn spin_repeat_follows_pointer_between_buttons() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut v = 0;
        input.move_cursor([188, 31]);
        frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });
        input.press();
        frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });
        assert_eq!(v, 5);
        // Still holding the up button's press, slide onto the down button: the repeat steps down.
        input.move_cursor([188, 44]);
        for _ in 0..25 {
            frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });
        }
        assert_eq!(v, 0);
        // Off both buttons nothing repeats.
        input.move_cursor([100, 150]);
        for _ in 0..8 {
            frame(&mut ctx, &mut input, |ctx| { ctx.number_field(&mut v, 5); });
        }
        assert_eq!(v, 0);
        input.release();
    }

    fn open_roots(ctx: &Context) -> usize { ctx.root_container_layouts().len() }

    #[test]
    fn dropdown_selection() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let options = ["zero", "one", "two", "three"];
        let mut sel = 7;
        let mut fired = false;

        frame(&mut ctx, &mut input, |ctx| { ctx.dropdown(&mut sel, &options); });
        assert_eq!(sel, 0);
        assert_eq!(open_roots(&ctx), 1);

        input.move_cursor([100, 38]);
        input.press();
        frame(&mut ctx, &mut input, |ctx| { ctx.dropdown(&mut sel, &options); });
        // The list window appears in the next frame: below the control, full width, one row per option.
        input.release();
        frame(&mut ctx, &mut input, |ctx| { ctx.dropdown(&mut sel, &options); });
        assert_eq!(open_roots(&ctx), 2);
        let list = ctx.root_container_layouts()[1].bounds;
        assert_eq!(list, Rect::new(5, 47, 190, 4 * (18 + 5 + 1)));

        // Second row of the list.
        input.move_cursor([100, 47 + 5 + 18 + 4 + 9]);
        input.press();
        frame(&mut ctx, &mut input, |ctx| fired = ctx.dropdown(&mut sel, &options).is_fired());
        assert!(fired);
        assert_eq!(sel, 1);
        input.release();
        // Stays open for 6 frames at 60 tps. A press outside doesn't close it meanwhile.
        frame(&mut ctx, &mut input, |ctx| fired = ctx.dropdown(&mut sel, &options).is_fired());
        assert_eq!(open_roots(&ctx), 2);
        input.move_cursor([100, 190]);
        input.press();
        frame(&mut ctx, &mut input, |ctx| { ctx.dropdown(&mut sel, &options); });
        assert_eq!(open_roots(&ctx), 2);
        input.release();
        for _ in 0..4 {
            frame(&mut ctx, &mut input, |ctx| { ctx.dropdown(&mut sel, &options); });
        }
        assert_eq!(open_roots(&ctx), 1);

        // Open again; with no selection pending, a press outside closes right away.
        input.move_cursor([100, 38]);
        input.press();
        frame(&mut ctx, &mut input, |ctx| { ctx.dropdown(&mut sel, &options); });
        assert_eq!(open_roots(&ctx), 2);
        input.release();
        frame(&mut ctx, &mut input, |ctx| { ctx.dropdown(&mut sel, &options); });
        input.move_cursor([100, 190]);
        input.press();
        frame(&mut ctx, &mut input, |ctx| fired = ctx.dropdown(&mut sel, &options).is_fired());
        assert!(!fired);
        assert_eq!(sel, 1);
        assert_eq!(open_roots(&ctx), 1);
    }

    #[test]
    fn header_and_tree_node() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        let mut shown = (false, false);
        let mut inner_x = 0;
        let build = |ctx: &mut Context, shown: &mut (bool, bool), inner_x: &mut isize| {
            ctx.header("open", true, |ctx| {
                shown.0 = true;
                ctx.tree_node("node", |ctx| {
                    shown.1 = true;
                    ctx.grid_cell(|_, r| *inner_x = r.x());
                });
            });
        };
        frame(&mut ctx, &mut input, |ctx| build(ctx, &mut shown, &mut inner_x));
        assert_eq!(shown, (true, false));

        // Tree node is the second row.
        input.move_cursor([50, 29 + 18 + 4 + 9]);
        input.press();
        frame(&mut ctx, &mut input, |ctx| build(ctx, &mut shown, &mut inner_x));
        shown = (false, false);
        frame(&mut ctx, &mut input, |ctx| build(ctx, &mut shown, &mut inner_x));
        assert_eq!(shown, (true, true));
        assert_eq!(inner_x, 5 + 12);

        // Collapse the header.
        input.release();
        input.move_cursor([50, 38]);
        frame(&mut ctx, &mut input, |ctx| build(ctx, &mut shown, &mut inner_x));
        input.press();
        frame(&mut ctx, &mut input, |ctx| build(ctx, &mut shown, &mut inner_x));
        shown = (false, false);
        frame(&mut ctx, &mut input, |ctx| build(ctx, &mut shown, &mut inner_x));
        assert_eq!(shown, (false, false));
        input.release();
        for _ in 0..5 {
            frame(&mut ctx, &mut input, |ctx| build(ctx, &mut shown, &mut inner_x));
        }

        // Expanding the header again shows the node still open, though it wasn't built meanwhile.
        input.press();
        frame(&mut ctx, &mut input, |ctx| build(ctx, &mut shown, &mut inner_x));
        shown = (false, false);
        frame(&mut ctx, &mut input, |ctx| build(ctx, &mut shown, &mut inner_x));
        assert_eq!(shown, (true, true));
    }

    #[test]
    fn text_wraps_into_rows() {
        let mut ctx = Context::new();
        let mut input = ScriptedInput::new();
        frame(&mut ctx, &mut input, |_| ());
        frame(&mut ctx, &mut input, |ctx| {
            ctx.text("the quick brown fox jumps over the lazy dog and keeps running");
            ctx.grid_cell(|_, _| ());
        });
        let mut backend = RecordingBackend::new([320, 240]);
        ctx.draw(&mut backend);
        let texts = backend.texts();
        // Title, then the wrapped lines; none wider than the cell.
        assert!(texts.len() >= 3);
        for t in &texts[1..] {
            assert!(t.chars().count() * 6 <= 190 - 5, "{:?}", t);
        }
        assert_eq!(texts[1..].join(" "), "the quick brown fox jumps over the lazy dog and keeps running");
    }
}
