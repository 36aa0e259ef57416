use crate::{*, common_ui::*, error::*, imgui::*, input::*, draw::*, headless::*, settings::*};

pub const SHIP_SIZE: i64 = 16;
pub const BULLET_LIFE: usize = 100;

#[derive(Clone, Debug)]
pub struct Bullet {
    pub pos: [f64; 2],
    pub vel: [f64; 2],
    pub life: usize,
}

// Tiny arcade game used to show the debug UI on top of something.
pub struct Game {
    pub screen: [i64; 2],
    pub ship: [i64; 2],
    pub speed: i64,
    pub bullets: Vec<Bullet>,
    pub fired: usize,
    pub paused: bool,
    pub quit: bool,
}

impl Game {
    pub fn new(settings: &ShooterSettings) -> Self {
        let screen = [settings.screen_size[X] as i64, settings.screen_size[Y] as i64];
        let ship = [(screen[X] - SHIP_SIZE) / 2, screen[Y] - SHIP_SIZE * 2];
        Game {screen, ship, speed: settings.ship_speed, bullets: Vec::new(), fired: 0, paused: false, quit: false}
    }

    pub fn tick(&mut self, input: &dyn InputSource) {
        if input.key_press_duration(Key::Escape) > 0 {
            self.quit = true;
            return;
        }
        if self.paused {
            return;
        }
        let held = |k: Key| input.key_press_duration(k) > 0;
        if held(Key::Left) {
            self.ship[X] -= self.speed;
        }
        if held(Key::Right) {
            self.ship[X] += self.speed;
        }
        if held(Key::Up) {
            self.ship[Y] -= self.speed;
        }
        if held(Key::Down) {
            self.ship[Y] += self.speed;
        }
        self.clamp_ship();

        if input.key_press_duration(Key::Space) == 1 {
            self.bullets.push(Bullet {pos: [(self.ship[X] + SHIP_SIZE / 2) as f64, self.ship[Y] as f64], vel: [0.0, -1.0], life: BULLET_LIFE});
            self.fired += 1;
        }
        for b in &mut self.bullets {
            b.pos[X] += b.vel[X];
            b.pos[Y] += b.vel[Y];
            b.life -= 1;
        }
        self.bullets.retain(|b| b.life > 0);
    }

    // Also applied after the debug UI edits the position.
    pub fn clamp_ship(&mut self) {
        for axis in [X, Y] {
            self.ship[axis] = self.ship[axis].max(0).min(self.screen[axis] - SHIP_SIZE);
        }
    }

    pub fn draw(&self, backend: &mut dyn DrawBackend, scale: usize) {
        backend.fill_rect(Rect::new(0, 0, self.screen[X] as usize, self.screen[Y] as usize).scaled(scale), Color::black());
        backend.fill_rect(Rect::new(self.ship[X] as isize, self.ship[Y] as isize, SHIP_SIZE as usize, SHIP_SIZE as usize).scaled(scale), Color(80, 200, 255, 255));
        for b in &self.bullets {
            backend.fill_rect(Rect::new(b.pos[X] as isize, b.pos[Y] as isize, 1, 2).scaled(scale), Color::white().fade(b.life as f32 / BULLET_LIFE as f32));
        }
    }
}

// Debug window: edit the ship, tune speed, inspect bullets.
pub fn debug_ui(ctx: &mut Context, game: &mut Game) -> Result<()> {
    ctx.window("Debug", Rect::new(8, 8, 180, 200), |ctx, _| {
        ctx.set_grid_layout(&[40, -1], &[]);
        ctx.text("x");
        ctx.number_field(&mut game.ship[X], 1);
        ctx.text("y");
        ctx.number_field(&mut game.ship[Y], 1);
        ctx.text("speed");
        ctx.slider(&mut game.speed, 1, 5, 1);

        ctx.set_grid_layout(&[-1, -1], &[]);
        ctx.checkbox(&mut game.paused, "pause");
        ctx.button("clear").on(|| game.bullets.clear());

        ctx.set_grid_layout(&[], &[]);
        ctx.text(&format!("bullets: {} alive, {} fired", game.bullets.len(), game.fired));
        ctx.header("bullets", true, |ctx| {
            for (i, b) in game.bullets.iter().enumerate() {
                ctx.id_scope(&i.to_string(), |ctx| ctx.text(&format!("#{} at ({:.0}, {:.0}), {} ticks left", i, b.pos[X], b.pos[Y], b.life)));
            }
        });
    });
    game.clamp_ship();
    Ok(())
}

// Scripted play session: fly right, then up, fire periodically, press the "clear" button once, quit at the end.
pub fn script_tick(input: &mut ScriptedInput, tick: usize, ticks: usize, clear_button: Option<[isize; 2]>) {
    match tick {
        0 => input.press_key(Key::Right),
        40 => {
            input.release_key(Key::Right);
            input.press_key(Key::Up);
        }
        60 => input.release_key(Key::Up),
        _ => (),
    }
    match tick % 20 {
        5 => input.press_key(Key::Space),
        6 => input.release_key(Key::Space),
        _ => (),
    }
    if let Some(pos) = clear_button {
        if tick == ticks / 2 {
            input.press_at(pos);
        } else if tick == ticks / 2 + 1 {
            input.release();
        }
    }
    if tick + 1 >= ticks {
        input.press_key(Key::Escape);
    }
}

pub struct RunSummary {
    pub ticks: usize,
    pub ship: [i64; 2],
    pub bullets_alive: usize,
    pub bullets_fired: usize,
    pub ui_captured_ticks: usize,
    pub last_frame_calls: usize,
}

// Headless run: simulates the game with scripted input, builds the debug UI every tick, and replays the drawing into a recording backend.
pub fn run_headless(settings: &ShooterSettings) -> Result<RunSummary> {
    settings.validate()?;
    let mut ctx = Context::new();
    ctx.set_scale(settings.scale)?;
    let mut input = ScriptedInput::new();
    input.set_tps(settings.ticks_per_second);
    let mut backend = RecordingBackend::new([settings.screen_size[X] * settings.scale, settings.screen_size[Y] * settings.scale]);
    let mut game = Game::new(settings);

    // "clear" is in the right column of the fourth row: window (8, 8) + title 24 + padding 5, rows 18 + 4.
    let clear_button = [(8 + 5 + 120) as isize * settings.scale as isize, (8 + 24 + 5 + 3 * 22 + 9) as isize * settings.scale as isize];

    let mut ui_captured_ticks = 0;
    let mut flags = CaptureFlags::empty();
    let mut tick = 0;
    while tick < settings.ticks && !game.quit {
        script_tick(&mut input, tick, settings.ticks, Some(clear_button));
        // Keys go to the UI while it has focus (e.g. typing into a field).
        if !flags.contains(CaptureFlags::FOCUS) {
            game.tick(&input);
        }
        flags = ctx.update(&input, |ctx| debug_ui(ctx, &mut game))?;
        if !flags.is_empty() {
            ui_captured_ticks += 1;
        }

        backend.clear();
        game.draw(&mut backend, settings.scale);
        ctx.draw(&mut backend);

        input.next_tick();
        tick += 1;
    }

    let summary = RunSummary {ticks: tick, ship: game.ship, bullets_alive: game.bullets.len(), bullets_fired: game.fired, ui_captured_ticks, last_frame_calls: backend.calls.len()};
    log::info!("ran {} ticks: ship at {:?}, {} bullets alive of {} fired, ui captured input on {} ticks, {} draw calls in the last frame", summary.ticks, summary.ship, summary.bullets_alive, summary.bullets_fired, summary.ui_captured_ticks, summary.last_frame_calls);
    Ok(summary)
}
