use crate::{*, error::*};
use std::str::FromStr;

// Settings of the demo game. Command line flags override the defaults.
#[derive(Clone, Debug)]
pub struct ShooterSettings {
    pub screen_size: [usize; 2],
    pub scale: usize,
    // Ticks to simulate in the headless run.
    pub ticks: usize,
    pub ticks_per_second: usize,
    pub ship_speed: i64,
}

impl Default for ShooterSettings {
    fn default() -> Self { ShooterSettings {
        screen_size: [320, 240],
        scale: 2,
        ticks: 600,
        ticks_per_second: 60,
        ship_speed: 2,
    } }
}

impl ShooterSettings {
    // "320x240"
    pub fn parse_size(s: &str) -> Result<[usize; 2]> {
        let (w, h) = match s.split_once('x') {
            Some(p) => p,
            None => return err!(Format, "expected WxH, got '{}'", s),
        };
        Ok([usize::from_str(w.trim())?, usize::from_str(h.trim())?])
    }

    pub fn validate(&self) -> Result<()> {
        if self.screen_size[0] < 64 || self.screen_size[1] < 64 {
            return err!(Usage, "screen must be at least 64x64, got {}x{}", self.screen_size[0], self.screen_size[1]);
        }
        if self.scale < 1 || self.ticks_per_second < 1 {
            return err!(Usage, "scale and ticks per second must be positive");
        }
        Ok(())
    }
}
