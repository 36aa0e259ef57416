#![allow(dead_code)]
#![allow(unused_variables)]
#![allow(unused_imports)]
use debugui::{*, error::*, settings::*, shooter::*};
use std::{process, str::FromStr};

fn usage(program: &str) -> ! {
    eprintln!("usage: {} [--ticks N] [--scale N] [--screen WxH] [--tps N]", program);
    process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut settings = ShooterSettings::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1usize;
    while i < args.len() {
        let value = match args.get(i + 1) {
            Some(v) => v,
            None => usage(&args[0]),
        };
        let parsed: Result<()> = match &args[i][..] {
            "--ticks" => usize::from_str(value).map(|n| settings.ticks = n).map_err(|e| e.into()),
            "--scale" => usize::from_str(value).map(|n| settings.scale = n).map_err(|e| e.into()),
            "--tps" => usize::from_str(value).map(|n| settings.ticks_per_second = n).map_err(|e| e.into()),
            "--screen" => ShooterSettings::parse_size(value).map(|s| settings.screen_size = s),
            x => {
                eprintln!("unrecognized argument: '{}'", x);
                usage(&args[0]);
            }
        };
        if let Err(e) = parsed {
            eprintln!("bad value for {}: {}", args[i], e);
            process::exit(1);
        }
        i += 2;
    }

    match run_headless(&settings) {
        Ok(s) => println!("{} ticks, ship at ({}, {}), {} bullets alive, {} fired", s.ticks, s.ship[0], s.ship[1], s.bullets_alive, s.bullets_fired),
        Err(e) => {
            eprintln!("fatal: {}", e);
            process::exit(1);
        }
    }
}
