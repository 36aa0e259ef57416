#![allow(dead_code)]
#![allow(unused_variables)]
#![allow(unused_imports)]

pub mod error;
pub mod common_ui;
pub mod id;
pub mod input;
pub mod style;
pub mod layout;
pub mod draw;
pub mod container;
pub mod imgui;
pub mod widgets;
pub mod headless;
pub mod settings;
pub mod shooter;
