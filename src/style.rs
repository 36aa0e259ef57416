use crate::{*, common_ui::*};

// Palette slots. Widget frames use the slot after the base one when hovered, and the one after that when focused (Button -> ButtonHover -> ButtonFocus).
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum ColorId {
    Text = 0,
    Border,
    WindowBg,
    TitleBg,
    TitleBgTransparent,
    TitleText,
    PanelBg,
    Button,
    ButtonHover,
    ButtonFocus,
    Base,
    BaseHover,
    BaseFocus,
    ScrollBase,
    ScrollThumb,
}
impl ColorId {
    pub const COUNT: usize = 15;

    pub fn highlighted(self, hover: bool, focus: bool) -> ColorId {
        match (self, focus, hover) {
            (Self::Button, true, _) => Self::ButtonFocus,
            (Self::Button, false, true) => Self::ButtonHover,
            (Self::Base, true, _) => Self::BaseFocus,
            (Self::Base, false, true) => Self::BaseHover,
            _ => self,
        }
    }
}

// Sizes are in unscaled UI pixels.
#[derive(Clone, Debug)]
pub struct Style {
    pub default_width: usize,
    pub default_height: usize,
    pub padding: usize,
    pub spacing: usize,
    pub indent: usize, // tree node nesting; usually the text line height
    pub title_height: usize,
    pub scrollbar_size: usize,
    pub thumb_size: usize,
    pub colors: [Color; ColorId::COUNT],
}
impl Style {
    pub fn color(&self, id: ColorId) -> Color { self.colors[id as usize] }
}

impl Default for Style {
    fn default() -> Self { Style {
        default_width: 60,
        default_height: 18,
        padding: 5,
        spacing: 4,
        indent: 12,
        title_height: 24,
        scrollbar_size: 12,
        thumb_size: 8,
        colors: [
            Color(230, 230, 230, 255), // text
            Color(60, 60, 60, 255),    // border
            Color(45, 45, 45, 230),    // window bg
            Color(30, 30, 30, 255),    // title bg
            Color(20, 20, 20, 204),    // title bg, collapsed
            Color(240, 240, 240, 255), // title text
            Color(0, 0, 0, 0),         // panel bg
            Color(75, 75, 75, 255),    // button
            Color(95, 95, 95, 255),
            Color(115, 115, 115, 255),
            Color(30, 30, 30, 255),    // base
            Color(35, 35, 35, 255),
            Color(40, 40, 40, 255),
            Color(43, 43, 43, 255),    // scroll base
            Color(30, 30, 30, 255),    // scroll thumb
        ],
    } }
}
