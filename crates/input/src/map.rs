//! Menu key mappings for the intro and score sheet screens.

/// Splash screen selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroChoice {
    Instructions,
    Play,
}

/// Map a splash screen key. Case-insensitive.
pub fn intro_choice(key: char) -> Option<IntroChoice> {
    match key.to_ascii_uppercase() {
        'I' => Some(IntroChoice::Instructions),
        'P' => Some(IntroChoice::Play),
        _ => None,
    }
}

/// Instructions page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrChoice {
    NextPage,
    PrevPage,
    Start,
}

pub fn instr_choice(key: char) -> Option<InstrChoice> {
    match key.to_ascii_uppercase() {
        'N' => Some(InstrChoice::NextPage),
        'P' => Some(InstrChoice::PrevPage),
        'S' => Some(InstrChoice::Start),
        _ => None,
    }
}

/// Score sheet navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetChoice {
    Quit,
    FirstPage,
    PrevPage,
    NextPage,
    LastPage,
}

pub fn sheet_choice(key: char) -> Option<SheetChoice> {
    match key.to_ascii_uppercase() {
        'Q' => Some(SheetChoice::Quit),
        '1' => Some(SheetChoice::FirstPage),
        'P' => Some(SheetChoice::PrevPage),
        'N' => Some(SheetChoice::NextPage),
        'L' => Some(SheetChoice::LastPage),
        _ => None,
    }
}
