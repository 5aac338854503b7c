use std::fmt;

use serde::{Deserialize, Serialize};

pub const MAX_LINES: usize = 5;
pub const MAX_PARAMS: usize = 8;

macro_rules! slot_index {
    ($name:ident, $count:expr) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        pub struct $name(u8);

        impl $name {
            pub const FIRST: Self = Self(0);
            pub const COUNT: usize = $count;

            pub fn new(index: usize) -> Option<Self> {
                (index < $count).then_some(Self(index as u8))
            }

            /// Maps the 1-based numbering used on the remote wire protocol.
            pub fn from_wire(number: i64) -> Option<Self> {
                let index = usize::try_from(number.checked_sub(1)?).ok()?;
                Self::new(index)
            }

            pub fn wire(self) -> u8 {
                self.0 + 1
            }

            pub fn get(self) -> usize {
                self.0 as usize
            }

            pub fn as_u8(self) -> u8 {
                self.0
            }

            pub fn next(self) -> Option<Self> {
                Self::new(self.get() + 1)
            }

            pub fn prev(self) -> Option<Self> {
                self.get().checked_sub(1).and_then(Self::new)
            }

            pub fn all() -> impl Iterator<Item = Self> {
                (0..$count as u8).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

slot_index!(LineIndex, MAX_LINES);
slot_index!(ParamIndex, MAX_PARAMS);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    pub inverted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: String,
    pub ctrl: f32,
}

impl Param {
    pub fn is_defined(&self) -> bool {
        !self.name.is_empty() || !self.value.is_empty()
    }

    /// True for a slot that carries no data at all, including the control.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Control value as it should appear on screen; undefined slots show no bar.
    pub fn displayed_ctrl(&self) -> Option<f32> {
        self.is_defined().then_some(self.ctrl)
    }

    pub fn row_text(&self) -> String {
        if self.name.is_empty() || self.value.is_empty() {
            String::new()
        } else {
            format!("{}: {}", self.name, self.value)
        }
    }
}

/// Controller buttons, numbered the way the device reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    B,
    A,
    Right,
    Down,
    Left,
    Up,
}

impl Button {
    pub const ALL: [Button; 6] = [
        Button::B,
        Button::A,
        Button::Right,
        Button::Down,
        Button::Left,
        Button::Up,
    ];

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn id(self) -> u8 {
        match self {
            Button::B => 0,
            Button::A => 1,
            Button::Right => 2,
            Button::Down => 3,
            Button::Left => 4,
            Button::Up => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub button: Button,
    pub down: bool,
}

impl ButtonEvent {
    pub fn down(button: Button) -> Self {
        Self { button, down: true }
    }

    pub fn up(button: Button) -> Self {
        Self {
            button,
            down: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Unknown,
    Menu,
    Params,
}

impl ViewMode {
    pub fn ordinal(self) -> u8 {
        match self {
            ViewMode::Unknown => 0,
            ViewMode::Menu => 1,
            ViewMode::Params => 2,
        }
    }
}
