//! Wire format for the hand-held controller.
//!
//! Every frame is a SysEx message: it opens with [`FRAME_START`], closes with
//! [`FRAME_END`], and carries only 7-bit bytes in between. Outbound frames
//! paint the screen; the controller answers with 3-byte button frames.

use serde::{Deserialize, Serialize};
use shared::domain::{Button, ButtonEvent, ParamIndex, ViewMode};
use thiserror::Error;

pub const FRAME_START: u8 = 0xF0;
pub const FRAME_END: u8 = 0xF7;

/// Text rows on the controller screen, one per parameter slot in params view.
pub const SCREEN_ROWS: u8 = ParamIndex::COUNT as u8;

const OP_PRINT_LINE: u8 = 0x00;
const OP_PRINT_CTRL: u8 = 0x01;
const OP_CLEAR_SCREEN: u8 = 0x02;
const OP_SET_VIEW_MODE: u8 = 0x03;
const OP_DELETE_CTRL: u8 = 0x04;
const OP_INVERTED: u8 = 0x40;

const BUTTON_DOWN: u8 = 0x40;
const BUTTON_ID_MASK: u8 = 0x3F;
const BUTTON_FRAME_LEN: usize = 3;

const TEXT_PLACEHOLDER: u8 = b'_';
const CTRL_STEPS: f32 = 127.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("button frame must be 3 bytes, got {0}")]
    InvalidLength(usize),
    #[error("missing frame start marker")]
    MissingStart,
    #[error("missing frame end marker")]
    MissingEnd,
    #[error("payload byte {0:#04x} is not 7-bit")]
    NotSevenBit(u8),
    #[error("unknown button id {0}")]
    UnknownButton(u8),
}

/// Commands understood by the controller's display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceCommand {
    PrintLine {
        row: u8,
        text: String,
        inverted: bool,
    },
    PrintCtrl {
        index: ParamIndex,
        ctrl: f32,
        inverted: bool,
    },
    DeleteCtrl {
        index: ParamIndex,
    },
    ClearScreen,
    SetViewMode {
        mode: ViewMode,
    },
}

impl DeviceCommand {
    pub fn print_line(row: u8, text: impl Into<String>, inverted: bool) -> Self {
        DeviceCommand::PrintLine {
            row,
            text: text.into(),
            inverted,
        }
    }

    pub fn print_ctrl(index: ParamIndex, ctrl: f32, inverted: bool) -> Self {
        DeviceCommand::PrintCtrl {
            index,
            ctrl,
            inverted,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut frame = vec![FRAME_START];
        match self {
            DeviceCommand::PrintLine {
                row,
                text,
                inverted,
            } => {
                frame.push(with_inversion(OP_PRINT_LINE, *inverted));
                frame.push(row & 0x7F);
                frame.extend(text.bytes().map(seven_bit_text));
            }
            DeviceCommand::PrintCtrl {
                index,
                ctrl,
                inverted,
            } => {
                frame.push(with_inversion(OP_PRINT_CTRL, *inverted));
                frame.push(index.as_u8());
                frame.push(ctrl_to_byte(*ctrl));
            }
            DeviceCommand::DeleteCtrl { index } => {
                frame.push(OP_DELETE_CTRL);
                frame.push(index.as_u8());
            }
            DeviceCommand::ClearScreen => frame.push(OP_CLEAR_SCREEN),
            DeviceCommand::SetViewMode { mode } => {
                frame.push(OP_SET_VIEW_MODE);
                frame.push(mode.ordinal());
            }
        }
        frame.push(FRAME_END);
        frame
    }
}

fn with_inversion(opcode: u8, inverted: bool) -> u8 {
    if inverted {
        opcode | OP_INVERTED
    } else {
        opcode
    }
}

fn seven_bit_text(byte: u8) -> u8 {
    if byte > 0x7F {
        TEXT_PLACEHOLDER
    } else {
        byte
    }
}

/// Scales a control value onto the controller's 0..=127 bar.
pub fn ctrl_to_byte(ctrl: f32) -> u8 {
    (ctrl.clamp(0.0, 1.0) * CTRL_STEPS).round() as u8
}

pub fn encode_button(event: ButtonEvent) -> [u8; BUTTON_FRAME_LEN] {
    let flag = if event.down { BUTTON_DOWN } else { 0 };
    [FRAME_START, flag | event.button.id(), FRAME_END]
}

pub fn decode_button(frame: &[u8]) -> Result<ButtonEvent, FrameError> {
    let [start, payload, end] = frame else {
        return Err(FrameError::InvalidLength(frame.len()));
    };
    if *start != FRAME_START {
        return Err(FrameError::MissingStart);
    }
    if *end != FRAME_END {
        return Err(FrameError::MissingEnd);
    }
    if *payload > 0x7F {
        return Err(FrameError::NotSevenBit(*payload));
    }

    let id = payload & BUTTON_ID_MASK;
    let button = Button::from_id(id).ok_or(FrameError::UnknownButton(id))?;
    Ok(ButtonEvent {
        button,
        down: payload & BUTTON_DOWN != 0,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
