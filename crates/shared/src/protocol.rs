use serde::{Deserialize, Serialize};

use crate::{
    domain::{LineIndex, ParamIndex},
    error::ProtocolError,
};

/// Payload carried by every navigation-style command.
pub const TRIGGER_VALUE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamField {
    Desc,
    Value,
    Ctrl,
}

impl ParamField {
    fn suffix(self) -> &'static str {
        match self {
            ParamField::Desc => "Desc",
            ParamField::Value => "Value",
            ParamField::Ctrl => "Ctrl",
        }
    }
}

/// Inbound addresses the display mirror understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    Text,
    SelectText,
    ClearText,
    Module,
    Param { index: ParamIndex, field: ParamField },
}

impl Address {
    pub fn classify(address: &str) -> Result<Self, ProtocolError> {
        match address {
            "/text" => return Ok(Address::Text),
            "/selectText" => return Ok(Address::SelectText),
            "/clearText" => return Ok(Address::ClearText),
            "/module" => return Ok(Address::Module),
            _ => {}
        }

        let unknown = || ProtocolError::UnknownAddress(address.to_string());
        let rest = address.strip_prefix("/P").ok_or_else(unknown)?;
        let (number, field) = [ParamField::Desc, ParamField::Value, ParamField::Ctrl]
            .into_iter()
            .find_map(|field| rest.strip_suffix(field.suffix()).map(|n| (n, field)))
            .ok_or_else(unknown)?;

        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(unknown());
        }
        // Slot numbers are a single digit; "/P01Desc" and "/P12Ctrl" are not slots.
        let index = Some(number)
            .filter(|n| n.len() == 1)
            .and_then(|n| n.parse::<i64>().ok())
            .and_then(ParamIndex::from_wire)
            .ok_or_else(|| ProtocolError::ParamIndexOutOfRange {
                address: address.to_string(),
            })?;

        Ok(Address::Param { index, field })
    }
}

/// Display updates received from the remote platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RemoteMessage {
    Text { line: LineIndex, text: String },
    SelectText { line: LineIndex },
    ClearText,
    ParamDesc { index: ParamIndex, name: String },
    ParamValue { index: ParamIndex, value: String },
    ParamCtrl { index: ParamIndex, ctrl: f32 },
    Module,
}

/// Commands sent back toward the remote platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RemoteCommand {
    Connect { listen_port: u16 },
    NavActivate,
    NavNext,
    NavPrev,
    ModuleNext,
    ModulePrev,
    PageNext,
    PagePrev,
    ParamCtrl { index: ParamIndex, ctrl: f32 },
}

impl RemoteCommand {
    pub fn address(&self) -> String {
        match self {
            RemoteCommand::Connect { .. } => "/Connect".into(),
            RemoteCommand::NavActivate => "/NavActivate".into(),
            RemoteCommand::NavNext => "/NavNext".into(),
            RemoteCommand::NavPrev => "/NavPrev".into(),
            RemoteCommand::ModuleNext => "/ModuleNext".into(),
            RemoteCommand::ModulePrev => "/ModulePrev".into(),
            RemoteCommand::PageNext => "/PageNext".into(),
            RemoteCommand::PagePrev => "/PagePrev".into(),
            RemoteCommand::ParamCtrl { index, .. } => format!("/P{}Ctrl", index.wire()),
        }
    }
}
