//! OSC packet mapping for the remote display protocol.

use rosc::{OscMessage, OscPacket, OscType};
use shared::{
    domain::LineIndex,
    error::ProtocolError,
    protocol::{Address, ParamField, RemoteCommand, RemoteMessage, TRIGGER_VALUE},
};

use crate::error::TransportError;

/// Decodes one datagram. Bundles are flattened in order; their time tags are ignored.
pub fn decode_packet(bytes: &[u8]) -> Result<Vec<OscMessage>, TransportError> {
    let (_, packet) =
        rosc::decoder::decode_udp(bytes).map_err(|err| TransportError::Osc(err.to_string()))?;
    let mut messages = Vec::new();
    flatten(packet, &mut messages);
    Ok(messages)
}

fn flatten(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(message) => out.push(message),
        OscPacket::Bundle(bundle) => {
            for packet in bundle.content {
                flatten(packet, out);
            }
        }
    }
}

pub fn to_remote_message(message: &OscMessage) -> Result<RemoteMessage, ProtocolError> {
    let address = Address::classify(&message.addr)?;
    let args = message.args.as_slice();
    let mismatch = |expected| ProtocolError::UnexpectedArguments {
        address: message.addr.clone(),
        expected,
    };

    match address {
        Address::Text => match args {
            [line, OscType::String(text), ..] => {
                let line = int_arg(line).ok_or_else(|| mismatch("(int, string)"))?;
                Ok(RemoteMessage::Text {
                    line: line_index(line)?,
                    text: text.clone(),
                })
            }
            _ => Err(mismatch("(int, string)")),
        },
        Address::SelectText => {
            let line = args.first().and_then(int_arg).ok_or_else(|| mismatch("(int)"))?;
            Ok(RemoteMessage::SelectText {
                line: line_index(line)?,
            })
        }
        Address::ClearText => Ok(RemoteMessage::ClearText),
        Address::Module => Ok(RemoteMessage::Module),
        Address::Param { index, field } => match field {
            ParamField::Desc => Ok(RemoteMessage::ParamDesc {
                index,
                name: string_arg(args).ok_or_else(|| mismatch("(string)"))?,
            }),
            ParamField::Value => Ok(RemoteMessage::ParamValue {
                index,
                value: string_arg(args).ok_or_else(|| mismatch("(string)"))?,
            }),
            ParamField::Ctrl => Ok(RemoteMessage::ParamCtrl {
                index,
                ctrl: args.first().and_then(float_arg).ok_or_else(|| mismatch("(float)"))?,
            }),
        },
    }
}

fn line_index(line: i64) -> Result<LineIndex, ProtocolError> {
    LineIndex::from_wire(line).ok_or(ProtocolError::LineIndexOutOfRange { line })
}

fn int_arg(arg: &OscType) -> Option<i64> {
    match arg {
        OscType::Int(value) => Some(i64::from(*value)),
        OscType::Long(value) => Some(*value),
        OscType::Float(value) if value.fract() == 0.0 => Some(*value as i64),
        OscType::Double(value) if value.fract() == 0.0 => Some(*value as i64),
        _ => None,
    }
}

fn float_arg(arg: &OscType) -> Option<f32> {
    let value = match arg {
        OscType::Float(value) => *value,
        OscType::Double(value) => *value as f32,
        OscType::Int(value) => *value as f32,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn string_arg(args: &[OscType]) -> Option<String> {
    match args.first() {
        Some(OscType::String(value)) => Some(value.clone()),
        _ => None,
    }
}

pub fn command_message(command: &RemoteCommand) -> OscMessage {
    let arg = match command {
        RemoteCommand::Connect { listen_port } => OscType::Int(i32::from(*listen_port)),
        RemoteCommand::ParamCtrl { ctrl, .. } => OscType::Float(*ctrl),
        RemoteCommand::NavActivate
        | RemoteCommand::NavNext
        | RemoteCommand::NavPrev
        | RemoteCommand::ModuleNext
        | RemoteCommand::ModulePrev
        | RemoteCommand::PageNext
        | RemoteCommand::PagePrev => OscType::Float(TRIGGER_VALUE),
    };
    OscMessage {
        addr: command.address(),
        args: vec![arg],
    }
}

pub fn encode_command(command: &RemoteCommand) -> Result<Vec<u8>, TransportError> {
    let packet = OscPacket::Message(command_message(command));
    rosc::encoder::encode(&packet).map_err(|err| TransportError::Osc(err.to_string()))
}

#[cfg(test)]
#[path = "tests/osc_tests.rs"]
mod tests;
