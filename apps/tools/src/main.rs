use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use device_codec::{decode_button, encode_button, DeviceCommand, SCREEN_ROWS};
use shared::domain::{Button, ButtonEvent, ParamIndex, ViewMode};

/// Debugging helpers for the controller wire format.
#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List MIDI ports, marking the ones the bridge would pick
    ListPorts {
        #[arg(long, default_value = "ORAC-CTL")]
        filter: String,
    },
    /// Print the SysEx frame for a command as hex
    Encode {
        #[command(subcommand)]
        frame: Frame,
    },
    /// Decode a button frame given as hex and print it as JSON
    Decode {
        #[arg(required = true)]
        hex: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum Frame {
    Clear,
    ViewMode {
        #[arg(value_parser = parse_view_mode)]
        mode: ViewMode,
    },
    Line {
        row: u8,
        text: String,
        #[arg(long)]
        inverted: bool,
    },
    Ctrl {
        #[arg(value_parser = parse_param_index)]
        index: ParamIndex,
        value: f32,
        #[arg(long)]
        inverted: bool,
    },
    DeleteCtrl {
        #[arg(value_parser = parse_param_index)]
        index: ParamIndex,
    },
    Button {
        #[arg(value_parser = parse_button)]
        button: Button,
        #[arg(long)]
        up: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::ListPorts { filter } => {
            let (inputs, outputs) = transport::device::list_ports()?;
            for (direction, names) in [("in", inputs), ("out", outputs)] {
                for name in names {
                    let marker = if name.contains(&filter) { '*' } else { ' ' };
                    println!("{direction:<3} {marker} {name}");
                }
            }
        }
        Command::Encode { frame } => println!("{}", to_hex(&encode_frame(frame)?)),
        Command::Decode { hex } => {
            let bytes = parse_hex(&hex.join(" "))?;
            let event = decode_button(&bytes).context("not a button frame")?;
            println!("{}", serde_json::to_string(&event)?);
        }
    }

    Ok(())
}

fn encode_frame(frame: Frame) -> Result<Vec<u8>> {
    let command = match frame {
        Frame::Clear => DeviceCommand::ClearScreen,
        Frame::ViewMode { mode } => DeviceCommand::SetViewMode { mode },
        Frame::Line {
            row,
            text,
            inverted,
        } => {
            if row >= SCREEN_ROWS {
                bail!("row {row} is off screen (0..{})", SCREEN_ROWS - 1);
            }
            DeviceCommand::print_line(row, text, inverted)
        }
        Frame::Ctrl {
            index,
            value,
            inverted,
        } => DeviceCommand::print_ctrl(index, value, inverted),
        Frame::DeleteCtrl { index } => DeviceCommand::DeleteCtrl { index },
        Frame::Button { button, up } => {
            let event = if up {
                ButtonEvent::up(button)
            } else {
                ButtonEvent::down(button)
            };
            return Ok(encode_button(event).to_vec());
        }
    };
    Ok(command.encode())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Accepts "F0 41 F7", "f041f7" or "0xF0,0x41,0xF7".
fn parse_hex(raw: &str) -> Result<Vec<u8>> {
    let digits: String = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|token| token.trim_start_matches("0x").trim_start_matches("0X"))
        .collect();
    if digits.is_empty() || digits.len() % 2 != 0 {
        bail!("expected an even number of hex digits, got {:?}", raw);
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = digits.get(i..i + 2).ok_or_else(|| anyhow!("invalid hex {raw:?}"))?;
            u8::from_str_radix(pair, 16).with_context(|| format!("invalid hex byte {pair:?}"))
        })
        .collect()
}

fn parse_button(raw: &str) -> Result<Button, String> {
    Button::ALL
        .into_iter()
        .find(|button| format!("{button:?}").eq_ignore_ascii_case(raw))
        .ok_or_else(|| format!("unknown button '{raw}' (b, a, right, down, left, up)"))
}

fn parse_view_mode(raw: &str) -> Result<ViewMode, String> {
    match raw.to_ascii_lowercase().as_str() {
        "menu" => Ok(ViewMode::Menu),
        "params" => Ok(ViewMode::Params),
        _ => Err(format!("unknown view mode '{raw}' (menu, params)")),
    }
}

fn parse_param_index(raw: &str) -> Result<ParamIndex, String> {
    raw.parse::<usize>()
        .ok()
        .and_then(ParamIndex::new)
        .ok_or_else(|| format!("parameter index must be 0..{}", ParamIndex::COUNT - 1))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
