//! MIDI connection to the hand-held controller.

use bridge_core::SchedulerHandle;
use device_codec::{decode_button, DeviceCommand};
use midir::{Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::error::TransportError;

const CLIENT_NAME: &str = "orac-ctl-bridge";

/// Anything a display frame can be written to.
pub trait FrameOutput {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError>;
}

impl FrameOutput for MidiOutputConnection {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.send(frame)
            .map_err(|err| TransportError::Midi(err.to_string()))
    }
}

/// Returns the first port whose name contains `filter`.
pub fn find_port<T: MidiIO>(io: &T, filter: &str) -> Option<(T::Port, String)> {
    io.ports().into_iter().find_map(|port| {
        let name = io.port_name(&port).ok()?;
        name.contains(filter).then_some((port, name))
    })
}

pub fn list_ports() -> Result<(Vec<String>, Vec<String>), TransportError> {
    let input = MidiInput::new(CLIENT_NAME).map_err(|err| TransportError::Midi(err.to_string()))?;
    let output =
        MidiOutput::new(CLIENT_NAME).map_err(|err| TransportError::Midi(err.to_string()))?;
    Ok((port_names(&input), port_names(&output)))
}

fn port_names<T: MidiIO>(io: &T) -> Vec<String> {
    io.ports()
        .iter()
        .filter_map(|port| io.port_name(port).ok())
        .collect()
}

/// Decodes one inbound MIDI message and queues the button event it carries.
pub fn handle_device_message(message: &[u8], scheduler: &SchedulerHandle) -> bool {
    match decode_button(message) {
        Ok(event) => {
            debug!(button = ?event.button, down = event.down, "device: button");
            scheduler.post_button(event)
        }
        Err(err) => {
            warn!(%err, frame = ?message, "device: dropping malformed frame");
            false
        }
    }
}

/// Writes queued display commands until every sender is dropped, then hands
/// the output back.
pub async fn run_device_writer<O: FrameOutput>(
    mut output: O,
    mut commands: UnboundedReceiver<DeviceCommand>,
) -> O {
    while let Some(command) = commands.recv().await {
        if let Err(err) = output.write_frame(&command.encode()) {
            warn!(%err, ?command, "device: frame write failed");
        }
    }
    output
}

pub struct DeviceConnection {
    input: MidiInputConnection<()>,
    writer: JoinHandle<MidiOutputConnection>,
    port_name: String,
}

impl DeviceConnection {
    /// Opens both directions of the first controller port matching `filter`.
    /// Button frames go to `scheduler`; frames sent on the paired channel of
    /// `commands` are written to the controller.
    pub fn open(
        filter: &str,
        scheduler: SchedulerHandle,
        commands: UnboundedReceiver<DeviceCommand>,
    ) -> Result<Self, TransportError> {
        let mut midi_in =
            MidiInput::new(CLIENT_NAME).map_err(|err| TransportError::Midi(err.to_string()))?;
        midi_in.ignore(Ignore::None);
        let midi_out =
            MidiOutput::new(CLIENT_NAME).map_err(|err| TransportError::Midi(err.to_string()))?;

        let not_found = || TransportError::DevicePortNotFound {
            filter: filter.to_string(),
        };
        let (in_port, port_name) = find_port(&midi_in, filter).ok_or_else(not_found)?;
        let (out_port, _) = find_port(&midi_out, filter).ok_or_else(not_found)?;

        let input = midi_in
            .connect(
                &in_port,
                "orac-ctl-in",
                move |_stamp, message, _| {
                    handle_device_message(message, &scheduler);
                },
                (),
            )
            .map_err(|err| TransportError::Midi(err.to_string()))?;
        let output = midi_out
            .connect(&out_port, "orac-ctl-out")
            .map_err(|err| TransportError::Midi(err.to_string()))?;

        info!(port = %port_name, "device: connected");
        Ok(Self {
            input,
            writer: tokio::spawn(run_device_writer(output, commands)),
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Releases both ports. The writer drains first, so every sender of the
    /// command channel must already be dropped.
    pub async fn close(self) {
        self.input.close();
        match self.writer.await {
            Ok(output) => {
                output.close();
            }
            Err(err) => warn!(%err, "device: writer task failed"),
        }
        info!(port = %self.port_name, "device: disconnected");
    }
}

#[cfg(test)]
#[path = "tests/device_tests.rs"]
mod tests;
