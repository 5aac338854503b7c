use device_codec::DeviceCommand;
use shared::protocol::RemoteCommand;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Fire-and-forget destination for controller display commands.
pub trait DeviceSink {
    fn send_frame(&mut self, command: DeviceCommand);
}

/// Fire-and-forget destination for commands aimed at the remote platform.
pub trait RemoteSink {
    fn send_command(&mut self, command: RemoteCommand);
}

impl DeviceSink for Vec<DeviceCommand> {
    fn send_frame(&mut self, command: DeviceCommand) {
        self.push(command);
    }
}

impl RemoteSink for Vec<RemoteCommand> {
    fn send_command(&mut self, command: RemoteCommand) {
        self.push(command);
    }
}

impl DeviceSink for UnboundedSender<DeviceCommand> {
    fn send_frame(&mut self, command: DeviceCommand) {
        if self.send(command).is_err() {
            warn!("device: writer closed, dropping frame");
        }
    }
}

impl RemoteSink for UnboundedSender<RemoteCommand> {
    fn send_command(&mut self, command: RemoteCommand) {
        if let Err(err) = self.send(command) {
            warn!(address = %err.0.address(), "remote: writer closed, dropping command");
        }
    }
}
