use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no MIDI port matching {filter:?}")]
    DevicePortNotFound { filter: String },
    #[error("midi: {0}")]
    Midi(String),
    #[error("osc: {0}")]
    Osc(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
