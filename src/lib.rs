pub mod codec;
pub mod error;
pub mod framing;
pub mod session;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use codec::{AudioDecoder, AudioEncoder, EncoderConfig, OpusDecoder, OpusEncoder, OpusMode};
pub use error::{Error, SessionKind};
pub use framing::Reassembler;
pub use session::OpusSession;
pub use error::BlueVoiceResult as Result;
