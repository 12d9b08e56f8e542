use crate::codec::{EncoderConfig, OpusDecoder, OpusEncoder};
use crate::error::{BlueVoiceResult, Error, SessionKind};

/// Owner of at most one Opus encoder and one Opus decoder.
///
/// The two halves are independent: either can be initialized, replaced, and
/// closed without touching the other, and any number of sessions may coexist.
/// A session is not internally synchronized. Every operation takes
/// `&mut self`, so initialization can never race an in-flight frame
/// operation; callers sharing a session across threads must add a lock.
pub struct OpusSession {
    encoder: Option<OpusEncoder>,
    decoder: Option<OpusDecoder>,
}

impl OpusSession {
    pub fn new() -> Self {
        Self {
            encoder: None,
            decoder: None,
        }
    }

    /// Creates the decoder half, releasing any prior decoder first. If
    /// creation fails the session is left without a decoder rather than
    /// silently keeping the stale one.
    pub fn init_decoder(&mut self, sample_rate: u32, channels: u8) -> BlueVoiceResult<()> {
        if self.decoder.take().is_some() {
            tracing::debug!("Replacing existing Opus decoder session");
        }
        self.decoder = Some(OpusDecoder::new(sample_rate, channels)?);
        Ok(())
    }

    /// Decodes one packet into exactly `frame_size * channels` interleaved
    /// samples; an empty packet requests loss concealment.
    pub fn decode(&mut self, input: &[u8], frame_size: usize) -> BlueVoiceResult<Vec<i16>> {
        self.decoder
            .as_mut()
            .ok_or(Error::Uninitialized(SessionKind::Decoder))?
            .decode(input, frame_size)
    }

    pub fn decode_to(&mut self, input: &[u8], output: &mut [i16]) -> BlueVoiceResult<usize> {
        self.decoder
            .as_mut()
            .ok_or(Error::Uninitialized(SessionKind::Decoder))?
            .decode_to(input, output)
    }

    /// Creates the encoder half, releasing any prior encoder first. Same
    /// failure semantics as `init_decoder`.
    pub fn init_encoder(&mut self, config: EncoderConfig) -> BlueVoiceResult<()> {
        if self.encoder.take().is_some() {
            tracing::debug!("Replacing existing Opus encoder session");
        }
        self.encoder = Some(OpusEncoder::new(config)?);
        Ok(())
    }

    /// Encodes one PCM frame of exactly the configured size, returning a
    /// packet of at most `max_encoded_bytes`.
    pub fn encode(&mut self, input: &[i16], max_encoded_bytes: usize) -> BlueVoiceResult<Vec<u8>> {
        self.encoder
            .as_mut()
            .ok_or(Error::Uninitialized(SessionKind::Encoder))?
            .encode(input, max_encoded_bytes)
    }

    pub fn encode_to(&mut self, input: &[i16], output: &mut [u8]) -> BlueVoiceResult<usize> {
        self.encoder
            .as_mut()
            .ok_or(Error::Uninitialized(SessionKind::Encoder))?
            .encode_to(input, output)
    }

    pub fn close_encoder(&mut self) {
        self.encoder = None;
    }

    pub fn close_decoder(&mut self) {
        self.decoder = None;
    }

    pub fn encoder(&self) -> Option<&OpusEncoder> {
        self.encoder.as_ref()
    }

    pub fn decoder(&self) -> Option<&OpusDecoder> {
        self.decoder.as_ref()
    }
}

impl Default for OpusSession {
    fn default() -> Self {
        Self::new()
    }
}
