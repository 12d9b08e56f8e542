mod opus;

pub use opus::{
    active_handle_count, EncoderConfig, OpusDecoder, OpusEncoder, OpusMode,
    DEFAULT_BITRATE, DEFAULT_CHANNELS, DEFAULT_FRAME_SIZE, DEFAULT_SAMPLE_RATE,
    MAX_PACKET_SIZE, SUPPORTED_SAMPLE_RATES,
};

pub trait AudioEncoder: Send {
    fn encode(
        &mut self,
        input: &[i16],
        max_encoded_bytes: usize,
    ) -> crate::error::BlueVoiceResult<Vec<u8>>;
    fn bitrate(&self) -> i32;
}

pub trait AudioDecoder: Send {
    fn decode(
        &mut self,
        input: &[u8],
        frame_size: usize,
    ) -> crate::error::BlueVoiceResult<Vec<i16>>;
    fn sample_rate(&self) -> u32;
    fn channels(&self) -> u8;
}
