use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use audiopus::coder::{Decoder, Encoder};
use audiopus::packet::Packet;
use audiopus::{Application, Bitrate, Channels, MutSignals, SampleRate};

use crate::error::{BlueVoiceResult, Error};

pub const SUPPORTED_SAMPLE_RATES: [u32; 5] = [8000, 12000, 16000, 24000, 48000];
pub const MAX_PACKET_SIZE: usize = 4000;
pub const DEFAULT_SAMPLE_RATE: u32 = 16000;
pub const DEFAULT_CHANNELS: u8 = 1;
pub const DEFAULT_FRAME_SIZE: usize = 320;
pub const DEFAULT_BITRATE: i32 = 24000;

static ACTIVE_HANDLES: AtomicUsize = AtomicUsize::new(0);

/// Number of live native codec handles (encoders plus decoders) in the
/// process. Meant for leak checks around init/close cycles.
pub fn active_handle_count() -> usize {
    ACTIVE_HANDLES.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpusMode {
    #[default]
    Voip,
    Audio,
    LowDelay,
}

impl OpusMode {
    /// Maps the numeric application ids used at the C boundary.
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            2048 => Some(OpusMode::Voip),
            2049 => Some(OpusMode::Audio),
            2051 => Some(OpusMode::LowDelay),
            _ => None,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            OpusMode::Voip => 2048,
            OpusMode::Audio => 2049,
            OpusMode::LowDelay => 2051,
        }
    }
}

impl From<OpusMode> for Application {
    fn from(mode: OpusMode) -> Self {
        match mode {
            OpusMode::Voip => Application::Voip,
            OpusMode::Audio => Application::Audio,
            OpusMode::LowDelay => Application::LowDelay,
        }
    }
}

fn opus_channels(channels: u8) -> BlueVoiceResult<Channels> {
    match channels {
        1 => Ok(Channels::Mono),
        2 => Ok(Channels::Stereo),
        other => Err(Error::InvalidParam(format!(
            "channels must be 1 or 2, got {}",
            other
        ))),
    }
}

fn opus_rate(sample_rate: u32) -> BlueVoiceResult<SampleRate> {
    match sample_rate {
        8000 => Ok(SampleRate::Hz8000),
        12000 => Ok(SampleRate::Hz12000),
        16000 => Ok(SampleRate::Hz16000),
        24000 => Ok(SampleRate::Hz24000),
        48000 => Ok(SampleRate::Hz48000),
        other => Err(Error::InvalidParam(format!(
            "unsupported sample rate {} Hz",
            other
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub sample_rate: u32,
    pub channels: u8,
    pub mode: OpusMode,
    pub bitrate: i32,
    pub vbr: bool,
    pub complexity: u8,
    /// Samples per channel in every PCM frame handed to `encode`.
    pub frame_size: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::full_duplex()
    }
}

impl EncoderConfig {
    /// 48 kHz stereo music profile. `fast_link` selects the higher of the two
    /// link-budget bitrates.
    pub fn full_band(fast_link: bool) -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
            mode: OpusMode::Audio,
            bitrate: if fast_link { 192000 } else { 96000 },
            vbr: false,
            complexity: 4,
            frame_size: 1920,
        }
    }

    /// 16 kHz mono two-way voice profile, 20 ms frames.
    pub fn full_duplex() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            mode: OpusMode::Voip,
            bitrate: DEFAULT_BITRATE,
            vbr: false,
            complexity: 0,
            frame_size: DEFAULT_FRAME_SIZE,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_channels(mut self, channels: u8) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_mode(mut self, mode: OpusMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_bitrate(mut self, bitrate: i32) -> Self {
        self.bitrate = bitrate;
        self
    }

    pub fn with_vbr(mut self, vbr: bool) -> Self {
        self.vbr = vbr;
        self
    }

    pub fn with_complexity(mut self, complexity: u8) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    /// Total interleaved samples per frame.
    pub fn frame_samples(&self) -> usize {
        self.frame_size * self.channels as usize
    }
}

pub struct OpusEncoder {
    encoder: Encoder,
    config: EncoderConfig,
    frame_count: u64,
}

impl OpusEncoder {
    pub fn new(config: EncoderConfig) -> BlueVoiceResult<Self> {
        let mut encoder = Encoder::new(
            opus_rate(config.sample_rate)?,
            opus_channels(config.channels)?,
            config.mode.into(),
        )?;

        // Each knob is applied and checked on its own; the first failure
        // aborts the whole initialization.
        encoder.set_bitrate(Bitrate::BitsPerSecond(config.bitrate))?;
        encoder.set_vbr(config.vbr)?;
        encoder.set_complexity(config.complexity)?;

        ACTIVE_HANDLES.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            "Opus encoder created: {} Hz, {} channels, {} bps, mode {:?}, {} samples/frame",
            config.sample_rate,
            config.channels,
            config.bitrate,
            config.mode,
            config.frame_size
        );

        Ok(Self {
            encoder,
            config,
            frame_count: 0,
        })
    }

    pub fn encode(&mut self, input: &[i16], max_encoded_bytes: usize) -> BlueVoiceResult<Vec<u8>> {
        let mut output = vec![0u8; max_encoded_bytes.min(MAX_PACKET_SIZE)];
        let len = self.encode_to(input, &mut output)?;

        output.truncate(len);
        Ok(output)
    }

    pub fn encode_to(&mut self, input: &[i16], output: &mut [u8]) -> BlueVoiceResult<usize> {
        let expected = self.config.frame_samples();
        if input.len() != expected {
            return Err(Error::InvalidParam(format!(
                "PCM frame must be {} samples, got {}",
                expected,
                input.len()
            )));
        }

        let len = self.encoder.encode(input, output)?;
        self.frame_count += 1;

        Ok(len)
    }

    pub fn bitrate(&self) -> i32 {
        self.config.bitrate
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl Drop for OpusEncoder {
    fn drop(&mut self) {
        ACTIVE_HANDLES.fetch_sub(1, Ordering::Relaxed);
        tracing::debug!("Opus encoder released after {} frames", self.frame_count);
    }
}

impl fmt::Debug for OpusEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpusEncoder")
            .field("config", &self.config)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

pub struct OpusDecoder {
    decoder: Decoder,
    sample_rate: u32,
    channels: u8,
    frame_count: u64,
}

impl OpusDecoder {
    pub fn new(sample_rate: u32, channels: u8) -> BlueVoiceResult<Self> {
        let decoder = Decoder::new(opus_rate(sample_rate)?, opus_channels(channels)?)?;

        ACTIVE_HANDLES.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            "Opus decoder created: {} Hz, {} channels",
            sample_rate,
            channels
        );

        Ok(Self {
            decoder,
            sample_rate,
            channels,
            frame_count: 0,
        })
    }

    /// Decodes one packet into exactly `frame_size * channels` interleaved
    /// samples. An empty `input` requests packet-loss concealment.
    pub fn decode(&mut self, input: &[u8], frame_size: usize) -> BlueVoiceResult<Vec<i16>> {
        let mut output = vec![0i16; frame_size * self.channels as usize];
        self.decode_to(input, &mut output)?;

        Ok(output)
    }

    /// Buffer-reusing variant of `decode`. Returns the samples per channel the
    /// codec produced; the tail of `output` beyond them is zeroed so the
    /// buffer contents are defined end to end.
    pub fn decode_to(&mut self, input: &[u8], output: &mut [i16]) -> BlueVoiceResult<usize> {
        let packet = if input.is_empty() {
            // A missing packet asks libopus to conceal the lost frame.
            None
        } else {
            Some(Packet::try_from(input)?)
        };

        let samples = self
            .decoder
            .decode(packet, MutSignals::try_from(&mut *output)?, false)?;

        let written = samples * self.channels as usize;
        for slot in &mut output[written..] {
            *slot = 0;
        }

        self.frame_count += 1;
        Ok(samples)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Drop for OpusDecoder {
    fn drop(&mut self) {
        ACTIVE_HANDLES.fetch_sub(1, Ordering::Relaxed);
        tracing::debug!("Opus decoder released after {} frames", self.frame_count);
    }
}

impl fmt::Debug for OpusDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpusDecoder")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

impl super::AudioEncoder for OpusEncoder {
    fn encode(&mut self, input: &[i16], max_encoded_bytes: usize) -> BlueVoiceResult<Vec<u8>> {
        self.encode(input, max_encoded_bytes)
    }

    fn bitrate(&self) -> i32 {
        self.bitrate()
    }
}

impl super::AudioDecoder for OpusDecoder {
    fn decode(&mut self, input: &[u8], frame_size: usize) -> BlueVoiceResult<Vec<i16>> {
        self.decode(input, frame_size)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate()
    }

    fn channels(&self) -> u8 {
        self.channels()
    }
}
