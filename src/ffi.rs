use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::codec::{EncoderConfig, OpusMode};
use crate::error::{Error, SessionKind};
use crate::session::OpusSession;

const STATUS_OK: c_int = 0;
const STATUS_BAD_ARG: c_int = -1;

fn to_c_string(s: impl Into<String>) -> *mut c_char {
    match CString::new(s.into()) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Create a codec session with no encoder or decoder initialized.
/// Caller must release it with `bluevoice_session_free`.
#[no_mangle]
pub extern "C" fn bluevoice_session_new() -> *mut OpusSession {
    Box::into_raw(Box::new(OpusSession::new()))
}

/// Free a session created by `bluevoice_session_new`, releasing any codec
/// state it still holds.
///
/// # Safety
/// - `session` must be a pointer returned by `bluevoice_session_new`, or null.
/// - `session` must not be used after this call.
#[no_mangle]
pub unsafe extern "C" fn bluevoice_session_free(session: *mut OpusSession) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

/// Initialize (or replace) the session's decoder. Returns 0 on success or a
/// negative codec status; the prior decoder, if any, is released either way.
///
/// # Safety
/// - `session` must be a valid pointer returned by `bluevoice_session_new`.
#[no_mangle]
pub unsafe extern "C" fn bluevoice_decoder_init(
    session: *mut OpusSession,
    sample_rate_hz: c_int,
    channels: c_int,
) -> c_int {
    let Some(session) = session.as_mut() else {
        return STATUS_BAD_ARG;
    };
    let Ok(sample_rate) = u32::try_from(sample_rate_hz) else {
        return STATUS_BAD_ARG;
    };
    let Ok(channels) = u8::try_from(channels) else {
        return STATUS_BAD_ARG;
    };

    match session.init_decoder(sample_rate, channels) {
        Ok(()) => STATUS_OK,
        Err(e) => e.status_code(),
    }
}

/// Decode one packet into exactly `frame_size_pcm * channels` interleaved
/// 16-bit samples, where `channels` is the count the decoder was initialized
/// with. `encoded_len == 0` requests loss concealment. Returns the decoded
/// samples per channel, or a negative codec status (invalid-state when no
/// decoder is initialized); on error nothing is written to `pcm_out`.
///
/// # Safety
/// - `session` must be a valid pointer returned by `bluevoice_session_new`.
/// - `encoded` must point to `encoded_len` readable bytes; it may be null
///   only when `encoded_len` is 0.
/// - `pcm_out` must point to `frame_size_pcm * channels` writable samples.
#[no_mangle]
pub unsafe extern "C" fn bluevoice_decode(
    session: *mut OpusSession,
    encoded: *const u8,
    encoded_len: c_int,
    frame_size_pcm: c_int,
    pcm_out: *mut i16,
) -> c_int {
    let Some(session) = session.as_mut() else {
        return STATUS_BAD_ARG;
    };
    if pcm_out.is_null() || encoded_len < 0 || frame_size_pcm <= 0 {
        return STATUS_BAD_ARG;
    }
    if encoded.is_null() && encoded_len != 0 {
        return STATUS_BAD_ARG;
    }

    let channels = match session.decoder() {
        Some(decoder) => decoder.channels() as usize,
        None => return Error::Uninitialized(SessionKind::Decoder).status_code(),
    };

    let input: &[u8] = if encoded_len == 0 {
        &[]
    } else {
        slice::from_raw_parts(encoded, encoded_len as usize)
    };
    let output = slice::from_raw_parts_mut(pcm_out, frame_size_pcm as usize * channels);

    match session.decode_to(input, output) {
        Ok(samples) => samples as c_int,
        Err(e) => e.status_code(),
    }
}

/// Initialize (or replace) the session's encoder. `application` is the
/// numeric Opus application id (2048 voice, 2049 audio, 2051 restricted low
/// delay); `frame_size_pcm` fixes the samples per channel every later
/// `bluevoice_encode` call must supply. Each codec knob is applied and
/// checked on its own; the first failure wins and leaves the encoder
/// uninitialized. Returns 0 on success or a negative codec status.
///
/// # Safety
/// - `session` must be a valid pointer returned by `bluevoice_session_new`.
#[no_mangle]
pub unsafe extern "C" fn bluevoice_encoder_init(
    session: *mut OpusSession,
    sample_rate_hz: c_int,
    channels: c_int,
    application: c_int,
    bitrate_bps: c_int,
    use_vbr: bool,
    complexity: c_int,
    frame_size_pcm: c_int,
) -> c_int {
    let Some(session) = session.as_mut() else {
        return STATUS_BAD_ARG;
    };
    let Ok(sample_rate) = u32::try_from(sample_rate_hz) else {
        return STATUS_BAD_ARG;
    };
    let Ok(channels) = u8::try_from(channels) else {
        return STATUS_BAD_ARG;
    };
    let Some(mode) = OpusMode::from_id(application) else {
        return STATUS_BAD_ARG;
    };
    let Ok(complexity) = u8::try_from(complexity) else {
        return STATUS_BAD_ARG;
    };
    let Ok(frame_size) = usize::try_from(frame_size_pcm) else {
        return STATUS_BAD_ARG;
    };
    if frame_size == 0 {
        return STATUS_BAD_ARG;
    }

    let config = EncoderConfig {
        sample_rate,
        channels,
        mode,
        bitrate: bitrate_bps,
        vbr: use_vbr,
        complexity,
        frame_size,
    };

    match session.init_encoder(config) {
        Ok(()) => STATUS_OK,
        Err(e) => e.status_code(),
    }
}

/// Encode exactly one PCM frame. `frame_size_pcm * channels` must equal the
/// configured frame sample count. Returns the encoded byte count (always
/// <= `max_encoded_bytes`), or a negative codec status (invalid-state when no
/// encoder is initialized).
///
/// # Safety
/// - `session` must be a valid pointer returned by `bluevoice_session_new`.
/// - `pcm` must point to `frame_size_pcm * channels` readable samples.
/// - `encoded_out` must point to `max_encoded_bytes` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn bluevoice_encode(
    session: *mut OpusSession,
    pcm: *const i16,
    max_encoded_bytes: c_int,
    frame_size_pcm: c_int,
    channels: c_int,
    encoded_out: *mut u8,
) -> c_int {
    let Some(session) = session.as_mut() else {
        return STATUS_BAD_ARG;
    };
    if pcm.is_null() || encoded_out.is_null() {
        return STATUS_BAD_ARG;
    }
    if max_encoded_bytes <= 0 || frame_size_pcm <= 0 || channels <= 0 {
        return STATUS_BAD_ARG;
    }

    let input = slice::from_raw_parts(pcm, frame_size_pcm as usize * channels as usize);
    let output = slice::from_raw_parts_mut(encoded_out, max_encoded_bytes as usize);

    match session.encode_to(input, output) {
        Ok(len) => len as c_int,
        Err(e) => e.status_code(),
    }
}

/// Release the session's encoder, if any. Later encode calls return the
/// invalid-state status until the encoder is initialized again.
///
/// # Safety
/// - `session` must be a valid pointer returned by `bluevoice_session_new`.
#[no_mangle]
pub unsafe extern "C" fn bluevoice_encoder_close(session: *mut OpusSession) {
    if let Some(session) = session.as_mut() {
        session.close_encoder();
    }
}

/// Release the session's decoder, if any. Later decode calls return the
/// invalid-state status until the decoder is initialized again.
///
/// # Safety
/// - `session` must be a valid pointer returned by `bluevoice_session_new`.
#[no_mangle]
pub unsafe extern "C" fn bluevoice_decoder_close(session: *mut OpusSession) {
    if let Some(session) = session.as_mut() {
        session.close_decoder();
    }
}

/// Free a string returned by BlueVoice FFI functions.
///
/// # Safety
/// - `s` must be a valid pointer returned by a BlueVoice FFI function, or null.
/// - `s` must not have been freed already.
/// - `s` must not be used after this call.
#[no_mangle]
pub unsafe extern "C" fn bluevoice_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[no_mangle]
pub extern "C" fn bluevoice_version() -> *mut c_char {
    to_c_string(env!("CARGO_PKG_VERSION"))
}
