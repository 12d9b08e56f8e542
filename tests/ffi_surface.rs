#![cfg(feature = "ffi")]

use std::ffi::CStr;
use std::ptr;

use bluevoice::codec::{DEFAULT_FRAME_SIZE, MAX_PACKET_SIZE};
use bluevoice::ffi::{
    bluevoice_decode, bluevoice_decoder_init, bluevoice_encode, bluevoice_encoder_close,
    bluevoice_encoder_init, bluevoice_free_string, bluevoice_session_free, bluevoice_session_new,
    bluevoice_version,
};

const FRAME: i32 = DEFAULT_FRAME_SIZE as i32;

#[test]
fn test_session_lifecycle_over_c_abi() {
    unsafe {
        let session = bluevoice_session_new();
        assert!(!session.is_null());

        let mut pcm = [0i16; DEFAULT_FRAME_SIZE];

        // Frame calls before init report invalid state, not a crash.
        assert_eq!(
            bluevoice_decode(session, ptr::null(), 0, FRAME, pcm.as_mut_ptr()),
            -6
        );

        assert_eq!(bluevoice_decoder_init(session, 16000, 1), 0);
        assert_eq!(
            bluevoice_encoder_init(session, 16000, 1, 2048, 24000, false, 0, FRAME),
            0
        );

        let frame: Vec<i16> = (0..DEFAULT_FRAME_SIZE)
            .map(|i| ((i as f32 * 0.05).sin() * 0.4 * i16::MAX as f32) as i16)
            .collect();

        let mut encoded = [0u8; MAX_PACKET_SIZE];
        let len = bluevoice_encode(
            session,
            frame.as_ptr(),
            MAX_PACKET_SIZE as i32,
            FRAME,
            1,
            encoded.as_mut_ptr(),
        );
        assert!(len > 0);
        assert!(len <= MAX_PACKET_SIZE as i32);

        let samples = bluevoice_decode(session, encoded.as_ptr(), len, FRAME, pcm.as_mut_ptr());
        assert_eq!(samples, FRAME);

        // A zero-length packet requests loss concealment.
        let samples = bluevoice_decode(session, ptr::null(), 0, FRAME, pcm.as_mut_ptr());
        assert_eq!(samples, FRAME);

        bluevoice_encoder_close(session);
        let status = bluevoice_encode(
            session,
            frame.as_ptr(),
            MAX_PACKET_SIZE as i32,
            FRAME,
            1,
            encoded.as_mut_ptr(),
        );
        assert_eq!(status, -6);

        bluevoice_session_free(session);
    }
}

#[test]
fn test_bad_arguments_over_c_abi() {
    unsafe {
        assert_eq!(bluevoice_decoder_init(ptr::null_mut(), 16000, 1), -1);

        let session = bluevoice_session_new();

        // Unknown application id is rejected before it reaches the codec.
        assert_eq!(
            bluevoice_encoder_init(session, 16000, 1, 2050, 24000, false, 0, FRAME),
            -1
        );
        // Unsupported rate and complexity both come back as bad-arg.
        assert_eq!(bluevoice_decoder_init(session, 44100, 1), -1);
        assert_eq!(
            bluevoice_encoder_init(session, 16000, 1, 2048, 24000, false, 99, FRAME),
            -1
        );

        bluevoice_session_free(session);
    }
}

#[test]
fn test_version_string_roundtrip() {
    unsafe {
        let version = bluevoice_version();
        assert!(!version.is_null());
        assert!(!CStr::from_ptr(version).to_str().unwrap().is_empty());
        bluevoice_free_string(version);
    }
}
