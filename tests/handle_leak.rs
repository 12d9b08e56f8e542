use bluevoice::codec::{active_handle_count, MAX_PACKET_SIZE};
use bluevoice::{EncoderConfig, OpusSession};

// Kept as the only test in this binary so no sibling test can touch the
// process-wide handle counter while it runs.
#[test]
fn test_repeated_init_cycles_leak_no_handles() {
    let baseline = active_handle_count();
    let full_band_frame = vec![0i16; 1920 * 2];

    for _ in 0..50 {
        let mut session = OpusSession::new();
        session.init_encoder(EncoderConfig::default()).unwrap();
        session.init_decoder(16000, 1).unwrap();
        assert_eq!(active_handle_count(), baseline + 2);

        // Re-initialization must release the prior handles, not stack them.
        session.init_encoder(EncoderConfig::full_band(false)).unwrap();
        session.init_decoder(48000, 2).unwrap();
        assert_eq!(active_handle_count(), baseline + 2);

        let packet = session.encode(&full_band_frame, MAX_PACKET_SIZE).unwrap();
        session.decode(&packet, 1920).unwrap();

        session.close_encoder();
        assert_eq!(active_handle_count(), baseline + 1);
        session.close_decoder();
        assert_eq!(active_handle_count(), baseline);

        // A failed initialization must not leave a handle behind either.
        assert!(session
            .init_encoder(EncoderConfig::default().with_sample_rate(44100))
            .is_err());
        assert_eq!(active_handle_count(), baseline);
    }

    assert_eq!(active_handle_count(), baseline);
}
