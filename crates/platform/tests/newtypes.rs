//! Range enforcement tests for the codec newtypes.
//! Out-of-range values either clamp or are rejected, never passed through.

// ── VolumePercent ────────────────────────────────────────────────────────────

#[test]
fn volume_percent_new_clamps_over_100() {
    use platform::audio_types::VolumePercent;
    let v = VolumePercent::new(150);
    assert_eq!(v.get(), 100, "VolumePercent::new(150) should clamp to 100");
}

#[test]
fn volume_percent_new_allows_bounds() {
    use platform::audio_types::VolumePercent;
    assert_eq!(VolumePercent::new(0).get(), 0);
    assert_eq!(VolumePercent::new(100).get(), 100);
}

#[test]
fn volume_percent_try_new_rejects_over_100() {
    use platform::audio_types::VolumePercent;
    assert!(VolumePercent::try_new(101).is_err());
    assert!(VolumePercent::try_new(255).is_err());
    assert!(VolumePercent::try_new(50).is_ok());
}

#[test]
fn volume_percent_max_is_chip_reset_level() {
    use platform::audio_types::VolumePercent;
    assert_eq!(VolumePercent::MAX.get(), 100);
}

#[test]
fn volume_percent_is_one_byte() {
    use platform::audio_types::VolumePercent;
    assert_eq!(core::mem::size_of::<VolumePercent>(), 1);
}

// ── Balance ──────────────────────────────────────────────────────────────────

#[test]
fn balance_clamps_to_plus_minus_100() {
    use platform::audio_types::Balance;
    assert_eq!(Balance::new(-128).get(), -100);
    assert_eq!(Balance::new(127).get(), 100);
    assert_eq!(Balance::new(-30).get(), -30);
}

#[test]
fn balance_center_keeps_both_channels() {
    use platform::audio_types::{Balance, VolumePercent};
    let v = VolumePercent::new(70);
    assert_eq!(Balance::CENTER.apply(v), (v, v));
}

#[test]
fn balance_left_reduces_right_channel() {
    use platform::audio_types::{Balance, VolumePercent};
    let (l, r) = Balance::new(-30).apply(VolumePercent::new(80));
    assert_eq!(l.get(), 80);
    assert_eq!(r.get(), 50);
}

#[test]
fn balance_right_reduces_left_channel() {
    use platform::audio_types::{Balance, VolumePercent};
    let (l, r) = Balance::new(100).apply(VolumePercent::new(60));
    assert_eq!(l.get(), 0, "reduction saturates at 0");
    assert_eq!(r.get(), 60);
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

#[test]
fn sample_rate_new_rejects_out_of_range() {
    use platform::audio_types::SampleRateHz;
    assert!(SampleRateHz::new(7_999).is_err());
    assert!(SampleRateHz::new(48_001).is_err());
    assert_eq!(SampleRateHz::new(16_000).unwrap().get(), 16_000);
}

#[test]
fn sample_rate_error_reports_bounds() {
    use platform::audio_types::SampleRateHz;
    let err = SampleRateHz::new(96_000).unwrap_err();
    assert_eq!(err.value, 96_000);
    assert_eq!(err.min, 8_000);
    assert_eq!(err.max, 48_000);
}

#[test]
fn sample_rate_clamped_and_default() {
    use platform::audio_types::SampleRateHz;
    assert_eq!(SampleRateHz::clamped(1).get(), 8_000);
    assert_eq!(SampleRateHz::clamped(u32::MAX).get(), 48_000);
    assert_eq!(SampleRateHz::default().get(), 8_000);
}
