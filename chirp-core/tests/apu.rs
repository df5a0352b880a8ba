use chirp_core::{AMPLITUDE_UNIT, Apu, ApuBuilder, Error};

const SAMPLE_RATE: u32 = 32_768;

fn build() -> Apu {
    match ApuBuilder::new(SAMPLE_RATE).build() {
        Ok(apu) => apu,
        Err(err) => panic!("failed to build apu: {err}"),
    }
}

fn write_all(apu: &mut Apu, writes: &[(u16, u8)]) {
    for &(address, val) in writes {
        apu.write(address, val);
    }
}

// 50% duty, full volume, no envelope, frequency 1792 (512 Hz)
const SQUARE_512HZ: [(u16, u8); 4] = [(0xFF11, 0x80), (0xFF12, 0xF0), (0xFF13, 0x00), (0xFF14, 0x87)];

#[test]
fn test_square_wave_end_to_end() {
    let mut apu = build();

    let silence = apu.render_vec(256);
    assert!(silence.iter().all(|&s| s == 0));

    write_all(&mut apu, &SQUARE_512HZ);
    let out = apu.render_vec(4096);

    // master volume 7 halves the channel
    let peak = i16::try_from(15 * AMPLITUDE_UNIT / 2).unwrap_or(i16::MAX);
    let left: Vec<i16> = out.iter().step_by(2).copied().collect();
    let right: Vec<i16> = out.iter().skip(1).step_by(2).copied().collect();

    assert_eq!(left, right);
    assert!(left.iter().all(|&s| s == peak || s == -peak));

    // 32768 Hz / 512 Hz = 64 samples per period
    assert!(left.windows(65).all(|w| w[0] == w[64]));
    assert_eq!(left[..64].iter().filter(|&&s| s > 0).count(), 32);
}

#[test]
fn test_amplitude_follows_volume() {
    let mut loud = build();
    let mut quiet = build();
    write_all(&mut loud, &SQUARE_512HZ);
    write_all(&mut quiet, &SQUARE_512HZ);
    quiet.write(0xFF12, 0x50);
    quiet.write(0xFF14, 0x87);

    let loud_peak = loud.render_vec(64).iter().map(|s| s.unsigned_abs()).max();
    let quiet_peak = quiet.render_vec(64).iter().map(|s| s.unsigned_abs()).max();

    assert_eq!(loud_peak.map(|p| p / 3), quiet_peak);
}

#[test]
fn test_trigger_reloads_empty_length() {
    let mut apu = build();
    apu.write(0xFF12, 0xF0);
    apu.write(0xFF11, 0x3F); // load 63, one length step left
    apu.write(0xFF14, 0xC0); // trigger with length enabled

    assert!(apu.channel_enabled(0));
    // one 256 Hz step
    apu.render_vec(128);
    assert!(!apu.channel_enabled(0));
    assert_eq!(apu.channel(0).map(|c| c.length().counter()), Some(0));

    apu.write(0xFF14, 0xC0);
    assert!(apu.channel_enabled(0));
    assert_eq!(apu.channel(0).map(|c| c.length().counter()), Some(1));
}

#[test]
fn test_trigger_keeps_running_length() {
    let mut apu = build();
    apu.write(0xFF17, 0xF0);
    apu.write(0xFF16, 0x0A);
    apu.write(0xFF19, 0x80);

    assert_eq!(apu.channel(1).map(|c| c.length().counter()), Some(54));

    apu.write(0xFF19, 0x80);
    assert_eq!(apu.channel(1).map(|c| c.length().counter()), Some(54));
}

#[test]
fn test_sweep_overflow_disables_only_first_channel() {
    let mut apu = build();
    write_all(
        &mut apu,
        &[
            (0xFF17, 0xF0),
            (0xFF19, 0x87),
            (0xFF10, 0x11),
            (0xFF12, 0xF0),
            (0xFF13, 0x00),
            (0xFF14, 0x85),
        ],
    );
    assert!(apu.channel_enabled(0));

    // one sweep period at 128 Hz
    apu.render_vec(256);

    assert!(!apu.channel_enabled(0));
    assert!(apu.channel_enabled(1));
    assert_eq!(apu.read(0xFF26), 0xF2);
}

#[test]
fn test_sweep_overflow_on_trigger() {
    let mut apu = build();
    write_all(
        &mut apu,
        &[(0xFF10, 0x01), (0xFF12, 0xF0), (0xFF13, 0xFF), (0xFF14, 0x87)],
    );

    assert!(!apu.channel_enabled(0));
}

#[test]
fn test_noise_is_deterministic() {
    let run = |narrow: bool| {
        let mut apu = build();
        apu.write(0xFF21, 0xF0);
        apu.write(0xFF22, if narrow { 0x18 } else { 0x10 });
        apu.write(0xFF23, 0x80);
        apu.render_vec(2048)
    };

    let wide = run(false);
    assert_eq!(wide, run(false));
    assert_eq!(run(true), run(true));
    assert_ne!(wide, run(true));
    assert!(wide.iter().any(|&s| s > 0) && wide.iter().any(|&s| s < 0));
}

#[test]
fn test_identical_history_renders_identically() {
    let script = [
        (0xFF11, 0x40),
        (0xFF12, 0xA3),
        (0xFF13, 0x40),
        (0xFF14, 0x86),
        (0xFF1A, 0x80),
        (0xFF1C, 0x40),
        (0xFF1D, 0x00),
        (0xFF1E, 0x86),
        (0xFF21, 0x71),
        (0xFF23, 0x80),
    ];
    let mut a = build();
    let mut b = build();
    write_all(&mut a, &script);
    write_all(&mut b, &script);

    assert_eq!(a.render_vec(10_000), b.render_vec(10_000));
}

#[test]
fn test_save_load_continues_identically() {
    let mut original = build();
    write_all(
        &mut original,
        &[
            (0xFF10, 0x22),
            (0xFF11, 0x80),
            (0xFF12, 0xF2),
            (0xFF13, 0x00),
            (0xFF14, 0x83),
            (0xFF1A, 0x80),
            (0xFF1C, 0x20),
            (0xFF1E, 0x85),
            (0xFF21, 0xA1),
            (0xFF22, 0x2B),
            (0xFF23, 0xC0),
        ],
    );
    original.render_vec(3_000);

    let mut state = vec![0; original.state_size()];
    assert_eq!(original.save(&mut state), Ok(()));

    let mut restored = match ApuBuilder::new(22_050).build() {
        Ok(apu) => apu,
        Err(err) => panic!("failed to build apu: {err}"),
    };
    assert_eq!(restored.load(&state), Ok(()));

    assert_eq!(restored, original);
    assert_eq!(restored.render_vec(8_000), original.render_vec(8_000));
}

#[test]
fn test_state_size_is_checked() {
    let mut apu = build();
    let mut short = vec![0; apu.state_size() - 1];

    assert_eq!(
        apu.save(&mut short),
        Err(Error::StateSizeMismatch {
            expected: Apu::STATE_SIZE,
            actual: Apu::STATE_SIZE - 1,
        })
    );
    assert!(apu.load(&short).is_err());
}

#[test]
fn test_dac_off_mutes_enabled_channel() {
    let mut apu = build();
    write_all(&mut apu, &SQUARE_512HZ);
    apu.render_vec(10);

    apu.write(0xFF12, 0x00);
    let phase_before = apu.channel(0).map(|c| c.phase().counter());
    let out = apu.render_vec(20);

    assert!(out.iter().all(|&s| s == 0));
    assert_eq!(apu.channel(0).map(|c| c.enabled()), Some(true));
    assert!(!apu.channel_enabled(0));
    assert_ne!(apu.channel(0).map(|c| c.phase().counter()), phase_before);
}

#[test]
fn test_wave_dac_off_mutes_enabled_channel() {
    let mut apu = build();
    write_all(
        &mut apu,
        &[(0xFF1A, 0x80), (0xFF1C, 0x20), (0xFF1D, 0x00), (0xFF1E, 0x87)],
    );
    assert!(apu.render_vec(64).iter().any(|&s| s != 0));

    apu.write(0xFF1A, 0x00);

    assert!(apu.render_vec(64).iter().all(|&s| s == 0));
    assert_eq!(apu.channel(2).map(|c| c.enabled()), Some(true));
}

#[test]
fn test_dac_on_again_stays_silent_until_trigger() {
    let mut apu = build();
    write_all(&mut apu, &[(0xFF11, 0x80), (0xFF12, 0x80), (0xFF13, 0x00), (0xFF14, 0x87)]);
    apu.render_vec(10);

    apu.write(0xFF12, 0x00);
    assert_eq!(apu.read(0xFF26), 0xF0);

    apu.write(0xFF12, 0x80);
    assert_eq!(apu.read(0xFF26), 0xF0);
    assert!(apu.render_vec(64).iter().all(|&s| s == 0));

    apu.write(0xFF14, 0x87);
    assert_eq!(apu.read(0xFF26), 0xF1);
    assert!(apu.render_vec(64).iter().any(|&s| s != 0));
}

#[test]
fn test_wave_dac_on_again_stays_silent_until_trigger() {
    let mut apu = build();
    write_all(
        &mut apu,
        &[(0xFF1A, 0x80), (0xFF1C, 0x20), (0xFF1D, 0x00), (0xFF1E, 0x87)],
    );
    apu.render_vec(16);

    apu.write(0xFF1A, 0x00);
    apu.write(0xFF1A, 0x80);

    assert_eq!(apu.read(0xFF26) & 0x04, 0);
    assert!(apu.render_vec(64).iter().all(|&s| s == 0));
}

#[test]
fn test_host_mute_silences_channel() {
    let mut apu = build();
    write_all(&mut apu, &SQUARE_512HZ);
    apu.set_channel_muted(0, true);

    assert!(apu.render_vec(128).iter().all(|&s| s == 0));
    assert!(apu.channel_enabled(0));
}

#[test]
fn test_zombie_volume_write() {
    let mut apu = build();
    // decreasing envelope with period 7, so the volume holds for a while
    write_all(
        &mut apu,
        &[(0xFF12, 0x87), (0xFF13, 0x00), (0xFF14, 0x87)],
    );
    assert_eq!(apu.channel(0).map(|c| c.volume()), Some(8));

    // still decreasing: +2
    apu.write(0xFF12, 0x87);
    assert_eq!(apu.channel(0).map(|c| c.volume()), Some(10));
}
