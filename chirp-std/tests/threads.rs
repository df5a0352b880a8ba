use chirp_std::{Apu, ApuBuilder, Error, SharedApu, WriteQueue};
use std::{sync::mpsc, thread};
use tracing_test::traced_test;

const SAMPLE_RATE: u32 = 44_100;

fn build() -> Apu {
    match ApuBuilder::new(SAMPLE_RATE).build() {
        Ok(apu) => apu,
        Err(err) => panic!("failed to build apu: {err}"),
    }
}

const SCRIPT: [(u16, u8); 8] = [
    (0xFF11, 0x80),
    (0xFF12, 0xF0),
    (0xFF13, 0x00),
    (0xFF14, 0x87),
    (0xFF21, 0x91),
    (0xFF22, 0x33),
    (0xFF23, 0x80),
    (0xFF25, 0x99),
];

#[test]
fn test_queued_writes_match_direct_writes() {
    let shared = SharedApu::new(build());

    let emulation = {
        let shared = shared.clone();
        thread::spawn(move || {
            let mut queue = WriteQueue::<3>::new(shared);
            for (address, val) in SCRIPT {
                queue.push(address, val)?;
            }
            queue.flush()
        })
    };
    let flushed = emulation.join().map_err(|_panic| "emulation thread panicked");
    assert_eq!(flushed, Ok(Ok(2)));

    let mut direct = build();
    for (address, val) in SCRIPT {
        direct.write(address, val);
    }

    let mut shared_out = vec![0; 2 * 2048];
    assert_eq!(shared.render(&mut shared_out), Ok(()));

    assert_eq!(shared_out, direct.render_vec(2048));
}

#[test]
fn test_audio_thread_renders_while_registers_change() {
    let shared = SharedApu::new(build());
    let (done_tx, done_rx) = mpsc::channel();

    let audio = {
        let shared = shared.clone();
        thread::spawn(move || -> Result<usize, Error> {
            let mut buf = [0; 2 * 256];
            let mut rendered = 0;
            while done_rx.try_recv().is_err() {
                shared.render(&mut buf)?;
                rendered += buf.len() / 2;
            }
            // one more pull after the last write
            shared.render(&mut buf)?;
            Ok(rendered + buf.len() / 2)
        })
    };

    for step in 0..64_u8 {
        let result = shared.with_registers(|regs| {
            regs.write(0xFF13, step.wrapping_mul(4));
            regs.write(0xFF12, 0xF0);
            regs.write(0xFF14, 0x86);
            regs.read(0xFF26)
        });
        assert_eq!(result.map(|nr52| nr52 & 1), Ok(1));
    }
    assert_eq!(done_tx.send(()), Ok(()));

    let rendered = audio.join().map_err(|_panic| "audio thread panicked");
    assert!(matches!(rendered, Ok(Ok(n)) if n >= 256));
    assert_eq!(shared.channel_enabled(0), Ok(true));
}

#[test]
fn test_poisoned_lock_is_reported() {
    let shared = SharedApu::new(build());

    let crashing = {
        let shared = shared.clone();
        thread::spawn(move || {
            let _: Result<(), Error> = shared.with_registers(|_regs| panic!("emulation crashed"));
        })
    };
    assert!(crashing.join().is_err());

    let mut buf = [0; 8];
    assert_eq!(shared.render(&mut buf), Err(Error::Poisoned));
    assert_eq!(shared.read(0xFF26), Err(Error::Poisoned));
}

#[traced_test]
#[test]
fn test_failed_flush_on_drop_is_logged() {
    let shared = SharedApu::new(build());

    let crashing = {
        let shared = shared.clone();
        thread::spawn(move || {
            let _: Result<(), Error> = shared.with_registers(|_regs| panic!("emulation crashed"));
        })
    };
    assert!(crashing.join().is_err());

    {
        let mut queue = WriteQueue::<4>::new(shared);
        assert_eq!(queue.push(0xFF24, 0x00), Ok(()));
    }

    assert!(logs_contain("failed to flush queued register writes"));
}

#[test]
fn test_snapshot_moves_between_handles() {
    let shared = SharedApu::new(build());
    for (address, val) in SCRIPT {
        assert_eq!(shared.write(address, val), Ok(()));
    }
    let mut warmup = [0; 2 * 500];
    assert_eq!(shared.render(&mut warmup), Ok(()));

    let state = shared.save_vec();
    assert!(state.is_ok());
    let other = SharedApu::new(build());
    assert_eq!(other.load(&state.unwrap_or_default()), Ok(()));

    assert_eq!(other.snapshot(), shared.snapshot());
}
