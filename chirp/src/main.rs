mod script;

use anyhow::Context;
use chirp_core::{Apu, ApuBuilder};
use chirp_std::{SharedApu, WriteQueue};
use clap::Parser;
use script::Command;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

const CHIRP_BIN: &str = "chirp";
const ABOUT: &str = "Plays a Game Boy sound register script and writes the rendered audio.";
const AFTER_HELP: &str = "Script commands:

    write <address> <value>   register write, hex (0x..) or decimal
    render <samples>          render stereo samples
    mute <channel>            host mute, channels 0 to 3
    unmute <channel>
    output on|off             output gate

The output file is raw interleaved stereo, signed 16-bit little endian.
Set RUST_LOG=apu=debug to follow triggers and power changes.
";

// Writes issued between two renders are batched up to this many per lock.
const QUEUE_CAPACITY: usize = 64;
// Stereo frames rendered per backend call.
const RENDER_CHUNK: usize = 4096;

#[derive(Default, Clone, Copy, clap::ValueEnum)]
enum Threading {
    #[default]
    Single,
    Shared,
}

#[derive(clap::Parser)]
#[command(name = CHIRP_BIN, about = ABOUT, after_help = AFTER_HELP)]
struct Cli {
    #[arg(help = "Register script to play")]
    script: PathBuf,
    #[arg(short, long, help = "Raw PCM output file")]
    output: Option<PathBuf>,
    #[arg(short = 'r', long, default_value_t = 44_100, help = "Output sample rate in Hz")]
    sample_rate: u32,
    #[arg(long, help = "Save state to restore before running the script")]
    load: Option<PathBuf>,
    #[arg(long, help = "Write the final save state blob to this file")]
    save: Option<PathBuf>,
    #[arg(long, help = "Dump the final APU state as JSON to this file")]
    state: Option<PathBuf>,
    #[arg(
        long,
        default_value = "single",
        value_enum,
        help = "Drive the APU directly or through the lock-guarded handle"
    )]
    threading: Threading,
    #[arg(long, help = "Log every register write (apu=trace)")]
    trace: bool,
}

// The two ways a host can own the APU.
trait Backend {
    fn finish(self: Box<Self>) -> anyhow::Result<Apu>;
    fn render(&mut self, out: &mut [i16]) -> anyhow::Result<()>;
    fn set_channel_muted(&mut self, channel: usize, muted: bool) -> anyhow::Result<()>;
    fn set_output_enabled(&mut self, enabled: bool) -> anyhow::Result<()>;
    fn write(&mut self, address: u16, val: u8) -> anyhow::Result<()>;
}

impl Backend for Apu {
    fn finish(self: Box<Self>) -> anyhow::Result<Apu> {
        Ok(*self)
    }

    fn render(&mut self, out: &mut [i16]) -> anyhow::Result<()> {
        Apu::render(self, out);
        Ok(())
    }

    fn set_channel_muted(&mut self, channel: usize, muted: bool) -> anyhow::Result<()> {
        Apu::set_channel_muted(self, channel, muted);
        Ok(())
    }

    fn set_output_enabled(&mut self, enabled: bool) -> anyhow::Result<()> {
        Apu::set_output_enabled(self, enabled);
        Ok(())
    }

    fn write(&mut self, address: u16, val: u8) -> anyhow::Result<()> {
        Apu::write(self, address, val);
        Ok(())
    }
}

struct Shared {
    apu: SharedApu,
    queue: WriteQueue<QUEUE_CAPACITY>,
}

impl Shared {
    fn new(apu: Apu) -> Self {
        let apu = SharedApu::new(apu);
        let queue = WriteQueue::new(apu.clone());
        Self { apu, queue }
    }
}

impl Backend for Shared {
    fn finish(mut self: Box<Self>) -> anyhow::Result<Apu> {
        self.queue.flush()?;
        Ok(self.apu.snapshot()?)
    }

    fn render(&mut self, out: &mut [i16]) -> anyhow::Result<()> {
        self.queue.flush()?;
        Ok(self.apu.render(out)?)
    }

    fn set_channel_muted(&mut self, channel: usize, muted: bool) -> anyhow::Result<()> {
        self.queue.flush()?;
        Ok(self.apu.set_channel_muted(channel, muted)?)
    }

    fn set_output_enabled(&mut self, enabled: bool) -> anyhow::Result<()> {
        self.queue.flush()?;
        Ok(self.apu.set_output_enabled(enabled)?)
    }

    fn write(&mut self, address: u16, val: u8) -> anyhow::Result<()> {
        Ok(self.queue.push(address, val)?)
    }
}

fn init_tracing(trace: bool) {
    let filter = if trace {
        EnvFilter::new("apu=trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(
    backend: &mut dyn Backend,
    commands: &[Command],
    mut pcm: Option<&mut BufWriter<File>>,
) -> anyhow::Result<usize> {
    let mut rendered = 0;
    let mut buf = vec![0; RENDER_CHUNK * 2];

    for command in commands {
        match *command {
            Command::Write { address, val } => backend.write(address, val)?,
            Command::Render { samples } => {
                let mut left = samples;
                while left > 0 {
                    let frames = left.min(RENDER_CHUNK);
                    let chunk = &mut buf[..frames * 2];
                    backend.render(chunk)?;

                    if let Some(pcm) = pcm.as_deref_mut() {
                        for sample in &*chunk {
                            pcm.write_all(&sample.to_le_bytes())?;
                        }
                    }
                    left -= frames;
                }
                rendered += samples;
            }
            Command::Mute { channel, muted } => backend.set_channel_muted(channel, muted)?,
            Command::Output { enabled } => backend.set_output_enabled(enabled)?,
        }
    }

    Ok(rendered)
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.trace);

    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading script {}", args.script.display()))?;
    let commands = script::parse(&source)
        .with_context(|| format!("parsing script {}", args.script.display()))?;

    let mut apu = ApuBuilder::new(args.sample_rate)
        .build()
        .context("building the APU")?;

    if let Some(path) = &args.load {
        let state =
            std::fs::read(path).with_context(|| format!("reading state {}", path.display()))?;
        apu.load(&state)
            .with_context(|| format!("loading state {}", path.display()))?;
    }

    let mut backend: Box<dyn Backend> = match args.threading {
        Threading::Single => Box::new(apu),
        Threading::Shared => Box::new(Shared::new(apu)),
    };

    let mut pcm = args
        .output
        .as_ref()
        .map(|path| {
            File::create(path)
                .map(BufWriter::new)
                .with_context(|| format!("creating output {}", path.display()))
        })
        .transpose()?;

    let rendered = run(backend.as_mut(), &commands, pcm.as_mut())?;
    if let Some(pcm) = pcm.as_mut() {
        pcm.flush().context("flushing output")?;
    }

    let apu = backend.finish()?;
    tracing::info!(target: "apu", rendered, commands = commands.len(), "SCRIPT_DONE");

    if let Some(path) = &args.save {
        std::fs::write(path, apu.save_vec())
            .with_context(|| format!("writing state {}", path.display()))?;
    }

    if let Some(path) = &args.state {
        let file =
            File::create(path).with_context(|| format!("creating state dump {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &apu).context("serializing state")?;
    }

    Ok(())
}
