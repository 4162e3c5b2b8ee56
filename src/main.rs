#[macro_use]
extern crate slog;

use std::error::Error;
use std::fs::File;
use std::io::Write;

use gumdrop::Options;
use slog::Drain;

use crimson::{Console, Observer, Signal};

const WIDTH: usize = 256;
const HEIGHT: usize = 240;

#[derive(Debug, Options)]
struct CrimsonOptions {
    #[options(help = "print this help message")]
    help: bool,

    #[options(free, help = "the name of the ROM to execute")]
    rom_path: String,

    #[options(help = "number of frames to run before exiting", default = "600")]
    frames: u64,

    #[options(help = "write the last frame to this file as a binary PPM")]
    screenshot: Option<String>,
}

struct FrameCounter {
    frames: u64,
    log: slog::Logger,
}

impl Observer for FrameCounter {
    fn notify(&mut self, signal: &Signal) {
        match signal {
            Signal::FrameReady(_) => {
                self.frames += 1;
                if self.frames % 60 == 0 {
                    debug!(self.log, "frames emitted"; "count" => self.frames);
                }
            }
            Signal::Reset => {
                info!(self.log, "console reset");
            }
        }
    }
}

fn write_ppm(path: &str, frame: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    write!(&mut file, "P6\n{} {}\n255\n", WIDTH, HEIGHT)?;
    for pixel in frame.chunks(4) {
        file.write_all(&pixel[..3])?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let opts = CrimsonOptions::parse_args_default_or_exit();

    let term_decorator = slog_term::TermDecorator::new().build();
    let term_drain = slog_term::FullFormat::new(term_decorator).build().fuse();
    let term_drain = slog_async::Async::new(term_drain).build().fuse();
    let log = slog::Logger::root(term_drain, o!());

    info!(log, "opening rom"; "path" => opts.rom_path.as_str());

    let mut console = Console::new(log.new(o!("component" => "console")));
    console.add_observer(Box::new(FrameCounter {
        frames: 0,
        log: log.new(o!("component" => "frames")),
    }));
    console.load_rom_file(&opts.rom_path)?;

    console.start()?;
    console.run_frames(opts.frames)?;
    console.stop();

    if let Some(path) = &opts.screenshot {
        if let Some(frame) = console.framebuffer() {
            write_ppm(path, frame)?;
            info!(log, "screenshot written"; "path" => path.as_str());
        }
    }

    if let Some(cpu) = console.cpu() {
        info!(log, "halted"; "cycles" => cpu.cycles, "pc" => format!("{:#06X}", cpu.pc));
    }
    Ok(())
}
