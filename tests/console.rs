extern crate crimson;

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{machine, rom_with_program, rom_with_vectors};
use crimson::{Console, Observer, RomError, Signal};

#[derive(Default)]
struct Record {
    frames: u64,
    resets: u64,
    last_frame_len: usize,
}

struct Recorder {
    record: Rc<RefCell<Record>>,
}

impl Observer for Recorder {
    fn notify(&mut self, signal: &Signal) {
        let mut record = self.record.borrow_mut();
        match signal {
            Signal::FrameReady(frame) => {
                record.frames += 1;
                record.last_frame_len = frame.len();
                assert_eq!(signal.name(), "frame-ready");
            }
            Signal::Reset => {
                record.resets += 1;
                assert_eq!(signal.name(), "nes-reset");
            }
        }
    }
}

fn console_with_recorder() -> (Console, Rc<RefCell<Record>>) {
    let log = slog::Logger::root(slog::Discard, slog::o!());
    let mut console = Console::new(log);
    let record = Rc::new(RefCell::new(Record::default()));
    console.add_observer(Box::new(Recorder {
        record: record.clone(),
    }));
    (console, record)
}

#[test]
fn load_emits_reset_then_frames_flow() {
    let (mut console, record) = console_with_recorder();
    console
        .load_rom_bytes(&rom_with_program(&[0x4C, 0x00, 0x80]))
        .unwrap();
    assert_eq!(record.borrow().resets, 1);

    console.start().unwrap();
    assert!(console.is_running());
    console.run_frames(2).unwrap();
    console.stop();
    assert!(!console.is_running());

    let record = record.borrow();
    assert_eq!(record.frames, 2);
    assert_eq!(record.last_frame_len, 256 * 240 * 4);
}

#[test]
fn explicit_reset_notifies_observers() {
    let (mut console, record) = console_with_recorder();
    console
        .load_rom_bytes(&rom_with_program(&[0x4C, 0x00, 0x80]))
        .unwrap();
    console.reset();
    assert_eq!(record.borrow().resets, 2);
}

#[test]
fn start_without_rom_is_an_error() {
    let log = slog::Logger::root(slog::Discard, slog::o!());
    let mut console = Console::new(log);
    assert!(console.start().is_err());
    assert!(console.step_frame().is_err());
    assert!(console.framebuffer().is_none());
}

#[test]
fn unsupported_mapper_fails_load() {
    let log = slog::Logger::root(slog::Discard, slog::o!());
    let mut console = Console::new(log);

    // mapper 3 (CNROM) is out of scope
    let mut image = vec![0x4E, 0x45, 0x53, 0x1A, 1, 1, 0x30, 0];
    image.extend_from_slice(&[0u8; 8]);
    image.extend(std::iter::repeat(0xEA).take(16 * 1024));
    image.extend(std::iter::repeat(0).take(8 * 1024));

    match console.load_rom_bytes(&image) {
        Err(RomError::UnsupportedMapper(3)) => {}
        _ => panic!("expected UnsupportedMapper"),
    }
    assert!(console.framebuffer().is_none());
}

#[test]
fn one_frame_is_about_29780_cpu_cycles() {
    let (mut console, _record) = console_with_recorder();
    console
        .load_rom_bytes(&rom_with_program(&[0x4C, 0x00, 0x80]))
        .unwrap();
    console.start().unwrap();
    console.step_frame().unwrap();

    let cycles = console.cpu().unwrap().cycles;
    assert!(
        (29700..29900).contains(&cycles),
        "frame took {} CPU cycles",
        cycles
    );
}

#[test]
fn vblank_nmi_reaches_the_program() {
    // main: enable NMI via PPUCTRL, then spin
    // NMI handler: INC $0200; RTI
    let mut image = rom_with_vectors(&[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80], 0x8000, 0x9000);
    let handler_offset = 16 + 0x1000;
    image[handler_offset..handler_offset + 4].copy_from_slice(&[0xEE, 0x00, 0x02, 0x40]);

    let (mut cpu, mut bus) = machine(&image);
    for _ in 0..2 {
        loop {
            let cycles = cpu.tick(&mut bus);
            for _ in 0..3 * cycles {
                bus.ppu.tick();
                if bus.ppu.take_nmi() {
                    cpu.trigger_nmi();
                }
            }
            if bus.ppu.take_frame() {
                break;
            }
        }
    }
    assert_eq!(bus.get_byte(0x0200), 2);
}

#[test]
fn controller_read_reaches_the_program() {
    // strobe the pad, then read one bit into $0201
    let program = [
        0xA9, 0x01, 0x8D, 0x16, 0x40, // LDA #$01; STA $4016
        0xA9, 0x00, 0x8D, 0x16, 0x40, // LDA #$00; STA $4016
        0xAD, 0x16, 0x40, // LDA $4016
        0x8D, 0x01, 0x02, // STA $0201
    ];
    let image = rom_with_program(&program);
    let (mut cpu, mut bus) = machine(&image);
    bus.controller.set_button(crimson::Button::A, true);

    for _ in 0..6 {
        cpu.tick(&mut bus);
    }
    assert_eq!(bus.get_byte(0x0201), 1);
}

#[test]
fn frames_advance_the_ppu_three_dots_per_cycle() {
    let (mut console, record) = console_with_recorder();
    console
        .load_rom_bytes(&rom_with_program(&[0x4C, 0x00, 0x80]))
        .unwrap();
    console.start().unwrap();
    console.run_frames(10).unwrap();
    assert_eq!(record.borrow().frames, 10);

    // ten NTSC frames of 341x262 dots each
    let cycles = console.cpu().unwrap().cycles;
    let dots = 10 * 341 * 262;
    assert!((cycles * 3) as i64 - dots >= 0);
    assert!((cycles * 3) as i64 - dots < 120);
}
