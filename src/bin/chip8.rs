use std::{
    collections::VecDeque,
    io::Write,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Paragraph, Widget},
};

use chip8_vm::{
    Chip8, Chip8Config, Chip8Runner, DISPLAY_X, DISPLAY_Y, Quirks, RunnerConfig, RunnerStatus,
    UnknownOpcodePolicy, read_rom, u4,
};

/// Mapping from the left side of a QWERTY keyboard to the CHIP-8 hex keypad (0x0-0xF).
const KEY_MAP: [KeyCode; 16] = [
    KeyCode::Char('x'), // 0x0
    KeyCode::Char('1'), // 0x1
    KeyCode::Char('2'), // 0x2
    KeyCode::Char('3'), // 0x3
    KeyCode::Char('q'), // 0x4
    KeyCode::Char('w'), // 0x5
    KeyCode::Char('e'), // 0x6
    KeyCode::Char('a'), // 0x7
    KeyCode::Char('s'), // 0x8
    KeyCode::Char('d'), // 0x9
    KeyCode::Char('z'), // 0xA
    KeyCode::Char('c'), // 0xB
    KeyCode::Char('4'), // 0xC
    KeyCode::Char('r'), // 0xD
    KeyCode::Char('f'), // 0xE
    KeyCode::Char('v'), // 0xF
];

// Key release events are not fired in most terminals.
// To handle this, we implement a timeout after which we consider a key released.
const KEY_RELEASE_TIMEOUT: Duration = Duration::from_millis(100);

const FRAME_TIME: Duration = Duration::from_millis(16);

struct App {
    runner: Chip8Runner,
    status: RunnerStatus,
    should_quit: bool,
    last_tick: Instant,
    key_press_times: [Option<Instant>; 16],
}

impl App {
    fn new(rom: &[u8], config: Chip8Config, runner_config: RunnerConfig) -> anyhow::Result<Self> {
        let mut chip8 = Chip8::with_config(config);
        chip8
            .load(rom)
            .context("Failed to load ROM into CHIP-8 memory")?;

        Ok(Self {
            runner: Chip8Runner::with_config(chip8, runner_config),
            status: RunnerStatus::default(),
            should_quit: false,
            last_tick: Instant::now(),
            key_press_times: [None; 16],
        })
    }

    fn run(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        while !self.should_quit {
            let dt = self.last_tick.elapsed().as_secs_f32();
            self.last_tick = Instant::now();

            self.status = self.runner.update(dt).context("Chip8 Execution error")?;

            terminal.draw(|frame| self.draw(frame))?;

            self.check_key_timeout();

            if event::poll(FRAME_TIME)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key_event(key);
                }
            }
        }

        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    fn check_key_timeout(&mut self) {
        let now = Instant::now();

        for (idx, press_time) in self.key_press_times.iter_mut().enumerate() {
            if let Some(time) = press_time
                && now.duration_since(*time) > KEY_RELEASE_TIMEOUT
            {
                *press_time = None;
                self.runner.set_key(u4::new(idx as u8), false);
            }
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            code => {
                if let Some(idx) = KEY_MAP.iter().position(|&k| k == code) {
                    let pressed = key.kind != KeyEventKind::Release;
                    self.runner.set_key(u4::new(idx as u8), pressed);
                    self.key_press_times[idx] = pressed.then(Instant::now);
                }
            }
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Two display rows share one terminal cell using half blocks
        const MIN_WIDTH: u16 = DISPLAY_X as u16 + 2;
        const MIN_HEIGHT: u16 = DISPLAY_Y as u16 / 2 + 2 + 1;
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            Paragraph::new(format!(
                "Terminal is too small ({}x{} min)",
                MIN_WIDTH, MIN_HEIGHT
            ))
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .render(area, buf);

            return;
        }

        let [display, status] = Layout::vertical([
            Constraint::Length(DISPLAY_Y as u16 / 2 + 2),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_display(display, buf);
        self.render_status(status, buf);
    }
}

impl App {
    fn render_display(&self, area: Rect, buf: &mut Buffer) {
        let chip8 = self.runner.chip8_ref();
        let lines: Vec<Line> = (0..DISPLAY_Y)
            .step_by(2)
            .map(|y| {
                (0..DISPLAY_X)
                    .map(|x| {
                        match (
                            chip8.get_display_pixel(y, x),
                            chip8.get_display_pixel(y + 1, x),
                        ) {
                            (true, true) => '█',
                            (true, false) => '▀',
                            (false, true) => '▄',
                            (false, false) => ' ',
                        }
                    })
                    .collect::<String>()
                    .into()
            })
            .collect();

        Paragraph::new(lines)
            .style(Style::default().fg(Color::Green))
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" CHIP-8 "))
            .render(area, buf);
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let chip8 = self.runner.chip8_ref();
        let mut text = format!(
            "PC {:03X}  I {:03X}  DT {:02X}  ST {:02X}",
            chip8.pc(),
            chip8.i(),
            chip8.delay_timer(),
            chip8.sound_timer()
        );
        if self.status.waiting_for_key {
            text.push_str("  [waiting for key]");
        }
        if self.status.beeping {
            text.push_str("  ♪");
        }

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum UnknownOpcodes {
    Ignore,
    Warn,
    Fault,
}

impl From<UnknownOpcodes> for UnknownOpcodePolicy {
    fn from(value: UnknownOpcodes) -> Self {
        match value {
            UnknownOpcodes::Ignore => UnknownOpcodePolicy::Ignore,
            UnknownOpcodes::Warn => UnknownOpcodePolicy::Warn,
            UnknownOpcodes::Fault => UnknownOpcodePolicy::Fault,
        }
    }
}

/// CHIP-8 interpreter for the terminal.
///
/// Keys 1-4, Q-R, A-F, Z-V map to CHIP-8 keys.
/// Escape is used to exit the emulator.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the CHIP-8 ROM file
    rom_path: PathBuf,

    /// Instructions executed per second
    #[arg(long, default_value_t = chip8_vm::emu::DEFAULT_CPU_HZ)]
    cpu_hz: f32,

    /// Maximum subroutine nesting depth
    #[arg(long, default_value_t = chip8_vm::emu::DEFAULT_STACK_CAPACITY)]
    stack_capacity: usize,

    /// Shift instructions (8xy6/8xyE) read Vy instead of Vx
    #[arg(long)]
    shift_uses_vy: bool,

    /// Fx55/Fx65 advance I past the last register transferred
    #[arg(long)]
    load_store_increments_index: bool,

    /// 8xy1/8xy2/8xy3 reset VF to 0
    #[arg(long)]
    logic_resets_vf: bool,

    /// What to do with instructions that don't decode
    #[arg(long, value_enum, default_value_t = UnknownOpcodes::Warn)]
    unknown_opcodes: UnknownOpcodes,

    /// Seed for the random number generator (random if not given)
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn chip8_config(&self) -> Chip8Config {
        Chip8Config {
            quirks: Quirks {
                shift_uses_vy: self.shift_uses_vy,
                load_store_increments_index: self.load_store_increments_index,
                logic_resets_vf: self.logic_resets_vf,
            },
            stack_capacity: self.stack_capacity,
            unknown_opcode_policy: self.unknown_opcodes.into(),
            rng_seed: self.seed,
        }
    }
}

/// Records kept while the terminal is in the alternate screen. Older ones are dropped first.
const MAX_LOG_RECORDS: usize = 1000;

#[derive(Default)]
struct LogRecords {
    records: VecDeque<Vec<u8>>,
    dropped: usize,
}

/// Holds the most recent log records while the terminal is in the alternate screen.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<LogRecords>>);

impl Write for LogBuffer {
    /// env_logger hands over one formatted record per write.
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        let mut logs = self
            .0
            .lock()
            .map_err(|_| std::io::Error::other("log buffer poisoned"))?;
        if logs.records.len() == MAX_LOG_RECORDS {
            logs.records.pop_front();
            logs.dropped += 1;
        }
        logs.records.push_back(data.to_vec());
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn dump(&self, out: &mut impl Write) -> std::io::Result<()> {
        let Ok(logs) = self.0.lock() else {
            return Ok(());
        };
        if logs.dropped > 0 {
            writeln!(out, "({} earlier log records dropped)", logs.dropped)?;
        }
        for record in &logs.records {
            out.write_all(record)?;
        }
        Ok(())
    }

    fn dump_to_stderr(&self) {
        let _ = self.dump(&mut std::io::stderr());
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logs = LogBuffer::default();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(logs.clone())))
        .init();

    let runner_config = RunnerConfig::new(args.cpu_hz).context("Invalid --cpu-hz")?;
    let rom = read_rom(&args.rom_path).context("Failed to read ROM file")?;
    let mut app = App::new(&rom, args.chip8_config(), runner_config)
        .context("Failed to initialize application")?;

    let mut terminal = ratatui::init();
    let app_result = app.run(&mut terminal);
    ratatui::restore();

    logs.dump_to_stderr();
    app_result
}
