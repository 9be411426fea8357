//! lutris-input demo front-end
//!
//! A terminal stand-in for the controller-driven library screen:
//! - the game list is the base scope ("LibraryContainer")
//! - Y opens the system menu, which shadows the library until B closes it
//! - SUPER toggles the overlay from any screen, even while unfocused
//! - Esc or Ctrl+C exits

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use log::info;

use lutris_input::backend::{
    AudioControl, AudioSink, BluetoothControl, GameEntry, GameLibrary, InMemoryAudio,
    InMemoryBluetooth, InMemoryLibrary,
};
use lutris_input::{
    BackendError, Button, EventLoop, GilrsSource, GlobalShortcut, InputConfig, InputContext,
    MenuOutcome, RowMenu, ScopedInput, TerminalSession, setup_global_shortcuts,
};

#[derive(Parser, Debug)]
#[command(name = "lutris-input", about = "Gamepad-navigable game list demo")]
struct Args {
    /// Config file (default: $LUTRIS_INPUT_CONFIG or ~/.config/lutris-input/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

const SYSTEM_ITEMS: [&str; 3] = ["Volume", "Bluetooth", "Quit"];

/// What the screen shows.
struct Screen {
    games: RefCell<RowMenu<String>>,
    system: RefCell<RowMenu<&'static str>>,
    system_open: Cell<bool>,
    overlay: Cell<bool>,
    status: RefCell<String>,
    dirty: Cell<bool>,
}

impl Screen {
    fn set_status(&self, status: impl Into<String>) {
        *self.status.borrow_mut() = status.into();
        self.dirty.set(true);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match &args.config {
        Some(path) => InputConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => InputConfig::load(),
    };

    let library = InMemoryLibrary::new(demo_games());
    let titles = library
        .games()
        .context("loading game library")?
        .into_iter()
        .map(|g| g.title)
        .collect();

    let audio = Rc::new(InMemoryAudio::new(vec![AudioSink {
        name: "speakers".to_string(),
        description: "Built-in speakers".to_string(),
        is_default: true,
    }]));
    let bluetooth = Rc::new(InMemoryBluetooth::new(true, Vec::new()));

    let ctx = InputContext::new(config);
    let mut event_loop = EventLoop::new(ctx.clone(), GilrsSource::new());
    let running = event_loop.running();

    let screen = Rc::new(Screen {
        games: RefCell::new(RowMenu::new(titles)),
        system: RefCell::new(RowMenu::new(SYSTEM_ITEMS.to_vec())),
        system_open: Cell::new(false),
        overlay: Cell::new(false),
        status: RefCell::new(String::new()),
        dirty: Cell::new(true),
    });

    // Global shortcuts subscribe first so they preempt every scope
    let open_menu = screen.clone();
    let toggle_overlay = screen.clone();
    let shortcuts = setup_global_shortcuts(
        &ctx,
        vec![
            GlobalShortcut::new(Button::Super, move || {
                toggle_overlay.overlay.set(!toggle_overlay.overlay.get());
                toggle_overlay.dirty.set(true);
            }),
            GlobalShortcut::new(Button::Y, move || {
                open_menu.system_open.set(true);
                open_menu.dirty.set(true);
            }),
        ],
    );

    let lib_screen = screen.clone();
    let library_scope = ScopedInput::new(&ctx, "LibraryContainer", true, move |event| {
        let outcome = lib_screen.games.borrow_mut().handle(event.button);
        match outcome {
            MenuOutcome::Moved(_) => lib_screen.dirty.set(true),
            MenuOutcome::Action(Button::A, Some(i)) => {
                let title = lib_screen.games.borrow().items()[i].clone();
                lib_screen.set_status(format!("Launching {}", title));
            }
            MenuOutcome::Action(button, _) => lib_screen.set_status(format!("{} pressed", button)),
            MenuOutcome::Ignored => {}
        }
    });

    let sys_screen = screen.clone();
    let sys_running = running.clone();
    let system_scope = ScopedInput::new(&ctx, "SystemMenu", false, move |event| {
        if event.button == Button::B {
            sys_screen.system_open.set(false);
            sys_screen.dirty.set(true);
            return;
        }
        let outcome = sys_screen.system.borrow_mut().handle(event.button);
        match outcome {
            MenuOutcome::Moved(_) => sys_screen.dirty.set(true),
            MenuOutcome::Action(Button::A, Some(i)) if SYSTEM_ITEMS[i] == "Quit" => {
                sys_running.store(false, Ordering::SeqCst);
            }
            MenuOutcome::Action(Button::A, Some(i)) => {
                let status = match SYSTEM_ITEMS[i] {
                    "Volume" => step_volume(&*audio),
                    _ => toggle_discovery(&*bluetooth),
                };
                sys_screen.set_status(status.unwrap_or_else(|e| e.to_string()));
            }
            _ => {}
        }
    });

    let type_screen = screen.clone();
    let stop_type_listener = ctx.subscribe_to_input_type(move |_| type_screen.dirty.set(true));

    info!("lutris-input starting");
    {
        let _terminal = TerminalSession::enter().context("setting up terminal")?;
        let mut last_pads = ctx.gamepad_count();
        while event_loop.tick()? {
            // Y opened the menu / B closed it: sync the scope's claim
            system_scope.set_active(screen.system_open.get());
            shortcuts.set_active(Button::Y, !screen.system_open.get());

            if ctx.gamepad_count() != last_pads {
                last_pads = ctx.gamepad_count();
                screen.dirty.set(true);
            }
            if screen.dirty.replace(false) {
                render(&screen, &ctx)?;
            }
        }
    }

    stop_type_listener();
    drop(system_scope);
    drop(library_scope);
    shortcuts.cleanup();
    ctx.shutdown();
    info!("lutris-input stopped");
    Ok(())
}

fn render(screen: &Screen, ctx: &InputContext) -> io::Result<()> {
    let mut out = io::stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    write!(
        out,
        "input: {}   pads: {}   overlay: {}\r\n\r\n",
        ctx.latest_input_type(),
        ctx.gamepad_count(),
        if screen.overlay.get() { "shown" } else { "hidden" }
    )?;

    let games = screen.games.borrow();
    for (i, title) in games.items().iter().enumerate() {
        let marker = if i == games.selected_index() { ">" } else { " " };
        write!(out, "{} {}\r\n", marker, title)?;
    }

    if screen.system_open.get() {
        write!(out, "\r\n[ System ]\r\n")?;
        let system = screen.system.borrow();
        for (i, item) in system.items().iter().enumerate() {
            let marker = if i == system.selected_index() { ">" } else { " " };
            write!(out, "  {} {}\r\n", marker, item)?;
        }
    }

    write!(out, "\r\n{}\r\n", screen.status.borrow())?;
    write!(out, "arrows/stick: move  a: select  y: system menu  b: back  esc: quit\r\n")?;
    out.flush()
}

fn step_volume(audio: &impl AudioControl) -> Result<String, BackendError> {
    let volume = audio.audio_info()?.volume;
    let next = if volume >= 100 { 0 } else { volume + 10 };
    audio.set_volume(next)?;
    Ok(format!("Volume {}%", audio.audio_info()?.volume))
}

fn toggle_discovery(bluetooth: &impl BluetoothControl) -> Result<String, BackendError> {
    if bluetooth.state()?.discovering {
        bluetooth.stop_discovery()?;
        Ok("Bluetooth discovery stopped".to_string())
    } else {
        bluetooth.start_discovery()?;
        Ok("Bluetooth discovery started".to_string())
    }
}

fn demo_games() -> Vec<GameEntry> {
    [
        ("celeste", "Celeste"),
        ("hades", "Hades"),
        ("hollow-knight", "Hollow Knight"),
        ("portal-2", "Portal 2"),
        ("stardew-valley", "Stardew Valley"),
    ]
    .into_iter()
    .map(|(id, title)| GameEntry::new(id, title))
    .collect()
}
