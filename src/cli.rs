//! Command-line driver for the WMC console.
//!
//! The binary hosts one console on one transport:
//!
//! - `wmc serial` serves stdin/stdout, or a tty device with `--device`.
//! - `wmc telnet` listens for Telnet clients, one session at a time.
//! - `wmc run <LINE>...` dispatches the given lines and exits.
//!
//! State is loaded once at startup and written back after every command
//! that changed it.

use std::cell::Cell;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::console::{Capabilities, ChangeNotifier, Console, Echo, Flow, Options, Profile, Session};
use crate::model::Settings;
use crate::roster::{LocomotiveRegistry, Roster};
use crate::storage::Storage;
use crate::transport::{Serial, TelnetServer, Transport};

/// WMC: configuration console for a model railway throttle.
#[derive(Debug, Parser)]
#[command(name = "wmc", after_long_help = SESSION_HELP)]
pub struct Cli {
    /// Command set to offer. Overrides `profile` from the config file.
    #[arg(long, global = true, value_enum)]
    profile: Option<ProfileArg>,

    /// Directory holding roster.json and settings.json.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const SESSION_HELP: &str = r"Session: programming a loc
  wmc run 'add 3' 'change 3 0 10' 'name 3 V100'
  wmc run list

Backup and restore:
  wmc run dump > backup.txt
  wmc serial < backup.txt

Interactive:
  wmc serial
  wmc telnet --port 2323";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the console on a serial line.
    ///
    /// Without `--device` the console reads stdin and writes stdout, and
    /// leaves echoing to the terminal.
    Serial {
        /// Serial device to open, e.g. `/dev/ttyUSB0`.
        #[arg(long)]
        device: Option<PathBuf>,
    },

    /// Serve the console to Telnet clients.
    ///
    /// Sessions are served one after another. `exit` closes a session.
    Telnet {
        /// TCP port. Overrides `telnet-port` from the config file.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run console commands non-interactively.
    Run {
        /// Command lines, one per argument.
        #[arg(required = true)]
        lines: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileArg {
    /// Wi-Fi throttle with network settings.
    Wifi,
    /// XpressNet bus throttle.
    Bus,
}

impl ProfileArg {
    fn to_domain(self) -> Profile {
        match self {
            Self::Wifi => Profile::Wifi,
            Self::Bus => Profile::Bus,
        }
    }
}

pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();
    let profile = cli.profile.map_or(config.profile, ProfileArg::to_domain);
    let state = State::open(config, cli.state_dir)?;

    match cli.command {
        Command::Serial { device } => cmd_serial(config, &state, profile, device),
        Command::Telnet { port } => cmd_telnet(config, &state, profile, port),
        Command::Run { lines } => {
            let mut console = state.console(config, profile, Session::Serial, false)?;
            cmd_run(&mut console, &state, &lines)
        }
    }
}

/// Set by the console whenever persisted state changed.
#[derive(Debug, Clone, Default)]
struct Dirty(Rc<Cell<bool>>);

impl Dirty {
    fn take(&self) -> bool {
        self.0.replace(false)
    }
}

impl ChangeNotifier for Dirty {
    fn state_changed(&mut self) {
        self.0.set(true);
    }
}

type HostConsole = Console<Roster, Settings, Dirty>;

/// Persistent state shared by every console session.
struct State {
    storage: Storage,
    max_locomotives: usize,
    dirty: Dirty,
}

impl State {
    fn open(config: &Config, state_dir: Option<PathBuf>) -> Result<Self, String> {
        let root = match state_dir.or_else(|| config.state_dir.clone()) {
            Some(dir) => dir,
            None => Storage::default_root().ok_or("could not determine home directory")?,
        };
        let storage = Storage::new(root.clone())
            .map_err(|e| format!("failed to initialize storage at {}: {e}", root.display()))?;
        log::debug!("state directory: {}", root.display());

        Ok(Self {
            storage,
            max_locomotives: config.max_locomotives,
            dirty: Dirty::default(),
        })
    }

    fn load(&self) -> Result<(Roster, Settings), String> {
        let mut roster = self
            .storage
            .load_roster()
            .map_err(|e| format!("failed to load roster: {e}"))?;
        roster.set_capacity(self.max_locomotives);
        roster.sort_by_address();
        if roster.len() > self.max_locomotives {
            log::warn!(
                "roster holds {} locs, more than the configured maximum of {}",
                roster.len(),
                self.max_locomotives
            );
        }

        let settings = self
            .storage
            .load_settings()
            .map_err(|e| format!("failed to load settings: {e}"))?;
        Ok((roster, settings))
    }

    fn console(
        &self,
        config: &Config,
        profile: Profile,
        session: Session,
        echo: bool,
    ) -> Result<HostConsole, String> {
        let (roster, settings) = self.load()?;
        log::info!("loaded {} locs", roster.len());

        let options = Options {
            capabilities: Capabilities { profile, session },
            line_capacity: config.line_capacity,
            buttons: config.buttons,
            echo,
        };
        Ok(Console::new(options, roster, settings, self.dirty.clone()))
    }

    /// Writes both records if the last dispatch changed anything.
    ///
    /// A failed save is logged; the console keeps running on its in-memory
    /// state.
    fn persist(&self, console: &HostConsole) {
        if !self.dirty.take() {
            return;
        }
        if let Err(e) = self.storage.save_roster(console.registry()) {
            log::error!("failed to save roster: {e}");
        }
        if let Err(e) = self.storage.save_settings(console.settings()) {
            log::error!("failed to save settings: {e}");
        }
        log::debug!("state saved");
    }

    /// Reloads stored state into the console, as after a power cycle.
    fn restart(&self, console: &mut HostConsole) -> Result<(), String> {
        let (roster, settings) = self.load()?;
        console.restore(roster, settings);
        log::info!("console restarted");
        Ok(())
    }
}

/// Drives one console over one transport until the session ends.
fn serve<T: Transport>(console: &mut HostConsole, port: &mut T, state: &State) -> Result<(), String> {
    loop {
        let step = console
            .update(port)
            .map_err(|e| format!("transport error: {e}"))?;
        state.persist(console);

        match step {
            Some(Flow::Continue) => {}
            Some(Flow::Reset) => state.restart(console)?,
            Some(Flow::Close) | None => return Ok(()),
        }
    }
}

fn cmd_serial(
    config: &Config,
    state: &State,
    profile: Profile,
    device: Option<PathBuf>,
) -> Result<(), String> {
    let Some(path) = device else {
        let mut console = state.console(config, profile, Session::Serial, false)?;
        let mut port = Serial::new(io::stdin().lock(), io::stdout()).lf_as_cr();
        return serve(&mut console, &mut port, state);
    };

    let rx = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&path)
        .map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let tx = rx
        .try_clone()
        .map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    log::info!("serving console on {}", path.display());

    let mut console = state.console(config, profile, Session::Serial, config.echo)?;
    let mut port = Serial::new(rx, tx);
    serve(&mut console, &mut port, state)
}

fn cmd_telnet(
    config: &Config,
    state: &State,
    profile: Profile,
    port: Option<u16>,
) -> Result<(), String> {
    let port = port.unwrap_or(config.telnet_port);
    let server = TelnetServer::bind(port)
        .map_err(|e| format!("failed to listen on port {port}: {e}"))?;
    match server.local_addr() {
        Ok(addr) => log::info!("telnet console listening on {addr}"),
        Err(e) => log::warn!("listening on port {port}, local address unknown: {e}"),
    }

    let mut console = state.console(config, profile, Session::Telnet, config.echo)?;
    loop {
        let mut session = match server.accept() {
            Ok(session) => session,
            Err(e) => {
                log::warn!("telnet accept failed: {e}");
                continue;
            }
        };
        if let Err(e) = serve(&mut console, &mut session, state) {
            log::warn!("telnet session aborted: {e}");
        }
        console.discard_line();
        log::info!("telnet session closed");
    }
}

fn cmd_run(console: &mut HostConsole, state: &State, lines: &[String]) -> Result<(), String> {
    let mut out = Echo::new(io::stdout());
    for line in lines {
        let flow = console.dispatch(line, &mut out);
        state.persist(console);

        match flow {
            Flow::Continue => {}
            Flow::Reset => state.restart(console)?,
            Flow::Close => break,
        }
    }
    Ok(())
}
