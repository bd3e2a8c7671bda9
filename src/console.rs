//! The operator console: a line-oriented command interpreter.
//!
//! Bytes from a transport go through the [`LineAssembler`]; every complete
//! line is routed through the [`CommandTable`], its arguments are validated
//! into a [`Command`], and the command runs against the locomotive registry
//! and the settings store. Responses go to an [`Emitter`]. After any
//! command that changed persisted state, the [`ChangeNotifier`] is called
//! exactly once.
//!
//! A dispatch always runs to completion before the next byte is read.

pub mod args;
pub mod assembler;
pub mod emitter;
mod format;
pub mod handlers;
pub mod notify;
pub mod router;

use std::io;

use crate::roster::LocomotiveRegistry;
use crate::settings::SettingsStore;
use crate::transport::Transport;

pub use emitter::{Echo, Emitter};
pub use handlers::Flow;
pub use notify::ChangeNotifier;
pub use router::{Capabilities, Profile, Session};

use assembler::{Assembled, LineAssembler};
use handlers::Context;
use router::CommandTable;

/// Console sizing and behavior.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub capabilities: Capabilities,
    /// Longest accepted line, in bytes.
    pub line_capacity: usize,
    /// Function buttons per locomotive.
    pub buttons: usize,
    /// Send every received byte back to the transport.
    pub echo: bool,
}

/// One interpreter instance with its collaborators.
pub struct Console<R, S, N> {
    assembler: LineAssembler,
    table: CommandTable,
    options: Options,
    registry: R,
    settings: S,
    notifier: N,
}

impl<R, S, N> Console<R, S, N>
where
    R: LocomotiveRegistry,
    S: SettingsStore,
    N: ChangeNotifier,
{
    pub fn new(options: Options, registry: R, settings: S, notifier: N) -> Self {
        Self {
            assembler: LineAssembler::new(options.line_capacity),
            table: CommandTable::new(options.capabilities),
            options,
            registry,
            settings,
            notifier,
        }
    }

    /// Reads and handles bytes until a line has been dispatched or the
    /// transport has no more data.
    ///
    /// Returns the dispatch result, or `None` once input is exhausted. The
    /// caller gets control back between commands.
    pub fn update<T: Transport>(&mut self, port: &mut T) -> io::Result<Option<Flow>> {
        while let Some(byte) = port.read_byte()? {
            if self.options.echo {
                port.echo(byte);
            }
            if let Some(flow) = self.feed(byte, port) {
                return Ok(Some(flow));
            }
        }
        Ok(None)
    }

    /// Handles one received byte; `Some` when it completed a line.
    pub fn feed(&mut self, byte: u8, out: &mut dyn Emitter) -> Option<Flow> {
        match self.assembler.feed(byte) {
            Assembled::Line(line) => Some(self.dispatch(&line, out)),
            Assembled::Pending | Assembled::Overflow => None,
        }
    }

    /// Routes and runs one complete line.
    pub fn dispatch(&mut self, line: &str, out: &mut dyn Emitter) -> Flow {
        let Some((entry, tail)) = self.table.route(line) else {
            log::debug!("unknown command: {line:?}");
            out.println("Unknown command.");
            return Flow::Continue;
        };
        log::debug!("dispatch {}: {tail:?}", entry.keyword);

        let command = match args::parse(entry.kind, tail) {
            Ok(command) => command,
            Err(e) => {
                out.println(&e.to_string());
                if let Some(fallback) = entry.on_invalid {
                    fallback(&mut self.settings);
                    self.notifier.state_changed();
                }
                return Flow::Continue;
            }
        };

        let mut cx = Context {
            registry: &mut self.registry,
            settings: &mut self.settings,
            out,
            table: &self.table,
            profile: self.options.capabilities.profile,
            buttons: self.options.buttons,
        };
        let outcome = handlers::execute(command, &mut cx);
        if outcome.changed {
            self.notifier.state_changed();
        }
        outcome.flow
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    #[cfg(test)]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Drops any partially received line.
    pub fn discard_line(&mut self) {
        self.assembler = LineAssembler::new(self.options.line_capacity);
    }

    /// Swaps in freshly loaded state, as after a restart.
    pub fn restore(&mut self, registry: R, settings: S) {
        self.registry = registry;
        self.settings = settings;
        self.discard_line();
    }
}
