//! Command execution.
//!
//! Each handler gets an already validated [`Command`], applies it to the
//! registry or the settings, prints one confirmation or error, and reports
//! whether persisted state changed. Notification is left to the caller.

use crate::model::default_functions;
use crate::roster::{LocomotiveRegistry, RegistryError};
use crate::settings::SettingsStore;

use super::args::{self, Command};
use super::emitter::Emitter;
use super::format;
use super::router::{CommandTable, Profile};

/// What the driving loop should do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Close the interactive session.
    Close,
    /// Restart the throttle.
    Reset,
}

/// Result of running one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Persisted state was modified.
    pub changed: bool,
    pub flow: Flow,
}

impl Outcome {
    const UNCHANGED: Self = Self {
        changed: false,
        flow: Flow::Continue,
    };
    const CHANGED: Self = Self {
        changed: true,
        flow: Flow::Continue,
    };

    fn changed_if(changed: bool) -> Self {
        if changed {
            Self::CHANGED
        } else {
            Self::UNCHANGED
        }
    }
}

/// Everything a handler may touch.
pub struct Context<'a> {
    pub registry: &'a mut dyn LocomotiveRegistry,
    pub settings: &'a mut dyn SettingsStore,
    pub out: &'a mut dyn Emitter,
    pub table: &'a CommandTable,
    pub profile: Profile,
    pub buttons: usize,
}

pub fn execute(command: Command, cx: &mut Context<'_>) -> Outcome {
    match command {
        Command::Help => {
            format::help(cx.table, cx.out);
            Outcome::UNCHANGED
        }
        Command::Add(address) => Outcome::changed_if(add(cx, address)),
        Command::Delete(address) => Outcome::changed_if(delete(cx, address)),
        Command::Change {
            address,
            button,
            function,
        } => Outcome::changed_if(change(cx, address, button, function)),
        Command::Name { address, name } => Outcome::changed_if(name_loc(cx, address, &name)),
        Command::Clear => {
            cx.registry.clear();
            cx.out.println("All locs deleted.");
            Outcome::CHANGED
        }
        Command::Erase => {
            cx.registry.clear();
            cx.settings.reset_options();
            cx.out.println("All locs deleted, options set to defaults.");
            Outcome::CHANGED
        }
        Command::Emergency(on) => {
            cx.settings.set_emergency_stop(on);
            cx.out.println(if on {
                "Emergency option enabled."
            } else {
                "Emergency option disabled."
            });
            Outcome::CHANGED
        }
        Command::AcMode(on) => {
            cx.settings.set_ac_control(on);
            cx.out.println(if on {
                "AC option enabled."
            } else {
                "AC option disabled."
            });
            Outcome::CHANGED
        }
        Command::List => {
            format::list(cx.registry, cx.buttons, cx.out);
            Outcome::UNCHANGED
        }
        Command::Dump => {
            for line in format::backup(cx.registry, cx.settings, cx.profile) {
                cx.out.println(&line.to_string());
            }
            Outcome::UNCHANGED
        }
        Command::Settings => {
            format::settings(cx.registry, cx.settings, cx.profile, cx.out);
            Outcome::UNCHANGED
        }
        Command::Network => {
            format::network(cx.settings, cx.out);
            Outcome::UNCHANGED
        }
        Command::Ssid(ssid) => {
            cx.settings.set_ssid(&ssid);
            cx.out.println(&format!("SSID set to {ssid}."));
            Outcome::CHANGED
        }
        Command::Password(password) => {
            cx.settings.set_password(&password);
            cx.out.println("Password updated.");
            Outcome::CHANGED
        }
        Command::StaticIp(on) => {
            cx.settings.set_static_ip(on);
            cx.out.println(if on {
                "Static IP enabled."
            } else {
                "Static IP disabled, using DHCP."
            });
            Outcome::CHANGED
        }
        Command::SetAddress(field, address) => {
            cx.settings.set_address(field, address);
            cx.out.println(&format!("{} set to {address}.", field.label()));
            Outcome::CHANGED
        }
        Command::BusAddress(address) => {
            cx.settings.set_bus_address(address);
            cx.out.println(&format!("XpressNet address set to {address}."));
            Outcome::CHANGED
        }
        Command::Reset => {
            cx.out.println("Resetting...");
            Outcome {
                changed: false,
                flow: Flow::Reset,
            }
        }
        Command::Exit => {
            cx.out.println("Bye.");
            Outcome {
                changed: false,
                flow: Flow::Close,
            }
        }
    }
}

fn add(cx: &mut Context<'_>, address: u16) -> bool {
    match cx.registry.add(address, &default_functions(cx.buttons)) {
        Ok(()) => {
            cx.registry.sort_by_address();
            cx.out.println(&format!("Loc with address {address} added."));
            true
        }
        Err(RegistryError::Full(max)) => {
            cx.out.println(&format!(
                "Loc add failed, maximum number of locs ({max}) reached!"
            ));
            false
        }
        Err(RegistryError::AlreadyPresent(_)) => {
            cx.out.println("Loc add failed, loc already present!");
            false
        }
        Err(e @ RegistryError::NotFound(_)) => {
            log::error!("registry refused add of loc {address}: {e}");
            cx.out.println("Loc add failed!");
            false
        }
    }
}

fn delete(cx: &mut Context<'_>, address: u16) -> bool {
    match cx.registry.remove(address) {
        Ok(()) => {
            cx.out.println(&format!("Loc {address} deleted."));
            true
        }
        Err(e) => {
            log::debug!("delete refused: {e}");
            cx.out.println(&format!("Loc delete failed, loc {address} not present!"));
            false
        }
    }
}

fn not_present(cx: &mut Context<'_>, address: u16) {
    cx.out.println(&format!("Loc {address} is not present."));
}

/// The loc must exist before the button and function are looked at.
fn change(cx: &mut Context<'_>, address: u16, button: i64, function: i64) -> bool {
    let Some(mut functions) = cx.registry.functions(address) else {
        not_present(cx, address);
        return false;
    };
    let checked = args::button(button, cx.buttons)
        .and_then(|button| Ok((button, args::function(function)?)));
    let (button, function) = match checked {
        Ok(checked) => checked,
        Err(e) => {
            cx.out.println(&e.to_string());
            return false;
        }
    };
    if button >= functions.len() {
        functions.resize(button + 1, 0);
    }
    functions[button] = function;
    if cx.registry.set_functions(address, &functions).is_err() {
        not_present(cx, address);
        return false;
    }
    cx.out.println("Loc function updated.");
    true
}

fn name_loc(cx: &mut Context<'_>, address: u16, name: &str) -> bool {
    if cx.registry.set_name(address, name).is_err() {
        not_present(cx, address);
        return false;
    }
    cx.out.println("Loc name updated.");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Address, LocomotiveRecord, Settings};
    use crate::roster;

    use super::super::router::{Capabilities, Session};

    /// A registry that loses track of records between calls.
    struct Forgetful;

    impl LocomotiveRegistry for Forgetful {
        fn add(&mut self, address: Address, _: &[u8]) -> roster::Result<()> {
            Err(RegistryError::NotFound(address))
        }

        fn remove(&mut self, address: Address) -> roster::Result<()> {
            Err(RegistryError::NotFound(address))
        }

        fn index_of(&self, _: Address) -> Option<usize> {
            None
        }

        fn functions(&self, _: Address) -> Option<Vec<u8>> {
            None
        }

        fn set_functions(&mut self, address: Address, _: &[u8]) -> roster::Result<()> {
            Err(RegistryError::NotFound(address))
        }

        fn set_name(&mut self, address: Address, _: &str) -> roster::Result<()> {
            Err(RegistryError::NotFound(address))
        }

        fn sort_by_address(&mut self) {}

        fn clear(&mut self) {}

        fn len(&self) -> usize {
            0
        }

        fn get(&self, _: usize) -> Option<&LocomotiveRecord> {
            None
        }
    }

    #[test]
    fn add_reports_inconsistent_registry_as_failure() {
        let mut registry = Forgetful;
        let mut settings = Settings::default();
        let mut out = String::new();
        let table = CommandTable::new(Capabilities {
            profile: Profile::Wifi,
            session: Session::Serial,
        });
        let mut cx = Context {
            registry: &mut registry,
            settings: &mut settings,
            out: &mut out,
            table: &table,
            profile: Profile::Wifi,
            buttons: 5,
        };

        let outcome = execute(Command::Add(3), &mut cx);

        assert_eq!(outcome, Outcome::UNCHANGED);
        assert_eq!(out, "Loc add failed!\r\n");
    }
}
