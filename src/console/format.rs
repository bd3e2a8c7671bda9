//! Report formatting for the read-only commands.

use std::fmt::Write as _;

use crate::model::IpField;
use crate::roster::LocomotiveRegistry;
use crate::settings::SettingsStore;

use super::args::Command;
use super::emitter::Emitter;
use super::router::{CommandTable, Profile};

/// Records printed side by side in `list`.
const LIST_COLUMNS: usize = 2;

/// Width of the address and name columns of one record.
const RECORD_LEAD: usize = 19;

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

pub(super) fn help(table: &CommandTable, out: &mut dyn Emitter) {
    for e in table.entries() {
        let synopsis = format!("{} {}", e.keyword.to_uppercase(), e.usage);
        out.println(&format!("{synopsis:<22}: {}", e.summary));
    }
}

fn list_header(buttons: usize) -> (String, String) {
    let width = RECORD_LEAD + buttons * 3 + 1;
    let top = format!("{:<width$}", format!("{:RECORD_LEAD$}Functions", ""));
    let mut bottom = String::from("Address Name       ");
    for b in 0..buttons {
        let _ = write!(bottom, "B{b:<2}");
    }
    bottom.push(' ');
    (top, bottom)
}

/// Tabular overview of the roster, two records per line.
pub(super) fn list(registry: &dyn LocomotiveRegistry, buttons: usize, out: &mut dyn Emitter) {
    if registry.is_empty() {
        out.println("No locs programmed.");
        return;
    }

    let (top, bottom) = list_header(buttons);
    out.println(top.repeat(LIST_COLUMNS).trim_end());
    out.println(bottom.repeat(LIST_COLUMNS).trim_end());

    let mut row = String::new();
    for index in 0..registry.len() {
        let Some(loc) = registry.get(index) else {
            break;
        };
        let name = loc.name.as_deref().unwrap_or("");
        let _ = write!(row, "{:>4}    {name:<10} ", loc.address);
        for f in &loc.functions {
            let _ = write!(row, "{f:>2} ");
        }
        row.push(' ');

        if (index + 1) % LIST_COLUMNS == 0 {
            out.println(row.trim_end());
            row.clear();
        }
    }
    if !row.is_empty() {
        out.println(row.trim_end());
    }
    out.print_fmt(format_args!("Number of locs: {}\r\n", registry.len()));
}

/// The command sequence that rebuilds the current state when replayed.
///
/// Wi-Fi credentials are left out.
pub(super) fn backup(
    registry: &dyn LocomotiveRegistry,
    settings: &dyn SettingsStore,
    profile: Profile,
) -> Vec<Command> {
    let mut commands = Vec::new();
    for loc in (0..registry.len()).filter_map(|i| registry.get(i)) {
        commands.push(Command::Add(loc.address));
        commands.extend(
            (0..)
                .zip(&loc.functions)
                .map(|(button, &function)| Command::Change {
                    address: loc.address,
                    button,
                    function: i64::from(function),
                }),
        );
        if let Some(name) = &loc.name {
            commands.push(Command::Name {
                address: loc.address,
                name: name.clone(),
            });
        }
    }

    commands.push(Command::AcMode(settings.ac_control()));
    commands.push(Command::Emergency(settings.emergency_stop()));
    match profile {
        Profile::Wifi => {
            let network = settings.network();
            commands.push(Command::StaticIp(network.static_ip));
            commands.extend(
                IpField::ALL
                    .iter()
                    .map(|&field| Command::SetAddress(field, network.address(field))),
            );
        }
        Profile::Bus => commands.push(Command::BusAddress(settings.bus_address())),
    }
    commands
}

pub(super) fn settings(
    registry: &dyn LocomotiveRegistry,
    settings: &dyn SettingsStore,
    profile: Profile,
    out: &mut dyn Emitter,
) {
    out.println(&format!("AC option        : {}", on_off(settings.ac_control())));
    out.println(&format!(
        "Emergency option : {}",
        on_off(settings.emergency_stop())
    ));
    match profile {
        Profile::Wifi => {
            let network = settings.network();
            out.println(&format!("SSID             : {}", network.ssid));
            out.println(&format!("Static IP        : {}", on_off(network.static_ip)));
        }
        Profile::Bus => {
            out.println(&format!("XpressNet address: {}", settings.bus_address()));
        }
    }
    out.println(&format!("Number of locs   : {}", registry.len()));
}

/// Network parameters. The password is never shown.
pub(super) fn network(settings: &dyn SettingsStore, out: &mut dyn Emitter) {
    let network = settings.network();
    out.println(&format!("{:<12}: {}", "SSID", network.ssid));
    let password = if network.password.is_empty() {
        "not set"
    } else {
        "set"
    };
    out.println(&format!("{:<12}: {password}", "Password"));
    out.println(&format!("{:<12}: {}", "Static IP", on_off(network.static_ip)));
    for field in IpField::ALL {
        out.println(&format!("{:<12}: {}", field.label(), network.address(field)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::Settings;
    use crate::roster::Roster;

    #[test]
    fn header_labels_every_button() {
        let (_, bottom) = list_header(5);
        assert_eq!(bottom, "Address Name       B0 B1 B2 B3 B4  ");
    }

    #[test]
    fn list_puts_two_records_per_line() {
        let mut roster = Roster::default();
        for a in [3, 40, 1000] {
            roster.add(a, &[0, 1, 2, 3, 4]).unwrap();
        }
        roster.set_name(40, "V200").unwrap();

        let mut out = String::new();
        list(&roster, 5, &mut out);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[2],
            "   3                0  1  2  3  4    40    V200        0  1  2  3  4"
        );
        assert_eq!(lines[3], "1000                0  1  2  3  4");
        assert_eq!(lines[4], "Number of locs: 3");
    }

    #[test]
    fn list_of_empty_roster_skips_table() {
        let mut out = String::new();
        list(&Roster::default(), 5, &mut out);
        assert_eq!(out, "No locs programmed.\r\n");
    }

    #[test]
    fn backup_lists_every_assignment() {
        let mut roster = Roster::default();
        roster.add(7, &[0, 1, 2]).unwrap();
        let settings = Settings::default();

        let lines: Vec<String> = backup(&roster, &settings, Profile::Bus)
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            lines,
            vec![
                "add 7",
                "change 7 0 0",
                "change 7 1 1",
                "change 7 2 2",
                "ac 0",
                "emergency 0",
                "xnet 30",
            ]
        );
    }

    #[test]
    fn network_report_hides_password() {
        let mut settings = Settings::default();
        settings.network.password = "hunter2".into();

        let mut out = String::new();
        network(&settings, &mut out);

        assert!(out.contains("Password    : set"));
        assert!(!out.contains("hunter2"));
    }
}
