//! Keyword table and prefix routing.
//!
//! A line is routed by testing it against each keyword in table order; the
//! first keyword the line starts with wins and everything after it is the
//! argument tail. There is no tokenizer, so table order decides between
//! overlapping keywords: when one keyword is a prefix of another, the longer
//! one must come first. [`CommandTable::new`] checks that rule.

use serde::{Deserialize, Serialize};

use crate::model::IpField;
use crate::settings::SettingsStore;

/// Which feature set the console is built for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Wi-Fi throttle talking to a Z21 over UDP: network commands.
    #[default]
    Wifi,
    /// Wired throttle on an XpressNet bus: bus address and hardware reset.
    Bus,
}

/// The transport a console instance serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Serial,
    /// Interactive network session that the operator can close.
    Telnet,
}

/// Everything that decides which commands exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub profile: Profile,
    pub session: Session,
}

/// Identifies a command before its arguments are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    Add,
    Delete,
    Change,
    Name,
    Clear,
    Erase,
    Emergency,
    AcMode,
    List,
    Dump,
    Settings,
    Network,
    Ssid,
    Password,
    StaticIp,
    Address(IpField),
    BusAddress,
    Reset,
    Exit,
}

/// When an entry is part of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requires {
    Always,
    Profile(Profile),
    Session(Session),
}

/// Applied to the settings when an entry's arguments are rejected.
pub type Fallback = fn(&mut dyn SettingsStore);

/// One row of the command table.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub keyword: &'static str,
    pub kind: CommandKind,
    /// Argument synopsis for the help screen.
    pub usage: &'static str,
    pub summary: &'static str,
    /// Safe value forced when the argument is invalid.
    pub on_invalid: Option<Fallback>,
    requires: Requires,
}

const fn entry(
    keyword: &'static str,
    kind: CommandKind,
    usage: &'static str,
    summary: &'static str,
    requires: Requires,
) -> Entry {
    Entry {
        keyword,
        kind,
        usage,
        summary,
        on_invalid: None,
        requires,
    }
}

fn ac_off(settings: &mut dyn SettingsStore) {
    settings.set_ac_control(false);
}

fn emergency_off(settings: &mut dyn SettingsStore) {
    settings.set_emergency_stop(false);
}

const WIFI: Requires = Requires::Profile(Profile::Wifi);
const BUS: Requires = Requires::Profile(Profile::Bus);

/// Every command any build knows, in routing order.
const ENTRIES: &[Entry] = &[
    entry("help", CommandKind::Help, "", "This screen.", Requires::Always),
    entry("add", CommandKind::Add, "x", "Add loc with address x.", Requires::Always),
    entry("del", CommandKind::Delete, "x", "Delete loc with address x.", Requires::Always),
    entry(
        "change",
        CommandKind::Change,
        "x y z",
        "Assign function z to button y of loc with address x.",
        Requires::Always,
    ),
    entry("name", CommandKind::Name, "x <name>", "Set name of loc with address x.", Requires::Always),
    entry("clear", CommandKind::Clear, "", "Delete all locs.", Requires::Always),
    entry("erase", CommandKind::Erase, "", "Delete all locs and reset options.", Requires::Always),
    Entry {
        on_invalid: Some(emergency_off),
        ..entry(
            "emergency",
            CommandKind::Emergency,
            "0|1",
            "1: stop button gives emergency stop.",
            Requires::Always,
        )
    },
    Entry {
        on_invalid: Some(ac_off),
        ..entry("ac", CommandKind::AcMode, "0|1", "1: AC loc control.", Requires::Always)
    },
    entry("list", CommandKind::List, "", "Show all programmed locs.", Requires::Always),
    entry("dump", CommandKind::Dump, "", "Dump data for backup.", Requires::Always),
    entry("settings", CommandKind::Settings, "", "Show settings.", Requires::Always),
    entry("network", CommandKind::Network, "", "Show network settings.", WIFI),
    entry("ssid", CommandKind::Ssid, "<name>", "Set SSID name (Wifi) to connect to.", WIFI),
    entry("password", CommandKind::Password, "<password>", "Set password (Wifi).", WIFI),
    entry("static", CommandKind::StaticIp, "0|1", "1: use static IP settings.", WIFI),
    entry("ip", CommandKind::Address(IpField::Own), "a.b.c.d", "Set static IP address.", WIFI),
    entry("gateway", CommandKind::Address(IpField::Gateway), "a.b.c.d", "Set gateway.", WIFI),
    entry("subnet", CommandKind::Address(IpField::Subnet), "a.b.c.d", "Set subnet mask.", WIFI),
    entry("z21", CommandKind::Address(IpField::Peer), "a.b.c.d", "Set Z21 IP address.", WIFI),
    entry("xnet", CommandKind::BusAddress, "x", "Set XpressNet address x.", BUS),
    entry("reset", CommandKind::Reset, "", "Reset the throttle.", BUS),
    entry(
        "exit",
        CommandKind::Exit,
        "",
        "Close this session.",
        Requires::Session(Session::Telnet),
    ),
];

/// The commands enabled for one console instance, in routing order.
#[derive(Debug, Clone)]
pub struct CommandTable {
    entries: Vec<Entry>,
}

impl CommandTable {
    pub fn new(capabilities: Capabilities) -> Self {
        let entries: Vec<Entry> = ENTRIES
            .iter()
            .filter(|e| match e.requires {
                Requires::Always => true,
                Requires::Profile(p) => p == capabilities.profile,
                Requires::Session(s) => s == capabilities.session,
            })
            .copied()
            .collect();
        debug_assert!(
            shadowed(&entries).is_none(),
            "keyword table order lets a shorter keyword shadow a longer one"
        );
        Self { entries }
    }

    /// Finds the entry for `line` and the argument tail after its keyword.
    pub fn route<'l>(&self, line: &'l str) -> Option<(&Entry, &'l str)> {
        self.entries.iter().find_map(|e| {
            let n = e.keyword.len();
            let head = line.as_bytes().get(..n)?;
            // The matched bytes are ASCII, so `n` is a char boundary.
            head.eq_ignore_ascii_case(e.keyword.as_bytes())
                .then(|| (e, &line[n..]))
        })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn contains(&self, kind: CommandKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }
}

/// First pair `(earlier, later)` where `earlier` is a strict prefix of
/// `later` and would therefore capture all of its lines.
fn shadowed(entries: &[Entry]) -> Option<(&'static str, &'static str)> {
    entries.iter().enumerate().find_map(|(i, earlier)| {
        entries[i + 1..]
            .iter()
            .find(|later| {
                later.keyword.len() > earlier.keyword.len()
                    && later.keyword.starts_with(earlier.keyword)
            })
            .map(|later| (earlier.keyword, later.keyword))
    })
}
