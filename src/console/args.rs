//! Argument extraction and validation.
//!
//! Arguments are found by scanning for the next ASCII space and read with
//! C-style leading-integer semantics: leading whitespace and digits are
//! consumed, anything else reads as 0. Addresses, flags and IP octets are
//! range-checked before a [`Command`] is built. The button and function of
//! `change` are carried raw, since they are only checked once the loc is
//! known to exist; [`button`] and [`function`] do that check.

use std::fmt;
use std::net::Ipv4Addr;

use crate::model::{Address, FUNCTION_MAX, IpField, MAX_ADDRESS, MIN_ADDRESS};

use super::router::CommandKind;

/// Lowest and highest accepted bus address.
pub const BUS_ADDRESS_RANGE: (u8, u8) = (1, 31);

/// A parsed, validated console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Add(Address),
    Delete(Address),
    Change {
        address: Address,
        button: i64,
        function: i64,
    },
    Name {
        address: Address,
        name: String,
    },
    Clear,
    Erase,
    Emergency(bool),
    AcMode(bool),
    List,
    Dump,
    Settings,
    Network,
    Ssid(String),
    Password(String),
    StaticIp(bool),
    SetAddress(IpField, Ipv4Addr),
    BusAddress(u8),
    Reset,
    Exit,
}

/// Why an argument tail was rejected. `Display` is the message shown to the
/// operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    #[error("Command invalid.")]
    Missing,

    #[error("Invalid address {value}, must be {}..{}", MIN_ADDRESS, MAX_ADDRESS)]
    Address { value: i64 },

    #[error("Invalid button number, must be 0..{}", .buttons - 1)]
    Button { buttons: usize },

    #[error("Invalid function number, must be 0..{}", FUNCTION_MAX)]
    Function,

    #[error("Invalid {option} option, must be 0 or 1")]
    Flag { option: &'static str },

    #[error("Invalid IP address, each part must be 0..255")]
    Octet,

    #[error("Invalid bus address, must be {}..{}", BUS_ADDRESS_RANGE.0, BUS_ADDRESS_RANGE.1)]
    BusAddress,
}

/// Builds the command for `kind` from the text following its keyword.
pub fn parse(kind: CommandKind, tail: &str) -> Result<Command, ArgError> {
    let command = match kind {
        CommandKind::Help => Command::Help,
        CommandKind::Add => Command::Add(address(leading_int(tail))?),
        CommandKind::Delete => Command::Delete(address(leading_int(tail))?),
        CommandKind::Change => {
            let rest = next_token(tail)?;
            let raw_address = leading_int(rest);
            let rest = next_token(rest)?;
            let raw_button = leading_int(rest);
            let rest = next_token(rest)?;
            let raw_function = leading_int(rest);

            Command::Change {
                address: address(raw_address)?,
                button: raw_button,
                function: raw_function,
            }
        }
        CommandKind::Name => {
            let rest = next_token(tail)?;
            let raw_address = leading_int(rest);
            let name = next_token(rest)?;
            Command::Name {
                address: address(raw_address)?,
                name: name.to_string(),
            }
        }
        CommandKind::Clear => Command::Clear,
        CommandKind::Erase => Command::Erase,
        CommandKind::Emergency => Command::Emergency(flag(tail, "emergency")?),
        CommandKind::AcMode => Command::AcMode(flag(tail, "AC")?),
        CommandKind::List => Command::List,
        CommandKind::Dump => Command::Dump,
        CommandKind::Settings => Command::Settings,
        CommandKind::Network => Command::Network,
        CommandKind::Ssid => Command::Ssid(next_token(tail)?.to_string()),
        CommandKind::Password => Command::Password(next_token(tail)?.to_string()),
        CommandKind::StaticIp => Command::StaticIp(flag(tail, "static IP")?),
        CommandKind::Address(field) => Command::SetAddress(field, dotted_quad(tail)?),
        CommandKind::BusAddress => {
            let raw = leading_int(tail);
            let (lo, hi) = BUS_ADDRESS_RANGE;
            match u8::try_from(raw) {
                Ok(a) if (lo..=hi).contains(&a) => Command::BusAddress(a),
                _ => return Err(ArgError::BusAddress),
            }
        }
        CommandKind::Reset => Command::Reset,
        CommandKind::Exit => Command::Exit,
    };
    Ok(command)
}

/// C `atoi`: optional whitespace, optional sign, digits. No digits reads as 0.
/// Saturates instead of overflowing.
pub fn leading_int(text: &str) -> i64 {
    let s = text.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });
    if negative { -magnitude } else { magnitude }
}

/// The text after the next space.
pub fn next_token(text: &str) -> Result<&str, ArgError> {
    text.find(' ')
        .map(|i| &text[i + 1..])
        .ok_or(ArgError::Missing)
}

/// Reads `a.b.c.d`. The first part is read from the start of `text`, each
/// following part from just after the next `.`.
pub fn dotted_quad(text: &str) -> Result<Ipv4Addr, ArgError> {
    let mut parts = [leading_int(text), 0, 0, 0];
    let mut rest = text;
    for part in &mut parts[1..] {
        let dot = rest.find('.').ok_or(ArgError::Missing)?;
        rest = &rest[dot + 1..];
        *part = leading_int(rest);
    }

    let mut octets = [0u8; 4];
    for (octet, part) in octets.iter_mut().zip(parts) {
        *octet = u8::try_from(part).map_err(|_| ArgError::Octet)?;
    }
    Ok(Ipv4Addr::from(octets))
}

fn address(raw: i64) -> Result<Address, ArgError> {
    match Address::try_from(raw) {
        Ok(a) if (MIN_ADDRESS..=MAX_ADDRESS).contains(&a) => Ok(a),
        _ => Err(ArgError::Address { value: raw }),
    }
}

/// Checks a button index against the number of buttons.
pub fn button(raw: i64, buttons: usize) -> Result<usize, ArgError> {
    match usize::try_from(raw) {
        Ok(b) if b < buttons => Ok(b),
        _ => Err(ArgError::Button { buttons }),
    }
}

pub fn function(raw: i64) -> Result<u8, ArgError> {
    match u8::try_from(raw) {
        Ok(f) if f <= FUNCTION_MAX => Ok(f),
        _ => Err(ArgError::Function),
    }
}

fn flag(tail: &str, option: &'static str) -> Result<bool, ArgError> {
    match leading_int(tail) {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ArgError::Flag { option }),
    }
}

/// Renders the command in the syntax the console accepts, so output built
/// from commands can be fed straight back in.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit = |on: &bool| u8::from(*on);
        match self {
            Self::Help => write!(f, "help"),
            Self::Add(a) => write!(f, "add {a}"),
            Self::Delete(a) => write!(f, "del {a}"),
            Self::Change {
                address,
                button,
                function,
            } => write!(f, "change {address} {button} {function}"),
            Self::Name { address, name } => write!(f, "name {address} {name}"),
            Self::Clear => write!(f, "clear"),
            Self::Erase => write!(f, "erase"),
            Self::Emergency(on) => write!(f, "emergency {}", bit(on)),
            Self::AcMode(on) => write!(f, "ac {}", bit(on)),
            Self::List => write!(f, "list"),
            Self::Dump => write!(f, "dump"),
            Self::Settings => write!(f, "settings"),
            Self::Network => write!(f, "network"),
            Self::Ssid(s) => write!(f, "ssid {s}"),
            Self::Password(p) => write!(f, "password {p}"),
            Self::StaticIp(on) => write!(f, "static {}", bit(on)),
            Self::SetAddress(field, ip) => write!(f, "{} {ip}", field.keyword()),
            Self::BusAddress(a) => write!(f, "xnet {a}"),
            Self::Reset => write!(f, "reset"),
            Self::Exit => write!(f, "exit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_int_follows_atoi() {
        assert_eq!(leading_int(" 42"), 42);
        assert_eq!(leading_int("17abc"), 17);
        assert_eq!(leading_int("-3"), -3);
        assert_eq!(leading_int("abc"), 0);
        assert_eq!(leading_int(""), 0);
        assert_eq!(leading_int("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn add_checks_address_bounds() {
        assert_eq!(parse(CommandKind::Add, " 1"), Ok(Command::Add(1)));
        assert_eq!(
            parse(CommandKind::Add, " 9999"),
            Ok(Command::Add(9999))
        );
        assert_eq!(
            parse(CommandKind::Add, " 0"),
            Err(ArgError::Address { value: 0 })
        );
        assert_eq!(
            parse(CommandKind::Add, " 10000"),
            Err(ArgError::Address { value: 10000 })
        );
    }

    #[test]
    fn add_without_number_reads_zero() {
        assert_eq!(parse(CommandKind::Add, ""), Err(ArgError::Address { value: 0 }));
    }

    #[test]
    fn change_reads_three_numbers() {
        assert_eq!(
            parse(CommandKind::Change, " 3 1 12"),
            Ok(Command::Change {
                address: 3,
                button: 1,
                function: 12
            })
        );
    }

    #[test]
    fn change_keeps_button_and_function_raw() {
        assert_eq!(
            parse(CommandKind::Change, " 3 9 -1"),
            Ok(Command::Change {
                address: 3,
                button: 9,
                function: -1
            })
        );
        assert_eq!(
            parse(CommandKind::Change, " 0 1 1"),
            Err(ArgError::Address { value: 0 })
        );
    }

    #[test]
    fn button_and_function_bounds() {
        assert_eq!(button(4, 5), Ok(4));
        assert_eq!(button(5, 5), Err(ArgError::Button { buttons: 5 }));
        assert_eq!(button(-1, 5), Err(ArgError::Button { buttons: 5 }));
        assert_eq!(function(28), Ok(28));
        assert_eq!(function(29), Err(ArgError::Function));
    }

    #[test]
    fn change_with_missing_argument_is_invalid() {
        assert_eq!(
            parse(CommandKind::Change, " 3 1"),
            Err(ArgError::Missing)
        );
        assert_eq!(parse(CommandKind::Change, ""), Err(ArgError::Missing));
    }

    #[test]
    fn name_keeps_rest_of_line() {
        assert_eq!(
            parse(CommandKind::Name, " 218 BR 218 DB"),
            Ok(Command::Name {
                address: 218,
                name: "BR 218 DB".into()
            })
        );
        assert_eq!(parse(CommandKind::Name, " 218"), Err(ArgError::Missing));
    }

    #[test]
    fn flags_accept_only_zero_or_one() {
        assert_eq!(
            parse(CommandKind::AcMode, " 1"),
            Ok(Command::AcMode(true))
        );
        assert_eq!(
            parse(CommandKind::AcMode, " 2"),
            Err(ArgError::Flag { option: "AC" })
        );
        assert_eq!(
            parse(CommandKind::StaticIp, " 0"),
            Ok(Command::StaticIp(false))
        );
    }

    #[test]
    fn dotted_quad_parses_four_octets() {
        assert_eq!(
            dotted_quad(" 192.168.1.20"),
            Ok(Ipv4Addr::new(192, 168, 1, 20))
        );
    }

    #[test]
    fn dotted_quad_needs_three_dots() {
        assert_eq!(dotted_quad(" 192.168.1"), Err(ArgError::Missing));
    }

    #[test]
    fn dotted_quad_rejects_large_octets() {
        assert_eq!(dotted_quad(" 192.168.1.256"), Err(ArgError::Octet));
    }

    #[test]
    fn bus_address_range() {
        assert_eq!(
            parse(CommandKind::BusAddress, " 31"),
            Ok(Command::BusAddress(31))
        );
        assert_eq!(
            parse(CommandKind::BusAddress, " 32"),
            Err(ArgError::BusAddress)
        );
    }

    #[test]
    fn messages_name_the_bounds() {
        assert_eq!(
            ArgError::Button { buttons: 5 }.to_string(),
            "Invalid button number, must be 0..4"
        );
        assert_eq!(
            ArgError::Function.to_string(),
            "Invalid function number, must be 0..28"
        );
        assert_eq!(
            ArgError::Address { value: 0 }.to_string(),
            "Invalid address 0, must be 1..9999"
        );
    }

    #[test]
    fn display_is_parseable() {
        let change = Command::Change {
            address: 3,
            button: 2,
            function: 17,
        };
        let line = change.to_string();
        let tail = line.strip_prefix("change").unwrap();

        assert_eq!(parse(CommandKind::Change, tail), Ok(change));
    }
}
