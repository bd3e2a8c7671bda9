//! Global options: control mode, stop policy, network identity.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// Bus address used until one is configured.
pub const DEFAULT_BUS_ADDRESS: u8 = 30;

/// Global console settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Drive commands are generated for AC motors.
    pub ac_control: bool,

    /// Stop button issues an emergency stop rather than a normal stop.
    pub emergency_stop: bool,

    /// Wi-Fi builds only.
    pub network: NetworkSettings,

    /// Bus builds only.
    pub bus_address: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ac_control: false,
            emergency_stop: false,
            network: NetworkSettings::default(),
            bus_address: DEFAULT_BUS_ADDRESS,
        }
    }
}

/// Wi-Fi credentials and IPv4 configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkSettings {
    pub ssid: String,
    pub password: String,

    /// Use the addresses below instead of DHCP.
    pub static_ip: bool,

    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,

    /// The command station this throttle talks to.
    pub peer: Ipv4Addr,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            static_ip: false,
            ip: Ipv4Addr::new(192, 168, 0, 112),
            gateway: Ipv4Addr::new(192, 168, 0, 1),
            subnet: Ipv4Addr::new(255, 255, 255, 0),
            peer: Ipv4Addr::new(192, 168, 0, 111),
        }
    }
}

/// The four address fields settable from the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpField {
    /// This device.
    Own,
    Gateway,
    Subnet,
    /// The command station.
    Peer,
}

impl IpField {
    pub const ALL: [Self; 4] = [Self::Own, Self::Gateway, Self::Subnet, Self::Peer];

    /// Console keyword that sets this field.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Own => "ip",
            Self::Gateway => "gateway",
            Self::Subnet => "subnet",
            Self::Peer => "z21",
        }
    }

    /// Human-readable label for reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Own => "IP address",
            Self::Gateway => "Gateway",
            Self::Subnet => "Subnet mask",
            Self::Peer => "Z21 address",
        }
    }
}

impl NetworkSettings {
    pub fn address(&self, field: IpField) -> Ipv4Addr {
        match field {
            IpField::Own => self.ip,
            IpField::Gateway => self.gateway,
            IpField::Subnet => self.subnet,
            IpField::Peer => self.peer,
        }
    }

    pub fn address_mut(&mut self, field: IpField) -> &mut Ipv4Addr {
        match field {
            IpField::Own => &mut self.ip,
            IpField::Gateway => &mut self.gateway,
            IpField::Subnet => &mut self.subnet,
            IpField::Peer => &mut self.peer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"acControl":true}"#).unwrap();
        assert!(settings.ac_control);
        assert_eq!(settings.bus_address, DEFAULT_BUS_ADDRESS);
        assert_eq!(settings.network.subnet, Ipv4Addr::new(255, 255, 255, 0));
    }

    #[test]
    fn addresses_serialize_as_dotted_quads() {
        let json = serde_json::to_string(&NetworkSettings::default()).unwrap();
        assert!(json.contains(r#""peer":"192.168.0.111""#));
    }
}
