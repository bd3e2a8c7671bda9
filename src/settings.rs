//! The settings store seam.
//!
//! Every persisted option has its own getter and setter so the console never
//! touches the storage layout. [`Settings`] is the host store.

use std::net::Ipv4Addr;

use crate::model::{IpField, NetworkSettings, Settings};

/// Operations the console performs on the persisted options.
pub trait SettingsStore {
    fn ac_control(&self) -> bool;
    fn set_ac_control(&mut self, on: bool);

    fn emergency_stop(&self) -> bool;
    fn set_emergency_stop(&mut self, on: bool);

    fn network(&self) -> &NetworkSettings;
    fn set_ssid(&mut self, ssid: &str);
    fn set_password(&mut self, password: &str);
    fn set_static_ip(&mut self, on: bool);
    fn set_address(&mut self, field: IpField, address: Ipv4Addr);

    fn bus_address(&self) -> u8;
    fn set_bus_address(&mut self, address: u8);

    /// Restores control, stop and addressing options to their defaults.
    ///
    /// Wi-Fi credentials are kept.
    fn reset_options(&mut self);
}

impl SettingsStore for Settings {
    fn ac_control(&self) -> bool {
        self.ac_control
    }

    fn set_ac_control(&mut self, on: bool) {
        self.ac_control = on;
    }

    fn emergency_stop(&self) -> bool {
        self.emergency_stop
    }

    fn set_emergency_stop(&mut self, on: bool) {
        self.emergency_stop = on;
    }

    fn network(&self) -> &NetworkSettings {
        &self.network
    }

    fn set_ssid(&mut self, ssid: &str) {
        self.network.ssid = ssid.to_string();
    }

    fn set_password(&mut self, password: &str) {
        self.network.password = password.to_string();
    }

    fn set_static_ip(&mut self, on: bool) {
        self.network.static_ip = on;
    }

    fn set_address(&mut self, field: IpField, address: Ipv4Addr) {
        *self.network.address_mut(field) = address;
    }

    fn bus_address(&self) -> u8 {
        self.bus_address
    }

    fn set_bus_address(&mut self, address: u8) {
        self.bus_address = address;
    }

    fn reset_options(&mut self) {
        let defaults = Settings::default();
        let ssid = std::mem::take(&mut self.network.ssid);
        let password = std::mem::take(&mut self.network.password);
        *self = defaults;
        self.network.ssid = ssid;
        self.network.password = password;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keeps_credentials() {
        let mut settings = Settings::default();
        settings.set_ssid("layout");
        settings.set_password("s3cret");
        settings.set_ac_control(true);
        settings.set_static_ip(true);
        settings.set_address(IpField::Peer, Ipv4Addr::new(10, 0, 0, 5));

        settings.reset_options();

        assert!(!settings.ac_control());
        assert!(!settings.network().static_ip);
        assert_eq!(settings.network().peer, Ipv4Addr::new(192, 168, 0, 111));
        assert_eq!(settings.network().ssid, "layout");
        assert_eq!(settings.network().password, "s3cret");
    }
}
