//! Network identity derivation for the USB gadget
//!
//! The gadget presents a hardware address to the connected host both in its
//! USB string descriptors (12 uppercase hex digits, no separators) and to
//! the IP stack when the interface is attached. Both forms are derived once
//! at startup from a hardware-unique seed (e.g. a factory-programmed base
//! MAC) and never change afterwards.

use crate::FrameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Locally-administered bit in the first octet of a MAC address.
const LOCAL_ADMIN_BIT: u8 = 0x02;
/// Multicast bit in the first octet of a MAC address.
const MULTICAST_BIT: u8 = 0x01;
/// XOR mask applied to the last octet so the derived address never collides
/// with the seed's original owner (the seed usually belongs to another
/// interface on the same chip).
const LAST_OCTET_MASK: u8 = 0x55;

/// A 48-bit Ethernet hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// 12 uppercase hex digits, no separators. This is the form the NCM
    /// function descriptor (iMACAddress string) expects.
    pub fn to_ascii(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }

    /// True if the locally-administered bit is set.
    pub fn is_local_admin(&self) -> bool {
        self.0[0] & LOCAL_ADMIN_BIT != 0
    }

    /// True if the multicast bit is set.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & MULTICAST_BIT != 0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl FromStr for MacAddress {
    type Err = FrameError;

    /// Accepts both `AA:BB:CC:DD:EE:FF` and `AABBCCDDEEFF`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex: String = s.chars().filter(|c| *c != ':' && *c != '-').collect();
        if hex.len() != 12 {
            return Err(FrameError::InvalidMac(s.to_string()));
        }
        let mut octets = [0u8; 6];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| FrameError::InvalidMac(s.to_string()))?;
            octets[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| FrameError::InvalidMac(s.to_string()))?;
        }
        Ok(Self(octets))
    }
}

/// Interface identity consumed by the descriptor subsystem and the
/// interface-attachment code. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIdentity {
    /// Derived hardware address (locally administered, unicast).
    pub mac: MacAddress,
    /// 12-char uppercase hex form of `mac` for the USB string descriptor.
    pub mac_ascii: String,
    /// Optional hostname hint advertised to the peer.
    pub hostname: Option<String>,
}

impl NetworkIdentity {
    /// Derive the gadget's identity from a hardware-unique seed address.
    ///
    /// Forces the locally-administered bit on and the multicast bit off in
    /// the first octet, and flips the last octet with a fixed mask so the
    /// result cannot collide with the seed's original owner. Pure and
    /// deterministic: the same seed always yields the same identity.
    pub fn derive(seed: MacAddress, hostname: Option<&str>) -> Self {
        let mut octets = seed.octets();
        octets[0] |= LOCAL_ADMIN_BIT;
        octets[0] &= !MULTICAST_BIT;
        octets[5] ^= LAST_OCTET_MASK;

        let mac = MacAddress(octets);
        Self {
            mac_ascii: mac.to_ascii(),
            mac,
            hostname: hostname.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_sets_local_admin_and_clears_multicast() {
        let seed = MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        let id = NetworkIdentity::derive(seed, None);

        assert!(id.mac.is_local_admin());
        assert!(!id.mac.is_multicast());
        // Middle octets pass through untouched.
        assert_eq!(id.mac.octets()[1..5], [0xBB, 0xCC, 0xDD, 0xEE]);
        // Last octet is masked to avoid colliding with the seed's owner.
        assert_eq!(id.mac.octets()[5], 0xFF ^ 0x55);
    }

    #[test]
    fn derive_is_deterministic() {
        let seed = MacAddress::new([0x10, 0x20, 0x30, 0x40, 0x50, 0x60]);
        let a = NetworkIdentity::derive(seed, Some("gadget"));
        let b = NetworkIdentity::derive(seed, Some("gadget"));
        assert_eq!(a, b);
    }

    #[test]
    fn ascii_form_is_12_uppercase_hex_digits() {
        let seed = MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        let id = NetworkIdentity::derive(seed, None);

        assert_eq!(id.mac_ascii.len(), 12);
        assert!(
            id.mac_ascii
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase())
        );
        assert_eq!(id.mac_ascii, id.mac.to_ascii());
    }

    #[test]
    fn multicast_seed_becomes_unicast() {
        let seed = MacAddress::new([0x01, 0x00, 0x5E, 0x00, 0x00, 0x01]);
        let id = NetworkIdentity::derive(seed, None);
        assert!(!id.mac.is_multicast());
        assert!(id.mac.is_local_admin());
    }

    #[test]
    fn parse_colon_separated() {
        let mac: MacAddress = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        assert_eq!(mac.octets(), [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
    }

    #[test]
    fn parse_bare_hex() {
        let mac: MacAddress = "aabbccddeeff".parse().unwrap();
        assert_eq!(mac.octets(), [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("not-a-mac".parse::<MacAddress>().is_err());
        assert!("AA:BB:CC:DD:EE".parse::<MacAddress>().is_err());
        assert!("AA:BB:CC:DD:EE:FF:00".parse::<MacAddress>().is_err());
    }

    #[test]
    fn display_round_trips() {
        let mac = MacAddress::new([0x02, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E]);
        let parsed: MacAddress = mac.to_string().parse().unwrap();
        assert_eq!(parsed, mac);
    }
}
