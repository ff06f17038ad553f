//! Hardware address discovery.
//!
//! The node identity is the MAC address of the first network interface whose
//! name is not a loopback name. It is resolved once and then shared read-only
//! by every producer, so all identifiers from one batch carry the same node
//! entropy.

use crate::{Error, Result};
use core::fmt;
use mac_address::{MacAddress, MacAddressIterator};

/// Size of a hardware address in bytes.
pub const HARDWARE_ADDRESS_LEN: usize = 6;

/// Interface names treated as loopback (`lo` on Linux, `lo0` on BSD/macOS).
const LOOPBACK_NAMES: [&str; 2] = ["lo", "lo0"];

/// A 6-byte hardware (MAC) address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct HardwareAddress([u8; HARDWARE_ADDRESS_LEN]);

impl HardwareAddress {
    pub const fn new(octets: [u8; HARDWARE_ADDRESS_LEN]) -> Self {
        Self(octets)
    }

    pub const fn octets(&self) -> [u8; HARDWARE_ADDRESS_LEN] {
        self.0
    }
}

impl From<[u8; HARDWARE_ADDRESS_LEN]> for HardwareAddress {
    fn from(octets: [u8; HARDWARE_ADDRESS_LEN]) -> Self {
        Self(octets)
    }
}

impl From<MacAddress> for HardwareAddress {
    fn from(mac: MacAddress) -> Self {
        Self(mac.bytes())
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl fmt::Debug for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardwareAddress({self})")
    }
}

/// A network interface as seen by the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub address: HardwareAddress,
}

impl Interface {
    pub fn new(name: impl Into<String>, address: impl Into<HardwareAddress>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    fn is_loopback(&self) -> bool {
        LOOPBACK_NAMES.contains(&self.name.as_str())
    }
}

/// Enumerates the host's network interfaces.
///
/// Implement this to resolve against something other than the live host, e.g.
/// a fixed interface table in tests.
pub trait InterfaceSource {
    /// Lists interfaces in enumeration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the interfaces cannot be enumerated.
    fn interfaces(&self) -> Result<Vec<Interface>>;
}

/// The live host's interfaces, read through the `mac_address` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> Result<Vec<Interface>> {
        let iter = MacAddressIterator::new().map_err(|e| Error::NoSuitableInterface {
            reason: format!("interface enumeration failed: {e}"),
        })?;

        let mut interfaces = Vec::new();
        for mac in iter {
            // An interface that vanished between the two queries is skipped.
            let name = match mac_address::name_by_mac_address(&mac) {
                Ok(Some(name)) => name,
                Ok(None) => continue,
                Err(e) => {
                    return Err(Error::NoSuitableInterface {
                        reason: format!("interface name lookup failed: {e}"),
                    });
                }
            };
            interfaces.push(Interface::new(name, mac));
        }
        Ok(interfaces)
    }
}

/// Resolves the hardware address of the first non-loopback interface on this
/// host.
///
/// Callers should resolve once and reuse the value for every producer of a
/// batch.
///
/// # Errors
///
/// Returns [`Error::NoSuitableInterface`] if enumeration fails or only
/// loopback interfaces exist.
pub fn resolve_hardware_address() -> Result<HardwareAddress> {
    resolve_hardware_address_with(&SystemInterfaces)
}

/// Same as [`resolve_hardware_address`], against a caller-supplied interface
/// source.
///
/// # Errors
///
/// Returns [`Error::NoSuitableInterface`] if enumeration fails or only
/// loopback interfaces exist.
pub fn resolve_hardware_address_with<S>(source: &S) -> Result<HardwareAddress>
where
    S: InterfaceSource + ?Sized,
{
    let interfaces = source.interfaces()?;
    let Some(iface) = interfaces.iter().find(|iface| !iface.is_loopback()) else {
        return Err(Error::NoSuitableInterface {
            reason: format!(
                "no non-loopback interface among {} enumerated",
                interfaces.len()
            ),
        });
    };

    #[cfg(feature = "tracing")]
    tracing::debug!("Resolved hardware address {} from {}", iface.address, iface.name);

    Ok(iface.address)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedInterfaces(Vec<Interface>);

    impl InterfaceSource for FixedInterfaces {
        fn interfaces(&self) -> Result<Vec<Interface>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenInterfaces;

    impl InterfaceSource for BrokenInterfaces {
        fn interfaces(&self) -> Result<Vec<Interface>> {
            Err(Error::NoSuitableInterface {
                reason: "permission denied".into(),
            })
        }
    }

    #[test]
    fn picks_first_non_loopback_interface() {
        let source = FixedInterfaces(vec![
            Interface::new("lo", [0_u8; 6]),
            Interface::new("eth0", [0x02_u8, 0x42, 0xac, 0x11, 0x00, 0x02]),
            Interface::new("wlan0", [0x10_u8, 0x20, 0x30, 0x40, 0x50, 0x60]),
        ]);
        let hw = resolve_hardware_address_with(&source).unwrap();
        assert_eq!(hw.octets(), [0x02, 0x42, 0xac, 0x11, 0x00, 0x02]);
    }

    #[test]
    fn skips_bsd_loopback_name() {
        let source = FixedInterfaces(vec![
            Interface::new("lo0", [0_u8; 6]),
            Interface::new("en0", [1_u8, 2, 3, 4, 5, 6]),
        ]);
        assert_eq!(
            resolve_hardware_address_with(&source).unwrap(),
            HardwareAddress::new([1, 2, 3, 4, 5, 6])
        );
    }

    #[test]
    fn only_loopback_is_no_suitable_interface() {
        let source = FixedInterfaces(vec![Interface::new("lo", [0_u8; 6])]);
        assert!(matches!(
            resolve_hardware_address_with(&source),
            Err(Error::NoSuitableInterface { .. })
        ));
    }

    #[test]
    fn no_interfaces_is_no_suitable_interface() {
        let source = FixedInterfaces(Vec::new());
        assert!(matches!(
            resolve_hardware_address_with(&source),
            Err(Error::NoSuitableInterface { .. })
        ));
    }

    #[test]
    fn enumeration_failure_propagates() {
        assert_eq!(
            resolve_hardware_address_with(&BrokenInterfaces),
            Err(Error::NoSuitableInterface {
                reason: "permission denied".into()
            })
        );
    }

    #[test]
    fn displays_colon_separated_hex() {
        let hw = HardwareAddress::new([0x02, 0x42, 0xac, 0x11, 0x00, 0x0f]);
        assert_eq!(hw.to_string(), "02:42:ac:11:00:0f");
        assert_eq!(format!("{hw:?}"), "HardwareAddress(02:42:ac:11:00:0f)");
    }

    #[test]
    fn system_resolution_never_returns_loopback() {
        // Sandboxed hosts may have no usable interface; both outcomes are
        // valid, but a success must not come from a loopback interface.
        if let Ok(interfaces) = SystemInterfaces.interfaces() {
            match resolve_hardware_address() {
                Ok(hw) => assert!(
                    interfaces
                        .iter()
                        .any(|i| i.address == hw && !i.is_loopback())
                ),
                Err(e) => assert!(matches!(e, Error::NoSuitableInterface { .. })),
            }
        }
    }
}
