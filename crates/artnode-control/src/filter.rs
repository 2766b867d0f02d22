//! Universe filtering for inbound DMX frames

use artnode_core::{AddressingMode, PortAddress};

/// Decides whether a DMX frame is addressed to this node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressFilter {
    address: PortAddress,
    mode: AddressingMode,
}

impl AddressFilter {
    pub fn new(address: PortAddress, mode: AddressingMode) -> Self {
        Self { address, mode }
    }

    /// Exact match; no wildcard or broadcast universes
    pub fn matches(&self, target: PortAddress) -> bool {
        match self.mode {
            AddressingMode::PortAddress => target == self.address,
            AddressingMode::Legacy => target.sub_uni() == self.address.sub_uni(),
        }
    }

    /// The address frames must carry
    pub fn address(&self) -> PortAddress {
        self.address
    }

    pub fn mode(&self) -> AddressingMode {
        self.mode
    }

    /// Follow an identity change
    pub fn set_address(&mut self, address: PortAddress) {
        self.address = address;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let filter = AddressFilter::new(PortAddress::new(1, 2, 3), AddressingMode::PortAddress);
        assert!(filter.matches(PortAddress::new(1, 2, 3)));
    }

    #[test]
    fn test_any_field_mismatch_rejected() {
        let filter = AddressFilter::new(PortAddress::new(1, 2, 3), AddressingMode::PortAddress);
        assert!(!filter.matches(PortAddress::new(0, 2, 3)));
        assert!(!filter.matches(PortAddress::new(1, 0, 3)));
        assert!(!filter.matches(PortAddress::new(1, 2, 0)));
    }

    #[test]
    fn test_legacy_mode_ignores_net() {
        let filter = AddressFilter::new(PortAddress::new(0, 2, 3), AddressingMode::Legacy);
        assert!(filter.matches(PortAddress::new(0, 2, 3)));
        assert!(filter.matches(PortAddress::new(9, 2, 3)));
        assert!(!filter.matches(PortAddress::new(0, 2, 4)));
    }
}
