//! Flokicoin network definitions and constants.

/// Flokicoin network type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    /// Flokicoin mainnet
    #[default]
    Mainnet,
}

impl Network {
    /// Get the Bech32 human-readable part for this network.
    pub fn bech32_hrp(&self) -> &'static str {
        match self {
            Network::Mainnet => "fc",
        }
    }

    /// Get the version byte for P2PKH addresses (mainnet addresses start with `F`).
    pub fn p2pkh_version(&self) -> u8 {
        match self {
            Network::Mainnet => 0x23,
        }
    }

    /// Get the version byte for P2SH addresses (mainnet addresses start with `3`).
    pub fn p2sh_version(&self) -> u8 {
        match self {
            Network::Mainnet => 0x05,
        }
    }

    /// Both legacy base58-check version bytes.
    pub fn legacy_versions(&self) -> [u8; 2] {
        [self.p2pkh_version(), self.p2sh_version()]
    }

    /// Parse network from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" | "flokicoin" => Some(Network::Mainnet),
            _ => None,
        }
    }

    /// Get network name as string.
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
        }
    }

    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Network::Mainnet => "Flokicoin Mainnet",
        }
    }
}

impl core::fmt::Display for Network {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}
