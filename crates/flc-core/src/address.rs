//! Flokicoin address decoding.
//!
//! Supports:
//! - Native SegWit (Bech32 for v0, Bech32m for v1+) - mainnet addresses start with `fc1`
//! - Legacy Base58Check P2PKH (`F...`) and P2SH (`3...`), recognised only so they
//!   can be rejected with a dedicated message
//! - Arbitrary Base58Check payloads used for non-address identifiers

use crate::hash::checksum;
use crate::network::Network;

/// Address decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// Invalid address format
    #[error("Invalid address format")]
    InvalidFormat,
    /// Invalid Base58 character
    #[error("Invalid Base58 character: {0}")]
    InvalidBase58Char(char),
    /// Invalid checksum
    #[error("Invalid checksum")]
    InvalidChecksum,
    /// Invalid Bech32 encoding
    #[error("Invalid Bech32 encoding: {0}")]
    InvalidBech32(String),
    /// Invalid witness version
    #[error("Invalid witness version: {0}")]
    InvalidWitnessVersion(u8),
    /// Decoded payload has the wrong length
    #[error("Invalid payload length: {0}")]
    InvalidLength(usize),
}

/// A decoded native SegWit address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegwitAddress {
    /// Human-readable prefix, lower-cased.
    pub hrp: String,
    /// Witness version (0..=16).
    pub version: u8,
    /// Witness program.
    pub program: Vec<u8>,
}

/// A decoded legacy Base58Check address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyAddress {
    /// Version byte.
    pub version: u8,
    /// 20-byte public key or script hash.
    pub hash: [u8; 20],
}

/// How an input string relates to the supported address formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressClass {
    /// A native SegWit address for the expected network.
    Segwit(SegwitAddress),
    /// A well-formed SegWit address carrying another network's prefix.
    WrongNetwork { hrp: String },
    /// A legacy P2PKH/P2SH address for the expected network.
    Legacy { version: u8 },
    /// Anything else.
    Invalid,
}

/// Classify an address against the given network.
///
/// SegWit decoding is tried first; only when that fails is the input
/// treated as a possible legacy address.
pub fn classify_address(address: &str, network: Network) -> AddressClass {
    match decode_segwit(address) {
        Ok(decoded) if decoded.hrp == network.bech32_hrp() => AddressClass::Segwit(decoded),
        Ok(decoded) => AddressClass::WrongNetwork { hrp: decoded.hrp },
        Err(_) => match decode_legacy(address) {
            Ok(legacy) if network.legacy_versions().contains(&legacy.version) => {
                AddressClass::Legacy { version: legacy.version }
            }
            _ => AddressClass::Invalid,
        },
    }
}

/// Decode a legacy Base58Check address (version byte + 20-byte hash).
pub fn decode_legacy(address: &str) -> Result<LegacyAddress, AddressError> {
    let payload = base58check_decode(address)?;

    if payload.len() != 21 {
        return Err(AddressError::InvalidLength(payload.len()));
    }

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);

    Ok(LegacyAddress {
        version: payload[0],
        hash,
    })
}

// ============================================================================
// Base58 Implementation
// ============================================================================

const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Decode a Base58Check string and return the payload without its checksum.
pub fn base58check_decode(input: &str) -> Result<Vec<u8>, AddressError> {
    let mut decoded = base58_decode(input)?;

    if decoded.len() < 4 {
        return Err(AddressError::InvalidLength(decoded.len()));
    }

    let split = decoded.len() - 4;
    if decoded[split..] != checksum(&decoded[..split]) {
        return Err(AddressError::InvalidChecksum);
    }

    decoded.truncate(split);
    Ok(decoded)
}

/// Decode a raw Base58 string.
pub fn base58_decode(input: &str) -> Result<Vec<u8>, AddressError> {
    let mut result = Vec::new();

    // Leading '1's become leading zero bytes
    let leading_zeros = input.chars().take_while(|&c| c == '1').count();

    for c in input.chars() {
        let value = BASE58_ALPHABET
            .iter()
            .position(|&x| c.is_ascii() && x == c as u8)
            .ok_or(AddressError::InvalidBase58Char(c))? as u32;

        // Multiply result by 58 and add value
        let mut carry = value;
        for byte in result.iter_mut().rev() {
            let temp = (*byte as u32) * 58 + carry;
            *byte = (temp & 0xFF) as u8;
            carry = temp >> 8;
        }

        while carry > 0 {
            result.insert(0, (carry & 0xFF) as u8);
            carry >>= 8;
        }
    }

    let mut final_result = vec![0u8; leading_zeros];
    final_result.extend(result);

    Ok(final_result)
}

// ============================================================================
// Bech32/Bech32m Implementation
// ============================================================================

const BECH32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const BECH32_MAX_LENGTH: usize = 90;

const BECH32M_CONST: u32 = 0x2bc830a3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bech32Variant {
    Bech32,
    Bech32m,
}

/// Decode a native SegWit address of any network.
pub fn decode_segwit(address: &str) -> Result<SegwitAddress, AddressError> {
    let (hrp, data, variant) = bech32_decode(address)?;

    let (&witness_version, words) = data.split_first().ok_or(AddressError::InvalidFormat)?;

    match witness_version {
        0 if variant != Bech32Variant::Bech32 => {
            return Err(AddressError::InvalidBech32("SegWit v0 must use Bech32".into()));
        }
        1..=31 if variant != Bech32Variant::Bech32m => {
            return Err(AddressError::InvalidBech32("SegWit v1+ must use Bech32m".into()));
        }
        // Versions above 16 are undefined but still well formed.
        0..=31 => {}
        _ => return Err(AddressError::InvalidWitnessVersion(witness_version)),
    }

    let program = convert_bits(words, 5, 8, false)?;

    Ok(SegwitAddress {
        hrp,
        version: witness_version,
        program,
    })
}

fn bech32_decode(input: &str) -> Result<(String, Vec<u8>, Bech32Variant), AddressError> {
    if input.len() > BECH32_MAX_LENGTH {
        return Err(AddressError::InvalidLength(input.len()));
    }

    if input.bytes().any(|b| !(33..=126).contains(&b)) {
        return Err(AddressError::InvalidBech32("Character out of range".into()));
    }

    let has_lower = input.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = input.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(AddressError::InvalidBech32("Mixed case".into()));
    }

    let input_lower = input.to_ascii_lowercase();

    let sep_pos = input_lower
        .rfind('1')
        .ok_or_else(|| AddressError::InvalidBech32("No separator found".into()))?;

    if sep_pos == 0 || sep_pos + 7 > input_lower.len() {
        return Err(AddressError::InvalidBech32("Invalid separator position".into()));
    }

    let hrp = &input_lower[..sep_pos];
    let data_part = &input_lower[sep_pos + 1..];

    let mut data = Vec::with_capacity(data_part.len());
    for c in data_part.chars() {
        let idx = BECH32_CHARSET
            .find(c)
            .ok_or_else(|| AddressError::InvalidBech32(format!("Invalid character: {}", c)))?;
        data.push(idx as u8);
    }

    let variant = match bech32_polymod(&hrp_expand(hrp), &data) {
        1 => Bech32Variant::Bech32,
        BECH32M_CONST => Bech32Variant::Bech32m,
        _ => return Err(AddressError::InvalidBech32("Invalid checksum".into())),
    };

    // Drop the six checksum characters
    data.truncate(data.len() - 6);

    Ok((hrp.to_string(), data, variant))
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut result = Vec::with_capacity(hrp.len() * 2 + 1);

    for b in hrp.bytes() {
        result.push(b >> 5);
    }
    result.push(0);
    for b in hrp.bytes() {
        result.push(b & 31);
    }

    result
}

fn bech32_polymod(hrp: &[u8], data: &[u8]) -> u32 {
    const GEN: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];

    let mut chk: u32 = 1;

    for &value in hrp.iter().chain(data.iter()) {
        let top = chk >> 25;
        chk = ((chk & 0x1ffffff) << 5) ^ (value as u32);
        for (i, &g) in GEN.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }

    chk
}

fn convert_bits(data: &[u8], from_bits: u8, to_bits: u8, pad: bool) -> Result<Vec<u8>, AddressError> {
    let mut acc: u32 = 0;
    let mut bits: u8 = 0;
    let mut result = Vec::new();
    let max_value = (1u32 << to_bits) - 1;
    let max_acc = (1u32 << (from_bits + to_bits - 1)) - 1;

    for &value in data {
        if value >> from_bits != 0 {
            return Err(AddressError::InvalidBech32("Invalid value in data".into()));
        }
        acc = ((acc << from_bits) | (value as u32)) & max_acc;
        bits += from_bits;

        while bits >= to_bits {
            bits -= to_bits;
            result.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            result.push(((acc << (to_bits - bits)) & max_value) as u8);
        }
    } else if bits >= from_bits || ((acc << (to_bits - bits)) & max_value) != 0 {
        return Err(AddressError::InvalidBech32("Invalid padding".into()));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FC_P2WPKH: &str = "fc1qw508d6qejxtdg4y5r3zarvary0c5xw7kkrmtt5";
    const FC_P2TR: &str = "fc1pqqqsyqcyq5rqwzqfpg9scrgwpugpzysnzs23v9ccrydpk8qarc0svaklec";
    const FC_P2PKH: &str = "FGWP1xKhDP5RmV525TmUoEwX9mTZwp3sJn";
    const FC_P2SH: &str = "3CNHUhP3uyB9EUtRLsmvFUmvGdjGdkTxJw";

    #[test]
    fn test_p2wpkh_mainnet() {
        let result = decode_segwit(FC_P2WPKH).unwrap();

        assert_eq!(result.hrp, "fc");
        assert_eq!(result.version, 0);
        assert_eq!(hex::encode(&result.program), "751e76e8199196d454941c45d1b3a323f1433bd6");
    }

    #[test]
    fn test_p2tr_mainnet() {
        let result = decode_segwit(FC_P2TR).unwrap();

        assert_eq!(result.version, 1);
        assert_eq!(result.program, (0u8..32).collect::<Vec<_>>());
    }

    #[test]
    fn test_uppercase_is_accepted() {
        let upper = FC_P2WPKH.to_ascii_uppercase();
        assert!(matches!(classify_address(&upper, Network::Mainnet), AddressClass::Segwit(_)));
    }

    #[test]
    fn test_mixed_case_rejected() {
        let mixed = "fc1QW508d6qejxtdg4y5r3zarvary0c5xw7kkrmtt5";
        assert!(matches!(decode_segwit(mixed), Err(AddressError::InvalidBech32(_))));
    }

    #[test]
    fn test_v0_with_bech32m_checksum_rejected() {
        let result = decode_segwit("fc1qw508d6qejxtdg4y5r3zarvary0c5xw7krlt8wk");
        assert!(matches!(result, Err(AddressError::InvalidBech32(_))));
    }

    #[test]
    fn test_future_witness_version_accepted() {
        let address = "fc13w508d6qejxtdg4y5r3zarvary0c5xw7kuddcvf";
        let result = decode_segwit(address).unwrap();

        assert_eq!(result.version, 17);
        assert_eq!(hex::encode(&result.program), "751e76e8199196d454941c45d1b3a323f1433bd6");
        assert!(matches!(classify_address(address, Network::Mainnet), AddressClass::Segwit(_)));
    }

    #[test]
    fn test_wrong_network_prefix() {
        let class = classify_address("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq", Network::Mainnet);
        assert_eq!(class, AddressClass::WrongNetwork { hrp: "bc".into() });

        let class = classify_address("tfc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv9fzhl", Network::Mainnet);
        assert_eq!(class, AddressClass::WrongNetwork { hrp: "tfc".into() });
    }

    #[test]
    fn test_legacy_addresses() {
        assert_eq!(
            classify_address(FC_P2PKH, Network::Mainnet),
            AddressClass::Legacy { version: 0x23 }
        );
        assert_eq!(
            classify_address(FC_P2SH, Network::Mainnet),
            AddressClass::Legacy { version: 0x05 }
        );
    }

    #[test]
    fn test_foreign_legacy_version_is_invalid() {
        // Bitcoin P2PKH (version 0x00) is valid Base58Check but not a Flokicoin version
        let address = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";
        assert_eq!(decode_legacy(address).unwrap().version, 0x00);
        assert_eq!(classify_address(address, Network::Mainnet), AddressClass::Invalid);
    }

    #[test]
    fn test_legacy_wrong_payload_length() {
        // version 0x23 + 21 bytes
        let result = decode_legacy("25ySgBDBWVeSYKLtjkh9Kh6Xe5hEG4pECSHV");
        assert_eq!(result, Err(AddressError::InvalidLength(22)));
    }

    #[test]
    fn test_invalid_checksum() {
        let result = base58check_decode("FGWP1xKhDP5RmV525TmUoEwX9mTZwp3sJo");
        assert_eq!(result, Err(AddressError::InvalidChecksum));
    }

    #[test]
    fn test_base58check_payload() {
        assert_eq!(base58check_decode("3vQB7B6MrGQZaxCuFg4oh").unwrap(), b"hello world");
    }

    #[test]
    fn test_invalid_base58_char() {
        assert_eq!(base58_decode("0OIl"), Err(AddressError::InvalidBase58Char('0')));
    }

    #[test]
    fn test_garbage_is_invalid() {
        for input in ["", "hello", "fc1", "fc1qqqqqq", "💩💩💩", "1111"] {
            assert_eq!(classify_address(input, Network::Mainnet), AddressClass::Invalid, "{input}");
        }
    }
}
