use std::str::FromStr;

use crate::CryptoError;

/// Block cipher mode of operation identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    Ecb,
    Cbc,
    Pcbc,
    Cfb,
    Ofb,
    Ctr,
    /// Declared for completeness; rejected by the mode engine.
    RandomDelta,
}

impl CipherMode {
    /// All modes, in declaration order.
    pub const ALL: [CipherMode; 7] = [
        CipherMode::Ecb,
        CipherMode::Cbc,
        CipherMode::Pcbc,
        CipherMode::Cfb,
        CipherMode::Ofb,
        CipherMode::Ctr,
        CipherMode::RandomDelta,
    ];

    /// Short lowercase name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            CipherMode::Ecb => "ecb",
            CipherMode::Cbc => "cbc",
            CipherMode::Pcbc => "pcbc",
            CipherMode::Cfb => "cfb",
            CipherMode::Ofb => "ofb",
            CipherMode::Ctr => "ctr",
            CipherMode::RandomDelta => "random-delta",
        }
    }

    /// Whether the mode consumes an initialization vector.
    pub fn requires_iv(self) -> bool {
        !matches!(self, CipherMode::Ecb)
    }
}

impl FromStr for CipherMode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CryptoError::UnknownAlgorithm(s.to_string()))
    }
}

/// Block padding schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaddingMode {
    Zeros,
    #[default]
    Pkcs7,
    AnsiX923,
    Iso10126,
}

impl PaddingMode {
    pub const ALL: [PaddingMode; 4] = [
        PaddingMode::Zeros,
        PaddingMode::Pkcs7,
        PaddingMode::AnsiX923,
        PaddingMode::Iso10126,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PaddingMode::Zeros => "zeros",
            PaddingMode::Pkcs7 => "pkcs7",
            PaddingMode::AnsiX923 => "ansix923",
            PaddingMode::Iso10126 => "iso10126",
        }
    }
}

impl FromStr for PaddingMode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CryptoError::UnknownAlgorithm(s.to_string()))
    }
}

/// Direction of a cipher transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherDirection {
    Encrypt,
    Decrypt,
}

/// Block cipher cores bundled with the crypto crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockCipherId {
    Aes,
    Shacal1,
}

impl FromStr for BlockCipherId {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aes" => Ok(BlockCipherId::Aes),
            "shacal1" | "shacal-1" => Ok(BlockCipherId::Shacal1),
            _ => Err(CryptoError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Probabilistic primality test identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimalityTestId {
    Fermat,
    SolovayStrassen,
    MillerRabin,
}

impl PrimalityTestId {
    pub fn name(self) -> &'static str {
        match self {
            PrimalityTestId::Fermat => "fermat",
            PrimalityTestId::SolovayStrassen => "solovay-strassen",
            PrimalityTestId::MillerRabin => "miller-rabin",
        }
    }
}

impl FromStr for PrimalityTestId {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            PrimalityTestId::Fermat,
            PrimalityTestId::SolovayStrassen,
            PrimalityTestId::MillerRabin,
        ]
        .into_iter()
        .find(|t| t.name().eq_ignore_ascii_case(s))
        .ok_or_else(|| CryptoError::UnknownAlgorithm(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_parse_back() {
        for mode in CipherMode::ALL {
            assert_eq!(mode.name().parse::<CipherMode>().unwrap(), mode);
        }
        assert_eq!("CTR".parse::<CipherMode>().unwrap(), CipherMode::Ctr);
        assert!("gcm".parse::<CipherMode>().is_err());
    }

    #[test]
    fn test_only_ecb_skips_iv() {
        for mode in CipherMode::ALL {
            assert_eq!(mode.requires_iv(), mode != CipherMode::Ecb);
        }
    }

    #[test]
    fn test_padding_parse() {
        assert_eq!("ISO10126".parse::<PaddingMode>().unwrap(), PaddingMode::Iso10126);
        assert_eq!(PaddingMode::default(), PaddingMode::Pkcs7);
        assert!(matches!(
            "pkcs5".parse::<PaddingMode>(),
            Err(CryptoError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_primality_and_cipher_parse() {
        assert_eq!(
            "Miller-Rabin".parse::<PrimalityTestId>().unwrap(),
            PrimalityTestId::MillerRabin
        );
        assert_eq!("shacal-1".parse::<BlockCipherId>().unwrap(), BlockCipherId::Shacal1);
        assert!("des".parse::<BlockCipherId>().is_err());
    }
}
