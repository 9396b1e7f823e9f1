//! 助记词 → 64 字节种子
//!
//! BIP39 英文词表，校验和验证；PBKDF2-HMAC-SHA512（salt = "mnemonic"，
//! 空口令，2048 轮）由 `bip39` crate 完成。每个助记词只拉伸一次。

use bip39::{Language, Mnemonic};
use zeroize::Zeroizing;

use crate::error::{SweepError, SweepResult};

/// 已校验的助记词及其派生出的二进制种子
pub struct SeedPhrase {
    word_count: usize,
    seed: Zeroizing<[u8; 64]>,
}

impl SeedPhrase {
    /// 解析并拉伸助记词（无额外口令）
    pub fn parse(phrase: &str) -> SweepResult<Self> {
        let normalized = phrase.split_whitespace().collect::<Vec<_>>();
        if normalized.is_empty() {
            return Err(SweepError::InvalidMnemonic("empty seed phrase".into()));
        }

        let mnemonic = Mnemonic::parse_in(Language::English, normalized.join(" "))
            .map_err(|e| SweepError::InvalidMnemonic(e.to_string()))?;

        let seed = Zeroizing::new(mnemonic.to_seed(""));

        Ok(Self {
            word_count: normalized.len(),
            seed,
        })
    }

    /// 64 字节 BIP39 种子
    pub fn seed(&self) -> &[u8; 64] {
        &self.seed
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }
}

impl std::fmt::Debug for SeedPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedPhrase")
            .field("word_count", &self.word_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_bip39_seed_vector() {
        let phrase = SeedPhrase::parse(ABANDON).unwrap();
        assert_eq!(
            hex::encode(phrase.seed()),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
        assert_eq!(phrase.word_count(), 12);
    }

    #[test]
    fn test_extra_whitespace_is_normalized() {
        let spaced = format!("  {}  ", ABANDON.replace(' ', "   "));
        let a = SeedPhrase::parse(&spaced).unwrap();
        let b = SeedPhrase::parse(ABANDON).unwrap();
        assert_eq!(a.seed(), b.seed());
    }

    #[test]
    fn test_empty_phrase_rejected() {
        assert!(matches!(
            SeedPhrase::parse("   "),
            Err(SweepError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let bad = ABANDON.replace("about", "abandon");
        assert!(matches!(
            SeedPhrase::parse(&bad),
            Err(SweepError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_unknown_word_rejected() {
        let bad = ABANDON.replace("about", "notaword");
        assert!(matches!(
            SeedPhrase::parse(&bad),
            Err(SweepError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_debug_does_not_leak_phrase() {
        let phrase = SeedPhrase::parse(ABANDON).unwrap();
        let dbg = format!("{:?}", phrase);
        assert!(!dbg.contains("abandon"));
        assert!(dbg.contains("word_count: 12"));
    }
}
