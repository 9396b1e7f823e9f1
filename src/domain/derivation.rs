//! 钱包派生策略
//!
//! 同一条助记词在 Solana 上有两套互不兼容的派生约定，二者并存且必须各自
//! 复现一个主流钱包的地址：
//!
//! - `Phantom`：SLIP-0010 ed25519，固定路径 `m/44'/501'/0'/0'`，全部硬化
//! - `Bip44Account`：通用 BIP32 库，路径 `m/44'/501'/{account}'/0/0`，
//!   叶子私钥直接作为 ed25519 种子
//!
//! 两者得到的地址不同，这是预期行为，不能合并成一种方案。

use std::{fmt, str::FromStr};

use ed25519_dalek::SigningKey;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, Zeroizing};

use crate::{
    domain::{address::Address, mnemonic::SeedPhrase},
    error::{SweepError, SweepResult},
};

type HmacSha512 = Hmac<Sha512>;

/// Solana 的 SLIP-44 coin type
pub const SOLANA_COIN_TYPE: u32 = 501;

/// 硬化索引偏移
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 派生路径
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 单个路径段：31 位索引 + 硬化标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildIndex {
    index: u32,
    hardened: bool,
}

impl ChildIndex {
    pub fn hardened(index: u32) -> SweepResult<Self> {
        Self::new(index, true)
    }

    pub fn normal(index: u32) -> SweepResult<Self> {
        Self::new(index, false)
    }

    fn new(index: u32, hardened: bool) -> SweepResult<Self> {
        if index >= HARDENED_OFFSET {
            return Err(SweepError::InvalidPath(format!(
                "index {} out of range (must be < 2^31)",
                index
            )));
        }
        Ok(Self { index, hardened })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// 参与 HMAC 的 32 位值（硬化段加上 0x80000000）
    pub fn raw(&self) -> u32 {
        if self.hardened {
            self.index + HARDENED_OFFSET
        } else {
            self.index
        }
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// 有序的路径段列表，显示为 `m/44'/501'/0'/0'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath(Vec<ChildIndex>);

impl DerivationPath {
    pub fn new(segments: Vec<ChildIndex>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[ChildIndex] {
        &self.0
    }

    pub fn is_fully_hardened(&self) -> bool {
        self.0.iter().all(ChildIndex::is_hardened)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = SweepError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let path = path.trim();
        let rest = path
            .strip_prefix("m/")
            .ok_or_else(|| SweepError::InvalidPath(format!("must start with 'm/': {}", path)))?;

        let mut segments = Vec::new();
        for segment in rest.split('/') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let (digits, hardened) = match segment
                .strip_suffix('\'')
                .or_else(|| segment.strip_suffix('h'))
            {
                Some(digits) => (digits, true),
                None => (segment, false),
            };

            let index: u32 = digits.parse().map_err(|_| {
                SweepError::InvalidPath(format!("non-numeric segment '{}'", segment))
            })?;
            segments.push(ChildIndex::new(index, hardened)?);
        }

        if segments.is_empty() {
            return Err(SweepError::InvalidPath("empty derivation path".into()));
        }

        Ok(Self(segments))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 派生约定
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 两套派生约定，显式区分，避免混用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationConvention {
    /// SLIP-0010：`m/44'/501'/0'/0'`
    Phantom,
    /// 通用 BIP32：`m/44'/501'/{account}'/0/0`
    Bip44Account { account: u32 },
}

impl DerivationConvention {
    /// 按约定构造路径
    pub fn path(&self) -> SweepResult<DerivationPath> {
        let segments = match *self {
            DerivationConvention::Phantom => vec![
                ChildIndex::hardened(44)?,
                ChildIndex::hardened(SOLANA_COIN_TYPE)?,
                ChildIndex::hardened(0)?,
                ChildIndex::hardened(0)?,
            ],
            DerivationConvention::Bip44Account { account } => vec![
                ChildIndex::hardened(44)?,
                ChildIndex::hardened(SOLANA_COIN_TYPE)?,
                ChildIndex::hardened(account)?,
                ChildIndex::normal(0)?,
                ChildIndex::normal(0)?,
            ],
        };
        Ok(DerivationPath(segments))
    }

    /// 报告中显示的标签
    pub fn label(&self) -> String {
        match self {
            DerivationConvention::Phantom => "Phantom".to_string(),
            DerivationConvention::Bip44Account { account } => format!("Account {}", account),
        }
    }

    /// 一条助记词要检查的全部账户：先 Phantom，再 0..num_accounts
    pub fn scan_order(num_accounts: u32) -> Vec<DerivationConvention> {
        std::iter::once(DerivationConvention::Phantom)
            .chain((0..num_accounts).map(|account| DerivationConvention::Bip44Account { account }))
            .collect()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SLIP-0010 (ed25519)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 每一层的 (key, chain code)
pub struct KeyMaterial {
    key: Zeroizing<[u8; 32]>,
    chain_code: Zeroizing<[u8; 32]>,
}

impl KeyMaterial {
    fn from_hmac(mac: HmacSha512) -> Self {
        // 先拷贝到可控的栈缓冲区，用完即清零
        let mut buf = [0u8; 64];
        buf.copy_from_slice(&mac.finalize().into_bytes());

        let mut key = Zeroizing::new([0u8; 32]);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&buf[..32]);
        chain_code.copy_from_slice(&buf[32..]);
        buf.zeroize();

        Self { key, chain_code }
    }

    pub fn key(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// 丢弃 chain code，只保留叶子私钥
    pub fn into_key(self) -> Zeroizing<[u8; 32]> {
        self.key
    }
}

/// SLIP-0010 ed25519 派生器
pub struct Slip10Ed25519;

impl Slip10Ed25519 {
    const MASTER_SECRET: &'static [u8] = b"ed25519 seed";

    /// I = HMAC-SHA512(Key = "ed25519 seed", Data = seed)
    pub fn master_key(seed: &[u8]) -> SweepResult<KeyMaterial> {
        let mut mac = HmacSha512::new_from_slice(Self::MASTER_SECRET)
            .map_err(|e| SweepError::InvalidPath(format!("HMAC init failed: {}", e)))?;
        mac.update(seed);
        Ok(KeyMaterial::from_hmac(mac))
    }

    /// I = HMAC-SHA512(Key = chain_code, Data = 0x00 || key || ser32(index))
    pub fn child_key(parent: &KeyMaterial, index: ChildIndex) -> SweepResult<KeyMaterial> {
        if !index.is_hardened() {
            return Err(SweepError::InvalidPath(format!(
                "ed25519 only supports hardened derivation, got segment {}",
                index
            )));
        }

        let mut mac = HmacSha512::new_from_slice(parent.chain_code())
            .map_err(|e| SweepError::InvalidPath(format!("HMAC init failed: {}", e)))?;
        mac.update(&[0x00]);
        mac.update(parent.key());
        mac.update(&index.raw().to_be_bytes());
        Ok(KeyMaterial::from_hmac(mac))
    }

    pub fn derive(seed: &[u8], path: &DerivationPath) -> SweepResult<Zeroizing<[u8; 32]>> {
        let mut material = Self::master_key(seed)?;
        for index in path.segments() {
            material = Self::child_key(&material, *index)?;
        }
        Ok(material.into_key())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 通用 BIP32
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 通用 BIP32 库派生（coins-bip32 XPriv）
///
/// 账户型钱包直接取 BIP32 叶子私钥的 32 字节作为 ed25519 种子，
/// 这里保持同样的行为。
pub struct GenericBip32;

impl GenericBip32 {
    pub fn derive(seed: &[u8], path: &DerivationPath) -> SweepResult<Zeroizing<[u8; 32]>> {
        use coins_bip32::prelude::*;
        use k256::ecdsa::SigningKey as K256SigningKey;

        let master_key = XPriv::root_from_seed(seed, None)
            .map_err(|e| SweepError::InvalidPath(format!("failed to derive master key: {}", e)))?;

        let path_str = path.to_string();
        let derived_key = master_key
            .derive_path(path_str.as_str())
            .map_err(|e| SweepError::InvalidPath(format!("failed to derive {}: {}", path_str, e)))?;

        let k256_key: &K256SigningKey = derived_key.as_ref();
        let private_key_bytes: [u8; 32] = k256_key.to_bytes().into();
        Ok(Zeroizing::new(private_key_bytes))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 派生策略
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 派生结果
pub struct DerivedKeypair {
    pub convention: DerivationConvention,
    pub path: DerivationPath,
    pub address: Address,
    signing_key: SigningKey,
}

impl DerivedKeypair {
    /// 由 32 字节 ed25519 种子构造密钥对
    pub fn from_seed(
        convention: DerivationConvention,
        path: DerivationPath,
        seed: &[u8; 32],
    ) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let address = Address::from_public_key(signing_key.verifying_key().to_bytes());
        Self {
            convention,
            path,
            address,
            signing_key,
        }
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for DerivedKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKeypair")
            .field("convention", &self.convention)
            .field("path", &self.path.to_string())
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// 钱包派生策略 trait
pub trait DerivationStrategy: Send + Sync {
    /// 从已拉伸的助记词按约定派生密钥对
    fn derive_keypair(
        &self,
        phrase: &SeedPhrase,
        convention: DerivationConvention,
    ) -> SweepResult<DerivedKeypair>;
}

/// 默认策略：Phantom 走 SLIP-0010，账户型走通用 BIP32
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardDerivation;

impl StandardDerivation {
    pub fn derive_seed(
        seed: &[u8; 64],
        convention: DerivationConvention,
    ) -> SweepResult<(DerivationPath, Zeroizing<[u8; 32]>)> {
        let path = convention.path()?;
        let key = match convention {
            DerivationConvention::Phantom => Slip10Ed25519::derive(seed, &path)?,
            DerivationConvention::Bip44Account { .. } => GenericBip32::derive(seed, &path)?,
        };
        Ok((path, key))
    }
}

impl DerivationStrategy for StandardDerivation {
    fn derive_keypair(
        &self,
        phrase: &SeedPhrase,
        convention: DerivationConvention,
    ) -> SweepResult<DerivedKeypair> {
        let (path, key) = Self::derive_seed(phrase.seed(), convention)?;
        Ok(DerivedKeypair::from_seed(convention, path, &key))
    }
}

/// `derive(seedPhrase, convention) -> 32 字节私钥种子`
///
/// 纯函数：相同输入总是得到相同输出。
pub fn derive_private_seed(
    phrase: &str,
    convention: DerivationConvention,
) -> SweepResult<Zeroizing<[u8; 32]>> {
    let phrase = SeedPhrase::parse(phrase)?;
    let (_, key) = StandardDerivation::derive_seed(phrase.seed(), convention)?;
    Ok(key)
}
