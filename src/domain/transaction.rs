//! System Program 原生转账交易
//!
//! 单条 `Transfer` 指令的 legacy 交易：`solana_system_interface` 生成指令，
//! `solana_sdk::message::Message` 编译账户表，签名由派生出的 ed25519 私钥完成，
//! 线格式为 `bincode` 序列化的 `Transaction`。

use ed25519_dalek::{Signer, SigningKey};
use solana_sdk::{
    hash::Hash, message::Message, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use solana_system_interface::instruction::transfer;

use crate::{
    domain::address::Address,
    error::{SweepError, SweepResult},
};

/// 解析 RPC 返回的 Base58 区块哈希
pub fn parse_blockhash(s: &str) -> SweepResult<Hash> {
    s.parse::<Hash>()
        .map_err(|e| SweepError::Transaction(format!("invalid blockhash {}: {}", s, e)))
}

/// 转账请求：源私钥、目标地址、金额（lamports）
pub struct TransferRequest<'a> {
    pub source: &'a SigningKey,
    pub destination: Address,
    pub lamports: u64,
}

impl TransferRequest<'_> {
    pub fn source_address(&self) -> Address {
        Address::from_public_key(self.source.verifying_key().to_bytes())
    }
}

/// 已签名交易
#[derive(Debug, Clone)]
pub struct SignedTransfer {
    pub signature: [u8; 64],
    pub wire: Vec<u8>,
}

impl SignedTransfer {
    /// 交易 ID（第一个签名的 Base58）
    pub fn signature_b58(&self) -> String {
        bs58::encode(self.signature).into_string()
    }
}

fn to_pubkey(address: &Address) -> Pubkey {
    Pubkey::new_from_array(*address.as_bytes())
}

/// 构建待签名的 message
pub fn build_transfer_message(
    from: &Address,
    to: &Address,
    lamports: u64,
    recent_blockhash: &Hash,
) -> SweepResult<Message> {
    if lamports == 0 {
        return Err(SweepError::Transaction("transfer amount cannot be zero".into()));
    }

    let from = to_pubkey(from);
    let ix = transfer(&from, &to_pubkey(to), lamports);

    let mut message = Message::new(&[ix], Some(&from));
    message.recent_blockhash = *recent_blockhash;
    Ok(message)
}

/// 构建并签名转账交易
pub fn sign_transfer(
    request: &TransferRequest<'_>,
    recent_blockhash: &Hash,
) -> SweepResult<SignedTransfer> {
    let from = request.source_address();
    let message = build_transfer_message(
        &from,
        &request.destination,
        request.lamports,
        recent_blockhash,
    )?;

    let signature = request.source.sign(&message.serialize()).to_bytes();

    let tx = Transaction {
        signatures: vec![Signature::from(signature)],
        message,
    };
    let wire = bincode::serialize(&tx)
        .map_err(|e| SweepError::Transaction(format!("failed to serialize transaction: {}", e)))?;

    Ok(SignedTransfer { signature, wire })
}
