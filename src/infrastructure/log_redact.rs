//! 日志脱敏
//!
//! 助记词在任何日志和报告中都不能完整出现。

/// 脱敏助记词：只保留首尾两个单词，中间以单词数代替
pub fn mask_phrase(phrase: &str) -> String {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    match words.len() {
        0 => String::new(),
        1 | 2 => "*".repeat(phrase.trim().len().min(8)),
        n => format!("{} ...({} words)... {}", words[0], n - 2, words[n - 1]),
    }
}

/// 脱敏地址（显示前6位和后4位）
pub fn redact_address(address: &str) -> String {
    if address.len() < 10 {
        return "*".repeat(address.len());
    }

    let prefix = &address[..6];
    let suffix = &address[address.len() - 4..];
    format!("{}...{}", prefix, suffix)
}
