//! 输入文件解析
//!
//! 助记词列表：每行一条，忽略空行和首尾空白。
//! 归集指令：每行 `助记词;收款地址`。格式不对的行不在这里报错，
//! 而是留下一个无效的收款地址，由编排器按单个钱包失败处理。

use std::path::Path;

use anyhow::{Context, Result};

use crate::service::sweep_orchestrator::SweepJob;

fn non_empty_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().map(str::trim).filter(|line| !line.is_empty())
}

pub fn parse_seed_list(content: &str) -> Vec<String> {
    non_empty_lines(content).map(str::to_string).collect()
}

pub fn parse_sweep_jobs(content: &str) -> Vec<SweepJob> {
    non_empty_lines(content)
        .map(|line| match line.split_once(';') {
            Some((phrase, recipient)) => SweepJob {
                phrase: phrase.trim().to_string(),
                // 多余的 `;` 会留在地址里，校验时失败
                recipient: recipient.trim().to_string(),
            },
            None => SweepJob {
                phrase: line.to_string(),
                recipient: String::new(),
            },
        })
        .collect()
}

/// 读取助记词文件（读不到是致命错误）
pub fn load_seed_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read seed file: {:?}", path.as_ref()))?;
    Ok(parse_seed_list(&content))
}

/// 读取归集指令文件（读不到是致命错误）
pub fn load_job_file<P: AsRef<Path>>(path: P) -> Result<Vec<SweepJob>> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read job file: {:?}", path.as_ref()))?;
    Ok(parse_sweep_jobs(&content))
}
