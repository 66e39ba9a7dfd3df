//! 批次匯入 -- 將 "r,g,b" -> name 的 mapping 解析成驗證過的 entries。
//!
//! 解析與持久化是分開的兩步：先把整個 mapping 轉成 `ColorEntry` 清單和
//! skip 清單，之後才交給 store 的 `put_many` 交易。格式錯誤的 key 採
//! skip-and-report 政策，不會讓同一批的合法 entries 失敗。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ColorEntry, Rgb, MAX_CHANNEL};

// ---------------------------------------------------------------------------
// ImportReport
// ---------------------------------------------------------------------------

/// 一筆被跳過的 entry 及原因。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    /// The original mapping key, verbatim.
    pub key: String,
    /// Why it was skipped.
    pub reason: String,
}

/// 批次匯入的結果摘要。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows written to the store.
    pub imported: usize,
    /// Entries rejected during parsing, with reasons.
    pub skipped: Vec<SkippedEntry>,
}

// ---------------------------------------------------------------------------
// parse_mapping
// ---------------------------------------------------------------------------

/// 解析 `"r,g,b" -> name` mapping，回傳合法 entries 與 skip 清單。
///
/// Skip 原因包含：component 數量錯誤、非數字 component、channel 超出
/// 0..=999、空白名稱。合法 entries 保留 `BTreeMap` 的 key 順序。
pub fn parse_mapping(
    mapping: &BTreeMap<String, String>,
) -> (Vec<ColorEntry>, Vec<SkippedEntry>) {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for (key, name) in mapping {
        match parse_key(key) {
            Ok(rgb) if name.is_empty() => skipped.push(SkippedEntry {
                key: key.clone(),
                reason: format!("empty name for {rgb}"),
            }),
            Ok(rgb) => entries.push(ColorEntry::new(rgb, name.clone())),
            Err(reason) => skipped.push(SkippedEntry {
                key: key.clone(),
                reason,
            }),
        }
    }

    (entries, skipped)
}

/// 解析單一 `"r,g,b"` key。
fn parse_key(key: &str) -> Result<Rgb, String> {
    let components: Vec<&str> = key.split(',').collect();
    if components.len() != 3 {
        return Err(format!(
            "expected three comma-separated components, got {}",
            components.len()
        ));
    }

    let mut channels = [0u16; 3];
    for (i, component) in components.iter().enumerate() {
        channels[i] = component
            .parse::<u16>()
            .map_err(|_| format!("non-numeric component '{component}'"))?;
        if channels[i] > MAX_CHANNEL {
            return Err(format!(
                "channel value {} exceeds maximum {MAX_CHANNEL}",
                channels[i]
            ));
        }
    }

    Ok(Rgb::new(channels[0], channels[1], channels[2]))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
