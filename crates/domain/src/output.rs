//! # 出力レコードの公開
//!
//! 合成が成功したあとに、下流が参照する名前付きの値（URL や識別子）を公開する。
//! 公開は 1 回だけ。計算は行わない。

use itertools::Itertools;
use serde::Serialize;

use crate::DomainError;

/// 出力レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    key:   String,
    value: String,
}

impl OutputRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key:   key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// 出力レコードの公開器
///
/// *未公開* → *公開済み*（終端）の 2 状態だけを持つ。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputExporter {
    exported: Option<Vec<OutputRecord>>,
}

impl OutputExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// レコードを順序どおりに公開する
    ///
    /// # エラー
    ///
    /// - キーが空、またはキーが重複: `DomainError::Config`
    /// - 既に公開済み: `DomainError::Invariant`
    pub fn export(&mut self, records: Vec<OutputRecord>) -> Result<&[OutputRecord], DomainError> {
        if self.exported.is_some() {
            return Err(DomainError::invariant("出力レコードは既に公開されています"));
        }

        if records.iter().any(|r| r.key.trim().is_empty()) {
            return Err(DomainError::config(
                "OutputRecord",
                "key",
                "出力キーは必須です",
            ));
        }

        let duplicates: Vec<&str> = records.iter().map(|r| r.key.as_str()).duplicates().collect();
        if !duplicates.is_empty() {
            return Err(DomainError::config(
                "OutputRecord",
                "key",
                format!("出力キーが重複しています: {}", duplicates.join(", ")),
            ));
        }

        for record in &records {
            tracing::info!(key = %record.key, value = %record.value, "出力を公開しました");
        }

        Ok(self.exported.insert(records).as_slice())
    }

    pub fn is_exported(&self) -> bool {
        self.exported.is_some()
    }

    /// 公開済みレコード（未公開なら空）
    pub fn records(&self) -> &[OutputRecord] {
        self.exported.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn records() -> Vec<OutputRecord> {
        vec![
            OutputRecord::new("ApiEndpoint", "abc.execute-api.ap-northeast-1.amazonaws.com"),
            OutputRecord::new("ApiId", "xyz"),
        ]
    }

    #[test]
    fn test_レコードを順序どおりに公開できる() {
        let mut exporter = OutputExporter::new();

        let exported = exporter.export(records()).unwrap();

        let keys: Vec<&str> = exported.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec!["ApiEndpoint", "ApiId"]);
        assert!(exporter.is_exported());
        assert_eq!(exporter.records(), records().as_slice());
    }

    #[test]
    fn test_キーが重複すると構成エラーで何も公開されない() {
        let mut exporter = OutputExporter::new();
        let mut input = records();
        input.push(OutputRecord::new("ApiId", "other"));

        let err = exporter.export(input).unwrap_err();

        assert!(err.is_config());
        assert!(err.to_string().contains("ApiId"));
        assert!(!exporter.is_exported());
        assert!(exporter.records().is_empty());
    }

    #[test]
    fn test_空のキーは構成エラー() {
        let mut exporter = OutputExporter::new();

        let err = exporter
            .export(vec![OutputRecord::new(" ", "v")])
            .unwrap_err();

        assert!(err.is_config());
    }

    #[test]
    fn test_二度目の公開は不変条件違反() {
        let mut exporter = OutputExporter::new();
        exporter.export(records()).unwrap();

        let err = exporter.export(records()).unwrap_err();

        assert!(err.is_invariant());
        assert_eq!(exporter.records().len(), 2);
    }
}
