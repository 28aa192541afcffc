//! # ドメイン層エラー定義
//!
//! 合成パス（synthesis pass）で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//! - **修正箇所の特定**: どのエンティティのどのフィールドが不正かを必ず含める
//!
//! ## エラーの種類
//!
//! | エラー種別 | 用途 |
//! |-----------|------|
//! | `Config` | 宣言された構成が不正・矛盾している |
//! | `Asset` | スキーマアセットが読めない・壊れている |
//! | `Invariant` | 内部契約違反（URL 形状の想定外、二重ビルドなど） |
//!
//! いずれも合成時に発生する致命的エラーであり、リトライもローカルでの回復も行わない。
//!
//! ## 使用例
//!
//! ```rust
//! use contenthub_domain::DomainError;
//!
//! fn validate_clients(clients: &[&str]) -> Result<(), DomainError> {
//!     if clients.is_empty() {
//!         return Err(DomainError::config(
//!             "AuthorizerBinding",
//!             "client_refs",
//!             "クライアントを 1 つ以上指定してください",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_clients(&[]).unwrap_err().is_config());
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// 最初に違反した不変条件を 1 つだけ報告する。部分的な成功状態は存在しない。
#[derive(Debug, Error)]
pub enum DomainError {
    /// 構成エラー
    ///
    /// 必須プロパティの欠落、空のクライアント一覧、CORS max-age が 0 以下、
    /// ルート・データソース名・出力キーの重複、認可モードのタグ重複など。
    #[error("構成エラー: {entity}.{field}: {message}")]
    Config {
        /// エンティティの種類（"RouteLayer", "GraphLayer" など）
        entity:  &'static str,
        /// 不正なフィールド名
        field:   &'static str,
        /// 人間可読な説明
        message: String,
    },

    /// アセットエラー
    ///
    /// スキーマ定義ファイルが読めない、または構造的に壊れている場合に使用する。
    #[error("アセットエラー: {path}: {message}")]
    Asset {
        /// 解決を試みたアセットパス
        path:    String,
        /// 人間可読な説明
        message: String,
    },

    /// 内部不変条件違反
    ///
    /// 呼び出し側のプログラミングエラーを表す（回復可能な状態ではない）。
    #[error("不変条件違反: {0}")]
    Invariant(String),
}

impl DomainError {
    /// 構成エラーを生成する
    pub fn config(entity: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self::Config {
            entity,
            field,
            message: message.into(),
        }
    }

    /// アセットエラーを生成する
    pub fn asset(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Asset {
            path:    path.into(),
            message: message.into(),
        }
    }

    /// 不変条件違反エラーを生成する
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, Self::Asset { .. })
    }

    pub fn is_invariant(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_構成エラーのメッセージはエンティティとフィールドを含む() {
        let err = DomainError::config("RouteLayer", "routes", "重複しています");
        assert_eq!(err.to_string(), "構成エラー: RouteLayer.routes: 重複しています");
    }

    #[test]
    fn test_アセットエラーのメッセージはパスを含む() {
        let err = DomainError::asset("./schema.graphql", "読み込めません");
        assert_eq!(
            err.to_string(),
            "アセットエラー: ./schema.graphql: 読み込めません"
        );
    }

    #[test]
    fn test_種別判定ヘルパー() {
        assert!(DomainError::config("A", "b", "c").is_config());
        assert!(DomainError::asset("p", "m").is_asset());
        assert!(DomainError::invariant("x").is_invariant());
        assert!(!DomainError::invariant("x").is_config());
    }
}
