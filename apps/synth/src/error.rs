//! # 合成コマンドのエラー定義
//!
//! ドメイン層・インフラ層のエラーを束ね、設定の読み込み失敗を加えたもの。

use contenthub_domain::DomainError;
use contenthub_infra::InfraError;
use thiserror::Error;

/// 合成コマンドで発生するエラー
#[derive(Debug, Error)]
pub enum SynthError {
    /// 環境変数の欠落・不正
    #[error("設定エラー: {0}")]
    Config(String),

    /// 構成・アセット・不変条件のエラー
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// ファイル入出力のエラー
    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl SynthError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
