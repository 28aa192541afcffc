//! # スキーマアセットの読み込み
//!
//! [`SchemaSource`] のファイルシステム実装。アセットパスはベースディレクトリからの
//! 相対パスとして解決する。

use std::path::{Path, PathBuf};

use contenthub_domain::{DomainError, refs::SchemaAssetPath, schema::SchemaSource};

/// ファイルシステムからスキーマを読み込む実装
#[derive(Debug, Clone)]
pub struct FsSchemaSource {
    base_dir: PathBuf,
}

impl FsSchemaSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// アセットパスを実ファイルのパスに解決する
    ///
    /// 絶対パスはそのまま使う。
    pub fn resolve(&self, path: &SchemaAssetPath) -> PathBuf {
        let asset = Path::new(path.as_str());
        if asset.is_absolute() {
            asset.to_path_buf()
        } else {
            self.base_dir.join(asset)
        }
    }
}

impl SchemaSource for FsSchemaSource {
    fn load(&self, path: &SchemaAssetPath) -> Result<String, DomainError> {
        let resolved = self.resolve(path);
        tracing::debug!(path = %resolved.display(), "スキーマアセットを読み込みます");

        std::fs::read_to_string(&resolved).map_err(|e| {
            tracing::warn!(path = %resolved.display(), error = %e, "スキーマアセットを読み込めません");
            DomainError::asset(path.as_str(), format!("読み込みに失敗しました: {e}"))
        })
    }
}
