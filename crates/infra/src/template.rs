//! # テンプレートの書き出し
//!
//! 合成結果を `{dir}/{stack_name}.template.json` に整形済み JSON として書き出す。
//! 出力ディレクトリが無ければ作成する。既存ファイルは上書きする。

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::InfraError;

/// テンプレートファイルの拡張子
pub const TEMPLATE_SUFFIX: &str = ".template.json";

/// スタック名からテンプレートのファイルパスを組み立てる
pub fn template_path(dir: &Path, stack_name: &str) -> PathBuf {
    dir.join(format!("{stack_name}{TEMPLATE_SUFFIX}"))
}

/// テンプレートを書き出す
///
/// # エラー
///
/// - スタック名が空、またはパス区切り文字を含む: `InfraErrorKind::InvalidInput`
/// - シリアライズに失敗: `InfraErrorKind::Serialization`
/// - ディレクトリ作成・書き込みに失敗: `InfraErrorKind::Io`
///
/// [`InfraErrorKind`]: crate::error::InfraErrorKind
#[tracing::instrument(skip(dir, template), fields(dir = %dir.display()))]
pub fn write_template<T: Serialize>(
    dir: &Path,
    stack_name: &str,
    template: &T,
) -> Result<PathBuf, InfraError> {
    let stack_name = stack_name.trim();
    if stack_name.is_empty() {
        return Err(InfraError::invalid_input("スタック名は必須です"));
    }
    if stack_name.contains(['/', '\\']) {
        return Err(InfraError::invalid_input(format!(
            "スタック名にパス区切り文字は使えません: {stack_name}"
        )));
    }

    let mut body = serde_json::to_string_pretty(template)?;
    body.push('\n');

    std::fs::create_dir_all(dir)?;
    let path = template_path(dir, stack_name);
    std::fs::write(&path, body)?;

    tracing::info!(path = %path.display(), "テンプレートを書き出しました");
    Ok(path)
}
