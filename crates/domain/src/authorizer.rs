//! # ベアラートークン認可のバインド
//!
//! ユーザーディレクトリと、そこに登録されたクライアント一覧を結び付ける。
//! ネットワーク到達可能なリソースは作らない（作るのは呼び出し側の責務）。

use serde::Serialize;

use crate::{
    DomainError,
    refs::{ClientRef, DirectoryRef},
};

/// 認可バインドの論理 ID
pub const AUTHORIZER_LOGICAL_ID: &str = "userpool-auth";

/// 認可バインド（値オブジェクト）
///
/// # 不変条件
///
/// - `client_refs` は 1 件以上（順序を保持）
/// - `directory_ref` は空でない
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizerBinding {
    id:            &'static str,
    directory_ref: DirectoryRef,
    client_refs:   Vec<ClientRef>,
}

impl AuthorizerBinding {
    pub fn id(&self) -> &str {
        self.id
    }

    pub fn directory_ref(&self) -> &DirectoryRef {
        &self.directory_ref
    }

    pub fn client_refs(&self) -> &[ClientRef] {
        &self.client_refs
    }
}

/// ユーザーディレクトリとクライアント一覧から認可バインドを作る
///
/// `directory_ref` が `None` の場合とクライアント一覧が空の場合は
/// `DomainError::Config` を返す。
pub fn bind(
    directory_ref: Option<DirectoryRef>,
    client_refs: Vec<ClientRef>,
) -> Result<AuthorizerBinding, DomainError> {
    let Some(directory_ref) = directory_ref else {
        return Err(DomainError::config(
            "AuthorizerBinding",
            "directory_ref",
            "ユーザーディレクトリの参照は必須です",
        ));
    };

    if client_refs.is_empty() {
        return Err(DomainError::config(
            "AuthorizerBinding",
            "client_refs",
            "クライアントを 1 つ以上指定してください",
        ));
    }

    tracing::debug!(
        directory = %directory_ref,
        clients = client_refs.len(),
        "認可バインドを作成しました"
    );

    Ok(AuthorizerBinding {
        id: AUTHORIZER_LOGICAL_ID,
        directory_ref,
        client_refs,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn directory() -> DirectoryRef {
        DirectoryRef::new("user-pool-D").unwrap()
    }

    fn client(id: &str) -> ClientRef {
        ClientRef::new(id).unwrap()
    }

    #[test]
    fn test_クライアント1件でバインドできる() {
        let binding = bind(Some(directory()), vec![client("C1")]).unwrap();

        assert_eq!(binding.id(), "userpool-auth");
        assert_eq!(binding.directory_ref().as_str(), "user-pool-D");
        assert_eq!(binding.client_refs(), &[client("C1")]);
    }

    #[test]
    fn test_クライアントの順序は保持される() {
        let binding = bind(
            Some(directory()),
            vec![client("C2"), client("C1"), client("C3")],
        )
        .unwrap();

        let ids: Vec<&str> = binding.client_refs().iter().map(|c| c.as_str()).collect();
        assert_eq!(ids, vec!["C2", "C1", "C3"]);
    }

    #[test]
    fn test_クライアントが空なら構成エラー() {
        let err = bind(Some(directory()), vec![]).unwrap_err();

        assert!(err.is_config());
        assert!(err.to_string().contains("client_refs"));
    }

    #[test]
    fn test_ディレクトリ参照がなければ構成エラー() {
        let err = bind(None, vec![client("C1")]).unwrap_err();

        assert!(err.is_config());
        assert!(err.to_string().contains("directory_ref"));
    }
}
