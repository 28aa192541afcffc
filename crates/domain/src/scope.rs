//! # プロビジョニングスコープ
//!
//! 合成パスが書き込む唯一の名前空間。
//!
//! - ビルド済みの論理ノード ID を記録し、同じノードの二重ビルドを検出する
//! - リソース識別子（API ID、API キー値）を払い出す
//!
//! 識別子の払い出しは [`IdAllocator`] で抽象化し、テストでは
//! [`SequentialIdAllocator`] で決定的な値を注入する。

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::DomainError;

/// リソース識別子のトークンを払い出すトレイト
///
/// 戻り値は英小文字と数字のみからなる、ちょうど `len` 文字の文字列であること。
pub trait IdAllocator: Send {
    fn next_token(&mut self, len: usize) -> String;
}

/// UUID v4 からトークンを切り出す実装
pub struct UuidIdAllocator;

impl IdAllocator for UuidIdAllocator {
    fn next_token(&mut self, len: usize) -> String {
        let mut token = String::with_capacity(len);
        while token.len() < len {
            token.push_str(&uuid::Uuid::new_v4().simple().to_string());
        }
        token.truncate(len);
        token
    }
}

/// 連番を払い出すテスト用実装
#[derive(Debug, Default)]
pub struct SequentialIdAllocator {
    counter: u64,
}

impl SequentialIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdAllocator for SequentialIdAllocator {
    fn next_token(&mut self, len: usize) -> String {
        self.counter += 1;
        let digits = self.counter.to_string();
        if digits.len() >= len {
            return digits[digits.len() - len..].to_string();
        }
        format!("{}{}", "0".repeat(len - digits.len()), digits)
    }
}

/// API ID のトークン長
const API_ID_LENGTH: usize = 10;
/// API キー値のトークン長（プレフィックスを除く）
const API_KEY_LENGTH: usize = 26;
/// API キー値のプレフィックス
const API_KEY_PREFIX: &str = "da2-";

/// プロビジョニングスコープ
///
/// 兄弟スコープとは何も共有しない。スコープ内の論理ノード ID は一度だけ登録できる。
pub struct ProvisioningScope {
    id:        Uuid,
    region:    String,
    nodes:     BTreeSet<String>,
    allocator: Box<dyn IdAllocator>,
}

impl ProvisioningScope {
    /// UUID ベースの識別子払い出しでスコープを作成する
    pub fn new(region: impl Into<String>) -> Result<Self, DomainError> {
        Self::with_allocator(region, Box::new(UuidIdAllocator))
    }

    /// 識別子の払い出し方法を指定してスコープを作成する
    ///
    /// # エラー
    ///
    /// リージョン名が空、または英小文字・数字・ハイフン以外を含む場合は
    /// `DomainError::Config` を返す。
    pub fn with_allocator(
        region: impl Into<String>,
        allocator: Box<dyn IdAllocator>,
    ) -> Result<Self, DomainError> {
        let region = region.into().trim().to_string();
        let valid = !region.is_empty()
            && region
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(DomainError::config(
                "ProvisioningScope",
                "region",
                format!("不正なリージョン名です: '{region}'"),
            ));
        }

        Ok(Self {
            id: Uuid::now_v7(),
            region,
            nodes: BTreeSet::new(),
            allocator,
        })
    }

    /// スコープの一意識別子（UUID v7）
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// 論理ノード ID を登録する
    ///
    /// # エラー
    ///
    /// 既に登録済みの場合は `DomainError::Invariant` を返す（ビルド済みエンティティの再ビルド）。
    pub fn register(&mut self, node_id: &str) -> Result<(), DomainError> {
        if !self.nodes.insert(node_id.to_string()) {
            return Err(DomainError::invariant(format!(
                "ノード '{}' はこのスコープで既にビルドされています",
                node_id
            )));
        }
        tracing::debug!(scope = %self.id, node_id, "ノードを登録しました");
        Ok(())
    }

    /// 子ノードの ID（`{parent}/{child}`）
    pub fn child_id(parent: &str, child: &str) -> String {
        format!("{parent}/{child}")
    }

    /// 失敗したらノード登録を巻き戻すブロックを実行する
    ///
    /// `f` が `Err` を返した場合、`f` の中で登録されたノードはすべて取り消される。
    /// 払い出し済みの識別子は巻き戻さない（再利用されないだけ）。
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let before = self.nodes.clone();
        let result = f(self);
        if result.is_err() {
            tracing::debug!(
                scope = %self.id,
                released = self.nodes.len().saturating_sub(before.len()),
                "ビルドに失敗したためノード登録を取り消しました"
            );
            self.nodes = before;
        }
        result
    }

    pub fn is_registered(&self, node_id: &str) -> bool {
        self.nodes.contains(node_id)
    }

    /// 登録済みノード ID を辞書順で返す
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// API ID を払い出す
    pub fn allocate_api_id(&mut self) -> String {
        self.allocator.next_token(API_ID_LENGTH)
    }

    /// API キー値を払い出す
    pub fn allocate_api_key(&mut self) -> String {
        format!(
            "{}{}",
            API_KEY_PREFIX,
            self.allocator.next_token(API_KEY_LENGTH)
        )
    }
}

impl std::fmt::Debug for ProvisioningScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningScope")
            .field("id", &self.id)
            .field("region", &self.region)
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}
