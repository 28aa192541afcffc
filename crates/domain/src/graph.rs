//! # グラフクエリ層
//!
//! スキーマ駆動のクエリ面。デフォルト認可モードをちょうど 1 つ、追加の認可モードを
//! 0 個以上持ち、データソースを介して共有のキーバリューテーブルにバインドされる。
//!
//! ## 認可モードの方針
//!
//! - `ApiKey` は有限の有効期限を必ず持つ
//! - `SignedRequest` は有効期限を持たない（呼び出し元の資格情報で毎回検証される）

use std::collections::BTreeSet;

use chrono::TimeDelta;
use serde::Serialize;
use strum::IntoStaticStr;

use crate::{
    DomainError,
    refs::{SchemaAssetPath, StoreRef},
    schema::{GraphSchema, SchemaSource},
    scope::ProvisioningScope,
};

// =========================================================================
// AuthMode
// =========================================================================

/// 認可モードのタグ
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthModeTag {
    ApiKey,
    SignedRequest,
}

/// 認可モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthMode {
    /// API キー認可
    ApiKey {
        /// 発行からの有効期間（秒）
        #[serde(serialize_with = "serialize_seconds")]
        expires_after: TimeDelta,
    },
    /// 署名付きリクエスト認可
    SignedRequest,
}

fn serialize_seconds<S: serde::Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.num_seconds())
}

/// API キーの有効期限の上限（日）
pub const API_KEY_MAX_EXPIRY_DAYS: i64 = 365;

impl AuthMode {
    /// 日数指定で API キー認可を作る
    ///
    /// 範囲の検証は [`GraphLayer::create`] で行う。ここでは `TimeDelta` に
    /// 収まらない値だけを `DomainError::Config` として弾く。
    pub fn api_key_days(days: i64) -> Result<Self, DomainError> {
        let expires_after = TimeDelta::try_days(days).ok_or_else(|| {
            DomainError::config(
                "GraphLayer",
                "expires_after",
                format!("API キーの有効日数が範囲外です（{days} 日）"),
            )
        })?;
        Ok(Self::ApiKey { expires_after })
    }

    pub fn tag(&self) -> AuthModeTag {
        match self {
            Self::ApiKey { .. } => AuthModeTag::ApiKey,
            Self::SignedRequest => AuthModeTag::SignedRequest,
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), DomainError> {
        match self {
            Self::ApiKey { expires_after } if *expires_after <= TimeDelta::zero() => {
                Err(DomainError::config(
                    "GraphLayer",
                    field,
                    format!(
                        "API キーの有効期限は正である必要があります（{} 秒）",
                        expires_after.num_seconds()
                    ),
                ))
            }
            Self::ApiKey { expires_after }
                if *expires_after > TimeDelta::days(API_KEY_MAX_EXPIRY_DAYS) =>
            {
                Err(DomainError::config(
                    "GraphLayer",
                    field,
                    format!(
                        "API キーの有効期限は {API_KEY_MAX_EXPIRY_DAYS} 日以内である必要があります（{} 日）",
                        expires_after.num_days()
                    ),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// 認可モードの組み合わせを検証する
///
/// グラフ層の作成前に事前検証として呼び出せる。
///
/// # エラー
///
/// 以下はすべて `DomainError::Config`:
/// - `ApiKey` の有効期限が正でない
/// - デフォルトと同じタグが追加モードに含まれる
/// - 追加モード同士でタグが重複する
pub fn validate_auth_modes(
    default_auth_mode: &AuthMode,
    additional_auth_modes: &[AuthMode],
) -> Result<(), DomainError> {
    default_auth_mode.validate("default_auth_mode")?;
    let default_tag = default_auth_mode.tag();
    let mut seen_tags = BTreeSet::new();
    for mode in additional_auth_modes {
        mode.validate("additional_auth_modes")?;
        if mode.tag() == default_tag {
            return Err(DomainError::config(
                "GraphLayer",
                "additional_auth_modes",
                format!("デフォルト認可モード {default_tag} を追加認可モードに含めることはできません"),
            ));
        }
        if !seen_tags.insert(mode.tag()) {
            return Err(DomainError::config(
                "GraphLayer",
                "additional_auth_modes",
                format!("追加認可モード {} が重複しています", mode.tag()),
            ));
        }
    }
    Ok(())
}

// =========================================================================
// DataSourceBinding
// =========================================================================

/// データソースバインド
///
/// スキーマで宣言された型とテーブルを結び付ける。テーブルのキー形状とスキーマの
/// 整合性は検証しない（デプロイ時の関心事）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSourceBinding {
    name:        String,
    store_ref:   StoreRef,
    bound_types: Vec<String>,
}

impl DataSourceBinding {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store_ref(&self) -> &StoreRef {
        &self.store_ref
    }

    pub fn bound_types(&self) -> &[String] {
        &self.bound_types
    }
}

// =========================================================================
// GraphLayer
// =========================================================================

/// グラフクエリ層の作成パラメータ
#[derive(Debug, Clone)]
pub struct GraphLayerSpec {
    pub name:                  String,
    pub schema_asset:          SchemaAssetPath,
    pub default_auth_mode:     AuthMode,
    pub additional_auth_modes: Vec<AuthMode>,
}

/// グラフクエリ層
///
/// # 不変条件
///
/// - デフォルト認可モードはちょうど 1 つ
/// - 追加認可モードにデフォルトと同じタグは含まれない
/// - 追加認可モード同士でタグは重複しない
/// - API キー値は `ApiKey` モードが有効な場合にのみ発行される
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLayer {
    logical_id:            String,
    name:                  String,
    schema_asset:          SchemaAssetPath,
    schema:                GraphSchema,
    default_auth_mode:     AuthMode,
    additional_auth_modes: Vec<AuthMode>,
    api_id:                String,
    graphql_url:           String,
    api_key:               Option<String>,
    data_sources:          Vec<DataSourceBinding>,
}

impl GraphLayer {
    /// グラフクエリ層を作成する
    ///
    /// # エラー
    ///
    /// - 名前が空、認可モードのタグが重複、API キーの有効期限が正でない: `DomainError::Config`
    /// - スキーマアセットが読めない・壊れている: `DomainError::Asset`
    /// - `logical_id` がスコープで既にビルド済み: `DomainError::Invariant`
    pub fn create(
        scope: &mut ProvisioningScope,
        logical_id: &str,
        spec: GraphLayerSpec,
        source: &dyn SchemaSource,
    ) -> Result<Self, DomainError> {
        let GraphLayerSpec {
            name,
            schema_asset,
            default_auth_mode,
            additional_auth_modes,
        } = spec;

        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::config(
                "GraphLayer",
                "name",
                "グラフ層の名前は必須です",
            ));
        }

        validate_auth_modes(&default_auth_mode, &additional_auth_modes)?;

        let text = source.load(&schema_asset)?;
        let schema = GraphSchema::parse(&schema_asset, &text)?;

        scope.register(logical_id)?;

        let api_id = scope.allocate_api_id();
        let graphql_url = format!(
            "https://{}.appsync-api.{}.amazonaws.com/graphql",
            api_id,
            scope.region()
        );
        let default_tag = default_auth_mode.tag();
        let issues_api_key = default_tag == AuthModeTag::ApiKey
            || additional_auth_modes
                .iter()
                .any(|m| m.tag() == AuthModeTag::ApiKey);
        let api_key = issues_api_key.then(|| scope.allocate_api_key());

        tracing::info!(
            logical_id,
            name = %name,
            default_auth = %default_tag,
            additional = additional_auth_modes.len(),
            types = schema.object_types().len(),
            "グラフクエリ層を作成しました"
        );

        Ok(Self {
            logical_id: logical_id.to_string(),
            name,
            schema_asset,
            schema,
            default_auth_mode,
            additional_auth_modes,
            api_id,
            graphql_url,
            api_key,
            data_sources: Vec::new(),
        })
    }

    /// データソースをバインドする
    ///
    /// # エラー
    ///
    /// 名前が空、または既存のデータソースと重複する場合は `DomainError::Config` を返す。
    pub fn bind_data_source(
        &mut self,
        name: &str,
        store_ref: StoreRef,
    ) -> Result<DataSourceBinding, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::config(
                "DataSourceBinding",
                "name",
                "データソース名は必須です",
            ));
        }

        if self.data_sources.iter().any(|ds| ds.name == name) {
            return Err(DomainError::config(
                "DataSourceBinding",
                "name",
                format!("データソース '{name}' は既にバインドされています"),
            ));
        }

        let binding = DataSourceBinding {
            name: name.to_string(),
            store_ref,
            bound_types: self.schema.bindable_types(),
        };

        tracing::info!(
            logical_id = %self.logical_id,
            data_source = name,
            store = %binding.store_ref,
            "データソースをバインドしました"
        );

        self.data_sources.push(binding.clone());
        Ok(binding)
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_asset(&self) -> &SchemaAssetPath {
        &self.schema_asset
    }

    pub fn schema(&self) -> &GraphSchema {
        &self.schema
    }

    pub fn default_auth_mode(&self) -> &AuthMode {
        &self.default_auth_mode
    }

    pub fn additional_auth_modes(&self) -> &[AuthMode] {
        &self.additional_auth_modes
    }

    pub fn api_id(&self) -> &str {
        &self.api_id
    }

    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// 発行済みの API キー値（`ApiKey` モードが無効なら `None`）
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn data_sources(&self) -> &[DataSourceBinding] {
        &self.data_sources
    }
}
