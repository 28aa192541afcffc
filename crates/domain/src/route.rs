//! # ルーティング層
//!
//! CORS ポリシーとデフォルト認可を持つ HTTP 形式のリクエスト面。
//! コンピュートハンドラへ転送するルートを 0 回以上追加できる。
//!
//! ## ドメイン名の導出
//!
//! 外部から解決可能なドメインは、ルーティング層自身のエンドポイント URL を `/` で
//! 分割した 3 番目の要素（index 2）として導出する。URL が
//! `scheme:` / 空 / ホスト / ... の形であることを前提にしているため、
//! エンドポイント URL のテンプレートを変えてはならない。

use std::collections::BTreeSet;

use chrono::TimeDelta;
use serde::Serialize;

use crate::{
    DomainError,
    authorizer::AuthorizerBinding,
    refs::ComputeRef,
    scope::ProvisioningScope,
    value_objects::{CorsMethod, HttpMethod},
};

// =========================================================================
// CorsPolicy
// =========================================================================

/// CORS ポリシー（値オブジェクト）
///
/// # 不変条件
///
/// - `max_age` は正
/// - `allowed_methods` は 1 件以上
/// - `allowed_origins` の各要素は `*` または絶対 URL
/// - ヘッダー名は空でない
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorsPolicy {
    allowed_headers: BTreeSet<String>,
    allowed_methods: BTreeSet<CorsMethod>,
    allowed_origins: BTreeSet<String>,
    exposed_headers: BTreeSet<String>,
    #[serde(serialize_with = "serialize_seconds")]
    max_age:         TimeDelta,
}

fn serialize_seconds<S: serde::Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.num_seconds())
}

impl CorsPolicy {
    pub fn new<H, O, E>(
        allowed_headers: H,
        allowed_methods: impl IntoIterator<Item = CorsMethod>,
        allowed_origins: O,
        exposed_headers: E,
        max_age: TimeDelta,
    ) -> Result<Self, DomainError>
    where
        H: IntoIterator,
        H::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        let policy = Self {
            allowed_headers: allowed_headers.into_iter().map(Into::into).collect(),
            allowed_methods: allowed_methods.into_iter().collect(),
            allowed_origins: allowed_origins.into_iter().map(Into::into).collect(),
            exposed_headers: exposed_headers.into_iter().map(Into::into).collect(),
            max_age,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// 不変条件を検証する
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_age <= TimeDelta::zero() {
            return Err(DomainError::config(
                "CorsPolicy",
                "max_age",
                format!(
                    "max-age は正である必要があります（{} 秒）",
                    self.max_age.num_seconds()
                ),
            ));
        }

        if self.allowed_methods.is_empty() {
            return Err(DomainError::config(
                "CorsPolicy",
                "allowed_methods",
                "許可メソッドを 1 つ以上指定してください",
            ));
        }

        for origin in &self.allowed_origins {
            if origin != "*" && url::Url::parse(origin).is_err() {
                return Err(DomainError::config(
                    "CorsPolicy",
                    "allowed_origins",
                    format!("オリジン '{origin}' は * または絶対 URL である必要があります"),
                ));
            }
        }

        let blank_header = self
            .allowed_headers
            .iter()
            .chain(&self.exposed_headers)
            .any(|h| h.trim().is_empty());
        if blank_header {
            return Err(DomainError::config(
                "CorsPolicy",
                "allowed_headers",
                "空のヘッダー名は指定できません",
            ));
        }

        Ok(())
    }

    pub fn allowed_headers(&self) -> &BTreeSet<String> {
        &self.allowed_headers
    }

    pub fn allowed_methods(&self) -> &BTreeSet<CorsMethod> {
        &self.allowed_methods
    }

    pub fn allowed_origins(&self) -> &BTreeSet<String> {
        &self.allowed_origins
    }

    pub fn exposed_headers(&self) -> &BTreeSet<String> {
        &self.exposed_headers
    }

    pub fn max_age(&self) -> TimeDelta {
        self.max_age
    }
}

// =========================================================================
// RouteIntegration / RouteDefinition
// =========================================================================

/// ルートの転送先（名前付きのプロキシ統合）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteIntegration {
    name:   String,
    target: ComputeRef,
}

impl RouteIntegration {
    pub fn new(name: impl Into<String>, target: ComputeRef) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::config(
                "RouteIntegration",
                "name",
                "統合名は必須です",
            ));
        }
        Ok(Self { name, target })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &ComputeRef {
        &self.target
    }
}

/// ルート定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    path:        String,
    methods:     BTreeSet<HttpMethod>,
    integration: RouteIntegration,
}

impl RouteDefinition {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn methods(&self) -> &BTreeSet<HttpMethod> {
        &self.methods
    }

    pub fn integration(&self) -> &RouteIntegration {
        &self.integration
    }
}

// =========================================================================
// RouteLayer
// =========================================================================

/// ルーティング層
///
/// デフォルト認可はちょうど 1 つ。ルートは合成パスの中でのみ追加され、
/// 合成後は読み取り専用として扱う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteLayer {
    logical_id:           String,
    api_id:               String,
    endpoint_url:         String,
    cors_policy:          CorsPolicy,
    default_authorizer:   AuthorizerBinding,
    create_default_stage: bool,
    routes:               Vec<RouteDefinition>,
}

impl RouteLayer {
    /// ルーティング層を作成する
    ///
    /// # エラー
    ///
    /// - CORS ポリシーが不正: `DomainError::Config`
    /// - `logical_id` がスコープで既にビルド済み: `DomainError::Invariant`
    pub fn create(
        scope: &mut ProvisioningScope,
        logical_id: &str,
        cors_policy: CorsPolicy,
        default_authorizer: AuthorizerBinding,
    ) -> Result<Self, DomainError> {
        cors_policy.validate()?;
        scope.register(logical_id)?;

        let api_id = scope.allocate_api_id();
        let endpoint_url = format!(
            "https://{}.execute-api.{}.amazonaws.com/",
            api_id,
            scope.region()
        );

        tracing::info!(logical_id, %endpoint_url, "ルーティング層を作成しました");

        Ok(Self {
            logical_id: logical_id.to_string(),
            api_id,
            endpoint_url,
            cors_policy,
            default_authorizer,
            create_default_stage: true,
            routes: Vec::new(),
        })
    }

    /// ルートを追加する
    ///
    /// 失敗した場合、既存のルートは変更されない。
    ///
    /// # エラー
    ///
    /// - パスが `/` で始まらない、メソッドが空: `DomainError::Config`
    /// - (パス, メソッド) の組が既存ルートと重複: `DomainError::Config`
    pub fn add_route(
        &mut self,
        path: &str,
        methods: impl IntoIterator<Item = HttpMethod>,
        integration: RouteIntegration,
    ) -> Result<&RouteDefinition, DomainError> {
        if !path.starts_with('/') {
            return Err(DomainError::config(
                "RouteDefinition",
                "path",
                format!("パス '{path}' は / で始まる必要があります"),
            ));
        }

        let methods: BTreeSet<HttpMethod> = methods.into_iter().collect();
        if methods.is_empty() {
            return Err(DomainError::config(
                "RouteDefinition",
                "methods",
                format!("パス '{path}' にメソッドを 1 つ以上指定してください"),
            ));
        }

        let duplicate = self
            .routes
            .iter()
            .filter(|r| r.path == path)
            .flat_map(|r| r.methods.intersection(&methods))
            .next();
        if let Some(method) = duplicate {
            return Err(DomainError::config(
                "RouteLayer",
                "routes",
                format!("ルート {} {} は既に登録されています", method, path),
            ));
        }

        // 統合は名前で識別するので、同じ名前は同じ転送先を指す必要がある
        let conflicting = self.routes.iter().map(|r| &r.integration).find(|existing| {
            existing.name == integration.name && existing.target != integration.target
        });
        if let Some(existing) = conflicting {
            return Err(DomainError::config(
                "RouteIntegration",
                "name",
                format!(
                    "統合名 '{}' は既に別の転送先 '{}' に使われています",
                    existing.name,
                    existing.target.as_str()
                ),
            ));
        }

        tracing::info!(
            logical_id = %self.logical_id,
            path,
            integration = integration.name(),
            "ルートを追加しました"
        );

        self.routes.push(RouteDefinition {
            path: path.to_string(),
            methods,
            integration,
        });
        Ok(&self.routes[self.routes.len() - 1])
    }

    /// 外部から解決可能なドメイン名を返す
    ///
    /// # エラー
    ///
    /// ルートが 1 つも無い場合、または URL の形状が想定外の場合は
    /// `DomainError::Invariant` を返す。
    pub fn resolve_domain(&self) -> Result<String, DomainError> {
        if self.routes.is_empty() {
            return Err(DomainError::invariant(format!(
                "ルーティング層 '{}' にルートが無いためドメインを決定できません",
                self.logical_id
            )));
        }
        resolve_domain(&self.endpoint_url)
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn api_id(&self) -> &str {
        &self.api_id
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn cors_policy(&self) -> &CorsPolicy {
        &self.cors_policy
    }

    pub fn default_authorizer(&self) -> &AuthorizerBinding {
        &self.default_authorizer
    }

    pub fn create_default_stage(&self) -> bool {
        self.create_default_stage
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }
}

/// エンドポイント URL からホスト部分を取り出す
///
/// `/` で分割した index 2 の要素を返す純粋関数。
pub fn resolve_domain(endpoint_url: &str) -> Result<String, DomainError> {
    let segments: Vec<&str> = endpoint_url.split('/').collect();
    match segments.get(2) {
        Some(host) if !host.is_empty() => Ok((*host).to_string()),
        Some(_) => Err(DomainError::invariant(format!(
            "エンドポイント URL '{}' のホスト部分が空です",
            endpoint_url
        ))),
        None => Err(DomainError::invariant(format!(
            "エンドポイント URL '{}' は / 区切りで 3 要素以上必要です（{} 要素）",
            endpoint_url,
            segments.len()
        ))),
    }
}
