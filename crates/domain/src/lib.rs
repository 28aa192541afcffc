//! # Content Hub ドメイン層
//!
//! API フロントドアの合成に使う不変な値と、それらを組み立てるビルダー関数を定義する。
//!
//! ## 設計方針
//!
//! - **単発ビルド**: 各コンポーネントは入力を受け取り、読み取り専用の値を返す
//! - **早期検出**: 名前の一意性（ルート、データソース名、出力キー）は登録時点で検査する
//! - **I/O の分離**: スキーマアセットの読み込みは [`schema::SchemaSource`] 越しに行い、
//!   ドメイン層自身はファイルシステムに触れない
//!
//! ## 依存関係の方向
//!
//! ```text
//! synth → infra → domain
//!    ↘             ↑
//!      ────────────┘
//! ```
//!
//! ## モジュール構成
//!
//! - [`authorizer`] - ベアラートークン認可のバインド
//! - [`route`] - CORS ポリシーとルーティング層
//! - [`graph`] - 認可モード、グラフクエリ層、データソースバインド
//! - [`schema`] - スキーマ定義ファイルの構造検証
//! - [`output`] - 出力レコードの公開
//! - [`scope`] - プロビジョニングスコープ（識別子の払い出しと二重ビルド検出）
//! - [`error`] - ドメイン層エラー
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use contenthub_domain::{
//!     authorizer,
//!     refs::{ClientRef, DirectoryRef},
//! };
//!
//! let binding = authorizer::bind(
//!     Some(DirectoryRef::new("user-pool")?),
//!     vec![ClientRef::new("web-client")?],
//! )?;
//! assert_eq!(binding.client_refs().len(), 1);
//!
//! // クライアントが空なら構成エラー
//! assert!(authorizer::bind(Some(DirectoryRef::new("user-pool")?), vec![]).is_err());
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod macros;

pub mod authorizer;
pub mod error;
pub mod graph;
pub mod output;
pub mod refs;
pub mod route;
pub mod schema;
pub mod scope;
pub mod value_objects;

pub use error::DomainError;
