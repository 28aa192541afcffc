//! # Content Hub インフラ層
//!
//! ファイルシステムとの入出力を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートはドメイン層で定義されたインターフェース（[`SchemaSource`]）の
//! 具体的な実装を提供する。ファイルの所在や書き込み形式をカプセル化し、
//! ドメイン層を入出力の詳細から保護する。
//!
//! ## 依存関係
//!
//! ```text
//! synth → infra → domain
//!    ↘              ↑
//!      ─────────────
//! ```
//!
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。
//!
//! ## モジュール構成
//!
//! - [`error`] - インフラ層エラー定義
//! - [`schema_asset`] - スキーマアセットのファイル読み込み
//! - [`template`] - 合成済みテンプレートの書き出し
//!
//! [`SchemaSource`]: contenthub_domain::schema::SchemaSource

pub mod error;
pub mod schema_asset;
pub mod template;

pub use error::InfraError;
pub use schema_asset::FsSchemaSource;
