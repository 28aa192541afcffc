//! # Content Hub API 合成
//!
//! 共有テーブルの前段に置く 2 面構成の API（ルーティング層とグラフクエリ層）を
//! プロビジョニング時に組み立て、テンプレートとして書き出す。
//!
//! リクエスト時のルーティングや認可の評価は行わない。
//!
//! ## モジュール構成
//!
//! - [`config`] - 環境変数からの設定読み込み
//! - [`construct`] - 合成パス本体
//! - [`template`] - CloudFormation 形式への描画
//! - [`error`] - エラー定義

pub mod config;
pub mod construct;
pub mod error;
pub mod template;

pub use construct::{ApiConstruct, ApiConstructProps};
pub use error::SynthError;
pub use template::Template;
