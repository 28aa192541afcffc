//! # 共通値オブジェクト
//!
//! ルーティング層と CORS ポリシーで共有される列挙型を定義する。
//!
//! | 型 | 用途 |
//! |---|------|
//! | [`HttpMethod`] | ルートが受け付けるメソッド |
//! | [`CorsMethod`] | CORS プリフライトで許可するメソッド |

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

/// ルートの HTTP メソッド
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Any,
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl std::str::FromStr for HttpMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ANY" => Ok(Self::Any),
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(DomainError::config(
                "RouteDefinition",
                "methods",
                format!("不正な HTTP メソッド: {s}"),
            )),
        }
    }
}

/// CORS で許可するメソッド
///
/// `Any` は `*` として出力される。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum CorsMethod {
    #[serde(rename = "*")]
    #[strum(serialize = "*")]
    Any,
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}
