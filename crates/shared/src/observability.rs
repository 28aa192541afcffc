//! # Observability 基盤
//!
//! トレーシング初期化とログ出力形式の設定を提供する。
//! 合成コマンドの標準出力は結果の表示に使うため、ログはすべて stderr に出す。
//!
//! 環境変数 `LOG_FORMAT` で JSON / Pretty / Compact を切り替える。

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "info,contenthub=debug";

/// ログ出力形式
///
/// 値が未設定または不正な場合は [`Pretty`](LogFormat::Pretty) にフォールバックする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON 形式（CI やログ収集向け）
    Json,
    /// 人間が読みやすい複数行形式
    #[default]
    Pretty,
    /// 1 行 1 イベントの簡潔な形式
    Compact,
}

impl LogFormat {
    /// 文字列からログ形式をパースする（大文字小文字は区別しない）
    ///
    /// 不正な値の場合は [`Pretty`](LogFormat::Pretty) にフォールバックし、
    /// stderr に警告を出力する。subscriber 初期化前に呼ばれるため `tracing` は使えない。
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            other => {
                eprintln!("WARNING: unknown LOG_FORMAT={other:?}, falling back to pretty");
                Self::Pretty
            }
        }
    }

    /// 環境変数 `LOG_FORMAT` から読み取る
    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT")
            .map(|val| Self::parse(&val))
            .unwrap_or_default()
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// コマンド名（ルートスパンの `command` フィールドに出力）
    pub command_name:   String,
    /// ログ出力形式
    pub log_format:     LogFormat,
    /// `RUST_LOG` 未設定時に使うフィルタ
    pub default_filter: String,
}

impl TracingConfig {
    pub fn new(command_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            command_name: command_name.into(),
            log_format,
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }

    /// 環境変数 `LOG_FORMAT` から設定を読み取る
    pub fn from_env(command_name: impl Into<String>) -> Self {
        Self::new(command_name, LogFormat::from_env())
    }

    /// 既定フィルタを差し替える
    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }
}

/// トレーシングを初期化する
///
/// `RUST_LOG` 環境変数でログレベルを制御可能。未設定なら
/// [`TracingConfig::default_filter`] を使う。
///
/// `tracing_error::ErrorLayer` も登録するため、インフラ層エラーの
/// `SpanTrace` に呼び出し経路が記録される。
///
/// 既にグローバル subscriber が設定済みの場合はエラーを返す。
#[cfg(feature = "observability")]
pub fn init_tracing(
    config: &TracingConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.default_filter));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .try_init()?;

    tracing::debug!(command = %config.command_name, format = ?config.log_format, "トレーシングを初期化しました");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    // ===== LogFormat::parse テスト =====

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("JSON", LogFormat::Json)]
    #[case(" pretty ", LogFormat::Pretty)]
    #[case("compact", LogFormat::Compact)]
    fn test_parse_既知の値を解釈する(#[case] input: &str, #[case] expected: LogFormat) {
        assert_eq!(LogFormat::parse(input), expected);
    }

    #[rstest]
    #[case("unknown")]
    #[case("")]
    fn test_parse_不正な値でprettyにフォールバックする(#[case] input: &str) {
        assert_eq!(LogFormat::parse(input), LogFormat::Pretty);
    }

    // ===== TracingConfig テスト =====

    #[test]
    fn test_newで既定フィルタが設定される() {
        let config = TracingConfig::new("contenthub-synth", LogFormat::Json);

        assert_eq!(config.command_name, "contenthub-synth");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.default_filter, "info,contenthub=debug");
    }

    #[test]
    fn test_with_default_filterでフィルタを差し替えられる() {
        let config = TracingConfig::new("synth", LogFormat::Compact).with_default_filter("warn");

        assert_eq!(config.default_filter, "warn");
    }
}
