//! tracing 기반 로깅 초기화.
//!
//! 설정 파일의 `[logging]` 섹션으로 형식과 필터를 정합니다.
//! 비밀번호와 토큰 원문은 어떤 레벨에서도 기록하지 않습니다.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 로컬 개발용
    #[default]
    Pretty,
    /// 로그 수집기 연동용
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

/// 해석된 로깅 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// 필터 지시자 (예: "info", "auth_core=debug,tower_http=info")
    pub level: String,
    pub format: LogFormat,
    pub span_events: bool,
}

impl LogConfig {
    /// `[logging]` 섹션에서 생성. 알 수 없는 형식은 pretty로 대체됩니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format.parse().unwrap_or_default(),
            span_events: settings.span_events,
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// 전역 subscriber를 설치합니다.
///
/// `RUST_LOG`가 설정되어 있으면 `config.level`보다 우선합니다.
/// 이미 subscriber가 설치된 경우 에러를 반환합니다.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;
    let span_events = config.span_events();

    let output = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().with_span_events(span_events).boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_events(span_events)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_span_events(span_events).boxed(),
    };

    tracing_subscriber::registry()
        .with(output)
        .with(env_filter)
        .try_init()?;

    tracing::info!(format = ?config.format, level = %config.level, "Logging initialized");

    Ok(())
}
