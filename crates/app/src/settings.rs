use folio_core::config::{AppConfig, LogConfig};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// 环境变量前缀，例如 `FOLIO__LEDGER__BACKEND=json`
const ENV_PREFIX: &str = "FOLIO";

/// # Summary
/// 分层加载应用配置。
///
/// # Logic
/// 1. 未出现的字段取 `AppConfig::default()` 中的值。
/// 2. 指定了 `path` 时该文件必须存在；否则尝试读取当前目录下可选的 `folio.toml`。
/// 3. `FOLIO__` 前缀的环境变量最后覆盖，层级用 `__` 分隔。
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name("folio").required(false),
    };

    config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// 初始化全局日志。日志统一写到 stderr，stdout 只留给 JSON 结果。
///
/// # Logic
/// 1. `RUST_LOG` 优先，其次使用配置中的 `log.level`。
/// 2. 配置了 `log.file_dir` 时额外挂一层按天滚动的文件输出。
///
/// # Returns
/// 文件输出的 `WorkerGuard`，必须在 `main` 结束前一直持有，否则缓冲日志会丢失。
pub fn init_tracing(log: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log.level))?;
    let stderr = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match &log.file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "folio.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .try_init()?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::config::LedgerBackend;

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(
            &path,
            "[ledger]\nbackend = \"sqlite\"\npath = \"ledger.db\"\n\n[analytics]\nranking_limit = 3\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.ledger.backend, LedgerBackend::Sqlite);
        assert_eq!(config.ledger.path, "ledger.db");
        assert_eq!(config.analytics.ranking_limit, 3);
        assert!(!config.analytics.strict_ordering);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_defaults_read_json_ledger() {
        let config = load_config(None).unwrap();
        assert_eq!(config.ledger.backend, LedgerBackend::Json);
        assert_eq!(config.ledger.path, "data/ledger.json");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
