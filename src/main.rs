use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use beckn_orchestrator::{app::Application, shutdown::ShutdownManager};
use clap::{Arg, Command};
use orchestrator_core::AppConfig;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("orchestrator")
        .version(env!("CARGO_PKG_VERSION"))
        .about("自然语言驱动的 Beckn 商务协议编排服务")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径，缺省时搜索 config/orchestrator.toml 等默认位置"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，覆盖配置文件")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式，覆盖配置文件")
                .value_parser(["json", "pretty"]),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);

    let mut config = AppConfig::load(config_path)
        .with_context(|| format!("加载配置失败: {}", config_path.unwrap_or("<默认路径>")))?;

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.observability.log_format = format.clone();
    }

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    )?;

    info!("启动 Beckn 编排服务");
    if let Some(path) = config_path {
        info!("配置文件: {path}");
    }

    let app = Arc::new(Application::new(config).await?);
    let shutdown_manager = ShutdownManager::new();

    let app_handle = {
        let app = Arc::clone(&app);
        let shutdown_rx = shutdown_manager.subscribe();
        let shutdown_manager = shutdown_manager.clone();

        tokio::spawn(async move {
            if let Err(e) = app.run(shutdown_rx).await {
                error!("应用运行失败: {e:#}");
                shutdown_manager.shutdown();
            }
        })
    };

    tokio::select! {
        _ = wait_for_shutdown_signal() => {
            info!("收到关闭信号，开始优雅关闭...");
        }
        _ = shutdown_manager.wait_for_shutdown() => {}
    }

    shutdown_manager.shutdown();

    match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
        Ok(Ok(())) => info!("应用已优雅关闭"),
        Ok(Err(e)) => error!("应用关闭时发生错误: {e}"),
        Err(_) => warn!("应用关闭超时，强制退出"),
    }

    info!("Beckn 编排服务已退出");
    Ok(())
}

/// 初始化日志系统
fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
        _ => {
            return Err(anyhow::anyhow!("不支持的日志格式: {log_format}"));
        }
    }

    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
