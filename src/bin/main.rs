use anyhow::{anyhow, Context, Result};
use clap::Parser;
use market_dashboard::config::{self, LogConfig};
use market_dashboard::dashboard::{Dashboard, GroupSnapshot, Inspection};
use market_dashboard::data_provider::YahooChartProvider;
use market_dashboard::domain_types::{InstrumentCatalog, Lookback};
use market_dashboard::utils::format::format_price;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// 全球市場行情儀表板
#[derive(Debug, Parser)]
#[command(name = "market_dashboard", version, about)]
struct Cli {
    /// 只刷新一次後結束
    #[arg(long)]
    once: bool,

    /// 顯示單一商品的分析（成交量分布、VWAP、斐波那契水位）
    #[arg(long, value_name = "SYMBOL")]
    inspect: Option<String>,

    /// 分析的回看期間：7d、30d、90d、180d
    #[arg(long, default_value = "30d")]
    lookback: Lookback,

    /// 自訂商品目錄（TOML），預設使用內建目錄
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化配置
    let app_config = config::init_config()?;

    // 初始化日誌系統，guard 需存活到程式結束
    let _log_guard = init_logging(&app_config.log)?;

    let catalog = match &cli.catalog {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("無法讀取商品目錄 {}", path.display()))?;
            InstrumentCatalog::from_toml_str(&content)?
        }
        None => InstrumentCatalog::builtin()?,
    };
    info!("載入 {} 個商品，共 {} 組", catalog.len(), catalog.groups().len());

    let provider = Arc::new(YahooChartProvider::new(&app_config.provider)?);
    let dashboard = Dashboard::new(provider, Arc::new(catalog), app_config);

    if let Some(symbol) = &cli.inspect {
        let inspection = dashboard.inspect(symbol, cli.lookback).await;
        print_inspection(&inspection);
        return Ok(());
    }

    let refresh_interval = app_config.dashboard.refresh_interval();
    loop {
        let groups = dashboard.snapshot().await;
        print_snapshot(&groups);

        if cli.once {
            break;
        }

        // 等待下一次刷新或關閉信號
        tokio::select! {
            _ = tokio::time::sleep(refresh_interval) => {}
            result = signal::ctrl_c() => {
                result.map_err(|e| anyhow!("無法監聽關閉信號: {}", e))?;
                info!("接收到關閉信號，正在退出...");
                break;
            }
        }
    }

    Ok(())
}

// 初始化日誌系統
fn init_logging(log_config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let level = match log_config.level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info", // 默認為INFO
    };

    // RUST_LOG 優先於配置檔
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (writer, guard) = match &log_config.file {
        Some(file) => {
            let path = Path::new(file);
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("無效的日誌檔路徑: {}", file))?;

            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer);

    let result = if log_config.format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.map_err(|e| anyhow!("設置日誌系統失敗: {}", e))?;

    info!("日誌系統初始化完成");
    Ok(guard)
}

fn print_snapshot(groups: &[GroupSnapshot]) {
    for group in groups {
        println!("\n== {} ==", group.title);
        println!("{:<26} {:<12} {:>16} {:>10}", "Instrument", "Symbol", "Last", "Change");
        for instrument in &group.instruments {
            println!(
                "{:<26} {:<12} {:>16} {:>10}",
                instrument.label,
                instrument.symbol,
                instrument.metric.display_value(),
                instrument
                    .metric
                    .change_display()
                    .unwrap_or_else(|| instrument.metric.display_value()),
            );
        }
    }
}

fn print_inspection(inspection: &Inspection) {
    println!(
        "{} ({}) - {} @ {}",
        inspection.label, inspection.symbol, inspection.period, inspection.interval
    );
    if let Some(reason) = &inspection.failure {
        println!("fetch failed: {}", reason);
    }
    println!("rows: {}", inspection.series.len());
    println!(
        "last: {}  change: {}",
        inspection.metric.display_value(),
        inspection
            .metric
            .change_display()
            .unwrap_or_else(|| inspection.metric.display_value())
    );

    match inspection.latest_vwap() {
        Some(value) => println!("vwap: {}", format_price(value)),
        None => println!("vwap: N/A"),
    }

    match &inspection.fibonacci {
        Some(levels) => {
            println!("fibonacci retracements:");
            for level in levels {
                println!("  {:>6.1}%  {:>14}", level.ratio * 100.0, format_price(level.price));
            }
        }
        None => println!("fibonacci retracements: N/A"),
    }

    match &inspection.profile {
        Some(profile) => {
            println!(
                "volume profile: {} bins, {} .. {}",
                profile.bins.len(),
                format_price(profile.min_price),
                format_price(profile.max_price)
            );
            if let Some(poc) = profile.point_of_control() {
                println!(
                    "  point of control: {} (volume {})",
                    format_price(poc.mid()),
                    format_price(poc.volume)
                );
            }
        }
        None => println!("volume profile: N/A"),
    }
}
