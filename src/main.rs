// ==========================================
// 仓库托盘分配跟踪系统 - 主入口
// ==========================================
// 协议: 标准输入每行一个 JSON 命令，标准输出每行一个 JSON 响应
// ==========================================

use std::sync::Arc;

use pallet_tracker::app::{dispatch, get_default_db_path, AppState};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统（输出到 stderr，stdout 仅用于响应）
    pallet_tracker::logging::init();
    let locale = pallet_tracker::i18n::init_from_env();

    tracing::info!("==================================================");
    tracing::info!("{}", pallet_tracker::APP_NAME);
    tracing::info!("系统版本: {}", pallet_tracker::VERSION);
    tracing::info!("语言: {}", locale);
    tracing::info!("==================================================");

    // 获取数据库路径（可用第一个参数覆盖）
    let db_path = std::env::args()
        .nth(1)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let state = Arc::new(AppState::new(db_path).map_err(anyhow::Error::msg)?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        // SQLite 调用为阻塞操作，放到 blocking 线程池
        let state = state.clone();
        let response = tokio::task::spawn_blocking(move || dispatch(&state, &line)).await?;

        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    tracing::info!("输入结束，退出");
    Ok(())
}
