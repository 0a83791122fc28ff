// ==========================================
// 家具订单报价系统 - 命令行入口
// ==========================================
// 用法:
//   furniture-quote                 列出报价单
//   furniture-quote <quotation-id>  打开核算会话并输出汇总视图 (JSON)
// ==========================================

use anyhow::Context;
use furniture_quote::app::{get_default_db_path, AppState};
use furniture_quote::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("{} v{}", furniture_quote::APP_NAME, furniture_quote::VERSION);

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    let output = match std::env::args().nth(1) {
        Some(id) => {
            let session = state
                .quotation_api
                .open_session(&id)
                .await
                .with_context(|| format!("无法打开报价单 {}", id))?;
            serde_json::to_string_pretty(&session.view())?
        }
        None => {
            let quotations = state.quotation_api.list_quotations().await?;
            serde_json::to_string_pretty(&quotations)?
        }
    };

    println!("{}", output);
    Ok(())
}
