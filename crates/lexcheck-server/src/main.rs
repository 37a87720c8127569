use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use lexcheck_core::{config::Config, db::Db, engine::Engine};
use lexcheck_server::{router, AppState};
use lexcheck_sources::{seed, StaticCaseLawCorpus, StaticChargeRegistry, StaticRuleTable};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lexcheck_server=info,lexcheck_core=info,tower_http=debug".into()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    std::fs::create_dir_all(&config.data_dir)?;
    let db_path = format!("{}/lexcheck.db", config.data_dir);
    let db = Db::open(&db_path)?;
    db.migrate()?;
    let db = Arc::new(db);

    // Collaborators: file-backed when configured, bundled seed set otherwise.
    let rules: Arc<StaticRuleTable> = if config.rules_path.is_empty() {
        Arc::new(seed::rule_table())
    } else {
        Arc::new(StaticRuleTable::from_path(&config.rules_path)?)
    };
    let charges: Arc<StaticChargeRegistry> = if config.charges_path.is_empty() {
        Arc::new(seed::charge_registry())
    } else {
        Arc::new(StaticChargeRegistry::from_path(&config.charges_path)?)
    };
    let corpus: Arc<StaticCaseLawCorpus> = if config.caselaw_path.is_empty() {
        Arc::new(seed::caselaw_corpus())
    } else {
        Arc::new(StaticCaseLawCorpus::from_path(&config.caselaw_path)?)
    };
    info!(
        "loaded collaborators: {} precedent cases, ranking policy {}",
        corpus.len(),
        config.ranking.version
    );

    let engine = Arc::new(Engine::new(
        rules,
        charges,
        corpus,
        Arc::clone(&db),
        Arc::clone(&config),
    ));
    let state = Arc::new(AppState::new(engine, Arc::clone(&config)));

    let app = router(state);

    let addr = format!("{}:{}", config.web_bind, config.web_port);
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
