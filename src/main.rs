use sheen_viewer::{app::ViewerApp, config::AppConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    ViewerApp::new(config)?.run()?;
    Ok(())
}
