use webserver::config::Config;
use webserver::WebServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let mut server = WebServer::from_config(&cfg);
    server.get("/", |ctx| ctx.res.write("Hello, world!"));
    server.get("/anthonys", |ctx| ctx.res.write("My name is anthony!"));

    tokio::select! {
        res = server.listen() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
