mod cli;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use std::io;

use cli::{ChartChoice, Cli, Commands};
use latbench::{
    config::Config,
    plot::{self, summary_markdown},
    printer::{print_status, MarkdownPrinter, Outcome},
    runner::{run_client, run_server_forever},
    shutdown::Shutdown,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the chart screen and printed tables stay clean.
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let args = Cli::parse();
    let cfg = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("cannot load config file {}", path.display()))?,
        None => Config::load(),
    };

    match args.command {
        Commands::Client(client_args) => {
            let settings = client_args.settings(&cfg).context("invalid client configuration")?;
            let shutdown = Shutdown::on_ctrl_c();
            let report = run_client(&settings, &shutdown).await.with_context(|| {
                format!("failed to write {}", settings.output.display())
            })?;
            let outcome = if report.interrupted || report.successes() < report.attempts {
                Outcome::Partial
            } else {
                Outcome::Complete
            };
            print_status(
                outcome,
                &format!(
                    "{} of {} rounds recorded in {}",
                    report.successes(),
                    report.attempts,
                    settings.output.display()
                ),
            );
            Ok(())
        }
        Commands::Server(server_args) => {
            let settings = server_args.settings(&cfg).context("invalid server configuration")?;
            let shutdown = Shutdown::on_ctrl_c();
            run_server_forever(&settings, &shutdown).await;
            Ok(())
        }
        Commands::Plot(plot_args) => {
            let settings = plot_args.settings(&cfg).context("invalid plot configuration")?;
            let (baseline, loaded) = plot::load_series(&settings).context("cannot read execution times")?;

            if plot_args.json || plot_args.summary || !io::stdout().is_terminal() {
                let summaries = vec![baseline.summary()?, loaded.summary()?];
                if plot_args.json {
                    println!("{}", serde_json::to_string_pretty(&summaries)?);
                } else {
                    MarkdownPrinter::default().print(&summary_markdown(&summaries));
                }
                return Ok(());
            }

            let only = plot_args.only;
            tokio::task::spawn_blocking(move || match only {
                Some(ChartChoice::Comparison) => plot::plot_comparison(&baseline, &loaded),
                Some(ChartChoice::Statistics) => plot::plot_statistics(&baseline, &loaded),
                None => plot::plot_all(baseline, loaded),
            })
            .await
            .context("chart viewer panicked")??;
            Ok(())
        }
    }
}
