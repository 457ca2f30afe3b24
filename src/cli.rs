use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand, ValueEnum};

use latbench::{
    config::Config,
    error::Result,
    plot::{PlotOverrides, PlotSettings},
    process::CommandSpec,
    runner::{ClientOverrides, ClientSettings, RestartPolicy, ServerOverrides, ServerSettings},
};

#[derive(Parser, Debug, Clone)]
#[command(name = "latbench", about = "Client/server latency benchmark runner", version)]
pub struct Cli {
    /// Config file to read instead of <config dir>/latbench/latbenchrc.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the client binary repeatedly and record its execution times.
    Client(ClientArgs),
    /// Keep the server binary running, restarting it whenever it exits.
    Server(ServerArgs),
    /// Chart two execution time files against each other.
    Plot(PlotArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Number of rounds to run.
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub rounds: Option<u64>,

    /// Result file (overwritten).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Pause between rounds in milliseconds.
    #[arg(long = "round-delay-ms", value_name = "MS")]
    pub round_delay_ms: Option<u64>,

    /// Client command line, given after `--`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl ClientArgs {
    pub fn settings(&self, cfg: &Config) -> Result<ClientSettings> {
        cfg.client_settings_with(ClientOverrides {
            command: command_override(&self.command)?,
            rounds: self.rounds.map(|n| n as usize),
            output: self.output.clone(),
            round_delay: self.round_delay_ms.map(Duration::from_millis),
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Pause before each restart in milliseconds.
    #[arg(long = "restart-delay-ms", value_name = "MS")]
    pub restart_delay_ms: Option<u64>,

    /// Stop supervising when the server exits with status zero.
    #[arg(long = "stop-on-success")]
    pub stop_on_success: bool,

    /// Server command line, given after `--`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl ServerArgs {
    pub fn settings(&self, cfg: &Config) -> Result<ServerSettings> {
        cfg.server_settings_with(ServerOverrides {
            command: command_override(&self.command)?,
            restart_delay: self.restart_delay_ms.map(Duration::from_millis),
            restart_policy: self.stop_on_success.then_some(RestartPolicy::OnFailure),
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct PlotArgs {
    /// Results recorded without load.
    #[arg(long, value_name = "PATH")]
    pub baseline: Option<PathBuf>,

    /// Results recorded under load.
    #[arg(long, value_name = "PATH")]
    pub loaded: Option<PathBuf>,

    /// Print a statistics table instead of opening the charts.
    #[arg(long, conflicts_with = "json")]
    pub summary: bool,

    /// Print the statistics as JSON.
    #[arg(long)]
    pub json: bool,

    /// Show a single chart instead of both in sequence.
    #[arg(long, value_enum, value_name = "CHART")]
    pub only: Option<ChartChoice>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartChoice {
    Comparison,
    Statistics,
}

impl PlotArgs {
    pub fn settings(&self, cfg: &Config) -> Result<PlotSettings> {
        cfg.plot_settings_with(PlotOverrides {
            baseline: self.baseline.clone(),
            loaded: self.loaded.clone(),
        })
    }
}

fn command_override(argv: &[String]) -> Result<Option<CommandSpec>> {
    if argv.is_empty() {
        return Ok(None);
    }
    CommandSpec::from_argv(argv.to_vec()).map(Some)
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latbench::config::{CLIENT_COMMAND, CLIENT_ROUNDS, PLOT_BASELINE, SERVER_RESTART_DELAY_MS};

    fn parse(args: &[&str]) -> Cli {
        <Cli as Parser>::try_parse_from(args).unwrap()
    }

    #[test]
    fn client_flags_override_config() {
        let cli = parse(&["latbench", "client", "-n", "3", "--round-delay-ms", "0", "--", "sh", "-c", "echo hi"]);
        let Commands::Client(args) = cli.command else { panic!("expected client") };
        let settings = args.settings(&Config::from_pairs(Vec::<(String, String)>::new())).unwrap();
        assert_eq!(settings.rounds, 3);
        assert_eq!(settings.round_delay, Duration::ZERO);
        assert_eq!(settings.command.program, "sh");
        assert_eq!(settings.command.args, vec!["-c", "echo hi"]);
        assert_eq!(settings.output, PathBuf::from("execution_times.txt"));
    }

    #[test]
    fn client_flags_win_over_invalid_config_values() {
        let cfg = Config::from_pairs([(CLIENT_ROUNDS, "abc"), (CLIENT_COMMAND, "")]);
        let cli = parse(&["latbench", "client", "-n", "5", "--", "sh", "-c", "echo 'a b'"]);
        let Commands::Client(args) = cli.command else { panic!("expected client") };
        let settings = args.settings(&cfg).unwrap();
        assert_eq!(settings.rounds, 5);
        assert_eq!(settings.command.args, vec!["-c", "echo 'a b'"]);

        let cli = parse(&["latbench", "client", "-n", "5"]);
        let Commands::Client(args) = cli.command else { panic!("expected client") };
        assert!(args.settings(&cfg).is_err());
    }

    #[test]
    fn server_flags_win_over_invalid_config_values() {
        let cfg = Config::from_pairs([(SERVER_RESTART_DELAY_MS, "soon")]);
        let cli = parse(&["latbench", "server", "--restart-delay-ms", "10"]);
        let Commands::Server(args) = cli.command else { panic!("expected server") };
        let settings = args.settings(&cfg).unwrap();
        assert_eq!(settings.restart_delay, Duration::from_millis(10));
        assert_eq!(settings.restart_policy, RestartPolicy::Always);
    }

    #[test]
    fn plot_flags_replace_configured_paths() {
        let cfg = Config::from_pairs([(PLOT_BASELINE, "from_config.txt")]);
        let cli = parse(&["latbench", "plot", "--baseline", "a.txt"]);
        let Commands::Plot(args) = cli.command else { panic!("expected plot") };
        assert_eq!(args.settings(&cfg).unwrap().baseline, PathBuf::from("a.txt"));
    }

    #[test]
    fn zero_rounds_rejected_by_parser() {
        assert!(<Cli as Parser>::try_parse_from(["latbench", "client", "-n", "0"]).is_err());
    }

    #[test]
    fn server_stop_on_success_selects_on_failure_policy() {
        let cli = parse(&["latbench", "server", "--stop-on-success"]);
        let Commands::Server(args) = cli.command else { panic!("expected server") };
        let settings = args.settings(&Config::from_pairs(Vec::<(String, String)>::new())).unwrap();
        assert_eq!(settings.restart_policy, RestartPolicy::OnFailure);
        assert_eq!(settings.command.program, "./server");
    }

    #[test]
    fn only_selects_single_chart() {
        let cli = parse(&["latbench", "plot", "--only", "statistics", "--loaded", "b.txt"]);
        let Commands::Plot(args) = cli.command else { panic!("expected plot") };
        assert_eq!(args.only, Some(ChartChoice::Statistics));
        let settings = args.settings(&Config::from_pairs(Vec::<(String, String)>::new())).unwrap();
        assert_eq!(settings.loaded, PathBuf::from("b.txt"));
        assert_eq!(settings.baseline, PathBuf::from("execution_times_without_load.txt"));
    }

    #[test]
    fn summary_and_json_conflict() {
        assert!(<Cli as Parser>::try_parse_from(["latbench", "plot", "--summary", "--json"]).is_err());
    }
}
