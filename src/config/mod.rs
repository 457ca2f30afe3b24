use std::{
    collections::HashMap,
    env,
    fmt::Display,
    fs,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use directories::BaseDirs;

use crate::{
    error::{Error, Result},
    plot::{PlotOverrides, PlotSettings},
    process::CommandSpec,
    runner::{
        client::{ClientOverrides, ClientSettings},
        server::{RestartPolicy, ServerOverrides, ServerSettings},
    },
};

/// Environment variables with this prefix override file values,
/// e.g. `LATBENCH_CLIENT_ROUNDS=50`.
pub const ENV_PREFIX: &str = "LATBENCH_";

pub const CLIENT_COMMAND: &str = "CLIENT_COMMAND";
pub const CLIENT_ROUNDS: &str = "CLIENT_ROUNDS";
pub const CLIENT_OUTPUT: &str = "CLIENT_OUTPUT";
pub const CLIENT_ROUND_DELAY_MS: &str = "CLIENT_ROUND_DELAY_MS";
pub const SERVER_COMMAND: &str = "SERVER_COMMAND";
pub const SERVER_RESTART_DELAY_MS: &str = "SERVER_RESTART_DELAY_MS";
pub const SERVER_RESTART_POLICY: &str = "SERVER_RESTART_POLICY";
pub const PLOT_BASELINE: &str = "PLOT_BASELINE";
pub const PLOT_LOADED: &str = "PLOT_LOADED";

const KEYS: &[&str] = &[
    CLIENT_COMMAND,
    CLIENT_ROUNDS,
    CLIENT_OUTPUT,
    CLIENT_ROUND_DELAY_MS,
    SERVER_COMMAND,
    SERVER_RESTART_DELAY_MS,
    SERVER_RESTART_POLICY,
    PLOT_BASELINE,
    PLOT_LOADED,
];

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    /// Defaults, then the default rc file if present, then `LATBENCH_*`
    /// environment variables. A missing default file is not an error.
    pub fn load() -> Self {
        let config_path = default_config_path();
        let mut map = default_map();

        if config_path.exists() {
            if let Err(e) = read_rc_file(&mut map, &config_path) {
                tracing::warn!(path = %config_path.display(), error = %e, "cannot read config file, using defaults");
            }
        }
        overlay_env(&mut map, env::vars());

        Self {
            inner: map,
            config_path,
        }
    }

    /// Like [`Config::load`], but the rc file at `config_path` was named by
    /// the user and must be readable.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        Self::load_from_vars(config_path, env::vars())
    }

    fn load_from_vars<I>(config_path: &Path, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = default_map();
        read_rc_file(&mut map, config_path).map_err(|source| Error::ConfigFile {
            path: config_path.to_path_buf(),
            source,
        })?;
        overlay_env(&mut map, vars);

        Ok(Self {
            inner: map,
            config_path: config_path.to_path_buf(),
        })
    }

    /// Defaults overlaid with the given pairs; neither file nor environment
    /// is consulted.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut inner = default_map();
        inner.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self {
            inner,
            config_path: PathBuf::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get(key).ok_or_else(|| Error::InvalidConfig {
            key: key.to_string(),
            value: String::new(),
            reason: "missing".into(),
        })
    }

    fn get_parsed<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.require(key)?;
        raw.trim().parse::<T>().map_err(|e| Error::InvalidConfig {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
    }

    fn get_millis(&self, key: &str) -> Result<Duration> {
        self.get_parsed::<u64>(key).map(Duration::from_millis)
    }

    fn get_rounds(&self) -> Result<usize> {
        let rounds = self.get_parsed::<usize>(CLIENT_ROUNDS)?;
        if rounds == 0 {
            return Err(Error::InvalidConfig {
                key: CLIENT_ROUNDS.into(),
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(rounds)
    }

    fn get_command(&self, key: &str) -> Result<CommandSpec> {
        CommandSpec::parse(&self.require(key)?)
    }

    fn get_pathbuf(&self, key: &str) -> Result<PathBuf> {
        self.require(key).map(PathBuf::from)
    }

    pub fn client_settings(&self) -> Result<ClientSettings> {
        self.client_settings_with(ClientOverrides::default())
    }

    /// Overridden fields are taken as given; only the remaining config
    /// values are read and validated.
    pub fn client_settings_with(&self, over: ClientOverrides) -> Result<ClientSettings> {
        Ok(ClientSettings {
            command: resolve(over.command, || self.get_command(CLIENT_COMMAND))?,
            rounds: resolve(over.rounds, || self.get_rounds())?,
            output: resolve(over.output, || self.get_pathbuf(CLIENT_OUTPUT))?,
            round_delay: resolve(over.round_delay, || self.get_millis(CLIENT_ROUND_DELAY_MS))?,
        })
    }

    pub fn server_settings(&self) -> Result<ServerSettings> {
        self.server_settings_with(ServerOverrides::default())
    }

    pub fn server_settings_with(&self, over: ServerOverrides) -> Result<ServerSettings> {
        Ok(ServerSettings {
            command: resolve(over.command, || self.get_command(SERVER_COMMAND))?,
            restart_delay: resolve(over.restart_delay, || self.get_millis(SERVER_RESTART_DELAY_MS))?,
            restart_policy: resolve(over.restart_policy, || {
                self.get_parsed::<RestartPolicy>(SERVER_RESTART_POLICY)
            })?,
        })
    }

    pub fn plot_settings(&self) -> Result<PlotSettings> {
        self.plot_settings_with(PlotOverrides::default())
    }

    pub fn plot_settings_with(&self, over: PlotOverrides) -> Result<PlotSettings> {
        Ok(PlotSettings {
            baseline: resolve(over.baseline, || self.get_pathbuf(PLOT_BASELINE))?,
            loaded: resolve(over.loaded, || self.get_pathbuf(PLOT_LOADED))?,
        })
    }
}

fn resolve<T>(over: Option<T>, from_config: impl FnOnce() -> Result<T>) -> Result<T> {
    match over {
        Some(value) => Ok(value),
        None => from_config(),
    }
}

/// Apply `key=value` lines from `path`. Lines that are not valid UTF-8 are
/// skipped with a warning.
fn read_rc_file(map: &mut HashMap<String, String>, path: &Path) -> io::Result<()> {
    let reader = BufReader::new(fs::File::open(path)?);
    for (idx, raw) in reader.split(b'\n').enumerate() {
        let raw = raw?;
        match String::from_utf8(raw) {
            Ok(line) => {
                if let Some((k, v)) = parse_rc_line(&line) {
                    map.insert(k, v);
                }
            }
            Err(_) => {
                tracing::warn!(path = %path.display(), line = idx + 1, "skipping config line that is not valid UTF-8");
            }
        }
    }
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(())
}

/// Copy known `LATBENCH_*` variables over file and default values.
fn overlay_env<I>(map: &mut HashMap<String, String>, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (k, v) in vars {
        if let Some(key) = k.strip_prefix(ENV_PREFIX) {
            if KEYS.contains(&key) {
                map.insert(key.to_string(), v);
            }
        }
    }
}

fn parse_rc_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    line.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
}

pub fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("latbench").join("latbenchrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    // Client
    m.insert(
        CLIENT_COMMAND.into(),
        "./client -d 23458 -s 1004857600 -p 12345 -i 192.168.9.2 -r 192.168.3.2".into(),
    );
    m.insert(CLIENT_ROUNDS.into(), "20".into());
    m.insert(CLIENT_OUTPUT.into(), "execution_times.txt".into());
    m.insert(CLIENT_ROUND_DELAY_MS.into(), "1000".into());

    // Server
    m.insert(
        SERVER_COMMAND.into(),
        "./server -p 23458 -s 1004857600 -i 192.168.3.2".into(),
    );
    m.insert(SERVER_RESTART_DELAY_MS.into(), "2000".into());
    m.insert(SERVER_RESTART_POLICY.into(), "always".into());

    // Plot
    m.insert(PLOT_BASELINE.into(), "execution_times_without_load.txt".into());
    m.insert(PLOT_LOADED.into(), "execution_times.txt".into());

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_entry_points() {
        let cfg = Config::from_pairs(Vec::<(String, String)>::new());
        let client = cfg.client_settings().unwrap();
        assert_eq!(client.command.program, "./client");
        assert_eq!(client.command.args.len(), 10);
        assert_eq!(client.rounds, 20);
        assert_eq!(client.output, PathBuf::from("execution_times.txt"));
        assert_eq!(client.round_delay, Duration::from_secs(1));

        let server = cfg.server_settings().unwrap();
        assert_eq!(server.command.to_string(), "./server -p 23458 -s 1004857600 -i 192.168.3.2");
        assert_eq!(server.restart_delay, Duration::from_secs(2));
        assert_eq!(server.restart_policy, RestartPolicy::Always);

        let plot = cfg.plot_settings().unwrap();
        assert_eq!(plot.baseline, PathBuf::from("execution_times_without_load.txt"));
        assert_eq!(plot.loaded, PathBuf::from("execution_times.txt"));
    }

    #[test]
    fn rc_lines_skip_comments_and_blanks() {
        assert_eq!(parse_rc_line("# CLIENT_ROUNDS=3"), None);
        assert_eq!(parse_rc_line("   "), None);
        assert_eq!(
            parse_rc_line(" CLIENT_ROUNDS = 3 "),
            Some(("CLIENT_ROUNDS".into(), "3".into()))
        );
    }

    fn no_vars() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latbenchrc");
        fs::write(&path, "# test\nCLIENT_ROUNDS=5\nSERVER_RESTART_POLICY=on-failure\n").unwrap();
        let cfg = Config::load_from_vars(&path, no_vars()).unwrap();
        assert_eq!(cfg.client_settings().unwrap().rounds, 5);
        assert_eq!(
            cfg.server_settings().unwrap().restart_policy,
            RestartPolicy::OnFailure
        );
    }

    #[test]
    fn env_wins_over_file_and_ignores_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latbenchrc");
        fs::write(&path, "CLIENT_ROUNDS=5\nCLIENT_OUTPUT=from_file.txt\n").unwrap();
        let vars = vec![
            ("LATBENCH_CLIENT_ROUNDS".to_string(), "7".to_string()),
            ("LATBENCH_UNKNOWN".to_string(), "x".to_string()),
            ("CLIENT_OUTPUT".to_string(), "unprefixed.txt".to_string()),
        ];
        let cfg = Config::load_from_vars(&path, vars).unwrap();
        let client = cfg.client_settings().unwrap();
        assert_eq!(client.rounds, 7);
        assert_eq!(client.output, PathBuf::from("from_file.txt"));
        assert_eq!(cfg.get("UNKNOWN"), None);
    }

    #[test]
    fn named_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.rc");
        match Config::load_from_vars(&path, no_vars()) {
            Err(Error::ConfigFile { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn non_utf8_line_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latbenchrc");
        fs::write(&path, b"CLIENT_ROUNDS=5\n\xff\xfe=bad\nCLIENT_OUTPUT=after.txt\n").unwrap();
        let client = Config::load_from_vars(&path, no_vars())
            .unwrap()
            .client_settings()
            .unwrap();
        assert_eq!(client.rounds, 5);
        assert_eq!(client.output, PathBuf::from("after.txt"));
    }

    #[test]
    fn overrides_skip_invalid_config_values() {
        let cfg = Config::from_pairs([
            (CLIENT_ROUNDS, "abc"),
            (CLIENT_COMMAND, ""),
            (SERVER_RESTART_DELAY_MS, "soon"),
        ]);
        let client = cfg
            .client_settings_with(ClientOverrides {
                rounds: Some(5),
                command: Some(CommandSpec::new("sh", ["-c", "echo 'a b'"])),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(client.rounds, 5);
        assert_eq!(client.command.args, vec!["-c", "echo 'a b'"]);

        let server = cfg
            .server_settings_with(ServerOverrides {
                restart_delay: Some(Duration::from_millis(10)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(server.restart_delay, Duration::from_millis(10));
        assert!(cfg.client_settings().is_err());
    }

    #[test]
    fn bad_values_are_reported_with_key() {
        let cfg = Config::from_pairs([(CLIENT_ROUNDS, "many")]);
        match cfg.client_settings() {
            Err(Error::InvalidConfig { key, value, .. }) => {
                assert_eq!(key, CLIENT_ROUNDS);
                assert_eq!(value, "many");
            }
            other => panic!("unexpected: {:?}", other),
        }
        let cfg = Config::from_pairs([(CLIENT_ROUNDS, "0")]);
        assert!(cfg.client_settings().is_err());
        let cfg = Config::from_pairs([(SERVER_COMMAND, "")]);
        assert!(matches!(cfg.server_settings(), Err(Error::EmptyCommand)));
    }
}
