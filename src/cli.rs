use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Keep the cache in process memory
    Memory,
    /// Keep the cache as JSON documents under --data-dir
    Fs,
}

#[derive(Parser, Debug)]
#[command(name = "zipview")]
#[command(version)]
#[command(about = "Serve cached listings and file contents of remote ZIP archives", long_about = None)]
#[command(after_help = "Endpoints:\n  \
  GET /zip?url=URL              archive listing (refreshed after 5 minutes)\n  \
  GET /file?url=URL&file=NAME   one cached file\n  \
  GET /read?url=URL             force a refresh")]
pub struct Cli {
    /// Address to listen on
    #[arg(short = 'l', long, env = "ZIPVIEW_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Cache backend
    #[arg(long, env = "ZIPVIEW_STORE", value_enum, default_value_t = StoreKind::Memory)]
    pub store: StoreKind,

    /// Directory for the fs backend
    #[arg(short = 'd', long, env = "ZIPVIEW_DATA_DIR", value_name = "DIR", default_value = "zipview-data")]
    pub data_dir: PathBuf,

    /// Whole-request timeout for archive fetches, in seconds (none by default)
    #[arg(long, env = "ZIPVIEW_FETCH_TIMEOUT", value_name = "SECS")]
    pub fetch_timeout: Option<u64>,

    /// More logging (-vv => trace)
    #[arg(short = 'v', action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less logging (-qq => errors only)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout.map(Duration::from_secs)
    }

    /// Default log directive when RUST_LOG is unset.
    pub fn log_directive(&self) -> String {
        let level = match (self.verbose, self.quiet) {
            (0, 0) => "info",
            (1, _) => "debug",
            (v, _) if v > 1 => "trace",
            (_, 1) => "warn",
            _ => "error",
        };
        format!("zipview={level}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["zipview"]).unwrap();

        assert_eq!(cli.listen, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(cli.store, StoreKind::Memory);
        assert_eq!(cli.fetch_timeout(), None);
        assert_eq!(cli.log_directive(), "zipview=info");
    }

    #[test]
    fn test_fs_store_and_timeout() {
        let cli = Cli::try_parse_from([
            "zipview",
            "--store",
            "fs",
            "-d",
            "/tmp/cache",
            "--fetch-timeout",
            "30",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.store, StoreKind::Fs);
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(cli.fetch_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cli.log_directive(), "zipview=trace");
    }

    #[test]
    fn test_quiet_levels() {
        let cli = Cli::try_parse_from(["zipview", "-q"]).unwrap();
        assert_eq!(cli.log_directive(), "zipview=warn");

        let cli = Cli::try_parse_from(["zipview", "-qq"]).unwrap();
        assert_eq!(cli.log_directive(), "zipview=error");

        assert!(Cli::try_parse_from(["zipview", "-q", "-v"]).is_err());
    }
}
