use clap::{Parser, Subcommand};
use govdash_models::ProposalFilter;

#[derive(Debug, Parser)]
#[command(name = "govdash-server", version, about = "Governance proposals proxy and watcher")]
pub struct Args {
    /// Path to the TOML config file. A missing file means built-in defaults.
    #[arg(short, long, default_value = "govdash.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the proposals proxy (the default)
    Serve {
        /// Overrides `server.bind_address`
        #[arg(long)]
        bind: Option<String>,
    },
    /// Poll proposals through a running proxy and print the list
    Watch {
        /// Overrides `poller.proxy_url`
        #[arg(long)]
        proxy_url: Option<String>,
        /// `active` or `all`
        #[arg(long)]
        filter: Option<ProposalFilter>,
        /// Fetch once, print, and exit
        #[arg(long)]
        once: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_subcommand() {
        let args = Args::try_parse_from(["govdash-server"]).unwrap();
        assert_eq!(args.config, "govdash.toml");
        assert!(args.command.is_none());
    }

    #[test]
    fn parses_watch_flags() {
        let args = Args::try_parse_from([
            "govdash-server",
            "--config",
            "/etc/govdash.toml",
            "watch",
            "--proxy-url",
            "http://10.0.0.5:8080",
            "--filter",
            "all",
            "--once",
        ])
        .unwrap();
        assert_eq!(args.config, "/etc/govdash.toml");
        match args.command {
            Some(Command::Watch {
                proxy_url,
                filter,
                once,
            }) => {
                assert_eq!(proxy_url.as_deref(), Some("http://10.0.0.5:8080"));
                assert_eq!(filter, Some(ProposalFilter::All));
                assert!(once);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_filter() {
        assert!(Args::try_parse_from(["govdash-server", "watch", "--filter", "recent"]).is_err());
    }
}
