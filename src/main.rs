use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::debug;
use rtping::config::DEFAULT_COUNT;
use rtping::dns::{Dns, ReverseNameCache, SystemDns, resolve_target};
use rtping::transport::RawSocketTransport;
use rtping::{
    MatchPolicy, PingError, ProbeSession, Reporter, Result, SessionConfig, Statistics, interfaces,
    interrupt,
};
use std::io;
use std::net::IpAddr;
use std::process;
use std::sync::Arc;
use std::time::Duration;

const EXIT_OK: i32 = 0;
const EXIT_USAGE: i32 = 2;

#[derive(Parser, Debug)]
#[command(version, about = "Send ICMP ECHO_REQUEST packets and report round-trip statistics", long_about = None)]
struct Args {
    /// IPv4 FQDN or numeric address
    host: Option<String>,

    /// Destination host (alternative to HOST)
    #[arg(short, long, conflicts_with = "host")]
    destination: Option<String>,

    /// Stop after sending count ECHO_REQUEST packets
    #[arg(short, long, default_value_t = DEFAULT_COUNT)]
    count: u64,

    /// Increase verbosity
    #[arg(short, long)]
    verbose: bool,

    /// Send from the first IPv4 address of this interface
    #[arg(short = 'I', long)]
    interface: Option<String>,

    /// List interfaces with an IPv4 address and exit
    #[arg(long)]
    list: bool,

    /// Only count replies whose identifier and sequence match the request
    #[arg(long)]
    strict: bool,

    /// Seconds to wait for each reply
    #[arg(short = 'W', long, default_value_t = 6)]
    timeout: u64,

    /// Seconds to pause before each request
    #[arg(short, long, default_value_t = 1.0)]
    interval: f64,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayVersion => EXIT_OK,
                _ => EXIT_USAGE,
            };
            process::exit(code);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(args.verbose)))
        .init();

    if args.list {
        if let Err(e) = interfaces::list_interfaces(&mut io::stdout()) {
            eprintln!("Unable to list interfaces: {e}");
            process::exit(1);
        }
        process::exit(EXIT_OK);
    }

    match run(args) {
        Ok(()) => process::exit(EXIT_OK),
        Err(e) if e.is_usage() => {
            eprintln!("Aborted: {e}");
            eprintln!("{}", Args::command().render_usage());
            process::exit(EXIT_USAGE);
        }
        Err(e) => {
            eprintln!("{e}");
            if let PingError::Socket(io_err) = &e {
                if io_err.kind() == io::ErrorKind::PermissionDenied {
                    eprintln!("Raw ICMP sockets need root or CAP_NET_RAW");
                }
            }
            eprintln!("Unable to continue. Halted");
            process::exit(1);
        }
    }
}

/// `-v` only raises our own modules; dependencies stay at warn
fn log_filter(verbose: bool) -> &'static str {
    if verbose { "warn,rtping=debug" } else { "warn" }
}

fn session_config(args: &Args) -> Result<SessionConfig> {
    let interval = Duration::try_from_secs_f64(args.interval)
        .map_err(|_| PingError::BadOption(format!("interval {} is not a valid duration", args.interval)))?;
    let config = SessionConfig {
        count: args.count,
        interval,
        timeout: Duration::from_secs(args.timeout),
        match_policy: if args.strict { MatchPolicy::Strict } else { MatchPolicy::FirstArrival },
        ..Default::default()
    };
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = session_config(&args)?;
    let host = args.host.or(args.destination).ok_or(PingError::NoTarget)?;
    let source = args.interface.as_deref().map(interfaces::source_address).transpose()?;

    let dns: Arc<dyn Dns> = Arc::new(SystemDns);
    let target = resolve_target(dns.as_ref(), &host)?;
    let cache = Arc::new(ReverseNameCache::new(dns));

    // warms the cache; a failure just means the address is shown instead
    let reversed = cache.reverse(Some(IpAddr::V4(target.addr)));
    debug!("reversed lookup of supplied host = {reversed:?}");
    if let Some(source) = source {
        debug!("sending from {source}");
    }

    let reporter = Arc::new(Reporter::new(target, Arc::new(Statistics::new()), cache));
    interrupt::start(reporter.clone())?;

    let transport = RawSocketTransport::open(source)?;
    let mut session = ProbeSession::new(config, transport, reporter, io::stdout());
    session.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter_scoped_to_crate() {
        assert_eq!(log_filter(false), "warn");
        assert_eq!(log_filter(true), "warn,rtping=debug");
    }

    #[test]
    fn test_args_parse_defaults() {
        let args = Args::try_parse_from(["rtping", "127.0.0.1"]).unwrap();
        let config = session_config(&args).unwrap();
        assert_eq!(config.count, DEFAULT_COUNT);
        assert_eq!(config.match_policy, MatchPolicy::FirstArrival);
        assert!(!args.verbose);
    }
}
