use {
    clap::Parser,
    discheck::{
        args::{Args, Command},
        checker::Checker,
        config::Config,
        dnslib::{DohResolver, HttpDohClient},
        errors::Error,
        history::{FileHistoryStore, HistoryStore, MemoryHistoryStore},
        iplist, subnets, telemetry,
        utils::{print_check_result, print_history_entry, return_file_lines, return_http_client},
    },
    std::process::ExitCode,
    tokio::io::{self, AsyncBufReadExt, BufReader},
    tracing::{debug, error, info},
};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(ip_list) = args.ip_list.clone() {
        config.ip_list = ip_list;
    }
    if let Some(history_file) = args.history_file.clone() {
        config.history_file = history_file;
    }
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }

    telemetry::init(&config.telemetry, args.quiet_flag)
        .map_err(|e| e as Box<dyn std::error::Error>)?;
    debug!(?config, "Configuration loaded");

    let client = return_http_client(config.timeout)?;
    let history: Box<dyn HistoryStore> = if args.no_history {
        Box::new(MemoryHistoryStore::new())
    } else {
        Box::new(FileHistoryStore::new(&config.history_file))
    };

    match args.command {
        Command::Check { inputs } => {
            let ip_set = match iplist::load(&config.ip_list, &client).await {
                Ok(ip_set) => Some(ip_set),
                Err(e) => {
                    error!("{}", e);
                    None
                }
            };
            let resolver = DohResolver::new(config.providers.clone(), HttpDohClient::new(client));
            let checker = Checker::new(ip_set, resolver, history);

            run_checks(&checker, inputs, args.quiet_flag).await
        }
        Command::History { clear } => {
            if clear {
                history.clear()?;
                if !args.quiet_flag {
                    println!("History cleared.");
                }
            } else {
                let history = history.load()?;
                if history.is_empty() && !args.quiet_flag {
                    println!("No checks yet.");
                }
                history.iter().for_each(print_history_entry);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Stats => {
            let ip_set = iplist::load(&config.ip_list, &client).await?;
            println!("Total IPs: {}", ip_set.len());
            println!("IPv4: {}", ip_set.ipv4_count());
            println!("IPv6: {}", ip_set.ipv6_count());
            println!("Last update: {}", ip_set.last_modified().unwrap_or("unknown"));
            Ok(ExitCode::SUCCESS)
        }
        Command::Expand {
            subnets: subnets_file,
            output,
        } => {
            let lines = return_file_lines(&subnets_file).await?;
            let expansion = subnets::expand_subnets(lines, u128::from(config.max_subnet_hosts));
            info!(
                subnets = expansion.subnets,
                invalid = expansion.invalid,
                oversized = expansion.oversized,
                ipv4 = expansion.ipv4.len(),
                ipv6 = expansion.ipv6.len(),
                "Subnets expanded"
            );

            match output {
                Some(path) => {
                    tokio::fs::write(&path, expansion.render()).await?;
                    if !args.quiet_flag {
                        println!(
                            "Wrote {} IPs ({} v4, {} v6) to {}",
                            expansion.total(),
                            expansion.ipv4.len(),
                            expansion.ipv6.len(),
                            path.display()
                        );
                    }
                }
                None => print!("{}", expansion.render()),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_checks(
    checker: &Checker<HttpDohClient>,
    inputs: Vec<String>,
    quiet_flag: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let inputs = if inputs.is_empty() {
        let mut lines = BufReader::new(io::stdin()).lines();
        let mut buffer = Vec::new();
        while let Some(line) = lines.next_line().await? {
            if !line.trim().is_empty() {
                buffer.push(line);
            }
        }
        buffer
    } else {
        inputs
    };

    if inputs.is_empty() {
        eprintln!("{}", Error::InvalidInput);
        return Ok(ExitCode::FAILURE);
    }

    let mut failures = 0;
    for input in &inputs {
        match checker.check(input).await {
            Ok(result) => print_check_result(&result, quiet_flag),
            Err(e) => {
                failures += 1;
                eprintln!("{}: {}", input.trim(), e);
            }
        }
    }

    if failures == inputs.len() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
