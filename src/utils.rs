use {
    crate::{
        errors::Result,
        structs::{CheckResult, HistoryEntry},
    },
    std::{
        path::Path,
        time::{Duration, SystemTime, UNIX_EPOCH},
    },
    time::{format_description::well_known::Rfc3339, OffsetDateTime},
    tokio::{fs::File, io::AsyncReadExt},
};

/// Reduce free-form input to a bare host.
///
/// Strips an optional `http://`/`https://` scheme and a `www.` prefix, then
/// cuts at the first `/`, `?`, `#` and `:` in that order. Malformed input still
/// yields a best-effort string, which may be empty.
pub fn extract_domain(input: &str) -> String {
    let mut domain = input.trim();

    domain = domain
        .strip_prefix("http://")
        .or_else(|| domain.strip_prefix("https://"))
        .unwrap_or(domain);
    domain = domain.strip_prefix("www.").unwrap_or(domain);

    for delimiter in ['/', '?', '#', ':'] {
        domain = domain.split(delimiter).next().unwrap_or_default();
    }

    domain.to_owned()
}

pub async fn return_file_lines(file: &Path) -> Result<Vec<String>> {
    let mut f = File::open(file).await?;
    let mut buffer = String::new();
    f.read_to_string(&mut buffer).await?;

    Ok(buffer
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

pub fn return_http_client(timeout: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .user_agent(concat!("discheck/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as i64)
}

pub fn format_millis(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|date| date.format(&Rfc3339).ok())
        .unwrap_or_else(|| millis.to_string())
}

pub fn format_system_time(time: SystemTime) -> Option<String> {
    OffsetDateTime::from(time).format(&Rfc3339).ok()
}

pub fn print_check_result(result: &CheckResult, quiet_flag: bool) {
    if quiet_flag {
        println!("{};{};{}", result.domain, result.ip, result.is_discounted);
    } else if result.is_discounted {
        println!("[+] {} is discounted", result.domain);
        println!("    Domain: {}\n    IP: {}", result.domain, result.ip);
    } else {
        println!("[-] {} is not discounted", result.domain);
        println!("    Domain: {}\n    IP: {}", result.domain, result.ip);
    }
}

pub fn print_history_entry(entry: &HistoryEntry) {
    let status = if entry.is_discounted { "+" } else { "-" };
    let ip = if entry.ip.is_empty() { "N/A" } else { &entry.ip };
    println!(
        "[{}] {} ({}) {} {}",
        status,
        entry.domain,
        entry.url,
        ip,
        format_millis(entry.timestamp)
    );
}
