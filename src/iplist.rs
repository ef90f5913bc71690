//! Loading the discounted IP list.
//!
//! The list is plain text with one IP literal per line. Lookups are exact
//! string matches: `::1` and `0:0:0:0:0:0:0:1` are different entries.

use {
    crate::{
        errors::{Error, Result},
        utils::format_system_time,
    },
    reqwest::header::LAST_MODIFIED,
    std::{collections::HashSet, path::Path},
    tracing::{debug, info},
};

#[derive(Clone, Debug, Default)]
pub struct IpSet {
    ips: HashSet<String>,
    ipv4_count: usize,
    ipv6_count: usize,
    last_modified: Option<String>,
}

impl IpSet {
    pub fn parse(text: &str) -> Self {
        let ips: HashSet<String> = text
            .split('\n')
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_owned)
            .collect();

        let ipv6_count = ips.iter().filter(|ip| ip.contains(':')).count();

        IpSet {
            ipv4_count: ips.len() - ipv6_count,
            ipv6_count,
            ips,
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: Option<String>) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.ips.contains(ip)
    }

    pub fn len(&self) -> usize {
        self.ips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }

    pub fn ipv4_count(&self) -> usize {
        self.ipv4_count
    }

    pub fn ipv6_count(&self) -> usize {
        self.ipv6_count
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load the list from an `http(s)://` URL or a local path.
pub async fn load(source: &str, client: &reqwest::Client) -> Result<IpSet> {
    let ip_set = if is_remote(source) {
        fetch(source, client).await?
    } else {
        read(Path::new(source)).await?
    };

    info!(
        source,
        total = ip_set.len(),
        ipv4 = ip_set.ipv4_count(),
        ipv6 = ip_set.ipv6_count(),
        "Loaded IP list"
    );
    Ok(ip_set)
}

async fn fetch(url: &str, client: &reqwest::Client) -> Result<IpSet> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::load(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::load(url, format!("server answered {status}")));
    }

    let last_modified = response
        .headers()
        .get(LAST_MODIFIED)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    debug!(url, ?last_modified, "IP list fetched");

    let text = response.text().await.map_err(|e| Error::load(url, e))?;
    Ok(IpSet::parse(&text).with_last_modified(last_modified))
}

async fn read(path: &Path) -> Result<IpSet> {
    let name = path.display().to_string();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::load(name.as_str(), e))?;

    let last_modified = tokio::fs::metadata(path)
        .await
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(format_system_time);

    Ok(IpSet::parse(&text).with_last_modified(last_modified))
}
