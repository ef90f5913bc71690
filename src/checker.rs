//! Discount eligibility checks.
//!
//! [`Checker`] owns everything a check needs: the loaded IP set, the DoH
//! resolver and the history store. It is built once at startup and each call
//! to [`Checker::check`] is a single attempt, with no retries.

use {
    crate::{
        dnslib::{DohClient, DohResolver},
        errors::{Error, Result},
        history::{History, HistoryStore},
        iplist::{self, IpSet},
        structs::{CheckResult, HistoryEntry},
        utils::{extract_domain, now_millis},
    },
    tracing::{info, instrument, warn},
};

pub struct Checker<C> {
    ip_set: Option<IpSet>,
    resolver: DohResolver<C>,
    history: Box<dyn HistoryStore>,
}

impl<C: DohClient> Checker<C> {
    pub fn new(
        ip_set: Option<IpSet>,
        resolver: DohResolver<C>,
        history: Box<dyn HistoryStore>,
    ) -> Self {
        Checker {
            ip_set,
            resolver,
            history,
        }
    }

    pub fn ip_set(&self) -> Option<&IpSet> {
        self.ip_set.as_ref()
    }

    /// Replace the IP set. On failure the previous set is dropped, so checks
    /// keep failing until a load succeeds.
    pub async fn reload(&mut self, source: &str, client: &reqwest::Client) -> Result<&IpSet> {
        self.ip_set = None;
        let ip_set = iplist::load(source, client).await?;
        Ok(&*self.ip_set.insert(ip_set))
    }

    #[instrument(skip(self), fields(domain = tracing::field::Empty))]
    pub async fn check(&self, raw_input: &str) -> Result<CheckResult> {
        let input = raw_input.trim();
        if input.is_empty() {
            return Err(Error::InvalidInput);
        }

        let domain = extract_domain(input);
        if domain.is_empty() {
            return Err(Error::InvalidDomain);
        }
        tracing::Span::current().record("domain", domain.as_str());

        let ip_set = self.ip_set.as_ref().ok_or(Error::IpListUnavailable)?;

        let answer = self
            .resolver
            .resolve(&domain)
            .await
            .filter(|answer| !answer.ip.is_empty())
            .ok_or_else(|| Error::Resolution(domain.clone()))?;

        let result = CheckResult {
            is_discounted: ip_set.contains(&answer.ip),
            domain,
            ip: answer.ip,
        };
        info!(
            ip = %result.ip,
            discounted = result.is_discounted,
            "Check finished"
        );

        let entry = HistoryEntry {
            url: input.to_owned(),
            domain: result.domain.clone(),
            ip: result.ip.clone(),
            is_discounted: result.is_discounted,
            timestamp: now_millis(),
        };
        if let Err(e) = self.history.append(entry) {
            warn!(error = %e, "Failed to save the check to history");
        }

        Ok(result)
    }

    pub fn history(&self) -> Result<History> {
        self.history.load()
    }

    pub fn clear_history(&self) -> Result<()> {
        self.history.clear()
    }
}
