use {
    crate::{
        errors::{Error, Result},
        structs::{DnsAnswer, DohResponse, Provider, RecordType},
    },
    async_trait::async_trait,
    reqwest::header::ACCEPT,
    tracing::{debug, warn},
};

pub fn default_providers() -> Vec<Provider> {
    vec![
        // Cloudflare
        Provider::new("cloudflare", "https://cloudflare-dns.com/dns-query"),
        // Google
        Provider::new("google", "https://dns.google/resolve"),
    ]
}

/// Transport for a single DoH JSON query.
#[async_trait]
pub trait DohClient: Send + Sync {
    async fn query(
        &self,
        provider: &Provider,
        domain: &str,
        record_type: RecordType,
    ) -> Result<DohResponse>;
}

pub struct HttpDohClient {
    client: reqwest::Client,
}

impl HttpDohClient {
    pub fn new(client: reqwest::Client) -> Self {
        HttpDohClient { client }
    }
}

#[async_trait]
impl DohClient for HttpDohClient {
    async fn query(
        &self,
        provider: &Provider,
        domain: &str,
        record_type: RecordType,
    ) -> Result<DohResponse> {
        let record = record_type.to_string();
        let response = self
            .client
            .get(&provider.url)
            .query(&[("name", domain), ("type", record.as_str())])
            .header(ACCEPT, "application/dns-json")
            .send()
            .await
            .map_err(|e| Error::query(&provider.name, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::query(
                &provider.name,
                format!("server answered {status}"),
            ));
        }

        // Some providers answer with a non-JSON content type, so decode the body ourselves.
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::query(&provider.name, e))?;
        serde_json::from_slice(&body).map_err(|e| Error::decode(&provider.name, e))
    }
}

/// Resolves a domain through an ordered list of DoH providers.
pub struct DohResolver<C> {
    providers: Vec<Provider>,
    client: C,
}

impl<C: DohClient> DohResolver<C> {
    pub fn new(providers: Vec<Provider>, client: C) -> Self {
        DohResolver { providers, client }
    }

    /// Returns the first A answer of the first provider that has one, or its
    /// first AAAA answer when it has no A answer. A provider is skipped when
    /// both queries fail or either body cannot be decoded. `None` when no
    /// provider answered; query failures are logged and never returned.
    pub async fn resolve(&self, domain: &str) -> Option<DnsAnswer> {
        for provider in &self.providers {
            let (a_response, aaaa_response) = futures::join!(
                self.client.query(provider, domain, RecordType::A),
                self.client.query(provider, domain, RecordType::AAAA)
            );

            if let (Err(a_error), Err(aaaa_error)) = (&a_response, &aaaa_response) {
                warn!(
                    provider = %provider.name,
                    domain,
                    %a_error,
                    %aaaa_error,
                    "DNS provider failed, trying the next one"
                );
                continue;
            }

            // An unreadable body means the provider is broken, not that the record is missing.
            if let Some(e) = [&a_response, &aaaa_response]
                .into_iter()
                .find_map(|response| match response {
                    Err(e @ Error::Decode { .. }) => Some(e),
                    _ => None,
                })
            {
                warn!(
                    provider = %provider.name,
                    domain,
                    error = %e,
                    "DNS provider sent an unreadable answer, trying the next one"
                );
                continue;
            }

            let answers = [a_response, aaaa_response]
                .into_iter()
                .flat_map(|response| match response {
                    Ok(response) => response.answer,
                    Err(e) => {
                        debug!(provider = %provider.name, domain, error = %e, "Query failed");
                        Vec::new()
                    }
                })
                .collect::<Vec<_>>();

            let answer = [RecordType::A, RecordType::AAAA]
                .into_iter()
                .find_map(|record_type| {
                    answers
                        .iter()
                        .find(|record| record.record_type == record_type.code())
                        .map(|record| DnsAnswer {
                            ip: record.data.clone(),
                            record_type,
                        })
                });

            if let Some(answer) = answer {
                debug!(
                    provider = %provider.name,
                    domain,
                    ip = %answer.ip,
                    record_type = %answer.record_type,
                    "Resolved"
                );
                return Some(answer);
            }

            debug!(provider = %provider.name, domain, "No A or AAAA answer");
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::structs::DohRecord,
        std::{
            collections::{HashMap, HashSet},
            sync::{Arc, Mutex},
        },
    };

    type Reply = std::result::Result<Vec<(u16, &'static str)>, &'static str>;

    /// Scripted answers keyed by (provider, record type). Missing keys answer empty.
    #[derive(Default, Clone)]
    struct ScriptedClient {
        replies: HashMap<(String, RecordType), Reply>,
        garbled: HashSet<(String, RecordType)>,
        calls: Arc<Mutex<Vec<(String, RecordType)>>>,
    }

    impl ScriptedClient {
        fn reply(mut self, provider: &'static str, record_type: RecordType, reply: Reply) -> Self {
            self.replies.insert((provider.to_owned(), record_type), reply);
            self
        }

        fn garbled(mut self, provider: &'static str, record_type: RecordType) -> Self {
            self.garbled.insert((provider.to_owned(), record_type));
            self
        }
    }

    #[async_trait]
    impl DohClient for ScriptedClient {
        async fn query(
            &self,
            provider: &Provider,
            _domain: &str,
            record_type: RecordType,
        ) -> Result<DohResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((provider.name.clone(), record_type));

            let key = (provider.name.clone(), record_type);
            if self.garbled.contains(&key) {
                return Err(Error::decode(&provider.name, "expected value at line 1 column 1"));
            }

            match self.replies.get(&key) {
                Some(Ok(records)) => Ok(DohResponse {
                    answer: records
                        .iter()
                        .map(|(code, data)| DohRecord {
                            record_type: *code,
                            data: data.to_string(),
                        })
                        .collect(),
                }),
                Some(Err(reason)) => Err(Error::query(&provider.name, reason)),
                None => Ok(DohResponse::default()),
            }
        }
    }

    fn providers() -> Vec<Provider> {
        vec![
            Provider::new("first", "https://first.example/dns-query"),
            Provider::new("second", "https://second.example/resolve"),
        ]
    }

    #[tokio::test]
    async fn test_prefers_a_over_aaaa() {
        let client = ScriptedClient::default()
            .reply("first", RecordType::A, Ok(vec![(5, "alias.example."), (1, "5.6.7.8")]))
            .reply("first", RecordType::AAAA, Ok(vec![(28, "2001:db8::1")]));
        let resolver = DohResolver::new(providers(), client);

        let answer = resolver.resolve("discount.example").await.unwrap();
        assert_eq!(answer.ip, "5.6.7.8");
        assert_eq!(answer.record_type, RecordType::A);
    }

    #[tokio::test]
    async fn test_falls_back_to_aaaa() {
        let client = ScriptedClient::default()
            .reply("first", RecordType::A, Err("timeout"))
            .reply("first", RecordType::AAAA, Ok(vec![(28, "2001:db8::1")]));
        let resolver = DohResolver::new(providers(), client);

        let answer = resolver.resolve("v6.example").await.unwrap();
        assert_eq!(answer.ip, "2001:db8::1");
        assert_eq!(answer.record_type, RecordType::AAAA);
    }

    #[tokio::test]
    async fn test_next_provider_when_both_queries_fail() {
        let client = ScriptedClient::default()
            .reply("first", RecordType::A, Err("503"))
            .reply("first", RecordType::AAAA, Err("503"))
            .reply("second", RecordType::A, Ok(vec![(1, "9.9.9.9")]));
        let calls = client.calls.clone();
        let resolver = DohResolver::new(providers(), client);

        let answer = resolver.resolve("example.com").await.unwrap();
        assert_eq!(answer.ip, "9.9.9.9");
        assert_eq!(calls.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_stops_at_first_answering_provider() {
        let client = ScriptedClient::default()
            .reply("first", RecordType::A, Ok(vec![(1, "1.1.1.1")]))
            .reply("second", RecordType::A, Ok(vec![(1, "2.2.2.2")]));
        let calls = client.calls.clone();
        let resolver = DohResolver::new(providers(), client);

        assert_eq!(resolver.resolve("example.com").await.unwrap().ip, "1.1.1.1");
        assert!(calls
            .lock()
            .unwrap()
            .iter()
            .all(|(provider, _)| provider == "first"));
    }

    #[tokio::test]
    async fn test_only_cname_answers_move_on() {
        let client = ScriptedClient::default()
            .reply("first", RecordType::A, Ok(vec![(5, "alias.example.")]))
            .reply("second", RecordType::AAAA, Ok(vec![(28, "fd00::2")]));
        let resolver = DohResolver::new(providers(), client);

        assert_eq!(resolver.resolve("example.com").await.unwrap().ip, "fd00::2");
    }

    #[tokio::test]
    async fn test_unreadable_body_skips_whole_provider() {
        let client = ScriptedClient::default()
            .garbled("first", RecordType::A)
            .reply("first", RecordType::AAAA, Ok(vec![(28, "2001:db8::1")]))
            .reply("second", RecordType::A, Ok(vec![(1, "1.2.3.4")]));
        let resolver = DohResolver::new(providers(), client);

        let answer = resolver.resolve("example.com").await.unwrap();
        assert_eq!(answer.ip, "1.2.3.4");
        assert_eq!(answer.record_type, RecordType::A);
    }

    #[tokio::test]
    async fn test_unreadable_bodies_everywhere_is_none() {
        let client = ScriptedClient::default()
            .reply("first", RecordType::A, Ok(vec![(1, "1.1.1.1")]))
            .garbled("first", RecordType::AAAA)
            .garbled("second", RecordType::A);
        let resolver = DohResolver::new(providers(), client);

        assert!(resolver.resolve("example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_all_providers_empty_is_none() {
        let resolver = DohResolver::new(providers(), ScriptedClient::default());
        assert!(resolver.resolve("nothing.example").await.is_none());
    }

    #[tokio::test]
    async fn test_all_providers_failing_is_none() {
        let client = ScriptedClient::default()
            .reply("first", RecordType::A, Err("refused"))
            .reply("first", RecordType::AAAA, Err("refused"))
            .reply("second", RecordType::A, Err("refused"))
            .reply("second", RecordType::AAAA, Err("refused"));
        let resolver = DohResolver::new(providers(), client);

        assert!(resolver.resolve("example.com").await.is_none());
    }

    #[test]
    fn test_doh_response_without_answer_section() {
        let response: DohResponse =
            serde_json::from_str(r#"{"Status":3,"TC":false,"Question":[]}"#).unwrap();
        assert!(response.answer.is_empty());

        let response: DohResponse = serde_json::from_str(
            r#"{"Status":0,"Answer":[{"name":"example.com","type":1,"TTL":300,"data":"93.184.216.34"}]}"#,
        )
        .unwrap();
        assert_eq!(response.answer[0].record_type, 1);
        assert_eq!(response.answer[0].data, "93.184.216.34");
    }
}
