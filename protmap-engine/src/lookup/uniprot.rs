//! Blocking client for the UniProtKB REST API

use super::{Hit, LookupError, LookupResult, LookupService, SearchQuery};
use crate::config::ServiceConfig;
use crate::error::{EngineError, Result};
use protmap_core::ErrorKind;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

const SEARCH_FIELDS: &str = "accession,gene_names,protein_name,organism_name,sequence";
const UNKNOWN_PROTEIN: &str = "Unknown";
const SNIPPET_LEN: usize = 200;
/// Upper bound on result pages followed for one search
const MAX_PAGES: usize = 20;
const TOTAL_RESULTS: &str = "x-total-results";

/// UniProtKB REST client
///
/// Stateless apart from request pacing: every call is one HTTP request with
/// the configured timeout.
#[derive(Debug)]
pub struct UniProtClient {
    client: Client,
    base_url: String,
    page_size: usize,
    min_interval: Option<Duration>,
    next_slot: Mutex<Option<Instant>>,
}

impl UniProtClient {
    /// Create a client from service settings
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("protmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EngineError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            min_interval: config.min_interval(),
            next_slot: Mutex::new(None),
        })
    }

    /// Wait for this request's start slot
    ///
    /// The slot is reserved under the lock and the sleep happens outside it,
    /// so concurrent workers queue up at `min_interval` spacing.
    fn pace(&self) {
        let Some(interval) = self.min_interval else {
            return;
        };
        let wait = {
            let mut next = self
                .next_slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let start = next.map_or(now, |slot| slot.max(now));
            *next = Some(start + interval);
            start - now
        };
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }

    fn get(&self, request: reqwest::blocking::RequestBuilder) -> LookupResult<Response> {
        self.pace();
        request.send().map_err(transport_error)
    }
}

impl LookupService for UniProtClient {
    fn search(&self, query: &SearchQuery) -> LookupResult<Vec<Hit>> {
        let url = format!("{}/uniprotkb/search", self.base_url);
        let query_string = query.to_query_string();
        log::debug!("uniprot search: {}", query_string);

        let page_size = self.page_size.to_string();
        let first = self.client.get(&url).query(&[
            ("query", query_string.as_str()),
            ("fields", SEARCH_FIELDS),
            ("format", "json"),
            ("size", page_size.as_str()),
        ]);

        let mut hits = Vec::new();
        let mut total = None;
        let mut pages = 0;
        let mut pending = Some(first);
        while let Some(request) = pending.take() {
            let response = self.get(request)?;
            let status = response.status();
            if !status.is_success() {
                return Err(status_error(status, &response));
            }
            let headers = response.headers();
            total = total.or_else(|| {
                headers
                    .get(TOTAL_RESULTS)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.trim().parse::<usize>().ok())
            });
            let next = headers
                .get_all(reqwest::header::LINK)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .find_map(next_link);

            let body = response.text().map_err(transport_error)?;
            hits.extend(parse_search(&body)?);
            pages += 1;

            match next {
                Some(next) if pages < MAX_PAGES => pending = Some(self.client.get(next)),
                Some(_) => log::warn!(
                    "search for '{}' stopped after {} pages",
                    query.symbol,
                    MAX_PAGES
                ),
                None => {}
            }
        }

        if let Some(total) = total.filter(|&total| total > hits.len()) {
            log::warn!(
                "search for '{}' reports {} results but {} were retrieved",
                query.symbol,
                total,
                hits.len()
            );
        }
        Ok(hits)
    }

    fn fetch(&self, accession: &str) -> LookupResult<Option<Hit>> {
        let url = format!("{}/uniprotkb/{}", self.base_url, accession);
        log::debug!("uniprot fetch: {}", accession);

        let response = self.get(self.client.get(&url).query(&[("format", "json")]))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(status, &response));
        }
        let body = response.text().map_err(transport_error)?;
        parse_entry(&body)
    }

    fn name(&self) -> &'static str {
        "uniprot"
    }
}

fn transport_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::new(ErrorKind::Timeout, err.to_string())
    } else {
        LookupError::new(ErrorKind::Unavailable, err.to_string())
    }
}

fn status_error(status: StatusCode, response: &Response) -> LookupError {
    let message = format!("HTTP {status}");
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);
        LookupError::new(ErrorKind::RateLimited, message).with_retry_after(retry_after)
    } else if status.is_server_error() {
        LookupError::new(ErrorKind::Unavailable, message)
    } else {
        LookupError::new(ErrorKind::Rejected, message)
    }
}

/// URL of the `rel="next"` entry of a `Link` header
fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|param| matches!(param.trim(), r#"rel="next""# | "rel=next"));
        let url = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        (is_next && !url.is_empty()).then(|| url.to_string())
    })
}

/// Parse a `Retry-After` header given in seconds
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    primary_accession: Option<String>,
    #[serde(default)]
    entry_type: String,
    protein_description: Option<ProteinDescription>,
    #[serde(default)]
    genes: Vec<Gene>,
    sequence: Option<Sequence>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProteinDescription {
    recommended_name: Option<Name>,
    #[serde(default)]
    submission_names: Vec<Name>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Name {
    full_name: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Gene {
    gene_name: Option<Value>,
    #[serde(default)]
    synonyms: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Value {
    value: String,
}

#[derive(Debug, Deserialize)]
struct Sequence {
    value: String,
}

impl Entry {
    fn is_inactive(&self) -> bool {
        self.entry_type.eq_ignore_ascii_case("inactive")
    }

    fn protein_name(&self) -> String {
        let Some(description) = &self.protein_description else {
            return UNKNOWN_PROTEIN.to_string();
        };
        description
            .recommended_name
            .iter()
            .chain(description.submission_names.iter())
            .find_map(|name| name.full_name.as_ref())
            .map(|v| v.value.clone())
            .unwrap_or_else(|| UNKNOWN_PROTEIN.to_string())
    }

    fn into_hit(self, body: &str) -> LookupResult<Hit> {
        let protein_name = self.protein_name();
        let reviewed = self.entry_type.starts_with("UniProtKB reviewed");
        let accession = match self.primary_accession {
            Some(accession) if !accession.trim().is_empty() => accession,
            _ => return Err(malformed("entry without primaryAccession", body)),
        };
        let gene_names = self
            .genes
            .into_iter()
            .flat_map(|gene| gene.gene_name.into_iter().chain(gene.synonyms))
            .map(|v| v.value)
            .collect();

        Ok(Hit {
            accession,
            protein_name,
            gene_names,
            reviewed,
            sequence: self.sequence.map(|s| s.value),
        })
    }
}

fn malformed(reason: &str, body: &str) -> LookupError {
    let snippet: String = body.chars().take(SNIPPET_LEN).collect();
    log::warn!("malformed lookup response ({}): {}", reason, snippet);
    LookupError::new(ErrorKind::MalformedResponse, reason.to_string())
}

fn parse_search(body: &str) -> LookupResult<Vec<Hit>> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| malformed(&e.to_string(), body))?;
    response
        .results
        .into_iter()
        .filter(|entry| !entry.is_inactive())
        .map(|entry| entry.into_hit(body))
        .collect()
}

fn parse_entry(body: &str) -> LookupResult<Option<Hit>> {
    let entry: Entry = serde_json::from_str(body).map_err(|e| malformed(&e.to_string(), body))?;
    if entry.is_inactive() {
        return Ok(None);
    }
    entry.into_hit(body).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TP53_ENTRY: &str = r#"{
        "entryType": "UniProtKB reviewed (Swiss-Prot)",
        "primaryAccession": "P04637",
        "proteinDescription": {
            "recommendedName": {"fullName": {"value": "Cellular tumor antigen p53"}}
        },
        "genes": [{"geneName": {"value": "TP53"}, "synonyms": [{"value": "P53"}]}],
        "sequence": {"value": "MEEPQSDPSV", "length": 10}
    }"#;

    #[test]
    fn test_parse_search_results() {
        let body = format!(r#"{{"results": [{TP53_ENTRY}]}}"#);
        let hits = parse_search(&body).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].accession, "P04637");
        assert_eq!(hits[0].protein_name, "Cellular tumor antigen p53");
        assert_eq!(hits[0].gene_names, vec!["TP53", "P53"]);
        assert!(hits[0].reviewed);
        assert_eq!(hits[0].sequence.as_deref(), Some("MEEPQSDPSV"));
    }

    #[test]
    fn test_parse_empty_search() {
        assert!(parse_search(r#"{"results": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_submission_name_fallback() {
        let body = r#"{
            "entryType": "UniProtKB unreviewed (TrEMBL)",
            "primaryAccession": "A0A024R161",
            "proteinDescription": {"submissionNames": [{"fullName": {"value": "Guanine nucleotide-binding protein"}}]}
        }"#;
        let hit = parse_entry(body).unwrap().unwrap();
        assert_eq!(hit.protein_name, "Guanine nucleotide-binding protein");
        assert!(!hit.reviewed);
        assert!(hit.sequence.is_none());
    }

    #[test]
    fn test_missing_description_is_unknown() {
        let body = r#"{"entryType": "UniProtKB reviewed (Swiss-Prot)", "primaryAccession": "Q04740"}"#;
        assert_eq!(parse_entry(body).unwrap().unwrap().protein_name, "Unknown");
    }

    #[test]
    fn test_inactive_entry_is_no_record() {
        let body = r#"{"entryType": "Inactive", "primaryAccession": "P00000"}"#;
        assert_eq!(parse_entry(body).unwrap(), None);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let error = parse_search("<html>maintenance</html>").unwrap_err();
        assert_eq!(error.kind, ErrorKind::MalformedResponse);
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_missing_accession_is_malformed() {
        let body = r#"{"results": [{"entryType": "UniProtKB reviewed (Swiss-Prot)"}]}"#;
        assert_eq!(
            parse_search(body).unwrap_err().kind,
            ErrorKind::MalformedResponse
        );
    }

    #[test]
    fn test_next_link() {
        let header = r#"<https://rest.uniprot.org/uniprotkb/search?query=x&cursor=abc&size=25>; rel="next""#;
        assert_eq!(
            next_link(header).as_deref(),
            Some("https://rest.uniprot.org/uniprotkb/search?query=x&cursor=abc&size=25")
        );

        let several = r#"<https://example.org/prev>; rel="prev", <https://example.org/next>; rel="next""#;
        assert_eq!(next_link(several).as_deref(), Some("https://example.org/next"));

        assert_eq!(next_link(r#"<https://example.org/prev>; rel="prev""#), None);
        assert_eq!(next_link(""), None);
    }

    #[test]
    fn test_retry_after_parsing() {
        assert_eq!(parse_retry_after(" 12 "), Some(Duration::from_secs(12)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn test_client_builds_from_defaults() {
        let client = UniProtClient::new(&ServiceConfig::default()).unwrap();
        assert_eq!(client.base_url, "https://rest.uniprot.org");
        assert_eq!(client.name(), "uniprot");
    }

    #[test]
    fn test_pacing_reserves_slots() {
        let config = ServiceConfig {
            min_interval_ms: 20,
            ..ServiceConfig::default()
        };
        let client = UniProtClient::new(&config).unwrap();
        let start = Instant::now();
        client.pace();
        client.pace();
        client.pace();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
