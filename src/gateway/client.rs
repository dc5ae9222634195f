//! MediaWiki API client
//!
//! One `WikiClient` serves a whole crawl run. Concurrency is bounded by an
//! internal permit semaphore independent of the worker count, since a single
//! worker issues several API calls per item (page data, rendered markup,
//! batch title resolution). Transient failures (timeouts, 429, 5xx) are
//! retried with exponential backoff up to a fixed attempt count; exhaustion
//! degrades to a typed error the worker can convert into a per-item skip.

use crate::config::Heuristics;
use crate::gateway::types::{
    CategoryCounts, CategoryMember, PageData, PageRef, Redirect, ResolvedBatch,
};
use crate::gateway::{GatewayError, GatewayResult};
use crate::wiki;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// User agent identifying the crawler to the Wikimedia API
const USER_AGENT: &str =
    "versecrawl/1.0 (https://github.com/versecrawl/versecrawl; contact@versecrawl.dev)";

/// Page size requested from category listing endpoints
const LIST_PAGE_SIZE: &str = "500";

/// Asynchronous MediaWiki API client with permit-bounded concurrency
pub struct WikiClient {
    client: Client,
    endpoint: String,
    base_url: String,
    permits: Arc<Semaphore>,
    max_attempts: u32,
    retry_base_delay: Duration,
}

impl WikiClient {
    /// Creates a client for the given API endpoint
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full API endpoint URL (e.g. `https://fr.wikisource.org/w/api.php`)
    /// * `max_concurrent` - Permit count bounding in-flight API calls
    /// * `heuristics` - Source of the retry attempt count and backoff base
    pub fn new(
        endpoint: &str,
        max_concurrent: usize,
        heuristics: &Heuristics,
    ) -> GatewayResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        let base_url = endpoint
            .trim_end_matches("/w/api.php")
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            base_url,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            max_attempts: heuristics.max_fetch_attempts,
            retry_base_delay: Duration::from_millis(heuristics.retry_base_delay_ms),
        })
    }

    /// Canonical page URL built from a title, used when the API omits `fullurl`
    pub fn page_url(&self, title: &str) -> String {
        format!("{}/wiki/{}", self.base_url, title.replace(' ', "_"))
    }

    /// Issues one API request with permit gating and bounded retry
    ///
    /// Retried conditions: transport timeouts/connection failures, HTTP 429
    /// and 5xx. Anything else fails immediately with a typed error.
    async fn request(&self, params: &[(&str, String)]) -> GatewayResult<Value> {
        let mut attempt: u32 = 0;
        let mut last_error = String::new();

        loop {
            attempt += 1;

            let outcome = {
                let _permit = self
                    .permits
                    .acquire()
                    .await
                    .map_err(|_| GatewayError::Malformed("gateway permits closed".to_string()))?;

                tracing::trace!("API request (attempt {}): {:?}", attempt, params.first());

                self.client
                    .get(&self.endpoint)
                    .query(&[("format", "json"), ("formatversion", "2")])
                    .query(params)
                    .send()
                    .await
            };

            match outcome {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let value: Value = response.json().await?;
                        if let Some(error) = value.get("error") {
                            tracing::error!("MediaWiki API error: {}", error);
                        }
                        return Ok(value);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        last_error = format!("HTTP {}", status.as_u16());
                    } else {
                        return Err(GatewayError::Status {
                            status: status.as_u16(),
                        });
                    }
                }
                Err(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                    last_error = e.to_string();
                }
                Err(e) => return Err(e.into()),
            }

            if attempt >= self.max_attempts {
                return Err(GatewayError::RetriesExhausted {
                    attempts: attempt,
                    last_error,
                });
            }

            let delay = self.retry_base_delay * 2u32.saturating_pow(attempt - 1);
            tracing::warn!(
                "Transient API failure ({}), retrying in {:?} (attempt {}/{})",
                last_error,
                delay,
                attempt,
                self.max_attempts
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Resolves a batch of titles (max 50) to page references, following
    /// redirects server-side
    pub async fn resolve_titles(&self, titles: &[String]) -> GatewayResult<ResolvedBatch> {
        if titles.is_empty() {
            return Ok(ResolvedBatch::default());
        }

        let data = self
            .request(&[
                ("action", "query".to_string()),
                ("titles", titles.join("|")),
                ("redirects", "1".to_string()),
            ])
            .await?;

        let mut batch = ResolvedBatch::default();

        if let Some(pages) = data["query"]["pages"].as_array() {
            for page in pages {
                if page.get("missing").is_some() || page.get("invalid").is_some() {
                    continue;
                }
                let (Some(page_id), Some(title)) =
                    (page["pageid"].as_i64(), page["title"].as_str())
                else {
                    continue;
                };
                batch.pages.push(PageRef {
                    page_id,
                    title: title.to_string(),
                    ns: page["ns"].as_i64().unwrap_or(0),
                });
            }
        }

        if let Some(redirects) = data["query"]["redirects"].as_array() {
            for redirect in redirects {
                if let (Some(from), Some(to)) =
                    (redirect["from"].as_str(), redirect["to"].as_str())
                {
                    batch.redirects.push(Redirect {
                        from: from.to_string(),
                        to: to.to_string(),
                    });
                }
            }
        }

        Ok(batch)
    }

    /// Searches for a page title in the category namespace, returning the
    /// best match if any
    ///
    /// Used as a fuzzy fallback when the root category is not found verbatim.
    pub async fn search_category(&self, term: &str) -> GatewayResult<Option<String>> {
        let data = self
            .request(&[
                ("action", "query".to_string()),
                ("list", "search".to_string()),
                ("srsearch", term.to_string()),
                ("srnamespace", "14".to_string()),
                ("srlimit", "1".to_string()),
            ])
            .await?;

        Ok(data["query"]["search"]
            .as_array()
            .and_then(|results| results.first())
            .and_then(|hit| hit["title"].as_str())
            .map(|s| s.to_string()))
    }

    /// Lists the immediate subcategories of a category (title without prefix)
    pub async fn list_subcategories(
        &self,
        category: &str,
        lang: &str,
    ) -> GatewayResult<Vec<CategoryMember>> {
        self.list_category_members(category, lang, "subcat").await
    }

    /// Lists the member pages of a category (title without prefix)
    pub async fn list_category_pages(
        &self,
        category: &str,
        lang: &str,
    ) -> GatewayResult<Vec<CategoryMember>> {
        self.list_category_members(category, lang, "page").await
    }

    async fn list_category_members(
        &self,
        category: &str,
        lang: &str,
        member_type: &str,
    ) -> GatewayResult<Vec<CategoryMember>> {
        let full_title = format!("{}:{}", wiki::category_prefix(lang), category);
        let mut members = Vec::new();
        let mut continue_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("action", "query".to_string()),
                ("list", "categorymembers".to_string()),
                ("cmtitle", full_title.clone()),
                ("cmtype", member_type.to_string()),
                ("cmlimit", LIST_PAGE_SIZE.to_string()),
            ];
            if let Some(token) = &continue_token {
                params.push(("cmcontinue", token.clone()));
            }

            let data = self.request(&params).await?;

            if let Some(items) = data["query"]["categorymembers"].as_array() {
                for item in items {
                    if let (Some(page_id), Some(title)) =
                        (item["pageid"].as_i64(), item["title"].as_str())
                    {
                        members.push(CategoryMember {
                            page_id,
                            title: title.to_string(),
                        });
                    }
                }
            }

            continue_token = data["continue"]["cmcontinue"]
                .as_str()
                .map(|s| s.to_string());
            if continue_token.is_none() {
                break;
            }
        }

        Ok(members)
    }

    /// Reports member counts for a batch of full category titles (max 50)
    ///
    /// Categories missing from the response (deleted, empty metadata) map to
    /// zero counts.
    pub async fn get_category_counts(
        &self,
        full_titles: &[String],
    ) -> GatewayResult<HashMap<String, CategoryCounts>> {
        if full_titles.is_empty() {
            return Ok(HashMap::new());
        }

        let data = self
            .request(&[
                ("action", "query".to_string()),
                ("prop", "categoryinfo".to_string()),
                ("titles", full_titles.join("|")),
            ])
            .await?;

        let mut counts = HashMap::new();

        if let Some(pages) = data["query"]["pages"].as_array() {
            for page in pages {
                let Some(title) = page["title"].as_str() else {
                    continue;
                };
                let info = &page["categoryinfo"];
                counts.insert(
                    title.to_string(),
                    CategoryCounts {
                        pages: info["pages"].as_u64().unwrap_or(0),
                        subcats: info["subcats"].as_u64().unwrap_or(0),
                    },
                );
            }
        }

        Ok(counts)
    }

    /// Fetches a page's metadata, latest revision wikitext, categories and
    /// templates
    ///
    /// Returns `Ok(None)` for missing/invalid pages.
    pub async fn get_page_data(&self, page_id: i64) -> GatewayResult<Option<PageData>> {
        let data = self
            .request(&[
                ("action", "query".to_string()),
                ("pageids", page_id.to_string()),
                ("prop", "info|revisions|categories|templates".to_string()),
                ("rvprop", "ids|content".to_string()),
                ("rvslots", "main".to_string()),
                ("inprop", "url".to_string()),
                ("cllimit", "max".to_string()),
                ("tllimit", "max".to_string()),
            ])
            .await?;

        let Some(page) = data["query"]["pages"]
            .as_array()
            .and_then(|pages| pages.first())
        else {
            tracing::warn!("No page in API response for pageid {}", page_id);
            return Ok(None);
        };

        if page.get("missing").is_some() || page.get("invalid").is_some() {
            tracing::debug!("Page {} reported missing or invalid", page_id);
            return Ok(None);
        }

        let (Some(resolved_id), Some(title)) = (page["pageid"].as_i64(), page["title"].as_str())
        else {
            return Err(GatewayError::Malformed(format!(
                "page entry without pageid/title for pageid {}",
                page_id
            )));
        };

        let revision = page["revisions"]
            .as_array()
            .and_then(|revs| revs.first())
            .cloned()
            .unwrap_or(Value::Null);

        // rvslots=main nests content one level deeper on modern wikis; older
        // response shapes put it directly on the revision
        let wikitext = revision["slots"]["main"]["content"]
            .as_str()
            .or_else(|| revision["content"].as_str())
            .unwrap_or("")
            .to_string();

        let collect_titles = |field: &Value| -> Vec<String> {
            field
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item["title"].as_str().map(|s| s.to_string()))
                        .collect()
                })
                .unwrap_or_default()
        };

        let url = page["fullurl"]
            .as_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|| self.page_url(title));

        Ok(Some(PageData {
            page_id: resolved_id,
            ns: page["ns"].as_i64().unwrap_or(0),
            title: title.to_string(),
            url,
            revision_id: revision["revid"].as_i64().unwrap_or(0),
            wikitext,
            categories: collect_titles(&page["categories"]),
            templates: collect_titles(&page["templates"]),
        }))
    }

    /// Fetches the rendered HTML for a page, if the API can produce it
    pub async fn get_rendered_markup(&self, page_id: i64) -> GatewayResult<Option<String>> {
        let data = self
            .request(&[
                ("action", "parse".to_string()),
                ("pageid", page_id.to_string()),
                ("prop", "text".to_string()),
            ])
            .await?;

        // formatversion=2 renders text as a plain string; tolerate the older
        // {"*": ...} shape as well
        let text = data["parse"]["text"]
            .as_str()
            .or_else(|| data["parse"]["text"]["*"].as_str())
            .map(|s| s.to_string());

        Ok(text)
    }
}
