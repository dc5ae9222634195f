//! Worker loop and per-item processing
//!
//! Each worker drains one item at a time: fetch resolved page data, fetch
//! rendered markup, classify, then either extract-and-emit (poems), expand
//! (collections and hubs) or skip. Classification and extraction run in a
//! synchronous block so the parsed markup tree never lives across a
//! suspension point; the only awaits are Gateway calls and the sink handoff.
//!
//! Every failure is caught at the loop boundary and isolated to its item:
//! the identity stays terminally in the scheduled-set and the run continues.

use crate::classify::{
    extract_collection_children, extract_hub_children, wikitext, ClassifiedPage, CollectionChild,
    PageClassifier, PageType,
};
use crate::config::CrawlConfig;
use crate::corpus::{
    Collection, CollectionContext, ExtractedPoem, HubContext, PoemInfo, WorkItem,
};
use crate::extract::{self, ExtractError};
use crate::frontier::Frontier;
use crate::gateway::{PageData, PageRef, WikiClient};
use crate::output::{AuditLog, RunStats, TreeLogger};
use crate::sink::SinkHandle;
use scraper::Html;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared state handed to every worker task
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub config: Arc<CrawlConfig>,
    pub client: Arc<WikiClient>,
    pub frontier: Arc<Frontier>,
    pub sink: SinkHandle,
    pub stats: Arc<RunStats>,
    pub audit: Arc<AuditLog>,
    pub tree: Option<Arc<TreeLogger>>,
}

/// Outcome of the synchronous classify/extract stage
enum Analysis {
    Poem(Box<ExtractedPoem>),
    PoemFailed(ExtractError),
    Collection(ClassifiedPage, Vec<CollectionChild>),
    Hub(ClassifiedPage, Vec<String>),
    Skip(ClassifiedPage),
}

/// Drains the frontier until it reports closed-and-idle
pub(crate) async fn worker_loop(ctx: WorkerContext, worker_id: usize) {
    while let Some(item) = ctx.frontier.drain().await {
        if let Err(e) = process_item(&ctx, &item).await {
            tracing::error!(
                "Worker {}: failed on '{}' (id {}, parent '{}'): {}",
                worker_id,
                item.page.title,
                item.page.page_id,
                item.parent_title,
                e
            );
            ctx.stats.record_failed();
        }
        ctx.frontier.task_done();
    }
    tracing::debug!("Worker {} finished: frontier closed and idle", worker_id);
}

/// Processes one drained work item end to end
async fn process_item(ctx: &WorkerContext, item: &WorkItem) -> crate::Result<()> {
    let Some(page) = fetch_resolved(ctx, item).await? else {
        tracing::debug!(
            "No data for '{}' (id {}), skipping",
            item.page.title,
            item.page.page_id
        );
        ctx.stats.record_skipped();
        return Ok(());
    };

    // A redirect may land on an identity another worker already claimed;
    // both identities stay terminally processed either way
    if page.page_id != item.page.page_id && !ctx.frontier.mark_processed(page.page_id) {
        tracing::debug!(
            "Redirect target '{}' (id {}) already processed, discarding",
            page.title,
            page.page_id
        );
        ctx.stats.record_skipped();
        return Ok(());
    }

    let Some(html) = ctx.client.get_rendered_markup(page.page_id).await? else {
        tracing::debug!("No rendered markup for '{}' (id {})", page.title, page.page_id);
        ctx.stats.record_skipped();
        return Ok(());
    };

    match analyze_page(&page, &html, item, &ctx.config) {
        Analysis::Poem(poem) => {
            record_tree(ctx, item, &page.title, PageType::Poem, crate::Signal::VerseStructure);
            ctx.sink.submit(*poem).await?;
            ctx.stats.record_emitted();
            tracing::debug!("Emitted poem '{}' (id {})", page.title, page.page_id);
        }

        Analysis::PoemFailed(e) => {
            tracing::warn!(
                "Page '{}' looked like a poem but failed parsing: {}",
                page.title,
                e
            );
            record_tree(ctx, item, &page.title, PageType::Poem, crate::Signal::VerseStructure);
            ctx.stats.record_skipped();
        }

        Analysis::Collection(classified, children) => {
            tracing::info!(
                "Page '{}' is a POETIC_COLLECTION ({}). Expanding {} children.",
                page.title,
                classified.signal,
                children.len()
            );
            record_tree(ctx, item, &page.title, classified.page_type, classified.signal);
            ctx.audit.log_collection(
                &page.title,
                &page.url,
                &item.parent_title,
                &classified.signal.to_string(),
                children.len(),
            );
            ctx.stats.record_collection();
            expand_collection(ctx, item, &page, &children).await;
            ctx.stats.record_skipped();
        }

        Analysis::Hub(classified, versions) => {
            tracing::info!(
                "Page '{}' is a MULTI_VERSION_HUB ({}). Expanding {} versions.",
                page.title,
                classified.signal,
                versions.len()
            );
            record_tree(ctx, item, &page.title, classified.page_type, classified.signal);
            ctx.audit.log_hub(
                &page.title,
                &page.url,
                &item.parent_title,
                &classified.signal.to_string(),
                versions.len(),
            );
            ctx.stats.record_hub();
            expand_hub(ctx, item, &page, &versions).await;
            ctx.stats.record_skipped();
        }

        Analysis::Skip(classified) => {
            tracing::debug!(
                "Skipping '{}' classified as {} ({})",
                page.title,
                classified.page_type,
                classified.signal
            );
            record_tree(ctx, item, &page.title, classified.page_type, classified.signal);
            ctx.audit.log_other(
                &page.title,
                &page.url,
                &item.parent_title,
                &classified.signal.to_string(),
            );
            ctx.stats.record_skipped();
        }
    }

    Ok(())
}

/// Fetches page data, following wikitext `#REDIRECT` pages up to the hop
/// bound; intermediate identities are marked processed along the way
async fn fetch_resolved(ctx: &WorkerContext, item: &WorkItem) -> crate::Result<Option<PageData>> {
    let Some(mut page) = ctx.client.get_page_data(item.page.page_id).await? else {
        return Ok(None);
    };

    let mut hops = 0;
    while let Some(target) = wikitext::redirect_target(&page.wikitext) {
        hops += 1;
        if hops > ctx.config.heuristics.max_redirect_hops {
            tracing::warn!("Redirect loop detected at '{}', dropping item", page.title);
            return Ok(None);
        }

        tracing::debug!("Following redirect '{}' -> '{}'", page.title, target);
        ctx.frontier.mark_processed(page.page_id);

        let batch = ctx.client.resolve_titles(std::slice::from_ref(&target)).await?;
        let Some(target_ref) = batch.resolve(&target).cloned() else {
            tracing::debug!("Redirect target '{}' does not exist", target);
            return Ok(None);
        };

        match ctx.client.get_page_data(target_ref.page_id).await? {
            Some(resolved) => page = resolved,
            None => return Ok(None),
        }
    }

    Ok(Some(page))
}

/// Synchronous classify/extract stage; the `Html` tree stays inside this call
fn analyze_page(page: &PageData, html: &str, item: &WorkItem, config: &CrawlConfig) -> Analysis {
    let doc = Html::parse_document(html);
    let classifier = PageClassifier::new(page, &doc, &config.lang, &config.heuristics);
    let classified = classifier.classify();

    match classified.page_type {
        PageType::Poem => match extract::extract(
            page,
            &doc,
            &config.lang,
            item.collection.as_ref(),
            item.hub.as_ref(),
            &config.heuristics,
        ) {
            Ok(poem) => Analysis::Poem(Box::new(poem)),
            Err(e) => Analysis::PoemFailed(e),
        },
        PageType::PoeticCollection => Analysis::Collection(
            classified,
            extract_collection_children(&doc, &page.title, &config.heuristics),
        ),
        PageType::MultiVersionHub => {
            Analysis::Hub(classified, extract_hub_children(&doc, &page.title))
        }
        _ => Analysis::Skip(classified),
    }
}

/// Expands a collection page: batch-resolves child titles, builds the
/// complete immutable `Collection`, then submits one work item per resolved
/// poem carrying its ordinal, section and the shared structure
///
/// Ordinals and sections are assigned here, before any child runs, so their
/// assignment is race-free even though extraction completes out of order.
async fn expand_collection(
    ctx: &WorkerContext,
    item: &WorkItem,
    page: &PageData,
    children: &[CollectionChild],
) {
    let titles: Vec<String> = children
        .iter()
        .filter_map(|child| match child {
            CollectionChild::Poem { title } => Some(title.clone()),
            CollectionChild::Section { .. } => None,
        })
        .collect();

    let resolved = resolve_in_batches(ctx, &titles, &page.title).await;

    let author = item
        .group_key
        .split_once(':')
        .map(|(_, name)| name.to_string());
    let mut collection = Collection::new(
        page.page_id,
        page.title.clone(),
        page.url.clone(),
        author,
    );

    let mut entries: Vec<(PageRef, u32, Option<String>)> = Vec::new();
    let mut current_section: Option<String> = None;
    let mut order: u32 = 0;

    for child in children {
        match child {
            CollectionChild::Section { title } => {
                current_section = Some(title.clone());
                collection.push_section(title.clone());
            }
            CollectionChild::Poem { title } => {
                let Some(page_ref) = resolved.get(title) else {
                    tracing::debug!("Child title '{}' of '{}' did not resolve", title, page.title);
                    continue;
                };
                collection.push_poem(PoemInfo {
                    title: page_ref.title.clone(),
                    page_id: page_ref.page_id,
                    url: ctx.client.page_url(&page_ref.title),
                });
                entries.push((page_ref.clone(), order, current_section.clone()));
                order += 1;
            }
        }
    }

    // Freeze the structure before any child can observe it
    let shared = Arc::new(collection);
    let mut submitted = 0;

    for (page_ref, poem_order, section_title) in entries {
        let child_item = WorkItem {
            page: page_ref,
            parent_title: page.title.clone(),
            group_key: item.group_key.clone(),
            hub: item.hub.clone(),
            collection: Some(CollectionContext {
                collection: shared.clone(),
                poem_order,
                section_title,
                is_first: poem_order == 0,
            }),
        };
        if ctx.frontier.submit_if_new(child_item) {
            submitted += 1;
        }
    }

    tracing::info!(
        "Collection '{}': {} poems resolved, {} newly scheduled",
        page.title,
        shared.poem_count(),
        submitted
    );
}

/// Expands a hub page: resolves version links and submits each with this
/// page's identity as the shared group key
async fn expand_hub(ctx: &WorkerContext, item: &WorkItem, page: &PageData, versions: &[String]) {
    let resolved = resolve_in_batches(ctx, versions, &page.title).await;

    let hub = HubContext {
        title: page.title.clone(),
        page_id: page.page_id,
    };

    let mut submitted = 0;
    for title in versions {
        let Some(page_ref) = resolved.get(title) else {
            continue;
        };
        let child_item = WorkItem {
            page: page_ref.clone(),
            parent_title: page.title.clone(),
            group_key: item.group_key.clone(),
            hub: Some(hub.clone()),
            collection: None,
        };
        if ctx.frontier.submit_if_new(child_item) {
            submitted += 1;
        }
    }

    tracing::info!(
        "Hub '{}': {} versions resolved, {} newly scheduled",
        page.title,
        resolved.len(),
        submitted
    );
}

/// Resolves titles in fixed-size batches, tolerating per-batch failures
///
/// A failed batch only drops its own titles; the expansion continues with
/// whatever resolved.
async fn resolve_in_batches(
    ctx: &WorkerContext,
    titles: &[String],
    parent_title: &str,
) -> HashMap<String, PageRef> {
    let mut resolved = HashMap::new();

    for batch in titles.chunks(ctx.config.heuristics.title_batch_size) {
        match ctx.client.resolve_titles(batch).await {
            Ok(result) => {
                for title in batch {
                    if let Some(page_ref) = result.resolve(title) {
                        resolved.insert(title.clone(), page_ref.clone());
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Title batch of '{}' failed to resolve ({} titles): {}",
                    parent_title,
                    batch.len(),
                    e
                );
            }
        }
    }

    resolved
}

fn record_tree(
    ctx: &WorkerContext,
    item: &WorkItem,
    title: &str,
    page_type: PageType,
    signal: crate::Signal,
) {
    if let Some(tree) = &ctx.tree {
        tree.add_node(&item.group_key, &item.parent_title, title, page_type, signal);
    }
}
