//! Mapping a work item to the URL to download.

use crate::error::ItemError;
use crate::events::EventSink;
use crate::input::WorkItem;
use crate::service::VideoService;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub item: WorkItem,
    pub url: String,
    /// Title of the search hit, when the item was a search phrase.
    pub matched_title: Option<String>,
}

/// URLs pass through untouched; anything else is searched and the top hit wins.
pub async fn resolve<S: VideoService>(
    service: &S,
    item: &WorkItem,
    events: &EventSink,
) -> Result<ResolvedTarget, ItemError> {
    if item.is_url() {
        return Ok(ResolvedTarget {
            item: item.clone(),
            url: item.as_str().to_string(),
            matched_title: None,
        });
    }

    events.info(format!("Searching: {}", item));
    let hits = service.search(item.as_str()).await?;
    let top = hits
        .into_iter()
        .next()
        .ok_or_else(|| ItemError::NoSearchResults(item.to_string()))?;

    events.info(format!("Found: {} ({})", top.title, top.url));
    Ok(ResolvedTarget {
        item: item.clone(),
        url: top.url,
        matched_title: Some(top.title),
    })
}
