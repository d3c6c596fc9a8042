//! Link card hydration.
//!
//! A card renders immediately with whatever its meta carried and is filled
//! in once a preview arrives. [`LinkPreviewSlot`] tracks one card whose URL
//! can change while a fetch is in flight: every URL change bumps a
//! generation counter, and a response carrying an older generation is
//! dropped instead of overwriting the newer state.

use crate::api::{BackendError, LinkPreview, LinkPreviewSource};
use crate::url::normalize_external_url;

use super::{LinkCard, RenderNode};

/// Issued when a fetch starts; hand it back to [`LinkPreviewSlot::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTicket {
    generation: u64,
    url: String,
}

impl PreviewTicket {
    /// The normalized URL to fetch a preview for.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PreviewState {
    #[default]
    Idle,
    Pending,
    Ready(LinkPreview),
    /// The fetch failed; the card stays bare.
    Failed,
}

/// Preview state for a single link card.
#[derive(Debug, Default)]
pub struct LinkPreviewSlot {
    url: Option<String>,
    generation: u64,
    state: PreviewState,
}

impl LinkPreviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points the slot at a new URL.
    ///
    /// Any fetch still in flight becomes stale. Returns a ticket when the URL
    /// normalizes and a fetch should be started.
    pub fn set_url(&mut self, raw: &str) -> Option<PreviewTicket> {
        self.generation += 1;
        self.url = normalize_external_url(raw);
        match &self.url {
            Some(url) => {
                self.state = PreviewState::Pending;
                Some(PreviewTicket {
                    generation: self.generation,
                    url: url.clone(),
                })
            }
            None => {
                self.state = PreviewState::Idle;
                None
            }
        }
    }

    /// Applies a fetch result. Returns `false` if the ticket was superseded.
    pub fn resolve(
        &mut self,
        ticket: PreviewTicket,
        result: Result<LinkPreview, BackendError>,
    ) -> bool {
        if ticket.generation != self.generation {
            log::debug!("Discarding stale link preview for {}", ticket.url);
            return false;
        }
        self.state = match result {
            Ok(preview) => PreviewState::Ready(preview),
            Err(err) => {
                log::debug!("Link preview failed for {}: {err}", ticket.url);
                PreviewState::Failed
            }
        };
        true
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// The card as it should currently be displayed.
    pub fn card(&self) -> Option<LinkCard> {
        let mut card = LinkCard::new(self.url.clone()?, None);
        if let PreviewState::Ready(preview) = &self.state {
            card.apply_preview(preview);
        }
        Some(card)
    }
}

impl LinkCard {
    /// Fills the card from a preview. The card keeps its own URL. A thumbnail
    /// that fails URL normalization is ignored.
    pub fn apply_preview(&mut self, preview: &LinkPreview) {
        let non_empty = |s: &Option<String>| s.clone().filter(|v| !v.trim().is_empty());
        self.title = non_empty(&preview.title).or(self.title.take());
        self.desc = non_empty(&preview.desc).or(self.desc.take());
        self.image = preview
            .image
            .as_deref()
            .and_then(normalize_external_url)
            .or(self.image.take());
        self.site_name = non_empty(&preview.site_name).or(self.site_name.take());
    }
}

/// Fetches previews for every link card that has nothing but a URL.
///
/// Fetches run one after another. A failed fetch leaves its card bare.
/// Returns how many cards were filled in.
pub async fn hydrate_link_cards(nodes: &mut [RenderNode], source: &dyn LinkPreviewSource) -> usize {
    let mut hydrated = 0;
    for node in nodes.iter_mut() {
        let RenderNode::LinkCard(card) = node else {
            continue;
        };
        if !card.needs_preview() {
            continue;
        }
        match source.link_preview(&card.url).await {
            Ok(preview) => {
                card.apply_preview(&preview);
                hydrated += 1;
            }
            Err(err) => log::debug!("Link preview failed for {}: {err}", card.url),
        }
    }
    hydrated
}
