use alloc::vec::Vec;

use sticky_stack::{Geometry, GeometrySource, HeaderPosition, Placement, ViewportEvent};

use crate::{Host, SubscriptionId, ViewportCallback};

/// Handle of an element in a [`MemoryHost`] document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

/// The two elements a card contributes to the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardNodes {
    pub header: NodeId,
    pub padding: NodeId,
}

#[derive(Clone, Copy, Debug)]
struct Card {
    nodes: CardNodes,
    header_height: u32,
    content_height: u32,
    placement: Placement,
    attached: bool,
}

/// An in-memory host with a single vertical document.
///
/// The document is `lead` pixels of unrelated content followed by cards laid out as
/// `[padding placeholder][header][content]`. Layout is recomputed on every measurement from the
/// placements last applied, so a header taken out of flow moves everything below it unless its
/// placeholder compensates, exactly as a browser would.
///
/// Scroll offsets are clamped to the document height; `scroll_to` and `resize` dispatch the
/// matching viewport event to subscribed listeners.
pub struct MemoryHost {
    viewport_height: u32,
    lead: u64,
    scroll: u64,
    cards: Vec<Card>,
    next_node: u32,
    listeners: Vec<(SubscriptionId, ViewportEvent, ViewportCallback)>,
    next_subscription: u64,
}

impl MemoryHost {
    pub fn new(viewport_height: u32) -> Self {
        Self {
            viewport_height,
            lead: 0,
            scroll: 0,
            cards: Vec::new(),
            next_node: 0,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Sets the height of the content above the first card.
    pub fn with_lead(mut self, lead: u64) -> Self {
        self.lead = lead;
        self
    }

    pub fn push_card(&mut self, header_height: u32, content_height: u32) -> CardNodes {
        let nodes = CardNodes {
            padding: NodeId(self.next_node),
            header: NodeId(self.next_node + 1),
        };
        self.next_node += 2;
        self.cards.push(Card {
            nodes,
            header_height,
            content_height,
            placement: Placement::unfixed(),
            attached: true,
        });
        nodes
    }

    /// Removes the card owning `header`. Returns `false` if there is no such card.
    pub fn remove_card(&mut self, header: NodeId) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.nodes.header != header);
        let removed = self.cards.len() != before;
        if removed {
            self.scroll = self.scroll.min(self.max_scroll());
        }
        removed
    }

    pub fn set_header_height(&mut self, header: NodeId, height: u32) -> bool {
        let Some(card) = self.card_mut(header) else {
            return false;
        };
        card.header_height = height;
        true
    }

    /// Detaches (or re-attaches) a card's elements from the rendered surface; detached elements
    /// cannot be measured.
    pub fn set_attached(&mut self, header: NodeId, attached: bool) -> bool {
        let Some(card) = self.card_mut(header) else {
            return false;
        };
        card.attached = attached;
        true
    }

    /// Renders a placement: moves the header in or out of flow and sizes its placeholder.
    pub fn apply_placement(&mut self, header: NodeId, placement: Placement) -> bool {
        let Some(card) = self.card_mut(header) else {
            return false;
        };
        card.placement = placement;
        true
    }

    pub fn placement_of(&self, header: NodeId) -> Option<Placement> {
        self.card(header).map(|c| c.placement)
    }

    /// Scrolls the document (clamped) and dispatches [`ViewportEvent::Scroll`].
    pub fn scroll_to(&mut self, offset: u64) -> u64 {
        self.scroll = offset.min(self.max_scroll());
        self.dispatch(ViewportEvent::Scroll);
        self.scroll
    }

    /// Resizes the viewport and dispatches [`ViewportEvent::Resize`].
    pub fn resize(&mut self, viewport_height: u32) {
        self.viewport_height = viewport_height;
        self.scroll = self.scroll.min(self.max_scroll());
        self.dispatch(ViewportEvent::Resize);
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn document_height(&self) -> u64 {
        let mut y = self.lead;
        for card in &self.cards {
            y += card.placement.padding_height as u64;
            if !card.placement.is_fixed() {
                y += card.header_height as u64;
            }
            y += card.content_height as u64;
        }
        y
    }

    pub fn max_scroll(&self) -> u64 {
        self.document_height()
            .saturating_sub(self.viewport_height as u64)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    fn dispatch(&mut self, event: ViewportEvent) {
        for (_, kind, callback) in self.listeners.iter_mut() {
            if *kind == event {
                callback(event);
            }
        }
    }

    fn card(&self, header: NodeId) -> Option<&Card> {
        self.cards.iter().find(|c| c.nodes.header == header)
    }

    fn card_mut(&mut self, header: NodeId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.nodes.header == header)
    }

    fn geometry(&self, offset_top: u64, height: u32) -> Geometry {
        Geometry {
            height,
            offset_top,
            bounding_top: offset_top as i64 - self.scroll as i64,
        }
    }
}

impl GeometrySource<NodeId> for MemoryHost {
    fn measure(&self, handle: &NodeId) -> Option<Geometry> {
        let mut y = self.lead;
        for card in &self.cards {
            let padding_top = y;
            y += card.placement.padding_height as u64;
            let header_top = match card.placement.header {
                HeaderPosition::Fixed { top } => self.scroll + top,
                HeaderPosition::InFlow => {
                    let top = y;
                    y += card.header_height as u64;
                    top
                }
            };

            if *handle == card.nodes.padding {
                return card
                    .attached
                    .then(|| self.geometry(padding_top, card.placement.padding_height));
            }
            if *handle == card.nodes.header {
                return card
                    .attached
                    .then(|| self.geometry(header_top, card.header_height));
            }
            y += card.content_height as u64;
        }
        None
    }

    fn scroll_top(&self) -> u64 {
        self.scroll
    }
}

impl Host<NodeId> for MemoryHost {
    fn subscribe(&mut self, kind: ViewportEvent, callback: ViewportCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, kind, callback));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(sub, _, _)| *sub != id);
    }
}

impl core::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryHost")
            .field("viewport_height", &self.viewport_height)
            .field("lead", &self.lead)
            .field("scroll", &self.scroll)
            .field("cards", &self.cards.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
