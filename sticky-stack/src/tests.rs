use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        let span = (end_exclusive - start) as u64;
        start + (self.next_u64() % span) as u32
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

#[derive(Clone, Copy, Debug)]
struct Card {
    id: HeaderId,
    header: u32,
    content: u32,
    placement: Placement,
}

/// A minimal vertical document: `lead` pixels of unrelated content, then cards of
/// `[padding][header][content]`. Header handles are `2 * i`, padding handles `2 * i + 1`.
#[derive(Debug, Default)]
struct Page {
    lead: u64,
    cards: Vec<Option<Card>>,
    scroll: u64,
}

impl Page {
    fn with_lead(lead: u64) -> Self {
        Self {
            lead,
            ..Self::default()
        }
    }

    fn push(&mut self, stack: &mut StickyStack<usize>, header: u32, content: u32) -> HeaderId {
        let slot = self.cards.len();
        let id = stack.attach(2 * slot, 2 * slot + 1);
        self.cards.push(Some(Card {
            id,
            header,
            content,
            placement: Placement::unfixed(),
        }));
        id
    }

    fn remove(&mut self, stack: &mut StickyStack<usize>, id: HeaderId) {
        for slot in self.cards.iter_mut() {
            if slot.is_some_and(|c| c.id == id) {
                *slot = None;
            }
        }
        assert!(stack.detach(id), "header should have been registered");
    }

    /// Copies the stack's placements into the page, as a renderer would.
    fn apply(&mut self, stack: &StickyStack<usize>) {
        for card in self.cards.iter_mut().flatten() {
            card.placement = stack.placement(card.id);
        }
    }

    fn tick(&mut self, stack: &mut StickyStack<usize>) -> EvaluationReport {
        let report = stack.evaluate(&*self);
        self.apply(stack);
        report
    }

    fn document_height(&self) -> u64 {
        let mut y = self.lead;
        for card in self.cards.iter().flatten() {
            y += card.placement.padding_height as u64;
            if !card.placement.is_fixed() {
                y += card.header as u64;
            }
            y += card.content as u64;
        }
        y
    }
}

impl GeometrySource<usize> for Page {
    fn measure(&self, handle: &usize) -> Option<Geometry> {
        let slot = handle / 2;
        let is_padding = handle % 2 == 1;
        let mut y = self.lead;
        for (i, card) in self.cards.iter().enumerate() {
            let Some(card) = card else { continue };
            let padding_top = y;
            y += card.placement.padding_height as u64;
            let header_top = match card.placement.header {
                HeaderPosition::Fixed { top } => self.scroll + top,
                HeaderPosition::InFlow => {
                    let top = y;
                    y += card.header as u64;
                    top
                }
            };
            if i == slot {
                let (height, offset_top) = if is_padding {
                    (card.placement.padding_height, padding_top)
                } else {
                    (card.header, header_top)
                };
                return Some(Geometry {
                    height,
                    offset_top,
                    bounding_top: offset_top as i64 - self.scroll as i64,
                });
            }
            y += card.content as u64;
        }
        None
    }

    fn scroll_top(&self) -> u64 {
        self.scroll
    }
}

#[derive(Debug, Default)]
struct StaticGeometry {
    by_handle: HashMap<usize, Geometry>,
    scroll: u64,
}

impl GeometrySource<usize> for StaticGeometry {
    fn measure(&self, handle: &usize) -> Option<Geometry> {
        self.by_handle.get(handle).copied()
    }

    fn scroll_top(&self) -> u64 {
        self.scroll
    }
}

fn stacked_tops(stack: &StickyStack<usize>, ids: &[HeaderId]) -> Vec<u64> {
    ids.iter().map(|&id| stack.stacking(id).stacked_top).collect()
}

#[test]
fn three_fixed_headers_stack_by_cumulative_height() {
    let mut stack = StickyStack::default();
    let mut page = Page::default();
    let ids = [
        page.push(&mut stack, 40, 200),
        page.push(&mut stack, 60, 200),
        page.push(&mut stack, 50, 200),
    ];
    page.scroll = 2_000;
    page.tick(&mut stack);

    assert_eq!(stacked_tops(&stack, &ids), [0, 40, 100]);
    assert!(ids.iter().all(|&id| stack.stacking(id).is_fixed));
    assert_eq!(stack.stack_height(), 150);
}

#[test]
fn unmounting_a_fixed_header_shifts_the_ones_below_it() {
    let mut stack = StickyStack::default();
    let mut page = Page::default();
    let first = page.push(&mut stack, 40, 200);
    let second = page.push(&mut stack, 60, 200);
    let third = page.push(&mut stack, 50, 200);
    page.scroll = 2_000;
    page.tick(&mut stack);
    assert_eq!(stack.stacking(third).stacked_top, 100);

    page.remove(&mut stack, second);
    page.tick(&mut stack);

    assert_eq!(stack.stacking(first).stacked_top, 0);
    assert_eq!(stack.stacking(third).stacked_top, 40);
    assert_eq!(stack.stacking(second), Stacking::default());
    assert!(stack.header_state(second).is_none());
}

#[test]
fn reregistering_never_reuses_ids_or_references_removed_entries() {
    let mut stack = StickyStack::default();
    let mut page = Page::default();
    let a = page.push(&mut stack, 40, 100);
    let b = page.push(&mut stack, 60, 100);
    page.remove(&mut stack, b);
    let c = page.push(&mut stack, 10, 100);
    let d = page.push(&mut stack, 20, 100);
    assert_ne!(b, c);
    assert!(c > b);

    page.scroll = 10_000;
    page.tick(&mut stack);
    // `b`'s 60px must not leak into anyone's offset.
    assert_eq!(stacked_tops(&stack, &[a, c, d]), [0, 40, 50]);
}

#[test]
fn viewport_relative_flips_strictly_past_the_original_offset() {
    let mut stack = StickyStack::new(StackOptions::new().with_policy(FixedPolicy::ViewportRelative));
    let mut page = Page::with_lead(300);
    let id = page.push(&mut stack, 40, 500);

    page.scroll = 300;
    page.tick(&mut stack);
    assert!(!stack.stacking(id).is_fixed, "equality is not fixed");
    assert_eq!(stack.header_state(id).unwrap().original_offset_top, Some(300));

    page.scroll = 301;
    page.tick(&mut stack);
    assert!(stack.stacking(id).is_fixed);
    // The mark survives the header leaving the flow.
    assert_eq!(stack.header_state(id).unwrap().original_offset_top, Some(300));

    page.scroll = 300;
    page.tick(&mut stack);
    assert!(!stack.stacking(id).is_fixed);
}

#[test]
fn padding_relative_flips_strictly_past_the_placeholder() {
    let mut stack = StickyStack::default();
    let mut page = Page::with_lead(300);
    let id = page.push(&mut stack, 40, 500);

    for (scroll, fixed) in [(0, false), (299, false), (300, false), (301, true), (900, true), (300, false)] {
        page.scroll = scroll;
        page.tick(&mut stack);
        assert_eq!(stack.stacking(id).is_fixed, fixed, "scroll={scroll}");
    }
}

#[test]
fn both_policies_agree_on_a_scroll_sweep() {
    let mut padding = StickyStack::default();
    let mut viewport =
        StickyStack::new(StackOptions::new().with_policy(FixedPolicy::ViewportRelative));
    let mut page_p = Page::with_lead(50);
    let mut page_v = Page::with_lead(50);
    let mut ids_p = Vec::new();
    let mut ids_v = Vec::new();
    for (h, c) in [(40, 120), (60, 80), (50, 300), (30, 90)] {
        ids_p.push(page_p.push(&mut padding, h, c));
        ids_v.push(page_v.push(&mut viewport, h, c));
    }

    let sweep = (0..900).step_by(7).chain((0..900).rev().step_by(11));
    for scroll in sweep {
        page_p.scroll = scroll;
        page_v.scroll = scroll;
        page_p.tick(&mut padding);
        page_v.tick(&mut viewport);
        for (&p, &v) in ids_p.iter().zip(&ids_v) {
            assert_eq!(padding.stacking(p), viewport.stacking(v), "scroll={scroll}");
        }
    }
}

#[test]
fn viewport_relative_mark_is_refreshed_when_the_stack_above_changes() {
    let mut stack = StickyStack::new(StackOptions::new().with_policy(FixedPolicy::ViewportRelative));
    let mut page = Page::with_lead(100);
    let first = page.push(&mut stack, 40, 200);
    let second = page.push(&mut stack, 30, 200);

    page.scroll = 310;
    page.tick(&mut stack);
    assert!(stack.stacking(first).is_fixed);
    assert!(stack.stacking(second).is_fixed);
    assert_eq!(stack.header_state(second).unwrap().original_offset_top, Some(340));

    page.remove(&mut stack, first);
    page.tick(&mut stack);
    let state = stack.header_state(second).unwrap();
    assert_eq!(state.stacking.stacked_top, 0);
    assert_eq!(state.original_offset_top, Some(100));
    assert!(state.stacking.is_fixed);

    page.scroll = 50;
    page.tick(&mut stack);
    assert!(!stack.stacking(second).is_fixed);
}

#[test]
fn fixed_decision_is_pure() {
    for (top, bounding) in [(0, 0), (0, -1), (40, 39), (40, 40), (40, 41), (u64::MAX, i64::MIN)] {
        let a = is_fixed_padding_relative(top, bounding);
        let b = is_fixed_padding_relative(top, bounding);
        assert_eq!(a, b);
    }
    assert!(!is_fixed_padding_relative(40, 40));
    assert!(is_fixed_padding_relative(40, 39));
    assert!(!is_fixed_viewport_relative(100, 0, 100));
    assert!(is_fixed_viewport_relative(101, 0, 100));
    assert_eq!(
        FixedPolicy::PaddingRelative.decide(10, 5, 0, 0),
        FixedPolicy::PaddingRelative.decide(10, 5, 999, 999)
    );
}

#[test]
fn placeholder_takes_the_header_height_in_the_same_tick() {
    let mut stack = StickyStack::default();
    let mut page = Page::with_lead(100);
    let id = page.push(&mut stack, 48, 400);
    page.tick(&mut stack);
    assert_eq!(stack.placement(id), Placement::unfixed());
    let before = page.document_height();

    page.scroll = 150;
    let report = stack.evaluate(&page);
    assert_eq!(report.changed, 1);
    let placement = stack.placement(id);
    assert_eq!(placement.header, HeaderPosition::Fixed { top: 0 });
    assert_eq!(placement.padding_height, 48);

    page.apply(&stack);
    assert_eq!(page.document_height(), before);
}

#[test]
fn fixing_a_header_does_not_move_the_placeholders_below_it() {
    let mut stack = StickyStack::default();
    let mut page = Page::default();
    let _first = page.push(&mut stack, 40, 200);
    let second = page.push(&mut stack, 60, 200);
    page.tick(&mut stack);
    let padding_before = page.measure(&3).unwrap().offset_top;

    page.scroll = 10;
    page.tick(&mut stack);
    assert_eq!(page.measure(&3).unwrap().offset_top, padding_before);
    assert!(!stack.stacking(second).is_fixed);

    // A second pass over the same scroll offset is stable.
    let report = page.tick(&mut stack);
    assert_eq!(report.changed, 0);
}

#[test]
fn resize_without_membership_change_still_recomputes() {
    let mut stack = StickyStack::default();
    let mut page = Page::default();
    page.push(&mut stack, 40, 200);
    assert!(stack.refresh(&page).is_some());
    assert!(stack.refresh(&page).is_none());
    let passes = stack.passes();

    stack.notify_viewport_event(ViewportEvent::Resize);
    assert!(stack.is_dirty());
    let report = stack.refresh(&page).expect("resize should force a pass");
    assert_eq!(report.evaluated, 1);
    assert_eq!(stack.passes(), passes + 1);
    assert_eq!(stack.trigger().resize_count(), 1);
    assert_eq!(stack.trigger().scroll_count(), 0);
}

#[test]
fn many_events_in_one_frame_cost_one_pass() {
    let mut stack = StickyStack::default();
    let mut page = Page::default();
    page.push(&mut stack, 40, 200);
    page.tick(&mut stack);
    let passes = stack.passes();

    for _ in 0..10 {
        stack.notify_viewport_event(ViewportEvent::Scroll);
    }
    assert!(stack.refresh(&page).is_some());
    assert!(stack.refresh(&page).is_none());
    assert_eq!(stack.passes(), passes + 1);
    assert_eq!(stack.trigger().scroll_count(), 10);
}

#[test]
fn unknown_headers_degrade_to_offset_zero() {
    let mut stack: StickyStack<usize> = StickyStack::default();
    let ghost = HeaderId(42);
    assert_eq!(stack.stacking(ghost), Stacking::default());
    assert_eq!(stack.try_stacking(ghost), Err(StackError::NotRegistered(ghost)));
    assert_eq!(stack.placement(ghost), Placement::unfixed());
    assert!(!stack.detach(ghost));

    let id = stack.attach(0, 1);
    assert_eq!(stack.try_stacking(id), Err(StackError::MeasurementUnavailable(id)));
    assert_eq!(stack.stacking(id), Stacking::default());
}

#[test]
fn compute_stacked_top_reports_missing_entries() {
    let entries = [
        HeaderEntry::new(HeaderId(1), 0usize, 1usize),
        HeaderEntry::new(HeaderId(2), 2, 3),
        HeaderEntry::new(HeaderId(3), 4, 5),
    ];
    let heights = |e: &HeaderEntry<usize>| [40u32, 60, 50][e.handle / 2];
    assert_eq!(compute_stacked_top(&entries, HeaderId(1), heights), Ok(0));
    assert_eq!(compute_stacked_top(&entries, HeaderId(3), heights), Ok(100));
    assert_eq!(
        compute_stacked_top(&entries, HeaderId(9), heights),
        Err(StackError::NotRegistered(HeaderId(9)))
    );

    let mut tops = Vec::new();
    let end = for_each_stacked_top(5, [40, 60, 50], |i, top| tops.push((i, top)));
    assert_eq!(tops, [(0, 5), (1, 45), (2, 105)]);
    assert_eq!(end, 155);
}

#[test]
fn duplicate_registration_is_ignored() {
    let mut registry = StackRegistry::new();
    let id = registry.allocate_id();
    assert_eq!(registry.register(HeaderEntry::new(id, 0usize, 1usize)), Ok(()));
    let generation = registry.generation();
    assert_eq!(
        registry.register(HeaderEntry::new(id, 7, 8)),
        Err(StackError::DuplicateRegistration(id))
    );
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(id).map(|e| e.handle), Some(0));
    assert_eq!(registry.generation(), generation);

    // Externally chosen ids push the allocator past them.
    registry
        .register(HeaderEntry::new(HeaderId(10), 2, 3))
        .unwrap();
    assert_eq!(registry.allocate_id(), HeaderId(11));
}

#[test]
fn registry_keeps_mount_order_across_removals() {
    let mut registry = StackRegistry::new();
    let ids: Vec<_> = (0..5usize)
        .map(|i| {
            let id = registry.allocate_id();
            registry.register(HeaderEntry::new(id, 2 * i, 2 * i + 1)).unwrap();
            id
        })
        .collect();
    assert!(registry.unregister(ids[1]).is_some());
    assert!(registry.unregister(ids[1]).is_none());
    assert!(registry.unregister(ids[3]).is_some());

    let order: Vec<_> = registry.iter().map(|e| e.id).collect();
    assert_eq!(order, [ids[0], ids[2], ids[4]]);
    assert_eq!(registry.position(ids[4]), Some(2));
}

#[test]
fn unmeasurable_headers_keep_their_state_and_retry() {
    let mut stack = StickyStack::default();
    let mut geometry = StaticGeometry {
        scroll: 1_000,
        ..StaticGeometry::default()
    };
    let a = stack.attach(0usize, 1usize);
    let b = stack.attach(2, 3);
    let c = stack.attach(4, 5);
    for (handle, height, top) in [(0, 40, 0), (2, 60, 300), (4, 50, 600)] {
        geometry.by_handle.insert(handle, Geometry {
            height,
            offset_top: top,
            bounding_top: top as i64 - 1_000,
        });
        geometry.by_handle.insert(handle + 1, Geometry {
            height: 0,
            offset_top: top,
            bounding_top: top as i64 - 1_000,
        });
    }
    stack.evaluate(&geometry);
    assert_eq!(stacked_tops(&stack, &[a, b, c]), [0, 40, 100]);

    geometry.by_handle.remove(&3);
    let report = stack.evaluate(&geometry);
    assert_eq!(report.deferred, 1);
    assert!(stack.is_dirty());
    assert_eq!(stack.try_stacking(b), Err(StackError::MeasurementUnavailable(b)));
    // Stale but usable, and its last known height still counts for `c`.
    assert_eq!(stack.stacking(b).stacked_top, 40);
    assert_eq!(stack.stacking(c).stacked_top, 100);

    geometry.by_handle.insert(3, Geometry {
        height: 0,
        offset_top: 300,
        bounding_top: -700,
    });
    let report = stack.refresh(&geometry).expect("deferred header should be retried");
    assert_eq!(report.deferred, 0);
    assert!(!stack.is_dirty());
    assert!(stack.try_stacking(b).is_ok());
}

#[test]
fn stacked_top_is_the_prefix_sum_for_random_membership() {
    let mut rng = Lcg::new(0x5eed);
    for _round in 0..50 {
        let mut stack = StickyStack::default();
        let mut geometry = StaticGeometry::default();
        let mut live: Vec<(HeaderId, usize)> = Vec::new();
        let mut next_handle = 0usize;

        for _op in 0..40 {
            if live.is_empty() || rng.gen_bool() || rng.gen_bool() {
                let height = rng.gen_range_u32(0, 120);
                let handle = next_handle;
                next_handle += 2;
                geometry.by_handle.insert(handle, Geometry {
                    height,
                    offset_top: 0,
                    bounding_top: 0,
                });
                geometry.by_handle.insert(handle + 1, Geometry::default());
                live.push((stack.attach(handle, handle + 1), handle));
            } else {
                let victim = rng.gen_range_u32(0, live.len() as u32) as usize;
                let (id, _) = live.remove(victim);
                assert!(stack.detach(id));
            }

            stack.evaluate(&geometry);
            let mut expected = 0u64;
            for &(id, handle) in &live {
                assert_eq!(stack.stacking(id).stacked_top, expected);
                expected += geometry.by_handle[&handle].height as u64;
            }
        }
    }
}

#[test]
fn disabled_stack_renders_everything_in_flow() {
    let mut stack = StickyStack::new(StackOptions::new().with_enabled(false));
    let mut page = Page::default();
    let a = page.push(&mut stack, 40, 100);
    let b = page.push(&mut stack, 40, 100);
    page.scroll = 5_000;
    page.tick(&mut stack);
    assert_eq!(stack.stacking(a), Stacking::default());
    assert_eq!(stack.stacking(b), Stacking::default());
    assert_eq!(stack.stack_height(), 0);

    stack.update_options(|o| o.enabled = true);
    assert!(stack.is_dirty());
    page.tick(&mut stack);
    assert_eq!(stacked_tops(&stack, &[a, b]), [0, 40]);
    assert!(stack.stacking(b).is_fixed);
}

#[test]
fn top_inset_offsets_the_whole_stack() {
    let mut stack = StickyStack::new(StackOptions::new().with_top_inset(64));
    let mut page = Page::default();
    let a = page.push(&mut stack, 40, 300);
    let b = page.push(&mut stack, 60, 300);

    page.scroll = 0;
    page.tick(&mut stack);
    assert_eq!(stacked_tops(&stack, &[a, b]), [64, 104]);
    assert!(stack.stacking(a).is_fixed, "padding at 0 is above the 64px inset");

    page.scroll = 5_000;
    page.tick(&mut stack);
    assert_eq!(stack.placement(b).fixed_top(), Some(104));
}

#[test]
fn on_change_fires_once_per_changing_pass() {
    let calls = Arc::new(AtomicUsize::new(0));
    let opts = StackOptions::new().with_on_change(Some({
        let calls = Arc::clone(&calls);
        move |stack: &StickyStack<usize>, report: &EvaluationReport| {
            assert!(report.changed > 0);
            assert_eq!(report.evaluated, stack.len());
            calls.fetch_add(1, Ordering::Relaxed);
        }
    }));
    let mut stack = StickyStack::new(opts);
    let mut page = Page::with_lead(100);
    page.push(&mut stack, 40, 300);
    page.push(&mut stack, 40, 300);

    page.tick(&mut stack);
    // First pass moves the second header from the default offset to 40.
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    page.tick(&mut stack);
    assert_eq!(calls.load(Ordering::Relaxed), 1);

    page.scroll = 150;
    page.tick(&mut stack);
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[test]
fn triggers_are_shared_between_clones() {
    let trigger = Trigger::new();
    let listener = trigger.clone();
    assert!(trigger.same_as(&listener));
    assert!(!trigger.same_as(&Trigger::new()));

    let before = trigger.generation();
    listener.publish(ViewportEvent::Scroll);
    assert!(trigger.generation() > before);

    let registry: StackRegistry<usize> = StackRegistry::with_trigger(trigger.clone());
    let g = registry.notify_external_change();
    assert_eq!(trigger.generation(), g);
    assert_eq!(registry.len(), 0);
}

#[test]
fn queued_detach_is_applied_by_the_next_pass() {
    let mut stack = StickyStack::default();
    let mut page = Page::default();
    let first = page.push(&mut stack, 40, 200);
    let second = page.push(&mut stack, 60, 200);
    let third = page.push(&mut stack, 50, 200);
    page.scroll = 2_000;
    page.tick(&mut stack);
    assert!(!stack.is_dirty());

    stack.trigger().schedule_detach(second);
    page.cards[1] = None;
    assert!(stack.is_dirty());
    assert_eq!(stack.len(), 3, "removal waits for the next pass");

    stack.refresh(&page).expect("a queued detach should force a pass");
    page.apply(&stack);
    assert_eq!(stack.len(), 2);
    assert!(!stack.contains(second));
    assert_eq!(stacked_tops(&stack, &[first, third]), [0, 40]);
    assert!(!stack.trigger().has_pending_detaches());

    // Ids that are already gone are ignored.
    stack.trigger().schedule_detach(second);
    stack.refresh(&page).expect("the bump alone forces a pass");
    assert_eq!(stack.len(), 2);
}

#[test]
fn cloned_stack_has_its_own_trigger() {
    let mut stack = StickyStack::default();
    let mut page = Page::default();
    let id = page.push(&mut stack, 40, 200);
    page.tick(&mut stack);

    let mut copy = stack.clone();
    assert!(!copy.trigger().same_as(stack.trigger()));
    assert_eq!(copy.generation(), stack.generation());
    assert!(!copy.is_dirty());
    assert_eq!(copy.stacking(id), stack.stacking(id));

    copy.attach(100, 101);
    assert!(copy.is_dirty());
    assert!(!stack.is_dirty());

    stack.notify_viewport_event(ViewportEvent::Resize);
    assert_eq!(copy.trigger().resize_count(), 0);
}

#[test]
fn stacked_top_of_agrees_with_the_last_pass() {
    let mut stack = StickyStack::new(StackOptions::new().with_top_inset(10));
    let mut page = Page::default();
    let ids = [
        page.push(&mut stack, 40, 200),
        page.push(&mut stack, 60, 200),
        page.push(&mut stack, 50, 200),
    ];
    page.scroll = 300;
    page.tick(&mut stack);

    for &id in &ids {
        assert_eq!(stack.stacked_top_of(id), Ok(stack.stacking(id).stacked_top));
    }
    assert_eq!(stack.stacked_top_of(ids[2]), Ok(110));
    assert_eq!(
        stack.stacked_top_of(HeaderId(99)),
        Err(StackError::NotRegistered(HeaderId(99)))
    );

    stack.update_options(|o| o.enabled = false);
    page.tick(&mut stack);
    assert_eq!(stack.stacked_top_of(ids[2]), Ok(0));
}
