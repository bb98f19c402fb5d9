use alloc::vec::Vec;

use crate::key::StateMap;
use crate::offset::{compute_stacked_top, for_each_stacked_top};
use crate::{
    EvaluationReport, FixedPolicy, Generation, Geometry, GeometrySource, HeaderEntry, HeaderId,
    Placement, StackError, StackOptions, StackRegistry, Stacking, Trigger, ViewportEvent,
};

/// Everything the stack remembers about one header between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeaderState {
    pub stacking: Stacking,
    pub placement: Placement,
    /// Last measured rendered height (0 until the first successful measurement).
    pub height: u32,
    /// In-flow offset remembered by [`FixedPolicy::ViewportRelative`]; `None` under the
    /// padding-relative policy.
    pub original_offset_top: Option<u64>,
    /// Whether the last pass could measure this header.
    pub measured: bool,
}

/// A headless engine for stacked sticky headers.
///
/// The stack owns the [`StackRegistry`] and the derived per-header state. It holds no UI objects:
/// the host registers headers with opaque handles, reports viewport events, and runs
/// [`Self::refresh`] (or [`Self::evaluate`]) with a [`GeometrySource`] once per frame. Renderers
/// then read [`Self::stacking`] / [`Self::placement`] for their header.
///
/// One pass is a single prefix walk over the registry, so a tick costs `O(n)` for `n` headers.
/// Every registered header is re-evaluated on every tick, including headers far below the
/// stuck region.
///
/// A clone is independent: it gets its own [`Trigger`] starting at the current generation, so
/// events published to one stack never mark the other dirty.
#[derive(Clone, Debug)]
pub struct StickyStack<H> {
    options: StackOptions<H>,
    registry: StackRegistry<H>,
    states: StateMap,
    evaluated: Option<Generation>,
    deferred: bool,
    passes: u64,
}

impl<H> StickyStack<H> {
    pub fn new(options: StackOptions<H>) -> Self {
        sdebug!(
            policy = ?options.policy,
            enabled = options.enabled,
            top_inset = options.top_inset,
            "StickyStack::new"
        );
        Self {
            options,
            registry: StackRegistry::new(),
            states: StateMap::default(),
            evaluated: None,
            deferred: false,
            passes: 0,
        }
    }

    pub fn options(&self) -> &StackOptions<H> {
        &self.options
    }

    pub fn set_options(&mut self, options: StackOptions<H>) {
        let affects_layout = self.options.affects_layout(&options);
        self.options = options;
        strace!(
            policy = ?self.options.policy,
            enabled = self.options.enabled,
            top_inset = self.options.top_inset,
            "StickyStack::set_options"
        );
        if affects_layout {
            // High-water marks belong to the old configuration.
            for state in self.states.values_mut() {
                state.original_offset_top = None;
            }
            self.registry.notify_external_change();
        }
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut StackOptions<H>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn registry(&self) -> &StackRegistry<H> {
        &self.registry
    }

    pub fn snapshot(&self) -> &[HeaderEntry<H>] {
        self.registry.snapshot()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn contains(&self, id: HeaderId) -> bool {
        self.registry.contains(id)
    }

    /// The shared re-evaluation counter. Viewport listeners publish into a clone of it.
    pub fn trigger(&self) -> &Trigger {
        self.registry.trigger()
    }

    /// Registers a header under a freshly allocated id and returns the id.
    pub fn attach(&mut self, handle: H, padding: H) -> HeaderId {
        let id = self.registry.allocate_id();
        // A fresh id cannot collide.
        let _ = self.registry.register(HeaderEntry::new(id, handle, padding));
        id
    }

    /// Registers a caller-built entry. A duplicate id is ignored and reported.
    pub fn register(&mut self, entry: HeaderEntry<H>) -> Result<(), StackError> {
        self.registry.register(entry)
    }

    /// Unregisters a header and forgets its state. Returns `false` if it was not registered.
    pub fn detach(&mut self, id: HeaderId) -> bool {
        let removed = self.registry.unregister(id).is_some();
        self.states.remove(&id);
        removed
    }

    /// Marks every header dirty without changing registry membership.
    pub fn notify_external_change(&self) -> Generation {
        self.registry.notify_external_change()
    }

    pub fn notify_viewport_event(&self, event: ViewportEvent) -> Generation {
        self.trigger().publish(event)
    }

    pub fn generation(&self) -> Generation {
        self.registry.generation()
    }

    /// The generation of the last completed pass, if any.
    pub fn evaluated_generation(&self) -> Option<Generation> {
        self.evaluated
    }

    /// Whether a pass is due: the generation moved, or the last pass deferred a header.
    pub fn is_dirty(&self) -> bool {
        self.deferred
            || self.evaluated != Some(self.registry.generation())
            || self.trigger().has_pending_detaches()
    }

    /// Number of evaluation passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Runs a pass only if one is due.
    pub fn refresh(&mut self, geometry: &impl GeometrySource<H>) -> Option<EvaluationReport> {
        self.is_dirty().then(|| self.evaluate(geometry))
    }

    /// Unregisters the headers queued through [`Trigger::schedule_detach`].
    fn apply_pending_detaches(&mut self) {
        for id in self.trigger().take_pending_detaches() {
            let _removed = self.detach(id);
            sdebug!(id = id.0, removed = _removed, "StickyStack: deferred detach");
        }
    }

    /// Runs one evaluation tick over every registered header.
    ///
    /// Headers are visited in registry order while the running sum of the rendered heights seen
    /// so far gives each one its `stacked_top`. A header whose geometry is unavailable keeps its
    /// previous state, contributes its last known height, and leaves the stack dirty so the next
    /// [`Self::refresh`] retries it.
    pub fn evaluate(&mut self, geometry: &impl GeometrySource<H>) -> EvaluationReport {
        self.apply_pending_detaches();
        let generation = self.registry.generation();
        let scroll_top = geometry.scroll_top();
        let policy = self.options.policy;
        let enabled = self.options.enabled;

        let measured: Vec<_> = self
            .registry
            .iter()
            .map(|entry| {
                let prev = self.states.get(&entry.id).copied().unwrap_or_default();
                (entry.id, prev, measure_entry(geometry, entry))
            })
            .collect();
        let heights = measured.iter().map(|(_, prev, m)| match m {
            Ok((header, _)) => header.height,
            Err(_) => prev.height,
        });

        let states = &mut self.states;
        let mut evaluated = 0usize;
        let mut changed = 0usize;
        let mut deferred = 0usize;

        for_each_stacked_top(self.options.top_inset as u64, heights, |i, top| {
            let (id, prev, measurement) = &measured[i];
            let prev = *prev;
            let next = match measurement {
                Ok((header, padding)) if enabled => {
                    step(prev, *header, *padding, top, scroll_top, policy)
                }
                Ok((header, _)) => HeaderState {
                    height: header.height,
                    measured: true,
                    ..HeaderState::default()
                },
                Err(_err) => {
                    swarn!(error = %_err, "StickyStack::evaluate: deferring header");
                    deferred += 1;
                    HeaderState {
                        measured: false,
                        ..prev
                    }
                }
            };

            if next.stacking != prev.stacking {
                changed += 1;
            }
            evaluated += 1;
            states.insert(*id, next);
        });

        self.evaluated = Some(generation);
        self.deferred = deferred > 0;
        self.passes = self.passes.saturating_add(1);

        let report = EvaluationReport {
            generation,
            evaluated,
            changed,
            deferred,
        };
        strace!(
            generation = generation.0,
            evaluated,
            changed,
            deferred,
            scroll_top,
            "StickyStack::evaluate"
        );

        if changed > 0 {
            if let Some(cb) = &self.options.on_change {
                cb(self, &report);
            }
        }
        report
    }

    /// Reads the last computed stacking for `id`.
    ///
    /// Never fails: an unknown or not-yet-measured header reports `Stacking::default()` (offset
    /// 0, not fixed).
    pub fn stacking(&self, id: HeaderId) -> Stacking {
        match self.try_stacking(id) {
            Ok(stacking) => stacking,
            Err(StackError::MeasurementUnavailable(_)) => self
                .states
                .get(&id)
                .map(|s| s.stacking)
                .unwrap_or_default(),
            Err(_err) => {
                swarn!(error = %_err, "StickyStack::stacking");
                Stacking::default()
            }
        }
    }

    /// Like [`Self::stacking`], but reports why a value is missing or possibly stale.
    pub fn try_stacking(&self, id: HeaderId) -> Result<Stacking, StackError> {
        if !self.registry.contains(id) {
            return Err(StackError::NotRegistered(id));
        }
        match self.states.get(&id) {
            Some(state) if state.measured => Ok(state.stacking),
            _ => Err(StackError::MeasurementUnavailable(id)),
        }
    }

    /// Offset `id` would be pinned at given the heights recorded by the last pass.
    ///
    /// Agrees with the `stacked_top` of the last pass as long as no header changed height since.
    pub fn stacked_top_of(&self, id: HeaderId) -> Result<u64, StackError> {
        if !self.registry.contains(id) {
            return Err(StackError::NotRegistered(id));
        }
        if !self.options.enabled {
            return Ok(0);
        }
        let above = compute_stacked_top(self.registry.snapshot(), id, |entry| {
            self.states.get(&entry.id).map_or(0, |s| s.height)
        })?;
        Ok((self.options.top_inset as u64).saturating_add(above))
    }

    /// The header mode and placeholder height to render for `id`.
    pub fn placement(&self, id: HeaderId) -> Placement {
        self.header_state(id)
            .map(|s| s.placement)
            .unwrap_or_default()
    }

    pub fn header_state(&self, id: HeaderId) -> Option<&HeaderState> {
        if !self.registry.contains(id) {
            return None;
        }
        self.states.get(&id)
    }

    /// Visits every registered header in stack order together with its last computed state.
    pub fn for_each_header(&self, mut f: impl FnMut(&HeaderEntry<H>, &HeaderState)) {
        let empty = HeaderState::default();
        for entry in self.registry.iter() {
            f(entry, self.states.get(&entry.id).unwrap_or(&empty));
        }
    }

    /// Height of the stuck region: the combined height of every currently fixed header.
    pub fn stack_height(&self) -> u64 {
        let mut total = 0u64;
        self.for_each_header(|_, state| {
            if state.stacking.is_fixed {
                total = total.saturating_add(state.height as u64);
            }
        });
        total
    }
}

impl<H> Default for StickyStack<H> {
    fn default() -> Self {
        Self::new(StackOptions::new())
    }
}

fn measure_entry<H>(
    geometry: &impl GeometrySource<H>,
    entry: &HeaderEntry<H>,
) -> Result<(Geometry, Geometry), StackError> {
    let unavailable = StackError::MeasurementUnavailable(entry.id);
    let header = geometry.measure(&entry.handle).ok_or(unavailable)?;
    let padding = geometry.measure(&entry.padding).ok_or(unavailable)?;
    Ok((header, padding))
}

fn step(
    prev: HeaderState,
    header: Geometry,
    padding: Geometry,
    stacked_top: u64,
    scroll_top: u64,
    policy: FixedPolicy,
) -> HeaderState {
    let original_offset_top = match policy {
        FixedPolicy::PaddingRelative => None,
        FixedPolicy::ViewportRelative => {
            Some(original_offset_top(&prev, header, padding, stacked_top))
        }
    };

    let is_fixed = policy.decide(
        stacked_top,
        padding.bounding_top,
        scroll_top,
        original_offset_top.unwrap_or(0),
    );
    let stacking = Stacking {
        stacked_top,
        is_fixed,
    };

    HeaderState {
        stacking,
        placement: Placement::from_stacking(stacking, header.height),
        height: header.height,
        original_offset_top,
        measured: true,
    }
}

/// Where the header sits in un-fixed flow, for the viewport-relative policy.
///
/// While the header is in flow its own offset is authoritative. Once fixed its offset no longer
/// describes the flow, so the mark is kept; if the stack configuration above it changed, the
/// placeholder (which occupies the header's in-flow slot) supplies the new mark.
fn original_offset_top(
    prev: &HeaderState,
    header: Geometry,
    padding: Geometry,
    stacked_top: u64,
) -> u64 {
    if !prev.placement.is_fixed() {
        return header.offset_top;
    }
    match prev.original_offset_top {
        Some(mark) if prev.stacking.stacked_top == stacked_top => mark,
        _ => padding.offset_top,
    }
}
