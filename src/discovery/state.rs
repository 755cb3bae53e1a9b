//! Discovery state machine.
//!
//! Per condition: `Hidden` → `Scanning` → `Discovered`. Scanning time
//! accumulates while the reveal mask center is within the scan radius of
//! the condition's projected marker. A context switch is a full reset.

use glam::{Vec2, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};

use super::condition::Condition;
use super::events::{DiscoveryEvent, DiscoveryMethod};
use super::registry::ConditionRegistry;
use crate::camera::core::Ray;
use crate::scene::AnatomyContext;

/// Slack when comparing accumulated against required scan time, so a
/// whole number of fixed-rate frames completes on the expected frame.
const COMPLETION_EPSILON: f32 = 1e-4;

/// Lifecycle of one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionState {
    /// Not shown in the active context.
    Hidden,
    /// Marker placed, accumulating proximity time.
    Scanning,
    /// Terminal until the next context switch.
    Discovered,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    state: ConditionState,
    position: Vec3,
    /// Machine clock when scanning started.
    scan_started: f64,
}

/// Read-only view of one condition's progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEntry {
    /// Condition id.
    pub id: String,
    /// Lifecycle state.
    pub state: ConditionState,
    /// Accumulated scan seconds.
    pub accumulated: f32,
    /// Required scan seconds.
    pub required: f32,
}

/// Owner of all discovery progress. Nothing else writes it.
#[derive(Debug, Clone)]
pub struct DiscoveryMachine {
    registry: ConditionRegistry,
    entries: Vec<Entry>,
    progress: FxHashMap<String, f32>,
    discovered: FxHashSet<String>,
    discovery_order: Vec<String>,
    context: AnatomyContext,
    scan_radius: f32,
    // Viewport width / height; stretches horizontal mask distances so the
    // scan zone matches the drawn circle.
    aspect: f32,
    clock: f64,
}

impl DiscoveryMachine {
    /// Create a machine with every condition `Hidden`. Call
    /// [`switch_context`](Self::switch_context) to place markers.
    #[must_use]
    pub fn new(registry: ConditionRegistry, scan_radius: f32) -> Self {
        let entries = registry
            .conditions()
            .iter()
            .map(|c| Entry {
                state: ConditionState::Hidden,
                position: c.position(),
                scan_started: 0.0,
            })
            .collect();
        Self {
            registry,
            entries,
            progress: FxHashMap::default(),
            discovered: FxHashSet::default(),
            discovery_order: Vec::new(),
            context: AnatomyContext::default(),
            scan_radius,
            aspect: 1.0,
            clock: 0.0,
        }
    }

    /// Condition table.
    #[must_use]
    pub fn registry(&self) -> &ConditionRegistry {
        &self.registry
    }

    /// Active context.
    #[must_use]
    pub fn context(&self) -> AnatomyContext {
        self.context
    }

    /// Mask-space scan radius.
    #[must_use]
    pub fn scan_radius(&self) -> f32 {
        self.scan_radius
    }

    /// Change the scan radius.
    pub fn set_scan_radius(&mut self, radius: f32) {
        self.scan_radius = radius;
    }

    /// Set the viewport aspect (width / height) used to measure mask
    /// distances. Non-positive or non-finite values fall back to 1.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
    }

    /// Activate `context`: remove every marker, clear all progress and
    /// discoveries, then move each condition relevant to the new context to
    /// `Scanning`. Switching to the active context still resets.
    pub fn switch_context(
        &mut self,
        context: AnatomyContext,
    ) -> Vec<DiscoveryEvent> {
        let mut events = Vec::new();

        for (condition, entry) in
            self.registry.conditions().iter().zip(&mut self.entries)
        {
            if entry.state != ConditionState::Hidden {
                events.push(DiscoveryEvent::MarkerRemoved {
                    id: condition.id.clone(),
                });
            }
            entry.state = ConditionState::Hidden;
        }
        self.progress.clear();
        self.discovered.clear();
        self.discovery_order.clear();
        self.context = context;

        events.push(DiscoveryEvent::ContextChanged { context });

        for (condition, entry) in
            self.registry.conditions().iter().zip(&mut self.entries)
        {
            if condition.is_relevant(context) {
                entry.state = ConditionState::Scanning;
                entry.scan_started = self.clock;
                let _ = self.progress.insert(condition.id.clone(), 0.0);
                events.push(DiscoveryEvent::MarkerSpawned {
                    id: condition.id.clone(),
                    position: entry.position,
                    visual: condition.marker_visual(),
                });
            }
        }

        log::info!(
            "context {context}: {} condition(s) scanning",
            self.progress.len()
        );
        events
    }

    /// Advance one frame. `project` maps a world position into mask space
    /// (`None` when it is not on screen). Accumulates scan time for every
    /// `Scanning` condition whose projected marker lies within the scan
    /// radius of `mask_center`.
    pub fn tick(
        &mut self,
        dt: f32,
        mask_center: Vec2,
        project: impl Fn(Vec3) -> Option<Vec2>,
    ) -> Vec<DiscoveryEvent> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += f64::from(dt);

        let mut events = Vec::new();
        let mut completed = Vec::new();
        let stretch = Vec2::new(self.aspect, 1.0);

        for (i, (condition, entry)) in self
            .registry
            .conditions()
            .iter()
            .zip(&self.entries)
            .enumerate()
        {
            if entry.state != ConditionState::Scanning {
                continue;
            }
            let in_range = project(entry.position).is_some_and(|p| {
                ((p - mask_center) * stretch).length() < self.scan_radius
            });

            let required = condition.scan_time;
            let accumulated =
                self.progress.entry(condition.id.clone()).or_insert(0.0);
            if in_range && dt > 0.0 {
                *accumulated = (*accumulated + dt).min(required);
            }
            events.push(DiscoveryEvent::Progress {
                id: condition.id.clone(),
                ratio: (*accumulated / required).clamp(0.0, 1.0),
                in_range,
            });
            if *accumulated >= required - COMPLETION_EPSILON {
                *accumulated = required;
                completed.push(i);
            }
        }

        for i in completed {
            if let Some(event) = self.discover(i, DiscoveryMethod::Scan) {
                events.push(event);
            }
        }
        events
    }

    /// Discover `id` immediately, bypassing scan accumulation. Only a
    /// `Scanning` condition can be discovered this way; anything else is
    /// ignored. Accumulated time is left as it was.
    pub fn click(&mut self, id: &str) -> Vec<DiscoveryEvent> {
        self.registry
            .index_of(id)
            .and_then(|i| self.discover(i, DiscoveryMethod::Click))
            .into_iter()
            .collect()
    }

    /// Closest marker (Scanning or Discovered) hit by `ray`, treating each
    /// marker as a sphere of `radius`.
    #[must_use]
    pub fn pick(&self, ray: &Ray, radius: f32) -> Option<&str> {
        self.registry
            .conditions()
            .iter()
            .zip(&self.entries)
            .filter(|(_, e)| e.state != ConditionState::Hidden)
            .filter_map(|(c, e)| {
                ray.intersect_sphere(e.position, radius)
                    .map(|t| (c.id.as_str(), t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn discover(
        &mut self,
        index: usize,
        method: DiscoveryMethod,
    ) -> Option<DiscoveryEvent> {
        let condition: &Condition = self.registry.conditions().get(index)?;
        let entry = self.entries.get_mut(index)?;
        if entry.state != ConditionState::Scanning {
            return None;
        }
        entry.state = ConditionState::Discovered;
        let elapsed_ms =
            ((self.clock - entry.scan_started).max(0.0) * 1000.0).round() as u64;

        let _ = self.discovered.insert(condition.id.clone());
        self.discovery_order.push(condition.id.clone());
        log::info!(
            "discovered {} ({:?}) after {elapsed_ms} ms",
            condition.id,
            method
        );

        Some(DiscoveryEvent::Discovered {
            id: condition.id.clone(),
            name: condition.name.clone(),
            severity: condition.severity,
            position: entry.position,
            elapsed_ms,
            method,
        })
    }

    // -- Queries --

    /// State of a condition (`None` for unknown ids).
    #[must_use]
    pub fn state(&self, id: &str) -> Option<ConditionState> {
        let i = self.registry.index_of(id)?;
        self.entries.get(i).map(|e| e.state)
    }

    /// Accumulated scan seconds (0 for conditions that are not tracked).
    #[must_use]
    pub fn accumulated(&self, id: &str) -> f32 {
        self.progress.get(id).copied().unwrap_or(0.0)
    }

    /// Whether `id` is in the discovered set.
    #[must_use]
    pub fn is_discovered(&self, id: &str) -> bool {
        self.discovered.contains(id)
    }

    /// Discovered ids in discovery order.
    #[must_use]
    pub fn discovered(&self) -> &[String] {
        &self.discovery_order
    }

    /// Number of conditions relevant to the active context.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.state != ConditionState::Hidden)
            .count()
    }

    /// World-space marker position of a condition.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<Vec3> {
        let i = self.registry.index_of(id)?;
        self.entries.get(i).map(|e| e.position)
    }

    /// Snapshot of every non-hidden condition, in table order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ProgressEntry> {
        self.registry
            .conditions()
            .iter()
            .zip(&self.entries)
            .filter(|(_, e)| e.state != ConditionState::Hidden)
            .map(|(c, e)| ProgressEntry {
                id: c.id.clone(),
                state: e.state,
                accumulated: self.accumulated(&c.id),
                required: c.scan_time,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::condition::fixtures::condition;
    use crate::scene::Bone;

    /// Project by dropping Z: world (x, y) is already mask space.
    fn flat(p: Vec3) -> Option<Vec2> {
        Some(p.truncate())
    }

    fn machine() -> DiscoveryMachine {
        let mut head = condition("head", Bone::Skull, AnatomyContext::Head, 2.0);
        head.offset = (Vec3::new(0.5, 0.5, 0.0) - Bone::Skull.anchor()).to_array();
        let mut slow = condition("slow", Bone::Skull, AnatomyContext::Head, 10.0);
        slow.offset = (Vec3::new(0.1, 0.9, 0.0) - Bone::Skull.anchor()).to_array();
        let torso = condition("torso", Bone::Ribs, AnatomyContext::Torso, 1.0);
        let registry = ConditionRegistry::new(vec![head, slow, torso]).unwrap();
        DiscoveryMachine::new(registry, 0.15)
    }

    fn discovered_count(events: &[DiscoveryEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, DiscoveryEvent::Discovered { .. }))
            .count()
    }

    #[test]
    fn context_activation_spawns_relevant_markers() {
        let mut m = machine();
        assert_eq!(m.state("head"), Some(ConditionState::Hidden));
        let events = m.switch_context(AnatomyContext::Head);
        let spawned: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                DiscoveryEvent::MarkerSpawned { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(spawned, ["head", "slow"]);
        assert_eq!(m.state("torso"), Some(ConditionState::Hidden));
        assert_eq!(m.active_count(), 2);
    }

    #[test]
    fn proximity_gates_accumulation() {
        let mut m = machine();
        let _ = m.switch_context(AnatomyContext::Head);

        // Far away: nothing accumulates
        let _ = m.tick(0.5, Vec2::new(0.9, 0.1), flat);
        assert_eq!(m.accumulated("head"), 0.0);

        // Just inside the radius
        let _ = m.tick(0.5, Vec2::new(0.5 + 0.149, 0.5), flat);
        assert!((m.accumulated("head") - 0.5).abs() < 1e-6);

        // Just outside
        let _ = m.tick(0.5, Vec2::new(0.5 + 0.151, 0.5), flat);
        assert!((m.accumulated("head") - 0.5).abs() < 1e-6);

        // Off screen never accumulates
        let _ = m.tick(0.5, Vec2::new(0.5, 0.5), |_| None);
        assert!((m.accumulated("head") - 0.5).abs() < 1e-6);
    }

    #[test]
    fn wide_viewport_shrinks_horizontal_reach() {
        let mut m = machine();
        m.set_aspect(16.0 / 9.0);
        let _ = m.switch_context(AnatomyContext::Head);

        // 0.12 to the side is 0.213 once stretched: out of range.
        let _ = m.tick(0.5, Vec2::new(0.5 + 0.12, 0.5), flat);
        assert_eq!(m.accumulated("head"), 0.0);

        // The same offset vertically is unaffected.
        let _ = m.tick(0.5, Vec2::new(0.5, 0.5 + 0.12), flat);
        assert!((m.accumulated("head") - 0.5).abs() < 1e-6);
    }

    #[test]
    fn invalid_aspect_falls_back_to_square() {
        let mut m = machine();
        m.set_aspect(0.0);
        let _ = m.switch_context(AnatomyContext::Head);
        let _ = m.tick(0.5, Vec2::new(0.5 + 0.149, 0.5), flat);
        assert!((m.accumulated("head") - 0.5).abs() < 1e-6);
    }

    #[test]
    fn held_pointer_discovers_exactly_once_on_the_last_frame() {
        let mut m = machine();
        let _ = m.switch_context(AnatomyContext::Head);
        let dt = 1.0 / 60.0;
        let mut discovered_on = Vec::new();

        for frame in 1..=240 {
            let events = m.tick(dt, Vec2::new(0.5, 0.5), flat);
            if discovered_count(&events) > 0 {
                discovered_on.push(frame);
            }
            if frame < 120 {
                assert_eq!(m.state("head"), Some(ConditionState::Scanning));
            }
        }

        assert_eq!(discovered_on, [120]);
        assert_eq!(m.state("head"), Some(ConditionState::Discovered));
        assert!(m.accumulated("head") >= 2.0);
        assert_eq!(m.discovered(), ["head"]);
    }

    #[test]
    fn accumulation_is_monotonic_and_capped() {
        let mut m = machine();
        let _ = m.switch_context(AnatomyContext::Head);
        let mut last = 0.0;
        for i in 0..400 {
            let center = if i % 3 == 0 {
                Vec2::new(0.1, 0.9)
            } else {
                Vec2::new(0.9, 0.1)
            };
            let _ = m.tick(0.05, center, flat);
            let now = m.accumulated("slow");
            assert!(now >= last);
            assert!(now <= 10.0);
            last = now;
        }
    }

    #[test]
    fn click_bypasses_scan_time() {
        let mut m = machine();
        let _ = m.switch_context(AnatomyContext::Head);
        assert_eq!(m.accumulated("slow"), 0.0);

        let events = m.click("slow");
        assert_eq!(discovered_count(&events), 1);
        assert!(matches!(
            events[0],
            DiscoveryEvent::Discovered {
                method: DiscoveryMethod::Click,
                ..
            }
        ));
        assert_eq!(m.state("slow"), Some(ConditionState::Discovered));
        assert_eq!(m.accumulated("slow"), 0.0);

        // Terminal: neither clicks nor scanning re-fire it
        assert!(m.click("slow").is_empty());
        let events = m.tick(20.0, Vec2::new(0.1, 0.9), flat);
        assert_eq!(discovered_count(&events), 0);
    }

    #[test]
    fn hidden_conditions_cannot_be_clicked() {
        let mut m = machine();
        let _ = m.switch_context(AnatomyContext::Head);
        assert!(m.click("torso").is_empty());
        assert!(m.click("missing").is_empty());
        assert!(!m.is_discovered("torso"));
    }

    #[test]
    fn context_switch_is_a_full_reset() {
        let mut m = machine();
        let _ = m.switch_context(AnatomyContext::Head);
        let _ = m.click("head");
        let _ = m.tick(1.0, Vec2::new(0.1, 0.9), flat);
        assert!(m.is_discovered("head"));

        let events = m.switch_context(AnatomyContext::Torso);
        let removed: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                DiscoveryEvent::MarkerRemoved { id } => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(removed, ["head", "slow"]);
        assert!(!m.is_discovered("head"));
        assert!(m.discovered().is_empty());
        assert_eq!(m.accumulated("slow"), 0.0);
        assert_eq!(m.state("head"), Some(ConditionState::Hidden));
        assert_eq!(m.state("torso"), Some(ConditionState::Scanning));
        assert_eq!(m.context(), AnatomyContext::Torso);
    }

    #[test]
    fn pick_returns_nearest_visible_marker() {
        let mut m = machine();
        let _ = m.switch_context(AnatomyContext::Head);
        let ray = Ray {
            origin: Vec3::new(0.5, 0.5, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert_eq!(m.pick(&ray, 0.05), Some("head"));

        let _ = m.switch_context(AnatomyContext::Torso);
        assert_eq!(m.pick(&ray, 0.05), None);
    }

    #[test]
    fn elapsed_time_counts_from_activation() {
        let mut m = machine();
        let _ = m.tick(3.0, Vec2::ZERO, flat);
        let _ = m.switch_context(AnatomyContext::Head);
        let _ = m.tick(1.5, Vec2::new(0.9, 0.1), flat);
        let events = m.click("head");
        assert!(matches!(
            events[0],
            DiscoveryEvent::Discovered {
                elapsed_ms: 1500,
                ..
            }
        ));
    }
}
