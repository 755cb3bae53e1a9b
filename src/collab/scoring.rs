//! Points, streaks and achievements driven by discovery events.

use rustc_hash::FxHashSet;

use super::DiscoverySink;
use crate::discovery::Severity;
use crate::scene::AnatomyContext;

/// Discoveries in a row, each within the quick-find window, for
/// [`Achievement::HotStreak`].
pub const HOT_STREAK_LENGTH: u32 = 3;

/// Unlockable achievements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Achievement {
    /// First discovery of the session.
    FirstDiscovery,
    /// A discovery inside the quick-find window.
    QuickEye,
    /// Several quick finds in a row.
    HotStreak,
    /// Every condition of the active context discovered.
    ContextCleared,
    /// Every condition in the registry discovered at least once.
    FullRegistry,
}

impl Achievement {
    /// Display title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::FirstDiscovery => "First Finding",
            Self::QuickEye => "Quick Eye",
            Self::HotStreak => "Hot Streak",
            Self::ContextCleared => "Region Cleared",
            Self::FullRegistry => "Full Workup",
        }
    }
}

fn base_points(severity: Severity) -> u32 {
    match severity {
        Severity::Low => 100,
        Severity::Medium => 250,
        Severity::High => 500,
    }
}

/// Keeps score for one session.
///
/// The score survives context switches even though discovery progress does
/// not; the set used for [`Achievement::FullRegistry`] is session-wide.
#[derive(Debug, Clone)]
pub struct ScoreKeeper {
    score: u32,
    streak: u32,
    best_streak: u32,
    quick_find_ms: u64,
    registry_size: usize,
    context_available: usize,
    context_found: usize,
    ever_found: FxHashSet<String>,
    unlocked: Vec<Achievement>,
    fresh: Vec<Achievement>,
}

impl ScoreKeeper {
    /// `registry_size` conditions in total; discoveries within
    /// `quick_find_seconds` of scanning earn a 50% bonus.
    #[must_use]
    pub fn new(registry_size: usize, quick_find_seconds: f32) -> Self {
        Self {
            score: 0,
            streak: 0,
            best_streak: 0,
            quick_find_ms: (quick_find_seconds.max(0.0) * 1000.0) as u64,
            registry_size,
            context_available: 0,
            context_found: 0,
            ever_found: FxHashSet::default(),
            unlocked: Vec::new(),
            fresh: Vec::new(),
        }
    }

    /// Total points.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current run of quick finds.
    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Longest run of quick finds.
    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Every achievement unlocked so far, in unlock order.
    #[must_use]
    pub fn unlocked(&self) -> &[Achievement] {
        &self.unlocked
    }

    /// Achievements unlocked since the last call.
    pub fn drain_new(&mut self) -> Vec<Achievement> {
        std::mem::take(&mut self.fresh)
    }

    fn unlock(&mut self, achievement: Achievement) {
        if self.unlocked.contains(&achievement) {
            return;
        }
        log::info!("achievement unlocked: {}", achievement.title());
        self.unlocked.push(achievement);
        self.fresh.push(achievement);
    }
}

impl DiscoverySink for ScoreKeeper {
    fn on_discovered(&mut self, id: &str, elapsed_ms: u64, severity: Severity) {
        let quick = elapsed_ms <= self.quick_find_ms;
        let base = base_points(severity);
        let points = if quick { base + base / 2 } else { base };
        self.score += points;

        if quick {
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }
        self.context_found += 1;
        let _ = self.ever_found.insert(id.to_owned());
        log::debug!("scored {points} for {id} (total {})", self.score);

        self.unlock(Achievement::FirstDiscovery);
        if quick {
            self.unlock(Achievement::QuickEye);
        }
        if self.streak >= HOT_STREAK_LENGTH {
            self.unlock(Achievement::HotStreak);
        }
        if self.context_available > 0 && self.context_found >= self.context_available {
            self.unlock(Achievement::ContextCleared);
        }
        if self.registry_size > 0 && self.ever_found.len() >= self.registry_size {
            self.unlock(Achievement::FullRegistry);
        }
    }

    fn on_context_changed(&mut self, _context: AnatomyContext, available: usize) {
        self.context_available = available;
        self.context_found = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_and_quick_bonus() {
        let mut keeper = ScoreKeeper::new(10, 20.0);
        keeper.on_discovered("a", 30_000, Severity::Low);
        assert_eq!(keeper.score(), 100);
        keeper.on_discovered("b", 5_000, Severity::High);
        assert_eq!(keeper.score(), 100 + 750);
        assert_eq!(keeper.streak(), 1);
    }

    #[test]
    fn slow_find_breaks_streak() {
        let mut keeper = ScoreKeeper::new(10, 20.0);
        for id in ["a", "b", "c"] {
            keeper.on_discovered(id, 1_000, Severity::Medium);
        }
        assert_eq!(keeper.streak(), 3);
        assert!(keeper.unlocked().contains(&Achievement::HotStreak));
        keeper.on_discovered("d", 60_000, Severity::Medium);
        assert_eq!(keeper.streak(), 0);
        assert_eq!(keeper.best_streak(), 3);
    }

    #[test]
    fn achievements_unlock_once() {
        let mut keeper = ScoreKeeper::new(10, 20.0);
        keeper.on_discovered("a", 1_000, Severity::Low);
        let first = keeper.drain_new();
        assert_eq!(first, vec![Achievement::FirstDiscovery, Achievement::QuickEye]);
        keeper.on_discovered("b", 1_000, Severity::Low);
        assert!(keeper.drain_new().is_empty());
    }

    #[test]
    fn context_cleared_and_full_registry() {
        let mut keeper = ScoreKeeper::new(3, 20.0);
        keeper.on_context_changed(AnatomyContext::Head, 2);
        keeper.on_discovered("a", 90_000, Severity::Low);
        assert!(!keeper.unlocked().contains(&Achievement::ContextCleared));
        keeper.on_discovered("b", 90_000, Severity::Low);
        assert!(keeper.unlocked().contains(&Achievement::ContextCleared));

        // A reset context re-discovers "a"; it only counts once registry-wide.
        keeper.on_context_changed(AnatomyContext::Torso, 2);
        keeper.on_discovered("a", 90_000, Severity::Low);
        assert!(!keeper.unlocked().contains(&Achievement::FullRegistry));
        keeper.on_discovered("c", 90_000, Severity::Low);
        assert!(keeper.unlocked().contains(&Achievement::FullRegistry));
    }
}
