use glam::Vec3;

use crate::discovery::Severity;

/// Sounds the core asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    /// The mask moved over a scanning marker.
    ScanStarted,
    /// A condition was discovered; keyed by severity.
    Discovered,
    /// A click hit no marker.
    ClickMiss,
    /// The reveal mask expanded or collapsed.
    ExpandToggled,
    /// The anatomy context changed.
    ContextSwitched,
}

impl SoundKind {
    /// Stable sound id, suffixed by severity where one applies.
    #[must_use]
    pub fn sound_id(self, severity: Option<Severity>) -> String {
        let base = match self {
            Self::ScanStarted => "scan_start",
            Self::Discovered => "discover",
            Self::ClickMiss => "click_miss",
            Self::ExpandToggled => "expand",
            Self::ContextSwitched => "context_switch",
        };
        match severity {
            Some(severity) => format!("{base}_{}", severity.name()),
            None => base.to_owned(),
        }
    }
}

/// One fire-and-forget sound request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioCue {
    /// What happened.
    pub kind: SoundKind,
    /// Severity for severity-keyed sounds.
    pub severity: Option<Severity>,
    /// World position for spatialized playback.
    pub position: Option<Vec3>,
}

impl AudioCue {
    /// A cue with no severity or position.
    #[must_use]
    pub fn new(kind: SoundKind) -> Self {
        Self {
            kind,
            severity: None,
            position: None,
        }
    }

    /// Stable sound id.
    #[must_use]
    pub fn sound_id(&self) -> String {
        self.kind.sound_id(self.severity)
    }
}

/// Receives sound requests. Implementations must not block and must swallow
/// their own failures.
pub trait AudioSink: Send {
    /// Play (or ignore) a cue.
    fn notify(&mut self, cue: AudioCue);
}

/// Default sink: logs cues at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudioSink;

impl AudioSink for LogAudioSink {
    fn notify(&mut self, cue: AudioCue) {
        match cue.position {
            Some(p) => log::debug!(
                "audio: {} at ({:.2}, {:.2}, {:.2})",
                cue.sound_id(),
                p.x,
                p.y,
                p.z
            ),
            None => log::debug!("audio: {}", cue.sound_id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sound_ids_are_severity_keyed() {
        let cue = AudioCue {
            severity: Some(Severity::High),
            ..AudioCue::new(SoundKind::Discovered)
        };
        assert_eq!(cue.sound_id(), "discover_high");
        assert_eq!(AudioCue::new(SoundKind::ClickMiss).sound_id(), "click_miss");
    }
}
