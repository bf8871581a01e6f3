//! Client playback state machine.
//!
//! Browsers refuse to start audible playback without a user gesture, so the
//! page walks through muted video autoplay, audio autoplay and, when that is
//! rejected, a manual play affordance. Every playback attempt comes back as
//! an [`Event`] carrying an [`AttemptOutcome`]; the machine answers each
//! event with the [`Effect`]s the page has to perform.

use serde::Serialize;

use crate::discovery::models::MediaPresence;

/// DOM exception names that mean "autoplay policy said no".
pub const BLOCKED_ERROR_NAMES: &[&str] = &["NotAllowedError"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    AutoplayingVideoMuted,
    AutoplayingAudio,
    Playing,
    BlockedAwaitingGesture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Blocked,
    Error(String),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }

    fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::Blocked => "blocked",
            AttemptOutcome::Error(_) => "error",
        }
    }
}

/// Whether an attempt was started by the page itself or by the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Autoplay,
    Gesture,
}

impl Stage {
    fn as_str(self) -> &'static str {
        match self {
            Stage::Autoplay => "autoplay",
            Stage::Gesture => "gesture",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Media {
    Video,
    Audio,
}

impl Media {
    fn as_str(self) -> &'static str {
        match self {
            Media::Video => "video",
            Media::Audio => "audio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    PlayButton,
    OverlayButton,
    /// First click anywhere on the page.
    FirstTap,
}

impl Trigger {
    fn as_str(self) -> &'static str {
        match self {
            Trigger::PlayButton => "play_button",
            Trigger::OverlayButton => "overlay_button",
            Trigger::FirstTap => "first_tap",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PageLoaded,
    Gesture(Trigger),
    VideoSettled { stage: Stage, outcome: AttemptOutcome },
    AudioSettled { stage: Stage, outcome: AttemptOutcome },
}

impl Event {
    /// Name the page script dispatches, e.g. `audio:autoplay:blocked`.
    /// The error reason is not part of the key.
    pub fn key(&self) -> String {
        match self {
            Event::PageLoaded => "page_loaded".to_string(),
            Event::Gesture(trigger) => format!("gesture:{}", trigger.as_str()),
            Event::VideoSettled { stage, outcome } => {
                settled_key(Media::Video, *stage, outcome)
            }
            Event::AudioSettled { stage, outcome } => {
                settled_key(Media::Audio, *stage, outcome)
            }
        }
    }

    /// Every distinct event the page can report.
    pub fn alphabet() -> Vec<Event> {
        let mut events = vec![
            Event::PageLoaded,
            Event::Gesture(Trigger::PlayButton),
            Event::Gesture(Trigger::OverlayButton),
            Event::Gesture(Trigger::FirstTap),
        ];
        for stage in [Stage::Autoplay, Stage::Gesture] {
            for outcome in [
                AttemptOutcome::Success,
                AttemptOutcome::Blocked,
                AttemptOutcome::Error(String::new()),
            ] {
                events.push(Event::VideoSettled {
                    stage,
                    outcome: outcome.clone(),
                });
                events.push(Event::AudioSettled { stage, outcome });
            }
        }
        events
    }
}

fn settled_key(media: Media, stage: Stage, outcome: &AttemptOutcome) -> String {
    format!("{}:{}:{}", media.as_str(), stage.as_str(), outcome.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Something the page has to do in response to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Effect {
    /// Start video playback; the result comes back as `VideoSettled`.
    AttemptVideo { muted: bool, stage: Stage },
    /// Start audio playback; the result comes back as `AudioSettled`.
    AttemptAudio { stage: Stage },
    /// Unmute and play the video, ignoring failure.
    ResumeVideoUnmuted,
    ShowOverlay,
    HideOverlay,
    HideControls,
    EnableNativeControls { media: Media },
    Log {
        level: LogLevel,
        message: &'static str,
    },
}

fn log(level: LogLevel, message: &'static str) -> Effect {
    Effect::Log { level, message }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequencerState {
    pub phase: Phase,
    pub loaded: bool,
    pub first_tap_armed: bool,
    /// The visitor has asked for playback at least once.
    pub gesture_requested: bool,
    pub gesture_pending: bool,
    pub video_autoplay_pending: bool,
}

impl SequencerState {
    pub fn initial() -> Self {
        Self {
            phase: Phase::Init,
            loaded: false,
            first_tap_armed: true,
            gesture_requested: false,
            gesture_pending: false,
            video_autoplay_pending: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackSequencer {
    media: MediaPresence,
    state: SequencerState,
}

impl PlaybackSequencer {
    pub fn new(media: MediaPresence) -> Self {
        Self::resume(media, SequencerState::initial())
    }

    pub fn resume(media: MediaPresence, state: SequencerState) -> Self {
        Self { media, state }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Apply one event. An empty result with an unchanged state means the
    /// event does not apply here.
    pub fn handle(&mut self, event: &Event) -> Vec<Effect> {
        match event {
            Event::PageLoaded => self.on_page_loaded(),
            Event::Gesture(trigger) => self.on_gesture(*trigger),
            Event::VideoSettled {
                stage: Stage::Autoplay,
                outcome,
            } => self.on_video_autoplay(outcome),
            Event::AudioSettled {
                stage: Stage::Autoplay,
                outcome,
            } => self.on_audio_autoplay(outcome),
            Event::VideoSettled {
                stage: Stage::Gesture,
                outcome,
            } => self.on_gesture_video(outcome),
            Event::AudioSettled {
                stage: Stage::Gesture,
                outcome,
            } => self.on_gesture_audio(outcome),
        }
    }

    fn on_page_loaded(&mut self) -> Vec<Effect> {
        if self.state.loaded {
            return Vec::new();
        }
        self.state.loaded = true;

        // Buttons are live before `load`. A muted autoplay attempt now would
        // silence the video the visitor just asked to hear.
        if self.state.gesture_requested {
            return vec![log(
                LogLevel::Info,
                "Page loaded after Play was requested; skipping autoplay.",
            )];
        }

        let mut effects = vec![log(
            LogLevel::Info,
            "Page loaded. Attempting autoplay where possible...",
        )];
        if self.media.video {
            self.state.phase = Phase::AutoplayingVideoMuted;
            self.state.video_autoplay_pending = true;
            effects.push(Effect::AttemptVideo {
                muted: true,
                stage: Stage::Autoplay,
            });
        } else {
            self.begin_audio(&mut effects);
        }
        effects
    }

    fn on_video_autoplay(&mut self, outcome: &AttemptOutcome) -> Vec<Effect> {
        if !self.state.video_autoplay_pending {
            return Vec::new();
        }
        self.state.video_autoplay_pending = false;

        let mut effects = vec![if outcome.is_success() {
            log(LogLevel::Info, "Video autoplay (muted) succeeded.")
        } else {
            log(LogLevel::Warn, "Video autoplay failed or blocked (muted):")
        }];
        // A gesture may have moved on while the muted attempt was in flight.
        if self.state.phase == Phase::AutoplayingVideoMuted {
            self.begin_audio(&mut effects);
        }
        effects
    }

    fn begin_audio(&mut self, effects: &mut Vec<Effect>) {
        if self.media.audio {
            self.state.phase = Phase::AutoplayingAudio;
            effects.push(Effect::AttemptAudio {
                stage: Stage::Autoplay,
            });
        } else if self.media.video {
            effects.push(log(
                LogLevel::Info,
                "No audio track; leaving the video muted until Play is pressed.",
            ));
        } else {
            // Nothing to autoplay: the phase stays `Init`.
            effects.push(log(LogLevel::Info, "No video or audio on this page."));
        }
    }

    fn on_audio_autoplay(&mut self, outcome: &AttemptOutcome) -> Vec<Effect> {
        let mut effects = Vec::new();
        match (self.state.phase, outcome.is_success()) {
            (Phase::AutoplayingAudio | Phase::BlockedAwaitingGesture, true) => {
                effects.push(log(LogLevel::Info, "Audio autoplay succeeded."));
                self.enter_playing(&mut effects);
            }
            (Phase::AutoplayingAudio, false) => {
                effects.push(log(LogLevel::Warn, "Audio autoplay blocked or failed:"));
                self.enter_blocked(&mut effects);
            }
            _ => {}
        }
        effects
    }

    fn on_gesture(&mut self, trigger: Trigger) -> Vec<Effect> {
        if trigger == Trigger::FirstTap {
            if !self.state.first_tap_armed {
                return Vec::new();
            }
            self.state.first_tap_armed = false;
        }
        if self.state.phase == Phase::Playing {
            return Vec::new();
        }
        if self.state.gesture_pending {
            return vec![log(LogLevel::Debug, "Play already in progress.")];
        }

        let mut effects = vec![log(
            LogLevel::Info,
            match trigger {
                Trigger::PlayButton => {
                    "Play button pressed, attempting to play audio and unmute video..."
                }
                Trigger::OverlayButton => {
                    "Overlay play pressed, attempting to play audio and unmute video..."
                }
                Trigger::FirstTap => "First tap on the page, attempting to start playback...",
            },
        )];

        if self.media.audio {
            self.state.gesture_requested = true;
            self.state.gesture_pending = true;
            effects.push(Effect::AttemptAudio {
                stage: Stage::Gesture,
            });
        } else if self.media.video {
            self.state.gesture_requested = true;
            self.state.gesture_pending = true;
            effects.push(Effect::AttemptVideo {
                muted: false,
                stage: Stage::Gesture,
            });
        } else {
            effects.push(log(LogLevel::Info, "Nothing to play on this page."));
        }
        effects
    }

    fn on_gesture_video(&mut self, outcome: &AttemptOutcome) -> Vec<Effect> {
        if !self.state.gesture_pending || self.media.audio {
            return Vec::new();
        }
        self.state.gesture_pending = false;

        if outcome.is_success() {
            self.state.phase = Phase::Playing;
            vec![
                log(LogLevel::Info, "Video played successfully (no audio present)."),
                Effect::HideControls,
                Effect::HideOverlay,
            ]
        } else {
            vec![
                log(LogLevel::Error, "Video play failed:"),
                Effect::EnableNativeControls { media: Media::Video },
            ]
        }
    }

    fn on_gesture_audio(&mut self, outcome: &AttemptOutcome) -> Vec<Effect> {
        if !self.state.gesture_pending || !self.media.audio {
            return Vec::new();
        }
        self.state.gesture_pending = false;

        let mut effects = Vec::new();
        if outcome.is_success() {
            effects.push(log(LogLevel::Info, "Audio played successfully via Play."));
            self.enter_playing(&mut effects);
        } else if self.state.phase == Phase::Playing {
            effects.push(log(LogLevel::Warn, "Play after gesture failed while already playing:"));
        } else {
            effects.push(log(LogLevel::Error, "Play failed after user gesture:"));
            self.enter_blocked(&mut effects);
        }
        effects
    }

    fn enter_playing(&mut self, effects: &mut Vec<Effect>) {
        if self.media.video {
            effects.push(Effect::ResumeVideoUnmuted);
        }
        effects.push(Effect::HideControls);
        effects.push(Effect::HideOverlay);
        self.state.phase = Phase::Playing;
    }

    fn enter_blocked(&mut self, effects: &mut Vec<Effect>) {
        effects.push(Effect::ShowOverlay);
        effects.push(Effect::EnableNativeControls { media: Media::Audio });
        if self.media.video {
            effects.push(Effect::EnableNativeControls { media: Media::Video });
        }
        effects.push(log(
            LogLevel::Info,
            "If playback fails, try pressing the Play button or the native controls.",
        ));
        self.state.phase = Phase::BlockedAwaitingGesture;
    }
}
