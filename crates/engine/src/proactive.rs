//! Proactive message scheduler.
//!
//! Pure `(state, event) -> effects` transitions; the async driver owns the
//! single timer and feeds [`SchedulerEvent::TimerFired`] back in. Keeping
//! the timer outside the state machine is what makes the schedule
//! timeline testable against a paused clock.

use std::time::Duration;

use leadflow_config::ProactiveSettings;

/// Scheduler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// No timer armed and no bubble visible.
    Idle,
    /// Timer armed, bubble hidden.
    Waiting,
    /// Bubble visible. A follow-up timer may also be armed.
    Showing,
}

/// Inputs from the driver and the widget UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Widget mounted with the chat closed.
    Start,
    /// The armed timer elapsed.
    TimerFired,
    ChatOpened,
    ChatClosed,
    /// Visitor clicked the proactive bubble.
    BubbleClicked,
    /// Proactive messaging turned off (settings change or teardown).
    Disabled,
}

/// Instructions for the driver, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEffect {
    /// (Re)arm the single timer.
    Arm(Duration),
    CancelTimer,
    ShowBubble(String),
    HideBubble,
    /// Surface the clicked message as a bot transcript entry.
    AppendToTranscript(String),
    OpenChat,
}

/// Timer-driven attention bubble state for one widget instance.
#[derive(Debug)]
pub struct ProactiveScheduler {
    settings: ProactiveSettings,
    phase: SchedulerPhase,
    chat_open: bool,
    shown_count: u32,
    next_index: usize,
    /// Message currently in the bubble, kept for the click path.
    visible_message: Option<String>,
}

impl ProactiveScheduler {
    pub fn new(settings: ProactiveSettings) -> Self {
        Self {
            settings,
            phase: SchedulerPhase::Idle,
            chat_open: false,
            shown_count: 0,
            next_index: 0,
            visible_message: None,
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn shown_count(&self) -> u32 {
        self.shown_count
    }

    pub fn handle(&mut self, event: SchedulerEvent) -> Vec<SchedulerEffect> {
        match event {
            SchedulerEvent::Start => self.on_start(),
            SchedulerEvent::TimerFired => self.on_timer(),
            SchedulerEvent::ChatOpened => self.on_chat_opened(),
            SchedulerEvent::ChatClosed => self.on_chat_closed(),
            SchedulerEvent::BubbleClicked => self.on_bubble_clicked(),
            SchedulerEvent::Disabled => self.on_disabled(),
        }
    }

    fn on_start(&mut self) -> Vec<SchedulerEffect> {
        if self.phase != SchedulerPhase::Idle || self.chat_open || self.capped() {
            return Vec::new();
        }
        self.phase = SchedulerPhase::Waiting;
        vec![SchedulerEffect::Arm(self.next_wait())]
    }

    fn on_timer(&mut self) -> Vec<SchedulerEffect> {
        // A fire that races a cancel, or arrives past the cap, is ignored.
        if self.chat_open || matches!(self.phase, SchedulerPhase::Idle) || self.capped() {
            return Vec::new();
        }
        let message =
            self.settings.messages[self.next_index % self.settings.messages.len()].clone();
        self.next_index += 1;
        self.shown_count += 1;
        self.phase = SchedulerPhase::Showing;
        self.visible_message = Some(message.clone());

        let mut effects = vec![SchedulerEffect::ShowBubble(message)];
        if !self.capped() {
            effects.push(SchedulerEffect::Arm(self.settings.interval));
        }
        effects
    }

    fn on_chat_opened(&mut self) -> Vec<SchedulerEffect> {
        self.chat_open = true;
        let mut effects = Vec::new();
        match self.phase {
            SchedulerPhase::Waiting => effects.push(SchedulerEffect::CancelTimer),
            SchedulerPhase::Showing => {
                effects.push(SchedulerEffect::CancelTimer);
                effects.push(SchedulerEffect::HideBubble);
            }
            SchedulerPhase::Idle => {}
        }
        // Opening never consumes quota; the count stays where it was.
        self.phase = SchedulerPhase::Idle;
        self.visible_message = None;
        effects
    }

    fn on_chat_closed(&mut self) -> Vec<SchedulerEffect> {
        self.chat_open = false;
        if self.capped() {
            return Vec::new();
        }
        self.phase = SchedulerPhase::Waiting;
        vec![SchedulerEffect::Arm(self.next_wait())]
    }

    fn on_bubble_clicked(&mut self) -> Vec<SchedulerEffect> {
        let Some(message) = self.visible_message.take() else {
            return Vec::new();
        };
        self.chat_open = true;
        self.phase = SchedulerPhase::Idle;
        vec![
            SchedulerEffect::CancelTimer,
            SchedulerEffect::HideBubble,
            SchedulerEffect::AppendToTranscript(message),
            SchedulerEffect::OpenChat,
        ]
    }

    fn on_disabled(&mut self) -> Vec<SchedulerEffect> {
        let had_bubble = self.visible_message.is_some();
        self.phase = SchedulerPhase::Idle;
        self.shown_count = 0;
        self.next_index = 0;
        self.visible_message = None;
        let mut effects = vec![SchedulerEffect::CancelTimer];
        if had_bubble {
            effects.push(SchedulerEffect::HideBubble);
        }
        effects
    }

    fn capped(&self) -> bool {
        self.shown_count >= self.settings.max_messages
    }

    /// First wait uses `delay`, every later one uses `interval`.
    fn next_wait(&self) -> Duration {
        if self.shown_count == 0 {
            self.settings.delay
        } else {
            self.settings.interval
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ProactiveSettings {
        ProactiveSettings {
            messages: vec!["A".into(), "B".into()],
            delay: Duration::from_secs(30),
            interval: Duration::from_secs(60),
            max_messages: 2,
        }
    }

    #[test]
    fn timeline_delay_then_interval_then_cap() {
        let mut s = ProactiveScheduler::new(settings());

        assert_eq!(
            s.handle(SchedulerEvent::Start),
            vec![SchedulerEffect::Arm(Duration::from_secs(30))]
        );

        // t=30: "A" shown, next fire armed at interval.
        assert_eq!(
            s.handle(SchedulerEvent::TimerFired),
            vec![
                SchedulerEffect::ShowBubble("A".into()),
                SchedulerEffect::Arm(Duration::from_secs(60)),
            ]
        );

        // t=90: "B" shown, cap reached, no further arm.
        assert_eq!(
            s.handle(SchedulerEvent::TimerFired),
            vec![SchedulerEffect::ShowBubble("B".into())]
        );
        assert_eq!(s.shown_count(), 2);

        // Never a third message.
        assert!(s.handle(SchedulerEvent::TimerFired).is_empty());
    }

    #[test]
    fn open_before_first_fire_preserves_count() {
        let mut s = ProactiveScheduler::new(settings());
        s.handle(SchedulerEvent::Start);

        assert_eq!(
            s.handle(SchedulerEvent::ChatOpened),
            vec![SchedulerEffect::CancelTimer]
        );
        assert_eq!(s.shown_count(), 0);

        // Closing re-arms with the initial delay, count untouched.
        assert_eq!(
            s.handle(SchedulerEvent::ChatClosed),
            vec![SchedulerEffect::Arm(Duration::from_secs(30))]
        );
    }

    #[test]
    fn reopen_after_one_message_uses_interval() {
        let mut s = ProactiveScheduler::new(settings());
        s.handle(SchedulerEvent::Start);
        s.handle(SchedulerEvent::TimerFired);
        s.handle(SchedulerEvent::ChatOpened);

        assert_eq!(
            s.handle(SchedulerEvent::ChatClosed),
            vec![SchedulerEffect::Arm(Duration::from_secs(60))]
        );
        assert_eq!(s.shown_count(), 1);
    }

    #[test]
    fn bubble_click_opens_and_appends() {
        let mut s = ProactiveScheduler::new(settings());
        s.handle(SchedulerEvent::Start);
        s.handle(SchedulerEvent::TimerFired);

        let effects = s.handle(SchedulerEvent::BubbleClicked);
        assert_eq!(
            effects,
            vec![
                SchedulerEffect::CancelTimer,
                SchedulerEffect::HideBubble,
                SchedulerEffect::AppendToTranscript("A".into()),
                SchedulerEffect::OpenChat,
            ]
        );
        assert_eq!(s.phase(), SchedulerPhase::Idle);
    }

    #[test]
    fn messages_cycle_modulo() {
        let mut few = settings();
        few.messages = vec!["only".into()];
        few.max_messages = 3;
        let mut s = ProactiveScheduler::new(few);
        s.handle(SchedulerEvent::Start);
        for _ in 0..3 {
            let effects = s.handle(SchedulerEvent::TimerFired);
            assert!(matches!(
                &effects[0],
                SchedulerEffect::ShowBubble(m) if m == "only"
            ));
        }
        assert!(s.handle(SchedulerEvent::TimerFired).is_empty());
    }

    #[test]
    fn disable_resets_counters() {
        let mut s = ProactiveScheduler::new(settings());
        s.handle(SchedulerEvent::Start);
        s.handle(SchedulerEvent::TimerFired);
        assert_eq!(
            s.handle(SchedulerEvent::Disabled),
            vec![SchedulerEffect::CancelTimer, SchedulerEffect::HideBubble]
        );
        assert_eq!(s.shown_count(), 0);

        // Restart begins from the initial delay again.
        assert_eq!(
            s.handle(SchedulerEvent::Start),
            vec![SchedulerEffect::Arm(Duration::from_secs(30))]
        );
    }

    #[test]
    fn no_arm_while_chat_open() {
        let mut s = ProactiveScheduler::new(settings());
        s.handle(SchedulerEvent::ChatOpened);
        assert!(s.handle(SchedulerEvent::Start).is_empty());
    }
}
