use serde::{Deserialize, Serialize};

/// Lifecycle state of one player session.
///
/// Exactly one value is current per session; transitions happen only
/// inside the session task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// No asset loaded yet.
    #[default]
    Unknown,
    /// Asset loaded and playable; entry triggers the resume seek or play.
    ReadyToPlay,
    /// Buffering mid-stream.
    Loading,
    /// A seek is in flight.
    Seeking,
    Playing,
    Paused,
    /// The embedding view left the foreground with the item kept alive.
    Suspended,
    /// The session was torn down; no signal may fire afterwards.
    Dismissed,
    /// The current item failed; terminal until a new request arrives.
    Error,
}

impl PlayerState {
    /// Whether the machine may move from `self` to `next`.
    ///
    /// `Error` is terminal for the item: only a fresh playback request
    /// (which resets to `Unknown`) or dismissal leaves it. `Dismissed` is
    /// terminal for the session.
    pub fn can_transition_to(&self, next: PlayerState) -> bool {
        use PlayerState::*;
        if *self == next {
            return false;
        }
        match (*self, next) {
            (Dismissed, _) => false,
            (Error, Unknown) | (Error, Dismissed) => true,
            (Error, _) => false,
            // A new request may restart the machine from any live state.
            (_, Unknown) => true,
            (Unknown, ReadyToPlay) => true,
            (Unknown, Error) | (Unknown, Dismissed) => true,
            (Unknown, _) => false,
            (_, Error) | (_, Dismissed) => true,
            (ReadyToPlay, Playing) | (ReadyToPlay, Seeking) => true,
            (ReadyToPlay, Paused) | (ReadyToPlay, Loading) => true,
            (ReadyToPlay, Suspended) => true,
            (ReadyToPlay, _) => false,
            (_, ReadyToPlay) => false,
            (Loading, Playing) | (Loading, Paused) => true,
            (Loading, Seeking) | (Loading, Suspended) => true,
            (Loading, _) => false,
            (Seeking, Playing) | (Seeking, Paused) => true,
            (Seeking, Loading) | (Seeking, Suspended) => true,
            (Seeking, _) => false,
            (Playing, Paused) | (Playing, Loading) => true,
            (Playing, Seeking) | (Playing, Suspended) => true,
            (Playing, _) => false,
            (Paused, Playing) | (Paused, Loading) => true,
            (Paused, Seeking) | (Paused, Suspended) => true,
            (Paused, _) => false,
            (Suspended, Playing) | (Suspended, Paused) => true,
            (Suspended, Loading) | (Suspended, Seeking) => true,
            (Suspended, _) => false,
        }
    }

    /// States whose entry shows the busy indicator.
    pub fn shows_activity(&self) -> bool {
        matches!(self, PlayerState::Loading | PlayerState::Seeking)
    }

    /// States in which transport controls are usable.
    pub fn controls_enabled(&self) -> bool {
        matches!(
            self,
            PlayerState::ReadyToPlay
                | PlayerState::Playing
                | PlayerState::Paused
                | PlayerState::Seeking
                | PlayerState::Loading
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PlayerState::Error | PlayerState::Dismissed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PlayerState::*;

    #[test]
    fn error_is_terminal_for_the_item() {
        assert!(!Error.can_transition_to(Playing));
        assert!(!Error.can_transition_to(Paused));
        assert!(!Error.can_transition_to(ReadyToPlay));
        assert!(Error.can_transition_to(Unknown));
        assert!(Error.can_transition_to(Dismissed));
    }

    #[test]
    fn dismissed_is_terminal_for_the_session() {
        for next in [
            Unknown, ReadyToPlay, Loading, Seeking, Playing, Paused,
            Suspended, Error,
        ] {
            assert!(!Dismissed.can_transition_to(next));
        }
    }

    #[test]
    fn happy_path_is_legal() {
        assert!(Unknown.can_transition_to(ReadyToPlay));
        assert!(ReadyToPlay.can_transition_to(Seeking));
        assert!(Seeking.can_transition_to(Playing));
        assert!(Playing.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Playing));
        assert!(Playing.can_transition_to(Loading));
        assert!(Loading.can_transition_to(Playing));
    }

    #[test]
    fn no_play_before_ready() {
        assert!(!Unknown.can_transition_to(Playing));
        assert!(!Unknown.can_transition_to(Paused));
        assert!(!Unknown.can_transition_to(Seeking));
    }

    #[test]
    fn any_live_state_may_fail() {
        for state in
            [Unknown, ReadyToPlay, Loading, Seeking, Playing, Paused, Suspended]
        {
            assert!(state.can_transition_to(Error));
        }
    }
}
