/// Lifecycle of the panorama for the current navigation target.
///
/// Idle → Resolving → Loading (retries, next candidates) → Ready | Failed
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransitionState {
    #[default]
    Idle,
    Resolving,
    Loading {
        /// Index into the candidate path list.
        candidate: usize,
        /// 1-based attempt for that candidate.
        attempt: u32,
    },
    Ready,
    Failed,
}
