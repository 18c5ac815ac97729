/// Identifies one texture load handed to the host.
///
/// Small and copyable so the host can stash it next to its own load future
/// and hand it back with the result.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(pub u64);

/// Why a load was issued.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadPurpose {
    /// Needed on screen for the current navigation target.
    Display,
    /// Cache warm-up; the result is only stored.
    Prefetch,
}
