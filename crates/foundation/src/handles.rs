/// Opaque handle to a GPU texture owned by the rendering host.
///
/// The engine never inspects the value; it only stores, compares and hands
/// it back in dispose requests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHandle(pub u64);

impl TextureHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}
