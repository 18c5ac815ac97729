/// Engine time in seconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Self = Time(0.0);

    pub fn after(self, delay_s: f64) -> Self {
        Time(self.0 + delay_s.max(0.0))
    }

    pub fn has_reached(self, deadline: Time) -> bool {
        self.0 >= deadline.0
    }
}
