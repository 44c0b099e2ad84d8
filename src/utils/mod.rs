use std::time::Duration;

use git_version::git_version;
use rustix::time::{clock_gettime, ClockId};

pub fn version() -> String {
    format!(
        "{} ({})",
        env!("CARGO_PKG_VERSION"),
        git_version!(fallback = "unknown commit"),
    )
}

pub fn get_monotonic_time() -> Duration {
    let ts = clock_gettime(ClockId::Monotonic);
    Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32)
}

/// Converts a density-independent value to whole pixels, rounding half up.
pub fn to_physical(value: f64, density: f64) -> i32 {
    (value * density + 0.5) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_rounding() {
        assert_eq!(to_physical(6., 1.), 6);
        assert_eq!(to_physical(6., 1.5), 9);
        assert_eq!(to_physical(150., 0.75), 113);
        assert_eq!(to_physical(100., 1.333), 133);
        assert_eq!(to_physical(2000., 3.), 6000);
        assert_eq!(to_physical(0., 2.), 0);
    }
}
