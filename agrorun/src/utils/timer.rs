//! Wall-clock timing of job steps.

use std::time::Instant;

/// Measures the duration of one named step.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Returns the step name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops the timer, logs the duration at debug level and returns it.
    pub fn finish(self) -> u64 {
        let elapsed = self.elapsed_ms();
        tracing::debug!(step = %self.name, duration_ms = elapsed, "Step finished");
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start("engine.invoke");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert_eq!(timer.name(), "engine.invoke");
        assert!(timer.finish() >= 10);
    }
}
