// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures.

use std::sync::Arc;

use classline_core::{ManualClock, Session};
use classline_telemetry::TelemetryService;

/// A signed-in teacher session.
pub fn test_session() -> Session {
    Session {
        user_id: "teacher-1".to_string(),
        access_token: "test-token".to_string(),
    }
}

/// Unpersisted telemetry whose clock only moves when told to.
pub struct TelemetryFixture {
    pub clock: Arc<ManualClock>,
    pub telemetry: TelemetryService,
}

impl TelemetryFixture {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(0));
        let telemetry = TelemetryService::in_memory(clock.clone());
        Self { clock, telemetry }
    }
}

impl Default for TelemetryFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use classline_core::{MetricType, OperationId};
    use classline_telemetry::EndOptions;

    use super::*;

    #[test]
    fn fixture_clock_drives_timers() {
        let fixture = TelemetryFixture::new();
        let id = OperationId::named("load");
        fixture.telemetry.timers().start(&id);
        fixture.clock.advance(42);
        let duration = fixture
            .telemetry
            .timers()
            .end(&id, MetricType::PageLoad, EndOptions::success());
        assert_eq!(duration, Some(42));
    }
}
