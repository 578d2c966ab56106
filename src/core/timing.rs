// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Frame pacing
//!
//! The pacer is consulted once per vsync. It blocks the emulation thread
//! until the current display period has elapsed, measures how late the
//! emulation is running and decides how many of the following periods may
//! skip rendering to catch up.
//!
//! # Example
//!
//! ```
//! use pandora_gs::core::config::PacingConfig;
//! use pandora_gs::core::gpu::Region;
//! use pandora_gs::core::timing::{FrameAction, FramePacer, ManualClock};
//!
//! let clock = ManualClock::new(1_000_000);
//! let mut pacer = FramePacer::with_clock(&PacingConfig::default(), Box::new(clock.clone()));
//! pacer.set_frequency(0.0, Region::Pal, false);
//!
//! // The first period only captures the time reference
//! assert_eq!(pacer.wait(true, false), FrameAction::Display);
//!
//! // The next one blocks until the 50 Hz period is over
//! let start = clock.ticks();
//! assert_eq!(pacer.wait(true, false), FrameAction::Display);
//! assert!(clock.ticks() - start >= pacer.period_ticks());
//! ```

use crate::core::config::{FrameSkipMode, PacingConfig};
use crate::core::gpu::Region;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Absolute time in clock ticks
pub type Ticks = u64;

/// GPU clock frequency used by the chip-accurate refresh rates
const GPU_CLOCK_HZ: f64 = 33_868_800.0;

/// NTSC interlaced refresh rate (~59.94 Hz)
pub const NTSC_INTERLACED_RATE: f64 = GPU_CLOCK_HZ / 565_031.25;
/// NTSC progressive refresh rate (~59.83 Hz)
pub const NTSC_PROGRESSIVE_RATE: f64 = GPU_CLOCK_HZ / 566_107.5;
/// PAL interlaced refresh rate (~50.002 Hz)
pub const PAL_INTERLACED_RATE: f64 = GPU_CLOCK_HZ / 677_343.75;
/// PAL progressive refresh rate (~49.76 Hz)
pub const PAL_PROGRESSIVE_RATE: f64 = GPU_CLOCK_HZ / 680_595.0;

/// Rounded NTSC refresh rate
pub const STANDARD_NTSC_RATE: f64 = 59.94;
/// Rounded PAL refresh rate
pub const STANDARD_PAL_RATE: f64 = 50.0;

/// Custom limits at or below this value select the regional rate
pub const FREQUENCY_EPSILON: f32 = 0.01;

/// Lateness (in periods) after which the pacer stops trying to catch up
const RESYNC_PERIODS: Ticks = 8;

/// Maximum consecutive skipped periods
const MAX_SKIP_INTERLACED: u32 = 4;
const MAX_SKIP_PROGRESSIVE: u32 = 3;

/// Periods per displayed frame in fast-forward mode
const FAST_FORWARD_RATIO: u32 = 4;

/// Time source used by the pacer
pub trait Clock: Send {
    /// Current time
    fn now(&self) -> Ticks;

    /// Clock resolution
    fn ticks_per_second(&self) -> Ticks;

    /// Give up the CPU while `remaining` ticks are left before a deadline
    fn idle(&mut self, remaining: Ticks);
}

/// Monotonic wall clock with nanosecond ticks
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Ticks {
        self.origin.elapsed().as_nanos() as Ticks
    }

    fn ticks_per_second(&self) -> Ticks {
        1_000_000_000
    }

    fn idle(&mut self, remaining: Ticks) {
        // Sleep granularity is about a millisecond; yield for the last stretch
        const SPIN_THRESHOLD: Ticks = 2_000_000;
        if remaining > SPIN_THRESHOLD {
            std::thread::sleep(Duration::from_nanos(remaining - SPIN_THRESHOLD / 2));
        } else {
            std::thread::yield_now();
        }
    }
}

/// Clock that only moves when told to
///
/// Clones share the same counter, so a test can keep one handle while the
/// pacer owns another. Idling advances the clock to the deadline.
#[derive(Debug, Clone)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
    ticks_per_second: Ticks,
}

impl ManualClock {
    pub fn new(ticks_per_second: Ticks) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(0)),
            ticks_per_second,
        }
    }

    pub fn ticks(&self) -> Ticks {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn advance(&self, ticks: Ticks) {
        self.ticks.fetch_add(ticks, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Ticks {
        self.ticks()
    }

    fn ticks_per_second(&self) -> Ticks {
        self.ticks_per_second
    }

    fn idle(&mut self, remaining: Ticks) {
        self.advance(remaining.max(1));
    }
}

/// Emulation speed selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedMode {
    #[default]
    Normal,
    Fast,
    Slow,
    Paused,
}

#[derive(Debug, Default)]
struct SpeedState {
    fast: bool,
    slow: bool,
    paused: bool,
}

/// Shared speed modifiers
///
/// Input handling runs outside the emulation thread; it flips these flags
/// through a cloned handle. Resuming from pause wakes the blocked pacer.
#[derive(Debug, Clone, Default)]
pub struct SpeedControl {
    inner: Arc<(Mutex<SpeedState>, Condvar)>,
}

impl SpeedControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SpeedState> {
        self.inner.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_fast_mode(&self, enabled: bool) {
        self.state().fast = enabled;
    }

    /// Flip slow motion; returns the new setting
    pub fn toggle_slow_mode(&self) -> bool {
        let mut state = self.state();
        state.slow = !state.slow;
        state.slow
    }

    pub fn set_pause_mode(&self, paused: bool) {
        self.state().paused = paused;
        if !paused {
            self.inner.1.notify_all();
        }
    }

    /// Active modifier, pause taking precedence over fast over slow
    pub fn mode(&self) -> SpeedMode {
        let state = self.state();
        if state.paused {
            SpeedMode::Paused
        } else if state.fast {
            SpeedMode::Fast
        } else if state.slow {
            SpeedMode::Slow
        } else {
            SpeedMode::Normal
        }
    }

    /// Block the calling thread until the pause is lifted
    pub fn wait_while_paused(&self) {
        let (lock, resumed) = &*self.inner;
        let state = lock.lock().unwrap_or_else(|e| e.into_inner());
        let _state = resumed
            .wait_while(state, |s| s.paused)
            .unwrap_or_else(|e| e.into_inner());
    }
}

/// Outcome of a vsync wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    /// Render this period
    Display,
    /// Skip rendering this period
    Skip,
}

/// Regional refresh rate in Hz
pub fn regional_rate(region: Region, interlaced: bool, chip_accurate: bool) -> f64 {
    match (region, interlaced, chip_accurate) {
        (Region::Ntsc, true, true) => NTSC_INTERLACED_RATE,
        (Region::Ntsc, false, true) => NTSC_PROGRESSIVE_RATE,
        (Region::Pal, true, true) => PAL_INTERLACED_RATE,
        (Region::Pal, false, true) => PAL_PROGRESSIVE_RATE,
        (Region::Ntsc, _, false) => STANDARD_NTSC_RATE,
        (Region::Pal, _, false) => STANDARD_PAL_RATE,
    }
}

/// Periods to skip after running `late_ticks` behind (standard mode)
///
/// Interlaced output skips whole field pairs, so decisions are only taken on
/// even periods and rounded up to an even count.
pub fn standard_skip_count(late_ticks: Ticks, period: Ticks, interlaced: bool, odd: bool) -> u32 {
    if period == 0 {
        return 0;
    }
    let late_periods = late_ticks as f64 / period as f64;

    if interlaced {
        if odd {
            return 0;
        }
        let count = (late_periods.floor() as u32).min(MAX_SKIP_INTERLACED);
        count + (count & 1)
    } else {
        ((late_periods + 0.15).floor() as u32).min(MAX_SKIP_PROGRESSIVE)
    }
}

/// Periods to skip in alternate mode
pub fn alternate_skip_count(late_ticks: Ticks, timeout: Ticks, interlaced: bool, odd: bool) -> u32 {
    if late_ticks <= timeout / 8 {
        return 0;
    }
    match (interlaced, odd) {
        (false, _) => 1,
        (true, false) => 2,
        (true, true) => 0,
    }
}

/// Vsync pacer with frame skipping
pub struct FramePacer {
    clock: Box<dyn Clock>,
    speed: SpeedControl,

    frame_skip: FrameSkipMode,
    chip_accurate: bool,
    interlaced: bool,

    frequency: f64,
    period: Ticks,
    /// 7/8 of a period
    timeout: Ticks,

    /// Start of the current period
    reference: Ticks,
    late_ticks: Ticks,
    skip_remaining: u32,
    fast_counter: u32,
    reset_requested: bool,
}

impl FramePacer {
    /// Create a pacer driven by the wall clock
    pub fn new(config: &PacingConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock::new()))
    }

    /// Create a pacer driven by a custom clock
    pub fn with_clock(config: &PacingConfig, clock: Box<dyn Clock>) -> Self {
        let mut pacer = Self {
            clock,
            speed: SpeedControl::new(),
            frame_skip: config.frame_skip,
            chip_accurate: config.chip_accurate_rates,
            interlaced: false,
            frequency: 0.0,
            period: 0,
            timeout: 0,
            reference: 0,
            late_ticks: 0,
            skip_remaining: 0,
            fast_counter: 0,
            reset_requested: true,
        };
        pacer.set_frequency(config.framerate_limit, Region::Ntsc, false);
        pacer
    }

    /// Apply new pacing options; the frequency is recomputed by the caller
    pub fn configure(&mut self, config: &PacingConfig) {
        self.frame_skip = config.frame_skip;
        self.chip_accurate = config.chip_accurate_rates;
        self.skip_remaining = 0;
    }

    /// Select the target refresh rate
    ///
    /// A custom `limit` above [`FREQUENCY_EPSILON`] wins; otherwise the rate
    /// follows the region and interlacing.
    pub fn set_frequency(&mut self, limit: f32, region: Region, interlaced: bool) {
        self.frequency = if limit > FREQUENCY_EPSILON {
            limit as f64
        } else {
            regional_rate(region, interlaced, self.chip_accurate)
        };
        self.interlaced = interlaced;

        let ticks_per_second = self.clock.ticks_per_second() as f64;
        self.period = ((ticks_per_second / self.frequency) as Ticks).max(1);
        self.timeout = self.period * 7 / 8;
        self.reset();

        log::debug!(
            "Frame rate set to {:.3} Hz ({} ticks per period)",
            self.frequency,
            self.period
        );
    }

    /// Re-capture the time reference on the next wait
    pub fn reset(&mut self) {
        self.reset_requested = true;
        self.skip_remaining = 0;
        self.fast_counter = 0;
        self.late_ticks = 0;
    }

    /// Wait for the end of the current display period
    ///
    /// `is_waiting` enables blocking; without it the period is counted as
    /// elapsed immediately. `is_odd_period` is the current interlace field.
    pub fn wait(&mut self, is_waiting: bool, is_odd_period: bool) -> FrameAction {
        if self.reset_requested {
            self.reset_requested = false;
            self.reference = self.clock.now();
            return FrameAction::Display;
        }

        let duration = match self.speed.mode() {
            SpeedMode::Paused => {
                self.speed.wait_while_paused();
                self.reference = self.clock.now();
                self.late_ticks = 0;
                self.skip_remaining = 0;
                return FrameAction::Display;
            }
            SpeedMode::Fast => {
                self.reference = self.clock.now();
                self.fast_counter = (self.fast_counter + 1) % FAST_FORWARD_RATIO;
                return if self.fast_counter == 0 {
                    FrameAction::Display
                } else {
                    FrameAction::Skip
                };
            }
            SpeedMode::Slow => self.period * 2,
            SpeedMode::Normal => self.period,
        };

        if self.skip_remaining > 0 {
            self.skip_remaining -= 1;
            self.reference += duration;
            return FrameAction::Skip;
        }

        let deadline = self.reference + duration;
        let mut now = self.clock.now();

        if is_waiting {
            while now < deadline {
                self.clock.idle(deadline - now);
                now = self.clock.now();
            }
            self.late_ticks = now - deadline;
            self.reference = deadline;

            if self.late_ticks > self.period * RESYNC_PERIODS {
                log::debug!("Pacer resync after {} late ticks", self.late_ticks);
                self.reference = now;
                self.late_ticks = 0;
            }
        } else {
            self.late_ticks = 0;
            self.reference = now;
        }

        self.skip_remaining = match self.frame_skip {
            FrameSkipMode::None => 0,
            FrameSkipMode::Standard => standard_skip_count(
                self.late_ticks,
                self.period,
                self.interlaced,
                is_odd_period,
            ),
            FrameSkipMode::Alternate => alternate_skip_count(
                self.late_ticks,
                self.timeout,
                self.interlaced,
                is_odd_period,
            ),
        };

        FrameAction::Display
    }

    /// Handle for changing the speed from another thread
    pub fn speed_control(&self) -> SpeedControl {
        self.speed.clone()
    }

    pub fn set_fast_mode(&self, enabled: bool) {
        self.speed.set_fast_mode(enabled);
    }

    pub fn toggle_slow_mode(&self) -> bool {
        self.speed.toggle_slow_mode()
    }

    pub fn set_pause_mode(&self, paused: bool) {
        self.speed.set_pause_mode(paused);
    }

    #[inline(always)]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    #[inline(always)]
    pub fn period_ticks(&self) -> Ticks {
        self.period
    }

    #[inline(always)]
    pub fn timeout_ticks(&self) -> Ticks {
        self.timeout
    }

    /// Ticks the last period ended past its deadline
    #[inline(always)]
    pub fn late_ticks(&self) -> Ticks {
        self.late_ticks
    }

    /// Periods still scheduled to skip
    #[inline(always)]
    pub fn skip_remaining(&self) -> u32 {
        self.skip_remaining
    }
}
