//! Scripted speed profiles
//!
//! A small sequencer of speed-change instructions for driving the kinematic
//! model through repeatable scenarios: hold a speed for a duration, ramp
//! linearly to a target speed, or fire a callback and move straight on.

/// Type alias for sequencer callbacks
pub type SpeedCallback = Box<dyn FnMut()>;

/// One item of a speed profile
pub enum SpeedPattern {
    /// Hold `speed` for `duration` seconds
    Hold { speed: f64, duration: f64 },
    /// Ramp linearly from the speed at the start of this item to `target`
    /// over `duration` seconds
    Ramp { target: f64, duration: f64 },
    /// Invoke the callback, then advance immediately
    Callback(SpeedCallback),
}

/// Sequencer state machine over a queue of [`SpeedPattern`] items.
///
/// `update(dt)` advances elapsed time within the current item; when the item's
/// duration is exceeded the remainder is carried into the next item. Before
/// any item is added (and before the first update) the speed is the initial
/// speed given at construction.
pub struct SpeedProfile {
    patterns: Vec<SpeedPattern>,
    index: usize,
    elapsed: f64,
    segment_start_speed: f64,
    current_speed: f64,
}

impl SpeedProfile {
    pub fn new(initial_speed: f64) -> Self {
        Self {
            patterns: Vec::new(),
            index: 0,
            elapsed: 0.0,
            segment_start_speed: initial_speed,
            current_speed: initial_speed,
        }
    }

    /// Append a constant-speed item
    pub fn add_hold(&mut self, speed: f64, duration: f64) {
        self.patterns.push(SpeedPattern::Hold { speed, duration });
    }

    /// Append a hold at the most recently scripted speed (last hold speed or
    /// ramp target), falling back to the current segment start speed.
    pub fn hold_current(&mut self, duration: f64) {
        let speed = self
            .patterns
            .iter()
            .rev()
            .find_map(|pattern| match pattern {
                SpeedPattern::Hold { speed, .. } => Some(*speed),
                SpeedPattern::Ramp { target, .. } => Some(*target),
                SpeedPattern::Callback(_) => None,
            })
            .unwrap_or(self.segment_start_speed);
        self.add_hold(speed, duration);
    }

    /// Append a linear ramp to `target` over `duration` seconds
    pub fn add_ramp(&mut self, target: f64, duration: f64) {
        self.patterns.push(SpeedPattern::Ramp { target, duration });
    }

    /// Append a callback item; it fires once when the sequence reaches it
    pub fn add_callback(&mut self, callback: SpeedCallback) {
        self.patterns.push(SpeedPattern::Callback(callback));
    }

    /// True once every queued item has been consumed
    pub fn is_done(&self) -> bool {
        self.index >= self.patterns.len()
    }

    /// Current scripted speed [m/s]
    pub fn speed(&self) -> f64 {
        self.current_speed
    }

    /// Advance the profile by `dt` seconds and return the new speed.
    ///
    /// A single large `dt` can span several items; leftover time is carried
    /// from one item into the next. Callbacks are invoked as they are reached
    /// and consume no time.
    pub fn update(&mut self, dt: f64) -> f64 {
        if self.is_done() {
            return self.current_speed;
        }

        self.elapsed += dt;
        while self.index < self.patterns.len() {
            match &mut self.patterns[self.index] {
                SpeedPattern::Callback(callback) => {
                    callback();
                    self.index += 1;
                }
                SpeedPattern::Hold { speed, duration } => {
                    if self.elapsed > *duration {
                        self.elapsed -= *duration;
                        self.segment_start_speed = *speed;
                        self.index += 1;
                    } else {
                        break;
                    }
                }
                SpeedPattern::Ramp { target, duration } => {
                    if self.elapsed > *duration {
                        self.elapsed -= *duration;
                        self.segment_start_speed = *target;
                        self.index += 1;
                    } else {
                        break;
                    }
                }
            }
        }

        self.current_speed = self.compute_speed();
        self.current_speed
    }

    fn compute_speed(&self) -> f64 {
        if self.is_done() {
            return self.segment_start_speed;
        }
        match &self.patterns[self.index] {
            SpeedPattern::Hold { speed, .. } => *speed,
            SpeedPattern::Ramp { target, duration } => {
                let alpha = self.elapsed / duration;
                self.segment_start_speed + alpha * (target - self.segment_start_speed)
            }
            // callbacks are consumed inside update and never left current
            SpeedPattern::Callback(_) => self.current_speed,
        }
    }
}
