//! Settled measurement results and their report rendering.

use std::fmt;
use std::time::Duration;

use crate::gc::CollectionDeltas;
use crate::pal::NANOS_PER_SEC;

/// The settled result of a closed timing session.
///
/// Carries the raw deltas captured between session begin and close. Derived
/// figures (milliseconds, kilocycles) use the same truncating arithmetic as
/// the rendered report, so programmatic readers and the console line can
/// never disagree.
///
/// # Example
///
/// ```
/// use kilocycles::Timer;
///
/// # fn main() -> Result<(), kilocycles::Error> {
/// let timer = Timer::new();
///
/// let measurement = timer.repeat("string building", false, 1000, || {
///     let mut s = String::new();
///     s.push_str("hello");
///     std::hint::black_box(&s);
/// })?;
///
/// assert_eq!(measurement.label(), "string building");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Measurement {
    label: String,
    elapsed_ticks: u64,
    frequency: u64,
    elapsed_cycles: u64,
    collections: CollectionDeltas,
}

impl Measurement {
    pub(crate) fn new(
        label: String,
        elapsed_ticks: u64,
        frequency: u64,
        elapsed_cycles: u64,
        collections: CollectionDeltas,
    ) -> Self {
        debug_assert!(frequency != 0, "tick frequency must be positive");

        Self {
            label,
            elapsed_ticks,
            frequency,
            elapsed_cycles,
            collections,
        }
    }

    /// The label this measurement reports under.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the measurement renders no report.
    ///
    /// Silent (blank-label) measurements are the idiom for warm-up runs and
    /// bracketing-overhead baselines: the interval is computed in full but
    /// nothing is printed for it.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.label.is_empty()
    }

    /// Elapsed wall-clock milliseconds, truncated exactly as reported.
    #[must_use]
    pub fn elapsed_millis(&self) -> u64 {
        let millis = u128::from(self.elapsed_ticks)
            .checked_mul(1000)
            .expect("tick count times 1000 always fits in u128")
            .checked_div(u128::from(self.frequency))
            .expect("tick frequency is positive by platform contract");

        u64::try_from(millis)
            .expect("millisecond values beyond u64 indicate an unrealistic scenario")
    }

    /// Elapsed cycles in thousands, truncated exactly as reported.
    #[must_use]
    pub fn elapsed_kilocycles(&self) -> u64 {
        self.elapsed_cycles
            .checked_div(1000)
            .expect("divisor is a non-zero constant")
    }

    /// Raw elapsed cycle count, in platform cycle units.
    #[must_use]
    pub fn elapsed_cycles(&self) -> u64 {
        self.elapsed_cycles
    }

    /// Elapsed wall-clock time at full tick resolution.
    #[must_use]
    pub fn wall_time(&self) -> Duration {
        let nanos = u128::from(self.elapsed_ticks)
            .checked_mul(u128::from(NANOS_PER_SEC))
            .expect("tick count times nanoseconds per second always fits in u128")
            .checked_div(u128::from(self.frequency))
            .expect("tick frequency is positive by platform contract");

        Duration::from_nanos(
            u64::try_from(nanos)
                .expect("nanosecond spans beyond u64 indicate an unrealistic scenario"),
        )
    }

    /// Collection count deltas observed during the interval.
    #[must_use]
    pub fn collection_deltas(&self) -> CollectionDeltas {
        self.collections
    }

    /// Prints the report record to stdout: the indented label line, then
    /// the fixed-width metrics line with milliseconds, kilocycles and the
    /// three generation deltas.
    ///
    /// Prints nothing for a silent (blank-label) measurement. Such runs
    /// exist to absorb warm-up effects or to measure bracketing overhead,
    /// and emitting output for them would corrupt the report stream that
    /// tooling scrapes.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        if self.is_silent() {
            return;
        }

        println!("{self}");
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.label.is_empty() {
            writeln!(f, "   {}", self.label)?;
        }

        write!(
            f,
            "   {:>7}ms {:>11}Kc (G0={:>4}, G1={:>4}, G2={:>4})",
            group_thousands(self.elapsed_millis()),
            group_thousands(self.elapsed_kilocycles()),
            self.collections.gen0(),
            self.collections.gen1(),
            self.collections.gen2(),
        )
    }
}

/// Renders a value with `,` thousands separators, e.g. `1234567` as
/// `1,234,567`.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();

    let mut reversed = String::new();
    let mut digits_in_group = 0_u8;

    for digit in digits.chars().rev() {
        if digits_in_group == 3 {
            reversed.push(',');
            digits_in_group = 0;
        }

        reversed.push(digit);
        digits_in_group = digits_in_group.saturating_add(1);
    }

    reversed.chars().rev().collect()
}
