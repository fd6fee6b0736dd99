use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str = "{msg}";

/// Single-line counter redrawn in place on stdout while pull requests are fetched.
///
/// GitHub lists newest pull requests first, so the number of the one being
/// fetched approximates how many are left.
pub struct ProgressMeter {
    bar: ProgressBar,
}

impl ProgressMeter {
    pub fn stdout() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        bar.set_style(
            ProgressStyle::default_spinner()
                .template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(Self::message(0));
        Self { bar }
    }

    /// A meter that draws nothing, for tests and JSON output.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn update(&self, number: u64) {
        self.bar.set_message(Self::message(number));
    }

    /// Erases the meter so the report starts on a clean line.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn message(number: u64) -> String {
        format!("Data fetches remaining: {number:>3}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_pads_to_three_digits() {
        assert_eq!(ProgressMeter::message(7), "Data fetches remaining:   7");
        assert_eq!(ProgressMeter::message(1234), "Data fetches remaining: 1234");
    }
}
