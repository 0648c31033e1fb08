use crate::config::DigitSource;
use crate::models::{DigitSet, MissingDigits, Submission};

const WINDOW_WIDTH: u8 = 4;

pub fn observed_digits(submission: &Submission, source: DigitSource) -> DigitSet {
    match source {
        DigitSource::Multiplier => DigitSet::from_text(&submission.multiplier_text),
        DigitSource::Time => DigitSet::from_text(&submission.time.format("%H:%M:%S").to_string()),
    }
}

/// Four-window rule: among the 10 cyclic windows of width 4, the
/// lowest-starting one holding exactly 2 observed and 2 missing digits
/// (0 never counts as a usable missing digit) gives the result. Without
/// such a window, the two smallest missing non-zero digits are used.
pub fn missing_digits(observed: &DigitSet) -> MissingDigits {
    if observed.len() < 2 {
        return MissingDigits::default();
    }

    for start in 0..10u8 {
        let (present, absent): (Vec<u8>, Vec<u8>) = (0..WINDOW_WIDTH)
            .map(|i| (start + i) % 10)
            .partition(|d| observed.contains(*d));

        if present.len() == 2 && absent.len() == 2 && !absent.contains(&0) {
            log::debug!("Janela {}..{} escolhida, faltantes {:?}", start, (start + 3) % 10, absent);
            return build(absent);
        }
    }

    let fallback: Vec<u8> = (1..=9).filter(|d| !observed.contains(*d)).take(2).collect();
    log::debug!("Nenhuma janela válida, faltantes globais {:?}", fallback);
    build(fallback)
}

fn build(mut digits: Vec<u8>) -> MissingDigits {
    digits.sort_unstable();
    let sum = digits.iter().map(|&d| d as u32).sum();
    MissingDigits { digits, sum }
}
