/// Average adult reading speed.
pub const WORDS_PER_MINUTE: usize = 225;

/// Estimated minutes needed to read `body`, never less than one.
pub fn estimate_reading_time(body: &str) -> i64 {
    let word_count = body.split_whitespace().count();
    word_count.div_ceil(WORDS_PER_MINUTE).max(1) as i64
}
