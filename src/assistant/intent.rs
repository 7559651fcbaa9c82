/// Inputs that end the session
pub const EXIT_WORDS: &[&str] = &["quit", "exit", "q", "bye"];

/// Answers that confirm a deletion
pub const CONFIRM_WORDS: &[&str] = &["y", "yes", "affirmative", "sure"];

pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    EXIT_WORDS.contains(&input.as_str())
}

pub fn is_confirmation(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    CONFIRM_WORDS.contains(&answer.as_str())
}
