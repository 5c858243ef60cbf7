/// Classic fizzbuzz: "fizzbuzz" for multiples of 15, "fizz" for multiples
/// of 3, "buzz" for multiples of 5, otherwise the number itself.
pub fn fizzbuzz(i: i64) -> String {
    match (i % 3 == 0, i % 5 == 0) {
        (true, true) => "fizzbuzz".to_string(),
        (true, false) => "fizz".to_string(),
        (false, true) => "buzz".to_string(),
        (false, false) => i.to_string(),
    }
}

/// Wrap an answer in a code fence so it renders monospace
pub fn format_response(answer: &str) -> String {
    format!("```{}```", answer)
}
