use std::io::{BufRead, Write};
use anyhow::Result;

/// 询问一个 (y/N) 问题，只有明确输入 y 或 yes 时返回 true
pub fn confirm<R: BufRead, W: Write>(mut input: R, mut output: W, question: &str) -> Result<bool> {
    write!(output, "{} (y/N): ", question)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
