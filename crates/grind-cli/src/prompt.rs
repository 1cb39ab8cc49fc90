//! Interactive stdin prompts
//!
//! Feedback values are range-checked here, at the edge - the scheduling
//! engine assumes pre-validated input. Bad input aborts the command rather
//! than retrying.

use std::io::{self, Write};

use anyhow::Context;

fn read_line(label: &str) -> anyhow::Result<String> {
    print!("{label} ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt for an integer no smaller than `min`
pub fn int_at_least(label: &str, min: i32) -> anyhow::Result<i32> {
    let raw = read_line(label)?;
    let value: i32 = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a number"))?;
    if value < min {
        anyhow::bail!("value must be at least {min}");
    }
    Ok(value)
}

/// Prompt for a quality rating on the 1-5 scale
pub fn rating(label: &str) -> anyhow::Result<i32> {
    let value = int_at_least(label, 1)?;
    if value > 5 {
        anyhow::bail!("ratings are on a 1-5 scale");
    }
    Ok(value)
}

/// Prompt for a 1-based pick from a numbered list; Enter skips
pub fn select(label: &str, count: usize) -> anyhow::Result<Option<usize>> {
    if count == 0 {
        return Ok(None);
    }

    let raw = read_line(&format!("{label} [1-{count}, Enter to skip]"))?;
    if raw.is_empty() {
        return Ok(None);
    }

    let choice: usize = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a number"))?;
    if choice < 1 || choice > count {
        anyhow::bail!("pick a number between 1 and {count}");
    }
    Ok(Some(choice - 1))
}
